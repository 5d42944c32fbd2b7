// Median thresholds and four-quadrant classification.

use std::fmt;

use tracing::info;

use crate::error::PipelineError;
use crate::filter::RankedPlayer;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Position of a player relative to the points and attempts medians.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Quadrant {
    HighPointsHighAttempts,
    HighPointsLowAttempts,
    LowPointsHighAttempts,
    LowPointsLowAttempts,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::HighPointsHighAttempts,
        Quadrant::HighPointsLowAttempts,
        Quadrant::LowPointsHighAttempts,
        Quadrant::LowPointsLowAttempts,
    ];

    /// Label written to the output table.
    pub fn as_str(self) -> &'static str {
        match self {
            Quadrant::HighPointsHighAttempts => "high-points/high-attempts",
            Quadrant::HighPointsLowAttempts => "high-points/low-attempts",
            Quadrant::LowPointsHighAttempts => "low-points/high-attempts",
            Quadrant::LowPointsLowAttempts => "low-points/low-attempts",
        }
    }

    /// Chart legend name for the quadrant.
    pub fn nickname(self) -> &'static str {
        match self {
            Quadrant::HighPointsHighAttempts => "High Volume Scorers",
            Quadrant::HighPointsLowAttempts => "Efficient Scorers",
            Quadrant::LowPointsHighAttempts => "Volume Shooters",
            Quadrant::LowPointsLowAttempts => "Low Usage Players",
        }
    }

    pub fn parse(label: &str) -> Option<Quadrant> {
        Quadrant::ALL.into_iter().find(|q| q.as_str() == label)
    }

    /// Boundary values count as "high" on their axis.
    pub fn locate(points: f64, attempts: f64, thresholds: Thresholds) -> Quadrant {
        let high_points = points >= thresholds.points;
        let high_attempts = attempts >= thresholds.attempts;
        match (high_points, high_attempts) {
            (true, true) => Quadrant::HighPointsHighAttempts,
            (true, false) => Quadrant::HighPointsLowAttempts,
            (false, true) => Quadrant::LowPointsHighAttempts,
            (false, false) => Quadrant::LowPointsLowAttempts,
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quadrant boundaries: medians over the classified set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub points: f64,
    pub attempts: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedPlayer {
    pub player: RankedPlayer,
    pub quadrant: Quadrant,
}

/// Result of one classification run. The thresholds belong to exactly the
/// players listed here.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub thresholds: Thresholds,
    pub players: Vec<ClassifiedPlayer>,
}

impl Classification {
    /// Player count per quadrant, in [`Quadrant::ALL`] order.
    pub fn counts(&self) -> [(Quadrant, usize); 4] {
        Quadrant::ALL.map(|q| (q, self.players.iter().filter(|p| p.quadrant == q).count()))
    }
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Median of `values`; the mean of the two middle values for even counts.
/// Returns `None` for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Compute both medians over `players`.
pub fn thresholds(players: &[RankedPlayer]) -> Result<Thresholds, PipelineError> {
    let points: Vec<f64> = players.iter().map(|p| p.record.points).collect();
    let attempts: Vec<f64> = players.iter().map(|p| p.record.attempts).collect();
    match (median(&points), median(&attempts)) {
        (Some(points), Some(attempts)) => Ok(Thresholds { points, attempts }),
        _ => Err(PipelineError::EmptyInput { stage: "classify" }),
    }
}

/// Label every player, using thresholds computed once over this same set.
pub fn classify(players: Vec<RankedPlayer>) -> Result<Classification, PipelineError> {
    let thresholds = thresholds(&players)?;
    info!(
        "Quadrant boundaries: PTS median = {}, FGA median = {}",
        thresholds.points, thresholds.attempts
    );

    let players: Vec<ClassifiedPlayer> = players
        .into_iter()
        .map(|player| {
            let quadrant = Quadrant::locate(player.record.points, player.record.attempts, thresholds);
            ClassifiedPlayer { player, quadrant }
        })
        .collect();

    let classification = Classification {
        thresholds,
        players,
    };
    for (quadrant, count) in classification.counts() {
        info!("{quadrant} ({}): {count} players", quadrant.nickname());
    }
    Ok(classification)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
