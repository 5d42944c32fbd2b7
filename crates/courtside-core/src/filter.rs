// Games-played filter, scoring efficiency, and top-N selection.

use std::num::NonZeroUsize;

use tracing::{debug, info};

use crate::record::PlayerRecord;

/// A record that passed the games filter and has a defined efficiency.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPlayer {
    pub record: PlayerRecord,
    /// Points per field-goal attempt. Always finite.
    pub efficiency: f64,
}

/// Points per attempt, or `None` when the ratio is undefined or infinite.
pub fn efficiency(points: f64, attempts: f64) -> Option<f64> {
    if attempts <= 0.0 {
        return None;
    }
    let ratio = points / attempts;
    ratio.is_finite().then_some(ratio)
}

/// Keep players with at least `min_games` games and a defined efficiency,
/// rank them by points (descending, ties in input order) and keep the first
/// `top_n`.
pub fn filter_and_derive(
    records: Vec<PlayerRecord>,
    min_games: u32,
    top_n: NonZeroUsize,
) -> Vec<RankedPlayer> {
    let total = records.len();
    let eligible: Vec<PlayerRecord> = records
        .into_iter()
        .filter(|r| r.games >= min_games)
        .collect();
    info!(
        "Players with at least {min_games} games played: {} of {total}",
        eligible.len()
    );

    let mut ranked: Vec<RankedPlayer> = eligible
        .into_iter()
        .filter_map(|record| match efficiency(record.points, record.attempts) {
            Some(efficiency) => Some(RankedPlayer { record, efficiency }),
            None => {
                debug!(player = %record.name, "dropping player with undefined PTS/FGA");
                None
            }
        })
        .collect();

    // `sort_by` is stable, so equal point totals keep their input order.
    ranked.sort_by(|a, b| b.record.points.total_cmp(&a.record.points));
    ranked.truncate(top_n.get());

    info!("Selected top {} players by points", ranked.len());
    for (rank, p) in ranked.iter().take(10).enumerate() {
        debug!(
            "#{:<2} {} ({}) GP={} PTS={} FGA={} PTS/FGA={:.3}",
            rank + 1,
            p.record.name,
            p.record.team,
            p.record.games,
            p.record.points,
            p.record.attempts,
            p.efficiency
        );
    }

    ranked
}
