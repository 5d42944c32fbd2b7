// Avatar resolution: cache lookup, remote fetch, placeholder fallback.
//
// The cache directory is append-only. An existing file is returned as-is and
// never refetched or overwritten; new files are written to a temp sibling and
// renamed into place.

use std::io::Write;
use std::path::{Path, PathBuf};

use courtside_core::record::PlayerRecord;
use courtside_core::table::AvatarKind;
use image::{DynamicImage, ImageFormat, RgbImage};
use tracing::{debug, info, warn};

use crate::error::{AvatarError, FetchError};
use crate::placeholder;
use crate::source::ImageSource;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Which branch produced the avatar file.
#[derive(Debug)]
pub enum AvatarOutcome {
    Cached(PathBuf),
    Fetched(PathBuf),
    Synthesized { path: PathBuf, cause: FetchError },
}

impl AvatarOutcome {
    pub fn path(&self) -> &Path {
        match self {
            AvatarOutcome::Cached(path) | AvatarOutcome::Fetched(path) => path,
            AvatarOutcome::Synthesized { path, .. } => path,
        }
    }

    pub fn into_path(self) -> PathBuf {
        match self {
            AvatarOutcome::Cached(path) | AvatarOutcome::Fetched(path) => path,
            AvatarOutcome::Synthesized { path, .. } => path,
        }
    }

    pub fn kind(&self) -> AvatarKind {
        match self {
            AvatarOutcome::Cached(_) => AvatarKind::Cached,
            AvatarOutcome::Fetched(_) => AvatarKind::Fetched,
            AvatarOutcome::Synthesized { .. } => AvatarKind::Synthesized,
        }
    }

    /// True when the image source was contacted.
    pub fn performed_fetch(&self) -> bool {
        !matches!(self, AvatarOutcome::Cached(_))
    }
}

/// Replace every non-alphanumeric character with `_`.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

/// Cache file name for a player: `{name}_{id}.png`, both sanitized.
pub fn avatar_filename(name: &str, player_id: &str) -> String {
    format!("{}_{}.png", sanitize(name), sanitize(player_id))
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

enum Downloaded {
    /// Already PNG; stored byte-for-byte.
    Png(Vec<u8>),
    /// Another decodable format; re-encoded as PNG.
    Decoded(DynamicImage),
}

pub struct AvatarResolver<'a> {
    source: &'a dyn ImageSource,
    cache_dir: PathBuf,
    placeholder_size: u32,
}

impl<'a> AvatarResolver<'a> {
    pub fn new(source: &'a dyn ImageSource, cache_dir: impl Into<PathBuf>, placeholder_size: u32) -> Self {
        Self {
            source,
            cache_dir: cache_dir.into(),
            placeholder_size,
        }
    }

    pub fn path_for(&self, record: &PlayerRecord) -> PathBuf {
        self.cache_dir.join(avatar_filename(&record.name, &record.id))
    }

    /// Resolve the avatar for `record` to an existing local file.
    ///
    /// Fetch failures are absorbed into [`AvatarOutcome::Synthesized`]; only
    /// local write or encode failures are returned as errors.
    pub async fn resolve(&self, record: &PlayerRecord) -> Result<AvatarOutcome, AvatarError> {
        let path = self.path_for(record);
        if path.exists() {
            debug!(player = %record.name, path = %path.display(), "avatar already cached");
            return Ok(AvatarOutcome::Cached(path));
        }

        info!("Getting avatar for {}...", record.name);
        match self.download(&record.id).await {
            Ok(Downloaded::Png(bytes)) => {
                write_bytes(&path, &bytes)?;
                Ok(AvatarOutcome::Fetched(path))
            }
            Ok(Downloaded::Decoded(image)) => {
                write_image(&path, &image)?;
                Ok(AvatarOutcome::Fetched(path))
            }
            Err(cause) => {
                warn!("Could not get image for {} ({cause}), creating placeholder", record.name);
                let image = placeholder::render(&record.name, &record.team, self.placeholder_size);
                write_rgb(&path, &image)?;
                Ok(AvatarOutcome::Synthesized { path, cause })
            }
        }
    }

    async fn download(&self, player_id: &str) -> Result<Downloaded, FetchError> {
        let bytes = self.source.fetch(player_id).await?;
        let format = image::guess_format(&bytes).map_err(FetchError::Decode)?;
        let decoded = image::load_from_memory_with_format(&bytes, format).map_err(FetchError::Decode)?;
        Ok(if format == ImageFormat::Png {
            Downloaded::Png(bytes)
        } else {
            Downloaded::Decoded(decoded)
        })
    }
}

// ---------------------------------------------------------------------------
// Persistence helpers
// ---------------------------------------------------------------------------

fn temp_path(path: &Path) -> PathBuf {
    path.with_extension("png.tmp")
}

fn commit(tmp: &Path, path: &Path) -> Result<(), AvatarError> {
    std::fs::rename(tmp, path).map_err(|source| AvatarError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), AvatarError> {
    let tmp = temp_path(path);
    let io_err = |source| AvatarError::Io {
        path: tmp.clone(),
        source,
    };
    let mut file = std::fs::File::create(&tmp).map_err(io_err)?;
    file.write_all(bytes).map_err(io_err)?;
    file.sync_all().map_err(io_err)?;
    commit(&tmp, path)
}

fn write_image(path: &Path, image: &DynamicImage) -> Result<(), AvatarError> {
    let tmp = temp_path(path);
    image
        .save_with_format(&tmp, ImageFormat::Png)
        .map_err(|source| AvatarError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
    commit(&tmp, path)
}

fn write_rgb(path: &Path, image: &RgbImage) -> Result<(), AvatarError> {
    let tmp = temp_path(path);
    image
        .save_with_format(&tmp, ImageFormat::Png)
        .map_err(|source| AvatarError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
    commit(&tmp, path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
