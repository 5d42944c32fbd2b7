// Avatar error types.

use std::path::PathBuf;

/// Why the remote image could not be used. Absorbed by the resolver, which
/// falls back to a placeholder; kept on the outcome for inspection.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("image source returned HTTP {0}")]
    Status(u16),

    #[error("response is not a usable image: {0}")]
    Decode(#[source] image::ImageError),
}

/// Local failures that leave no asset on disk. These do propagate.
#[derive(Debug, thiserror::Error)]
pub enum AvatarError {
    #[error("failed to write avatar {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode avatar {path}: {source}")]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
}
