// Player avatar resolution: cached file, remote headshot, or a locally drawn
// placeholder. Every resolved record ends up pointing at an existing file.

pub mod error;
pub mod glyphs;
pub mod placeholder;
pub mod resolver;
pub mod source;

pub use error::{AvatarError, FetchError};
pub use resolver::{avatar_filename, AvatarOutcome, AvatarResolver};
pub use source::{HttpImageSource, ImageSource};
