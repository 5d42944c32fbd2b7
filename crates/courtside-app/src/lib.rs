// Library root for the courtside binary: the pipeline driver and logging
// setup, exposed so integration tests can drive a full run.

pub mod logging;
pub mod pipeline;

pub use pipeline::{prepare_directories, run_pipeline, AvatarTally, PipelineReport};
