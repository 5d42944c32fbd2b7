// Core of the courtside pipeline: configuration, player records, the
// games/efficiency filter, quadrant classification, and the output table.

pub mod config;
pub mod error;
pub mod filter;
pub mod quadrant;
pub mod record;
pub mod table;

pub use error::PipelineError;
