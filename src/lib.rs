pub mod config;
pub mod error;
pub mod load;
pub mod pipeline;
pub mod process;
pub mod schema;
pub mod write;

pub use config::PipelineConfig;
pub use error::{EtlError, Result};
pub use pipeline::{run, RunSummary};
