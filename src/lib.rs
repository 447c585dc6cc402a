pub mod atlas;
pub mod catalog;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod output;
pub mod packing;
pub mod pipeline;
pub mod report;

pub use catalog::{ImageCatalog, ImageId};
pub use cli::{CliArgs, OutputFormat, PackingHeuristic};
pub use config::Settings;
pub use error::{AtlasError, PackingError};
pub use output::Manifest;
pub use pipeline::{RunSummary, run};
pub use report::{Diagnostic, ImageIssue, RunContext};
