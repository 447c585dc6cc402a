mod args;

pub use args::{CliArgs, CompressionLevel, OutputFormat, PackingHeuristic};
