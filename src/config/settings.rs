use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use super::{CompressConfig, LoadedConfig};
use crate::cli::{CliArgs, CompressionLevel, OutputFormat, PackingHeuristic};
use crate::error::AtlasError;
use crate::output::{DEFAULT_NAME_FORMAT, NameTemplate};

/// Everything a packing run needs, after merging the CLI with the config file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub directories: Vec<PathBuf>,
    pub size: u32,
    pub output_dir: PathBuf,
    pub name_format: String,
    pub format: OutputFormat,
    pub manifest: PathBuf,
    pub absolute_bin_paths: bool,
    pub include_extensions: bool,
    pub heuristic: PackingHeuristic,
    pub compress: Option<CompressionLevel>,
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            directories: Vec::new(),
            size: 1024,
            output_dir: PathBuf::from("."),
            name_format: DEFAULT_NAME_FORMAT.to_string(),
            format: OutputFormat::Png,
            manifest: PathBuf::from("./atlas.json"),
            absolute_bin_paths: false,
            include_extensions: false,
            heuristic: PackingHeuristic::BestShortSideFit,
            compress: None,
            verbose: false,
        }
    }
}

impl Settings {
    /// Merge config file values with CLI arguments.
    /// CLI arguments always take precedence over config values.
    pub fn from_args(args: &CliArgs) -> Result<Self> {
        let loaded = args
            .config
            .as_deref()
            .map(|path| {
                LoadedConfig::load(path)
                    .with_context(|| format!("failed to load config: {}", path.display()))
            })
            .transpose()?;

        match loaded {
            Some(loaded) => Self::merge(args, &loaded),
            None => Ok(Self::merge_defaults(args)),
        }
    }

    fn merge_defaults(args: &CliArgs) -> Self {
        let defaults = Self::default();
        Self {
            directories: args.directories.clone(),
            size: args.size.unwrap_or(defaults.size),
            output_dir: args.output.clone().unwrap_or(defaults.output_dir),
            name_format: args.name_format.clone().unwrap_or(defaults.name_format),
            format: args.format.unwrap_or(defaults.format),
            manifest: args.manifest.clone().unwrap_or(defaults.manifest),
            absolute_bin_paths: args.absolute_bin_paths,
            include_extensions: args.include_extensions,
            heuristic: args.heuristic.unwrap_or(defaults.heuristic),
            compress: args.compress,
            verbose: args.verbose,
        }
    }

    fn merge(args: &CliArgs, loaded: &LoadedConfig) -> Result<Self> {
        let config = &loaded.config;

        let directories = if args.directories.is_empty() {
            loaded
                .resolve_directories()
                .context("failed to resolve directories from config")?
        } else {
            args.directories.clone()
        };

        let format = match args.format {
            Some(format) => format,
            None => OutputFormat::from_name(&config.format).ok_or_else(|| {
                anyhow!(
                    "unknown format '{}' in config file. Valid values: png, bmp, tga, jpg",
                    config.format
                )
            })?,
        };

        let heuristic = match args.heuristic {
            Some(heuristic) => heuristic,
            None => PackingHeuristic::from_name(&config.heuristic).ok_or_else(|| {
                anyhow!(
                    "unknown heuristic '{}' in config file. Valid values: best-short-side-fit, \
                     best-long-side-fit, best-area-fit, bottom-left, contact-point, best",
                    config.heuristic
                )
            })?,
        };

        let compress = if args.compress.is_some() {
            args.compress
        } else {
            config.compress.as_ref().map(|c| match c {
                CompressConfig::Level(n) => CompressionLevel::Level(*n),
                CompressConfig::Max(_) => CompressionLevel::Max,
            })
        };

        Ok(Self {
            directories,
            size: args.size.unwrap_or(config.size),
            output_dir: args
                .output
                .clone()
                .unwrap_or_else(|| loaded.resolve_path(&config.output_dir)),
            name_format: args
                .name_format
                .clone()
                .unwrap_or_else(|| config.name_format.clone()),
            format,
            manifest: args
                .manifest
                .clone()
                .unwrap_or_else(|| loaded.resolve_path(&config.manifest)),
            absolute_bin_paths: args.absolute_bin_paths || config.absolute_bin_paths,
            include_extensions: args.include_extensions || config.include_extensions,
            heuristic,
            compress,
            verbose: args.verbose,
        })
    }

    /// Reject settings no run could succeed with.
    pub fn validate(&self) -> Result<(), AtlasError> {
        if self.size == 0 {
            return Err(AtlasError::InvalidBinSize(self.size));
        }
        NameTemplate::parse(&self.name_format)?;
        Ok(())
    }
}
