use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::types::{CONFIG_VERSION, PackerConfig};

/// A loaded configuration file with its associated directory.
///
/// Paths in the config are relative to the config file location,
/// so we need to track where the config was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The parsed configuration
    pub config: PackerConfig,
    /// The directory containing the config file
    pub config_dir: PathBuf,
}

impl LoadedConfig {
    /// Load a config file from the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let config: PackerConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        if config.version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}, expected {}",
                config.version,
                path.display(),
                CONFIG_VERSION
            );
        }

        let config_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self { config, config_dir })
    }

    /// Resolve source folder patterns to actual folder paths.
    ///
    /// Glob patterns are expanded in sorted order and only matching
    /// directories are kept. Plain paths are passed through even if they do
    /// not exist, so discovery can report them.
    pub fn resolve_directories(&self) -> Result<Vec<PathBuf>> {
        let mut results = Vec::new();

        for pattern in &self.config.directories {
            if is_glob_pattern(pattern) {
                let full_pattern = self.config_dir.join(pattern);
                let pattern_str = full_pattern.to_string_lossy();

                let paths = glob::glob(&pattern_str)
                    .with_context(|| format!("invalid glob pattern: {}", pattern))?;

                for entry in paths {
                    let path =
                        entry.with_context(|| format!("failed to read glob entry: {}", pattern))?;
                    if path.is_dir() {
                        results.push(path);
                    }
                }
            } else {
                results.push(self.resolve_path(pattern));
            }
        }

        Ok(results)
    }

    /// Resolve a path from the config relative to the config file directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }
}

/// Check if a pattern contains glob characters.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?') || pattern.contains('[')
}
