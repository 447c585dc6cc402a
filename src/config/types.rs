use serde::{Deserialize, Serialize};

use crate::output::DEFAULT_NAME_FORMAT;

/// The only config file version this build reads
pub const CONFIG_VERSION: u32 = 1;

/// PNG compression level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompressConfig {
    /// Optimization level 0-6
    Level(u8),
    /// Maximum compression ("max")
    Max(String),
}

/// texpack configuration file structure.
///
/// All paths in the config are relative to the config file location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackerConfig {
    /// Config file version (currently 1)
    pub version: u32,
    /// Source folders or glob patterns matching folders
    pub directories: Vec<String>,
    /// Atlas side length in pixels
    pub size: u32,
    /// Output directory for atlas images
    pub output_dir: String,
    /// Atlas file name template
    pub name_format: String,
    /// Atlas image format: "png", "bmp", "tga" or "jpg"
    pub format: String,
    /// Manifest output path
    pub manifest: String,
    /// Write absolute atlas paths into the manifest
    pub absolute_bin_paths: bool,
    /// Keep file extensions in manifest image keys
    pub include_extensions: bool,
    /// Packing heuristic to use
    pub heuristic: String,
    /// PNG compression configuration (optional)
    pub compress: Option<CompressConfig>,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            directories: Vec::new(),
            size: 1024,
            output_dir: ".".to_string(),
            name_format: DEFAULT_NAME_FORMAT.to_string(),
            format: "png".to_string(),
            manifest: "atlas.json".to_string(),
            absolute_bin_paths: false,
            include_extensions: false,
            heuristic: "best-short-side-fit".to_string(),
            compress: None,
        }
    }
}
