mod image_crate;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::cli::OutputFormat;

pub use image_crate::ImageCrateCodec;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("failed to open '{path}': {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{0}")]
    Image(#[from] image::ImageError),

    #[error("cannot convert to {0} channels")]
    UnsupportedChannels(u8),

    #[error("PNG compression failed: {0}")]
    Compress(String),

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Header information read without decoding pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

/// Fully decoded pixels: row-major, interleaved, 8 bits per channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub pixels: Vec<u8>,
}

/// Reads and writes image files.
///
/// Implementations must be shareable across the compositing worker pool.
pub trait ImageCodec: Sync {
    fn probe(&self, path: &Path) -> Result<ImageInfo, CodecError>;

    /// Decode `path` into `requested_channels` interleaved 8-bit channels.
    fn decode(&self, path: &Path, requested_channels: u8) -> Result<DecodedImage, CodecError>;

    fn encode(
        &self,
        format: OutputFormat,
        path: &Path,
        pixels: &[u8],
        channels: u8,
        width: u32,
        height: u32,
    ) -> Result<(), CodecError>;
}
