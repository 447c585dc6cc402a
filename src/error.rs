use std::path::PathBuf;
use thiserror::Error;

use crate::catalog::ImageId;

/// Errors that abort a run.
#[derive(Error, Debug)]
pub enum AtlasError {
    #[error("Invalid atlas size {0}: bin side length must be positive")]
    InvalidBinSize(u32),

    #[error("Invalid bin name template '{0}': it must contain an {{index}} placeholder")]
    InvalidNameTemplate(String),

    #[error("'{0}' is not a directory")]
    NotADirectory(PathBuf),

    #[error("Failed to read directory '{path}': {source}")]
    ReadDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid output directory '{path}': {source}")]
    OutputDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Atlas size {size}x{size} with {channels} channels does not fit in memory")]
    BinTooLarge { size: u32, channels: u8 },

    #[error("Failed to write atlas '{path}': {source}")]
    BinWrite {
        path: PathBuf,
        source: crate::codec::CodecError,
    },

    #[error("Failed to write manifest '{path}': {source}")]
    ManifestWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize manifest: {0}")]
    ManifestSerialize(#[from] serde_json::Error),

    #[error(transparent)]
    Packing(#[from] PackingError),
}

/// Errors raised while placing rectangles into bins.
///
/// `OversizedRectangle`, `DegenerateRectangle` and `NoProgress` are reported
/// per rectangle and never abort a run. The remaining variants mean the
/// layout broke its contract and are fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PackingError {
    #[error("{width}x{height} exceeds the atlas size {bin_size}x{bin_size}")]
    OversizedRectangle {
        id: ImageId,
        width: u32,
        height: u32,
        bin_size: u32,
    },

    #[error("{width}x{height} has zero area")]
    DegenerateRectangle { id: ImageId, width: u32, height: u32 },

    #[error("{width}x{height} could not be placed into an empty bin")]
    NoProgress { id: ImageId, width: u32, height: u32 },

    #[error(
        "Placement of image {id} at ({x}, {y}) sized {width}x{height} in bin {bin} \
         leaves the {bin_size}x{bin_size} bin"
    )]
    PlacementOutOfBounds {
        id: ImageId,
        bin: usize,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        bin_size: u32,
    },

    #[error("Placement refers to image {id}, which is not in the catalog")]
    UnknownImage { id: ImageId },

    #[error("Images {first} and {second} overlap in bin {bin}")]
    OverlappingPlacements {
        first: ImageId,
        second: ImageId,
        bin: usize,
    },
}

impl PackingError {
    /// The image this error is about.
    pub fn image(&self) -> ImageId {
        match self {
            PackingError::OversizedRectangle { id, .. }
            | PackingError::DegenerateRectangle { id, .. }
            | PackingError::NoProgress { id, .. }
            | PackingError::PlacementOutOfBounds { id, .. }
            | PackingError::UnknownImage { id } => *id,
            PackingError::OverlappingPlacements { first, .. } => *first,
        }
    }
}

/// Errors raised while building the image catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Unsupported channel count {0}, expected 1 to 4")]
    UnsupportedChannelCount(u8),
}
