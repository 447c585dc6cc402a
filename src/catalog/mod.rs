mod discover;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;
use crate::error::CatalogError;
use crate::packing::Rectangle;
use crate::report::ImageIssue;

pub use discover::discover;

/// Index of an image in catalog discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageId(pub usize);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Number of 8-bit channels per pixel, always 1 to 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ChannelCount(u8);

impl ChannelCount {
    pub const MAX: u8 = 4;

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for ChannelCount {
    type Error = CatalogError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (1..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(CatalogError::UnsupportedChannelCount(value))
        }
    }
}

/// What discovery learned about one file, before validation.
#[derive(Debug, Clone)]
pub struct DiscoveredImage {
    pub path: PathBuf,
    pub atlas_key: String,
    pub folder: usize,
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

/// A validated image entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogImage {
    pub id: ImageId,
    /// Absolute source path
    pub path: PathBuf,
    /// Manifest key, unique across the catalog
    pub atlas_key: String,
    /// Index into [`ImageCatalog::folders`]
    pub folder: usize,
    pub width: u32,
    pub height: u32,
    pub channels: ChannelCount,
}

/// Every image of a run, grouped by the source folder it was found in.
///
/// Images keep their discovery order; an image's [`ImageId`] is its position
/// in that order.
#[derive(Debug, Default)]
pub struct ImageCatalog {
    folders: Vec<PathBuf>,
    images: Vec<CatalogImage>,
    keys: HashMap<String, ImageId>,
}

impl ImageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source folder and return its index.
    ///
    /// Folders are stored as absolute paths.
    pub fn add_folder(&mut self, path: impl Into<PathBuf>) -> usize {
        self.folders.push(absolute(path.into()));
        self.folders.len() - 1
    }

    /// Validate and append an image.
    ///
    /// The first image to claim an atlas key keeps it; later claimants are
    /// rejected with [`ImageIssue::DuplicateKey`].
    pub fn add(&mut self, image: DiscoveredImage) -> Result<ImageId, ImageIssue> {
        let channels = ChannelCount::try_from(image.channels)?;

        if let Some(existing) = self.keys.get(&image.atlas_key) {
            return Err(ImageIssue::DuplicateKey {
                key: image.atlas_key,
                kept: self.images[existing.0].path.clone(),
            });
        }

        let id = ImageId(self.images.len());
        self.keys.insert(image.atlas_key.clone(), id);
        self.images.push(CatalogImage {
            id,
            path: image.path,
            atlas_key: image.atlas_key,
            folder: image.folder,
            width: image.width,
            height: image.height,
            channels,
        });

        Ok(id)
    }

    pub fn folders(&self) -> &[PathBuf] {
        &self.folders
    }

    /// Whether `path` names an already registered folder, however spelled.
    pub fn contains_folder(&self, path: &Path) -> bool {
        let path = absolute(path.to_path_buf());
        self.folders.iter().any(|f| *f == path)
    }

    pub fn images(&self) -> &[CatalogImage] {
        &self.images
    }

    pub fn get(&self, id: ImageId) -> Option<&CatalogImage> {
        self.images.get(id.0)
    }

    /// Images discovered in one source folder, in discovery order.
    pub fn images_in(&self, folder: usize) -> impl Iterator<Item = &CatalogImage> {
        self.images.iter().filter(move |i| i.folder == folder)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Channel depth shared by every atlas.
    ///
    /// The widest image decides, capped by what `format` can store. A depth
    /// the format cannot encode (gray+alpha for JPEG) is widened by one.
    pub fn channel_depth(&self, format: OutputFormat) -> u8 {
        let widest = self
            .images
            .iter()
            .map(|i| i.channels.get())
            .max()
            .unwrap_or(1);
        let depth = widest.min(format.max_channels());

        if format.supports_channels(depth) {
            depth
        } else {
            depth + 1
        }
    }

    /// One packing rectangle per image.
    pub fn rectangles(&self) -> Vec<Rectangle> {
        self.images
            .iter()
            .map(|i| Rectangle::new(i.id, i.width, i.height))
            .collect()
    }
}

fn absolute(path: PathBuf) -> PathBuf {
    std::path::absolute(&path).unwrap_or(path)
}
