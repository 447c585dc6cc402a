use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::{ImageCatalog, ImageId};
use crate::error::AtlasError;
use crate::packing::Layout;

pub const MANIFEST_VERSION: u32 = 1;

/// Where every composited image ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    #[serde(rename = "bin-textures")]
    pub bin_textures: Vec<String>,
    /// Keyed by atlas key
    pub images: BTreeMap<String, ManifestImage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestImage {
    pub bin: usize,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Manifest {
    /// Collect the entries of `composited` images.
    ///
    /// Images that were not placed or not composited have no entry.
    pub fn build(
        bin_textures: Vec<String>,
        catalog: &ImageCatalog,
        layout: &Layout,
        composited: &[ImageId],
    ) -> Self {
        let images = composited
            .iter()
            .filter_map(|&id| {
                let image = catalog.get(id)?;
                let placed = layout.get(id)?;
                Some((
                    image.atlas_key.clone(),
                    ManifestImage {
                        bin: placed.placement.bin,
                        x: placed.placement.x,
                        y: placed.placement.y,
                        width: placed.width,
                        height: placed.height,
                    },
                ))
            })
            .collect();

        Self {
            version: MANIFEST_VERSION,
            bin_textures,
            images,
        }
    }
}

/// Write the manifest as pretty-printed JSON
pub fn write_manifest(manifest: &Manifest, path: &Path) -> Result<(), AtlasError> {
    let content = serde_json::to_string_pretty(manifest)?;

    fs::write(path, content).map_err(|e| AtlasError::ManifestWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
