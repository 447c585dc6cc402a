use log::{debug, info};
use rayon::prelude::*;

use super::{Bin, channels};
use crate::catalog::{CatalogImage, ImageCatalog, ImageId};
use crate::codec::ImageCodec;
use crate::error::{AtlasError, PackingError};
use crate::packing::{Layout, PlacedRect};
use crate::report::{ImageIssue, RunContext};

/// Copies decoded images into their bins.
pub struct Compositor {
    pub bin_size: u32,
    pub channels: u8,
}

/// Filled bins and the images that made it into them
#[derive(Debug)]
pub struct Composite {
    pub bins: Vec<Bin>,
    /// Composited images in id order
    pub composited: Vec<ImageId>,
}

impl Compositor {
    pub fn new(bin_size: u32, channels: u8) -> Self {
        Self { bin_size, channels }
    }

    /// Decode every placed image and write it into its bin.
    ///
    /// Bins are filled in parallel, and the images of one bin are decoded in
    /// parallel before being copied in by the worker that owns the bin.
    /// Images that fail to decode or changed size since discovery are
    /// reported to `ctx` and left out; the layout itself must be sound.
    pub fn composite(
        &self,
        catalog: &ImageCatalog,
        layout: &Layout,
        codec: &impl ImageCodec,
        ctx: &RunContext,
    ) -> Result<Composite, AtlasError> {
        let groups = self.check_layout(layout, catalog)?;

        let mut bins = (0..layout.bin_count())
            .map(|index| Bin::new(index, self.bin_size, self.channels))
            .collect::<Result<Vec<_>, _>>()?;

        let per_bin = bins
            .par_iter_mut()
            .zip(groups.par_iter())
            .map(|(bin, group)| self.fill_bin(bin, group, catalog, codec, ctx))
            .collect::<Result<Vec<_>, PackingError>>()?;

        let mut composited: Vec<ImageId> = per_bin.into_iter().flatten().collect();
        composited.sort_unstable();

        info!(
            "Composited {} images into {} atlas(es)",
            composited.len(),
            bins.len()
        );

        Ok(Composite { bins, composited })
    }

    /// Every placement must name a catalog image, lie inside one of the
    /// layout's bins and be disjoint from every other placement in that bin.
    /// Returns the placements grouped by bin.
    fn check_layout(
        &self,
        layout: &Layout,
        catalog: &ImageCatalog,
    ) -> Result<Vec<Vec<PlacedRect>>, PackingError> {
        for placed in layout.iter() {
            if catalog.get(placed.id).is_none() {
                return Err(PackingError::UnknownImage { id: placed.id });
            }
            if placed.placement.bin >= layout.bin_count()
                || !placed.rect().fits_in_square(self.bin_size)
            {
                return Err(PackingError::PlacementOutOfBounds {
                    id: placed.id,
                    bin: placed.placement.bin,
                    x: placed.placement.x,
                    y: placed.placement.y,
                    width: placed.width,
                    height: placed.height,
                    bin_size: self.bin_size,
                });
            }
        }

        let groups = layout.by_bin();
        for (bin, group) in groups.iter().enumerate() {
            let mut sorted: Vec<&PlacedRect> = group.iter().collect();
            sorted.sort_by_key(|p| (p.placement.x, p.id));

            for (i, a) in sorted.iter().enumerate() {
                let region = a.rect();
                for b in &sorted[i + 1..] {
                    if u64::from(b.placement.x) >= region.right() {
                        break;
                    }
                    if region.intersects(&b.rect()) {
                        return Err(PackingError::OverlappingPlacements {
                            first: a.id,
                            second: b.id,
                            bin,
                        });
                    }
                }
            }
        }

        Ok(groups)
    }

    fn fill_bin(
        &self,
        bin: &mut Bin,
        group: &[PlacedRect],
        catalog: &ImageCatalog,
        codec: &impl ImageCodec,
        ctx: &RunContext,
    ) -> Result<Vec<ImageId>, PackingError> {
        let prepared = group
            .par_iter()
            .map(|placed| {
                let image = catalog
                    .get(placed.id)
                    .ok_or(PackingError::UnknownImage { id: placed.id })?;
                Ok(self
                    .prepare(image, codec, ctx)
                    .map(|pixels| (*placed, pixels)))
            })
            .collect::<Result<Vec<_>, PackingError>>()?;

        let mut done = Vec::with_capacity(prepared.len());
        for (placed, pixels) in prepared.into_iter().flatten() {
            bin.blit(&placed, &pixels)?;
            debug!(
                "Bin {}: {} at ({}, {})",
                bin.index, placed.id, placed.placement.x, placed.placement.y
            );
            done.push(placed.id);
        }

        Ok(done)
    }

    /// Decode `image` and convert it to the bin channel depth.
    fn prepare(
        &self,
        image: &CatalogImage,
        codec: &impl ImageCodec,
        ctx: &RunContext,
    ) -> Option<Vec<u8>> {
        let native = image.channels.get();

        let decoded = match codec.decode(&image.path, native) {
            Ok(decoded) => decoded,
            Err(e) => {
                ctx.report(&image.path, ImageIssue::Decode(e.to_string()));
                return None;
            }
        };

        if decoded.width != image.width || decoded.height != image.height {
            ctx.report(
                &image.path,
                ImageIssue::DimensionDrift {
                    expected_width: image.width,
                    expected_height: image.height,
                    actual_width: decoded.width,
                    actual_height: decoded.height,
                },
            );
            return None;
        }

        let expected_len = image.width as usize * image.height as usize * usize::from(native);
        if decoded.channels != native || decoded.pixels.len() != expected_len {
            ctx.report(
                &image.path,
                ImageIssue::Decode(format!(
                    "expected {} bytes of {}-channel pixels, got {} bytes of {}-channel pixels",
                    expected_len,
                    native,
                    decoded.pixels.len(),
                    decoded.channels
                )),
            );
            return None;
        }

        if channels::is_lossy(native, self.channels) {
            ctx.report(
                &image.path,
                ImageIssue::ChannelTruncation {
                    native,
                    target: self.channels,
                },
            );
        }

        Some(channels::normalize(decoded.pixels, native, self.channels))
    }
}
