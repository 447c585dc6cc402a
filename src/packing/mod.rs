mod maxrects;
mod packer;
mod rect;

pub use maxrects::MaxRectsPacker;
pub use packer::{BinPacker, PackResult};
pub use rect::Rect;

use crate::catalog::ImageId;

/// The footprint of one image, as handed to the packer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rectangle {
    pub id: ImageId,
    pub width: u32,
    pub height: u32,
}

impl Rectangle {
    pub fn new(id: ImageId, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Where a rectangle landed: bin index and top-left corner inside that bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub bin: usize,
    pub x: u32,
    pub y: u32,
}

/// A rectangle together with its placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedRect {
    pub id: ImageId,
    pub placement: Placement,
    pub width: u32,
    pub height: u32,
}

impl PlacedRect {
    /// The occupied region in bin coordinates.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.placement.x,
            self.placement.y,
            self.width,
            self.height,
        )
    }
}

/// Final placements indexed by [`ImageId`].
///
/// A slot is written at most once; images without a slot were not packed.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    slots: Vec<Option<PlacedRect>>,
    bin_count: usize,
}

impl Layout {
    /// Empty layout for `image_count` images spread over `bin_count` bins.
    pub fn new(image_count: usize, bin_count: usize) -> Self {
        Self {
            slots: vec![None; image_count],
            bin_count,
        }
    }

    /// Record a placement. Returns false, leaving the layout untouched, if
    /// the image is unknown or already placed.
    pub fn assign(&mut self, placed: PlacedRect) -> bool {
        match self.slots.get_mut(placed.id.0) {
            Some(slot) if slot.is_none() => {
                *slot = Some(placed);
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, id: ImageId) -> Option<&PlacedRect> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Placed images in [`ImageId`] order.
    pub fn iter(&self) -> impl Iterator<Item = &PlacedRect> {
        self.slots.iter().flatten()
    }

    pub fn bin_count(&self) -> usize {
        self.bin_count
    }

    /// Placed images grouped by bin, each group in [`ImageId`] order.
    pub fn by_bin(&self) -> Vec<Vec<PlacedRect>> {
        let mut bins = vec![Vec::new(); self.bin_count];
        for placed in self.iter() {
            if let Some(bin) = bins.get_mut(placed.placement.bin) {
                bin.push(*placed);
            }
        }
        bins
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placed(id: usize, bin: usize, x: u32, y: u32) -> PlacedRect {
        PlacedRect {
            id: ImageId(id),
            placement: Placement { bin, x, y },
            width: 8,
            height: 8,
        }
    }

    #[test]
    fn test_layout_assign_once() {
        let mut layout = Layout::new(2, 1);
        assert!(layout.assign(placed(1, 0, 0, 0)));
        assert!(!layout.assign(placed(1, 0, 8, 0)));
        assert!(!layout.assign(placed(5, 0, 0, 0)));

        assert_eq!(layout.get(ImageId(1)).map(|p| p.placement.x), Some(0));
        assert!(layout.get(ImageId(0)).is_none());
        assert_eq!(layout.iter().count(), 1);
    }

    #[test]
    fn test_layout_by_bin() {
        let mut layout = Layout::new(3, 2);
        layout.assign(placed(2, 0, 0, 0));
        layout.assign(placed(0, 1, 0, 0));
        layout.assign(placed(1, 0, 8, 0));

        let bins = layout.by_bin();
        assert_eq!(bins.len(), 2);
        let ids: Vec<_> = bins[0].iter().map(|p| p.id).collect();
        assert_eq!(ids, [ImageId(1), ImageId(2)]);
        assert_eq!(bins[1][0].id, ImageId(0));
    }
}
