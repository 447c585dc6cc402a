use log::debug;

use super::{MaxRectsPacker, Layout, Placement, PlacedRect, Rectangle};
use crate::cli::PackingHeuristic;
use crate::error::PackingError;

/// All concrete heuristics to try when using "Best" mode
const ALL_HEURISTICS: [PackingHeuristic; 5] = [
    PackingHeuristic::BestShortSideFit,
    PackingHeuristic::BestLongSideFit,
    PackingHeuristic::BestAreaFit,
    PackingHeuristic::BottomLeft,
    PackingHeuristic::ContactPoint,
];

/// Packs rectangles into as many `bin_size`x`bin_size` bins as needed.
pub struct BinPacker {
    pub bin_size: u32,
    pub heuristic: PackingHeuristic,
}

/// Outcome of packing a rectangle set.
#[derive(Debug, Default)]
pub struct PackResult {
    /// One entry per placed rectangle, in bin order then packing order
    pub placements: Vec<PlacedRect>,
    /// Number of bins opened
    pub bin_count: usize,
    /// Rectangles that were not placed, and why
    pub rejected: Vec<PackingError>,
    /// Fill ratio of each bin
    pub occupancy: Vec<f64>,
}

impl PackResult {
    /// Placements indexed by image id, for a catalog of `image_count` images.
    pub fn layout(&self, image_count: usize) -> Layout {
        let mut layout = Layout::new(image_count, self.bin_count);
        for placed in &self.placements {
            layout.assign(*placed);
        }
        layout
    }
}

/// Result of filling one bin
struct Round {
    heuristic: PackingHeuristic,
    placed: Vec<PlacedRect>,
    carried: Vec<Rectangle>,
    used_area: u64,
    occupancy: f64,
}

impl Round {
    /// Priority: 1) more rectangles placed, 2) more area covered.
    /// Ties keep the earlier heuristic.
    fn is_better_than(&self, other: &Round) -> bool {
        if self.placed.len() != other.placed.len() {
            return self.placed.len() > other.placed.len();
        }
        self.used_area > other.used_area
    }
}

impl BinPacker {
    pub fn new(bin_size: u32) -> Self {
        Self {
            bin_size,
            heuristic: PackingHeuristic::BestShortSideFit,
        }
    }

    pub fn heuristic(mut self, heuristic: PackingHeuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    /// Place every rectangle that can be placed.
    ///
    /// Rectangles are packed largest area first, ties in id order, so the
    /// result does not depend on the order of `rectangles`. Each round fills
    /// one fresh bin; what does not fit is carried into the next round.
    /// Zero-area and oversized rectangles are rejected up front.
    pub fn pack(&self, rectangles: &[Rectangle]) -> PackResult {
        let mut result = PackResult::default();
        let mut remaining = Vec::with_capacity(rectangles.len());

        for rect in rectangles {
            match self.validate(rect) {
                Ok(()) => remaining.push(*rect),
                Err(e) => result.rejected.push(e),
            }
        }

        remaining.sort_by(|a, b| b.area().cmp(&a.area()).then(a.id.cmp(&b.id)));

        while !remaining.is_empty() {
            let bin = result.bin_count;
            let round = self.pack_round(bin, &remaining);

            if round.placed.is_empty() {
                result
                    .rejected
                    .extend(remaining.iter().map(|r| PackingError::NoProgress {
                        id: r.id,
                        width: r.width,
                        height: r.height,
                    }));
                break;
            }

            debug!(
                "Bin {}: placed {}/{} rectangles with {:?} ({:.1}% full)",
                bin,
                round.placed.len(),
                remaining.len(),
                round.heuristic,
                round.occupancy * 100.0
            );

            result.placements.extend(round.placed);
            result.occupancy.push(round.occupancy);
            result.bin_count += 1;
            remaining = round.carried;
        }

        result
    }

    fn validate(&self, rect: &Rectangle) -> Result<(), PackingError> {
        if rect.width == 0 || rect.height == 0 {
            return Err(PackingError::DegenerateRectangle {
                id: rect.id,
                width: rect.width,
                height: rect.height,
            });
        }
        if rect.width > self.bin_size || rect.height > self.bin_size {
            return Err(PackingError::OversizedRectangle {
                id: rect.id,
                width: rect.width,
                height: rect.height,
                bin_size: self.bin_size,
            });
        }
        Ok(())
    }

    fn pack_round(&self, bin: usize, remaining: &[Rectangle]) -> Round {
        if self.heuristic != PackingHeuristic::Best {
            return self.try_round(bin, remaining, self.heuristic);
        }

        let mut best = self.try_round(bin, remaining, ALL_HEURISTICS[0]);
        for &heuristic in &ALL_HEURISTICS[1..] {
            let round = self.try_round(bin, remaining, heuristic);
            if round.is_better_than(&best) {
                best = round;
            }
        }
        best
    }

    fn try_round(&self, bin: usize, remaining: &[Rectangle], heuristic: PackingHeuristic) -> Round {
        let mut packer = MaxRectsPacker::new(self.bin_size, self.bin_size);
        let mut placed = Vec::new();
        let mut carried = Vec::new();

        for rect in remaining {
            match packer.insert(rect.width, rect.height, heuristic) {
                Some(region) => placed.push(PlacedRect {
                    id: rect.id,
                    placement: Placement {
                        bin,
                        x: region.x,
                        y: region.y,
                    },
                    width: rect.width,
                    height: rect.height,
                }),
                None => carried.push(*rect),
            }
        }

        Round {
            heuristic,
            placed,
            carried,
            used_area: packer.used_area(),
            occupancy: packer.occupancy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ImageId;

    fn rects(sizes: &[(u32, u32)]) -> Vec<Rectangle> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, &(w, h))| Rectangle::new(ImageId(i), w, h))
            .collect()
    }

    /// Deterministic pseudo-random sizes in `1..=max`.
    fn random_sizes(count: usize, max: u32, seed: u64) -> Vec<(u32, u32)> {
        let mut state = seed;
        let mut next = move || {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            u32::try_from(state >> 33).unwrap() % max + 1
        };
        (0..count).map(|_| (next(), next())).collect()
    }

    fn assert_valid(result: &PackResult, bin_size: u32) {
        for (i, a) in result.placements.iter().enumerate() {
            assert!(a.rect().fits_in_square(bin_size), "{:?} leaves the bin", a);
            assert!(a.placement.bin < result.bin_count);
            for b in &result.placements[i + 1..] {
                if a.placement.bin == b.placement.bin {
                    assert!(!a.rect().intersects(&b.rect()), "{:?} overlaps {:?}", a, b);
                }
            }
        }
    }

    #[test]
    fn test_every_rectangle_placed_without_overlap() {
        let input = rects(&random_sizes(300, 200, 7));
        for heuristic in ALL_HEURISTICS.into_iter().chain([PackingHeuristic::Best]) {
            let result = BinPacker::new(256).heuristic(heuristic).pack(&input);

            assert!(result.rejected.is_empty());
            assert_eq!(result.placements.len(), input.len());
            assert_valid(&result, 256);

            let layout = result.layout(input.len());
            assert!(input.iter().all(|r| layout.get(r.id).is_some()));
        }
    }

    #[test]
    fn test_deterministic() {
        let input = rects(&random_sizes(120, 90, 42));
        let packer = BinPacker::new(128).heuristic(PackingHeuristic::Best);

        let first = packer.pack(&input);
        let second = packer.pack(&input);
        assert_eq!(first.placements, second.placements);
        assert_eq!(first.bin_count, second.bin_count);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let input = rects(&random_sizes(80, 60, 3));
        let mut reversed = input.clone();
        reversed.reverse();

        let packer = BinPacker::new(100);
        let mut a = packer.pack(&input).placements;
        let mut b = packer.pack(&reversed).placements;
        a.sort_by_key(|p| p.id);
        b.sort_by_key(|p| p.id);
        assert_eq!(a, b);
    }

    #[test]
    fn test_full_size_rectangles_one_per_bin() {
        let input = rects(&[(64, 64); 5]);
        let result = BinPacker::new(64).pack(&input);

        assert_eq!(result.bin_count, 5);
        let mut bins: Vec<_> = result.placements.iter().map(|p| p.placement.bin).collect();
        bins.sort_unstable();
        assert_eq!(bins, [0, 1, 2, 3, 4]);
        assert!(
            result
                .placements
                .iter()
                .all(|p| p.placement.x == 0 && p.placement.y == 0)
        );
    }

    #[test]
    fn test_oversized_rejected() {
        let input = rects(&[(65, 10), (10, 65), (64, 64)]);
        let result = BinPacker::new(64).pack(&input);

        assert_eq!(result.placements.len(), 1);
        assert_eq!(result.placements[0].id, ImageId(2));
        assert_eq!(
            result.rejected,
            vec![
                PackingError::OversizedRectangle {
                    id: ImageId(0),
                    width: 65,
                    height: 10,
                    bin_size: 64
                },
                PackingError::OversizedRectangle {
                    id: ImageId(1),
                    width: 10,
                    height: 65,
                    bin_size: 64
                },
            ]
        );
    }

    #[test]
    fn test_degenerate_rejected() {
        let input = rects(&[(0, 10), (10, 0), (4, 4)]);
        let result = BinPacker::new(64).pack(&input);

        assert_eq!(result.placements.len(), 1);
        assert_eq!(result.rejected.len(), 2);
        assert!(
            result
                .rejected
                .iter()
                .all(|e| matches!(e, PackingError::DegenerateRectangle { .. }))
        );
    }

    #[test]
    fn test_zero_bin_size_terminates() {
        let input = rects(&[(1, 1), (2, 2)]);
        let result = BinPacker::new(0).pack(&input);

        assert_eq!(result.bin_count, 0);
        assert!(result.placements.is_empty());
        assert_eq!(result.rejected.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let result = BinPacker::new(64).pack(&[]);
        assert_eq!(result.bin_count, 0);
        assert!(result.placements.is_empty());
        assert!(result.rejected.is_empty());
    }

    #[test]
    fn test_large_image_gets_own_bin() {
        // A(64x64), B(1024x1024), C(64x64) in discovery order
        let input = rects(&[(64, 64), (1024, 1024), (64, 64)]);
        let result = BinPacker::new(1024).pack(&input);

        assert_eq!(result.bin_count, 2);
        let layout = result.layout(3);
        let b = layout.get(ImageId(1)).unwrap();
        assert_eq!(b.placement, Placement { bin: 0, x: 0, y: 0 });

        let a = layout.get(ImageId(0)).unwrap();
        let c = layout.get(ImageId(2)).unwrap();
        assert_eq!(a.placement.bin, 1);
        assert_eq!(c.placement.bin, 1);
        assert!(!a.rect().intersects(&c.rect()));
    }

    #[test]
    fn test_occupancy_per_bin() {
        let input = rects(&[(50, 50); 4]);
        let result = BinPacker::new(100).pack(&input);

        assert_eq!(result.bin_count, 1);
        assert!((result.occupancy[0] - 1.0).abs() < 1e-9);
    }
}
