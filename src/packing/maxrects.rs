use super::Rect;
use super::rect::common_interval;
use crate::cli::PackingHeuristic;

/// MaxRects packer for a single bin
pub struct MaxRectsPacker {
    bin_width: u32,
    bin_height: u32,
    free_rects: Vec<Rect>,
    used_rects: Vec<Rect>,
    used_area: u64,
}

impl MaxRectsPacker {
    pub fn new(width: u32, height: u32) -> Self {
        let initial_rect = Rect::new(0, 0, width, height);
        Self {
            bin_width: width,
            bin_height: height,
            free_rects: vec![initial_rect],
            used_rects: Vec::new(),
            used_area: 0,
        }
    }

    /// Try to insert a rectangle with the given dimensions
    /// Returns the placed rectangle if successful
    ///
    /// `PackingHeuristic::Best` is resolved by the caller; here it scores
    /// like best-short-side-fit.
    pub fn insert(&mut self, width: u32, height: u32, heuristic: PackingHeuristic) -> Option<Rect> {
        if width == 0 || height == 0 {
            return None;
        }
        let best_rect = self.find_position(width, height, heuristic)?;
        self.place_rect(best_rect);
        Some(best_rect)
    }

    fn find_position(&self, width: u32, height: u32, heuristic: PackingHeuristic) -> Option<Rect> {
        let mut best_score = (i64::MAX, i64::MAX);
        let mut best_rect = None;

        for free_rect in &self.free_rects {
            if width <= free_rect.width && height <= free_rect.height {
                let score = self.score_rect(free_rect, width, height, heuristic);
                if score < best_score {
                    best_score = score;
                    best_rect = Some(Rect::new(free_rect.x, free_rect.y, width, height));
                }
            }
        }

        best_rect
    }

    fn score_rect(
        &self,
        free_rect: &Rect,
        width: u32,
        height: u32,
        heuristic: PackingHeuristic,
    ) -> (i64, i64) {
        let leftover_h = i64::from(free_rect.width - width);
        let leftover_v = i64::from(free_rect.height - height);

        match heuristic {
            PackingHeuristic::BestShortSideFit | PackingHeuristic::Best => {
                let short = leftover_h.min(leftover_v);
                let long = leftover_h.max(leftover_v);
                (short, long)
            }
            PackingHeuristic::BestLongSideFit => {
                let short = leftover_h.min(leftover_v);
                let long = leftover_h.max(leftover_v);
                (long, short)
            }
            PackingHeuristic::BestAreaFit => {
                let area = i64::try_from(free_rect.area()).unwrap_or(i64::MAX);
                (area, leftover_h.min(leftover_v))
            }
            PackingHeuristic::BottomLeft => {
                let top = i64::from(free_rect.y) + i64::from(height);
                (top, i64::from(free_rect.x))
            }
            PackingHeuristic::ContactPoint => {
                let candidate = Rect::new(free_rect.x, free_rect.y, width, height);
                let contact = i64::try_from(self.contact_score(&candidate)).unwrap_or(i64::MAX);
                // Higher contact is better, scores are minimized
                (-contact, i64::from(free_rect.y))
            }
        }
    }

    /// Total edge length `rect` shares with the bin border and placed rectangles
    fn contact_score(&self, rect: &Rect) -> u64 {
        let mut score = 0;

        if rect.x == 0 || rect.right() == u64::from(self.bin_width) {
            score += u64::from(rect.height);
        }
        if rect.y == 0 || rect.bottom() == u64::from(self.bin_height) {
            score += u64::from(rect.width);
        }

        for used in &self.used_rects {
            if used.x == rect.x + rect.width || used.right() == u64::from(rect.x) {
                score += common_interval(
                    u64::from(used.y),
                    used.bottom(),
                    u64::from(rect.y),
                    rect.bottom(),
                );
            }
            if used.y == rect.y + rect.height || used.bottom() == u64::from(rect.y) {
                score += common_interval(
                    u64::from(used.x),
                    used.right(),
                    u64::from(rect.x),
                    rect.right(),
                );
            }
        }

        score
    }

    fn place_rect(&mut self, rect: Rect) {
        let mut new_rects = Vec::new();

        self.free_rects.retain(|free_rect| {
            if !rect.intersects(free_rect) {
                return true;
            }

            // Split the free rectangle around the placed rectangle
            // Left portion
            if rect.x > free_rect.x {
                new_rects.push(Rect::new(
                    free_rect.x,
                    free_rect.y,
                    rect.x - free_rect.x,
                    free_rect.height,
                ));
            }

            // Right portion
            if rect.x + rect.width < free_rect.x + free_rect.width {
                new_rects.push(Rect::new(
                    rect.x + rect.width,
                    free_rect.y,
                    (free_rect.x + free_rect.width) - (rect.x + rect.width),
                    free_rect.height,
                ));
            }

            // Top portion
            if rect.y > free_rect.y {
                new_rects.push(Rect::new(
                    free_rect.x,
                    free_rect.y,
                    free_rect.width,
                    rect.y - free_rect.y,
                ));
            }

            // Bottom portion
            if rect.y + rect.height < free_rect.y + free_rect.height {
                new_rects.push(Rect::new(
                    free_rect.x,
                    rect.y + rect.height,
                    free_rect.width,
                    (free_rect.y + free_rect.height) - (rect.y + rect.height),
                ));
            }

            false
        });

        self.free_rects.extend(new_rects);
        self.prune_free_rects();

        self.used_area += rect.area();
        self.used_rects.push(rect);
    }

    fn prune_free_rects(&mut self) {
        // Remove rectangles that are fully contained within others
        let mut i = 0;
        while i < self.free_rects.len() {
            let mut j = i + 1;
            while j < self.free_rects.len() {
                if self.free_rects[i].contains(&self.free_rects[j]) {
                    self.free_rects.swap_remove(j);
                } else if self.free_rects[j].contains(&self.free_rects[i]) {
                    self.free_rects.swap_remove(i);
                    j = i + 1;
                    continue;
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
    }

    /// Area covered by placed rectangles
    pub fn used_area(&self) -> u64 {
        self.used_area
    }

    /// Get packing efficiency as a ratio (0.0 to 1.0)
    pub fn occupancy(&self) -> f64 {
        let total_area = u64::from(self.bin_width) * u64::from(self.bin_height);
        if total_area == 0 {
            return 0.0;
        }
        self.used_area as f64 / total_area as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONCRETE: [PackingHeuristic; 5] = [
        PackingHeuristic::BestShortSideFit,
        PackingHeuristic::BestLongSideFit,
        PackingHeuristic::BestAreaFit,
        PackingHeuristic::BottomLeft,
        PackingHeuristic::ContactPoint,
    ];

    #[test]
    fn test_single_insert() {
        let mut packer = MaxRectsPacker::new(100, 100);
        let rect = packer
            .insert(50, 50, PackingHeuristic::BestShortSideFit)
            .unwrap();

        assert_eq!(rect.x, 0);
        assert_eq!(rect.y, 0);
        assert_eq!(rect.width, 50);
        assert_eq!(rect.height, 50);
    }

    #[test]
    fn test_multiple_inserts() {
        for heuristic in CONCRETE {
            let mut packer = MaxRectsPacker::new(100, 100);
            let placed: Vec<_> = (0..4)
                .map(|_| packer.insert(50, 50, heuristic).unwrap())
                .collect();

            // All four 50x50 rects should fit in a 100x100 bin
            for (i, a) in placed.iter().enumerate() {
                assert!(a.fits_in_square(100));
                for b in &placed[i + 1..] {
                    assert!(!a.intersects(b), "{:?}: {:?} overlaps {:?}", heuristic, a, b);
                }
            }
        }
    }

    #[test]
    fn test_too_large() {
        let mut packer = MaxRectsPacker::new(100, 100);
        let result = packer.insert(150, 50, PackingHeuristic::BestShortSideFit);
        assert!(result.is_none());
    }

    #[test]
    fn test_zero_area_rejected() {
        let mut packer = MaxRectsPacker::new(100, 100);
        assert!(packer.insert(0, 10, PackingHeuristic::BottomLeft).is_none());
        assert_eq!(packer.used_area(), 0);
    }

    #[test]
    fn test_contact_point_hugs_placed_rects() {
        let mut packer = MaxRectsPacker::new(100, 100);
        packer
            .insert(30, 100, PackingHeuristic::ContactPoint)
            .unwrap();
        let second = packer
            .insert(20, 20, PackingHeuristic::ContactPoint)
            .unwrap();

        assert_eq!(second.x, 30);
    }

    #[test]
    fn test_occupancy() {
        let mut packer = MaxRectsPacker::new(100, 100);
        packer
            .insert(50, 50, PackingHeuristic::BestShortSideFit)
            .unwrap();
        assert!((packer.occupancy() - 0.25).abs() < 1e-9);

        for _ in 0..3 {
            packer
                .insert(50, 50, PackingHeuristic::BestShortSideFit)
                .unwrap();
        }
        assert!((packer.occupancy() - 1.0).abs() < 1e-9);
    }
}
