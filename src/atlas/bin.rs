use crate::error::{AtlasError, PackingError};
use crate::packing::PlacedRect;

/// One square atlas canvas and its pixel buffer
#[derive(Debug)]
pub struct Bin {
    /// Bin index, in the order the packer opened bins
    pub index: usize,
    /// Side length in pixels
    pub size: u32,
    /// Channels per pixel
    pub channels: u8,
    pixels: Vec<u8>,
}

impl Bin {
    /// Allocate a zeroed `size`x`size` canvas.
    ///
    /// Fails with [`AtlasError::BinTooLarge`] if the buffer size overflows or
    /// the allocator refuses it.
    pub fn new(index: usize, size: u32, channels: u8) -> Result<Self, AtlasError> {
        let too_large = || AtlasError::BinTooLarge { size, channels };
        let side = size as usize;
        let bytes = side
            .checked_mul(side)
            .and_then(|n| n.checked_mul(usize::from(channels)))
            .ok_or_else(too_large)?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(bytes)
            .map_err(|_e| too_large())?;
        pixels.resize(bytes, 0);

        Ok(Self {
            index,
            size,
            channels,
            pixels,
        })
    }

    /// Bytes per row of the canvas
    pub fn row_stride(&self) -> usize {
        self.size as usize * usize::from(self.channels)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// The channels of the pixel at `(x, y)`
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.size || y >= self.size {
            return None;
        }
        let channels = usize::from(self.channels);
        let start = self.row_stride() * y as usize + channels * x as usize;
        self.pixels.get(start..start + channels)
    }

    /// Copy `pixels`, already at this bin's channel depth, into the region of
    /// `placed`.
    ///
    /// Row `r` of the source lands at byte
    /// `row_stride * (y + r) + channels * x`.
    pub fn blit(&mut self, placed: &PlacedRect, pixels: &[u8]) -> Result<(), PackingError> {
        let (index, size) = (self.index, self.size);
        let out_of_bounds = || PackingError::PlacementOutOfBounds {
            id: placed.id,
            bin: index,
            x: placed.placement.x,
            y: placed.placement.y,
            width: placed.width,
            height: placed.height,
            bin_size: size,
        };

        if placed.placement.bin != index || !placed.rect().fits_in_square(size) {
            return Err(out_of_bounds());
        }

        let channels = usize::from(self.channels);
        let row_bytes = placed.width as usize * channels;
        let row_stride = self.row_stride();
        let x_offset = placed.placement.x as usize * channels;
        let y = placed.placement.y as usize;

        if pixels.len() != row_bytes * placed.height as usize {
            return Err(out_of_bounds());
        }
        if row_bytes == 0 {
            return Ok(());
        }

        for (row, source) in pixels.chunks_exact(row_bytes).enumerate() {
            let start = row_stride * (y + row) + x_offset;
            let dest = self
                .pixels
                .get_mut(start..start + row_bytes)
                .ok_or_else(out_of_bounds)?;
            dest.copy_from_slice(source);
        }

        Ok(())
    }
}
