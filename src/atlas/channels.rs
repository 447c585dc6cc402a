//! Conversion between interleaved 8-bit pixel layouts.
//!
//! Channel counts follow the usual meaning: 1 gray, 2 gray+alpha, 3 RGB,
//! 4 RGBA. Widening broadcasts gray into each color channel and fills a new
//! alpha channel with full opacity. Narrowing drops trailing channels.

const OPAQUE: u8 = u8::MAX;

/// Returns true if converting `native` channels to `target` discards data.
pub fn is_lossy(native: u8, target: u8) -> bool {
    native > target || (native == 2 && target == 3)
}

/// Convert a whole pixel buffer from `native` to `target` channels.
pub fn normalize(pixels: Vec<u8>, native: u8, target: u8) -> Vec<u8> {
    if native == target {
        return pixels;
    }

    let (native, target) = (usize::from(native), usize::from(target));
    let pixel_count = pixels.len() / native;
    let mut out = vec![0u8; pixel_count * target];

    for (src, dst) in pixels
        .chunks_exact(native)
        .zip(out.chunks_exact_mut(target))
    {
        convert_pixel(src, dst);
    }

    out
}

fn convert_pixel(src: &[u8], dst: &mut [u8]) {
    match (src.len(), dst.len()) {
        (1, 2) => {
            dst[0] = src[0];
            dst[1] = OPAQUE;
        }
        (1, 3) | (2, 3) => dst.fill(src[0]),
        (1, 4) => {
            dst[..3].fill(src[0]);
            dst[3] = OPAQUE;
        }
        (2, 4) => {
            dst[..3].fill(src[0]);
            dst[3] = src[1];
        }
        (3, 4) => {
            dst[..3].copy_from_slice(src);
            dst[3] = OPAQUE;
        }
        (native, target) => {
            let kept = native.min(target);
            dst[..kept].copy_from_slice(&src[..kept]);
        }
    }
}
