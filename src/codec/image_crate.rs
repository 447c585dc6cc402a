use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, ImageDecoder, ImageReader};

use super::{CodecError, DecodedImage, ImageCodec, ImageInfo};
use crate::cli::{CompressionLevel, OutputFormat};

const JPEG_QUALITY: u8 = 100;

/// Codec backed by the `image` crate, with optional oxipng recompression
/// for PNG output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateCodec {
    compress: Option<CompressionLevel>,
}

impl ImageCrateCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compress(mut self, compress: Option<CompressionLevel>) -> Self {
        self.compress = compress;
        self
    }

    fn open(path: &Path) -> Result<ImageReader<std::io::BufReader<fs::File>>, CodecError> {
        ImageReader::open(path)
            .and_then(ImageReader::with_guessed_format)
            .map_err(|e| CodecError::Open {
                path: path.to_path_buf(),
                source: e,
            })
    }
}

fn color_type_for(channels: u8) -> Result<ColorType, CodecError> {
    match channels {
        1 => Ok(ColorType::L8),
        2 => Ok(ColorType::La8),
        3 => Ok(ColorType::Rgb8),
        4 => Ok(ColorType::Rgba8),
        n => Err(CodecError::UnsupportedChannels(n)),
    }
}

impl ImageCodec for ImageCrateCodec {
    fn probe(&self, path: &Path) -> Result<ImageInfo, CodecError> {
        let decoder = Self::open(path)?.into_decoder()?;
        let (width, height) = decoder.dimensions();

        Ok(ImageInfo {
            width,
            height,
            channels: decoder.color_type().channel_count(),
        })
    }

    fn decode(&self, path: &Path, requested_channels: u8) -> Result<DecodedImage, CodecError> {
        let img = Self::open(path)?.decode()?;
        let (width, height) = (img.width(), img.height());

        // Higher bit depths are narrowed to 8 bits per channel here.
        let pixels = match requested_channels {
            1 => img.into_luma8().into_raw(),
            2 => img.into_luma_alpha8().into_raw(),
            3 => img.into_rgb8().into_raw(),
            4 => img.into_rgba8().into_raw(),
            n => return Err(CodecError::UnsupportedChannels(n)),
        };

        Ok(DecodedImage {
            width,
            height,
            channels: requested_channels,
            pixels,
        })
    }

    fn encode(
        &self,
        format: OutputFormat,
        path: &Path,
        pixels: &[u8],
        channels: u8,
        width: u32,
        height: u32,
    ) -> Result<(), CodecError> {
        let color = color_type_for(channels)?;

        let mut encoded = Cursor::new(Vec::new());
        match format {
            OutputFormat::Jpg => {
                JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY).encode(
                    pixels,
                    width,
                    height,
                    color.into(),
                )?;
            }
            _ => image::write_buffer_with_format(
                &mut encoded,
                pixels,
                width,
                height,
                color,
                format.image_format(),
            )?,
        }

        let output_data = match (format, self.compress) {
            (OutputFormat::Png, Some(level)) => {
                let opts = match level {
                    CompressionLevel::Level(n) => oxipng::Options::from_preset(n),
                    CompressionLevel::Max => oxipng::Options::max_compression(),
                };
                oxipng::optimize_from_memory(&encoded.into_inner(), &opts)
                    .map_err(|e| CodecError::Compress(e.to_string()))?
            }
            _ => encoded.into_inner(),
        };

        fs::write(path, output_data).map_err(|e| CodecError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
