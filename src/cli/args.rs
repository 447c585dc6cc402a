use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "texpack")]
#[command(
    version,
    about = "Packs folders of textures into fixed-size texture atlases",
    long_about = None
)]
pub struct CliArgs {
    /// Directories to include in the texture atlas
    #[arg(short = 'd', long = "directory", value_name = "DIR", num_args = 1.., required_unless_present = "config")]
    pub directories: Vec<PathBuf>,

    /// Load settings from a JSON config file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Atlas texture side length, atlases are SxS pixels [default: 1024]
    #[arg(short, long, value_name = "S")]
    pub size: Option<u32>,

    /// Output directory for atlas images [default: .]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Atlas file name template, {index} is the 1-based atlas number [default: atlas-{index:02}.{ext}]
    #[arg(long, value_name = "TEMPLATE")]
    pub name_format: Option<String>,

    /// Output image format [default: png]
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Manifest output path [default: ./atlas.json]
    #[arg(short, long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Write absolute atlas image paths into the manifest
    #[arg(long)]
    pub absolute_bin_paths: bool,

    /// Keep file extensions in manifest image keys
    #[arg(long)]
    pub include_extensions: bool,

    /// Packing heuristic to use [default: best-short-side-fit]
    #[arg(long, value_enum)]
    pub heuristic: Option<PackingHeuristic>,

    /// Compress PNG output (0-6 or 'max'). Default level is 2 if flag is present without value.
    #[arg(long, value_name = "LEVEL", default_missing_value = "2", num_args = 0..=1)]
    pub compress: Option<CompressionLevel>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Atlas image file format
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Png,
    Bmp,
    Tga,
    Jpg,
}

impl OutputFormat {
    /// Largest channel count the format can store.
    pub fn max_channels(self) -> u8 {
        match self {
            OutputFormat::Png | OutputFormat::Tga => 4,
            OutputFormat::Bmp | OutputFormat::Jpg => 3,
        }
    }

    /// Whether the format can store `channels` interleaved 8-bit channels.
    pub fn supports_channels(self, channels: u8) -> bool {
        match self {
            OutputFormat::Jpg => channels == 1 || channels == 3,
            _ => (1..=self.max_channels()).contains(&channels),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Tga => "tga",
            OutputFormat::Jpg => "jpg",
        }
    }

    pub fn image_format(self) -> image::ImageFormat {
        match self {
            OutputFormat::Png => image::ImageFormat::Png,
            OutputFormat::Bmp => image::ImageFormat::Bmp,
            OutputFormat::Tga => image::ImageFormat::Tga,
            OutputFormat::Jpg => image::ImageFormat::Jpeg,
        }
    }

    /// Parse a format name as written in config files.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "png" => Some(OutputFormat::Png),
            "bmp" => Some(OutputFormat::Bmp),
            "tga" => Some(OutputFormat::Tga),
            "jpg" | "jpeg" => Some(OutputFormat::Jpg),
            _ => None,
        }
    }
}

/// PNG compression level (0-6 or max)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionLevel {
    /// Optimization level 0-6
    Level(u8),
    /// Maximum compression
    Max,
}

impl std::str::FromStr for CompressionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("max") {
            Ok(CompressionLevel::Max)
        } else {
            s.parse::<u8>()
                .map_err(|_e| format!("invalid compression level: {}", s))
                .and_then(|n| {
                    if n <= 6 {
                        Ok(CompressionLevel::Level(n))
                    } else {
                        Err(format!("compression level must be 0-6 or 'max', got {}", n))
                    }
                })
        }
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        CompressionLevel::Level(2)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum PackingHeuristic {
    /// Best Short Side Fit - minimizes the shorter leftover side
    #[default]
    #[value(name = "best-short-side-fit")]
    BestShortSideFit,
    /// Best Long Side Fit - minimizes the longer leftover side
    #[value(name = "best-long-side-fit")]
    BestLongSideFit,
    /// Best Area Fit - picks the smallest free rectangle
    #[value(name = "best-area-fit")]
    BestAreaFit,
    /// Bottom Left - Tetris-style packing
    #[value(name = "bottom-left")]
    BottomLeft,
    /// Contact Point - maximizes contact with placed rectangles and bin edges
    #[value(name = "contact-point")]
    ContactPoint,
    /// Best - tries all heuristics for every atlas and keeps the fullest result
    #[value(name = "best")]
    Best,
}

impl PackingHeuristic {
    /// Parse a heuristic name as written in config files.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "best-short-side-fit" => Some(PackingHeuristic::BestShortSideFit),
            "best-long-side-fit" => Some(PackingHeuristic::BestLongSideFit),
            "best-area-fit" => Some(PackingHeuristic::BestAreaFit),
            "bottom-left" => Some(PackingHeuristic::BottomLeft),
            "contact-point" => Some(PackingHeuristic::ContactPoint),
            "best" => Some(PackingHeuristic::Best),
            _ => None,
        }
    }
}
