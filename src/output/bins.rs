use std::path::{Path, PathBuf};

use log::info;

use super::NameTemplate;
use crate::atlas::Bin;
use crate::cli::OutputFormat;
use crate::codec::ImageCodec;
use crate::error::AtlasError;

/// Where atlas images go and how the manifest refers to them
pub struct BinOutput<'a> {
    pub directory: &'a Path,
    pub template: &'a NameTemplate,
    pub format: OutputFormat,
    /// Record absolute paths in the manifest instead of file names
    pub absolute_paths: bool,
}

/// Encode every bin and return the manifest name of each, in bin order.
///
/// The first bin that cannot be written aborts the run.
pub fn write_bins(
    bins: &[Bin],
    output: &BinOutput<'_>,
    codec: &impl ImageCodec,
) -> Result<Vec<String>, AtlasError> {
    if !output.directory.is_dir() {
        return Err(AtlasError::OutputDirectory {
            path: output.directory.to_path_buf(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
    }

    let mut names = Vec::with_capacity(bins.len());
    for bin in bins {
        let file_name = output.template.render(bin.index, output.format.extension());
        let path = output.directory.join(&file_name);

        codec
            .encode(
                output.format,
                &path,
                bin.pixels(),
                bin.channels,
                bin.size,
                bin.size,
            )
            .map_err(|e| AtlasError::BinWrite {
                path: path.clone(),
                source: e,
            })?;
        info!("Saved {}", path.display());

        names.push(if output.absolute_paths {
            absolute(&path).to_string_lossy().into_owned()
        } else {
            file_name
        });
    }

    Ok(names)
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ImageCrateCodec;

    #[test]
    fn test_write_bins_names() {
        let dir = tempfile::tempdir().unwrap();
        let bins = vec![Bin::new(0, 4, 3).unwrap(), Bin::new(1, 4, 3).unwrap()];
        let template = NameTemplate::default();
        let output = BinOutput {
            directory: dir.path(),
            template: &template,
            format: OutputFormat::Png,
            absolute_paths: false,
        };

        let names = write_bins(&bins, &output, &ImageCrateCodec::new()).unwrap();

        assert_eq!(names, ["atlas-01.png", "atlas-02.png"]);
        assert!(dir.path().join("atlas-01.png").is_file());
        assert!(dir.path().join("atlas-02.png").is_file());
    }

    #[test]
    fn test_write_bins_absolute_paths() {
        let dir = tempfile::tempdir().unwrap();
        let bins = vec![Bin::new(0, 2, 3).unwrap()];
        let template = NameTemplate::parse("page{index}.{ext}").unwrap();
        let output = BinOutput {
            directory: dir.path(),
            template: &template,
            format: OutputFormat::Bmp,
            absolute_paths: true,
        };

        let names = write_bins(&bins, &output, &ImageCrateCodec::new()).unwrap();

        assert!(Path::new(&names[0]).is_absolute());
        assert!(names[0].ends_with("page1.bmp"));
    }

    #[test]
    fn test_missing_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let template = NameTemplate::default();
        let output = BinOutput {
            directory: &missing,
            template: &template,
            format: OutputFormat::Png,
            absolute_paths: false,
        };

        let result = write_bins(&[], &output, &ImageCrateCodec::new());
        assert!(matches!(result, Err(AtlasError::OutputDirectory { .. })));
    }
}
