use std::path::{Component, Path, PathBuf};

use log::{debug, info};
use rayon::prelude::*;

use super::{DiscoveredImage, ImageCatalog};
use crate::codec::ImageCodec;
use crate::error::AtlasError;
use crate::report::{ImageIssue, RunContext};

const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "tga", "webp"];

/// Walk every source folder and build the catalog.
///
/// Folders are visited in the given order and their files in sorted path
/// order, so the same tree always yields the same catalog. A folder listed
/// twice is only walked once. Images the codec cannot probe, images with an
/// unsupported channel count and images whose atlas key is already taken are
/// reported to `ctx` and left out.
pub fn discover(
    folders: &[impl AsRef<Path>],
    include_extensions: bool,
    codec: &impl ImageCodec,
    ctx: &RunContext,
) -> Result<ImageCatalog, AtlasError> {
    let mut catalog = ImageCatalog::new();

    for folder in folders {
        let folder = folder.as_ref();
        if !folder.is_dir() {
            return Err(AtlasError::NotADirectory(folder.to_path_buf()));
        }
        let folder = std::path::absolute(folder).unwrap_or_else(|_| folder.to_path_buf());
        if catalog.contains_folder(&folder) {
            continue;
        }

        let folder_index = catalog.add_folder(&folder);

        let mut paths = Vec::new();
        collect_from_directory(&folder, &mut paths)?;
        paths.sort();

        let probed: Vec<_> = paths
            .par_iter()
            .map(|path| (path, codec.probe(path)))
            .collect();

        for (path, info) in probed {
            let info = match info {
                Ok(info) => info,
                Err(e) => {
                    ctx.report(path, ImageIssue::Unreadable(e.to_string()));
                    continue;
                }
            };

            let absolute = std::path::absolute(path).unwrap_or_else(|_| path.clone());
            let image = DiscoveredImage {
                path: absolute,
                atlas_key: atlas_key(&folder, path, include_extensions),
                folder: folder_index,
                width: info.width,
                height: info.height,
                channels: info.channels,
            };

            if let Err(issue) = catalog.add(image) {
                ctx.report(path, issue);
            }
        }

        info!(
            "Found {} images in {}",
            catalog.images_in(folder_index).count(),
            folder.display()
        );
    }

    Ok(catalog)
}

fn collect_from_directory(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<(), AtlasError> {
    let entries = std::fs::read_dir(dir).map_err(|e| AtlasError::ReadDirectory {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| AtlasError::ReadDirectory {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        let is_symlink = entry.file_type().is_ok_and(|t| t.is_symlink());

        if path.is_dir() {
            // Linked directories can loop back into the tree.
            if is_symlink {
                debug!("Not following linked directory {}", path.display());
                continue;
            }
            collect_from_directory(&path, paths)?;
        } else if path.is_file() {
            if is_supported_image(&path) {
                paths.push(path);
            } else {
                debug!("Ignoring {}", path.display());
            }
        }
    }

    Ok(())
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Manifest key for `path`: its location under `folder`, `/`-separated.
fn atlas_key(folder: &Path, path: &Path, include_extensions: bool) -> String {
    let relative = path.strip_prefix(folder).unwrap_or(path);
    let relative = if include_extensions {
        relative.to_path_buf()
    } else {
        relative.with_extension("")
    };

    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::codec::{CodecError, DecodedImage, ImageInfo};
    use std::fs;

    /// Reads "WxHxC" from the file contents instead of decoding.
    struct TextCodec;

    impl ImageCodec for TextCodec {
        fn probe(&self, path: &Path) -> Result<ImageInfo, CodecError> {
            let text = fs::read_to_string(path).map_err(|e| CodecError::Open {
                path: path.to_path_buf(),
                source: e,
            })?;
            let parts: Vec<u32> = text
                .trim()
                .split('x')
                .filter_map(|p| p.parse().ok())
                .collect();
            match parts.as_slice() {
                [w, h, c] => Ok(ImageInfo {
                    width: *w,
                    height: *h,
                    channels: *c as u8,
                }),
                _ => Err(CodecError::UnsupportedChannels(0)),
            }
        }

        fn decode(&self, _path: &Path, _channels: u8) -> Result<DecodedImage, CodecError> {
            unreachable!("discovery never decodes")
        }

        fn encode(
            &self,
            _format: OutputFormat,
            _path: &Path,
            _pixels: &[u8],
            _channels: u8,
            _width: u32,
            _height: u32,
        ) -> Result<(), CodecError> {
            unreachable!("discovery never encodes")
        }
    }

    fn write(dir: &Path, name: &str, contents: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_atlas_key_strips_extension() {
        let folder = Path::new("/assets");
        let path = Path::new("/assets/ui/button.png");
        assert_eq!(atlas_key(folder, path, false), "ui/button");
        assert_eq!(atlas_key(folder, path, true), "ui/button.png");
    }

    #[test]
    fn test_discover_sorted_and_nested() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.png", "8x8x4");
        write(dir.path(), "a.png", "4x2x3");
        write(dir.path(), "sub/c.png", "1x1x1");
        write(dir.path(), "notes.txt", "ignored");

        let ctx = RunContext::new();
        let catalog = discover(&[dir.path()], false, &TextCodec, &ctx).unwrap();

        let keys: Vec<_> = catalog.images().iter().map(|i| i.atlas_key.as_str()).collect();
        assert_eq!(keys, ["a", "b", "sub/c"]);
        assert_eq!(catalog.images()[0].width, 4);
        assert_eq!(catalog.images()[0].height, 2);
        assert!(catalog.images()[0].path.is_absolute());
        assert!(!ctx.has_diagnostics());
    }

    #[test]
    fn test_discover_duplicate_key_across_folders() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write(first.path(), "hero.png", "8x8x4");
        write(second.path(), "hero.png", "16x16x4");
        write(second.path(), "villain.png", "16x16x4");

        let ctx = RunContext::new();
        let catalog =
            discover(&[first.path(), second.path()], false, &TextCodec, &ctx).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.images()[0].width, 8);
        assert_eq!(catalog.images()[0].folder, 0);
        let diagnostics = ctx.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(
            diagnostics[0].issue,
            ImageIssue::DuplicateKey { .. }
        ));
    }

    #[test]
    fn test_discover_rejects_malformed_channels() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "odd.png", "4x4x5");
        write(dir.path(), "broken.png", "garbage");

        let ctx = RunContext::new();
        let catalog = discover(&[dir.path()], false, &TextCodec, &ctx).unwrap();

        assert!(catalog.is_empty());
        let diagnostics = ctx.diagnostics();
        assert_eq!(diagnostics.len(), 2);
        assert!(
            diagnostics
                .iter()
                .any(|d| matches!(d.issue, ImageIssue::UnsupportedChannels(_)))
        );
        assert!(
            diagnostics
                .iter()
                .any(|d| matches!(d.issue, ImageIssue::Unreadable(_)))
        );
    }

    #[test]
    fn test_discover_same_folder_twice() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.png", "2x2x3");

        let ctx = RunContext::new();
        let catalog = discover(&[dir.path(), dir.path()], false, &TextCodec, &ctx).unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.folders().len(), 1);
        assert!(!ctx.has_diagnostics());
    }

    #[test]
    fn test_discover_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.png", "2x2x3");

        let ctx = RunContext::new();
        let result = discover(&[dir.path().join("a.png")], false, &TextCodec, &ctx);
        assert!(matches!(result, Err(AtlasError::NotADirectory(_))));
    }

    #[test]
    fn test_discover_same_folder_spelled_differently() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.png", "2x2x3");

        let ctx = RunContext::new();
        let folders = [dir.path().to_path_buf(), dir.path().join(".")];
        let catalog = discover(&folders, false, &TextCodec, &ctx).unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.folders().len(), 1);
        assert!(!ctx.has_diagnostics());
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_does_not_follow_linked_directories() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.png", "2x2x3");
        std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).unwrap();

        let ctx = RunContext::new();
        let catalog = discover(&[dir.path()], false, &TextCodec, &ctx).unwrap();

        let keys: Vec<_> = catalog.images().iter().map(|i| i.atlas_key.as_str()).collect();
        assert_eq!(keys, ["a"]);
        assert!(!ctx.has_diagnostics());
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_keeps_linked_files() {
        let dir = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        write(elsewhere.path(), "shared.png", "4x4x4");
        std::os::unix::fs::symlink(
            elsewhere.path().join("shared.png"),
            dir.path().join("shared.png"),
        )
        .unwrap();

        let ctx = RunContext::new();
        let catalog = discover(&[dir.path()], false, &TextCodec, &ctx).unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.images()[0].atlas_key, "shared");
    }
}
