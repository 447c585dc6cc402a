use std::path::{Path, PathBuf};

use log::warn;
use parking_lot::Mutex;
use thiserror::Error;

use crate::error::{CatalogError, PackingError};

/// Why an image was skipped, or what was lost while keeping it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageIssue {
    #[error("duplicate atlas key '{key}' already taken by '{kept}'")]
    DuplicateKey { key: String, kept: PathBuf },

    #[error("unreadable image: {0}")]
    Unreadable(String),

    #[error(transparent)]
    UnsupportedChannels(#[from] CatalogError),

    #[error("not packed: {0}")]
    Packing(PackingError),

    #[error("decode failed: {0}")]
    Decode(String),

    #[error(
        "dimensions changed from {expected_width}x{expected_height} \
         to {actual_width}x{actual_height} since discovery"
    )]
    DimensionDrift {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("{native} channels reduced to {target}, some data is lost")]
    ChannelTruncation { native: u8, target: u8 },
}

impl ImageIssue {
    /// Returns true if the image is left out of the atlas.
    pub fn is_skip(&self) -> bool {
        !matches!(self, ImageIssue::ChannelTruncation { .. })
    }
}

/// A per-image problem collected during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub path: PathBuf,
    pub issue: ImageIssue,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let action = if self.issue.is_skip() {
            "skipped"
        } else {
            "warning"
        };
        write!(f, "{} ({}): {}", self.path.display(), action, self.issue)
    }
}

/// Per-run state shared by every stage.
///
/// Workers on any thread may report; reports are kept in arrival order.
#[derive(Debug, Default)]
pub struct RunContext {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self, path: &Path, issue: ImageIssue) {
        let diagnostic = Diagnostic {
            path: path.to_path_buf(),
            issue,
        };
        warn!("{}", diagnostic);
        self.diagnostics.lock().push(diagnostic);
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.lock().is_empty()
    }

    /// Snapshot of everything reported so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    /// Number of images left out of the atlas.
    pub fn skipped_count(&self) -> usize {
        self.diagnostics
            .lock()
            .iter()
            .filter(|d| d.issue.is_skip())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn test_report_from_many_threads() {
        let ctx = RunContext::new();
        (0..64).into_par_iter().for_each(|i| {
            ctx.report(
                Path::new(&format!("img_{}.png", i)),
                ImageIssue::Decode("broken".to_string()),
            );
        });

        assert_eq!(ctx.diagnostics().len(), 64);
        assert_eq!(ctx.skipped_count(), 64);
    }

    #[test]
    fn test_truncation_is_not_a_skip() {
        let ctx = RunContext::new();
        ctx.report(
            Path::new("a.png"),
            ImageIssue::ChannelTruncation {
                native: 4,
                target: 3,
            },
        );

        assert!(ctx.has_diagnostics());
        assert_eq!(ctx.skipped_count(), 0);
        assert!(ctx.diagnostics()[0].to_string().contains("warning"));
    }
}
