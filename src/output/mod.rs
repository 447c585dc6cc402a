mod bins;
mod manifest;
mod naming;

pub use bins::{BinOutput, write_bins};
pub use manifest::{MANIFEST_VERSION, Manifest, ManifestImage, write_manifest};
pub use naming::{DEFAULT_NAME_FORMAT, NameTemplate};
