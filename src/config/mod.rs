mod load;
mod settings;
mod types;

pub use load::LoadedConfig;
pub use settings::Settings;
pub use types::{CONFIG_VERSION, CompressConfig, PackerConfig};
