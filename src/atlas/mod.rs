mod bin;
pub mod channels;
mod compositor;

pub use bin::Bin;
pub use compositor::{Composite, Compositor};
