//! Configuration and persistence

mod settings;

pub use settings::{FileStore, SurfaceConfig};
