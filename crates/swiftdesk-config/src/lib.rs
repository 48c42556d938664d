//! SwiftDesk settings: the typed model in [`SwiftDeskConfig`] and a loader
//! that merges JSON5 files from the system, user, cwd and runtime layers.

mod error;
mod loader;
mod model;

pub use error::ConfigError;
pub use loader::{ConfigLayer, ConfigLayerSource, LayeredConfig, LayeredConfigOptions};
pub use model::*;
