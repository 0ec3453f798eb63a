//! Parsing and validation of `hardmix.toml` mixing configuration.
//!
//! The configuration carries the raw optimization setting that selects which
//! hard-block kinds take part in hard/soft mixing, and optional overrides of
//! the architecture tags those kinds are looked up under.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::{MixConfig, MixSection, TagOverrides};
