// src/config/mod.rs

//! Engine configuration.
//!
//! - `model.rs`: the TOML-backed data model.
//! - `loader.rs`: reading a file from disk.
//! - `validate.rs`: checks that deserialization cannot express.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, parse_str};
pub use model::{ConfigFile, EngineSection, RawConfigFile, SchedulerSection};
pub use validate::validate_config;
