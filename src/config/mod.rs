// src/config/mod.rs

//! Configuration for cng.
//!
//! Responsibilities:
//! - Define the watch configuration model (`model.rs`).
//! - Load the optional TOML project file and merge it with the CLI (`loader.rs`).
//! - Validate startup invariants (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ProjectFile, RawWatchConfig, WatchConfig};
