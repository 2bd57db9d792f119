//! Parsing and validation of change detector options.
//!
//! Options are normally built in code, but can also be read from the
//! `[detector]` table of an `inplace.toml` file. Either way the result is a
//! strongly-typed [`DetectorOptions`] fixed for the lifetime of a detector.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_options, load_options_from_str, CONFIG_FILE};
pub use types::*;
