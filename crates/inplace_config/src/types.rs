//! Option types deserialized from `inplace.toml` or built in code.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::PathBuf;

/// Top-level layout of an `inplace.toml` file.
#[derive(Debug, Default, Deserialize)]
pub struct InplaceConfig {
    /// Change detector settings.
    #[serde(default)]
    pub detector: DetectorOptions,
}

/// Settings fixed when a change detector is constructed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DetectorOptions {
    /// How a file's fingerprint is computed.
    #[serde(alias = "howToDetermineDifference")]
    pub strategy: Strategy,

    /// Forward files that have no prior cache entry.
    ///
    /// When `false`, unseen files are recorded silently, establishing a
    /// baseline without forwarding them.
    #[serde(alias = "firstPass")]
    pub first_pass: bool,

    /// Directory that cache keys are made relative to.
    ///
    /// When absent, keys are the descriptor paths as given.
    #[serde(alias = "basePath")]
    pub base_path: Option<PathBuf>,
}

impl DetectorOptions {
    /// Creates options for the given strategy with all other settings defaulted.
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Sets whether unseen files are forwarded.
    pub fn with_first_pass(mut self, first_pass: bool) -> Self {
        self.first_pass = first_pass;
        self
    }

    /// Sets the directory cache keys are relative to.
    ///
    /// An empty path is treated as no base path.
    pub fn with_base_path(mut self, base_path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(base_path.into());
        self.normalized()
    }

    /// Returns the options with an empty `base_path` collapsed to `None`.
    pub fn normalized(mut self) -> Self {
        if self
            .base_path
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            self.base_path = None;
        }
        self
    }
}

/// The change detection strategy.
///
/// Selected once per detector and applied to every descriptor it sees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Compare SHA-1 digests of file contents (default).
    #[default]
    Hash,
    /// Compare modification times.
    ModificationTime,
}

impl Strategy {
    /// Returns the configuration tag for this strategy.
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Hash => "hash",
            Strategy::ModificationTime => "modification-time",
        }
    }

    /// Maps a configuration tag to a strategy.
    ///
    /// Unrecognised tags fall back to [`Strategy::Hash`].
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "hash" => Strategy::Hash,
            "modification-time" => Strategy::ModificationTime,
            other => {
                tracing::warn!(tag = other, "unknown change detection strategy, using hash");
                Strategy::Hash
            }
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Strategy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StrategyTag;

        impl<'de> Visitor<'de> for StrategyTag {
            type Value = Strategy;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a strategy name such as \"hash\" or \"modification-time\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(Strategy::from_tag(v))
            }
        }

        deserializer.deserialize_str(StrategyTag)
    }
}
