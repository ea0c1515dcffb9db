//! TOML options naming the document pair and the write-time defaults.
//!
//! ```toml
//! [paths]
//! global = "config/vfat2_global.xml"
//! channel = "config/vfat2_channel.xml"
//!
//! [stamp]
//! location = "904"
//! user = ""
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Every section and key is optional; missing ones take their defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::DocumentRecord;
use crate::header::{Header, HeaderType, Metadata, RunInfo};
use crate::logging::LogLevel;
use crate::schema::DocumentKind;

/// Errors that can occur while loading or saving the options file.
#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("Failed to read options file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse options: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize options: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Options file not found: {0}")]
    NotFound(PathBuf),
}

/// Result type for options operations.
pub type OptionsResult<T> = Result<T, OptionsError>;

/// Root options structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerOptions {
    #[serde(default)]
    pub paths: PathOptions,

    #[serde(default)]
    pub stamp: StampOptions,

    #[serde(default)]
    pub logging: LoggingOptions,
}

/// Locations of the two documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathOptions {
    #[serde(default = "default_global_path")]
    pub global: PathBuf,

    #[serde(default = "default_channel_path")]
    pub channel: PathBuf,
}

fn default_global_path() -> PathBuf {
    PathBuf::from("config").join("vfat2_global.xml")
}

fn default_channel_path() -> PathBuf {
    PathBuf::from("config").join("vfat2_channel.xml")
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            global: default_global_path(),
            channel: default_channel_path(),
        }
    }
}

/// Values used when stamping and when starting documents from scratch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StampOptions {
    /// `Run.location` for documents created without a prior parse.
    #[serde(default)]
    pub location: String,

    /// Fixed `Run.user` for writes; empty means the acting user.
    #[serde(default)]
    pub user: String,
}

/// Logging section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingOptions {
    #[serde(default)]
    pub level: LogLevel,
}

impl ManagerOptions {
    /// Load options from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> OptionsResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OptionsError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load options, writing the defaults first if the file is missing.
    pub fn load_or_create(path: impl AsRef<Path>) -> OptionsResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }

        let options = Self::default();
        options.save(path)?;
        tracing::info!("Created default options at {}", path.display());
        Ok(options)
    }

    /// Parse options from TOML text.
    pub fn from_toml(content: &str) -> OptionsResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Save options atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> OptionsResult<()> {
        let content = toml::to_string_pretty(self)?;
        crate::io::atomic_write(path.as_ref(), &content)?;
        Ok(())
    }

    /// Fixed stamp user, if configured.
    pub fn stamp_user(&self) -> Option<&str> {
        Some(self.stamp.user.as_str()).filter(|u| !u.is_empty())
    }

    /// Starter header and metadata for a document that was never parsed.
    pub fn default_record(&self, kind: DocumentKind) -> DocumentRecord {
        let (type_tag, name) = match kind {
            DocumentKind::Global => ("VFAT2_GLOBAL", "VFAT2 global settings"),
            DocumentKind::Channel => ("VFAT2_CHANNEL", "VFAT2 channel settings"),
        };

        DocumentRecord {
            header: Header {
                type_: HeaderType {
                    type_tag: type_tag.to_string(),
                    name: name.to_string(),
                },
                run: RunInfo {
                    location: self.stamp.location.clone(),
                    ..RunInfo::default()
                },
            },
            metadata: Metadata {
                part_type: "GEM VFAT2".to_string(),
                ..Metadata::default()
            },
        }
    }
}
