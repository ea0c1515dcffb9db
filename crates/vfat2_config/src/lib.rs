//! VFAT2 Config - Reader and writer for VFAT2 configuration documents
//!
//! A VFAT2 front-end chip is configured by two XML documents: a Global
//! document with the chip-wide registers and a Channel document with the
//! per-channel registers. This crate parses both into one settings model
//! and writes them back, re-stamping the run record on every write.
//!
//! ```no_run
//! use vfat2_config::{ConfigManager, Register, SettingKey};
//!
//! let mut manager = ConfigManager::new("global.xml", "channel.xml");
//! manager.parse_both()?;
//! manager.settings_mut().set(SettingKey::Global(Register::Latency), 12_i64);
//! manager.set_user("alice");
//! manager.write_both()?;
//! # Ok::<(), vfat2_config::ConfigError>(())
//! ```

pub mod dataset;
pub mod document;
pub mod error;
pub mod header;
pub mod io;
pub mod logging;
pub mod manager;
pub mod model;
pub mod options;
pub mod registers;
pub mod schema;
pub mod xml;

pub use document::DocumentRecord;
pub use error::{ConfigError, ConfigResult};
pub use header::{Header, HeaderType, Metadata, RunInfo};
pub use manager::{ConfigManager, LoadState, Snapshot};
pub use model::{SettingEntry, SettingKey, SettingValue, SettingsModel};
pub use options::{ManagerOptions, OptionsError};
pub use registers::{NameTranslator, Register, RegisterScope, Vfat2Names};
pub use schema::{DocumentKind, Schema};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
