//! Config manager for the Global/Channel document pair.
//!
//! Key features:
//! - Atomic parse (nothing is committed unless the whole document decodes)
//! - Atomic writes (write to temp file, then rename)
//! - Run records re-stamped with time and user on every write
//! - One settings model shared by both documents

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::document::{encode_document, parse_document, DocumentRecord, ParsedDocument};
use crate::error::{ConfigError, ConfigResult};
use crate::header::{Header, Metadata};
use crate::model::{SettingEntry, SettingsModel};
use crate::options::ManagerOptions;
use crate::registers::{NameTranslator, Vfat2Names};
use crate::schema::DocumentKind;

/// Timestamp format written to `RUN_BEGIN_TIMESTAMP`.
pub const BUILD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Load state of a manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadState {
    /// The document pair has not been parsed yet.
    Unloaded,
    /// Both documents have been parsed successfully.
    Parsed,
}

/// Time and user written into `Run` on the next write.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Stamp {
    time: String,
    user: String,
}

/// Serializable view of everything a manager holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: LoadState,
    pub global_path: PathBuf,
    pub channel_path: PathBuf,
    pub global: Option<DocumentRecord>,
    pub channel: Option<DocumentRecord>,
    pub settings: Vec<SettingEntry>,
}

/// Owns the document pair: paths, header/metadata records and the shared
/// settings model.
///
/// Not synchronized; wrap it in a lock or use one instance per thread.
pub struct ConfigManager {
    global_path: PathBuf,
    channel_path: PathBuf,
    global: Option<DocumentRecord>,
    channel: Option<DocumentRecord>,
    settings: SettingsModel,
    stamp_time: Option<String>,
    stamp_user: Option<String>,
    state: LoadState,
    translator: Box<dyn NameTranslator>,
}

impl ConfigManager {
    /// Create a manager for the given document paths.
    ///
    /// Does not read anything - call `parse_both()` after.
    pub fn new(global_path: impl Into<PathBuf>, channel_path: impl Into<PathBuf>) -> Self {
        Self {
            global_path: global_path.into(),
            channel_path: channel_path.into(),
            global: None,
            channel: None,
            settings: SettingsModel::new(),
            stamp_time: None,
            stamp_user: None,
            state: LoadState::Unloaded,
            translator: Box::new(Vfat2Names),
        }
    }

    /// Create a manager from loaded options.
    pub fn from_options(options: &ManagerOptions) -> Self {
        let mut manager = Self::new(&options.paths.global, &options.paths.channel);
        manager.stamp_user = options.stamp_user().map(str::to_string);
        manager
    }

    /// Replace the register name table.
    pub fn with_translator(mut self, translator: impl NameTranslator + 'static) -> Self {
        self.translator = Box::new(translator);
        self
    }

    /// Path of the Global document.
    pub fn global_path(&self) -> &Path {
        &self.global_path
    }

    /// Path of the Channel document.
    pub fn channel_path(&self) -> &Path {
        &self.channel_path
    }

    /// Path of a document.
    pub fn path(&self, kind: DocumentKind) -> &Path {
        match kind {
            DocumentKind::Global => &self.global_path,
            DocumentKind::Channel => &self.channel_path,
        }
    }

    /// Point the Global document at a new file. No I/O happens here and
    /// previously parsed state is kept.
    pub fn set_global_path(&mut self, path: impl Into<PathBuf>) {
        self.global_path = path.into();
    }

    /// Point the Channel document at a new file. No I/O happens here and
    /// previously parsed state is kept.
    pub fn set_channel_path(&mut self, path: impl Into<PathBuf>) {
        self.channel_path = path.into();
    }

    /// Current load state.
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// The shared settings model.
    pub fn settings(&self) -> &SettingsModel {
        &self.settings
    }

    /// Mutable access to the shared settings model.
    ///
    /// Note: Changes made here are only in memory until a write is called.
    pub fn settings_mut(&mut self) -> &mut SettingsModel {
        &mut self.settings
    }

    /// Header and metadata of a document, if parsed or supplied.
    pub fn record(&self, kind: DocumentKind) -> Option<&DocumentRecord> {
        match kind {
            DocumentKind::Global => self.global.as_ref(),
            DocumentKind::Channel => self.channel.as_ref(),
        }
    }

    /// Header of a document.
    pub fn header(&self, kind: DocumentKind) -> Option<&Header> {
        self.record(kind).map(|r| &r.header)
    }

    /// Metadata of a document.
    pub fn metadata(&self, kind: DocumentKind) -> Option<&Metadata> {
        self.record(kind).map(|r| &r.metadata)
    }

    /// Supply the header and metadata used when writing a document.
    pub fn set_record(&mut self, kind: DocumentKind, record: DocumentRecord) {
        *self.record_slot(kind) = Some(record);
    }

    /// Override the build time stamped into both documents on later writes.
    pub fn set_time(&mut self, time: impl Into<String>) {
        self.stamp_time = Some(time.into());
    }

    /// Override the user stamped into both documents on later writes.
    pub fn set_user(&mut self, user: impl Into<String>) {
        self.stamp_user = Some(user.into());
    }

    /// Go back to stamping the current time and acting user.
    pub fn clear_stamp(&mut self) {
        self.stamp_time = None;
        self.stamp_user = None;
    }

    /// Parse the Global document.
    pub fn parse_global(&mut self) -> ConfigResult<()> {
        self.parse_one(DocumentKind::Global)
    }

    /// Parse the Channel document.
    pub fn parse_channel(&mut self) -> ConfigResult<()> {
        self.parse_one(DocumentKind::Channel)
    }

    /// Parse both documents. Nothing is committed unless both succeed.
    pub fn parse_both(&mut self) -> ConfigResult<()> {
        let global = self.read_document(DocumentKind::Global)?;
        let channel = self.read_document(DocumentKind::Channel)?;

        self.commit(DocumentKind::Global, global);
        self.commit(DocumentKind::Channel, channel);
        tracing::info!(
            "Parsed document pair ({} setting(s))",
            self.settings.len()
        );
        Ok(())
    }

    /// Write the Global document.
    pub fn write_global(&mut self) -> ConfigResult<()> {
        let stamp = self.stamp();
        self.write_one(DocumentKind::Global, &stamp)
    }

    /// Write the Channel document.
    pub fn write_channel(&mut self) -> ConfigResult<()> {
        let stamp = self.stamp();
        self.write_one(DocumentKind::Channel, &stamp)
    }

    /// Write both documents with the same stamp.
    pub fn write_both(&mut self) -> ConfigResult<()> {
        let stamp = self.stamp();
        self.write_one(DocumentKind::Global, &stamp)?;
        self.write_one(DocumentKind::Channel, &stamp)
    }

    /// Serializable view of the manager's state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            global_path: self.global_path.clone(),
            channel_path: self.channel_path.clone(),
            global: self.global.clone(),
            channel: self.channel.clone(),
            settings: self.settings.entries(),
        }
    }

    /// Snapshot rendered as pretty JSON.
    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }

    fn parse_one(&mut self, kind: DocumentKind) -> ConfigResult<()> {
        let parsed = self.read_document(kind)?;
        let count = parsed.settings.len();
        self.commit(kind, parsed);
        tracing::info!(
            "Parsed {} document from {} ({} setting(s))",
            kind,
            self.path(kind).display(),
            count
        );
        Ok(())
    }

    /// Read and decode a document without touching any state.
    fn read_document(&self, kind: DocumentKind) -> ConfigResult<ParsedDocument> {
        let path = self.path(kind);
        tracing::debug!("Reading {} document from {}", kind, path.display());

        let result = fs::read(path)
            .map_err(|e| ConfigError::io(path, e))
            .and_then(|bytes| {
                String::from_utf8(bytes).map_err(|e| ConfigError::MalformedDocument {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            })
            .and_then(|xml| parse_document(kind, &xml, path, &*self.translator));

        if let Err(e) = &result {
            tracing::warn!("Failed to parse {} document: {}", kind, e);
        }
        result
    }

    fn commit(&mut self, kind: DocumentKind, parsed: ParsedDocument) {
        self.settings
            .replace_scope(kind.schema().scope, parsed.settings);
        *self.record_slot(kind) = Some(parsed.record);

        if self.global.is_some() && self.channel.is_some() {
            self.state = LoadState::Parsed;
        }
    }

    fn write_one(&mut self, kind: DocumentKind, stamp: &Stamp) -> ConfigResult<()> {
        let result = self.encode_stamped(kind, stamp).and_then(|(record, xml)| {
            let path = self.path(kind);
            crate::io::atomic_write(path, &xml).map_err(|e| ConfigError::io(path, e))?;
            Ok(record)
        });

        match result {
            Ok(record) => {
                *self.record_slot(kind) = Some(record);
                tracing::info!(
                    "Wrote {} document to {} (user '{}', time '{}')",
                    kind,
                    self.path(kind).display(),
                    stamp.user,
                    stamp.time
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to write {} document: {}", kind, e);
                Err(e)
            }
        }
    }

    /// Stamped copy of the record and the serialized document.
    fn encode_stamped(
        &self,
        kind: DocumentKind,
        stamp: &Stamp,
    ) -> ConfigResult<(DocumentRecord, String)> {
        let mut record = self.record(kind).cloned().ok_or_else(|| {
            ConfigError::schema(
                kind,
                "no header to write; parse the document or supply a record first",
            )
        })?;
        record.header.run.build_time = stamp.time.clone();
        record.header.run.user = stamp.user.clone();

        let tree = encode_document(kind, &record, &self.settings, &*self.translator)?;
        Ok((record, tree.to_document_string()))
    }

    fn stamp(&self) -> Stamp {
        Stamp {
            time: self
                .stamp_time
                .clone()
                .unwrap_or_else(|| Local::now().format(BUILD_TIME_FORMAT).to_string()),
            user: self.stamp_user.clone().unwrap_or_else(acting_user),
        }
    }

    fn record_slot(&mut self, kind: DocumentKind) -> &mut Option<DocumentRecord> {
        match kind {
            DocumentKind::Global => &mut self.global,
            DocumentKind::Channel => &mut self.channel,
        }
    }
}

/// Login name of the user running the process.
fn acting_user() -> String {
    ["USER", "USERNAME", "LOGNAME"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
        .unwrap_or_else(|| "unknown".to_string())
}
