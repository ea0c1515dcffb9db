//! In-memory settings model shared by the Global and Channel documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::registers::{Register, RegisterScope};

/// Key of a single setting.
///
/// Ordering is register declaration order for global keys, then channel
/// keys grouped by ascending channel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SettingKey {
    /// Chip-wide setting.
    Global(Register),
    /// Setting of one channel.
    Channel { channel: u8, register: Register },
}

impl SettingKey {
    /// Document scope this key is stored in.
    pub fn scope(&self) -> RegisterScope {
        match self {
            Self::Global(_) => RegisterScope::Global,
            Self::Channel { .. } => RegisterScope::Channel,
        }
    }

    /// Register part of the key.
    pub fn register(&self) -> Register {
        match *self {
            Self::Global(register) => register,
            Self::Channel { register, .. } => register,
        }
    }

    /// Channel number for channel keys.
    pub fn channel(&self) -> Option<u8> {
        match *self {
            Self::Global(_) => None,
            Self::Channel { channel, .. } => Some(channel),
        }
    }
}

impl std::fmt::Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Global(register) => write!(f, "{}", register),
            Self::Channel { channel, register } => write!(f, "ch{}.{}", channel, register),
        }
    }
}

/// Value of a setting as read from a document leaf.
///
/// Values are kept in the form a leaf round-trips to: `Int` only for
/// canonical decimal text, `Text` always trimmed. [`SettingsModel::set`]
/// normalizes anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Int(i64),
    Text(String),
}

impl SettingValue {
    /// Interpret leaf text: canonical integers become `Int`, anything else
    /// stays text. `"007"` and `"+5"` are text, so they are written back
    /// unchanged.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<i64>() {
            Ok(n) if n.to_string() == raw => Self::Int(n),
            _ => Self::Text(raw.to_string()),
        }
    }

    /// The value this one reads back as after being written to a leaf.
    pub fn normalized(self) -> Self {
        match self {
            Self::Int(n) => Self::Int(n),
            Self::Text(s) => Self::parse(&s),
        }
    }

    /// Integer value, if numeric.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl std::fmt::Display for SettingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One key/value pair, as exposed in snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingEntry {
    pub key: SettingKey,
    pub value: SettingValue,
}

/// Keyed store of hardware settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsModel {
    entries: BTreeMap<SettingKey, SettingValue>,
}

impl SettingsModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a setting, returning the previous value.
    ///
    /// The value is stored normalized, so `Text("5")` is kept as `Int(5)`.
    pub fn set(&mut self, key: SettingKey, value: impl Into<SettingValue>) -> Option<SettingValue> {
        self.entries.insert(key, value.into().normalized())
    }

    /// Look up a setting.
    pub fn get(&self, key: &SettingKey) -> Option<&SettingValue> {
        self.entries.get(key)
    }

    /// Look up a chip-wide setting.
    pub fn global(&self, register: Register) -> Option<&SettingValue> {
        self.get(&SettingKey::Global(register))
    }

    /// Look up a per-channel setting.
    pub fn channel(&self, channel: u8, register: Register) -> Option<&SettingValue> {
        self.get(&SettingKey::Channel { channel, register })
    }

    /// Remove a setting.
    pub fn remove(&mut self, key: &SettingKey) -> Option<SettingValue> {
        self.entries.remove(key)
    }

    /// Number of settings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the model is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all settings in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&SettingKey, &SettingValue)> {
        self.entries.iter()
    }

    /// Iterate over the settings stored in one document.
    pub fn iter_scope(
        &self,
        scope: RegisterScope,
    ) -> impl Iterator<Item = (&SettingKey, &SettingValue)> {
        self.entries.iter().filter(move |(k, _)| k.scope() == scope)
    }

    /// Number of settings stored in one document.
    pub fn scope_len(&self, scope: RegisterScope) -> usize {
        self.iter_scope(scope).count()
    }

    /// Replace every setting of `scope` with the settings of `other` in that
    /// scope. Settings of the other scope are left alone.
    pub fn replace_scope(&mut self, scope: RegisterScope, other: SettingsModel) {
        self.entries.retain(|k, _| k.scope() != scope);
        self.entries
            .extend(other.entries.into_iter().filter(|(k, _)| k.scope() == scope));
    }

    /// Owned list of entries, in key order.
    pub fn entries(&self) -> Vec<SettingEntry> {
        self.entries
            .iter()
            .map(|(key, value)| SettingEntry {
                key: *key,
                value: value.clone(),
            })
            .collect()
    }
}

impl FromIterator<(SettingKey, SettingValue)> for SettingsModel {
    fn from_iter<T: IntoIterator<Item = (SettingKey, SettingValue)>>(iter: T) -> Self {
        let mut model = Self::new();
        for (key, value) in iter {
            model.set(key, value);
        }
        model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(channel: u8, register: Register) -> SettingKey {
        SettingKey::Channel { channel, register }
    }

    #[test]
    fn value_parse_distinguishes_numbers() {
        assert_eq!(SettingValue::parse("100"), SettingValue::Int(100));
        assert_eq!(SettingValue::parse(" -3 "), SettingValue::Int(-3));
        assert_eq!(SettingValue::parse("RUN"), SettingValue::Text("RUN".into()));
        assert_eq!(SettingValue::parse(""), SettingValue::Text(String::new()));
        assert_eq!(SettingValue::parse("007"), SettingValue::Text("007".into()));
        assert_eq!(SettingValue::parse("+5"), SettingValue::Text("+5".into()));
        assert_eq!(SettingValue::parse(" on "), SettingValue::Text("on".into()));
    }

    #[test]
    fn set_stores_values_in_leaf_form() {
        let mut model = SettingsModel::new();
        model.set(SettingKey::Global(Register::RunMode), SettingValue::Text("5".into()));
        model.set(SettingKey::Global(Register::TriggerMode), "  spaced ");
        model.set(SettingKey::Global(Register::CalMode), "007");

        assert_eq!(model.global(Register::RunMode), Some(&SettingValue::Int(5)));
        assert_eq!(
            model.global(Register::TriggerMode),
            Some(&SettingValue::Text("spaced".into()))
        );
        assert_eq!(
            model.global(Register::CalMode),
            Some(&SettingValue::Text("007".into()))
        );

        let collected: SettingsModel =
            [(SettingKey::Global(Register::VCal), SettingValue::Text("-2".into()))]
                .into_iter()
                .collect();
        assert_eq!(collected.global(Register::VCal), Some(&SettingValue::Int(-2)));
    }

    #[test]
    fn set_overwrites_last_write_wins() {
        let mut model = SettingsModel::new();
        assert_eq!(model.set(SettingKey::Global(Register::Latency), 5_i64), None);
        assert_eq!(
            model.set(SettingKey::Global(Register::Latency), 7_i64),
            Some(SettingValue::Int(5))
        );
        assert_eq!(model.global(Register::Latency), Some(&SettingValue::Int(7)));
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn iteration_is_declaration_then_channel_order() {
        let mut model = SettingsModel::new();
        model.set(ch(2, Register::Mask), 1_i64);
        model.set(SettingKey::Global(Register::VThreshold1), 100_i64);
        model.set(ch(1, Register::CalPulse), 0_i64);
        model.set(SettingKey::Global(Register::RunMode), "RUN");
        model.set(ch(1, Register::TrimDAC), 4_i64);

        let keys: Vec<String> = model.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(
            keys,
            ["RunMode", "VThreshold1", "ch1.TrimDAC", "ch1.CalPulse", "ch2.Mask"]
        );
    }

    #[test]
    fn replace_scope_keeps_other_document() {
        let mut model = SettingsModel::new();
        model.set(SettingKey::Global(Register::Latency), 5_i64);
        model.set(ch(1, Register::Mask), 0_i64);
        model.set(ch(2, Register::Mask), 1_i64);

        let mut incoming = SettingsModel::new();
        incoming.set(ch(3, Register::Mask), 1_i64);
        incoming.set(SettingKey::Global(Register::VCal), 9_i64);
        model.replace_scope(RegisterScope::Channel, incoming);

        assert_eq!(model.scope_len(RegisterScope::Channel), 1);
        assert_eq!(model.channel(3, Register::Mask), Some(&SettingValue::Int(1)));
        assert_eq!(model.global(Register::Latency), Some(&SettingValue::Int(5)));
        assert_eq!(model.global(Register::VCal), None);
    }

    #[test]
    fn entries_serialize_to_json() {
        let mut model = SettingsModel::new();
        model.set(ch(4, Register::Mask), 1_i64);

        let json = serde_json::to_string(&model.entries()).unwrap();
        assert_eq!(
            json,
            r#"[{"key":{"channel":{"channel":4,"register":"Mask"}},"value":1}]"#
        );
    }
}
