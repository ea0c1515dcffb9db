//! Declarative description of the two document layouts.
//!
//! Both documents share `ROOT > HEADER, METADATA, DATA_SET`. What differs is
//! the dataset payload and which registers it may carry, and that is all
//! captured in a [`Schema`] consumed by the generic dataset walker.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::registers::{Register, RegisterScope};

/// Which of the two documents is being handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Global,
    Channel,
}

impl DocumentKind {
    /// Schema descriptor of this document kind.
    pub fn schema(&self) -> &'static Schema {
        match self {
            Self::Global => &GLOBAL_SCHEMA,
            Self::Channel => &CHANNEL_SCHEMA,
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Global => write!(f, "Global"),
            Self::Channel => write!(f, "Channel"),
        }
    }
}

/// Tag layout and register set of one document kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub kind: DocumentKind,
    /// Root element tag.
    pub root: &'static str,
    /// Container tags from the dataset down to the parts holding leaves.
    /// The first entry is the dataset element under the root.
    pub levels: &'static [&'static str],
    /// Leaf tag.
    pub leaf: &'static str,
    /// Attribute on a leaf holding the register name.
    pub name_attribute: &'static str,
    /// Registers this document may carry.
    pub scope: RegisterScope,
    /// Attribute on a part naming its channel (channel documents only).
    pub channel_attribute: Option<&'static str>,
    /// Valid channel numbers.
    pub channels: RangeInclusive<u8>,
    /// Attribute on a part naming the chip it configures.
    pub part_name_attribute: Option<&'static str>,
}

impl Schema {
    /// Whether a register belongs in this document.
    pub fn expects(&self, register: Register) -> bool {
        register.scope() == self.scope
    }

    /// Registers of this document, in the order they are written.
    pub fn registers(&self) -> impl Iterator<Item = Register> + '_ {
        Register::all().iter().copied().filter(|r| self.expects(*r))
    }

    /// Dataset element tag.
    pub fn dataset_tag(&self) -> &'static str {
        self.levels[0]
    }
}

pub const ROOT_TAG: &str = "ROOT";
pub const DATASET_TAG: &str = "DATA_SET";
pub const PART_TAG: &str = "PART";
pub const DATA_TAG: &str = "DATA";

/// `DATA_SET > PART > PART name=.. > DATA name=..`
pub static GLOBAL_SCHEMA: Schema = Schema {
    kind: DocumentKind::Global,
    root: ROOT_TAG,
    levels: &[DATASET_TAG, PART_TAG, PART_TAG],
    leaf: DATA_TAG,
    name_attribute: "name",
    scope: RegisterScope::Global,
    channel_attribute: None,
    channels: 1..=128,
    part_name_attribute: Some("name"),
};

/// `DATA_SET > PART channel=N > DATA name=..`
pub static CHANNEL_SCHEMA: Schema = Schema {
    kind: DocumentKind::Channel,
    root: ROOT_TAG,
    levels: &[DATASET_TAG, PART_TAG],
    leaf: DATA_TAG,
    name_attribute: "name",
    scope: RegisterScope::Channel,
    channel_attribute: Some("channel"),
    channels: 1..=128,
    part_name_attribute: None,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_sets_are_disjoint_and_complete() {
        let global = GLOBAL_SCHEMA.registers().count();
        let channel = CHANNEL_SCHEMA.registers().count();
        assert_eq!(global + channel, Register::all().len());
        assert!(CHANNEL_SCHEMA.expects(Register::Mask));
        assert!(!GLOBAL_SCHEMA.expects(Register::Mask));
    }

    #[test]
    fn kinds_resolve_to_their_schema() {
        assert_eq!(DocumentKind::Global.schema().kind, DocumentKind::Global);
        assert_eq!(DocumentKind::Channel.schema().dataset_tag(), "DATA_SET");
    }

    #[test]
    fn global_nests_one_level_deeper() {
        assert_eq!(GLOBAL_SCHEMA.levels.len(), CHANNEL_SCHEMA.levels.len() + 1);
    }
}
