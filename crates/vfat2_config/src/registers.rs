//! VFAT2 register identifiers and name translation.
//!
//! The document leaves carry register names as strings; the settings model
//! is keyed by [`Register`]. A [`NameTranslator`] maps between the two.

use serde::{Deserialize, Serialize};

/// Which document a register lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegisterScope {
    /// Chip-wide register, stored in the Global document.
    Global,
    /// Per-channel register, stored in the Channel document.
    Channel,
}

/// A VFAT2 hardware setting.
///
/// Declaration order is the order settings are written out.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Register {
    // Control register 0
    RunMode,
    TriggerMode,
    MSPolarity,
    CalPolarity,
    // Control register 1
    CalMode,
    DACMode,
    ProbeMode,
    LVDSPowerSave,
    // Control register 2
    HitCountMode,
    MSPulseLength,
    DigInSel,
    // Control register 3
    TrimDACRange,
    PbBG,
    DFTestPattern,
    // Bias currents
    IPreampIn,
    IPreampFeed,
    IPreampOut,
    IShaper,
    IShaperFeed,
    IComp,
    // Voltages and timing
    Latency,
    VCal,
    VThreshold1,
    VThreshold2,
    CalPhase,
    // Channel register
    TrimDAC,
    Mask,
    CalPulse,
}

impl Register {
    /// Register name as written in the documents.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RunMode => "RunMode",
            Self::TriggerMode => "TriggerMode",
            Self::MSPolarity => "MSPolarity",
            Self::CalPolarity => "CalPolarity",
            Self::CalMode => "CalMode",
            Self::DACMode => "DACMode",
            Self::ProbeMode => "ProbeMode",
            Self::LVDSPowerSave => "LVDSPowerSave",
            Self::HitCountMode => "HitCountMode",
            Self::MSPulseLength => "MSPulseLength",
            Self::DigInSel => "DigInSel",
            Self::TrimDACRange => "TrimDACRange",
            Self::PbBG => "PbBG",
            Self::DFTestPattern => "DFTestPattern",
            Self::IPreampIn => "IPreampIn",
            Self::IPreampFeed => "IPreampFeed",
            Self::IPreampOut => "IPreampOut",
            Self::IShaper => "IShaper",
            Self::IShaperFeed => "IShaperFeed",
            Self::IComp => "IComp",
            Self::Latency => "Latency",
            Self::VCal => "VCal",
            Self::VThreshold1 => "VThreshold1",
            Self::VThreshold2 => "VThreshold2",
            Self::CalPhase => "CalPhase",
            Self::TrimDAC => "TrimDAC",
            Self::Mask => "Mask",
            Self::CalPulse => "CalPulse",
        }
    }

    /// Every register, in declaration order.
    pub fn all() -> &'static [Register] {
        &[
            Self::RunMode,
            Self::TriggerMode,
            Self::MSPolarity,
            Self::CalPolarity,
            Self::CalMode,
            Self::DACMode,
            Self::ProbeMode,
            Self::LVDSPowerSave,
            Self::HitCountMode,
            Self::MSPulseLength,
            Self::DigInSel,
            Self::TrimDACRange,
            Self::PbBG,
            Self::DFTestPattern,
            Self::IPreampIn,
            Self::IPreampFeed,
            Self::IPreampOut,
            Self::IShaper,
            Self::IShaperFeed,
            Self::IComp,
            Self::Latency,
            Self::VCal,
            Self::VThreshold1,
            Self::VThreshold2,
            Self::CalPhase,
            Self::TrimDAC,
            Self::Mask,
            Self::CalPulse,
        ]
    }

    /// Document this register belongs to.
    pub fn scope(&self) -> RegisterScope {
        match self {
            Self::TrimDAC | Self::Mask | Self::CalPulse => RegisterScope::Channel,
            _ => RegisterScope::Global,
        }
    }
}

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Bidirectional mapping between register names and identifiers.
pub trait NameTranslator {
    /// Translate a leaf name into a register.
    fn register(&self, name: &str) -> Option<Register>;

    /// Translate a register back into its leaf name.
    fn name(&self, register: Register) -> Option<&str>;
}

/// The stock VFAT2 name table.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vfat2Names;

impl NameTranslator for Vfat2Names {
    fn register(&self, name: &str) -> Option<Register> {
        Register::all().iter().copied().find(|r| r.name() == name)
    }

    fn name(&self, register: Register) -> Option<&str> {
        Some(register.name())
    }
}
