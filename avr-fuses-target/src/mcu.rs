use crate::{AreaDescription, MemoryAreaKind};
use serde::{Deserialize, Serialize};

/// A single MCU variant.
///
/// This describes the configuration memory of one exact device, e.g.
/// `atmega328p`. Every memory area is optional: an MCU without calibration
/// bytes simply leaves out the `calibration` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Mcu {
    /// The MCU id, e.g. `atmega328p`.
    ///
    /// Ids are matched exactly, including case.
    pub name: String,
    /// The three device signature bytes.
    #[cfg_attr(
        not(feature = "bincode"),
        serde(skip_serializing_if = "Option::is_none")
    )]
    #[serde(default)]
    pub signature: Option<[u8; 3]>,
    /// The fuse bytes.
    #[cfg_attr(
        not(feature = "bincode"),
        serde(skip_serializing_if = "Option::is_none")
    )]
    #[serde(default)]
    pub fuses: Option<AreaDescription>,
    /// The lock bits.
    #[cfg_attr(
        not(feature = "bincode"),
        serde(skip_serializing_if = "Option::is_none")
    )]
    #[serde(default)]
    pub lockbits: Option<AreaDescription>,
    /// The oscillator calibration bytes.
    #[cfg_attr(
        not(feature = "bincode"),
        serde(skip_serializing_if = "Option::is_none")
    )]
    #[serde(default)]
    pub calibration: Option<AreaDescription>,
}

impl Mcu {
    /// Returns the description of the given memory area, if the MCU has one.
    pub fn area(&self, kind: MemoryAreaKind) -> Option<&AreaDescription> {
        match kind {
            MemoryAreaKind::Fuse => self.fuses.as_ref(),
            MemoryAreaKind::LockBits => self.lockbits.as_ref(),
            MemoryAreaKind::Calibration => self.calibration.as_ref(),
        }
    }

    /// Number of bytes of the given kind. Zero if the MCU has no such area.
    pub fn byte_count(&self, kind: MemoryAreaKind) -> usize {
        self.area(kind).map_or(0, AreaDescription::byte_count)
    }
}
