use crate::serialize::{hex_option, hex_option_u8};
use crate::BitFieldDescription;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a configuration memory area.
///
/// Values of different kinds are never interchangeable, every kind has its
/// own set of descriptions per MCU.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MemoryAreaKind {
    /// Fuse bytes, e.g. `LOW`, `HIGH` and `EXTENDED` on most ATmegas.
    #[serde(rename = "fuses")]
    Fuse,
    /// The lock bit byte(s).
    #[serde(rename = "lockbits")]
    LockBits,
    /// Factory calibration bytes for the internal oscillator.
    #[serde(rename = "calibration")]
    Calibration,
}

impl MemoryAreaKind {
    /// All kinds, in a fixed order.
    pub const ALL: [MemoryAreaKind; 3] = [
        MemoryAreaKind::Fuse,
        MemoryAreaKind::LockBits,
        MemoryAreaKind::Calibration,
    ];
}

impl fmt::Display for MemoryAreaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MemoryAreaKind::Fuse => "fuse bytes",
            MemoryAreaKind::LockBits => "lock bits",
            MemoryAreaKind::Calibration => "calibration bytes",
        };
        f.write_str(name)
    }
}

/// A single byte of a memory area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ByteDescription {
    /// Name of the byte, e.g. `LOW` or `LOCKBYTE`.
    pub name: String,
    /// The factory default of the complete byte, including reserved bits.
    #[cfg_attr(
        not(feature = "bincode"),
        serde(skip_serializing_if = "Option::is_none")
    )]
    #[serde(default, serialize_with = "hex_option", deserialize_with = "hex_option_u8")]
    pub default: Option<u8>,
}

/// Layout of one memory area of an MCU.
///
/// An area without any bytes is valid: it describes an MCU which has no
/// memory of that kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AreaDescription {
    /// The bytes of the area, in address order.
    #[serde(default)]
    pub bytes: Vec<ByteDescription>,
    /// All bit fields of the area.
    #[serde(default, rename = "bitfields")]
    pub bit_fields: Vec<BitFieldDescription>,
}

impl AreaDescription {
    /// Number of bytes in this area.
    pub fn byte_count(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the area has no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Looks up a bit field by its name.
    pub fn bit_field(&self, name: &str) -> Option<&BitFieldDescription> {
        self.bit_fields.iter().find(|field| field.name == name)
    }

    /// Iterates the bit fields located in the byte with the given index.
    pub fn bit_fields_in_byte(
        &self,
        byte_index: usize,
    ) -> impl Iterator<Item = &BitFieldDescription> + '_ {
        self.bit_fields
            .iter()
            .filter(move |field| field.byte_index == byte_index)
    }

    /// Name of the byte with the given index.
    pub fn byte_name(&self, byte_index: usize) -> Option<&str> {
        self.bytes.get(byte_index).map(|byte| byte.name.as_str())
    }

    /// Checks the internal consistency of the area.
    pub(crate) fn validate(&self) -> Result<(), String> {
        use std::collections::HashSet;

        let mut seen = HashSet::new();
        let mut used_bits = vec![0u8; self.byte_count()];

        for field in &self.bit_fields {
            if !seen.insert(field.name.as_str()) {
                return Err(format!("bit field `{}` appears multiple times", field.name));
            }

            if field.name.is_empty() {
                return Err("bit field with an empty name".to_string());
            }

            let Some(used) = used_bits.get_mut(field.byte_index) else {
                return Err(format!(
                    "bit field `{}` is located in byte {}, but the area only has {} bytes",
                    field.name,
                    field.byte_index,
                    self.byte_count()
                ));
            };

            if !field.is_contiguous() {
                return Err(format!(
                    "bit field `{}` has the non-contiguous mask {:#04x}",
                    field.name, field.mask
                ));
            }

            if *used & field.mask != 0 {
                return Err(format!(
                    "bit field `{}` overlaps another field in byte {}",
                    field.name, field.byte_index
                ));
            }
            *used |= field.mask;

            if let Some(legal) = &field.legal_values {
                if legal.is_empty() {
                    return Err(format!("bit field `{}` has no legal values", field.name));
                }

                if let Some(value) = legal.iter().find(|value| **value > field.max_value()) {
                    return Err(format!(
                        "legal value {value} of bit field `{}` does not fit the mask {:#04x}",
                        field.name, field.mask
                    ));
                }
            }

            if !field.is_legal(field.default_value as i16) {
                return Err(format!(
                    "default value {} of bit field `{}` is not a legal value",
                    field.default_value, field.name
                ));
            }

            if let Some(value) = field
                .value_labels
                .keys()
                .find(|value| **value > field.max_value())
            {
                return Err(format!(
                    "bit field `{}` has a label for value {value}, which does not fit the mask {:#04x}",
                    field.name, field.mask
                ));
            }
        }

        Ok(())
    }
}
