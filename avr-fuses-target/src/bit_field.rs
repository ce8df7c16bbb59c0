use crate::serialize::{hex_u8, hex_u_int};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named group of bits inside one byte of a memory area.
///
/// For example the `BOOTSZ` field of an ATmega328P lives in the `HIGH` fuse
/// byte with the mask `0x06`: it is two bits wide, shifted by one.
///
/// All values handled through a [`BitFieldDescription`] are *unshifted*, i.e.
/// `BOOTSZ = 3` corresponds to the raw byte bits `0b0000_0110`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BitFieldDescription {
    /// Name of the field, unique within one memory area of an MCU.
    pub name: String,
    /// Human readable description of the field.
    #[cfg_attr(
        not(feature = "bincode"),
        serde(skip_serializing_if = "Option::is_none")
    )]
    #[serde(default)]
    pub description: Option<String>,
    /// Index of the byte inside the memory area.
    #[serde(rename = "byte")]
    pub byte_index: usize,
    /// The bits of the byte which belong to this field.
    ///
    /// The set bits must be contiguous.
    #[serde(serialize_with = "hex_u_int", deserialize_with = "hex_u8")]
    pub mask: u8,
    /// The unshifted default value of the field.
    #[serde(rename = "default")]
    pub default_value: u8,
    /// Explicit list of legal unshifted values.
    ///
    /// If this is not set, every value which fits into the mask is legal.
    #[cfg_attr(
        not(feature = "bincode"),
        serde(skip_serializing_if = "Option::is_none")
    )]
    #[serde(default, rename = "values")]
    pub legal_values: Option<Vec<u8>>,
    /// Labels for the unshifted values of this field, for display purposes.
    #[cfg_attr(
        not(feature = "bincode"),
        serde(skip_serializing_if = "BTreeMap::is_empty")
    )]
    #[serde(default, rename = "labels")]
    pub value_labels: BTreeMap<u8, String>,
}

impl BitFieldDescription {
    /// Number of positions the field is shifted to the left inside its byte.
    pub fn shift(&self) -> u32 {
        self.mask.trailing_zeros()
    }

    /// Width of the field in bits.
    pub fn width(&self) -> u32 {
        self.mask.count_ones()
    }

    /// The largest unshifted value that fits into the mask.
    pub fn max_value(&self) -> u8 {
        self.mask >> self.shift()
    }

    /// Returns true if the mask consists of one contiguous run of set bits.
    pub fn is_contiguous(&self) -> bool {
        self.mask != 0 && (self.max_value() as u16 + 1).is_power_of_two()
    }

    /// Returns `true` if `value` may be written into this field.
    pub fn is_legal(&self, value: i16) -> bool {
        let Ok(value) = u8::try_from(value) else {
            return false;
        };

        match &self.legal_values {
            Some(legal) => legal.contains(&value),
            None => value <= self.max_value(),
        }
    }

    /// Extracts the unshifted field value from a full byte.
    pub fn extract(&self, byte: u8) -> u8 {
        (byte & self.mask) >> self.shift()
    }

    /// Returns `byte` with the field replaced by `value`. All bits outside of
    /// the mask are left untouched.
    pub fn insert(&self, byte: u8, value: u8) -> u8 {
        let shifted = ((value as u16) << self.shift()) as u8 & self.mask;
        (byte & !self.mask) | shifted
    }

    /// Returns the label of the given value, if the description has one.
    pub fn label(&self, value: u8) -> Option<&str> {
        self.value_labels.get(&value).map(String::as_str)
    }

    /// Iterates all legal unshifted values in ascending order.
    pub fn legal_values(&self) -> Box<dyn Iterator<Item = u8> + '_> {
        match &self.legal_values {
            Some(legal) => {
                let mut sorted = legal.clone();
                sorted.sort_unstable();
                sorted.dedup();
                Box::new(sorted.into_iter())
            }
            None => Box::new(0..=self.max_value()),
        }
    }
}
