//! MCU description schema
//!
//! AVR microcontrollers carry a few bytes of configuration memory: the fuse
//! bytes, the lock bits and, on many devices, factory calibration bytes.
//! Every MCU variant splits these bytes into a different set of named bit
//! fields, e.g. `CKSEL`, `BOOTSZ` or `EESAVE`.
//!
//! This crate contains the schema structs for the YAML MCU description files.
//!
#![warn(missing_docs)]

mod area;
mod bit_field;
mod mcu;
mod mcu_family;
pub(crate) mod serialize;

pub use area::{AreaDescription, ByteDescription, MemoryAreaKind};
pub use bit_field::BitFieldDescription;
pub use mcu::Mcu;
pub use mcu_family::{McuFamily, TargetDescriptionSource};
