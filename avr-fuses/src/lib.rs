//! # Fuse, lock bit and calibration bytes of AVR microcontrollers
//!
//! This crate models the configuration memory of AVR devices. The raw bytes
//! of one memory area are held in a [`ByteValues`] container, which also
//! gives access to the named bit fields of the MCU, notifies listeners about
//! changed fields and converts the values to another MCU.
//!
//! The layout of every MCU is loaded from YAML description files into a
//! [`Registry`]. A registry with the descriptions bundled with this crate is
//! available through [`builtin_registry`].
//!
//! # Examples
//!
//! ```
//! use avr_fuses::{builtin_registry, ByteValues, MemoryAreaKind};
//!
//! let registry = builtin_registry();
//! let mut fuses = ByteValues::new(registry, MemoryAreaKind::Fuse, "atmega328p")?;
//!
//! fuses.set_values(&[0xff, 0xde, 0xfd])?;
//! assert_eq!(fuses.get_named_value("CKSEL")?, 0x0f);
//!
//! // Enable the clock divider, all other bits of the byte stay untouched.
//! fuses.set_named_value("CKDIV8", 0)?;
//! assert_eq!(fuses.get_value(0), 0x7f);
//!
//! // Take the values over to a different device.
//! let (converted, results) = fuses.convert_to(registry, "atmega168")?;
//! assert_eq!(converted.get_named_value("CKDIV8")?, 0);
//! assert_eq!(results.success_rate(), 100);
//! # Ok::<(), avr_fuses::Error>(())
//! ```
#![warn(missing_docs)]

pub mod byte_values;
pub mod config;
pub mod conversion;
mod error;

pub use crate::byte_values::{ByteValueChangeEvent, ByteValues, ByteValuesChangeListener, UNSET};
pub use crate::config::{builtin_registry, MemoryAreaKind, Registry, RegistryError};
pub use crate::conversion::{ConversionResults, ConversionStatus};
pub use crate::error::{ArgumentError, Error};
