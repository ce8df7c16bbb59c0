//! MCU descriptions and the registry holding them.
//!
//! The descriptions themselves are defined in the `avr-fuses-target` crate and
//! are re-exported here for convenience.

mod registry;

pub use avr_fuses_target::{
    AreaDescription, BitFieldDescription, ByteDescription, Mcu, McuFamily, MemoryAreaKind,
    TargetDescriptionSource,
};
pub use registry::{builtin_registry, Registry, RegistryError};
