use super::mcu::Mcu;
use crate::MemoryAreaKind;

use serde::{Deserialize, Serialize};

/// Source of an MCU description.
///
/// This is used for diagnostics, when
/// an error related to an MCU description occurs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetDescriptionSource {
    /// The description is a built-in description,
    /// which was included into avr-fuses at compile time.
    BuiltIn,
    /// The description was from an external source
    /// during runtime.
    External,
}

/// This describes a family of MCUs with all its variants.
///
/// This struct is usually read from an MCU description
/// file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct McuFamily {
    /// This is the name of the family, e.g. `ATmega`.
    pub name: String,
    /// This vector holds all the variants of the family.
    pub variants: Vec<Mcu>,
    #[serde(skip, default = "default_source")]
    /// Source of the description, used for diagnostics
    pub source: TargetDescriptionSource,
}

fn default_source() -> TargetDescriptionSource {
    TargetDescriptionSource::External
}

impl McuFamily {
    /// Validates the [`McuFamily`] such that avr-fuses can make assumptions about the correctness without validating thereafter.
    ///
    /// This method should be called right after the [`McuFamily`] is created!
    pub fn validate(&self) -> Result<(), String> {
        self.reject_duplicate_mcu_names()?;
        self.reject_empty_mcu_names()?;
        self.validate_areas()?;

        Ok(())
    }

    /// Rejects descriptions with duplicate MCU names. Only one of these MCUs can
    /// be selected, so having multiple is probably a mistake.
    fn reject_duplicate_mcu_names(&self) -> Result<(), String> {
        use std::collections::HashSet;

        let mut seen = HashSet::new();

        for mcu in &self.variants {
            if !seen.insert(&mcu.name) {
                return Err(format!(
                    "MCU {} appears multiple times in {}",
                    mcu.name, self.name,
                ));
            }
        }

        Ok(())
    }

    // An empty id can never be looked up.
    fn reject_empty_mcu_names(&self) -> Result<(), String> {
        if self.variants.iter().any(|mcu| mcu.name.is_empty()) {
            return Err(format!("{} contains an MCU without a name", self.name));
        }

        Ok(())
    }

    /// Ensures that the bit fields of every area fit their bytes and do not overlap.
    fn validate_areas(&self) -> Result<(), String> {
        for mcu in &self.variants {
            for kind in MemoryAreaKind::ALL {
                if let Some(area) = mcu.area(kind) {
                    area.validate()
                        .map_err(|error| format!("MCU {}, {kind}: {error}", mcu.name))?;
                }
            }
        }

        Ok(())
    }
}

impl McuFamily {
    /// Get the different [Mcu]s which are part of this
    /// family.
    pub fn variants(&self) -> &[Mcu] {
        &self.variants
    }

    /// Try to find an [Mcu] with the given id.
    pub fn get_mcu(&self, name: impl AsRef<str>) -> Option<&Mcu> {
        let name = name.as_ref();
        self.variants.iter().find(|mcu| mcu.name == name)
    }
}
