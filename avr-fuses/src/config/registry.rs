//! Registry of all known MCU descriptions.

use avr_fuses_target::{AreaDescription, McuFamily, MemoryAreaKind, TargetDescriptionSource};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// The process-wide registry with all built-in MCU descriptions.
///
/// It is initialized on first use and never modified afterwards.
static BUILTIN_REGISTRY: Lazy<Registry> = Lazy::new(Registry::from_builtin_families);

/// Error type for all errors which occur when working
/// with the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// An IO error was encountered while reading an MCU description file.
    #[error("An IO error was encountered")]
    Io(#[from] std::io::Error),
    /// An error occurred while deserializing a YAML MCU description.
    #[error("Deserializing the yaml encountered an error")]
    Yaml(#[from] serde_yaml::Error),
    /// The MCU family definition is not consistent.
    #[error("Invalid MCU family definition ({}): {}", .0.name, .1)]
    InvalidMcuFamily(Box<McuFamily>, String),
}

/// Resolved descriptions of one MCU, shared with every `ByteValues` created for it.
#[derive(Debug)]
struct McuEntry {
    family: String,
    fuses: Arc<AreaDescription>,
    lockbits: Arc<AreaDescription>,
    calibration: Arc<AreaDescription>,
}

impl McuEntry {
    fn area(&self, kind: MemoryAreaKind) -> &Arc<AreaDescription> {
        match kind {
            MemoryAreaKind::Fuse => &self.fuses,
            MemoryAreaKind::LockBits => &self.lockbits,
            MemoryAreaKind::Calibration => &self.calibration,
        }
    }
}

/// Registry of all available MCU descriptions.
///
/// The registry is populated with [`Registry::add_target_family`] and its
/// siblings, and is read-only afterwards. A populated registry can be shared
/// between threads.
#[derive(Debug, Default)]
pub struct Registry {
    /// All the available MCU families.
    families: Vec<McuFamily>,
    /// Lookup cache from MCU id to its resolved descriptions.
    mcus: HashMap<String, McuEntry>,
}

impl Registry {
    /// Creates a registry without any MCU descriptions.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a registry with all descriptions which were built into the crate.
    #[cfg(feature = "builtin-targets")]
    pub fn from_builtin_families() -> Self {
        const BUILTIN_TARGETS: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/targets.bincode"));

        let families: Vec<McuFamily> = match bincode::deserialize(BUILTIN_TARGETS) {
            Ok(families) => families,
            Err(err) => panic!(
                "Failed to deserialize builtin MCU descriptions. This is a bug : {:?}",
                err
            ),
        };

        let mut registry = Self::empty();
        for mut family in families {
            family.source = TargetDescriptionSource::BuiltIn;
            if let Err(error) = registry.add_target_family(family) {
                panic!("Builtin MCU descriptions must be valid. This is a bug : {error}");
            }
        }

        registry
    }

    /// Creates a registry with all descriptions which were built into the crate.
    #[cfg(not(feature = "builtin-targets"))]
    pub fn from_builtin_families() -> Self {
        Self::empty()
    }

    /// All MCU families in this registry, in the order they were added.
    pub fn families(&self) -> &[McuFamily] {
        &self.families
    }

    /// Returns `true` if the MCU id is known. Empty ids are never known.
    pub fn has_mcu(&self, mcu_id: &str) -> bool {
        !mcu_id.is_empty() && self.mcus.contains_key(mcu_id)
    }

    /// Returns the description of one memory area of an MCU.
    ///
    /// This is `None` for an unknown MCU. A known MCU without bytes of the
    /// requested kind yields an empty description instead.
    pub fn get_descriptor(
        &self,
        mcu_id: &str,
        kind: MemoryAreaKind,
    ) -> Option<Arc<AreaDescription>> {
        self.mcus
            .get(mcu_id)
            .map(|entry| Arc::clone(entry.area(kind)))
    }

    /// Number of bytes of the given kind.
    ///
    /// Unknown MCUs and MCUs without such bytes both yield `0`, use
    /// [`Registry::get_descriptor`] to tell them apart.
    pub fn byte_count(&self, mcu_id: &str, kind: MemoryAreaKind) -> usize {
        self.mcus
            .get(mcu_id)
            .map_or(0, |entry| entry.area(kind).byte_count())
    }

    /// Returns the full MCU description.
    pub fn get_mcu(&self, mcu_id: &str) -> Option<&avr_fuses_target::Mcu> {
        let entry = self.mcus.get(mcu_id)?;
        self.families
            .iter()
            .find(|family| family.name == entry.family)
            .and_then(|family| family.get_mcu(mcu_id))
    }

    /// Name of the family the MCU belongs to.
    pub fn family_of(&self, mcu_id: &str) -> Option<&str> {
        self.mcus.get(mcu_id).map(|entry| entry.family.as_str())
    }

    /// All known MCU ids, sorted.
    pub fn mcu_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.mcus.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Finds the MCU with the given device signature.
    ///
    /// Only the active definition of every MCU id is considered.
    pub fn find_by_signature(&self, signature: [u8; 3]) -> Option<&str> {
        self.mcu_ids().into_iter().find(|mcu_id| {
            self.get_mcu(mcu_id)
                .is_some_and(|mcu| mcu.signature == Some(signature))
        })
    }

    /// Returns `true` if both MCUs are known and share the exact same byte and
    /// bit field layout for `kind`.
    pub fn is_compatible(&self, mcu_a: &str, mcu_b: &str, kind: MemoryAreaKind) -> bool {
        match (
            self.get_descriptor(mcu_a, kind),
            self.get_descriptor(mcu_b, kind),
        ) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Adds an MCU family to the registry and returns its name.
    ///
    /// A family with the same name as an existing family replaces the old one.
    /// If an MCU id is defined by more than one family, the family added last wins.
    pub fn add_target_family(&mut self, family: McuFamily) -> Result<String, RegistryError> {
        family
            .validate()
            .map_err(|error| RegistryError::InvalidMcuFamily(Box::new(family.clone()), error))?;

        let family_name = family.name.clone();

        if let Some(index) = self
            .families
            .iter()
            .position(|old_family| old_family.name == family.name)
        {
            tracing::debug!("Replacing MCU family {}", family.name);
            self.families.remove(index);
        }

        for mcu in family.variants() {
            if let Some(existing) = self.mcus.get(&mcu.name) {
                if existing.family != family.name {
                    tracing::warn!(
                        "MCU {} of family {} replaces the definition from family {}",
                        mcu.name,
                        family.name,
                        existing.family
                    );
                }
            }
        }

        tracing::debug!(
            "Adding MCU family {} with {} variants ({:?})",
            family.name,
            family.variants.len(),
            family.source
        );
        self.families.push(family);
        self.rebuild_cache();

        Ok(family_name)
    }

    /// Parses a YAML MCU description and adds it to the registry.
    pub fn add_target_family_from_yaml_str(&mut self, yaml: &str) -> Result<String, RegistryError> {
        let family: McuFamily = serde_yaml::from_str(yaml)?;
        self.add_target_family(family)
    }

    /// Reads a YAML MCU description file and adds it to the registry.
    pub fn add_target_family_from_yaml(
        &mut self,
        path_to_yaml: &Path,
    ) -> Result<String, RegistryError> {
        let file = std::fs::File::open(path_to_yaml)?;
        let mut family: McuFamily = serde_yaml::from_reader(file)?;

        // Ensure the source is external
        family.source = TargetDescriptionSource::External;

        self.add_target_family(family)
    }

    fn rebuild_cache(&mut self) {
        self.mcus.clear();

        for family in &self.families {
            for mcu in family.variants() {
                let area = |kind| Arc::new(mcu.area(kind).cloned().unwrap_or_default());

                self.mcus.insert(
                    mcu.name.clone(),
                    McuEntry {
                        family: family.name.clone(),
                        fuses: area(MemoryAreaKind::Fuse),
                        lockbits: area(MemoryAreaKind::LockBits),
                        calibration: area(MemoryAreaKind::Calibration),
                    },
                );
            }
        }
    }
}

/// Returns the shared registry with all built-in MCU descriptions.
pub fn builtin_registry() -> &'static Registry {
    &BUILTIN_REGISTRY
}
