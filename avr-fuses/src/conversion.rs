//! Conversion of byte values between MCUs.
//!
//! Bit fields are matched by name. A field which exists on both MCUs keeps its
//! value if the value is legal on the target, fields which only exist on one
//! side are reported but otherwise ignored.

use crate::byte_values::{ByteValues, UNSET};
use crate::config::Registry;
use crate::error::Error;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Outcome of the conversion of a single bit field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionStatus {
    /// The field exists on both MCUs.
    Success,
    /// The field only exists on the target MCU and got no value from the source.
    NotInSource,
    /// The field only exists on the source MCU, its value was dropped.
    NotInTarget,
}

/// The per field outcome of a conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionResults {
    statuses: BTreeMap<String, ConversionStatus>,
    unrepresentable: Vec<String>,
}

impl ConversionResults {
    /// The status of the bit field with the given name.
    ///
    /// `None` if neither MCU has a field with this name.
    pub fn status(&self, name: &str) -> Option<ConversionStatus> {
        self.statuses.get(name).copied()
    }

    /// Percentage of all bit fields of both MCUs which were converted.
    ///
    /// This is 100 if neither MCU has any bit field.
    pub fn success_rate(&self) -> u32 {
        if self.statuses.is_empty() {
            return 100;
        }

        let successful = self.count(ConversionStatus::Success);
        (100 * successful / self.statuses.len()) as u32
    }

    /// Number of bit fields with the given status.
    pub fn count(&self, status: ConversionStatus) -> usize {
        self.statuses.values().filter(|s| **s == status).count()
    }

    /// Names of all bit fields with the given status, sorted.
    pub fn names_with_status(&self, status: ConversionStatus) -> impl Iterator<Item = &str> + '_ {
        self.statuses
            .iter()
            .filter(move |(_, s)| **s == status)
            .map(|(name, _)| name.as_str())
    }

    /// All bit fields and their status, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ConversionStatus)> + '_ {
        self.statuses
            .iter()
            .map(|(name, status)| (name.as_str(), *status))
    }

    /// Number of distinct bit field names of both MCUs.
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    /// Returns `true` if neither MCU has any bit field.
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// Fields present on both MCUs whose source value is not legal on the
    /// target. Their target value was left alone.
    pub fn unrepresentable(&self) -> &[String] {
        &self.unrepresentable
    }
}

impl fmt::Display for ConversionResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}% of {} bit fields converted",
            self.success_rate(),
            self.len()
        )?;

        for (name, status) in self.iter() {
            match status {
                ConversionStatus::Success if self.unrepresentable.iter().any(|n| n == name) => {
                    writeln!(f, "  {name}: value not supported by the target")?
                }
                ConversionStatus::Success => {}
                ConversionStatus::NotInSource => writeln!(f, "  {name}: new on the target")?,
                ConversionStatus::NotInTarget => {
                    writeln!(f, "  {name}: not available on the target")?
                }
            }
        }

        Ok(())
    }
}

/// Converts `source` to the MCU `target_mcu_id`.
///
/// The result holds every byte unset, except for the bytes of bit fields which
/// exist on both MCUs and have a known value in `source`. Other fields sharing
/// those bytes get their default values. If both MCUs share the exact same
/// layout the raw bytes are copied verbatim, including reserved bits.
///
/// Fields present on both MCUs are reported as [`ConversionStatus::Success`],
/// even if their value could not be copied because it is not legal on the
/// target (see [`ConversionResults::unrepresentable`]).
pub fn convert(
    registry: &Registry,
    source: &ByteValues,
    target_mcu_id: &str,
) -> Result<(ByteValues, ConversionResults), Error> {
    let mut target = ByteValues::new(registry, source.kind(), target_mcu_id)?;
    target.set_comment(source.comment().map(str::to_string));

    let source_names: BTreeSet<&str> = source
        .bit_field_descriptions()
        .iter()
        .map(|field| field.name.as_str())
        .collect();
    let target_descriptor = std::sync::Arc::clone(target.descriptor());
    let target_names: BTreeSet<&str> = target_descriptor
        .bit_fields
        .iter()
        .map(|field| field.name.as_str())
        .collect();

    let mut results = ConversionResults::default();

    if source.descriptor() == target.descriptor() {
        target.set_values(source.get_values())?;
    } else {
        for name in source_names.intersection(&target_names) {
            let value = source.get_named_value(name)?;
            if value == UNSET {
                continue;
            }

            match target_descriptor.bit_field(name) {
                Some(field) if field.is_legal(value) => target.set_named_value(name, value)?,
                _ => {
                    tracing::warn!(
                        "Value {} of {} cannot be represented on {}",
                        value,
                        name,
                        target_mcu_id
                    );
                    results.unrepresentable.push(name.to_string());
                }
            }
        }
    }

    for name in source_names.union(&target_names) {
        let status = match (source_names.contains(name), target_names.contains(name)) {
            (true, true) => ConversionStatus::Success,
            (true, false) => ConversionStatus::NotInTarget,
            _ => ConversionStatus::NotInSource,
        };
        results.statuses.insert(name.to_string(), status);
    }

    tracing::debug!(
        "Converted {} from {} to {}: {}% successful",
        source.kind(),
        source.mcu_id(),
        target_mcu_id,
        results.success_rate()
    );

    Ok((target, results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryAreaKind;
    use pretty_assertions::assert_eq;

    const FAMILY: &str = r#"
name: Test
variants:
  - name: a
    fuses:
      bytes:
        - name: LOW
        - name: HIGH
      bitfields:
        - name: CKSEL
          byte: 0
          mask: 0x0f
          default: 1
        - name: SUT
          byte: 0
          mask: 0x30
          default: 2
        - name: BODLEVEL
          byte: 1
          mask: 0x07
          default: 7
        - name: EESAVE
          byte: 1
          mask: 0x08
          default: 1
  - name: a_clone
    fuses:
      bytes:
        - name: LOW
        - name: HIGH
      bitfields:
        - name: CKSEL
          byte: 0
          mask: 0x0f
          default: 1
        - name: SUT
          byte: 0
          mask: 0x30
          default: 2
        - name: BODLEVEL
          byte: 1
          mask: 0x07
          default: 7
        - name: EESAVE
          byte: 1
          mask: 0x08
          default: 1
  - name: b
    fuses:
      bytes:
        - name: LOW
          default: 0xff
        - name: HIGH
        - name: EXTENDED
      bitfields:
        - name: CKSEL
          byte: 0
          mask: 0x0f
          default: 1
        - name: CKDIV8
          byte: 0
          mask: 0x80
          default: 0
        - name: BODLEVEL
          byte: 2
          mask: 0x03
          default: 3
        - name: EESAVE
          byte: 1
          mask: 0x40
          default: 1
  - name: empty
"#;

    fn registry() -> Registry {
        let mut registry = Registry::empty();
        registry.add_target_family_from_yaml_str(FAMILY).unwrap();
        registry
    }

    #[test]
    fn identical_layout() {
        let registry = registry();
        let mut source = ByteValues::new(&registry, MemoryAreaKind::Fuse, "a").unwrap();
        source.set_values(&[0xc5, 0xf3]).unwrap();
        source.set_comment(Some("from a".to_string()));

        let (target, results) = source.convert_to(&registry, "a_clone").unwrap();

        assert_eq!(results.success_rate(), 100);
        assert_eq!(target.mcu_id(), "a_clone");
        assert_eq!(target.get_values(), &[0xc5, 0xf3]);
        assert_eq!(target.comment(), Some("from a"));
        assert!(target.is_dirty());
    }

    #[test]
    fn different_layout() {
        let registry = registry();
        let mut source = ByteValues::new(&registry, MemoryAreaKind::Fuse, "a").unwrap();
        // CKSEL 5, SUT 1, BODLEVEL 2, EESAVE 0
        source.set_values(&[0x15, 0x02]).unwrap();

        let (target, results) = source.convert_to(&registry, "b").unwrap();

        assert_eq!(
            results.iter().collect::<Vec<_>>(),
            vec![
                ("BODLEVEL", ConversionStatus::Success),
                ("CKDIV8", ConversionStatus::NotInSource),
                ("CKSEL", ConversionStatus::Success),
                ("EESAVE", ConversionStatus::Success),
                ("SUT", ConversionStatus::NotInTarget),
            ]
        );
        assert_eq!(results.success_rate(), 60);

        assert_eq!(target.get_named_value("CKSEL"), Ok(5));
        assert_eq!(target.get_named_value("BODLEVEL"), Ok(2));
        assert_eq!(target.get_named_value("EESAVE"), Ok(0));
        // CKDIV8 shares the byte with CKSEL and gets its default
        assert_eq!(target.get_named_value("CKDIV8"), Ok(0));
        assert_eq!(target.get_value(0), 0x75);
        assert!(results.unrepresentable().is_empty());
    }

    #[test]
    fn unrepresentable_values_are_skipped() {
        let registry = registry();
        let mut source = ByteValues::new(&registry, MemoryAreaKind::Fuse, "a").unwrap();
        source.set_value(1, 0x0f).unwrap();

        let (target, results) = source.convert_to(&registry, "b").unwrap();

        assert_eq!(results.status("BODLEVEL"), Some(ConversionStatus::Success));
        assert_eq!(results.unrepresentable(), &["BODLEVEL".to_string()]);
        assert_eq!(target.get_value(2), UNSET);
        assert_eq!(target.get_named_value("EESAVE"), Ok(1));
        assert!(results.to_string().contains("BODLEVEL: value not supported"));
    }

    #[test]
    fn unset_source_bytes_stay_unset() {
        let registry = registry();
        let source = ByteValues::new(&registry, MemoryAreaKind::Fuse, "a").unwrap();

        let (target, results) = source.convert_to(&registry, "b").unwrap();

        assert_eq!(target.get_values(), &[UNSET, UNSET, UNSET]);
        assert!(!target.is_dirty());
        assert_eq!(results.success_rate(), 60);
    }

    #[test]
    fn totals_match_the_union_of_names() {
        let registry = registry();
        let source = ByteValues::new(&registry, MemoryAreaKind::Fuse, "b").unwrap();
        let (_, results) = source.convert_to(&registry, "a").unwrap();

        let total = results.count(ConversionStatus::Success)
            + results.count(ConversionStatus::NotInSource)
            + results.count(ConversionStatus::NotInTarget);
        assert_eq!(total, 5);
        assert_eq!(results.len(), 5);
        assert_eq!(
            results
                .names_with_status(ConversionStatus::NotInTarget)
                .collect::<Vec<_>>(),
            vec!["CKDIV8"]
        );
    }

    #[test]
    fn empty_areas_convert_completely() {
        let registry = registry();
        let source = ByteValues::new(&registry, MemoryAreaKind::LockBits, "a").unwrap();
        let (target, results) = source.convert_to(&registry, "empty").unwrap();

        assert!(results.is_empty());
        assert_eq!(results.success_rate(), 100);
        assert_eq!(target.get_byte_count(), 0);
    }

    #[test]
    fn unknown_target() {
        let registry = registry();
        let source = ByteValues::new(&registry, MemoryAreaKind::Fuse, "a").unwrap();

        assert_eq!(
            source.convert_to(&registry, "zz").unwrap_err(),
            Error::UnknownMcu("zz".to_string())
        );
        assert!(source.convert_to(&registry, "").is_err());
    }

    #[test]
    fn conversion_is_repeatable() {
        let registry = registry();
        let mut source = ByteValues::new(&registry, MemoryAreaKind::Fuse, "b").unwrap();
        source.set_default_values();

        let first = source.convert_to(&registry, "a").unwrap();
        let second = source.convert_to(&registry, "a").unwrap();
        assert_eq!(first, second);
    }
}
