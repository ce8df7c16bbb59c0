use avr_fuses::{
    builtin_registry, ByteValues, ConversionStatus, MemoryAreaKind, Registry, UNSET,
};
use pretty_assertions::assert_eq;
use test_case::test_case;

/// Two MCUs with six fuse bytes each, sharing only `CKSEL` and `SUT`.
const PARTIAL_OVERLAP: &str = r#"
name: Overlap
variants:
  - name: mcu_x
    fuses:
      bytes: [{name: F0}, {name: F1}, {name: F2}, {name: F3}, {name: F4}, {name: F5}]
      bitfields:
        - {name: CKSEL, byte: 0, mask: 0x0f, default: 2}
        - {name: SUT, byte: 0, mask: 0x30, default: 2}
        - {name: X_ONE, byte: 1, mask: 0x01, default: 1}
        - {name: X_TWO, byte: 2, mask: 0x01, default: 1}
        - {name: X_THREE, byte: 3, mask: 0x01, default: 1}
        - {name: X_FOUR, byte: 4, mask: 0x01, default: 1}
  - name: mcu_z
    fuses:
      bytes: [{name: F0}, {name: F1}]
      bitfields:
        - {name: CKSEL, byte: 0, mask: 0x0f, default: 2}
        - {name: SUT, byte: 0, mask: 0x30, default: 2}
        - {name: Z_ONE, byte: 1, mask: 0x01, default: 1}
        - {name: Z_TWO, byte: 1, mask: 0x02, default: 1}
        - {name: Z_THREE, byte: 1, mask: 0x04, default: 1}
        - {name: Z_FOUR, byte: 1, mask: 0x08, default: 1}
"#;

#[test]
fn identical_layouts_convert_completely() {
    let registry = builtin_registry();
    let mut source = ByteValues::new(registry, MemoryAreaKind::Fuse, "atxmega128a1").unwrap();
    source.set_default_values();
    assert_eq!(source.get_byte_count(), 6);

    let (target, results) = source.convert_to(registry, "atxmega64a1").unwrap();

    assert_eq!(results.success_rate(), 100);
    assert_eq!(target.get_values(), source.get_values());
}

#[test]
fn partially_overlapping_layouts() {
    let mut registry = Registry::empty();
    registry
        .add_target_family_from_yaml_str(PARTIAL_OVERLAP)
        .unwrap();

    let mut source = ByteValues::new(&registry, MemoryAreaKind::Fuse, "mcu_x").unwrap();
    source.set_values(&[0x1f, 0, 0, 0, 0, 0]).unwrap();

    let (target, results) = source.convert_to(&registry, "mcu_z").unwrap();

    assert_eq!(results.success_rate(), 20);
    assert_eq!(results.len(), 10);
    assert_eq!(results.status("Z_ONE"), Some(ConversionStatus::NotInSource));
    assert_eq!(results.status("X_ONE"), Some(ConversionStatus::NotInTarget));
    assert_eq!(results.status("CKSEL"), Some(ConversionStatus::Success));
    assert_eq!(results.status("BOOTRST"), None);

    assert_eq!(target.get_named_value("CKSEL").unwrap(), 0x0f);
    assert_eq!(target.get_named_value("SUT").unwrap(), 1);
    assert_eq!(target.get_value(1), UNSET);
}

#[test]
fn atmega328p_to_attiny85() {
    let registry = builtin_registry();
    let mut source = ByteValues::new(registry, MemoryAreaKind::Fuse, "atmega328p").unwrap();
    source.set_values(&[0xe2, 0xd6, 0xfd]).unwrap();
    source.set_comment(Some("arduino uno".to_string()));

    let (target, results) = source.convert_to(registry, "attiny85").unwrap();

    // 10 shared fields, BOOTSZ and BOOTRST are gone, SELFPRGEN is new
    assert_eq!(results.count(ConversionStatus::Success), 10);
    assert_eq!(
        results
            .names_with_status(ConversionStatus::NotInTarget)
            .collect::<Vec<_>>(),
        vec!["BOOTRST", "BOOTSZ"]
    );
    assert_eq!(results.status("SELFPRGEN"), Some(ConversionStatus::NotInSource));
    assert_eq!(results.success_rate(), 76);

    assert_eq!(target.get_named_value("CKSEL").unwrap(), 2);
    assert_eq!(target.get_named_value("BODLEVEL").unwrap(), 5);
    assert_eq!(target.get_named_value("SELFPRGEN").unwrap(), UNSET);
    assert_eq!(target.comment(), Some("arduino uno"));
}

#[test]
fn nothing_in_common() {
    let registry = builtin_registry();
    let mut source = ByteValues::new(registry, MemoryAreaKind::Calibration, "atmega8").unwrap();
    source.set_values(&[0xa0, 0xa1, 0xa2, 0xa3]).unwrap();

    let (target, results) = source.convert_to(registry, "atmega88").unwrap();

    assert_eq!(results.success_rate(), 0);
    assert_eq!(target.get_values(), &[UNSET]);
}

#[test_case("atmega16", "atmega32", MemoryAreaKind::Fuse)]
#[test_case("atmega328p", "attiny13", MemoryAreaKind::Fuse)]
#[test_case("atmega8", "attiny2313", MemoryAreaKind::LockBits)]
#[test_case("atxmega128a1", "atmega2560", MemoryAreaKind::LockBits)]
#[test_case("attiny85", "atxmega64a1", MemoryAreaKind::Calibration)]
fn totals_cover_all_field_names(from: &str, to: &str, kind: MemoryAreaKind) {
    let registry = builtin_registry();
    let mut source = ByteValues::new(registry, kind, from).unwrap();
    source.set_default_values();

    let (_, results) = source.convert_to(registry, to).unwrap();

    let mut names: Vec<String> = registry
        .get_descriptor(from, kind)
        .unwrap()
        .bit_fields
        .iter()
        .chain(registry.get_descriptor(to, kind).unwrap().bit_fields.iter())
        .map(|field| field.name.clone())
        .collect();
    names.sort();
    names.dedup();

    let total = results.count(ConversionStatus::Success)
        + results.count(ConversionStatus::NotInSource)
        + results.count(ConversionStatus::NotInTarget);
    assert_eq!(total, names.len());
}
