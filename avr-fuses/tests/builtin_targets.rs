use avr_fuses::{builtin_registry, ByteValueChangeEvent, ByteValues, MemoryAreaKind, UNSET};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn defaults_of_all_builtin_mcus() {
    let registry = builtin_registry();

    for mcu in registry.mcu_ids() {
        for kind in MemoryAreaKind::ALL {
            let mut values = ByteValues::new(registry, kind, mcu).unwrap();
            values.set_default_values();

            for field in values.bit_field_descriptions() {
                let value = values.get_named_value(&field.name).unwrap();
                assert_eq!(
                    value,
                    i16::from(field.default_value),
                    "{mcu} {kind} {}",
                    field.name
                );
            }
        }
    }
}

#[test]
fn atmega328p_factory_fuses() {
    let registry = builtin_registry();
    let mut fuses = ByteValues::new(registry, MemoryAreaKind::Fuse, "atmega328p").unwrap();
    fuses.set_default_values();

    assert_eq!(fuses.get_values(), &[0x62, 0xd9, 0xff]);
    assert_eq!(fuses.byte_name(1), Some("HIGH"));
    assert_eq!(
        fuses.get_named_value_text("BODLEVEL").unwrap(),
        Some("Brown-out detection disabled")
    );
    assert_eq!(
        registry.find_by_signature([0x1e, 0x95, 0x0f]),
        Some("atmega328p")
    );
}

#[test]
fn reserved_bytes_stay_unset() {
    let registry = builtin_registry();
    let mut fuses = ByteValues::new(registry, MemoryAreaKind::Fuse, "atxmega128a1").unwrap();
    fuses.set_default_values();

    assert_eq!(fuses.get_value(3), UNSET);
    assert!(fuses.bit_field_descriptions().iter().all(|f| f.byte_index != 3));
}

#[test]
fn listener_sees_every_changed_field() {
    let registry = builtin_registry();
    let mut lock = ByteValues::new(registry, MemoryAreaKind::LockBits, "atmega328p").unwrap();
    lock.set_value(0, 0xff).unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    lock.add_change_listener(Rc::new(move |events: &[ByteValueChangeEvent]| {
        sink.borrow_mut()
            .extend(events.iter().map(|e| (e.field_name.clone(), e.new_field_value)))
    }));

    // BLB0 and LB change, BLB1 stays
    lock.set_value(0, 0xf0).unwrap();

    assert_eq!(
        *seen.borrow(),
        vec![("BLB0".to_string(), 0), ("LB".to_string(), 0)]
    );
}
