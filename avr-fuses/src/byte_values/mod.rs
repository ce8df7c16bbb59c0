//! The live byte values of one memory area of one MCU.

pub mod event;

use crate::config::{AreaDescription, BitFieldDescription, MemoryAreaKind, Registry};
use crate::conversion::{self, ConversionResults};
use crate::error::{ArgumentError, Error};
use event::Listeners;
use std::rc::Rc;
use std::sync::Arc;

pub use event::{ByteValueChangeEvent, ByteValuesChangeListener};

/// Marks a byte (and every bit field inside it) as unset or unknown.
pub const UNSET: i16 = -1;

/// The state a byte has before it was ever programmed.
const UNPROGRAMMED: u8 = 0xff;

/// The values of all bytes of one memory area, e.g. the fuse bytes of an
/// `atmega328p`.
///
/// Every byte can be accessed directly by its index or through the named bit
/// fields of the MCU. Bytes hold either a value in `0..=255` or [`UNSET`].
///
/// The MCU of a container never changes, use [`ByteValues::convert_to`] to
/// get the values for a different MCU.
///
/// Containers are not thread-safe; registered listeners are called on the
/// thread performing the write.
#[derive(Debug)]
pub struct ByteValues {
    kind: MemoryAreaKind,
    mcu_id: String,
    descriptor: Arc<AreaDescription>,
    values: Vec<i16>,
    comment: Option<String>,
    dirty: bool,
    listeners: Listeners,
}

impl ByteValues {
    /// Creates a container for the given MCU with all bytes unset.
    pub fn new(registry: &Registry, kind: MemoryAreaKind, mcu_id: &str) -> Result<Self, Error> {
        if mcu_id.is_empty() {
            return Err(Error::UnknownMcu(String::new()));
        }

        let descriptor = registry
            .get_descriptor(mcu_id, kind)
            .ok_or_else(|| Error::UnknownMcu(mcu_id.to_string()))?;

        Ok(Self::with_descriptor(kind, mcu_id, descriptor))
    }

    /// Creates a container from an already resolved description, with all
    /// bytes unset.
    pub fn with_descriptor(
        kind: MemoryAreaKind,
        mcu_id: impl Into<String>,
        descriptor: Arc<AreaDescription>,
    ) -> Self {
        Self {
            kind,
            mcu_id: mcu_id.into(),
            values: vec![UNSET; descriptor.byte_count()],
            descriptor,
            comment: None,
            dirty: false,
            listeners: Listeners::default(),
        }
    }

    /// The kind of memory area these values belong to.
    pub fn kind(&self) -> MemoryAreaKind {
        self.kind
    }

    /// The MCU these values belong to.
    pub fn mcu_id(&self) -> &str {
        &self.mcu_id
    }

    /// The layout of the memory area.
    pub fn descriptor(&self) -> &Arc<AreaDescription> {
        &self.descriptor
    }

    /// Number of bytes.
    pub fn get_byte_count(&self) -> usize {
        self.values.len()
    }

    /// Returns the value of a byte.
    ///
    /// Unlike the write accessors this never fails: an index out of range
    /// yields [`UNSET`].
    pub fn get_value(&self, index: usize) -> i16 {
        self.values.get(index).copied().unwrap_or(UNSET)
    }

    /// All byte values.
    pub fn get_values(&self) -> &[i16] {
        &self.values
    }

    /// Sets a single byte.
    pub fn set_value(&mut self, index: usize, value: i16) -> Result<(), Error> {
        check_byte_value(value)?;
        if index >= self.values.len() {
            return Err(ArgumentError::IndexOutOfRange {
                index,
                byte_count: self.values.len(),
            }
            .into());
        }

        self.write_bytes([(index, value)]);
        Ok(())
    }

    /// Sets the bytes from the start of `values`.
    ///
    /// Surplus values are ignored and missing values leave the remaining
    /// bytes untouched. Nothing is written if any of the used values is out
    /// of range. Listeners are notified once for the whole call.
    pub fn set_values(&mut self, values: &[i16]) -> Result<(), Error> {
        let values = &values[..values.len().min(self.values.len())];
        for value in values {
            check_byte_value(*value)?;
        }

        self.write_bytes(values.iter().copied().enumerate());
        Ok(())
    }

    /// Sets all bytes to [`UNSET`].
    pub fn clear_values(&mut self) {
        let count = self.values.len();
        self.write_bytes((0..count).map(|index| (index, UNSET)));
    }

    /// Sets all bytes to the defaults of their bit fields.
    ///
    /// Bytes without any bit field are set to [`UNSET`].
    pub fn set_default_values(&mut self) {
        let defaults: Vec<(usize, i16)> = (0..self.values.len())
            .map(|index| {
                let value = self.default_byte(index).map_or(UNSET, i16::from);
                (index, value)
            })
            .collect();

        self.write_bytes(defaults);
    }

    /// Returns the unshifted value of a bit field.
    ///
    /// The value is [`UNSET`] if the byte holding the field is unset.
    pub fn get_named_value(&self, name: &str) -> Result<i16, Error> {
        let field = self.lookup_field(name)?;
        Ok(field_value(field, self.get_value(field.byte_index)))
    }

    /// Returns the label of the current value of a bit field.
    pub fn get_named_value_text(&self, name: &str) -> Result<Option<&str>, Error> {
        let field = self.lookup_field(name)?;
        let value = field_value(field, self.get_value(field.byte_index));

        Ok(u8::try_from(value).ok().and_then(|value| field.label(value)))
    }

    /// Sets the unshifted value of a bit field.
    ///
    /// All other bits of the byte keep their value. If the byte is unset, the
    /// other fields of the byte are set to their defaults.
    pub fn set_named_value(&mut self, name: &str, value: i16) -> Result<(), Error> {
        let field = self.lookup_field(name)?;
        if !field.is_legal(value) {
            return Err(ArgumentError::FieldValueOutOfRange {
                name: name.to_string(),
                value,
            }
            .into());
        }

        let index = field.byte_index;
        let base = match u8::try_from(self.get_value(index)) {
            Ok(current) => current,
            Err(_) => self.default_byte(index).unwrap_or(UNPROGRAMMED),
        };
        // `is_legal` guarantees the value fits into a u8.
        let new_byte = field.insert(base, value as u8);

        self.write_bytes([(index, i16::from(new_byte))]);
        Ok(())
    }

    /// All bit fields of the memory area.
    pub fn bit_field_descriptions(&self) -> &[BitFieldDescription] {
        &self.descriptor.bit_fields
    }

    /// The bit field with the given name.
    pub fn bit_field_description(&self, name: &str) -> Option<&BitFieldDescription> {
        self.descriptor.bit_field(name)
    }

    /// The name of the byte with the given index, e.g. `HIGH`.
    pub fn byte_name(&self, index: usize) -> Option<&str> {
        self.descriptor.byte_name(index)
    }

    /// Returns `true` if any value changed since the container was created or
    /// last marked clean.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the dirty flag, usually after the values were saved.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Free-form text describing the origin of the values.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Replaces the comment. This does not mark the values as dirty.
    pub fn set_comment(&mut self, comment: Option<String>) {
        self.comment = comment;
    }

    /// Registers a listener for value changes.
    ///
    /// Registering the same listener twice has no effect. Listeners are not
    /// carried over to clones.
    pub fn add_change_listener(&mut self, listener: Rc<dyn ByteValuesChangeListener>) {
        self.listeners.add(listener);
    }

    /// Removes a listener. Removing a listener which is not registered does nothing.
    pub fn remove_change_listener(&mut self, listener: &Rc<dyn ByteValuesChangeListener>) {
        self.listeners.remove(listener);
    }

    /// Converts the values to a different MCU by matching the bit fields by name.
    ///
    /// See [`conversion::convert`] for details.
    pub fn convert_to(
        &self,
        registry: &Registry,
        target_mcu_id: &str,
    ) -> Result<(ByteValues, ConversionResults), Error> {
        conversion::convert(registry, self, target_mcu_id)
    }

    fn lookup_field(&self, name: &str) -> Result<&BitFieldDescription, Error> {
        if name.is_empty() {
            return Err(ArgumentError::EmptyBitFieldName.into());
        }

        self.descriptor
            .bit_field(name)
            .ok_or_else(|| ArgumentError::UnknownBitField(name.to_string()).into())
    }

    /// The default of a byte, built from the defaults of its bit fields.
    /// `None` if no field lives in the byte.
    fn default_byte(&self, index: usize) -> Option<u8> {
        let mut fields = self.descriptor.bit_fields_in_byte(index).peekable();
        fields.peek()?;

        let base = self
            .descriptor
            .bytes
            .get(index)
            .and_then(|byte| byte.default)
            .unwrap_or(UNPROGRAMMED);

        Some(fields.fold(base, |byte, field| field.insert(byte, field.default_value)))
    }

    /// Writes already validated values and notifies the listeners once with
    /// every bit field that changed.
    fn write_bytes(&mut self, writes: impl IntoIterator<Item = (usize, i16)>) {
        let mut events = Vec::new();

        for (index, new_value) in writes {
            let old_value = self.values[index];
            if old_value == new_value {
                continue;
            }

            self.values[index] = new_value;
            self.dirty = true;

            for field in self.descriptor.bit_fields_in_byte(index) {
                let new_field_value = field_value(field, new_value);
                if field_value(field, old_value) != new_field_value {
                    events.push(ByteValueChangeEvent {
                        field_name: field.name.clone(),
                        byte_index: index,
                        new_field_value,
                        new_byte_value: new_value,
                    });
                }
            }
        }

        self.listeners.notify(&events);
    }
}

impl Clone for ByteValues {
    /// Copies the values, but not the listeners.
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            mcu_id: self.mcu_id.clone(),
            descriptor: Arc::clone(&self.descriptor),
            values: self.values.clone(),
            comment: self.comment.clone(),
            dirty: self.dirty,
            listeners: Listeners::default(),
        }
    }
}

impl PartialEq for ByteValues {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.mcu_id == other.mcu_id
            && self.values == other.values
            && self.comment == other.comment
    }
}

impl Eq for ByteValues {}

fn check_byte_value(value: i16) -> Result<(), Error> {
    if (UNSET..=255).contains(&value) {
        Ok(())
    } else {
        Err(ArgumentError::ByteValueOutOfRange(value).into())
    }
}

fn field_value(field: &BitFieldDescription, byte: i16) -> i16 {
    match u8::try_from(byte) {
        Ok(byte) => i16::from(field.extract(byte)),
        Err(_) => UNSET,
    }
}
