//! Change notification for [`ByteValues`](super::ByteValues).
//!
//! Every write to a `ByteValues` container computes the complete list of bit
//! fields whose value changed and hands that list to every registered
//! listener in one call. Listeners are invoked synchronously, on the writing
//! thread, in registration order.
//!
//! A listener must not write to the container that notified it. The
//! container is mutably borrowed for the whole dispatch, so a listener can
//! only attempt this through shared ownership (e.g. `Rc<RefCell<_>>`), which
//! fails at runtime.

use std::fmt;
use std::rc::Rc;

/// A single bit field which changed its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteValueChangeEvent {
    /// Name of the bit field.
    pub field_name: String,
    /// Index of the byte the field lives in.
    pub byte_index: usize,
    /// New unshifted value of the field, `-1` if the byte is now unset.
    pub new_field_value: i16,
    /// New value of the complete byte, `-1` if the byte is now unset.
    pub new_byte_value: i16,
}

/// Receives the change events of a [`ByteValues`](super::ByteValues) container.
///
/// Closures taking `&[ByteValueChangeEvent]` implement this trait.
pub trait ByteValuesChangeListener {
    /// Called once per write operation with all fields that changed.
    fn byte_values_changed(&self, events: &[ByteValueChangeEvent]);
}

impl<F> ByteValuesChangeListener for F
where
    F: Fn(&[ByteValueChangeEvent]),
{
    fn byte_values_changed(&self, events: &[ByteValueChangeEvent]) {
        self(events)
    }
}

/// The listeners registered on one container.
#[derive(Default)]
pub(crate) struct Listeners(Vec<Rc<dyn ByteValuesChangeListener>>);

impl Listeners {
    /// Registers a listener. Registering the same listener twice has no effect.
    pub fn add(&mut self, listener: Rc<dyn ByteValuesChangeListener>) -> bool {
        if self.position(&listener).is_some() {
            return false;
        }

        self.0.push(listener);
        true
    }

    /// Removes a listener. Unknown listeners are ignored.
    pub fn remove(&mut self, listener: &Rc<dyn ByteValuesChangeListener>) -> bool {
        match self.position(listener) {
            Some(index) => {
                self.0.remove(index);
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Hands the batch to every listener. Empty batches are not delivered.
    pub fn notify(&self, events: &[ByteValueChangeEvent]) {
        if events.is_empty() {
            return;
        }

        tracing::trace!(
            "Dispatching {} change events to {} listeners",
            events.len(),
            self.0.len()
        );

        for listener in &self.0 {
            listener.byte_values_changed(events);
        }
    }

    // Compare the data pointers only, vtable pointers of the same type may differ.
    fn position(&self, listener: &Rc<dyn ByteValuesChangeListener>) -> Option<usize> {
        let wanted = Rc::as_ptr(listener) as *const ();
        self.0
            .iter()
            .position(|registered| Rc::as_ptr(registered) as *const () == wanted)
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listeners({})", self.0.len())
    }
}
