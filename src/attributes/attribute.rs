//! Modifiable scalar attributes.
//!
//! An [`Attribute`] owns a base value and a stack of [`Modifier`]s. Reading it
//! folds the stack over the base in the canonical kind order (see
//! [`ModifierKind::apply_order`]). Adding modifiers is transient: remove them
//! again and the base shows through. Changing the base is permanent.
//!
//! ## Change notifications
//!
//! `on_value_changed` listeners fire whenever `get()` could return something
//! new: base changes, stack membership changes, and operand or active-flag
//! changes of any stacked modifier.
//!
//! ```
//! use rust_combat::attributes::{Attribute, Modifier, ModifierKind};
//!
//! let mut strength = Attribute::new(10);
//! let rage = Modifier::new(ModifierKind::Multiply, 2);
//! strength.add_modifier(&rage);
//! assert_eq!(strength.get().unwrap(), 20);
//!
//! let ring = Modifier::new(ModifierKind::Add, 50);
//! strength.add_modifier(&ring);
//! assert_eq!(strength.get().unwrap(), 120);
//! ```

use std::fmt;
use std::rc::Rc;

use super::modifier::{Modifier, ModifierKind};
use super::number::AttributeNumber;
use crate::core::{ListenerId, Listeners, Result};

/// A modifier on a stack, plus the subscription forwarding its changes.
struct StackedModifier {
    modifier: Modifier,
    subscription: ListenerId,
}

/// Operations shared by every modifiable attribute, independent of its width.
///
/// Attribute effects use this to stack one modifier on an attribute chosen by
/// name at runtime.
pub trait ModifierStack {
    /// Add a modifier. Returns `false` if it was already stacked.
    fn add_modifier(&mut self, modifier: &Modifier) -> bool;

    /// Remove a modifier. Returns `false` if it was not stacked.
    fn remove_modifier(&mut self, modifier: &Modifier) -> bool;

    /// Check whether this exact modifier is stacked.
    fn is_modifier_applied(&self, modifier: &Modifier) -> bool;

    /// The effective value widened to `f64`.
    fn value_f64(&self) -> Result<f64>;
}

/// A base value plus an ordered modifier stack.
pub struct Attribute<T: AttributeNumber> {
    base: T,
    modifiers: Vec<StackedModifier>,
    listeners: Rc<Listeners<()>>,
}

impl<T: AttributeNumber> Attribute<T> {
    /// Create an attribute with no modifiers.
    pub fn new(base: T) -> Self {
        Self::with_listeners(base, Rc::new(Listeners::new()))
    }

    /// Create an attribute that reports changes to an existing registry.
    pub(crate) fn with_listeners(base: T, listeners: Rc<Listeners<()>>) -> Self {
        Self {
            base,
            modifiers: Vec::new(),
            listeners,
        }
    }

    /// The effective value: base folded through every active modifier.
    pub fn get(&self) -> Result<T> {
        self.apply_modifiers(self.base)
    }

    /// Fold the stack over an arbitrary value.
    pub fn apply_modifiers(&self, value: T) -> Result<T> {
        self.modifiers
            .iter()
            .try_fold(value, |current, stacked| stacked.modifier.apply(current))
    }

    /// The raw base value.
    #[must_use]
    pub fn base(&self) -> T {
        self.base
    }

    /// Replace the base value.
    pub fn set_base_value(&mut self, base: T) {
        self.replace_base(base);
        self.listeners.notify(&());
    }

    /// Permanently shift the base value by applying `modifier` to it once.
    ///
    /// The modifier is not stacked. On error the base is left untouched.
    pub fn modify_base_value(&mut self, modifier: &Modifier) -> Result<()> {
        let base = modifier.apply(self.base)?;
        self.set_base_value(base);
        Ok(())
    }

    /// Permanently shift the base value by a one-off operation.
    pub fn modify_base_value_by(&mut self, kind: ModifierKind, operand: f64) -> Result<()> {
        self.modify_base_value(&Modifier::new(kind, operand))
    }

    /// Stack a modifier. Adding one that is already stacked does nothing.
    pub fn add_modifier(&mut self, modifier: &Modifier) -> bool {
        let added = self.insert_modifier(modifier);
        if added {
            self.listeners.notify(&());
        }
        added
    }

    /// Remove a stacked modifier. Removing an absent one does nothing.
    pub fn remove_modifier(&mut self, modifier: &Modifier) -> bool {
        let removed = self.take_modifier(modifier);
        if removed {
            self.listeners.notify(&());
        }
        removed
    }

    /// Replace the base value without notifying.
    pub(crate) fn replace_base(&mut self, base: T) {
        self.base = base;
    }

    /// Stack a modifier without notifying. The modifier's own changes still
    /// notify once it is stacked.
    pub(crate) fn insert_modifier(&mut self, modifier: &Modifier) -> bool {
        if self.is_modifier_applied(modifier) {
            return false;
        }

        let rank = modifier.kind().apply_order();
        let index = self
            .modifiers
            .partition_point(|stacked| stacked.modifier.kind().apply_order() <= rank);

        let listeners = Rc::downgrade(&self.listeners);
        let subscription = modifier.on_changed(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners.notify(&());
            }
        });

        self.modifiers.insert(
            index,
            StackedModifier {
                modifier: modifier.clone(),
                subscription,
            },
        );
        true
    }

    /// Remove a stacked modifier without notifying.
    pub(crate) fn take_modifier(&mut self, modifier: &Modifier) -> bool {
        let Some(index) = self
            .modifiers
            .iter()
            .position(|stacked| stacked.modifier == *modifier)
        else {
            return false;
        };

        let stacked = self.modifiers.remove(index);
        stacked.modifier.remove_listener(stacked.subscription);
        true
    }

    /// Check whether this exact modifier is stacked.
    #[must_use]
    pub fn is_modifier_applied(&self, modifier: &Modifier) -> bool {
        self.modifiers
            .iter()
            .any(|stacked| stacked.modifier == *modifier)
    }

    /// Stacked modifiers in fold order.
    pub fn modifiers(&self) -> impl Iterator<Item = &Modifier> + '_ {
        self.modifiers.iter().map(|stacked| &stacked.modifier)
    }

    /// Number of stacked modifiers.
    #[must_use]
    pub fn modifier_count(&self) -> usize {
        self.modifiers.len()
    }

    /// Register a callback fired whenever the effective value may have changed.
    pub fn on_value_changed(&self, listener: impl Fn() + 'static) -> ListenerId {
        self.listeners.add(move |_: &()| listener())
    }

    /// Remove a value-changed callback.
    pub fn remove_value_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }
}

impl<T: AttributeNumber> ModifierStack for Attribute<T> {
    fn add_modifier(&mut self, modifier: &Modifier) -> bool {
        Attribute::add_modifier(self, modifier)
    }

    fn remove_modifier(&mut self, modifier: &Modifier) -> bool {
        Attribute::remove_modifier(self, modifier)
    }

    fn is_modifier_applied(&self, modifier: &Modifier) -> bool {
        Attribute::is_modifier_applied(self, modifier)
    }

    fn value_f64(&self) -> Result<f64> {
        self.get().map(AttributeNumber::to_f64)
    }
}

impl<T: AttributeNumber> Drop for Attribute<T> {
    fn drop(&mut self) {
        for stacked in &self.modifiers {
            stacked.modifier.remove_listener(stacked.subscription);
        }
    }
}

impl<T: AttributeNumber> fmt::Debug for Attribute<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("base", &self.base)
            .field("modifiers", &self.modifiers().collect::<Vec<_>>())
            .finish()
    }
}

impl<T: AttributeNumber> fmt::Display for Attribute<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Ok(value) => write!(f, "{value}"),
            Err(err) => write!(f, "<{err}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::Cell;

    #[test]
    fn test_additive_before_multiplicative() {
        let mut attribute = Attribute::new(10);
        let multiply = Modifier::new(ModifierKind::Multiply, 2);
        let add = Modifier::new(ModifierKind::Add, 50);

        attribute.add_modifier(&multiply);
        assert_eq!(attribute.get().unwrap(), 20);

        attribute.add_modifier(&add);
        assert_eq!(attribute.get().unwrap(), 120);
        assert_eq!(attribute.modifiers().collect::<Vec<_>>(), vec![&add, &multiply]);
    }

    #[test]
    fn test_set_comes_last() {
        let mut attribute = Attribute::new(5.0f64);
        attribute.add_modifier(&Modifier::new(ModifierKind::Set, 1.0));
        attribute.add_modifier(&Modifier::new(ModifierKind::Multiply, 10.0));
        attribute.add_modifier(&Modifier::new(ModifierKind::Add, 3.0));
        assert_eq!(attribute.get().unwrap(), 1.0);
    }

    #[test]
    fn test_percent_kinds_use_running_value() {
        let mut attribute = Attribute::new(100.0f64);
        attribute.add_modifier(&Modifier::new(ModifierKind::Add, 100.0));
        attribute.add_modifier(&Modifier::new(ModifierKind::AddPercent, 50.0));
        attribute.add_modifier(&Modifier::new(ModifierKind::SubtractPercent, 10.0));
        // (100 + 100) * 1.5 * 0.9
        assert_eq!(attribute.get().unwrap(), 270.0);
    }

    #[test]
    fn test_add_and_remove_are_idempotent() {
        let mut attribute = Attribute::new(1);
        let modifier = Modifier::new(ModifierKind::Add, 1);

        assert!(attribute.add_modifier(&modifier));
        assert!(!attribute.add_modifier(&modifier));
        assert_eq!(attribute.modifier_count(), 1);
        assert_eq!(modifier.listener_count(), 1);

        assert!(attribute.remove_modifier(&modifier));
        assert!(!attribute.remove_modifier(&modifier));
        assert_eq!(attribute.modifier_count(), 0);
        assert_eq!(modifier.listener_count(), 0);
        assert_eq!(attribute.get().unwrap(), 1);
    }

    #[test]
    fn test_inactive_modifier_stays_registered() {
        let mut attribute = Attribute::new(10);
        let modifier = Modifier::new(ModifierKind::Add, 5);
        attribute.add_modifier(&modifier);

        modifier.set_active(false);
        assert!(attribute.is_modifier_applied(&modifier));
        assert_eq!(attribute.get().unwrap(), 10);

        modifier.set_active(true);
        assert_eq!(attribute.get().unwrap(), 15);
    }

    #[test]
    fn test_modify_base_value() {
        let mut attribute = Attribute::new(10);
        attribute.modify_base_value(&Modifier::new(ModifierKind::Add, 5)).unwrap();
        assert_eq!(attribute.base(), 15);
        assert_eq!(attribute.modifier_count(), 0);

        attribute.modify_base_value_by(ModifierKind::Multiply, 2.0).unwrap();
        assert_eq!(attribute.get().unwrap(), 30);
    }

    #[test]
    fn test_modify_base_value_division_by_zero_keeps_base() {
        let mut attribute = Attribute::new(10);
        let result = attribute.modify_base_value_by(ModifierKind::Divide, 0.0);
        assert!(result.is_err());
        assert_eq!(attribute.base(), 10);
    }

    #[test]
    fn test_value_changed_notifications() {
        let mut attribute = Attribute::new(1);
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        attribute.on_value_changed(move || counter.set(counter.get() + 1));

        let modifier = Modifier::new(ModifierKind::Add, 1);
        attribute.add_modifier(&modifier);
        attribute.add_modifier(&modifier);
        assert_eq!(calls.get(), 1);

        modifier.set_operand(4.0);
        assert_eq!(calls.get(), 2);

        attribute.set_base_value(3);
        attribute.remove_modifier(&modifier);
        assert_eq!(calls.get(), 4);

        modifier.set_operand(5.0);
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn test_drop_unsubscribes_from_modifiers() {
        let modifier = Modifier::new(ModifierKind::Add, 1);
        {
            let mut attribute = Attribute::new(0);
            attribute.add_modifier(&modifier);
            assert_eq!(modifier.listener_count(), 1);
        }
        assert_eq!(modifier.listener_count(), 0);
    }

    #[test]
    fn test_display() {
        let mut attribute = Attribute::new(7);
        assert_eq!(attribute.to_string(), "7");
        attribute.add_modifier(&Modifier::new(ModifierKind::Divide, 0));
        assert_eq!(attribute.to_string(), "<division by zero while modifying 7>");
    }

    fn kind_strategy() -> impl Strategy<Value = ModifierKind> {
        prop::sample::select(ModifierKind::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_get_ignores_insertion_order_across_kinds(
            base in -1_000i32..1_000,
            ops in prop::collection::vec((kind_strategy(), 1i32..20), 0..8),
        ) {
            let modifiers: Vec<Modifier> = ops
                .iter()
                .map(|(kind, operand)| Modifier::new(*kind, *operand))
                .collect();

            let mut forward = Attribute::new(base);
            for modifier in &modifiers {
                forward.add_modifier(modifier);
            }

            // Same relative order inside each kind, kinds interleaved differently.
            let mut grouped = Attribute::new(base);
            for kind in ModifierKind::ALL.iter().rev() {
                for modifier in modifiers.iter().filter(|m| m.kind() == *kind) {
                    grouped.add_modifier(modifier);
                }
            }

            prop_assert_eq!(forward.get().unwrap(), grouped.get().unwrap());
        }

        #[test]
        fn prop_double_add_keeps_stack_size(ops in prop::collection::vec((kind_strategy(), 1i32..20), 1..8)) {
            let mut attribute = Attribute::new(1i64);
            let modifiers: Vec<Modifier> = ops
                .iter()
                .map(|(kind, operand)| Modifier::new(*kind, *operand))
                .collect();
            for modifier in &modifiers {
                attribute.add_modifier(modifier);
                attribute.add_modifier(modifier);
            }
            prop_assert_eq!(attribute.modifier_count(), modifiers.len());
        }
    }
}
