//! Bounded attributes.
//!
//! A [`RangeAttribute`] is three [`Attribute`]s in one: the value and its two
//! bounds, each with its own modifier stack. Reads clamp the folded value into
//! `[min, max]`, and changes to the bounds reclamp the stored base right away.
//!
//! If modifiers push the minimum above the maximum, the value collapses to the
//! maximum.
//!
//! ```
//! use rust_combat::attributes::{Modifier, ModifierKind, RangeAttribute};
//!
//! let mut mana = RangeAttribute::new(5i8, 1, 10);
//! mana.add_modifier(&Modifier::new(ModifierKind::Multiply, 3));
//! assert_eq!(mana.get().unwrap(), 10);
//! assert_eq!(mana.ratio().unwrap(), 1.0);
//! ```

use std::fmt;
use std::rc::Rc;

use super::attribute::{Attribute, ModifierStack};
use super::modifier::{Modifier, ModifierKind};
use super::number::AttributeNumber;
use crate::core::{ListenerId, Listeners, Result};

/// Clamp into `[lo, hi]`; an inverted range yields `hi`.
fn clamp<T: AttributeNumber>(value: T, lo: T, hi: T) -> T {
    if lo > hi {
        hi
    } else if value < lo {
        lo
    } else if value > hi {
        hi
    } else {
        value
    }
}

/// An attribute clamped between two modifiable bounds.
pub struct RangeAttribute<T: AttributeNumber> {
    value: Attribute<T>,
    min: Attribute<T>,
    max: Attribute<T>,
    listeners: Rc<Listeners<()>>,
}

impl<T: AttributeNumber> RangeAttribute<T> {
    /// Create a range attribute. The value is clamped into `[min, max]`.
    pub fn new(value: T, min: T, max: T) -> Self {
        let listeners = Rc::new(Listeners::new());
        Self {
            value: Attribute::with_listeners(clamp(value, min, max), listeners.clone()),
            min: Attribute::with_listeners(min, listeners.clone()),
            max: Attribute::with_listeners(max, listeners.clone()),
            listeners,
        }
    }

    /// The effective value clamped into the modified bounds.
    pub fn get(&self) -> Result<T> {
        Ok(clamp(self.value.get()?, self.min()?, self.max()?))
    }

    /// The modified minimum.
    pub fn min(&self) -> Result<T> {
        self.min.get()
    }

    /// The modified maximum.
    pub fn max(&self) -> Result<T> {
        self.max.get()
    }

    /// Position of the value inside the range, in `[0, 1]`.
    ///
    /// Zero when the range is empty.
    pub fn ratio(&self) -> Result<f64> {
        let value = self.get()?.to_f64();
        let min = self.min()?.to_f64();
        let span = self.max()?.to_f64() - min;
        if span == 0.0 {
            return Ok(0.0);
        }
        Ok(((value - min) / span).clamp(0.0, 1.0))
    }

    /// The raw stored value.
    #[must_use]
    pub fn base_value(&self) -> T {
        self.value.base()
    }

    /// The raw minimum.
    #[must_use]
    pub fn min_base_value(&self) -> T {
        self.min.base()
    }

    /// The raw maximum.
    #[must_use]
    pub fn max_base_value(&self) -> T {
        self.max.base()
    }

    /// Replace the stored value, clamped into the current bounds.
    pub fn set_base_value(&mut self, value: T) -> Result<()> {
        let clamped = clamp(value, self.min()?, self.max()?);
        self.value.set_base_value(clamped);
        Ok(())
    }

    /// Permanently shift the stored value, clamped into the current bounds.
    pub fn modify_base_value(&mut self, modifier: &Modifier) -> Result<()> {
        let shifted = modifier.apply(self.value.base())?;
        self.set_base_value(shifted)
    }

    /// Permanently shift the stored value by a one-off operation.
    pub fn modify_base_value_by(&mut self, kind: ModifierKind, operand: f64) -> Result<()> {
        self.modify_base_value(&Modifier::new(kind, operand))
    }

    /// Replace the raw minimum and reclamp the stored value.
    pub fn set_min_base_value(&mut self, min: T) -> Result<()> {
        self.min.replace_base(min);
        self.reclamp()
    }

    /// Replace the raw maximum and reclamp the stored value.
    pub fn set_max_base_value(&mut self, max: T) -> Result<()> {
        self.max.replace_base(max);
        self.reclamp()
    }

    /// Permanently shift the raw minimum and reclamp the stored value.
    pub fn modify_min_base_value(&mut self, modifier: &Modifier) -> Result<()> {
        let min = modifier.apply(self.min.base())?;
        self.set_min_base_value(min)
    }

    /// Permanently shift the raw maximum and reclamp the stored value.
    pub fn modify_max_base_value(&mut self, modifier: &Modifier) -> Result<()> {
        let max = modifier.apply(self.max.base())?;
        self.set_max_base_value(max)
    }

    /// Set the stored value to the modified minimum.
    pub fn set_to_min(&mut self) -> Result<()> {
        let min = self.min()?;
        self.value.set_base_value(min);
        Ok(())
    }

    /// Set the stored value to the modified maximum.
    pub fn set_to_max(&mut self) -> Result<()> {
        let max = self.max()?;
        self.value.set_base_value(max);
        Ok(())
    }

    /// Stack a modifier on the value.
    pub fn add_modifier(&mut self, modifier: &Modifier) -> bool {
        self.value.add_modifier(modifier)
    }

    /// Remove a modifier from the value.
    pub fn remove_modifier(&mut self, modifier: &Modifier) -> bool {
        self.value.remove_modifier(modifier)
    }

    /// Check whether a modifier is stacked on the value.
    #[must_use]
    pub fn is_modifier_applied(&self, modifier: &Modifier) -> bool {
        self.value.is_modifier_applied(modifier)
    }

    /// Stack a modifier on the minimum.
    pub fn add_min_modifier(&mut self, modifier: &Modifier) -> Result<bool> {
        let added = self.min.insert_modifier(modifier);
        if added {
            self.reclamp()?;
        }
        Ok(added)
    }

    /// Remove a modifier from the minimum.
    pub fn remove_min_modifier(&mut self, modifier: &Modifier) -> Result<bool> {
        let removed = self.min.take_modifier(modifier);
        if removed {
            self.reclamp()?;
        }
        Ok(removed)
    }

    /// Stack a modifier on the maximum.
    pub fn add_max_modifier(&mut self, modifier: &Modifier) -> Result<bool> {
        let added = self.max.insert_modifier(modifier);
        if added {
            self.reclamp()?;
        }
        Ok(added)
    }

    /// Remove a modifier from the maximum.
    pub fn remove_max_modifier(&mut self, modifier: &Modifier) -> Result<bool> {
        let removed = self.max.take_modifier(modifier);
        if removed {
            self.reclamp()?;
        }
        Ok(removed)
    }

    /// Modifiers stacked on the value, in fold order.
    pub fn modifiers(&self) -> impl Iterator<Item = &Modifier> + '_ {
        self.value.modifiers()
    }

    /// Modifiers stacked on the minimum, in fold order.
    pub fn min_modifiers(&self) -> impl Iterator<Item = &Modifier> + '_ {
        self.min.modifiers()
    }

    /// Modifiers stacked on the maximum, in fold order.
    pub fn max_modifiers(&self) -> impl Iterator<Item = &Modifier> + '_ {
        self.max.modifiers()
    }

    /// Register a callback fired when the value or either bound may have changed.
    pub fn on_value_changed(&self, listener: impl Fn() + 'static) -> ListenerId {
        self.listeners.add(move |_: &()| listener())
    }

    /// Remove a value-changed callback.
    pub fn remove_value_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Clamp the stored value into the bounds after a bound change, then
    /// notify once. Listeners still fire when a bound fails to fold.
    fn reclamp(&mut self) -> Result<()> {
        let bounds = self.min().and_then(|min| Ok((min, self.max()?)));
        if let Ok((min, max)) = &bounds {
            let clamped = clamp(self.value.base(), *min, *max);
            self.value.replace_base(clamped);
        }
        self.listeners.notify(&());
        bounds.map(|_| ())
    }
}

impl<T: AttributeNumber> ModifierStack for RangeAttribute<T> {
    fn add_modifier(&mut self, modifier: &Modifier) -> bool {
        RangeAttribute::add_modifier(self, modifier)
    }

    fn remove_modifier(&mut self, modifier: &Modifier) -> bool {
        RangeAttribute::remove_modifier(self, modifier)
    }

    fn is_modifier_applied(&self, modifier: &Modifier) -> bool {
        RangeAttribute::is_modifier_applied(self, modifier)
    }

    fn value_f64(&self) -> Result<f64> {
        self.get().map(AttributeNumber::to_f64)
    }
}

impl<T: AttributeNumber> fmt::Debug for RangeAttribute<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeAttribute")
            .field("value", &self.value)
            .field("min", &self.min)
            .field("max", &self.max)
            .finish()
    }
}
