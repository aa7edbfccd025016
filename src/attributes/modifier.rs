//! Attribute modifiers.
//!
//! A [`Modifier`] is one operation (kind + operand + active flag) that
//! transforms a scalar value. Attributes keep a stack of them and fold the stack
//! over their base value on every read.
//!
//! ## Fold order
//!
//! Attributes do not fold in insertion order. They group by
//! [`ModifierKind::apply_order`]:
//!
//! | Rank | Kind               | Operation              |
//! |------|--------------------|------------------------|
//! | 0    | `Add`              | `v + x`                |
//! | 1    | `Subtract`         | `v - x`                |
//! | 2    | `AddPercent`       | `v + v * x / 100`      |
//! | 3    | `SubtractPercent`  | `v - v * x / 100`      |
//! | 4    | `Multiply`         | `v * x`                |
//! | 5    | `Divide`           | `v / x`                |
//! | 6    | `Set`              | `x`                    |
//!
//! Within one kind, insertion order wins.
//!
//! ## Identity
//!
//! `Modifier` is a cheap handle. Clones refer to the same modifier, and
//! equality is identity: two modifiers with the same kind and operand are still
//! different modifiers.
//!
//! ```
//! use rust_combat::attributes::{Modifier, ModifierKind};
//!
//! let haste = Modifier::new(ModifierKind::Multiply, 1.5);
//! assert_eq!(haste.apply(10.0f32).unwrap(), 15.0);
//!
//! haste.set_active(false);
//! assert_eq!(haste.apply(10.0f32).unwrap(), 10.0);
//!
//! assert_eq!(haste.clone(), haste);
//! assert_ne!(Modifier::new(ModifierKind::Multiply, 1.5), haste);
//! ```

use std::cell::Cell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::number::AttributeNumber;
use crate::core::{CombatError, ListenerId, Listeners, Result};

/// The operation a modifier performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModifierKind {
    /// Add the operand.
    Add,
    /// Subtract the operand.
    Subtract,
    /// Add `operand` percent of the running value.
    AddPercent,
    /// Subtract `operand` percent of the running value.
    SubtractPercent,
    /// Multiply by the operand.
    Multiply,
    /// Divide by the operand. A zero operand is an error.
    Divide,
    /// Replace the running value with the operand.
    Set,
}

impl ModifierKind {
    /// Every kind in fold order.
    pub const ALL: [ModifierKind; 7] = [
        ModifierKind::Add,
        ModifierKind::Subtract,
        ModifierKind::AddPercent,
        ModifierKind::SubtractPercent,
        ModifierKind::Multiply,
        ModifierKind::Divide,
        ModifierKind::Set,
    ];

    /// Position of this kind in the fold. Lower ranks are applied first.
    #[must_use]
    pub const fn apply_order(self) -> u8 {
        match self {
            ModifierKind::Add => 0,
            ModifierKind::Subtract => 1,
            ModifierKind::AddPercent => 2,
            ModifierKind::SubtractPercent => 3,
            ModifierKind::Multiply => 4,
            ModifierKind::Divide => 5,
            ModifierKind::Set => 6,
        }
    }

    /// Check if this kind belongs to the additive group.
    #[must_use]
    pub const fn is_additive(self) -> bool {
        matches!(
            self,
            ModifierKind::Add
                | ModifierKind::Subtract
                | ModifierKind::AddPercent
                | ModifierKind::SubtractPercent
        )
    }

    /// Apply this operation to `value`.
    pub fn fold(self, value: f64, operand: f64) -> Result<f64> {
        Ok(match self {
            ModifierKind::Add => value + operand,
            ModifierKind::Subtract => value - operand,
            ModifierKind::AddPercent => value + value * operand / 100.0,
            ModifierKind::SubtractPercent => value - value * operand / 100.0,
            ModifierKind::Multiply => value * operand,
            ModifierKind::Divide => {
                if operand == 0.0 {
                    return Err(CombatError::DivisionByZero { value });
                }
                value / operand
            }
            ModifierKind::Set => operand,
        })
    }
}

impl fmt::Display for ModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModifierKind::Add => "ADD",
            ModifierKind::Subtract => "SUBTRACT",
            ModifierKind::AddPercent => "ADD_PERCENT",
            ModifierKind::SubtractPercent => "SUBTRACT_PERCENT",
            ModifierKind::Multiply => "MULTIPLY",
            ModifierKind::Divide => "DIVIDE",
            ModifierKind::Set => "SET",
        };
        f.write_str(name)
    }
}

struct ModifierState {
    kind: ModifierKind,
    operand: Cell<f64>,
    active: Cell<bool>,
    listeners: Listeners<()>,
}

/// Shared handle to one modifier.
#[derive(Clone)]
pub struct Modifier {
    state: Rc<ModifierState>,
}

impl Modifier {
    /// Create an active modifier.
    pub fn new(kind: ModifierKind, operand: impl Into<f64>) -> Self {
        Self {
            state: Rc::new(ModifierState {
                kind,
                operand: Cell::new(operand.into()),
                active: Cell::new(true),
                listeners: Listeners::new(),
            }),
        }
    }

    /// The operation this modifier performs.
    #[must_use]
    pub fn kind(&self) -> ModifierKind {
        self.state.kind
    }

    /// The operand.
    #[must_use]
    pub fn operand(&self) -> f64 {
        self.state.operand.get()
    }

    /// Change the operand. Notifies listeners if the value changed.
    pub fn set_operand(&self, operand: f64) {
        let previous = self.state.operand.replace(operand);
        if previous != operand {
            self.state.listeners.notify(&());
        }
    }

    /// Check if the modifier takes part in folds.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.active.get()
    }

    /// Activate or deactivate. Notifies listeners if the flag changed.
    pub fn set_active(&self, active: bool) {
        let previous = self.state.active.replace(active);
        if previous != active {
            self.state.listeners.notify(&());
        }
    }

    /// Apply to a value of any attribute width.
    ///
    /// Inactive modifiers return `value` unchanged.
    pub fn apply<T: AttributeNumber>(&self, value: T) -> Result<T> {
        if !self.is_active() {
            return Ok(value);
        }
        let folded = self.state.kind.fold(value.to_f64(), self.operand())?;
        Ok(T::from_f64(folded))
    }

    /// Register a callback for operand and active-flag changes.
    pub fn on_changed(&self, listener: impl Fn() + 'static) -> ListenerId {
        self.state.listeners.add(move |_: &()| listener())
    }

    /// Remove a change callback.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.state.listeners.remove(id)
    }

    /// Number of registered change callbacks.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.state.listeners.len()
    }
}

impl PartialEq for Modifier {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl Eq for Modifier {}

impl Hash for Modifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Rc::as_ptr(&self.state), state);
    }
}

impl fmt::Debug for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modifier")
            .field("kind", &self.kind())
            .field("operand", &self.operand())
            .field("active", &self.is_active())
            .finish()
    }
}
