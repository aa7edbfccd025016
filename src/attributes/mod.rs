//! Attribute algebra: modifiers, attributes and bounded attributes.
//!
//! - [`Modifier`]: one operation (kind + operand + active flag)
//! - [`Attribute`]: a base value folded through a modifier stack
//! - [`RangeAttribute`]: an attribute clamped between two modifiable bounds
//! - [`CombatAttributes`]: the attribute set of a combat entity

pub mod number;
pub mod modifier;
pub mod attribute;
pub mod range;
pub mod key;
pub mod combat;

pub use number::AttributeNumber;
pub use modifier::{Modifier, ModifierKind};
pub use attribute::{Attribute, ModifierStack};
pub use range::RangeAttribute;
pub use key::{keys, AttributeKey};
pub use combat::{CombatAttributes, CombatAttributesInfo};
