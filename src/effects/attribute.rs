//! Attribute effects: stack one modifier on a named attribute.

use super::effect::{EffectBehavior, EffectContext};
use crate::attributes::{AttributeKey, Modifier};
use crate::core::{CombatError, Result};
use crate::entities::EntityRef;

/// Stacks a modifier on an attribute of every affected entity while applied.
///
/// ```
/// use rust_combat::attributes::{keys, Modifier, ModifierKind};
/// use rust_combat::effects::AttributeEffect;
///
/// let slow = AttributeEffect::new(keys::VELOCITY, Modifier::new(ModifierKind::Multiply, 0.5));
/// assert_eq!(slow.key().as_str(), "velocity");
/// ```
#[derive(Clone, Debug)]
pub struct AttributeEffect {
    key: AttributeKey,
    modifier: Modifier,
}

impl AttributeEffect {
    /// Modify the attribute named `key`.
    pub fn new(key: impl Into<AttributeKey>, modifier: Modifier) -> Self {
        Self {
            key: key.into(),
            modifier,
        }
    }

    /// Name of the modified attribute.
    #[must_use]
    pub fn key(&self) -> &AttributeKey {
        &self.key
    }

    /// The stacked modifier.
    #[must_use]
    pub fn modifier(&self) -> &Modifier {
        &self.modifier
    }
}

impl EffectBehavior for AttributeEffect {
    fn apply(&self, _ctx: &EffectContext<'_>, entity: &EntityRef) -> Result<()> {
        let mut target = entity.borrow_mut()?;
        let stack = target
            .attributes_mut()
            .stack_mut(&self.key)
            .ok_or_else(|| CombatError::UnknownAttribute(self.key.clone()))?;
        stack.add_modifier(&self.modifier);
        Ok(())
    }

    fn cease(&self, ctx: &EffectContext<'_>, entity: &EntityRef) -> Result<()> {
        let mut target = entity.borrow_mut()?;
        // Another appliance of the same effect still holds the modifier.
        if target.applied_effects().contains(ctx.effect) {
            return Ok(());
        }
        if let Some(stack) = target.attributes_mut().stack_mut(&self.key) {
            stack.remove_modifier(&self.modifier);
        }
        Ok(())
    }
}
