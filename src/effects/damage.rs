//! Damage effects.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::effect::{EffectBehavior, EffectContext};
use crate::core::{EntityId, ListenerId, Listeners, Result};
use crate::entities::EntityRef;

/// Outcome of one hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitEvent {
    /// Entity dealing the damage.
    pub executor: Option<EntityId>,
    /// Entity taking the damage.
    pub target: EntityId,
    /// Damage dealt.
    pub damage: i32,
    /// Whether this hit killed the target.
    pub killed: bool,
}

/// Hits every affected entity once per application.
///
/// Clones share their hit listeners, so keep a clone to observe hits after the
/// behavior has been moved into an effect.
#[derive(Clone, Debug)]
pub struct DamageEffect {
    damage: i32,
    listeners: Rc<Listeners<HitEvent>>,
}

impl DamageEffect {
    /// Deal `damage` per hit.
    pub fn new(damage: i32) -> Self {
        Self {
            damage,
            listeners: Rc::new(Listeners::new()),
        }
    }

    /// Damage per hit.
    #[must_use]
    pub fn damage(&self) -> i32 {
        self.damage
    }

    /// Register a callback fired after every hit.
    pub fn on_hit(&self, listener: impl Fn(&HitEvent) + 'static) -> ListenerId {
        self.listeners.add(listener)
    }

    /// Remove a hit callback.
    pub fn remove_hit_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }
}

impl EffectBehavior for DamageEffect {
    fn apply(&self, ctx: &EffectContext<'_>, entity: &EntityRef) -> Result<()> {
        let killed = entity.borrow_mut()?.hit(self.damage)?;
        let event = HitEvent {
            executor: ctx.executor.map(EntityRef::id),
            target: entity.id(),
            damage: self.damage,
            killed,
        };
        if killed {
            tracing::debug!(target_entity = %event.target, damage = self.damage, "hit killed target");
        }
        self.listeners.notify(&event);
        Ok(())
    }
}
