//! The reference combat entity.

use glam::Vec2;

use super::entity::{AppliedEffects, CombatEntity, TeamId};
use crate::attributes::{CombatAttributes, CombatAttributesInfo, ModifierKind};
use crate::core::{EntityId, Listeners, Result};

/// A plain combat entity: position, team, attributes, applied effects.
///
/// Health lives in [`CombatAttributes::health`]. A hit subtracts from the
/// health base value; once health reaches its minimum the combatant dies and
/// ignores further hits until resurrected.
///
/// ```
/// use rust_combat::core::EntityId;
/// use rust_combat::entities::{CombatEntity, Combatant, TeamId};
///
/// let mut slime = Combatant::new(EntityId(1), TeamId(2)).with_health(30);
/// assert!(!slime.hit(20).unwrap());
/// assert!(slime.hit(20).unwrap());
/// assert!(slime.is_dead());
/// assert!(!slime.hit(20).unwrap());
/// ```
#[derive(Debug)]
pub struct Combatant {
    id: EntityId,
    team: TeamId,
    position: Vec2,
    angle: f32,
    target: Option<EntityId>,
    mobile: bool,
    indestructible: bool,
    dead: bool,
    attributes: CombatAttributes,
    applied_effects: AppliedEffects,
    death_listeners: Listeners<EntityId>,
}

impl Combatant {
    /// Create a combatant with default attributes at the origin.
    pub fn new(id: EntityId, team: TeamId) -> Self {
        Self::with_info(id, team, &CombatAttributesInfo::default())
    }

    /// Create a combatant from explicit attribute values.
    pub fn with_info(id: EntityId, team: TeamId, info: &CombatAttributesInfo) -> Self {
        Self {
            id,
            team,
            position: Vec2::ZERO,
            angle: 0.0,
            target: None,
            mobile: false,
            indestructible: false,
            dead: info.health <= 0,
            attributes: CombatAttributes::new(info),
            applied_effects: AppliedEffects::new(),
            death_listeners: Listeners::new(),
        }
    }

    /// Set starting and maximum health.
    #[must_use]
    pub fn with_health(self, health: i32) -> Self {
        let info = CombatAttributesInfo::default().with_health(health);
        Self {
            attributes: CombatAttributes::new(&info),
            dead: health <= 0,
            ..self
        }
    }

    /// Place the combatant.
    #[must_use]
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Set the facing angle.
    #[must_use]
    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    /// Allow forces to move the combatant.
    #[must_use]
    pub fn mobile(mut self) -> Self {
        self.mobile = true;
        self
    }

    /// Make the combatant ignore hits.
    #[must_use]
    pub fn indestructible(mut self) -> Self {
        self.indestructible = true;
        self
    }

    /// Move the combatant.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Turn the combatant.
    pub fn set_angle(&mut self, angle: f32) {
        self.angle = angle;
    }

    /// Select or clear the explicit target.
    pub fn set_target(&mut self, target: Option<EntityId>) {
        self.target = target;
    }

    /// Kill the combatant: health drops to zero and death listeners fire.
    pub fn die(&mut self) -> Result<()> {
        self.attributes
            .health
            .modify_base_value_by(ModifierKind::Set, 0.0)?;
        self.dead = true;
        tracing::debug!(entity = %self.id, "combatant died");
        self.death_listeners.notify(&self.id);
        Ok(())
    }

    /// Bring the combatant back with full health.
    pub fn resurrect(&mut self) -> Result<()> {
        self.attributes.health.set_to_max()?;
        self.dead = false;
        Ok(())
    }

    /// Register a callback fired when the combatant dies.
    pub fn on_death(&self, listener: impl Fn(&EntityId) + 'static) {
        self.death_listeners.add(listener);
    }
}

impl CombatEntity for Combatant {
    fn id(&self) -> EntityId {
        self.id
    }

    fn team(&self) -> TeamId {
        self.team
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn angle(&self) -> f32 {
        self.angle
    }

    fn target(&self) -> Option<EntityId> {
        self.target
    }

    fn is_dead(&self) -> bool {
        self.dead
    }

    fn hit(&mut self, damage: i32) -> Result<bool> {
        if self.indestructible || self.dead {
            return Ok(false);
        }

        let health = &mut self.attributes.health;
        health.modify_base_value_by(ModifierKind::Subtract, f64::from(damage))?;
        if health.get()? <= health.min()? {
            self.die()?;
        }
        Ok(self.dead)
    }

    fn attributes(&self) -> &CombatAttributes {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut CombatAttributes {
        &mut self.attributes
    }

    fn applied_effects(&self) -> &AppliedEffects {
        &self.applied_effects
    }

    fn applied_effects_mut(&mut self) -> &mut AppliedEffects {
        &mut self.applied_effects
    }

    fn is_mobile(&self) -> bool {
        self.mobile
    }
}
