//! The attribute set every combat entity carries.
//!
//! [`CombatAttributes`] holds the well-known stats as typed fields and any number
//! of game-defined `f64` attributes by [`AttributeKey`]. Attribute effects reach
//! both through [`CombatAttributes::stack_mut`].
//!
//! ## Levelling
//!
//! Experience fills up to its maximum; reaching it levels up, which resets
//! experience and grows max health, max shield, health regeneration and the
//! damage multiplier by 10%. The experience cap scales with `sqrt(level)`.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::attribute::{Attribute, ModifierStack};
use super::key::{keys, AttributeKey};
use super::modifier::{Modifier, ModifierKind};
use super::range::RangeAttribute;
use crate::core::Result;

/// Growth applied to scaling stats on every level up.
const LEVEL_MULTIPLIER: f64 = 1.1;

/// Initial values for [`CombatAttributes`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatAttributesInfo {
    /// Starting and maximum health.
    pub health: i32,
    /// Starting shield.
    pub shield: i32,
    /// Maximum shield.
    pub max_shield: i32,
    /// Starting level.
    pub level: i32,
    /// Maximum level.
    pub max_level: i32,
    /// Experience needed for the first level up.
    pub max_experience: i32,
    /// Movement velocity factor.
    pub velocity: f32,
    /// Attack speed factor.
    pub attack_speed: f32,
    /// Outgoing damage factor.
    pub damage_multiplier: f32,
    /// Health regenerated per second.
    pub health_regeneration: i32,
}

impl Default for CombatAttributesInfo {
    fn default() -> Self {
        Self {
            health: 100,
            shield: 0,
            max_shield: 100,
            level: 1,
            max_level: 100,
            max_experience: 100,
            velocity: 1.0,
            attack_speed: 1.0,
            damage_multiplier: 1.0,
            health_regeneration: 0,
        }
    }
}

impl CombatAttributesInfo {
    /// Set starting and maximum health.
    #[must_use]
    pub fn with_health(mut self, health: i32) -> Self {
        self.health = health;
        self
    }

    /// Set starting and maximum shield.
    #[must_use]
    pub fn with_shield(mut self, shield: i32, max_shield: i32) -> Self {
        self.shield = shield;
        self.max_shield = max_shield;
        self
    }

    /// Set the velocity factor.
    #[must_use]
    pub fn with_velocity(mut self, velocity: f32) -> Self {
        self.velocity = velocity;
        self
    }
}

/// Attributes of one combat entity.
pub struct CombatAttributes {
    /// Hit points in `[0, max]`.
    pub health: RangeAttribute<i32>,
    /// Shield points in `[0, max]`.
    pub shield: RangeAttribute<i32>,
    /// Level in `[0, max]`.
    pub level: RangeAttribute<i32>,
    /// Experience towards the next level.
    pub experience: RangeAttribute<i32>,
    /// Movement velocity factor.
    pub velocity: Attribute<f32>,
    /// Attack speed factor.
    pub attack_speed: Attribute<f32>,
    /// Outgoing damage factor.
    pub damage_multiplier: Attribute<f32>,
    /// Health regenerated per second.
    pub health_regeneration: Attribute<i32>,
    custom: FxHashMap<AttributeKey, Attribute<f64>>,
    max_experience: i32,
}

impl CombatAttributes {
    /// Build the attribute set from its initial values.
    pub fn new(info: &CombatAttributesInfo) -> Self {
        Self {
            health: RangeAttribute::new(info.health, 0, info.health),
            shield: RangeAttribute::new(info.shield, 0, info.max_shield),
            level: RangeAttribute::new(info.level, 0, info.max_level),
            experience: RangeAttribute::new(0, 0, info.max_experience),
            velocity: Attribute::new(info.velocity),
            attack_speed: Attribute::new(info.attack_speed),
            damage_multiplier: Attribute::new(info.damage_multiplier),
            health_regeneration: Attribute::new(info.health_regeneration),
            custom: FxHashMap::default(),
            max_experience: info.max_experience,
        }
    }

    /// Add a game-defined attribute, or return the existing one.
    pub fn add_custom(&mut self, key: impl Into<AttributeKey>, base: f64) -> &mut Attribute<f64> {
        self.custom
            .entry(key.into())
            .or_insert_with(|| Attribute::new(base))
    }

    /// A game-defined attribute.
    #[must_use]
    pub fn custom(&self, key: &AttributeKey) -> Option<&Attribute<f64>> {
        self.custom.get(key)
    }

    /// A game-defined attribute, mutably.
    pub fn custom_mut(&mut self, key: &AttributeKey) -> Option<&mut Attribute<f64>> {
        self.custom.get_mut(key)
    }

    /// Resolve an attribute by name.
    #[must_use]
    pub fn stack(&self, key: &AttributeKey) -> Option<&dyn ModifierStack> {
        match key.as_str() {
            keys::HEALTH => Some(&self.health),
            keys::SHIELD => Some(&self.shield),
            keys::LEVEL => Some(&self.level),
            keys::EXPERIENCE => Some(&self.experience),
            keys::VELOCITY => Some(&self.velocity),
            keys::ATTACK_SPEED => Some(&self.attack_speed),
            keys::DAMAGE_MULTIPLIER => Some(&self.damage_multiplier),
            keys::HEALTH_REGENERATION => Some(&self.health_regeneration),
            _ => self.custom.get(key).map(|a| a as &dyn ModifierStack),
        }
    }

    /// Resolve an attribute by name, mutably.
    pub fn stack_mut(&mut self, key: &AttributeKey) -> Option<&mut dyn ModifierStack> {
        match key.as_str() {
            keys::HEALTH => Some(&mut self.health),
            keys::SHIELD => Some(&mut self.shield),
            keys::LEVEL => Some(&mut self.level),
            keys::EXPERIENCE => Some(&mut self.experience),
            keys::VELOCITY => Some(&mut self.velocity),
            keys::ATTACK_SPEED => Some(&mut self.attack_speed),
            keys::DAMAGE_MULTIPLIER => Some(&mut self.damage_multiplier),
            keys::HEALTH_REGENERATION => Some(&mut self.health_regeneration),
            _ => self
                .custom
                .get_mut(key)
                .map(|a| a as &mut dyn ModifierStack),
        }
    }

    /// Add experience, levelling up when the cap is reached.
    ///
    /// Returns `true` if a level up happened.
    pub fn add_experience(&mut self, amount: i32) -> Result<bool> {
        self.experience
            .modify_base_value_by(ModifierKind::Add, f64::from(amount))?;
        if self.experience.get()? >= self.experience.max()? {
            return self.level_up();
        }
        Ok(false)
    }

    /// Gain one level unless already at the maximum.
    ///
    /// Returns `false` if the level is capped.
    pub fn level_up(&mut self) -> Result<bool> {
        if self.level.get()? >= self.level.max()? {
            return Ok(false);
        }

        self.level.modify_base_value_by(ModifierKind::Add, 1.0)?;
        self.experience.modify_base_value_by(ModifierKind::Set, 0.0)?;
        self.scale_with_level()?;
        tracing::debug!(level = self.level.base_value(), "level up");
        Ok(true)
    }

    fn scale_with_level(&mut self) -> Result<()> {
        let grow = Modifier::new(ModifierKind::Multiply, LEVEL_MULTIPLIER);
        let max_experience =
            f64::from(self.max_experience) * f64::from(self.level.get()?).sqrt();

        self.health.modify_max_base_value(&grow)?;
        self.shield.modify_max_base_value(&grow)?;
        self.experience
            .modify_max_base_value(&Modifier::new(ModifierKind::Set, max_experience))?;
        self.health_regeneration.modify_base_value(&grow)?;
        self.damage_multiplier.modify_base_value(&grow)?;
        Ok(())
    }
}

impl Default for CombatAttributes {
    fn default() -> Self {
        Self::new(&CombatAttributesInfo::default())
    }
}

impl std::fmt::Debug for CombatAttributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatAttributes")
            .field("health", &self.health)
            .field("shield", &self.shield)
            .field("level", &self.level)
            .field("experience", &self.experience)
            .field("custom", &self.custom.len())
            .finish_non_exhaustive()
    }
}
