//! Ability configuration and attributes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::attributes::Attribute;
use crate::core::{Millis, Result};

/// How an ability is triggered by the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CastType {
    /// Cast as soon as the input is pressed.
    Instant,
    /// Cast once the player confirms the target.
    #[default]
    OnConfirm,
}

/// Static description of an ability.
///
/// Times are game milliseconds; distances and angles follow the
/// [`physics`](crate::physics) conventions.
///
/// ```
/// use rust_combat::abilities::{AbilityInfo, CastType};
///
/// let info: AbilityInfo = serde_json::from_str(
///     r#"{"name": "Fireball", "cooldown": 333, "cast_type": "INSTANT"}"#,
/// ).unwrap();
/// assert_eq!(info.cooldown, 333);
/// assert_eq!(info.cast_type, CastType::Instant);
/// assert_eq!(info.impact_angle, 360);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityInfo {
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: String,
    /// How the ability is triggered.
    pub cast_type: CastType,
    /// Whether effects hit every candidate or only one.
    pub multi_target: bool,
    /// Time between casts.
    pub cooldown: i32,
    /// Time the ability counts as active after a cast.
    pub duration: i32,
    /// Radius of the impact area.
    pub impact: i32,
    /// Spread of the impact area in degrees; multiples of 360 make a circle.
    pub impact_angle: i32,
    /// Distance the impact area is pushed out in front of the executor.
    pub range: i32,
    /// Free value for game-defined use, such as damage.
    pub value: i32,
    /// Offset of the pivot from the executor position.
    pub origin_offset: Vec2,
}

impl Default for AbilityInfo {
    fn default() -> Self {
        Self {
            name: "ABILITY".to_string(),
            description: String::new(),
            cast_type: CastType::OnConfirm,
            multi_target: false,
            cooldown: 1000,
            duration: 0,
            impact: 0,
            impact_angle: 360,
            range: 0,
            value: 0,
            origin_offset: Vec2::ZERO,
        }
    }
}

impl AbilityInfo {
    /// Create a default ability description with a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the cast type.
    #[must_use]
    pub fn with_cast_type(mut self, cast_type: CastType) -> Self {
        self.cast_type = cast_type;
        self
    }

    /// Set whether effects hit every candidate.
    #[must_use]
    pub fn with_multi_target(mut self, multi_target: bool) -> Self {
        self.multi_target = multi_target;
        self
    }

    /// Set the cooldown.
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: i32) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Set the active duration.
    #[must_use]
    pub fn with_duration(mut self, duration: i32) -> Self {
        self.duration = duration;
        self
    }

    /// Set the impact radius and spread.
    #[must_use]
    pub fn with_impact(mut self, impact: i32, impact_angle: i32) -> Self {
        self.impact = impact;
        self.impact_angle = impact_angle;
        self
    }

    /// Set the range.
    #[must_use]
    pub fn with_range(mut self, range: i32) -> Self {
        self.range = range;
        self
    }

    /// Set the free value.
    #[must_use]
    pub fn with_value(mut self, value: i32) -> Self {
        self.value = value;
        self
    }

    /// Set the pivot offset.
    #[must_use]
    pub fn with_origin_offset(mut self, offset: Vec2) -> Self {
        self.origin_offset = offset;
        self
    }
}

/// Modifiable numbers of an ability.
#[derive(Debug)]
pub struct AbilityAttributes {
    /// Time between casts.
    pub cooldown: Attribute<i32>,
    /// Time the ability counts as active after a cast.
    pub duration: Attribute<i32>,
    /// Radius of the impact area.
    pub impact: Attribute<i32>,
    /// Spread of the impact area in degrees.
    pub impact_angle: Attribute<i32>,
    /// Range in front of the executor.
    pub range: Attribute<i32>,
    /// Free value.
    pub value: Attribute<i32>,
}

impl AbilityAttributes {
    /// Seed attributes from an ability description.
    pub fn new(info: &AbilityInfo) -> Self {
        Self {
            cooldown: Attribute::new(info.cooldown),
            duration: Attribute::new(info.duration),
            impact: Attribute::new(info.impact),
            impact_angle: Attribute::new(info.impact_angle),
            range: Attribute::new(info.range),
            value: Attribute::new(info.value),
        }
    }

    /// Modified cooldown in milliseconds.
    pub fn cooldown_millis(&self) -> Result<Millis> {
        self.cooldown.get().map(Millis::from)
    }

    /// Modified duration in milliseconds.
    pub fn duration_millis(&self) -> Result<Millis> {
        self.duration.get().map(Millis::from)
    }
}

impl Default for AbilityAttributes {
    fn default() -> Self {
        Self::new(&AbilityInfo::default())
    }
}
