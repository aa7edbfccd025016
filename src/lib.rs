//! # rust-combat
//!
//! Attribute modifiers and tick-driven ability effects for 2D game runtimes.
//!
//! ## Design Principles
//!
//! 1. **Deterministic folding**: an attribute's value is its base folded through
//!    its modifiers in a fixed order by kind (additive, then multiplicative,
//!    then set), insertion order within a kind.
//!
//! 2. **Injected collaborators**: effects and abilities reach the clock, the tick
//!    scheduler and the target lookup through an [`EngineContext`]. There is no
//!    global game instance.
//!
//! 3. **Game time only**: every duration is measured on the injected
//!    [`GameClock`], so pausing or scaling the game loop pauses or scales
//!    effect expiry.
//!
//! ## Architecture
//!
//! - **Single-threaded**: shared state is `Rc`/`RefCell`; everything runs on the
//!   game tick.
//!
//! - **Snapshot listeners**: every notification copies its listener list first,
//!   so listeners may unregister themselves while running.
//!
//! - **Composed effects**: one [`Effect`] type carries the lifecycle; what it
//!   does to entities is an [`EffectBehavior`].
//!
//! ## Modules
//!
//! - `core`: ids, errors, listeners, game time, scheduling, RNG, configuration
//! - `attributes`: modifiers, attributes, range attributes, combat attributes
//! - `entities`: combat entity trait, handles, reference combatant, registry
//! - `physics`: impact shapes and forces
//! - `audio`: sounds and the audio sink
//! - `effects`: targeting, effects, applications and behaviors
//! - `abilities`: abilities and their executions
//!
//! ## Example
//!
//! ```
//! use std::rc::Rc;
//! use glam::Vec2;
//! use rust_combat::{
//!     keys, Ability, AbilityInfo, AttributeEffect, Combatant, EngineContext, EntityId,
//!     EntityRegistry, GameLoop, Modifier, ModifierKind, TargetRelation, TeamId,
//! };
//!
//! let game_loop = Rc::new(GameLoop::default());
//! let registry = Rc::new(EntityRegistry::new());
//! let ctx = EngineContext::with_game_loop(game_loop.clone(), registry.clone());
//!
//! let hero = registry.add(Combatant::new(EntityId(1), TeamId(0)));
//! let slime = registry.add(
//!     Combatant::new(EntityId(2), TeamId(1)).with_position(Vec2::new(0.0, 5.0)),
//! );
//!
//! let info = AbilityInfo::new("Frost Nova")
//!     .with_impact(10, 360)
//!     .with_duration(1_000)
//!     .with_multi_target(true);
//! let nova = Ability::new(&ctx, info, hero);
//! let chill = nova
//!     .effect_builder(TargetRelation::Enemies)
//!     .unwrap()
//!     .with_behavior(AttributeEffect::new(
//!         keys::VELOCITY,
//!         Modifier::new(ModifierKind::Multiply, 0.5),
//!     ))
//!     .build();
//! nova.add_effect(chill.clone());
//!
//! nova.cast().unwrap();
//! game_loop.tick(16).unwrap();
//! assert!(chill.is_active(&slime));
//! assert_eq!(slime.borrow().unwrap().attributes().velocity.get().unwrap(), 0.5);
//!
//! game_loop.tick(1_001).unwrap();
//! assert!(!chill.is_active(&slime));
//! assert_eq!(slime.borrow().unwrap().attributes().velocity.get().unwrap(), 1.0);
//! ```

pub mod core;
pub mod attributes;
pub mod entities;
pub mod physics;
pub mod audio;
pub mod effects;
pub mod abilities;

// Re-export commonly used types
pub use crate::core::{
    CombatError, Result,
    EntityId, EffectId,
    Listener, ListenerId, Listeners,
    GameClock, Millis, GameLoop, TickScheduler, Updatable,
    GameRng, EngineConfig, EngineContext,
};

pub use crate::attributes::{
    keys, AttributeKey, AttributeNumber,
    Modifier, ModifierKind, ModifierStack,
    Attribute, RangeAttribute,
    CombatAttributes, CombatAttributesInfo,
};

pub use crate::entities::{
    AppliedEffects, CombatEntity, EntityRef, TeamId,
    Combatant, EntityRegistry, TargetLookup,
};

pub use crate::physics::{Force, ForceRef, PhysicsSink, Shape};

pub use crate::audio::{AudioSink, Sound};

pub use crate::effects::{
    TargetRelation, TargetingStrategy,
    Effect, EffectApplication, EffectBehavior, EffectBuilder, EffectContext, EffectEvent,
    AttributeEffect, DamageEffect, ForceEffect, HitEvent, SoundEffect,
};

pub use crate::abilities::{
    Ability, AbilityAttributes, AbilityExecution, AbilityInfo, CastType,
};
