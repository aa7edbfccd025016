//! Timed, targetable effects.
//!
//! - [`TargetingStrategy`]: selects the entities an application affects
//! - [`Effect`]: the apply → expire → cease → follow-up lifecycle
//! - [`EffectApplication`]: the record of one application
//! - [`EffectBehavior`]: what an effect does to an entity
//!
//! ## Behaviors
//!
//! | Behavior | Apply | Cease |
//! |----------|-------|-------|
//! | [`AttributeEffect`] | stack a modifier | remove it |
//! | [`ForceEffect`] | hand a force to the physics sink | end the force |
//! | [`SoundEffect`] | play one sound per application | nothing |
//! | [`DamageEffect`] | hit the entity | nothing |

mod application;
mod attribute;
mod damage;
mod effect;
mod force;
mod sound;
mod targeting;

pub use application::EffectApplication;
pub use attribute::AttributeEffect;
pub use damage::{DamageEffect, HitEvent};
pub use effect::{Effect, EffectBehavior, EffectBuilder, EffectContext, EffectEvent, NoBehavior};
pub use force::{ForceEffect, ForceFactory};
pub use sound::SoundEffect;
pub use targeting::{TargetComparator, TargetCondition, TargetRelation, TargetingStrategy};
