//! Abilities and their executions.
//!
//! An [`Ability`] bundles effects with a cooldown, an impact area and an
//! executor. Casting starts an [`AbilityExecution`] that applies the effects,
//! honouring their delays, and detaches once they have all run their course.

mod ability;
mod attributes;
mod execution;

pub use ability::Ability;
pub use attributes::{AbilityAttributes, AbilityInfo, CastType};
pub use execution::AbilityExecution;
