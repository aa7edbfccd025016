//! Engine error type.

use thiserror::Error;

use super::EntityId;
use crate::attributes::AttributeKey;

/// Errors raised while folding attributes or driving effects.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum CombatError {
    /// A DIVIDE modifier with a zero operand was folded.
    #[error("division by zero while modifying {value}")]
    DivisionByZero { value: f64 },

    /// An attribute effect referenced an attribute the entity does not carry.
    #[error("unknown attribute `{0}`")]
    UnknownAttribute(AttributeKey),

    /// An entity was already mutably borrowed when the engine needed it.
    #[error("{0} is already borrowed")]
    EntityBorrowed(EntityId),
}

/// Result alias used throughout the crate.
pub type Result<T, E = CombatError> = std::result::Result<T, E>;
