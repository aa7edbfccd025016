//! Records of a single effect application.

use im::Vector;

use crate::core::Millis;
use crate::entities::EntityRef;
use crate::physics::Shape;

/// One application of an effect: who was affected, where, and when.
///
/// Records are immutable once created and cheap to clone; the affected list is
/// a persistent vector shared between clones.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectApplication {
    sequence: u64,
    affected: Vector<EntityRef>,
    impact_area: Shape,
    applied_at: Millis,
}

impl EffectApplication {
    pub(crate) fn new(
        sequence: u64,
        affected: impl IntoIterator<Item = EntityRef>,
        impact_area: Shape,
        applied_at: Millis,
    ) -> Self {
        Self {
            sequence,
            affected: affected.into_iter().collect(),
            impact_area,
            applied_at,
        }
    }

    /// The same record with `entities` dropped from the affected list.
    pub(crate) fn without(&self, entities: &[EntityRef]) -> Self {
        Self {
            affected: self
                .affected
                .iter()
                .filter(|e| !entities.contains(e))
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    /// Sequence number, unique per effect.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Entities the effect was applied to, in application order.
    #[must_use]
    pub fn affected(&self) -> &Vector<EntityRef> {
        &self.affected
    }

    /// Area the effect was applied to.
    #[must_use]
    pub fn impact_area(&self) -> &Shape {
        &self.impact_area
    }

    /// Game time of the application.
    #[must_use]
    pub fn applied_at(&self) -> Millis {
        self.applied_at
    }

    /// Check whether `entity` was affected.
    #[must_use]
    pub fn contains(&self, entity: &EntityRef) -> bool {
        self.affected.iter().any(|e| e == entity)
    }

    /// Check whether nothing was affected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.affected.is_empty()
    }
}
