//! Sound effects: trigger one audio cue per application.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::effect::{EffectBehavior, EffectContext};
use crate::audio::{AudioSink, Sound};
use crate::core::{EngineContext, GameRng, Result};

/// Plays one randomly picked sound per application.
///
/// The sound plays on the executor, or on the first affected entity when the
/// effect has no executor. Nothing plays if neither exists.
pub struct SoundEffect {
    sounds: Vec<Sound>,
    sink: Rc<dyn AudioSink>,
    rng: RefCell<GameRng>,
}

impl SoundEffect {
    /// Pick from `sounds` with the engine's seeded sound stream.
    pub fn new(
        context: &EngineContext,
        sink: Rc<dyn AudioSink>,
        sounds: impl IntoIterator<Item = Sound>,
    ) -> Self {
        Self {
            sounds: sounds.into_iter().collect(),
            sink,
            rng: RefCell::new(context.rng_for("sound")),
        }
    }

    /// Candidate sounds.
    #[must_use]
    pub fn sounds(&self) -> &[Sound] {
        &self.sounds
    }
}

impl EffectBehavior for SoundEffect {
    fn on_applied(&self, ctx: &EffectContext<'_>) -> Result<()> {
        let Some(sound) = self.rng.borrow_mut().choose(&self.sounds).cloned() else {
            return Ok(());
        };
        let entity = ctx
            .executor
            .cloned()
            .or_else(|| ctx.application.affected().front().cloned());

        if let Some(entity) = entity {
            tracing::trace!(sound = %sound.name, entity = %entity.id(), "playing sound");
            self.sink.play_sound(&sound, &entity);
        }
        Ok(())
    }
}

impl fmt::Debug for SoundEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoundEffect")
            .field("sounds", &self.sounds)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EntityId, GameLoop};
    use crate::effects::{Effect, TargetingStrategy};
    use crate::entities::{Combatant, EntityRef, EntityRegistry, TeamId};
    use crate::physics::Shape;
    use glam::Vec2;

    #[derive(Default)]
    struct RecordingAudio {
        played: RefCell<Vec<(String, EntityId)>>,
    }

    impl AudioSink for RecordingAudio {
        fn play_sound(&self, sound: &Sound, entity: &EntityRef) {
            self.played
                .borrow_mut()
                .push((sound.name.clone(), entity.id()));
        }
    }

    fn setup() -> (Rc<EntityRegistry>, EngineContext, Rc<RecordingAudio>) {
        let registry = Rc::new(EntityRegistry::new());
        let ctx = EngineContext::with_game_loop(Rc::new(GameLoop::default()), registry.clone());
        (registry, ctx, Rc::new(RecordingAudio::default()))
    }

    #[test]
    fn test_plays_once_per_application_on_executor() {
        let (registry, ctx, audio) = setup();
        let hero = registry.add(Combatant::new(EntityId(1), TeamId(0)));
        registry.add(Combatant::new(EntityId(2), TeamId(1)));
        registry.add(Combatant::new(EntityId(3), TeamId(1)));

        let sounds = [Sound::new("swing-1"), Sound::new("swing-2")];
        let effect = Effect::builder(&ctx, TargetingStrategy::enemies())
            .with_executor(hero)
            .with_behavior(SoundEffect::new(&ctx, audio.clone(), sounds.clone()))
            .build();
        effect.apply(&Shape::circle(Vec2::ZERO, 5.0)).unwrap();

        let played = audio.played.borrow();
        assert_eq!(played.len(), 1);
        assert_eq!(played[0].1, EntityId(1));
        assert!(sounds.iter().any(|s| s.name == played[0].0));
    }

    #[test]
    fn test_without_executor_plays_on_first_affected() {
        let (registry, ctx, audio) = setup();
        registry.add(Combatant::new(EntityId(7), TeamId(1)));

        let effect = Effect::builder(&ctx, TargetingStrategy::everyone())
            .with_behavior(SoundEffect::new(&ctx, audio.clone(), [Sound::new("boom")]))
            .build();
        effect.apply(&Shape::circle(Vec2::ZERO, 5.0)).unwrap();
        effect.apply(&Shape::circle(Vec2::new(100.0, 0.0), 5.0)).unwrap();

        assert_eq!(*audio.played.borrow(), vec![("boom".to_string(), EntityId(7))]);
    }

    #[test]
    fn test_same_seed_same_choices() {
        let picks = || {
            let (registry, ctx, audio) = setup();
            registry.add(Combatant::new(EntityId(1), TeamId(0)));
            let sounds: Vec<Sound> = (0..8).map(|i| Sound::new(format!("s{i}"))).collect();
            let effect = Effect::builder(&ctx, TargetingStrategy::everyone())
                .with_behavior(SoundEffect::new(&ctx, audio.clone(), sounds))
                .build();
            for _ in 0..5 {
                effect.apply(&Shape::circle(Vec2::ZERO, 5.0)).unwrap();
            }
            let played = audio.played.borrow().clone();
            played
        };
        assert_eq!(picks(), picks());
    }
}
