//! Ability casting integration tests.
//!
//! These tests cast abilities against a real game loop and follow their
//! executions from the first delayed effect until detach.

mod common;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use approx::assert_relative_eq;
use common::World;
use glam::Vec2;
use rust_combat::abilities::{Ability, AbilityInfo, CastType};
use rust_combat::attributes::{keys, Modifier, ModifierKind};
use rust_combat::core::{CombatError, EntityId, TickScheduler, Updatable};
use rust_combat::effects::{AttributeEffect, DamageEffect, Effect, TargetRelation, TargetingStrategy};
use rust_combat::entities::{Combatant, TeamId};

// =============================================================================
// Execution lifecycle
// =============================================================================

#[test]
fn test_cast_applies_delayed_effects_then_detaches() {
    common::init_tracing();
    let world = World::new();
    let hero = world.spawn(1, 0, 0.0, 0.0);
    let slime = world.spawn(2, 1, 0.0, 5.0);

    let info = AbilityInfo::new("Frostbite")
        .with_impact(10, 360)
        .with_duration(300)
        .with_multi_target(true);
    let ability = Ability::new(&world.ctx, info, hero);

    let slow_modifier = Modifier::new(ModifierKind::Multiply, 0.5);
    let slow = ability
        .effect_builder(TargetRelation::Enemies)
        .unwrap()
        .with_name("slow")
        .with_behavior(AttributeEffect::new(keys::VELOCITY, slow_modifier.clone()))
        .build();

    let damage = DamageEffect::new(5);
    let hits = Rc::new(Cell::new(0));
    let counter = hits.clone();
    damage.on_hit(move |_| counter.set(counter.get() + 1));
    let burn = ability
        .effect_builder(TargetRelation::Enemies)
        .unwrap()
        .with_name("burn")
        .with_delay(100)
        .with_behavior(damage)
        .build();

    ability.add_effect(slow.clone());
    ability.add_effect(burn.clone());

    let execution = ability.cast().unwrap().expect("cast should succeed");
    let handle: Rc<dyn Updatable> = execution.clone();
    assert!(world.game_loop.is_attached(&handle));

    world.game_loop.tick(16).unwrap();
    assert!(execution.has_applied(&slow));
    assert!(!execution.has_applied(&burn));
    assert!(slow.is_active(&slime));
    assert_eq!(hits.get(), 0);

    world.game_loop.tick(100).unwrap();
    assert!(execution.has_applied(&burn));
    assert_eq!(execution.applications().len(), 2);
    assert_eq!(hits.get(), 1);

    world.game_loop.tick(100).unwrap();
    assert!(slime
        .with(|e| e.attributes().velocity.is_modifier_applied(&slow_modifier))
        .unwrap());

    for _ in 0..5 {
        world.game_loop.tick(100).unwrap();
    }
    assert!(!slow.has_active_appliances());
    assert!(!burn.has_active_appliances());
    assert!(!world.game_loop.is_attached(&handle));
    assert_eq!(world.game_loop.updatable_count(), 0);
    assert_eq!(hits.get(), 1);
}

#[test]
fn test_execution_without_effects_detaches_on_first_update() {
    let world = World::new();
    let hero = world.spawn(1, 0, 0.0, 0.0);
    let ability = Ability::new(&world.ctx, AbilityInfo::new("Idle"), hero);

    let execution = ability.cast().unwrap().unwrap();
    assert_eq!(world.game_loop.updatable_count(), 1);

    world.game_loop.tick(1).unwrap();
    assert_eq!(world.game_loop.updatable_count(), 0);
    assert!(execution.applied_effects().is_empty());
}

#[test]
fn test_cancel_ceases_and_runs_follow_ups() {
    let world = World::new();
    let hero = world.spawn(1, 0, 0.0, 0.0);
    let slime = world.spawn(2, 1, 3.0, 0.0);

    let info = AbilityInfo::new("Entangle")
        .with_impact(10, 360)
        .with_duration(10_000);
    let ability = Ability::new(&world.ctx, info, hero);

    let effect = ability
        .effect_builder(TargetRelation::Enemies)
        .unwrap()
        .build();
    let follow_up = Effect::builder(&world.ctx, TargetingStrategy::everyone()).build();
    let follow_ups = Rc::new(Cell::new(0));
    let counter = follow_ups.clone();
    follow_up.on_applied(move |_| counter.set(counter.get() + 1));
    effect.add_follow_up(follow_up.clone());
    ability.add_effect(effect.clone());

    let execution = ability.cast().unwrap().unwrap();
    world.game_loop.tick(16).unwrap();
    assert!(effect.is_active(&slime));

    execution.cancel().unwrap();
    assert!(!effect.is_active(&slime));
    assert!(!execution.has_active_effects());
    assert_eq!(follow_ups.get(), 2);

    let handle: Rc<dyn Updatable> = execution.clone();
    assert!(!world.game_loop.is_attached(&handle));
    let follow_up_handle: Rc<dyn Updatable> = follow_up;
    assert!(world.game_loop.is_attached(&follow_up_handle));
}

#[test]
fn test_partially_failed_application_can_be_cancelled() {
    let world = World::new();
    let hero = world.spawn(1, 0, 0.0, 0.0);
    world.spawn(2, 1, 0.0, 2.0);
    let mage = world.spawn(3, 1, 0.0, 4.0);
    mage.with_mut(|e| {
        e.attributes_mut().add_custom("mana", 10.0);
    })
    .unwrap();
    let mana = || {
        mage.with(|e| e.attributes().custom(&"mana".into()).map(|a| a.get()))
            .unwrap()
            .unwrap()
            .unwrap()
    };

    let info = AbilityInfo::new("Drain")
        .with_impact(10, 360)
        .with_duration(5_000)
        .with_multi_target(true);
    let ability = Ability::new(&world.ctx, info, hero);
    let drain = ability
        .effect_builder(TargetRelation::Enemies)
        .unwrap()
        .with_behavior(AttributeEffect::new(
            "mana",
            Modifier::new(ModifierKind::Subtract, 4.0),
        ))
        .build();
    ability.add_effect(drain.clone());

    let execution = ability.cast().unwrap().unwrap();
    assert_eq!(
        world.game_loop.tick(16),
        Err(CombatError::UnknownAttribute("mana".into()))
    );
    assert_eq!(mana(), 6.0);
    assert!(execution.has_applied(&drain));
    assert_eq!(execution.applications().len(), 1);
    assert!(execution.has_active_effects());

    let handle: Rc<dyn Updatable> = execution.clone();
    world.game_loop.tick(16).unwrap();
    assert!(world.game_loop.is_attached(&handle));

    execution.cancel().unwrap();
    assert!(!drain.is_active(&mage));
    assert_eq!(mana(), 10.0);
    assert!(!world.game_loop.is_attached(&handle));
}

#[test]
fn test_ability_listeners_track_effect_events() {
    let world = World::new();
    let hero = world.spawn(1, 0, 0.0, 0.0);
    world.spawn(2, 1, 0.0, 2.0);
    world.spawn(3, 1, 0.0, 4.0);

    let info = AbilityInfo::new("Shockwave")
        .with_impact(10, 360)
        .with_duration(50)
        .with_multi_target(true);
    let ability = Ability::new(&world.ctx, info, hero);
    let effect = ability
        .effect_builder(TargetRelation::Enemies)
        .unwrap()
        .build();
    ability.add_effect(effect);

    let log = Rc::new(RefCell::new(Vec::new()));
    let applied = log.clone();
    ability.on_effect_applied(move |event| applied.borrow_mut().push(("applied", event.entity.id())));
    let ceased = log.clone();
    ability.on_effect_ceased(move |event| ceased.borrow_mut().push(("ceased", event.entity.id())));

    ability.cast().unwrap();
    world.game_loop.tick(16).unwrap();
    world.game_loop.tick(51).unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            ("applied", EntityId(2)),
            ("applied", EntityId(3)),
            ("ceased", EntityId(2)),
            ("ceased", EntityId(3)),
        ]
    );
}

// =============================================================================
// Cooldown
// =============================================================================

#[test]
fn test_cooldown_in_seconds() {
    let world = World::new();
    let hero = world.spawn(1, 0, 0.0, 0.0);
    let ability = Ability::new(
        &world.ctx,
        AbilityInfo::new("Blink").with_cooldown(500),
        hero,
    );
    assert_relative_eq!(ability.cooldown_secs().unwrap(), 0.5);
    assert_eq!(ability.remaining_cooldown().unwrap(), 0);

    world.game_loop.set_time(1);
    assert!(ability.cast().unwrap().is_some());

    world.game_loop.set_time(2);
    assert_relative_eq!(ability.remaining_cooldown_secs().unwrap(), 0.499);
    assert!(ability.cast().unwrap().is_none());

    world.game_loop.set_time(501);
    assert_eq!(ability.remaining_cooldown().unwrap(), 0);
    assert!(ability.cast().unwrap().is_some());
}

#[test]
fn test_cooldown_follows_modifiers() {
    let world = World::new();
    let hero = world.spawn(1, 0, 0.0, 0.0);
    let ability = Ability::new(
        &world.ctx,
        AbilityInfo::new("Dash").with_cooldown(1_000),
        hero,
    );
    let haste = Modifier::new(ModifierKind::SubtractPercent, 40);
    ability.attributes_mut().cooldown.add_modifier(&haste);

    ability.cast().unwrap();
    world.game_loop.tick(599).unwrap();
    assert!(ability.is_on_cooldown().unwrap());
    world.game_loop.tick(1).unwrap();
    assert!(!ability.is_on_cooldown().unwrap());

    ability.attributes_mut().cooldown.remove_modifier(&haste);
    assert!(ability.is_on_cooldown().unwrap());
}

#[test]
fn test_dead_executor_cannot_cast() {
    let world = World::new();
    let hero = world.spawn_with(Combatant::new(EntityId(1), TeamId(0)).with_health(1));
    let ability = Ability::new(&world.ctx, AbilityInfo::new("Heal"), hero.clone());

    assert!(hero.with_mut(|e| e.hit(5)).unwrap().unwrap());
    assert!(!ability.can_cast().unwrap());
    assert!(ability.cast().unwrap().is_none());
    assert_eq!(world.game_loop.updatable_count(), 0);
}

// =============================================================================
// Impact areas
// =============================================================================

#[test]
fn test_sector_impact_selects_enemies_in_front() {
    let world = World::new();
    let hero = world.spawn_with(Combatant::new(EntityId(1), TeamId(0)).with_angle(90.0));
    let slime = world.spawn(2, 1, 25.0, 0.0);
    world.spawn(3, 1, 0.0, 25.0);
    world.spawn(4, 0, 22.0, 0.0);

    let info = AbilityInfo::new("Cleave")
        .with_impact(20, 90)
        .with_range(40)
        .with_multi_target(true);
    let ability = Ability::new(&world.ctx, info, hero);

    let damage = DamageEffect::new(1);
    let targets = Rc::new(RefCell::new(Vec::new()));
    let hit_targets = targets.clone();
    damage.on_hit(move |hit| hit_targets.borrow_mut().push(hit.target));
    let effect = ability
        .effect_builder(TargetRelation::Enemies)
        .unwrap()
        .with_behavior(damage)
        .build();
    ability.add_effect(effect);

    let execution = ability.cast().unwrap().unwrap();
    let area = *execution.impact_area();
    assert_eq!(area, ability.calculate_impact_area().unwrap());
    assert_relative_eq!(area.center().x, 20.0, epsilon = 1e-4);
    assert_relative_eq!(area.center().y, 0.0, epsilon = 1e-4);

    // Later attribute changes do not move a running execution.
    ability.attributes_mut().range.set_base_value(100);
    assert_eq!(*execution.impact_area(), area);

    world.game_loop.tick(16).unwrap();
    assert_eq!(*targets.borrow(), vec![slime.id()]);
}

#[test]
fn test_info_from_json_drives_ability() {
    let world = World::new();
    let hero = world.spawn(1, 0, 10.0, 10.0);

    let info: AbilityInfo = serde_json::from_str(
        r#"{
            "name": "Nova",
            "description": "Frost burst",
            "cast_type": "INSTANT",
            "multi_target": true,
            "cooldown": 250,
            "impact": 40,
            "origin_offset": [0.0, 8.0]
        }"#,
    )
    .unwrap();
    assert_eq!(info.cast_type, CastType::Instant);
    assert_eq!(info.duration, 0);
    assert_eq!(info.impact_angle, 360);

    let ability = Ability::new(&world.ctx, info, hero);
    assert_eq!(ability.name(), "Nova");
    assert!(ability.is_multi_target());
    assert_eq!(ability.attributes().cooldown_millis().unwrap(), 250);
    assert_eq!(ability.pivot().unwrap(), Vec2::new(10.0, 18.0));
    assert_eq!(
        ability.calculate_potential_impact_area().unwrap(),
        rust_combat::physics::Shape::circle(Vec2::new(10.0, 18.0), 20.0)
    );
}
