//! End-to-end combat scenarios for duel_core.
//!
//! Each test sets up a small, exact situation with the shared fixtures and
//! checks the observable result through the public API.

use std::f32::consts::PI;

use duel_core::prelude::*;
use duel_core::rng::seeded;
use duel_test_utils::fixtures::{
    default_arena, mid_swing, open_arena, plain_fighter, standard_duel, sword, warrior,
    weapon_with_skills,
};

fn hit(amount: f32) -> Hit {
    Hit::new(amount, Vec2::new(1.0, 0.0))
}

// =============================================================================
// Damage Pipeline
// =============================================================================

mod damage {
    use super::*;

    #[test]
    fn test_plain_hit_reduces_health() {
        let mut fighter = plain_fighter(0, None, Vec2::ZERO);
        let mut rng = seeded(1);

        let killed = fighter.apply_damage(&hit(30.0), &mut rng);

        assert!(!killed);
        assert_eq!(fighter.health, 70.0);
        assert!(fighter.status.invulnerable > 0.0);
        assert_eq!(fighter.stats.damage_taken, 30.0);
    }

    #[test]
    fn test_overkill_clamps_and_kills_once() {
        let mut fighter = plain_fighter(0, None, Vec2::ZERO);
        fighter.health = 10.0;
        let mut rng = seeded(1);

        assert!(fighter.apply_damage(&hit(30.0), &mut rng));
        assert_eq!(fighter.health, 0.0);
        assert!(fighter.dead);

        // Further hits on a dead fighter change nothing
        fighter.status.invulnerable = 0.0;
        assert!(!fighter.apply_damage(&hit(30.0), &mut rng));
        assert_eq!(fighter.health, 0.0);

        let deaths = fighter
            .drain_events()
            .into_iter()
            .filter(|e| e.kind == CombatEventKind::Death)
            .count();
        assert_eq!(deaths, 1);
    }

    #[test]
    fn test_shield_absorbs_before_health() {
        let mut fighter = plain_fighter(0, None, Vec2::ZERO);
        fighter.buffs.push(Buff::shield(20.0, 5.0));
        let mut rng = seeded(1);

        fighter.apply_damage(&hit(15.0), &mut rng);
        assert_eq!(fighter.health, 100.0);
        assert!((fighter.shield_total() - 5.0).abs() < 1e-4);
        // Fully absorbed hits grant no invulnerability
        assert_eq!(fighter.status.invulnerable, 0.0);

        fighter.apply_damage(&hit(10.0), &mut rng);
        assert!((fighter.health - 95.0).abs() < 1e-4);
        assert_eq!(fighter.shield_total(), 0.0);
    }

    #[test]
    fn test_invulnerability_window_blocks_followup() {
        let mut fighter = plain_fighter(0, None, Vec2::ZERO);
        let mut rng = seeded(1);

        fighter.apply_damage(&hit(20.0), &mut rng);
        assert!(!fighter.apply_damage(&hit(20.0), &mut rng));
        assert_eq!(fighter.health, 80.0);
    }

    #[test]
    fn test_dot_ticks_after_status() {
        let arena = default_arena();
        let mut fighter = plain_fighter(0, None, Vec2::ZERO);
        let opponent = plain_fighter(1, None, Vec2::new(5.0, 0.0));
        let mut effects = EffectPool::new();

        fighter.apply_status(EffectTag::Burn, Some(1));
        for _ in 0..180 {
            fighter.update(1.0 / 60.0, &opponent, None, &mut effects, arena.as_ref());
        }

        assert!(fighter.health < 100.0);
        assert!(fighter.take_dot_credit() > 0.0);
    }
}

// =============================================================================
// Combat Resolution
// =============================================================================

mod resolution {
    use super::*;

    fn resolver() -> CombatResolver {
        CombatResolver::new(open_arena(30.0), seeded(9))
    }

    fn payload(owner: FighterId, damage: f32) -> Payload {
        Payload {
            owner,
            skill: "Flame Ring".to_string(),
            damage,
            effect_tag: None,
        }
    }

    #[test]
    fn test_crossing_swings_clash() {
        let mut fighters = [
            plain_fighter(0, Some(sword()), Vec2::ZERO),
            plain_fighter(1, Some(sword()), Vec2::new(2.0, 0.0)),
        ];
        fighters[0].weapon_angle = PI / 4.0;
        fighters[1].weapon_angle = 3.0 * PI / 4.0;
        mid_swing(&mut fighters[0]);
        mid_swing(&mut fighters[1]);

        let result = resolver().resolve(&mut fighters, &mut EffectPool::new());

        assert!(result.clash);
        assert_eq!(result.events[0].kind, CombatEventKind::Clash);
        for fighter in &fighters {
            assert_eq!(fighter.health, 100.0);
            assert!(fighter.status.stun > 0.0);
        }
    }

    #[test]
    fn test_clash_suppresses_effect_damage_that_tick() {
        let mut fighters = [
            plain_fighter(0, Some(sword()), Vec2::ZERO),
            plain_fighter(1, Some(sword()), Vec2::new(2.0, 0.0)),
        ];
        fighters[0].weapon_angle = PI / 4.0;
        fighters[1].weapon_angle = 3.0 * PI / 4.0;
        mid_swing(&mut fighters[0]);
        mid_swing(&mut fighters[1]);

        let mut effects = EffectPool::new();
        effects.spawn(Effect::area(payload(0, 20.0), Vec2::new(2.0, 0.0), 1.5, 0.0, 1.0));
        let bolt = effects.spawn(Effect::projectile(
            payload(1, 15.0),
            Vec2::new(0.2, 0.0),
            Vec2::new(-10.0, 0.0),
            0.3,
            10.0,
        ));

        let result = resolver().resolve(&mut fighters, &mut effects);

        assert!(result.clash);
        assert_eq!(result.lethal, None);
        assert!(result.events.iter().all(|e| e.kind == CombatEventKind::Clash));
        for fighter in &fighters {
            assert_eq!(fighter.health, 100.0);
        }
        // Unspent effects stay live for a later tick
        assert!(effects.get(bolt).unwrap().active);
    }

    #[test]
    fn test_stun_mid_swing_keeps_spent_costs() {
        let arena = open_arena(30.0);
        let mut fighters = [
            plain_fighter(0, None, Vec2::new(-10.0, 0.0)),
            plain_fighter(1, Some(weapon_with_skills(&["Fireball"])), Vec2::new(1.0, 0.0)),
        ];
        let mut effects = EffectPool::new();
        assert!(fighters[1].use_skill(0, &mut effects, arena.as_ref()));
        assert!(fighters[1].start_attack());
        let (stamina, mana) = (fighters[1].stamina, fighters[1].mana);
        let cooldown = fighters[1].cooldown_remaining("Fireball");
        assert!(cooldown > 0.0);

        let stun = Payload {
            effect_tag: Some(EffectTag::Stun),
            ..payload(0, 0.0)
        };
        effects.spawn(Effect::area(stun, Vec2::new(1.0, 0.0), 1.0, 0.0, 1.0));
        resolver().resolve(&mut fighters, &mut effects);

        let stunned = &fighters[1];
        assert!(stunned.status.stun > 0.0);
        assert!(!stunned.attack.attacking);
        assert_eq!(stunned.stamina, stamina);
        assert_eq!(stunned.mana, mana);
        assert_eq!(stunned.cooldown_remaining("Fireball"), cooldown);
    }

    #[test]
    fn test_area_damages_once_over_its_lifetime() {
        let mut fighters = [
            plain_fighter(0, None, Vec2::new(-10.0, 0.0)),
            plain_fighter(1, None, Vec2::new(1.0, 0.0)),
        ];
        let mut effects = EffectPool::new();
        effects.spawn(Effect::area(payload(0, 12.0), Vec2::ZERO, 2.0, 0.0, 1.0));
        let arena = open_arena(30.0);
        let mut resolver = resolver();

        let mut hits = 0;
        for _ in 0..3 {
            // Clear the damage window so only the hit-set can stop a repeat
            fighters[1].status.invulnerable = 0.0;
            let result = resolver.resolve(&mut fighters, &mut effects);
            hits += result
                .events
                .iter()
                .filter(|e| e.kind == CombatEventKind::Hit)
                .count();
            effects.advance(1.0 / 60.0, arena.as_ref());
        }

        assert_eq!(hits, 1);
        assert_eq!(fighters[1].health, 88.0);
        assert_eq!(fighters[0].stats.damage_dealt, 12.0);
    }

    #[test]
    fn test_melee_kill_is_reported_as_lethal() {
        let mut fighters = [
            plain_fighter(0, Some(sword()), Vec2::ZERO),
            plain_fighter(1, None, Vec2::new(1.5, 0.0)),
        ];
        fighters[1].health = 1.0;
        mid_swing(&mut fighters[0]);

        let result = resolver().resolve(&mut fighters, &mut EffectPool::new());

        assert_eq!(result.lethal, Some(1));
        assert!(fighters[1].dead);
    }
}

// =============================================================================
// Spatial Awareness
// =============================================================================

mod awareness {
    use super::*;
    use duel_core::awareness::is_cornered;

    #[test]
    fn test_cornered_thresholds() {
        assert!(is_cornered(1.0, 2));
        assert!(is_cornered(8.0, 3));
        assert!(!is_cornered(3.0, 2));
        assert!(!is_cornered(1.0, 1));
    }

    #[test]
    fn test_fighter_in_corner_wants_out() {
        let mut awareness = SpatialAwareness::new(open_arena(10.0));
        awareness.recompute(Vec2::new(-4.2, -4.2), 0.5, Vec2::ZERO);

        assert!(awareness.state().cornered);
        assert_eq!(awareness.state().posture, Posture::Cornered);
        let tactics = awareness.evaluate_tactics(false);
        assert!(tactics.avoid_retreat);
        assert!(tactics.escape_bearing.is_some());
    }

    #[test]
    fn test_open_floor_is_not_cornered() {
        let mut awareness = SpatialAwareness::new(open_arena(30.0));
        awareness.recompute(Vec2::ZERO, 0.5, Vec2::new(2.0, 0.0));

        assert!(!awareness.state().cornered);
        assert_eq!(awareness.evaluate_tactics(false).escape_bearing, None);
    }
}

// =============================================================================
// Full Duels
// =============================================================================

mod duel {
    use super::*;

    #[test]
    fn test_duel_reaches_an_outcome() {
        let mut duel = standard_duel(21);
        let outcome = duel.run(60 * 120);

        assert!(outcome.is_some());
        assert!(duel.is_finished());
        if let Some(DuelOutcome::Knockout { winner }) = outcome {
            let loser = 1 - winner as usize;
            assert!(duel.fighters()[loser].dead);
            assert!(!duel.fighters()[winner as usize].dead);
        }
    }

    #[test]
    fn test_fighters_stay_inside_arena() {
        let mut duel = standard_duel(5);
        let dt = duel.config().fixed_dt();
        for _ in 0..1200 {
            duel.step(dt);
            for fighter in duel.fighters() {
                assert!(
                    duel.arena().bounds().contains(fighter.position, 0.0),
                    "{} left the arena at {:?}",
                    fighter.name,
                    fighter.position
                );
            }
        }
    }

    #[test]
    fn test_health_never_exceeds_bounds_during_duel() {
        let mut duel = standard_duel(8);
        let dt = duel.config().fixed_dt();
        for _ in 0..1800 {
            duel.step(dt);
            for fighter in duel.fighters() {
                assert!(fighter.health >= 0.0);
                assert!(fighter.health <= fighter.max_health);
            }
        }
    }

    #[test]
    fn test_reset_replays_the_same_duel() {
        let mut duel = standard_duel(13);
        let initial = duel.state_hash();
        duel.run(300);
        let after = duel.state_hash();

        duel.reset();
        assert_eq!(duel.state_hash(), initial);
        duel.run(300);
        assert_eq!(duel.state_hash(), after);
    }

    #[test]
    fn test_mirror_match_events_name_both_fighters() {
        let mut duel = duel_test_utils::fixtures::duel_between(&warrior(), &warrior(), 3);
        let dt = duel.config().fixed_dt();
        let mut attackers = std::collections::BTreeSet::new();
        for _ in 0..3600 {
            let tick = duel.step(dt);
            for event in tick.events {
                if event.kind == CombatEventKind::Hit {
                    attackers.insert(event.attacker);
                }
            }
            if duel.is_finished() {
                break;
            }
        }
        assert!(!attackers.is_empty());
        assert!(attackers.iter().all(|&id| id == RED || id == BLUE));
    }
}
