//! Fixed timestep simulation tick
//!
//! One call advances the run by `dt`. The order is fixed: restart, clock,
//! input, AI, physics and overlaps (skipped during hit-stop), timers,
//! score/stress decay, end checks.

use super::body::WorldBounds;
use super::combat::AttackPhase;
use super::score::ScoreReadModel;
use super::state::{GameState, RunOutcome};
use crate::consts::*;
use crate::tuning::AttackKind;

/// Axis magnitude below which analog movement is ignored
const MOVE_DEADZONE: f32 = 0.2;
/// Autopilot swings when a live enemy is this close
const AUTOPILOT_ENGAGE_RANGE: f32 = 72.0;
/// Autopilot starts a heavy chain from this combo
const AUTOPILOT_CHAIN_COMBO: u32 = 2;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Horizontal intent in -1..=1 (keys give ±1, touch sticks anything between)
    pub move_axis: f32,
    /// Jump pressed this tick
    pub jump: bool,
    /// Light attack pressed this tick
    pub light: bool,
    /// Heavy attack pressed this tick
    pub heavy: bool,
    /// Restart after the run has ended
    pub restart: bool,
    /// Demo mode - AI plays the run
    pub autopilot: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.phase.is_ended() && input.restart {
        state.restart();
        return;
    }

    let dt_ms = dt as f64 * 1000.0;
    state.now_ms += dt_ms;

    let ended = state.phase.is_ended();
    if !ended {
        let input = if input.autopilot {
            autopilot_input(state)
        } else {
            input.clone()
        };
        apply_player_input(state, &input);
    }

    let player_pos = state.player.actor.body.pos;
    state
        .ai
        .update(state.now_ms, player_pos, &mut state.enemies, ended);

    if !state.combat.is_world_paused() {
        step_physics(state, dt);
        dispatch_overlaps(state);
    }

    state.advance_timers();
    state.tick_systems(dt_ms);
    check_run_end(state);
}

fn apply_player_input(state: &mut GameState, input: &TickInput) {
    let walk_speed = state.tuning.player.walk_speed;
    let actor = &mut state.player.actor;
    if input.move_axis < -MOVE_DEADZONE {
        actor.body.set_velocity_x(-walk_speed);
        actor.facing = actor.facing.toward(-1.0);
    } else if input.move_axis > MOVE_DEADZONE {
        actor.body.set_velocity_x(walk_speed);
        actor.facing = actor.facing.toward(1.0);
    }

    if input.jump && actor.body.grounded {
        actor.body.set_velocity_y(state.tuning.player.jump_velocity);
    }

    if input.light {
        request_attack(state, AttackKind::Light);
    }
    if input.heavy {
        request_attack(state, AttackKind::Heavy);
    }
}

fn request_attack(state: &mut GameState, kind: AttackKind) {
    let profile = *state.tuning.attack(kind);
    let (combat, mut world) = state.split_combat();
    combat.attack(kind, &profile, &mut world);
}

fn step_physics(state: &mut GameState, dt: f32) {
    let bounds = WorldBounds {
        width: WORLD_WIDTH,
        ground_y: GROUND_Y,
        gravity: GRAVITY,
    };
    state.player.actor.body.integrate(dt, &bounds);
    for enemy in &mut state.enemies {
        enemy.actor.body.integrate(dt, &bounds);
    }
}

/// Hitbox against enemies first, then enemies against the player
fn dispatch_overlaps(state: &mut GameState) {
    if state.phase.is_ended() {
        return;
    }

    for index in 0..state.enemies.len() {
        if state.combat.hitbox().overlaps(&state.enemies[index].actor.body) {
            let (combat, mut world) = state.split_combat();
            combat.on_hit_enemy(index, &mut world);
        }
    }

    for index in 0..state.enemies.len() {
        if state.phase.is_ended() {
            break;
        }
        if state.player.actor.body.overlaps(&state.enemies[index].actor.body) {
            state.on_player_hit(index);
        }
    }
}

fn check_run_end(state: &mut GameState) {
    if state.phase.is_ended() {
        return;
    }

    let outcome = if state.player.is_dead() {
        RunOutcome::Defeated
    } else if state.stress.is_overloaded() {
        RunOutcome::StressOverload
    } else if state.player.actor.x() >= state.goal_x {
        RunOutcome::GoalReached
    } else if state.enemies.is_empty() {
        RunOutcome::Cleared
    } else {
        return;
    };
    state.end_run(outcome);
}

/// Demo AI: walk toward the goal and fight whatever gets close
fn autopilot_input(state: &GameState) -> TickInput {
    let mut input = TickInput::default();
    let px = state.player.actor.x();

    let nearest = state.enemies.iter().filter(|e| e.is_live()).min_by(|a, b| {
        (a.actor.x() - px)
            .abs()
            .partial_cmp(&(b.actor.x() - px).abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let Some(enemy) = nearest.filter(|e| (e.actor.x() - px).abs() < AUTOPILOT_ENGAGE_RANGE) else {
        input.move_axis = 1.0;
        return input;
    };

    // Turn around first if the threat is behind
    let dx = enemy.actor.x() - px;
    let facing = state.player.actor.facing;
    if facing.toward(dx) != facing {
        input.move_axis = dx.signum();
        return input;
    }

    match state.combat.attack_phase(state.now_ms) {
        AttackPhase::Idle => input.light = true,
        _ => {
            input.heavy = state.combat.current_attack() == Some(AttackKind::Light)
                && state.score.combo() >= AUTOPILOT_CHAIN_COMBO;
        }
    }
    input
}
