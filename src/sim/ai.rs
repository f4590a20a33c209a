//! Enemy chase behaviour
//!
//! Writes velocity, facing and animation only. Score and stress are never
//! touched from here.

use glam::Vec2;

use super::actor::Facing;
use super::enemy::{Enemy, EnemyAnim};
use crate::consts::ENEMY_CHASE_RANGE;

/// Horizontal velocity and pose for one enemy this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChaseDecision {
    pub velocity_x: f32,
    pub facing: Option<Facing>,
    pub anim: EnemyAnim,
}

impl ChaseDecision {
    const IDLE: ChaseDecision = ChaseDecision {
        velocity_x: 0.0,
        facing: None,
        anim: EnemyAnim::Idle,
    };
}

/// Pure chase rule for one enemy
pub fn chase_decision(enemy: &Enemy, player_pos: Vec2, now_ms: f64) -> ChaseDecision {
    // Inclusive at the boundary, unlike the hit guard in `Actor::is_stunned`
    if now_ms <= enemy.actor.stunned_until_ms {
        return ChaseDecision::IDLE;
    }

    let dx = player_pos.x - enemy.actor.x();
    if dx.abs() >= ENEMY_CHASE_RANGE || dx == 0.0 {
        return ChaseDecision::IDLE;
    }

    ChaseDecision {
        velocity_x: dx.signum() * enemy.aggro_speed(),
        facing: Some(Facing::Right.toward(dx)),
        anim: EnemyAnim::Walk,
    }
}

#[derive(Debug, Clone, Default)]
pub struct EnemyAiSystem;

impl EnemyAiSystem {
    /// Assign chase velocities to every live enemy
    pub fn update(&self, now_ms: f64, player_pos: Vec2, enemies: &mut [Enemy], ended: bool) {
        if ended {
            return;
        }
        for enemy in enemies.iter_mut().filter(|e| !e.is_knocked_out()) {
            let decision = chase_decision(enemy, player_pos, now_ms);
            enemy.actor.body.set_velocity_x(decision.velocity_x);
            if let Some(facing) = decision.facing {
                enemy.actor.facing = facing;
            }
            enemy.anim = decision.anim;
        }
    }
}
