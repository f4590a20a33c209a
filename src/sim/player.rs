//! The player character

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::Actor;
use crate::consts::*;
use crate::tuning::PlayerTuning;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub actor: Actor,
    pub hp: u32,
    pub max_hp: u32,
    /// Contact damage is ignored before this time
    pub invuln_until_ms: f64,
}

impl Player {
    pub fn new(x: f32, tuning: &PlayerTuning) -> Self {
        let mut actor = Actor::new(
            Vec2::new(x, GROUND_Y),
            Vec2::new(tuning.body_width, tuning.body_height),
            PLAYER_BASE_COLOR,
        );
        actor.body.drag_x = tuning.drag_x;
        actor.body.max_vel = Vec2::new(tuning.max_velocity_x, tuning.max_velocity_y);

        Self {
            actor,
            hp: PLAYER_MAX_HP,
            max_hp: PLAYER_MAX_HP,
            invuln_until_ms: 0.0,
        }
    }

    #[inline]
    pub fn is_invulnerable(&self, now_ms: f64) -> bool {
        now_ms < self.invuln_until_ms
    }

    /// Apply contact damage unless invulnerable
    ///
    /// Returns the damage actually taken; `None` means the hit was suppressed
    /// and neither hp nor the invulnerability window changed.
    pub fn take_contact_damage(&mut self, now_ms: f64, damage: u32, invuln_ms: f64) -> Option<u32> {
        if self.is_invulnerable(now_ms) || self.hp == 0 {
            return None;
        }
        let taken = damage.min(self.hp);
        self.hp -= taken;
        self.invuln_until_ms = now_ms + invuln_ms;
        Some(taken)
    }

    pub fn flash_damaged(&mut self) {
        self.actor.flash(PLAYER_HIT_FLASH_COLOR);
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.hp == 0
    }
}
