//! Stress meter
//!
//! Rises when the player is hurt (harder hits raise it more), drains over
//! time on ticks without damage, and drops a fixed amount per knockout
//! depending on the enemy kind.

use serde::{Deserialize, Serialize};

use super::enemy::EnemyKind;
use crate::consts::*;

pub trait StressEvents {
    fn on_player_damaged(&mut self, damage: u32);
    fn on_enemy_ko(&mut self, kind: EnemyKind);
}

pub trait StressReadModel {
    /// 0..=100, rounded
    fn stress_percent(&self) -> u32;
    fn is_critical(&self) -> bool;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressSystem {
    stress: f32,
    max_stress: f32,
    decay_per_second: f32,
    critical_percent: u32,
    /// Damage arrived since the last `tick`
    #[serde(default)]
    damaged_this_tick: bool,
}

impl Default for StressSystem {
    fn default() -> Self {
        Self::new(STRESS_MAX, STRESS_DECAY_PER_SECOND, STRESS_CRITICAL_PERCENT)
    }
}

impl StressSystem {
    pub fn new(max_stress: f32, decay_per_second: f32, critical_percent: u32) -> Self {
        Self {
            stress: 0.0,
            max_stress: max_stress.max(f32::EPSILON),
            decay_per_second: decay_per_second.max(0.0),
            critical_percent,
            damaged_this_tick: false,
        }
    }

    /// Drain over `delta_ms`, unless damage landed since the previous tick
    pub fn tick(&mut self, delta_ms: f64) {
        if std::mem::take(&mut self.damaged_this_tick) || self.stress <= 0.0 {
            return;
        }
        let drained = self.decay_per_second * (delta_ms / 1000.0) as f32;
        self.stress = (self.stress - drained).max(0.0);
    }

    pub fn stress(&self) -> f32 {
        self.stress
    }

    pub fn max_stress(&self) -> f32 {
        self.max_stress
    }

    /// Overwrite the meter (clamped)
    pub fn set_stress(&mut self, value: f32) {
        self.stress = value.clamp(0.0, self.max_stress);
    }

    /// Meter is full (not merely rounding to 100%)
    pub fn is_overloaded(&self) -> bool {
        self.stress >= self.max_stress
    }

    pub fn reset_run(&mut self) {
        self.stress = 0.0;
        self.damaged_this_tick = false;
    }
}

impl StressEvents for StressSystem {
    fn on_player_damaged(&mut self, damage: u32) {
        let rise = STRESS_DAMAGE_BASE + damage as f32 * STRESS_DAMAGE_SCALE;
        self.stress = (self.stress + rise).min(self.max_stress);
        self.damaged_this_tick = true;
    }

    fn on_enemy_ko(&mut self, kind: EnemyKind) {
        self.stress = (self.stress - kind.ko_profile().stress_relief).max(0.0);
    }
}

impl StressReadModel for StressSystem {
    fn stress_percent(&self) -> u32 {
        (self.stress / self.max_stress * 100.0).round() as u32
    }

    fn is_critical(&self) -> bool {
        self.stress_percent() >= self.critical_percent
    }
}
