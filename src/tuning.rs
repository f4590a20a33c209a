//! Data-driven game balance
//!
//! Attack profiles and movement numbers. Defaults are compiled in; a JSON file
//! can override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Light (jab) or heavy (kick) attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackKind {
    Light,
    Heavy,
}

/// Timing, reach and feedback of one attack
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackProfile {
    /// Damage per connecting hit
    pub power: u32,
    /// Hitbox live time (ms)
    pub active_ms: f64,
    /// Lock time after the hitbox closes (ms)
    pub recovery_ms: f64,
    /// Hitbox width (px)
    pub width: f32,
    /// Horizontal knockback velocity
    pub push: f32,
    /// Stun applied to the target (ms)
    pub stun_ms: f64,
    pub hit_flash_color: u32,
    pub hit_shake_ms: f64,
    pub hit_shake_intensity: f32,
    /// Global physics pause on connect (ms)
    pub hit_stop_ms: f64,
}

pub const LIGHT_ATTACK: AttackProfile = AttackProfile {
    power: 7,
    active_ms: 80.0,
    recovery_ms: 28.0,
    width: 44.0,
    push: 160.0,
    stun_ms: 130.0,
    hit_flash_color: 0xc8f7ff,
    hit_shake_ms: 26.0,
    hit_shake_intensity: 0.0005,
    hit_stop_ms: 12.0,
};

pub const HEAVY_ATTACK: AttackProfile = AttackProfile {
    power: 20,
    active_ms: 190.0,
    recovery_ms: 260.0,
    width: 96.0,
    push: 430.0,
    stun_ms: 430.0,
    hit_flash_color: 0xffdf9a,
    hit_shake_ms: 130.0,
    hit_shake_intensity: 0.0026,
    hit_stop_ms: 82.0,
};

/// Player movement numbers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub walk_speed: f32,
    pub jump_velocity: f32,
    pub max_velocity_x: f32,
    pub max_velocity_y: f32,
    pub drag_x: f32,
    pub body_width: f32,
    pub body_height: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            walk_speed: 220.0,
            jump_velocity: -590.0,
            max_velocity_x: 350.0,
            max_velocity_y: 1000.0,
            drag_x: 1700.0,
            body_width: 30.0,
            body_height: 58.0,
        }
    }
}

/// Procedural enemy layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageTuning {
    pub spawn_start_x: f32,
    pub spawn_end_margin: f32,
    pub spawn_step_min: f32,
    pub spawn_step_max: f32,
    /// Roll below this spawns a heavy
    pub heavy_chance: f32,
    /// Roll above this spawns a rush
    pub rush_threshold: f32,
    /// Boss stands this far in front of the goal (None = no boss)
    pub boss_offset_from_goal: Option<f32>,
}

impl Default for StageTuning {
    fn default() -> Self {
        Self {
            spawn_start_x: 460.0,
            spawn_end_margin: 250.0,
            spawn_step_min: 110.0,
            spawn_step_max: 155.0,
            heavy_chance: 0.16,
            rush_threshold: 0.78,
            boss_offset_from_goal: Some(180.0),
        }
    }
}

/// Complete balance set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub light: AttackProfile,
    pub heavy: AttackProfile,
    pub player: PlayerTuning,
    pub stage: StageTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            light: LIGHT_ATTACK,
            heavy: HEAVY_ATTACK,
            player: PlayerTuning::default(),
            stage: StageTuning::default(),
        }
    }
}

/// Errors from loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid {kind:?} attack: {reason}")]
    InvalidAttack { kind: AttackKind, reason: &'static str },

    #[error("invalid stage layout: {0}")]
    InvalidStage(&'static str),
}

impl Tuning {
    /// Profile for an attack kind
    pub fn attack(&self, kind: AttackKind) -> &AttackProfile {
        match kind {
            AttackKind::Light => &self.light,
            AttackKind::Heavy => &self.heavy,
        }
    }

    /// Parse and validate tuning JSON
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file on disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        for kind in [AttackKind::Light, AttackKind::Heavy] {
            let profile = self.attack(kind);
            let reason = if profile.power == 0 {
                Some("power must be positive")
            } else if profile.width <= 0.0 {
                Some("width must be positive")
            } else if profile.active_ms <= 0.0 {
                Some("active time must be positive")
            } else if profile.recovery_ms < 0.0 || profile.stun_ms < 0.0 || profile.hit_stop_ms < 0.0 {
                Some("durations cannot be negative")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(TuningError::InvalidAttack { kind, reason });
            }
        }

        let stage = &self.stage;
        if stage.spawn_step_min <= 0.0 || stage.spawn_step_max < stage.spawn_step_min {
            return Err(TuningError::InvalidStage("spawn step range is empty"));
        }
        Ok(())
    }
}
