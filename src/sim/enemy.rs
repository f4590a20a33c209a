//! Enemy kinds, their stat tables and the knockout sub-state

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::Actor;
use crate::consts::*;

/// Closed set of enemy kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    Normal,
    Rush,
    Heavy,
    Boss,
}

/// Immutable per-kind stats
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemySpec {
    pub width: f32,
    pub height: f32,
    pub base_hp: u32,
    pub aggro_speed: f32,
    pub contact_damage: u32,
    pub hit_score_base: u64,
    pub ko_bonus: u64,
    pub base_color: u32,
}

/// How a knocked-out enemy flies off, and how much stress the kill relieves
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KoProfile {
    /// Added to the attack's push on the knockout launch
    pub push_bonus: f32,
    pub launch_y: f32,
    pub stress_relief: f32,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 4] = [
        EnemyKind::Normal,
        EnemyKind::Rush,
        EnemyKind::Heavy,
        EnemyKind::Boss,
    ];

    pub fn spec(self) -> EnemySpec {
        match self {
            EnemyKind::Normal => EnemySpec {
                width: 28.0,
                height: 52.0,
                base_hp: 18,
                aggro_speed: 74.0,
                contact_damage: 1,
                hit_score_base: 10,
                ko_bonus: 110,
                base_color: 0x8fa3c8,
            },
            EnemyKind::Rush => EnemySpec {
                width: 24.0,
                height: 48.0,
                base_hp: 14,
                aggro_speed: 112.0,
                contact_damage: 1,
                hit_score_base: 14,
                ko_bonus: 150,
                base_color: 0xd98c5f,
            },
            EnemyKind::Heavy => EnemySpec {
                width: 36.0,
                height: 60.0,
                base_hp: 34,
                aggro_speed: 46.0,
                contact_damage: 2,
                hit_score_base: 22,
                ko_bonus: 220,
                base_color: 0x6b7d5a,
            },
            EnemyKind::Boss => EnemySpec {
                width: 48.0,
                height: 72.0,
                base_hp: 90,
                aggro_speed: 58.0,
                contact_damage: 3,
                hit_score_base: 40,
                ko_bonus: 600,
                base_color: 0x8e3b46,
            },
        }
    }

    pub fn ko_profile(self) -> KoProfile {
        match self {
            EnemyKind::Normal => KoProfile {
                push_bonus: 280.0,
                launch_y: -380.0,
                stress_relief: 5.0,
            },
            EnemyKind::Rush => KoProfile {
                push_bonus: 280.0,
                launch_y: -380.0,
                stress_relief: 7.0,
            },
            EnemyKind::Heavy => KoProfile {
                push_bonus: 190.0,
                launch_y: -300.0,
                stress_relief: 10.0,
            },
            EnemyKind::Boss => KoProfile {
                push_bonus: 120.0,
                launch_y: -240.0,
                stress_relief: 20.0,
            },
        }
    }

    /// Pick a kind from a uniform roll in [0, 1)
    pub fn from_roll(roll: f32, heavy_chance: f32, rush_threshold: f32) -> Self {
        if roll < heavy_chance {
            EnemyKind::Heavy
        } else if roll > rush_threshold {
            EnemyKind::Rush
        } else {
            EnemyKind::Normal
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EnemyKind::Normal => "normal",
            EnemyKind::Rush => "rush",
            EnemyKind::Heavy => "heavy",
            EnemyKind::Boss => "boss",
        }
    }
}

/// Stable enemy handle (survives removal of other enemies)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemyId(pub u32);

/// Animation the renderer should play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnemyAnim {
    #[default]
    Idle,
    Walk,
}

/// Terminal state of a defeated enemy, kept until removal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Knockout {
    pub started_ms: f64,
    pub fade_ms: f64,
    /// Final spin angle in degrees (signed by launch direction)
    pub spin_deg: f32,
}

impl Knockout {
    /// Fade progress 0..=1 for rendering
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.fade_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.started_ms) / self.fade_ms).clamp(0.0, 1.0) as f32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub actor: Actor,
    pub hp: u32,
    pub max_hp: u32,
    pub knockout: Option<Knockout>,
    pub anim: EnemyAnim,
}

impl Enemy {
    /// Spawn standing on the ground at `x`
    pub fn new(id: EnemyId, kind: EnemyKind, x: f32) -> Self {
        let spec = kind.spec();
        let mut actor = Actor::new(
            Vec2::new(x, GROUND_Y),
            Vec2::new(spec.width, spec.height),
            spec.base_color,
        );
        actor.body.drag_x = ENEMY_DRAG_X;
        actor.body.max_vel = Vec2::new(ENEMY_MAX_VELOCITY_X, ENEMY_MAX_VELOCITY_Y);
        actor.facing = super::actor::Facing::Left;

        Self {
            id,
            kind,
            actor,
            hp: spec.base_hp,
            max_hp: spec.base_hp,
            knockout: None,
            anim: EnemyAnim::Idle,
        }
    }

    pub fn aggro_speed(&self) -> f32 {
        self.kind.spec().aggro_speed
    }

    pub fn contact_damage(&self) -> u32 {
        self.kind.spec().contact_damage
    }

    pub fn hit_score_base(&self) -> u64 {
        self.kind.spec().hit_score_base
    }

    pub fn ko_bonus(&self) -> u64 {
        self.kind.spec().ko_bonus
    }

    #[inline]
    pub fn is_knocked_out(&self) -> bool {
        self.knockout.is_some()
    }

    /// Alive and not in the knockout sub-state
    #[inline]
    pub fn is_live(&self) -> bool {
        self.hp > 0 && self.knockout.is_none()
    }
}
