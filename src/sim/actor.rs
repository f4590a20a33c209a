//! Shared actor state for the player and enemies

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::Body;

/// Horizontal facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// -1.0 for left, 1.0 for right
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// Facing toward a signed horizontal offset (zero keeps `self`)
    pub fn toward(self, dx: f32) -> Self {
        if dx < 0.0 {
            Facing::Left
        } else if dx > 0.0 {
            Facing::Right
        } else {
            self
        }
    }
}

/// Common fields of anything that stands in the train
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub body: Body,
    /// Cannot be hit (enemy) or act (AI) before this time
    pub stunned_until_ms: f64,
    pub base_color: u32,
    /// Flash colour overriding `base_color` while set
    pub tint: Option<u32>,
    pub facing: Facing,
}

impl Actor {
    pub fn new(pos: Vec2, size: Vec2, base_color: u32) -> Self {
        Self {
            body: Body::new(pos, size),
            stunned_until_ms: 0.0,
            base_color,
            tint: None,
            facing: Facing::Right,
        }
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.body.pos.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.body.pos.y
    }

    /// Still reacting to a hit at `now_ms`
    #[inline]
    pub fn is_stunned(&self, now_ms: f64) -> bool {
        now_ms < self.stunned_until_ms
    }

    pub fn flash(&mut self, color: u32) {
        self.tint = Some(color);
    }

    pub fn reset_color(&mut self) {
        self.tint = None;
    }

    /// Colour the renderer should draw
    pub fn display_color(&self) -> u32 {
        self.tint.unwrap_or(self.base_color)
    }
}
