//! Minimal arcade kinematics
//!
//! Every actor owns one `Body`: a bottom-centre anchored rectangle with a
//! velocity. Integration is plain continuous gravity with horizontal drag,
//! a velocity clamp, a ground line and world bounds.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box spanning `size` with its bottom-centre at `anchor`
    pub fn from_bottom_center(anchor: Vec2, size: Vec2) -> Self {
        Self {
            min: Vec2::new(anchor.x - size.x / 2.0, anchor.y - size.y),
            max: Vec2::new(anchor.x + size.x / 2.0, anchor.y),
        }
    }

    /// Box spanning `size` around `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Strict overlap (touching edges do not count)
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Static limits the integrator clamps against
#[derive(Debug, Clone, Copy)]
pub struct WorldBounds {
    pub width: f32,
    pub ground_y: f32,
    pub gravity: f32,
}

/// A kinematic body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    /// Bottom-centre position
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    /// Horizontal deceleration (px/s²) applied when no one drives the body
    pub drag_x: f32,
    pub max_vel: Vec2,
    pub allow_gravity: bool,
    /// Participates in overlap checks
    pub enabled: bool,
    /// Clamp to the stage and ground
    pub collide_world: bool,
    /// Standing on the ground after the last step
    #[serde(skip)]
    pub grounded: bool,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
            drag_x: 0.0,
            max_vel: Vec2::splat(f32::INFINITY),
            allow_gravity: true,
            enabled: true,
            collide_world: true,
            grounded: false,
        }
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_bottom_center(self.pos, self.size)
    }

    /// Both bodies enabled and their boxes intersect
    pub fn overlaps(&self, other: &Body) -> bool {
        self.enabled && other.enabled && self.aabb().intersects(&other.aabb())
    }

    pub fn set_velocity(&mut self, vel: Vec2) {
        self.vel = vel;
    }

    pub fn set_velocity_x(&mut self, vx: f32) {
        self.vel.x = vx;
    }

    pub fn set_velocity_y(&mut self, vy: f32) {
        self.vel.y = vy;
    }

    /// Advance by `dt` seconds
    pub fn integrate(&mut self, dt: f32, bounds: &WorldBounds) {
        if self.allow_gravity {
            self.vel.y += bounds.gravity * dt;
        }

        // Drag only bleeds speed toward zero, never flips direction
        if self.drag_x > 0.0 && self.vel.x != 0.0 {
            let slowed = self.vel.x.abs() - self.drag_x * dt;
            self.vel.x = if slowed > 0.0 {
                slowed * self.vel.x.signum()
            } else {
                0.0
            };
        }

        self.vel = self.vel.clamp(-self.max_vel, self.max_vel);
        self.pos += self.vel * dt;

        self.grounded = false;
        if self.collide_world {
            let half_w = self.size.x / 2.0;
            if self.pos.x - half_w < 0.0 {
                self.pos.x = half_w;
                self.vel.x = self.vel.x.max(0.0);
            } else if self.pos.x + half_w > bounds.width {
                self.pos.x = bounds.width - half_w;
                self.vel.x = self.vel.x.min(0.0);
            }
            if self.pos.y >= bounds.ground_y {
                self.pos.y = bounds.ground_y;
                self.vel.y = self.vel.y.min(0.0);
                self.grounded = true;
            }
        }
    }
}
