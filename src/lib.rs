//! Rush Breaker - a side-scrolling train brawler core
//!
//! Core modules:
//! - `sim`: Combat and encounter simulation (actors, combat, score, stress, AI, run state)
//! - `tuning`: Data-driven attack profiles and balance numbers
//! - `persistence`: Key-value storage boundary used by high scores and settings
//! - `highscores`: Hi-score and ranking
//! - `settings`: Presentation preferences

pub mod highscores;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Stage dimensions (y grows downward, actors stand on GROUND_Y)
    pub const WORLD_WIDTH: f32 = 3200.0;
    pub const WORLD_HEIGHT: f32 = 540.0;
    pub const GROUND_Y: f32 = WORLD_HEIGHT - 68.0;
    /// Goal zone begins this far before the end of the train
    pub const GOAL_MARGIN: f32 = 120.0;
    /// Pixels per displayed metre on the HUD
    pub const PIXELS_PER_METRE: f32 = 32.0;

    /// Arcade gravity (pixels/s²)
    pub const GRAVITY: f32 = 1400.0;

    /// Player defaults
    pub const PLAYER_START_X: f32 = 110.0;
    pub const PLAYER_MAX_HP: u32 = 5;
    pub const PLAYER_INVULN_MS: f64 = 800.0;
    pub const PLAYER_HIT_TINT_RESET_MS: f64 = 170.0;
    pub const PLAYER_HIT_FLASH_COLOR: u32 = 0xff9ea8;
    pub const PLAYER_BASE_COLOR: u32 = 0xffffff;
    pub const PLAYER_KNOCKBACK_X: f32 = 230.0;
    pub const PLAYER_KNOCKBACK_Y: f32 = -170.0;
    pub const PLAYER_HIT_SHAKE_MS: f64 = 110.0;
    pub const PLAYER_HIT_SHAKE_INTENSITY: f32 = 0.003;

    /// Enemy physics
    pub const ENEMY_DRAG_X: f32 = 900.0;
    pub const ENEMY_MAX_VELOCITY_X: f32 = 220.0;
    pub const ENEMY_MAX_VELOCITY_Y: f32 = 1000.0;

    /// Enemies stop chasing beyond this horizontal distance
    pub const ENEMY_CHASE_RANGE: f32 = 440.0;

    /// Score tuning
    pub const COMBO_WINDOW_MS: f64 = 1150.0;
    pub const HIT_COMBO_SCALE: u64 = 2;
    pub const HIT_COMBO_CAP: u64 = 50;
    pub const KO_COMBO_SCALE: u64 = 4;
    pub const KO_COMBO_CAP: u64 = 120;
    pub const FINISHER_COMBO_SCALE: u64 = 15;
    pub const FINISHER_MIN_COMBO: u32 = 2;

    /// Stress tuning
    pub const STRESS_MAX: f32 = 100.0;
    pub const STRESS_DECAY_PER_SECOND: f32 = 7.0;
    pub const STRESS_CRITICAL_PERCENT: u32 = 85;
    pub const STRESS_DAMAGE_BASE: f32 = 8.0;
    pub const STRESS_DAMAGE_SCALE: f32 = 18.0;
}
