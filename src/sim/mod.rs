//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Delayed effects go through token-guarded timer queues
//! - No rendering, audio or storage dependencies

pub mod actor;
pub mod ai;
pub mod body;
pub mod combat;
pub mod enemy;
pub mod player;
pub mod score;
pub mod state;
pub mod stress;
pub mod tick;
pub mod timers;

pub use actor::{Actor, Facing};
pub use ai::{ChaseDecision, EnemyAiSystem, chase_decision};
pub use body::{Aabb, Body, WorldBounds};
pub use combat::{AttackHitbox, AttackOutcome, AttackPhase, CombatSystem, HitOutcome};
pub use enemy::{Enemy, EnemyId, EnemyKind};
pub use player::Player;
pub use score::{ScoreEvents, ScoreReadModel, ScoreSystem};
pub use state::{GameEvent, GameState, RunOutcome, RunPhase, UiSnapshot};
pub use stress::{StressEvents, StressReadModel, StressSystem};
pub use tick::{TickInput, tick};
pub use timers::Schedule;
