//! Run state and the per-run orchestrator
//!
//! Everything a run owns lives in `GameState`. `reset_run` is the single
//! place run-scoped state is rebuilt; the only things that survive it are
//! the hi-score, the tuning and the RNG stream.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ai::EnemyAiSystem;
use super::combat::{AttackPhase, CombatSinks, CombatSystem, CombatWorld};
use super::enemy::{Enemy, EnemyId, EnemyKind};
use super::player::Player;
use super::score::{ScoreReadModel, ScoreSystem};
use super::stress::{StressEvents, StressReadModel, StressSystem};
use super::timers::Schedule;
use crate::consts::*;
use crate::tuning::{AttackKind, Tuning};

/// How a run finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// Reached the goal zone
    GoalReached,
    /// Every enemy removed from the train
    Cleared,
    /// Hit points ran out
    Defeated,
    /// Stress meter maxed out
    StressOverload,
}

impl RunOutcome {
    pub fn is_win(self) -> bool {
        matches!(self, RunOutcome::GoalReached | RunOutcome::Cleared)
    }

    /// Result banner text
    pub fn message(self) -> &'static str {
        match self {
            RunOutcome::GoalReached | RunOutcome::Cleared => "YOU WIN!",
            RunOutcome::Defeated => "GAME OVER",
            RunOutcome::StressOverload => "STRESS OVERLOAD",
        }
    }
}

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    Active,
    /// Latched once per run; only a restart leaves it
    Ended(RunOutcome),
}

impl RunPhase {
    #[inline]
    pub fn is_ended(self) -> bool {
        matches!(self, RunPhase::Ended(_))
    }
}

/// Feedback for presentation collaborators (camera, audio, HUD popups)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    CameraShake { duration_ms: f64, intensity: f32 },
    HitStop { duration_ms: f64 },
    AttackStarted { kind: AttackKind },
    EnemyHit { id: EnemyId, kind: EnemyKind, damage: u32, remaining_hp: u32 },
    EnemyKnockedOut { id: EnemyId, kind: EnemyKind },
    FinisherBonus { amount: u64 },
    PlayerDamaged { damage: u32, hp: u32 },
    HiScoreChanged { hi_score: u64 },
    RunEnded { outcome: RunOutcome, score: u64 },
}

/// Read model pulled by the HUD once per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiSnapshot {
    pub combo: u32,
    pub score: u64,
    pub hi_score: u64,
    pub hp: u32,
    pub max_hp: u32,
    pub stress_percent: u32,
    pub stress_critical: bool,
    pub enemies_left: usize,
    /// Distance to the goal zone in displayed metres
    pub dist_to_goal_m: u32,
    pub phase: RunPhase,
    pub attack_phase: AttackPhase,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum SceneTimer {
    ResetPlayerTint { run: u32 },
}

/// Complete state of the current run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed of the current layout
    pub seed: u64,
    /// Incremented by every reset; guards scene timers
    pub run_id: u32,
    /// Scene clock
    pub now_ms: f64,
    pub phase: RunPhase,
    pub tuning: Tuning,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub score: ScoreSystem,
    pub stress: StressSystem,
    pub combat: CombatSystem,
    pub ai: EnemyAiSystem,
    /// Goal zone starts at this x
    pub goal_x: f32,
    pub(super) scene_timers: Schedule<SceneTimer>,
    pub(super) events: Vec<GameEvent>,
    rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create a run with the given layout seed and stored hi-score
    pub fn new(seed: u64, hi_score: u64, tuning: Tuning) -> Self {
        let mut state = Self {
            seed,
            run_id: 0,
            now_ms: 0.0,
            phase: RunPhase::Active,
            tuning,
            player: Player::new(PLAYER_START_X, &tuning.player),
            enemies: Vec::new(),
            score: ScoreSystem::new(hi_score),
            stress: StressSystem::default(),
            combat: CombatSystem::new(seed ^ 0x9e37_79b9_7f4a_7c15),
            ai: EnemyAiSystem,
            goal_x: WORLD_WIDTH - GOAL_MARGIN,
            scene_timers: Schedule::new(),
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        };
        state.reset_run();
        state
    }

    /// Rebuild every run-scoped field and lay out a fresh stage
    pub fn reset_run(&mut self) {
        self.run_id += 1;
        self.now_ms = 0.0;
        self.phase = RunPhase::Active;
        self.player = Player::new(PLAYER_START_X, &self.tuning.player);
        self.enemies.clear();
        self.next_id = 1;
        self.score.reset_run();
        self.stress.reset_run();
        self.combat.reset();
        self.scene_timers.clear();
        self.events.clear();
        self.generate_stage();
        log::info!(
            "Run {} started (seed {}, {} enemies)",
            self.run_id,
            self.seed,
            self.enemies.len()
        );
    }

    /// New layout seed from the RNG stream, then a full reset
    pub fn restart(&mut self) {
        self.seed = self.rng.random();
        self.rng = Pcg32::seed_from_u64(self.seed);
        log::info!("Restarting with seed {}", self.seed);
        self.reset_run();
    }

    /// Allocate a new enemy ID
    pub fn next_enemy_id(&mut self) -> EnemyId {
        let id = EnemyId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn spawn_enemy(&mut self, kind: EnemyKind, x: f32) -> EnemyId {
        let id = self.next_enemy_id();
        self.enemies.push(Enemy::new(id, kind, x));
        id
    }

    /// Spread enemies along the carriage and park a boss before the goal
    fn generate_stage(&mut self) {
        let stage = self.tuning.stage;
        self.goal_x = WORLD_WIDTH - GOAL_MARGIN;

        let limit = WORLD_WIDTH - stage.spawn_end_margin;
        let mut x = stage.spawn_start_x;
        while x < limit {
            let roll: f32 = self.rng.random();
            let kind = EnemyKind::from_roll(roll, stage.heavy_chance, stage.rush_threshold);
            self.spawn_enemy(kind, x);
            x += self
                .rng
                .random_range(stage.spawn_step_min..=stage.spawn_step_max);
        }

        if let Some(offset) = stage.boss_offset_from_goal {
            self.spawn_enemy(EnemyKind::Boss, self.goal_x - offset);
        }
    }

    /// Split out combat and the world it acts on
    pub(super) fn split_combat(&mut self) -> (&mut CombatSystem, CombatWorld<'_>) {
        (
            &mut self.combat,
            CombatWorld {
                now_ms: self.now_ms,
                player: &mut self.player,
                enemies: &mut self.enemies,
                sinks: CombatSinks {
                    score: &mut self.score,
                    stress: &mut self.stress,
                    events: &mut self.events,
                },
            },
        )
    }

    /// Contact between the player and `self.enemies[index]`
    pub fn on_player_hit(&mut self, index: usize) {
        if self.phase.is_ended() {
            return;
        }
        let now = self.now_ms;
        let Some(enemy) = self.enemies.get(index) else {
            return;
        };
        if !enemy.is_live() {
            return;
        }
        let damage = enemy.contact_damage();
        let enemy_x = enemy.actor.x();

        let Some(taken) = self.player.take_contact_damage(now, damage, PLAYER_INVULN_MS) else {
            return;
        };
        self.stress.on_player_damaged(damage);
        self.player.flash_damaged();

        let away = if self.player.actor.x() < enemy_x { -1.0 } else { 1.0 };
        self.player
            .actor
            .body
            .set_velocity(Vec2::new(away * PLAYER_KNOCKBACK_X, PLAYER_KNOCKBACK_Y));

        self.events.push(GameEvent::PlayerDamaged {
            damage: taken,
            hp: self.player.hp,
        });
        self.events.push(GameEvent::CameraShake {
            duration_ms: PLAYER_HIT_SHAKE_MS,
            intensity: PLAYER_HIT_SHAKE_INTENSITY,
        });
        self.scene_timers.schedule(
            now + PLAYER_HIT_TINT_RESET_MS,
            SceneTimer::ResetPlayerTint { run: self.run_id },
        );

        if self.player.is_dead() {
            self.end_run(RunOutcome::Defeated);
        }
    }

    /// Latch the run result. Returns false if the run had already ended.
    pub fn end_run(&mut self, outcome: RunOutcome) -> bool {
        if self.phase.is_ended() {
            return false;
        }
        self.phase = RunPhase::Ended(outcome);
        self.combat.disable();
        self.player.actor.body.set_velocity_x(0.0);
        for enemy in &mut self.enemies {
            enemy.actor.body.set_velocity_x(0.0);
        }

        let score = self.score.score();
        self.events.push(GameEvent::RunEnded { outcome, score });
        self.sync_hi_score();
        log::info!("Run {} ended: {} (score {})", self.run_id, outcome.message(), score);
        true
    }

    /// Fire combat and scene timers due now
    pub(super) fn advance_timers(&mut self) {
        {
            let (combat, mut world) = self.split_combat();
            combat.advance(&mut world);
        }
        while let Some(timer) = self.scene_timers.pop_due(self.now_ms) {
            match timer {
                SceneTimer::ResetPlayerTint { run } => {
                    if run == self.run_id {
                        self.player.actor.reset_color();
                    }
                }
            }
        }
    }

    /// Score and stress decay, then the hi-score check
    pub(super) fn tick_systems(&mut self, delta_ms: f64) {
        self.score.tick(delta_ms);
        self.stress.tick(delta_ms);
        self.sync_hi_score();
    }

    fn sync_hi_score(&mut self) {
        if self.score.sync_hi_score() {
            let hi_score = self.score.hi_score();
            log::info!("New hi-score {hi_score}");
            self.events.push(GameEvent::HiScoreChanged { hi_score });
        }
    }

    /// Hand pending events to the presentation layer
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> UiSnapshot {
        let dist_px = (self.goal_x - self.player.actor.x()).max(0.0);
        UiSnapshot {
            combo: self.score.combo(),
            score: self.score.score(),
            hi_score: self.score.hi_score(),
            hp: self.player.hp,
            max_hp: self.player.max_hp,
            stress_percent: self.stress.stress_percent(),
            stress_critical: self.stress.is_critical(),
            enemies_left: self.enemies.len(),
            dist_to_goal_m: (dist_px / PIXELS_PER_METRE).ceil() as u32,
            phase: self.phase,
            attack_phase: self.combat.attack_phase(self.now_ms),
        }
    }
}
