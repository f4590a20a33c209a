//! Attack resolution
//!
//! One reusable hitbox, one attack lock. A swing goes Active (hitbox live)
//! → Recovery (hitbox parked, player still locked) → Idle. A heavy press
//! during a light swing's tail can be buffered and fires automatically when
//! the light swing's lock releases, but only while a live enemy is within
//! reach in front of the player.
//!
//! Hits apply a global hit-stop. Each hit-stop takes a fresh token; only the
//! latest token may resume the world, and `disable()` resumes it outright.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::{Aabb, Body};
use super::enemy::{Enemy, EnemyId, Knockout};
use super::player::Player;
use super::score::ScoreEvents;
use super::state::GameEvent;
use super::stress::StressEvents;
use super::timers::Schedule;
use crate::tuning::{AttackKind, AttackProfile};

pub const ATTACK_HITBOX_HEIGHT: f32 = 44.0;
pub const ATTACK_HITBOX_DEFAULT_WIDTH: f32 = 52.0;
pub const ATTACK_HITBOX_Y_OFFSET: f32 = 20.0;
pub const ATTACK_FORWARD_OFFSET: f32 = 24.0;
pub const ATTACK_WIDTH_OFFSET_SCALE: f32 = 0.32;
pub const ATTACK_LUNGE_VELOCITY: f32 = 130.0;
pub const HITBOX_OFFSCREEN: f32 = -9999.0;

pub const HEAVY_CHAIN_WINDOW_MS: f64 = 180.0;
/// Reach checked before a heavy may be buffered
pub const HEAVY_CHAIN_FORWARD_DISTANCE: f32 = 150.0;
pub const HEAVY_CHAIN_VERTICAL_DISTANCE: f32 = 70.0;

pub const ENEMY_DEFAULT_HIT_STUN_MS: f64 = 280.0;
pub const ENEMY_HIT_TINT_RESET_MS: f64 = 80.0;
pub const ENEMY_AIR_KNOCKBACK_Y: f32 = -120.0;
pub const ENEMY_DEATH_STUN_MS: f64 = 999_999.0;
pub const ENEMY_KO_COLOR: u32 = 0xfff1b5;
pub const ENEMY_KO_SHAKE_MS: f64 = 90.0;
pub const ENEMY_KO_SHAKE_INTENSITY: f32 = 0.0022;
pub const ENEMY_KO_ROTATION_MIN: f32 = 35.0;
pub const ENEMY_KO_ROTATION_MAX: f32 = 75.0;
pub const ENEMY_KO_FADE_MS: f64 = 460.0;

/// The single reusable attack hitbox
#[derive(Debug, Clone)]
pub struct AttackHitbox {
    pub power: u32,
    pub push: f32,
    pub stun_ms: f64,
    pub hit_flash_color: u32,
    pub hit_shake_ms: f64,
    pub hit_shake_intensity: f32,
    pub hit_stop_ms: f64,
    pub active: bool,
    pub body: Body,
}

impl AttackHitbox {
    fn new() -> Self {
        let mut body = Body::new(
            Vec2::splat(HITBOX_OFFSCREEN),
            Vec2::new(ATTACK_HITBOX_DEFAULT_WIDTH, ATTACK_HITBOX_HEIGHT),
        );
        body.allow_gravity = false;
        body.collide_world = false;
        body.enabled = false;

        let mut hitbox = Self {
            power: 0,
            push: 0.0,
            stun_ms: ENEMY_DEFAULT_HIT_STUN_MS,
            hit_flash_color: 0xffffff,
            hit_shake_ms: 0.0,
            hit_shake_intensity: 0.0,
            hit_stop_ms: 0.0,
            active: false,
            body,
        };
        hitbox.reset_profile();
        hitbox
    }

    fn apply_profile(&mut self, profile: &AttackProfile) {
        self.power = profile.power;
        self.push = profile.push;
        self.stun_ms = profile.stun_ms;
        self.hit_flash_color = profile.hit_flash_color;
        self.hit_shake_ms = profile.hit_shake_ms;
        self.hit_shake_intensity = profile.hit_shake_intensity;
        self.hit_stop_ms = profile.hit_stop_ms;
    }

    fn reset_profile(&mut self) {
        self.power = 0;
        self.push = 0.0;
        self.stun_ms = ENEMY_DEFAULT_HIT_STUN_MS;
        self.hit_flash_color = 0xffffff;
        self.hit_shake_ms = 0.0;
        self.hit_shake_intensity = 0.0;
        self.hit_stop_ms = 0.0;
    }

    /// Enable in front of an attacker standing at `feet`
    fn arm(&mut self, profile: &AttackProfile, feet: Vec2, facing: f32) {
        self.apply_profile(profile);
        let center = Vec2::new(
            feet.x + facing * (ATTACK_FORWARD_OFFSET + profile.width * ATTACK_WIDTH_OFFSET_SCALE),
            feet.y - ATTACK_HITBOX_Y_OFFSET,
        );
        self.body.size = Vec2::new(profile.width, ATTACK_HITBOX_HEIGHT);
        // Body is bottom-centre anchored
        self.body.pos = center + Vec2::new(0.0, ATTACK_HITBOX_HEIGHT / 2.0);
        self.set_enabled(true);
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.active = enabled;
        self.body.enabled = enabled;
        if !enabled {
            self.body.pos = Vec2::splat(HITBOX_OFFSCREEN);
        }
    }

    pub fn aabb(&self) -> Aabb {
        self.body.aabb()
    }

    /// Live and touching `target`
    pub fn overlaps(&self, target: &Body) -> bool {
        self.active && self.body.overlaps(target)
    }
}

/// Phase of the current swing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackPhase {
    Idle,
    Active,
    Recovery,
}

/// Result of an attack request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    Started,
    /// Buffered as a heavy follow-up to the running light swing
    Queued,
    Rejected,
}

/// Result of a connecting hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    Hit { damage: u32, remaining_hp: u32 },
    Knockout { finisher_bonus: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CombatTimer {
    DisableHitbox { swing: u64 },
    ReleaseLock { swing: u64 },
    EndHitStop { token: u64 },
    ResetEnemyTint { enemy: EnemyId },
    RemoveEnemy { enemy: EnemyId },
}

#[derive(Debug, Clone, Copy)]
struct QueuedHeavy {
    profile: AttackProfile,
    expires_at_ms: f64,
}

/// Event sinks combat reports into
pub struct CombatSinks<'a> {
    pub score: &'a mut dyn ScoreEvents,
    pub stress: &'a mut dyn StressEvents,
    pub events: &'a mut Vec<GameEvent>,
}

/// Everything combat reads or mutates for one call
pub struct CombatWorld<'a> {
    pub now_ms: f64,
    pub player: &'a mut Player,
    pub enemies: &'a mut Vec<Enemy>,
    pub sinks: CombatSinks<'a>,
}

#[derive(Debug, Clone)]
pub struct CombatSystem {
    hitbox: AttackHitbox,
    attack_lock_ms: f64,
    current_attack: Option<AttackKind>,
    queued_heavy: Option<QueuedHeavy>,
    /// Bumped per swing and on disable; stale swing timers compare against it
    swing: u64,
    hit_stop_token: u64,
    world_paused: bool,
    timers: Schedule<CombatTimer>,
    rng: Pcg32,
}

impl CombatSystem {
    pub fn new(seed: u64) -> Self {
        Self {
            hitbox: AttackHitbox::new(),
            attack_lock_ms: 0.0,
            current_attack: None,
            queued_heavy: None,
            swing: 0,
            hit_stop_token: 0,
            world_paused: false,
            timers: Schedule::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn hitbox(&self) -> &AttackHitbox {
        &self.hitbox
    }

    /// Physics must not step while a hit-stop is running
    pub fn is_world_paused(&self) -> bool {
        self.world_paused
    }

    pub fn attack_lock_ms(&self) -> f64 {
        self.attack_lock_ms
    }

    pub fn current_attack(&self) -> Option<AttackKind> {
        self.current_attack
    }

    /// Expiry of the buffered heavy, if any
    pub fn queued_heavy_expiry(&self) -> Option<f64> {
        self.queued_heavy.map(|q| q.expires_at_ms)
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn attack_phase(&self, now_ms: f64) -> AttackPhase {
        if self.hitbox.active {
            AttackPhase::Active
        } else if now_ms < self.attack_lock_ms {
            AttackPhase::Recovery
        } else {
            AttackPhase::Idle
        }
    }

    /// Request an attack
    pub fn attack(
        &mut self,
        kind: AttackKind,
        profile: &AttackProfile,
        world: &mut CombatWorld,
    ) -> AttackOutcome {
        if world.now_ms < self.attack_lock_ms {
            return self.try_queue_heavy(kind, profile, world);
        }
        self.launch(kind, profile, world);
        AttackOutcome::Started
    }

    fn try_queue_heavy(
        &mut self,
        kind: AttackKind,
        profile: &AttackProfile,
        world: &CombatWorld,
    ) -> AttackOutcome {
        if kind != AttackKind::Heavy || self.current_attack != Some(AttackKind::Light) {
            return AttackOutcome::Rejected;
        }
        // First buffered heavy wins; later presses neither replace nor extend it
        if self.queued_heavy.is_some() {
            return AttackOutcome::Rejected;
        }
        if self.attack_lock_ms - world.now_ms > HEAVY_CHAIN_WINDOW_MS {
            return AttackOutcome::Rejected;
        }
        if !chain_target_in_reach(&*world.player, &*world.enemies) {
            log::debug!("heavy chain refused: no target in reach");
            return AttackOutcome::Rejected;
        }

        let expires_at_ms = self.attack_lock_ms + HEAVY_CHAIN_WINDOW_MS;
        self.queued_heavy = Some(QueuedHeavy {
            profile: *profile,
            expires_at_ms,
        });
        log::debug!("heavy chain queued (expires at {expires_at_ms:.0}ms)");
        AttackOutcome::Queued
    }

    fn launch(&mut self, kind: AttackKind, profile: &AttackProfile, world: &mut CombatWorld) {
        let now = world.now_ms;
        self.swing += 1;
        self.current_attack = Some(kind);
        self.queued_heavy = None;
        self.attack_lock_ms = now + profile.active_ms + profile.recovery_ms;

        let facing = world.player.actor.facing.sign();
        self.hitbox.arm(profile, world.player.actor.body.pos, facing);
        world
            .player
            .actor
            .body
            .set_velocity_x(facing * ATTACK_LUNGE_VELOCITY);

        self.timers.schedule(
            now + profile.active_ms,
            CombatTimer::DisableHitbox { swing: self.swing },
        );
        self.timers.schedule(
            self.attack_lock_ms,
            CombatTimer::ReleaseLock { swing: self.swing },
        );

        world.sinks.events.push(GameEvent::AttackStarted { kind });
        log::debug!("{kind:?} attack #{} until {:.0}ms", self.swing, self.attack_lock_ms);
    }

    /// Fire every timer due at `world.now_ms`
    pub fn advance(&mut self, world: &mut CombatWorld) {
        while let Some(timer) = self.timers.pop_due(world.now_ms) {
            match timer {
                CombatTimer::DisableHitbox { swing } => {
                    if swing == self.swing {
                        self.hitbox.set_enabled(false);
                    }
                }
                CombatTimer::ReleaseLock { swing } => {
                    if swing == self.swing {
                        self.release_lock(world);
                    }
                }
                CombatTimer::EndHitStop { token } => {
                    if token == self.hit_stop_token {
                        self.world_paused = false;
                    }
                }
                CombatTimer::ResetEnemyTint { enemy } => {
                    if let Some(e) = world
                        .enemies
                        .iter_mut()
                        .find(|e| e.id == enemy && !e.is_knocked_out())
                    {
                        e.actor.reset_color();
                    }
                }
                CombatTimer::RemoveEnemy { enemy } => {
                    world.enemies.retain(|e| e.id != enemy);
                }
            }
        }
    }

    fn release_lock(&mut self, world: &mut CombatWorld) {
        self.current_attack = None;
        match self.queued_heavy.take() {
            Some(queued) if world.now_ms <= queued.expires_at_ms => {
                self.launch(AttackKind::Heavy, &queued.profile, world);
            }
            Some(_) => log::debug!("queued heavy expired"),
            None => {}
        }
    }

    /// Resolve the hitbox touching `world.enemies[index]`
    pub fn on_hit_enemy(&mut self, index: usize, world: &mut CombatWorld) -> Option<HitOutcome> {
        if !self.hitbox.active {
            return None;
        }
        let now = world.now_ms;
        let facing = world.player.actor.facing.sign();
        let enemy = world.enemies.get_mut(index)?;
        if !enemy.is_live() || enemy.actor.is_stunned(now) {
            return None;
        }

        let damage = self.hitbox.power.min(enemy.hp);
        enemy.hp -= damage;
        world.sinks.score.on_enemy_hit(enemy.hit_score_base());
        world.sinks.events.push(GameEvent::EnemyHit {
            id: enemy.id,
            kind: enemy.kind,
            damage,
            remaining_hp: enemy.hp,
        });
        let hit_stop_ms = self.hitbox.hit_stop_ms;
        self.apply_hit_stop(now, hit_stop_ms, world.sinks.events);

        if enemy.hp == 0 {
            let finisher_bonus = self.knock_out(enemy, now, facing, &mut world.sinks);
            return Some(HitOutcome::Knockout { finisher_bonus });
        }

        enemy.actor.stunned_until_ms = now + self.hitbox.stun_ms;
        enemy
            .actor
            .body
            .set_velocity(Vec2::new(facing * self.hitbox.push, ENEMY_AIR_KNOCKBACK_Y));
        enemy.actor.flash(self.hitbox.hit_flash_color);
        self.timers.schedule(
            now + ENEMY_HIT_TINT_RESET_MS,
            CombatTimer::ResetEnemyTint { enemy: enemy.id },
        );
        world.sinks.events.push(GameEvent::CameraShake {
            duration_ms: self.hitbox.hit_shake_ms,
            intensity: self.hitbox.hit_shake_intensity,
        });

        Some(HitOutcome::Hit {
            damage,
            remaining_hp: enemy.hp,
        })
    }

    fn knock_out(&mut self, enemy: &mut Enemy, now: f64, facing: f32, sinks: &mut CombatSinks) -> u64 {
        let profile = enemy.kind.ko_profile();

        enemy.hp = 0;
        enemy.actor.stunned_until_ms = now + ENEMY_DEATH_STUN_MS;
        enemy.actor.body.enabled = false;
        enemy.actor.body.set_velocity(Vec2::new(
            facing * (self.hitbox.push + profile.push_bonus),
            profile.launch_y,
        ));
        enemy.actor.flash(ENEMY_KO_COLOR);
        let spin = self
            .rng
            .random_range(ENEMY_KO_ROTATION_MIN..=ENEMY_KO_ROTATION_MAX);
        enemy.knockout = Some(Knockout {
            started_ms: now,
            fade_ms: ENEMY_KO_FADE_MS,
            spin_deg: facing * spin,
        });
        self.timers
            .schedule(now + ENEMY_KO_FADE_MS, CombatTimer::RemoveEnemy { enemy: enemy.id });

        let finisher = sinks
            .score
            .on_enemy_ko(enemy.ko_bonus(), self.current_attack);
        sinks.stress.on_enemy_ko(enemy.kind);

        sinks.events.push(GameEvent::EnemyKnockedOut {
            id: enemy.id,
            kind: enemy.kind,
        });
        if finisher > 0 {
            sinks.events.push(GameEvent::FinisherBonus { amount: finisher });
        }
        sinks.events.push(GameEvent::CameraShake {
            duration_ms: ENEMY_KO_SHAKE_MS,
            intensity: ENEMY_KO_SHAKE_INTENSITY,
        });
        log::debug!("{} #{} knocked out", enemy.kind.as_str(), enemy.id.0);
        finisher
    }

    fn apply_hit_stop(&mut self, now: f64, duration_ms: f64, events: &mut Vec<GameEvent>) {
        if duration_ms <= 0.0 {
            return;
        }
        self.hit_stop_token += 1;
        self.world_paused = true;
        self.timers.schedule(
            now + duration_ms,
            CombatTimer::EndHitStop {
                token: self.hit_stop_token,
            },
        );
        events.push(GameEvent::HitStop { duration_ms });
        log::debug!("hit-stop #{} for {duration_ms:.0}ms", self.hit_stop_token);
    }

    /// Park the hitbox, drop the lock and queue, and resume the world
    ///
    /// Safe to call any number of times. Timers already queued stay queued
    /// but no longer match any live swing or hit-stop token.
    pub fn disable(&mut self) {
        self.hitbox.set_enabled(false);
        self.hitbox.reset_profile();
        self.attack_lock_ms = 0.0;
        self.queued_heavy = None;
        self.current_attack = None;
        self.swing += 1;
        self.hit_stop_token += 1;
        self.world_paused = false;
    }

    /// `disable()` plus dropping every pending timer (fresh run)
    pub fn reset(&mut self) {
        self.disable();
        self.timers.clear();
    }
}

/// A live enemy stands in front of the player within chain reach
pub fn chain_target_in_reach(player: &Player, enemies: &[Enemy]) -> bool {
    let facing = player.actor.facing.sign();
    enemies.iter().filter(|e| e.is_live()).any(|e| {
        let forward = facing * (e.actor.x() - player.actor.x());
        let vertical = (e.actor.y() - player.actor.y()).abs();
        (0.0..=HEAVY_CHAIN_FORWARD_DISTANCE).contains(&forward)
            && vertical <= HEAVY_CHAIN_VERTICAL_DISTANCE
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::actor::Facing;
    use crate::sim::enemy::EnemyKind;
    use crate::sim::score::{ScoreReadModel, ScoreSystem};
    use crate::sim::stress::StressSystem;
    use crate::tuning::{HEAVY_ATTACK, LIGHT_ATTACK, PlayerTuning};

    struct Harness {
        combat: CombatSystem,
        player: Player,
        enemies: Vec<Enemy>,
        score: ScoreSystem,
        stress: StressSystem,
        events: Vec<GameEvent>,
    }

    impl Harness {
        /// Player at x=100 facing right, one enemy per given (kind, x)
        fn new(enemies: &[(EnemyKind, f32)]) -> Self {
            let mut player = Player::new(100.0, &PlayerTuning::default());
            player.actor.facing = Facing::Right;
            Self {
                combat: CombatSystem::new(7),
                player,
                enemies: enemies
                    .iter()
                    .enumerate()
                    .map(|(i, &(kind, x))| Enemy::new(EnemyId(i as u32 + 1), kind, x))
                    .collect(),
                score: ScoreSystem::new(0),
                stress: StressSystem::default(),
                events: Vec::new(),
            }
        }

        fn attack(&mut self, now_ms: f64, kind: AttackKind, profile: &AttackProfile) -> AttackOutcome {
            let mut world = CombatWorld {
                now_ms,
                player: &mut self.player,
                enemies: &mut self.enemies,
                sinks: CombatSinks {
                    score: &mut self.score,
                    stress: &mut self.stress,
                    events: &mut self.events,
                },
            };
            self.combat.attack(kind, profile, &mut world)
        }

        fn hit(&mut self, now_ms: f64, index: usize) -> Option<HitOutcome> {
            let mut world = CombatWorld {
                now_ms,
                player: &mut self.player,
                enemies: &mut self.enemies,
                sinks: CombatSinks {
                    score: &mut self.score,
                    stress: &mut self.stress,
                    events: &mut self.events,
                },
            };
            self.combat.on_hit_enemy(index, &mut world)
        }

        fn advance(&mut self, now_ms: f64) {
            let mut world = CombatWorld {
                now_ms,
                player: &mut self.player,
                enemies: &mut self.enemies,
                sinks: CombatSinks {
                    score: &mut self.score,
                    stress: &mut self.stress,
                    events: &mut self.events,
                },
            };
            self.combat.advance(&mut world);
        }
    }

    #[test]
    fn test_attack_arms_hitbox_in_front() {
        let mut h = Harness::new(&[(EnemyKind::Normal, 150.0)]);
        assert_eq!(h.attack(0.0, AttackKind::Light, &LIGHT_ATTACK), AttackOutcome::Started);

        let hitbox = h.combat.hitbox();
        assert!(hitbox.active);
        assert_eq!(hitbox.power, LIGHT_ATTACK.power);
        let expected_x = 100.0 + ATTACK_FORWARD_OFFSET + LIGHT_ATTACK.width * ATTACK_WIDTH_OFFSET_SCALE;
        assert!((hitbox.body.pos.x - expected_x).abs() < 1e-4);
        assert_eq!(hitbox.body.size.x, LIGHT_ATTACK.width);
        assert!(hitbox.overlaps(&h.enemies[0].actor.body));

        assert_eq!(h.player.actor.body.vel.x, ATTACK_LUNGE_VELOCITY);
        assert_eq!(h.combat.attack_lock_ms(), 108.0);
        assert_eq!(h.combat.attack_phase(0.0), AttackPhase::Active);
    }

    #[test]
    fn test_attack_lifecycle_phases() {
        let mut h = Harness::new(&[]);
        h.attack(0.0, AttackKind::Light, &LIGHT_ATTACK);

        h.advance(79.0);
        assert_eq!(h.combat.attack_phase(79.0), AttackPhase::Active);
        h.advance(80.0);
        assert!(!h.combat.hitbox().active);
        assert_eq!(h.combat.hitbox().body.pos, Vec2::splat(HITBOX_OFFSCREEN));
        assert_eq!(h.combat.attack_phase(80.0), AttackPhase::Recovery);

        assert_eq!(h.attack(100.0, AttackKind::Light, &LIGHT_ATTACK), AttackOutcome::Rejected);

        h.advance(108.0);
        assert_eq!(h.combat.attack_phase(108.0), AttackPhase::Idle);
        assert_eq!(h.combat.current_attack(), None);
        assert_eq!(h.attack(108.0, AttackKind::Light, &LIGHT_ATTACK), AttackOutcome::Started);
    }

    #[test]
    fn test_hit_applies_stun_knockback_and_score() {
        let mut h = Harness::new(&[(EnemyKind::Normal, 150.0)]);
        h.attack(0.0, AttackKind::Light, &LIGHT_ATTACK);
        let outcome = h.hit(10.0, 0);

        assert_eq!(
            outcome,
            Some(HitOutcome::Hit {
                damage: 7,
                remaining_hp: 11
            })
        );
        let enemy = &h.enemies[0];
        assert_eq!(enemy.actor.stunned_until_ms, 10.0 + LIGHT_ATTACK.stun_ms);
        assert_eq!(
            enemy.actor.body.vel,
            Vec2::new(LIGHT_ATTACK.push, ENEMY_AIR_KNOCKBACK_Y)
        );
        assert_eq!(enemy.actor.tint, Some(LIGHT_ATTACK.hit_flash_color));
        assert_eq!(h.score.score(), 10 + 2);
        assert!(h.combat.is_world_paused());
        assert!(h.events.iter().any(|e| matches!(e, GameEvent::CameraShake { duration_ms, .. } if *duration_ms == LIGHT_ATTACK.hit_shake_ms)));

        // Tint clears 80ms later
        h.advance(10.0 + ENEMY_HIT_TINT_RESET_MS);
        assert_eq!(h.enemies[0].actor.tint, None);
    }

    #[test]
    fn test_stun_suppresses_rehit() {
        let mut h = Harness::new(&[(EnemyKind::Normal, 150.0)]);
        h.attack(0.0, AttackKind::Light, &LIGHT_ATTACK);
        assert!(h.hit(0.0, 0).is_some());
        let hp = h.enemies[0].hp;
        let score = h.score.score();

        // Same swing, still inside the 130ms stun
        assert_eq!(h.hit(5.0, 0), None);
        assert_eq!(h.hit(60.0, 0), None);
        assert_eq!(h.enemies[0].hp, hp);
        assert_eq!(h.score.score(), score);
    }

    #[test]
    fn test_inactive_hitbox_never_connects() {
        let mut h = Harness::new(&[(EnemyKind::Normal, 150.0)]);
        assert_eq!(h.hit(0.0, 0), None);
        assert_eq!(h.enemies[0].hp, 18);
    }

    #[test]
    fn test_three_light_hits_knock_out_normal() {
        let mut h = Harness::new(&[(EnemyKind::Normal, 150.0)]);
        let mut hp_seq = vec![h.enemies[0].hp];
        let mut score_steps = Vec::new();

        for swing in 0..3 {
            let t = swing as f64 * 200.0;
            h.advance(t);
            assert_eq!(h.attack(t, AttackKind::Light, &LIGHT_ATTACK), AttackOutcome::Started);
            let before = h.score.score();
            h.hit(t, 0);
            score_steps.push(h.score.score() - before);
            hp_seq.push(h.enemies[0].hp);
        }

        assert_eq!(hp_seq, vec![18, 11, 4, 0]);
        // hit base 10 + combo bonus (combo × 2)
        assert_eq!(score_steps[0], 12);
        assert_eq!(score_steps[1], 14);
        // third hit also pays the KO bonus 110 + min(120, 3 × 4)
        assert_eq!(score_steps[2], 16 + 110 + 12);
        assert!(h.enemies[0].is_knocked_out());
    }

    #[test]
    fn test_kill_is_atomic() {
        let mut h = Harness::new(&[(EnemyKind::Rush, 150.0)]);
        h.enemies[0].hp = 5;
        h.stress.set_stress(50.0);

        h.attack(1000.0, AttackKind::Light, &LIGHT_ATTACK);
        let outcome = h.hit(1000.0, 0);
        assert_eq!(outcome, Some(HitOutcome::Knockout { finisher_bonus: 0 }));

        let enemy = &h.enemies[0];
        assert_eq!(enemy.hp, 0);
        assert_eq!(enemy.actor.stunned_until_ms, 1000.0 + ENEMY_DEATH_STUN_MS);
        assert!(!enemy.actor.body.enabled);
        assert_eq!(enemy.actor.tint, Some(ENEMY_KO_COLOR));
        let ko = enemy.knockout.expect("knocked out");
        assert!((ENEMY_KO_ROTATION_MIN..=ENEMY_KO_ROTATION_MAX).contains(&ko.spin_deg));
        assert_eq!(
            enemy.actor.body.vel,
            Vec2::new(LIGHT_ATTACK.push + 280.0, -380.0)
        );

        // Relief for a rush kill
        assert_eq!(h.stress.stress(), 43.0);
        // Only the KO shake, never the hit shake
        let shakes: Vec<_> = h
            .events
            .iter()
            .filter_map(|e| match e {
                GameEvent::CameraShake { duration_ms, .. } => Some(*duration_ms),
                _ => None,
            })
            .collect();
        assert_eq!(shakes, vec![ENEMY_KO_SHAKE_MS]);

        // The 80ms tint reset is never scheduled; the KO tint survives
        h.advance(1100.0);
        assert_eq!(h.enemies[0].actor.tint, Some(ENEMY_KO_COLOR));
    }

    #[test]
    fn test_knocked_out_enemy_ignored_and_removed() {
        let mut h = Harness::new(&[(EnemyKind::Normal, 150.0)]);
        h.enemies[0].hp = 1;
        h.attack(0.0, AttackKind::Light, &LIGHT_ATTACK);
        h.hit(0.0, 0);
        let score = h.score.score();

        h.advance(108.0);
        h.attack(200.0, AttackKind::Light, &LIGHT_ATTACK);
        assert_eq!(h.hit(200.0, 0), None);
        assert_eq!(h.score.score(), score);

        h.advance(ENEMY_KO_FADE_MS);
        assert!(h.enemies.is_empty());
    }

    #[test]
    fn test_heavy_chains_from_light_with_target() {
        let mut h = Harness::new(&[(EnemyKind::Heavy, 200.0)]);
        h.attack(0.0, AttackKind::Light, &LIGHT_ATTACK);
        assert_eq!(h.attack(50.0, AttackKind::Heavy, &HEAVY_ATTACK), AttackOutcome::Queued);
        assert_eq!(h.combat.queued_heavy_expiry(), Some(108.0 + HEAVY_CHAIN_WINDOW_MS));

        h.advance(80.0);
        h.advance(108.0);
        assert_eq!(h.combat.current_attack(), Some(AttackKind::Heavy));
        assert!(h.combat.hitbox().active);
        assert_eq!(h.combat.hitbox().power, HEAVY_ATTACK.power);
        assert_eq!(
            h.combat.attack_lock_ms(),
            108.0 + HEAVY_ATTACK.active_ms + HEAVY_ATTACK.recovery_ms
        );
        assert_eq!(h.combat.queued_heavy_expiry(), None);
    }

    #[test]
    fn test_heavy_chain_needs_target_in_front() {
        // Nobody around
        let mut h = Harness::new(&[]);
        h.attack(0.0, AttackKind::Light, &LIGHT_ATTACK);
        assert_eq!(h.attack(50.0, AttackKind::Heavy, &HEAVY_ATTACK), AttackOutcome::Rejected);
        h.advance(108.0);
        assert_eq!(h.combat.attack_phase(108.0), AttackPhase::Idle);

        // Enemy behind the player
        let mut h = Harness::new(&[(EnemyKind::Normal, 40.0)]);
        h.attack(0.0, AttackKind::Light, &LIGHT_ATTACK);
        assert_eq!(h.attack(50.0, AttackKind::Heavy, &HEAVY_ATTACK), AttackOutcome::Rejected);

        // Enemy too far ahead
        let mut h = Harness::new(&[(EnemyKind::Normal, 100.0 + HEAVY_CHAIN_FORWARD_DISTANCE + 1.0)]);
        h.attack(0.0, AttackKind::Light, &LIGHT_ATTACK);
        assert_eq!(h.attack(50.0, AttackKind::Heavy, &HEAVY_ATTACK), AttackOutcome::Rejected);
    }

    #[test]
    fn test_heavy_chain_outside_window_rejected() {
        let slow_light = AttackProfile {
            active_ms: 300.0,
            recovery_ms: 100.0,
            ..LIGHT_ATTACK
        };
        let mut h = Harness::new(&[(EnemyKind::Normal, 180.0)]);
        h.attack(0.0, AttackKind::Light, &slow_light);

        // 300ms left on the lock
        assert_eq!(h.attack(100.0, AttackKind::Heavy, &HEAVY_ATTACK), AttackOutcome::Rejected);
        // 150ms left
        assert_eq!(h.attack(250.0, AttackKind::Heavy, &HEAVY_ATTACK), AttackOutcome::Queued);
    }

    #[test]
    fn test_first_queued_heavy_wins() {
        let mut h = Harness::new(&[(EnemyKind::Normal, 180.0)]);
        h.attack(0.0, AttackKind::Light, &LIGHT_ATTACK);
        assert_eq!(h.attack(20.0, AttackKind::Heavy, &HEAVY_ATTACK), AttackOutcome::Queued);
        let expiry = h.combat.queued_heavy_expiry();

        assert_eq!(h.attack(90.0, AttackKind::Heavy, &HEAVY_ATTACK), AttackOutcome::Rejected);
        assert_eq!(h.combat.queued_heavy_expiry(), expiry);
    }

    #[test]
    fn test_heavy_cannot_queue_behind_heavy() {
        let mut h = Harness::new(&[(EnemyKind::Normal, 180.0)]);
        h.attack(0.0, AttackKind::Heavy, &HEAVY_ATTACK);
        assert_eq!(h.attack(400.0, AttackKind::Heavy, &HEAVY_ATTACK), AttackOutcome::Rejected);
    }

    #[test]
    fn test_expired_queue_is_discarded() {
        let mut h = Harness::new(&[(EnemyKind::Normal, 180.0)]);
        h.attack(0.0, AttackKind::Light, &LIGHT_ATTACK);
        h.attack(50.0, AttackKind::Heavy, &HEAVY_ATTACK);

        // Release observed after the 288ms expiry
        h.advance(300.0);
        assert_eq!(h.combat.current_attack(), None);
        assert!(!h.combat.hitbox().active);
        assert_eq!(h.combat.queued_heavy_expiry(), None);
    }

    #[test]
    fn test_newer_hit_stop_supersedes_older() {
        let mut h = Harness::new(&[(EnemyKind::Normal, 150.0), (EnemyKind::Normal, 160.0)]);
        h.attack(0.0, AttackKind::Light, &LIGHT_ATTACK);
        h.hit(0.0, 0);
        h.hit(5.0, 1);
        assert!(h.combat.is_world_paused());

        // First token's resume is stale
        h.advance(12.0);
        assert!(h.combat.is_world_paused());
        h.advance(17.0);
        assert!(!h.combat.is_world_paused());
    }

    #[test]
    fn test_disable_resumes_and_invalidates() {
        let mut h = Harness::new(&[(EnemyKind::Normal, 180.0)]);
        h.attack(0.0, AttackKind::Light, &LIGHT_ATTACK);
        h.attack(20.0, AttackKind::Heavy, &HEAVY_ATTACK);
        h.hit(30.0, 0);
        assert!(h.combat.is_world_paused());

        h.combat.disable();
        h.combat.disable();
        assert!(!h.combat.is_world_paused());
        assert!(!h.combat.hitbox().active);
        assert_eq!(h.combat.hitbox().power, 0);
        assert_eq!(h.combat.hitbox().stun_ms, ENEMY_DEFAULT_HIT_STUN_MS);
        assert_eq!(h.combat.attack_lock_ms(), 0.0);
        assert_eq!(h.combat.queued_heavy_expiry(), None);
        assert_eq!(h.combat.attack_phase(31.0), AttackPhase::Idle);

        // A fresh swing is not cut short by the old swing's timers
        h.attack(40.0, AttackKind::Light, &LIGHT_ATTACK);
        h.advance(80.0);
        assert!(h.combat.hitbox().active);
        h.advance(108.0);
        assert!(h.combat.hitbox().active);
        assert_eq!(h.combat.current_attack(), Some(AttackKind::Light));
        h.advance(120.0);
        assert!(!h.combat.hitbox().active);
    }

    #[test]
    fn test_reset_drops_pending_timers() {
        let mut h = Harness::new(&[(EnemyKind::Normal, 150.0)]);
        h.attack(0.0, AttackKind::Light, &LIGHT_ATTACK);
        h.hit(0.0, 0);
        assert!(h.combat.pending_timers() > 0);
        h.combat.reset();
        assert_eq!(h.combat.pending_timers(), 0);
    }

    #[test]
    fn test_heavy_finisher_reports_bonus() {
        let mut h = Harness::new(&[(EnemyKind::Heavy, 150.0)]);
        // Build a combo on the score side first
        for _ in 0..4 {
            h.score.on_enemy_hit(0);
        }
        h.enemies[0].hp = HEAVY_ATTACK.power;
        h.attack(0.0, AttackKind::Heavy, &HEAVY_ATTACK);
        let outcome = h.hit(0.0, 0);
        // Combo is 5 once this hit lands
        assert_eq!(outcome, Some(HitOutcome::Knockout { finisher_bonus: 75 }));
        assert!(h.events.contains(&GameEvent::FinisherBonus { amount: 75 }));
    }

    #[test]
    fn test_hp_never_underflows() {
        let mut h = Harness::new(&[(EnemyKind::Rush, 150.0)]);
        h.enemies[0].hp = 3;
        h.attack(0.0, AttackKind::Heavy, &HEAVY_ATTACK);
        assert!(matches!(h.hit(0.0, 0), Some(HitOutcome::Knockout { .. })));
        assert_eq!(h.enemies[0].hp, 0);
        assert_eq!(h.enemies[0].actor.y(), GROUND_Y);
    }
}
