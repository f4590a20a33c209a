//! Combo and score tracking
//!
//! The combo is a decaying window: every hit refreshes the window, and once it
//! runs out the combo drops to zero. Hi-score bookkeeping is explicit; the
//! caller decides when (and whether) to persist.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::tuning::AttackKind;

/// Score-side events raised by combat
pub trait ScoreEvents {
    fn on_enemy_hit(&mut self, base_score: u64);

    /// Award a knockout. Returns the finisher bonus (0 when none applied).
    fn on_enemy_ko(&mut self, bonus: u64, attack_kind: Option<AttackKind>) -> u64;
}

/// What the HUD reads each frame
pub trait ScoreReadModel {
    fn combo(&self) -> u32;
    fn score(&self) -> u64;
    fn hi_score(&self) -> u64;
    /// Raise the hi-score to the current score if beaten
    fn sync_hi_score(&mut self) -> bool;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreSystem {
    combo: u32,
    combo_timer_ms: f64,
    score: u64,
    hi_score: u64,
}

impl ScoreSystem {
    pub fn new(initial_hi_score: u64) -> Self {
        Self {
            combo: 0,
            combo_timer_ms: 0.0,
            score: 0,
            hi_score: initial_hi_score,
        }
    }

    pub fn tick(&mut self, delta_ms: f64) {
        if self.combo_timer_ms > 0.0 {
            self.combo_timer_ms -= delta_ms;
        }
        if self.combo_timer_ms <= 0.0 {
            self.combo_timer_ms = 0.0;
            self.combo = 0;
        }
    }

    /// Combo window remaining (ms)
    pub fn combo_timer_ms(&self) -> f64 {
        self.combo_timer_ms
    }

    /// Fresh run: score and combo cleared, hi-score kept
    pub fn reset_run(&mut self) {
        *self = Self::new(self.hi_score);
    }

    fn combo_bonus(&self, scale: u64, cap: u64) -> u64 {
        (self.combo as u64 * scale).min(cap)
    }
}

impl ScoreEvents for ScoreSystem {
    fn on_enemy_hit(&mut self, base_score: u64) {
        self.combo += 1;
        self.combo_timer_ms = COMBO_WINDOW_MS;
        self.score += base_score + self.combo_bonus(HIT_COMBO_SCALE, HIT_COMBO_CAP);
    }

    fn on_enemy_ko(&mut self, bonus: u64, attack_kind: Option<AttackKind>) -> u64 {
        self.score += bonus + self.combo_bonus(KO_COMBO_SCALE, KO_COMBO_CAP);

        let finisher = if attack_kind == Some(AttackKind::Heavy) && self.combo >= FINISHER_MIN_COMBO {
            self.combo as u64 * FINISHER_COMBO_SCALE
        } else {
            0
        };
        self.score += finisher;
        finisher
    }
}

impl ScoreReadModel for ScoreSystem {
    fn combo(&self) -> u32 {
        self.combo
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn hi_score(&self) -> u64 {
        self.hi_score
    }

    fn sync_hi_score(&mut self) -> bool {
        if self.score <= self.hi_score {
            return false;
        }
        self.hi_score = self.score;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hit_builds_combo() {
        let mut s = ScoreSystem::new(0);
        s.on_enemy_hit(10);
        assert_eq!(s.combo(), 1);
        assert_eq!(s.score(), 10 + 2);
        s.on_enemy_hit(10);
        assert_eq!(s.combo(), 2);
        assert_eq!(s.score(), 12 + 10 + 4);
    }

    #[test]
    fn test_hit_combo_bonus_capped() {
        let mut s = ScoreSystem::new(0);
        for _ in 0..30 {
            s.on_enemy_hit(0);
        }
        let before = s.score();
        s.on_enemy_hit(0);
        assert_eq!(s.score() - before, HIT_COMBO_CAP);
    }

    #[test]
    fn test_combo_decays_after_window() {
        let mut s = ScoreSystem::new(0);
        s.on_enemy_hit(10);
        s.tick(1000.0);
        assert_eq!(s.combo(), 1);
        s.tick(151.0);
        assert_eq!(s.combo(), 0);

        // Next hit starts a fresh combo
        s.on_enemy_hit(10);
        assert_eq!(s.combo(), 1);
    }

    #[test]
    fn test_heavy_finisher_scenario() {
        let mut s = ScoreSystem::new(0);
        for _ in 0..5 {
            s.on_enemy_hit(0);
        }
        let before = s.score();
        let finisher = s.on_enemy_ko(220, Some(AttackKind::Heavy));
        assert_eq!(finisher, 75);
        assert_eq!(s.score() - before, 220 + 20 + 75);
    }

    #[test]
    fn test_no_finisher_for_light_or_short_combo() {
        let mut s = ScoreSystem::new(0);
        s.on_enemy_hit(0);
        assert_eq!(s.on_enemy_ko(110, Some(AttackKind::Heavy)), 0);
        s.on_enemy_hit(0);
        assert_eq!(s.on_enemy_ko(110, Some(AttackKind::Light)), 0);
        assert_eq!(s.on_enemy_ko(110, None), 0);
    }

    #[test]
    fn test_sync_hi_score() {
        let mut s = ScoreSystem::new(50);
        s.on_enemy_hit(10);
        assert!(!s.sync_hi_score());
        assert_eq!(s.hi_score(), 50);

        s.on_enemy_ko(110, None);
        assert!(s.sync_hi_score());
        assert_eq!(s.hi_score(), s.score());
        assert!(!s.sync_hi_score());
    }

    #[test]
    fn test_reset_run_keeps_hi_score() {
        let mut s = ScoreSystem::new(0);
        s.on_enemy_ko(500, None);
        s.sync_hi_score();
        s.reset_run();
        assert_eq!(s.score(), 0);
        assert_eq!(s.combo(), 0);
        assert_eq!(s.hi_score(), 500);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Hit(u64),
        Ko(u64, bool),
        Tick(f64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u64..100).prop_map(Op::Hit),
            (0u64..1000, any::<bool>()).prop_map(|(b, h)| Op::Ko(b, h)),
            (0.0f64..2000.0).prop_map(Op::Tick),
        ]
    }

    proptest! {
        #[test]
        fn prop_score_never_decreases(ops in prop::collection::vec(op(), 0..200)) {
            let mut s = ScoreSystem::new(0);
            let mut last = 0;
            for op in ops {
                match op {
                    Op::Hit(b) => s.on_enemy_hit(b),
                    Op::Ko(b, heavy) => {
                        s.on_enemy_ko(b, heavy.then_some(AttackKind::Heavy));
                    }
                    Op::Tick(dt) => s.tick(dt),
                }
                prop_assert!(s.score() >= last);
                last = s.score();
            }
        }
    }
}
