//! Player preferences
//!
//! Persisted separately from high scores. Only presentation reads these; the
//! simulation never does.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, PersistenceError, load_json, save_json};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Background music volume (0.0 - 1.0)
    pub bgm_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub se_volume: f32,

    // === Visual Effects ===
    /// Camera shake on hits, knockouts and damage
    pub screen_shake: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, no hit flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bgm_volume: 0.25,
            se_volume: 0.45,
            screen_shake: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    const STORAGE_KEY: &'static str = "rush_breaker_settings";

    pub fn set_bgm_volume(&mut self, volume: f32) {
        self.bgm_volume = volume.clamp(0.0, 1.0);
    }

    pub fn set_se_volume(&mut self, volume: f32) {
        self.se_volume = volume.clamp(0.0, 1.0);
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Shake intensity to actually apply for a requested one
    pub fn shake_intensity(&self, requested: f32) -> f32 {
        if self.effective_screen_shake() {
            requested
        } else {
            0.0
        }
    }

    /// Hit flashes are suppressed under reduced motion
    pub fn effective_hit_flash(&self) -> bool {
        !self.reduced_motion
    }

    /// Clamp anything a hand-edited file may have broken
    fn sanitized(mut self) -> Self {
        self.set_bgm_volume(self.bgm_volume);
        self.set_se_volume(self.se_volume);
        self
    }

    pub fn try_load(store: &dyn KeyValueStore) -> Result<Self, PersistenceError> {
        let settings: Option<Self> = load_json(store, Self::STORAGE_KEY)?;
        Ok(settings.unwrap_or_default().sanitized())
    }

    /// Load settings, falling back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match Self::try_load(store) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Using default settings: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), PersistenceError> {
        save_json(store, Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_reduced_motion_overrides_shake() {
        let mut settings = Settings::default();
        assert!(settings.effective_screen_shake());
        assert_eq!(settings.shake_intensity(0.003), 0.003);

        settings.reduced_motion = true;
        assert!(!settings.effective_screen_shake());
        assert!(!settings.effective_hit_flash());
        assert_eq!(settings.shake_intensity(0.003), 0.0);
    }

    #[test]
    fn test_volumes_clamped() {
        let mut settings = Settings::default();
        settings.set_bgm_volume(1.7);
        settings.set_se_volume(-0.2);
        assert_eq!(settings.bgm_volume, 1.0);
        assert_eq!(settings.se_volume, 0.0);
    }

    #[test]
    fn test_persist_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(Settings::load(&store), Settings::default());

        let settings = Settings {
            bgm_volume: 0.5,
            screen_shake: false,
            ..Default::default()
        };
        settings.save(&mut store).unwrap();
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_partial_and_out_of_range_file() {
        let mut store = MemoryStore::new();
        store
            .set(Settings::STORAGE_KEY, r#"{"se_volume": 3.0}"#)
            .unwrap();
        let settings = Settings::load(&store);
        assert_eq!(settings.se_volume, 1.0);
        assert_eq!(settings.bgm_volume, 0.25);
        assert!(settings.screen_shake);
    }
}
