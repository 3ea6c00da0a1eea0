//! Thread-safe settings caching with arc-swap for lock-free reads.

use crate::schema::{FeatureSettings, Settings};
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Thread-safe settings cache using arc-swap for lock-free reads.
///
/// Report engines read feature switches from here once, at construction, so
/// an update only affects engines built afterwards.
pub struct SettingsCache {
    settings: ArcSwap<Settings>,
}

impl SettingsCache {
    /// Creates a new settings cache with the given initial settings.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: ArcSwap::from_pointee(settings),
        }
    }

    /// Gets the current settings.
    pub fn get(&self) -> Arc<Settings> {
        self.settings.load_full()
    }

    /// Gets the current feature switches.
    pub fn features(&self) -> FeatureSettings {
        self.settings.load().features.clone()
    }

    /// Updates the settings atomically.
    pub fn update(&self, settings: Settings) {
        self.settings.store(Arc::new(settings));
    }
}

impl Default for SettingsCache {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
