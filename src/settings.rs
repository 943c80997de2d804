//! Display preferences
//!
//! Persisted as JSON in LocalStorage on the web.

use serde::{Deserialize, Serialize};

use crate::renderer::Layers;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Upper bound on the device pixel ratio used for the backing store
    pub fn max_device_scale(&self) -> f32 {
        match self {
            QualityPreset::Low => 1.0,
            QualityPreset::Medium => 2.0,
            QualityPreset::High => 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Soft radial halo around each circle
    pub glow: bool,
    /// Small highlight toward the upper left
    pub highlight: bool,
    /// Fixed population seed; random per mount when unset
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            glow: true,
            highlight: true,
            seed: None,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;

        // Low drops the glow pass, the most expensive layer
        if preset == QualityPreset::Low {
            self.glow = false;
        }
    }

    pub fn layers(&self) -> Layers {
        Layers {
            glow: self.glow,
            highlight: self.highlight,
        }
    }

    pub fn max_device_scale(&self) -> f32 {
        self.quality.max_device_scale()
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "halo_field_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_parsing() {
        assert_eq!(QualityPreset::from_str("LOW"), Some(QualityPreset::Low));
        assert_eq!(QualityPreset::from_str("med"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::from_str("ultra"), None);
        assert_eq!(QualityPreset::High.as_str(), "High");
    }

    #[test]
    fn test_low_preset_disables_glow() {
        let settings = Settings::from_preset(QualityPreset::Low);
        assert!(!settings.layers().glow);
        assert!(settings.layers().highlight);
        assert_eq!(settings.max_device_scale(), 1.0);

        let settings = Settings::from_preset(QualityPreset::High);
        assert!(settings.layers().glow);
        assert_eq!(settings.max_device_scale(), 3.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"highlight":false,"seed":7}"#).unwrap();
        assert_eq!(settings.quality, QualityPreset::Medium);
        assert!(settings.glow);
        assert!(!settings.highlight);
        assert_eq!(settings.seed, Some(7));
    }

    #[test]
    fn test_round_trip_json() {
        let settings = Settings::from_preset(QualityPreset::Low);
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }
}
