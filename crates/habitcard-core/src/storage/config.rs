//! TOML-based application configuration.
//!
//! Stores the tunables of the card carousel:
//! - Hold-to-complete timing and vibration
//! - Carousel paging geometry and card variant
//! - Tilt/flip gesture response
//! - Card content layout spacing
//!
//! Configuration is stored at `<data dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::carousel::{CardGeometry, CardVariant, PressProfile};
use crate::error::ConfigError;

/// Hold-to-complete configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldConfig {
    #[serde(default = "default_complete_ms")]
    pub complete_ms: u64,
    #[serde(default = "default_500")]
    pub release_ms: u64,
    #[serde(default = "default_500")]
    pub canceled_ms: u64,
    #[serde(default = "default_vibration_period_ms")]
    pub vibration_period_ms: u64,
    #[serde(default = "default_vibration_amplitude")]
    pub vibration_amplitude: f64,
    #[serde(default = "default_vibration_peak_multiplier")]
    pub vibration_peak_multiplier: f64,
    /// Relax the card as soon as the hold commits instead of on release.
    #[serde(default)]
    pub commit_relaxes_immediately: bool,
}

/// Carousel configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarouselConfig {
    #[serde(default = "default_page_width")]
    pub page_width: f64,
    #[serde(default = "default_far_scale")]
    pub far_scale: f64,
    #[serde(default)]
    pub card_spacing: f64,
    #[serde(default)]
    pub variant: CardVariant,
    /// Rebuild the render list whenever the habit collection changes.
    #[serde(default = "default_true")]
    pub reactive_render_list: bool,
}

/// Tilt and flip gesture configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TiltConfig {
    /// Drag distance per radian of rotation.
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f64,
    #[serde(default = "default_perspective")]
    pub perspective: f64,
    #[serde(default = "default_300")]
    pub return_ms: u64,
    #[serde(default = "default_300")]
    pub flip_ms: u64,
    #[serde(default = "default_canvas_padding")]
    pub canvas_padding: f64,
}

/// Card content layout configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_section_spacing")]
    pub section_spacing: f64,
    #[serde(default = "default_card_width")]
    pub card_width: f64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub hold: HoldConfig,
    #[serde(default)]
    pub carousel: CarouselConfig,
    #[serde(default)]
    pub tilt: TiltConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
}

// Default functions
fn default_complete_ms() -> u64 {
    3000
}
fn default_500() -> u64 {
    500
}
fn default_300() -> u64 {
    300
}
fn default_vibration_period_ms() -> u64 {
    50
}
fn default_vibration_amplitude() -> f64 {
    0.5
}
fn default_vibration_peak_multiplier() -> f64 {
    2.6
}
fn default_page_width() -> f64 {
    390.0
}
fn default_far_scale() -> f64 {
    0.3
}
fn default_true() -> bool {
    true
}
fn default_sensitivity() -> f64 {
    1000.0
}
fn default_perspective() -> f64 {
    500.0
}
fn default_canvas_padding() -> f64 {
    48.0
}
fn default_section_spacing() -> f64 {
    24.0
}
fn default_card_width() -> f64 {
    312.0
}

impl Default for HoldConfig {
    fn default() -> Self {
        Self {
            complete_ms: default_complete_ms(),
            release_ms: 500,
            canceled_ms: 500,
            vibration_period_ms: default_vibration_period_ms(),
            vibration_amplitude: default_vibration_amplitude(),
            vibration_peak_multiplier: default_vibration_peak_multiplier(),
            commit_relaxes_immediately: false,
        }
    }
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            page_width: default_page_width(),
            far_scale: default_far_scale(),
            card_spacing: 0.0,
            variant: CardVariant::default(),
            reactive_render_list: true,
        }
    }
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            sensitivity: default_sensitivity(),
            perspective: default_perspective(),
            return_ms: 300,
            flip_ms: 300,
            canvas_padding: default_canvas_padding(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            section_spacing: default_section_spacing(),
            card_width: default_card_width(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(unknown());
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the data directory, writing defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Typed value at a dot-separated key. A section name yields the whole
    /// section as an object.
    pub fn value(&self, key: &str) -> Result<serde_json::Value, ConfigError> {
        let json =
            serde_json::to_value(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::get_json_value_by_path(&json, key)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        match self.value(key).ok()? {
            serde_json::Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key without saving.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Set a value by key and save. Returns error if key is unknown.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.set_value(key, value)?;
        self.save()
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default config");
            Self::default()
        })
    }

    /// Hold feedback for the configured variant.
    pub fn press_profile(&self) -> PressProfile {
        let variant = self.carousel.variant;
        PressProfile {
            complete_ms: self.hold.complete_ms,
            release_ms: self.hold.release_ms,
            canceled_ms: self.hold.canceled_ms,
            vibration_period_ms: self.hold.vibration_period_ms,
            vibration_amplitude: self.hold.vibration_amplitude as f32,
            vibration_peak_multiplier: self.hold.vibration_peak_multiplier as f32,
            rest_scale: variant.rest_scale(),
            peak_scale: variant.peak_scale(),
            backdrop_target: variant.backdrop_target(),
        }
    }

    pub fn geometry(&self) -> CardGeometry {
        CardGeometry::new(
            self.layout.card_width as f32,
            self.tilt.perspective as f32,
            self.tilt.canvas_padding as f32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[hold]\ncomplete_ms = 1200\n").unwrap();
        assert_eq!(parsed.hold.complete_ms, 1200);
        assert_eq!(parsed.hold.release_ms, 500);
        assert_eq!(parsed.carousel.far_scale, 0.3);
        assert_eq!(parsed.carousel.variant, CardVariant::Flip);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("hold.complete_ms").as_deref(), Some("3000"));
        assert_eq!(cfg.get("carousel.variant").as_deref(), Some("flip"));
        assert_eq!(
            cfg.get("carousel.reactive_render_list").as_deref(),
            Some("true")
        );
        assert!(cfg.get("carousel.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn value_keeps_json_types() {
        let cfg = Config::default();
        assert_eq!(cfg.value("hold.complete_ms").unwrap(), serde_json::json!(3000));
        assert_eq!(cfg.value("carousel.variant").unwrap(), serde_json::json!("flip"));
        assert!(cfg.value("hold").unwrap().is_object());
        assert!(matches!(
            cfg.value("hold.nope"),
            Err(ConfigError::UnknownKey(key)) if key == "hold.nope"
        ));
    }

    #[test]
    fn set_value_updates_typed_fields() {
        let mut cfg = Config::default();
        cfg.set_value("hold.complete_ms", "1500").unwrap();
        cfg.set_value("carousel.far_scale", "0.5").unwrap();
        cfg.set_value("carousel.variant", "classic").unwrap();
        cfg.set_value("hold.commit_relaxes_immediately", "true").unwrap();

        assert_eq!(cfg.hold.complete_ms, 1500);
        assert_eq!(cfg.carousel.far_scale, 0.5);
        assert_eq!(cfg.carousel.variant, CardVariant::Classic);
        assert!(cfg.hold.commit_relaxes_immediately);
        assert_eq!(cfg.press_profile().rest_scale, 0.9);
    }

    #[test]
    fn set_value_rejects_unknown_and_mistyped() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set_value("hold.nope", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set_value("hold", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set_value("carousel.reactive_render_list", "maybe"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set_value("carousel.variant", "spinning"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.set_value("layout.card_width", "280").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().layout.card_width, 280.0);
    }

    #[test]
    fn load_from_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "hold = [").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseFailed(_))
        ));
    }
}
