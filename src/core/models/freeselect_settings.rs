use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::global_constants::{
    APPLICATION_CONFIG_DIR, DEFAULT_DIM_RGBA, DEFAULT_FILL_RGBA, DEFAULT_MAX_AUTOMATIC_RETRIES,
    DEFAULT_MIN_CLOSING_POINTS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_POST_CREATION_SETTLE_MS,
    DEFAULT_PRE_READ_SETTLE_MS, DEFAULT_READ_TIMEOUT_MS, DEFAULT_RETRY_COOLDOWN_MS,
    DEFAULT_STROKE_RGBA, DEFAULT_STROKE_WIDTH, LOG_TAG_SETTINGS, MIN_BUFFER_DEPTH,
    SETTINGS_FILE_NAME,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    EvenOdd,
    NonZero,
}

impl fmt::Display for FillRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillRule::EvenOdd => write!(f, "EvenOdd"),
            FillRule::NonZero => write!(f, "NonZero"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AcquisitionSettings {
    pub post_creation_settle_ms: u64,
    pub pre_read_settle_ms: u64,
    pub read_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub buffer_depth: usize,
    pub max_automatic_retries: u32,
    pub retry_cooldown_ms: u64,
}

impl Default for AcquisitionSettings {
    fn default() -> Self {
        Self {
            post_creation_settle_ms: DEFAULT_POST_CREATION_SETTLE_MS,
            pre_read_settle_ms: DEFAULT_PRE_READ_SETTLE_MS,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            buffer_depth: MIN_BUFFER_DEPTH,
            max_automatic_retries: DEFAULT_MAX_AUTOMATIC_RETRIES,
            retry_cooldown_ms: DEFAULT_RETRY_COOLDOWN_MS,
        }
    }
}

impl AcquisitionSettings {
    pub fn post_creation_settle(&self) -> Duration {
        Duration::from_millis(self.post_creation_settle_ms)
    }

    pub fn pre_read_settle(&self) -> Duration {
        Duration::from_millis(self.pre_read_settle_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn retry_cooldown(&self) -> Duration {
        Duration::from_millis(self.retry_cooldown_ms)
    }

    pub fn effective_buffer_depth(&self) -> usize {
        self.buffer_depth.max(MIN_BUFFER_DEPTH)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelectionSettings {
    pub min_closing_points: usize,
    pub min_point_spacing: f32,
    pub fill_rule: FillRule,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            min_closing_points: DEFAULT_MIN_CLOSING_POINTS,
            min_point_spacing: 0.0,
            fill_rule: FillRule::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PreviewStyle {
    pub dim_rgba: [u8; 4],
    pub fill_rgba: [u8; 4],
    pub stroke_rgba: [u8; 4],
    pub stroke_width: f32,
}

impl Default for PreviewStyle {
    fn default() -> Self {
        Self {
            dim_rgba: DEFAULT_DIM_RGBA,
            fill_rgba: DEFAULT_FILL_RGBA,
            stroke_rgba: DEFAULT_STROKE_RGBA,
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FreeSelectSettings {
    #[serde(default)]
    pub acquisition: AcquisitionSettings,
    #[serde(default)]
    pub selection: SelectionSettings,
    #[serde(default)]
    pub preview: PreviewStyle,
    #[serde(default)]
    pub output_directory: Option<PathBuf>,
}

impl FreeSelectSettings {
    pub fn load() -> anyhow::Result<Self> {
        let settings_path = Self::get_settings_file_path()?;

        if !settings_path.exists() {
            log::info!("{} No settings file found, using defaults", LOG_TAG_SETTINGS);
            let default_settings = Self::default();
            default_settings.save_to(&settings_path)?;
            return Ok(default_settings);
        }

        Self::load_from(&settings_path)
    }

    pub fn load_from(settings_path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(settings_path)
            .with_context(|| format!("Unable to read settings from {:?}", settings_path))?;
        let settings: FreeSelectSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid settings file {:?}", settings_path))?;

        log::info!("{} Loaded settings from {:?}", LOG_TAG_SETTINGS, settings_path);
        log::debug!(
            "{} settle windows: {}ms + {}ms, closing threshold: {}, fill rule: {}",
            LOG_TAG_SETTINGS,
            settings.acquisition.post_creation_settle_ms,
            settings.acquisition.pre_read_settle_ms,
            settings.selection.min_closing_points,
            settings.selection.fill_rule
        );

        Ok(settings)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let settings_path = Self::get_settings_file_path()?;
        self.save_to(&settings_path)
    }

    pub fn save_to(&self, settings_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = settings_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(settings_path, contents)?;

        log::info!("{} Saved settings to {:?}", LOG_TAG_SETTINGS, settings_path);
        Ok(())
    }

    fn get_settings_file_path() -> anyhow::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join(APPLICATION_CONFIG_DIR);

        Ok(config_dir.join(SETTINGS_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rule_default_is_even_odd() {
        assert_eq!(FillRule::default(), FillRule::EvenOdd);
    }

    #[test]
    fn test_fill_rule_serialization() {
        let serialized = serde_json::to_string(&FillRule::NonZero).unwrap();
        assert_eq!(serialized, "\"NonZero\"");
    }

    #[test]
    fn test_default_settings_values() {
        let settings = FreeSelectSettings::default();

        assert_eq!(settings.acquisition.post_creation_settle_ms, 300);
        assert_eq!(settings.acquisition.pre_read_settle_ms, 200);
        assert_eq!(settings.acquisition.max_automatic_retries, 1);
        assert_eq!(settings.acquisition.buffer_depth, 2);
        assert_eq!(settings.selection.min_closing_points, 10);
        assert_eq!(settings.selection.min_point_spacing, 0.0);
        assert_eq!(settings.preview.dim_rgba, [0, 0, 0, 100]);
        assert!(settings.output_directory.is_none());
    }

    #[test]
    fn test_buffer_depth_never_drops_below_two() {
        let settings = AcquisitionSettings {
            buffer_depth: 1,
            ..AcquisitionSettings::default()
        };

        assert_eq!(settings.effective_buffer_depth(), 2);
    }

    #[test]
    fn test_zero_poll_interval_is_raised_to_one_millisecond() {
        let settings = AcquisitionSettings {
            poll_interval_ms: 0,
            ..AcquisitionSettings::default()
        };

        assert_eq!(settings.poll_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_settings_deserialization_with_missing_sections_uses_defaults() {
        let json = r#"{
            "selection": { "min_closing_points": 4 }
        }"#;

        let settings: FreeSelectSettings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.selection.min_closing_points, 4);
        assert_eq!(settings.selection.fill_rule, FillRule::EvenOdd);
        assert_eq!(settings.acquisition, AcquisitionSettings::default());
    }

    #[test]
    fn test_settings_save_and_load_roundtrip() {
        let temp_dir = std::env::temp_dir().join(format!(
            "freeselect-settings-test-{}",
            uuid::Uuid::new_v4()
        ));
        let settings_path = temp_dir.join("settings.json");

        let original_settings = FreeSelectSettings {
            acquisition: AcquisitionSettings {
                post_creation_settle_ms: 450,
                ..AcquisitionSettings::default()
            },
            selection: SelectionSettings {
                fill_rule: FillRule::NonZero,
                ..SelectionSettings::default()
            },
            preview: PreviewStyle::default(),
            output_directory: Some(temp_dir.join("out")),
        };

        original_settings.save_to(&settings_path).unwrap();
        let loaded_settings = FreeSelectSettings::load_from(&settings_path).unwrap();

        assert_eq!(loaded_settings, original_settings);

        std::fs::remove_dir_all(&temp_dir).ok();
    }

    #[test]
    fn test_load_from_invalid_json_fails_with_context() {
        let temp_dir = std::env::temp_dir().join(format!(
            "freeselect-settings-invalid-{}",
            uuid::Uuid::new_v4()
        ));
        std::fs::create_dir_all(&temp_dir).unwrap();
        let settings_path = temp_dir.join("settings.json");
        std::fs::write(&settings_path, "{ not json").unwrap();

        let result = FreeSelectSettings::load_from(&settings_path);

        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("Invalid settings file"));

        std::fs::remove_dir_all(&temp_dir).ok();
    }
}
