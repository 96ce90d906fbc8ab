use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::common::Viewport;
use crate::error::ConfigError;
use crate::pipeline::services::image::MatchThresholds;
use crate::pipeline::services::patterns::PatternCatalog;
use crate::pipeline::services::stream_checker::CheckerOptions;
use crate::pipeline::types::Fleet;

const ENV_PREFIX: &str = "WATCHDOG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub monitoring: MonitoringSettings,
    pub detection: DetectionSettings,
    pub renderer: RendererSettings,
    pub capture: CaptureSettings,
    pub files: FileSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringSettings {
    pub check_interval_ms: u64,
    pub inter_stream_delay_ms: u64,
    /// Send the summary even when every stream is healthy.
    pub always_notify: bool,
}

impl Default for MonitoringSettings {
    fn default() -> Self {
        Self {
            check_interval_ms: 300_000,
            inter_stream_delay_ms: 2_000,
            always_notify: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    pub tolerance_percent: f64,
    pub minimum_match_count: usize,
    pub black_screen_max_rgb_sum: u32,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        let thresholds = MatchThresholds::default();
        Self {
            tolerance_percent: thresholds.tolerance_percent,
            minimum_match_count: thresholds.minimum_match_count,
            black_screen_max_rgb_sum: thresholds.black_threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub page_load_timeout_ms: u64,
    pub settle_delay_ms: u64,
    pub probe_timeout_ms: u64,
    pub user_agent: String,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            viewport_width: 1920,
            viewport_height: 1080,
            page_load_timeout_ms: 30_000,
            settle_delay_ms: 5_000,
            probe_timeout_ms: 5_000,
            user_agent: concat!("stream-watchdog/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    pub debug_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    pub machines: PathBuf,
    /// Optional overrides for the built-in patterns.
    pub patterns: Option<PathBuf>,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            machines: PathBuf::from("config/machines.json"),
            patterns: None,
        }
    }
}

impl Configuration {
    /// Loads defaults, then the optional settings file, then `WATCHDOG__*`
    /// environment overrides (e.g. `WATCHDOG__MONITORING__CHECK_INTERVAL_MS`).
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, Self::environment())
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }

    fn load_with_env(path: Option<&Path>, env: config::Environment) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let configuration: Configuration =
            builder.add_source(env).build()?.try_deserialize()?;
        configuration.validate()?;
        Ok(configuration)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.monitoring.check_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "monitoring.check_interval_ms must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&self.detection.tolerance_percent) {
            return Err(ConfigError::Invalid(format!(
                "detection.tolerance_percent must be between 0 and 100, got {}",
                self.detection.tolerance_percent
            )));
        }
        if self.detection.minimum_match_count == 0 {
            return Err(ConfigError::Invalid(
                "detection.minimum_match_count must be at least 1".to_string(),
            ));
        }
        if self.renderer.viewport_width == 0 || self.renderer.viewport_height == 0 {
            return Err(ConfigError::Invalid(
                "renderer viewport must be non-empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.monitoring.check_interval_ms)
    }

    pub fn inter_stream_delay(&self) -> Duration {
        Duration::from_millis(self.monitoring.inter_stream_delay_ms)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.renderer.viewport_width, self.renderer.viewport_height)
    }

    pub fn thresholds(&self) -> MatchThresholds {
        MatchThresholds {
            tolerance_percent: self.detection.tolerance_percent,
            minimum_match_count: self.detection.minimum_match_count,
            black_threshold: self.detection.black_screen_max_rgb_sum,
        }
    }

    pub fn checker_options(&self) -> CheckerOptions {
        CheckerOptions {
            navigation_timeout: Duration::from_millis(self.renderer.page_load_timeout_ms),
            probe_timeout: Duration::from_millis(self.renderer.probe_timeout_ms),
            settle_delay: Duration::from_millis(self.renderer.settle_delay_ms),
            debug_capture_dir: self.capture.debug_dir.clone(),
        }
    }

    pub fn load_fleet(&self) -> Result<Fleet, ConfigError> {
        load_fleet(&self.files.machines)
    }

    pub fn load_patterns(&self) -> Result<PatternCatalog, ConfigError> {
        load_patterns(self.files.patterns.as_deref())
    }
}

pub fn load_fleet(path: &Path) -> Result<Fleet, ConfigError> {
    let fleet: Fleet = read_json(path)?;
    fleet.validate().map_err(ConfigError::Invalid)?;
    tracing::info!(
        "Loaded {} machines with {} streams from {}",
        fleet.machines.len(),
        fleet.stream_count(),
        path.display()
    );
    Ok(fleet)
}

/// Built-in patterns, overridden per category by the file when one is given.
pub fn load_patterns(path: Option<&Path>) -> Result<PatternCatalog, ConfigError> {
    let catalog = match path {
        Some(path) => PatternCatalog::builtin().merge(read_json(path)?),
        None => PatternCatalog::builtin(),
    };
    catalog.validate().map_err(ConfigError::Invalid)?;
    Ok(catalog)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}
