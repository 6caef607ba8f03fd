//! Application settings (settings.toml).
//!
//! Every section has defaults, so a partial file only overrides what it
//! names. A missing file is replaced by the defaults on first start.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SETTINGS_FILE_NAME: &str = "settings.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("no configuration directory available")]
    NoConfigDir,
}

/// Deterministic bias and noise added to gaze output for experiments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DistortionSettings {
    pub enabled: bool,
    pub bias_x: f64,
    pub bias_y: f64,
    /// Maximum absolute noise per axis in pixels.
    pub noise_amplitude: f64,
    pub seed: u64,
}

impl Default for DistortionSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            bias_x: 0.0,
            bias_y: 0.0,
            noise_amplitude: 0.0,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InputSettings {
    /// Window after the first mouse movement in which the distance is measured (seconds).
    pub override_init_duration: f32,
    /// Distance the mouse must travel inside the init window to take over (pixels).
    pub override_init_distance: f64,
    /// Duration the mouse must rest before gaze takes over again (seconds).
    pub override_stop_duration: f32,
    /// Movement below this distance counts as resting (pixels).
    pub stationary_epsilon: f64,
    pub distortion: DistortionSettings,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            override_init_duration: 0.1,
            override_init_distance: 5.0,
            override_stop_duration: 1.0,
            stationary_epsilon: 0.5,
            distortion: DistortionSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterSettings {
    /// Number of most recent samples averaged into the filtered gaze.
    pub window_size: usize,
    /// Jump between consecutive samples that counts as saccade (pixels).
    pub saccade_threshold: f64,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            window_size: 15,
            saccade_threshold: 40.0,
        }
    }
}

/// What the zoom action does once the drift corrected coordinate exists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ZoomFinishPolicy {
    /// Emit the coordinate and finish the action.
    #[default]
    Finish,
    /// Emit the coordinate, stop zooming and wait for instant interaction or abort.
    Hold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ZoomSettings {
    pub zoom_speed: f32,
    /// Seconds until a full deviation has faded back to zero.
    pub deviation_fading_duration: f32,
    pub deviation_weight: f32,
    /// One means that on maximum zoom the outermost corner is moved into the center.
    pub center_offset_multiplier: f32,
    /// Lower bound of the logarithmic zoom factor.
    pub min_log_zoom: f32,
    /// Seconds until the zoom anchor has fully moved to a new gaze position.
    pub move_duration: f32,
    /// Lifetime of drift reference snapshots (seconds).
    pub sample_lifetime: f32,
    pub dimming_duration: f32,
    pub dimming_value: f32,
    pub do_dimming: bool,
    pub finish_policy: ZoomFinishPolicy,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            zoom_speed: 0.4,
            deviation_fading_duration: 1.0,
            deviation_weight: 2.0,
            center_offset_multiplier: 0.25,
            min_log_zoom: 0.1,
            move_duration: 0.75,
            sample_lifetime: 1.0,
            dimming_duration: 0.5,
            dimming_value: 0.3,
            do_dimming: true,
            finish_policy: ZoomFinishPolicy::Finish,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TabSettings {
    /// Engine pixels per web view pixel.
    pub web_view_resolution_scale: f32,
    /// Seconds between page size requests.
    pub page_resolution_interval: f32,
    pub auto_scrolling: bool,
    pub auto_scroll_wheel_factor: f32,
    pub gaze_mouse: bool,
    pub click_visualization_duration: f32,
}

impl Default for TabSettings {
    fn default() -> Self {
        Self {
            web_view_resolution_scale: 1.0,
            page_resolution_interval: 1.0,
            auto_scrolling: false,
            auto_scroll_wheel_factor: 20.0,
            gaze_mouse: false,
            click_visualization_duration: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulatedTrackerSettings {
    pub sample_rate_hz: f64,
    pub noise: f64,
    /// Fixation targets in screen pixels, cycled in order.
    pub fixations: Vec<(f64, f64)>,
    pub dwell_seconds: f64,
    pub seed: u64,
}

impl Default for SimulatedTrackerSettings {
    fn default() -> Self {
        Self {
            sample_rate_hz: 60.0,
            noise: 2.0,
            fixations: vec![(640.0, 360.0)],
            dwell_seconds: 2.0,
            seed: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackerSettings {
    /// Plugin names tried in order until one connects.
    pub plugins: Vec<String>,
    /// Gaze recording used by the `replay` plugin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replay_file: Option<PathBuf>,
    /// Capacity of the sample hand-off queue between tracker thread and frame loop.
    pub queue_capacity: usize,
    /// Samples fetched from the plugin per poll.
    pub max_samples_per_poll: usize,
    pub poll_interval_ms: u64,
    pub simulated: SimulatedTrackerSettings,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            plugins: vec!["simulated".to_string()],
            replay_file: None,
            queue_capacity: 256,
            max_samples_per_poll: 32,
            poll_interval_ms: 4,
            simulated: SimulatedTrackerSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WindowSettings {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub frames_per_second: u32,
    pub start_url: String,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: 1280,
            height: 720,
            frames_per_second: 60,
            start_url: "https://example.org".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub window: WindowSettings,
    pub input: InputSettings,
    pub filter: FilterSettings,
    pub zoom: ZoomSettings,
    pub tab: TabSettings,
    pub tracker: TrackerSettings,
}

impl Settings {
    /// `{config_dir}/gazebrowse/settings.toml`
    pub fn default_path() -> Result<PathBuf, SettingsError> {
        let base = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(base.join("gazebrowse").join(SETTINGS_FILE_NAME))
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings = toml::from_str(&raw).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads the file or, when it does not exist yet, writes and returns the defaults.
    pub fn load_or_create(path: &Path) -> Result<Self, SettingsError> {
        if path.exists() {
            return Self::load(path);
        }

        log::info!("settings: no file at {}, writing defaults", path.display());
        let settings = Settings::default();
        settings.save(path)?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SettingsError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        positive("input.overrideInitDuration", self.input.override_init_duration)?;
        positive("input.overrideStopDuration", self.input.override_stop_duration)?;
        if self.input.override_init_distance < 0.0 {
            return Err(invalid("input.overrideInitDistance", "must not be negative"));
        }
        if self.filter.window_size == 0 {
            return Err(invalid("filter.windowSize", "must be at least 1"));
        }
        if self.filter.saccade_threshold <= 0.0 {
            return Err(invalid("filter.saccadeThreshold", "must be positive"));
        }
        positive("zoom.zoomSpeed", self.zoom.zoom_speed)?;
        positive("zoom.deviationFadingDuration", self.zoom.deviation_fading_duration)?;
        positive("zoom.moveDuration", self.zoom.move_duration)?;
        positive("zoom.sampleLifetime", self.zoom.sample_lifetime)?;
        positive("zoom.dimmingDuration", self.zoom.dimming_duration)?;
        if !(0.0..0.5).contains(&self.zoom.min_log_zoom) || self.zoom.min_log_zoom == 0.0 {
            return Err(invalid(
                "zoom.minLogZoom",
                "must lie in (0, 0.5) so the drift threshold is reachable",
            ));
        }
        positive("tab.webViewResolutionScale", self.tab.web_view_resolution_scale)?;
        positive("tab.clickVisualizationDuration", self.tab.click_visualization_duration)?;
        if self.tracker.queue_capacity == 0 {
            return Err(invalid("tracker.queueCapacity", "must be at least 1"));
        }
        if self.window.frames_per_second == 0 {
            return Err(invalid("window.framesPerSecond", "must be at least 1"));
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), SettingsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be positive"))
    }
}

fn invalid(field: &'static str, reason: &str) -> SettingsError {
    SettingsError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Settings::default().validate().expect("defaults must validate");
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let raw = r#"
            [zoom]
            zoomSpeed = 0.8
            finishPolicy = "hold"

            [input.distortion]
            enabled = true
            biasX = 12.0
        "#;
        let settings: Settings = toml::from_str(raw).expect("parse partial settings");
        assert!((settings.zoom.zoom_speed - 0.8).abs() < f32::EPSILON);
        assert_eq!(settings.zoom.finish_policy, ZoomFinishPolicy::Hold);
        assert!(settings.input.distortion.enabled);
        assert!((settings.input.distortion.bias_x - 12.0).abs() < f64::EPSILON);
        assert_eq!(settings.filter, FilterSettings::default());
        assert_eq!(settings.tracker.plugins, vec!["simulated".to_string()]);
    }

    #[test]
    fn load_or_create_writes_defaults_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join(SETTINGS_FILE_NAME);

        let created = Settings::load_or_create(&path).expect("create defaults");
        assert!(path.exists());
        assert_eq!(created, Settings::default());

        let mut changed = created.clone();
        changed.tab.auto_scrolling = true;
        changed.save(&path).expect("save");
        let loaded = Settings::load_or_create(&path).expect("reload");
        assert!(loaded.tab.auto_scrolling);
    }

    #[test]
    fn rejects_unreachable_drift_threshold() {
        let mut settings = Settings::default();
        settings.zoom.min_log_zoom = 0.6;
        match settings.validate() {
            Err(SettingsError::Invalid { field, .. }) => assert_eq!(field, "zoom.minLogZoom"),
            other => panic!("expected invalid minLogZoom, got {other:?}"),
        }
    }

    #[test]
    fn rejects_stalled_zoom() {
        let mut settings = Settings::default();
        settings.zoom.zoom_speed = 0.0;
        match settings.validate() {
            Err(SettingsError::Invalid { field, .. }) => assert_eq!(field, "zoom.zoomSpeed"),
            other => panic!("expected invalid zoomSpeed, got {other:?}"),
        }
    }

    #[test]
    fn reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(&path, "[zoom\nzoomSpeed = ").expect("write broken file");
        let err = Settings::load(&path).expect_err("broken file must fail");
        assert!(matches!(err, SettingsError::Parse { .. }));
        assert!(err.to_string().contains(SETTINGS_FILE_NAME));
    }
}
