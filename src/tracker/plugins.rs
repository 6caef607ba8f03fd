//! Built-in tracker plugins, selected by name from `tracker.plugins`.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::input::Sample;
use crate::models::recording::GazeRecording;
use crate::models::settings::{SimulatedTrackerSettings, TrackerSettings};
use crate::tracker::{EyeTracker, TrackerError};

pub const SIMULATED: &str = "simulated";
pub const REPLAY: &str = "replay";

// Simulated

/// Noisy fixations on configured screen points, cycled every `dwellSeconds`.
pub struct SimulatedTracker {
    settings: SimulatedTrackerSettings,
    rng: StdRng,
    started: Option<Instant>,
    emitted: u64,
}

impl SimulatedTracker {
    pub fn new(settings: &SimulatedTrackerSettings) -> Self {
        Self {
            settings: settings.clone(),
            rng: StdRng::seed_from_u64(settings.seed),
            started: None,
            emitted: 0,
        }
    }

    fn samples_until(&mut self, elapsed: Duration, max: usize) -> Vec<Sample> {
        if self.settings.fixations.is_empty() || self.settings.sample_rate_hz <= 0.0 {
            return Vec::new();
        }

        let due = (elapsed.as_secs_f64() * self.settings.sample_rate_hz) as u64;
        let count = due.saturating_sub(self.emitted).min(max as u64);
        let noise = self.settings.noise.abs();

        let mut samples = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let seconds = self.emitted as f64 / self.settings.sample_rate_hz;
            let index = if self.settings.dwell_seconds > 0.0 {
                (seconds / self.settings.dwell_seconds) as usize % self.settings.fixations.len()
            } else {
                0
            };
            let (x, y) = self.settings.fixations[index];
            let (noise_x, noise_y) = if noise > 0.0 {
                (
                    self.rng.gen_range(-noise..=noise),
                    self.rng.gen_range(-noise..=noise),
                )
            } else {
                (0.0, 0.0)
            };
            samples.push(Sample {
                x: x + noise_x,
                y: y + noise_y,
                timestamp_ms: (seconds * 1000.0) as u64,
            });
            self.emitted += 1;
        }
        samples
    }
}

impl EyeTracker for SimulatedTracker {
    fn name(&self) -> &'static str {
        SIMULATED
    }

    fn connect(&mut self) -> Result<(), TrackerError> {
        if self.settings.fixations.is_empty() {
            return Err(TrackerError::Connect {
                plugin: SIMULATED.to_string(),
                reason: "no fixations configured".to_string(),
            });
        }
        self.started = Some(Instant::now());
        self.emitted = 0;
        Ok(())
    }

    fn fetch_samples(&mut self, max: usize) -> Vec<Sample> {
        match self.started {
            Some(started) => self.samples_until(started.elapsed(), max),
            None => Vec::new(),
        }
    }

    fn is_tracking(&self) -> bool {
        self.started.is_some()
    }

    fn calibrate(&mut self) -> Result<(), TrackerError> {
        log::info!("simulated tracker: calibration is a no-op");
        Ok(())
    }

    fn disconnect(&mut self) {
        self.started = None;
    }
}

// Replay

/// Plays back a gaze recording in real time.
pub struct ReplayTracker {
    recording: GazeRecording,
    cursor: usize,
    started: Option<Instant>,
}

impl ReplayTracker {
    pub fn new(recording: GazeRecording) -> Self {
        Self {
            recording,
            cursor: 0,
            started: None,
        }
    }

    fn samples_until(&mut self, elapsed: Duration, max: usize) -> Vec<Sample> {
        let elapsed_ms = elapsed.as_millis() as u64;
        let end = self.recording.samples[self.cursor..]
            .iter()
            .take(max)
            .take_while(|sample| sample.timestamp_ms <= elapsed_ms)
            .count();
        let samples = self.recording.samples[self.cursor..self.cursor + end].to_vec();
        self.cursor += end;
        samples
    }
}

impl EyeTracker for ReplayTracker {
    fn name(&self) -> &'static str {
        REPLAY
    }

    fn connect(&mut self) -> Result<(), TrackerError> {
        if self.recording.samples.is_empty() {
            return Err(TrackerError::Connect {
                plugin: REPLAY.to_string(),
                reason: "recording has no samples".to_string(),
            });
        }
        self.cursor = 0;
        self.started = Some(Instant::now());
        Ok(())
    }

    fn fetch_samples(&mut self, max: usize) -> Vec<Sample> {
        match self.started {
            Some(started) => self.samples_until(started.elapsed(), max),
            None => Vec::new(),
        }
    }

    /// Tracking ends with the last recorded sample.
    fn is_tracking(&self) -> bool {
        self.started.is_some() && self.cursor < self.recording.samples.len()
    }

    fn calibrate(&mut self) -> Result<(), TrackerError> {
        Err(TrackerError::Calibration(
            "a recording cannot be calibrated".to_string(),
        ))
    }

    fn disconnect(&mut self) {
        self.started = None;
    }
}

// Selection

pub fn create_plugin(name: &str, settings: &TrackerSettings) -> Result<Box<dyn EyeTracker>, TrackerError> {
    match name {
        SIMULATED => Ok(Box::new(SimulatedTracker::new(&settings.simulated))),
        REPLAY => {
            let path = settings.replay_file.as_ref().ok_or_else(|| TrackerError::Connect {
                plugin: REPLAY.to_string(),
                reason: "tracker.replayFile is not set".to_string(),
            })?;
            Ok(Box::new(ReplayTracker::new(GazeRecording::load(path)?)))
        }
        other => Err(TrackerError::UnknownPlugin(other.to_string())),
    }
}

/// Tries the configured plugins in order and returns the first that connects.
pub fn connect_first_available(settings: &TrackerSettings) -> Result<Box<dyn EyeTracker>, TrackerError> {
    for name in &settings.plugins {
        let mut tracker = match create_plugin(name, settings) {
            Ok(tracker) => tracker,
            Err(err) => {
                log::warn!("eye_input: skipping plugin {name}: {err}");
                continue;
            }
        };
        match tracker.connect() {
            Ok(()) => {
                log::info!("eye_input: connected to {} tracker", tracker.name());
                return Ok(tracker);
            }
            Err(err) => log::warn!("eye_input: {err}"),
        }
    }
    Err(TrackerError::NoTracker)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording(timestamps: &[u64]) -> GazeRecording {
        GazeRecording {
            schema_version: crate::models::recording::SCHEMA_VERSION,
            screen_width: 800,
            screen_height: 600,
            samples: timestamps
                .iter()
                .map(|ts| Sample {
                    x: *ts as f64,
                    y: 0.0,
                    timestamp_ms: *ts,
                })
                .collect(),
        }
    }

    #[test]
    fn simulated_emits_at_sample_rate_near_fixation() {
        let mut tracker = SimulatedTracker::new(&SimulatedTrackerSettings {
            sample_rate_hz: 100.0,
            noise: 2.0,
            fixations: vec![(100.0, 200.0), (500.0, 400.0)],
            dwell_seconds: 1.0,
            seed: 1,
        });
        let first = tracker.samples_until(Duration::from_millis(500), 1000);
        assert_eq!(first.len(), 50);
        assert!(first
            .iter()
            .all(|sample| (sample.x - 100.0).abs() <= 2.0 && (sample.y - 200.0).abs() <= 2.0));

        let second = tracker.samples_until(Duration::from_millis(1500), 1000);
        assert_eq!(second.len(), 100);
        let last = second.last().expect("samples");
        assert!((last.x - 500.0).abs() <= 2.0);
    }

    #[test]
    fn simulated_respects_batch_limit() {
        let mut tracker = SimulatedTracker::new(&SimulatedTrackerSettings::default());
        assert_eq!(tracker.samples_until(Duration::from_secs(10), 32).len(), 32);
        assert_eq!(tracker.samples_until(Duration::from_secs(10), 32).len(), 32);
    }

    #[test]
    fn replay_follows_timestamps_and_stops_tracking() {
        let mut tracker = ReplayTracker::new(recording(&[0, 10, 20, 500]));
        tracker.connect().expect("connect");
        let early = tracker.samples_until(Duration::from_millis(15), 10);
        assert_eq!(early.len(), 2);
        assert!(tracker.is_tracking());

        let rest = tracker.samples_until(Duration::from_millis(1000), 10);
        assert_eq!(rest.len(), 2);
        assert!(!tracker.is_tracking());
        assert!(tracker.calibrate().is_err());
    }

    #[test]
    fn selection_skips_unusable_plugins() {
        let settings = TrackerSettings {
            plugins: vec!["tobii".to_string(), REPLAY.to_string(), SIMULATED.to_string()],
            ..TrackerSettings::default()
        };
        let tracker = connect_first_available(&settings).expect("simulated connects");
        assert_eq!(tracker.name(), SIMULATED);

        let none = TrackerSettings {
            plugins: vec!["tobii".to_string()],
            ..TrackerSettings::default()
        };
        assert!(matches!(
            connect_first_available(&none),
            Err(TrackerError::NoTracker)
        ));
    }
}
