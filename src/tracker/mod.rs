//! Eye tracker plugins and the background thread that feeds their samples
//! into the frame loop.

pub mod eye_input;
pub mod mouse;
pub mod plugins;

use std::path::PathBuf;

use thiserror::Error;

use crate::models::input::Sample;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("unknown eye tracker plugin '{0}'")]
    UnknownPlugin(String),
    #[error("eye tracker plugin '{plugin}' failed to connect: {reason}")]
    Connect { plugin: String, reason: String },
    #[error("no eye tracker plugin could connect")]
    NoTracker,
    #[error("calibration failed: {0}")]
    Calibration(String),
    #[error("gaze recording {path}: {reason}")]
    Recording { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerStatus {
    TryingToConnect,
    Connected,
    Disconnected,
}

/// Sample source of one eye tracker. Owned by the tracker thread.
pub trait EyeTracker: Send {
    fn name(&self) -> &'static str;

    fn connect(&mut self) -> Result<(), TrackerError>;

    /// Samples that arrived since the last call, oldest first, at most `max`.
    fn fetch_samples(&mut self, max: usize) -> Vec<Sample>;

    /// Gaze is currently found by the device.
    fn is_tracking(&self) -> bool;

    fn calibrate(&mut self) -> Result<(), TrackerError>;

    fn disconnect(&mut self);
}
