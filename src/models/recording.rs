//! Gaze recording schema (gaze.json), replayed by the `replay` tracker.
//! schemaVersion: 1

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::input::Sample;
use crate::tracker::TrackerError;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GazeRecording {
    pub schema_version: u32,
    /// Screen resolution during recording.
    pub screen_width: u32,
    pub screen_height: u32,
    /// Samples sorted by `timestampMs`.
    pub samples: Vec<Sample>,
}

impl GazeRecording {
    pub fn load(path: &Path) -> Result<Self, TrackerError> {
        let raw = std::fs::read_to_string(path).map_err(|source| TrackerError::Recording {
            path: path.to_path_buf(),
            reason: source.to_string(),
        })?;
        let mut recording: GazeRecording =
            serde_json::from_str(&raw).map_err(|source| TrackerError::Recording {
                path: path.to_path_buf(),
                reason: source.to_string(),
            })?;

        if recording.schema_version != SCHEMA_VERSION {
            return Err(TrackerError::Recording {
                path: path.to_path_buf(),
                reason: format!(
                    "unsupported schemaVersion: expected {}, got {}",
                    SCHEMA_VERSION, recording.schema_version
                ),
            });
        }

        recording.samples.sort_by_key(|sample| sample.timestamp_ms);
        Ok(recording)
    }

    pub fn duration_ms(&self) -> u64 {
        self.samples
            .last()
            .map(|sample| sample.timestamp_ms)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_and_sorts_samples() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gaze.json");
        std::fs::write(
            &path,
            r#"{
                "schemaVersion": 1,
                "screenWidth": 1920,
                "screenHeight": 1080,
                "samples": [
                    {"x": 3.0, "y": 3.0, "timestampMs": 30},
                    {"x": 1.0, "y": 1.0, "timestampMs": 10}
                ]
            }"#,
        )
        .expect("write recording");

        let recording = GazeRecording::load(&path).expect("load recording");
        assert_eq!(recording.samples[0].timestamp_ms, 10);
        assert_eq!(recording.duration_ms(), 30);
    }

    #[test]
    fn rejects_unknown_schema_version() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gaze.json");
        std::fs::write(
            &path,
            r#"{"schemaVersion": 9, "screenWidth": 1, "screenHeight": 1, "samples": []}"#,
        )
        .expect("write recording");

        let err = GazeRecording::load(&path).expect_err("schema 9 must fail");
        assert!(err.to_string().contains("schemaVersion"));
    }
}
