//! Per-frame pointer signals shared by the input layer and the tabs.
//! Origin is the upper left corner of the window.

use serde::{Deserialize, Serialize};

/// One raw gaze sample in screen (later window) space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    /// Milliseconds since the start of a recording. Live trackers leave this
    /// at zero and rely on arrival order.
    #[serde(default)]
    pub timestamp_ms: u64,
}

impl Sample {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            timestamp_ms: 0,
        }
    }

    pub fn distance(&self, other: &Sample) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Resolved pointer signal of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Input {
    pub gaze_x: i32,
    pub gaze_y: i32,
    /// Coordinates come from the eye tracker, not from the mouse.
    pub gaze_used: bool,
    /// User demands that the current interaction resolves immediately.
    pub instant_interaction: bool,
    /// Current gaze is classified as part of a saccade.
    pub saccade: bool,
    /// Overlay GUI already used the pointer this frame.
    pub gui_consumed: bool,
}

impl Input {
    pub fn new(gaze_x: i32, gaze_y: i32, gaze_used: bool) -> Self {
        Self {
            gaze_x,
            gaze_y,
            gaze_used,
            instant_interaction: false,
            saccade: false,
            gui_consumed: false,
        }
    }
}

/// `Input` plus coordinates in web view space of one tab.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TabInput {
    pub input: Input,
    pub web_view_pixel_gaze_x: i32,
    pub web_view_pixel_gaze_y: i32,
    pub web_view_gaze_relative_x: f32,
    pub web_view_gaze_relative_y: f32,
    pub inside_web_view: bool,
}

impl TabInput {
    pub fn new(
        input: Input,
        web_view_pixel_gaze_x: i32,
        web_view_pixel_gaze_y: i32,
        web_view_gaze_relative_x: f32,
        web_view_gaze_relative_y: f32,
    ) -> Self {
        let inside_web_view = (0.0..1.0).contains(&web_view_gaze_relative_x)
            && (0.0..1.0).contains(&web_view_gaze_relative_y);
        Self {
            input,
            web_view_pixel_gaze_x,
            web_view_pixel_gaze_y,
            web_view_gaze_relative_x,
            web_view_gaze_relative_y,
            inside_web_view,
        }
    }

    /// Pointer is inside the view and not taken by the overlay GUI.
    pub fn usable(&self) -> bool {
        self.inside_web_view && !self.input.gui_consumed
    }
}
