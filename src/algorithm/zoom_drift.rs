//! Zoom-to-point with drift correction.
//!
//! While the page zooms in around an anchor that follows the gaze, the
//! content under the eye moves and the eye follows it. Comparing the current
//! frame against a snapshot from up to `sampleLifetime` seconds ago gives the
//! drift, which is projected back onto the fixated page coordinate.

use std::collections::VecDeque;

use euclid::default::{Size2D, Vector2D};

use crate::algorithm::coordinate_mapper::ZoomTransform;
use crate::models::input::TabInput;
use crate::models::settings::ZoomSettings;

/// Log zoom below which the drift is resolved.
pub const DRIFT_LOG_ZOOM_THRESHOLD: f32 = 0.5;

const DRIFT_EPSILON: f32 = 1e-3;
const ZOOM_DELTA_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomFrame {
    /// Gaze relative to the web view, [0,1) when inside.
    pub relative_gaze: Vector2D<f32>,
    /// Gaze is inside the web view and not taken by the overlay GUI.
    pub usable: bool,
    pub saccade: bool,
    pub instant_interaction: bool,
}

impl From<&TabInput> for ZoomFrame {
    fn from(tab_input: &TabInput) -> Self {
        Self {
            relative_gaze: Vector2D::new(
                tab_input.web_view_gaze_relative_x,
                tab_input.web_view_gaze_relative_y,
            ),
            usable: tab_input.usable(),
            saccade: tab_input.input.saccade,
            instant_interaction: tab_input.input.instant_interaction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoomOutcome {
    Zooming,
    /// Drift corrected fixation in engine pixels.
    Resolved(Vector2D<f32>),
    /// Raw gaze mapped with the current transform, requested by the user.
    Instant(Vector2D<f32>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomPhase {
    Zoom,
    /// Zooming frozen and visual transform reset, coordinate already emitted.
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SampleData {
    log_zoom: f32,
    relative_gaze: Vector2D<f32>,
    relative_anchor: Vector2D<f32>,
    relative_center_offset: Vector2D<f32>,
    lifetime: f32,
}

impl SampleData {
    fn transform(&self) -> ZoomTransform {
        ZoomTransform::new(self.log_zoom, self.relative_anchor, self.relative_center_offset)
    }
}

#[derive(Debug, Clone)]
pub struct ZoomDriftResolver {
    settings: ZoomSettings,
    phase: ZoomPhase,
    first_update: bool,
    lin_zoom: f32,
    log_zoom: f32,
    deviation: f32,
    anchor: Vector2D<f32>,
    center_offset: Vector2D<f32>,
    samples: VecDeque<SampleData>,
}

impl ZoomDriftResolver {
    pub fn new(settings: &ZoomSettings) -> Self {
        Self {
            settings: settings.clone(),
            phase: ZoomPhase::Zoom,
            first_update: true,
            lin_zoom: 1.0,
            log_zoom: 1.0,
            deviation: 0.0,
            anchor: Vector2D::new(0.5, 0.5),
            center_offset: Vector2D::zero(),
            samples: VecDeque::new(),
        }
    }

    pub fn phase(&self) -> ZoomPhase {
        self.phase
    }

    pub fn lin_zoom(&self) -> f32 {
        self.lin_zoom
    }

    pub fn log_zoom(&self) -> f32 {
        self.log_zoom
    }

    pub fn deviation(&self) -> f32 {
        self.deviation
    }

    pub fn anchor(&self) -> Vector2D<f32> {
        self.anchor
    }

    pub fn center_offset(&self) -> Vector2D<f32> {
        self.center_offset
    }

    pub fn transform(&self) -> ZoomTransform {
        ZoomTransform::new(self.log_zoom, self.anchor, self.center_offset)
    }

    /// Freeze zooming; the page is shown unzoomed from the next update on.
    pub fn hold(&mut self) {
        self.phase = ZoomPhase::Hold;
    }

    pub fn update(&mut self, tpf: f32, frame: ZoomFrame, resolution: Size2D<f32>) -> ZoomOutcome {
        let gaze = frame.relative_gaze;
        let mut zoom_speed = 0.0;

        if frame.usable && self.phase == ZoomPhase::Zoom {
            zoom_speed = self.follow_gaze(tpf, gaze, frame.saccade, resolution);
        }

        match self.phase {
            ZoomPhase::Zoom => {
                self.lin_zoom = (self.lin_zoom + tpf * zoom_speed).max(1.0);
                self.log_zoom =
                    (1.0 - self.lin_zoom.ln().max(0.0)).max(self.settings.min_log_zoom);
            }
            // Page is shown unzoomed, instant interaction maps through identity.
            ZoomPhase::Hold => {
                self.log_zoom = 1.0;
                self.center_offset = Vector2D::zero();
            }
        }

        let mut outcome = ZoomOutcome::Zooming;
        if frame.usable && frame.instant_interaction {
            outcome = ZoomOutcome::Instant(self.transform().to_engine_pixels(gaze, resolution));
        }

        for sample in self.samples.iter_mut() {
            sample.lifetime -= tpf;
        }
        self.samples.retain(|sample| sample.lifetime > 0.0);
        self.samples.push_back(SampleData {
            log_zoom: self.log_zoom,
            relative_gaze: gaze,
            relative_anchor: self.anchor,
            relative_center_offset: self.center_offset,
            lifetime: self.settings.sample_lifetime,
        });

        match self.phase {
            ZoomPhase::Zoom => {
                if self.log_zoom < DRIFT_LOG_ZOOM_THRESHOLD && outcome == ZoomOutcome::Zooming {
                    outcome = ZoomOutcome::Resolved(self.resolve_drift(gaze, resolution));
                }
            }
            ZoomPhase::Hold => {
                self.log_zoom = 1.0;
                self.center_offset = Vector2D::zero();
            }
        }

        outcome
    }

    /// Moves the anchor toward the gaze and returns this frame's zoom speed.
    fn follow_gaze(
        &mut self,
        tpf: f32,
        gaze: Vector2D<f32>,
        saccade: bool,
        resolution: Size2D<f32>,
    ) -> f32 {
        let mut zoom_speed = 0.0;
        let fading = self.settings.deviation_fading_duration.max(f32::EPSILON);
        self.deviation = (self.deviation - tpf / fading).max(0.0);

        if self.first_update {
            self.anchor = gaze;
            self.first_update = false;
        } else {
            if !saccade {
                let pixel_gaze = self.transform().to_engine_pixels(gaze, resolution);
                let pixel_anchor = self.anchor.component_mul(resolution.to_vector());
                let max_dimension = resolution.width.max(resolution.height);
                if max_dimension > 0.0 {
                    let pixel_delta = (pixel_gaze - pixel_anchor).length();
                    self.deviation = (pixel_delta / max_dimension).max(self.deviation).min(1.0);
                }

                let step = (tpf / self.settings.move_duration.max(f32::EPSILON)).min(1.0);
                let delta = gaze + self.center_offset - self.anchor;
                self.anchor += delta * step;
            }
            zoom_speed = self.settings.zoom_speed
                - (self.settings.deviation_weight * self.deviation).min(1.0);
        }

        let clamped_anchor = Vector2D::new(self.anchor.x.clamp(0.0, 1.0), self.anchor.y.clamp(0.0, 1.0));
        let zoom_weight =
            (1.0 - self.log_zoom) / (1.0 - self.settings.min_log_zoom).max(f32::EPSILON);
        self.center_offset = (clamped_anchor - Vector2D::new(0.5, 0.5))
            * (self.settings.center_offset_multiplier * zoom_weight);

        zoom_speed
    }

    fn resolve_drift(&self, gaze: Vector2D<f32>, resolution: Size2D<f32>) -> Vector2D<f32> {
        let fallback = self.anchor.component_mul(resolution.to_vector());
        let Some(old) = self.samples.front() else {
            return fallback;
        };

        let anchor_delta = (self.anchor - old.relative_anchor).component_mul(resolution.to_vector());
        let gaze_now = old.transform().to_engine_pixels(gaze, resolution);
        let gaze_then = self.transform().to_engine_pixels(old.relative_gaze, resolution);
        let drift = gaze_now - gaze_then + anchor_delta;
        let zoom_delta = 1.0 / self.log_zoom - 1.0 / old.log_zoom;
        let drift_length = drift.length();

        if !drift_length.is_finite()
            || !zoom_delta.is_finite()
            || drift_length < DRIFT_EPSILON
            || zoom_delta.abs() < ZOOM_DELTA_EPSILON
        {
            log::debug!("zoom_drift: degenerate drift, falling back to anchor");
            return fallback;
        }

        let radius = drift_length / zoom_delta;
        let fixation = gaze_then + (drift / drift_length) * radius;
        log::debug!(
            "zoom_drift: drift ({:.1}, {:.1}), anchor drift ({:.1}, {:.1})",
            drift.x,
            drift.y,
            anchor_delta.x,
            anchor_delta.y
        );

        if fixation.x.is_finite() && fixation.y.is_finite() {
            fixation
        } else {
            fallback
        }
    }
}
