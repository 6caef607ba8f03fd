//! Zooms the web view toward the gaze until a page coordinate is resolved.
//! Output slot: `coordinate` (engine pixels).

use euclid::default::{Size2D, Vector2D};

use crate::algorithm::coordinate_mapper::ZoomTransform;
use crate::algorithm::zoom_drift::{ZoomDriftResolver, ZoomFrame, ZoomOutcome};
use crate::models::input::TabInput;
use crate::models::page::WebViewParameters;
use crate::models::settings::{ZoomFinishPolicy, ZoomSettings};
use crate::pipeline::action::Action;
use crate::pipeline::slots::{SlotKind, SlotValue, Slots};
use crate::tab::context::TabContext;
use crate::tab::draw::{DrawCommand, DrawList};

pub const COORDINATE_SLOT: &str = "coordinate";

const MARKER_SIZE: f32 = 5.0;

pub struct ZoomCoordinateAction {
    slots: Slots,
    settings: ZoomSettings,
    resolver: ZoomDriftResolver,
    dimming: f32,
}

impl ZoomCoordinateAction {
    pub fn new(settings: &ZoomSettings) -> Self {
        Self {
            slots: Slots::new().with_output(COORDINATE_SLOT, SlotKind::Vec2),
            settings: settings.clone(),
            resolver: ZoomDriftResolver::new(settings),
            dimming: 0.0,
        }
    }

    pub fn resolver(&self) -> &ZoomDriftResolver {
        &self.resolver
    }

    fn emit(&mut self, coordinate: Vector2D<f32>) {
        if let Err(err) = self
            .slots
            .set_output(COORDINATE_SLOT, SlotValue::Vec2(coordinate))
        {
            log::warn!("zoom_coordinate: failed to write output: {err}");
        }
    }

    fn web_view_parameters(&self) -> WebViewParameters {
        let dim = if self.settings.do_dimming && self.settings.dimming_duration > 0.0 {
            self.settings.dimming_value * (self.dimming / self.settings.dimming_duration)
        } else {
            0.0
        };
        WebViewParameters {
            center_offset: self.resolver.center_offset(),
            zoom: self.resolver.log_zoom(),
            zoom_position: self.resolver.anchor(),
            dim,
        }
    }
}

impl Action for ZoomCoordinateAction {
    fn name(&self) -> &'static str {
        "zoom_coordinate"
    }

    fn slots(&self) -> &Slots {
        &self.slots
    }

    fn slots_mut(&mut self) -> &mut Slots {
        &mut self.slots
    }

    fn update(&mut self, tpf: f32, tab_input: &TabInput, ctx: &mut TabContext) -> bool {
        let resolution = ctx.web_view_resolution();
        let mut finished = false;

        match self
            .resolver
            .update(tpf, ZoomFrame::from(tab_input), resolution)
        {
            ZoomOutcome::Zooming => {}
            ZoomOutcome::Instant(coordinate) => {
                log::info!(
                    "zoom_coordinate: instant interaction at ({:.0}, {:.0})",
                    coordinate.x,
                    coordinate.y
                );
                self.emit(coordinate);
                finished = true;
            }
            ZoomOutcome::Resolved(coordinate) => {
                log::info!(
                    "zoom_coordinate: resolved fixation at ({:.0}, {:.0})",
                    coordinate.x,
                    coordinate.y
                );
                self.emit(coordinate);
                match self.settings.finish_policy {
                    ZoomFinishPolicy::Finish => finished = true,
                    ZoomFinishPolicy::Hold => self.resolver.hold(),
                }
            }
        }

        self.dimming = (self.dimming + tpf).min(self.settings.dimming_duration);
        ctx.web_view_parameters = self.web_view_parameters();

        finished
    }

    fn draw(&self, ctx: &TabContext, list: &mut DrawList) {
        let mapper = ctx.mapper();
        let transform = ZoomTransform::from(&ctx.web_view_parameters);
        let resolution: Size2D<f32> = mapper.resolution();

        let anchor = self.resolver.anchor().component_mul(resolution.to_vector());
        list.push(DrawCommand::Marker {
            center: mapper.engine_to_view_pixel(anchor, &transform),
            size: Size2D::new(MARKER_SIZE, MARKER_SIZE),
            color: [1.0, 0.0, 0.0],
        });

        if let Some(coordinate) = self.slots.output_vec2(COORDINATE_SLOT) {
            list.push(DrawCommand::Marker {
                center: mapper.engine_to_view_pixel(coordinate, &transform),
                size: Size2D::new(MARKER_SIZE, MARKER_SIZE),
                color: [0.0, 1.0, 0.0],
            });
        }
    }

    fn deactivate(&mut self, ctx: &mut TabContext) {
        ctx.reset_web_view_parameters();
    }

    fn abort(&mut self, ctx: &mut TabContext) {
        log::debug!("zoom_coordinate: aborted at log zoom {:.2}", self.resolver.log_zoom());
        ctx.reset_web_view_parameters();
    }
}
