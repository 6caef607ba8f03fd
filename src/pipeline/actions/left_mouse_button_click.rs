//! Clicks at the engine pixel coordinate in input slot `coordinate`.

use crate::algorithm::coordinate_mapper::ZoomTransform;
use crate::models::input::TabInput;
use crate::models::page::BrowserCommand;
use crate::pipeline::action::Action;
use crate::pipeline::slots::{SlotKind, Slots};
use crate::tab::context::TabContext;

pub const COORDINATE_SLOT: &str = "coordinate";

pub struct LeftMouseButtonClickAction {
    slots: Slots,
    waiting_logged: bool,
}

impl LeftMouseButtonClickAction {
    pub fn new() -> Self {
        Self {
            slots: Slots::new().with_input(COORDINATE_SLOT, SlotKind::Vec2),
            waiting_logged: false,
        }
    }
}

impl Default for LeftMouseButtonClickAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for LeftMouseButtonClickAction {
    fn name(&self) -> &'static str {
        "left_mouse_button_click"
    }

    fn slots(&self) -> &Slots {
        &self.slots
    }

    fn slots_mut(&mut self) -> &mut Slots {
        &mut self.slots
    }

    fn update(&mut self, _tpf: f32, _tab_input: &TabInput, ctx: &mut TabContext) -> bool {
        let Some(coordinate) = self.slots.input_vec2(COORDINATE_SLOT) else {
            if !self.waiting_logged {
                log::debug!("left_mouse_button_click: waiting for coordinate");
                self.waiting_logged = true;
            }
            return false;
        };

        log::info!(
            "left_mouse_button_click: click at ({:.0}, {:.0})",
            coordinate.x,
            coordinate.y
        );
        ctx.dispatch(BrowserCommand::LeftClick {
            x: coordinate.x as f64,
            y: coordinate.y as f64,
        });

        let view_pixel = ctx
            .mapper()
            .engine_to_view_pixel(coordinate, &ZoomTransform::default());
        ctx.push_click_visualization(view_pixel);
        true
    }
}
