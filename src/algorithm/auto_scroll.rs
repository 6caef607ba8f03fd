//! Gaze driven scrolling of the page and of overflow elements.

use euclid::default::Vector2D;

use crate::models::page::{OverflowElement, PageRect};

/// Maps the vertical gaze position to a signed scroll speed in [-1, 1].
/// Top half scrolls up, bottom half down, quadratic toward the edges.
pub fn auto_scroll_target(relative_y: f32) -> f32 {
    let offset = (0.5 - relative_y) * 2.0;
    offset * offset.abs()
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AutoScroller {
    value: f32,
}

impl AutoScroller {
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }

    /// Approaches `target` when gaze is available, otherwise fades out toward
    /// zero by `tpf` per second. Returns the new value.
    pub fn update(&mut self, tpf: f32, target: Option<f32>) -> f32 {
        match target {
            Some(target) => self.value += tpf * (target - self.value),
            None if self.value > 0.0 => self.value = (self.value - tpf).max(0.0),
            None if self.value < 0.0 => self.value = (self.value + tpf).min(0.0),
            None => {}
        }
        self.value
    }
}

/// Engine pixel box test against every fixed element group.
pub fn gaze_upon_fixed(fixed_elements: &[Vec<PageRect>], engine_gaze: Vector2D<f32>) -> bool {
    fixed_elements
        .iter()
        .flatten()
        .any(|rect| rect.contains(engine_gaze.x, engine_gaze.y))
}

/// First overflow element under the gaze. Elements inside fixed containers
/// are tested without the scroll offset.
pub fn overflow_hit(
    elements: &[OverflowElement],
    engine_gaze: Vector2D<f32>,
    scroll_offset: Vector2D<f32>,
) -> Option<i32> {
    elements
        .iter()
        .find(|element| {
            let gaze = if element.fixed {
                engine_gaze
            } else {
                engine_gaze + scroll_offset
            };
            element.rects.iter().any(|rect| rect.contains(gaze.x, gaze.y))
        })
        .map(|element| element.id)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollIndicators {
    pub show_up: bool,
    pub show_down: bool,
    pub progress_up: f32,
    pub progress_down: f32,
}

/// Manual scroll affordances; hidden while auto scrolling is on.
pub fn scroll_indicators(
    auto_scrolling: bool,
    scroll_y: f32,
    page_height: f32,
    view_height: f32,
) -> ScrollIndicators {
    let show_up = !auto_scrolling && scroll_y > 0.0;
    let show_down = !auto_scrolling && (page_height - 1.0) > scroll_y + view_height;

    let scrollable = (page_height - 1.0) - view_height;
    let (progress_up, progress_down) = if scrollable > 0.0 {
        let up = scroll_y / scrollable;
        (up, 1.0 - up)
    } else {
        (1.0, 1.0)
    };

    ScrollIndicators {
        show_up,
        show_down,
        progress_up,
        progress_down,
    }
}
