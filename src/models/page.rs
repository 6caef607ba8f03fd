//! Page geometry and commands exchanged with the browser engine.

use euclid::default::{Point2D, Rect, Size2D, Vector2D};
use serde::{Deserialize, Serialize};

/// Axis aligned rectangle in engine pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl PageRect {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    pub fn to_rect(self) -> Rect<f32> {
        Rect::new(
            Point2D::new(self.left, self.top),
            Size2D::new(self.right - self.left, self.bottom - self.top),
        )
    }
}

/// Element with its own scrollable overflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverflowElement {
    pub id: i32,
    pub rects: Vec<PageRect>,
    /// Element belongs to a fixed container and does not move with the page.
    #[serde(default)]
    pub fixed: bool,
}

/// Visual transform applied to the web view while zooming.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WebViewParameters {
    pub center_offset: Vector2D<f32>,
    pub zoom: f32,
    pub zoom_position: Vector2D<f32>,
    pub dim: f32,
}

impl Default for WebViewParameters {
    fn default() -> Self {
        Self {
            center_offset: Vector2D::zero(),
            zoom: 1.0,
            zoom_position: Vector2D::zero(),
            dim: 0.0,
        }
    }
}

impl WebViewParameters {
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Navigation {
    Back,
    Forward,
    Reload,
    OpenUrl { url: String },
}

/// Fire-and-forget command for the browser engine. Coordinates are engine
/// pixels relative to the web view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BrowserCommand {
    LeftClick {
        x: f64,
        y: f64,
    },
    MouseMove {
        x: f64,
        y: f64,
    },
    MouseWheel {
        dx: f64,
        dy: f64,
    },
    ScrollOverflowElement {
        id: i32,
        x: f64,
        y: f64,
    },
    InputText {
        #[serde(rename = "elementId")]
        element_id: i32,
        text: String,
        submit: bool,
    },
    Navigate {
        navigation: Navigation,
    },
}
