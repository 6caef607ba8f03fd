//! Window pointer → web view → browser engine pixel space.
//!
//! The zoom transform mirrors what the web view shader does to the rendered
//! page, so hit testing happens on the content that is actually visible.

use euclid::default::{Point2D, Rect, Size2D, Vector2D};

use crate::models::input::{Input, TabInput};
use crate::models::page::WebViewParameters;

/// Visual zoom applied to relative web view coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomTransform {
    pub center_offset: Vector2D<f32>,
    pub anchor: Vector2D<f32>,
    pub zoom: f32,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self {
            center_offset: Vector2D::zero(),
            anchor: Vector2D::zero(),
            zoom: 1.0,
        }
    }
}

impl From<&WebViewParameters> for ZoomTransform {
    fn from(params: &WebViewParameters) -> Self {
        Self {
            center_offset: params.center_offset,
            anchor: params.zoom_position,
            zoom: params.zoom,
        }
    }
}

impl ZoomTransform {
    pub fn new(zoom: f32, anchor: Vector2D<f32>, center_offset: Vector2D<f32>) -> Self {
        Self {
            center_offset,
            anchor,
            zoom,
        }
    }

    /// Relative view coordinate → relative page coordinate.
    pub fn apply(&self, relative: Vector2D<f32>) -> Vector2D<f32> {
        let mut coordinate = relative + self.center_offset;
        coordinate -= self.anchor;
        coordinate *= self.zoom;
        coordinate + self.anchor
    }

    /// Relative page coordinate → relative view coordinate. Identity when the
    /// zoom factor is zero.
    pub fn invert(&self, relative: Vector2D<f32>) -> Vector2D<f32> {
        if self.zoom.abs() <= f32::EPSILON {
            return relative;
        }
        let mut coordinate = relative - self.anchor;
        coordinate /= self.zoom;
        coordinate + self.anchor - self.center_offset
    }

    /// Relative view coordinate → engine pixels (without scrolling).
    pub fn to_engine_pixels(&self, relative: Vector2D<f32>, resolution: Size2D<f32>) -> Vector2D<f32> {
        self.apply(relative).component_mul(resolution.to_vector())
    }
}

/// Per frame mapping for one tab. `view` is the on-screen web view rectangle
/// in window pixels, `resolution` the engine pixel size of the page viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TabCoordinateMapper {
    view: Rect<f32>,
    resolution: Size2D<f32>,
    scroll_offset: Vector2D<f32>,
}

impl TabCoordinateMapper {
    pub fn new(view: Rect<f32>, resolution_scale: f32, scroll_offset: Vector2D<f32>) -> Self {
        Self {
            view,
            resolution: view.size * resolution_scale,
            scroll_offset,
        }
    }

    pub fn view(&self) -> Rect<f32> {
        self.view
    }

    pub fn resolution(&self) -> Size2D<f32> {
        self.resolution
    }

    pub fn map_input(&self, input: Input) -> TabInput {
        let pixel_x = input.gaze_x - self.view.origin.x.round() as i32;
        let pixel_y = input.gaze_y - self.view.origin.y.round() as i32;
        let relative = self.relative(Point2D::new(pixel_x as f32, pixel_y as f32));
        TabInput::new(input, pixel_x, pixel_y, relative.x, relative.y)
    }

    /// View pixel offset → [0,1) per axis. Degenerate views map to (-1, -1),
    /// which is outside.
    pub fn relative(&self, view_pixel: Point2D<f32>) -> Vector2D<f32> {
        let size = self.view.size;
        if size.width <= 0.0 || size.height <= 0.0 {
            return Vector2D::new(-1.0, -1.0);
        }
        Vector2D::new(view_pixel.x / size.width, view_pixel.y / size.height)
    }

    pub fn to_engine_pixel(&self, relative: Vector2D<f32>, transform: &ZoomTransform) -> Vector2D<f32> {
        transform.to_engine_pixels(relative, self.resolution)
    }

    pub fn to_page_pixel(&self, relative: Vector2D<f32>, transform: &ZoomTransform) -> Vector2D<f32> {
        self.to_engine_pixel(relative, transform) + self.scroll_offset
    }

    /// Engine pixel (viewport, unscrolled) → view pixel, used for drawing.
    pub fn engine_to_view_pixel(&self, engine: Vector2D<f32>, transform: &ZoomTransform) -> Point2D<f32> {
        if self.resolution.width <= 0.0 || self.resolution.height <= 0.0 {
            return Point2D::origin();
        }
        let relative = Vector2D::new(
            engine.x / self.resolution.width,
            engine.y / self.resolution.height,
        );
        let view_relative = transform.invert(relative);
        Point2D::new(
            view_relative.x * self.view.size.width,
            view_relative.y * self.view.size.height,
        )
    }
}
