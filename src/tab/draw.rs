//! Render commands produced by tabs and actions for the overlay host.

use euclid::default::{Point2D, Size2D, Vector2D};

use crate::algorithm::auto_scroll::ScrollIndicators;
use crate::models::page::WebViewParameters;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Page content with the visual zoom of the active action.
    WebView {
        params: WebViewParameters,
        scroll_offset: Vector2D<f32>,
    },
    /// Small debug rectangle centred on a web view pixel.
    Marker {
        center: Point2D<f32>,
        size: Size2D<f32>,
        color: [f32; 3],
    },
    /// Shrinking circle at the position of a past click. `relative_size`
    /// goes from one to zero while the visualization fades.
    ClickVisualization {
        center: Point2D<f32>,
        relative_size: f32,
    },
    ScrollIndicators(ScrollIndicators),
    /// Control that aborts all pipelines of the tab.
    PipelineAbortOverlay,
}

pub type DrawList = Vec<DrawCommand>;
