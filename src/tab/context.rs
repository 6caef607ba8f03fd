//! Per-tab state shared with the actions of the tab's pipelines.

use euclid::default::{Point2D, Rect, Size2D, Vector2D};

use crate::algorithm::coordinate_mapper::TabCoordinateMapper;
use crate::models::page::{BrowserCommand, OverflowElement, PageRect, WebViewParameters};
use crate::models::settings::TabSettings;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickVisualization {
    /// Web view pixel position of the click.
    pub position: Point2D<f32>,
    /// Remaining seconds until the visualization disappears.
    pub fading: f32,
}

#[derive(Debug, Clone)]
pub struct TabContext {
    pub settings: TabSettings,
    /// On-screen web view rectangle in window pixels.
    pub view: Rect<f32>,
    pub scroll_offset: Vector2D<f32>,
    pub page_size: Size2D<f32>,
    pub web_view_parameters: WebViewParameters,
    pub fixed_elements: Vec<Vec<PageRect>>,
    pub overflow_elements: Vec<OverflowElement>,
    pub click_visualizations: Vec<ClickVisualization>,
    commands: Vec<BrowserCommand>,
}

impl TabContext {
    pub fn new(settings: &TabSettings) -> Self {
        Self {
            settings: settings.clone(),
            view: Rect::zero(),
            scroll_offset: Vector2D::zero(),
            page_size: Size2D::zero(),
            web_view_parameters: WebViewParameters::default(),
            fixed_elements: Vec::new(),
            overflow_elements: Vec::new(),
            click_visualizations: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn mapper(&self) -> TabCoordinateMapper {
        TabCoordinateMapper::new(
            self.view,
            self.settings.web_view_resolution_scale,
            self.scroll_offset,
        )
    }

    /// Engine pixel size of the visible viewport.
    pub fn web_view_resolution(&self) -> Size2D<f32> {
        self.view.size * self.settings.web_view_resolution_scale
    }

    /// Queues a command; the tab forwards it to the bridge at the end of the frame.
    pub fn dispatch(&mut self, command: BrowserCommand) {
        self.commands.push(command);
    }

    pub fn pending_commands(&self) -> &[BrowserCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<BrowserCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn reset_web_view_parameters(&mut self) {
        self.web_view_parameters = WebViewParameters::default();
    }

    pub fn push_click_visualization(&mut self, position: Point2D<f32>) {
        self.click_visualizations.push(ClickVisualization {
            position,
            fading: self.settings.click_visualization_duration,
        });
    }

    pub fn fade_click_visualizations(&mut self, tpf: f32) {
        for visualization in self.click_visualizations.iter_mut() {
            visualization.fading -= tpf;
        }
        self.click_visualizations
            .retain(|visualization| visualization.fading > 0.0);
    }
}
