//! Interfaces to the browser engine and to the GUI layout host, plus
//! in-memory implementations used by the binary and the tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use euclid::default::{Point2D, Rect, Size2D, Vector2D};

use crate::models::page::{BrowserCommand, Navigation, OverflowElement, PageRect};

/// Name of the web view element in the tab layout.
pub const WEB_VIEW_ELEMENT: &str = "web_view";

/// Browser engine side of a tab. Geometry is in engine pixels.
pub trait BrowserBridge {
    fn page_size(&mut self) -> Size2D<f32>;

    fn scroll_offset(&mut self) -> Vector2D<f32>;

    /// Rectangles of fixed elements, grouped per fixed container.
    fn fixed_elements(&mut self) -> Vec<Vec<PageRect>>;

    fn overflow_elements(&mut self) -> Vec<OverflowElement>;

    fn dispatch(&mut self, command: BrowserCommand);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutRegion {
    /// Regular tab controls.
    StandardPanel,
    /// Control that aborts running pipelines.
    PipelineAbort,
}

/// GUI host that owns the window layout.
pub trait LayoutHost {
    /// Window pixel rectangle of a named layout element.
    fn element_rect(&self, name: &str) -> Option<Rect<f32>>;

    fn set_input_usage(&mut self, region: LayoutRegion, enabled: bool);

    /// Some enabled GUI element takes the pointer at this window position.
    fn consumes_pointer(&self, x: f32, y: f32) -> bool;
}

// Headless browser

#[derive(Debug, Clone, Default)]
pub struct HeadlessPage {
    pub url: String,
    pub page_size: Size2D<f32>,
    pub viewport: Size2D<f32>,
    pub scroll_offset: Vector2D<f32>,
    pub fixed_elements: Vec<Vec<PageRect>>,
    pub overflow_elements: Vec<OverflowElement>,
    pub dispatched: Vec<BrowserCommand>,
}

impl HeadlessPage {
    fn scroll_by(&mut self, dx: f32, dy: f32) {
        let max_x = (self.page_size.width - self.viewport.width).max(0.0);
        let max_y = (self.page_size.height - self.viewport.height).max(0.0);
        self.scroll_offset = Vector2D::new(
            (self.scroll_offset.x - dx).clamp(0.0, max_x),
            (self.scroll_offset.y - dy).clamp(0.0, max_y),
        );
    }
}

/// Page kept in memory. Clones share the same page, so a test can keep one
/// handle while the tab owns another.
#[derive(Debug, Clone, Default)]
pub struct HeadlessBridge {
    page: Arc<Mutex<HeadlessPage>>,
}

impl HeadlessBridge {
    pub fn new(page_size: Size2D<f32>, viewport: Size2D<f32>) -> Self {
        Self {
            page: Arc::new(Mutex::new(HeadlessPage {
                page_size,
                viewport,
                ..HeadlessPage::default()
            })),
        }
    }

    pub fn page(&self) -> MutexGuard<'_, HeadlessPage> {
        match self.page.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn take_dispatched(&self) -> Vec<BrowserCommand> {
        std::mem::take(&mut self.page().dispatched)
    }
}

impl BrowserBridge for HeadlessBridge {
    fn page_size(&mut self) -> Size2D<f32> {
        self.page().page_size
    }

    fn scroll_offset(&mut self) -> Vector2D<f32> {
        self.page().scroll_offset
    }

    fn fixed_elements(&mut self) -> Vec<Vec<PageRect>> {
        self.page().fixed_elements.clone()
    }

    fn overflow_elements(&mut self) -> Vec<OverflowElement> {
        self.page().overflow_elements.clone()
    }

    fn dispatch(&mut self, command: BrowserCommand) {
        log::debug!("bridge: {:?}", command);
        let mut page = self.page();
        match &command {
            BrowserCommand::MouseWheel { dx, dy } => page.scroll_by(*dx as f32, *dy as f32),
            BrowserCommand::Navigate {
                navigation: Navigation::OpenUrl { url },
            } => {
                page.url = url.clone();
                page.scroll_offset = Vector2D::zero();
            }
            _ => {}
        }
        page.dispatched.push(command);
    }
}

// Static layout

/// Fixed element rectangles. Regions listed in `gui_regions` consume the
/// pointer while the standard panel takes input.
#[derive(Debug, Clone, Default)]
pub struct StaticLayout {
    elements: HashMap<String, Rect<f32>>,
    panel_regions: Vec<Rect<f32>>,
    abort_regions: Vec<Rect<f32>>,
    input_usage: HashMap<LayoutRegion, bool>,
}

impl StaticLayout {
    /// Web view filling the window below a panel of `panel_height` pixels.
    pub fn browser(window: Size2D<f32>, panel_height: f32) -> Self {
        let panel = Rect::new(Point2D::origin(), Size2D::new(window.width, panel_height));
        let web_view = Rect::new(
            Point2D::new(0.0, panel_height),
            Size2D::new(window.width, (window.height - panel_height).max(0.0)),
        );
        let mut layout = Self::default();
        layout.elements.insert(WEB_VIEW_ELEMENT.to_string(), web_view);
        layout.panel_regions.push(panel);
        layout.abort_regions.push(panel);
        layout.input_usage.insert(LayoutRegion::StandardPanel, true);
        layout.input_usage.insert(LayoutRegion::PipelineAbort, false);
        layout
    }

    pub fn with_element(mut self, name: &str, rect: Rect<f32>) -> Self {
        self.elements.insert(name.to_string(), rect);
        self
    }

    pub fn input_enabled(&self, region: LayoutRegion) -> bool {
        self.input_usage.get(&region).copied().unwrap_or(false)
    }

    fn regions(&self, region: LayoutRegion) -> &[Rect<f32>] {
        match region {
            LayoutRegion::StandardPanel => &self.panel_regions,
            LayoutRegion::PipelineAbort => &self.abort_regions,
        }
    }
}

impl LayoutHost for StaticLayout {
    fn element_rect(&self, name: &str) -> Option<Rect<f32>> {
        self.elements.get(name).copied()
    }

    fn set_input_usage(&mut self, region: LayoutRegion, enabled: bool) {
        let previous = self.input_usage.insert(region, enabled);
        if previous != Some(enabled) {
            log::debug!("layout: {:?} input {}", region, if enabled { "on" } else { "off" });
        }
    }

    fn consumes_pointer(&self, x: f32, y: f32) -> bool {
        let point = Point2D::new(x, y);
        [LayoutRegion::StandardPanel, LayoutRegion::PipelineAbort]
            .into_iter()
            .filter(|region| self.input_enabled(*region))
            .any(|region| self.regions(region).iter().any(|rect| rect.contains(point)))
    }
}
