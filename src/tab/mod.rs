//! One browser tab: web view geometry, the standard gaze UI and the queue of
//! interaction pipelines that replaces it while running.

pub mod context;
pub mod draw;

use euclid::default::Vector2D;
use uuid::Uuid;

use crate::algorithm::auto_scroll::{
    auto_scroll_target, gaze_upon_fixed, overflow_hit, scroll_indicators, AutoScroller,
    ScrollIndicators,
};
use crate::algorithm::coordinate_mapper::ZoomTransform;
use crate::bridge::{BrowserBridge, LayoutHost, LayoutRegion, WEB_VIEW_ELEMENT};
use crate::models::input::{Input, TabInput};
use crate::models::page::{BrowserCommand, Navigation};
use crate::models::settings::{TabSettings, ZoomSettings};
use crate::pipeline::{Pipeline, PipelineScheduler};

use context::TabContext;
use draw::{DrawCommand, DrawList};

pub struct Tab {
    id: Uuid,
    url: String,
    zoom_settings: ZoomSettings,
    context: TabContext,
    scheduler: PipelineScheduler,
    bridge: Box<dyn BrowserBridge>,
    auto_scrolling: bool,
    gaze_mouse: bool,
    auto_scroller: AutoScroller,
    time_until_page_resolution: f32,
    gaze_upon_fixed: bool,
    indicators: ScrollIndicators,
    last_tab_input: Option<TabInput>,
}

impl Tab {
    pub fn new(
        url: &str,
        tab_settings: &TabSettings,
        zoom_settings: &ZoomSettings,
        bridge: Box<dyn BrowserBridge>,
    ) -> Self {
        let id = Uuid::new_v4();
        log::info!("tab {id}: created for {url}");
        let mut tab = Self {
            id,
            url: String::new(),
            zoom_settings: zoom_settings.clone(),
            context: TabContext::new(tab_settings),
            scheduler: PipelineScheduler::new(),
            bridge,
            auto_scrolling: tab_settings.auto_scrolling,
            gaze_mouse: tab_settings.gaze_mouse,
            auto_scroller: AutoScroller::default(),
            time_until_page_resolution: 0.0,
            gaze_upon_fixed: false,
            indicators: scroll_indicators(tab_settings.auto_scrolling, 0.0, 0.0, 0.0),
            last_tab_input: None,
        };
        tab.open_url(url);
        tab
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn context(&self) -> &TabContext {
        &self.context
    }

    pub fn is_pipeline_active(&self) -> bool {
        self.scheduler.is_active()
    }

    pub fn queued_pipelines(&self) -> usize {
        self.scheduler.len()
    }

    pub fn scroll_indicators(&self) -> ScrollIndicators {
        self.indicators
    }

    pub fn is_gaze_upon_fixed(&self) -> bool {
        self.gaze_upon_fixed
    }

    pub fn auto_scroll_value(&self) -> f32 {
        self.auto_scroller.value()
    }

    pub fn last_tab_input(&self) -> Option<TabInput> {
        self.last_tab_input
    }

    pub fn set_auto_scrolling(&mut self, enabled: bool) {
        self.auto_scrolling = enabled;
    }

    pub fn set_gaze_mouse(&mut self, enabled: bool) {
        self.gaze_mouse = enabled;
    }

    // Frame

    pub fn update(&mut self, tpf: f32, input: Input, layout: &mut dyn LayoutHost) {
        match layout.element_rect(WEB_VIEW_ELEMENT) {
            Some(view) => self.context.view = view,
            None => log::warn!("tab {}: layout has no {WEB_VIEW_ELEMENT} element", self.id),
        }

        self.context.fade_click_visualizations(tpf);

        let tab_input = self.context.mapper().map_input(input);
        self.last_tab_input = Some(tab_input);

        if self.scheduler.is_active() {
            layout.set_input_usage(LayoutRegion::StandardPanel, false);
            layout.set_input_usage(LayoutRegion::PipelineAbort, true);

            if self.scheduler.update(tpf, &tab_input, &mut self.context) {
                log::info!("tab {}: all pipelines done, back to standard mode", self.id);
                layout.set_input_usage(LayoutRegion::StandardPanel, true);
                layout.set_input_usage(LayoutRegion::PipelineAbort, false);
            }
        } else {
            layout.set_input_usage(LayoutRegion::StandardPanel, true);
            layout.set_input_usage(LayoutRegion::PipelineAbort, false);
            self.update_standard(tpf, &tab_input);
        }

        self.flush_commands();
    }

    fn update_standard(&mut self, tpf: f32, tab_input: &TabInput) {
        self.time_until_page_resolution -= tpf;
        if self.time_until_page_resolution <= 0.0 {
            self.time_until_page_resolution = self.context.settings.page_resolution_interval;
            let page_size = self.bridge.page_size();
            if page_size != self.context.page_size {
                log::info!(
                    "tab {}: page size {}x{}",
                    self.id,
                    page_size.width,
                    page_size.height
                );
                self.context.page_size = page_size;
            }
        }

        self.context.scroll_offset = self.bridge.scroll_offset();
        self.context.fixed_elements = self.bridge.fixed_elements();
        self.context.overflow_elements = self.bridge.overflow_elements();

        let mapper = self.context.mapper();
        self.indicators = scroll_indicators(
            self.auto_scrolling,
            self.context.scroll_offset.y,
            self.context.page_size.height,
            mapper.resolution().height,
        );

        let relative = Vector2D::new(
            tab_input.web_view_gaze_relative_x,
            tab_input.web_view_gaze_relative_y,
        );
        let transform = ZoomTransform::from(&self.context.web_view_parameters);
        let engine_gaze = mapper.to_engine_pixel(relative, &transform);

        if self.gaze_mouse && tab_input.inside_web_view {
            self.context.dispatch(BrowserCommand::MouseMove {
                x: engine_gaze.x as f64,
                y: engine_gaze.y as f64,
            });
        }

        self.gaze_upon_fixed = gaze_upon_fixed(&self.context.fixed_elements, engine_gaze);

        let target = (self.auto_scrolling && tab_input.usable() && !self.gaze_upon_fixed)
            .then(|| auto_scroll_target(tab_input.web_view_gaze_relative_y));
        let value = self.auto_scroller.update(tpf, target);
        if value != 0.0 {
            self.context.dispatch(BrowserCommand::MouseWheel {
                dx: 0.0,
                dy: (self.context.settings.auto_scroll_wheel_factor * value) as f64,
            });
        }

        if tab_input.usable() {
            if let Some(id) = overflow_hit(
                &self.context.overflow_elements,
                engine_gaze,
                self.context.scroll_offset,
            ) {
                self.context.dispatch(BrowserCommand::ScrollOverflowElement {
                    id,
                    x: engine_gaze.x as f64,
                    y: engine_gaze.y as f64,
                });
            }
        }
    }

    pub fn draw(&self, list: &mut DrawList) {
        list.push(DrawCommand::WebView {
            params: self.context.web_view_parameters,
            scroll_offset: self.context.scroll_offset,
        });

        if self.scheduler.is_active() {
            self.scheduler.draw(&self.context, list);
            list.push(DrawCommand::PipelineAbortOverlay);
        } else {
            list.push(DrawCommand::ScrollIndicators(self.indicators));
        }

        let duration = self.context.settings.click_visualization_duration;
        for visualization in &self.context.click_visualizations {
            let relative_size = if duration > 0.0 {
                visualization.fading / duration
            } else {
                0.0
            };
            list.push(DrawCommand::ClickVisualization {
                center: visualization.position,
                relative_size,
            });
        }
    }

    fn flush_commands(&mut self) {
        for command in self.context.take_commands() {
            self.bridge.dispatch(command);
        }
    }

    // Pipelines

    pub fn push_back_pipeline(&mut self, pipeline: Pipeline) {
        self.scheduler.push_back(pipeline, &mut self.context);
        self.auto_scroller.reset();
        self.flush_commands();
    }

    pub fn push_zoom_click_pipeline(&mut self) {
        let pipeline = Pipeline::zoom_click(&self.zoom_settings);
        self.push_back_pipeline(pipeline);
    }

    pub fn push_text_input_pipeline(&mut self, element_id: i32, text: &str, submit: bool) {
        let pipeline = Pipeline::text_input(&self.zoom_settings, element_id, text, submit);
        self.push_back_pipeline(pipeline);
    }

    /// Tab leaves the foreground. Running pipelines do not survive that.
    pub fn deactivate(&mut self) {
        if self.scheduler.is_active() {
            log::info!("tab {}: deactivated, aborting pipelines", self.id);
        }
        self.abort_and_clear_pipelines();
        self.auto_scroller.reset();
    }

    pub fn abort_and_clear_pipelines(&mut self) {
        self.scheduler.abort_and_clear(&mut self.context);
        self.context.reset_web_view_parameters();
        self.flush_commands();
    }

    // Navigation

    pub fn open_url(&mut self, url: &str) {
        log::info!("tab {}: open {url}", self.id);
        self.url = url.to_string();
        self.abort_and_clear_pipelines();
        self.bridge.dispatch(BrowserCommand::Navigate {
            navigation: Navigation::OpenUrl {
                url: url.to_string(),
            },
        });
        self.context.scroll_offset = Vector2D::zero();
        self.auto_scroller.reset();
    }

    pub fn reload(&mut self) {
        self.bridge.dispatch(BrowserCommand::Navigate {
            navigation: Navigation::Reload,
        });
        self.abort_and_clear_pipelines();
    }

    pub fn go_back(&mut self) {
        self.bridge.dispatch(BrowserCommand::Navigate {
            navigation: Navigation::Back,
        });
    }

    pub fn go_forward(&mut self) {
        self.bridge.dispatch(BrowserCommand::Navigate {
            navigation: Navigation::Forward,
        });
    }
}

impl Drop for Tab {
    fn drop(&mut self) {
        self.abort_and_clear_pipelines();
        log::info!("tab {}: closed", self.id);
    }
}
