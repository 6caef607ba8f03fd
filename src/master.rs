//! Frame host: owns the input layer, the window layout and the tabs.

use euclid::default::Size2D;
use uuid::Uuid;

use crate::algorithm::gaze_filter::{FilteredGaze, GazeFilter};
use crate::algorithm::input_fusion::{FusionFrame, InputFusion};
use crate::bridge::{BrowserBridge, HeadlessBridge, LayoutHost, StaticLayout, WEB_VIEW_ELEMENT};
use crate::models::input::{Input, Sample};
use crate::models::settings::{Settings, WindowSettings};
use crate::tab::draw::DrawList;
use crate::tab::Tab;
use crate::tracker::eye_input::EyeInput;
use crate::tracker::mouse::MousePosition;

/// Height of the standard panel above the web view in window pixels.
pub const STANDARD_PANEL_HEIGHT: f32 = 96.0;

pub struct Master {
    settings: Settings,
    eye_input: Option<EyeInput>,
    filter: GazeFilter,
    fusion: InputFusion,
    mouse: MousePosition,
    layout: StaticLayout,
    tabs: Vec<Tab>,
    active_tab: Option<usize>,
    tracker_was_connected: bool,
    last_input: Option<Input>,
}

impl Master {
    pub fn new(settings: Settings, eye_input: Option<EyeInput>, mouse: MousePosition) -> Self {
        let layout = StaticLayout::browser(window_size(&settings.window), STANDARD_PANEL_HEIGHT);
        Self {
            filter: GazeFilter::new(&settings.filter),
            fusion: InputFusion::new(&settings.input),
            settings,
            eye_input,
            mouse,
            layout,
            tabs: Vec::new(),
            active_tab: None,
            tracker_was_connected: false,
            last_input: None,
        }
    }

    /// Starts the tracker thread. Without a thread the master runs on the mouse.
    pub fn start(settings: Settings, mouse: MousePosition) -> Self {
        let eye_input = match EyeInput::start(&settings.tracker) {
            Ok(eye_input) => Some(eye_input),
            Err(e) => {
                log::error!("master: failed to spawn tracker thread: {e}");
                None
            }
        };
        Self::new(settings, eye_input, mouse)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn layout(&self) -> &StaticLayout {
        &self.layout
    }

    pub fn last_input(&self) -> Option<Input> {
        self.last_input
    }

    pub fn calibrate(&self) -> bool {
        match &self.eye_input {
            Some(eye_input) => eye_input.calibrate(),
            None => false,
        }
    }

    // Tabs

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.active_tab.and_then(|index| self.tabs.get(index))
    }

    pub fn active_tab_mut(&mut self) -> Option<&mut Tab> {
        self.active_tab.and_then(|index| self.tabs.get_mut(index))
    }

    /// Opens a tab on an in-memory page sized like the web view.
    pub fn open_tab(&mut self, url: &str) -> Uuid {
        let viewport = self
            .layout
            .element_rect(WEB_VIEW_ELEMENT)
            .map(|rect| rect.size * self.settings.tab.web_view_resolution_scale)
            .unwrap_or_else(Size2D::zero);
        self.add_tab(url, Box::new(HeadlessBridge::new(viewport, viewport)))
    }

    /// Adds a tab and makes it the active one.
    pub fn add_tab(&mut self, url: &str, bridge: Box<dyn BrowserBridge>) -> Uuid {
        let tab = Tab::new(url, &self.settings.tab, &self.settings.zoom, bridge);
        let id = tab.id();
        self.tabs.push(tab);
        self.activate_index(self.tabs.len() - 1);
        id
    }

    pub fn switch_tab(&mut self, id: Uuid) -> bool {
        match self.tabs.iter().position(|tab| tab.id() == id) {
            Some(index) => {
                self.activate_index(index);
                true
            }
            None => false,
        }
    }

    fn activate_index(&mut self, index: usize) {
        if let Some(previous) = self.active_tab.filter(|previous| *previous != index) {
            if let Some(tab) = self.tabs.get_mut(previous) {
                tab.deactivate();
            }
        }
        self.active_tab = Some(index);
    }

    /// Drops the tab, which aborts its pipelines.
    pub fn close_tab(&mut self, id: Uuid) -> bool {
        let Some(index) = self.tabs.iter().position(|tab| tab.id() == id) else {
            return false;
        };
        self.tabs.remove(index);
        self.active_tab = match self.active_tab {
            _ if self.tabs.is_empty() => None,
            Some(active) if active > index => Some(active - 1),
            Some(active) => Some(active.min(self.tabs.len() - 1)),
            None => None,
        };
        true
    }

    // Frame

    /// Runs one frame: input layer, then update and draw of the active tab.
    pub fn frame(&mut self, tpf: f32, instant_interaction: bool) -> DrawList {
        let input = self.resolve_input(tpf, instant_interaction);
        self.last_input = Some(input);

        let mut list = DrawList::new();
        let Some(index) = self.active_tab else {
            return list;
        };
        if let Some(tab) = self.tabs.get_mut(index) {
            tab.update(tpf, input, &mut self.layout);
            tab.draw(&mut list);
        }
        list
    }

    fn resolve_input(&mut self, tpf: f32, instant_interaction: bool) -> Input {
        let (samples, connected, tracking) = match self.eye_input.as_mut() {
            Some(eye_input) => {
                let samples = eye_input.drain_samples();
                (samples, eye_input.is_connected(), eye_input.is_tracking())
            }
            None => (Vec::new(), false, false),
        };

        if self.tracker_was_connected && !connected {
            log::info!("master: tracker gone, emulating gaze with the mouse");
            self.filter.reset();
        }
        self.tracker_was_connected = connected;

        let filtered = if connected {
            let window_samples: Vec<Sample> = samples
                .iter()
                .map(|sample| self.to_window_sample(sample))
                .collect();
            self.filter.update(&window_samples)
        } else {
            FilteredGaze {
                x: 0.0,
                y: 0.0,
                saccade: false,
            }
        };

        let (mouse_x, mouse_y) = self.mouse.get();
        let pointer = self.fusion.update(FusionFrame {
            gaze_x: filtered.x,
            gaze_y: filtered.y,
            tracker_connected: connected,
            tracking,
            mouse_x: mouse_x - self.settings.window.x as f64,
            mouse_y: mouse_y - self.settings.window.y as f64,
            tpf,
        });

        let mut input = Input::new(
            pointer.x.round() as i32,
            pointer.y.round() as i32,
            pointer.gaze_used,
        );
        input.instant_interaction = instant_interaction;
        input.saccade = pointer.gaze_used && filtered.saccade;
        input.gui_consumed = self
            .layout
            .consumes_pointer(pointer.x as f32, pointer.y as f32);
        input
    }

    /// Screen sample → window space, clamped into the window.
    fn to_window_sample(&self, sample: &Sample) -> Sample {
        let window = &self.settings.window;
        Sample {
            x: (sample.x - window.x as f64).clamp(0.0, window.width as f64),
            y: (sample.y - window.y as f64).clamp(0.0, window.height as f64),
            timestamp_ms: sample.timestamp_ms,
        }
    }
}

fn window_size(window: &WindowSettings) -> Size2D<f32> {
    Size2D::new(window.width as f32, window.height as f32)
}
