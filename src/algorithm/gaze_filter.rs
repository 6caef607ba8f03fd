use std::collections::VecDeque;

use crate::models::input::Sample;
use crate::models::settings::FilterSettings;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilteredGaze {
    pub x: f64,
    pub y: f64,
    /// A fast eye movement happened inside the consumed batch.
    pub saccade: bool,
}

/// Moving average over the most recent samples, restarted on saccades so the
/// output jumps to a new fixation instead of smearing between two of them.
#[derive(Debug, Clone)]
pub struct GazeFilter {
    window: VecDeque<Sample>,
    window_size: usize,
    saccade_threshold: f64,
    output: (f64, f64),
}

impl GazeFilter {
    pub fn new(settings: &FilterSettings) -> Self {
        let window_size = settings.window_size.max(1);
        Self {
            window: VecDeque::with_capacity(window_size),
            window_size,
            saccade_threshold: settings.saccade_threshold,
            output: (0.0, 0.0),
        }
    }

    /// Consumes the samples that arrived since the last frame. An empty batch
    /// keeps the previous output.
    pub fn update(&mut self, samples: &[Sample]) -> FilteredGaze {
        let mut saccade = false;

        for sample in samples
            .iter()
            .filter(|sample| sample.x.is_finite() && sample.y.is_finite())
        {
            if let Some(previous) = self.window.back() {
                if previous.distance(sample) > self.saccade_threshold {
                    saccade = true;
                    self.window.clear();
                }
            }

            self.window.push_back(*sample);
            while self.window.len() > self.window_size {
                self.window.pop_front();
            }
        }

        if !self.window.is_empty() {
            let count = self.window.len() as f64;
            let (sum_x, sum_y) = self
                .window
                .iter()
                .fold((0.0, 0.0), |(x, y), sample| (x + sample.x, y + sample.y));
            self.output = (sum_x / count, sum_y / count);
        }

        FilteredGaze {
            x: self.output.0,
            y: self.output.1,
            saccade,
        }
    }

    pub fn reset(&mut self) {
        self.window.clear();
        self.output = (0.0, 0.0);
    }
}
