//! Per-tab queue of pipelines. Only the front pipeline runs; while the queue
//! is non-empty the tab is in pipeline mode.

use std::collections::VecDeque;

use crate::models::input::TabInput;
use crate::pipeline::pipeline::Pipeline;
use crate::tab::context::TabContext;
use crate::tab::draw::DrawList;

#[derive(Default)]
pub struct PipelineScheduler {
    queue: VecDeque<Pipeline>,
}

impl PipelineScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn front(&self) -> Option<&Pipeline> {
        self.queue.front()
    }

    /// Queues a pipeline. It is activated right away when the queue was empty.
    pub fn push_back(&mut self, mut pipeline: Pipeline, ctx: &mut TabContext) {
        log::info!(
            "scheduler: queued pipeline {} ({} waiting)",
            pipeline.name(),
            self.queue.len()
        );
        if self.queue.is_empty() {
            pipeline.activate(ctx);
        }
        self.queue.push_back(pipeline);
    }

    /// Updates the front pipeline. A finished pipeline is removed and its
    /// successor activated in the same frame; the successor gets its first
    /// update on the next call. Returns `true` when the queue ran empty.
    pub fn update(&mut self, tpf: f32, tab_input: &TabInput, ctx: &mut TabContext) -> bool {
        let Some(front) = self.queue.front_mut() else {
            return false;
        };
        if !front.update(tpf, tab_input, ctx) {
            return false;
        }

        if let Some(done) = self.queue.pop_front() {
            log::debug!("scheduler: pipeline {} done", done.name());
        }
        match self.queue.front_mut() {
            Some(next) => {
                next.activate(ctx);
                false
            }
            None => true,
        }
    }

    pub fn draw(&self, ctx: &TabContext, list: &mut DrawList) {
        if let Some(front) = self.queue.front() {
            front.draw(ctx, list);
        }
    }

    /// Unwinds every queued pipeline, front first.
    pub fn abort_and_clear(&mut self, ctx: &mut TabContext) {
        if self.queue.is_empty() {
            return;
        }
        log::info!("scheduler: aborting {} pipelines", self.queue.len());
        for mut pipeline in self.queue.drain(..) {
            pipeline.abort(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::TabSettings;
    use crate::pipeline::pipeline::PipelineState;
    use crate::pipeline::test_support::{tab_input, EventLog, RecordingAction};

    fn single(name: &'static str, log: &EventLog, finish_after: u32) -> Pipeline {
        Pipeline::new(name).with_action(Box::new(RecordingAction::producer(name, log, finish_after)))
    }

    fn updates_in(events: &[String]) -> usize {
        events.iter().filter(|event| event.contains(":update")).count()
    }

    #[test]
    fn promotes_next_pipeline_in_same_frame() {
        let log = EventLog::default();
        let mut ctx = TabContext::new(&TabSettings::default());
        let mut scheduler = PipelineScheduler::new();
        scheduler.push_back(single("first", &log, 2), &mut ctx);
        scheduler.push_back(single("second", &log, 5), &mut ctx);
        assert_eq!(log.events(), vec!["first:activate"]);

        // Frame 1
        assert!(!scheduler.update(0.016, &tab_input(), &mut ctx));
        // Frame 2: first finishes, second is activated but not updated.
        log.clear();
        assert!(!scheduler.update(0.016, &tab_input(), &mut ctx));
        assert_eq!(
            log.events(),
            vec!["first:update", "first:deactivate", "second:activate"]
        );
        assert_eq!(scheduler.len(), 1);
        assert_eq!(
            scheduler.front().map(|pipeline| pipeline.state()),
            Some(PipelineState::Active)
        );

        // Frame 3: second receives its first update.
        log.clear();
        scheduler.update(0.016, &tab_input(), &mut ctx);
        assert_eq!(log.events(), vec!["second:update"]);
    }

    #[test]
    fn at_most_one_action_updated_per_frame() {
        let log = EventLog::default();
        let mut ctx = TabContext::new(&TabSettings::default());
        let mut scheduler = PipelineScheduler::new();
        for name in ["a", "b", "c"] {
            scheduler.push_back(
                Pipeline::new(name)
                    .with_action(Box::new(RecordingAction::producer(name, &log, 1)))
                    .with_action(Box::new(RecordingAction::consumer("sink", &log))),
                &mut ctx,
            );
        }

        let mut frames = 0;
        while scheduler.is_active() {
            log.clear();
            let emptied = scheduler.update(0.016, &tab_input(), &mut ctx);
            assert_eq!(updates_in(&log.events()), 1);
            assert_eq!(emptied, !scheduler.is_active());

            let mut list = DrawList::new();
            log.clear();
            scheduler.draw(&ctx, &mut list);
            let draws = log.events().len();
            assert_eq!(draws, usize::from(scheduler.is_active()));

            frames += 1;
            assert!(frames < 20);
        }
        assert_eq!(frames, 6);
    }

    #[test]
    fn clearing_unwinds_current_action_once() {
        let log = EventLog::default();
        let mut ctx = TabContext::new(&TabSettings::default());
        let mut scheduler = PipelineScheduler::new();
        scheduler.push_back(single("running", &log, 100), &mut ctx);
        scheduler.push_back(single("queued", &log, 1), &mut ctx);
        scheduler.update(0.016, &tab_input(), &mut ctx);

        log.clear();
        scheduler.abort_and_clear(&mut ctx);
        assert!(!scheduler.is_active());
        assert_eq!(
            log.events(),
            vec!["running:abort", "running:deactivate", "queued:deactivate"]
        );

        log.clear();
        scheduler.update(0.016, &tab_input(), &mut ctx);
        scheduler.abort_and_clear(&mut ctx);
        assert!(log.events().is_empty());
    }
}
