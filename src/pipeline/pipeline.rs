//! Ordered chain of actions run one after another.

use std::collections::VecDeque;

use crate::models::input::TabInput;
use crate::models::settings::ZoomSettings;
use crate::pipeline::action::Action;
use crate::pipeline::actions::text_input::TEXT_SLOT;
use crate::pipeline::actions::{LeftMouseButtonClickAction, TextInputAction, ZoomCoordinateAction};
use crate::pipeline::slots::SlotValue;
use crate::tab::context::TabContext;
use crate::tab::draw::DrawList;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Inactive,
    Active,
    Finished,
    Aborted,
}

pub struct Pipeline {
    name: &'static str,
    actions: VecDeque<Box<dyn Action>>,
    state: PipelineState,
}

impl Pipeline {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            actions: VecDeque::new(),
            state: PipelineState::Inactive,
        }
    }

    pub fn with_action(mut self, action: Box<dyn Action>) -> Self {
        self.actions.push_back(action);
        self
    }

    /// Zoom toward the gaze, then click the resolved coordinate.
    pub fn zoom_click(settings: &ZoomSettings) -> Self {
        Self::new("zoom_click")
            .with_action(Box::new(ZoomCoordinateAction::new(settings)))
            .with_action(Box::new(LeftMouseButtonClickAction::new()))
    }

    /// Zoom, click into the text field, then type `text` into it.
    pub fn text_input(settings: &ZoomSettings, element_id: i32, text: &str, submit: bool) -> Self {
        let mut input = TextInputAction::new(element_id, submit);
        if let Err(err) = input
            .slots_mut()
            .set_input(TEXT_SLOT, SlotValue::Text(text.to_string()))
        {
            log::warn!("pipeline: text input without text: {err}");
        }
        Self::new("text_input")
            .with_action(Box::new(ZoomCoordinateAction::new(settings)))
            .with_action(Box::new(LeftMouseButtonClickAction::new()))
            .with_action(Box::new(input))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Actions not yet finished, the current one included.
    pub fn remaining(&self) -> usize {
        self.actions.len()
    }

    pub fn current_action(&self) -> Option<&dyn Action> {
        self.actions.front().map(|action| &**action)
    }

    pub fn activate(&mut self, ctx: &mut TabContext) {
        if self.state != PipelineState::Inactive {
            return;
        }
        match self.actions.front_mut() {
            Some(action) => {
                log::debug!("pipeline {}: activate, first action {}", self.name, action.name());
                self.state = PipelineState::Active;
                action.activate(ctx);
            }
            None => self.state = PipelineState::Finished,
        }
    }

    /// Updates the current action. Returns `true` once the pipeline is finished.
    pub fn update(&mut self, tpf: f32, tab_input: &TabInput, ctx: &mut TabContext) -> bool {
        if self.state != PipelineState::Active {
            return self.state == PipelineState::Finished;
        }

        let Some(current) = self.actions.front_mut() else {
            self.state = PipelineState::Finished;
            return true;
        };
        if !current.update(tpf, tab_input, ctx) {
            return false;
        }

        let Some(mut done) = self.actions.pop_front() else {
            return false;
        };
        done.deactivate(ctx);

        match self.actions.front_mut() {
            Some(next) => {
                let transferred = done.slots().transfer_to(next.slots_mut());
                log::debug!(
                    "pipeline {}: {} -> {} ({} slot values)",
                    self.name,
                    done.name(),
                    next.name(),
                    transferred
                );
                next.activate(ctx);
                false
            }
            None => {
                log::info!("pipeline {}: finished", self.name);
                self.state = PipelineState::Finished;
                true
            }
        }
    }

    pub fn draw(&self, ctx: &TabContext, list: &mut DrawList) {
        if self.state != PipelineState::Active {
            return;
        }
        if let Some(current) = self.actions.front() {
            current.draw(ctx, list);
        }
    }

    /// Aborts and deactivates the current action, deactivates the others.
    pub fn abort(&mut self, ctx: &mut TabContext) {
        let started = self.state == PipelineState::Active;
        let mut actions = std::mem::take(&mut self.actions).into_iter();

        if started {
            if let Some(mut current) = actions.next() {
                current.abort(ctx);
                current.deactivate(ctx);
            }
        }
        for mut pending in actions {
            pending.deactivate(ctx);
        }

        if matches!(self.state, PipelineState::Inactive | PipelineState::Active) {
            log::info!("pipeline {}: aborted", self.name);
            self.state = PipelineState::Aborted;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::TabSettings;
    use crate::pipeline::test_support::{tab_input, EventLog, RecordingAction};

    #[test]
    fn runs_actions_in_order_and_transfers_slots() {
        let log = EventLog::default();
        let mut ctx = TabContext::new(&TabSettings::default());
        let mut pipeline = Pipeline::new("test")
            .with_action(Box::new(RecordingAction::producer("a", &log, 1)))
            .with_action(Box::new(RecordingAction::consumer("b", &log)));

        pipeline.activate(&mut ctx);
        assert_eq!(pipeline.state(), PipelineState::Active);
        assert!(!pipeline.update(0.016, &tab_input(), &mut ctx));
        assert!(pipeline.update(0.016, &tab_input(), &mut ctx));
        assert_eq!(pipeline.state(), PipelineState::Finished);

        assert_eq!(
            log.events(),
            vec![
                "a:activate",
                "a:update",
                "a:deactivate",
                "b:activate",
                "b:update:got",
                "b:deactivate",
            ]
        );
    }

    #[test]
    fn draws_only_current_action() {
        let log = EventLog::default();
        let mut ctx = TabContext::new(&TabSettings::default());
        let mut pipeline = Pipeline::new("test")
            .with_action(Box::new(RecordingAction::producer("a", &log, 2)))
            .with_action(Box::new(RecordingAction::consumer("b", &log)));
        let mut list = DrawList::new();
        pipeline.draw(&ctx, &mut list);
        assert!(log.events().is_empty(), "inactive pipeline draws nothing");

        pipeline.activate(&mut ctx);
        pipeline.draw(&ctx, &mut list);
        assert_eq!(log.events(), vec!["a:activate", "a:draw"]);
    }

    #[test]
    fn abort_unwinds_current_and_pending_actions() {
        let log = EventLog::default();
        let mut ctx = TabContext::new(&TabSettings::default());
        let mut pipeline = Pipeline::new("test")
            .with_action(Box::new(RecordingAction::producer("a", &log, 10)))
            .with_action(Box::new(RecordingAction::consumer("b", &log)));
        pipeline.activate(&mut ctx);
        pipeline.update(0.016, &tab_input(), &mut ctx);
        pipeline.abort(&mut ctx);

        assert_eq!(pipeline.state(), PipelineState::Aborted);
        assert_eq!(pipeline.remaining(), 0);
        assert!(!pipeline.update(0.016, &tab_input(), &mut ctx));
        assert_eq!(
            log.events(),
            vec![
                "a:activate",
                "a:update",
                "a:abort",
                "a:deactivate",
                "b:deactivate",
            ]
        );
    }

    #[test]
    fn aborting_inactive_pipeline_only_deactivates() {
        let log = EventLog::default();
        let mut ctx = TabContext::new(&TabSettings::default());
        let mut pipeline =
            Pipeline::new("test").with_action(Box::new(RecordingAction::producer("a", &log, 1)));
        pipeline.abort(&mut ctx);
        assert_eq!(log.events(), vec!["a:deactivate"]);
    }

    #[test]
    fn empty_pipeline_finishes_on_activation() {
        let mut ctx = TabContext::new(&TabSettings::default());
        let mut pipeline = Pipeline::new("empty");
        pipeline.activate(&mut ctx);
        assert_eq!(pipeline.state(), PipelineState::Finished);
        assert!(pipeline.update(0.016, &tab_input(), &mut ctx));
    }

    #[test]
    fn builders_chain_expected_actions() {
        let settings = ZoomSettings::default();
        let zoom_click = Pipeline::zoom_click(&settings);
        assert_eq!(zoom_click.remaining(), 2);
        assert_eq!(
            zoom_click.current_action().map(|action| action.name()),
            Some("zoom_coordinate")
        );

        let text = Pipeline::text_input(&settings, 3, "hello", false);
        assert_eq!(text.remaining(), 3);
        assert_eq!(text.name(), "text_input");
    }
}
