pub mod action;
pub mod actions;
#[allow(clippy::module_inception)]
pub mod pipeline;
pub mod scheduler;
pub mod slots;

pub use action::Action;
pub use pipeline::{Pipeline, PipelineState};
pub use scheduler::PipelineScheduler;

#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::action::Action;
    use super::slots::{SlotKind, SlotValue, Slots};
    use crate::models::input::{Input, TabInput};
    use crate::tab::context::TabContext;
    use crate::tab::draw::DrawList;

    pub fn tab_input() -> TabInput {
        TabInput::new(Input::new(100, 100, true), 100, 100, 0.5, 0.5)
    }

    /// Lifecycle calls of every action of a test, in call order.
    #[derive(Clone, Default)]
    pub struct EventLog(Rc<RefCell<Vec<String>>>);

    impl EventLog {
        pub fn push(&self, event: String) {
            self.0.borrow_mut().push(event);
        }

        pub fn events(&self) -> Vec<String> {
            self.0.borrow().clone()
        }

        pub fn clear(&self) {
            self.0.borrow_mut().clear();
        }
    }

    /// Writes output `value` and finishes on its `finish_after`th update, or
    /// (as consumer) finishes on its first update and logs whether input
    /// `value` arrived.
    pub struct RecordingAction {
        name: &'static str,
        log: EventLog,
        slots: Slots,
        finish_after: Option<u32>,
        updates: u32,
    }

    impl RecordingAction {
        pub fn producer(name: &'static str, log: &EventLog, finish_after: u32) -> Self {
            Self {
                name,
                log: log.clone(),
                slots: Slots::new().with_output("value", SlotKind::Int),
                finish_after: Some(finish_after),
                updates: 0,
            }
        }

        pub fn consumer(name: &'static str, log: &EventLog) -> Self {
            Self {
                name,
                log: log.clone(),
                slots: Slots::new().with_input("value", SlotKind::Int),
                finish_after: None,
                updates: 0,
            }
        }
    }

    impl Action for RecordingAction {
        fn name(&self) -> &'static str {
            self.name
        }

        fn slots(&self) -> &Slots {
            &self.slots
        }

        fn slots_mut(&mut self) -> &mut Slots {
            &mut self.slots
        }

        fn update(&mut self, _tpf: f32, _tab_input: &TabInput, _ctx: &mut TabContext) -> bool {
            self.updates += 1;
            match self.finish_after {
                Some(finish_after) => {
                    self.log.push(format!("{}:update", self.name));
                    if self.updates >= finish_after {
                        self.slots
                            .set_output("value", SlotValue::Int(self.updates as i32))
                            .expect("declared output");
                        true
                    } else {
                        false
                    }
                }
                None => {
                    let got = if self.slots.input("value").is_some() {
                        "got"
                    } else {
                        "none"
                    };
                    self.log.push(format!("{}:update:{}", self.name, got));
                    true
                }
            }
        }

        fn draw(&self, _ctx: &TabContext, _list: &mut DrawList) {
            self.log.push(format!("{}:draw", self.name));
        }

        fn activate(&mut self, _ctx: &mut TabContext) {
            self.log.push(format!("{}:activate", self.name));
        }

        fn deactivate(&mut self, _ctx: &mut TabContext) {
            self.log.push(format!("{}:deactivate", self.name));
        }

        fn abort(&mut self, _ctx: &mut TabContext) {
            self.log.push(format!("{}:abort", self.name));
        }
    }
}
