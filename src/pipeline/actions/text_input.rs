//! Types the text from input slot `text` into a DOM text input.

use crate::models::input::TabInput;
use crate::models::page::BrowserCommand;
use crate::pipeline::action::Action;
use crate::pipeline::slots::{SlotKind, Slots};
use crate::tab::context::TabContext;

pub const TEXT_SLOT: &str = "text";

pub struct TextInputAction {
    slots: Slots,
    element_id: i32,
    submit: bool,
}

impl TextInputAction {
    pub fn new(element_id: i32, submit: bool) -> Self {
        Self {
            slots: Slots::new().with_input(TEXT_SLOT, SlotKind::Text),
            element_id,
            submit,
        }
    }
}

impl Action for TextInputAction {
    fn name(&self) -> &'static str {
        "text_input"
    }

    fn slots(&self) -> &Slots {
        &self.slots
    }

    fn slots_mut(&mut self) -> &mut Slots {
        &mut self.slots
    }

    fn update(&mut self, _tpf: f32, _tab_input: &TabInput, ctx: &mut TabContext) -> bool {
        let Some(text) = self.slots.input_text(TEXT_SLOT) else {
            return false;
        };

        log::info!(
            "text_input: {} characters into element {}",
            text.chars().count(),
            self.element_id
        );
        ctx.dispatch(BrowserCommand::InputText {
            element_id: self.element_id,
            text: text.to_string(),
            submit: self.submit,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::input::{Input, TabInput};
    use crate::models::settings::TabSettings;
    use crate::pipeline::slots::SlotValue;

    fn input() -> TabInput {
        TabInput::new(Input::new(0, 0, false), 0, 0, 0.1, 0.1)
    }

    #[test]
    fn waits_for_text_then_dispatches() {
        let mut ctx = TabContext::new(&TabSettings::default());
        let mut action = TextInputAction::new(7, true);
        assert!(!action.update(0.016, &input(), &mut ctx));

        action
            .slots_mut()
            .set_input(TEXT_SLOT, SlotValue::Text("gaze".to_string()))
            .expect("set text");
        assert!(action.update(0.016, &input(), &mut ctx));
        assert_eq!(
            ctx.take_commands(),
            vec![BrowserCommand::InputText {
                element_id: 7,
                text: "gaze".to_string(),
                submit: true,
            }]
        );
    }
}
