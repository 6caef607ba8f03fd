//! Named, typed data slots through which actions of a pipeline talk.

use std::collections::BTreeMap;

use euclid::default::Vector2D;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum SlotValue {
    Int(i32),
    Float(f32),
    Vec2(Vector2D<f32>),
    Bool(bool),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Int,
    Float,
    Vec2,
    Bool,
    Text,
}

impl SlotValue {
    pub fn kind(&self) -> SlotKind {
        match self {
            SlotValue::Int(_) => SlotKind::Int,
            SlotValue::Float(_) => SlotKind::Float,
            SlotValue::Vec2(_) => SlotKind::Vec2,
            SlotValue::Bool(_) => SlotKind::Bool,
            SlotValue::Text(_) => SlotKind::Text,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlotError {
    #[error("slot '{0}' is not declared")]
    Undeclared(String),
    #[error("slot '{name}' holds {expected:?}, got {found:?}")]
    KindMismatch {
        name: String,
        expected: SlotKind,
        found: SlotKind,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct Slot {
    kind: SlotKind,
    value: Option<SlotValue>,
}

impl Slot {
    fn set(&mut self, name: &str, value: SlotValue) -> Result<(), SlotError> {
        if value.kind() != self.kind {
            return Err(SlotError::KindMismatch {
                name: name.to_string(),
                expected: self.kind,
                found: value.kind(),
            });
        }
        self.value = Some(value);
        Ok(())
    }
}

/// Input and output slots of one action. Values start out absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slots {
    inputs: BTreeMap<&'static str, Slot>,
    outputs: BTreeMap<&'static str, Slot>,
}

impl Slots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(mut self, name: &'static str, kind: SlotKind) -> Self {
        self.inputs.insert(name, Slot { kind, value: None });
        self
    }

    pub fn with_output(mut self, name: &'static str, kind: SlotKind) -> Self {
        self.outputs.insert(name, Slot { kind, value: None });
        self
    }

    pub fn input(&self, name: &str) -> Option<&SlotValue> {
        self.inputs.get(name).and_then(|slot| slot.value.as_ref())
    }

    pub fn output(&self, name: &str) -> Option<&SlotValue> {
        self.outputs.get(name).and_then(|slot| slot.value.as_ref())
    }

    pub fn input_vec2(&self, name: &str) -> Option<Vector2D<f32>> {
        match self.input(name) {
            Some(SlotValue::Vec2(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn input_text(&self, name: &str) -> Option<&str> {
        match self.input(name) {
            Some(SlotValue::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn output_vec2(&self, name: &str) -> Option<Vector2D<f32>> {
        match self.output(name) {
            Some(SlotValue::Vec2(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn set_input(&mut self, name: &str, value: SlotValue) -> Result<(), SlotError> {
        self.inputs
            .get_mut(name)
            .ok_or_else(|| SlotError::Undeclared(name.to_string()))?
            .set(name, value)
    }

    pub fn set_output(&mut self, name: &str, value: SlotValue) -> Result<(), SlotError> {
        self.outputs
            .get_mut(name)
            .ok_or_else(|| SlotError::Undeclared(name.to_string()))?
            .set(name, value)
    }

    /// Copies every present output into the input of `next` with the same
    /// name and kind. Returns the number of transferred values.
    pub fn transfer_to(&self, next: &mut Slots) -> usize {
        let mut transferred = 0;
        for (name, output) in &self.outputs {
            let Some(value) = output.value.as_ref() else {
                continue;
            };
            if let Some(input) = next.inputs.get_mut(name) {
                if input.kind == output.kind {
                    input.value = Some(value.clone());
                    transferred += 1;
                }
            }
        }
        transferred
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values_are_none() {
        let slots = Slots::new()
            .with_input("coordinate", SlotKind::Vec2)
            .with_output("text", SlotKind::Text);
        assert_eq!(slots.input("coordinate"), None);
        assert_eq!(slots.input_vec2("coordinate"), None);
        assert_eq!(slots.output("text"), None);
        assert_eq!(slots.input("unknown"), None);
    }

    #[test]
    fn rejects_undeclared_and_mismatched_writes() {
        let mut slots = Slots::new().with_output("coordinate", SlotKind::Vec2);
        assert_eq!(
            slots.set_output("other", SlotValue::Bool(true)),
            Err(SlotError::Undeclared("other".to_string()))
        );
        let err = slots
            .set_output("coordinate", SlotValue::Int(3))
            .expect_err("int into vec2 slot");
        assert!(matches!(err, SlotError::KindMismatch { .. }));
        assert_eq!(slots.output("coordinate"), None);
    }

    #[test]
    fn transfers_matching_outputs_only() {
        let mut upstream = Slots::new()
            .with_output("coordinate", SlotKind::Vec2)
            .with_output("count", SlotKind::Int)
            .with_output("unset", SlotKind::Bool);
        upstream
            .set_output("coordinate", SlotValue::Vec2(Vector2D::new(3.0, 4.0)))
            .expect("set coordinate");
        upstream
            .set_output("count", SlotValue::Int(2))
            .expect("set count");

        let mut downstream = Slots::new()
            .with_input("coordinate", SlotKind::Vec2)
            .with_input("count", SlotKind::Float)
            .with_input("unset", SlotKind::Bool);

        assert_eq!(upstream.transfer_to(&mut downstream), 1);
        assert_eq!(downstream.input_vec2("coordinate"), Some(Vector2D::new(3.0, 4.0)));
        assert_eq!(downstream.input("count"), None);
        assert_eq!(downstream.input("unset"), None);
    }
}
