use crate::models::input::TabInput;
use crate::pipeline::slots::Slots;
use crate::tab::context::TabContext;
use crate::tab::draw::DrawList;

/// One step of a pipeline.
///
/// Lifecycle: `activate` once when the action becomes current, `update` once
/// per frame until it returns `true`, then `deactivate` once. A pipeline torn
/// down early calls `abort` before `deactivate`; actions that never became
/// current only see `deactivate`.
pub trait Action {
    fn name(&self) -> &'static str;

    fn slots(&self) -> &Slots;

    fn slots_mut(&mut self) -> &mut Slots;

    /// Returns `true` once the goal of the action is reached.
    fn update(&mut self, tpf: f32, tab_input: &TabInput, ctx: &mut TabContext) -> bool;

    fn draw(&self, _ctx: &TabContext, _list: &mut DrawList) {}

    fn activate(&mut self, _ctx: &mut TabContext) {}

    fn deactivate(&mut self, _ctx: &mut TabContext) {}

    /// Must leave no visual or device state behind.
    fn abort(&mut self, _ctx: &mut TabContext) {}
}
