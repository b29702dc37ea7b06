//! Scene-level scenarios: lifecycle order, play mode, physics through the
//! whole frame loop, persistence

mod physics_scenarios;
mod play_mode;

use std::cell::RefCell;
use std::rc::Rc;

use crate::components::{Component, ComponentBase};
use crate::scene::context::ComponentContext;
use crate::scene::entity::EntityKey;

/// Shared event log written by [`Recorder`] units
pub(crate) type EventLog = Rc<RefCell<Vec<String>>>;

pub(crate) fn event_log() -> EventLog {
    crate::foundation::logging::init_for_tests();
    Rc::new(RefCell::new(Vec::new()))
}

pub(crate) fn events(log: &EventLog) -> Vec<String> {
    log.borrow().clone()
}

/// Writes `"<label>:<hook>"` for every hook it receives
pub(crate) struct Recorder {
    base: ComponentBase,
    label: &'static str,
    log: EventLog,
}

impl Recorder {
    pub(crate) fn new(label: &'static str, log: &EventLog) -> Self {
        Self {
            base: ComponentBase::default(),
            label,
            log: Rc::clone(log),
        }
    }

    fn record(&self, hook: &str) {
        self.log.borrow_mut().push(format!("{}:{}", self.label, hook));
    }
}

impl Component for Recorder {
    fn type_name(&self) -> &'static str {
        "Recorder"
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn to_data(&self) -> Result<serde_json::Value, serde_json::Error> {
        Ok(serde_json::json!({ "label": self.label }))
    }

    fn start(&mut self, _ctx: &mut ComponentContext<'_>) {
        self.record("start");
    }

    fn update(&mut self, _ctx: &mut ComponentContext<'_>, _delta_time: f32) {
        self.record("update");
    }

    fn fixed_update(&mut self, _ctx: &mut ComponentContext<'_>, _fixed_delta_time: f32) {
        self.record("fixed");
    }

    fn on_destroy(&mut self, _ctx: &mut ComponentContext<'_>) {
        self.record("destroy");
    }

    fn on_enable(&mut self, _ctx: &mut ComponentContext<'_>) {
        self.record("enable");
    }

    fn on_disable(&mut self, _ctx: &mut ComponentContext<'_>) {
        self.record("disable");
    }

    fn on_collision_enter(&mut self, _ctx: &mut ComponentContext<'_>, _other: EntityKey) {
        self.record("collision_enter");
    }

    fn on_collision_exit(&mut self, _ctx: &mut ComponentContext<'_>, _other: EntityKey) {
        self.record("collision_exit");
    }

    fn on_trigger_enter(&mut self, _ctx: &mut ComponentContext<'_>, _other: EntityKey) {
        self.record("trigger_enter");
    }

    fn on_trigger_exit(&mut self, _ctx: &mut ComponentContext<'_>, _other: EntityKey) {
        self.record("trigger_exit");
    }
}
