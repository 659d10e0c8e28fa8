//! What changed at each report step.
//!
//! Simulators rebuild derived structures only when something relevant
//! changed, so the schedule records a small event set per step — globally
//! and per well/group. Events are recorded at the step they happen and are
//! not carried forward.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One kind of schedule change. The discriminants are bit positions in an
/// [`EventSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum ScheduleEvent {
    NewWell = 1,
    WellStatusChange = 2,
    CompletionChange = 4,
    NewGroup = 8,
    GroupChange = 16,
    ProductionUpdate = 32,
    InjectionUpdate = 64,
}

/// A set of [`ScheduleEvent`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventSet(u32);

impl EventSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, event: ScheduleEvent) {
        self.0 |= event as u32;
    }

    pub fn contains(self, event: ScheduleEvent) -> bool {
        self.0 & (event as u32) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Per-step event sets for the whole schedule.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Events {
    steps: Vec<EventSet>,
}

impl Events {
    pub fn new(num_steps: usize) -> Self {
        Self {
            steps: vec![EventSet::default(); num_steps],
        }
    }

    pub fn add(&mut self, event: ScheduleEvent, step: usize) {
        self.steps[step].insert(event);
    }

    pub fn at(&self, step: usize) -> EventSet {
        self.steps[step]
    }

    pub fn has_event(&self, event: ScheduleEvent, step: usize) -> bool {
        self.steps[step].contains(event)
    }
}

/// Per-step, per-entity event sets (wells and groups share the namespace;
/// well and group names never collide in practice).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WellGroupEvents {
    steps: Vec<BTreeMap<String, EventSet>>,
}

impl WellGroupEvents {
    pub fn new(num_steps: usize) -> Self {
        Self {
            steps: vec![BTreeMap::new(); num_steps],
        }
    }

    pub fn add(&mut self, name: &str, event: ScheduleEvent, step: usize) {
        self.steps[step]
            .entry(name.to_string())
            .or_default()
            .insert(event);
    }

    /// The events recorded for `name` at `step`.
    pub fn at(&self, name: &str, step: usize) -> EventSet {
        self.steps[step].get(name).copied().unwrap_or_default()
    }

    /// Every entity with events at `step`.
    pub fn entities(&self, step: usize) -> &BTreeMap<String, EventSet> {
        &self.steps[step]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_are_per_step() {
        let mut events = Events::new(4);
        events.add(ScheduleEvent::NewWell, 1);
        events.add(ScheduleEvent::CompletionChange, 1);

        assert!(events.has_event(ScheduleEvent::NewWell, 1));
        assert!(events.has_event(ScheduleEvent::CompletionChange, 1));
        // Not carried forward.
        assert!(!events.has_event(ScheduleEvent::NewWell, 2));
        assert!(events.at(0).is_empty());
    }

    #[test]
    fn test_wellgroup_events_track_entities() {
        let mut events = WellGroupEvents::new(3);
        events.add("OP_1", ScheduleEvent::NewWell, 0);
        events.add("OP_1", ScheduleEvent::WellStatusChange, 2);
        events.add("G1", ScheduleEvent::NewGroup, 0);

        assert!(events.at("OP_1", 0).contains(ScheduleEvent::NewWell));
        assert!(!events.at("OP_1", 1).contains(ScheduleEvent::NewWell));
        assert_eq!(events.entities(0).len(), 2);
        assert!(events.at("G1", 0).contains(ScheduleEvent::NewGroup));
    }
}
