//! Per-well state over the report-step timeline.
//!
//! A well is created by its first WELSPECS occurrence and never deleted;
//! every attribute that later keywords may change is a [`DynamicState`], so
//! a query at step N sees the latest value set at or before N.

use serde::{Deserialize, Serialize};

use crate::dynamic::DynamicState;
use crate::geometry::GridGeometry;
use crate::wells::completion::{
    Completion, CompletionOrder, CompletionSet, CompletionState, track_distance,
};
use crate::wells::properties::{
    GuideRatePhase, InjectionProperties, Phase, ProductionProperties, WellStatus,
};

/// Match a well name against a deck pattern (a trailing `*` matches any
/// suffix; anything else is an exact name).
pub(crate) fn name_matches_pattern(name: &str, pattern: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => name.starts_with(prefix),
        None => name == pattern,
    }
}

/// One well's timeline of state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Well {
    name: String,
    creation_step: usize,
    completion_order: CompletionOrder,
    preferred_phase: Phase,
    head_i: DynamicState<i32>,
    head_j: DynamicState<i32>,
    ref_depth: DynamicState<Option<f64>>,
    status: DynamicState<WellStatus>,
    producer: DynamicState<bool>,
    production: DynamicState<ProductionProperties>,
    injection: DynamicState<InjectionProperties>,
    completions: DynamicState<CompletionSet>,
    group: DynamicState<Option<String>>,
    group_available: DynamicState<bool>,
    guide_rate: DynamicState<f64>,
    guide_rate_phase: DynamicState<GuideRatePhase>,
    guide_rate_scaling: DynamicState<f64>,
}

impl Well {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: String,
        head_i: i32,
        head_j: i32,
        ref_depth: Option<f64>,
        preferred_phase: Phase,
        completion_order: CompletionOrder,
        num_steps: usize,
        creation_step: usize,
    ) -> Self {
        Self {
            name,
            creation_step,
            completion_order,
            preferred_phase,
            head_i: DynamicState::new(num_steps, head_i),
            head_j: DynamicState::new(num_steps, head_j),
            ref_depth: DynamicState::new(num_steps, ref_depth),
            status: DynamicState::new(num_steps, WellStatus::Shut),
            producer: DynamicState::new(num_steps, true),
            production: DynamicState::new(num_steps, ProductionProperties::default()),
            injection: DynamicState::new(num_steps, InjectionProperties::default()),
            completions: DynamicState::new(num_steps, CompletionSet::new(completion_order)),
            group: DynamicState::new(num_steps, None),
            group_available: DynamicState::new(num_steps, true),
            guide_rate: DynamicState::new(num_steps, -1.0),
            guide_rate_phase: DynamicState::new(num_steps, GuideRatePhase::Undefined),
            guide_rate_scaling: DynamicState::new(num_steps, 1.0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn creation_step(&self) -> usize {
        self.creation_step
    }

    /// Whether the well exists at `step` (wells are never deleted).
    pub fn has_been_defined(&self, step: usize) -> bool {
        step >= self.creation_step
    }

    pub fn preferred_phase(&self) -> Phase {
        self.preferred_phase
    }

    pub fn completion_order(&self) -> CompletionOrder {
        self.completion_order
    }

    pub fn head_i(&self, step: usize) -> i32 {
        *self.head_i.get(step)
    }

    pub fn head_j(&self, step: usize) -> i32 {
        *self.head_j.get(step)
    }

    pub fn ref_depth(&self, step: usize) -> Option<f64> {
        *self.ref_depth.get(step)
    }

    /// Head location and reference depth may be restated by a later
    /// WELSPECS; only the name is immutable.
    pub(crate) fn update_location(
        &mut self,
        step: usize,
        head_i: i32,
        head_j: i32,
        ref_depth: Option<f64>,
    ) {
        self.head_i.update(step, head_i);
        self.head_j.update(step, head_j);
        if ref_depth.is_some() {
            self.ref_depth.update(step, ref_depth);
        }
    }

    pub fn status(&self, step: usize) -> WellStatus {
        *self.status.get(step)
    }

    /// Set the status from `step` onward; true when this is a change.
    pub(crate) fn set_status(&mut self, step: usize, status: WellStatus) -> bool {
        let changed = self.status(step) != status;
        self.status.update(step, status);
        changed
    }

    pub fn is_producer(&self, step: usize) -> bool {
        *self.producer.get(step)
    }

    pub fn is_injector(&self, step: usize) -> bool {
        !self.is_producer(step)
    }

    pub fn production_properties(&self, step: usize) -> &ProductionProperties {
        self.production.get(step)
    }

    pub fn injection_properties(&self, step: usize) -> &InjectionProperties {
        self.injection.get(step)
    }

    /// Install a production bundle from `step` onward. A well is exclusively
    /// a producer or an injector, so any standing injection bundle is
    /// cleared. Returns true when the bundle differs from the one in force.
    pub(crate) fn set_production_properties(
        &mut self,
        step: usize,
        properties: ProductionProperties,
    ) -> bool {
        let changed =
            *self.production.get(step) != properties || !self.is_producer(step);
        self.production.update(step, properties);
        self.injection.update(step, InjectionProperties::default());
        self.producer.update(step, true);
        changed
    }

    /// Install an injection bundle from `step` onward, clearing any standing
    /// production bundle.
    pub(crate) fn set_injection_properties(
        &mut self,
        step: usize,
        properties: InjectionProperties,
    ) -> bool {
        let changed =
            *self.injection.get(step) != properties || !self.is_injector(step);
        self.injection.update(step, properties);
        self.production.update(step, ProductionProperties::default());
        self.producer.update(step, false);
        changed
    }

    pub fn completions(&self, step: usize) -> &CompletionSet {
        self.completions.get(step)
    }

    /// Add completions from `step` onward, computing their TRACK distance
    /// from the well head in force at that step.
    pub(crate) fn add_completions(
        &mut self,
        step: usize,
        additions: Vec<Completion>,
        grid: &dyn GridGeometry,
    ) {
        let head = (self.head_i(step), self.head_j(step));
        let mut set = self.completions.get(step).clone();
        for completion in additions {
            let distance = track_distance(grid, head.0, head.1, completion.cell());
            set.add(completion, distance);
        }
        self.completions.update(step, set);
    }

    /// Set the state of completions matching the cell filter; true when at
    /// least one completion matched.
    pub(crate) fn set_completion_states(
        &mut self,
        step: usize,
        i: Option<i32>,
        j: Option<i32>,
        k: Option<i32>,
        state: CompletionState,
    ) -> bool {
        let mut set = self.completions.get(step).clone();
        let matched = set.set_state_where(i, j, k, state);
        self.completions.update(step, set);
        matched > 0
    }

    pub fn group(&self, step: usize) -> Option<&str> {
        self.group.get(step).as_deref()
    }

    pub(crate) fn set_group(&mut self, step: usize, group: String) {
        self.group.update(step, Some(group));
    }

    pub fn available_for_group_control(&self, step: usize) -> bool {
        *self.group_available.get(step)
    }

    pub(crate) fn set_available_for_group_control(&mut self, step: usize, available: bool) {
        self.group_available.update(step, available);
    }

    /// Guide rate for group allocation; -1 means unset ("use the formula").
    pub fn guide_rate(&self, step: usize) -> f64 {
        *self.guide_rate.get(step)
    }

    pub(crate) fn set_guide_rate(&mut self, step: usize, value: f64) {
        self.guide_rate.update(step, value);
    }

    pub fn guide_rate_phase(&self, step: usize) -> GuideRatePhase {
        *self.guide_rate_phase.get(step)
    }

    pub(crate) fn set_guide_rate_phase(&mut self, step: usize, phase: GuideRatePhase) {
        self.guide_rate_phase.update(step, phase);
    }

    pub fn guide_rate_scaling(&self, step: usize) -> f64 {
        *self.guide_rate_scaling.get(step)
    }

    pub(crate) fn set_guide_rate_scaling(&mut self, step: usize, factor: f64) {
        self.guide_rate_scaling.update(step, factor);
    }

    /// A read-only snapshot of this well at `step`.
    pub fn view(&self, step: usize) -> WellView<'_> {
        WellView { well: self, step }
    }
}

/// A well frozen at one report step.
#[derive(Debug, Clone, Copy)]
pub struct WellView<'a> {
    well: &'a Well,
    step: usize,
}

impl<'a> WellView<'a> {
    pub fn name(&self) -> &'a str {
        self.well.name()
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn status(&self) -> WellStatus {
        self.well.status(self.step)
    }

    pub fn head_i(&self) -> i32 {
        self.well.head_i(self.step)
    }

    pub fn head_j(&self) -> i32 {
        self.well.head_j(self.step)
    }

    pub fn ref_depth(&self) -> Option<f64> {
        self.well.ref_depth(self.step)
    }

    pub fn preferred_phase(&self) -> Phase {
        self.well.preferred_phase()
    }

    pub fn is_producer(&self) -> bool {
        self.well.is_producer(self.step)
    }

    pub fn is_injector(&self) -> bool {
        self.well.is_injector(self.step)
    }

    pub fn production_properties(&self) -> &'a ProductionProperties {
        self.well.production_properties(self.step)
    }

    pub fn injection_properties(&self) -> &'a InjectionProperties {
        self.well.injection_properties(self.step)
    }

    pub fn completions(&self) -> &'a CompletionSet {
        self.well.completions(self.step)
    }

    pub fn group(&self) -> Option<&'a str> {
        self.well.group(self.step)
    }

    pub fn guide_rate(&self) -> f64 {
        self.well.guide_rate(self.step)
    }

    pub fn guide_rate_phase(&self) -> GuideRatePhase {
        self.well.guide_rate_phase(self.step)
    }

    pub fn guide_rate_scaling(&self) -> f64 {
        self.well.guide_rate_scaling(self.step)
    }

    pub fn available_for_group_control(&self) -> bool {
        self.well.available_for_group_control(self.step)
    }
}
