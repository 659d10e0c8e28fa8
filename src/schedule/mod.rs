//! The schedule orchestrator.
//!
//! One pass over the deck's SCHEDULE section drives everything: DATES and
//! TSTEP advance the report step, every other keyword is dispatched through
//! a name → handler table to the sub-state it concerns, at the step most
//! recently reached. Report-control keywords (RPTRST, RPTSCHED, RPTSOL,
//! SAVE) are resolved by [`RestartConfig`] against the completed time map,
//! since their cadence rules need the whole timeline.
//!
//! Construction either yields a fully consistent, immutable schedule or
//! fails with the keyword, section and step of the offending occurrence;
//! a partial schedule is never returned.

pub mod events;

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use itertools::Itertools;

use crate::deck::{Deck, DeckKeyword, DeckRecord, Section};
use crate::dynamic::DynamicState;
use crate::errors::{ErrorContext, ScheduleError};
use crate::geometry::{CartesianGrid, GridGeometry};
use crate::groups::{
    FIELD, Group, GroupInjectionProperties, GroupProductionProperties, GroupTree, GroupView,
};
use crate::policy::ParsePolicy;
use crate::restart::RestartConfig;
use crate::time::TimeMap;
use crate::wells::completion::completions_from_record;
use crate::wells::well::name_matches_pattern;
use crate::wells::{
    CompletionOrder, CompletionState, InjectionProperties, ProductionProperties, Well,
    WellStatus, WellView,
};
use events::{EventSet, Events, ScheduleEvent, WellGroupEvents};

/// The frozen result of processing a deck: per-step snapshots of wells,
/// groups and restart policy.
#[derive(Debug, Clone)]
pub struct Schedule {
    time_map: TimeMap,
    wells: BTreeMap<String, Well>,
    groups: BTreeMap<String, Group>,
    group_tree: DynamicState<GroupTree>,
    events: Events,
    wellgroup_events: WellGroupEvents,
    restart: RestartConfig,
}

impl Schedule {
    /// Build a schedule from a deck, using unit-cell grid geometry for
    /// completion ordering.
    pub fn from_deck(deck: &Deck, policy: &ParsePolicy) -> Result<Self, ScheduleError> {
        Self::from_deck_with_grid(deck, &CartesianGrid::default(), policy)
    }

    /// Build a schedule from a deck against real grid geometry.
    pub fn from_deck_with_grid(
        deck: &Deck,
        grid: &dyn GridGeometry,
        policy: &ParsePolicy,
    ) -> Result<Self, ScheduleError> {
        let time_map = TimeMap::from_deck(deck)?;
        let num_steps = time_map.size();

        let mut builder = Builder {
            num_steps,
            current_step: 0,
            wells: BTreeMap::new(),
            groups: BTreeMap::new(),
            group_tree: DynamicState::new(num_steps, GroupTree::new()),
            events: Events::new(num_steps),
            wellgroup_events: WellGroupEvents::new(num_steps),
            compord: Vec::new(),
            grid,
        };
        builder.add_group(FIELD, 0);

        for keyword in deck.section(Section::Schedule) {
            match keyword.name() {
                "DATES" => {
                    builder.current_step += keyword.num_records();
                    continue;
                }
                "TSTEP" => {
                    builder.current_step += keyword.records().map(|r| r.len()).sum::<usize>();
                    continue;
                }
                _ => {}
            }

            let context =
                ErrorContext::at(keyword.name(), Section::Schedule, builder.current_step);
            match handler(keyword.name()) {
                Some(handle) => {
                    handle(&mut builder, keyword).map_err(|e| e.with_context(&context))?
                }
                None => log::debug!(
                    "keyword {} is not handled by the schedule engine",
                    keyword.name()
                ),
            }
        }

        let restart = RestartConfig::from_deck(&time_map, deck, policy)?;

        Ok(Schedule {
            time_map,
            wells: builder.wells,
            groups: builder.groups,
            group_tree: builder.group_tree,
            events: builder.events,
            wellgroup_events: builder.wellgroup_events,
            restart,
        })
    }

    /// Number of report steps, step 0 included.
    pub fn size(&self) -> usize {
        self.time_map.size()
    }

    pub fn start_time(&self) -> NaiveDateTime {
        self.time_map.start_time()
    }

    pub fn time_map(&self) -> &TimeMap {
        &self.time_map
    }

    pub fn num_wells(&self) -> usize {
        self.wells.len()
    }

    pub fn has_well(&self, name: &str) -> bool {
        self.wells.contains_key(name)
    }

    /// The named well frozen at `step`; an error if it was not yet defined.
    pub fn well(&self, name: &str, step: usize) -> Result<WellView<'_>, ScheduleError> {
        self.check_step(step)?;
        match self.wells.get(name) {
            Some(well) if well.has_been_defined(step) => Ok(well.view(step)),
            _ => Err(ScheduleError::UnknownWell {
                name: name.to_string(),
                context: ErrorContext::step(step),
            }),
        }
    }

    fn check_step(&self, step: usize) -> Result<(), ScheduleError> {
        if step >= self.size() {
            return Err(ScheduleError::NotFound {
                message: format!(
                    "report step {} is beyond the timeline ({} steps)",
                    step,
                    self.size()
                ),
                context: ErrorContext::step(step),
            });
        }
        Ok(())
    }

    /// Every well defined at `step`, in name order.
    pub fn wells(&self, step: usize) -> Vec<WellView<'_>> {
        self.wells
            .values()
            .filter(|w| w.has_been_defined(step))
            .map(|w| w.view(step))
            .collect()
    }

    /// Wells with OPEN status at `step` (AUTO wells are not included even
    /// though a simulator may open them).
    pub fn open_wells(&self, step: usize) -> Vec<WellView<'_>> {
        self.wells(step)
            .into_iter()
            .filter(|w| w.status() == WellStatus::Open)
            .collect()
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    /// The named group frozen at `step`.
    pub fn group(&self, name: &str, step: usize) -> Result<GroupView<'_>, ScheduleError> {
        self.check_step(step)?;
        match self.groups.get(name) {
            Some(group) if group.has_been_defined(step) => {
                Ok(group.view(self.group_tree.get(step), step))
            }
            _ => Err(ScheduleError::UnknownGroup {
                name: name.to_string(),
                context: ErrorContext::step(step),
            }),
        }
    }

    /// The group tree in force at `step`.
    pub fn group_tree(&self, step: usize) -> &GroupTree {
        self.group_tree.get(step)
    }

    /// What changed at `step`.
    pub fn events(&self, step: usize) -> EventSet {
        self.events.at(step)
    }

    pub fn has_event(&self, event: ScheduleEvent, step: usize) -> bool {
        self.events.has_event(event, step)
    }

    /// Per-well/group changes at `step`.
    pub fn wellgroup_events(&self, step: usize) -> &BTreeMap<String, EventSet> {
        self.wellgroup_events.entities(step)
    }

    /// Whether a restart file is written at `step`.
    pub fn write_rst_file(&self, step: usize) -> bool {
        self.restart.write_rst_file(step)
    }

    /// The extra output arrays requested at `step`.
    pub fn rst_keywords(&self, step: usize) -> std::collections::BTreeSet<String> {
        self.restart.rst_keywords(step)
    }

    /// The full restart policy.
    pub fn restart_config(&self) -> &RestartConfig {
        &self.restart
    }
}

/// Mutable construction state threaded through the keyword handlers.
struct Builder<'a> {
    num_steps: usize,
    current_step: usize,
    wells: BTreeMap<String, Well>,
    groups: BTreeMap<String, Group>,
    group_tree: DynamicState<GroupTree>,
    events: Events,
    wellgroup_events: WellGroupEvents,
    /// COMPORD selections seen so far: (well pattern, order, step declared).
    compord: Vec<(String, CompletionOrder, usize)>,
    grid: &'a dyn GridGeometry,
}

type KeywordHandler = for<'a> fn(&mut Builder<'a>, &DeckKeyword) -> Result<(), ScheduleError>;

/// The keyword dispatch table.
fn handler(name: &str) -> Option<KeywordHandler> {
    Some(match name {
        "WELSPECS" => handle_welspecs,
        "COMPDAT" => handle_compdat,
        "COMPORD" => handle_compord,
        "WCONPROD" => handle_wconprod,
        "WCONHIST" => handle_wconhist,
        "WCONINJE" => handle_wconinje,
        "WELOPEN" => handle_welopen,
        "WGRUPCON" => handle_wgrupcon,
        "GRUPTREE" => handle_gruptree,
        "GCONPROD" => handle_gconprod,
        "GCONINJE" => handle_gconinje,
        _ => return None,
    })
}

impl<'a> Builder<'a> {
    fn add_group(&mut self, name: &str, step: usize) {
        self.groups
            .insert(name.to_string(), Group::new(name.to_string(), self.num_steps, step));
        self.events.add(ScheduleEvent::NewGroup, step);
        self.wellgroup_events.add(name, ScheduleEvent::NewGroup, step);
    }

    /// Create the group if unseen; a group may not take a well's name.
    fn ensure_group(&mut self, name: &str) -> Result<(), ScheduleError> {
        if self.wells.contains_key(name) {
            return Err(ScheduleError::DuplicateDefinition {
                name: name.to_string(),
                message: "already defined as a well".to_string(),
                context: ErrorContext::step(self.current_step),
            });
        }
        if !self.groups.contains_key(name) {
            self.add_group(name, self.current_step);
        }
        Ok(())
    }

    fn well_mut(&mut self, name: &str) -> Result<&mut Well, ScheduleError> {
        let step = self.current_step;
        self.wells.get_mut(name).ok_or_else(|| ScheduleError::UnknownWell {
            name: name.to_string(),
            context: ErrorContext::step(step),
        })
    }

    /// Resolve a well-name pattern. An exact name must exist; a pattern may
    /// legitimately match nothing.
    fn matching_wells(&self, pattern: &str) -> Result<Vec<String>, ScheduleError> {
        if pattern.ends_with('*') {
            Ok(self
                .wells
                .keys()
                .filter(|name| name_matches_pattern(name, pattern))
                .cloned()
                .collect())
        } else if self.wells.contains_key(pattern) {
            Ok(vec![pattern.to_string()])
        } else {
            Err(ScheduleError::UnknownWell {
                name: pattern.to_string(),
                context: ErrorContext::step(self.current_step),
            })
        }
    }

    /// The completion ordering for a well created now: the latest COMPORD
    /// pattern declared at this report step that matches, TRACK otherwise.
    fn completion_order_for(&self, well_name: &str) -> CompletionOrder {
        self.compord
            .iter()
            .rev()
            .find(|(pattern, _, step)| {
                *step == self.current_step && name_matches_pattern(well_name, pattern)
            })
            .map(|(_, order, _)| *order)
            .unwrap_or_default()
    }

    fn set_well_status(&mut self, name: &str, status: WellStatus) -> Result<(), ScheduleError> {
        let step = self.current_step;
        let changed = self.well_mut(name)?.set_status(step, status);
        if changed {
            self.events.add(ScheduleEvent::WellStatusChange, step);
            self.wellgroup_events
                .add(name, ScheduleEvent::WellStatusChange, step);
        }
        Ok(())
    }

    /// Move a well into a group, detaching it from its previous one.
    fn assign_well_to_group(&mut self, well_name: &str, group_name: &str) {
        let step = self.current_step;
        let previous = self
            .wells
            .get(well_name)
            .and_then(|w| w.group(step))
            .map(str::to_string);

        if previous.as_deref() == Some(group_name) {
            return;
        }
        if let Some(previous) = previous {
            if let Some(group) = self.groups.get_mut(&previous) {
                group.del_well(step, well_name);
            }
        }
        if let Some(group) = self.groups.get_mut(group_name) {
            group.add_well(step, well_name);
        }
        if let Some(well) = self.wells.get_mut(well_name) {
            well.set_group(step, group_name.to_string());
        }
    }
}

fn required_str<'r>(
    record: &'r DeckRecord,
    index: usize,
    what: &str,
) -> Result<&'r str, ScheduleError> {
    record.item(index).as_str().ok_or_else(|| ScheduleError::MalformedRecord {
        message: format!("record is missing {}", what),
        context: ErrorContext::new(),
    })
}

fn required_int(record: &DeckRecord, index: usize, what: &str) -> Result<i64, ScheduleError> {
    record.item(index).as_int().ok_or_else(|| ScheduleError::MalformedRecord {
        message: format!("record is missing {}", what),
        context: ErrorContext::new(),
    })
}

fn yes_no(text: &str) -> Result<bool, ScheduleError> {
    match text.to_ascii_uppercase().as_str() {
        "Y" | "YES" => Ok(true),
        "N" | "NO" => Ok(false),
        other => Err(ScheduleError::MalformedRecord {
            message: format!("'{}' is not a YES/NO flag", other),
            context: ErrorContext::new(),
        }),
    }
}

/// WELSPECS: `WELL GROUP HEAD_I HEAD_J REF_DEPTH PHASE`.
fn handle_welspecs(builder: &mut Builder<'_>, keyword: &DeckKeyword) -> Result<(), ScheduleError> {
    let step = builder.current_step;

    for record in keyword.records() {
        let well_name = required_str(record, 0, "a well name")?.to_string();
        let group_name = record.str_or(1, FIELD).to_string();
        let head_i = required_int(record, 2, "the head I index")? as i32 - 1;
        let head_j = required_int(record, 3, "the head J index")? as i32 - 1;
        let ref_depth = record.item(4).as_double();
        let phase = record.str_or(5, "OIL").parse()?;

        // Wells and groups share a namespace in every downstream consumer.
        if builder.groups.contains_key(&well_name) {
            return Err(ScheduleError::DuplicateDefinition {
                name: well_name,
                message: "already defined as a group".to_string(),
                context: ErrorContext::step(step),
            });
        }
        builder.ensure_group(&group_name)?;

        if builder.wells.contains_key(&well_name) {
            if let Some(well) = builder.wells.get_mut(&well_name) {
                well.update_location(step, head_i, head_j, ref_depth);
            }
        } else {
            let order = builder.completion_order_for(&well_name);
            builder.wells.insert(
                well_name.clone(),
                Well::new(
                    well_name.clone(),
                    head_i,
                    head_j,
                    ref_depth,
                    phase,
                    order,
                    builder.num_steps,
                    step,
                ),
            );
            builder.events.add(ScheduleEvent::NewWell, step);
            builder
                .wellgroup_events
                .add(&well_name, ScheduleEvent::NewWell, step);
        }

        builder.assign_well_to_group(&well_name, &group_name);

        // A group first named by WELSPECS hangs off the root until a
        // GRUPTREE record says otherwise.
        let tree = builder.group_tree.get(step);
        if !tree.contains(&group_name) {
            let context = ErrorContext::step(step);
            let tree = tree.with_parent(&group_name, FIELD, &context)?;
            builder.group_tree.update(step, tree);
            builder.events.add(ScheduleEvent::GroupChange, step);
        }
    }
    Ok(())
}

/// COMPDAT: completions for exact well names.
fn handle_compdat(builder: &mut Builder<'_>, keyword: &DeckKeyword) -> Result<(), ScheduleError> {
    let step = builder.current_step;

    // Each record extends exactly one well's completion set, so the records
    // are grouped per well before any set is touched.
    let per_well = keyword
        .records()
        .map(|record| {
            required_str(record, 0, "a well name").map(|name| (name.to_string(), record))
        })
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .into_group_map();

    for (well_name, records) in per_well {
        let (head_i, head_j) = {
            let well = builder.well_mut(&well_name)?;
            (well.head_i(step), well.head_j(step))
        };
        let mut additions = Vec::new();
        for record in records {
            additions.extend(completions_from_record(record, head_i, head_j)?);
        }
        let grid = builder.grid;
        builder
            .well_mut(&well_name)?
            .add_completions(step, additions, grid);
        builder
            .wellgroup_events
            .add(&well_name, ScheduleEvent::CompletionChange, step);
    }
    builder.events.add(ScheduleEvent::CompletionChange, step);
    Ok(())
}

/// COMPORD: `WELL_PATTERN METHOD`. Selections apply to wells created at the
/// same report step.
fn handle_compord(builder: &mut Builder<'_>, keyword: &DeckKeyword) -> Result<(), ScheduleError> {
    let step = builder.current_step;
    for record in keyword.records() {
        let pattern = record.str_or(0, "*").to_string();
        let order: CompletionOrder = required_str(record, 1, "an ordering method")?.parse()?;
        builder.compord.push((pattern, order, step));
    }
    Ok(())
}

fn handle_wconprod(builder: &mut Builder<'_>, keyword: &DeckKeyword) -> Result<(), ScheduleError> {
    handle_wcon_producer(builder, keyword, true)
}

fn handle_wconhist(builder: &mut Builder<'_>, keyword: &DeckKeyword) -> Result<(), ScheduleError> {
    handle_wcon_producer(builder, keyword, false)
}

/// WCONPROD/WCONHIST: replace the production bundle of matching wells.
fn handle_wcon_producer(
    builder: &mut Builder<'_>,
    keyword: &DeckKeyword,
    prediction: bool,
) -> Result<(), ScheduleError> {
    let step = builder.current_step;

    for record in keyword.records() {
        let pattern = required_str(record, 0, "a well name")?;
        let status: WellStatus = required_str(record, 1, "a well status")?.parse()?;

        for well_name in builder.matching_wells(pattern)? {
            let mut properties = {
                let well = builder.well_mut(&well_name)?;
                if prediction {
                    let group_control = well.available_for_group_control(step);
                    ProductionProperties::prediction(record, group_control)
                } else {
                    let previous_bhp = well.production_properties(step).bhp_limit;
                    ProductionProperties::history(previous_bhp, record)
                }
            };

            if status != WellStatus::Shut {
                let mode = required_str(record, 2, "a control mode")?.parse()?;
                if !properties.has_control(mode) {
                    return Err(ScheduleError::InvalidControl {
                        message: format!(
                            "control mode {:?} has no target set for well {}",
                            mode, well_name
                        ),
                        context: ErrorContext::step(step),
                    });
                }
                properties.control_mode = mode;
            }

            builder.set_well_status(&well_name, status)?;
            if builder
                .well_mut(&well_name)?
                .set_production_properties(step, properties)
            {
                builder.events.add(ScheduleEvent::ProductionUpdate, step);
                builder
                    .wellgroup_events
                    .add(&well_name, ScheduleEvent::ProductionUpdate, step);
            }
        }
    }
    Ok(())
}

/// WCONINJE: replace the injection bundle of matching wells.
fn handle_wconinje(builder: &mut Builder<'_>, keyword: &DeckKeyword) -> Result<(), ScheduleError> {
    let step = builder.current_step;

    for record in keyword.records() {
        let pattern = required_str(record, 0, "a well name")?;
        let status: WellStatus = required_str(record, 2, "a well status")?.parse()?;

        for well_name in builder.matching_wells(pattern)? {
            let mut properties = {
                let well = builder.well_mut(&well_name)?;
                InjectionProperties::from_record(
                    well.injection_properties(step),
                    record,
                    well.available_for_group_control(step),
                )?
            };

            let mode = required_str(record, 3, "a control mode")?.parse()?;
            if !properties.has_control(mode) {
                return Err(ScheduleError::InvalidControl {
                    message: format!(
                        "control mode {:?} has no target set for well {}",
                        mode, well_name
                    ),
                    context: ErrorContext::step(step),
                });
            }
            properties.control_mode = mode;

            builder.set_well_status(&well_name, status)?;
            if builder
                .well_mut(&well_name)?
                .set_injection_properties(step, properties)
            {
                builder.events.add(ScheduleEvent::InjectionUpdate, step);
                builder
                    .wellgroup_events
                    .add(&well_name, ScheduleEvent::InjectionUpdate, step);
            }
        }
    }
    Ok(())
}

/// WELOPEN: `WELL STATUS [I J K C1 C2]`. Without cell filters the record
/// sets well status only; with filters it sets completion states.
fn handle_welopen(builder: &mut Builder<'_>, keyword: &DeckKeyword) -> Result<(), ScheduleError> {
    let step = builder.current_step;

    for record in keyword.records() {
        let pattern = required_str(record, 0, "a well name")?;
        let status_text = required_str(record, 1, "a status")?;
        let has_cell_filter = (2..7).any(|i| !record.item(i).is_defaulted());

        for well_name in builder.matching_wells(pattern)? {
            if has_cell_filter {
                let state: CompletionState = status_text.parse()?;
                let cell = |index: usize| -> Option<i32> {
                    match record.int_or(index, 0) {
                        0 => None,
                        v => Some(v as i32 - 1),
                    }
                };
                let (i, j, k) = (cell(2), cell(3), cell(4));
                builder
                    .well_mut(&well_name)?
                    .set_completion_states(step, i, j, k, state);
                builder.events.add(ScheduleEvent::CompletionChange, step);
                builder
                    .wellgroup_events
                    .add(&well_name, ScheduleEvent::CompletionChange, step);
                let all_shut = builder.well_mut(&well_name)?.completions(step).all_shut();
                if all_shut {
                    builder.set_well_status(&well_name, WellStatus::Shut)?;
                }
            } else {
                let status: WellStatus = status_text.parse()?;
                builder.set_well_status(&well_name, status)?;
            }
        }
    }
    Ok(())
}

/// WGRUPCON: `WELL AVAILABLE GUIDE_RATE PHASE SCALING`.
fn handle_wgrupcon(builder: &mut Builder<'_>, keyword: &DeckKeyword) -> Result<(), ScheduleError> {
    let step = builder.current_step;

    for record in keyword.records() {
        let well_name = required_str(record, 0, "a well name")?.to_string();
        let available = yes_no(record.str_or(1, "YES"))?;
        let guide_rate = record.double_or(2, -1.0);
        let phase = match record.item(3).as_str() {
            Some(text) => text.parse()?,
            None => Default::default(),
        };
        let scaling = record.double_or(4, 1.0);

        let well = builder.well_mut(&well_name)?;
        well.set_available_for_group_control(step, available);
        well.set_guide_rate(step, guide_rate);
        well.set_guide_rate_phase(step, phase);
        well.set_guide_rate_scaling(step, scaling);
    }
    Ok(())
}

/// GRUPTREE: `CHILD [PARENT]` pairs; parent defaults to FIELD.
fn handle_gruptree(builder: &mut Builder<'_>, keyword: &DeckKeyword) -> Result<(), ScheduleError> {
    let step = builder.current_step;
    let context = ErrorContext::step(step);
    let mut tree = builder.group_tree.get(step).clone();

    for record in keyword.records() {
        let child = required_str(record, 0, "a child group name")?.to_string();
        let parent = record.str_or(1, FIELD).to_string();

        // A parent named for the first time hangs off the root itself.
        if !tree.contains(&parent) {
            tree = tree.with_parent(&parent, FIELD, &context)?;
        }
        tree = tree.with_parent(&child, &parent, &context)?;

        builder.ensure_group(&parent)?;
        builder.ensure_group(&child)?;
        builder
            .wellgroup_events
            .add(&child, ScheduleEvent::GroupChange, step);
    }

    builder.group_tree.update(step, tree);
    builder.events.add(ScheduleEvent::GroupChange, step);
    Ok(())
}

/// GCONPROD: `GROUP CMODE ORAT WRAT GRAT LRAT RESV`.
fn handle_gconprod(builder: &mut Builder<'_>, keyword: &DeckKeyword) -> Result<(), ScheduleError> {
    let step = builder.current_step;

    for record in keyword.records() {
        let group_name = required_str(record, 0, "a group name")?;
        let properties = GroupProductionProperties {
            control_mode: record.str_or(1, "NONE").parse()?,
            oil_target: record.double_or(2, 0.0),
            water_target: record.double_or(3, 0.0),
            gas_target: record.double_or(4, 0.0),
            liquid_target: record.double_or(5, 0.0),
            resv_target: record.double_or(6, 0.0),
        };
        let group = builder.groups.get_mut(group_name).ok_or_else(|| {
            ScheduleError::UnknownGroup {
                name: group_name.to_string(),
                context: ErrorContext::step(step),
            }
        })?;
        group.set_production_properties(step, properties);
    }
    Ok(())
}

/// GCONINJE: `GROUP PHASE CMODE SURFACE_TARGET RESV_TARGET REINJ VOIDAGE`.
fn handle_gconinje(builder: &mut Builder<'_>, keyword: &DeckKeyword) -> Result<(), ScheduleError> {
    let step = builder.current_step;

    for record in keyword.records() {
        let group_name = required_str(record, 0, "a group name")?;
        let properties = GroupInjectionProperties {
            phase: record.str_or(1, "WATER").parse()?,
            control_mode: record.str_or(2, "NONE").parse()?,
            surface_max_rate: record.double_or(3, 0.0),
            reservoir_max_rate: record.double_or(4, 0.0),
            target_reinject_fraction: record.double_or(5, 0.0),
            target_void_replacement_fraction: record.double_or(6, 0.0),
        };
        let group = builder.groups.get_mut(group_name).ok_or_else(|| {
            ScheduleError::UnknownGroup {
                name: group_name.to_string(),
                context: ErrorContext::step(step),
            }
        })?;
        group.set_injection_properties(step, properties);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::Item;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2007, 6, 19)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn welspecs(name: &str, group: &str, i: i64, j: i64) -> DeckKeyword {
        DeckKeyword::new("WELSPECS", Section::Schedule).record(vec![
            Item::str(name),
            Item::str(group),
            Item::int(i),
            Item::int(j),
            Item::defaulted(),
            Item::str("OIL"),
        ])
    }

    #[test]
    fn test_dispatch_table_covers_well_and_group_keywords() {
        for name in [
            "WELSPECS", "COMPDAT", "COMPORD", "WCONPROD", "WCONHIST", "WCONINJE", "WELOPEN",
            "WGRUPCON", "GRUPTREE", "GCONPROD", "GCONINJE",
        ] {
            assert!(handler(name).is_some(), "{} has no handler", name);
        }
        assert!(handler("TUNING").is_none());
        assert!(handler("RPTRST").is_none());
    }

    #[test]
    fn test_empty_deck_has_field_group_only() {
        let deck = Deck::new(start());
        let schedule = Schedule::from_deck(&deck, &ParsePolicy::strict()).unwrap();
        assert_eq!(schedule.size(), 1);
        assert_eq!(schedule.num_wells(), 0);
        assert_eq!(schedule.num_groups(), 1);
        assert!(schedule.has_group(FIELD));
        assert!(schedule.has_event(ScheduleEvent::NewGroup, 0));
    }

    #[test]
    fn test_keyword_before_dates_applies_at_step_zero() {
        let deck = Deck::new(start())
            .keyword(welspecs("OP_1", "G1", 9, 9))
            .keyword(
                DeckKeyword::new("DATES", Section::Schedule).record(vec![
                    Item::int(10),
                    Item::str("OKT"),
                    Item::int(2008),
                ]),
            );
        let schedule = Schedule::from_deck(&deck, &ParsePolicy::strict()).unwrap();
        assert!(schedule.well("OP_1", 0).is_ok());
        assert!(schedule.has_event(ScheduleEvent::NewWell, 0));
        assert_eq!(schedule.well("OP_1", 0).unwrap().group(), Some("G1"));
    }

    #[test]
    fn test_schedule_is_shareable_across_reader_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Schedule>();
    }

    #[test]
    fn test_unknown_well_reference_fails_construction() {
        let deck = Deck::new(start()).keyword(
            DeckKeyword::new("COMPDAT", Section::Schedule).record(vec![
                Item::str("NO_SUCH_WELL"),
                Item::int(1),
                Item::int(1),
                Item::int(1),
                Item::int(1),
            ]),
        );
        let err = Schedule::from_deck(&deck, &ParsePolicy::strict()).unwrap_err();
        assert!(matches!(err, ScheduleError::UnknownWell { .. }));
        let context = err.context();
        assert_eq!(context.keyword.as_deref(), Some("COMPDAT"));
        assert_eq!(context.step, Some(0));
    }
}
