//! Groups: the well-allocation tree and per-group control state.
//!
//! The group graph is a tree rooted at FIELD. GRUPTREE records may reparent
//! an existing group; the detach-and-attach is atomic at the report step it
//! happens, and a record that would make a group its own ancestor fails
//! schedule construction.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dynamic::DynamicState;
use crate::errors::{ErrorContext, ScheduleError};
use crate::wells::Phase;

/// Name of the implicit root group.
pub const FIELD: &str = "FIELD";

/// Group production control modes (GCONPROD item 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GroupProductionControl {
    #[default]
    None,
    Orat,
    Wrat,
    Grat,
    Lrat,
    Resv,
    Fld,
}

impl FromStr for GroupProductionControl {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NONE" => Ok(GroupProductionControl::None),
            "ORAT" => Ok(GroupProductionControl::Orat),
            "WRAT" => Ok(GroupProductionControl::Wrat),
            "GRAT" => Ok(GroupProductionControl::Grat),
            "LRAT" => Ok(GroupProductionControl::Lrat),
            "RESV" => Ok(GroupProductionControl::Resv),
            "FLD" => Ok(GroupProductionControl::Fld),
            other => Err(ScheduleError::MalformedRecord {
                message: format!("'{}' is not a group production control", other),
                context: ErrorContext::new(),
            }),
        }
    }
}

/// Group injection control modes (GCONINJE item 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GroupInjectionControl {
    #[default]
    None,
    Rate,
    Resv,
    Rein,
    Vrep,
    Fld,
}

impl FromStr for GroupInjectionControl {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NONE" => Ok(GroupInjectionControl::None),
            "RATE" => Ok(GroupInjectionControl::Rate),
            "RESV" => Ok(GroupInjectionControl::Resv),
            "REIN" => Ok(GroupInjectionControl::Rein),
            "VREP" => Ok(GroupInjectionControl::Vrep),
            "FLD" => Ok(GroupInjectionControl::Fld),
            other => Err(ScheduleError::MalformedRecord {
                message: format!("'{}' is not a group injection control", other),
                context: ErrorContext::new(),
            }),
        }
    }
}

/// Production targets set by GCONPROD.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupProductionProperties {
    pub control_mode: GroupProductionControl,
    pub oil_target: f64,
    pub water_target: f64,
    pub gas_target: f64,
    pub liquid_target: f64,
    pub resv_target: f64,
}

/// Injection targets set by GCONINJE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupInjectionProperties {
    pub phase: Phase,
    pub control_mode: GroupInjectionControl,
    pub surface_max_rate: f64,
    pub reservoir_max_rate: f64,
    pub target_reinject_fraction: f64,
    pub target_void_replacement_fraction: f64,
}

impl Default for GroupInjectionProperties {
    fn default() -> Self {
        Self {
            phase: Phase::Water,
            control_mode: GroupInjectionControl::None,
            surface_max_rate: 0.0,
            reservoir_max_rate: 0.0,
            target_reinject_fraction: 0.0,
            target_void_replacement_fraction: 0.0,
        }
    }
}

/// The parent relation of every group other than FIELD.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupTree {
    parent: BTreeMap<String, String>,
}

impl GroupTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` is in the tree. FIELD always is.
    pub fn contains(&self, name: &str) -> bool {
        name == FIELD || self.parent.contains_key(name)
    }

    /// The parent of `name`; `None` for FIELD and unknown groups.
    pub fn parent(&self, name: &str) -> Option<&str> {
        self.parent.get(name).map(String::as_str)
    }

    /// The child groups of `name`, in name order.
    pub fn children(&self, name: &str) -> Vec<&str> {
        self.parent
            .iter()
            .filter(|(_, parent)| parent.as_str() == name)
            .map(|(child, _)| child.as_str())
            .collect()
    }

    /// Every group name in the tree, FIELD included.
    pub fn groups(&self) -> BTreeSet<&str> {
        let mut names: BTreeSet<&str> = self.parent.keys().map(String::as_str).collect();
        names.insert(FIELD);
        names
    }

    /// A copy of the tree with `child` attached under `parent`, detaching it
    /// from any previous parent. Fails when the attachment would create a
    /// cycle or move the root.
    pub fn with_parent(
        &self,
        child: &str,
        parent: &str,
        context: &ErrorContext,
    ) -> Result<GroupTree, ScheduleError> {
        if child == FIELD {
            return Err(ScheduleError::Cycle {
                message: format!("cannot reparent the root group {}", FIELD),
                context: context.clone(),
            });
        }

        // Walking up from the new parent must not pass through the child.
        let mut ancestor = Some(parent);
        while let Some(name) = ancestor {
            if name == child {
                return Err(ScheduleError::Cycle {
                    message: format!("'{}' would become its own ancestor", child),
                    context: context.clone(),
                });
            }
            ancestor = self.parent(name);
        }

        let mut tree = self.clone();
        tree.parent.insert(child.to_string(), parent.to_string());
        Ok(tree)
    }
}

/// One group's timeline of state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    name: String,
    creation_step: usize,
    production: DynamicState<GroupProductionProperties>,
    injection: DynamicState<GroupInjectionProperties>,
    production_group: DynamicState<bool>,
    wells: DynamicState<BTreeSet<String>>,
}

impl Group {
    pub(crate) fn new(name: String, num_steps: usize, creation_step: usize) -> Self {
        Self {
            name,
            creation_step,
            production: DynamicState::new(num_steps, GroupProductionProperties::default()),
            injection: DynamicState::new(num_steps, GroupInjectionProperties::default()),
            production_group: DynamicState::new(num_steps, true),
            wells: DynamicState::new(num_steps, BTreeSet::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn creation_step(&self) -> usize {
        self.creation_step
    }

    pub fn has_been_defined(&self, step: usize) -> bool {
        step >= self.creation_step
    }

    pub fn production_properties(&self, step: usize) -> &GroupProductionProperties {
        self.production.get(step)
    }

    pub fn injection_properties(&self, step: usize) -> &GroupInjectionProperties {
        self.injection.get(step)
    }

    /// Whether the group is currently a production group (GCONPROD) rather
    /// than an injection group (GCONINJE).
    pub fn is_production_group(&self, step: usize) -> bool {
        *self.production_group.get(step)
    }

    pub(crate) fn set_production_properties(
        &mut self,
        step: usize,
        properties: GroupProductionProperties,
    ) {
        self.production.update(step, properties);
        self.production_group.update(step, true);
    }

    pub(crate) fn set_injection_properties(
        &mut self,
        step: usize,
        properties: GroupInjectionProperties,
    ) {
        self.injection.update(step, properties);
        self.production_group.update(step, false);
    }

    pub fn has_well(&self, name: &str, step: usize) -> bool {
        self.wells.get(step).contains(name)
    }

    pub fn wells(&self, step: usize) -> &BTreeSet<String> {
        self.wells.get(step)
    }

    pub(crate) fn add_well(&mut self, step: usize, name: &str) {
        let mut wells = self.wells.get(step).clone();
        wells.insert(name.to_string());
        self.wells.update(step, wells);
    }

    pub(crate) fn del_well(&mut self, step: usize, name: &str) {
        let mut wells = self.wells.get(step).clone();
        wells.remove(name);
        self.wells.update(step, wells);
    }

    /// A read-only snapshot of this group at `step`, resolved against the
    /// group tree in force at that step.
    pub fn view<'a>(&'a self, tree: &'a GroupTree, step: usize) -> GroupView<'a> {
        GroupView {
            group: self,
            tree,
            step,
        }
    }
}

/// A group frozen at one report step.
#[derive(Debug, Clone, Copy)]
pub struct GroupView<'a> {
    group: &'a Group,
    tree: &'a GroupTree,
    step: usize,
}

impl<'a> GroupView<'a> {
    pub fn name(&self) -> &'a str {
        self.group.name()
    }

    pub fn step(&self) -> usize {
        self.step
    }

    /// The parent group; `None` for FIELD.
    pub fn parent(&self) -> Option<&'a str> {
        self.tree.parent(self.group.name())
    }

    /// Whether `name` is a direct child group at this step.
    pub fn has_group(&self, name: &str) -> bool {
        self.tree.parent(name) == Some(self.group.name())
    }

    /// The direct child groups, in name order.
    pub fn groups(&self) -> Vec<&'a str> {
        self.tree.children(self.group.name())
    }

    pub fn has_well(&self, name: &str) -> bool {
        self.group.has_well(name, self.step)
    }

    pub fn wells(&self) -> &'a BTreeSet<String> {
        self.group.wells(self.step)
    }

    pub fn production_properties(&self) -> &'a GroupProductionProperties {
        self.group.production_properties(self.step)
    }

    pub fn injection_properties(&self) -> &'a GroupInjectionProperties {
        self.group.injection_properties(self.step)
    }

    pub fn is_production_group(&self) -> bool {
        self.group.is_production_group(self.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ErrorContext {
        ErrorContext::new()
    }

    #[test]
    fn test_tree_attach_and_reparent() {
        let tree = GroupTree::new();
        let tree = tree.with_parent("G1", FIELD, &ctx()).unwrap();
        let tree = tree.with_parent("G2", "G1", &ctx()).unwrap();
        assert_eq!(tree.parent("G2"), Some("G1"));
        assert_eq!(tree.children("G1"), vec!["G2"]);

        // Reparent G2 directly under FIELD.
        let tree = tree.with_parent("G2", FIELD, &ctx()).unwrap();
        assert_eq!(tree.parent("G2"), Some(FIELD));
        assert!(tree.children("G1").is_empty());
    }

    #[test]
    fn test_tree_rejects_cycles() {
        let tree = GroupTree::new()
            .with_parent("A", FIELD, &ctx())
            .unwrap()
            .with_parent("B", "A", &ctx())
            .unwrap()
            .with_parent("C", "B", &ctx())
            .unwrap();

        let err = tree.with_parent("A", "C", &ctx()).unwrap_err();
        assert!(matches!(err, ScheduleError::Cycle { .. }));

        // Self-parenting is the smallest cycle.
        assert!(tree.with_parent("A", "A", &ctx()).is_err());
    }

    #[test]
    fn test_tree_root_cannot_move() {
        let tree = GroupTree::new();
        assert!(tree.with_parent(FIELD, "G1", &ctx()).is_err());
    }

    #[test]
    fn test_group_well_membership_carry_forward() {
        let mut group = Group::new("G1".to_string(), 6, 0);
        group.add_well(2, "OP_1");
        assert!(!group.has_well("OP_1", 1));
        assert!(group.has_well("OP_1", 2));
        assert!(group.has_well("OP_1", 5));

        group.del_well(4, "OP_1");
        assert!(group.has_well("OP_1", 3));
        assert!(!group.has_well("OP_1", 4));
    }
}
