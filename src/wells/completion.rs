//! Completions: the perforated cells connecting a well to the grid.
//!
//! A well exposes its completions in one of two orders. INPUT preserves the
//! literal COMPDAT declaration order. TRACK orders by distance from the well
//! head along the trajectory, which for a vertical well degrades to
//! ascending K; the distance key is computed from grid cell centers when a
//! completion is added, so the set re-sorts itself on every addition.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::deck::DeckRecord;
use crate::errors::{ErrorContext, ScheduleError};
use crate::geometry::GridGeometry;

/// Open/shut state of one completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompletionState {
    #[default]
    Open,
    Shut,
    Auto,
}

impl FromStr for CompletionState {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(CompletionState::Open),
            "SHUT" => Ok(CompletionState::Shut),
            "AUTO" => Ok(CompletionState::Auto),
            other => Err(ScheduleError::MalformedRecord {
                message: format!("'{}' is not a completion state", other),
                context: ErrorContext::new(),
            }),
        }
    }
}

/// Penetration direction of one completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompletionDirection {
    X,
    Y,
    #[default]
    Z,
}

impl FromStr for CompletionDirection {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "X" => Ok(CompletionDirection::X),
            "Y" => Ok(CompletionDirection::Y),
            "Z" => Ok(CompletionDirection::Z),
            other => Err(ScheduleError::MalformedRecord {
                message: format!("'{}' is not a penetration direction", other),
                context: ErrorContext::new(),
            }),
        }
    }
}

/// Completion ordering mode, selected per well by COMPORD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompletionOrder {
    #[default]
    Track,
    Input,
}

impl FromStr for CompletionOrder {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TRACK" => Ok(CompletionOrder::Track),
            "INPUT" => Ok(CompletionOrder::Input),
            other => Err(ScheduleError::Unsupported {
                message: format!("completion ordering '{}' (only TRACK and INPUT)", other),
                context: ErrorContext::new(),
            }),
        }
    }
}

/// One perforated cell. Identity is the zero-based (i, j, k) index; the
/// insertion sequence breaks ordering ties and realizes INPUT order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    i: i32,
    j: i32,
    k: i32,
    state: CompletionState,
    transmissibility: Option<f64>,
    diameter: Option<f64>,
    skin: f64,
    direction: CompletionDirection,
    seq: usize,
    distance: f64,
}

impl Completion {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        i: i32,
        j: i32,
        k: i32,
        state: CompletionState,
        transmissibility: Option<f64>,
        diameter: Option<f64>,
        skin: f64,
        direction: CompletionDirection,
    ) -> Self {
        Self {
            i,
            j,
            k,
            state,
            transmissibility,
            diameter,
            skin,
            direction,
            seq: 0,
            distance: 0.0,
        }
    }

    pub fn i(&self) -> i32 {
        self.i
    }

    pub fn j(&self) -> i32 {
        self.j
    }

    pub fn k(&self) -> i32 {
        self.k
    }

    pub fn cell(&self) -> (i32, i32, i32) {
        (self.i, self.j, self.k)
    }

    pub fn state(&self) -> CompletionState {
        self.state
    }

    pub fn set_state(&mut self, state: CompletionState) {
        self.state = state;
    }

    pub fn transmissibility(&self) -> Option<f64> {
        self.transmissibility
    }

    pub fn diameter(&self) -> Option<f64> {
        self.diameter
    }

    pub fn skin(&self) -> f64 {
        self.skin
    }

    pub fn direction(&self) -> CompletionDirection {
        self.direction
    }

    /// Along-track sort key, fixed when the completion is added.
    pub fn distance(&self) -> f64 {
        self.distance
    }
}

/// A well's completions in their exposed order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompletionSet {
    completions: Vec<Completion>,
    order: CompletionOrder,
    next_seq: usize,
}

impl CompletionSet {
    pub fn new(order: CompletionOrder) -> Self {
        Self {
            completions: Vec::new(),
            order,
            next_seq: 0,
        }
    }

    pub fn order(&self) -> CompletionOrder {
        self.order
    }

    pub fn len(&self) -> usize {
        self.completions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Completion> {
        self.completions.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Completion> {
        self.completions.iter()
    }

    /// Add or update a completion. The same cell updates in place, keeping
    /// its insertion sequence; under TRACK the set re-sorts afterwards.
    pub fn add(&mut self, mut completion: Completion, distance: f64) {
        completion.distance = distance;
        match self
            .completions
            .iter_mut()
            .find(|c| c.cell() == completion.cell())
        {
            Some(existing) => {
                completion.seq = existing.seq;
                *existing = completion;
            }
            None => {
                completion.seq = self.next_seq;
                self.next_seq += 1;
                self.completions.push(completion);
            }
        }
        if self.order == CompletionOrder::Track {
            self.completions.sort_by(|a, b| {
                a.distance
                    .partial_cmp(&b.distance)
                    .unwrap_or(Ordering::Equal)
                    .then(a.seq.cmp(&b.seq))
            });
        }
    }

    /// Set the state of every completion matching the (optional) cell
    /// filter; returns how many matched.
    pub fn set_state_where(
        &mut self,
        i: Option<i32>,
        j: Option<i32>,
        k: Option<i32>,
        state: CompletionState,
    ) -> usize {
        let mut matched = 0;
        for completion in &mut self.completions {
            if i.is_some_and(|v| v != completion.i)
                || j.is_some_and(|v| v != completion.j)
                || k.is_some_and(|v| v != completion.k)
            {
                continue;
            }
            completion.state = state;
            matched += 1;
        }
        matched
    }

    /// True when every completion is shut.
    pub fn all_shut(&self) -> bool {
        !self.completions.is_empty()
            && self
                .completions
                .iter()
                .all(|c| c.state() == CompletionState::Shut)
    }
}

/// Expand one COMPDAT record into completions.
///
/// Record layout: `WELL I J K1 K2 STATE SATNUM TRANS DIAMETER KH SKIN
/// DFACTOR DIRECTION`, all cell indices one-based; a zero or defaulted I/J
/// inherits the well head location. Returns zero-based completions, one per
/// K in the K1..=K2 range.
pub(crate) fn completions_from_record(
    record: &DeckRecord,
    head_i: i32,
    head_j: i32,
) -> Result<Vec<Completion>, ScheduleError> {
    let malformed = |message: String| ScheduleError::MalformedRecord {
        message,
        context: ErrorContext::new(),
    };

    let i = match record.int_or(1, 0) {
        0 => head_i,
        v => v as i32 - 1,
    };
    let j = match record.int_or(2, 0) {
        0 => head_j,
        v => v as i32 - 1,
    };

    let k1 = record.int_or(3, 0);
    let k2 = record.int_or(4, k1);
    if k1 < 1 || k2 < k1 {
        return Err(malformed(format!("bad completion layer range {}..{}", k1, k2)));
    }

    let state: CompletionState = record.str_or(5, "OPEN").parse()?;
    let transmissibility = record.item(7).as_double();
    let diameter = record.item(8).as_double();
    let skin = record.double_or(10, 0.0);
    let direction: CompletionDirection = record.str_or(12, "Z").parse()?;

    Ok((k1..=k2)
        .map(|k| {
            Completion::new(
                i,
                j,
                k as i32 - 1,
                state,
                transmissibility,
                diameter,
                skin,
                direction,
            )
        })
        .collect())
}

/// Distance from the well head to a completion cell, the TRACK sort key.
///
/// The head reference point is the top-layer cell at the well head I/J;
/// deviated trajectories are approximated by straight-line distance from
/// that point.
pub(crate) fn track_distance(
    grid: &dyn GridGeometry,
    head_i: i32,
    head_j: i32,
    cell: (i32, i32, i32),
) -> f64 {
    grid.distance((head_i, head_j, 0), cell)
}
