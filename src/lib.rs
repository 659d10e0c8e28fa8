//! A report-step schedule engine for ECLIPSE-style simulation decks.
//!
//! The engine consumes an already-parsed keyword stream (see [`deck`]) and
//! builds, in one pass, an immutable per-step view of wells, groups,
//! completions and restart-output policy: DATES/TSTEP advance the report
//! step, every other keyword mutates the sub-state it concerns with
//! carry-forward semantics, and the RPTRST/RPTSCHED/RPTSOL/SAVE keywords
//! feed the restart cadence rules.
//!
//! Construction is strict by default ([`ParsePolicy`]); the finished
//! [`Schedule`] is immutable and safe to share across reader threads.

pub mod deck;
pub mod dynamic;
pub mod errors;
pub mod geometry;
pub mod groups;
pub mod policy;
pub mod restart;
pub mod schedule;
pub mod time;
pub mod wells;

pub use crate::deck::{Deck, DeckKeyword, DeckRecord, Item, Section};
pub use crate::errors::{ErrorContext, ScheduleError};
pub use crate::geometry::{CartesianGrid, GridGeometry};
pub use crate::groups::{FIELD, Group, GroupTree, GroupView};
pub use crate::policy::{ErrorAction, ParsePolicy};
pub use crate::restart::{RestartConfig, RestartRequest, RestartSchedule};
pub use crate::schedule::Schedule;
pub use crate::schedule::events::{EventSet, ScheduleEvent};
pub use crate::time::TimeMap;
pub use crate::wells::{
    Completion, CompletionOrder, CompletionSet, CompletionState, Well, WellStatus, WellView,
};
