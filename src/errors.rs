//! Error types for schedule construction and per-step queries.
//!
//! Every failure that aborts building a [`Schedule`](crate::Schedule) carries
//! an [`ErrorContext`] naming the keyword occurrence, deck section and report
//! step at which it was detected, so callers can point at the offending input
//! without re-walking the deck.

use std::fmt;

use thiserror::Error;

use crate::deck::Section;

/// Errors raised while building a schedule or answering per-step queries.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// A report-step timestamp did not strictly increase.
    #[error("non-increasing report step time{context}: {message}")]
    Ordering {
        message: String,
        context: ErrorContext,
    },

    /// Reference to a well that was never introduced with WELSPECS.
    #[error("unknown well '{name}'{context}")]
    UnknownWell { name: String, context: ErrorContext },

    /// Reference to a group that was never introduced.
    #[error("unknown group '{name}'{context}")]
    UnknownGroup { name: String, context: ErrorContext },

    /// Conflicting redefinition of an immutable identity field.
    #[error("conflicting redefinition of '{name}'{context}: {message}")]
    DuplicateDefinition {
        name: String,
        message: String,
        context: ErrorContext,
    },

    /// A GRUPTREE record would make a group its own ancestor.
    #[error("group tree cycle{context}: {message}")]
    Cycle {
        message: String,
        context: ErrorContext,
    },

    /// Mnemonic and positional styles mixed in one report-control keyword,
    /// rejected under the strict policy.
    #[error("mixed mnemonic and positional style{context}: {message}")]
    MixedMnemonicStyle {
        message: String,
        context: ErrorContext,
    },

    /// Unrecognized mnemonic name, rejected under the strict policy.
    #[error("unknown mnemonic '{name}'{context}")]
    UnknownMnemonic { name: String, context: ErrorContext },

    /// Report-control tokens that cannot be interpreted under any policy,
    /// such as a bare `NAME VALUE` pair without `=`.
    #[error("malformed report control syntax{context}: {message}")]
    MalformedRestartSyntax {
        message: String,
        context: ErrorContext,
    },

    /// Date lookup before the simulation start.
    #[error("date not covered by the time map{context}: {message}")]
    NotFound {
        message: String,
        context: ErrorContext,
    },

    /// A control mode was requested that the property bundle does not enable.
    #[error("invalid control mode{context}: {message}")]
    InvalidControl {
        message: String,
        context: ErrorContext,
    },

    /// A setting the engine deliberately refuses, e.g. `BASIC=6`.
    #[error("unsupported setting{context}: {message}")]
    Unsupported {
        message: String,
        context: ErrorContext,
    },

    /// A record whose items cannot be read as the keyword requires.
    #[error("malformed record{context}: {message}")]
    MalformedRecord {
        message: String,
        context: ErrorContext,
    },
}

impl ScheduleError {
    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            ScheduleError::Ordering { context, .. }
            | ScheduleError::UnknownWell { context, .. }
            | ScheduleError::UnknownGroup { context, .. }
            | ScheduleError::DuplicateDefinition { context, .. }
            | ScheduleError::Cycle { context, .. }
            | ScheduleError::MixedMnemonicStyle { context, .. }
            | ScheduleError::UnknownMnemonic { context, .. }
            | ScheduleError::MalformedRestartSyntax { context, .. }
            | ScheduleError::NotFound { context, .. }
            | ScheduleError::InvalidControl { context, .. }
            | ScheduleError::Unsupported { context, .. }
            | ScheduleError::MalformedRecord { context, .. } => context,
        }
    }

    /// Fill in any context fields that the error site left empty.
    ///
    /// The orchestrator uses this to stamp keyword name, section and report
    /// step onto errors bubbling up from the sub-states, which usually only
    /// know their local detail.
    pub fn with_context(mut self, outer: &ErrorContext) -> Self {
        let context = self.context_mut();
        if context.keyword.is_none() {
            context.keyword = outer.keyword.clone();
        }
        if context.section.is_none() {
            context.section = outer.section;
        }
        if context.step.is_none() {
            context.step = outer.step;
        }
        self
    }

    /// The context attached to this error.
    pub fn context(&self) -> &ErrorContext {
        match self {
            ScheduleError::Ordering { context, .. }
            | ScheduleError::UnknownWell { context, .. }
            | ScheduleError::UnknownGroup { context, .. }
            | ScheduleError::DuplicateDefinition { context, .. }
            | ScheduleError::Cycle { context, .. }
            | ScheduleError::MixedMnemonicStyle { context, .. }
            | ScheduleError::UnknownMnemonic { context, .. }
            | ScheduleError::MalformedRestartSyntax { context, .. }
            | ScheduleError::NotFound { context, .. }
            | ScheduleError::InvalidControl { context, .. }
            | ScheduleError::Unsupported { context, .. }
            | ScheduleError::MalformedRecord { context, .. } => context,
        }
    }
}

/// Location information carried by every construction error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// The keyword occurrence being processed (if known).
    pub keyword: Option<String>,
    /// The deck section the keyword was declared in.
    pub section: Option<Section>,
    /// The report step the keyword applies to.
    pub step: Option<usize>,
}

impl ErrorContext {
    /// An empty context; the orchestrator fills it in on the way out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for a keyword occurrence at a given report step.
    pub fn at<S: Into<String>>(keyword: S, section: Section, step: usize) -> Self {
        Self {
            keyword: Some(keyword.into()),
            section: Some(section),
            step: Some(step),
        }
    }

    /// Context naming only the report step.
    pub fn step(step: usize) -> Self {
        Self {
            keyword: None,
            section: None,
            step: Some(step),
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();

        if let Some(ref keyword) = self.keyword {
            parts.push(format!(" in keyword {}", keyword));
        }
        if let Some(section) = self.section {
            parts.push(format!(" ({} section)", section));
        }
        if let Some(step) = self.step {
            parts.push(format!(" at report step {}", step));
        }

        if parts.is_empty() {
            return Ok(());
        }

        write!(f, "{}", parts.join(""))
    }
}
