//! Policy knobs controlling how forgiving deck interpretation is.
//!
//! The default policy is strict: every recoverable oddity in the input is a
//! construction error. Lenient handling of legacy decks (mixed
//! mnemonic/positional report controls, unknown mnemonics) must be requested
//! deliberately by the caller; it is never a silent default.

use serde::{Deserialize, Serialize};

/// What to do when a recoverable input deviation is encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorAction {
    /// Abort construction with an error.
    Error,
    /// Log a warning and apply the legacy-compatible interpretation.
    Warn,
    /// Silently apply the legacy-compatible interpretation.
    Ignore,
}

impl ErrorAction {
    /// True when this action aborts construction.
    pub fn is_error(self) -> bool {
        self == ErrorAction::Error
    }
}

/// Per-deviation policy for deck interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsePolicy {
    /// Mnemonic and positional styles mixed in one RPTRST/RPTSCHED occurrence.
    pub mixed_style: ErrorAction,
    /// Mnemonic name not present in the keyword's validity table.
    pub unknown_mnemonic: ErrorAction,
}

impl ParsePolicy {
    /// Reject every recoverable deviation.
    pub fn strict() -> Self {
        Self {
            mixed_style: ErrorAction::Error,
            unknown_mnemonic: ErrorAction::Error,
        }
    }

    /// Accept legacy decks: salvage mixed styles, skip unknown mnemonics,
    /// logging a warning for each.
    pub fn lenient() -> Self {
        Self {
            mixed_style: ErrorAction::Warn,
            unknown_mnemonic: ErrorAction::Warn,
        }
    }
}

impl Default for ParsePolicy {
    fn default() -> Self {
        Self::strict()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_strict() {
        let policy = ParsePolicy::default();
        assert!(policy.mixed_style.is_error());
        assert!(policy.unknown_mnemonic.is_error());
    }

    #[test]
    fn test_lenient_policy_warns() {
        let policy = ParsePolicy::lenient();
        assert_eq!(policy.mixed_style, ErrorAction::Warn);
        assert!(!policy.unknown_mnemonic.is_error());
    }
}
