//! Resolution of one report-control keyword occurrence into a normalized
//! restart request.
//!
//! The two input styles — mnemonic tokens and the legacy positional integer
//! list — are classified up front and resolved through one pure function
//! each, so the compatibility quirks stay in this module:
//!
//! - a positional BASIC slot of zero means "leave the cadence alone", not
//!   "cadence off", and is therefore dropped;
//! - positional slot 27 of RPTRST drives both PCOW and PCOG;
//! - a positional FREQ slot counts as an explicit FREQ even when zero;
//! - `NAME = VALUE` written with spaces is salvaged back into `NAME=VALUE`
//!   when the mixed-style policy permits, while a bare `NAME VALUE` without
//!   `=` can never be disambiguated and always fails;
//! - ALLPROPS expands to its fixed array set at resolve time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::deck::DeckKeyword;
use crate::errors::{ErrorContext, ScheduleError};
use crate::policy::{ErrorAction, ParsePolicy};
use crate::restart::mnemonics::{
    ALLPROPS_EXPANSION, RST_INTEGER_KEYWORDS, SCHED_INTEGER_KEYWORDS, is_rptrst_mnemonic,
    is_rptsched_mnemonic,
};
use crate::restart::parse::{RptToken, tokenize};
use crate::time::TimeMap;

/// Which report-control keyword a token list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RptKind {
    Rptrst,
    Rptsched,
}

impl RptKind {
    fn is_valid(self, name: &str) -> bool {
        match self {
            RptKind::Rptrst => is_rptrst_mnemonic(name),
            RptKind::Rptsched => is_rptsched_mnemonic(name),
        }
    }

    /// Map a legacy positional integer list to its mnemonic values.
    fn positional(self, ints: &[i64]) -> BTreeMap<String, i64> {
        let mut mnemonics = BTreeMap::new();
        match self {
            RptKind::Rptrst => {
                let size = ints.len().min(RST_INTEGER_KEYWORDS.len());
                // A zero BASIC slot means "don't touch the cadence".
                if size > 0 && ints[0] != 0 {
                    mnemonics.insert(RST_INTEGER_KEYWORDS[0].to_string(), ints[0]);
                }
                for i in 1..size {
                    let name = RST_INTEGER_KEYWORDS[i];
                    if name.is_empty() {
                        continue;
                    }
                    mnemonics.insert(name.to_string(), ints[i]);
                }
                // Slot 27 drives both capillary-pressure arrays.
                if ints.len() > 26 {
                    mnemonics.insert("PCOW".to_string(), ints[26]);
                    mnemonics.insert("PCOG".to_string(), ints[26]);
                }
            }
            RptKind::Rptsched => {
                let size = ints.len().min(SCHED_INTEGER_KEYWORDS.len());
                for i in 0..size {
                    mnemonics.insert(SCHED_INTEGER_KEYWORDS[i].to_string(), ints[i]);
                }
            }
        }
        mnemonics
    }
}

/// Reassemble `NAME = VALUE` token triples into assignments.
///
/// Returns only `Flag` and `Assign` tokens. A bare integer that is not
/// preceded by a `NAME` `=` pair cannot be interpreted and is a hard error
/// regardless of policy.
fn salvage(tokens: &[RptToken], context: &ErrorContext) -> Result<Vec<RptToken>, ScheduleError> {
    let unsalvageable = |detail: &str| ScheduleError::MalformedRestartSyntax {
        message: format!("cannot interpret token list: {}", detail),
        context: context.clone(),
    };

    let mut out: Vec<RptToken> = Vec::new();
    let mut stack: Vec<RptToken> = Vec::new();

    for token in tokens {
        match token {
            RptToken::Integer(value) => {
                if stack.len() < 2 {
                    return Err(unsalvageable("bare integer amid mnemonics"));
                }
                if stack.last() != Some(&RptToken::Equals) {
                    return Err(unsalvageable("integer not preceded by '='"));
                }
                stack.pop();
                let name = match stack.pop() {
                    Some(RptToken::Flag(name)) => name,
                    _ => return Err(unsalvageable("'=' not preceded by a mnemonic name")),
                };
                out.append(&mut stack);
                out.push(RptToken::Assign {
                    name,
                    value: *value,
                });
            }
            other => stack.push(other.clone()),
        }
    }
    out.append(&mut stack);

    if out.contains(&RptToken::Equals) {
        return Err(unsalvageable("stray '='"));
    }
    Ok(out)
}

/// Resolve a token list into a mnemonic → value map.
fn resolve_map(
    keyword: &DeckKeyword,
    kind: RptKind,
    policy: &ParsePolicy,
    context: &ErrorContext,
) -> Result<BTreeMap<String, i64>, ScheduleError> {
    let mut tokens: Vec<RptToken> = Vec::new();
    for item in keyword.flattened_items() {
        if let Some(v) = item.as_int() {
            tokens.push(RptToken::Integer(v));
        } else if let Some(s) = item.as_str() {
            tokens.extend(tokenize(s).map_err(|bad| ScheduleError::MalformedRestartSyntax {
                message: format!("'{}' is not a report control token", bad),
                context: context.clone(),
            })?);
        } else {
            return Err(ScheduleError::MalformedRestartSyntax {
                message: "non-integer numeric item in report control list".to_string(),
                context: context.clone(),
            });
        }
    }

    let has_integers = tokens.iter().any(RptToken::is_integer);
    let all_integers = !tokens.is_empty() && tokens.iter().all(RptToken::is_integer);

    // A pure integer list is the slash-terminated positional style.
    if all_integers {
        let ints: Vec<i64> = tokens
            .iter()
            .map(|t| match t {
                RptToken::Integer(v) => *v,
                _ => unreachable!("all tokens are integers"),
            })
            .collect();
        return Ok(kind.positional(&ints));
    }

    let items = if has_integers || tokens.contains(&RptToken::Equals) {
        // Mixed style: the salvage pass decides whether the mix is even
        // interpretable before the policy decides whether to accept it.
        let salvaged = salvage(&tokens, context)?;
        match policy.mixed_style {
            ErrorAction::Error => {
                return Err(ScheduleError::MixedMnemonicStyle {
                    message: "mnemonic tokens mixed with bare integers".to_string(),
                    context: context.clone(),
                });
            }
            ErrorAction::Warn => {
                log::warn!(
                    "mixed mnemonic/positional style in {}; interpreting as mnemonics",
                    keyword.name()
                );
                salvaged
            }
            ErrorAction::Ignore => salvaged,
        }
    } else {
        tokens
    };

    let mut mnemonics = BTreeMap::new();
    for token in items {
        let (name, value) = match token {
            RptToken::Flag(name) => (name, 1),
            RptToken::Assign { name, value } => (name, value),
            RptToken::Integer(_) | RptToken::Equals => {
                unreachable!("salvage removed positional tokens")
            }
        };
        if !kind.is_valid(&name) {
            match policy.unknown_mnemonic {
                ErrorAction::Error => {
                    return Err(ScheduleError::UnknownMnemonic {
                        name,
                        context: context.clone(),
                    });
                }
                ErrorAction::Warn => {
                    log::warn!("mnemonic '{}' is not recognized by {}", name, keyword.name());
                    continue;
                }
                ErrorAction::Ignore => continue,
            }
        }
        // First occurrence wins within one keyword.
        mnemonics.entry(name).or_insert(value);
    }

    Ok(mnemonics)
}

fn expand_allprops(mnemonics: &mut BTreeMap<String, i64>) {
    if let Some(value) = mnemonics.remove("ALLPROPS") {
        for name in ALLPROPS_EXPANSION {
            mnemonics.insert(name.to_string(), value);
        }
    }
}

/// Normalized result of resolving one RPTRST or RPTSCHED occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestartRequest {
    mnemonics: BTreeMap<String, i64>,
    basic: Option<i64>,
    freq: Option<i64>,
    rptsched_restart: Option<i64>,
}

impl RestartRequest {
    /// Resolve an RPTRST (or RPTSOL-style) token list.
    pub fn rptrst(
        keyword: &DeckKeyword,
        policy: &ParsePolicy,
        context: &ErrorContext,
    ) -> Result<Self, ScheduleError> {
        let mut mnemonics = resolve_map(keyword, RptKind::Rptrst, policy, context)?;
        let basic = mnemonics.get("BASIC").copied();
        let freq = mnemonics.get("FREQ").copied();
        expand_allprops(&mut mnemonics);
        Ok(Self {
            mnemonics,
            basic,
            freq,
            rptsched_restart: None,
        })
    }

    /// Resolve an RPTSCHED token list.
    pub fn rptsched(
        keyword: &DeckKeyword,
        policy: &ParsePolicy,
        context: &ErrorContext,
    ) -> Result<Self, ScheduleError> {
        let mnemonics = resolve_map(keyword, RptKind::Rptsched, policy, context)?;
        let rptsched_restart = if mnemonics.contains_key("NOTHING") {
            Some(0)
        } else {
            mnemonics.get("RESTART").copied()
        };
        Ok(Self {
            mnemonics,
            basic: None,
            freq: None,
            rptsched_restart,
        })
    }

    pub fn mnemonics(&self) -> &BTreeMap<String, i64> {
        &self.mnemonics
    }

    pub fn basic(&self) -> Option<i64> {
        self.basic
    }

    pub fn freq(&self) -> Option<i64> {
        self.freq
    }

    pub fn rptsched_restart(&self) -> Option<i64> {
        self.rptsched_restart
    }

    /// True when the occurrence asked for NOTHING, clearing the carried
    /// keyword set.
    pub fn requests_nothing(&self) -> bool {
        self.mnemonics.contains_key("NOTHING")
    }
}

/// One node of the restart cadence timeline: the write rule in force from
/// a given report step onward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartSchedule {
    timestep: usize,
    basic: i64,
    frequency: i64,
    rptsched_restart: Option<i64>,
}

impl RestartSchedule {
    /// A cadence set by RPTRST: BASIC class plus FREQ multiplier.
    ///
    /// A defaulted (zero) FREQ with BASIC > 2 would mean "every 0th step";
    /// poorly written decks do this, so it reads as every qualifying step.
    pub fn new(timestep: usize, basic: i64, frequency: i64) -> Self {
        let frequency = if basic > 2 { frequency.max(1) } else { frequency };
        Self {
            timestep,
            basic,
            frequency,
            rptsched_restart: None,
        }
    }

    /// A cadence set by the RPTSCHED RESTART switch.
    pub fn rptsched(restart: i64) -> Self {
        Self {
            timestep: 0,
            basic: 0,
            frequency: 0,
            rptsched_restart: Some(restart),
        }
    }

    /// The inactive cadence in force before any report-control keyword.
    pub fn initial() -> Self {
        Self::new(0, 0, 1)
    }

    pub fn basic(&self) -> i64 {
        self.basic
    }

    pub fn frequency(&self) -> i64 {
        self.frequency
    }

    /// The report step this cadence took effect at.
    pub fn timestep(&self) -> usize {
        self.timestep
    }

    /// The RPTSCHED RESTART value, when this node came from RPTSCHED.
    pub fn rptsched_restart(&self) -> Option<i64> {
        self.rptsched_restart
    }

    /// Whether a restart file is written at `step` under this cadence.
    pub fn write_restart_file(&self, step: usize, time_map: &TimeMap) -> bool {
        if let Some(restart) = self.rptsched_restart {
            if restart > 0 {
                return true;
            }
        }

        match self.basic {
            // Every report step.
            1 | 2 => true,
            // Every n'th report step.
            3 => step % (self.frequency.max(1) as usize) == 0,
            // First report step of every n'th year.
            4 => time_map.is_in_freq_sequence(step, self.timestep, self.frequency, true),
            // First report step of every n'th month.
            5 => time_map.is_in_freq_sequence(step, self.timestep, self.frequency, false),
            _ => false,
        }
    }
}

impl Default for RestartSchedule {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{Item, Section};

    fn rptrst(tokens: &[&str]) -> DeckKeyword {
        let items = tokens.iter().map(|t| Item::str(*t)).collect();
        DeckKeyword::new("RPTRST", Section::Schedule).record(items)
    }

    fn rptrst_ints(ints: &[i64]) -> DeckKeyword {
        let items = ints.iter().map(|v| Item::int(*v)).collect();
        DeckKeyword::new("RPTRST", Section::Schedule).record(items)
    }

    fn ctx() -> ErrorContext {
        ErrorContext::new()
    }

    #[test]
    fn test_mnemonic_style_resolution() {
        let kw = rptrst(&["BASIC=3", "FREQ=2", "FLOWS"]);
        let req = RestartRequest::rptrst(&kw, &ParsePolicy::strict(), &ctx()).unwrap();
        assert_eq!(req.basic(), Some(3));
        assert_eq!(req.freq(), Some(2));
        assert_eq!(req.mnemonics().get("FLOWS"), Some(&1));
    }

    #[test]
    fn test_unknown_mnemonic_strict_vs_lenient() {
        let kw = rptrst(&["BASIC=3", "RUBBISH=5"]);
        let err = RestartRequest::rptrst(&kw, &ParsePolicy::strict(), &ctx()).unwrap_err();
        assert!(matches!(err, ScheduleError::UnknownMnemonic { .. }));

        let req = RestartRequest::rptrst(&kw, &ParsePolicy::lenient(), &ctx()).unwrap();
        assert!(!req.mnemonics().contains_key("RUBBISH"));
        assert_eq!(req.basic(), Some(3));
    }

    #[test]
    fn test_positional_style_resolution() {
        let kw = rptrst_ints(&[3, 0, 0, 0, 0, 2]);
        let req = RestartRequest::rptrst(&kw, &ParsePolicy::strict(), &ctx()).unwrap();
        assert_eq!(req.basic(), Some(3));
        assert_eq!(req.freq(), Some(2));
        assert_eq!(req.mnemonics().get("FIP"), Some(&0));
    }

    #[test]
    fn test_positional_basic_zero_is_dropped() {
        let kw = rptrst_ints(&[0, 1, 0, 0, 0, 0]);
        let req = RestartRequest::rptrst(&kw, &ParsePolicy::strict(), &ctx()).unwrap();
        assert_eq!(req.basic(), None);
        // FREQ slot zero still counts as explicitly supplied.
        assert_eq!(req.freq(), Some(0));
        assert_eq!(req.mnemonics().get("FLOWS"), Some(&1));
    }

    #[test]
    fn test_positional_pco_slot_feeds_both_arrays() {
        let mut ints = vec![0i64; 27];
        ints[26] = 1;
        let kw = rptrst_ints(&ints);
        let req = RestartRequest::rptrst(&kw, &ParsePolicy::strict(), &ctx()).unwrap();
        assert_eq!(req.mnemonics().get("PCOW"), Some(&1));
        assert_eq!(req.mnemonics().get("PCOG"), Some(&1));
    }

    #[test]
    fn test_allprops_expands_to_property_arrays() {
        let kw = rptrst(&["ALLPROPS"]);
        let req = RestartRequest::rptrst(&kw, &ParsePolicy::strict(), &ctx()).unwrap();
        assert!(!req.mnemonics().contains_key("ALLPROPS"));
        for name in ["BG", "BO", "BW", "KRG", "KRO", "KRW", "VOIL", "VGAS", "VWAT", "DEN"] {
            assert_eq!(req.mnemonics().get(name), Some(&1), "{} missing", name);
        }
    }

    #[test]
    fn test_spaced_assignment_is_salvaged_under_lenient_policy() {
        let kw = rptrst(&["ACIP", "KRG", "SFREQ", "=", "10", "BASIC", "=", "1"]);
        let err = RestartRequest::rptrst(&kw, &ParsePolicy::strict(), &ctx()).unwrap_err();
        assert!(matches!(err, ScheduleError::MixedMnemonicStyle { .. }));

        let req = RestartRequest::rptrst(&kw, &ParsePolicy::lenient(), &ctx()).unwrap();
        assert_eq!(req.basic(), Some(1));
        assert_eq!(req.mnemonics().get("SFREQ"), Some(&10));
        assert_eq!(req.mnemonics().get("ACIP"), Some(&1));
    }

    #[test]
    fn test_name_value_without_equals_always_fails() {
        let kw = rptrst(&["BASIC", "1"]);
        for policy in [ParsePolicy::strict(), ParsePolicy::lenient()] {
            let err = RestartRequest::rptrst(&kw, &policy, &ctx()).unwrap_err();
            assert!(
                matches!(err, ScheduleError::MalformedRestartSyntax { .. }),
                "expected hard failure under {:?}",
                policy
            );
        }
    }

    #[test]
    fn test_mnemonic_assignment_followed_by_bare_integers_always_fails() {
        let kw = rptrst(&["BASIC=3", "0", "1", "2"]);
        for policy in [ParsePolicy::strict(), ParsePolicy::lenient()] {
            assert!(RestartRequest::rptrst(&kw, &policy, &ctx()).is_err());
        }
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let kw = rptrst(&["BASIC=3", "FREQ=2", "FLOWS", "ALLPROPS"]);
        let a = RestartRequest::rptrst(&kw, &ParsePolicy::strict(), &ctx()).unwrap();
        let b = RestartRequest::rptrst(&kw, &ParsePolicy::strict(), &ctx()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rptsched_nothing_and_restart() {
        let kw = DeckKeyword::new("RPTSCHED", Section::Schedule)
            .record(vec![Item::str("RESTART=1")]);
        let req = RestartRequest::rptsched(&kw, &ParsePolicy::strict(), &ctx()).unwrap();
        assert_eq!(req.rptsched_restart(), Some(1));

        let kw = DeckKeyword::new("RPTSCHED", Section::Schedule)
            .record(vec![Item::str("NOTHING")]);
        let req = RestartRequest::rptsched(&kw, &ParsePolicy::strict(), &ctx()).unwrap();
        assert_eq!(req.rptsched_restart(), Some(0));
        assert!(req.requests_nothing());
    }

    #[test]
    fn test_cadence_clamps_zero_frequency_for_interval_classes() {
        let schedule = RestartSchedule::new(2, 3, 0);
        assert_eq!(schedule.frequency(), 1);
        let schedule = RestartSchedule::new(2, 1, 0);
        assert_eq!(schedule.frequency(), 0);
    }
}
