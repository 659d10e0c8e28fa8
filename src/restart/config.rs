//! Per-step restart-output decisions.
//!
//! [`RestartConfig`] walks the SOLUTION and SCHEDULE sections once, resolves
//! every report-control occurrence through [`RestartRequest`], and freezes a
//! per-step timeline of cadence nodes, carried keyword sets and SAVE marks.
//! A report-control keyword between two date records governs the *upcoming*
//! report step; occurrences after the final date record have nothing left to
//! govern and are dropped.
//!
//! Once built, the config only answers queries; a later policy change can
//! never rewrite an already-elapsed step.

use std::collections::{BTreeMap, BTreeSet};

use crate::deck::{Deck, DeckKeyword, Section};
use crate::dynamic::DynamicState;
use crate::errors::{ErrorContext, ScheduleError};
use crate::policy::ParsePolicy;
use crate::restart::mnemonics::is_rptrst_mnemonic;
use crate::restart::parse::{RptToken, classify_token};
use crate::restart::request::{RestartRequest, RestartSchedule};
use crate::time::TimeMap;

/// Mnemonics that steer the cadence rather than request an output array.
const CADENCE_CONTROLS: [&str; 3] = ["BASIC", "FREQ", "RESTART"];

/// The frozen restart-output policy of a schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct RestartConfig {
    time_map: TimeMap,
    write_initial_rst: bool,
    schedule: DynamicState<RestartSchedule>,
    keywords: DynamicState<BTreeMap<String, i64>>,
    save: Vec<bool>,
    first_restart_step: Option<usize>,
}

impl RestartConfig {
    /// Build the restart policy from the deck's SOLUTION and SCHEDULE
    /// sections against a completed time map.
    pub fn from_deck(
        time_map: &TimeMap,
        deck: &Deck,
        policy: &ParsePolicy,
    ) -> Result<Self, ScheduleError> {
        let mut config = Self {
            time_map: time_map.clone(),
            write_initial_rst: false,
            schedule: DynamicState::new(time_map.size(), RestartSchedule::initial()),
            keywords: DynamicState::new(time_map.size(), BTreeMap::new()),
            save: vec![false; time_map.size()],
            first_restart_step: None,
        };
        config.handle_solution_section(deck, policy)?;
        config.handle_schedule_section(deck, policy)?;
        config.init_first_output();
        Ok(config)
    }

    fn handle_solution_section(
        &mut self,
        deck: &Deck,
        policy: &ParsePolicy,
    ) -> Result<(), ScheduleError> {
        if let Some(keyword) = deck.find("RPTRST", Section::Solution) {
            let context = ErrorContext::at("RPTRST", Section::Solution, 0);
            let request = RestartRequest::rptrst(keyword, policy, &context)?;

            self.keywords.update_initial(request.mnemonics().clone());
            if request.basic().is_some() || request.freq().is_some() {
                let node = RestartSchedule::new(
                    0,
                    request.basic().unwrap_or(0),
                    request.freq().unwrap_or(0),
                );
                check_supported(&node, &context)?;
                self.schedule.update_initial(node);
            }

            // The reference simulator writes the initial restart file
            // whenever RPTRST appears in SOLUTION, whatever its content.
            // RPTSOL RESTART below may still turn it off again.
            self.write_initial_rst = true;
        }

        if let Some(keyword) = deck.find("RPTSOL", Section::Solution) {
            self.handle_rptsol(keyword)?;
        }

        Ok(())
    }

    /// RPTSOL only matters for the step-0 write decision: mnemonic
    /// `RESTART=n` or, for integer-control decks, slot 7.
    fn handle_rptsol(&mut self, keyword: &DeckKeyword) -> Result<(), ScheduleError> {
        let items: Vec<_> = keyword.flattened_items().collect();

        let mut restart: Option<i64> = None;
        for item in &items {
            let Some(text) = item.as_str() else { continue };
            for piece in text.split_whitespace() {
                if let Ok(RptToken::Assign { name, value }) = classify_token(piece) {
                    if name == "RESTART" {
                        restart = Some(value);
                    }
                }
            }
        }

        if restart.is_none() && items.len() >= 7 {
            restart = items[6]
                .as_int()
                .or_else(|| items[6].as_str().and_then(|s| s.parse().ok()));
        }

        if let Some(value) = restart {
            self.write_initial_rst = value > 1;
        }
        Ok(())
    }

    fn handle_schedule_section(
        &mut self,
        deck: &Deck,
        policy: &ParsePolicy,
    ) -> Result<(), ScheduleError> {
        // A keyword between date N and date N+1 governs step N+1, so the
        // cursor leads the date count by one.
        let mut current_step = 1usize;

        for keyword in deck.section(Section::Schedule) {
            match keyword.name() {
                "DATES" => {
                    current_step += keyword.num_records();
                    continue;
                }
                "TSTEP" => {
                    current_step += keyword.records().map(|r| r.len()).sum::<usize>();
                    continue;
                }
                _ => {}
            }

            // Nothing after the final date record has a step to govern.
            if self.time_map.size() <= current_step {
                continue;
            }

            self.save[current_step] = keyword.name() == "SAVE";

            let is_rptrst = match keyword.name() {
                "RPTRST" => true,
                "RPTSCHED" => false,
                _ => continue,
            };

            let context = ErrorContext::at(keyword.name(), Section::Schedule, current_step);
            let prev = *self.schedule.back();

            let (request, node) = if is_rptrst {
                let request = RestartRequest::rptrst(keyword, policy, &context)?;
                let node = if request.basic().is_none() && request.freq().is_none() {
                    None
                } else {
                    Some(RestartSchedule::new(
                        current_step,
                        request.basic().unwrap_or(prev.basic()),
                        request.freq().unwrap_or(prev.frequency()),
                    ))
                };
                (request, node)
            } else {
                let request = RestartRequest::rptsched(keyword, policy, &context)?;
                let node = request.rptsched_restart().map(RestartSchedule::rptsched);
                (request, node)
            };

            // Carry the keyword set forward, new values winning; NOTHING
            // wipes the slate.
            let mut mnemonics = request.mnemonics().clone();
            for (name, value) in self.keywords.back().clone() {
                mnemonics.entry(name).or_insert(value);
            }
            if mnemonics.contains_key("NOTHING") {
                mnemonics.clear();
            }
            self.keywords.update(current_step, mnemonics);

            // The RPTSCHED RESTART switch is powerless while an interval
            // cadence (BASIC > 2) is in force.
            let ignore_restart = !is_rptrst && prev.basic() > 2;

            let Some(node) = node else { continue };
            if ignore_restart {
                continue;
            }
            check_supported(&node, &context)?;
            self.schedule.update(current_step, node);
        }

        Ok(())
    }

    /// The first step whose write decision is true decides whether writers
    /// open the restart file in create or append mode.
    fn init_first_output(&mut self) {
        self.first_restart_step = (0..self.time_map.size()).find(|s| self.write_rst_file(*s));
    }

    /// Whether a restart file is written at `step`.
    pub fn write_rst_file(&self, step: usize) -> bool {
        if step == 0 {
            return self.write_initial_rst;
        }
        if self.save[step] {
            log::warn!(
                "fast restart with SAVE is not supported; a standard restart file is written at step {}",
                step
            );
            return true;
        }
        self.schedule.get(step).write_restart_file(step, &self.time_map)
    }

    /// The extra output arrays requested at `step`: every carried mnemonic
    /// with a nonzero value, cadence controls excluded.
    pub fn rst_keywords(&self, step: usize) -> BTreeSet<String> {
        self.keywords
            .get(step)
            .iter()
            .filter(|(name, value)| {
                **value != 0 && !CADENCE_CONTROLS.contains(&name.as_str())
            })
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// The full carried mnemonic map at `step`, cadence controls included.
    pub fn restart_mnemonics(&self, step: usize) -> &BTreeMap<String, i64> {
        self.keywords.get(step)
    }

    /// The value of one mnemonic at `step`: its carried value, zero when a
    /// recognized mnemonic is simply absent, an error for unknown names.
    pub fn keyword_value(&self, name: &str, step: usize) -> Result<i64, ScheduleError> {
        if let Some(value) = self.keywords.get(step).get(name) {
            return Ok(*value);
        }
        if is_rptrst_mnemonic(name) {
            Ok(0)
        } else {
            Err(ScheduleError::UnknownMnemonic {
                name: name.to_string(),
                context: ErrorContext::step(step),
            })
        }
    }

    /// The cadence node in force at `step`.
    pub fn node(&self, step: usize) -> &RestartSchedule {
        self.schedule.get(step)
    }

    /// First step with a positive write decision, if any.
    pub fn first_restart_step(&self) -> Option<usize> {
        self.first_restart_step
    }
}

fn check_supported(
    node: &RestartSchedule,
    context: &ErrorContext,
) -> Result<(), ScheduleError> {
    if node.basic() == 6 || node.rptsched_restart() == Some(6) {
        return Err(ScheduleError::Unsupported {
            message: "RESTART=6 (write a restart file every solver timestep) is not supported"
                .to_string(),
            context: context.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::Item;
    use chrono::NaiveDate;

    fn start() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2007, 6, 19)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn dates(days: &[(i64, &str, i64)]) -> DeckKeyword {
        let mut kw = DeckKeyword::new("DATES", Section::Schedule);
        for (d, m, y) in days {
            kw = kw.record(vec![Item::int(*d), Item::str(*m), Item::int(*y)]);
        }
        kw
    }

    fn build(deck: &Deck, policy: &ParsePolicy) -> Result<RestartConfig, ScheduleError> {
        let time_map = TimeMap::from_deck(deck)?;
        RestartConfig::from_deck(&time_map, deck, policy)
    }

    #[test]
    fn test_solution_rptrst_forces_initial_write() {
        let deck = Deck::new(start())
            .keyword(
                DeckKeyword::new("RPTRST", Section::Solution)
                    .record(vec![Item::str("ACIP"), Item::str("KRG")]),
            )
            .keyword(dates(&[(10, "OKT", 2008)]));

        let config = build(&deck, &ParsePolicy::strict()).unwrap();
        assert!(config.write_rst_file(0));
        assert!(!config.write_rst_file(1));
        assert_eq!(config.first_restart_step(), Some(0));
    }

    #[test]
    fn test_rptsol_restart_gates_initial_write() {
        let deck = Deck::new(start())
            .keyword(
                DeckKeyword::new("RPTSOL", Section::Solution)
                    .record(vec![Item::str("RESTART=4")]),
            )
            .keyword(dates(&[(10, "OKT", 2008)]));
        let config = build(&deck, &ParsePolicy::strict()).unwrap();
        assert!(config.write_rst_file(0));

        let deck = Deck::new(start())
            .keyword(
                DeckKeyword::new("RPTSOL", Section::Solution)
                    .record(vec![Item::str("RESTART=1")]),
            )
            .keyword(dates(&[(10, "OKT", 2008)]));
        let config = build(&deck, &ParsePolicy::strict()).unwrap();
        assert!(!config.write_rst_file(0));
    }

    #[test]
    fn test_rptsol_integer_controls_slot_seven() {
        let deck = Deck::new(start())
            .keyword(DeckKeyword::new("RPTSOL", Section::Solution).record(
                (0..6).map(|_| Item::int(0)).chain([Item::int(2)]).collect(),
            ))
            .keyword(dates(&[(10, "OKT", 2008)]));
        let config = build(&deck, &ParsePolicy::strict()).unwrap();
        assert!(config.write_rst_file(0));
    }

    #[test]
    fn test_keywords_after_final_date_are_dropped() {
        let deck = Deck::new(start())
            .keyword(dates(&[(10, "OKT", 2008)]))
            .keyword(
                DeckKeyword::new("RPTRST", Section::Schedule)
                    .record(vec![Item::str("BASIC=1")]),
            );
        // The RPTRST would govern step 2, which does not exist.
        let config = build(&deck, &ParsePolicy::strict()).unwrap();
        assert!(!config.write_rst_file(0));
        assert!(!config.write_rst_file(1));
        assert_eq!(config.first_restart_step(), None);
    }

    #[test]
    fn test_unsupported_restart_six() {
        let deck = Deck::new(start())
            .keyword(
                DeckKeyword::new("RPTRST", Section::Schedule)
                    .record(vec![Item::str("BASIC=6")]),
            )
            .keyword(dates(&[(10, "OKT", 2008), (11, "OKT", 2008)]));
        let err = build(&deck, &ParsePolicy::strict()).unwrap_err();
        assert!(matches!(err, ScheduleError::Unsupported { .. }));
    }

    #[test]
    fn test_keyword_value_lookup() {
        let deck = Deck::new(start())
            .keyword(dates(&[(10, "OKT", 2008)]))
            .keyword(
                DeckKeyword::new("RPTRST", Section::Schedule)
                    .record(vec![Item::str("BASIC=3"), Item::str("FREQ=2")]),
            )
            .keyword(dates(&[(20, "JAN", 2010)]));

        let config = build(&deck, &ParsePolicy::strict()).unwrap();
        assert_eq!(config.keyword_value("BASIC", 2).unwrap(), 3);
        // Recognized but never requested.
        assert_eq!(config.keyword_value("ACIP", 2).unwrap(), 0);
        assert!(matches!(
            config.keyword_value("NOT_A_MNEMONIC", 2),
            Err(ScheduleError::UnknownMnemonic { .. })
        ));
    }
}
