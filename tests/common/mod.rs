//! Shared deck-building helpers for the integration suites.
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use eclsched::deck::{Deck, DeckKeyword, Item, Section};

pub fn start(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// A DATES keyword with one record per (day, month-name, year) entry.
pub fn dates(entries: &[(i64, &str, i64)]) -> DeckKeyword {
    let mut keyword = DeckKeyword::new("DATES", Section::Schedule);
    for (day, month, year) in entries {
        keyword = keyword.record(vec![Item::int(*day), Item::str(*month), Item::int(*year)]);
    }
    keyword
}

/// A report-control keyword holding one record of string tokens.
pub fn rpt(name: &str, section: Section, tokens: &[&str]) -> DeckKeyword {
    DeckKeyword::new(name, section).record(tokens.iter().map(|t| Item::str(*t)).collect())
}

/// A report-control keyword holding one record of integer slots.
pub fn rpt_ints(name: &str, section: Section, ints: &[i64]) -> DeckKeyword {
    DeckKeyword::new(name, section).record(ints.iter().map(|v| Item::int(*v)).collect())
}

/// A WELSPECS keyword introducing one well.
pub fn welspecs(well: &str, group: &str, i: i64, j: i64, phase: &str) -> DeckKeyword {
    DeckKeyword::new("WELSPECS", Section::Schedule).record(vec![
        Item::str(well),
        Item::str(group),
        Item::int(i),
        Item::int(j),
        Item::defaulted(),
        Item::str(phase),
    ])
}

/// A COMPDAT record covering the layer range k1..=k2.
pub fn compdat_record(well: &str, i: i64, j: i64, k1: i64, k2: i64, state: &str) -> Vec<Item> {
    vec![
        Item::str(well),
        Item::int(i),
        Item::int(j),
        Item::int(k1),
        Item::int(k2),
        Item::str(state),
        Item::defaulted(),
        Item::double(32.948),
        Item::double(0.311),
    ]
}

/// A GRUPTREE keyword of (child, parent) pairs.
pub fn gruptree(pairs: &[(&str, &str)]) -> DeckKeyword {
    let mut keyword = DeckKeyword::new("GRUPTREE", Section::Schedule);
    for (child, parent) in pairs {
        keyword = keyword.record(vec![Item::str(*child), Item::str(*parent)]);
    }
    keyword
}

/// Eleven consecutive daily report steps, the timeline several restart
/// cadence suites share.
pub fn daily_dates_1981() -> DeckKeyword {
    dates(&[
        (22, "MAY", 1981),
        (23, "MAY", 1981),
        (24, "MAY", 1981),
        (25, "MAY", 1981),
        (26, "MAY", 1981),
        (27, "MAY", 1981),
        (28, "MAY", 1981),
        (29, "MAY", 1981),
        (30, "MAY", 1981),
        (31, "MAY", 1981),
        (1, "JUN", 1981),
    ])
}

/// An empty deck starting 19 JUN 2007, the start date most restart suites
/// use.
pub fn deck_2007() -> Deck {
    Deck::new(start(2007, 6, 19))
}
