//! Typed model of an already-parsed simulation deck.
//!
//! The schedule engine does not tokenize deck text; an external parser
//! produces an ordered stream of keywords, each keyword an ordered list of
//! records, each record an ordered list of typed items. An item may be
//! *defaulted*, meaning the deck left the slot empty and the keyword's own
//! default applies.
//!
//! The builder-style constructors exist so that front ends (and tests) can
//! assemble decks directly without going through text.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The deck section a keyword was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    Runspec,
    Grid,
    Solution,
    Schedule,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Runspec => "RUNSPEC",
            Section::Grid => "GRID",
            Section::Solution => "SOLUTION",
            Section::Schedule => "SCHEDULE",
        };
        write!(f, "{}", name)
    }
}

/// The value carried by a non-defaulted deck item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemValue {
    Str(String),
    Int(i64),
    Double(f64),
}

/// One typed slot of a deck record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Item {
    value: Option<ItemValue>,
}

impl Item {
    /// A string item.
    pub fn str<S: Into<String>>(value: S) -> Self {
        Self {
            value: Some(ItemValue::Str(value.into())),
        }
    }

    /// An integer item.
    pub fn int(value: i64) -> Self {
        Self {
            value: Some(ItemValue::Int(value)),
        }
    }

    /// A floating-point item.
    pub fn double(value: f64) -> Self {
        Self {
            value: Some(ItemValue::Double(value)),
        }
    }

    /// An empty slot: the keyword default applies.
    pub fn defaulted() -> Self {
        Self { value: None }
    }

    /// True if the deck left this slot empty.
    pub fn is_defaulted(&self) -> bool {
        self.value.is_none()
    }

    /// The string value, if this is a non-defaulted string item.
    pub fn as_str(&self) -> Option<&str> {
        match self.value {
            Some(ItemValue::Str(ref s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The integer value, if present.
    pub fn as_int(&self) -> Option<i64> {
        match self.value {
            Some(ItemValue::Int(v)) => Some(v),
            _ => None,
        }
    }

    /// The numeric value, widening integers to doubles.
    pub fn as_double(&self) -> Option<f64> {
        match self.value {
            Some(ItemValue::Double(v)) => Some(v),
            Some(ItemValue::Int(v)) => Some(v as f64),
            _ => None,
        }
    }
}

/// One record of a keyword: an ordered list of items.
///
/// Trailing items a record does not supply are treated as defaulted, so
/// front ends may truncate records after the last explicit value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeckRecord {
    items: Vec<Item>,
}

static DEFAULTED: Item = Item { value: None };

impl DeckRecord {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// Number of explicitly supplied slots.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The item at `index`; out-of-range slots read as defaulted.
    pub fn item(&self, index: usize) -> &Item {
        self.items.get(index).unwrap_or(&DEFAULTED)
    }

    /// Iterate the explicitly supplied items.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    /// String at `index`, or `fallback` when the slot is defaulted.
    pub fn str_or<'a>(&'a self, index: usize, fallback: &'a str) -> &'a str {
        self.item(index).as_str().unwrap_or(fallback)
    }

    /// Integer at `index`, or `fallback` when the slot is defaulted.
    pub fn int_or(&self, index: usize, fallback: i64) -> i64 {
        self.item(index).as_int().unwrap_or(fallback)
    }

    /// Double at `index`, or `fallback` when the slot is defaulted.
    pub fn double_or(&self, index: usize, fallback: f64) -> f64 {
        self.item(index).as_double().unwrap_or(fallback)
    }
}

/// One keyword occurrence: name, section and records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckKeyword {
    name: String,
    section: Section,
    records: Vec<DeckRecord>,
}

impl DeckKeyword {
    pub fn new<S: Into<String>>(name: S, section: Section) -> Self {
        Self {
            name: name.into(),
            section,
            records: Vec::new(),
        }
    }

    /// Append a record; consumes and returns `self` for chaining.
    pub fn record(mut self, items: Vec<Item>) -> Self {
        self.records.push(DeckRecord::new(items));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn num_records(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> impl Iterator<Item = &DeckRecord> {
        self.records.iter()
    }

    pub fn get_record(&self, index: usize) -> Option<&DeckRecord> {
        self.records.get(index)
    }

    /// All non-defaulted items across all records, in declaration order.
    ///
    /// Report-control keywords (RPTRST, RPTSCHED, RPTSOL) are token lists
    /// rather than fixed-slot records; this flattened view is what their
    /// resolver consumes.
    pub fn flattened_items(&self) -> impl Iterator<Item = &Item> {
        self.records
            .iter()
            .flat_map(|r| r.items())
            .filter(|item| !item.is_defaulted())
    }
}

/// An ordered stream of keyword occurrences plus the simulation start time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    start: NaiveDateTime,
    keywords: Vec<DeckKeyword>,
}

impl Deck {
    /// A deck starting at the given simulation start time (the RUNSPEC START
    /// date resolved by the external parser).
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            start,
            keywords: Vec::new(),
        }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Append a keyword occurrence; consumes and returns `self` for chaining.
    pub fn keyword(mut self, keyword: DeckKeyword) -> Self {
        self.keywords.push(keyword);
        self
    }

    pub fn push(&mut self, keyword: DeckKeyword) {
        self.keywords.push(keyword);
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Iterate every keyword in input order.
    pub fn keywords(&self) -> impl Iterator<Item = &DeckKeyword> {
        self.keywords.iter()
    }

    /// Iterate the keywords of one section, preserving input order.
    pub fn section(&self, section: Section) -> impl Iterator<Item = &DeckKeyword> {
        self.keywords.iter().filter(move |kw| kw.section() == section)
    }

    /// First occurrence of `name` within `section`, if any.
    pub fn find(&self, name: &str, section: Section) -> Option<&DeckKeyword> {
        self.section(section).find(|kw| kw.name() == name)
    }

    pub fn has_keyword(&self, name: &str, section: Section) -> bool {
        self.find(name, section).is_some()
    }
}
