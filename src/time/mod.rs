//! The report-step time map.
//!
//! Step 0 is the simulation start; every DATES entry and TSTEP interval in
//! the SCHEDULE section appends one report step. Timestamps are strictly
//! increasing. The calendar queries (`is_first_in_month`, `is_first_in_year`
//! and the frequency sequencing used by the yearly/monthly restart cadences)
//! live here because they are pure functions of the timeline.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::deck::{Deck, DeckRecord, Section};
use crate::errors::{ErrorContext, ScheduleError};

/// ECLIPSE month names, including the Norwegian spellings legacy decks use.
fn eclipse_month(name: &str) -> Option<u32> {
    let month = match name {
        "JAN" => 1,
        "FEB" => 2,
        "MAR" => 3,
        "APR" => 4,
        "MAY" | "MAI" => 5,
        "JUN" => 6,
        "JUL" => 7,
        "AUG" => 8,
        "SEP" => 9,
        "OCT" | "OKT" => 10,
        "NOV" => 11,
        "DEC" | "DES" => 12,
        _ => return None,
    };
    Some(month)
}

/// Whole calendar months from `from` to `to` (day-of-month ignored).
fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    i64::from(to.year() - from.year()) * 12 + i64::from(to.month() as i32 - from.month() as i32)
}

/// Ordered sequence of report-step timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeMap {
    times: Vec<NaiveDateTime>,
}

impl TimeMap {
    /// A time map holding only step 0 at the simulation start.
    pub fn new(start: NaiveDateTime) -> Self {
        Self { times: vec![start] }
    }

    /// Build the complete timeline by walking the deck's SCHEDULE section
    /// for DATES and TSTEP keywords.
    pub fn from_deck(deck: &Deck) -> Result<Self, ScheduleError> {
        let mut map = TimeMap::new(deck.start());
        for keyword in deck.section(Section::Schedule) {
            match keyword.name() {
                "DATES" => {
                    for record in keyword.records() {
                        map.add_dates_record(record)?;
                    }
                }
                "TSTEP" => {
                    for record in keyword.records() {
                        map.add_tstep_record(record)?;
                    }
                }
                _ => {}
            }
        }
        Ok(map)
    }

    /// Number of report steps, step 0 included.
    pub fn size(&self) -> usize {
        self.times.len()
    }

    /// Index of the final report step.
    pub fn last_step(&self) -> usize {
        self.times.len() - 1
    }

    /// Timestamp of `step`. Panics if out of range.
    pub fn time(&self, step: usize) -> NaiveDateTime {
        self.times[step]
    }

    pub fn start_time(&self) -> NaiveDateTime {
        self.times[0]
    }

    /// Append a report step. The timestamp must strictly increase.
    pub fn add_step(&mut self, time: NaiveDateTime) -> Result<(), ScheduleError> {
        let last = *self.times.last().expect("time map holds at least step 0");
        if time <= last {
            return Err(ScheduleError::Ordering {
                message: format!("{} does not follow {}", time, last),
                context: ErrorContext::step(self.times.len()),
            });
        }
        self.times.push(time);
        Ok(())
    }

    /// Append one step from a DATES record: `DAY MONTH YEAR [HH:MM:SS[.sss]]`.
    pub fn add_dates_record(&mut self, record: &DeckRecord) -> Result<(), ScheduleError> {
        self.add_step(time_from_dates_record(record)?)
    }

    /// Append one step per interval of a TSTEP record (day counts).
    pub fn add_tstep_record(&mut self, record: &DeckRecord) -> Result<(), ScheduleError> {
        for item in record.items() {
            let days = item.as_double().ok_or_else(|| ScheduleError::MalformedRecord {
                message: "TSTEP interval is not a number".to_string(),
                context: ErrorContext::new(),
            })?;
            let last = *self.times.last().expect("time map holds at least step 0");
            let millis = (days * 86_400_000.0).round() as i64;
            self.add_step(last + Duration::milliseconds(millis))?;
        }
        Ok(())
    }

    /// The latest step whose timestamp is `<= date`.
    pub fn step_from_date(&self, date: NaiveDateTime) -> Result<usize, ScheduleError> {
        if date < self.times[0] {
            return Err(ScheduleError::NotFound {
                message: format!("{} precedes simulation start {}", date, self.times[0]),
                context: ErrorContext::new(),
            });
        }
        Ok(self.times.partition_point(|t| *t <= date) - 1)
    }

    /// True when no earlier step falls in the same calendar month.
    pub fn is_first_in_month(&self, step: usize) -> bool {
        if step == 0 {
            return true;
        }
        let prev = self.times[step - 1].date();
        let this = self.times[step].date();
        (prev.year(), prev.month()) != (this.year(), this.month())
    }

    /// True when no earlier step falls in the same calendar year.
    pub fn is_first_in_year(&self, step: usize) -> bool {
        if step == 0 {
            return true;
        }
        self.times[step - 1].date().year() != self.times[step].date().year()
    }

    /// Whether `step` qualifies for an every-N-months (or years) write under
    /// a cadence that started at `start_step`.
    ///
    /// A month/year-first step qualifies when at least `frequency` calendar
    /// months (years) have elapsed since the previous qualifying step; the
    /// reference date resets on each qualifying step and starts at the date
    /// of `start_step`.
    pub(crate) fn is_in_freq_sequence(
        &self,
        step: usize,
        start_step: usize,
        frequency: i64,
        yearly: bool,
    ) -> bool {
        let first = |s: usize| {
            if yearly {
                self.is_first_in_year(s)
            } else {
                self.is_first_in_month(s)
            }
        };

        if step == 0 || step >= self.size() || !first(step) {
            return false;
        }
        if frequency <= 1 {
            return true;
        }

        let mut reference = self.times[start_step.min(self.last_step())].date();
        for boundary in (start_step + 1)..self.size() {
            if boundary > step {
                break;
            }
            if !first(boundary) {
                continue;
            }
            let date = self.times[boundary].date();
            let elapsed = if yearly {
                i64::from(date.year() - reference.year())
            } else {
                months_between(reference, date)
            };
            if elapsed >= frequency {
                if boundary == step {
                    return true;
                }
                reference = date;
            } else if boundary == step {
                return false;
            }
        }
        false
    }
}

fn time_from_dates_record(record: &DeckRecord) -> Result<NaiveDateTime, ScheduleError> {
    let malformed = |message: String| ScheduleError::MalformedRecord {
        message,
        context: ErrorContext::new(),
    };

    let day = record
        .item(0)
        .as_int()
        .or_else(|| record.item(0).as_str().and_then(|s| s.parse().ok()))
        .ok_or_else(|| malformed("DATES record has no day".to_string()))?;
    let month_name = record
        .item(1)
        .as_str()
        .ok_or_else(|| malformed("DATES record has no month name".to_string()))?;
    let month = eclipse_month(month_name)
        .ok_or_else(|| malformed(format!("'{}' is not a month name", month_name)))?;
    let year = record
        .item(2)
        .as_int()
        .or_else(|| record.item(2).as_str().and_then(|s| s.parse().ok()))
        .ok_or_else(|| malformed("DATES record has no year".to_string()))?;

    let date = NaiveDate::from_ymd_opt(year as i32, month, day as u32)
        .ok_or_else(|| malformed(format!("{} {} {} is not a date", day, month_name, year)))?;

    match record.item(3).as_str() {
        None => Ok(date.and_hms_opt(0, 0, 0).expect("midnight always exists")),
        Some(clock) => {
            let parts: Vec<&str> = clock.split(':').collect();
            if parts.len() != 3 {
                return Err(malformed(format!("'{}' is not a HH:MM:SS time", clock)));
            }
            let hour: u32 = parts[0]
                .parse()
                .map_err(|_| malformed(format!("bad hour in '{}'", clock)))?;
            let minute: u32 = parts[1]
                .parse()
                .map_err(|_| malformed(format!("bad minute in '{}'", clock)))?;
            let seconds: f64 = parts[2]
                .parse()
                .map_err(|_| malformed(format!("bad seconds in '{}'", clock)))?;
            let whole = seconds.floor();
            let millis = ((seconds - whole) * 1000.0).round() as u32;
            date.and_hms_milli_opt(hour, minute, whole as u32, millis)
                .ok_or_else(|| malformed(format!("'{}' is not a valid time of day", clock)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::Item;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_add_step_requires_strict_increase() {
        let mut map = TimeMap::new(date(1981, 5, 21));
        map.add_step(date(1981, 5, 22)).unwrap();
        let err = map.add_step(date(1981, 5, 22)).unwrap_err();
        assert!(matches!(err, ScheduleError::Ordering { .. }));
        assert_eq!(map.size(), 2);
    }

    #[test]
    fn test_dates_record_with_norwegian_month_names() {
        let mut map = TimeMap::new(date(2007, 6, 19));
        let record = DeckRecord::new(vec![Item::int(10), Item::str("OKT"), Item::int(2008)]);
        map.add_dates_record(&record).unwrap();
        assert_eq!(map.time(1), date(2008, 10, 10));

        let record = DeckRecord::new(vec![Item::int(1), Item::str("DES"), Item::int(2008)]);
        map.add_dates_record(&record).unwrap();
        assert_eq!(map.time(2), date(2008, 12, 1));
    }

    #[test]
    fn test_dates_record_with_time_of_day() {
        let mut map = TimeMap::new(date(1982, 1, 1));
        let record = DeckRecord::new(vec![
            Item::int(3),
            Item::str("JAN"),
            Item::int(1982),
            Item::str("14:56:45.123"),
        ]);
        map.add_dates_record(&record).unwrap();
        let expected = NaiveDate::from_ymd_opt(1982, 1, 3)
            .unwrap()
            .and_hms_milli_opt(14, 56, 45, 123)
            .unwrap();
        assert_eq!(map.time(1), expected);
    }

    #[test]
    fn test_tstep_record_appends_day_intervals() {
        let mut map = TimeMap::new(date(1981, 5, 21));
        let record = DeckRecord::new(vec![Item::double(1.0), Item::double(0.5)]);
        map.add_tstep_record(&record).unwrap();
        assert_eq!(map.size(), 3);
        assert_eq!(map.time(1), date(1981, 5, 22));
        assert_eq!(
            map.time(2),
            NaiveDate::from_ymd_opt(1981, 5, 22)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_step_from_date_picks_latest_at_or_before() {
        let mut map = TimeMap::new(date(1981, 5, 21));
        map.add_step(date(1981, 5, 25)).unwrap();
        map.add_step(date(1981, 6, 1)).unwrap();

        assert_eq!(map.step_from_date(date(1981, 5, 23)).unwrap(), 0);
        assert_eq!(map.step_from_date(date(1981, 5, 25)).unwrap(), 1);
        assert_eq!(map.step_from_date(date(1990, 1, 1)).unwrap(), 2);
        assert!(matches!(
            map.step_from_date(date(1980, 1, 1)),
            Err(ScheduleError::NotFound { .. })
        ));
    }

    #[test]
    fn test_first_in_month_and_year() {
        let mut map = TimeMap::new(date(1981, 5, 21));
        map.add_step(date(1981, 5, 22)).unwrap(); // 1
        map.add_step(date(1981, 6, 1)).unwrap(); // 2: new month
        map.add_step(date(1982, 1, 1)).unwrap(); // 3: new month + year
        map.add_step(date(1982, 1, 2)).unwrap(); // 4

        assert!(map.is_first_in_month(0));
        assert!(!map.is_first_in_month(1));
        assert!(map.is_first_in_month(2));
        assert!(!map.is_first_in_year(2));
        assert!(map.is_first_in_year(3));
        assert!(map.is_first_in_month(3));
        assert!(!map.is_first_in_month(4));
    }

    #[test]
    fn test_yearly_freq_sequence_counts_elapsed_years() {
        // Mirrors a BASIC=4 FREQ=2 timeline: writes land where two calendar
        // years have passed since the previous qualifying boundary.
        let mut map = TimeMap::new(date(1981, 5, 21));
        for d in [
            date(1981, 5, 22),
            date(1981, 5, 23),
            date(1981, 5, 24),
            date(1982, 5, 23),
            date(1982, 5, 24),
            date(1983, 5, 24),
            date(1984, 5, 25),
            date(1984, 5, 26),
            date(1985, 5, 26),
            date(1985, 5, 27),
            date(1986, 1, 1),
        ] {
            map.add_step(d).unwrap();
        }

        let writes: Vec<usize> = (1..map.size())
            .filter(|s| map.is_in_freq_sequence(*s, 1, 2, true))
            .collect();
        assert_eq!(writes, vec![6, 9]);
    }

    #[test]
    fn test_monthly_freq_sequence_resets_reference_on_write() {
        // Mirrors a BASIC=5 FREQ=2 timeline.
        let mut map = TimeMap::new(date(1981, 5, 21));
        for d in [
            date(1981, 5, 22),
            date(1981, 5, 23),
            date(1981, 5, 24),
            date(1981, 6, 1),
            date(1981, 7, 1),
            date(1982, 1, 1),
            date(1982, 1, 2),
            date(1982, 2, 1),
            date(1982, 3, 1),
            date(1983, 4, 1),
            date(1983, 6, 2),
        ] {
            map.add_step(d).unwrap();
        }

        let writes: Vec<usize> = (1..map.size())
            .filter(|s| map.is_in_freq_sequence(*s, 1, 2, false))
            .collect();
        assert_eq!(writes, vec![5, 6, 9, 10, 11]);
    }

    #[test]
    fn test_freq_of_one_accepts_every_boundary() {
        let mut map = TimeMap::new(date(1981, 5, 21));
        map.add_step(date(1981, 6, 1)).unwrap();
        map.add_step(date(1981, 6, 2)).unwrap();
        map.add_step(date(1981, 7, 1)).unwrap();

        assert!(map.is_in_freq_sequence(1, 0, 1, false));
        assert!(!map.is_in_freq_sequence(2, 0, 1, false));
        assert!(map.is_in_freq_sequence(3, 0, 1, false));
    }
}
