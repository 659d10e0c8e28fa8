//! Performance benchmarks for schedule construction.
//!
//! Construction is a single pass over the deck, so build time should stay
//! linear in deck size; these benchmarks watch that.

use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use eclsched::deck::{Deck, DeckKeyword, Item, Section};
use eclsched::policy::ParsePolicy;
use eclsched::schedule::Schedule;

/// A deck with `num_wells` producing wells, monthly report steps over
/// `num_years` years and an interval restart cadence.
fn synthetic_deck(num_wells: usize, num_years: i32) -> Deck {
    let mut deck = Deck::new(
        NaiveDate::from_ymd_opt(2000, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
    );

    for w in 0..num_wells {
        let name = format!("OP_{}", w);
        deck.push(DeckKeyword::new("WELSPECS", Section::Schedule).record(vec![
            Item::str(name.clone()),
            Item::str("G1"),
            Item::int((w % 10 + 1) as i64),
            Item::int((w / 10 + 1) as i64),
            Item::defaulted(),
            Item::str("OIL"),
        ]));
        deck.push(DeckKeyword::new("COMPDAT", Section::Schedule).record(vec![
            Item::str(name.clone()),
            Item::defaulted(),
            Item::defaulted(),
            Item::int(1),
            Item::int(10),
            Item::str("OPEN"),
        ]));
        deck.push(DeckKeyword::new("WCONPROD", Section::Schedule).record(vec![
            Item::str(name),
            Item::str("OPEN"),
            Item::str("ORAT"),
            Item::double(1000.0),
        ]));
    }

    deck.push(
        DeckKeyword::new("RPTRST", Section::Schedule)
            .record(vec![Item::str("BASIC=5"), Item::str("FREQ=3")]),
    );

    let mut datekw = DeckKeyword::new("DATES", Section::Schedule);
    for year in 0..num_years {
        for month in 1..=12 {
            datekw = datekw.record(vec![
                Item::int(1),
                Item::str(month_name(month)),
                Item::int(i64::from(2000 + year) + 1),
            ]);
        }
    }
    deck.push(datekw);
    deck
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "JAN",
        2 => "FEB",
        3 => "MAR",
        4 => "APR",
        5 => "MAY",
        6 => "JUN",
        7 => "JUL",
        8 => "AUG",
        9 => "SEP",
        10 => "OCT",
        11 => "NOV",
        _ => "DEC",
    }
}

fn bench_small_deck(c: &mut Criterion) {
    let deck = synthetic_deck(5, 2);
    let policy = ParsePolicy::strict();
    c.bench_function("build_small_deck", |b| {
        b.iter(|| Schedule::from_deck(black_box(&deck), &policy).expect("build failed"))
    });
}

fn bench_large_deck(c: &mut Criterion) {
    let deck = synthetic_deck(100, 20);
    let policy = ParsePolicy::strict();
    c.bench_function("build_large_deck", |b| {
        b.iter(|| Schedule::from_deck(black_box(&deck), &policy).expect("build failed"))
    });
}

fn bench_restart_queries(c: &mut Criterion) {
    let deck = synthetic_deck(20, 10);
    let schedule = Schedule::from_deck(&deck, &ParsePolicy::strict()).expect("build failed");
    c.bench_function("query_write_rst_file", |b| {
        b.iter(|| {
            let mut writes = 0usize;
            for step in 0..schedule.size() {
                if schedule.write_rst_file(black_box(step)) {
                    writes += 1;
                }
            }
            writes
        })
    });
}

criterion_group!(benches, bench_small_deck, bench_large_deck, bench_restart_queries);
criterion_main!(benches);
