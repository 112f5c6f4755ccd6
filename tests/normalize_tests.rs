// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use billfold::models::{Book, Entry, EntryKind, NormalizedEntry, Scope};
use billfold::normalize::{filter_scope, normalize_entries};
use billfold::rates::RateProvider;
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn entry(id: i64, book_id: i64, kind: EntryKind, amount: &str, currency: &str) -> Entry {
    Entry {
        id,
        book_id,
        kind,
        date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        amount: amount.parse().unwrap(),
        currency: currency.to_string(),
        category_id: None,
        payee: None,
        note: None,
        converted_amount: None,
        converted_currency: None,
        converted_rate: None,
    }
}

fn with_cache(mut e: Entry, amount: &str, currency: &str, rate: &str) -> Entry {
    e.converted_amount = Some(amount.parse().unwrap());
    e.converted_currency = Some(currency.to_string());
    e.converted_rate = Some(rate.parse().unwrap());
    e
}

fn book(id: i64, currency: &str) -> (i64, Book) {
    (
        id,
        Book {
            id,
            name: format!("Book {}", id),
            currency: currency.to_string(),
            lock_currency: None,
            lock_rate: None,
        },
    )
}

fn locked_book(id: i64, currency: &str, lock_ccy: &str, lock_rate: &str) -> (i64, Book) {
    let (id, mut b) = book(id, currency);
    b.lock_currency = Some(lock_ccy.to_string());
    b.lock_rate = Some(lock_rate.parse().unwrap());
    (id, b)
}

struct FixedRates(HashMap<(String, String), Decimal>);

impl FixedRates {
    fn of(pairs: &[(&str, &str, &str)]) -> Self {
        let mut m = HashMap::new();
        for (f, t, r) in pairs {
            m.insert(((*f).to_string(), (*t).to_string()), r.parse().unwrap());
        }
        FixedRates(m)
    }
}

impl RateProvider for FixedRates {
    fn rate(&self, from: &str, to: &str, _book_id: i64) -> Option<Decimal> {
        self.0.get(&(from.to_string(), to.to_string())).copied()
    }
}

struct NoRates;

impl RateProvider for NoRates {
    fn rate(&self, _from: &str, _to: &str, _book_id: i64) -> Option<Decimal> {
        None
    }
}

struct PanicRates;

impl RateProvider for PanicRates {
    fn rate(&self, from: &str, to: &str, _book_id: i64) -> Option<Decimal> {
        panic!("unexpected rate lookup {} -> {}", from, to);
    }
}

#[test]
fn cached_amount_short_circuits_rate_lookup() {
    let books: HashMap<i64, Book> = [book(1, "EUR")].into_iter().collect();
    let e = with_cache(
        entry(1, 1, EntryKind::Expense, "50", "EUR"),
        "60",
        "USD",
        "1.2",
    );
    // PanicRates proves the fast path never asks for a rate.
    let out = normalize_entries(vec![e], &books, "USD", &PanicRates);
    assert_eq!(out[0].amount, Decimal::new(60, 0));
}

#[test]
fn locked_book_overrides_stale_cache() {
    let books: HashMap<i64, Book> = [locked_book(1, "EUR", "USD", "1.2")].into_iter().collect();
    let e = with_cache(
        entry(1, 1, EntryKind::Expense, "50", "EUR"),
        "50",
        "USD",
        "1.0",
    );
    let out = normalize_entries(vec![e], &books, "USD", &PanicRates);
    assert_eq!(format!("{:.2}", out[0].amount), "60.00");
}

#[test]
fn locked_book_keeps_cache_at_locked_rate() {
    let books: HashMap<i64, Book> = [locked_book(1, "EUR", "USD", "1.2")].into_iter().collect();
    // Scale differs ("1.20" vs "1.2") but the value matches the lock.
    let e = with_cache(
        entry(1, 1, EntryKind::Expense, "50", "EUR"),
        "60.00",
        "USD",
        "1.20",
    );
    let out = normalize_entries(vec![e], &books, "USD", &PanicRates);
    assert_eq!(format!("{:.2}", out[0].amount), "60.00");
}

#[test]
fn same_currency_passes_through() {
    let books: HashMap<i64, Book> = [book(1, "USD")].into_iter().collect();
    let e = entry(1, 1, EntryKind::Income, "123.45", "USD");
    let out = normalize_entries(vec![e], &books, "USD", &PanicRates);
    assert_eq!(format!("{:.2}", out[0].amount), "123.45");
}

#[test]
fn live_rate_converts_amount() {
    let books: HashMap<i64, Book> = [book(1, "EUR")].into_iter().collect();
    let e = entry(1, 1, EntryKind::Expense, "80", "EUR");
    let rates = FixedRates::of(&[("EUR", "USD", "0.5")]);
    let out = normalize_entries(vec![e], &books, "USD", &rates);
    assert_eq!(format!("{:.2}", out[0].amount), "40.00");
}

#[test]
fn missing_rate_falls_back_to_raw_amount() {
    let books: HashMap<i64, Book> = [book(1, "EUR")].into_iter().collect();
    let e = entry(1, 1, EntryKind::Expense, "80", "EUR");
    let out = normalize_entries(vec![e], &books, "USD", &NoRates);
    assert_eq!(format!("{:.2}", out[0].amount), "80.00");
}

#[test]
fn cache_in_other_currency_is_ignored() {
    let books: HashMap<i64, Book> = [book(1, "EUR")].into_iter().collect();
    let e = with_cache(
        entry(1, 1, EntryKind::Expense, "50", "EUR"),
        "42",
        "GBP",
        "0.84",
    );
    let rates = FixedRates::of(&[("EUR", "USD", "2")]);
    let out = normalize_entries(vec![e], &books, "USD", &rates);
    assert_eq!(format!("{:.2}", out[0].amount), "100.00");
}

fn normalized(id: i64, book_id: i64, amount: &str) -> NormalizedEntry {
    NormalizedEntry {
        entry: entry(id, book_id, EntryKind::Expense, amount, "USD"),
        amount: amount.parse().unwrap(),
    }
}

#[test]
fn scope_all_keeps_everything() {
    let set = vec![normalized(1, 1, "10"), normalized(2, 2, "20")];
    let out = filter_scope(set, Scope::All);
    assert_eq!(out.len(), 2);
}

#[test]
fn scope_partitions_by_book() {
    let set = vec![
        normalized(1, 1, "10"),
        normalized(2, 2, "20"),
        normalized(3, 1, "30"),
    ];
    let out = filter_scope(set, Scope::Book(1));
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|n| n.entry.book_id == 1));
}

#[test]
fn unknown_book_scope_yields_empty_set() {
    let set = vec![normalized(1, 1, "10"), normalized(2, 2, "20")];
    let out = filter_scope(set, Scope::Book(99));
    assert!(out.is_empty());
}
