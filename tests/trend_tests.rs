// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use billfold::insights::{category_breakdown, trend};
use billfold::models::{Category, Entry, EntryKind, Granularity, NormalizedEntry};
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn normalized(kind: EntryKind, date: &str, amount: &str, category_id: Option<i64>) -> NormalizedEntry {
    let entry = Entry {
        id: 0,
        book_id: 1,
        kind,
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        amount: amount.parse().unwrap(),
        currency: "USD".to_string(),
        category_id,
        payee: None,
        note: None,
        converted_amount: None,
        converted_currency: None,
        converted_rate: None,
    };
    NormalizedEntry {
        entry,
        amount: amount.parse().unwrap(),
    }
}

#[test]
fn monthly_buckets_are_windowed_ordered_and_zero_filled() {
    let today = NaiveDate::from_ymd_opt(2025, 8, 15).unwrap();
    let set = vec![
        normalized(EntryKind::Income, "2025-08-05", "100", None),
        normalized(EntryKind::Expense, "2025-07-21", "30", None),
        normalized(EntryKind::Expense, "2025-02-27", "10", None), // before the window
        normalized(EntryKind::Expense, "2025-09-02", "10", None), // after today's bucket
    ];
    let points = trend(&set, Granularity::Month, 6, today);

    assert_eq!(points.len(), 6);
    assert_eq!(points[0].label, "2025-03");
    assert_eq!(points[5].label, "2025-08");
    assert!(points.windows(2).all(|w| w[0].start < w[1].start));

    assert_eq!(points[0].income, Decimal::ZERO);
    assert_eq!(points[0].expense, Decimal::ZERO);
    assert_eq!(points[4].expense, Decimal::new(30, 0));
    assert_eq!(format!("{:.2}", points[4].balance), "-30.00");
    assert_eq!(points[5].income, Decimal::new(100, 0));
    assert_eq!(format!("{:.2}", points[5].balance), "100.00");
}

#[test]
fn weekly_buckets_start_on_monday() {
    let today = NaiveDate::from_ymd_opt(2025, 8, 20).unwrap(); // a Wednesday
    let set = vec![
        normalized(EntryKind::Expense, "2025-08-19", "25", None),
        normalized(EntryKind::Income, "2025-06-29", "999", None), // Sunday before the window
    ];
    let points = trend(&set, Granularity::Week, 8, today);

    assert_eq!(points.len(), 8);
    assert_eq!(points[0].start, NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());
    assert_eq!(points[0].label, "2025-W27");
    assert_eq!(points[7].start, NaiveDate::from_ymd_opt(2025, 8, 18).unwrap());
    assert_eq!(points[7].label, "2025-W34");

    assert_eq!(points[7].expense, Decimal::new(25, 0));
    let total_income: Decimal = points.iter().map(|p| p.income).sum();
    assert_eq!(total_income, Decimal::ZERO);
}

#[test]
fn zero_buckets_yields_empty_series() {
    let today = NaiveDate::from_ymd_opt(2025, 8, 15).unwrap();
    let points = trend(&[], Granularity::Month, 0, today);
    assert!(points.is_empty());
}

fn cat(id: i64, name: &str) -> Category {
    Category {
        id,
        name: name.to_string(),
        icon: None,
    }
}

#[test]
fn breakdown_groups_expenses_with_shares() {
    let cats = vec![cat(1, "Rent"), cat(2, "Groceries")];
    let set = vec![
        normalized(EntryKind::Expense, "2025-03-01", "75", Some(1)),
        normalized(EntryKind::Expense, "2025-03-02", "25", Some(2)),
        normalized(EntryKind::Income, "2025-03-03", "500", None),
    ];
    let data = category_breakdown(&set, &cats, None);

    assert_eq!(data.len(), 2);
    assert_eq!(data[0].name, "Rent");
    assert_eq!(data[0].percent.to_string(), "75.00");
    assert_eq!(data[1].name, "Groceries");
    assert_eq!(data[1].percent.to_string(), "25.00");
}

#[test]
fn breakdown_keeps_uncategorized_first_on_ties() {
    let cats = vec![cat(1, "Rent")];
    let set = vec![
        normalized(EntryKind::Expense, "2025-03-01", "50", Some(1)),
        normalized(EntryKind::Expense, "2025-03-02", "50", None),
    ];
    let data = category_breakdown(&set, &cats, None);
    assert_eq!(data[0].name, "(uncategorized)");
    assert_eq!(data[1].name, "Rent");
}

#[test]
fn breakdown_truncates_to_top_n() {
    let cats = vec![cat(1, "Rent"), cat(2, "Groceries"), cat(3, "Fun")];
    let set = vec![
        normalized(EntryKind::Expense, "2025-03-01", "10", Some(1)),
        normalized(EntryKind::Expense, "2025-03-02", "80", Some(2)),
        normalized(EntryKind::Expense, "2025-03-03", "40", Some(3)),
    ];
    let data = category_breakdown(&set, &cats, Some(2));
    assert_eq!(data.len(), 2);
    assert_eq!(data[0].name, "Groceries");
    assert_eq!(data[1].name, "Fun");
}

#[test]
fn breakdown_of_income_only_is_empty() {
    let set = vec![normalized(EntryKind::Income, "2025-03-01", "100", None)];
    let data = category_breakdown(&set, &[], None);
    assert!(data.is_empty());
}
