// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{
    Category, CategoryDatum, EntryKind, Granularity, Insights, NormalizedEntry, TopCategory,
    TrendPoint,
};

/// Headline aggregates over an already-normalized, already-filtered set.
///
/// Conventions: a zero-income set reports a savings rate of 0 (decimal
/// arithmetic throughout, so the rate is always finite); the average daily
/// expense divides by the inclusive calendar span between the earliest and
/// latest entry dates; a tie for the top expense category goes to the
/// lowest category id, with uncategorized ordering first.
pub fn compute_insights(entries: &[NormalizedEntry], categories: &[Category]) -> Insights {
    let mut total_income = Decimal::ZERO;
    let mut total_expense = Decimal::ZERO;
    let mut first: Option<NaiveDate> = None;
    let mut last: Option<NaiveDate> = None;
    let mut by_category: BTreeMap<Option<i64>, Decimal> = BTreeMap::new();

    for n in entries {
        match n.entry.kind {
            EntryKind::Income => total_income += n.amount,
            EntryKind::Expense => {
                total_expense += n.amount;
                *by_category
                    .entry(n.entry.category_id)
                    .or_insert(Decimal::ZERO) += n.amount;
            }
        }
        first = Some(match first {
            Some(d) => d.min(n.entry.date),
            None => n.entry.date,
        });
        last = Some(match last {
            Some(d) => d.max(n.entry.date),
            None => n.entry.date,
        });
    }

    let net_savings = total_income - total_expense;
    let savings_rate = if total_income.is_zero() {
        Decimal::ZERO
    } else {
        net_savings / total_income
    };

    let avg_daily_expense = match (first, last) {
        (Some(first), Some(last)) => {
            let days = (last - first).num_days() + 1;
            total_expense / Decimal::from(days)
        }
        _ => Decimal::ZERO,
    };

    Insights {
        total_income,
        total_expense,
        net_savings,
        savings_rate,
        avg_daily_expense,
        top_expense: top_category(&by_category, categories),
    }
}

fn top_category(
    by_category: &BTreeMap<Option<i64>, Decimal>,
    categories: &[Category],
) -> Option<TopCategory> {
    let mut top: Option<(Option<i64>, Decimal)> = None;
    for (id, amount) in by_category {
        match top {
            Some((_, best)) if *amount <= best => {}
            _ => top = Some((*id, *amount)),
        }
    }
    top.map(|(category_id, amount)| TopCategory {
        category_id,
        name: category_name(category_id, categories),
        amount,
    })
}

fn category_name(id: Option<i64>, categories: &[Category]) -> String {
    match id {
        Some(id) => categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("category #{}", id)),
        None => "(uncategorized)".to_string(),
    }
}

/// Income/expense/balance per bucket for the most recent `buckets`
/// weeks (ISO, Monday start) or calendar months, ending at the bucket
/// containing `today`. Buckets without entries appear zeroed.
pub fn trend(
    entries: &[NormalizedEntry],
    by: Granularity,
    buckets: usize,
    today: NaiveDate,
) -> Vec<TrendPoint> {
    if buckets == 0 {
        return Vec::new();
    }
    let mut starts = Vec::with_capacity(buckets);
    let mut start = bucket_start(today, by);
    for _ in 0..buckets {
        starts.push(start);
        start = prev_bucket_start(start, by);
    }
    starts.reverse();

    let mut map: BTreeMap<NaiveDate, (Decimal, Decimal)> = starts
        .iter()
        .map(|s| (*s, (Decimal::ZERO, Decimal::ZERO)))
        .collect();
    for n in entries {
        let b = bucket_start(n.entry.date, by);
        if let Some(slot) = map.get_mut(&b) {
            match n.entry.kind {
                EntryKind::Income => slot.0 += n.amount,
                EntryKind::Expense => slot.1 += n.amount,
            }
        }
    }

    starts
        .iter()
        .map(|s| {
            let (income, expense) = map.get(s).copied().unwrap_or((Decimal::ZERO, Decimal::ZERO));
            TrendPoint {
                start: *s,
                label: bucket_label(*s, by),
                income,
                expense,
                balance: income - expense,
            }
        })
        .collect()
}

/// Expenses grouped per category, largest first, with each group's share
/// of total expenses. `top` keeps only the n largest groups.
pub fn category_breakdown(
    entries: &[NormalizedEntry],
    categories: &[Category],
    top: Option<usize>,
) -> Vec<CategoryDatum> {
    let mut by_category: BTreeMap<Option<i64>, Decimal> = BTreeMap::new();
    let mut total = Decimal::ZERO;
    for n in entries {
        if n.entry.kind == EntryKind::Expense {
            *by_category
                .entry(n.entry.category_id)
                .or_insert(Decimal::ZERO) += n.amount;
            total += n.amount;
        }
    }

    let mut items: Vec<(Option<i64>, Decimal)> = by_category.into_iter().collect();
    items.sort_by(|a, b| b.1.cmp(&a.1));
    if let Some(n) = top {
        items.truncate(n);
    }

    items
        .into_iter()
        .map(|(category_id, amount)| {
            let percent = if total.is_zero() {
                Decimal::ZERO
            } else {
                (amount / total * Decimal::ONE_HUNDRED).round_dp(2)
            };
            CategoryDatum {
                category_id,
                name: category_name(category_id, categories),
                amount,
                percent,
            }
        })
        .collect()
}

fn bucket_start(date: NaiveDate, by: Granularity) -> NaiveDate {
    match by {
        Granularity::Week => date - Duration::days(date.weekday().num_days_from_monday() as i64),
        Granularity::Month => date - Duration::days(date.day0() as i64),
    }
}

fn prev_bucket_start(start: NaiveDate, by: Granularity) -> NaiveDate {
    match by {
        Granularity::Week => start - Duration::days(7),
        Granularity::Month => {
            let last_prev = start - Duration::days(1);
            last_prev - Duration::days(last_prev.day0() as i64)
        }
    }
}

fn bucket_label(start: NaiveDate, by: Granularity) -> String {
    match by {
        Granularity::Week => {
            let iso = start.iso_week();
            format!("{:04}-W{:02}", iso.year(), iso.week())
        }
        Granularity::Month => start.format("%Y-%m").to_string(),
    }
}
