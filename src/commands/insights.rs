// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::insights::{category_breakdown, compute_insights, trend};
use crate::models::{Category, Granularity, NormalizedEntry, Scope};
use crate::normalize::{filter_scope, normalize_entries};
use crate::rates::StoreRates;
use crate::store;
use crate::utils::{fmt_money, id_for_book, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, sub)?,
        Some(("trend", sub)) => trend_buckets(conn, sub)?,
        Some(("categories", sub)) => categories(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// One computation cycle: snapshot the store, normalize into the
/// reporting currency, then narrow to the requested scope.
fn scoped_entries(
    conn: &Connection,
    sub: &clap::ArgMatches,
) -> Result<(Vec<NormalizedEntry>, Vec<Category>, String)> {
    let target = match sub.get_one::<String>("currency") {
        Some(c) => c.to_uppercase(),
        None => crate::utils::get_default_currency(conn)?,
    };
    let scope = match sub.get_one::<String>("book") {
        Some(name) => Scope::Book(id_for_book(conn, name)?),
        None => Scope::All,
    };
    let books = store::load_books(conn)?;
    let entries = store::load_entries(conn, Scope::All)?;
    let categories = store::load_categories(conn)?;
    let today = chrono::Utc::now().date_naive();
    let rates = StoreRates::new(conn, today)?;
    let normalized = normalize_entries(entries, &books, &target, &rates);
    Ok((filter_scope(normalized, scope), categories, target))
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let (entries, categories, target) = scoped_entries(conn, sub)?;
    let insights = compute_insights(&entries, &categories);
    if !maybe_print_json(json_flag, jsonl_flag, &insights)? {
        let top = insights
            .top_expense
            .as_ref()
            .map(|t| format!("{} ({})", t.name, fmt_money(&t.amount, &target)))
            .unwrap_or_default();
        let rows = vec![
            vec![
                fmt_money(&insights.total_income, &target),
                fmt_money(&insights.total_expense, &target),
                fmt_money(&insights.net_savings, &target),
                format!("{}%", (insights.savings_rate * Decimal::ONE_HUNDRED).round_dp(1)),
                fmt_money(&insights.avg_daily_expense, &target),
                top,
            ],
        ];
        println!(
            "{}",
            pretty_table(
                &[
                    "Income",
                    "Expenses",
                    "Net savings",
                    "Savings rate",
                    "Avg daily spend",
                    "Top category"
                ],
                rows,
            )
        );
    }
    Ok(())
}

fn trend_buckets(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let by = match sub.get_one::<String>("by").map(|s| s.as_str()) {
        Some("week") => Granularity::Week,
        _ => Granularity::Month,
    };
    let buckets = match sub.get_one::<usize>("buckets") {
        Some(n) => *n,
        None => match by {
            Granularity::Week => 8,
            Granularity::Month => 6,
        },
    };
    let (entries, _, target) = scoped_entries(conn, sub)?;
    let today = chrono::Utc::now().date_naive();
    let points = trend(&entries, by, buckets, today);
    if !maybe_print_json(json_flag, jsonl_flag, &points)? {
        let rows: Vec<Vec<String>> = points
            .iter()
            .map(|p| {
                vec![
                    p.label.clone(),
                    format!("{:.2}", p.income),
                    format!("{:.2}", p.expense),
                    format!("{:.2}", p.balance),
                ]
            })
            .collect();
        let hdr = format!("Balance ({})", target);
        println!(
            "{}",
            pretty_table(&["Bucket", "Income", "Expense", &hdr], rows)
        );
    }
    Ok(())
}

fn categories(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let top = sub.get_one::<usize>("top").copied();
    let (entries, categories, target) = scoped_entries(conn, sub)?;
    let data = category_breakdown(&entries, &categories, top);
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|d| {
                vec![
                    d.name.clone(),
                    fmt_money(&d.amount, &target),
                    format!("{}%", d.percent),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Category", "Spent", "Share"], rows));
    }
    Ok(())
}
