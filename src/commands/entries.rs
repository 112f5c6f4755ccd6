// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::EntryKind;
use crate::rates::{RateProvider, StoreRates};
use crate::utils::{
    id_for_category, maybe_print_json, parse_date, parse_decimal, parse_month, pretty_table,
};
use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection};
use serde::Serialize;
use tracing::debug;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let book_name = sub.get_one::<String>("book").unwrap();
    let kind_raw = sub.get_one::<String>("kind").unwrap();
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let category = sub.get_one::<String>("category").map(|s| s.to_string());
    let payee = sub.get_one::<String>("payee").map(|s| s.to_string());
    let note = sub.get_one::<String>("note").map(|s| s.to_string());

    let kind = EntryKind::parse(kind_raw)
        .ok_or_else(|| anyhow!("Unknown entry kind '{}' (use income|expense)", kind_raw))?;
    if amount <= rust_decimal::Decimal::ZERO {
        return Err(anyhow!("Amount must be positive, got '{}'", amount));
    }

    let (book_id, book_ccy): (i64, String) = conn
        .query_row(
            "SELECT id, currency FROM books WHERE name=?1",
            params![book_name],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .with_context(|| format!("Book '{}' not found", book_name))?;
    let currency = sub
        .get_one::<String>("currency")
        .map(|s| s.to_uppercase())
        .unwrap_or(book_ccy);
    let category_id = if let Some(cat) = category {
        Some(id_for_category(conn, &cat)?)
    } else {
        None
    };

    // Cache the conversion into the reporting currency at the entry's
    // date, when a rate is resolvable; later cycles reuse it without a
    // lookup.
    let target = crate::utils::get_default_currency(conn)?;
    let mut converted: Option<(String, String, String)> = None;
    if currency != target {
        let rates = StoreRates::new(conn, date)?;
        match rates.rate(&currency, &target, book_id) {
            Some(rate) => {
                converted = Some(((amount * rate).to_string(), target.clone(), rate.to_string()));
            }
            None => {
                debug!("no rate {} -> {} on {}, storing entry unconverted", currency, target, date);
            }
        }
    }
    let (conv_amount, conv_ccy, conv_rate) = match &converted {
        Some((a, c, r)) => (Some(a.as_str()), Some(c.as_str()), Some(r.as_str())),
        None => (None, None, None),
    };

    conn.execute(
        "INSERT INTO entries(book_id, kind, date, amount, currency, category_id, payee, note, \
         converted_amount, converted_currency, converted_rate)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            book_id,
            kind.as_str(),
            date.to_string(),
            amount.to_string(),
            currency,
            category_id,
            payee,
            note,
            conv_amount,
            conv_ccy,
            conv_rate
        ],
    )?;
    println!(
        "Recorded {} {} {} on {} (book: {})",
        kind.as_str(),
        amount,
        currency,
        date,
        book_name
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.book.clone(),
                    r.kind.clone(),
                    r.amount.clone(),
                    r.currency.clone(),
                    r.converted.clone(),
                    r.category.clone(),
                    r.payee.clone(),
                    r.note.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "Date", "Book", "Kind", "Amount", "CCY", "Converted", "Category", "Payee",
                    "Note"
                ],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct EntryRow {
    pub date: String,
    pub book: String,
    pub kind: String,
    pub amount: String,
    pub currency: String,
    pub converted: String,
    pub category: String,
    pub payee: String,
    pub note: String,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<EntryRow>> {
    let mut sql = String::from(
        "SELECT e.date, b.name, e.kind, e.amount, e.currency, e.converted_amount, e.converted_currency, c.name, e.payee, e.note \
         FROM entries e LEFT JOIN books b ON e.book_id=b.id LEFT JOIN categories c ON e.category_id=c.id WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();

    if let Some(month) = sub.get_one::<String>("month") {
        sql.push_str(" AND substr(e.date,1,7)=?");
        params_vec.push(parse_month(month)?);
    }
    if let Some(book) = sub.get_one::<String>("book") {
        sql.push_str(" AND b.name=?");
        params_vec.push(book.into());
    }
    if let Some(kind) = sub.get_one::<String>("kind") {
        sql.push_str(" AND e.kind=?");
        params_vec.push(kind.into());
    }
    sql.push_str(" ORDER BY e.date DESC, e.id DESC");
    if let Some(limit) = sub.get_one::<usize>("limit") {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = if params_vec.is_empty() {
        stmt.query([])?
    } else {
        let params: Vec<&dyn rusqlite::ToSql> = params_vec
            .iter()
            .map(|s| s as &dyn rusqlite::ToSql)
            .collect();
        stmt.query(rusqlite::params_from_iter(params))?
    };

    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let date: String = r.get(0)?;
        let book: Option<String> = r.get(1)?;
        let kind: String = r.get(2)?;
        let amount: String = r.get(3)?;
        let currency: String = r.get(4)?;
        let conv_amount: Option<String> = r.get(5)?;
        let conv_ccy: Option<String> = r.get(6)?;
        let category: Option<String> = r.get(7)?;
        let payee: Option<String> = r.get(8)?;
        let note: Option<String> = r.get(9)?;
        let converted = match (conv_amount, conv_ccy) {
            (Some(a), Some(c)) => format!("{} {}", a, c),
            _ => String::new(),
        };
        data.push(EntryRow {
            date,
            book: book.unwrap_or_default(),
            kind,
            amount,
            currency,
            converted,
            category: category.unwrap_or_default(),
            payee: payee.unwrap_or_default(),
            note: note.unwrap_or_default(),
        });
    }
    Ok(data)
}
