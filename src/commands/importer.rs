// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::EntryKind;
use crate::utils::{id_for_category, parse_date, parse_decimal};
use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use rusqlite::{params, Connection};
use std::collections::{hash_map::Entry, HashMap};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("entries", sub)) => import_entries(conn, sub),
        _ => Ok(()),
    }
}

/// Columns: date,book,kind,amount,currency,category,payee,note.
/// The whole file imports in one transaction; any bad row imports nothing.
fn import_entries(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let tx = conn.transaction()?;
    let mut book_cache: HashMap<String, (i64, String)> = HashMap::new();
    let mut category_cache: HashMap<String, i64> = HashMap::new();

    for result in rdr.records() {
        let rec = result?;
        let date_raw = rec.get(0).context("date missing")?.trim().to_string();
        let book = rec.get(1).context("book missing")?.trim().to_string();
        let kind_raw = rec.get(2).context("kind missing")?.trim().to_string();
        let amount_raw = rec.get(3).context("amount missing")?.trim().to_string();
        let csv_currency = rec.get(4).unwrap_or("").trim();
        let category = rec.get(5).unwrap_or("").trim().to_string();
        let payee = rec
            .get(6)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());
        let note = rec
            .get(7)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        let date =
            parse_date(&date_raw).with_context(|| format!("Invalid entry date '{}'", date_raw))?;
        let kind = EntryKind::parse(&kind_raw)
            .ok_or_else(|| anyhow!("Unknown entry kind '{}' (use income|expense)", kind_raw))?;
        let amount = parse_decimal(&amount_raw)
            .with_context(|| format!("Invalid amount '{}' on {}", amount_raw, date_raw))?;
        if amount <= rust_decimal::Decimal::ZERO {
            return Err(anyhow!(
                "Amount must be positive, got '{}' on {}",
                amount,
                date_raw
            ));
        }

        let book_id: i64;
        let book_currency: &str;
        match book_cache.entry(book.clone()) {
            Entry::Occupied(entry) => {
                let (cached_id, cached_ccy) = entry.into_mut();
                book_id = *cached_id;
                book_currency = cached_ccy.as_str();
            }
            Entry::Vacant(entry) => {
                let (id, ccy): (i64, String) = tx
                    .query_row(
                        "SELECT id, currency FROM books WHERE name=?1",
                        params![&book],
                        |r| Ok((r.get(0)?, r.get(1)?)),
                    )
                    .with_context(|| format!("Book '{}' not found", book))?;
                let (cached_id, cached_ccy) = entry.insert((id, ccy));
                book_id = *cached_id;
                book_currency = cached_ccy.as_str();
            }
        }
        let currency = if csv_currency.is_empty() {
            book_currency.to_string()
        } else {
            csv_currency.to_uppercase()
        };
        let category_id = if category.is_empty() {
            None
        } else {
            let cat_id = match category_cache.entry(category.clone()) {
                Entry::Occupied(entry) => *entry.get(),
                Entry::Vacant(entry) => {
                    let fetched = id_for_category(&tx, &category)?;
                    *entry.insert(fetched)
                }
            };
            Some(cat_id)
        };

        tx.execute(
            "INSERT INTO entries(book_id, kind, date, amount, currency, category_id, payee, note) \
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
            params![
                book_id,
                kind.as_str(),
                date.to_string(),
                amount.to_string(),
                currency,
                category_id,
                payee.as_deref(),
                note.as_deref()
            ],
        )?;
    }
    tx.commit()?;
    println!("Imported entries from {}", path);
    Ok(())
}
