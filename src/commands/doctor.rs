// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::rates::compose_rate;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection) -> Result<()> {
    let mut counts = Vec::new();
    for table in ["books", "categories", "entries", "fx_rates"] {
        let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?;
        counts.push(format!("{}: {}", table, n));
    }
    println!("{}", counts.join(", "));

    let mut rows = Vec::new();

    // 1) Orphaned references
    let mut stmt = conn.prepare(
        "SELECT e.id FROM entries e LEFT JOIN books b ON e.book_id=b.id WHERE b.id IS NULL",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        rows.push(vec!["entry_without_book".into(), format!("entry {}", id)]);
    }
    let mut stmt = conn.prepare(
        "SELECT e.id FROM entries e WHERE e.category_id IS NOT NULL \
         AND NOT EXISTS (SELECT 1 FROM categories c WHERE c.id=e.category_id)",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        rows.push(vec!["entry_without_category".into(), format!("entry {}", id)]);
    }

    // 2) FX coverage gaps: entries in a foreign currency that neither a
    //    cached conversion, a book lock, nor a stored rate can normalize
    let base = crate::utils::get_default_currency(conn)?;
    let mut stmt = conn.prepare(
        "SELECT e.id, e.date, e.currency, e.converted_currency, b.lock_currency \
         FROM entries e LEFT JOIN books b ON e.book_id=b.id \
         WHERE e.currency != ?1 ORDER BY e.date",
    )?;
    let mut cur = stmt.query([&base])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let date: chrono::NaiveDate = r.get(1)?;
        let ccy: String = r.get(2)?;
        let cached_ccy: Option<String> = r.get(3)?;
        let lock_ccy: Option<String> = r.get(4)?;
        if cached_ccy.as_deref() == Some(base.as_str()) || lock_ccy.as_deref() == Some(base.as_str())
        {
            continue;
        }
        if compose_rate(conn, date, &base, &ccy, &base)?.is_none() {
            rows.push(vec!["missing_fx".into(), format!("entry {} ({} {})", id, date, ccy)]);
        }
    }

    // 3) Cached conversions that disagree with their book's locked rate
    let mut stmt = conn.prepare(
        "SELECT e.id, e.converted_rate, b.lock_rate, b.name \
         FROM entries e JOIN books b ON e.book_id=b.id \
         WHERE b.lock_rate IS NOT NULL AND b.lock_currency IS NOT NULL \
           AND e.converted_currency = b.lock_currency AND e.converted_rate IS NOT NULL",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let cached_raw: String = r.get(1)?;
        let lock_raw: String = r.get(2)?;
        let book: String = r.get(3)?;
        match (cached_raw.parse::<Decimal>(), lock_raw.parse::<Decimal>()) {
            (Ok(cached), Ok(lock)) => {
                if cached != lock {
                    rows.push(vec![
                        "stale_lock_cache".into(),
                        format!("entry {} in '{}' (cached {} vs lock {})", id, book, cached, lock),
                    ]);
                }
            }
            _ => rows.push(vec![
                "invalid_rate".into(),
                format!("entry {} in '{}'", id, book),
            ]),
        }
    }

    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
