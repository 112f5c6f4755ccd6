// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

use crate::models::{Book, Category, Entry, EntryKind, Scope};

/// Load every book, keyed by id. A row that fails to decode fails the
/// whole load; callers never see a partial snapshot.
pub fn load_books(conn: &Connection) -> Result<HashMap<i64, Book>> {
    let mut stmt =
        conn.prepare("SELECT id, name, currency, lock_currency, lock_rate FROM books ORDER BY id")?;
    let mut cur = stmt.query([])?;
    let mut books = HashMap::new();
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let name: String = r.get(1)?;
        let currency: String = r.get(2)?;
        let lock_currency: Option<String> = r.get(3)?;
        let lock_raw: Option<String> = r.get(4)?;
        let lock_rate = match lock_raw {
            Some(s) => Some(s.parse::<Decimal>().with_context(|| {
                format!("Invalid locked rate '{}' for book '{}'", s, name)
            })?),
            None => None,
        };
        books.insert(
            id,
            Book {
                id,
                name,
                currency,
                lock_currency,
                lock_rate,
            },
        );
    }
    Ok(books)
}

pub fn load_entries(conn: &Connection, scope: Scope) -> Result<Vec<Entry>> {
    const COLS: &str = "id, book_id, kind, date, amount, currency, category_id, payee, note, \
                        converted_amount, converted_currency, converted_rate";
    let (sql, param) = match scope {
        Scope::All => (
            format!("SELECT {} FROM entries ORDER BY date, id", COLS),
            None,
        ),
        Scope::Book(id) => (
            format!("SELECT {} FROM entries WHERE book_id=?1 ORDER BY date, id", COLS),
            Some(id),
        ),
    };
    let mut stmt = conn.prepare(&sql)?;
    let mut cur = match param {
        Some(id) => stmt.query(params![id])?,
        None => stmt.query([])?,
    };

    let mut out = Vec::new();
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let book_id: i64 = r.get(1)?;
        let kind_raw: String = r.get(2)?;
        let date: NaiveDate = r.get(3)?;
        let amount_raw: String = r.get(4)?;
        let currency: String = r.get(5)?;
        let category_id: Option<i64> = r.get(6)?;
        let payee: Option<String> = r.get(7)?;
        let note: Option<String> = r.get(8)?;
        let conv_amount_raw: Option<String> = r.get(9)?;
        let converted_currency: Option<String> = r.get(10)?;
        let conv_rate_raw: Option<String> = r.get(11)?;

        let kind = EntryKind::parse(&kind_raw)
            .ok_or_else(|| anyhow!("Unknown entry kind '{}' for entry {}", kind_raw, id))?;
        let amount = amount_raw
            .parse::<Decimal>()
            .with_context(|| format!("Invalid amount '{}' for entry {}", amount_raw, id))?;
        out.push(Entry {
            id,
            book_id,
            kind,
            date,
            amount,
            currency,
            category_id,
            payee,
            note,
            converted_amount: parse_opt_decimal(conv_amount_raw, id, "converted amount")?,
            converted_currency,
            converted_rate: parse_opt_decimal(conv_rate_raw, id, "converted rate")?,
        });
    }
    Ok(out)
}

pub fn load_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare("SELECT id, name, icon FROM categories ORDER BY id")?;
    let rows = stmt.query_map([], |r| {
        Ok(Category {
            id: r.get(0)?,
            name: r.get(1)?,
            icon: r.get(2)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn parse_opt_decimal(raw: Option<String>, entry_id: i64, what: &str) -> Result<Option<Decimal>> {
    match raw {
        Some(s) => {
            let d = s
                .parse::<Decimal>()
                .with_context(|| format!("Invalid {} '{}' for entry {}", what, s, entry_id))?;
            Ok(Some(d))
        }
        None => Ok(None),
    }
}
