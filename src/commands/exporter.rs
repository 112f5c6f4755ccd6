// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{anyhow, Context, Result};
use rusqlite::Connection;
use serde_json::Value;
use thiserror::Error;

use crate::utils::parse_date;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unknown format '{0}' (use csv|json)")]
    UnknownFormat(String),
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("entries", sub)) => export_entries(conn, sub),
        Some(("books", sub)) => export_books(conn, sub),
        Some(("categories", sub)) => export_categories(conn, sub),
        _ => Ok(()),
    }
}

/// Serialize rows fully in memory. Nothing touches the filesystem until
/// the payload is complete, so a failed export leaves no partial file.
fn build_payload(fmt: &str, columns: &[&str], rows: Vec<Vec<Option<String>>>) -> Result<Vec<u8>> {
    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_writer(Vec::new());
            wtr.write_record(columns)?;
            for row in &rows {
                wtr.write_record(row.iter().map(|v| v.clone().unwrap_or_default()))?;
            }
            wtr.flush()?;
            wtr.into_inner()
                .map_err(|e| anyhow!("Flush CSV buffer: {}", e))
        }
        "json" => {
            let mut items = Vec::new();
            for row in &rows {
                let mut obj = serde_json::Map::new();
                for (col, v) in columns.iter().zip(row) {
                    let val = match v {
                        Some(s) => Value::String(s.clone()),
                        None => Value::Null,
                    };
                    obj.insert(col.to_string(), val);
                }
                items.push(Value::Object(obj));
            }
            Ok(serde_json::to_string_pretty(&items)?.into_bytes())
        }
        other => Err(ExportError::UnknownFormat(other.to_string()).into()),
    }
}

fn export_entries(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let mut sql = String::from(
        "SELECT e.date, b.name, e.kind, e.amount, e.currency, c.name, e.payee, e.note
         FROM entries e
         LEFT JOIN books b ON e.book_id=b.id
         LEFT JOIN categories c ON e.category_id=c.id
         WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(book) = sub.get_one::<String>("book") {
        sql.push_str(" AND b.name=?");
        params_vec.push(book.into());
    }
    if let Some(from) = sub.get_one::<String>("from") {
        sql.push_str(" AND e.date>=?");
        params_vec.push(parse_date(from)?.to_string());
    }
    if let Some(to) = sub.get_one::<String>("to") {
        sql.push_str(" AND e.date<=?");
        params_vec.push(parse_date(to)?.to_string());
    }
    sql.push_str(" ORDER BY e.date, e.id");

    let mut stmt = conn.prepare(&sql)?;
    let mut cur = if params_vec.is_empty() {
        stmt.query([])?
    } else {
        let params: Vec<&dyn rusqlite::ToSql> = params_vec
            .iter()
            .map(|s| s as &dyn rusqlite::ToSql)
            .collect();
        stmt.query(rusqlite::params_from_iter(params))?
    };

    let mut rows = Vec::new();
    while let Some(r) = cur.next()? {
        rows.push(vec![
            r.get::<_, Option<String>>(0)?,
            r.get::<_, Option<String>>(1)?,
            r.get::<_, Option<String>>(2)?,
            r.get::<_, Option<String>>(3)?,
            r.get::<_, Option<String>>(4)?,
            r.get::<_, Option<String>>(5)?,
            r.get::<_, Option<String>>(6)?,
            r.get::<_, Option<String>>(7)?,
        ]);
    }

    let payload = build_payload(
        &fmt,
        &[
            "date", "book", "kind", "amount", "currency", "category", "payee", "note",
        ],
        rows,
    )?;
    std::fs::write(out, payload).with_context(|| format!("Write {}", out))?;
    println!("Exported entries to {}", out);
    Ok(())
}

fn export_books(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let mut stmt = conn.prepare(
        "SELECT name, currency, lock_currency, lock_rate, created_at FROM books ORDER BY name",
    )?;
    let mut cur = stmt.query([])?;
    let mut rows = Vec::new();
    while let Some(r) = cur.next()? {
        rows.push(vec![
            r.get::<_, Option<String>>(0)?,
            r.get::<_, Option<String>>(1)?,
            r.get::<_, Option<String>>(2)?,
            r.get::<_, Option<String>>(3)?,
            r.get::<_, Option<String>>(4)?,
        ]);
    }

    let payload = build_payload(
        &fmt,
        &["name", "currency", "lock_currency", "lock_rate", "created_at"],
        rows,
    )?;
    std::fs::write(out, payload).with_context(|| format!("Write {}", out))?;
    println!("Exported books to {}", out);
    Ok(())
}

fn export_categories(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let mut stmt = conn.prepare("SELECT name, icon FROM categories ORDER BY name")?;
    let mut cur = stmt.query([])?;
    let mut rows = Vec::new();
    while let Some(r) = cur.next()? {
        rows.push(vec![
            r.get::<_, Option<String>>(0)?,
            r.get::<_, Option<String>>(1)?,
        ]);
    }

    let payload = build_payload(&fmt, &["name", "icon"], rows)?;
    std::fs::write(out, payload).with_context(|| format!("Write {}", out))?;
    println!("Exported categories to {}", out);
    Ok(())
}
