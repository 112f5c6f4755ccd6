// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{maybe_print_json, parse_decimal, pretty_table};
use anyhow::{anyhow, Result};
use rusqlite::{params, Connection};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let ccy = sub.get_one::<String>("currency").unwrap().to_uppercase();
            conn.execute(
                "INSERT INTO books(name, currency) VALUES (?1, ?2)",
                params![name, ccy],
            )?;
            println!("Added book '{}' ({})", name, ccy);
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("lock-rate", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let rate = parse_decimal(sub.get_one::<String>("rate").unwrap())?;
            let ccy = sub.get_one::<String>("currency").unwrap().to_uppercase();
            if rate <= rust_decimal::Decimal::ZERO {
                return Err(anyhow!("Locked rate must be positive, got '{}'", rate));
            }
            let n = conn.execute(
                "UPDATE books SET lock_rate=?1, lock_currency=?2 WHERE name=?3",
                params![rate.to_string(), ccy, name],
            )?;
            if n == 0 {
                return Err(anyhow!("Book '{}' not found", name));
            }
            println!("Locked '{}' at {} per unit into {}", name, rate, ccy);
        }
        Some(("unlock-rate", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let n = conn.execute(
                "UPDATE books SET lock_rate=NULL, lock_currency=NULL WHERE name=?1",
                params![name],
            )?;
            if n == 0 {
                return Err(anyhow!("Book '{}' not found", name));
            }
            println!("Unlocked '{}'", name);
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            conn.execute("DELETE FROM books WHERE name=?1", params![name])?;
            println!("Removed book '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
struct BookRow {
    name: String,
    currency: String,
    locked: String,
    created: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let mut stmt = conn.prepare(
        "SELECT name, currency, lock_currency, lock_rate, created_at FROM books ORDER BY name",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, Option<String>>(2)?,
            r.get::<_, Option<String>>(3)?,
            r.get::<_, String>(4)?,
        ))
    })?;
    let mut data = Vec::new();
    for row in rows {
        let (name, currency, lock_ccy, lock_rate, created) = row?;
        let locked = match (lock_ccy, lock_rate) {
            (Some(c), Some(r)) => format!("{} {}", r, c),
            _ => String::new(),
        };
        data.push(BookRow {
            name,
            currency,
            locked,
            created,
        });
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|b| {
                vec![
                    b.name.clone(),
                    b.currency.clone(),
                    b.locked.clone(),
                    b.created.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Name", "Currency", "Locked rate", "Created"], rows)
        );
    }
    Ok(())
}
