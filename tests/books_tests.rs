// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use billfold::{cli, commands::books};
use rusqlite::Connection;

fn base_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE books(
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            currency TEXT NOT NULL,
            lock_currency TEXT,
            lock_rate TEXT,
            created_at TEXT
        );
        "#,
    )
    .unwrap();
    conn
}

fn dispatch_book(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches_from(args);
    if let Some(("book", book_m)) = matches.subcommand() {
        books::handle(conn, book_m)
    } else {
        panic!("no book subcommand");
    }
}

#[test]
fn add_uppercases_currency() {
    let conn = base_conn();
    dispatch_book(&conn, &["billfold", "book", "add", "Cash", "--currency", "eur"]).unwrap();

    let ccy: String = conn
        .query_row("SELECT currency FROM books WHERE name='Cash'", [], |r| {
            r.get(0)
        })
        .unwrap();
    assert_eq!(ccy, "EUR");
}

#[test]
fn lock_rate_sets_columns() {
    let conn = base_conn();
    conn.execute(
        "INSERT INTO books(name,currency) VALUES ('Trip','EUR')",
        [],
    )
    .unwrap();

    dispatch_book(
        &conn,
        &[
            "billfold", "book", "lock-rate", "Trip", "--rate", "1.1", "--currency", "usd",
        ],
    )
    .unwrap();

    let (rate, ccy): (Option<String>, Option<String>) = conn
        .query_row(
            "SELECT lock_rate, lock_currency FROM books WHERE name='Trip'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(rate.as_deref(), Some("1.1"));
    assert_eq!(ccy.as_deref(), Some("USD"));
}

#[test]
fn lock_rate_rejects_non_positive_rate() {
    let conn = base_conn();
    conn.execute(
        "INSERT INTO books(name,currency) VALUES ('Trip','EUR')",
        [],
    )
    .unwrap();

    let err = dispatch_book(
        &conn,
        &[
            "billfold", "book", "lock-rate", "Trip", "--rate", "0", "--currency", "USD",
        ],
    )
    .unwrap_err();
    assert!(err
        .to_string()
        .contains("Locked rate must be positive, got '0'"));

    let rate: Option<String> = conn
        .query_row("SELECT lock_rate FROM books WHERE name='Trip'", [], |r| {
            r.get(0)
        })
        .unwrap();
    assert!(rate.is_none());
}

#[test]
fn lock_rate_unknown_book_errors() {
    let conn = base_conn();
    let err = dispatch_book(
        &conn,
        &[
            "billfold", "book", "lock-rate", "Nope", "--rate", "1.2", "--currency", "USD",
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("Book 'Nope' not found"));
}

#[test]
fn unlock_rate_clears_columns() {
    let conn = base_conn();
    conn.execute(
        "INSERT INTO books(name,currency,lock_currency,lock_rate) VALUES ('Trip','EUR','USD','1.2')",
        [],
    )
    .unwrap();

    dispatch_book(&conn, &["billfold", "book", "unlock-rate", "Trip"]).unwrap();

    let (rate, ccy): (Option<String>, Option<String>) = conn
        .query_row(
            "SELECT lock_rate, lock_currency FROM books WHERE name='Trip'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert!(rate.is_none());
    assert!(ccy.is_none());
}

#[test]
fn rm_deletes_book() {
    let conn = base_conn();
    conn.execute(
        "INSERT INTO books(name,currency) VALUES ('Old','USD')",
        [],
    )
    .unwrap();

    dispatch_book(&conn, &["billfold", "book", "rm", "Old"]).unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM books", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}
