// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use tracing::debug;

/// A source of conversion rates, scoped to the book an entry belongs to.
///
/// Absence of a rate is a valid answer, never an error; callers degrade
/// instead of failing.
pub trait RateProvider {
    /// Rate converting one unit of `from` into `to` for entries of `book_id`.
    fn rate(&self, from: &str, to: &str, book_id: i64) -> Option<Decimal>;
}

/// Rate provider backed by the local store: a book's locked rate wins,
/// then the closest on-or-before stored rate as of `as_of`.
pub struct StoreRates<'a> {
    conn: &'a Connection,
    as_of: NaiveDate,
    hub: String,
}

impl<'a> StoreRates<'a> {
    pub fn new(conn: &'a Connection, as_of: NaiveDate) -> Result<Self> {
        let hub = crate::utils::get_default_currency(conn)?;
        Ok(StoreRates { conn, as_of, hub })
    }

    fn book_lock(&self, book_id: i64, target: &str) -> Result<Option<Decimal>> {
        let row: Option<(Option<String>, Option<String>)> = self
            .conn
            .query_row(
                "SELECT lock_currency, lock_rate FROM books WHERE id=?1",
                params![book_id],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?;
        match row {
            Some((Some(ccy), Some(raw))) if ccy == target => {
                let rate = raw
                    .parse::<Decimal>()
                    .with_context(|| format!("Invalid locked rate '{}' for book {}", raw, book_id))?;
                Ok(Some(rate))
            }
            _ => Ok(None),
        }
    }

    fn lookup(&self, from: &str, to: &str, book_id: i64) -> Result<Option<Decimal>> {
        if from == to {
            return Ok(Some(Decimal::ONE));
        }
        if let Some(rate) = self.book_lock(book_id, to)? {
            return Ok(Some(rate));
        }
        compose_rate(self.conn, self.as_of, &self.hub, from, to)
    }
}

impl RateProvider for StoreRates<'_> {
    fn rate(&self, from: &str, to: &str, book_id: i64) -> Option<Decimal> {
        match self.lookup(from, to, book_id) {
            Ok(rate) => rate,
            Err(err) => {
                debug!("rate lookup {} -> {} failed: {}", from, to, err);
                None
            }
        }
    }
}

fn find_rate(
    conn: &Connection,
    as_of: NaiveDate,
    base: &str,
    quote: &str,
) -> Result<Option<Decimal>> {
    let mut stmt = conn.prepare(
        "SELECT rate FROM fx_rates WHERE base=?1 AND quote=?2 AND date<=?3 ORDER BY date DESC LIMIT 1",
    )?;
    let r: Option<String> = stmt
        .query_row(params![base, quote, as_of.to_string()], |r| r.get(0))
        .optional()?;
    if let Some(s) = r {
        let d = s
            .parse::<Decimal>()
            .with_context(|| format!("Invalid rate '{}' for {}/{}", s, base, quote))?;
        Ok(Some(d))
    } else {
        Ok(None)
    }
}

/// Resolve a 'from' -> 'to' rate from stored rates using the closest
/// on-or-before quote. Tries the direct pair, then the reciprocal, then
/// triangulates through the `hub` currency.
pub fn compose_rate(
    conn: &Connection,
    as_of: NaiveDate,
    hub: &str,
    from: &str,
    to: &str,
) -> Result<Option<Decimal>> {
    if from == to {
        return Ok(Some(Decimal::ONE));
    }
    if let Some(r) = find_rate(conn, as_of, from, to)? {
        return Ok(Some(r));
    }
    if let Some(r) = find_rate(conn, as_of, to, from)? {
        if !r.is_zero() {
            return Ok(Some(Decimal::ONE / r));
        }
    }
    if from != hub && to != hub {
        let leg_a = compose_rate(conn, as_of, hub, from, hub)?;
        let leg_b = compose_rate(conn, as_of, hub, hub, to)?;
        if let (Some(a), Some(b)) = (leg_a, leg_b) {
            return Ok(Some(a * b));
        }
    }
    Ok(None)
}
