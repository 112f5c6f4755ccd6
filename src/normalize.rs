// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{Book, Entry, NormalizedEntry, Scope};
use crate::rates::RateProvider;

/// Give every entry a display amount in `target`, the reporting currency.
///
/// Per entry, in priority order: a cached conversion into `target` is
/// trusted unless its book pins a locked rate for `target` and the cached
/// rate disagrees, in which case the amount is recomputed from the raw
/// amount and the locked rate. Without a usable cache, a rate is asked of
/// `rates` (scoped to the owning book); a missing rate degrades to the raw
/// amount rather than failing. Same-currency entries pass through as-is.
pub fn normalize_entries(
    entries: Vec<Entry>,
    books: &HashMap<i64, Book>,
    target: &str,
    rates: &dyn RateProvider,
) -> Vec<NormalizedEntry> {
    entries
        .into_iter()
        .map(|entry| {
            let amount = display_amount(&entry, books, target, rates);
            NormalizedEntry { entry, amount }
        })
        .collect()
}

fn display_amount(
    entry: &Entry,
    books: &HashMap<i64, Book>,
    target: &str,
    rates: &dyn RateProvider,
) -> Decimal {
    let lock = books
        .get(&entry.book_id)
        .and_then(|b| b.locked_rate(target));

    if let (Some(cached), Some(cached_ccy)) = (entry.converted_amount, &entry.converted_currency) {
        if cached_ccy == target {
            match lock {
                Some(rate) if entry.converted_rate != Some(rate) => {
                    debug!(
                        "entry {}: cached rate {:?} disagrees with book lock {}, recomputing",
                        entry.id, entry.converted_rate, rate
                    );
                    return entry.amount * rate;
                }
                _ => return cached,
            }
        }
        // Cache held in some other currency; fall through to a live lookup.
    }

    if entry.currency == target {
        return entry.amount;
    }
    match rates.rate(&entry.currency, target, entry.book_id) {
        Some(rate) => entry.amount * rate,
        None => {
            debug!(
                "entry {}: no rate {} -> {}, using raw amount",
                entry.id, entry.currency, target
            );
            entry.amount
        }
    }
}

/// Keep the entries a scope selects. An id matching no entry yields an
/// empty set, not an error.
pub fn filter_scope(entries: Vec<NormalizedEntry>, scope: Scope) -> Vec<NormalizedEntry> {
    match scope {
        Scope::All => entries,
        Scope::Book(id) => entries
            .into_iter()
            .filter(|n| n.entry.book_id == id)
            .collect(),
    }
}
