// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub name: String,
    pub currency: String,
    pub lock_currency: Option<String>,
    pub lock_rate: Option<Decimal>,
}

impl Book {
    /// Locked conversion rate into `target`, if this book pins one.
    pub fn locked_rate(&self, target: &str) -> Option<Decimal> {
        match (&self.lock_currency, self.lock_rate) {
            (Some(ccy), Some(rate)) if ccy == target => Some(rate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Income => "income",
            EntryKind::Expense => "expense",
        }
    }

    pub fn parse(s: &str) -> Option<EntryKind> {
        match s {
            "income" => Some(EntryKind::Income),
            "expense" => Some(EntryKind::Expense),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub book_id: i64,
    pub kind: EntryKind,
    pub date: NaiveDate,
    pub amount: Decimal, // positive magnitude; direction lives in `kind`
    pub currency: String,
    pub category_id: Option<i64>,
    pub payee: Option<String>,
    pub note: Option<String>,
    pub converted_amount: Option<Decimal>,
    pub converted_currency: Option<String>,
    pub converted_rate: Option<Decimal>,
}

/// Which entries feed a computation: everything, or a single book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Book(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Week,
    Month,
}

/// An entry paired with its display amount in the reporting currency.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedEntry {
    pub entry: Entry,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopCategory {
    pub category_id: Option<i64>,
    pub name: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct Insights {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net_savings: Decimal,
    pub savings_rate: Decimal,
    pub avg_daily_expense: Decimal,
    pub top_expense: Option<TopCategory>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub start: NaiveDate,
    pub label: String, // YYYY-Www or YYYY-MM
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryDatum {
    pub category_id: Option<i64>,
    pub name: String,
    pub amount: Decimal,
    pub percent: Decimal,
}
