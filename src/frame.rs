//! Frame and record types shared by every pipeline stage.
//!
//! A [`RawTable`] is a source file exactly as read: trimmed headers plus
//! string rows. A [`Frame`] is the common reconciled shape — rows keyed by
//! (Country, Year) carrying a string-keyed metric map, because the metric
//! set is discovered from file headers at run time rather than known
//! statically. Every transformation builds a new frame; nothing is mutated
//! in place once handed to the next stage.

use std::collections::HashMap;

use crate::data::Value;

/// (Country, Year) — the unified key. A `None` year is legal (a base row
/// with an unparseable year cell) and sorts before any concrete year.
pub type Key = (String, Option<i64>);

/// One source table as read from disk, before any reshaping.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// True when every listed column is present — the strict-subset check
    /// that gates each extraction.
    pub fn has_columns(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.column_index(name).is_some())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub country: String,
    pub year: Option<i64>,
    metrics: HashMap<String, Value>,
}

impl Record {
    pub fn new(country: String, year: Option<i64>) -> Self {
        Self {
            country,
            year,
            metrics: HashMap::new(),
        }
    }

    pub fn key(&self) -> Key {
        (self.country.clone(), self.year)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.metrics.get(column)
    }

    /// Sets a metric; `None` leaves the cell absent.
    pub fn set(&mut self, column: &str, value: Option<Value>) {
        if let Some(value) = value {
            self.metrics.insert(column.to_string(), value);
        }
    }

    pub fn has_any_metric(&self) -> bool {
        !self.metrics.is_empty()
    }
}

/// An ordered set of metric columns plus the records carrying them.
/// Semantically a relation: row order is not meaningful until
/// [`Frame::sort_by_key`] runs at the end of the pipeline.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl Frame {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn add_column(&mut self, name: &str) {
        if !self.columns.iter().any(|c| c == name) {
            self.columns.push(name.to_string());
        }
    }

    /// Orders rows by (Country ascending, Year ascending). Rows without a
    /// year sort ahead of every dated row for the same country, which keeps
    /// output deterministic across runs.
    pub fn sort_by_key(&mut self) {
        self.rows
            .sort_by(|a, b| a.country.cmp(&b.country).then(a.year.cmp(&b.year)));
    }
}
