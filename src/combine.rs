//! Union of frames sharing a target schema, collapsed first-wins.
//!
//! Frames stack in the order given, then rows sharing a (Country, Year)
//! key collapse: for each column the first non-null value encountered in
//! input order is kept and later values are ignored. Input order is
//! therefore significant — callers append the most authoritative source
//! first. Collisions (a later row offering a different non-null value for
//! an already-filled cell) are counted but never treated as errors; the
//! count feeds an optional diagnostic because the sources genuinely do
//! overlap on some keys.

use std::collections::HashMap;

use crate::frame::{Frame, Key, Record};

#[derive(Debug, Default, Clone, Copy)]
pub struct UnionStats {
    pub rows_in: usize,
    pub rows_out: usize,
    /// Later rows that supplied a conflicting non-null value for an
    /// already-filled cell.
    pub collisions: usize,
}

/// Stacks `frames` and collapses duplicate keys first-non-null-wins.
/// The output column set is the union of all input columns in first-seen
/// order; key uniqueness holds in the result by construction.
pub fn union(frames: &[Frame]) -> (Frame, UnionStats) {
    let mut result = Frame::empty();
    let mut index: HashMap<Key, usize> = HashMap::new();
    let mut stats = UnionStats::default();

    for frame in frames {
        for column in &frame.columns {
            result.add_column(column);
        }
        for row in &frame.rows {
            stats.rows_in += 1;
            let key = row.key();
            let slot = match index.get(&key) {
                Some(slot) => *slot,
                None => {
                    let slot = result.rows.len();
                    result.rows.push(Record::new(row.country.clone(), row.year));
                    index.insert(key, slot);
                    slot
                }
            };
            let target = &mut result.rows[slot];
            for column in &frame.columns {
                let Some(value) = row.get(column) else {
                    continue;
                };
                match target.get(column) {
                    None => {
                        target.set(column, Some(value.clone()));
                    }
                    Some(existing) if existing != value => stats.collisions += 1,
                    Some(_) => {}
                }
            }
        }
    }

    stats.rows_out = result.rows.len();
    (result, stats)
}
