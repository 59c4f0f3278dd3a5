//! Full outer join of two frames on (Country, Year).
//!
//! Every key present in either side appears exactly once in the result;
//! columns unique to one side are left absent (null) on rows contributed
//! only by the other. Both sides must have unique keys — the reshaper and
//! combiner guarantee this upstream. Non-key columns sharing a name across
//! both sides are not reconciled: the accumulator (left) value stands and
//! the overlap is logged once per column, so callers should keep metric
//! names disjoint across sources.

use std::collections::HashMap;

use log::warn;

use crate::frame::{Frame, Key, Record};

/// Full outer join; column order is `base`'s columns followed by the
/// columns unique to `other`.
pub fn merge(base: &Frame, other: &Frame) -> Frame {
    let fresh_columns: Vec<String> = other
        .columns
        .iter()
        .filter(|column| {
            let collides = base.columns.contains(column);
            if collides {
                warn!(
                    "column '{column}' exists on both join sides; keeping the accumulated value"
                );
            }
            !collides
        })
        .cloned()
        .collect();

    let mut result = Frame::new(base.columns.iter().cloned());
    for column in &fresh_columns {
        result.add_column(column);
    }

    let mut index: HashMap<Key, usize> = HashMap::new();
    for row in &base.rows {
        index.insert(row.key(), result.rows.len());
        result.rows.push(row.clone());
    }

    for row in &other.rows {
        match index.get(&row.key()) {
            Some(slot) => {
                let target = &mut result.rows[*slot];
                for column in &fresh_columns {
                    target.set(column, row.get(column).cloned());
                }
            }
            None => {
                // Key only on the right: base columns stay null, and the
                // right side supplies everything it has, shared-name
                // columns included.
                let mut record = Record::new(row.country.clone(), row.year);
                for column in &other.columns {
                    record.set(column, row.get(column).cloned());
                }
                result.rows.push(record);
            }
        }
    }

    result
}
