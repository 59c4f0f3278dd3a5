//! Roll-up of repeated observations to one row per key.
//!
//! Sources such as city-level cost-of-living carry many rows per country;
//! the pipeline needs exactly one. Listed numeric cells reduce via
//! arithmetic mean. A group whose cells are all null (or non-numeric)
//! yields an absent cell, not an error.

use std::collections::HashMap;

use crate::{
    data::Value,
    frame::{Frame, Key, Record},
};

#[derive(Default)]
struct MeanState {
    sum: f64,
    count: usize,
}

impl MeanState {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Groups rows by (Country, Year) and reduces every frame column to its
/// arithmetic mean. Output order follows first appearance of each key.
pub fn mean_by_key(frame: &Frame) -> Frame {
    let mut order: Vec<Key> = Vec::new();
    let mut groups: HashMap<Key, Vec<MeanState>> = HashMap::new();

    for row in &frame.rows {
        let key = row.key();
        let states = groups.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            frame.columns.iter().map(|_| MeanState::default()).collect()
        });
        for (state, column) in states.iter_mut().zip(&frame.columns) {
            if let Some(value) = row.get(column).and_then(Value::as_f64) {
                state.push(value);
            }
        }
    }

    let mut result = Frame::new(frame.columns.iter().cloned());
    for key in order {
        let states = &groups[&key];
        let mut record = Record::new(key.0, key.1);
        for (state, column) in states.iter().zip(&frame.columns) {
            record.set(column, state.mean().map(Value::Float));
        }
        result.rows.push(record);
    }
    result
}
