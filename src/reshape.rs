//! Per-source reshaping into the common (Country, Year, metrics) shape.
//!
//! One reshaping rule per source shape, selected by the descriptor. Every
//! extraction is gated by a strict-subset column check: when any required
//! column is absent from the source header the extraction is skipped with a
//! warning and sibling extractions from the same source continue. A skipped
//! extraction is an empty contribution, never a hard failure.

use itertools::Itertools;
use log::{debug, warn};
use regex::Regex;

use crate::{
    aggregate,
    data::{normalize_country, parse_scalar, parse_year},
    frame::{Frame, RawTable, Record},
    manifest::{ColumnMap, SourceDescriptor, SourceShape, YearGroup},
};

/// Converts one raw source table into zero or more reconciled frames.
pub fn reshape(table: &RawTable, descriptor: &SourceDescriptor) -> Vec<Frame> {
    match &descriptor.shape {
        SourceShape::Keyed { country, year } => {
            reshape_keyed(table, &descriptor.name, country, year)
        }
        SourceShape::YearSuffixed { country, groups } => groups
            .iter()
            .filter_map(|group| reshape_group(table, &descriptor.name, country, group))
            .collect(),
        SourceShape::PrefixedAggregate {
            country,
            prefix,
            year,
        } => reshape_prefixed(table, &descriptor.name, country, prefix, *year)
            .into_iter()
            .collect(),
        SourceShape::ConstantYear {
            country,
            year,
            columns,
        } => {
            let group = YearGroup {
                year: *year,
                columns: columns.clone(),
                require_value: false,
            };
            reshape_group(table, &descriptor.name, country, &group)
                .into_iter()
                .collect()
        }
    }
}

/// Explicit country and year columns; everything else passes through as a
/// metric under its trimmed header name.
fn reshape_keyed(table: &RawTable, source: &str, country: &str, year: &str) -> Vec<Frame> {
    let (Some(country_idx), Some(year_idx)) =
        (table.column_index(country), table.column_index(year))
    else {
        warn!("[{source}] key columns '{country}'/'{year}' not all present; skipping source");
        return Vec::new();
    };

    let metric_columns: Vec<(usize, String)> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != country_idx && *idx != year_idx)
        .map(|(idx, name)| (idx, name.clone()))
        .collect();

    let mut frame = Frame::new(metric_columns.iter().map(|(_, name)| name.clone()));
    for row in &table.rows {
        let Some(mut record) = keyed_record(row, country_idx, |row| {
            row.get(year_idx).and_then(|cell| parse_year(cell))
        }) else {
            continue;
        };
        for (idx, name) in &metric_columns {
            record.set(name, row.get(*idx).and_then(|cell| parse_scalar(cell)));
        }
        frame.rows.push(record);
    }
    debug!("[{source}] keyed reshape produced {} row(s)", frame.rows.len());
    vec![frame]
}

/// One declared group of columns at one year, renamed to their output
/// metric names.
fn reshape_group(
    table: &RawTable,
    source: &str,
    country: &str,
    group: &YearGroup,
) -> Option<Frame> {
    let mut required = vec![country];
    required.extend(group.columns.iter().map(|map| map.source.as_str()));
    if !table.has_columns(&required) {
        warn!(
            "[{source}] year {} extraction skipped: requires columns [{}]",
            group.year,
            required.iter().join(", ")
        );
        return None;
    }

    let country_idx = table.column_index(country)?;
    let selected: Vec<(usize, &ColumnMap)> = group
        .columns
        .iter()
        .map(|map| (table.column_index(&map.source).unwrap_or_default(), map))
        .collect();

    let mut frame = Frame::new(selected.iter().map(|(_, map)| map.rename.clone()));
    for row in &table.rows {
        let Some(mut record) = keyed_record(row, country_idx, |_| Some(group.year)) else {
            continue;
        };
        for (idx, map) in &selected {
            record.set(&map.rename, row.get(*idx).and_then(|cell| parse_scalar(cell)));
        }
        if group.require_value && !record.has_any_metric() {
            continue;
        }
        frame.rows.push(record);
    }
    debug!(
        "[{source}] year {} extraction produced {} row(s)",
        group.year,
        frame.rows.len()
    );
    Some(frame)
}

/// Prefix + digits observation columns, mean-aggregated to one row per
/// country at the source's reference year.
fn reshape_prefixed(
    table: &RawTable,
    source: &str,
    country: &str,
    prefix: &str,
    year: i64,
) -> Option<Frame> {
    let Some(country_idx) = table.column_index(country) else {
        warn!("[{source}] country column '{country}' not present; skipping source");
        return None;
    };
    let pattern = match Regex::new(&format!("^{}[0-9]+$", regex::escape(prefix))) {
        Ok(pattern) => pattern,
        Err(err) => {
            warn!("[{source}] invalid column prefix '{prefix}': {err}; skipping source");
            return None;
        }
    };

    let observation_columns: Vec<(usize, String)> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, name)| pattern.is_match(name))
        .map(|(idx, name)| (idx, name.clone()))
        .collect();

    let mut observations = Frame::new(observation_columns.iter().map(|(_, name)| name.clone()));
    for row in &table.rows {
        let Some(mut record) = keyed_record(row, country_idx, |_| Some(year)) else {
            continue;
        };
        for (idx, name) in &observation_columns {
            record.set(name, row.get(*idx).and_then(|cell| parse_scalar(cell)));
        }
        observations.rows.push(record);
    }

    let rolled_up = aggregate::mean_by_key(&observations);
    debug!(
        "[{source}] aggregated {} observation row(s) into {} country row(s)",
        observations.rows.len(),
        rolled_up.rows.len()
    );
    Some(rolled_up)
}

/// Builds the keyed record for one raw row, or `None` when the country
/// cell is blank (a row with no key can never align with anything).
fn keyed_record<F>(row: &[String], country_idx: usize, year: F) -> Option<Record>
where
    F: Fn(&[String]) -> Option<i64>,
{
    let country = normalize_country(row.get(country_idx).map(String::as_str).unwrap_or(""));
    if country.is_empty() {
        return None;
    }
    Some(Record::new(country, year(row)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;
    use crate::manifest::{ColumnMap, SourceDescriptor, SourceShape, YearGroup};

    fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    fn suffixed_descriptor(groups: Vec<YearGroup>) -> SourceDescriptor {
        SourceDescriptor {
            name: "sol".to_string(),
            file: "sol.csv".to_string(),
            shape: SourceShape::YearSuffixed {
                country: "country".to_string(),
                groups,
            },
        }
    }

    #[test]
    fn missing_column_skips_group_but_sibling_succeeds() {
        let table = raw(
            &["country", "HDI_2022"],
            &[&["France", "0.90"], &["Japan", "0.92"]],
        );
        let descriptor = suffixed_descriptor(vec![
            YearGroup {
                year: 2023,
                columns: vec![ColumnMap::new("HDI_2023", "HumanDevelopmentIndex")],
                require_value: false,
            },
            YearGroup {
                year: 2022,
                columns: vec![ColumnMap::new("HDI_2022", "HumanDevelopmentIndex")],
                require_value: false,
            },
        ]);

        let frames = reshape(&table, &descriptor);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].rows.len(), 2);
        assert_eq!(frames[0].rows[0].year, Some(2022));
        assert_eq!(
            frames[0].rows[0].get("HumanDevelopmentIndex"),
            Some(&Value::Float(0.90))
        );
    }

    #[test]
    fn require_value_drops_all_null_rows() {
        let table = raw(
            &["country", "Rank_2022"],
            &[&["France", "12"], &["Atlantis", ""]],
        );
        let descriptor = suffixed_descriptor(vec![YearGroup {
            year: 2022,
            columns: vec![ColumnMap::new("Rank_2022", "Rank")],
            require_value: true,
        }]);

        let frames = reshape(&table, &descriptor);
        assert_eq!(frames[0].rows.len(), 1);
        assert_eq!(frames[0].rows[0].country, "France");
    }

    #[test]
    fn keyed_reshape_passes_remaining_columns_through() {
        let table = raw(
            &["Country", "Year", "GDP", "Population"],
            &[&[" United States ", "2020", "21000", ""]],
        );
        let descriptor = SourceDescriptor {
            name: "economy".to_string(),
            file: "eco.csv".to_string(),
            shape: SourceShape::Keyed {
                country: "Country".to_string(),
                year: "Year".to_string(),
            },
        };

        let frames = reshape(&table, &descriptor);
        assert_eq!(frames.len(), 1);
        let record = &frames[0].rows[0];
        assert_eq!(record.country, "United States");
        assert_eq!(record.year, Some(2020));
        assert_eq!(record.get("GDP"), Some(&Value::Integer(21000)));
        assert_eq!(record.get("Population"), None);
    }

    #[test]
    fn prefixed_reshape_aggregates_repeated_observations() {
        let table = raw(
            &["city", "country", "x1", "x2", "note1"],
            &[
                &["Paris", "France", "10", "4", "z"],
                &["Lyon", "France", "20", "", "z"],
            ],
        );
        let descriptor = SourceDescriptor {
            name: "col".to_string(),
            file: "col.csv".to_string(),
            shape: SourceShape::PrefixedAggregate {
                country: "country".to_string(),
                prefix: "x".to_string(),
                year: 2024,
            },
        };

        let frames = reshape(&table, &descriptor);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].columns, vec!["x1", "x2"]);
        let record = &frames[0].rows[0];
        assert_eq!(record.country, "France");
        assert_eq!(record.year, Some(2024));
        assert_eq!(record.get("x1"), Some(&Value::Float(15.0)));
        assert_eq!(record.get("x2"), Some(&Value::Float(4.0)));
    }
}
