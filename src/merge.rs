//! The reconciliation pipeline: load, reshape, combine, join, sort, emit.
//!
//! The pipeline is a single linear batch job. Sources are read once and
//! stay immutable; every stage derives a fresh frame. The only threaded
//! state is the accumulator frame passed through the sequential outer
//! joins. The base source failing to load is the single unrecoverable
//! condition — every optional source degrades to an empty contribution.

use std::path::Path;

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::{debug, info, warn};

use crate::{
    cli::MergeArgs,
    combine,
    frame::Frame,
    io_utils, join,
    manifest::{Manifest, SourceDescriptor},
    reshape,
};

pub fn execute(args: &MergeArgs) -> Result<()> {
    let manifest = match &args.manifest {
        Some(path) => Manifest::load(path)?,
        None => Manifest::default(),
    };
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;

    let merged = reconcile(
        &manifest,
        &args.data_dir,
        args.delimiter,
        encoding,
        args.report_collisions,
    )?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.data_dir.join("merged_project_data.csv"));
    let delimiter = io_utils::resolve_output_delimiter(
        Some(output.as_path()),
        args.output_delimiter,
        io_utils::DEFAULT_CSV_DELIMITER,
    );
    write_frame(&merged, &output, delimiter)?;
    info!(
        "Wrote {} row(s) across {} column(s) to {:?}",
        merged.rows.len(),
        merged.columns.len() + 2,
        output
    );
    Ok(())
}

/// Runs the full pipeline and returns the sorted merged frame without
/// writing it anywhere.
pub fn reconcile(
    manifest: &Manifest,
    data_dir: &Path,
    delimiter: Option<u8>,
    encoding: &'static Encoding,
    report_collisions: bool,
) -> Result<Frame> {
    let mut accumulator = load_base(&manifest.base, data_dir, delimiter, encoding)?;
    info!(
        "Base source '{}' contributed {} row(s)",
        manifest.base.name,
        accumulator.rows.len()
    );

    for family in &manifest.families {
        let mut frames = Vec::new();
        for source in &family.sources {
            frames.extend(load_optional(source, data_dir, delimiter, encoding));
        }
        let (combined, stats) = combine::union(&frames);
        if stats.collisions > 0 {
            if report_collisions {
                info!(
                    "Family '{}': {} first-wins collision(s) across {} input row(s)",
                    family.name, stats.collisions, stats.rows_in
                );
            } else {
                debug!(
                    "Family '{}': {} first-wins collision(s)",
                    family.name, stats.collisions
                );
            }
        }
        info!(
            "Family '{}' combined into {} row(s), {} column(s)",
            family.name,
            combined.rows.len(),
            combined.columns.len()
        );
        accumulator = join::merge(&accumulator, &combined);
    }

    accumulator.sort_by_key();
    Ok(accumulator)
}

/// Reads and reshapes the base source. Unavailability is fatal here; a
/// schema mismatch inside the reshaper still degrades to an empty frame.
/// The union pass collapses any duplicate (Country, Year) rows so the
/// accumulator enters the join chain with unique keys.
fn load_base(
    descriptor: &SourceDescriptor,
    data_dir: &Path,
    delimiter: Option<u8>,
    encoding: &'static Encoding,
) -> Result<Frame> {
    let path = data_dir.join(&descriptor.file);
    let delimiter = io_utils::resolve_input_delimiter(&path, delimiter);
    let raw = io_utils::read_raw_table(&path, delimiter, encoding)
        .with_context(|| format!("Base source '{}' is unavailable", descriptor.name))?;
    let frames = reshape::reshape(&raw, descriptor);
    let (base, _) = combine::union(&frames);
    Ok(base)
}

/// Reads and reshapes one optional source; any load failure becomes an
/// empty contribution.
fn load_optional(
    descriptor: &SourceDescriptor,
    data_dir: &Path,
    delimiter: Option<u8>,
    encoding: &'static Encoding,
) -> Vec<Frame> {
    let path = data_dir.join(&descriptor.file);
    let delimiter = io_utils::resolve_input_delimiter(&path, delimiter);
    match io_utils::read_raw_table(&path, delimiter, encoding) {
        Ok(raw) => {
            let frames = reshape::reshape(&raw, descriptor);
            debug!(
                "Source '{}' produced {} frame(s)",
                descriptor.name,
                frames.len()
            );
            frames
        }
        Err(err) => {
            warn!("{err}; treating source '{}' as empty", descriptor.name);
            Vec::new()
        }
    }
}

/// Writes the merged frame once: Country, Year, then every metric column
/// in join order. Absent cells become empty fields.
pub fn write_frame(frame: &Frame, output: &Path, delimiter: u8) -> Result<()> {
    let mut writer = io_utils::open_csv_writer(Some(output), delimiter)?;

    let mut headers = vec!["Country".to_string(), "Year".to_string()];
    headers.extend(frame.columns.iter().cloned());
    writer.write_record(&headers).context("Writing header row")?;

    for row in &frame.rows {
        let mut cells = Vec::with_capacity(headers.len());
        cells.push(row.country.clone());
        cells.push(row.year.map(|y| y.to_string()).unwrap_or_default());
        for column in &frame.columns {
            cells.push(row.get(column).map(|v| v.as_display()).unwrap_or_default());
        }
        writer.write_record(&cells).context("Writing merged row")?;
    }

    writer.flush().context("Flushing merged output")?;
    Ok(())
}
