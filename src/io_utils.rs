//! CSV reading, writing, encoding, and delimiter resolution.
//!
//! All file I/O flows through this module: extension-based delimiter
//! detection (`.csv` → comma, `.tsv` → tab) with manual override, input
//! decoding via `encoding_rs` (UTF-8 default), and the `-` path convention
//! for stdout. Source files are read whole into a [`RawTable`] with header
//! names trimmed, since several upstream exports pad their headers with
//! stray whitespace.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};

use crate::{error::SourceError, frame::RawTable};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn resolve_output_delimiter(path: Option<&Path>, provided: Option<u8>, fallback: u8) -> u8 {
    if let Some(delim) = provided {
        return delim;
    }
    if let Some(path) = path {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => return DEFAULT_TSV_DELIMITER,
            Some(ext) if ext.eq_ignore_ascii_case("csv") => return DEFAULT_CSV_DELIMITER,
            _ => {}
        }
    }
    fallback
}

fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

fn decode_bytes(
    bytes: &[u8],
    encoding: &'static Encoding,
    path: &Path,
) -> Result<String, SourceError> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(SourceError::Decode {
            path: path.to_path_buf(),
            encoding: encoding.name().to_string(),
        })
    } else {
        Ok(text.into_owned())
    }
}

/// Reads an entire delimited file into memory. The raw table is immutable
/// from here on; every downstream stage derives new frames from it.
pub fn read_raw_table(
    path: &Path,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<RawTable, SourceError> {
    if !path.exists() {
        return Err(SourceError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = open_csv_reader(BufReader::new(file), delimiter);

    let header_record = reader
        .byte_headers()
        .map_err(|source| SourceError::Parse {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    let headers = header_record
        .iter()
        .map(|field| decode_bytes(field, encoding, path).map(|name| name.trim().to_string()))
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(|source| SourceError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = record
            .iter()
            .map(|field| decode_bytes(field, encoding, path))
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(decoded);
    }

    Ok(RawTable { headers, rows })
}

/// Opens the output writer; `-` or no path routes to stdout. Output is
/// always UTF-8 with full quoting for round-trip safety.
pub fn open_csv_writer(path: Option<&Path>, delimiter: u8) -> Result<csv::Writer<Box<dyn Write>>> {
    let base: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(std::io::stdout()),
    };

    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Always)
        .double_quote(true);
    Ok(builder.from_writer(base))
}
