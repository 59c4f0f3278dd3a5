//! Table preview of any delimited file, handy for eyeballing merged output.

use anyhow::{Context, Result};

use crate::{cli::PreviewArgs, io_utils, table};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let raw = io_utils::read_raw_table(&args.input, delimiter, encoding)
        .with_context(|| format!("Previewing {:?}", args.input))?;

    let shown: Vec<Vec<String>> = raw.rows.iter().take(args.rows).cloned().collect();
    table::print_table(&raw.headers, &shown);
    if raw.rows.len() > shown.len() {
        println!("... {} more row(s)", raw.rows.len() - shown.len());
    }
    Ok(())
}
