//! CSV loading and saving for pipeline tables.

use crate::error::{PipelineError, Result, ResultExt};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use tracing::{debug, info};

/// Load a delimited table with a header row.
///
/// The whole file is scanned for schema inference so that a float column
/// whose first rows happen to be integral is not typed as an integer.
pub fn read_table(path: &Path, separator: u8) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(PipelineError::MissingInput(path.to_path_buf()));
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(separator)
                .with_quote_char(Some(b'"')),
        )
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .context(format!("Opening {}", path.display()))?
        .finish()
        .context(format!("Parsing {}", path.display()))?;

    debug!("Loaded {}: {:?}", path.display(), df.shape());
    Ok(df)
}

/// Load a table written by the pipeline (comma separated).
pub fn read_pipeline_table(path: &Path) -> Result<DataFrame> {
    read_table(path, b',')
}

/// Save a table as comma-separated CSV with a header row, creating the
/// parent directory if needed.
pub fn write_table(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(df)
        .context(format!("Writing {}", path.display()))?;

    info!("Saved {} rows x {} columns to {}", df.height(), df.width(), path.display());
    Ok(())
}
