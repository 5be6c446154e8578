//! Exact duplicate row removal.

use crate::error::Result;
use polars::prelude::*;

/// Drop every row that equals an earlier row on all columns.
///
/// The first occurrence is kept and row order is preserved. Nulls compare
/// equal to each other, as do NaNs, and `-0.0` equals `0.0`. Returns the
/// de-duplicated frame and the number of rows removed.
pub fn remove_duplicates(df: &DataFrame) -> Result<(DataFrame, usize)> {
    let deduped = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
    let removed = df.height() - deduped.height();
    Ok((deduped, removed))
}
