//! Merged-range validation.

use thiserror::Error;

use crate::address::name_to_col;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("merge range {0:?} is not in \"A1:B2\" format")]
pub struct InvalidMergeRange(pub String);

/// Validate and normalize a provider-supplied merge range.
///
/// Input is uppercased first, so `"a1:b2"` is accepted; anything that does
/// not match `<letters><digits>:<letters><digits>` is rejected. Rows are
/// 1-based, so row `0` (and any leading-zero form) is invalid; row numbers
/// of any length are allowed on both sides.
pub fn normalize_merge_range(range: &str) -> Result<String, InvalidMergeRange> {
    let range = range.to_ascii_uppercase();
    let invalid = || InvalidMergeRange(range.clone());

    let (start, end) = range.split_once(':').ok_or_else(invalid)?;
    for corner in [start, end] {
        let digits = corner.find(|c: char| c.is_ascii_digit()).ok_or_else(invalid)?;
        let (letters, row) = corner.split_at(digits);
        if name_to_col(letters).is_none()
            || row.starts_with('0')
            || !row.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
    }
    Ok(range)
}
