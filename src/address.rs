use core::fmt;

use serde::{Deserialize, Serialize};

/// A reference to a single cell within a worksheet.
///
/// Columns are **0-indexed** (`col = 0` is column `A`); rows are 0-indexed
/// internally and rendered 1-based in A1 notation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellRef {
    /// 0-indexed row.
    pub row: u32,
    /// 0-indexed column.
    pub col: u32,
}

impl CellRef {
    #[inline]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Convert to A1 notation (e.g. `A1`, `BC32`).
    pub fn to_a1(self) -> String {
        format!("{}{}", col_to_name(self.col), self.row + 1)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// Column letters for a 0-indexed column.
///
/// Bijective base-26: no letter stands for zero, so the recurrence subtracts
/// one before each division (`0 -> A`, `25 -> Z`, `26 -> AA`, `701 -> ZZ`,
/// `702 -> AAA`).
pub fn col_to_name(col: u32) -> String {
    let mut n = col + 1;
    let mut out = Vec::<u8>::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.iter().rev().map(|&b| b as char).collect()
}

/// Parse uppercase column letters back to a 0-indexed column.
///
/// Returns `None` for empty input or anything outside `A-Z`.
pub fn name_to_col(s: &str) -> Option<u32> {
    if s.is_empty() {
        return None;
    }
    let mut col: u32 = 0;
    for b in s.bytes() {
        if !b.is_ascii_uppercase() {
            return None;
        }
        let v = (b - b'A') as u32 + 1;
        col = col.checked_mul(26)?.checked_add(v)?;
    }
    Some(col - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a1_corners() {
        assert_eq!(CellRef::new(0, 0).to_a1(), "A1");
        assert_eq!(CellRef::new(0, 25).to_a1(), "Z1");
        assert_eq!(CellRef::new(0, 26).to_a1(), "AA1");
        assert_eq!(CellRef::new(0, 16383).to_a1(), "XFD1");
    }

    #[test]
    fn three_letter_columns() {
        assert_eq!(col_to_name(701), "ZZ");
        assert_eq!(col_to_name(702), "AAA");
        assert_eq!(CellRef::new(9, 702).to_a1(), "AAA10");
    }

    #[test]
    fn column_names_round_trip() {
        for col in [0u32, 1, 25, 26, 51, 701, 702, 16383] {
            assert_eq!(name_to_col(&col_to_name(col)), Some(col));
        }
        assert_eq!(name_to_col(""), None);
        assert_eq!(name_to_col("a1"), None);
    }
}
