//! Provider contracts.
//!
//! The surrounding application supplies workbook contents through these
//! traits; the encoder pulls from them in strict traversal order and never
//! caches across builds. Optional capabilities (styles, merges, hyperlinks)
//! are explicit fields of [`SheetDataSource`] rather than runtime type
//! checks, so whether a workbook supports styling is visible where the
//! source is constructed.

use crate::sheet::Sheet;
use crate::style::Style;

/// Top-level provider: enumerates sheets and their data sources.
///
/// Counts are signed so a misbehaving implementation can be reported as a
/// contract violation instead of silently wrapping.
pub trait WorkbookSource {
    /// Number of sheets in the workbook; must be positive.
    fn sheet_count(&self) -> i64;

    /// Descriptor for the sheet at `index` (0-based, `index < sheet_count()`).
    fn sheet(&self, index: usize) -> Sheet;

    /// Cell data source for `sheet`; returning `None` aborts the build.
    fn data_source(&self, sheet: &Sheet) -> Option<SheetDataSource<'_>>;
}

/// Base per-sheet data access.
pub trait CellSource {
    /// Number of rows to traverse; must be positive.
    fn row_count(&self, sheet: &Sheet) -> i64;

    /// Number of columns to traverse; must be positive.
    fn column_count(&self, sheet: &Sheet) -> i64;

    /// Raw value for a cell, or `None` to skip it entirely.
    fn value(&self, sheet: &Sheet, row: u32, column: u32) -> Option<serde_json::Value>;
}

/// Optional styling capability.
pub trait StyleSource {
    /// Workbook-wide default style; its font becomes font index 0.
    fn default_style(&self, _sheet: &Sheet) -> Option<Style> {
        None
    }

    /// Style for one cell, or `None` for unstyled.
    fn style(&self, sheet: &Sheet, column: u32, row: u32) -> Option<Style>;
}

/// Optional merged-range capability.
pub trait MergeSource {
    /// `"A1:B2"`-format range when this cell anchors a merge, else `None`.
    fn merge_range(&self, sheet: &Sheet, column: u32, row: u32) -> Option<String>;
}

/// Optional hyperlink capability.
pub trait LinkSource {
    fn has_link(&self, sheet: &Sheet, row: u32, column: u32) -> bool;

    /// Link target for a cell for which [`Self::has_link`] returned `true`.
    fn link(&self, sheet: &Sheet, row: u32, column: u32) -> String;
}

/// Capability record handed out per sheet.
pub struct SheetDataSource<'a> {
    pub cells: &'a dyn CellSource,
    pub styles: Option<&'a dyn StyleSource>,
    pub merges: Option<&'a dyn MergeSource>,
    pub links: Option<&'a dyn LinkSource>,
}

impl<'a> SheetDataSource<'a> {
    pub fn new(cells: &'a dyn CellSource) -> Self {
        Self {
            cells,
            styles: None,
            merges: None,
            links: None,
        }
    }

    pub fn with_styles(mut self, styles: &'a dyn StyleSource) -> Self {
        self.styles = Some(styles);
        self
    }

    pub fn with_merges(mut self, merges: &'a dyn MergeSource) -> Self {
        self.merges = Some(merges);
        self
    }

    pub fn with_links(mut self, links: &'a dyn LinkSource) -> Self {
        self.links = Some(links);
        self
    }
}
