//! Provider-driven XLSX encoding.
//!
//! The crate turns tabular data served by caller-supplied providers into an
//! OOXML spreadsheet package. The application implements
//! [`WorkbookSource`] (plus the optional [`StyleSource`], [`MergeSource`]
//! and [`LinkSource`] capabilities) and hands it to [`Workbook::build`],
//! which pulls every sheet, row and cell in order and returns a [`Package`]
//! ready to be written as an `.xlsx` file:
//!
//! ```no_run
//! use sheetforge::{CellSource, Sheet, SheetDataSource, Workbook, WorkbookSource};
//!
//! struct Report;
//!
//! impl CellSource for Report {
//!     fn row_count(&self, _sheet: &Sheet) -> i64 { 2 }
//!     fn column_count(&self, _sheet: &Sheet) -> i64 { 2 }
//!     fn value(&self, _sheet: &Sheet, row: u32, column: u32) -> Option<serde_json::Value> {
//!         Some(serde_json::json!(format!("r{row}c{column}")))
//!     }
//! }
//!
//! impl WorkbookSource for Report {
//!     fn sheet_count(&self) -> i64 { 1 }
//!     fn sheet(&self, _index: usize) -> Sheet {
//!         Sheet::with_name("report", "Report").unwrap()
//!     }
//!     fn data_source(&self, _sheet: &Sheet) -> Option<SheetDataSource<'_>> {
//!         Some(SheetDataSource::new(self))
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let package = Workbook::new("monthly-report")?.build(&Report)?;
//! package.save_to_file("report.xlsx")?;
//! # Ok(())
//! # }
//! ```
//!
//! Values are classified by shape: booleans, numbers, text, and text with a
//! leading `=` (encoded as a formula). Styles deduplicate structurally, text
//! is interned into a shared string table, and relationship ids are assigned
//! by one fixed rule so declaring and referencing parts always agree.

pub mod address;
pub mod hyperlinks;
pub mod merge;
pub mod openxml;
pub mod package;
pub mod provider;
pub mod shared_strings;
pub mod sheet;
pub mod style;
pub mod style_registry;
pub mod value;
pub mod workbook;
pub mod worksheet;

pub use address::{col_to_name, name_to_col, CellRef};
pub use package::{Package, PackageError};
pub use provider::{
    CellSource, LinkSource, MergeSource, SheetDataSource, StyleSource, WorkbookSource,
};
pub use sheet::{Sheet, SheetError};
pub use style::{
    BorderEdge, BorderLine, BorderSide, Color, HorizontalAlignment, Style, StyleError,
    VerticalAlignment,
};
pub use value::CellValue;
pub use workbook::{BuildError, Workbook, WorkbookError};
