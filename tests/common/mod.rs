//! Provider stubs shared by the integration tests.

use serde_json::json;
use sheetforge::{
    BorderEdge, BorderLine, CellSource, Color, LinkSource, MergeSource, Sheet, SheetDataSource,
    Style, StyleSource, WorkbookSource,
};

/// One-sheet provider backed by a value grid, with toggleable capabilities.
pub struct GridProvider {
    pub sheet: Sheet,
    pub grid: Vec<Vec<serde_json::Value>>,
    pub styles: bool,
    pub merges: bool,
    pub links: bool,
}

impl GridProvider {
    pub fn new(sheet: Sheet, grid: Vec<Vec<serde_json::Value>>) -> Self {
        Self {
            sheet,
            grid,
            styles: false,
            merges: false,
            links: false,
        }
    }

    /// The grid the original test fixture uses: a header row, a text/number
    /// row and a boolean/formula row.
    pub fn sample() -> Self {
        Self::new(
            Sheet::with_name("sheet1", "Data").unwrap(),
            vec![
                vec![json!("Name"), json!("Amount"), json!("Active")],
                vec![json!("alpha"), json!(42.5), json!(true)],
                vec![json!("beta"), json!(7), json!("=SUM(B2:B3)")],
            ],
        )
    }
}

impl WorkbookSource for GridProvider {
    fn sheet_count(&self) -> i64 {
        1
    }

    fn sheet(&self, _index: usize) -> Sheet {
        self.sheet.clone()
    }

    fn data_source(&self, _sheet: &Sheet) -> Option<SheetDataSource<'_>> {
        let mut source = SheetDataSource::new(self as &dyn CellSource);
        if self.styles {
            source = source.with_styles(self);
        }
        if self.merges {
            source = source.with_merges(self);
        }
        if self.links {
            source = source.with_links(self);
        }
        Some(source)
    }
}

impl CellSource for GridProvider {
    fn row_count(&self, _sheet: &Sheet) -> i64 {
        self.grid.len() as i64
    }

    fn column_count(&self, _sheet: &Sheet) -> i64 {
        self.grid.first().map(Vec::len).unwrap_or(0) as i64
    }

    fn value(&self, _sheet: &Sheet, row: u32, column: u32) -> Option<serde_json::Value> {
        let value = self.grid.get(row as usize)?.get(column as usize)?;
        (!value.is_null()).then(|| value.clone())
    }
}

impl StyleSource for GridProvider {
    fn default_style(&self, _sheet: &Sheet) -> Option<Style> {
        Some(Style::new().font_family("Helvetica").font_size(11.0))
    }

    fn style(&self, _sheet: &Sheet, _column: u32, row: u32) -> Option<Style> {
        (row == 0).then(|| {
            Style::new()
                .bold(true)
                .background_color(Color::parse("DDDDDD").unwrap())
                .border(
                    BorderEdge::Bottom,
                    BorderLine::Thin,
                    Color::parse("000000").unwrap(),
                )
                .height(18.0)
        })
    }
}

impl MergeSource for GridProvider {
    fn merge_range(&self, _sheet: &Sheet, column: u32, row: u32) -> Option<String> {
        (row == 0 && column == 0).then(|| "A1:B1".to_string())
    }
}

impl LinkSource for GridProvider {
    fn has_link(&self, _sheet: &Sheet, row: u32, column: u32) -> bool {
        row == 1 && column == 0
    }

    fn link(&self, _sheet: &Sheet, _row: u32, _column: u32) -> String {
        "https://example.com/alpha".to_string()
    }
}
