//! Worksheet part encoding.
//!
//! One encoder pass walks the provider's row/column grid in order, renders
//! `<sheetData>` cell by cell and collects everything that lands outside the
//! grid: column widths, merged ranges and hyperlinks. Elements are emitted
//! in schema order (`dimension`, `sheetViews`, `cols`, `sheetData`,
//! `mergeCells`, `hyperlinks`), which also means merges render before links
//! even though both are discovered during the same traversal.

use std::collections::BTreeMap;

use crate::address::CellRef;
use crate::hyperlinks::SheetHyperlinks;
use crate::merge::normalize_merge_range;
use crate::openxml::{escape_text, format_hundredths, XML_DECL};
use crate::provider::SheetDataSource;
use crate::shared_strings::SharedStrings;
use crate::sheet::Sheet;
use crate::style_registry::StyleRegistry;
use crate::value::CellValue;
use crate::workbook::BuildError;

/// SpreadsheetML sheet size limits.
const MAX_ROWS: i64 = 1_048_576;
const MAX_COLUMNS: i64 = 16_384;

const WORKSHEET_OPEN: &str = concat!(
    r#"<worksheet xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#,
    r#" xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main""#,
    r#" xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006""#,
    r#" xmlns:x14ac="http://schemas.microsoft.com/office/spreadsheetml/2009/9/ac""#,
    r#" mc:Ignorable="x14ac">"#
);

/// A rendered worksheet plus the hyperlink table its cells reference.
#[derive(Debug)]
pub struct EncodedWorksheet {
    pub xml: String,
    pub hyperlinks: SheetHyperlinks,
}

/// Encode one sheet's grid into a worksheet part.
///
/// Strings are interned into `strings` and styles into `styles` as they are
/// encountered, so calling order across sheets fixes the workbook-wide
/// table order.
pub fn encode_worksheet(
    sheet: &Sheet,
    source: &SheetDataSource<'_>,
    strings: &mut SharedStrings,
    styles: &mut StyleRegistry,
) -> Result<EncodedWorksheet, BuildError> {
    let rows = source.cells.row_count(sheet);
    if rows <= 0 {
        return Err(BuildError::NonPositiveRowCount {
            sheet: sheet.identifier().to_string(),
            count: rows,
        });
    }
    let columns = source.cells.column_count(sheet);
    if columns <= 0 {
        return Err(BuildError::NonPositiveColumnCount {
            sheet: sheet.identifier().to_string(),
            count: columns,
        });
    }
    if rows > MAX_ROWS {
        return Err(BuildError::RowCountTooLarge {
            sheet: sheet.identifier().to_string(),
            count: rows,
        });
    }
    if columns > MAX_COLUMNS {
        return Err(BuildError::ColumnCountTooLarge {
            sheet: sheet.identifier().to_string(),
            count: columns,
        });
    }
    let rows = rows as u32;
    let columns = columns as u32;

    let mut hyperlinks = SheetHyperlinks::new();
    let mut hyperlink_refs = String::new();
    let mut merges = String::new();
    // first styled cell wins for both widths and heights
    let mut column_widths: BTreeMap<u32, u32> = BTreeMap::new();
    // extent of cells actually emitted; skipped cells contribute nothing
    let mut used: Option<(u32, u32)> = None;
    let mut sheet_data = String::from("<sheetData>");

    for row in 0..rows {
        let mut row_height: Option<u32> = None;
        let mut cells = String::new();

        for column in 0..columns {
            let Some(raw) = source.cells.value(sheet, row, column) else {
                continue;
            };
            if raw.is_null() {
                continue;
            }

            let cell = CellRef::new(row, column);
            used = Some(match used {
                None => (row, column),
                Some((r, c)) => (r.max(row), c.max(column)),
            });
            let value = CellValue::classify(&raw).map_err(|kind| BuildError::UnsupportedValue {
                sheet: sheet.identifier().to_string(),
                cell: cell.to_a1(),
                kind: kind.0,
            })?;

            if let Some(merge_source) = source.merges {
                if let Some(range) = merge_source.merge_range(sheet, column, row) {
                    let range = normalize_merge_range(&range)?;
                    merges.push_str(&format!(r#"<mergeCell ref="{range}"/>"#));
                }
            }

            let mut style_attr = String::new();
            if let Some(style_source) = source.styles {
                if let Some(style) = style_source.style(sheet, column, row) {
                    style_attr = format!(r#" s="{}""#, styles.register(&style));
                    if row_height.is_none() {
                        row_height = style.height_100();
                    }
                    if let Some(width) = style.width_100() {
                        column_widths.entry(column).or_insert(width);
                    }
                }
            }

            if let Some(link_source) = source.links {
                if link_source.has_link(sheet, row, column) {
                    let target = link_source.link(sheet, row, column);
                    let id = hyperlinks.intern(&target);
                    hyperlink_refs.push_str(&format!(
                        r#"<hyperlink ref="{}" r:id="rId{id}"/>"#,
                        cell.to_a1()
                    ));
                }
            }

            let a1 = cell.to_a1();
            match value {
                CellValue::Formula(formula) => {
                    cells.push_str(&format!(
                        r#"<c r="{a1}"{style_attr}><f>{}</f></c>"#,
                        escape_text(&formula)
                    ));
                }
                CellValue::Text(text) => {
                    let index = strings.intern(&text);
                    cells.push_str(&format!(
                        r#"<c r="{a1}" t="s"{style_attr}><v>{index}</v></c>"#
                    ));
                }
                CellValue::Boolean(b) => {
                    cells.push_str(&format!(
                        r#"<c r="{a1}" t="b"{style_attr}><v>{}</v></c>"#,
                        b as u8
                    ));
                }
                CellValue::Number(n) => {
                    cells.push_str(&format!(r#"<c r="{a1}"{style_attr}><v>{n}</v></c>"#));
                }
            }
        }

        sheet_data.push_str(&format!(r#"<row r="{}""#, row + 1));
        if let Some(height) = row_height {
            sheet_data.push_str(&format!(
                r#" ht="{}" customHeight="1""#,
                format_hundredths(height)
            ));
        }
        sheet_data.push('>');
        sheet_data.push_str(&cells);
        sheet_data.push_str("</row>");
    }
    sheet_data.push_str("</sheetData>");

    let mut xml = String::with_capacity(sheet_data.len() + 512);
    xml.push_str(XML_DECL);
    xml.push('\n');
    xml.push_str(WORKSHEET_OPEN);

    match used {
        Some((row, column)) => xml.push_str(&format!(
            r#"<dimension ref="A1:{}"/>"#,
            CellRef::new(row, column).to_a1()
        )),
        None => xml.push_str(r#"<dimension ref="A1"/>"#),
    }

    xml.push_str("<sheetViews>");
    if sheet.first_row_frozen() {
        xml.push_str(
            r#"<sheetView tabSelected="1" workbookViewId="0"><pane ySplit="1" topLeftCell="A2" state="frozen"/></sheetView>"#,
        );
    } else {
        xml.push_str(r#"<sheetView tabSelected="1" workbookViewId="0"/>"#);
    }
    xml.push_str("</sheetViews>");

    if !column_widths.is_empty() {
        xml.push_str("<cols>");
        for (&column, &width) in &column_widths {
            xml.push_str(&format!(
                r#"<col min="{min}" max="{min}" width="{}" customWidth="1"/>"#,
                format_hundredths(width),
                min = column + 1
            ));
        }
        xml.push_str("</cols>");
    }

    xml.push_str(&sheet_data);

    if !merges.is_empty() {
        xml.push_str(&format!("<mergeCells>{merges}</mergeCells>"));
    }
    if !hyperlink_refs.is_empty() {
        xml.push_str(&format!("<hyperlinks>{hyperlink_refs}</hyperlinks>"));
    }

    xml.push_str("</worksheet>");

    Ok(EncodedWorksheet { xml, hyperlinks })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{CellSource, LinkSource, MergeSource, StyleSource};
    use crate::style::Style;
    use serde_json::json;

    struct Grid {
        rows: i64,
        columns: i64,
        cells: Vec<Vec<serde_json::Value>>,
    }

    impl Grid {
        fn new(cells: Vec<Vec<serde_json::Value>>) -> Self {
            Self {
                rows: cells.len() as i64,
                columns: cells.first().map(Vec::len).unwrap_or(0) as i64,
                cells,
            }
        }
    }

    impl CellSource for Grid {
        fn row_count(&self, _sheet: &Sheet) -> i64 {
            self.rows
        }

        fn column_count(&self, _sheet: &Sheet) -> i64 {
            self.columns
        }

        fn value(&self, _sheet: &Sheet, row: u32, column: u32) -> Option<serde_json::Value> {
            let value = self.cells.get(row as usize)?.get(column as usize)?;
            (!value.is_null()).then(|| value.clone())
        }
    }

    fn encode(sheet: &Sheet, source: &SheetDataSource<'_>) -> (String, SharedStrings) {
        let mut strings = SharedStrings::new();
        let mut styles = StyleRegistry::new(None);
        let encoded = encode_worksheet(sheet, source, &mut strings, &mut styles).unwrap();
        (encoded.xml, strings)
    }

    #[test]
    fn cell_kinds_render_with_their_type_markers() {
        let grid = Grid::new(vec![vec![
            json!("hello"),
            json!(42),
            json!(42.5),
            json!(true),
            json!("=SUM(B1:C1)"),
        ]]);
        let sheet = Sheet::new("s1").unwrap();
        let (xml, strings) = encode(&sheet, &SheetDataSource::new(&grid));

        assert!(xml.contains(r#"<c r="A1" t="s"><v>0</v></c>"#));
        assert!(xml.contains(r#"<c r="B1"><v>42</v></c>"#));
        assert!(xml.contains(r#"<c r="C1"><v>42.5</v></c>"#));
        assert!(xml.contains(r#"<c r="D1" t="b"><v>1</v></c>"#));
        assert!(xml.contains(r#"<c r="E1"><f>SUM(B1:C1)</f></c>"#));
        assert_eq!(strings.len(), 1);
    }

    #[test]
    fn null_cells_are_skipped_but_rows_still_render() {
        let grid = Grid::new(vec![
            vec![json!("a"), json!(null)],
            vec![json!(null), json!(null)],
        ]);
        let sheet = Sheet::new("s1").unwrap();
        let (xml, _) = encode(&sheet, &SheetDataSource::new(&grid));
        assert!(xml.contains(r#"<row r="1"><c r="A1" t="s"><v>0</v></c></row>"#));
        assert!(xml.contains(r#"<row r="2"></row>"#));
    }

    #[test]
    fn dimension_covers_the_whole_grid() {
        let grid = Grid::new(vec![vec![json!(1); 3]; 4]);
        let sheet = Sheet::new("s1").unwrap();
        let (xml, _) = encode(&sheet, &SheetDataSource::new(&grid));
        assert!(xml.contains(r#"<dimension ref="A1:C4"/>"#));
    }

    #[test]
    fn dimension_ignores_trailing_null_cells() {
        let grid = Grid::new(vec![
            vec![json!(1), json!(2), json!(null)],
            vec![json!(3), json!(4), json!(null)],
        ]);
        let sheet = Sheet::new("s1").unwrap();
        let (xml, _) = encode(&sheet, &SheetDataSource::new(&grid));
        assert!(xml.contains(r#"<dimension ref="A1:B2"/>"#));
    }

    #[test]
    fn all_null_grid_collapses_the_dimension_to_a1() {
        let grid = Grid::new(vec![vec![json!(null), json!(null)]]);
        let sheet = Sheet::new("s1").unwrap();
        let (xml, _) = encode(&sheet, &SheetDataSource::new(&grid));
        assert!(xml.contains(r#"<dimension ref="A1"/>"#));
    }

    #[test]
    fn frozen_first_row_renders_a_pane() {
        let grid = Grid::new(vec![vec![json!(1)]]);
        let sheet = Sheet::new("s1").unwrap().freeze_first_row(true);
        let (xml, _) = encode(&sheet, &SheetDataSource::new(&grid));
        assert!(xml.contains(r#"<pane ySplit="1" topLeftCell="A2" state="frozen"/>"#));
    }

    #[test]
    fn non_positive_counts_are_contract_violations() {
        let grid = Grid::new(vec![]);
        let sheet = Sheet::new("s1").unwrap();
        let mut strings = SharedStrings::new();
        let mut styles = StyleRegistry::new(None);
        let err =
            encode_worksheet(&sheet, &SheetDataSource::new(&grid), &mut strings, &mut styles)
                .unwrap_err();
        assert!(matches!(err, BuildError::NonPositiveRowCount { count: 0, .. }));
    }

    struct StaticMerge(&'static str);

    impl MergeSource for StaticMerge {
        fn merge_range(&self, _sheet: &Sheet, column: u32, row: u32) -> Option<String> {
            (row == 0 && column == 0).then(|| self.0.to_string())
        }
    }

    #[test]
    fn merge_ranges_are_normalized_into_merge_cells() {
        let grid = Grid::new(vec![vec![json!("x"), json!("y")]]);
        let merges = StaticMerge("a1:b1");
        let sheet = Sheet::new("s1").unwrap();
        let (xml, _) = encode(&sheet, &SheetDataSource::new(&grid).with_merges(&merges));
        assert!(xml.contains(r#"<mergeCells><mergeCell ref="A1:B1"/></mergeCells>"#));
    }

    #[test]
    fn invalid_merge_ranges_abort_the_build() {
        let grid = Grid::new(vec![vec![json!("x")]]);
        let merges = StaticMerge("foobar");
        let sheet = Sheet::new("s1").unwrap();
        let mut strings = SharedStrings::new();
        let mut styles = StyleRegistry::new(None);
        let err = encode_worksheet(
            &sheet,
            &SheetDataSource::new(&grid).with_merges(&merges),
            &mut strings,
            &mut styles,
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::InvalidMergeRange(_)));
    }

    struct HeaderStyles;

    impl StyleSource for HeaderStyles {
        fn style(&self, _sheet: &Sheet, column: u32, row: u32) -> Option<Style> {
            match (row, column) {
                (0, 0) => Some(Style::new().bold(true).width(25.0).height(20.0)),
                (0, 1) => Some(Style::new().bold(true).width(99.0).height(99.0)),
                _ => None,
            }
        }
    }

    #[test]
    fn first_styled_cell_fixes_row_height_and_column_width() {
        let grid = Grid::new(vec![vec![json!("a"), json!("b")]]);
        let styles = HeaderStyles;
        let sheet = Sheet::new("s1").unwrap();
        let (xml, _) = encode(&sheet, &SheetDataSource::new(&grid).with_styles(&styles));
        // row height comes from A1, not B1
        assert!(xml.contains(r#"<row r="1" ht="20" customHeight="1">"#));
        // each column keeps its own first width
        assert!(xml.contains(r#"<col min="1" max="1" width="25" customWidth="1"/>"#));
        assert!(xml.contains(r#"<col min="2" max="2" width="99" customWidth="1"/>"#));
        // the two styles differ structurally, so they get distinct formats
        assert!(xml.contains(r#"<c r="A1" t="s" s="1">"#));
        assert!(xml.contains(r#"<c r="B1" t="s" s="2">"#));
    }

    struct OneLink;

    impl LinkSource for OneLink {
        fn has_link(&self, _sheet: &Sheet, row: u32, column: u32) -> bool {
            row == 0 && column == 1
        }

        fn link(&self, _sheet: &Sheet, _row: u32, _column: u32) -> String {
            "https://example.com".to_string()
        }
    }

    #[test]
    fn links_render_after_sheet_data_with_matching_rel_ids() {
        let grid = Grid::new(vec![vec![json!("a"), json!("b")]]);
        let links = OneLink;
        let sheet = Sheet::new("s1").unwrap();
        let mut strings = SharedStrings::new();
        let mut styles = StyleRegistry::new(None);
        let encoded = encode_worksheet(
            &sheet,
            &SheetDataSource::new(&grid).with_links(&links),
            &mut strings,
            &mut styles,
        )
        .unwrap();
        assert!(encoded
            .xml
            .contains(r#"<hyperlinks><hyperlink ref="B1" r:id="rId1"/></hyperlinks>"#));
        assert_eq!(encoded.hyperlinks.len(), 1);
        assert!(encoded.hyperlinks.rels_xml().unwrap().contains("https://example.com"));
    }
}
