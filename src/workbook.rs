//! Workbook assembly.
//!
//! `Workbook::build` drives the whole encode: it pulls sheets from the
//! provider in order, encodes each worksheet part, then renders the
//! workbook-level parts around them. Relationship ids follow one rule
//! everywhere: sheets take `rId1..rIdN` in enumeration order, styles takes
//! `rId(N+1)`, and the shared string table takes `rId(N+2)` only when it is
//! non-empty. The relationship part and every part referencing an id are
//! rendered from the same counters, so they cannot drift apart.

use std::io::Cursor;

use chrono::Utc;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use thiserror::Error;

use crate::merge::InvalidMergeRange;
use crate::openxml::{
    escape_attr, escape_text, CT_CORE_PROPERTIES, CT_EXTENDED_PROPERTIES, CT_SHARED_STRINGS,
    CT_STYLES, CT_WORKBOOK, CT_WORKSHEET, NS_CONTENT_TYPES, NS_RELATIONSHIPS, NS_SPREADSHEETML,
    REL_TYPE_CORE_PROPERTIES, REL_TYPE_EXTENDED_PROPERTIES, REL_TYPE_OFFICE_DOCUMENT,
    REL_TYPE_SHARED_STRINGS, REL_TYPE_STYLES, REL_TYPE_WORKSHEET, XML_DECL,
};
use crate::package::Package;
use crate::provider::{SheetDataSource, WorkbookSource};
use crate::shared_strings::SharedStrings;
use crate::sheet::Sheet;
use crate::style::Style;
use crate::style_registry::StyleRegistry;
use crate::worksheet::{encode_worksheet, EncodedWorksheet};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("workbook source returned {count} sheets; at least one is required")]
    NonPositiveSheetCount { count: i64 },
    #[error("no data source given for sheet {sheet:?}")]
    MissingDataSource { sheet: String },
    #[error("data source for sheet {sheet:?} returned row count {count}; it must be positive")]
    NonPositiveRowCount { sheet: String, count: i64 },
    #[error("data source for sheet {sheet:?} returned column count {count}; it must be positive")]
    NonPositiveColumnCount { sheet: String, count: i64 },
    #[error("data source for sheet {sheet:?} returned row count {count}; at most 1048576 rows fit a worksheet")]
    RowCountTooLarge { sheet: String, count: i64 },
    #[error("data source for sheet {sheet:?} returned column count {count}; at most 16384 columns fit a worksheet")]
    ColumnCountTooLarge { sheet: String, count: i64 },
    #[error("cell {cell} of sheet {sheet:?} holds an unencodable {kind} value")]
    UnsupportedValue {
        sheet: String,
        cell: String,
        kind: &'static str,
    },
    #[error(transparent)]
    InvalidMergeRange(#[from] InvalidMergeRange),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// One relationship entry for a `.rels` part.
struct Relationship {
    id: String,
    ty: &'static str,
    target: String,
}

#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("workbook identifier must not be empty")]
    EmptyIdentifier,
}

/// An exportable workbook, identified by a caller-chosen id.
#[derive(Clone, Debug)]
pub struct Workbook {
    identifier: String,
}

impl Workbook {
    pub fn new(identifier: impl Into<String>) -> Result<Self, WorkbookError> {
        let identifier = identifier.into();
        if identifier.is_empty() {
            return Err(WorkbookError::EmptyIdentifier);
        }
        Ok(Self { identifier })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Encode the workbook the provider describes into a package.
    ///
    /// Sheets are traversed in enumeration order; within a sheet, rows then
    /// columns. Nothing is cached between calls, so the same provider state
    /// always yields the same package.
    pub fn build(&self, source: &dyn WorkbookSource) -> Result<Package, BuildError> {
        let count = source.sheet_count();
        if count <= 0 {
            return Err(BuildError::NonPositiveSheetCount { count });
        }

        let mut sheets = Vec::with_capacity(count as usize);
        for index in 0..count as usize {
            sheets.push(source.sheet(index));
        }

        let mut data_sources: Vec<SheetDataSource<'_>> = Vec::with_capacity(sheets.len());
        for sheet in &sheets {
            let data_source =
                source
                    .data_source(sheet)
                    .ok_or_else(|| BuildError::MissingDataSource {
                        sheet: sheet.identifier().to_string(),
                    })?;
            data_sources.push(data_source);
        }

        // the first sheet-level default style seeds font index 0
        let default_style: Option<Style> = sheets
            .iter()
            .zip(&data_sources)
            .find_map(|(sheet, ds)| ds.styles.and_then(|s| s.default_style(sheet)));

        let mut strings = SharedStrings::new();
        let mut styles = StyleRegistry::new(default_style.as_ref());

        let mut package = Package::new();
        let mut encoded: Vec<EncodedWorksheet> = Vec::with_capacity(sheets.len());
        for (sheet, data_source) in sheets.iter().zip(&data_sources) {
            encoded.push(encode_worksheet(sheet, data_source, &mut strings, &mut styles)?);
        }

        for (sheet, worksheet) in sheets.iter().zip(encoded) {
            package.insert(
                format!("xl/worksheets/{}.xml", sheet.identifier()),
                worksheet.xml.into_bytes(),
            );
            if !worksheet.hyperlinks.is_empty() {
                package.insert(
                    format!("xl/worksheets/_rels/{}.xml.rels", sheet.identifier()),
                    worksheet.hyperlinks.rels_xml()?.into_bytes(),
                );
            }
        }

        package.insert("xl/workbook.xml".to_string(), self.workbook_xml(&sheets).into_bytes());
        package.insert(
            "xl/_rels/workbook.xml.rels".to_string(),
            workbook_rels(&sheets, !strings.is_empty())?.into_bytes(),
        );
        package.insert("xl/styles.xml".to_string(), styles.render().into_bytes());
        if !strings.is_empty() {
            package.insert("xl/sharedStrings.xml".to_string(), strings.render().into_bytes());
        }
        package.insert("_rels/.rels".to_string(), root_rels()?.into_bytes());
        package.insert(
            "[Content_Types].xml".to_string(),
            content_types(&sheets, !strings.is_empty()).into_bytes(),
        );
        package.insert("docProps/app.xml".to_string(), app_xml(&sheets).into_bytes());
        package.insert("docProps/core.xml".to_string(), self.core_xml().into_bytes());

        Ok(package)
    }

    fn workbook_xml(&self, sheets: &[Sheet]) -> String {
        let mut xml = String::with_capacity(512);
        xml.push_str(XML_DECL);
        xml.push('\n');
        xml.push_str(&format!(
            r#"<workbook xmlns="{}" xmlns:r="{}">"#,
            NS_SPREADSHEETML,
            crate::openxml::NS_OFFICE_REL
        ));
        xml.push_str(r#"<fileVersion appName="xl" lastEdited="5" lowestEdited="5" rupBuild="23206"/>"#);
        xml.push_str(r#"<workbookPr showInkAnnotation="0" autoCompressPictures="0"/>"#);
        xml.push_str(
            r#"<bookViews><workbookView xWindow="0" yWindow="0" windowWidth="25600" windowHeight="14460" tabRatio="500"/></bookViews>"#,
        );
        xml.push_str("<sheets>");
        for (index, sheet) in sheets.iter().enumerate() {
            xml.push_str(&format!(
                r#"<sheet name="{}" sheetId="{id}" r:id="rId{id}"/>"#,
                escape_attr(&effective_name(sheet, index)),
                id = index + 1
            ));
        }
        xml.push_str("</sheets>");
        xml.push_str(r#"<calcPr calcId="140000" concurrentCalc="0"/>"#);
        xml.push_str("</workbook>");
        xml
    }

    fn core_xml(&self) -> String {
        let now = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        format!(
            concat!(
                r#"{decl}"#,
                "\n",
                r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties""#,
                r#" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/""#,
                r#" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
                r#"<dc:creator>{creator}</dc:creator>"#,
                r#"<cp:lastModifiedBy>{creator}</cp:lastModifiedBy>"#,
                r#"<dcterms:created xsi:type="dcterms:W3CDTF">{now}</dcterms:created>"#,
                r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{now}</dcterms:modified>"#,
                r#"</cp:coreProperties>"#
            ),
            decl = XML_DECL,
            creator = escape_text(&self.identifier),
            now = now
        )
    }
}

/// Tab name shown to the user: the given name, or `Sheet <n>` by position.
fn effective_name(sheet: &Sheet, index: usize) -> String {
    match sheet.name() {
        Some(name) => name.to_string(),
        None => format!("Sheet {}", index + 1),
    }
}

fn render_relationships(relationships: &[Relationship]) -> Result<String, BuildError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut root = BytesStart::new("Relationships");
    root.push_attribute(("xmlns", NS_RELATIONSHIPS));
    writer.write_event(Event::Start(root))?;

    for relationship in relationships {
        let mut rel = BytesStart::new("Relationship");
        rel.push_attribute(("Id", relationship.id.as_str()));
        rel.push_attribute(("Type", relationship.ty));
        rel.push_attribute(("Target", relationship.target.as_str()));
        writer.write_event(Event::Empty(rel))?;
    }

    writer.write_event(Event::End(BytesEnd::new("Relationships")))?;
    Ok(String::from_utf8(writer.into_inner().into_inner())?)
}

fn workbook_rels(sheets: &[Sheet], has_shared_strings: bool) -> Result<String, BuildError> {
    let mut relationships = Vec::with_capacity(sheets.len() + 2);
    for (index, sheet) in sheets.iter().enumerate() {
        relationships.push(Relationship {
            id: format!("rId{}", index + 1),
            ty: REL_TYPE_WORKSHEET,
            target: format!("worksheets/{}.xml", sheet.identifier()),
        });
    }
    relationships.push(Relationship {
        id: format!("rId{}", sheets.len() + 1),
        ty: REL_TYPE_STYLES,
        target: "styles.xml".to_string(),
    });
    if has_shared_strings {
        relationships.push(Relationship {
            id: format!("rId{}", sheets.len() + 2),
            ty: REL_TYPE_SHARED_STRINGS,
            target: "sharedStrings.xml".to_string(),
        });
    }
    render_relationships(&relationships)
}

fn root_rels() -> Result<String, BuildError> {
    render_relationships(&[
        Relationship {
            id: "rId1".to_string(),
            ty: REL_TYPE_OFFICE_DOCUMENT,
            target: "xl/workbook.xml".to_string(),
        },
        Relationship {
            id: "rId2".to_string(),
            ty: REL_TYPE_CORE_PROPERTIES,
            target: "docProps/core.xml".to_string(),
        },
        Relationship {
            id: "rId3".to_string(),
            ty: REL_TYPE_EXTENDED_PROPERTIES,
            target: "docProps/app.xml".to_string(),
        },
    ])
}

fn content_types(sheets: &[Sheet], has_shared_strings: bool) -> String {
    let mut xml = String::with_capacity(1024);
    xml.push_str(XML_DECL);
    xml.push('\n');
    xml.push_str(&format!(r#"<Types xmlns="{NS_CONTENT_TYPES}">"#));
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    xml.push_str(&format!(
        r#"<Default Extension="rels" ContentType="{}"/>"#,
        crate::openxml::CT_RELATIONSHIPS
    ));
    xml.push_str(&format!(
        r#"<Override PartName="/xl/workbook.xml" ContentType="{CT_WORKBOOK}"/>"#
    ));
    xml.push_str(&format!(
        r#"<Override PartName="/xl/styles.xml" ContentType="{CT_STYLES}"/>"#
    ));
    if has_shared_strings {
        xml.push_str(&format!(
            r#"<Override PartName="/xl/sharedStrings.xml" ContentType="{CT_SHARED_STRINGS}"/>"#
        ));
    }
    xml.push_str(&format!(
        r#"<Override PartName="/docProps/core.xml" ContentType="{CT_CORE_PROPERTIES}"/>"#
    ));
    xml.push_str(&format!(
        r#"<Override PartName="/docProps/app.xml" ContentType="{CT_EXTENDED_PROPERTIES}"/>"#
    ));
    for sheet in sheets {
        xml.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/{}.xml" ContentType="{CT_WORKSHEET}"/>"#,
            sheet.identifier()
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn app_xml(sheets: &[Sheet]) -> String {
    let titles: String = sheets
        .iter()
        .enumerate()
        .map(|(index, sheet)| {
            format!("<vt:lpstr>{}</vt:lpstr>", escape_text(&effective_name(sheet, index)))
        })
        .collect();
    format!(
        concat!(
            r#"{decl}"#,
            "\n",
            r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties""#,
            r#" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
            r#"<Application>sheetforge</Application>"#,
            r#"<DocSecurity>0</DocSecurity>"#,
            r#"<ScaleCrop>false</ScaleCrop>"#,
            r#"<HeadingPairs><vt:vector size="2" baseType="variant">"#,
            r#"<vt:variant><vt:lpstr>Worksheets</vt:lpstr></vt:variant>"#,
            r#"<vt:variant><vt:i4>{count}</vt:i4></vt:variant>"#,
            r#"</vt:vector></HeadingPairs>"#,
            r#"<TitlesOfParts><vt:vector size="{count}" baseType="lpstr">{titles}</vt:vector></TitlesOfParts>"#,
            r#"<LinksUpToDate>false</LinksUpToDate>"#,
            r#"<SharedDoc>false</SharedDoc>"#,
            r#"<HyperlinksChanged>false</HyperlinksChanged>"#,
            r#"<AppVersion>1.0000</AppVersion>"#,
            r#"</Properties>"#
        ),
        decl = XML_DECL,
        count = sheets.len(),
        titles = titles
    )
}
