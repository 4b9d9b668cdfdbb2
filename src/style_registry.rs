//! Style deduplication and `xl/styles.xml` rendering.
//!
//! Four intern tables back the stylesheet: fonts, fills, borders and cell
//! formats. Each starts with the fixed entries SpreadsheetML consumers
//! expect (the default font, the `none`/`gray125` fills, the empty border,
//! the default cell format), so the first registered style always lands at
//! cell format index 1. Styles with the same attribute set map to the same
//! index; identity is structural, never pointer-based.

use std::collections::{BTreeMap, HashMap};

use crate::openxml::{escape_attr, format_hundredths, NS_SPREADSHEETML, XML_DECL};
use crate::style::{BorderEdge, BorderSide, Color, FontKey, Style};

const NS_MARKUP_COMPAT: &str = "http://schemas.openxmlformats.org/markup-compatibility/2006";
const NS_X14AC: &str = "http://schemas.microsoft.com/office/spreadsheetml/2009/9/ac";

/// Default font rendered at index 0 when no workbook default is supplied.
const FALLBACK_FONT: &str = r#"<font><sz val="12"/><color theme="1"/><name val="Calibri"/></font>"#;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct CellFormat {
    font: u32,
    fill: u32,
    border: u32,
    horizontal: Option<&'static str>,
    vertical: Option<&'static str>,
}

#[derive(Debug)]
pub struct StyleRegistry {
    fonts: Vec<String>,
    font_index: HashMap<FontKey, u32>,
    fills: Vec<String>,
    fill_index: HashMap<Color, u32>,
    borders: Vec<String>,
    border_index: HashMap<Vec<(BorderEdge, BorderSide)>, u32>,
    formats: Vec<CellFormat>,
    style_index: HashMap<Style, u32>,
}

impl StyleRegistry {
    /// Build a registry, seeding font index 0 from the workbook default
    /// style when one is given.
    pub fn new(default_style: Option<&Style>) -> Self {
        let mut font_index = HashMap::new();
        let default_key = default_style.map(Style::font_key).unwrap_or_default();
        let default_font = if default_key.is_default() {
            FALLBACK_FONT.to_string()
        } else {
            render_font(&default_key)
        };
        font_index.insert(default_key, 0);
        // the attribute-free font always maps to index 0 as well
        font_index.entry(FontKey::default()).or_insert(0);

        Self {
            fonts: vec![default_font],
            font_index,
            fills: vec![
                r#"<fill><patternFill patternType="none"/></fill>"#.to_string(),
                r#"<fill><patternFill patternType="gray125"/></fill>"#.to_string(),
            ],
            fill_index: HashMap::new(),
            borders: vec!["<border/>".to_string()],
            border_index: HashMap::new(),
            formats: vec![CellFormat {
                font: 0,
                fill: 0,
                border: 0,
                horizontal: None,
                vertical: None,
            }],
            style_index: HashMap::new(),
        }
    }

    /// Intern a style, returning its cell format index (the `s=` attribute
    /// value). Structurally equal styles share one index.
    pub fn register(&mut self, style: &Style) -> u32 {
        if let Some(&idx) = self.style_index.get(style) {
            return idx;
        }

        let font = self.intern_font(style.font_key());
        let fill = self.intern_fill(style);
        let border = self.intern_border(style.borders());
        let format = CellFormat {
            font,
            fill,
            border,
            horizontal: style.horizontal().map(|h| h.keyword()),
            vertical: style.vertical().map(|v| v.keyword()),
        };

        let idx = self.formats.len() as u32;
        self.formats.push(format);
        self.style_index.insert(style.clone(), idx);
        idx
    }

    fn intern_font(&mut self, key: FontKey) -> u32 {
        if let Some(&idx) = self.font_index.get(&key) {
            return idx;
        }
        let idx = self.fonts.len() as u32;
        self.fonts.push(render_font(&key));
        self.font_index.insert(key, idx);
        idx
    }

    fn intern_fill(&mut self, style: &Style) -> u32 {
        let Some(color) = style.background() else {
            return 0;
        };
        if let Some(&idx) = self.fill_index.get(&color) {
            return idx;
        }
        let idx = self.fills.len() as u32;
        self.fills.push(format!(
            r#"<fill><patternFill patternType="solid"><fgColor rgb="{}"/></patternFill></fill>"#,
            color.argb_hex()
        ));
        self.fill_index.insert(color, idx);
        idx
    }

    fn intern_border(&mut self, borders: &BTreeMap<BorderEdge, BorderSide>) -> u32 {
        if borders.is_empty() {
            return 0;
        }
        let key: Vec<(BorderEdge, BorderSide)> =
            borders.iter().map(|(&e, &s)| (e, s)).collect();
        if let Some(&idx) = self.border_index.get(&key) {
            return idx;
        }
        let mut xml = String::from("<border>");
        for (edge, side) in borders {
            xml.push_str(&format!(
                r#"<{el} style="{style}"><color rgb="{color}"/></{el}>"#,
                el = edge.element_name(),
                style = side.line.keyword(),
                color = side.color.argb_hex()
            ));
        }
        xml.push_str("</border>");
        let idx = self.borders.len() as u32;
        self.borders.push(xml);
        self.border_index.insert(key, idx);
        idx
    }

    /// Render `xl/styles.xml`.
    pub fn render(&self) -> String {
        let mut xml = String::with_capacity(1024);
        xml.push_str(XML_DECL);
        xml.push('\n');
        xml.push_str(&format!(
            r#"<styleSheet xmlns="{}" xmlns:mc="{}" mc:Ignorable="x14ac" xmlns:x14ac="{}">"#,
            NS_SPREADSHEETML, NS_MARKUP_COMPAT, NS_X14AC
        ));

        xml.push_str(&format!(
            r#"<fonts count="{n}" x14ac:knownFonts="{n}">"#,
            n = self.fonts.len()
        ));
        for font in &self.fonts {
            xml.push_str(font);
        }
        xml.push_str("</fonts>");

        xml.push_str(&format!(r#"<fills count="{}">"#, self.fills.len()));
        for fill in &self.fills {
            xml.push_str(fill);
        }
        xml.push_str("</fills>");

        xml.push_str(&format!(r#"<borders count="{}">"#, self.borders.len()));
        for border in &self.borders {
            xml.push_str(border);
        }
        xml.push_str("</borders>");

        xml.push_str(r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#);

        xml.push_str(&format!(r#"<cellXfs count="{}">"#, self.formats.len()));
        for (i, format) in self.formats.iter().enumerate() {
            if i == 0 {
                xml.push_str(
                    r#"<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0" shrinkToFit="true" wrapText="true"/>"#,
                );
                continue;
            }
            xml.push_str(&format!(
                r#"<xf xfId="0" numFmtId="0" fontId="{}" fillId="{}" borderId="{}" shrinkToFit="true" wrapText="true""#,
                format.font, format.fill, format.border
            ));
            if format.horizontal.is_some() || format.vertical.is_some() {
                xml.push_str("><alignment");
                if let Some(h) = format.horizontal {
                    xml.push_str(&format!(r#" horizontal="{h}""#));
                }
                if let Some(v) = format.vertical {
                    xml.push_str(&format!(r#" vertical="{v}""#));
                }
                xml.push_str("/></xf>");
            } else {
                xml.push_str("/>");
            }
        }
        xml.push_str("</cellXfs>");

        xml.push_str(r#"<cellStyles count="1"><cellStyle name="Standard" xfId="0" builtinId="0"/></cellStyles>"#);
        xml.push_str(r#"<dxfs count="0"/>"#);
        xml.push_str(r#"<tableStyles count="0" defaultTableStyle="TableStyleMedium9" defaultPivotStyle="PivotStyleMedium4"/>"#);
        xml.push_str("</styleSheet>");
        xml
    }
}

fn render_font(key: &FontKey) -> String {
    let mut xml = String::from("<font>");
    if let Some(size) = key.size_100pt {
        xml.push_str(&format!(r#"<sz val="{}"/>"#, format_hundredths(size)));
    }
    if let Some(family) = &key.family {
        xml.push_str(&format!(r#"<name val="{}"/>"#, escape_attr(family)));
    }
    if let Some(color) = key.color {
        xml.push_str(&format!(r#"<color rgb="{}"/>"#, color.argb_hex()));
    }
    if key.bold {
        xml.push_str("<b/>");
    }
    if key.italic {
        xml.push_str("<i/>");
    }
    if key.underline {
        xml.push_str("<u/>");
    }
    xml.push_str("</font>");
    xml
}
