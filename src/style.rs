//! Cell styling model.
//!
//! Two `Style` values with the same attribute set are the same style: every
//! field is held in a form that derives `Eq` and `Hash` (sizes and widths as
//! integer hundredths, colors as packed RGB), and the registry deduplicates
//! on that structural identity. Invalid colors are rejected when the `Color`
//! is constructed, before any encoding begins.

use core::fmt;
use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StyleError {
    #[error("color {0:?} is not a 6-digit hexadecimal RGB code")]
    InvalidColor(String),
}

/// A 24-bit RGB color, normalized to uppercase 6-hex-digit form.
///
/// Serialized as an `RRGGBB` hex string for IPC friendliness.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color {
    rgb: u32,
}

impl Color {
    /// Parse a 6-hex-digit RGB string; lowercase digits are accepted and
    /// normalized to uppercase.
    pub fn parse(s: &str) -> Result<Self, StyleError> {
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(StyleError::InvalidColor(s.to_string()));
        }
        let rgb = u32::from_str_radix(s, 16).map_err(|_| StyleError::InvalidColor(s.to_string()))?;
        Ok(Self { rgb })
    }

    /// `RRGGBB`, uppercase.
    pub fn rgb_hex(self) -> String {
        format!("{:06X}", self.rgb)
    }

    /// `FFRRGGBB` as SpreadsheetML `rgb=` attributes expect (opaque alpha).
    pub fn argb_hex(self) -> String {
        format!("FF{:06X}", self.rgb)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rgb_hex())
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.rgb_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Color::parse(&s).map_err(D::Error::custom)
    }
}

/// Border edge, valued by its edge bit.
///
/// The declaration order matches the bit order (left=1, right=2, top=4,
/// bottom=8), so ordered containers render edges deterministically and in
/// the element order SpreadsheetML expects.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderEdge {
    Left = 1,
    Right = 2,
    Top = 4,
    Bottom = 8,
}

impl BorderEdge {
    pub(crate) fn element_name(self) -> &'static str {
        match self {
            BorderEdge::Left => "left",
            BorderEdge::Right => "right",
            BorderEdge::Top => "top",
            BorderEdge::Bottom => "bottom",
        }
    }
}

/// Border line style keywords allowed by SpreadsheetML.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BorderLine {
    Hair,
    Thin,
    Medium,
    Thick,
    Double,
    Dotted,
    DashDot,
    MediumDashDot,
    SlantDashDot,
    DashDotDot,
    MediumDashDotDot,
    Dashed,
    MediumDashed,
}

impl BorderLine {
    pub(crate) fn keyword(self) -> &'static str {
        match self {
            BorderLine::Hair => "hair",
            BorderLine::Thin => "thin",
            BorderLine::Medium => "medium",
            BorderLine::Thick => "thick",
            BorderLine::Double => "double",
            BorderLine::Dotted => "dotted",
            BorderLine::DashDot => "dashDot",
            BorderLine::MediumDashDot => "mediumDashDot",
            BorderLine::SlantDashDot => "slantDashDot",
            BorderLine::DashDotDot => "dashDotDot",
            BorderLine::MediumDashDotDot => "mediumDashDotDot",
            BorderLine::Dashed => "dashed",
            BorderLine::MediumDashed => "mediumDashed",
        }
    }
}

/// One border edge: a line style plus its color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BorderSide {
    pub line: BorderLine,
    pub color: Color,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalAlignment {
    Center,
    General,
    Justify,
    Left,
    Right,
}

impl HorizontalAlignment {
    pub(crate) fn keyword(self) -> &'static str {
        match self {
            HorizontalAlignment::Center => "center",
            HorizontalAlignment::General => "general",
            HorizontalAlignment::Justify => "justify",
            HorizontalAlignment::Left => "left",
            HorizontalAlignment::Right => "right",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalAlignment {
    Bottom,
    Center,
    Justify,
    Top,
}

impl VerticalAlignment {
    pub(crate) fn keyword(self) -> &'static str {
        match self {
            VerticalAlignment::Bottom => "bottom",
            VerticalAlignment::Center => "center",
            VerticalAlignment::Justify => "justify",
            VerticalAlignment::Top => "top",
        }
    }
}

/// Complete cell style.
///
/// Sizes are stored in 1/100 units (points for font size and row height,
/// character units for column width) so equality and hashing derive cleanly.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    font_family: Option<String>,
    /// Font size in 1/100 points (1200 = 12pt).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    font_size_100pt: Option<u32>,
    #[serde(default, skip_serializing_if = "is_false")]
    bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    underline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    background: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    horizontal: Option<HorizontalAlignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vertical: Option<VerticalAlignment>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    borders: BTreeMap<BorderEdge, BorderSide>,
    /// Column width in 1/100 character units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width_100: Option<u32>,
    /// Row height in 1/100 points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    height_100: Option<u32>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn to_hundredths(value: f64) -> u32 {
    (value * 100.0).round().max(0.0) as u32
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    pub fn font_size(mut self, points: f64) -> Self {
        self.font_size_100pt = Some(to_hundredths(points));
        self
    }

    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn underline(mut self, underline: bool) -> Self {
        self.underline = underline;
        self
    }

    /// Foreground (font) color.
    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Background (fill) color.
    pub fn background_color(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn horizontal_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.horizontal = Some(alignment);
        self
    }

    pub fn vertical_alignment(mut self, alignment: VerticalAlignment) -> Self {
        self.vertical = Some(alignment);
        self
    }

    /// Set one border edge. Setting the same edge twice keeps the last value.
    pub fn border(mut self, edge: BorderEdge, line: BorderLine, color: Color) -> Self {
        self.borders.insert(edge, BorderSide { line, color });
        self
    }

    /// Column width in character units; the first styled cell of a column
    /// fixes that column's width for the whole sheet.
    pub fn width(mut self, width: f64) -> Self {
        self.width_100 = Some(to_hundredths(width));
        self
    }

    /// Row height in points; the first styled cell of a row fixes that row's
    /// height.
    pub fn height(mut self, height: f64) -> Self {
        self.height_100 = Some(to_hundredths(height));
        self
    }

    pub(crate) fn font_key(&self) -> FontKey {
        FontKey {
            family: self.font_family.clone(),
            size_100pt: self.font_size_100pt,
            color: self.color,
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
        }
    }

    pub(crate) fn background(&self) -> Option<Color> {
        self.background
    }

    pub(crate) fn borders(&self) -> &BTreeMap<BorderEdge, BorderSide> {
        &self.borders
    }

    pub(crate) fn horizontal(&self) -> Option<HorizontalAlignment> {
        self.horizontal
    }

    pub(crate) fn vertical(&self) -> Option<VerticalAlignment> {
        self.vertical
    }

    pub(crate) fn width_100(&self) -> Option<u32> {
        self.width_100
    }

    pub(crate) fn height_100(&self) -> Option<u32> {
        self.height_100
    }
}

/// Deduplication key for the font table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub(crate) struct FontKey {
    pub family: Option<String>,
    pub size_100pt: Option<u32>,
    pub color: Option<Color>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl FontKey {
    /// A font with no attributes set would serialize to an empty `<font/>`;
    /// it maps to the default font at index 0 instead of entering the table.
    pub fn is_default(&self) -> bool {
        *self == FontKey::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_normalizes_to_uppercase() {
        let c = Color::parse("4f81bd").unwrap();
        assert_eq!(c.rgb_hex(), "4F81BD");
        assert_eq!(c.argb_hex(), "FF4F81BD");
    }

    #[test]
    fn color_rejects_non_hex_input() {
        assert!(Color::parse("GGGGGG").is_err());
        assert!(Color::parse("FFF").is_err());
        assert!(Color::parse("FF00AA0").is_err());
        assert!(Color::parse("").is_err());
    }

    #[test]
    fn structurally_equal_styles_compare_equal() {
        let red = Color::parse("FF0000").unwrap();
        let a = Style::new().bold(true).font_size(12.0).color(red);
        let b = Style::new().bold(true).font_size(12.0).color(red);
        assert_eq!(a, b);

        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn border_edges_order_by_bit() {
        let black = Color::parse("000000").unwrap();
        let style = Style::new()
            .border(BorderEdge::Bottom, BorderLine::Thick, black)
            .border(BorderEdge::Left, BorderLine::Thin, black)
            .border(BorderEdge::Top, BorderLine::Medium, black);
        let edges: Vec<BorderEdge> = style.borders().keys().copied().collect();
        assert_eq!(edges, vec![BorderEdge::Left, BorderEdge::Top, BorderEdge::Bottom]);
    }

    #[test]
    fn plain_font_is_default() {
        assert!(Style::new().font_key().is_default());
        assert!(!Style::new().bold(true).font_key().is_default());
    }
}
