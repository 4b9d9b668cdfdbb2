//! Shared string table.
//!
//! Text cells store an index into this table rather than inline text. The
//! table interns in first-seen order, never shrinks, and renders to
//! `xl/sharedStrings.xml` only when at least one string was interned. Since
//! entries are deduplicated on the way in, `count` and `uniqueCount` are
//! both the table size.

use std::collections::HashMap;

use crate::openxml::{escape_text, needs_space_preserve, NS_SPREADSHEETML, XML_DECL};

#[derive(Debug, Default)]
pub struct SharedStrings {
    strings: Vec<String>,
    index: HashMap<String, u32>,
}

impl SharedStrings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its table index.
    ///
    /// Repeated strings get their original index back.
    pub fn intern(&mut self, s: &str) -> u32 {
        if let Some(&idx) = self.index.get(s) {
            return idx;
        }
        let idx = self.strings.len() as u32;
        self.strings.push(s.to_string());
        self.index.insert(s.to_string(), idx);
        idx
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Render `xl/sharedStrings.xml`.
    pub fn render(&self) -> String {
        let mut xml = String::with_capacity(256 + self.strings.len() * 32);
        xml.push_str(XML_DECL);
        xml.push('\n');
        xml.push_str(&format!(
            r#"<sst xmlns="{}" count="{n}" uniqueCount="{n}">"#,
            NS_SPREADSHEETML,
            n = self.strings.len()
        ));
        for s in &self.strings {
            if needs_space_preserve(s) {
                xml.push_str(&format!(
                    r#"<si><t xml:space="preserve">{}</t></si>"#,
                    escape_text(s)
                ));
            } else {
                xml.push_str(&format!("<si><t>{}</t></si>", escape_text(s)));
            }
        }
        xml.push_str("</sst>");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_first_seen_order_and_stable() {
        let mut sst = SharedStrings::new();
        assert_eq!(sst.intern("alpha"), 0);
        assert_eq!(sst.intern("beta"), 1);
        assert_eq!(sst.intern("alpha"), 0);
        assert_eq!(sst.len(), 2);
    }

    #[test]
    fn both_counts_reflect_the_deduplicated_size() {
        let mut sst = SharedStrings::new();
        sst.intern("x");
        sst.intern("x");
        sst.intern("y");
        let xml = sst.render();
        assert!(xml.contains(r#"count="2" uniqueCount="2""#));
        assert!(xml.contains("<si><t>x</t></si><si><t>y</t></si>"));
    }

    #[test]
    fn whitespace_edges_get_space_preserve() {
        let mut sst = SharedStrings::new();
        sst.intern(" padded ");
        sst.intern("plain");
        let xml = sst.render();
        assert!(xml.contains(r#"<si><t xml:space="preserve"> padded </t></si>"#));
        assert!(xml.contains("<si><t>plain</t></si>"));
    }

    #[test]
    fn markup_in_strings_is_escaped() {
        let mut sst = SharedStrings::new();
        sst.intern("a<b>&c");
        assert!(sst.render().contains("<si><t>a&lt;b&gt;&amp;c</t></si>"));
    }
}
