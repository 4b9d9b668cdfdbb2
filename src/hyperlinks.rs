//! Per-sheet hyperlink table.
//!
//! Hyperlink targets live in the worksheet's own relationship part, not in
//! the worksheet XML. Targets intern in first-seen order onto 1-based ids
//! (`rId1..rIdN`), so two cells linking to the same URL share one
//! relationship, and the id a `<hyperlink>` element references always
//! exists in the `.rels` part.

use std::collections::HashMap;
use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::openxml::{NS_RELATIONSHIPS, REL_TYPE_HYPERLINK};
use crate::workbook::BuildError;

#[derive(Debug, Default)]
pub struct SheetHyperlinks {
    targets: Vec<String>,
    index: HashMap<String, u32>,
}

impl SheetHyperlinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a target and return its 1-based relationship index.
    ///
    /// A target seen before gets its original index back.
    pub fn intern(&mut self, target: &str) -> u32 {
        if let Some(&id) = self.index.get(target) {
            return id;
        }
        let id = self.targets.len() as u32 + 1;
        self.targets.push(target.to_string());
        self.index.insert(target.to_string(), id);
        id
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Render `xl/worksheets/_rels/<identifier>.xml.rels`.
    ///
    /// Targets are external, so every relationship carries
    /// `TargetMode="External"`.
    pub fn rels_xml(&self) -> Result<String, BuildError> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

        let mut root = BytesStart::new("Relationships");
        root.push_attribute(("xmlns", NS_RELATIONSHIPS));
        writer.write_event(Event::Start(root))?;

        for (i, target) in self.targets.iter().enumerate() {
            let mut rel = BytesStart::new("Relationship");
            rel.push_attribute(("Id", format!("rId{}", i + 1).as_str()));
            rel.push_attribute(("Type", REL_TYPE_HYPERLINK));
            rel.push_attribute(("Target", target.as_str()));
            rel.push_attribute(("TargetMode", "External"));
            writer.write_event(Event::Empty(rel))?;
        }

        writer.write_event(Event::End(BytesEnd::new("Relationships")))?;
        Ok(String::from_utf8(writer.into_inner().into_inner())?)
    }
}
