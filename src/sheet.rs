use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("sheet identifier {0:?} must be non-empty and contain only A-Z, a-z, 0-9, '_' and '-'")]
    InvalidIdentifier(String),
}

/// Descriptor for one worksheet.
///
/// The identifier doubles as the worksheet part file name
/// (`xl/worksheets/<identifier>.xml`), so it is restricted to name-safe
/// characters. Uniqueness across the workbook is the provider's
/// responsibility. Immutable once handed to the encoder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    identifier: String,
    name: Option<String>,
    freeze_first_row: bool,
}

impl Sheet {
    pub fn new(identifier: impl Into<String>) -> Result<Self, SheetError> {
        let identifier = identifier.into();
        if identifier.is_empty()
            || !identifier
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return Err(SheetError::InvalidIdentifier(identifier));
        }
        Ok(Self {
            identifier,
            name: None,
            freeze_first_row: false,
        })
    }

    pub fn with_name(
        identifier: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, SheetError> {
        let mut sheet = Self::new(identifier)?;
        let name = name.into();
        sheet.name = (!name.is_empty()).then_some(name);
        Ok(sheet)
    }

    /// Freeze the first row so it stays visible while scrolling.
    pub fn freeze_first_row(mut self, frozen: bool) -> Self {
        self.freeze_first_row = frozen;
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Display name shown on the sheet tab, if one was given.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn first_row_frozen(&self) -> bool {
        self.freeze_first_row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_charset_is_enforced() {
        assert!(Sheet::new("sheet_1-data").is_ok());
        assert!(Sheet::new("").is_err());
        assert!(Sheet::new("bad id").is_err());
        assert!(Sheet::new("päge").is_err());
    }

    #[test]
    fn empty_display_name_is_dropped() {
        let sheet = Sheet::with_name("s1", "").unwrap();
        assert_eq!(sheet.name(), None);
        let named = Sheet::with_name("s1", "Revenue").unwrap();
        assert_eq!(named.name(), Some("Revenue"));
    }
}
