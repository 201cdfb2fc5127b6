//! Output and input settings for [`XmlBridge`](crate::XmlBridge).
//!
//! Configuration is programmatic only.
//!
//! # Example
//!
//! ```rust
//! use xml_bridge::{BridgeConfig, Preprocessor};
//!
//! let config = BridgeConfig {
//!     write_declaration: false,
//!     preprocessor: Preprocessor::NumericCommas,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

/// XML declaration written ahead of the root element.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// Indentation used for pretty-printed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indent {
    /// Character repeated for each level.
    pub ch: char,
    /// Number of characters per level.
    pub size: usize,
}

impl Default for Indent {
    fn default() -> Self {
        Self { ch: ' ', size: 2 }
    }
}

/// Which rewrite runs over file contents before deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preprocessor {
    /// Every comma becomes a period (lossy, historical behavior).
    #[default]
    CommaToPeriod,
    /// Only commas inside purely numeric values become periods.
    NumericCommas,
    /// File text is deserialized as read.
    Passthrough,
}

/// Settings shared by every operation of an [`XmlBridge`](crate::XmlBridge).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Pretty-print with this indentation, or write everything on one line.
    pub indent: Option<Indent>,

    /// Emit `<?xml version="1.0" encoding="utf-8"?>` before the root element.
    pub write_declaration: bool,

    /// Root element name. When unset the shape's own name is used.
    pub root_tag: Option<String>,

    /// Rewrite applied when reading files.
    pub preprocessor: Preprocessor,

    /// Truncate an existing file before writing to it.
    ///
    /// With this off, writing a shorter document over a longer one leaves the
    /// old tail in place.
    pub truncate_on_save: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            indent: Some(Indent::default()),
            write_declaration: true,
            root_tag: None,
            preprocessor: Preprocessor::default(),
            truncate_on_save: true,
        }
    }
}

impl BridgeConfig {
    /// Single-line output with no declaration and no preprocessing.
    ///
    /// Handy for comparing output in tests.
    pub fn compact() -> Self {
        Self {
            indent: None,
            write_declaration: false,
            root_tag: None,
            preprocessor: Preprocessor::Passthrough,
            truncate_on_save: true,
        }
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Some(indent) = self.indent {
            if !indent.ch.is_whitespace() {
                errors.push(format!(
                    "Indent character must be whitespace, got {:?}",
                    indent.ch
                ));
            }
        }

        if let Some(root) = &self.root_tag {
            if !is_valid_element_name(root) {
                errors.push(format!("Root tag {:?} is not a valid XML name", root));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Loose check for an XML element name: a letter or `_` followed by name
/// characters.
///
/// Names starting with `xml` are reserved for future standards but still
/// well-formed, and parsers accept them, so they pass. Only `xmlns` itself is
/// refused because it reads as a namespace declaration.
fn is_valid_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_ok = chars
        .next()
        .map(|c| c.is_alphabetic() || c == '_')
        .unwrap_or(false);
    starts_ok
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !name.eq_ignore_ascii_case("xmlns")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert_eq!(config.indent, Some(Indent { ch: ' ', size: 2 }));
        assert!(config.write_declaration);
        assert_eq!(config.preprocessor, Preprocessor::CommaToPeriod);
        assert!(config.truncate_on_save);
        assert!(config.root_tag.is_none());
    }

    #[test]
    fn test_validate_valid() {
        assert!(BridgeConfig::default().validate().is_ok());
        assert!(BridgeConfig::compact().validate().is_ok());
    }

    #[test]
    fn test_validate_bad_indent() {
        let config = BridgeConfig {
            indent: Some(Indent { ch: 'x', size: 4 }),
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Indent"));
    }

    #[test]
    fn test_validate_bad_root_tag() {
        for bad in ["", "1abc", "has space", "ns:item", "xmlns"] {
            let config = BridgeConfig {
                root_tag: Some(bad.to_string()),
                ..Default::default()
            };
            assert!(config.validate().is_err(), "{bad:?} should be rejected");
        }

        let config = BridgeConfig {
            root_tag: Some("inventory-item".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_accepts_xml_prefixed_names() {
        for good in ["xmlThing", "XMLReport", "xml_settings"] {
            let config = BridgeConfig {
                root_tag: Some(good.to_string()),
                ..Default::default()
            };
            assert!(config.validate().is_ok(), "{good:?} should be accepted");
        }
    }
}
