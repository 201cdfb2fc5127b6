//! Results of the serialize direction.
//!
//! Writing a value never returns an error. Failures are logged and reported as
//! a tagged outcome instead, so callers check the tag rather than handle an
//! error.

use std::fmt;

/// Text that stands in for the XML when serialization to text fails.
pub const INVALID_OBJECT: &str = "Invalid object";

/// Result of writing a value to a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The value was written.
    Saved,
    /// Nothing usable was written. Holds the diagnostic that was logged.
    Failed(String),
}

impl SaveOutcome {
    /// The success flag: true when the value was written.
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved)
    }

    /// The diagnostic, if the save failed.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            SaveOutcome::Saved => None,
            SaveOutcome::Failed(msg) => Some(msg),
        }
    }
}

impl From<SaveOutcome> for bool {
    fn from(outcome: SaveOutcome) -> Self {
        outcome.is_saved()
    }
}

/// Result of writing a value to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextOutcome {
    /// The serialized XML.
    Xml(String),
    /// Serialization failed. Holds the diagnostic that was logged.
    Invalid(String),
}

impl TextOutcome {
    /// Returns true if XML was produced.
    pub fn is_xml(&self) -> bool {
        matches!(self, TextOutcome::Xml(_))
    }

    /// The XML text, if any.
    pub fn xml(&self) -> Option<&str> {
        match self {
            TextOutcome::Xml(xml) => Some(xml),
            TextOutcome::Invalid(_) => None,
        }
    }

    /// The diagnostic, if serialization failed.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            TextOutcome::Xml(_) => None,
            TextOutcome::Invalid(msg) => Some(msg),
        }
    }

    /// Flattens to a plain string, substituting [`INVALID_OBJECT`] on failure.
    ///
    /// A value whose XML is literally `Invalid object` cannot be told apart
    /// from a failure once flattened; match on the enum when that matters.
    pub fn into_text(self) -> String {
        match self {
            TextOutcome::Xml(xml) => xml,
            TextOutcome::Invalid(_) => INVALID_OBJECT.to_string(),
        }
    }

    /// Converts to a `Result`, keeping the diagnostic as the error.
    pub fn into_result(self) -> Result<String, String> {
        match self {
            TextOutcome::Xml(xml) => Ok(xml),
            TextOutcome::Invalid(msg) => Err(msg),
        }
    }
}

impl fmt::Display for TextOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextOutcome::Xml(xml) => f.write_str(xml),
            TextOutcome::Invalid(_) => f.write_str(INVALID_OBJECT),
        }
    }
}

impl From<TextOutcome> for String {
    fn from(outcome: TextOutcome) -> Self {
        outcome.into_text()
    }
}
