//! Error types for XML conversion.
//!
//! Only the deserialize direction surfaces these to callers. The serialize
//! direction folds them into [`SaveOutcome`](crate::SaveOutcome) and
//! [`TextOutcome`](crate::TextOutcome) after logging.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while converting between values and XML.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The file could not be opened, read or written.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        /// The path that was being accessed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The XML text did not match the requested shape.
    #[error("XML deserialization error: {0}")]
    Deserialize(#[from] quick_xml::de::DeError),

    /// The value could not be written as XML.
    #[error("XML serialization error: {0}")]
    Serialize(#[from] quick_xml::se::SeError),

    /// A polymorphic member named a shape missing from the registry.
    #[error("shape `{shape}` used in `{container}` was not declared")]
    UndeclaredShape {
        /// The variant (concrete shape) that was found.
        shape: String,
        /// The enum that carried it.
        container: String,
    },

    /// A declared polymorphic member sits in a named field.
    ///
    /// Variants are written as elements, which quick-xml only supports in
    /// element content: at the root or in a field renamed to `$value`.
    #[error(
        "shape `{shape}` of `{container}` is held in field `{field}`; \
         rename that field to `$value` to write it as an element"
    )]
    MisplacedShape {
        /// The variant (concrete shape) that was found.
        shape: String,
        /// The enum that carried it.
        container: String,
        /// The field, attribute or map entry holding the enum.
        field: String,
    },

    /// A caller-supplied reader or writer failed.
    #[error("IO error on stream: {0}")]
    Stream(#[from] std::io::Error),

    /// The bridge configuration was rejected.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A preprocessor pattern failed to compile.
    #[error("invalid preprocessor pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Custom error message
    #[error("{0}")]
    Custom(String),
}

impl BridgeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BridgeError::Io {
            path: path.into(),
            source,
        }
    }
}

// Needed so the shape walker can act as a serde::Serializer
impl serde::ser::Error for BridgeError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        BridgeError::Custom(msg.to_string())
    }
}

/// Result type alias for XML conversion operations
pub type Result<T> = std::result::Result<T, BridgeError>;
