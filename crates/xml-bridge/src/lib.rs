//! # xml-bridge
//!
//! Generic conversion between serde values and XML, as text or as files.
//!
//! The crate does no XML work of its own. Serialization and parsing are
//! delegated to `quick-xml`'s serde support; this crate adds the file and
//! buffer handling, a file-text preprocessor, a registry of declared
//! polymorphic shapes and a fixed error policy.
//!
//! ## Operations
//!
//! | Function | Direction | Failure |
//! |----------|-----------|---------|
//! | [`file_to_value`] | file → value | `Err(BridgeError)` |
//! | [`text_to_value`] | text → value | `Err(BridgeError)` |
//! | [`value_to_file`] | value → file | logged, [`SaveOutcome::Failed`] |
//! | [`value_to_text`] | value → text | logged, [`TextOutcome::Invalid`] |
//!
//! The free functions use [`XmlBridge::default()`]. Build an [`XmlBridge`]
//! from a [`BridgeConfig`] to change indentation, the XML declaration, the
//! root tag or the file preprocessor.
//!
//! ## Comma handling
//!
//! By default [`file_to_value`] replaces every `,` in the file with `.` before
//! parsing, so `<price>3,5</price>` reads as `3.5`. The rewrite covers the
//! whole file, string content included. Select
//! [`Preprocessor::NumericCommas`] to limit it to numeric values.
//!
//! ## Polymorphic members
//!
//! A data-carrying enum variant is written as an element named after the
//! variant. When a [`ShapeRegistry`] is passed, every such variant must be
//! declared in it or the operation fails with
//! [`BridgeError::UndeclaredShape`]. The enum must sit at the root or in a
//! field renamed to `$value`; a declared variant in any other named field
//! fails with [`BridgeError::MisplacedShape`].
//!
//! ## Roots
//!
//! Structs and enum variants name their own root element. Other shapes get an
//! XML Schema type name, so `5u32` is written as `<unsignedInt>5</unsignedInt>`
//! and `vec![1u32, 2]` as two `unsignedInt` elements. Set
//! [`BridgeConfig::root_tag`] to choose the name yourself.
//!
//! ## Example
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use xml_bridge::{text_to_value, value_to_text};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Settings {
//!     name: String,
//!     volume: u8,
//! }
//!
//! let settings = Settings { name: "main".to_string(), volume: 7 };
//! let xml = value_to_text(&settings, None).into_text();
//! let back: Settings = text_to_value(Some(xml.as_str()), None)?;
//! assert_eq!(back, settings);
//! # Ok::<(), xml_bridge::BridgeError>(())
//! ```

pub mod bridge;
pub mod config;
pub mod error;
#[cfg(feature = "logging")]
pub mod logging;
pub mod outcome;
pub mod preprocess;
pub mod registry;
mod root;

pub use bridge::{XmlBridge, file_to_value, text_to_value, value_to_file, value_to_text};
pub use config::{BridgeConfig, Indent, Preprocessor, XML_DECLARATION};
pub use error::{BridgeError, Result};
#[cfg(feature = "logging")]
pub use logging::init_logging;
pub use outcome::{INVALID_OBJECT, SaveOutcome, TextOutcome};
pub use preprocess::{CommaToPeriod, NumericCommas, Passthrough, TextPreprocessor};
pub use registry::{ShapeRegistry, ShapeReport, shapes_in, short_type_name};
