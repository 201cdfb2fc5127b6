//! Conversions between values and XML text or files.
//!
//! Every operation builds its own buffer or file handle and releases it before
//! returning, so calls share no state. Two calls on the same path are not
//! coordinated: the last writer wins.
//!
//! The directions follow different error policies:
//!
//! | Operation | On failure |
//! |-----------|------------|
//! | [`XmlBridge::file_to_value`] | returns `Err` |
//! | [`XmlBridge::text_to_value`] | returns `Err` |
//! | [`XmlBridge::value_to_file`] | logs, returns [`SaveOutcome::Failed`] |
//! | [`XmlBridge::value_to_text`] | logs, returns [`TextOutcome::Invalid`] |
//!
//! The readers that take a [`ShapeRegistry`] check the decoded value by
//! walking it with a serializer, which is why they ask for `T: Serialize` as
//! well. [`XmlBridge::read_text`] and [`XmlBridge::read_file`] skip the check
//! and only need `T: DeserializeOwned`.

use std::fs::OpenOptions;
use std::io::{BufRead, Read, Write};
use std::path::Path;
use std::sync::Arc;

use quick_xml::se::Serializer;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::{BridgeConfig, Preprocessor, XML_DECLARATION};
use crate::error::{BridgeError, Result};
use crate::outcome::{SaveOutcome, TextOutcome};
use crate::preprocess::{CommaToPeriod, NumericCommas, Passthrough, TextPreprocessor};
use crate::registry::ShapeRegistry;
use crate::root::root_name;

const UTF8_BOM: char = '\u{feff}';

/// Converts values of any serde shape to and from XML.
///
/// Cheap to clone. The preprocessor is shared between clones.
#[derive(Debug, Clone)]
pub struct XmlBridge {
    config: BridgeConfig,
    preprocessor: Arc<dyn TextPreprocessor>,
}

impl Default for XmlBridge {
    fn default() -> Self {
        Self {
            config: BridgeConfig::default(),
            preprocessor: Arc::new(CommaToPeriod),
        }
    }
}

impl XmlBridge {
    /// Creates a bridge from a validated configuration.
    pub fn new(config: BridgeConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|errors| BridgeError::Config(errors.join("; ")))?;

        let preprocessor: Arc<dyn TextPreprocessor> = match config.preprocessor {
            Preprocessor::CommaToPeriod => Arc::new(CommaToPeriod),
            Preprocessor::NumericCommas => Arc::new(NumericCommas::new()?),
            Preprocessor::Passthrough => Arc::new(Passthrough),
        };

        Ok(Self {
            config,
            preprocessor,
        })
    }

    /// Replaces the file-text preprocessor with a custom one.
    pub fn with_preprocessor(mut self, preprocessor: impl TextPreprocessor + 'static) -> Self {
        self.preprocessor = Arc::new(preprocessor);
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Reads an XML file and deserializes it into `T`.
    ///
    /// The file is opened read-write and created empty when missing, so a
    /// missing file yields a deserialization error and leaves an empty file
    /// behind. The file text goes through the configured preprocessor first;
    /// with the default one every `,` becomes `.` before parsing.
    pub fn file_to_value<T>(
        &self,
        path: impl AsRef<Path>,
        registry: Option<&ShapeRegistry>,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let text = self.load_file(path.as_ref())?;
        self.decode(text.as_bytes(), registry)
    }

    /// Reads an XML file into `T` without a registry check.
    ///
    /// Same file handling as [`file_to_value`](Self::file_to_value), for
    /// shapes that only implement `Deserialize`.
    pub fn read_file<T>(&self, path: impl AsRef<Path>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let text = self.load_file(path.as_ref())?;
        Ok(quick_xml::de::from_str(&text)?)
    }

    /// Opens `path` the way both file readers do and returns the
    /// preprocessed text.
    fn load_file(&self, path: &Path) -> Result<String> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| BridgeError::io(path, e))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| BridgeError::io(path, e))?;
        drop(file);

        let raw = contents.strip_prefix(UTF8_BOM).unwrap_or(&contents);
        let text = self.preprocessor.preprocess(raw);

        debug!(
            path = %path.display(),
            bytes = raw.len(),
            preprocessor = self.preprocessor.name(),
            "Deserializing XML file"
        );

        Ok(text.into_owned())
    }

    /// Serializes `value` and writes it to `path`, creating the file if needed.
    ///
    /// Never returns an error. On failure a diagnostic is logged and
    /// [`SaveOutcome::Failed`] carries it; check [`SaveOutcome::is_saved`].
    pub fn value_to_file<T>(
        &self,
        value: &T,
        path: impl AsRef<Path>,
        registry: Option<&ShapeRegistry>,
    ) -> SaveOutcome
    where
        T: Serialize + ?Sized,
    {
        let path = path.as_ref();
        match self.try_value_to_file(value, path, registry) {
            Ok(()) => SaveOutcome::Saved,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not serialize to file");
                SaveOutcome::Failed(format!("Could not serialize to file: {}", e))
            }
        }
    }

    /// Fallible form of [`value_to_file`](Self::value_to_file).
    ///
    /// The file is only opened once serialization has succeeded, so a value
    /// that cannot be serialized leaves an existing file untouched.
    pub fn try_value_to_file<T>(
        &self,
        value: &T,
        path: impl AsRef<Path>,
        registry: Option<&ShapeRegistry>,
    ) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let path = path.as_ref();
        let xml = self.try_value_to_text(value, registry)?;

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(self.config.truncate_on_save)
            .open(path)
            .map_err(|e| BridgeError::io(path, e))?;
        file.write_all(xml.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| BridgeError::io(path, e))?;

        debug!(path = %path.display(), bytes = xml.len(), "Wrote XML file");
        Ok(())
    }

    /// Deserializes XML text into `T`.
    ///
    /// `None` is treated as an empty document. No comma rewriting is applied.
    pub fn text_to_value<T>(
        &self,
        text: Option<&str>,
        registry: Option<&ShapeRegistry>,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let text = text.unwrap_or("");
        debug!(bytes = text.len(), "Deserializing XML text");
        self.decode(text.as_bytes(), registry)
    }

    /// Deserializes XML text into `T` without a registry check.
    ///
    /// Same input handling as [`text_to_value`](Self::text_to_value), for
    /// shapes that only implement `Deserialize`.
    pub fn read_text<T>(&self, text: Option<&str>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let text = text.unwrap_or("");
        debug!(bytes = text.len(), "Deserializing XML text");
        Ok(quick_xml::de::from_str(text)?)
    }

    /// Deserializes XML from any buffered reader.
    pub fn reader_to_value<R, T>(
        &self,
        reader: R,
        registry: Option<&ShapeRegistry>,
    ) -> Result<T>
    where
        R: BufRead,
        T: Serialize + DeserializeOwned,
    {
        self.decode(reader, registry)
    }

    /// Serializes `value` to XML text.
    ///
    /// Never returns an error. On failure a diagnostic is logged and
    /// [`TextOutcome::Invalid`] is returned; [`TextOutcome::into_text`] turns
    /// that into the literal `"Invalid object"`.
    pub fn value_to_text<T>(&self, value: &T, registry: Option<&ShapeRegistry>) -> TextOutcome
    where
        T: Serialize + ?Sized,
    {
        match self.try_value_to_text(value, registry) {
            Ok(xml) => TextOutcome::Xml(xml),
            Err(e) => {
                warn!(error = %e, "Could not create XML object");
                TextOutcome::Invalid(format!("Could not create XML object: {}", e))
            }
        }
    }

    /// Fallible form of [`value_to_text`](Self::value_to_text).
    ///
    /// The root element is the configured root tag, else the struct name or
    /// enum variant. Shapes with no name of their own get one: an XML Schema
    /// type name for primitives (`unsignedInt`, `string`, ...), the item name
    /// for sequences, `map` for maps.
    pub fn try_value_to_text<T>(
        &self,
        value: &T,
        registry: Option<&ShapeRegistry>,
    ) -> Result<String>
    where
        T: Serialize + ?Sized,
    {
        if let Some(registry) = registry {
            registry.check(value)?;
        }

        let mut xml = String::new();
        if self.config.write_declaration {
            xml.push_str(XML_DECLARATION);
            if self.config.indent.is_some() {
                xml.push('\n');
            }
        }

        let root = match self.config.root_tag.as_deref() {
            Some(tag) => Some(tag),
            None => root_name(value),
        };
        let mut serializer = match root {
            Some(root) => Serializer::with_root(&mut xml, Some(root))?,
            None => Serializer::new(&mut xml),
        };
        if let Some(indent) = self.config.indent {
            serializer.indent(indent.ch, indent.size);
        }
        value.serialize(serializer)?;

        Ok(xml)
    }

    /// Serializes `value` into a writer.
    pub fn value_to_writer<T, W>(
        &self,
        value: &T,
        mut writer: W,
        registry: Option<&ShapeRegistry>,
    ) -> Result<()>
    where
        T: Serialize + ?Sized,
        W: Write,
    {
        let xml = self.try_value_to_text(value, registry)?;
        writer
            .write_all(xml.as_bytes())
            .and_then(|()| writer.flush())?;
        Ok(())
    }

    fn decode<R, T>(&self, reader: R, registry: Option<&ShapeRegistry>) -> Result<T>
    where
        R: BufRead,
        T: Serialize + DeserializeOwned,
    {
        let value: T = quick_xml::de::from_reader(reader)?;
        if let Some(registry) = registry {
            registry.check(&value)?;
        }
        Ok(value)
    }
}

/// Reads an XML file into `T` with the default settings.
///
/// See [`XmlBridge::file_to_value`].
pub fn file_to_value<T>(path: impl AsRef<Path>, registry: Option<&ShapeRegistry>) -> Result<T>
where
    T: Serialize + DeserializeOwned,
{
    XmlBridge::default().file_to_value(path, registry)
}

/// Writes `value` to an XML file with the default settings.
///
/// See [`XmlBridge::value_to_file`].
pub fn value_to_file<T>(
    value: &T,
    path: impl AsRef<Path>,
    registry: Option<&ShapeRegistry>,
) -> SaveOutcome
where
    T: Serialize + ?Sized,
{
    XmlBridge::default().value_to_file(value, path, registry)
}

/// Parses XML text into `T` with the default settings.
///
/// See [`XmlBridge::text_to_value`].
pub fn text_to_value<T>(text: Option<&str>, registry: Option<&ShapeRegistry>) -> Result<T>
where
    T: Serialize + DeserializeOwned,
{
    XmlBridge::default().text_to_value(text, registry)
}

/// Serializes `value` to XML text with the default settings.
///
/// See [`XmlBridge::value_to_text`].
pub fn value_to_text<T>(value: &T, registry: Option<&ShapeRegistry>) -> TextOutcome
where
    T: Serialize + ?Sized,
{
    XmlBridge::default().value_to_text(value, registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::borrow::Cow;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Note {
        #[serde(rename = "@id")]
        id: u32,
        body: String,
    }

    fn compact() -> XmlBridge {
        XmlBridge::new(BridgeConfig::compact()).unwrap()
    }

    #[test]
    fn test_compact_output() {
        let note = Note {
            id: 3,
            body: "hello".to_string(),
        };
        let xml = compact().try_value_to_text(&note, None).unwrap();
        assert_eq!(xml, r#"<Note id="3"><body>hello</body></Note>"#);
    }

    #[test]
    fn test_declaration_and_indent() {
        let note = Note {
            id: 3,
            body: "hello".to_string(),
        };
        let xml = XmlBridge::default().try_value_to_text(&note, None).unwrap();
        assert!(xml.starts_with(&format!("{}\n<Note", XML_DECLARATION)));
        assert!(xml.contains("\n  <body>hello</body>"));
    }

    #[test]
    fn test_root_tag_override() {
        let bridge = XmlBridge::new(BridgeConfig {
            root_tag: Some("memo".to_string()),
            ..BridgeConfig::compact()
        })
        .unwrap();
        let note = Note {
            id: 1,
            body: "x".to_string(),
        };
        let xml = bridge.try_value_to_text(&note, None).unwrap();
        assert!(xml.starts_with("<memo"));

        let back: Note = bridge.text_to_value(Some(xml.as_str()), None).unwrap();
        assert_eq!(back, note);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = XmlBridge::new(BridgeConfig {
            root_tag: Some("not valid".to_string()),
            ..Default::default()
        });
        assert!(matches!(result, Err(BridgeError::Config(_))));
    }

    #[test]
    fn test_reader_to_value() {
        let xml = r#"<Note id="9"><body>from reader</body></Note>"#;
        let note: Note = compact()
            .reader_to_value(std::io::Cursor::new(xml), None)
            .unwrap();
        assert_eq!(note.id, 9);
        assert_eq!(note.body, "from reader");
    }

    #[test]
    fn test_value_to_writer() {
        let mut out = Vec::new();
        let note = Note {
            id: 2,
            body: "w".to_string(),
        };
        compact().value_to_writer(&note, &mut out, None).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"<Note id="2"><body>w</body></Note>"#
        );
    }

    struct Upper;

    impl TextPreprocessor for Upper {
        fn preprocess<'a>(&self, text: &'a str) -> Cow<'a, str> {
            Cow::Owned(text.replace("shout", "SHOUT"))
        }

        fn name(&self) -> &'static str {
            "upper"
        }
    }

    #[test]
    fn test_custom_preprocessor_runs_on_files_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.xml");
        let xml = r#"<Note id="1"><body>shout</body></Note>"#;
        std::fs::write(&path, xml).unwrap();

        let bridge = compact().with_preprocessor(Upper);
        let from_file: Note = bridge.file_to_value(&path, None).unwrap();
        assert_eq!(from_file.body, "SHOUT");

        let from_text: Note = bridge.text_to_value(Some(xml), None).unwrap();
        assert_eq!(from_text.body, "shout");
    }

    #[test]
    fn test_bom_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.xml");
        std::fs::write(&path, "\u{feff}<Note id=\"4\"><body>b</body></Note>").unwrap();
        let note: Note = compact().file_to_value(&path, None).unwrap();
        assert_eq!(note.id, 4);
    }
}
