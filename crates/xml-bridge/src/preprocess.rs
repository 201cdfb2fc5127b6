//! Text rewrites applied to file contents before deserialization.
//!
//! Only the file-reading path runs a preprocessor. Text handed directly to
//! [`text_to_value`](crate::text_to_value) is never rewritten.
//!
//! The default, [`CommaToPeriod`], turns every `,` in the file into `.` so that
//! decimals written with a comma separator (`3,5`) parse as numbers. It does
//! this to the whole document, so commas inside ordinary string content are
//! rewritten too. [`NumericCommas`] limits the rewrite to values that are
//! entirely a comma-separated decimal.

use std::borrow::Cow;
use std::fmt;

use regex::Regex;

/// A rewrite applied to raw file text before it reaches the XML deserializer.
pub trait TextPreprocessor: Send + Sync {
    /// Returns the rewritten text, borrowing when nothing changed.
    fn preprocess<'a>(&self, text: &'a str) -> Cow<'a, str>;

    /// Short name used in log output.
    fn name(&self) -> &'static str;
}

impl fmt::Debug for dyn TextPreprocessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextPreprocessor({})", self.name())
    }
}

/// Replaces every comma in the document with a period.
///
/// This is lossy: `<name>Smith, John</name>` is read back as `Smith. John`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommaToPeriod;

impl TextPreprocessor for CommaToPeriod {
    fn preprocess<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if text.contains(',') {
            Cow::Owned(text.replace(',', "."))
        } else {
            Cow::Borrowed(text)
        }
    }

    fn name(&self) -> &'static str {
        "comma-to-period"
    }
}

/// Leaves the text untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl TextPreprocessor for Passthrough {
    fn preprocess<'a>(&self, text: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(text)
    }

    fn name(&self) -> &'static str {
        "passthrough"
    }
}

/// Rewrites a comma to a period only where it separates the integer and
/// fractional digits of a value that is nothing but a number.
///
/// Matches element text such as `<price> 3,50 </price>` and attribute values
/// such as `rate="-0,25"`. Lists (`1,2,3`) and prose are left alone.
#[derive(Debug, Clone)]
pub struct NumericCommas {
    element: Regex,
    attr_double: Regex,
    attr_single: Regex,
}

impl NumericCommas {
    /// Compiles the matching patterns.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            element: Regex::new(r">(\s*[-+]?\d+),(\d+\s*)<")?,
            attr_double: Regex::new(r#"="([-+]?\d+),(\d+)""#)?,
            attr_single: Regex::new(r"='([-+]?\d+),(\d+)'")?,
        })
    }
}

impl TextPreprocessor for NumericCommas {
    fn preprocess<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let rules = [
            (&self.element, ">${1}.${2}<"),
            (&self.attr_double, r#"="${1}.${2}""#),
            (&self.attr_single, "='${1}.${2}'"),
        ];

        let mut out = Cow::Borrowed(text);
        for (pattern, replacement) in rules {
            let rewritten = match pattern.replace_all(&out, replacement) {
                Cow::Owned(s) => Some(s),
                Cow::Borrowed(_) => None,
            };
            if let Some(s) = rewritten {
                out = Cow::Owned(s);
            }
        }
        out
    }

    fn name(&self) -> &'static str {
        "numeric-commas"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_to_period_rewrites_everything() {
        let out = CommaToPeriod.preprocess("<a>1,5</a><b>Smith, John</b>");
        assert_eq!(out, "<a>1.5</a><b>Smith. John</b>");
    }

    #[test]
    fn test_comma_to_period_borrows_when_unchanged() {
        let out = CommaToPeriod.preprocess("<a>1.5</a>");
        assert!(matches!(out, Cow::Borrowed(_)));
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(Passthrough.preprocess("<a>1,5</a>"), "<a>1,5</a>");
    }

    #[test]
    fn test_numeric_commas_element_text() {
        let p = NumericCommas::new().unwrap();
        assert_eq!(p.preprocess("<price>3,50</price>"), "<price>3.50</price>");
        assert_eq!(p.preprocess("<t>-0,25</t>"), "<t>-0.25</t>");
        assert_eq!(p.preprocess("<t> 12,5 </t>"), "<t> 12.5 </t>");
    }

    #[test]
    fn test_numeric_commas_attributes() {
        let p = NumericCommas::new().unwrap();
        assert_eq!(
            p.preprocess(r#"<item rate="1,5" code='2,75'/>"#),
            r#"<item rate="1.5" code='2.75'/>"#
        );
    }

    #[test]
    fn test_numeric_commas_leaves_prose_and_lists() {
        let p = NumericCommas::new().unwrap();
        let text = "<name>Smith, John</name><ids>1,2,3</ids><note>about 3,5 kg</note>";
        let out = p.preprocess(text);
        assert_eq!(out, text);
        assert!(matches!(out, Cow::Borrowed(_)));
    }

    #[test]
    fn test_preprocessor_debug_uses_name() {
        let p: Box<dyn TextPreprocessor> = Box::new(CommaToPeriod);
        assert_eq!(format!("{:?}", p), "TextPreprocessor(comma-to-period)");
    }
}
