use heck::ToUpperCamelCase;
use std::path::Path;

const COMPONENT_SUFFIX: &str = "Icon";

/// One source icon ready to be transformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconRecord {
    /// Raw SVG markup
    pub svg: String,

    /// Component identifier, also used as the output file stem
    pub component_name: String,
}

impl IconRecord {
    /// Creates a record, deriving the component name from `file_name`.
    #[must_use]
    pub fn new(file_name: &str, svg: String) -> Self {
        Self {
            svg,
            component_name: component_name(file_name),
        }
    }
}

/// Derives the component identifier for an icon file.
///
/// The extension is dropped, the stem is converted to `UpperCamelCase`, and
/// `Icon` is appended. Names that would start with a digit get a leading
/// underscore so they stay valid JavaScript identifiers.
///
/// ```
/// use icongen::component_name;
///
/// assert_eq!(component_name("arrow-left-s.svg"), "ArrowLeftSIcon");
/// assert_eq!(component_name("24-hours.svg"), "_24HoursIcon");
/// ```
#[must_use]
pub fn component_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);

    escape_leading_digit(&format!("{}{COMPONENT_SUFFIX}", stem.to_upper_camel_case()))
}

/// Prefixes `_` when `name` starts with an ASCII digit. Idempotent.
#[must_use]
pub fn escape_leading_digit(name: &str) -> String {
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else {
        name.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_name_pascal_cases_words() {
        assert_eq!(component_name("smile.svg"), "SmileIcon");
        assert_eq!(component_name("arrow-left-s.svg"), "ArrowLeftSIcon");
        assert_eq!(component_name("emotion_happy.svg"), "EmotionHappyIcon");
    }

    #[test]
    fn test_component_name_is_deterministic() {
        assert_eq!(component_name("bank-card.svg"), component_name("bank-card.svg"));
    }

    #[test]
    fn test_component_name_escapes_leading_digit() {
        assert_eq!(component_name("24-hours.svg"), "_24HoursIcon");
        assert_eq!(component_name("4k.svg"), "_4kIcon");
    }

    #[test]
    fn test_escape_is_idempotent() {
        let once = escape_leading_digit("24HoursIcon");
        assert_eq!(once, "_24HoursIcon");
        assert_eq!(escape_leading_digit(&once), once);
    }

    #[test]
    fn test_record_derives_name() {
        let record = IconRecord::new("smile.svg", "<svg/>".to_string());
        assert_eq!(record.component_name, "SmileIcon");
        assert_eq!(record.svg, "<svg/>");
    }
}
