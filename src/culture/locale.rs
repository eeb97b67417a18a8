//! Locale tag value type

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque locale identifier, e.g. `zh-Hans` or `en-US`.
///
/// Relay treats locale tags as opaque strings: clients send whatever tag
/// their platform produced and the formatting layer interprets it. The only
/// normalization done here is when parsing POSIX environment values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    pub fn new(tag: impl Into<String>) -> Self {
        Locale(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse a POSIX locale environment value (`LC_ALL`/`LANG`).
    ///
    /// Strips the encoding and modifier suffixes and maps the underscore
    /// separator to the tag form: `zh_CN.UTF-8` becomes `zh-CN`. Returns
    /// `None` for the `C`/`POSIX` locales and empty values, which carry no
    /// language information.
    pub fn from_posix(value: &str) -> Option<Self> {
        let value = value.split(['.', '@']).next().unwrap_or("");
        if value.is_empty() || value == "C" || value == "POSIX" {
            return None;
        }
        Some(Locale(value.replace('_', "-")))
    }
}

impl Default for Locale {
    /// The process fallback locale used when no configuration is present.
    fn default() -> Self {
        Locale("en-US".to_string())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Locale {
    fn from(tag: &str) -> Self {
        Locale(tag.to_string())
    }
}

impl From<String> for Locale {
    fn from(tag: String) -> Self {
        Locale(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_posix_strips_encoding() {
        assert_eq!(Locale::from_posix("zh_CN.UTF-8"), Some(Locale::new("zh-CN")));
        assert_eq!(Locale::from_posix("en_US.ISO8859-1"), Some(Locale::new("en-US")));
    }

    #[test]
    fn test_from_posix_strips_modifier() {
        assert_eq!(Locale::from_posix("de_DE@euro"), Some(Locale::new("de-DE")));
        assert_eq!(
            Locale::from_posix("sr_RS.UTF-8@latin"),
            Some(Locale::new("sr-RS"))
        );
    }

    #[test]
    fn test_from_posix_rejects_non_locales() {
        assert_eq!(Locale::from_posix(""), None);
        assert_eq!(Locale::from_posix("C"), None);
        assert_eq!(Locale::from_posix("POSIX"), None);
        assert_eq!(Locale::from_posix("C.UTF-8"), None);
    }

    #[test]
    fn test_serializes_as_bare_string() {
        let locale = Locale::new("zh-Hans");
        assert_eq!(serde_json::to_string(&locale).unwrap(), "\"zh-Hans\"");
        let parsed: Locale = serde_json::from_str("\"zh-CN\"").unwrap();
        assert_eq!(parsed, Locale::new("zh-CN"));
    }
}
