use std::fmt;

use regex::Regex;

use crate::error::{configuration, PageResult};

/// How a text, url or title is compared against an expectation.
#[derive(Debug, Clone)]
pub enum TextMatch {
    Exact(String),
    Contains(String),
    Regex(Regex),
}

impl TextMatch {
    pub fn exact(text: impl Into<String>) -> Self {
        TextMatch::Exact(text.into())
    }

    pub fn contains(text: impl Into<String>) -> Self {
        TextMatch::Contains(text.into())
    }

    /// Compile `pattern`; a malformed pattern is a configuration error.
    pub fn regex(pattern: &str) -> PageResult<Self> {
        Regex::new(pattern)
            .map(TextMatch::Regex)
            .map_err(|e| configuration(format!("invalid pattern {:?}: {}", pattern, e)))
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            TextMatch::Exact(expected) => text == expected,
            TextMatch::Contains(needle) => text.contains(needle.as_str()),
            TextMatch::Regex(re) => re.is_match(text),
        }
    }
}

impl fmt::Display for TextMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextMatch::Exact(s) => write!(f, "{:?}", s),
            TextMatch::Contains(s) => write!(f, "containing {:?}", s),
            TextMatch::Regex(re) => write!(f, "matching /{}/", re.as_str()),
        }
    }
}

impl From<&str> for TextMatch {
    fn from(text: &str) -> Self {
        TextMatch::exact(text)
    }
}

impl From<String> for TextMatch {
    fn from(text: String) -> Self {
        TextMatch::Exact(text)
    }
}

impl From<Regex> for TextMatch {
    fn from(re: Regex) -> Self {
        TextMatch::Regex(re)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_modes() {
        assert!(TextMatch::exact("Login").is_match("Login"));
        assert!(!TextMatch::exact("Login").is_match("Login page"));
        assert!(TextMatch::contains("/home").is_match("https://site/home?x=1"));
        assert!(TextMatch::regex(r"^order-\d+$").unwrap().is_match("order-42"));
    }

    #[test]
    fn bad_pattern_is_configuration_error() {
        let err = TextMatch::regex("(unclosed").unwrap_err();
        assert!(matches!(err, crate::error::PageError::Configuration(_)));
    }
}
