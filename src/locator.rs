use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{configuration, PageError, PageResult};

/// Element location strategy.
///
/// The first group is the W3C WebDriver set, the second group is understood by Appium only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum By {
    Id,
    Name,
    ClassName,
    Tag,
    Css,
    XPath,
    LinkText,
    PartialLinkText,
    AccessibilityId,
    AndroidUiAutomator,
    AndroidViewTag,
    IosPredicate,
    IosClassChain,
}

impl By {
    const ALL: [By; 13] = [
        By::Id,
        By::Name,
        By::ClassName,
        By::Tag,
        By::Css,
        By::XPath,
        By::LinkText,
        By::PartialLinkText,
        By::AccessibilityId,
        By::AndroidUiAutomator,
        By::AndroidViewTag,
        By::IosPredicate,
        By::IosClassChain,
    ];

    /// The strategy name as sent over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            By::Id => "id",
            By::Name => "name",
            By::ClassName => "class name",
            By::Tag => "tag name",
            By::Css => "css selector",
            By::XPath => "xpath",
            By::LinkText => "link text",
            By::PartialLinkText => "partial link text",
            By::AccessibilityId => "accessibility id",
            By::AndroidUiAutomator => "-android uiautomator",
            By::AndroidViewTag => "-android viewtag",
            By::IosPredicate => "-ios predicate string",
            By::IosClassChain => "-ios class chain",
        }
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for By {
    type Err = PageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        By::ALL
            .iter()
            .copied()
            .find(|by| by.as_str() == s)
            .ok_or_else(|| configuration(format!("the locator strategy \"{}\" is undefined", s)))
    }
}

/// An immutable (strategy, value) pair identifying zero or more elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    by: By,
    value: String,
}

impl Locator {
    pub fn new(by: By, value: impl Into<String>) -> Self {
        Locator {
            by,
            value: value.into(),
        }
    }

    /// Build a locator from a strategy name and a value, rejecting unknown
    /// strategies and empty values.
    pub fn parse(strategy: &str, value: &str) -> PageResult<Self> {
        let by = strategy.parse()?;
        if value.is_empty() {
            return Err(configuration(format!("the locator value for \"{}\" is empty", strategy)));
        }
        Ok(Locator::new(by, value))
    }

    pub fn id(value: impl Into<String>) -> Self {
        Locator::new(By::Id, value)
    }

    pub fn name(value: impl Into<String>) -> Self {
        Locator::new(By::Name, value)
    }

    pub fn class_name(value: impl Into<String>) -> Self {
        Locator::new(By::ClassName, value)
    }

    pub fn tag(value: impl Into<String>) -> Self {
        Locator::new(By::Tag, value)
    }

    pub fn css(value: impl Into<String>) -> Self {
        Locator::new(By::Css, value)
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Locator::new(By::XPath, value)
    }

    pub fn accessibility_id(value: impl Into<String>) -> Self {
        Locator::new(By::AccessibilityId, value)
    }

    pub fn by(&self) -> By {
        self.by
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.by, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_names_round_trip() {
        for by in By::ALL.iter() {
            assert_eq!(by.as_str().parse::<By>().unwrap(), *by);
        }
    }

    #[test]
    fn unknown_strategy_is_configuration_error() {
        let err = Locator::parse("by magic", "x").unwrap_err();
        assert!(matches!(err, PageError::Configuration(_)));
    }

    #[test]
    fn empty_value_is_configuration_error() {
        let err = Locator::parse("id", "").unwrap_err();
        assert!(matches!(err, PageError::Configuration(_)));
    }

    #[test]
    fn display() {
        assert_eq!(Locator::css("div.row").to_string(), "(css selector, div.row)");
    }
}
