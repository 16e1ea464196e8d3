use std::time::Duration;

use thiserror::Error;

pub type PageResult<T> = Result<T, PageError>;

/// Errors returned by page objects and by the driver they wrap.
///
/// Drivers are expected to classify their failures into the matching variants,
/// in particular [`PageError::NoSuchElement`] and [`PageError::StaleElement`],
/// because the wait engine and the stale-reference recovery depend on them.
#[derive(Debug, Error)]
pub enum PageError {
    /// The locator matched no element (or the requested index was out of range).
    #[error("no such element: {0}")]
    NoSuchElement(String),

    /// A previously obtained element handle no longer refers to a rendered node.
    #[error("stale element reference: {0}")]
    StaleElement(String),

    /// The session that produced a handle is gone.
    #[error("invalid session: {0}")]
    InvalidSession(String),

    /// An explicit wait reached its deadline.
    #[error(
        "waiting for {target} to become {condition} timed out after {} seconds",
        .timeout.as_secs_f64()
    )]
    Timeout {
        target: String,
        condition: String,
        timeout: Duration,
    },

    /// Programmer error: malformed locator, invalid coordinates, bad pattern.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("no such window: {0}")]
    NoSuchWindow(String),

    #[error("no such frame: {0}")]
    NoSuchFrame(String),

    #[error("no such alert: {0}")]
    NoSuchAlert(String),

    #[error("element not interactable: {0}")]
    ElementNotInteractable(String),

    /// The driver does not implement this capability.
    #[error("unsupported by driver: {0}")]
    Unsupported(String),

    /// A swipe or flick loop stopped before the element became viewable.
    #[error("element {remark} is still not viewable after {attempts} gestures")]
    SwipeLimit { remark: String, attempts: u32 },

    /// Any other failure reported by the driver.
    #[error("driver error: {0}")]
    Driver(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Base64(#[from] base64::DecodeError),
}

impl PageError {
    /// True for the "matched nothing" classification that waits keep polling through.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PageError::NoSuchElement(_))
    }

    /// True when a cached handle has to be discarded and resolved again.
    pub fn is_stale(&self) -> bool {
        matches!(self, PageError::StaleElement(_) | PageError::InvalidSession(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, PageError::Timeout { .. })
    }
}

pub fn no_such_element(message: &str) -> PageError {
    PageError::NoSuchElement(message.to_string())
}

pub fn configuration(message: impl Into<String>) -> PageError {
    PageError::Configuration(message.into())
}

pub(crate) fn unsupported(capability: &str) -> PageError {
    PageError::Unsupported(capability.to_string())
}
