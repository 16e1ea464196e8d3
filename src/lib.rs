//! Page Object helpers for Selenium / Appium style UI testing.
//!
//! Elements are declared once, as descriptors holding a locator and wait
//! settings, and bound to a [`Page`] when used. Every operation waits for the
//! element to reach the state it needs (present, visible, clickable) and
//! transparently locates it again when the driver reports the cached
//! reference stale.
//!
//! The crate talks to the automation backend through the [`Driver`] trait.
//! It ships no network client: implement `Driver` for the client you use,
//! or use the in-memory [`driver::mock::MockDriver`] for tests.
//!
//! ## Features
//!
//! - Element descriptors with per-element timeout, index and remark
//! - Explicit waits that either raise on timeout or report `TimedOut`
//! - Automatic recovery from stale element references
//! - Groups of elements (`Elements`) with list waits and reads
//! - Windows, frames, alerts, cookies, contexts and screenshots on the page
//! - Swipe / flick an element into view on mobile
//! - Queued pointer and keyboard actions shared by all elements of a page
//! - Select dropdown helpers
//!
//! ## Configuration
//!
//! The default wait policy is read once from the environment:
//! `PAGEOBJECT_TIMEOUT` (seconds), `PAGEOBJECT_POLL_INTERVAL_MS` and
//! `PAGEOBJECT_RERAISE`. See [`WaitPolicy`].
//!
//! ### Example:
//!
//! ```rust
//! use pageobject_sync::driver::mock::{MockDriver, MockNode};
//! use pageobject_sync::prelude::*;
//! use std::time::Duration;
//!
//! fn main() -> PageResult<()> {
//!     let driver = MockDriver::new();
//!     driver.add(MockNode::new(Locator::name("q")));
//!     driver.add(MockNode::new(Locator::css("button.search")).appears_after(Duration::from_millis(100)));
//!
//!     let page = Page::new(driver).with_policy(WaitPolicy::default().with_timeout(Duration::from_secs(2)));
//!     let query = Element::new(By::Name, "q");
//!     let search = Element::new(By::Css, "button.search").with_remark("search button");
//!
//!     query.bind(&page).input("selenium")?.enter()?;
//!     search.bind(&page).click()?;
//!     assert_eq!(query.bind(&page).attribute("value")?.as_deref(), Some("selenium\u{e007}"));
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![allow(clippy::needless_doctest_main)]

pub use actions::{Action, ActionChain};
pub use config::WaitPolicy;
pub use driver::Driver;
pub use element::{BoundElement, Element};
pub use elements::{BoundElements, Elements};
pub use error::{PageError, PageResult};
pub use gesture::{Coordinate, SwipeOptions};
pub use keys::Keys;
pub use locator::{By, Locator};
pub use page::{Page, PageActions, PageWaiter, WindowTarget};
pub use query::{ElementState, TextMatch, WaitOutcome};
pub use types::*;

pub mod prelude {
    pub use crate::config::WaitPolicy;
    pub use crate::driver::Driver;
    pub use crate::element::Element;
    pub use crate::elements::Elements;
    pub use crate::error::{PageError, PageResult};
    pub use crate::gesture::{Coordinate, SwipeOptions};
    pub use crate::keys::Keys;
    pub use crate::locator::{By, Locator};
    pub use crate::page::Page;
    pub use crate::query::{TextMatch, WaitOutcome};
}

mod actions;
pub mod components {
    pub mod select;
}
pub mod config;
pub mod driver {
    mod connection;
    pub mod mock;

    pub use connection::Driver;
}
mod element;
mod elements;
pub mod error;
pub mod gesture;
mod keys;
mod locator;
mod page;
pub mod query {
    pub mod conditions;
    mod poller;
    mod text_match;
    mod waiter;

    pub use conditions::{Condition, ElementState, Probe};
    pub use poller::PollerTicker;
    pub use text_match::TextMatch;
    pub use waiter::{OnTimeout, WaitOutcome, Waiter};
}
mod types;
