use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use pageobject_sync::driver::mock::{MockDriver, MockNode};
use pageobject_sync::prelude::*;
use pageobject_sync::{ElementHandle, Rect};

/// Wraps a `MockDriver` and fails the next `failures` text reads.
#[derive(Debug)]
struct FlakyText {
    inner: MockDriver,
    failure: fn() -> PageError,
    failures: AtomicUsize,
    reads: AtomicUsize,
}

impl FlakyText {
    fn new(inner: MockDriver, failure: fn() -> PageError, failures: usize) -> Self {
        FlakyText {
            inner,
            failure,
            failures: AtomicUsize::new(failures),
            reads: AtomicUsize::new(0),
        }
    }

    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl Driver for FlakyText {
    fn find_element(&self, locator: &Locator) -> PageResult<ElementHandle> {
        self.inner.find_element(locator)
    }

    fn find_elements(&self, locator: &Locator) -> PageResult<Vec<ElementHandle>> {
        self.inner.find_elements(locator)
    }

    fn is_displayed(&self, element: &ElementHandle) -> PageResult<bool> {
        self.inner.is_displayed(element)
    }

    fn is_enabled(&self, element: &ElementHandle) -> PageResult<bool> {
        self.inner.is_enabled(element)
    }

    fn is_selected(&self, element: &ElementHandle) -> PageResult<bool> {
        self.inner.is_selected(element)
    }

    fn rect(&self, element: &ElementHandle) -> PageResult<Rect> {
        self.inner.rect(element)
    }

    fn text(&self, element: &ElementHandle) -> PageResult<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let left = self.failures.load(Ordering::SeqCst);
        if left > 0 {
            self.failures.store(left - 1, Ordering::SeqCst);
            return Err((self.failure)());
        }
        self.inner.text(element)
    }
}

fn stale() -> PageError {
    PageError::StaleElement("node was re-rendered".to_string())
}

fn session_lost() -> PageError {
    PageError::Driver("connection reset".to_string())
}

fn not_interactable() -> PageError {
    PageError::ElementNotInteractable("covered by overlay".to_string())
}

fn flaky_page(driver: FlakyText) -> Page<FlakyText> {
    Page::new(driver).with_policy(WaitPolicy::new(
        Duration::from_millis(300),
        Duration::from_millis(20),
        true,
    ))
}

fn banner() -> MockDriver {
    let driver = MockDriver::new();
    driver.add(MockNode::new(Locator::id("banner")).text("Welcome"));
    driver
}

#[test]
fn stale_twice_in_one_read_is_returned() {
    let page = flaky_page(FlakyText::new(banner(), stale, usize::MAX));
    let banner = Element::new(By::Id, "banner");
    assert!(banner.bind(&page).wait_present().unwrap().is_found());

    let err = banner.bind(&page).text().unwrap_err();
    assert!(err.is_stale());
    assert_eq!(page.driver().reads(), 2);
}

#[test]
fn one_stale_read_is_retried() {
    let page = flaky_page(FlakyText::new(banner(), stale, 1));
    let banner = Element::new(By::Id, "banner");
    assert!(banner.bind(&page).wait_present().unwrap().is_found());

    assert_eq!(banner.bind(&page).text().unwrap(), "Welcome");
    assert_eq!(page.driver().reads(), 2);
}

#[test]
fn other_driver_errors_are_not_retried() {
    for failure in [session_lost as fn() -> PageError, not_interactable] {
        let page = flaky_page(FlakyText::new(banner(), failure, 1));
        let banner = Element::new(By::Id, "banner");
        assert!(banner.bind(&page).wait_present().unwrap().is_found());
        let lookups = page.driver().inner.lookups();

        let start = Instant::now();
        let err = banner.bind(&page).text().unwrap_err();
        assert!(start.elapsed() < Duration::from_millis(100));
        assert!(matches!(
            err,
            PageError::Driver(_) | PageError::ElementNotInteractable(_)
        ));
        assert!(!err.is_stale());
        assert_eq!(page.driver().reads(), 1);
        assert_eq!(page.driver().inner.lookups(), lookups);
        assert!(banner.cached_handle().is_some());
    }
}

#[test]
fn stale_match_in_a_bulk_read_looks_the_list_up_again() {
    let driver = MockDriver::new();
    for text in ["first", "second"] {
        driver.add(MockNode::new(Locator::css(".card")).text(text));
    }
    let page = flaky_page(FlakyText::new(driver, stale, 1));
    let cards = Elements::new(By::Css, ".card");
    let lookups = page.driver().inner.lookups();

    assert_eq!(cards.bind(&page).texts().unwrap(), vec!["first", "second"]);
    assert_eq!(page.driver().reads(), 3);
    assert!(page.driver().inner.lookups() >= lookups + 2);
}

#[test]
fn bulk_read_stale_twice_is_returned() {
    let driver = MockDriver::new();
    driver.add(MockNode::new(Locator::css(".card")).text("only"));
    let page = flaky_page(FlakyText::new(driver, stale, usize::MAX));
    let cards = Elements::new(By::Css, ".card");

    assert!(cards.bind(&page).texts().unwrap_err().is_stale());
    assert_eq!(page.driver().reads(), 2);
}
