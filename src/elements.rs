use std::cell::Cell;
use std::time::Duration;

use log::debug;
use serde_json::Value;

use crate::config::WaitPolicy;
use crate::driver::Driver;
use crate::element::Element;
use crate::error::{configuration, no_such_element, PageResult};
use crate::locator::{By, Locator};
use crate::page::Page;
use crate::query::{conditions, Condition, WaitOutcome, Waiter};
use crate::types::{ElementHandle, Point, Rect, Size};

/// Declaration of a group of elements sharing one locator.
///
/// Unlike [`Element`] the group caches nothing: every operation looks the
/// matches up again.
#[derive(Debug, Clone, Default)]
pub struct Elements {
    locator: Option<Locator>,
    timeout: Option<Duration>,
    remark: Option<String>,
    policy: Option<WaitPolicy>,
    last_wait_timeout: Cell<Option<Duration>>,
}

impl Elements {
    pub fn new(by: By, value: impl Into<String>) -> Self {
        Elements::located(Locator::new(by, value))
    }

    pub fn located(locator: Locator) -> Self {
        Elements {
            locator: Some(locator),
            ..Elements::default()
        }
    }

    /// A group whose locator is set later with [`Elements::set`].
    pub fn dynamic() -> Self {
        Elements::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = Some(remark.into());
        self
    }

    pub fn with_policy(mut self, policy: WaitPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn set(&mut self, locator: Locator) -> &mut Self {
        self.locator = Some(locator);
        self
    }

    pub fn locator(&self) -> PageResult<&Locator> {
        self.locator.as_ref().ok_or_else(|| {
            configuration("the locator must be set before performing element operations")
        })
    }

    pub fn remark(&self) -> String {
        match (&self.remark, &self.locator) {
            (Some(remark), _) => remark.clone(),
            (None, Some(locator)) => locator.value().to_string(),
            (None, None) => String::from("<unset>"),
        }
    }

    pub fn wait_timeout(&self) -> Option<Duration> {
        self.last_wait_timeout.get()
    }

    /// Match `index` of the group as a single [`Element`] with the same settings.
    pub fn nth(&self, index: usize) -> PageResult<Element> {
        let mut element = Element::located(self.locator()?.clone()).with_index(index);
        if let Some(timeout) = self.timeout {
            element = element.with_timeout(timeout);
        }
        if let Some(policy) = self.policy {
            element = element.with_policy(policy);
        }
        if let Some(remark) = &self.remark {
            element = element.with_remark(format!("{}[{}]", remark, index));
        }
        Ok(element)
    }

    pub fn bind<'a, D: Driver>(&'a self, page: &'a Page<D>) -> BoundElements<'a, D> {
        BoundElements {
            elements: self,
            page,
            timeout: None,
            reraise: None,
        }
    }
}

/// An [`Elements`] group bound to a [`Page`], with optional per-call overrides.
///
/// # Example:
/// ```
/// use pageobject_sync::driver::mock::{MockDriver, MockNode};
/// use pageobject_sync::prelude::*;
///
/// let driver = MockDriver::new();
/// for name in ["apple", "banana"] {
///     driver.add(MockNode::new(Locator::class_name("fruit")).text(name));
/// }
/// let page = Page::new(driver);
/// let fruits = Elements::new(By::ClassName, "fruit");
/// assert_eq!(fruits.bind(&page).texts()?, vec!["apple", "banana"]);
/// # Ok::<(), PageError>(())
/// ```
#[derive(Debug)]
pub struct BoundElements<'a, D: Driver> {
    elements: &'a Elements,
    page: &'a Page<D>,
    timeout: Option<Duration>,
    reraise: Option<bool>,
}

impl<'a, D: Driver> Clone for BoundElements<'a, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, D: Driver> Copy for BoundElements<'a, D> {}

impl<'a, D: Driver> BoundElements<'a, D> {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn reraise(mut self, reraise: bool) -> Self {
        self.reraise = Some(reraise);
        self
    }

    fn driver(&self) -> &'a D {
        self.page.driver()
    }

    fn wait<T>(&self, state: &str, condition: Condition<T>) -> PageResult<WaitOutcome<T>> {
        let policy = self.elements.policy.unwrap_or(*self.page.policy());
        let timeout = self.timeout.or(self.elements.timeout).unwrap_or(policy.timeout);
        self.elements.last_wait_timeout.set(Some(timeout));
        self.page.record_wait(timeout);
        Waiter::new(self.driver(), &policy)
            .with_timeout(timeout)
            .reraise(self.reraise.unwrap_or(policy.reraise))
            .ignore_stale(true)
            .target(self.elements.remark())
            .condition(state)
            .until(condition)
    }

    /// Look the matches up once, without waiting. May be empty.
    pub fn find_now(&self) -> PageResult<Vec<ElementHandle>> {
        self.driver().find_elements(self.elements.locator()?)
    }

    /// Match `index` once at least one element is present.
    ///
    /// Under `reraise(false)` a group that never shows up yields `TimedOut`.
    /// An index past the last match is always a not-found error.
    pub fn find(&self, index: usize) -> PageResult<WaitOutcome<ElementHandle>> {
        let handles = match self.wait_all_present()? {
            WaitOutcome::Found(handles) => handles,
            WaitOutcome::Absent => return Ok(WaitOutcome::Absent),
            WaitOutcome::TimedOut => return Ok(WaitOutcome::TimedOut),
        };
        let count = handles.len();
        let handle = handles.into_iter().nth(index).ok_or_else(|| {
            no_such_element(&format!(
                "{} has {} matches, index {} is out of range",
                self.elements.remark(),
                count,
                index
            ))
        })?;
        Ok(WaitOutcome::Found(handle))
    }

    /// Wait for at least one match; yields all of them.
    pub fn wait_all_present(&self) -> PageResult<WaitOutcome<Vec<ElementHandle>>> {
        let locator = self.elements.locator()?.clone();
        self.wait("present", conditions::all_present(locator))
    }

    /// Wait until nothing matches. `Ok(false)` on timeout without raising.
    pub fn wait_all_absent(&self) -> PageResult<bool> {
        let locator = self.elements.locator()?.clone();
        Ok(self.wait("absent", conditions::all_absent(locator))?.is_satisfied())
    }

    /// Wait for at least one visible match; yields the visible ones.
    pub fn wait_any_visible(&self) -> PageResult<WaitOutcome<Vec<ElementHandle>>> {
        let locator = self.elements.locator()?.clone();
        self.wait("any visible", conditions::any_visible(locator))
    }

    pub fn wait_all_visible(&self) -> PageResult<WaitOutcome<Vec<ElementHandle>>> {
        let locator = self.elements.locator()?.clone();
        self.wait("all visible", conditions::all_visible(locator))
    }

    /// With `tolerate_absence`, zero matches satisfies the wait as `Absent`.
    pub fn wait_all_invisible(
        &self,
        tolerate_absence: bool,
    ) -> PageResult<WaitOutcome<Vec<ElementHandle>>> {
        let locator = self.elements.locator()?.clone();
        self.wait("all invisible", conditions::all_invisible(locator, tolerate_absence))
    }

    /// Wait for at least one invisible match; yields the invisible ones.
    pub fn wait_any_invisible(
        &self,
        tolerate_absence: bool,
    ) -> PageResult<WaitOutcome<Vec<ElementHandle>>> {
        let locator = self.elements.locator()?.clone();
        self.wait("any invisible", conditions::any_invisible(locator, tolerate_absence))
    }

    pub fn are_all_present(&self) -> PageResult<bool> {
        Ok(self.reraise(false).wait_all_present()?.is_found())
    }

    pub fn are_all_visible(&self) -> PageResult<bool> {
        Ok(self.reraise(false).wait_all_visible()?.is_found())
    }

    pub fn are_any_visible(&self) -> PageResult<bool> {
        Ok(self.reraise(false).wait_any_visible()?.is_found())
    }

    /// Number of matches once any are present, or 0 when none show up in time.
    pub fn quantity(&self) -> PageResult<usize> {
        Ok(self.reraise(false).wait_all_present()?.found().map_or(0, |h| h.len()))
    }

    fn raising<F>(&self, wait: F) -> PageResult<Vec<ElementHandle>>
    where
        F: Fn(&Self) -> PageResult<WaitOutcome<Vec<ElementHandle>>>,
    {
        let outcome = wait(&self.reraise(true))?;
        outcome.found().ok_or_else(|| no_such_element(&self.elements.remark()))
    }

    /// Map `op` over the handles `wait` produces. A stale match means the list
    /// changed under us, so look it up once more and start over.
    fn collect<T, W, F>(&self, wait: W, op: F) -> PageResult<Vec<T>>
    where
        W: Fn(&Self) -> PageResult<WaitOutcome<Vec<ElementHandle>>>,
        F: Fn(&'a D, &ElementHandle) -> PageResult<T>,
    {
        let run = |handles: Vec<ElementHandle>| -> PageResult<Vec<T>> {
            handles.iter().map(|h| op(self.driver(), h)).collect()
        };
        match run(self.raising(&wait)?) {
            Err(e) if e.is_stale() => {
                debug!("matches of {} went stale, looking them up again", self.elements.remark());
                run(self.raising(&wait)?)
            }
            result => result,
        }
    }

    pub fn texts(&self) -> PageResult<Vec<String>> {
        self.collect(|b| b.wait_all_present(), |d, h| d.text(h))
    }

    /// Texts once every match is visible.
    pub fn all_visible_texts(&self) -> PageResult<Vec<String>> {
        self.collect(|b| b.wait_all_visible(), |d, h| d.text(h))
    }

    /// Texts of the visible matches, once there is at least one.
    pub fn any_visible_texts(&self) -> PageResult<Vec<String>> {
        self.collect(|b| b.wait_any_visible(), |d, h| d.text(h))
    }

    pub fn rects(&self) -> PageResult<Vec<Rect>> {
        self.collect(|b| b.wait_all_present(), |d, h| d.rect(h))
    }

    pub fn locations(&self) -> PageResult<Vec<Point>> {
        Ok(self.rects()?.iter().map(Rect::location).collect())
    }

    pub fn sizes(&self) -> PageResult<Vec<Size>> {
        Ok(self.rects()?.iter().map(Rect::size).collect())
    }

    pub fn centers(&self) -> PageResult<Vec<Point>> {
        Ok(self.rects()?.iter().map(Rect::center).collect())
    }

    pub fn attributes(&self, name: &str) -> PageResult<Vec<Option<String>>> {
        self.collect(|b| b.wait_all_present(), |d, h| d.attribute(h, name))
    }

    pub fn properties(&self, name: &str) -> PageResult<Vec<Option<Value>>> {
        self.collect(|b| b.wait_all_present(), |d, h| d.property(h, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::{MockDriver, MockNode};

    fn rows(count: usize) -> Page<MockDriver> {
        let driver = MockDriver::new();
        for i in 0..count {
            driver.add(
                MockNode::new(Locator::class_name("row"))
                    .text(format!("row {}", i))
                    .rect(Rect::new(0.0, 50.0 * i as f64, 200.0, 50.0)),
            );
        }
        Page::new(driver).with_policy(WaitPolicy::new(
            Duration::from_millis(200),
            Duration::from_millis(20),
            true,
        ))
    }

    #[test]
    fn nth_carries_the_group_settings() {
        let group = Elements::new(By::ClassName, "row")
            .with_remark("rows")
            .with_timeout(Duration::from_secs(2));
        let third = group.nth(2).unwrap();
        assert_eq!(third.index(), Some(2));
        assert_eq!(third.timeout(), Some(Duration::from_secs(2)));
        assert_eq!(third.remark(), "rows[2]");
    }

    #[test]
    fn quantity_is_zero_when_nothing_shows_up() {
        let page = rows(0);
        let group = Elements::new(By::ClassName, "row");
        assert_eq!(group.bind(&page).quantity().unwrap(), 0);
        assert_eq!(group.wait_timeout(), Some(Duration::from_millis(200)));
    }

    #[test]
    fn find_past_the_end_is_not_found() {
        let page = rows(3);
        let group = Elements::new(By::ClassName, "row");
        assert!(group.bind(&page).find(1).unwrap().is_found());
        assert!(group.bind(&page).find(5).unwrap_err().is_not_found());
    }

    #[test]
    fn find_honors_return_false() {
        let page = rows(0);
        let group = Elements::new(By::ClassName, "row");
        let outcome = group.bind(&page).reraise(false).find(0).unwrap();
        assert!(outcome.is_timed_out());
        assert!(group.bind(&page).find(0).unwrap_err().is_timeout());
    }

    #[test]
    fn geometry_reads() {
        let page = rows(2);
        let group = Elements::new(By::ClassName, "row");
        let centers = group.bind(&page).centers().unwrap();
        assert_eq!(centers, vec![Point::new(100, 25), Point::new(100, 75)]);
    }
}
