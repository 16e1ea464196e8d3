use std::cell::{Cell, RefCell};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde_json::Value;

use crate::actions::Action;
use crate::components::select::SelectElement;
use crate::config::WaitPolicy;
use crate::driver::Driver;
use crate::error::{configuration, no_such_element, PageError, PageResult};
use crate::gesture::{adjustment, Area, Stroke, SwipeOptions};
use crate::keys::Keys;
use crate::locator::{By, Locator};
use crate::page::Page;
use crate::query::{conditions, ElementState, TextMatch, WaitOutcome, Waiter};
use crate::types::{Border, ElementHandle, Point, Rect, Size};

/// Declaration of one element of a page: how to find it and how long to wait for it.
///
/// The descriptor also remembers the last handle a wait produced. Operations
/// reuse that handle and transparently locate the element again when the
/// driver reports it stale.
///
/// With `index` set, the element is match `index` of all matches instead of
/// the first match; an index past the end behaves like "not found".
#[derive(Debug, Clone, Default)]
pub struct Element {
    locator: Option<Locator>,
    index: Option<usize>,
    timeout: Option<Duration>,
    remark: Option<String>,
    policy: Option<WaitPolicy>,
    cache: RefCell<Option<ElementHandle>>,
    last_wait_timeout: Cell<Option<Duration>>,
}

impl Element {
    pub fn new(by: By, value: impl Into<String>) -> Self {
        Element::located(Locator::new(by, value))
    }

    pub fn located(locator: Locator) -> Self {
        Element {
            locator: Some(locator),
            ..Element::default()
        }
    }

    /// An element whose locator is only known at runtime. Call [`Element::set`]
    /// before using it; until then every operation fails with a configuration error.
    pub fn dynamic() -> Self {
        Element::default()
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = Some(remark.into());
        self
    }

    /// Wait with `policy` instead of the page's policy.
    pub fn with_policy(mut self, policy: WaitPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Point the descriptor at a new locator, dropping any cached handle.
    pub fn set(&mut self, locator: Locator) -> &mut Self {
        self.locator = Some(locator);
        self.forget();
        self
    }

    pub fn set_index(&mut self, index: Option<usize>) -> &mut Self {
        self.index = index;
        self.forget();
        self
    }

    pub fn locator(&self) -> PageResult<&Locator> {
        self.locator.as_ref().ok_or_else(|| {
            configuration("the locator must be set before performing element operations")
        })
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Name used in logs and timeout errors: the remark, or the locator value
    /// (with the index as `(value)[index]`).
    pub fn remark(&self) -> String {
        if let Some(remark) = &self.remark {
            return remark.clone();
        }
        let value = self.locator.as_ref().map_or("<unset>", |l| l.value());
        match self.index {
            Some(index) => format!("({})[{}]", value, index),
            None => value.to_string(),
        }
    }

    /// The timeout used by the most recent wait on this element.
    pub fn wait_timeout(&self) -> Option<Duration> {
        self.last_wait_timeout.get()
    }

    pub fn cached_handle(&self) -> Option<ElementHandle> {
        self.cache.borrow().clone()
    }

    fn remember(&self, handle: &ElementHandle) {
        *self.cache.borrow_mut() = Some(handle.clone());
    }

    fn forget(&self) {
        self.cache.borrow_mut().take();
    }

    /// Use this element on `page`.
    pub fn bind<'a, D: Driver>(&'a self, page: &'a Page<D>) -> BoundElement<'a, D> {
        BoundElement {
            element: self,
            page,
            timeout: None,
            reraise: None,
        }
    }
}

/// An [`Element`] bound to a [`Page`], with optional per-call overrides.
///
/// # Example:
/// ```
/// use pageobject_sync::driver::mock::MockDriver;
/// use pageobject_sync::prelude::*;
/// use std::time::Duration;
///
/// let page = Page::new(MockDriver::new());
/// let banner = Element::new(By::Id, "banner");
/// let outcome = banner.bind(&page).timeout(Duration::from_millis(100)).reraise(false).wait_visible()?;
/// assert!(outcome.is_timed_out());
/// # Ok::<(), PageError>(())
/// ```
#[derive(Debug)]
pub struct BoundElement<'a, D: Driver> {
    element: &'a Element,
    page: &'a Page<D>,
    timeout: Option<Duration>,
    reraise: Option<bool>,
}

impl<'a, D: Driver> Clone for BoundElement<'a, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, D: Driver> Copy for BoundElement<'a, D> {}

enum Gesture {
    Swipe,
    Flick,
}

impl<'a, D: Driver> BoundElement<'a, D> {
    /// Wait this long instead of the element or page timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// `true`: a timed out wait is an error. `false`: it returns `TimedOut`.
    pub fn reraise(mut self, reraise: bool) -> Self {
        self.reraise = Some(reraise);
        self
    }

    pub fn element(&self) -> &'a Element {
        self.element
    }

    fn driver(&self) -> &'a D {
        self.page.driver()
    }

    fn policy(&self) -> WaitPolicy {
        self.element.policy.unwrap_or(*self.page.policy())
    }

    fn waiter(&self, state: &str) -> Waiter<'a> {
        let policy = self.policy();
        let timeout = self.timeout.or(self.element.timeout).unwrap_or(policy.timeout);
        self.element.last_wait_timeout.set(Some(timeout));
        self.page.record_wait(timeout);
        Waiter::new(self.driver(), &policy)
            .with_timeout(timeout)
            .reraise(self.reraise.unwrap_or(policy.reraise))
            .target(self.element.remark())
            .condition(state)
    }

    fn keep(&self, outcome: &WaitOutcome<ElementHandle>) {
        match outcome {
            WaitOutcome::Found(handle) => self.element.remember(handle),
            WaitOutcome::Absent => self.element.forget(),
            WaitOutcome::TimedOut => {}
        }
    }

    /// Look the element up once, without waiting.
    pub fn find_now(&self) -> PageResult<ElementHandle> {
        conditions::resolve(self.driver(), self.element.locator()?, self.element.index)
    }

    /// Same as [`BoundElement::wait_present`].
    pub fn find(&self) -> PageResult<WaitOutcome<ElementHandle>> {
        self.wait_present()
    }

    pub fn wait_present(&self) -> PageResult<WaitOutcome<ElementHandle>> {
        let locator = self.element.locator()?.clone();
        let outcome = self.waiter(ElementState::Present.name()).ignore_stale(true).until(
            conditions::element_in_state(locator, self.element.index, ElementState::Present, false),
        )?;
        self.keep(&outcome);
        Ok(outcome)
    }

    /// Wait until the element cannot be found. `Ok(false)` means it was still
    /// there at the deadline and the timeout is not raised.
    pub fn wait_absent(&self) -> PageResult<bool> {
        let locator = self.element.locator()?.clone();
        let outcome = self
            .waiter("absent")
            .until(conditions::element_absent(locator, self.element.index))?;
        if outcome.is_satisfied() {
            self.element.forget();
        }
        Ok(outcome.is_satisfied())
    }

    /// Poll the cached handle first; once it goes stale, poll the locator
    /// until the original deadline.
    fn wait_state(
        &self,
        state: ElementState,
        tolerate_absence: bool,
    ) -> PageResult<WaitOutcome<ElementHandle>> {
        let locator = self.element.locator()?.clone();
        let start = Instant::now();
        if let Some(handle) = self.element.cached_handle() {
            match self
                .waiter(state.name())
                .starting_at(start)
                .until(conditions::handle_in_state(handle, state))
            {
                Ok(outcome) => {
                    self.keep(&outcome);
                    return Ok(outcome);
                }
                Err(e) if e.is_stale() => {
                    self.element.forget();
                    debug!("cached handle of {} is stale, locating it again", self.element.remark());
                }
                Err(e) => return Err(e),
            }
        }

        let outcome = self
            .waiter(state.name())
            .starting_at(start)
            .ignore_stale(true)
            .until(conditions::element_in_state(locator, self.element.index, state, tolerate_absence))?;
        self.keep(&outcome);
        Ok(outcome)
    }

    pub fn wait_visible(&self) -> PageResult<WaitOutcome<ElementHandle>> {
        self.wait_state(ElementState::Visible, false)
    }

    /// With `tolerate_absence`, an element that is gone also counts and the
    /// outcome is `Absent`.
    pub fn wait_invisible(&self, tolerate_absence: bool) -> PageResult<WaitOutcome<ElementHandle>> {
        self.wait_state(ElementState::Invisible, tolerate_absence)
    }

    pub fn wait_clickable(&self) -> PageResult<WaitOutcome<ElementHandle>> {
        self.wait_state(ElementState::Clickable, false)
    }

    pub fn wait_unclickable(
        &self,
        tolerate_absence: bool,
    ) -> PageResult<WaitOutcome<ElementHandle>> {
        self.wait_state(ElementState::Unclickable, tolerate_absence)
    }

    pub fn wait_selected(&self) -> PageResult<WaitOutcome<ElementHandle>> {
        self.wait_state(ElementState::Selected, false)
    }

    pub fn wait_unselected(&self) -> PageResult<WaitOutcome<ElementHandle>> {
        self.wait_state(ElementState::Unselected, false)
    }

    /// Wait until the element's text satisfies `expected`; yields the text.
    pub fn wait_text(&self, expected: impl Into<TextMatch>) -> PageResult<WaitOutcome<String>> {
        let expected = expected.into();
        let locator = self.element.locator()?.clone();
        self.waiter(&format!("text {}", expected))
            .ignore_stale(true)
            .until(conditions::element_text(locator, self.element.index, expected))
    }

    /// Wait for the element to be a frame that can be switched to, and switch.
    pub fn switch_to_frame(&self) -> PageResult<bool> {
        let locator = self.element.locator()?.clone();
        let outcome = self
            .waiter("available frame")
            .ignore_stale(true)
            .until(conditions::frame_available(locator, self.element.index))?;
        Ok(outcome.is_satisfied())
    }

    /// A handle in `ready` state, failing with a timeout error otherwise.
    fn ready_handle(&self, ready: ElementState) -> PageResult<ElementHandle> {
        let raising = self.reraise(true);
        let outcome = match ready {
            ElementState::Present => raising.wait_present()?,
            state => raising.wait_state(state, false)?,
        };
        outcome
            .found()
            .ok_or_else(|| no_such_element(&format!("{} is not {}", self.element.remark(), ready)))
    }

    pub fn present_element(&self) -> PageResult<ElementHandle> {
        self.ready_handle(ElementState::Present)
    }

    pub fn visible_element(&self) -> PageResult<ElementHandle> {
        self.ready_handle(ElementState::Visible)
    }

    pub fn clickable_element(&self) -> PageResult<ElementHandle> {
        self.ready_handle(ElementState::Clickable)
    }

    fn present_handle(&self) -> PageResult<ElementHandle> {
        match self.element.cached_handle() {
            Some(handle) => Ok(handle),
            None => self.present_element(),
        }
    }

    /// Run `op` on the cached handle. When the driver reports the handle
    /// stale, wait for the element to be `ready` again and retry once.
    fn safe_op<T, F>(&self, ready: ElementState, op: F) -> PageResult<T>
    where
        F: Fn(&'a D, &ElementHandle) -> PageResult<T>,
    {
        if let Some(handle) = self.element.cached_handle() {
            match op(self.driver(), &handle) {
                Err(e) if e.is_stale() => {
                    debug!("{} went stale, waiting for it to be {}", self.element.remark(), ready);
                    self.element.forget();
                }
                result => return result,
            }
        }
        let handle = self.ready_handle(ready)?;
        op(self.driver(), &handle)
    }

    /// Whether the element shows up within the timeout. Never raises a timeout.
    pub fn is_present(&self) -> PageResult<bool> {
        Ok(self.reraise(false).wait_present()?.is_found())
    }

    pub fn is_visible(&self) -> PageResult<bool> {
        self.safe_op(ElementState::Present, |d, h| d.is_displayed(h))
    }

    pub fn is_enabled(&self) -> PageResult<bool> {
        self.safe_op(ElementState::Present, |d, h| d.is_enabled(h))
    }

    pub fn is_clickable(&self) -> PageResult<bool> {
        self.safe_op(ElementState::Present, |d, h| Ok(d.is_displayed(h)? && d.is_enabled(h)?))
    }

    pub fn is_selected(&self) -> PageResult<bool> {
        self.safe_op(ElementState::Present, |d, h| d.is_selected(h))
    }

    /// Present and displayed, typically inside the visible part of a scroll view.
    pub fn is_viewable(&self) -> PageResult<bool> {
        match self.reraise(false).wait_present()? {
            WaitOutcome::Found(handle) => match self.driver().is_displayed(&handle) {
                Err(e) if e.is_stale() => Ok(false),
                result => result,
            },
            _ => Ok(false),
        }
    }

    pub fn text(&self) -> PageResult<String> {
        self.safe_op(ElementState::Present, |d, h| d.text(h))
    }

    /// The text once the element is visible.
    pub fn visible_text(&self) -> PageResult<String> {
        self.safe_op(ElementState::Visible, |d, h| d.text(h))
    }

    pub fn rect(&self) -> PageResult<Rect> {
        self.safe_op(ElementState::Present, |d, h| d.rect(h))
    }

    pub fn location(&self) -> PageResult<Point> {
        Ok(self.rect()?.location())
    }

    pub fn size(&self) -> PageResult<Size> {
        Ok(self.rect()?.size())
    }

    pub fn border(&self) -> PageResult<Border> {
        Ok(self.rect()?.border())
    }

    pub fn center(&self) -> PageResult<Point> {
        Ok(self.rect()?.center())
    }

    pub fn attribute(&self, name: &str) -> PageResult<Option<String>> {
        self.safe_op(ElementState::Present, |d, h| d.attribute(h, name))
    }

    pub fn property(&self, name: &str) -> PageResult<Option<Value>> {
        self.safe_op(ElementState::Present, |d, h| d.property(h, name))
    }

    pub fn css_value(&self, name: &str) -> PageResult<String> {
        self.safe_op(ElementState::Present, |d, h| d.css_value(h, name))
    }

    pub fn tag_name(&self) -> PageResult<String> {
        self.safe_op(ElementState::Present, |d, h| d.tag_name(h))
    }

    pub fn screenshot_as_png(&self) -> PageResult<Vec<u8>> {
        let encoded = self.safe_op(ElementState::Visible, |d, h| d.element_screenshot(h))?;
        Ok(base64::decode(encoded)?)
    }

    /// Write a PNG of the element to `path`.
    pub fn screenshot(&self, path: impl AsRef<Path>) -> PageResult<()> {
        let png = self.screenshot_as_png()?;
        fs::write(path, png)?;
        Ok(())
    }

    /// Click the element once it is clickable.
    pub fn click(&self) -> PageResult<&Self> {
        self.safe_op(ElementState::Clickable, |d, h| d.click(h))?;
        Ok(self)
    }

    /// Tap the center of the element; useful when a click is swallowed.
    pub fn tap(&self, duration: Option<Duration>) -> PageResult<&Self> {
        let center = self.center()?;
        self.driver().tap(&[center], duration)?;
        Ok(self)
    }

    pub fn clear(&self) -> PageResult<&Self> {
        self.safe_op(ElementState::Clickable, |d, h| d.clear(h))?;
        Ok(self)
    }

    pub fn send_keys(&self, keys: &str) -> PageResult<&Self> {
        self.safe_op(ElementState::Clickable, |d, h| d.send_keys(h, keys))?;
        Ok(self)
    }

    pub fn submit(&self) -> PageResult<&Self> {
        self.safe_op(ElementState::Present, |d, h| d.submit(h))?;
        Ok(self)
    }

    /// Type `text`.
    pub fn input(&self, text: &str) -> PageResult<&Self> {
        self.send_keys(text)
    }

    pub fn enter(&self) -> PageResult<&Self> {
        self.send_keys(Keys::Enter.as_str())
    }

    fn shortcut(&self, key: &str) -> PageResult<&Self> {
        self.send_keys(&Keys::chord(Keys::primary_modifier(), key))
    }

    /// Select all text (Command+A on macOS, Control+A elsewhere).
    pub fn select_all(&self) -> PageResult<&Self> {
        self.shortcut("a")
    }

    pub fn cut(&self) -> PageResult<&Self> {
        self.shortcut("x")
    }

    pub fn copy(&self) -> PageResult<&Self> {
        self.shortcut("c")
    }

    pub fn paste(&self) -> PageResult<&Self> {
        self.shortcut("v")
    }

    pub fn arrow_left(&self, times: usize) -> PageResult<&Self> {
        self.send_keys(&Keys::ArrowLeft.repeat(times))
    }

    pub fn arrow_right(&self, times: usize) -> PageResult<&Self> {
        self.send_keys(&Keys::ArrowRight.repeat(times))
    }

    pub fn arrow_up(&self, times: usize) -> PageResult<&Self> {
        self.send_keys(&Keys::ArrowUp.repeat(times))
    }

    pub fn arrow_down(&self, times: usize) -> PageResult<&Self> {
        self.send_keys(&Keys::ArrowDown.repeat(times))
    }

    pub fn backspace(&self, times: usize) -> PageResult<&Self> {
        self.send_keys(&Keys::Backspace.repeat(times))
    }

    pub fn delete(&self, times: usize) -> PageResult<&Self> {
        self.send_keys(&Keys::Delete.repeat(times))
    }

    pub fn tab(&self, times: usize) -> PageResult<&Self> {
        self.send_keys(&Keys::Tab.repeat(times))
    }

    pub fn space(&self, times: usize) -> PageResult<&Self> {
        self.send_keys(&Keys::Space.repeat(times))
    }

    fn queue(&self, action: Action) -> PageResult<&Self> {
        self.page.queue(action);
        Ok(self)
    }

    /// Queue a click on the element. Queued actions run on [`BoundElement::perform`]
    /// or [`Page::perform`].
    ///
    /// ```
    /// # use pageobject_sync::driver::mock::{MockDriver, MockNode};
    /// # use pageobject_sync::prelude::*;
    /// # let page = Page::new(MockDriver::new());
    /// # page.driver().add(MockNode::new(Locator::id("card")));
    /// let card = Element::new(By::Id, "card");
    /// card.bind(&page).scroll_to_element()?.action_click()?.perform()?;
    /// # Ok::<(), PageError>(())
    /// ```
    pub fn action_click(&self) -> PageResult<&Self> {
        self.queue(Action::Click(Some(self.present_handle()?)))
    }

    pub fn click_and_hold(&self) -> PageResult<&Self> {
        self.queue(Action::ClickAndHold(Some(self.present_handle()?)))
    }

    pub fn context_click(&self) -> PageResult<&Self> {
        self.queue(Action::ContextClick(Some(self.present_handle()?)))
    }

    pub fn double_click(&self) -> PageResult<&Self> {
        self.queue(Action::DoubleClick(Some(self.present_handle()?)))
    }

    /// Press on this element, release on `target`.
    pub fn drag_and_drop(&self, target: &Element) -> PageResult<&Self> {
        let source = self.present_handle()?;
        let target = target.bind(self.page).present_handle()?;
        self.queue(Action::ClickAndHold(Some(source)))?;
        self.queue(Action::Release(Some(target)))
    }

    pub fn drag_and_drop_by_offset(&self, x_offset: i64, y_offset: i64) -> PageResult<&Self> {
        self.queue(Action::ClickAndHold(Some(self.present_handle()?)))?;
        self.queue(Action::MoveByOffset {
            x_offset,
            y_offset,
        })?;
        self.queue(Action::Release(None))
    }

    /// Queue a key combination aimed at this element, e.g.
    /// `hotkey(&[Keys::Control.as_str(), "c"])`.
    pub fn hotkey(&self, keys: &[&str]) -> PageResult<&Self> {
        self.page.queue_hotkey(Some(self.present_handle()?), keys);
        Ok(self)
    }

    /// Press `key` without releasing it, focusing this element first when `focus` is set.
    pub fn key_down(&self, key: &str, focus: bool) -> PageResult<&Self> {
        let element = if focus { Some(self.present_handle()?) } else { None };
        self.queue(Action::KeyDown {
            key: key.to_string(),
            element,
        })
    }

    pub fn key_up(&self, key: &str, focus: bool) -> PageResult<&Self> {
        let element = if focus { Some(self.present_handle()?) } else { None };
        self.queue(Action::KeyUp {
            key: key.to_string(),
            element,
        })
    }

    /// Queue typing into whatever has focus.
    pub fn action_send_keys(&self, keys: &str) -> PageResult<&Self> {
        self.queue(Action::SendKeys {
            keys: keys.to_string(),
            element: None,
        })
    }

    pub fn send_keys_to_element(&self, keys: &str) -> PageResult<&Self> {
        self.queue(Action::SendKeys {
            keys: keys.to_string(),
            element: Some(self.present_handle()?),
        })
    }

    pub fn move_to_element(&self) -> PageResult<&Self> {
        self.move_to_element_with_offset(0, 0)
    }

    /// Move the pointer to an offset from the element's center.
    pub fn move_to_element_with_offset(&self, x_offset: i64, y_offset: i64) -> PageResult<&Self> {
        self.queue(Action::MoveToElement {
            element: self.present_handle()?,
            x_offset,
            y_offset,
        })
    }

    /// Release the pointer button over this element.
    pub fn release(&self) -> PageResult<&Self> {
        self.queue(Action::Release(Some(self.present_handle()?)))
    }

    pub fn pause(&self, duration: Duration) -> PageResult<&Self> {
        self.queue(Action::Pause(duration))
    }

    pub fn scroll_to_element(&self) -> PageResult<&Self> {
        self.queue(Action::ScrollToElement(self.present_handle()?))
    }

    /// Scroll by `(delta_x, delta_y)` starting from an offset of the element's center.
    pub fn scroll_from_element(
        &self,
        x_offset: i64,
        y_offset: i64,
        delta_x: i64,
        delta_y: i64,
    ) -> PageResult<&Self> {
        self.queue(Action::ScrollFromElement {
            element: self.present_handle()?,
            x_offset,
            y_offset,
            delta_x,
            delta_y,
        })
    }

    /// Run every action queued on the page.
    pub fn perform(&self) -> PageResult<()> {
        self.page.perform()
    }

    pub fn reset_actions(&self) -> PageResult<()> {
        self.page.reset_actions()
    }

    fn with_select<T, F>(&self, f: F) -> PageResult<T>
    where
        F: Fn(&SelectElement<'_>) -> PageResult<T>,
    {
        self.safe_op(ElementState::Present, |d, h| f(&SelectElement::new(d, h.clone())?))
    }

    pub fn options(&self) -> PageResult<Vec<ElementHandle>> {
        self.with_select(|s| s.options())
    }

    pub fn all_selected_options(&self) -> PageResult<Vec<ElementHandle>> {
        self.with_select(|s| s.all_selected_options())
    }

    pub fn first_selected_option(&self) -> PageResult<ElementHandle> {
        self.with_select(|s| s.first_selected_option())
    }

    pub fn select_by_value(&self, value: &str) -> PageResult<&Self> {
        self.with_select(|s| s.select_by_value(value))?;
        Ok(self)
    }

    pub fn select_by_index(&self, index: u32) -> PageResult<&Self> {
        self.with_select(|s| s.select_by_index(index))?;
        Ok(self)
    }

    pub fn select_by_visible_text(&self, text: &str) -> PageResult<&Self> {
        self.with_select(|s| s.select_by_visible_text(text))?;
        Ok(self)
    }

    pub fn deselect_all(&self) -> PageResult<&Self> {
        self.with_select(|s| s.deselect_all())?;
        Ok(self)
    }

    pub fn deselect_by_value(&self, value: &str) -> PageResult<&Self> {
        self.with_select(|s| s.deselect_by_value(value))?;
        Ok(self)
    }

    pub fn deselect_by_index(&self, index: u32) -> PageResult<&Self> {
        self.with_select(|s| s.deselect_by_index(index))?;
        Ok(self)
    }

    pub fn deselect_by_visible_text(&self, text: &str) -> PageResult<&Self> {
        self.with_select(|s| s.deselect_by_visible_text(text))?;
        Ok(self)
    }

    /// Swipe until the element is viewable, then nudge it fully inside the area.
    ///
    /// Fails with [`PageError::SwipeLimit`] when the element is still not
    /// viewable after `options.max_swipe` swipes.
    pub fn swipe_by(&self, options: &SwipeOptions) -> PageResult<&Self> {
        self.gesture_into_view(options, Gesture::Swipe)
    }

    /// Like [`BoundElement::swipe_by`] with flicks; the final nudges are swipes.
    pub fn flick_by(&self, options: &SwipeOptions) -> PageResult<&Self> {
        self.gesture_into_view(options, Gesture::Flick)
    }

    fn gesture_into_view(&self, options: &SwipeOptions, gesture: Gesture) -> PageResult<&Self> {
        let driver = self.driver();
        let area = Area::resolve(&options.area, || driver.window_rect())?;
        let stroke = Stroke::resolve(&options.offset, &area)?;
        let remark = self.element.remark();

        info!("bringing {} into view", remark);
        let mut count = 0;
        while !self.timeout(options.timeout).is_viewable()? {
            if count == options.max_swipe {
                warn!("{} is still not viewable after {} gestures", remark, count);
                return Err(PageError::SwipeLimit {
                    remark,
                    attempts: count,
                });
            }
            match gesture {
                Gesture::Swipe => driver.swipe(stroke.start, stroke.end, options.duration)?,
                Gesture::Flick => driver.flick(stroke.start, stroke.end)?,
            }
            count += 1;
        }
        debug!("{} is viewable after {} gestures", remark, count);

        self.adjust_into(&area, &stroke, options)?;
        Ok(self)
    }

    fn adjust_into(&self, area: &Area, stroke: &Stroke, options: &SwipeOptions) -> PageResult<()> {
        let last = options.max_adjust + 1;
        for attempt in 1..=last {
            let delta = adjustment(area, &self.border()?, options.min_distance);
            let (dx, dy) = match delta {
                Some(delta) => delta,
                None => {
                    debug!("{} is inside the area", self.element.remark());
                    return Ok(());
                }
            };
            if attempt == last {
                info!(
                    "stopped adjusting {} after {} attempts",
                    self.element.remark(),
                    options.max_adjust
                );
                return Ok(());
            }
            let end = Point::new(stroke.start.x + dx, stroke.start.y + dy);
            self.driver().swipe(stroke.start, end, options.duration)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_remark_uses_value_and_index() {
        assert_eq!(Element::new(By::Id, "submit").remark(), "submit");
        assert_eq!(Element::new(By::ClassName, "row").with_index(5).remark(), "(row)[5]");
        assert_eq!(Element::new(By::Id, "x").with_remark("login button").remark(), "login button");
    }

    #[test]
    fn dynamic_element_needs_a_locator() {
        let mut element = Element::dynamic();
        assert!(matches!(element.locator().unwrap_err(), PageError::Configuration(_)));
        element.set(Locator::css("div.late"));
        assert_eq!(element.locator().unwrap(), &Locator::css("div.late"));
    }
}
