use std::cell::{Cell, RefCell};
use std::fs;
use std::path::Path;
use std::time::Duration;

use log::{debug, error};
use serde_json::{json, Value};

use crate::actions::{Action, ActionChain};
use crate::config::WaitPolicy;
use crate::driver::Driver;
use crate::error::{PageError, PageResult};
use crate::gesture::{Area, Stroke, SwipeOptions};
use crate::query::{conditions, TextMatch, WaitOutcome, Waiter};
use crate::types::{Border, Cookie, ElementHandle, Point, Rect, Size, WindowRect};

/// A page object: the driver session plus the shared state every element
/// bound to it uses (wait policy, queued actions, last wait timeout).
///
/// Elements are declared separately and bound to a page when used:
///
/// ```
/// use pageobject_sync::driver::mock::{MockDriver, MockNode};
/// use pageobject_sync::prelude::*;
///
/// struct LoginPage<D: Driver> {
///     page: Page<D>,
///     username: Element,
///     submit: Element,
/// }
///
/// let driver = MockDriver::new();
/// driver.add(MockNode::new(Locator::id("username")));
/// driver.add(MockNode::new(Locator::id("submit")));
/// let login = LoginPage {
///     page: Page::new(driver),
///     username: Element::new(By::Id, "username"),
///     submit: Element::new(By::Id, "submit").with_remark("login button"),
/// };
/// login.username.bind(&login.page).input("alice")?;
/// login.submit.bind(&login.page).click()?;
/// # Ok::<(), PageError>(())
/// ```
#[derive(Debug)]
pub struct Page<D: Driver> {
    driver: D,
    policy: WaitPolicy,
    actions: RefCell<ActionChain>,
    last_wait_timeout: Cell<Option<Duration>>,
    quit_on_drop: bool,
}

/// A window given by handle name or by position in the handle list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowTarget {
    Name(String),
    Index(usize),
}

impl From<&str> for WindowTarget {
    fn from(name: &str) -> Self {
        WindowTarget::Name(name.to_string())
    }
}

impl From<String> for WindowTarget {
    fn from(name: String) -> Self {
        WindowTarget::Name(name)
    }
}

impl From<usize> for WindowTarget {
    fn from(index: usize) -> Self {
        WindowTarget::Index(index)
    }
}

impl<D: Driver> Page<D> {
    /// Wrap `driver`, waiting with the process-wide [`WaitPolicy::global`].
    pub fn new(driver: D) -> Self {
        Page {
            driver,
            policy: WaitPolicy::global(),
            actions: RefCell::new(ActionChain::new()),
            last_wait_timeout: Cell::new(None),
            quit_on_drop: false,
        }
    }

    pub fn with_policy(mut self, policy: WaitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// End the session when the page goes out of scope.
    pub fn quit_on_drop(mut self, quit: bool) -> Self {
        self.quit_on_drop = quit;
        self
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn policy(&self) -> &WaitPolicy {
        &self.policy
    }

    /// The timeout of the most recent wait started through this page or one
    /// of its elements, if any.
    pub fn wait_timeout(&self) -> Option<Duration> {
        self.last_wait_timeout.get()
    }

    pub(crate) fn record_wait(&self, timeout: Duration) {
        self.last_wait_timeout.set(Some(timeout));
    }

    pub(crate) fn queue(&self, action: Action) {
        self.actions.borrow_mut().push(action);
    }

    pub(crate) fn queue_hotkey(&self, target: Option<ElementHandle>, keys: &[&str]) {
        self.actions.borrow_mut().hotkey(target, keys);
    }

    /// Explicit waits on page state.
    ///
    /// # Example:
    /// ```
    /// # use pageobject_sync::driver::mock::MockDriver;
    /// # use pageobject_sync::prelude::*;
    /// # use std::time::Duration;
    /// # let page = Page::new(MockDriver::new());
    /// # page.get("https://shop.example/home")?;
    /// assert!(page.wait_until().timeout(Duration::from_secs(1)).url_contains("/home")?);
    /// # Ok::<(), PageError>(())
    /// ```
    pub fn wait_until(&self) -> PageWaiter<'_, D> {
        PageWaiter {
            page: self,
            timeout: None,
            reraise: None,
        }
    }

    pub fn get(&self, url: &str) -> PageResult<()> {
        self.driver.get(url)
    }

    pub fn source(&self) -> PageResult<String> {
        self.driver.page_source()
    }

    pub fn url(&self) -> PageResult<String> {
        self.driver.current_url()
    }

    pub fn title(&self) -> PageResult<String> {
        self.driver.title()
    }

    pub fn refresh(&self) -> PageResult<()> {
        self.driver.refresh()
    }

    pub fn back(&self) -> PageResult<()> {
        self.driver.back()
    }

    pub fn forward(&self) -> PageResult<()> {
        self.driver.forward()
    }

    /// Close the current window.
    pub fn close(&self) -> PageResult<()> {
        self.driver.close_window()
    }

    /// End the session.
    pub fn quit(mut self) -> PageResult<()> {
        self.driver.quit()?;
        self.quit_on_drop = false;
        Ok(())
    }

    pub fn window_rect(&self) -> PageResult<Rect> {
        self.driver.window_rect()
    }

    pub fn set_window_rect(&self, rect: WindowRect) -> PageResult<Rect> {
        self.driver.set_window_rect(rect)
    }

    pub fn window_position(&self) -> PageResult<Point> {
        Ok(self.window_rect()?.location())
    }

    pub fn set_window_position(&self, x: i64, y: i64) -> PageResult<Rect> {
        self.set_window_rect(WindowRect {
            x: Some(x),
            y: Some(y),
            ..WindowRect::default()
        })
    }

    pub fn window_size(&self) -> PageResult<Size> {
        Ok(self.window_rect()?.size())
    }

    pub fn set_window_size(&self, width: i64, height: i64) -> PageResult<Rect> {
        self.set_window_rect(WindowRect {
            width: Some(width),
            height: Some(height),
            ..WindowRect::default()
        })
    }

    pub fn window_border(&self) -> PageResult<Border> {
        Ok(self.window_rect()?.border())
    }

    pub fn window_center(&self) -> PageResult<Point> {
        Ok(self.window_rect()?.center())
    }

    pub fn maximize_window(&self) -> PageResult<()> {
        self.driver.maximize_window()
    }

    pub fn minimize_window(&self) -> PageResult<()> {
        self.driver.minimize_window()
    }

    pub fn fullscreen_window(&self) -> PageResult<()> {
        self.driver.fullscreen_window()
    }

    pub fn window_handles(&self) -> PageResult<Vec<String>> {
        self.driver.window_handles()
    }

    pub fn current_window_handle(&self) -> PageResult<String> {
        self.driver.current_window_handle()
    }

    /// Switch by handle name, or by index into [`Page::window_handles`].
    pub fn switch_to_window(&self, window: impl Into<WindowTarget>) -> PageResult<()> {
        let handle = match window.into() {
            WindowTarget::Name(name) => name,
            WindowTarget::Index(index) => {
                self.window_handles()?.into_iter().nth(index).ok_or_else(|| {
                    PageError::NoSuchWindow(format!("no window at index {}", index))
                })?
            }
        };
        self.driver.switch_to_window(&handle)
    }

    pub fn switch_to_default_content(&self) -> PageResult<()> {
        self.driver.switch_to_default_content()
    }

    pub fn switch_to_parent_frame(&self) -> PageResult<()> {
        self.driver.switch_to_parent_frame()
    }

    /// Wait for an alert and return its text.
    pub fn wait_alert(&self) -> PageResult<WaitOutcome<String>> {
        self.wait_until().alert()
    }

    pub fn accept_alert(&self) -> PageResult<()> {
        self.driver.accept_alert()
    }

    pub fn dismiss_alert(&self) -> PageResult<()> {
        self.driver.dismiss_alert()
    }

    pub fn alert_text(&self) -> PageResult<String> {
        self.driver.alert_text()
    }

    pub fn execute_script(&self, script: &str, args: &[Value]) -> PageResult<Value> {
        self.driver.execute_script(script, args)
    }

    /// Appium `mobile: scroll`; `direction` is one of up, down, left, right.
    pub fn mobile_scroll(&self, direction: &str) -> PageResult<Value> {
        self.execute_script("mobile: scroll", &[json!({ "direction": direction })])
    }

    pub fn get_cookies(&self) -> PageResult<Vec<Cookie>> {
        self.driver.cookies()
    }

    pub fn get_cookie(&self, name: &str) -> PageResult<Option<Cookie>> {
        Ok(self.get_cookies()?.into_iter().find(|c| c.name == name))
    }

    pub fn add_cookie(&self, cookie: &Cookie) -> PageResult<()> {
        self.driver.add_cookie(cookie)
    }

    pub fn add_cookies(&self, cookies: &[Cookie]) -> PageResult<()> {
        for cookie in cookies {
            self.add_cookie(cookie)?;
        }
        Ok(())
    }

    pub fn delete_cookie(&self, name: &str) -> PageResult<()> {
        self.driver.delete_cookie(name)
    }

    pub fn delete_all_cookies(&self) -> PageResult<()> {
        self.driver.delete_all_cookies()
    }

    pub fn screenshot_as_png(&self) -> PageResult<Vec<u8>> {
        Ok(base64::decode(self.driver.screenshot()?)?)
    }

    /// Write a PNG of the viewport to `path`.
    pub fn save_screenshot(&self, path: impl AsRef<Path>) -> PageResult<()> {
        let png = self.screenshot_as_png()?;
        fs::write(path, png)?;
        Ok(())
    }

    pub fn implicitly_wait(&self, timeout: Duration) -> PageResult<()> {
        self.driver.set_implicit_wait(timeout)
    }

    pub fn set_script_timeout(&self, timeout: Duration) -> PageResult<()> {
        self.driver.set_script_timeout(timeout)
    }

    pub fn set_page_load_timeout(&self, timeout: Duration) -> PageResult<()> {
        self.driver.set_page_load_timeout(timeout)
    }

    pub fn contexts(&self) -> PageResult<Vec<String>> {
        self.driver.contexts()
    }

    pub fn current_context(&self) -> PageResult<String> {
        self.driver.current_context()
    }

    pub fn switch_to_context(&self, context: &str) -> PageResult<()> {
        self.driver.switch_to_context(context)
    }

    /// Wait for a `WEBVIEW` context; with `switch`, move into the one at
    /// `index` (the last one by default).
    pub fn switch_to_webview(
        &self,
        switch: bool,
        index: Option<usize>,
    ) -> PageResult<WaitOutcome<Vec<String>>> {
        self.wait_until().webview(switch, index)
    }

    /// Switch back to `NATIVE_APP` unless already there; returns the current context.
    pub fn switch_to_app(&self) -> PageResult<String> {
        if self.current_context()? != "NATIVE_APP" {
            self.switch_to_context("NATIVE_APP")?;
        }
        self.current_context()
    }

    pub fn swipe(&self, start: Point, end: Point, duration: Duration) -> PageResult<()> {
        self.driver.swipe(start, end, duration)
    }

    pub fn flick(&self, start: Point, end: Point) -> PageResult<()> {
        self.driver.flick(start, end)
    }

    fn stroke(&self, options: &SwipeOptions) -> PageResult<Stroke> {
        let area = Area::resolve(&options.area, || self.window_rect())?;
        Stroke::resolve(&options.offset, &area)
    }

    /// Swipe `times` times along `options.offset` inside `options.area`.
    ///
    /// Only the offset, area and duration of `options` apply to a page swipe.
    pub fn swipe_by(&self, options: &SwipeOptions, times: u32) -> PageResult<()> {
        let stroke = self.stroke(options)?;
        for _ in 0..times {
            self.swipe(stroke.start, stroke.end, options.duration)?;
        }
        Ok(())
    }

    pub fn flick_by(&self, options: &SwipeOptions, times: u32) -> PageResult<()> {
        let stroke = self.stroke(options)?;
        for _ in 0..times {
            self.flick(stroke.start, stroke.end)?;
        }
        Ok(())
    }

    /// Tap with up to five fingers.
    pub fn tap(&self, positions: &[Point], duration: Option<Duration>) -> PageResult<()> {
        self.driver.tap(positions, duration)
    }

    pub fn tap_window_center(&self, duration: Option<Duration>) -> PageResult<()> {
        let center = self.window_center()?;
        self.tap(&[center], duration)
    }

    /// Queue pointer and keyboard steps that are not tied to an element.
    pub fn action(&self) -> PageActions<'_, D> {
        PageActions {
            page: self,
        }
    }

    /// Number of queued actions.
    pub fn queued_actions(&self) -> usize {
        self.actions.borrow().len()
    }

    /// Run every queued action, from this page and from its elements, then
    /// clear the queue.
    pub fn perform(&self) -> PageResult<()> {
        let actions = self.actions.borrow_mut().take();
        debug!("performing {} queued actions", actions.len());
        self.driver.perform_actions(&actions)
    }

    /// Drop the queued actions and release any pressed keys or buttons.
    pub fn reset_actions(&self) -> PageResult<()> {
        self.actions.borrow_mut().clear();
        self.driver.release_actions()
    }
}

impl<D: Driver> Drop for Page<D> {
    /// End the session when the page goes out of scope, if asked to.
    fn drop(&mut self) {
        if self.quit_on_drop {
            if let Err(e) = self.driver.quit() {
                error!("Failed to quit session: {:?}", e);
            }
        }
    }
}

/// Builder for waits on page state, created by [`Page::wait_until`].
#[derive(Debug)]
pub struct PageWaiter<'a, D: Driver> {
    page: &'a Page<D>,
    timeout: Option<Duration>,
    reraise: Option<bool>,
}

impl<'a, D: Driver> PageWaiter<'a, D> {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn reraise(mut self, reraise: bool) -> Self {
        self.reraise = Some(reraise);
        self
    }

    fn waiter(&self, target: &str, condition: String) -> Waiter<'a> {
        let policy = self.page.policy();
        let timeout = self.timeout.unwrap_or(policy.timeout);
        self.page.record_wait(timeout);
        Waiter::new(&self.page.driver, policy)
            .with_timeout(timeout)
            .reraise(self.reraise.unwrap_or(policy.reraise))
            .target(target)
            .condition(condition)
    }

    fn url(&self, expected: TextMatch) -> PageResult<bool> {
        let outcome = self.waiter("url", expected.to_string()).until(conditions::url_matches(expected))?;
        Ok(outcome.is_satisfied())
    }

    fn title(&self, expected: TextMatch) -> PageResult<bool> {
        let outcome =
            self.waiter("title", expected.to_string()).until(conditions::title_matches(expected))?;
        Ok(outcome.is_satisfied())
    }

    pub fn url_is(&self, url: &str) -> PageResult<bool> {
        self.url(TextMatch::exact(url))
    }

    pub fn url_contains(&self, fragment: &str) -> PageResult<bool> {
        self.url(TextMatch::contains(fragment))
    }

    /// The url matches the regular expression `pattern`.
    pub fn url_matches(&self, pattern: &str) -> PageResult<bool> {
        self.url(TextMatch::regex(pattern)?)
    }

    /// The url is anything but `previous`.
    pub fn url_changes(&self, previous: &str) -> PageResult<bool> {
        let outcome = self
            .waiter("url", format!("different from {:?}", previous))
            .until(conditions::url_changes(previous.to_string()))?;
        Ok(outcome.is_satisfied())
    }

    pub fn title_is(&self, title: &str) -> PageResult<bool> {
        self.title(TextMatch::exact(title))
    }

    pub fn title_contains(&self, fragment: &str) -> PageResult<bool> {
        self.title(TextMatch::contains(fragment))
    }

    pub fn title_matches(&self, pattern: &str) -> PageResult<bool> {
        self.title(TextMatch::regex(pattern)?)
    }

    pub fn number_of_windows_to_be(&self, count: usize) -> PageResult<bool> {
        let outcome = self
            .waiter("window count", count.to_string())
            .until(conditions::number_of_windows(count))?;
        Ok(outcome.is_satisfied())
    }

    /// A window that is not in `known` has opened.
    pub fn new_window_is_opened(&self, known: &[String]) -> PageResult<bool> {
        let outcome =
            self.waiter("window", "opened".to_string()).until(conditions::new_window(known.to_vec()))?;
        Ok(outcome.is_satisfied())
    }

    pub fn alert(&self) -> PageResult<WaitOutcome<String>> {
        self.waiter("alert", "present".to_string()).until(conditions::alert_present())
    }

    pub fn webview(&self, switch: bool, index: Option<usize>) -> PageResult<WaitOutcome<Vec<String>>> {
        self.waiter("WEBVIEW context", "present".to_string())
            .until(conditions::webview_present(switch, index))
    }
}

/// Queues page level actions, created by [`Page::action`].
#[derive(Debug)]
pub struct PageActions<'a, D: Driver> {
    page: &'a Page<D>,
}

impl<'a, D: Driver> PageActions<'a, D> {
    fn push(self, action: Action) -> Self {
        self.page.queue(action);
        self
    }

    /// Click at the current pointer position.
    pub fn click(self) -> Self {
        self.push(Action::Click(None))
    }

    pub fn click_and_hold(self) -> Self {
        self.push(Action::ClickAndHold(None))
    }

    pub fn context_click(self) -> Self {
        self.push(Action::ContextClick(None))
    }

    pub fn double_click(self) -> Self {
        self.push(Action::DoubleClick(None))
    }

    pub fn release(self) -> Self {
        self.push(Action::Release(None))
    }

    pub fn key_down(self, key: &str) -> Self {
        self.push(Action::KeyDown {
            key: key.to_string(),
            element: None,
        })
    }

    pub fn key_up(self, key: &str) -> Self {
        self.push(Action::KeyUp {
            key: key.to_string(),
            element: None,
        })
    }

    /// Type into whatever has focus.
    pub fn send_keys(self, keys: &str) -> Self {
        self.push(Action::SendKeys {
            keys: keys.to_string(),
            element: None,
        })
    }

    pub fn move_by_offset(self, x_offset: i64, y_offset: i64) -> Self {
        self.push(Action::MoveByOffset {
            x_offset,
            y_offset,
        })
    }

    pub fn scroll_by_amount(self, delta_x: i64, delta_y: i64) -> Self {
        self.push(Action::ScrollByAmount {
            delta_x,
            delta_y,
        })
    }

    pub fn pause(self, duration: Duration) -> Self {
        self.push(Action::Pause(duration))
    }

    pub fn perform(self) -> PageResult<()> {
        self.page.perform()
    }
}
