use std::fmt::Debug;
use std::time::Duration;

use serde_json::Value;

use crate::actions::Action;
use crate::error::{unsupported, PageResult};
use crate::locator::Locator;
use crate::types::{Cookie, ElementHandle, Point, Rect, WindowRect};

/// The automation driver a page object works through.
///
/// Only element lookup and the state checks used by the wait engine are
/// required. Everything else has a default that returns
/// [`PageError::Unsupported`](crate::error::PageError::Unsupported), so a
/// browser-only or an app-only backend implements just what it has.
///
/// Implementations must classify failures: zero matches from `find_element`
/// is [`PageError::NoSuchElement`](crate::error::PageError::NoSuchElement), and
/// any operation on a handle whose node has been replaced is
/// [`PageError::StaleElement`](crate::error::PageError::StaleElement).
///
/// As long as you have some struct that implements `Driver`, you can hand it to a page:
///
/// ```ignore
/// let page = Page::new(MyDriver::connect("http://localhost:4723")?);
/// ```
pub trait Driver: Debug {
    fn find_element(&self, locator: &Locator) -> PageResult<ElementHandle>;

    /// All matches, in document order. Zero matches is an empty vec, not an error.
    fn find_elements(&self, locator: &Locator) -> PageResult<Vec<ElementHandle>>;

    fn is_displayed(&self, element: &ElementHandle) -> PageResult<bool>;

    fn is_enabled(&self, element: &ElementHandle) -> PageResult<bool>;

    fn is_selected(&self, element: &ElementHandle) -> PageResult<bool>;

    fn rect(&self, element: &ElementHandle) -> PageResult<Rect>;

    fn find_child_elements(
        &self,
        _parent: &ElementHandle,
        _locator: &Locator,
    ) -> PageResult<Vec<ElementHandle>> {
        Err(unsupported("find child elements"))
    }

    fn text(&self, _element: &ElementHandle) -> PageResult<String> {
        Err(unsupported("element text"))
    }

    fn tag_name(&self, _element: &ElementHandle) -> PageResult<String> {
        Err(unsupported("element tag name"))
    }

    fn attribute(&self, _element: &ElementHandle, _name: &str) -> PageResult<Option<String>> {
        Err(unsupported("element attribute"))
    }

    fn property(&self, _element: &ElementHandle, _name: &str) -> PageResult<Option<Value>> {
        Err(unsupported("element property"))
    }

    fn css_value(&self, _element: &ElementHandle, _name: &str) -> PageResult<String> {
        Err(unsupported("element css value"))
    }

    fn click(&self, _element: &ElementHandle) -> PageResult<()> {
        Err(unsupported("element click"))
    }

    fn clear(&self, _element: &ElementHandle) -> PageResult<()> {
        Err(unsupported("element clear"))
    }

    fn send_keys(&self, _element: &ElementHandle, _keys: &str) -> PageResult<()> {
        Err(unsupported("element send keys"))
    }

    fn submit(&self, _element: &ElementHandle) -> PageResult<()> {
        Err(unsupported("element submit"))
    }

    /// Base64 encoded PNG of the element.
    fn element_screenshot(&self, _element: &ElementHandle) -> PageResult<String> {
        Err(unsupported("element screenshot"))
    }

    fn get(&self, _url: &str) -> PageResult<()> {
        Err(unsupported("navigation"))
    }

    fn current_url(&self) -> PageResult<String> {
        Err(unsupported("current url"))
    }

    fn title(&self) -> PageResult<String> {
        Err(unsupported("title"))
    }

    fn page_source(&self) -> PageResult<String> {
        Err(unsupported("page source"))
    }

    fn refresh(&self) -> PageResult<()> {
        Err(unsupported("refresh"))
    }

    fn back(&self) -> PageResult<()> {
        Err(unsupported("back"))
    }

    fn forward(&self) -> PageResult<()> {
        Err(unsupported("forward"))
    }

    fn window_rect(&self) -> PageResult<Rect> {
        Err(unsupported("window rect"))
    }

    fn set_window_rect(&self, _rect: WindowRect) -> PageResult<Rect> {
        Err(unsupported("set window rect"))
    }

    fn maximize_window(&self) -> PageResult<()> {
        Err(unsupported("maximize window"))
    }

    fn minimize_window(&self) -> PageResult<()> {
        Err(unsupported("minimize window"))
    }

    fn fullscreen_window(&self) -> PageResult<()> {
        Err(unsupported("fullscreen window"))
    }

    fn window_handles(&self) -> PageResult<Vec<String>> {
        Err(unsupported("window handles"))
    }

    fn current_window_handle(&self) -> PageResult<String> {
        Err(unsupported("current window handle"))
    }

    fn switch_to_window(&self, _handle: &str) -> PageResult<()> {
        Err(unsupported("switch to window"))
    }

    /// Close the current window.
    fn close_window(&self) -> PageResult<()> {
        Err(unsupported("close window"))
    }

    /// End the session.
    fn quit(&self) -> PageResult<()> {
        Err(unsupported("quit"))
    }

    fn switch_to_frame(&self, _frame: &ElementHandle) -> PageResult<()> {
        Err(unsupported("switch to frame"))
    }

    fn switch_to_default_content(&self) -> PageResult<()> {
        Err(unsupported("switch to default content"))
    }

    fn switch_to_parent_frame(&self) -> PageResult<()> {
        Err(unsupported("switch to parent frame"))
    }

    /// Text of the open alert; `NoSuchAlert` if there is none.
    fn alert_text(&self) -> PageResult<String> {
        Err(unsupported("alerts"))
    }

    fn accept_alert(&self) -> PageResult<()> {
        Err(unsupported("alerts"))
    }

    fn dismiss_alert(&self) -> PageResult<()> {
        Err(unsupported("alerts"))
    }

    fn execute_script(&self, _script: &str, _args: &[Value]) -> PageResult<Value> {
        Err(unsupported("execute script"))
    }

    fn cookies(&self) -> PageResult<Vec<Cookie>> {
        Err(unsupported("cookies"))
    }

    fn add_cookie(&self, _cookie: &Cookie) -> PageResult<()> {
        Err(unsupported("cookies"))
    }

    fn delete_cookie(&self, _name: &str) -> PageResult<()> {
        Err(unsupported("cookies"))
    }

    fn delete_all_cookies(&self) -> PageResult<()> {
        Err(unsupported("cookies"))
    }

    /// Base64 encoded PNG of the viewport.
    fn screenshot(&self) -> PageResult<String> {
        Err(unsupported("screenshot"))
    }

    fn set_implicit_wait(&self, _timeout: Duration) -> PageResult<()> {
        Err(unsupported("implicit wait"))
    }

    fn set_script_timeout(&self, _timeout: Duration) -> PageResult<()> {
        Err(unsupported("script timeout"))
    }

    fn set_page_load_timeout(&self, _timeout: Duration) -> PageResult<()> {
        Err(unsupported("page load timeout"))
    }

    /// Available contexts such as `NATIVE_APP` and `WEBVIEW_<id>`.
    fn contexts(&self) -> PageResult<Vec<String>> {
        Err(unsupported("contexts"))
    }

    fn current_context(&self) -> PageResult<String> {
        Err(unsupported("contexts"))
    }

    fn switch_to_context(&self, _context: &str) -> PageResult<()> {
        Err(unsupported("contexts"))
    }

    fn swipe(&self, _start: Point, _end: Point, _duration: Duration) -> PageResult<()> {
        Err(unsupported("swipe"))
    }

    fn flick(&self, _start: Point, _end: Point) -> PageResult<()> {
        Err(unsupported("flick"))
    }

    /// Tap with up to five fingers at once.
    fn tap(&self, _positions: &[Point], _duration: Option<Duration>) -> PageResult<()> {
        Err(unsupported("tap"))
    }

    fn perform_actions(&self, _actions: &[Action]) -> PageResult<()> {
        Err(unsupported("actions"))
    }

    fn release_actions(&self) -> PageResult<()> {
        Err(unsupported("actions"))
    }
}
