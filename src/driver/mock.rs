use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::actions::Action;
use crate::driver::Driver;
use crate::error::{no_such_element, PageError, PageResult};
use crate::locator::Locator;
use crate::types::{Cookie, ElementHandle, Point, Rect, WindowRect};

/// In-memory driver for exercising page objects without a browser.
///
/// Elements are registered up front as [`MockNode`]s with the locators they
/// answer to and a timeline (appear / vanish). Handles carry a generation, so
/// [`MockDriver::invalidate`] turns every outstanding handle for a node stale,
/// the same way a re-render does in a real session.
///
/// ```
/// use pageobject_sync::driver::mock::{MockDriver, MockNode};
/// use pageobject_sync::prelude::*;
/// use std::time::Duration;
///
/// let driver = MockDriver::new();
/// driver.add(MockNode::new(Locator::id("submit")).appears_after(Duration::from_millis(50)));
/// let page = Page::new(driver);
/// let submit = Element::new(By::Id, "submit");
/// assert!(submit.bind(&page).timeout(Duration::from_secs(1)).wait_present()?.is_found());
/// # Ok::<(), PageError>(())
/// ```
pub struct MockDriver {
    started: Instant,
    state: Mutex<MockState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// One element of the mock tree.
#[derive(Debug, Clone)]
pub struct MockNode {
    locators: Vec<Locator>,
    parent: Option<NodeId>,
    appears_after: Duration,
    vanishes_after: Option<Duration>,
    removed: bool,
    generation: u32,
    pub displayed: bool,
    pub enabled: bool,
    pub selected: bool,
    /// Clicking toggles `selected`, like a checkbox or a multi-select option.
    pub checkable: bool,
    /// The node moves with swipes and only counts as displayed inside the window.
    pub scrolls: bool,
    pub frame: bool,
    pub rect: Rect,
    pub text: String,
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub properties: BTreeMap<String, Value>,
    pub css: BTreeMap<String, String>,
    /// Everything typed into the node since the last clear.
    pub typed: String,
    pub clicks: u32,
    pub submits: u32,
}

impl MockNode {
    pub fn new(locator: Locator) -> Self {
        MockNode {
            locators: vec![locator],
            parent: None,
            appears_after: Duration::ZERO,
            vanishes_after: None,
            removed: false,
            generation: 0,
            displayed: true,
            enabled: true,
            selected: false,
            checkable: false,
            scrolls: false,
            frame: false,
            rect: Rect::new(0.0, 0.0, 100.0, 40.0),
            text: String::new(),
            tag: "div".to_string(),
            attributes: BTreeMap::new(),
            properties: BTreeMap::new(),
            css: BTreeMap::new(),
            typed: String::new(),
            clicks: 0,
            submits: 0,
        }
    }

    /// Also answer to `locator`.
    pub fn matches(mut self, locator: Locator) -> Self {
        self.locators.push(locator);
        self
    }

    pub fn child_of(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn appears_after(mut self, delay: Duration) -> Self {
        self.appears_after = delay;
        self
    }

    pub fn vanishes_after(mut self, delay: Duration) -> Self {
        self.vanishes_after = Some(delay);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn checkable(mut self) -> Self {
        self.checkable = true;
        self
    }

    pub fn scrolls(mut self) -> Self {
        self.scrolls = true;
        self
    }

    pub fn frame(mut self) -> Self {
        self.frame = true;
        self
    }

    pub fn rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    pub fn css(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.css.insert(name.into(), value.into());
        self
    }
}

/// Page level state of the mock session.
#[derive(Debug, Clone)]
pub struct MockPage {
    pub url: String,
    pub title: String,
    pub source: String,
    pub history: Vec<String>,
    pub window_rect: Rect,
    pub windows: Vec<String>,
    pub current_window: usize,
    pub contexts: Vec<String>,
    pub current_context: String,
    pub alert: Option<String>,
    pub cookies: Vec<Cookie>,
    pub script_result: Value,
    pub screenshot: Vec<u8>,
    pub frame: Option<ElementHandle>,
    pub implicit_wait: Option<Duration>,
    pub script_timeout: Option<Duration>,
    pub page_load_timeout: Option<Duration>,
    pub quit: bool,
}

impl Default for MockPage {
    fn default() -> Self {
        MockPage {
            url: "about:blank".to_string(),
            title: String::new(),
            source: String::new(),
            history: Vec::new(),
            window_rect: Rect::new(0.0, 0.0, 1000.0, 2000.0),
            windows: vec!["main".to_string()],
            current_window: 0,
            contexts: vec!["NATIVE_APP".to_string()],
            current_context: "NATIVE_APP".to_string(),
            alert: None,
            cookies: Vec::new(),
            script_result: Value::Null,
            screenshot: Vec::new(),
            frame: None,
            implicit_wait: None,
            script_timeout: None,
            page_load_timeout: None,
            quit: false,
        }
    }
}

/// A recorded gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gesture {
    pub start: Point,
    pub end: Point,
    pub duration: Option<Duration>,
}

type Scheduled = Box<dyn FnOnce(&mut MockState) + Send>;

/// Everything the mock knows. Reachable from [`MockDriver::after`] callbacks.
pub struct MockState {
    nodes: Vec<MockNode>,
    elapsed: Duration,
    pending: Vec<(Duration, Scheduled)>,
    pub page: MockPage,
    pub swipes: Vec<Gesture>,
    pub flicks: Vec<Gesture>,
    pub taps: Vec<Vec<Point>>,
    pub performed: Vec<Action>,
    pub scripts: Vec<(String, Vec<Value>)>,
    pub lookups: usize,
}

impl fmt::Debug for MockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockState")
            .field("nodes", &self.nodes)
            .field("pending", &self.pending.len())
            .field("page", &self.page)
            .finish()
    }
}

impl MockState {
    pub fn node_mut(&mut self, id: NodeId) -> &mut MockNode {
        &mut self.nodes[id.0]
    }

    /// Replace the node's rendering: every handle obtained so far becomes stale.
    pub fn invalidate(&mut self, id: NodeId) {
        self.nodes[id.0].generation += 1;
    }

    pub fn remove(&mut self, id: NodeId) {
        let node = &mut self.nodes[id.0];
        node.removed = true;
        node.generation += 1;
    }

    fn is_present(&self, index: usize) -> bool {
        let node = &self.nodes[index];
        let alive = !node.removed
            && self.elapsed >= node.appears_after
            && node.vanishes_after.map_or(true, |v| self.elapsed < v);
        alive && node.parent.map_or(true, |p| self.is_present(p.0))
    }

    fn handle_for(&self, index: usize) -> ElementHandle {
        ElementHandle::new(format!("mock-{}-{}", index, self.nodes[index].generation))
    }

    fn matching(&self, locator: &Locator, parent: Option<NodeId>) -> Vec<ElementHandle> {
        (0..self.nodes.len())
            .filter(|&i| self.is_present(i))
            .filter(|&i| parent.map_or(true, |p| self.nodes[i].parent == Some(p)))
            .filter(|&i| self.nodes[i].locators.contains(locator))
            .map(|i| self.handle_for(i))
            .collect()
    }

    fn resolve(&self, handle: &ElementHandle) -> PageResult<usize> {
        let stale = || PageError::StaleElement(format!("{} is no longer attached", handle));
        let mut parts = handle.id().strip_prefix("mock-").ok_or_else(stale)?.split('-');
        let index: usize =
            parts.next().and_then(|p| p.parse().ok()).ok_or_else(stale)?;
        let generation: u32 =
            parts.next().and_then(|p| p.parse().ok()).ok_or_else(stale)?;
        match self.nodes.get(index) {
            Some(node) if node.generation == generation && self.is_present(index) => Ok(index),
            _ => Err(stale()),
        }
    }

    fn node(&self, handle: &ElementHandle) -> PageResult<&MockNode> {
        let index = self.resolve(handle)?;
        Ok(&self.nodes[index])
    }

    fn node_for_update(&mut self, handle: &ElementHandle) -> PageResult<&mut MockNode> {
        let index = self.resolve(handle)?;
        Ok(&mut self.nodes[index])
    }

    fn displayed(&self, node: &MockNode) -> bool {
        if !node.displayed {
            return false;
        }
        if !node.scrolls {
            return true;
        }
        let window = self.page.window_rect.border();
        let own = node.rect.border();
        own.top < window.bottom
            && own.bottom > window.top
            && own.left < window.right
            && own.right > window.left
    }

    fn scroll(&mut self, start: Point, end: Point) {
        let dx = (end.x - start.x) as f64;
        let dy = (end.y - start.y) as f64;
        for node in self.nodes.iter_mut().filter(|n| n.scrolls) {
            node.rect.x += dx;
            node.rect.y += dy;
        }
    }
}

impl MockDriver {
    pub fn new() -> Self {
        MockDriver {
            started: Instant::now(),
            state: Mutex::new(MockState {
                nodes: Vec::new(),
                elapsed: Duration::ZERO,
                pending: Vec::new(),
                page: MockPage::default(),
                swipes: Vec::new(),
                flicks: Vec::new(),
                taps: Vec::new(),
                performed: Vec::new(),
                scripts: Vec::new(),
                lookups: 0,
            }),
        }
    }

    /// Lock the state with the clock advanced and due callbacks applied.
    fn state(&self) -> MutexGuard<'_, MockState> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.elapsed = self.started.elapsed();
        let now = state.elapsed;
        if state.pending.iter().any(|(at, _)| *at <= now) {
            let pending = std::mem::take(&mut state.pending);
            let (due, later): (Vec<_>, Vec<_>) = pending.into_iter().partition(|(at, _)| *at <= now);
            state.pending = later;
            for (_, callback) in due {
                callback(&mut state);
            }
        }
        state
    }

    pub fn add(&self, node: MockNode) -> NodeId {
        let mut state = self.state();
        state.nodes.push(node);
        NodeId(state.nodes.len() - 1)
    }

    /// Run `callback` against the state once `delay` has passed since the mock was created.
    pub fn after<F>(&self, delay: Duration, callback: F)
    where
        F: FnOnce(&mut MockState) + Send + 'static,
    {
        self.state().pending.push((delay, Box::new(callback)));
    }

    pub fn update<F>(&self, id: NodeId, f: F)
    where
        F: FnOnce(&mut MockNode),
    {
        f(self.state().node_mut(id));
    }

    pub fn invalidate(&self, id: NodeId) {
        self.state().invalidate(id);
    }

    pub fn remove(&self, id: NodeId) {
        self.state().remove(id);
    }

    /// Snapshot of a node, for assertions.
    pub fn node(&self, id: NodeId) -> MockNode {
        self.state().nodes[id.0].clone()
    }

    pub fn with_page<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&mut MockPage) -> T,
    {
        f(&mut self.state().page)
    }

    pub fn swipes(&self) -> Vec<Gesture> {
        self.state().swipes.clone()
    }

    pub fn flicks(&self) -> Vec<Gesture> {
        self.state().flicks.clone()
    }

    pub fn taps(&self) -> Vec<Vec<Point>> {
        self.state().taps.clone()
    }

    pub fn performed_actions(&self) -> Vec<Action> {
        self.state().performed.clone()
    }

    pub fn scripts(&self) -> Vec<(String, Vec<Value>)> {
        self.state().scripts.clone()
    }

    /// Number of `find_element` / `find_elements` calls served so far.
    pub fn lookups(&self) -> usize {
        self.state().lookups
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MockDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockDriver").field("started", &self.started).finish()
    }
}

impl Driver for MockDriver {
    fn find_element(&self, locator: &Locator) -> PageResult<ElementHandle> {
        let mut state = self.state();
        state.lookups += 1;
        state
            .matching(locator, None)
            .into_iter()
            .next()
            .ok_or_else(|| no_such_element(&format!("no element matches {}", locator)))
    }

    fn find_elements(&self, locator: &Locator) -> PageResult<Vec<ElementHandle>> {
        let mut state = self.state();
        state.lookups += 1;
        Ok(state.matching(locator, None))
    }

    fn is_displayed(&self, element: &ElementHandle) -> PageResult<bool> {
        let state = self.state();
        let node = state.node(element)?;
        Ok(state.displayed(node))
    }

    fn is_enabled(&self, element: &ElementHandle) -> PageResult<bool> {
        Ok(self.state().node(element)?.enabled)
    }

    fn is_selected(&self, element: &ElementHandle) -> PageResult<bool> {
        Ok(self.state().node(element)?.selected)
    }

    fn rect(&self, element: &ElementHandle) -> PageResult<Rect> {
        Ok(self.state().node(element)?.rect)
    }

    fn find_child_elements(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> PageResult<Vec<ElementHandle>> {
        let state = self.state();
        let parent = NodeId(state.resolve(parent)?);
        Ok(state.matching(locator, Some(parent)))
    }

    fn text(&self, element: &ElementHandle) -> PageResult<String> {
        let state = self.state();
        let node = state.node(element)?;
        Ok(if state.displayed(node) { node.text.clone() } else { String::new() })
    }

    fn tag_name(&self, element: &ElementHandle) -> PageResult<String> {
        Ok(self.state().node(element)?.tag.clone())
    }

    fn attribute(&self, element: &ElementHandle, name: &str) -> PageResult<Option<String>> {
        let state = self.state();
        let node = state.node(element)?;
        if name == "value" && !node.typed.is_empty() {
            return Ok(Some(node.typed.clone()));
        }
        Ok(node.attributes.get(name).cloned())
    }

    fn property(&self, element: &ElementHandle, name: &str) -> PageResult<Option<Value>> {
        Ok(self.state().node(element)?.properties.get(name).cloned())
    }

    fn css_value(&self, element: &ElementHandle, name: &str) -> PageResult<String> {
        Ok(self.state().node(element)?.css.get(name).cloned().unwrap_or_default())
    }

    fn click(&self, element: &ElementHandle) -> PageResult<()> {
        let mut state = self.state();
        let index = state.resolve(element)?;
        if !state.displayed(&state.nodes[index]) || !state.nodes[index].enabled {
            return Err(PageError::ElementNotInteractable(element.to_string()));
        }
        let node = &mut state.nodes[index];
        node.clicks += 1;
        if node.checkable {
            node.selected = !node.selected;
        }
        Ok(())
    }

    fn clear(&self, element: &ElementHandle) -> PageResult<()> {
        self.state().node_for_update(element)?.typed.clear();
        Ok(())
    }

    fn send_keys(&self, element: &ElementHandle, keys: &str) -> PageResult<()> {
        self.state().node_for_update(element)?.typed.push_str(keys);
        Ok(())
    }

    fn submit(&self, element: &ElementHandle) -> PageResult<()> {
        self.state().node_for_update(element)?.submits += 1;
        Ok(())
    }

    fn element_screenshot(&self, element: &ElementHandle) -> PageResult<String> {
        let state = self.state();
        state.node(element)?;
        Ok(base64::encode(&state.page.screenshot))
    }

    fn get(&self, url: &str) -> PageResult<()> {
        let mut state = self.state();
        let previous = std::mem::replace(&mut state.page.url, url.to_string());
        state.page.history.push(previous);
        Ok(())
    }

    fn current_url(&self) -> PageResult<String> {
        Ok(self.state().page.url.clone())
    }

    fn title(&self) -> PageResult<String> {
        Ok(self.state().page.title.clone())
    }

    fn page_source(&self) -> PageResult<String> {
        Ok(self.state().page.source.clone())
    }

    fn refresh(&self) -> PageResult<()> {
        Ok(())
    }

    fn back(&self) -> PageResult<()> {
        let mut state = self.state();
        if let Some(url) = state.page.history.pop() {
            state.page.url = url;
        }
        Ok(())
    }

    fn forward(&self) -> PageResult<()> {
        Ok(())
    }

    fn window_rect(&self) -> PageResult<Rect> {
        Ok(self.state().page.window_rect)
    }

    fn set_window_rect(&self, rect: WindowRect) -> PageResult<Rect> {
        let mut state = self.state();
        let current = &mut state.page.window_rect;
        if let Some(x) = rect.x {
            current.x = x as f64;
        }
        if let Some(y) = rect.y {
            current.y = y as f64;
        }
        if let Some(width) = rect.width {
            current.width = width as f64;
        }
        if let Some(height) = rect.height {
            current.height = height as f64;
        }
        Ok(*current)
    }

    fn maximize_window(&self) -> PageResult<()> {
        self.state().page.window_rect = Rect::new(0.0, 0.0, 1920.0, 1080.0);
        Ok(())
    }

    fn minimize_window(&self) -> PageResult<()> {
        Ok(())
    }

    fn fullscreen_window(&self) -> PageResult<()> {
        self.maximize_window()
    }

    fn window_handles(&self) -> PageResult<Vec<String>> {
        Ok(self.state().page.windows.clone())
    }

    fn current_window_handle(&self) -> PageResult<String> {
        let state = self.state();
        state
            .page
            .windows
            .get(state.page.current_window)
            .cloned()
            .ok_or_else(|| PageError::NoSuchWindow("current window is closed".to_string()))
    }

    fn switch_to_window(&self, handle: &str) -> PageResult<()> {
        let mut state = self.state();
        let index = state
            .page
            .windows
            .iter()
            .position(|w| w == handle)
            .ok_or_else(|| PageError::NoSuchWindow(handle.to_string()))?;
        state.page.current_window = index;
        Ok(())
    }

    fn close_window(&self) -> PageResult<()> {
        let mut state = self.state();
        let current = state.page.current_window;
        if current >= state.page.windows.len() {
            return Err(PageError::NoSuchWindow("current window is closed".to_string()));
        }
        state.page.windows.remove(current);
        Ok(())
    }

    fn quit(&self) -> PageResult<()> {
        self.state().page.quit = true;
        Ok(())
    }

    fn switch_to_frame(&self, frame: &ElementHandle) -> PageResult<()> {
        let mut state = self.state();
        if !state.node(frame)?.frame {
            return Err(PageError::NoSuchFrame(frame.to_string()));
        }
        state.page.frame = Some(frame.clone());
        Ok(())
    }

    fn switch_to_default_content(&self) -> PageResult<()> {
        self.state().page.frame = None;
        Ok(())
    }

    fn switch_to_parent_frame(&self) -> PageResult<()> {
        self.state().page.frame = None;
        Ok(())
    }

    fn alert_text(&self) -> PageResult<String> {
        self.state()
            .page
            .alert
            .clone()
            .ok_or_else(|| PageError::NoSuchAlert("no alert is open".to_string()))
    }

    fn accept_alert(&self) -> PageResult<()> {
        self.state()
            .page
            .alert
            .take()
            .map(|_| ())
            .ok_or_else(|| PageError::NoSuchAlert("no alert is open".to_string()))
    }

    fn dismiss_alert(&self) -> PageResult<()> {
        self.accept_alert()
    }

    fn execute_script(&self, script: &str, args: &[Value]) -> PageResult<Value> {
        let mut state = self.state();
        state.scripts.push((script.to_string(), args.to_vec()));
        Ok(state.page.script_result.clone())
    }

    fn cookies(&self) -> PageResult<Vec<Cookie>> {
        Ok(self.state().page.cookies.clone())
    }

    fn add_cookie(&self, cookie: &Cookie) -> PageResult<()> {
        let mut state = self.state();
        state.page.cookies.retain(|c| c.name != cookie.name);
        state.page.cookies.push(cookie.clone());
        Ok(())
    }

    fn delete_cookie(&self, name: &str) -> PageResult<()> {
        self.state().page.cookies.retain(|c| c.name != name);
        Ok(())
    }

    fn delete_all_cookies(&self) -> PageResult<()> {
        self.state().page.cookies.clear();
        Ok(())
    }

    fn screenshot(&self) -> PageResult<String> {
        Ok(base64::encode(&self.state().page.screenshot))
    }

    fn set_implicit_wait(&self, timeout: Duration) -> PageResult<()> {
        self.state().page.implicit_wait = Some(timeout);
        Ok(())
    }

    fn set_script_timeout(&self, timeout: Duration) -> PageResult<()> {
        self.state().page.script_timeout = Some(timeout);
        Ok(())
    }

    fn set_page_load_timeout(&self, timeout: Duration) -> PageResult<()> {
        self.state().page.page_load_timeout = Some(timeout);
        Ok(())
    }

    fn contexts(&self) -> PageResult<Vec<String>> {
        Ok(self.state().page.contexts.clone())
    }

    fn current_context(&self) -> PageResult<String> {
        Ok(self.state().page.current_context.clone())
    }

    fn switch_to_context(&self, context: &str) -> PageResult<()> {
        let mut state = self.state();
        if !state.page.contexts.iter().any(|c| c == context) {
            return Err(PageError::Driver(format!("no such context: {}", context)));
        }
        state.page.current_context = context.to_string();
        Ok(())
    }

    fn swipe(&self, start: Point, end: Point, duration: Duration) -> PageResult<()> {
        let mut state = self.state();
        state.swipes.push(Gesture {
            start,
            end,
            duration: Some(duration),
        });
        state.scroll(start, end);
        Ok(())
    }

    fn flick(&self, start: Point, end: Point) -> PageResult<()> {
        let mut state = self.state();
        state.flicks.push(Gesture {
            start,
            end,
            duration: None,
        });
        state.scroll(start, end);
        Ok(())
    }

    fn tap(&self, positions: &[Point], _duration: Option<Duration>) -> PageResult<()> {
        self.state().taps.push(positions.to_vec());
        Ok(())
    }

    fn perform_actions(&self, actions: &[Action]) -> PageResult<()> {
        let mut state = self.state();
        for action in actions {
            let target = match action {
                Action::Click(Some(h))
                | Action::DoubleClick(Some(h))
                | Action::ContextClick(Some(h))
                | Action::ClickAndHold(Some(h))
                | Action::Release(Some(h))
                | Action::ScrollToElement(h) => Some(h),
                Action::MoveToElement {
                    element,
                    ..
                }
                | Action::ScrollFromElement {
                    element,
                    ..
                } => Some(element),
                Action::KeyDown {
                    element,
                    ..
                }
                | Action::KeyUp {
                    element,
                    ..
                }
                | Action::SendKeys {
                    element,
                    ..
                } => element.as_ref(),
                _ => None,
            };
            if let Some(handle) = target {
                state.resolve(handle)?;
            }
        }
        state.performed.extend_from_slice(actions);
        Ok(())
    }

    fn release_actions(&self) -> PageResult<()> {
        Ok(())
    }
}
