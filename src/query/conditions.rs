use std::fmt;

use crate::driver::Driver;
use crate::error::{no_such_element, PageError, PageResult};
use crate::locator::Locator;
use crate::query::TextMatch;
use crate::types::ElementHandle;

/// Result of evaluating a condition once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    /// The condition holds; here is the value it produced.
    Met(T),
    /// The condition holds because the element is gone.
    Absent,
    /// Not yet.
    Unmet,
}

impl<T> Probe<T> {
    fn when(met: bool, value: T) -> Self {
        if met {
            Probe::Met(value)
        } else {
            Probe::Unmet
        }
    }
}

/// A condition the wait engine can poll.
pub type Condition<T> = Box<dyn FnMut(&dyn Driver) -> PageResult<Probe<T>>>;

/// The element states a wait can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementState {
    Present,
    Visible,
    Invisible,
    Clickable,
    Unclickable,
    Selected,
    Unselected,
}

impl ElementState {
    pub fn name(&self) -> &'static str {
        match self {
            ElementState::Present => "present",
            ElementState::Visible => "visible",
            ElementState::Invisible => "invisible",
            ElementState::Clickable => "clickable",
            ElementState::Unclickable => "unclickable",
            ElementState::Selected => "selected",
            ElementState::Unselected => "unselected",
        }
    }

    /// Only invisible and unclickable may be satisfied by absence.
    pub fn accepts_absence(&self) -> bool {
        matches!(self, ElementState::Invisible | ElementState::Unclickable)
    }
}

impl fmt::Display for ElementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Look up one element: the single match, or match `index` of all matches.
///
/// An index past the end is reported as not-found, never as a separate error.
pub fn resolve(
    driver: &dyn Driver,
    locator: &Locator,
    index: Option<usize>,
) -> PageResult<ElementHandle> {
    match index {
        None => driver.find_element(locator),
        Some(i) => driver.find_elements(locator)?.into_iter().nth(i).ok_or_else(|| {
            no_such_element(&format!("no element at index {} for {}", i, locator))
        }),
    }
}

/// All matches of `locator`; zero matches is not-found.
pub fn resolve_all(driver: &dyn Driver, locator: &Locator) -> PageResult<Vec<ElementHandle>> {
    let handles = driver.find_elements(locator)?;
    if handles.is_empty() {
        return Err(no_such_element(&format!("no elements match {}", locator)));
    }
    Ok(handles)
}

/// Evaluate `state` on an already resolved handle.
pub fn check_state(
    driver: &dyn Driver,
    handle: &ElementHandle,
    state: ElementState,
) -> PageResult<bool> {
    Ok(match state {
        ElementState::Present => true,
        ElementState::Visible => driver.is_displayed(handle)?,
        ElementState::Invisible => !driver.is_displayed(handle)?,
        ElementState::Clickable => driver.is_displayed(handle)? && driver.is_enabled(handle)?,
        ElementState::Unclickable => !(driver.is_displayed(handle)? && driver.is_enabled(handle)?),
        ElementState::Selected => driver.is_selected(handle)?,
        ElementState::Unselected => !driver.is_selected(handle)?,
    })
}

fn is_gone(err: &PageError) -> bool {
    err.is_not_found() || err.is_stale()
}

/// The element located by `locator`/`index` is in `state`.
///
/// With `tolerate_absence` an invisible/unclickable condition is also
/// satisfied when the element cannot be found or went stale mid-check.
pub fn element_in_state(
    locator: Locator,
    index: Option<usize>,
    state: ElementState,
    tolerate_absence: bool,
) -> Condition<ElementHandle> {
    let tolerate = tolerate_absence && state.accepts_absence();
    Box::new(move |driver| {
        let checked = resolve(driver, &locator, index)
            .and_then(|handle| check_state(driver, &handle, state).map(|met| (handle, met)));
        match checked {
            Ok((handle, met)) => Ok(Probe::when(met, handle)),
            Err(e) if tolerate && is_gone(&e) => Ok(Probe::Absent),
            Err(e) => Err(e),
        }
    })
}

/// The element located by `locator`/`index` cannot be found.
pub fn element_absent(locator: Locator, index: Option<usize>) -> Condition<()> {
    Box::new(move |driver| match resolve(driver, &locator, index) {
        Ok(_) => Ok(Probe::Unmet),
        Err(e) if e.is_not_found() => Ok(Probe::Met(())),
        Err(e) => Err(e),
    })
}

/// A cached handle is in `state`. Stale failures propagate to the caller.
pub fn handle_in_state(handle: ElementHandle, state: ElementState) -> Condition<ElementHandle> {
    Box::new(move |driver| {
        let met = check_state(driver, &handle, state)?;
        Ok(Probe::when(met, handle.clone()))
    })
}

/// The element's visible text satisfies `expected`.
pub fn element_text(
    locator: Locator,
    index: Option<usize>,
    expected: TextMatch,
) -> Condition<String> {
    Box::new(move |driver| {
        let handle = resolve(driver, &locator, index)?;
        let text = driver.text(&handle)?;
        let met = expected.is_match(&text);
        Ok(Probe::when(met, text))
    })
}

/// Locate a frame element and switch into it.
pub fn frame_available(locator: Locator, index: Option<usize>) -> Condition<()> {
    Box::new(move |driver| {
        let frame = resolve(driver, &locator, index)?;
        match driver.switch_to_frame(&frame) {
            Ok(()) => Ok(Probe::Met(())),
            Err(PageError::NoSuchFrame(_)) => Ok(Probe::Unmet),
            Err(e) => Err(e),
        }
    })
}

/// At least one element matches.
pub fn all_present(locator: Locator) -> Condition<Vec<ElementHandle>> {
    Box::new(move |driver| {
        let handles = driver.find_elements(&locator)?;
        let met = !handles.is_empty();
        Ok(Probe::when(met, handles))
    })
}

/// No element matches.
pub fn all_absent(locator: Locator) -> Condition<()> {
    Box::new(move |driver| Ok(Probe::when(driver.find_elements(&locator)?.is_empty(), ())))
}

/// The visible subset of the matches, once it is non-empty.
pub fn any_visible(locator: Locator) -> Condition<Vec<ElementHandle>> {
    Box::new(move |driver| {
        let mut visible = Vec::new();
        for handle in resolve_all(driver, &locator)? {
            if driver.is_displayed(&handle)? {
                visible.push(handle);
            }
        }
        let met = !visible.is_empty();
        Ok(Probe::when(met, visible))
    })
}

/// Every match is visible.
pub fn all_visible(locator: Locator) -> Condition<Vec<ElementHandle>> {
    Box::new(move |driver| {
        let handles = resolve_all(driver, &locator)?;
        for handle in &handles {
            if !driver.is_displayed(handle)? {
                return Ok(Probe::Unmet);
            }
        }
        Ok(Probe::Met(handles))
    })
}

/// No match is visible. Zero matches counts only with `tolerate_absence`.
pub fn all_invisible(locator: Locator, tolerate_absence: bool) -> Condition<Vec<ElementHandle>> {
    Box::new(move |driver| {
        let handles = driver.find_elements(&locator)?;
        if handles.is_empty() {
            return Ok(if tolerate_absence { Probe::Absent } else { Probe::Unmet });
        }
        for handle in &handles {
            if driver.is_displayed(handle)? {
                return Ok(Probe::Unmet);
            }
        }
        Ok(Probe::Met(handles))
    })
}

/// The invisible subset of the matches, once it is non-empty. Zero matches
/// counts only with `tolerate_absence`.
pub fn any_invisible(locator: Locator, tolerate_absence: bool) -> Condition<Vec<ElementHandle>> {
    Box::new(move |driver| {
        let handles = driver.find_elements(&locator)?;
        if handles.is_empty() {
            return Ok(if tolerate_absence { Probe::Absent } else { Probe::Unmet });
        }
        let mut hidden = Vec::new();
        for handle in handles {
            if !driver.is_displayed(&handle)? {
                hidden.push(handle);
            }
        }
        let met = !hidden.is_empty();
        Ok(Probe::when(met, hidden))
    })
}

/// The current url satisfies `expected`.
pub fn url_matches(expected: TextMatch) -> Condition<String> {
    Box::new(move |driver| {
        let url = driver.current_url()?;
        let met = expected.is_match(&url);
        Ok(Probe::when(met, url))
    })
}

/// The current url differs from `previous`.
pub fn url_changes(previous: String) -> Condition<String> {
    Box::new(move |driver| {
        let url = driver.current_url()?;
        let met = url != previous;
        Ok(Probe::when(met, url))
    })
}

pub fn title_matches(expected: TextMatch) -> Condition<String> {
    Box::new(move |driver| {
        let title = driver.title()?;
        let met = expected.is_match(&title);
        Ok(Probe::when(met, title))
    })
}

pub fn number_of_windows(count: usize) -> Condition<Vec<String>> {
    Box::new(move |driver| {
        let handles = driver.window_handles()?;
        let met = handles.len() == count;
        Ok(Probe::when(met, handles))
    })
}

/// A window not in `known` has opened; yields its handle.
pub fn new_window(known: Vec<String>) -> Condition<String> {
    Box::new(move |driver| {
        let opened = driver.window_handles()?.into_iter().find(|h| !known.contains(h));
        Ok(opened.map_or(Probe::Unmet, Probe::Met))
    })
}

/// An alert is open; yields its text.
pub fn alert_present() -> Condition<String> {
    Box::new(|driver| match driver.alert_text() {
        Ok(text) => Ok(Probe::Met(text)),
        Err(PageError::NoSuchAlert(_)) => Ok(Probe::Unmet),
        Err(e) => Err(e),
    })
}

/// A `WEBVIEW` context exists. With `switch`, move into the context at
/// `index` (default: the last one). Yields all contexts.
pub fn webview_present(switch: bool, index: Option<usize>) -> Condition<Vec<String>> {
    Box::new(move |driver| {
        let contexts = driver.contexts()?;
        if !contexts.iter().any(|c| c.contains("WEBVIEW")) {
            return Ok(Probe::Unmet);
        }
        if switch {
            let target = match index {
                Some(i) => contexts.get(i),
                None => contexts.last(),
            };
            match target {
                Some(context) => driver.switch_to_context(context)?,
                None => return Ok(Probe::Unmet),
            }
        }
        Ok(Probe::Met(contexts))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::{MockDriver, MockNode};
    use crate::types::Rect;

    fn rows(driver: &MockDriver, count: usize) {
        for i in 0..count {
            driver.add(
                MockNode::new(Locator::class_name("row"))
                    .rect(Rect::new(0.0, i as f64 * 40.0, 100.0, 40.0)),
            );
        }
    }

    #[test]
    fn index_out_of_range_is_not_found() {
        let driver = MockDriver::new();
        rows(&driver, 3);
        assert!(resolve(&driver, &Locator::class_name("row"), Some(2)).is_ok());
        let err = resolve(&driver, &Locator::class_name("row"), Some(5)).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn inverse_states_tolerate_absence_only_when_asked() {
        let driver = MockDriver::new();
        let mut strict = element_in_state(Locator::id("ghost"), None, ElementState::Invisible, false);
        assert!(strict(&driver).unwrap_err().is_not_found());
        let mut lenient = element_in_state(Locator::id("ghost"), None, ElementState::Invisible, true);
        assert_eq!(lenient(&driver).unwrap(), Probe::Absent);
        let mut selected = element_in_state(Locator::id("ghost"), None, ElementState::Unselected, true);
        assert!(selected(&driver).unwrap_err().is_not_found());
    }

    #[test]
    fn clickable_needs_visible_and_enabled() {
        let driver = MockDriver::new();
        driver.add(MockNode::new(Locator::id("save")).disabled());
        let mut clickable = element_in_state(Locator::id("save"), None, ElementState::Clickable, false);
        assert_eq!(clickable(&driver).unwrap(), Probe::Unmet);
        let mut unclickable =
            element_in_state(Locator::id("save"), None, ElementState::Unclickable, false);
        assert!(matches!(unclickable(&driver).unwrap(), Probe::Met(_)));
    }

    #[test]
    fn list_conditions() {
        let driver = MockDriver::new();
        rows(&driver, 2);
        driver.add(MockNode::new(Locator::class_name("row")).hidden());
        let row = || Locator::class_name("row");

        match any_visible(row())(&driver).unwrap() {
            Probe::Met(visible) => assert_eq!(visible.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(all_visible(row())(&driver).unwrap(), Probe::Unmet);
        assert_eq!(all_invisible(row(), true)(&driver).unwrap(), Probe::Unmet);
        match any_invisible(row(), false)(&driver).unwrap() {
            Probe::Met(hidden) => assert_eq!(hidden.len(), 1),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(all_invisible(Locator::id("none"), true)(&driver).unwrap(), Probe::Absent);
        assert_eq!(any_invisible(Locator::id("none"), false)(&driver).unwrap(), Probe::Unmet);
        assert_eq!(all_absent(Locator::id("none"))(&driver).unwrap(), Probe::Met(()));
    }

    #[test]
    fn webview_switches_to_last_context_by_default() {
        let driver = MockDriver::new();
        driver.with_page(|page| {
            page.contexts = vec!["NATIVE_APP".into(), "WEBVIEW_1".into(), "WEBVIEW_2".into()]
        });
        assert!(matches!(webview_present(true, None)(&driver).unwrap(), Probe::Met(_)));
        assert_eq!(driver.current_context().unwrap(), "WEBVIEW_2");
    }

    #[test]
    fn alert_absence_is_unmet() {
        let driver = MockDriver::new();
        assert_eq!(alert_present()(&driver).unwrap(), Probe::Unmet);
        driver.with_page(|page| page.alert = Some("Saved".into()));
        assert_eq!(alert_present()(&driver).unwrap(), Probe::Met("Saved".to_string()));
    }
}
