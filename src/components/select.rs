// This wrapper is a fairly direct port of the Select class from the python
// selenium library at:
// https://github.com/SeleniumHQ/selenium/blob/trunk/py/selenium/webdriver/support/select.py

// Copyright 2021 Stephen Pryde and the thirtyfour_sync contributors
// Derived (and modified) from the Selenium project at https://github.com/SeleniumHQ/selenium.
//
// Copyright 2011-2020 Software Freedom Conservancy
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::driver::Driver;
use crate::error::{no_such_element, PageError, PageResult};
use crate::locator::Locator;
use crate::query::TextMatch;
use crate::types::ElementHandle;

/// Convenience wrapper for `<select>` elements.
///
/// Options are the `option` children of the select. They are compared in
/// process, so any driver that can list children and read attributes and
/// text supports it.
#[derive(Debug, Clone)]
pub struct SelectElement<'a> {
    driver: &'a dyn Driver,
    element: ElementHandle,
    multiple: bool,
}

/// Whitespace-normalised text, the way `normalize-space()` sees it.
fn normalize_space(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl<'a> SelectElement<'a> {
    /// Wrap `element`, which must be a `<select>` element.
    pub fn new(driver: &'a dyn Driver, element: ElementHandle) -> PageResult<SelectElement<'a>> {
        let multiple = driver.attribute(&element, "multiple")?.filter(|x| x != "false").is_some();
        Ok(SelectElement {
            driver,
            element,
            multiple,
        })
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// Set the selection state of `option`.
    fn set_selected(&self, option: &ElementHandle, select: bool) -> PageResult<()> {
        if self.driver.is_selected(option)? != select {
            self.driver.click(option)?;
        }
        Ok(())
    }

    fn require_multiple(&self, what: &str) -> PageResult<()> {
        if self.multiple {
            Ok(())
        } else {
            Err(PageError::Unsupported(format!("You may only {} of a multi-select", what)))
        }
    }

    /// Return a vec of all options belonging to this select tag.
    pub fn options(&self) -> PageResult<Vec<ElementHandle>> {
        self.driver.find_child_elements(&self.element, &Locator::tag("option"))
    }

    /// Return a vec of all selected options belonging to this select tag.
    pub fn all_selected_options(&self) -> PageResult<Vec<ElementHandle>> {
        let mut selected = Vec::new();
        for option in self.options()? {
            if self.driver.is_selected(&option)? {
                selected.push(option);
            }
        }
        Ok(selected)
    }

    /// Return the first selected option in this select tag.
    pub fn first_selected_option(&self) -> PageResult<ElementHandle> {
        for option in self.options()? {
            if self.driver.is_selected(&option)? {
                return Ok(option);
            }
        }
        Err(no_such_element("No options are selected"))
    }

    fn set_selection_all(&self, select: bool) -> PageResult<()> {
        for option in self.options()? {
            self.set_selected(&option, select)?;
        }
        Ok(())
    }

    /// Set the selection state of every option accepted by `accept`; only the
    /// first one for a single select.
    fn set_selection_where<F>(&self, select: bool, describe: &str, mut accept: F) -> PageResult<()>
    where
        F: FnMut(&ElementHandle) -> PageResult<bool>,
    {
        let mut matched = false;
        for option in self.options()? {
            if accept(&option)? {
                self.set_selected(&option, select)?;
                matched = true;
                if !self.multiple {
                    break;
                }
            }
        }
        if matched {
            Ok(())
        } else {
            Err(no_such_element(&format!("Could not locate option {}", describe)))
        }
    }

    fn set_selection_by_value(&self, value: &str, select: bool) -> PageResult<()> {
        self.set_selection_where(select, &format!("with value {:?}", value), |option| {
            Ok(self.driver.attribute(option, "value")?.as_deref() == Some(value))
        })
    }

    /// Set the selection state of the option at the specified index. This is done by examining
    /// the "index" attribute of an element and not merely by counting.
    fn set_selection_by_index(&self, index: u32, select: bool) -> PageResult<()> {
        let str_index = index.to_string();
        self.set_selection_where(select, &format!("with index {}", index), |option| {
            Ok(self.driver.attribute(option, "index")?.as_deref() == Some(str_index.as_str()))
        })
    }

    fn set_selection_by_text(&self, expected: &TextMatch, select: bool) -> PageResult<()> {
        self.set_selection_where(select, &format!("with text {}", expected), |option| {
            Ok(expected.is_match(&normalize_space(&self.driver.text(option)?)))
        })
    }

    /// Select all options for this select tag.
    pub fn select_all(&self) -> PageResult<()> {
        self.require_multiple("select all options")?;
        self.set_selection_all(true)
    }

    /// Select options matching the specified value.
    pub fn select_by_value(&self, value: &str) -> PageResult<()> {
        self.set_selection_by_value(value, true)
    }

    /// Select the option whose "index" attribute is `index`.
    pub fn select_by_index(&self, index: u32) -> PageResult<()> {
        self.set_selection_by_index(index, true)
    }

    /// Select options with visible text matching the specified text.
    /// That is, when given "Bar" this would select an option like:
    ///
    /// `<option value="foo">Bar</option>`
    pub fn select_by_visible_text(&self, text: &str) -> PageResult<()> {
        self.set_selection_by_text(&TextMatch::exact(normalize_space(text)), true)
    }

    /// Select options whose visible text contains `text`.
    pub fn select_by_partial_text(&self, text: &str) -> PageResult<()> {
        self.set_selection_by_text(&TextMatch::contains(text), true)
    }

    /// Deselect all options for this select tag.
    pub fn deselect_all(&self) -> PageResult<()> {
        self.require_multiple("deselect all options")?;
        self.set_selection_all(false)
    }

    /// Deselect options matching the specified value.
    pub fn deselect_by_value(&self, value: &str) -> PageResult<()> {
        self.require_multiple("deselect options")?;
        self.set_selection_by_value(value, false)
    }

    /// Deselect the option whose "index" attribute is `index`.
    pub fn deselect_by_index(&self, index: u32) -> PageResult<()> {
        self.require_multiple("deselect options")?;
        self.set_selection_by_index(index, false)
    }

    /// Deselect options with visible text matching the specified text.
    pub fn deselect_by_visible_text(&self, text: &str) -> PageResult<()> {
        self.require_multiple("deselect options")?;
        self.set_selection_by_text(&TextMatch::exact(normalize_space(text)), false)
    }

    pub fn deselect_by_partial_text(&self, text: &str) -> PageResult<()> {
        self.require_multiple("deselect options")?;
        self.set_selection_by_text(&TextMatch::contains(text), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::{MockDriver, MockNode, NodeId};

    fn fruit_select(multiple: bool) -> (MockDriver, Vec<NodeId>) {
        let driver = MockDriver::new();
        let mut select = MockNode::new(Locator::id("fruit")).tag("select");
        if multiple {
            select = select.attribute("multiple", "true");
        }
        let select = driver.add(select);
        let options = ["Apple", "Banana  Split", "Cherry"]
            .iter()
            .enumerate()
            .map(|(i, text)| {
                driver.add(
                    MockNode::new(Locator::tag("option"))
                        .child_of(select)
                        .tag("option")
                        .text(*text)
                        .attribute("value", text.to_lowercase())
                        .attribute("index", i.to_string())
                        .checkable(),
                )
            })
            .collect();
        (driver, options)
    }

    fn select(driver: &MockDriver) -> SelectElement<'_> {
        let handle = driver.find_element(&Locator::id("fruit")).unwrap();
        SelectElement::new(driver, handle).unwrap()
    }

    #[test]
    fn select_by_value_index_and_text() {
        let (driver, options) = fruit_select(true);
        let select = select(&driver);
        assert!(select.is_multiple());
        select.select_by_value("apple").unwrap();
        select.select_by_index(2).unwrap();
        select.select_by_visible_text("Banana Split").unwrap();
        assert!(options.iter().all(|id| driver.node(*id).selected));
        assert_eq!(select.all_selected_options().unwrap().len(), 3);

        select.deselect_by_index(2).unwrap();
        assert!(!driver.node(options[2]).selected);
        select.deselect_all().unwrap();
        assert!(select.first_selected_option().unwrap_err().is_not_found());
    }

    #[test]
    fn selecting_twice_keeps_the_option_selected() {
        let (driver, options) = fruit_select(false);
        let select = select(&driver);
        select.select_by_partial_text("Cher").unwrap();
        select.select_by_partial_text("Cher").unwrap();
        assert!(driver.node(options[2]).selected);
        assert_eq!(driver.node(options[2]).clicks, 1);
    }

    #[test]
    fn single_select_refuses_deselect() {
        let (driver, _) = fruit_select(false);
        let select = select(&driver);
        assert!(matches!(select.deselect_all().unwrap_err(), PageError::Unsupported(_)));
        assert!(select.select_by_value("durian").unwrap_err().is_not_found());
    }
}
