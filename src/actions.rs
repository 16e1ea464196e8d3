use std::time::Duration;

use serde::Serialize;

use crate::types::ElementHandle;

/// One queued pointer, keyboard or wheel step.
///
/// Steps carrying an element target the element's in-view center; the driver
/// translates the whole sequence into its native action API on perform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Action {
    Click(Option<ElementHandle>),
    ClickAndHold(Option<ElementHandle>),
    ContextClick(Option<ElementHandle>),
    DoubleClick(Option<ElementHandle>),
    Release(Option<ElementHandle>),
    MoveToElement {
        element: ElementHandle,
        x_offset: i64,
        y_offset: i64,
    },
    MoveByOffset {
        x_offset: i64,
        y_offset: i64,
    },
    KeyDown {
        key: String,
        element: Option<ElementHandle>,
    },
    KeyUp {
        key: String,
        element: Option<ElementHandle>,
    },
    SendKeys {
        keys: String,
        element: Option<ElementHandle>,
    },
    ScrollToElement(ElementHandle),
    ScrollByAmount {
        delta_x: i64,
        delta_y: i64,
    },
    ScrollFromElement {
        element: ElementHandle,
        x_offset: i64,
        y_offset: i64,
        delta_x: i64,
        delta_y: i64,
    },
    Pause(Duration),
}

/// Ordered list of actions waiting for `perform`.
///
/// A page owns one chain and every element bound to that page appends to it,
/// so steps recorded through different elements run as one sequence.
#[derive(Debug, Clone, Default)]
pub struct ActionChain {
    actions: Vec<Action>,
}

impl ActionChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: Action) -> &mut Self {
        self.actions.push(action);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Remove and return every queued action.
    pub fn take(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.actions)
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }

    /// Queue a key combination: the first key goes down on `element`, the
    /// middle keys go down in order, the last key is typed, then the held keys
    /// are released in reverse.
    pub fn hotkey(&mut self, element: Option<ElementHandle>, keys: &[&str]) -> &mut Self {
        let (last, held) = match keys.split_last() {
            Some(parts) => parts,
            None => return self,
        };
        let mut target = element;
        for key in held {
            self.push(Action::KeyDown {
                key: key.to_string(),
                element: target.take(),
            });
        }
        self.push(Action::SendKeys {
            keys: last.to_string(),
            element: target,
        });
        for key in held.iter().rev() {
            self.push(Action::KeyUp {
                key: key.to_string(),
                element: None,
            });
        }
        self
    }
}
