use std::fmt;

/// Special keys, encoded with the code points the WebDriver protocol assigns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keys {
    Backspace,
    Tab,
    Enter,
    Shift,
    Control,
    Alt,
    Escape,
    Space,
    ArrowLeft,
    ArrowUp,
    ArrowRight,
    ArrowDown,
    Delete,
    Command,
}

impl Keys {
    pub fn as_str(&self) -> &'static str {
        match self {
            Keys::Backspace => "\u{e003}",
            Keys::Tab => "\u{e004}",
            Keys::Enter => "\u{e007}",
            Keys::Shift => "\u{e008}",
            Keys::Control => "\u{e009}",
            Keys::Alt => "\u{e00a}",
            Keys::Escape => "\u{e00c}",
            Keys::Space => "\u{e00d}",
            Keys::ArrowLeft => "\u{e012}",
            Keys::ArrowUp => "\u{e013}",
            Keys::ArrowRight => "\u{e014}",
            Keys::ArrowDown => "\u{e015}",
            Keys::Delete => "\u{e017}",
            Keys::Command => "\u{e03d}",
        }
    }

    /// The key used for select-all / copy / paste shortcuts on this platform.
    pub fn primary_modifier() -> Keys {
        if cfg!(target_os = "macos") {
            Keys::Command
        } else {
            Keys::Control
        }
    }

    /// This key typed `times` times in a row.
    pub fn repeat(&self, times: usize) -> String {
        self.as_str().repeat(times)
    }

    /// `modifier + key` as a single chord, with the modifier released at the end.
    ///
    /// WebDriver keeps a modifier pressed until it is sent a second time or until
    /// the null key (`\u{e000}`) arrives.
    pub fn chord(modifier: Keys, key: &str) -> String {
        format!("{}{}\u{e000}", modifier.as_str(), key)
    }
}

impl fmt::Display for Keys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
