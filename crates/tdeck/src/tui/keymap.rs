//! Key bindings, built once at startup.

use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::error::{DeckError, DeckResult};
use crate::state::Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Next,
    Previous,
    First,
    Last,
    Trigger,
    ResetTrigger,
    ShowDeck,
    ShowSlide,
    ToggleHelp,
    ToggleTheme,
    Quit,
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    Select,
}

impl Action {
    pub fn description(self) -> &'static str {
        match self {
            Self::Next => "Next slide",
            Self::Previous => "Previous slide",
            Self::First => "First slide",
            Self::Last => "Last slide",
            Self::Trigger => "Trigger",
            Self::ResetTrigger => "Reset triggers",
            Self::ShowDeck => "Deck overview",
            Self::ShowSlide => "Back to slides",
            Self::ToggleHelp => "Toggle help",
            Self::ToggleTheme => "Toggle theme",
            Self::Quit => "Quit",
            Self::CursorLeft => "Previous in grid",
            Self::CursorRight => "Next in grid",
            Self::CursorUp => "Row up",
            Self::CursorDown => "Row down",
            Self::Select => "Open slide",
        }
    }
}

/// Where a binding applies. Mode bindings win over global ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Global,
    Mode(Mode),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Mode(Mode::Slide) => f.write_str("slide"),
            Self::Mode(Mode::Deck) => f.write_str("deck"),
            Self::Mode(Mode::Help) => f.write_str("help"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Key {
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub const fn ctrl(c: char) -> Self {
        Self {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub const fn char(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    /// Shift is part of the character itself (`T`, `?`), so it is dropped.
    pub fn from_event(event: &KeyEvent) -> Self {
        let modifiers = match event.code {
            KeyCode::Char(_) => event.modifiers - KeyModifiers::SHIFT,
            _ => event.modifiers,
        };
        Self {
            code: event.code,
            modifiers,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            f.write_str("ctrl-")?;
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            f.write_str("alt-")?;
        }
        match self.code {
            KeyCode::Char(' ') => f.write_str("space"),
            KeyCode::Char(c) => write!(f, "{c}"),
            KeyCode::Left => f.write_str("←"),
            KeyCode::Right => f.write_str("→"),
            KeyCode::Up => f.write_str("↑"),
            KeyCode::Down => f.write_str("↓"),
            KeyCode::Enter => f.write_str("enter"),
            KeyCode::Esc => f.write_str("esc"),
            KeyCode::Home => f.write_str("home"),
            KeyCode::End => f.write_str("end"),
            KeyCode::PageUp => f.write_str("pgup"),
            KeyCode::PageDown => f.write_str("pgdn"),
            other => write!(f, "{other:?}"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Keymap {
    bindings: HashMap<(Scope, Key), Action>,
    /// Insertion order, for the help screen.
    order: Vec<(Scope, Key)>,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, scope: Scope, key: Key, action: Action) -> DeckResult<()> {
        if self.bindings.contains_key(&(scope, key)) {
            return Err(DeckError::DuplicateBinding {
                key: key.to_string(),
                mode: scope.to_string(),
            });
        }
        self.bindings.insert((scope, key), action);
        self.order.push((scope, key));
        Ok(())
    }

    pub fn with(mut self, scope: Scope, keys: &[Key], action: Action) -> DeckResult<Self> {
        for key in keys {
            self.bind(scope, *key, action)?;
        }
        Ok(self)
    }

    pub fn default_bindings() -> DeckResult<Self> {
        use KeyCode::*;
        let slide = Scope::Mode(Mode::Slide);
        let deck = Scope::Mode(Mode::Deck);
        let global = Scope::Global;

        Self::new()
            .with(
                slide,
                &[Key::plain(Right), Key::char('l'), Key::char('n'), Key::char(' '), Key::plain(PageDown)],
                Action::Next,
            )?
            .with(
                slide,
                &[Key::plain(Left), Key::char('h'), Key::char('p'), Key::plain(PageUp)],
                Action::Previous,
            )?
            .with(slide, &[Key::plain(Home)], Action::First)?
            .with(slide, &[Key::plain(End)], Action::Last)?
            .with(slide, &[Key::char('t')], Action::Trigger)?
            .with(slide, &[Key::char('r')], Action::ResetTrigger)?
            .with(deck, &[Key::plain(Left), Key::char('h')], Action::CursorLeft)?
            .with(deck, &[Key::plain(Right), Key::char('l')], Action::CursorRight)?
            .with(deck, &[Key::plain(Up), Key::char('k')], Action::CursorUp)?
            .with(deck, &[Key::plain(Down), Key::char('j')], Action::CursorDown)?
            .with(deck, &[Key::plain(Enter)], Action::Select)?
            .with(global, &[Key::char('d')], Action::ShowDeck)?
            .with(global, &[Key::char('s'), Key::plain(Esc)], Action::ShowSlide)?
            .with(global, &[Key::char('?')], Action::ToggleHelp)?
            .with(global, &[Key::char('T')], Action::ToggleTheme)?
            .with(global, &[Key::char('q'), Key::ctrl('c')], Action::Quit)
    }

    pub fn lookup(&self, mode: Mode, key: Key) -> Option<Action> {
        self.bindings
            .get(&(Scope::Mode(mode), key))
            .or_else(|| self.bindings.get(&(Scope::Global, key)))
            .copied()
    }

    pub fn action_for(&self, mode: Mode, event: &KeyEvent) -> Option<Action> {
        self.lookup(mode, Key::from_event(event))
    }

    /// `(scope, keys, description)` rows grouped by action, in binding order.
    pub fn describe(&self) -> Vec<(Scope, String, &'static str)> {
        let mut rows: Vec<(Scope, Action, Vec<String>)> = Vec::new();
        for (scope, key) in &self.order {
            let action = self.bindings[&(*scope, *key)];
            match rows.iter_mut().find(|(s, a, _)| s == scope && *a == action) {
                Some((_, _, keys)) => keys.push(key.to_string()),
                None => rows.push((*scope, action, vec![key.to_string()])),
            }
        }
        rows.into_iter()
            .map(|(scope, action, keys)| (scope, keys.join(" "), action.description()))
            .collect()
    }
}
