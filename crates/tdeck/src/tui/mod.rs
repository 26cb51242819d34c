//! The interactive terminal presenter.

pub mod keymap;
pub mod syntax;
pub mod terminal;
pub mod text;
pub mod view;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use tracing::{debug, info};

use crate::clock::MonotonicClock;
use crate::config::DEFAULT_REFRESH_RATE;
use crate::content::TextOnly;
use crate::deck::Deck;
use crate::loader::DeckLoader;
use crate::state::{Mode, PresentationState, StateOptions};
use crate::theme::Theme;
use crate::watcher::{DeckWatcher, ReloadRequest};

use self::keymap::{Action, Keymap};
use self::syntax::Highlighter;
use self::terminal::Tui;

/// How to run a presentation.
pub struct PresentOptions {
    pub theme: Theme,
    /// Frames per second while animating.
    pub refresh_rate: u32,
    pub state: StateOptions,
    /// Zero-based slide to open on.
    pub start_slide: usize,
    /// Open on the deck overview.
    pub overview: bool,
    /// File or directory to watch for changes.
    pub watch: Option<PathBuf>,
    /// Rebuilds the deck when a watched file changes.
    pub loader: Option<Box<dyn DeckLoader>>,
}

impl Default for PresentOptions {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            refresh_rate: DEFAULT_REFRESH_RATE,
            state: StateOptions::default(),
            start_slide: 0,
            overview: false,
            watch: None,
            loader: None,
        }
    }
}

/// Everything the view reads, plus input handling.
pub struct App {
    pub state: PresentationState,
    pub keymap: Keymap,
    pub theme: Theme,
    pub highlighter: Highlighter,
    pub renderer: TextOnly,
    pub watcher: Option<DeckWatcher>,
    pub loader: Option<Box<dyn DeckLoader>>,
    /// Last known terminal width, for moving the overview cursor by rows.
    pub width: u16,
    pub should_quit: bool,
}

impl App {
    pub fn new(state: PresentationState, keymap: Keymap, theme: Theme, highlighter: Highlighter) -> Self {
        Self {
            state,
            keymap,
            theme,
            highlighter,
            renderer: TextOnly,
            watcher: None,
            loader: None,
            width: 80,
            should_quit: false,
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if let Some(action) = self.keymap.action_for(self.state.mode(), key) {
            self.handle_action(action);
        }
    }

    pub fn handle_action(&mut self, action: Action) {
        debug!(?action, "action");
        let stride = self.row_stride();
        let state = &mut self.state;
        match action {
            Action::Next => {
                state.next();
            }
            Action::Previous => {
                state.previous();
            }
            Action::First => {
                state.navigate(0);
            }
            Action::Last => {
                let last = state.deck().len().saturating_sub(1);
                state.navigate(isize::try_from(last).unwrap_or(isize::MAX));
            }
            Action::Trigger => state.trigger(),
            Action::ResetTrigger => state.reset_trigger(),
            Action::ShowDeck => state.set_mode(Mode::Deck),
            Action::ShowSlide => state.set_mode(Mode::Slide),
            Action::ToggleHelp => {
                let mode = if state.mode() == Mode::Help {
                    Mode::Slide
                } else {
                    Mode::Help
                };
                state.set_mode(mode);
            }
            Action::ToggleTheme => {
                if self.theme.name != "plain" {
                    self.theme = self.theme.toggled();
                }
                let text = format!("Theme: {}", self.theme.name);
                self.state.show_message(text, false);
            }
            Action::Quit => self.should_quit = true,
            Action::CursorLeft => state.move_cursor(-1),
            Action::CursorRight => state.move_cursor(1),
            Action::CursorUp => state.move_cursor(-stride),
            Action::CursorDown => state.move_cursor(stride),
            Action::Select => state.select_cursor(),
        }
    }

    fn row_stride(&self) -> isize {
        isize::try_from(view::grid_columns(self.width)).unwrap_or(1)
    }

    /// Rebuild the deck after a change on disk. Failures only show up in the
    /// footer; the old deck stays.
    pub fn reload(&mut self, request: &ReloadRequest) {
        let Some(loader) = self.loader.as_deref() else {
            debug!("change detected but no loader configured");
            return;
        };
        info!(paths = ?request.paths, "change detected, reloading");
        let _ = self.state.reload_with(loader);
    }
}

struct Runtime<'a> {
    terminal: &'a mut Tui,
    app: &'a mut App,
    frame: Duration,
}

impl Runtime<'_> {
    fn run(&mut self) -> Result<()> {
        let mut last_drawn = None;
        let mut dirty = true;

        while !self.app.should_quit {
            if let Some(request) = self.app.watcher.as_ref().and_then(DeckWatcher::drain) {
                self.app.reload(&request);
            }

            self.app.width = self.terminal.size()?.width;
            if event::poll(self.frame)? {
                match event::read()? {
                    Event::Key(key) => self.app.handle_key(&key),
                    Event::Resize(..) => dirty = true,
                    _ => {}
                }
            }

            self.app.state.tick();

            let version = self.app.state.version();
            if dirty || last_drawn != Some(version) || self.app.state.is_animating() {
                let app = &*self.app;
                self.terminal.draw(|frame| view::draw(frame, app))?;
                last_drawn = Some(version);
                dirty = false;
            }
        }
        Ok(())
    }
}

/// Present `deck` in the terminal until the user quits.
pub fn present(deck: Deck, options: PresentOptions) -> Result<()> {
    let PresentOptions {
        theme,
        refresh_rate,
        state: state_options,
        start_slide,
        overview,
        watch,
        loader,
    } = options;

    let mut state = PresentationState::new(deck, Box::new(MonotonicClock::new()), state_options)?;
    if start_slide > 0 {
        state.goto(isize::try_from(start_slide).unwrap_or(isize::MAX));
    }
    if overview {
        state.set_mode(Mode::Deck);
    }

    let mut app = App::new(state, Keymap::default_bindings()?, theme, Highlighter::new());
    app.loader = loader;
    if let Some(path) = watch {
        app.watcher = Some(DeckWatcher::new(&path)?);
        info!(path = %path.display(), "watching for changes");
    }

    let frame = Duration::from_secs_f64(1.0 / f64::from(refresh_rate.max(1)));
    info!(deck = %app.state.deck().name, slides = app.state.deck().len(), "presenting");

    terminal::install_panic_hook();
    let mut tui = terminal::setup_terminal()?;
    let result = Runtime {
        terminal: &mut tui,
        app: &mut app,
        frame,
    }
    .run();
    let restored = terminal::restore_terminal();
    result?;
    restored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::content::Renderable;
    use crate::error::{DeckError, DeckResult};
    use crate::slide::Slide;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn deck(n: usize) -> Deck {
        (0..n).fold(Deck::new("test").with_transition(None), |deck, i| {
            deck.add_slide(Slide::fixed(format!("s{i}"), Renderable::text(format!("{i}"))))
        })
    }

    fn app(n: usize) -> App {
        let state =
            PresentationState::new(deck(n), Box::new(ManualClock::new(0.0)), StateOptions::default())
                .unwrap();
        App::new(state, Keymap::default_bindings().unwrap(), Theme::dark(), Highlighter::new())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Press)
    }

    #[test]
    fn keys_drive_navigation() {
        let mut app = app(4);
        app.handle_key(&key(KeyCode::Right));
        app.handle_key(&key(KeyCode::Char(' ')));
        assert_eq!(app.state.current_index(), 2);
        app.handle_key(&key(KeyCode::End));
        assert_eq!(app.state.current_index(), 3);
        app.handle_key(&key(KeyCode::Home));
        assert_eq!(app.state.current_index(), 0);
        app.handle_key(&key(KeyCode::Left));
        assert_eq!(app.state.current_index(), 0);
    }

    #[test]
    fn releases_are_ignored() {
        let mut app = app(3);
        let release = KeyEvent::new_with_kind(KeyCode::Right, KeyModifiers::NONE, KeyEventKind::Release);
        app.handle_key(&release);
        assert_eq!(app.state.current_index(), 0);
    }

    #[test]
    fn triggers_accumulate_and_reset() {
        let mut app = app(2);
        app.handle_action(Action::Trigger);
        app.handle_action(Action::Trigger);
        assert_eq!(app.state.ledger().count(), 3);
        app.handle_action(Action::ResetTrigger);
        assert_eq!(app.state.ledger().count(), 1);
    }

    #[test]
    fn overview_cursor_moves_by_rows() {
        let mut app = app(10);
        app.width = 84;
        app.handle_action(Action::ShowDeck);
        assert_eq!(app.state.mode(), Mode::Deck);
        app.handle_key(&key(KeyCode::Down));
        assert_eq!(app.state.cursor(), 2);
        app.handle_key(&key(KeyCode::Char('l')));
        assert_eq!(app.state.cursor(), 3);
        app.handle_key(&key(KeyCode::Enter));
        assert_eq!(app.state.mode(), Mode::Slide);
        assert_eq!(app.state.current_index(), 3);
    }

    #[test]
    fn wide_terminals_step_three_columns() {
        let mut app = app(10);
        app.width = 86;
        app.handle_action(Action::ShowDeck);
        app.handle_key(&key(KeyCode::Down));
        assert_eq!(app.state.cursor(), 3);
        app.handle_key(&key(KeyCode::Up));
        assert_eq!(app.state.cursor(), 0);
    }

    #[test]
    fn help_toggles() {
        let mut app = app(2);
        app.handle_key(&key(KeyCode::Char('?')));
        assert_eq!(app.state.mode(), Mode::Help);
        app.handle_key(&key(KeyCode::Char('?')));
        assert_eq!(app.state.mode(), Mode::Slide);
    }

    #[test]
    fn theme_toggle_reports_in_footer() {
        let mut app = app(2);
        app.handle_action(Action::ToggleTheme);
        assert_eq!(app.theme.name, "light");
        assert_eq!(app.state.message().unwrap().text, "Theme: light");

        app.theme = Theme::plain();
        app.handle_action(Action::ToggleTheme);
        assert_eq!(app.theme.name, "plain");
    }

    #[test]
    fn quit_sets_flag() {
        let mut app = app(1);
        app.handle_key(&KeyEvent::new_with_kind(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
            KeyEventKind::Press,
        ));
        assert!(app.should_quit);
    }

    #[test]
    fn reload_requests_use_the_loader() {
        let mut app = app(3);
        app.state.goto(2);
        app.loader = Some(Box::new(|| -> DeckResult<Deck> { Ok(deck(2)) }));
        app.reload(&ReloadRequest::default());
        assert_eq!(app.state.deck().len(), 2);
        assert_eq!(app.state.current_index(), 1);
        assert_eq!(app.state.message().unwrap().text, "Reloaded");

        app.loader = Some(Box::new(|| -> DeckResult<Deck> {
            Err(DeckError::no_deck("broken front matter"))
        }));
        app.reload(&ReloadRequest::default());
        assert_eq!(app.state.deck().len(), 2);
        assert!(app.state.message().unwrap().is_error);
    }

    #[test]
    fn reload_without_loader_is_ignored() {
        let mut app = app(3);
        let version = app.state.version();
        app.reload(&ReloadRequest::default());
        assert_eq!(app.state.version(), version);
    }
}
