//! Navigation and reload state.
//!
//! [`PresentationState`] is the single writer for the current slide, the deck
//! and the trigger ledger. Every effective mutation bumps [`version`], which
//! the render loop compares against the last frame it drew.
//!
//! [`version`]: PresentationState::version

use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::content::Renderer;
use crate::deck::Deck;
use crate::error::{DeckError, DeckResult};
use crate::invoke::{self, Rendered};
use crate::loader::DeckLoader;
use crate::slide::Slide;
use crate::transition::{Direction, Ease, TransitionState};
use crate::triggers::TriggerLedger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Slide,
    /// Grid overview of every slide.
    Deck,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub text: String,
    pub is_error: bool,
    pub expires_at: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateOptions {
    pub transitions: bool,
    /// Seconds.
    pub transition_duration: f64,
    pub ease: Ease,
    /// Seconds a footer message stays visible.
    pub message_timeout: f64,
}

impl Default for StateOptions {
    fn default() -> Self {
        Self {
            transitions: true,
            transition_duration: 0.4,
            ease: Ease::InOutCubic,
            message_timeout: 1.5,
        }
    }
}

pub struct PresentationState {
    deck: Deck,
    current: usize,
    ledger: TriggerLedger,
    mode: Mode,
    cursor: usize,
    message: Option<Message>,
    transition: Option<TransitionState>,
    version: u64,
    options: StateOptions,
    clock: Box<dyn Clock>,
}

impl PresentationState {
    pub fn new(deck: Deck, clock: Box<dyn Clock>, options: StateOptions) -> DeckResult<Self> {
        if deck.is_empty() {
            return Err(DeckError::EmptyDeck(deck.name));
        }
        let now = clock.now();
        Ok(Self {
            deck,
            current: 0,
            ledger: TriggerLedger::new(now),
            mode: Mode::Slide,
            cursor: 0,
            message: None,
            transition: None,
            version: 0,
            options,
            clock,
        })
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_slide(&self) -> &Slide {
        &self.deck.slides[self.current]
    }

    pub fn ledger(&self) -> &TriggerLedger {
        &self.ledger
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Highlighted slide in the deck overview.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    pub fn transition(&self) -> Option<&TransitionState> {
        self.transition.as_ref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn options(&self) -> &StateOptions {
        &self.options
    }

    /// True while the picture changes without any state mutation: a
    /// transition is running or the current slide reads the ledger.
    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
            || (self.mode == Mode::Slide && self.current_slide().content.wants_triggers())
    }

    /// Current clock time, never earlier than the ledger's own `now`.
    pub fn now(&self) -> f64 {
        self.clock.now().max(self.ledger.now())
    }

    /// Render the current slide against the current ledger.
    pub fn render_current(&self, renderer: &dyn Renderer) -> Rendered {
        invoke::render(self.current_slide(), &self.ledger, renderer)
    }

    fn clamp(&self, index: isize) -> usize {
        let last = self.deck.len().saturating_sub(1);
        usize::try_from(index.max(0)).map_or(last, |i| i.min(last))
    }

    fn touch(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    fn fresh_ledger(&mut self) {
        self.ledger = TriggerLedger::reset(self.now());
    }

    /// Move to `index`, clamped into the deck. A running transition is
    /// dropped. Moving to the current slide keeps the ledger; otherwise the
    /// ledger starts over. Returns whether the index changed.
    pub fn goto(&mut self, index: isize) -> bool {
        let cancelled = self.transition.take().is_some();
        if cancelled {
            debug!("transition cancelled");
        }
        let target = self.clamp(index);
        if target == self.current {
            if cancelled {
                self.touch();
            }
            return false;
        }
        debug!(from = self.current, to = target, "goto");
        self.current = target;
        self.fresh_ledger();
        self.touch();
        true
    }

    pub fn advance(&mut self, n: usize) -> bool {
        self.goto(signed(self.current).saturating_add(signed(n)))
    }

    pub fn retreat(&mut self, n: usize) -> bool {
        self.goto(signed(self.current).saturating_sub(signed(n)))
    }

    /// Navigate to `target`, animating when a transition applies.
    ///
    /// Requests made while a transition is running are dropped.
    pub fn navigate(&mut self, target: isize) -> bool {
        if self.transition.is_some() {
            debug!("navigation ignored during transition");
            return false;
        }
        let to_index = self.clamp(target);
        if to_index == self.current {
            return false;
        }

        let to_slide = &self.deck.slides[to_index];
        let kind = self
            .deck
            .transition_for(to_slide)
            .filter(|k| k.animates());
        let kind = match kind {
            Some(kind) if self.options.transitions && self.mode == Mode::Slide => kind,
            _ => return self.goto(signed(to_index)),
        };

        let direction = if to_index > self.current {
            Direction::Next
        } else {
            Direction::Previous
        };
        debug!(from = self.current, to = to_index, %kind, "transition started");
        self.transition = Some(TransitionState {
            from_slide: self.current_slide().clone(),
            to_slide: to_slide.clone(),
            from_ledger: self.ledger.clone(),
            to_index,
            direction,
            kind,
            start: self.now(),
            duration: self.options.transition_duration,
            ease: self.options.ease,
        });
        self.touch();
        true
    }

    pub fn next(&mut self) -> bool {
        self.navigate(offset(self.current, 1))
    }

    pub fn previous(&mut self) -> bool {
        self.navigate(offset(self.current, -1))
    }

    pub fn trigger(&mut self) {
        match self.ledger.trigger(self.now()) {
            Ok(ledger) => {
                debug!(count = ledger.count(), "trigger");
                self.ledger = ledger;
                self.touch();
            }
            Err(err) => warn!(error = %err, "trigger rejected"),
        }
    }

    pub fn reset_trigger(&mut self) {
        self.fresh_ledger();
        self.touch();
    }

    /// Switch modes. A running transition finishes first. Entering the
    /// overview puts its cursor on the current slide. Any actual switch
    /// restarts the ledger.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode == self.mode {
            return;
        }
        if let Some(t) = self.transition.take() {
            self.commit(&t);
        }
        if mode == Mode::Deck {
            self.cursor = self.current;
        }
        self.mode = mode;
        self.fresh_ledger();
        self.touch();
    }

    /// Move the overview cursor by `delta` slides, clamped.
    pub fn move_cursor(&mut self, delta: isize) {
        let target = self.clamp(offset(self.cursor, delta));
        if target != self.cursor {
            self.cursor = target;
            self.touch();
        }
    }

    /// Leave the overview on the highlighted slide.
    pub fn select_cursor(&mut self) {
        self.goto(signed(self.cursor));
        self.set_mode(Mode::Slide);
    }

    /// Replace the deck. The index is clamped into the new deck and the
    /// ledger starts over. An in-flight transition keeps its snapshots.
    pub fn reload(&mut self, deck: Deck) -> DeckResult<()> {
        if deck.is_empty() {
            return Err(DeckError::EmptyDeck(deck.name));
        }
        let last = deck.len() - 1;
        let current = self.current.min(last);
        let cursor = self.cursor.min(last);
        let ledger = TriggerLedger::reset(self.now());
        info!(deck = %deck.name, slides = deck.len(), "deck reloaded");

        self.deck = deck;
        self.current = current;
        self.cursor = cursor;
        self.ledger = ledger;
        self.touch();
        Ok(())
    }

    /// Load a new deck through `loader` and swap it in. On failure nothing
    /// but the footer message changes and the error is returned.
    pub fn reload_with(&mut self, loader: &dyn DeckLoader) -> DeckResult<()> {
        let result = loader.load().and_then(|deck| self.reload(deck));
        match &result {
            Ok(()) => self.show_message("Reloaded", false),
            Err(err) => {
                warn!(error = %err, "reload failed");
                self.show_message(format!("Reload failed: {err}"), true);
            }
        }
        result
    }

    /// Show `text` in the footer until the message timeout passes.
    pub fn show_message(&mut self, text: impl Into<String>, is_error: bool) {
        self.message = Some(Message {
            text: text.into(),
            is_error,
            expires_at: self.now() + self.options.message_timeout,
        });
        self.touch();
    }

    /// Land on the transition's target with a fresh ledger.
    fn commit(&mut self, t: &TransitionState) {
        let target = t.to_index.min(self.deck.len() - 1);
        debug!(to = target, "transition complete");
        self.current = target;
        self.ledger = TriggerLedger::reset(self.ledger.now());
        self.touch();
    }

    pub fn tick(&mut self) {
        let now = self.now();
        self.tick_at(now);
    }

    /// Advance the ledger to `now`, finish a completed transition and drop
    /// an expired message.
    pub fn tick_at(&mut self, now: f64) {
        if let Ok(ledger) = self.ledger.tick(now) {
            self.ledger = ledger;
        }

        if let Some(t) = self.transition.take_if(|t| t.is_complete(now)) {
            self.commit(&t);
        }

        if self.message.as_ref().is_some_and(|m| m.expires_at <= now) {
            self.message = None;
            self.touch();
        }
    }
}

/// `n` as a signed index, saturating at `isize::MAX`.
fn signed(n: usize) -> isize {
    isize::try_from(n).unwrap_or(isize::MAX)
}

fn offset(index: usize, delta: isize) -> isize {
    signed(index).saturating_add(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::content::{Renderable, TextOnly};
    use crate::transition::TransitionKind;

    fn deck(n: usize) -> Deck {
        (0..n).fold(Deck::new("test"), |deck, i| {
            deck.triggered_slide(format!("slide {i}"), |t| {
                Ok(Renderable::text(t.count().to_string()))
            })
        })
    }

    fn still(n: usize) -> PresentationState {
        let options = StateOptions {
            transitions: false,
            ..StateOptions::default()
        };
        PresentationState::new(deck(n), Box::new(ManualClock::new(0.0)), options).unwrap()
    }

    fn animated(n: usize) -> (PresentationState, ManualClock) {
        let clock = ManualClock::new(0.0);
        let options = StateOptions {
            transition_duration: 0.5,
            ease: Ease::Linear,
            ..StateOptions::default()
        };
        let state = PresentationState::new(deck(n), Box::new(clock.clone()), options).unwrap();
        (state, clock)
    }

    #[test]
    fn empty_decks_are_rejected() {
        let err = PresentationState::new(
            Deck::new("nothing"),
            Box::new(ManualClock::new(0.0)),
            StateOptions::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, DeckError::EmptyDeck(name) if name == "nothing"));
    }

    #[test]
    fn navigation_clamps() {
        let mut state = still(3);
        state.goto(-5);
        assert_eq!(state.current_index(), 0);
        state.goto(100);
        assert_eq!(state.current_index(), 2);
        assert!(!state.advance(1));
        assert_eq!(state.current_index(), 2);
        state.goto(0);
        assert!(!state.retreat(1));
        assert_eq!(state.current_index(), 0);
        state.goto(isize::MAX);
        assert_eq!(state.current_index(), 2);
        state.goto(isize::MIN);
        assert_eq!(state.current_index(), 0);
    }

    #[test]
    fn staying_put_keeps_the_ledger() {
        let clock = ManualClock::new(0.0);
        let mut state = PresentationState::new(
            deck(3),
            Box::new(clock.clone()),
            StateOptions::default(),
        )
        .unwrap();
        clock.set(1.0);
        state.trigger();
        let version = state.version();
        clock.set(2.0);
        assert!(!state.retreat(1));
        assert_eq!(state.ledger().count(), 2);
        assert_eq!(state.version(), version);
    }

    #[test]
    fn end_to_end_scenario() {
        let mut state = still(3);
        assert!(state.advance(1));
        assert_eq!(state.ledger().count(), 1);
        assert!(state.advance(1));
        assert_eq!(state.current_index(), 2);
        assert_eq!(state.ledger().count(), 1);

        for _ in 0..3 {
            state.trigger();
        }
        assert_eq!(state.ledger().count(), 4);
        assert!(state.ledger().manually_triggered());

        state.reset_trigger();
        assert_eq!(state.ledger().count(), 1);
        assert!(!state.ledger().manually_triggered());
    }

    #[test]
    fn triggers_use_the_clock() {
        let clock = ManualClock::new(10.0);
        let mut state =
            PresentationState::new(deck(1), Box::new(clock.clone()), StateOptions::default())
                .unwrap();
        clock.advance(2.0);
        state.trigger();
        clock.advance(3.0);
        state.tick();
        assert_eq!(state.ledger().times(), &[10.0, 12.0]);
        assert_eq!(state.ledger().elapsed_since_last(), 3.0);
        assert_eq!(state.ledger().elapsed_since_first(), 5.0);
    }

    #[test]
    fn reload_clamps_and_resets() {
        let mut state = still(5);
        state.goto(4);
        state.trigger();
        state.reload(deck(2)).unwrap();
        assert_eq!(state.current_index(), 1);
        assert_eq!(state.deck().len(), 2);
        assert_eq!(state.ledger().count(), 1);
    }

    #[test]
    fn reload_rejects_an_empty_deck() {
        let mut state = still(3);
        state.goto(2);
        assert!(matches!(
            state.reload(Deck::new("empty")),
            Err(DeckError::EmptyDeck(_))
        ));
        assert_eq!(state.current_index(), 2);
        assert_eq!(state.deck().len(), 3);
    }

    #[test]
    fn failed_reload_leaves_state_untouched() {
        let clock = ManualClock::new(0.0);
        let mut state =
            PresentationState::new(deck(3), Box::new(clock.clone()), StateOptions::default())
                .unwrap();
        state.goto(1);
        clock.set(1.0);
        state.trigger();
        let ledger = state.ledger().clone();
        let slides: Vec<_> = state.deck().iter().map(|s| s.title.clone()).collect();

        let broken = || -> DeckResult<Deck> { Err(DeckError::no_deck("no slides in deck.md")) };
        clock.set(2.0);
        assert!(state.reload_with(&broken).is_err());

        assert_eq!(state.current_index(), 1);
        assert_eq!(state.ledger(), &ledger);
        let after: Vec<_> = state.deck().iter().map(|s| s.title.clone()).collect();
        assert_eq!(after, slides);

        let message = state.message().unwrap();
        assert!(message.is_error);
        assert!(message.text.contains("no slides in deck.md"));
    }

    #[test]
    fn successful_reload_with_loader() {
        let mut state = still(3);
        let loader = || -> DeckResult<Deck> { Ok(deck(4)) };
        state.reload_with(&loader).unwrap();
        assert_eq!(state.deck().len(), 4);
        assert!(!state.message().unwrap().is_error);
    }

    #[test]
    fn messages_expire() {
        let clock = ManualClock::new(0.0);
        let options = StateOptions {
            message_timeout: 2.0,
            ..StateOptions::default()
        };
        let mut state = PresentationState::new(deck(1), Box::new(clock.clone()), options).unwrap();
        state.show_message("first", false);
        clock.set(1.5);
        state.show_message("second", false);
        clock.set(2.5);
        state.tick();
        assert_eq!(state.message().map(|m| m.text.as_str()), Some("second"));
        clock.set(3.5);
        state.tick();
        assert!(state.message().is_none());
    }

    #[test]
    fn navigation_animates_then_commits() {
        let (mut state, clock) = animated(3);
        clock.set(1.0);
        state.trigger();
        assert!(state.next());
        assert_eq!(state.current_index(), 0);

        let t = state.transition().unwrap();
        assert_eq!(t.to_index, 1);
        assert_eq!(t.direction, Direction::Next);
        assert_eq!(t.from_ledger.count(), 2);

        // Requests during the move are dropped.
        assert!(!state.next());
        assert!(!state.navigate(2));

        clock.set(1.25);
        state.tick();
        assert!(state.transition().is_some());

        clock.set(1.5);
        state.tick();
        assert!(state.transition().is_none());
        assert_eq!(state.current_index(), 1);
        assert_eq!(state.ledger().count(), 1);
        assert_eq!(state.ledger().now(), 1.5);
    }

    #[test]
    fn previous_runs_backwards() {
        let (mut state, _clock) = animated(3);
        state.goto(2);
        assert!(state.previous());
        assert_eq!(state.transition().unwrap().direction, Direction::Previous);
    }

    #[test]
    fn instant_slides_skip_the_animation() {
        let clock = ManualClock::new(0.0);
        let deck = deck(1).add_slide(
            Slide::fixed("snap", Renderable::Empty).with_transition(TransitionKind::Instant),
        );
        let mut state =
            PresentationState::new(deck, Box::new(clock), StateOptions::default()).unwrap();
        assert!(state.next());
        assert!(state.transition().is_none());
        assert_eq!(state.current_index(), 1);
    }

    #[test]
    fn reload_during_transition_keeps_snapshots() {
        let (mut state, clock) = animated(4);
        state.goto(2);
        state.next();
        state.reload(deck(2)).unwrap();

        let t = state.transition().unwrap();
        assert_eq!(t.from_slide.title, "slide 2");
        assert_eq!(t.to_slide.title, "slide 3");

        clock.set(1.0);
        state.tick();
        assert!(state.transition().is_none());
        assert_eq!(state.current_index(), 1);
    }

    #[test]
    fn overview_moves_a_cursor() {
        let mut state = still(5);
        state.goto(1);
        state.set_mode(Mode::Deck);
        assert_eq!(state.cursor(), 1);
        state.move_cursor(3);
        state.move_cursor(10);
        assert_eq!(state.cursor(), 4);
        assert_eq!(state.current_index(), 1);

        state.select_cursor();
        assert_eq!(state.mode(), Mode::Slide);
        assert_eq!(state.current_index(), 4);
    }

    #[test]
    fn huge_steps_clamp_instead_of_wrapping() {
        let mut state = still(3);
        state.goto(2);
        assert!(!state.advance(usize::MAX));
        assert_eq!(state.current_index(), 2);
        assert!(state.retreat(usize::MAX));
        assert_eq!(state.current_index(), 0);
        assert!(state.advance(usize::MAX));
        assert_eq!(state.current_index(), 2);
    }

    #[test]
    fn overview_selection_survives_a_running_transition() {
        let (mut state, clock) = animated(6);
        assert!(state.next());
        assert!(state.transition().is_some());

        state.set_mode(Mode::Deck);
        assert!(state.transition().is_none());
        assert_eq!(state.current_index(), 1);
        assert_eq!(state.cursor(), 1);

        state.move_cursor(3);
        state.select_cursor();
        assert_eq!(state.mode(), Mode::Slide);
        assert_eq!(state.current_index(), 4);

        clock.set(1.0);
        state.tick();
        assert_eq!(state.current_index(), 4);
    }

    #[test]
    fn goto_drops_a_running_transition() {
        let (mut state, clock) = animated(5);
        assert!(state.next());
        let version = state.version();
        assert!(state.goto(3));
        assert!(state.transition().is_none());
        assert!(state.version() > version);

        assert!(state.next());
        let version = state.version();
        assert!(!state.goto(3));
        assert!(state.transition().is_none());
        assert!(state.version() > version);

        clock.set(1.0);
        state.tick();
        assert_eq!(state.current_index(), 3);
    }

    #[test]
    fn overview_navigation_does_not_animate() {
        let (mut state, _clock) = animated(3);
        state.set_mode(Mode::Deck);
        assert!(state.navigate(2));
        assert!(state.transition().is_none());
        assert_eq!(state.current_index(), 2);
    }

    #[test]
    fn mode_switch_resets_the_ledger() {
        let mut state = still(2);
        state.trigger();
        state.set_mode(Mode::Help);
        assert_eq!(state.ledger().count(), 1);
        let version = state.version();
        state.set_mode(Mode::Help);
        assert_eq!(state.version(), version);
    }

    #[test]
    fn every_mutation_bumps_the_version() {
        let mut state = still(3);
        let mut last = state.version();
        let mut check = |state: &PresentationState| {
            assert!(state.version() > last);
            last = state.version();
        };
        state.advance(1);
        check(&state);
        state.trigger();
        check(&state);
        state.reset_trigger();
        check(&state);
        state.reload(deck(3)).unwrap();
        check(&state);
    }

    #[test]
    fn renders_the_current_slide() {
        let mut state = still(2);
        state.trigger();
        assert_eq!(
            state.render_current(&TextOnly),
            Rendered::Content(Renderable::text("2"))
        );
        assert!(state.is_animating());
    }
}
