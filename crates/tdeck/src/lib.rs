//! Terminal slide presentations.
//!
//! A [`Deck`] is an ordered list of [`Slide`]s. Each slide's content is a
//! function of its [`TriggerLedger`], so slides can reveal points, count
//! presses, or animate from the time since the last trigger. Decks come
//! from code or from markdown files, which [`tui::present`] reloads when
//! they change on disk.
//!
//! ```no_run
//! use tdeck::{Deck, Renderable};
//!
//! let deck = Deck::new("talk")
//!     .slide("Hello", || Ok(Renderable::text("hi")))
//!     .triggered_slide("Counter", |ledger| {
//!         Ok(Renderable::text(format!("pressed {} times", ledger.count() - 1)))
//!     });
//! tdeck::present(deck, Default::default())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod content;
pub mod deck;
pub mod demo;
pub mod error;
pub mod invoke;
pub mod loader;
pub mod logging;
pub mod parser;
pub mod slide;
pub mod state;
pub mod theme;
pub mod transition;
pub mod triggers;
pub mod tui;
pub mod watcher;

pub use crate::clock::{Clock, ManualClock, MonotonicClock};
pub use crate::content::{Align, Renderable, Renderer, Rgb, TextOnly, TextStyle};
pub use crate::deck::Deck;
pub use crate::error::{DeckError, DeckResult};
pub use crate::invoke::{RenderFailure, Rendered};
pub use crate::loader::{DeckLoader, MarkdownLoader};
pub use crate::slide::{Content, Slide};
pub use crate::state::{Mode, PresentationState, StateOptions};
pub use crate::transition::{Direction, Ease, Offsets, Transition, TransitionKind};
pub use crate::triggers::TriggerLedger;
pub use crate::tui::{PresentOptions, present};
