//! Building decks from outside sources.
//!
//! The navigation state reloads through a [`DeckLoader`] and treats any
//! error it returns as recoverable.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::content::Renderable;
use crate::deck::Deck;
use crate::error::{DeckError, DeckResult};
use crate::parser::{self, Layout, ParsedSlide};
use crate::slide::Slide;
use crate::transition::TransitionKind;
use crate::triggers::TriggerLedger;

/// Typewriter speed for `@animate: typewriter` slides.
const TYPEWRITER_CHARS_PER_SEC: f64 = 40.0;

pub trait DeckLoader {
    fn load(&self) -> DeckResult<Deck>;
}

impl<F> DeckLoader for F
where
    F: Fn() -> DeckResult<Deck>,
{
    fn load(&self) -> DeckResult<Deck> {
        self()
    }
}

/// Loads a deck from a markdown file.
#[derive(Debug, Clone)]
pub struct MarkdownLoader {
    path: PathBuf,
    default_transition: TransitionKind,
}

impl MarkdownLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            default_transition: TransitionKind::Swipe,
        }
    }

    /// Transition used when the front matter does not name one.
    pub fn with_default_transition(mut self, kind: TransitionKind) -> Self {
        self.default_transition = kind;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DeckLoader for MarkdownLoader {
    fn load(&self) -> DeckResult<Deck> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| DeckError::io(&self.path, e))?;
        let fallback = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "deck".to_string());
        let deck = from_markdown(&content, &fallback, self.default_transition)?;
        debug!(path = %self.path.display(), slides = deck.len(), "loaded markdown deck");
        Ok(deck)
    }
}

/// Build a deck from markdown source. `name` is used when the front matter
/// has no title.
pub fn from_markdown(source: &str, name: &str, default_transition: TransitionKind) -> DeckResult<Deck> {
    let presentation = parser::parse(source)?;
    let meta = presentation.meta;

    let transition = match meta.transition.as_deref() {
        Some(value) => parse_transition(value).unwrap_or(default_transition),
        None => default_transition,
    };

    let mut deck = Deck::new(meta.title.as_deref().unwrap_or(name))
        .with_transition(Some(transition));
    deck.footer = meta.footer;
    deck.theme = meta.theme;

    for (i, parsed) in presentation.slides.into_iter().enumerate() {
        deck = deck.add_slide(markdown_slide(parsed, i));
    }
    Ok(deck)
}

fn parse_transition(value: &str) -> Option<TransitionKind> {
    let kind = TransitionKind::from_name(value);
    if kind.is_none() {
        warn!(transition = value, "unknown transition, using the default");
    }
    kind
}

fn markdown_slide(parsed: ParsedSlide, index: usize) -> Slide {
    let title = parsed
        .title()
        .unwrap_or_else(|| format!("Slide {}", index + 1));
    let transition = parsed.directive("transition").and_then(parse_transition);
    let typewriter = parsed
        .directive("animate")
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("typewriter"));
    let steps = parser::compute_max_steps(&parsed.blocks);

    let slide = if steps == 0 && !typewriter {
        Slide::fixed(title, layout(parsed.layout, Renderable::Blocks(parsed.blocks)))
    } else {
        let parsed = Arc::new(parsed);
        Slide::triggered(title, move |ledger| {
            Ok(reveal(&parsed, steps, typewriter, ledger))
        })
    };

    match transition {
        Some(kind) => slide.with_transition(kind),
        None => slide,
    }
}

/// One `+` item per manual trigger; typewriter text restarts with each one.
fn reveal(parsed: &ParsedSlide, steps: usize, typewriter: bool, ledger: &TriggerLedger) -> Renderable {
    let shown = ledger.take(0..steps, 1).count();
    let mut blocks = parser::reveal_blocks(&parsed.blocks, shown);
    if typewriter {
        let budget = (ledger.elapsed_since_last() * TYPEWRITER_CHARS_PER_SEC).max(0.0) as usize;
        blocks = parser::typewriter_blocks(&blocks, budget);
    }
    layout(parsed.layout, Renderable::Blocks(blocks))
}

fn layout(layout: Layout, content: Renderable) -> Renderable {
    match layout {
        Layout::Title | Layout::Section => content.centered(),
        Layout::Content => content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::TextOnly;
    use crate::invoke::{self, Rendered};
    use crate::parser::{Block, ListItem, inlines_to_text};
    use std::fs;

    fn list_items(rendered: Rendered) -> Vec<String> {
        fn flatten(items: &[ListItem], out: &mut Vec<String>) {
            for item in items {
                out.push(inlines_to_text(&item.inlines));
                flatten(&item.children, out);
            }
        }
        let Rendered::Content(Renderable::Blocks(blocks)) = rendered else {
            panic!("expected blocks, got {rendered:?}");
        };
        let mut out = Vec::new();
        for block in &blocks {
            if let Block::List { items, .. } = block {
                flatten(items, &mut out);
            }
        }
        out
    }

    fn paragraph(rendered: Rendered) -> String {
        let Rendered::Content(content) = rendered else {
            panic!("expected content");
        };
        let content = match content {
            Renderable::Centered(inner) => *inner,
            other => other,
        };
        let Renderable::Blocks(blocks) = content else {
            panic!("expected blocks");
        };
        blocks
            .iter()
            .find_map(|b| match b {
                Block::Paragraph { inlines } => Some(inlines_to_text(inlines)),
                _ => None,
            })
            .unwrap_or_default()
    }

    const DECK: &str = "---\ntitle: Loader test\ntransition: instant\nfooter: ACME\ntheme: light\n---\n\n# Opening\n\nA short subtitle\n\n---\n\n# Steps\n\n- always\n+ first\n* with first\n+ second\n\n---\n\n@transition: swipe\n@animate: typewriter\n# Typed\n\nHello there\n";

    #[test]
    fn front_matter_sets_deck_properties() {
        let deck = from_markdown(DECK, "fallback", TransitionKind::Swipe).unwrap();
        assert_eq!(deck.name, "Loader test");
        assert_eq!(deck.footer.as_deref(), Some("ACME"));
        assert_eq!(deck.theme.as_deref(), Some("light"));
        assert_eq!(deck.default_transition, Some(TransitionKind::Instant));
        let titles: Vec<_> = deck.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Opening", "Steps", "Typed"]);
        assert_eq!(deck.slides[2].transition, Some(TransitionKind::Swipe));
        assert_eq!(deck.transition_for(&deck.slides[0]), Some(TransitionKind::Instant));
    }

    #[test]
    fn title_slides_are_centered_and_static() {
        let deck = from_markdown(DECK, "x", TransitionKind::Swipe).unwrap();
        let slide = &deck.slides[0];
        assert!(!slide.content.wants_triggers());
        let rendered = invoke::render(slide, &TriggerLedger::new(0.0), &TextOnly);
        assert!(matches!(rendered, Rendered::Content(Renderable::Centered(_))));
    }

    #[test]
    fn plus_items_follow_triggers() {
        let deck = from_markdown(DECK, "x", TransitionKind::Swipe).unwrap();
        let slide = &deck.slides[1];
        assert!(slide.content.wants_triggers());

        let fresh = TriggerLedger::new(0.0);
        assert_eq!(
            list_items(invoke::render(slide, &fresh, &TextOnly)),
            vec!["always"]
        );

        let once = fresh.trigger(1.0).unwrap();
        assert_eq!(
            list_items(invoke::render(slide, &once, &TextOnly)),
            vec!["always", "first", "with first"]
        );

        let many = once.trigger(2.0).unwrap().trigger(3.0).unwrap();
        assert_eq!(
            list_items(invoke::render(slide, &many, &TextOnly)),
            vec!["always", "first", "with first", "second"]
        );
    }

    #[test]
    fn typewriter_follows_elapsed_time() {
        let deck = from_markdown(DECK, "x", TransitionKind::Swipe).unwrap();
        let slide = &deck.slides[2];
        let start = TriggerLedger::new(0.0);
        assert_eq!(paragraph(invoke::render(slide, &start, &TextOnly)), "");
        let later = start.tick(0.125).unwrap();
        assert_eq!(paragraph(invoke::render(slide, &later, &TextOnly)), "Hello");
        let done = start.tick(10.0).unwrap();
        assert_eq!(
            paragraph(invoke::render(slide, &done, &TextOnly)),
            "Hello there"
        );
    }

    #[test]
    fn unknown_transition_falls_back() {
        let deck = from_markdown("---\ntransition: wobble\n---\n\n# A\n", "x", TransitionKind::Instant)
            .unwrap();
        assert_eq!(deck.default_transition, Some(TransitionKind::Instant));
        assert_eq!(deck.name, "x");
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("talk.md");
        fs::write(&path, "# Only\n\nOne slide").unwrap();
        let deck = MarkdownLoader::new(&path).load().unwrap();
        assert_eq!(deck.name, "talk");
        assert_eq!(deck.len(), 1);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = MarkdownLoader::new(dir.path().join("gone.md"))
            .load()
            .unwrap_err();
        assert!(matches!(err, DeckError::Io { .. }));
    }

    #[test]
    fn empty_file_is_not_a_deck() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.md");
        fs::write(&path, "\n\n").unwrap();
        let err = MarkdownLoader::new(&path).load().unwrap_err();
        assert!(matches!(err, DeckError::NoDeckFound(_)));
    }
}
