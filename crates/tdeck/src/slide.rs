use std::fmt;
use std::sync::Arc;

use crate::content::Renderable;
use crate::transition::TransitionKind;
use crate::triggers::TriggerLedger;

type StaticFn = dyn Fn() -> anyhow::Result<Renderable> + Send + Sync;
type TriggeredFn = dyn Fn(&TriggerLedger) -> anyhow::Result<Renderable> + Send + Sync;

/// A slide's content producer, in one of two shapes fixed when the slide is
/// built: it either ignores trigger state or receives the current ledger.
#[derive(Clone)]
pub enum Content {
    Static(Arc<StaticFn>),
    Triggered(Arc<TriggeredFn>),
}

impl Content {
    pub fn wants_triggers(&self) -> bool {
        matches!(self, Self::Triggered(_))
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(_) => f.write_str("Content::Static"),
            Self::Triggered(_) => f.write_str("Content::Triggered"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Slide {
    pub title: String,
    pub content: Content,
    /// Overrides the deck's default transition when entering this slide.
    pub transition: Option<TransitionKind>,
}

impl Slide {
    pub fn new<F>(title: impl Into<String>, content: F) -> Self
    where
        F: Fn() -> anyhow::Result<Renderable> + Send + Sync + 'static,
    {
        Self {
            title: title.into(),
            content: Content::Static(Arc::new(content)),
            transition: None,
        }
    }

    pub fn triggered<F>(title: impl Into<String>, content: F) -> Self
    where
        F: Fn(&TriggerLedger) -> anyhow::Result<Renderable> + Send + Sync + 'static,
    {
        Self {
            title: title.into(),
            content: Content::Triggered(Arc::new(content)),
            transition: None,
        }
    }

    /// A slide that always shows the same value.
    pub fn fixed(title: impl Into<String>, content: Renderable) -> Self {
        Self::new(title, move || Ok(content.clone()))
    }

    pub fn with_transition(mut self, transition: TransitionKind) -> Self {
        self.transition = Some(transition);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_shape_is_fixed_at_construction() {
        let plain = Slide::new("plain", || Ok(Renderable::text("hi")));
        let reactive = Slide::triggered("reactive", |t| {
            Ok(Renderable::text(format!("{} triggers", t.count())))
        });
        assert!(!plain.content.wants_triggers());
        assert!(reactive.content.wants_triggers());
    }

    #[test]
    fn clones_share_content() {
        let slide = Slide::fixed("a", Renderable::text("x")).with_transition(TransitionKind::Instant);
        let copy = slide.clone();
        match (&slide.content, &copy.content) {
            (Content::Static(a), Content::Static(b)) => assert!(Arc::ptr_eq(a, b)),
            _ => panic!("expected static content"),
        }
        assert_eq!(copy.transition, Some(TransitionKind::Instant));
    }
}
