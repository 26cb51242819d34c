use crate::content::Renderable;
use crate::slide::Slide;
use crate::transition::TransitionKind;
use crate::triggers::TriggerLedger;

/// An ordered collection of slides with a display name.
#[derive(Debug, Clone, Default)]
pub struct Deck {
    pub name: String,
    pub slides: Vec<Slide>,
    pub default_transition: Option<TransitionKind>,
    /// Text shown in the footer next to the deck name.
    pub footer: Option<String>,
    /// Theme requested by the deck itself, if any.
    pub theme: Option<String>,
}

impl Deck {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slides: Vec::new(),
            default_transition: Some(TransitionKind::Swipe),
            footer: None,
            theme: None,
        }
    }

    pub fn add_slide(mut self, slide: Slide) -> Self {
        self.slides.push(slide);
        self
    }

    pub fn slide<F>(self, title: impl Into<String>, content: F) -> Self
    where
        F: Fn() -> anyhow::Result<Renderable> + Send + Sync + 'static,
    {
        self.add_slide(Slide::new(title, content))
    }

    pub fn triggered_slide<F>(self, title: impl Into<String>, content: F) -> Self
    where
        F: Fn(&TriggerLedger) -> anyhow::Result<Renderable> + Send + Sync + 'static,
    {
        self.add_slide(Slide::triggered(title, content))
    }

    pub fn with_transition(mut self, transition: Option<TransitionKind>) -> Self {
        self.default_transition = transition;
        self
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slide> {
        self.slides.iter()
    }

    /// The transition used when entering `slide`.
    pub fn transition_for(&self, slide: &Slide) -> Option<TransitionKind> {
        slide.transition.or(self.default_transition)
    }
}
