//! Calling slide content without letting it take the presentation down.
//!
//! Errors returned by content, panics raised by it, and values the renderer
//! cannot draw all turn into a [`RenderFailure`] scoped to that one slide.

use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

use crate::content::{Renderable, Renderer};
use crate::slide::{Content, Slide};
use crate::triggers::TriggerLedger;

thread_local! {
    static CONTAINING: Cell<u32> = const { Cell::new(0) };
}

/// True while slide content is running on this thread.
///
/// Panic hooks use this to leave the terminal alone for panics that
/// [`render`] is about to catch.
pub fn is_containing() -> bool {
    CONTAINING.with(|c| c.get() > 0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderFailure {
    pub title: String,
    pub message: String,
    /// Error sources, outermost first, not including `message`.
    pub causes: Vec<String>,
    pub panicked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Content(Renderable),
    Failed(RenderFailure),
}

impl Rendered {
    /// The flag a renderer styles distinctly.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Produce the content of `slide` for the given trigger state.
pub fn render(slide: &Slide, ledger: &TriggerLedger, renderer: &dyn Renderer) -> Rendered {
    let outcome = contain(|| match &slide.content {
        Content::Static(f) => f(),
        Content::Triggered(f) => f(ledger),
    });

    let result = match outcome {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(slide = %slide.title, %message, "slide content panicked");
            return Rendered::Failed(RenderFailure {
                title: slide.title.clone(),
                message,
                causes: Vec::new(),
                panicked: true,
            });
        }
    };

    let content = match result {
        Ok(content) => content,
        Err(err) => {
            warn!(slide = %slide.title, error = %err, "slide content failed");
            return Rendered::Failed(RenderFailure {
                title: slide.title.clone(),
                message: err.to_string(),
                causes: err.chain().skip(1).map(ToString::to_string).collect(),
                panicked: false,
            });
        }
    };

    match renderer.accepts(&content) {
        Ok(()) => Rendered::Content(content),
        Err(err) => {
            warn!(slide = %slide.title, error = %err, "slide content is not renderable");
            Rendered::Failed(RenderFailure {
                title: slide.title.clone(),
                message: err.to_string(),
                causes: Vec::new(),
                panicked: false,
            })
        }
    }
}

fn contain<T>(f: impl FnOnce() -> T) -> Result<T, Box<dyn Any + Send>> {
    struct Guard;
    impl Drop for Guard {
        fn drop(&mut self) {
            CONTAINING.with(|c| c.set(c.get() - 1));
        }
    }

    CONTAINING.with(|c| c.set(c.get() + 1));
    let _guard = Guard;
    panic::catch_unwind(AssertUnwindSafe(f))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "slide content panicked".to_string()
    }
}
