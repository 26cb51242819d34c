//! Renderable slide content.
//!
//! [`Renderable`] describes *what* a slide shows without committing to a
//! terminal toolkit. A [`Renderer`] decides whether it can draw a given value;
//! the terminal front end in [`crate::tui`] is one such renderer.

use std::path::PathBuf;

use crate::error::{DeckError, DeckResult};
use crate::parser::{self, Block};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,
    pub dim: bool,
    pub color: Option<Rgb>,
    pub align: Align,
}

impl TextStyle {
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn dim(mut self) -> Self {
        self.dim = true;
        self
    }

    pub fn color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Renderable {
    #[default]
    Empty,
    Text {
        text: String,
        style: TextStyle,
    },
    Blocks(Vec<Block>),
    Code {
        source: String,
        language: Option<String>,
    },
    /// Children stacked top to bottom.
    Column(Vec<Renderable>),
    /// Centered horizontally and vertically in the available area.
    Centered(Box<Renderable>),
    Panel {
        title: Option<String>,
        body: Box<Renderable>,
    },
    Image {
        path: PathBuf,
        alt: String,
    },
}

impl Renderable {
    pub fn text(text: impl Into<String>) -> Self {
        Self::styled(text, TextStyle::default())
    }

    pub fn styled(text: impl Into<String>, style: TextStyle) -> Self {
        Self::Text {
            text: text.into(),
            style,
        }
    }

    /// Parse a markdown snippet into blocks.
    pub fn markdown(source: &str) -> Self {
        Self::Blocks(parser::blocks::parse(source))
    }

    pub fn code(source: impl Into<String>, language: Option<&str>) -> Self {
        Self::Code {
            source: source.into(),
            language: language.map(str::to_string),
        }
    }

    pub fn column(children: impl IntoIterator<Item = Renderable>) -> Self {
        Self::Column(children.into_iter().collect())
    }

    pub fn centered(self) -> Self {
        Self::Centered(Box::new(self))
    }

    pub fn panel(self, title: Option<&str>) -> Self {
        Self::Panel {
            title: title.map(str::to_string),
            body: Box::new(self),
        }
    }

    /// Visit this value and every nested child, depth first.
    pub fn walk(&self, visit: &mut dyn FnMut(&Renderable)) {
        visit(self);
        match self {
            Self::Column(children) => children.iter().for_each(|c| c.walk(visit)),
            Self::Centered(inner) => inner.walk(visit),
            Self::Panel { body, .. } => body.walk(visit),
            _ => {}
        }
    }
}

/// The rendering collaborator's capability check.
pub trait Renderer {
    /// `Ok` if this renderer can draw `content`.
    fn accepts(&self, content: &Renderable) -> DeckResult<()>;
}

impl<F> Renderer for F
where
    F: Fn(&Renderable) -> DeckResult<()>,
{
    fn accepts(&self, content: &Renderable) -> DeckResult<()> {
        self(content)
    }
}

/// Accepts everything except raster images, which a character grid cannot
/// show. Markdown image blocks are drawn as placeholders and are fine.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextOnly;

impl Renderer for TextOnly {
    fn accepts(&self, content: &Renderable) -> DeckResult<()> {
        let mut rejected = None;
        content.walk(&mut |node| {
            if let Renderable::Image { path, .. } = node {
                rejected.get_or_insert_with(|| path.display().to_string());
            }
        });
        match rejected {
            Some(path) => Err(DeckError::not_renderable(format!(
                "image {path} cannot be drawn as text"
            ))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_nest() {
        let content = Renderable::column([
            Renderable::styled("Title", TextStyle::default().bold().align(Align::Center)),
            Renderable::code("let x = 1;", Some("rust")),
        ])
        .centered()
        .panel(Some("demo"));

        let mut seen = 0;
        content.walk(&mut |_| seen += 1);
        assert_eq!(seen, 5);
    }

    #[test]
    fn markdown_parses_blocks() {
        let Renderable::Blocks(blocks) = Renderable::markdown("# Hi\n\n- a\n- b") else {
            panic!("expected blocks");
        };
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn text_only_rejects_nested_images() {
        assert!(TextOnly.accepts(&Renderable::text("fine")).is_ok());
        let nested = Renderable::column([Renderable::Image {
            path: PathBuf::from("cat.png"),
            alt: "cat".to_string(),
        }])
        .centered();
        let err = TextOnly.accepts(&nested).unwrap_err();
        assert!(err.to_string().contains("cat.png"));
    }

    #[test]
    fn closures_are_renderers() {
        let strict = |c: &Renderable| match c {
            Renderable::Empty => Err(DeckError::not_renderable("empty")),
            _ => Ok(()),
        };
        assert!(strict.accepts(&Renderable::Empty).is_err());
        assert!(strict.accepts(&Renderable::text("x")).is_ok());
    }
}
