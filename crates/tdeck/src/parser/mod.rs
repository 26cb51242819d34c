pub mod blocks;
pub mod frontmatter;
pub mod inline;
pub mod splitter;

use crate::error::{DeckError, DeckResult};

#[derive(Debug, Clone)]
pub struct Presentation {
    pub meta: PresentationMeta,
    pub slides: Vec<ParsedSlide>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct PresentationMeta {
    pub title: Option<String>,
    pub author: Option<String>,
    pub theme: Option<String>,
    pub transition: Option<String>,
    pub footer: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ParsedSlide {
    pub directives: Vec<Directive>,
    pub blocks: Vec<Block>,
    pub layout: Layout,
    /// The raw markdown this slide was parsed from.
    pub raw_source: String,
}

impl ParsedSlide {
    pub fn directive(&self, name: &str) -> Option<&str> {
        self.directives
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.value.as_str())
    }

    /// `@title` if given, otherwise the text of the first heading.
    pub fn title(&self) -> Option<String> {
        if let Some(title) = self.directive("title") {
            return Some(title.to_string());
        }
        self.blocks.iter().find_map(|b| match b {
            Block::Heading { inlines, .. } => Some(inlines_to_text(inlines)),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { level: u8, inlines: Vec<Inline> },
    Paragraph { inlines: Vec<Inline> },
    List { ordered: bool, items: Vec<ListItem> },
    Image { alt: String, path: String },
    CodeBlock { language: Option<String>, code: String },
    BlockQuote { inlines: Vec<Inline> },
    HorizontalRule,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Bold(Vec<Inline>),
    Italic(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Code(String),
    Link { text: Vec<Inline>, url: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub marker: ListMarker,
    pub inlines: Vec<Inline>,
    pub children: Vec<ListItem>,
}

/// How a list item takes part in incremental reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMarker {
    /// `-`: always shown.
    Static,
    /// `+`: appears on the next trigger.
    NextStep,
    /// `*`: appears together with the preceding `+` item.
    WithPrev,
    /// `1.`: always shown, numbered.
    Ordered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Title,
    Section,
    Content,
}

/// Parse a whole markdown deck.
///
/// Fails when the front matter is not valid YAML or when no slide has any
/// content; both count as "no deck found" for the reloader.
pub fn parse(content: &str) -> DeckResult<Presentation> {
    let (meta, body) = frontmatter::extract(content)?;
    let slides: Vec<ParsedSlide> = splitter::split(&body)
        .into_iter()
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| {
            let (directives, content) = blocks::extract_directives(&raw);
            let blocks = blocks::parse(&content);
            let layout = classify_layout(&blocks);
            ParsedSlide {
                directives,
                blocks,
                layout,
                raw_source: raw,
            }
        })
        .collect();

    if slides.is_empty() {
        return Err(DeckError::no_deck("the document contains no slides"));
    }

    Ok(Presentation { meta, slides })
}

fn classify_layout(blocks: &[Block]) -> Layout {
    let headings: Vec<u8> = blocks
        .iter()
        .filter_map(|b| match b {
            Block::Heading { level, .. } => Some(*level),
            _ => None,
        })
        .collect();

    // A lone heading is a section divider.
    if blocks.len() == 1 && headings.len() == 1 {
        return Layout::Section;
    }

    // H1 followed by an H2 or a short paragraph is a title slide.
    if blocks.len() == 2 && matches!(blocks[0], Block::Heading { level: 1, .. }) {
        match &blocks[1] {
            Block::Heading { level: 2, .. } => return Layout::Title,
            Block::Paragraph { inlines } if inlines_to_text(inlines).len() < 120 => {
                return Layout::Title;
            }
            _ => {}
        }
    }

    Layout::Content
}

/// Number of triggers needed to reveal everything in `blocks`.
/// Each `+` item in any list is one step.
pub fn compute_max_steps(blocks: &[Block]) -> usize {
    blocks
        .iter()
        .map(|b| match b {
            Block::List { items, .. } => count_next_steps(items),
            _ => 0,
        })
        .max()
        .unwrap_or(0)
}

fn count_next_steps(items: &[ListItem]) -> usize {
    items
        .iter()
        .map(|item| {
            usize::from(item.marker == ListMarker::NextStep) + count_next_steps(&item.children)
        })
        .sum()
}

/// Drop list items whose reveal step is beyond `step`.
///
/// Step counting restarts for every list, so parallel lists on one slide
/// reveal side by side.
pub fn reveal_blocks(blocks: &[Block], step: usize) -> Vec<Block> {
    blocks
        .iter()
        .map(|block| match block {
            Block::List { ordered, items } => {
                let mut counter = 0;
                Block::List {
                    ordered: *ordered,
                    items: reveal_items(items, step, &mut counter),
                }
            }
            other => other.clone(),
        })
        .collect()
}

fn reveal_items(items: &[ListItem], step: usize, counter: &mut usize) -> Vec<ListItem> {
    let mut visible = Vec::new();
    for item in items {
        let item_step = match item.marker {
            ListMarker::Static | ListMarker::Ordered => 0,
            ListMarker::NextStep => {
                *counter += 1;
                *counter
            }
            ListMarker::WithPrev => *counter,
        };
        // Hidden items still advance the counter for their children.
        let children = reveal_items(&item.children, step, counter);
        if item_step <= step {
            visible.push(ListItem {
                marker: item.marker,
                inlines: item.inlines.clone(),
                children,
            });
        }
    }
    visible
}

/// Keep at most `budget` characters of paragraph and quote text, in order.
/// Headings, lists and code are left alone.
pub fn typewriter_blocks(blocks: &[Block], mut budget: usize) -> Vec<Block> {
    blocks
        .iter()
        .map(|block| match block {
            Block::Paragraph { inlines } => Block::Paragraph {
                inlines: truncate_inlines(inlines, &mut budget),
            },
            Block::BlockQuote { inlines } => Block::BlockQuote {
                inlines: truncate_inlines(inlines, &mut budget),
            },
            other => other.clone(),
        })
        .collect()
}

/// Characters of paragraph and quote text on a slide.
pub fn typewriter_len(blocks: &[Block]) -> usize {
    blocks
        .iter()
        .map(|b| match b {
            Block::Paragraph { inlines } | Block::BlockQuote { inlines } => {
                inlines_to_text(inlines).chars().count()
            }
            _ => 0,
        })
        .sum()
}

fn truncate_inlines(inlines: &[Inline], budget: &mut usize) -> Vec<Inline> {
    let mut out = Vec::new();
    for inline in inlines {
        if *budget == 0 {
            break;
        }
        let truncated = match inline {
            Inline::Text(s) => Inline::Text(take_chars(s, budget)),
            Inline::Code(s) => Inline::Code(take_chars(s, budget)),
            Inline::Bold(children) => Inline::Bold(truncate_inlines(children, budget)),
            Inline::Italic(children) => Inline::Italic(truncate_inlines(children, budget)),
            Inline::Strikethrough(children) => {
                Inline::Strikethrough(truncate_inlines(children, budget))
            }
            Inline::Link { text, url } => Inline::Link {
                text: truncate_inlines(text, budget),
                url: url.clone(),
            },
        };
        out.push(truncated);
    }
    out
}

fn take_chars(s: &str, budget: &mut usize) -> String {
    let taken: String = s.chars().take(*budget).collect();
    *budget -= taken.chars().count();
    taken
}

/// Extract plain text from inline elements.
pub fn inlines_to_text(inlines: &[Inline]) -> String {
    let mut text = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(s) | Inline::Code(s) => text.push_str(s),
            Inline::Bold(children) | Inline::Italic(children) | Inline::Strikethrough(children) => {
                text.push_str(&inlines_to_text(children));
            }
            Inline::Link { text: t, .. } => text.push_str(&inlines_to_text(t)),
        }
    }
    text
}
