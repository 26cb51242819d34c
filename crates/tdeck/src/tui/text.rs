//! Markdown blocks and leaf content as ratatui text.

use ratatui::layout::Alignment;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};

use crate::content::{Align, Renderable, TextStyle};
use crate::parser::{Block, Inline, ListItem, ListMarker};
use crate::theme::Theme;
use crate::tui::syntax::Highlighter;

const RULE_WIDTH: usize = 40;

/// Everything needed to turn content into styled lines.
pub struct Styler<'a> {
    pub theme: &'a Theme,
    pub highlighter: &'a Highlighter,
}

impl Styler<'_> {
    /// Lines for a leaf value. Containers are laid out by the view; here they
    /// flatten to their children's lines.
    pub fn text(&self, content: &Renderable) -> Text<'static> {
        match content {
            Renderable::Empty => Text::default(),
            Renderable::Text { text, style } => self.plain(text, style),
            Renderable::Blocks(blocks) => self.blocks(blocks),
            Renderable::Code { source, language } => {
                Text::from(self.highlighter.highlight(source, language.as_deref(), self.theme))
            }
            Renderable::Column(children) => {
                let mut lines = Vec::new();
                for child in children {
                    lines.extend(self.text(child).lines);
                }
                Text::from(lines)
            }
            Renderable::Centered(inner) => self.text(inner),
            Renderable::Panel { body, .. } => self.text(body),
            Renderable::Image { alt, path } => {
                Text::from(self.image_placeholder(alt, &path.display().to_string()))
            }
        }
    }

    fn plain(&self, text: &str, style: &TextStyle) -> Text<'static> {
        let mut s = self.theme.base();
        if style.bold {
            s = s.add_modifier(Modifier::BOLD);
        }
        if style.italic {
            s = s.add_modifier(Modifier::ITALIC);
        }
        if style.dim {
            s = s.add_modifier(Modifier::DIM);
        }
        if let Some(rgb) = style.color {
            s = s.fg(self.theme.color(rgb));
        }
        let alignment = match style.align {
            Align::Left => Alignment::Left,
            Align::Center => Alignment::Center,
            Align::Right => Alignment::Right,
        };
        let lines: Vec<Line<'static>> = text
            .lines()
            .map(|l| Line::from(Span::styled(l.to_string(), s)).alignment(alignment))
            .collect();
        Text::from(lines)
    }

    pub fn blocks(&self, blocks: &[Block]) -> Text<'static> {
        let mut lines: Vec<Line<'static>> = Vec::new();
        for (i, block) in blocks.iter().enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }
            self.block(block, &mut lines);
        }
        Text::from(lines)
    }

    fn block(&self, block: &Block, out: &mut Vec<Line<'static>>) {
        let theme = self.theme;
        match block {
            Block::Heading { level, inlines } => {
                out.push(Line::from(spans(inlines, theme.heading(*level), theme)));
            }
            Block::Paragraph { inlines } => {
                out.push(Line::from(spans(inlines, theme.base(), theme)));
            }
            Block::List { items, .. } => list(items, 0, theme, out),
            Block::Image { alt, path } => out.push(self.image_placeholder(alt, path)),
            Block::CodeBlock { language, code } => {
                out.extend(self.highlighter.highlight(code, language.as_deref(), theme));
            }
            Block::BlockQuote { inlines } => {
                let style = theme.base().add_modifier(Modifier::ITALIC);
                let mut line = vec![Span::styled("│ ", Style::default().fg(theme.accent))];
                line.extend(spans(inlines, style, theme));
                out.push(Line::from(line));
            }
            Block::HorizontalRule => out.push(Line::from(Span::styled(
                "─".repeat(RULE_WIDTH),
                Style::default().fg(theme.muted),
            ))),
        }
    }

    fn image_placeholder(&self, alt: &str, path: &str) -> Line<'static> {
        let label = if alt.is_empty() { path } else { alt };
        Line::from(Span::styled(
            format!("[image: {label}]"),
            Style::default()
                .fg(self.theme.muted)
                .add_modifier(Modifier::ITALIC),
        ))
    }
}

fn list(items: &[ListItem], depth: usize, theme: &Theme, out: &mut Vec<Line<'static>>) {
    let indent = "  ".repeat(depth);
    let mut number = 0;
    for item in items {
        let marker = if item.marker == ListMarker::Ordered {
            number += 1;
            format!("{indent}{number}. ")
        } else {
            format!("{indent}• ")
        };
        let mut line = vec![Span::styled(marker, Style::default().fg(theme.accent))];
        line.extend(spans(&item.inlines, theme.base(), theme));
        out.push(Line::from(line));
        list(&item.children, depth + 1, theme, out);
    }
}

fn spans(inlines: &[Inline], style: Style, theme: &Theme) -> Vec<Span<'static>> {
    let mut out = Vec::new();
    append(inlines, style, theme, &mut out);
    out
}

fn append(inlines: &[Inline], style: Style, theme: &Theme, out: &mut Vec<Span<'static>>) {
    for inline in inlines {
        match inline {
            Inline::Text(s) => out.push(Span::styled(s.clone(), style)),
            Inline::Bold(children) => append(children, style.add_modifier(Modifier::BOLD), theme, out),
            Inline::Italic(children) => {
                append(children, style.add_modifier(Modifier::ITALIC), theme, out)
            }
            Inline::Strikethrough(children) => append(
                children,
                style.add_modifier(Modifier::CROSSED_OUT),
                theme,
                out,
            ),
            Inline::Code(s) => out.push(Span::styled(s.clone(), theme.code())),
            Inline::Link { text, .. } => append(
                text,
                style.fg(theme.accent).add_modifier(Modifier::UNDERLINED),
                theme,
                out,
            ),
        }
    }
}

/// Rows `text` occupies when wrapped to `width` columns.
pub fn wrapped_height(text: &Text<'_>, width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let rows: usize = text
        .lines
        .iter()
        .map(|line| line.width().div_ceil(width).max(1))
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}
