use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::theme::Theme;

/// Syntax highlighting for code blocks. Loading the syntax and theme sets is
/// slow, so build one and reuse it.
pub struct Highlighter {
    syntaxes: SyntaxSet,
    themes: ThemeSet,
}

impl Highlighter {
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            themes: ThemeSet::load_defaults(),
        }
    }

    /// Highlight `code` into styled lines. Unknown languages, the plain
    /// theme and highlighter errors all fall back to uncolored code.
    pub fn highlight(&self, code: &str, language: Option<&str>, theme: &Theme) -> Vec<Line<'static>> {
        let base = theme.code();
        let plain = || {
            code.lines()
                .map(|l| Line::from(Span::styled(l.to_string(), base)))
                .collect()
        };

        if theme.name == "plain" {
            return plain();
        }
        let Some(syntax) = language.and_then(|lang| self.syntaxes.find_syntax_by_token(lang)) else {
            return plain();
        };
        let Some(syntect_theme) = self.themes.themes.get(theme.syntect_theme_name()) else {
            return plain();
        };

        let mut highlighter = HighlightLines::new(syntax, syntect_theme);
        let mut lines = Vec::new();
        for line in LinesWithEndings::from(code) {
            let Ok(regions) = highlighter.highlight_line(line, &self.syntaxes) else {
                return plain();
            };
            let spans: Vec<Span<'static>> = regions
                .into_iter()
                .map(|(style, text)| {
                    let text = text.trim_end_matches(['\n', '\r']).to_string();
                    Span::styled(text, base.patch(convert(style)))
                })
                .filter(|span| !span.content.is_empty())
                .collect();
            lines.push(Line::from(spans));
        }
        lines
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

fn convert(style: syntect::highlighting::Style) -> Style {
    let fg = style.foreground;
    let mut out = Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b));
    if style.font_style.contains(FontStyle::BOLD) {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        out = out.add_modifier(Modifier::UNDERLINED);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn known_language_is_colored() {
        let hl = Highlighter::new();
        let lines = hl.highlight("fn main() {\n    let x = 1;\n}", Some("rust"), &Theme::dark());
        assert_eq!(text(&lines), vec!["fn main() {", "    let x = 1;", "}"]);
        let colors: std::collections::HashSet<_> = lines
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.style.fg))
            .collect();
        assert!(colors.len() > 1);
    }

    #[test]
    fn unknown_language_falls_back() {
        let hl = Highlighter::new();
        let lines = hl.highlight("a\nb", Some("no-such-lang"), &Theme::dark());
        assert_eq!(text(&lines), vec!["a", "b"]);
        assert!(lines.iter().all(|l| l.spans[0].style == Theme::dark().code()));
    }
}
