use ratatui::style::{Color, Modifier, Style};

use crate::content::Rgb;

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub background: Color,
    pub foreground: Color,
    pub heading_color: Color,
    pub accent: Color,
    pub muted: Color,
    pub error: Color,
    pub code_background: Color,
    pub code_foreground: Color,
}

impl Theme {
    pub const NAMES: [&'static str; 2] = ["dark", "light"];

    pub fn dark() -> Self {
        Self {
            name: "dark",
            background: Color::Rgb(0x1E, 0x1E, 0x1E),
            foreground: Color::Rgb(0xC8, 0xC8, 0xC8),
            heading_color: Color::White,
            accent: Color::Rgb(0x52, 0x94, 0xE2),
            muted: Color::Rgb(0x80, 0x80, 0x80),
            error: Color::Rgb(0xFF, 0x6B, 0x6B),
            code_background: Color::Rgb(0x2D, 0x2D, 0x2D),
            code_foreground: Color::Rgb(0xD4, 0xD4, 0xD4),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light",
            background: Color::White,
            foreground: Color::Rgb(0x1A, 0x1A, 0x2E),
            heading_color: Color::Rgb(0x16, 0x21, 0x3E),
            accent: Color::Rgb(0x0F, 0x34, 0x60),
            muted: Color::Rgb(0x70, 0x70, 0x70),
            error: Color::Rgb(0xC7, 0x3E, 0x1D),
            code_background: Color::Rgb(0xF5, 0xF5, 0xF5),
            code_foreground: Color::Rgb(0x33, 0x33, 0x33),
        }
    }

    /// Same layout with every color reset to the terminal's own.
    pub fn plain() -> Self {
        Self {
            name: "plain",
            background: Color::Reset,
            foreground: Color::Reset,
            heading_color: Color::Reset,
            accent: Color::Reset,
            muted: Color::Reset,
            error: Color::Reset,
            code_background: Color::Reset,
            code_foreground: Color::Reset,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        if self.name == "dark" {
            Self::light()
        } else {
            Self::dark()
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.background)
    }

    pub fn heading(&self, level: u8) -> Style {
        let style = Style::default()
            .fg(self.heading_color)
            .add_modifier(Modifier::BOLD);
        match level {
            1 => style.add_modifier(Modifier::UNDERLINED),
            2 => style,
            _ => style.fg(self.accent),
        }
    }

    pub fn code(&self) -> Style {
        Style::default()
            .fg(self.code_foreground)
            .bg(self.code_background)
    }

    pub fn color(&self, rgb: Rgb) -> Color {
        if self.name == "plain" {
            return Color::Reset;
        }
        Color::Rgb(rgb.0, rgb.1, rgb.2)
    }

    /// The syntect theme that matches this presentation theme.
    pub fn syntect_theme_name(&self) -> &'static str {
        if self.name == "light" {
            "InspiredGitHub"
        } else {
            "base16-ocean.dark"
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
