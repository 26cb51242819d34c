//! Drawing: the current slide, transitions, the deck overview, help and
//! the footer.

use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Layout, Margin, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block as Pane, BorderType, Clear, Paragraph, Widget, Wrap};

use crate::content::Renderable;
use crate::invoke::{self, RenderFailure, Rendered};
use crate::slide::Slide;
use crate::state::Mode;
use crate::transition::TransitionState;
use crate::triggers::TriggerLedger;
use crate::tui::App;
use crate::tui::text::{Styler, wrapped_height};

const CELL_WIDTH: u16 = 28;
const CELL_HEIGHT: u16 = 5;
const ERROR_WIDTH: u16 = 72;
const GRID_MARGIN: Margin = Margin::new(1, 1);

/// Columns in the overview grid for a terminal `width` cells wide. Both the
/// grid drawing and the cursor's row stride go through this.
pub fn grid_columns(width: u16) -> usize {
    let usable = width.saturating_sub(2 * GRID_MARGIN.horizontal);
    usize::from((usable / CELL_WIDTH).max(1))
}

pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let buf = frame.buffer_mut();
    Pane::default().style(app.theme.base()).render(area, buf);

    let [body, footer] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);
    let state = &app.state;

    match state.mode() {
        Mode::Deck => draw_grid(app, body, buf),
        Mode::Slide | Mode::Help => match state.transition() {
            Some(t) => draw_transition(app, t, state.now(), body, buf),
            None => {
                let rendered = state.render_current(&app.renderer);
                draw_rendered(app, &rendered, body, buf);
            }
        },
    }
    if state.mode() == Mode::Help {
        draw_help(app, body, buf);
    }
    draw_footer(app, footer, buf);
}

fn styler(app: &App) -> Styler<'_> {
    Styler {
        theme: &app.theme,
        highlighter: &app.highlighter,
    }
}

fn draw_rendered(app: &App, rendered: &Rendered, area: Rect, buf: &mut Buffer) {
    let inner = area.inner(Margin::new(2, 1));
    match rendered {
        Rendered::Content(content) => layout(app, content, inner, buf),
        Rendered::Failed(failure) => draw_failure(app, failure, inner, buf),
    }
}

/// Lay `content` out inside `area`. Containers split the area; leaves are
/// wrapped paragraphs.
fn layout(app: &App, content: &Renderable, area: Rect, buf: &mut Buffer) {
    if area.is_empty() {
        return;
    }
    match content {
        Renderable::Empty => {}
        Renderable::Centered(inner) => {
            let width = natural_width(app, inner).min(area.width);
            let height = height(app, inner, width).min(area.height);
            layout(app, inner, centered(area, width, height), buf);
        }
        Renderable::Panel { title, body } => {
            let mut block = Pane::bordered()
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(app.theme.accent));
            if let Some(title) = title {
                block = block.title(format!(" {title} "));
            }
            let inner = block.inner(area).inner(Margin::new(1, 0));
            block.render(area, buf);
            layout(app, body, inner, buf);
        }
        Renderable::Column(children) => {
            let bottom = area.bottom();
            let mut y = area.y;
            for child in children {
                if y >= bottom {
                    break;
                }
                let h = height(app, child, area.width).min(bottom - y);
                layout(app, child, Rect { y, height: h, ..area }, buf);
                y += h;
            }
        }
        leaf => Paragraph::new(styler(app).text(leaf))
            .wrap(Wrap { trim: false })
            .render(area, buf),
    }
}

fn height(app: &App, content: &Renderable, width: u16) -> u16 {
    match content {
        Renderable::Empty => 0,
        Renderable::Centered(inner) => height(app, inner, width),
        Renderable::Panel { body, .. } => height(app, body, width.saturating_sub(4)).saturating_add(2),
        Renderable::Column(children) => children
            .iter()
            .fold(0u16, |acc, c| acc.saturating_add(height(app, c, width))),
        leaf => wrapped_height(&styler(app).text(leaf), width),
    }
}

fn natural_width(app: &App, content: &Renderable) -> u16 {
    let width = match content {
        Renderable::Empty => 0,
        Renderable::Centered(inner) => return natural_width(app, inner),
        Renderable::Panel { body, title } => {
            let title = title.as_deref().map_or(0, |t| t.chars().count() + 4);
            (usize::from(natural_width(app, body)) + 4).max(title)
        }
        Renderable::Column(children) => children
            .iter()
            .map(|c| usize::from(natural_width(app, c)))
            .max()
            .unwrap_or(0),
        leaf => styler(app).text(leaf).width(),
    };
    u16::try_from(width).unwrap_or(u16::MAX)
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn draw_failure(app: &App, failure: &RenderFailure, area: Rect, buf: &mut Buffer) {
    let error = Style::default().fg(app.theme.error);
    let mut lines = vec![Line::from(Span::styled(
        failure.message.clone(),
        error.add_modifier(Modifier::BOLD),
    ))];
    for cause in &failure.causes {
        lines.push(Line::from(Span::styled(
            format!("  caused by: {cause}"),
            Style::default().fg(app.theme.foreground),
        )));
    }
    if failure.panicked {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "(panicked)",
            Style::default().fg(app.theme.muted),
        )));
    }

    let text = Text::from(lines);
    let width = ERROR_WIDTH.min(area.width);
    let height = wrapped_height(&text, width.saturating_sub(4)).saturating_add(2);
    let rect = centered(area, width, height);
    let block = Pane::bordered()
        .border_type(BorderType::Double)
        .border_style(error)
        .title(format!(" {} ", failure.title))
        .style(app.theme.base());
    let inner = block.inner(rect).inner(Margin::new(1, 0));
    Clear.render(rect, buf);
    block.render(rect, buf);
    Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .render(inner, buf);
}

/// Draw both ends of a transition offscreen and copy them in at their
/// current column offsets.
fn draw_transition(app: &App, t: &TransitionState, now: f64, area: Rect, buf: &mut Buffer) {
    let (from_x, to_x) = t.offsets_at(now).columns(area.width);
    let incoming = TriggerLedger::new(t.start)
        .tick(now)
        .unwrap_or_else(|_| TriggerLedger::new(now));

    let from = offscreen(app, &t.from_slide, &t.from_ledger, area);
    let to = offscreen(app, &t.to_slide, &incoming, area);
    blit(&from, from_x, area, buf);
    blit(&to, to_x, area, buf);
}

fn offscreen(app: &App, slide: &Slide, ledger: &TriggerLedger, area: Rect) -> Buffer {
    let local = Rect::new(0, 0, area.width, area.height);
    let mut buf = Buffer::empty(local);
    Pane::default().style(app.theme.base()).render(local, &mut buf);
    let rendered = invoke::render(slide, ledger, &app.renderer);
    draw_rendered(app, &rendered, local, &mut buf);
    buf
}

fn blit(src: &Buffer, dx: i32, area: Rect, dst: &mut Buffer) {
    let width = i32::from(area.width);
    for y in 0..area.height {
        for x in 0..area.width {
            let target = i32::from(x) + dx;
            if !(0..width).contains(&target) {
                continue;
            }
            let Ok(target) = u16::try_from(target) else {
                continue;
            };
            if let (Some(cell), Some(out)) = (
                src.cell((x, y)),
                dst.cell_mut((area.x + target, area.y + y)),
            ) {
                *out = cell.clone();
            }
        }
    }
}

fn draw_grid(app: &App, area: Rect, buf: &mut Buffer) {
    let state = &app.state;
    let theme = &app.theme;
    let columns = grid_columns(area.width);
    let area = area.inner(GRID_MARGIN);
    let visible_rows = usize::from((area.height / CELL_HEIGHT).max(1));
    let cursor_row = state.cursor() / columns;
    let first_row = cursor_row.saturating_sub(visible_rows - 1);
    let cell_width = area.width / u16::try_from(columns).unwrap_or(1).max(1);

    for (index, slide) in state.deck().iter().enumerate() {
        let row = index / columns;
        if row < first_row || row >= first_row + visible_rows {
            continue;
        }
        let (Ok(col), Ok(row)) = (u16::try_from(index % columns), u16::try_from(row - first_row))
        else {
            continue;
        };
        let rect = Rect {
            x: area.x + col * cell_width,
            y: area.y + row * CELL_HEIGHT,
            width: cell_width.saturating_sub(1),
            height: CELL_HEIGHT.min(area.height.saturating_sub(row * CELL_HEIGHT)),
        };

        let selected = index == state.cursor();
        let border = if selected {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.muted)
        };
        let marker = if index == state.current_index() { " •" } else { "" };
        let block = Pane::bordered()
            .border_type(if selected { BorderType::Thick } else { BorderType::Rounded })
            .border_style(border)
            .title(format!(" {}{marker} ", index + 1));
        let inner = block.inner(rect);
        block.render(rect, buf);

        let mut title = theme.base();
        if selected {
            title = title.add_modifier(Modifier::BOLD);
        }
        Paragraph::new(Line::from(Span::styled(slide.title.clone(), title)))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(inner.inner(Margin::new(1, 0)), buf);
    }
}

fn draw_help(app: &App, area: Rect, buf: &mut Buffer) {
    let theme = &app.theme;
    let rows = app.keymap.describe();
    let key_width = rows.iter().map(|(_, keys, _)| keys.chars().count()).max().unwrap_or(0);

    let mut lines = Vec::with_capacity(rows.len() + 1);
    let mut scope = None;
    for (row_scope, keys, what) in rows {
        if scope != Some(row_scope) {
            if scope.is_some() {
                lines.push(Line::default());
            }
            lines.push(Line::from(Span::styled(
                row_scope.to_string(),
                theme.heading(2),
            )));
            scope = Some(row_scope);
        }
        lines.push(Line::from(vec![
            Span::styled(format!("  {keys:<key_width$}  "), Style::default().fg(theme.accent)),
            Span::styled(what, Style::default().fg(theme.foreground)),
        ]));
    }

    let text = Text::from(lines);
    let width = u16::try_from(text.width() + 4).unwrap_or(u16::MAX);
    let height = u16::try_from(text.height() + 2).unwrap_or(u16::MAX);
    let rect = centered(area, width, height);
    let block = Pane::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.accent))
        .title(" Keys ")
        .style(theme.base());
    let inner = block.inner(rect).inner(Margin::new(1, 0));
    Clear.render(rect, buf);
    block.render(rect, buf);
    Paragraph::new(text).render(inner, buf);
}

fn draw_footer(app: &App, area: Rect, buf: &mut Buffer) {
    let state = &app.state;
    let theme = &app.theme;
    let muted = Style::default().fg(theme.muted);
    let deck = state.deck();

    let [left, middle, right] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Fill(2),
        Constraint::Length(14),
    ])
    .areas(area);

    let label = deck.footer.clone().unwrap_or_else(|| deck.name.clone());
    Paragraph::new(Span::styled(format!(" {label}"), muted)).render(left, buf);

    if let Some(message) = state.message() {
        let style = if message.is_error {
            Style::default()
                .fg(theme.error)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.accent)
        };
        Paragraph::new(Span::styled(message.text.clone(), style))
            .alignment(Alignment::Center)
            .render(middle, buf);
    }

    let position = format!("[{} / {}] ", state.current_index() + 1, deck.len());
    Paragraph::new(Span::styled(position, muted))
        .alignment(Alignment::Right)
        .render(right, buf);
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::clock::ManualClock;
    use crate::content::{Align, TextStyle};
    use crate::deck::Deck;
    use crate::state::{PresentationState, StateOptions};
    use crate::theme::Theme;
    use crate::tui::keymap::Keymap;
    use crate::tui::syntax::Highlighter;

    fn app(deck: Deck, clock: ManualClock) -> App {
        let state =
            PresentationState::new(deck, Box::new(clock), StateOptions::default()).unwrap();
        App::new(
            state,
            Keymap::default_bindings().unwrap(),
            Theme::plain(),
            Highlighter::new(),
        )
    }

    fn deck() -> Deck {
        Deck::new("demo")
            .add_slide(Slide::fixed("One", Renderable::text("first slide")))
            .add_slide(Slide::fixed("Two", Renderable::text("second slide")))
            .add_slide(Slide::new("Broken", || anyhow::bail!("no data")))
    }

    fn screen(app: &App, width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn slide_and_footer() {
        let app = app(deck(), ManualClock::new(0.0));
        let rows = screen(&app, 40, 8);
        assert!(rows.iter().any(|r| r.contains("first slide")));
        let footer = rows.last().unwrap();
        assert!(footer.contains("demo"));
        assert!(footer.contains("[1 / 3]"));
    }

    #[test]
    fn failures_are_drawn_in_place() {
        let clock = ManualClock::new(0.0);
        let mut app = app(deck(), clock);
        app.state.goto(2);
        let rows = screen(&app, 60, 10);
        assert!(rows.iter().any(|r| r.contains("Broken")));
        assert!(rows.iter().any(|r| r.contains("no data")));
        assert!(rows.last().unwrap().contains("[3 / 3]"));
    }

    #[test]
    fn transition_shows_both_slides_midway() {
        let clock = ManualClock::new(0.0);
        let deck = Deck::new("t")
            .add_slide(Slide::fixed(
                "One",
                Renderable::styled("first slide", TextStyle::default().align(Align::Right)),
            ))
            .add_slide(Slide::fixed("Two", Renderable::text("second slide")));
        let mut app = app(deck, clock.clone());
        assert!(app.state.next());
        clock.set(app.state.options().transition_duration / 2.0);
        let rows = screen(&app, 80, 6).join("\n");
        assert!(rows.contains("first slide"));
        assert!(rows.contains("second slide"));
        assert!(app.state.is_animating());
    }

    #[test]
    fn grid_highlights_cursor() {
        let mut app = app(deck(), ManualClock::new(0.0));
        app.state.set_mode(Mode::Deck);
        let rows = screen(&app, 90, 10).join("\n");
        assert!(rows.contains("One"));
        assert!(rows.contains("Two"));
        assert!(rows.contains("Broken"));
        assert!(rows.contains("1 •"));
    }

    #[test]
    fn help_lists_bindings() {
        let mut app = app(deck(), ManualClock::new(0.0));
        app.state.set_mode(Mode::Help);
        let rows = screen(&app, 80, 40).join("\n");
        assert!(rows.contains("Quit"));
        assert!(rows.contains("q ctrl-c"));
    }

    #[test]
    fn centered_content_is_centered() {
        let slide = Slide::fixed(
            "Title",
            Renderable::styled("hi", TextStyle::default()).centered(),
        );
        let app = app(Deck::new("d").add_slide(slide), ManualClock::new(0.0));
        let rows = screen(&app, 20, 7);
        let row = rows.iter().find(|r| r.contains("hi")).unwrap();
        assert_eq!(row.find("hi"), Some(9));
        assert_eq!(rows.iter().position(|r| r.contains("hi")), Some(2));
    }

    #[test]
    fn grid_columns_scale_with_width() {
        assert_eq!(grid_columns(0), 1);
        assert_eq!(grid_columns(29), 1);
        assert_eq!(grid_columns(84), 2);
        assert_eq!(grid_columns(86), 3);
    }

    #[test]
    fn grid_draws_as_many_columns_as_the_cursor_steps() {
        let deck = (0..6).fold(Deck::new("six").with_transition(None), |deck, i| {
            deck.add_slide(Slide::fixed(format!("s{i}"), Renderable::Empty))
        });
        let mut app = app(deck, ManualClock::new(0.0));
        app.state.set_mode(Mode::Deck);
        let rows = screen(&app, 84, 20);
        let top = rows.iter().find(|r| r.contains(" 1 ")).unwrap();
        assert!(top.contains(" 2 "));
        assert!(!top.contains(" 3 "));
        let second = rows.iter().find(|r| r.contains(" 3 ")).unwrap();
        assert!(second.contains(" 4 "));
    }
}
