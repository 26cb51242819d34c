use crate::content::{Align, Renderable, Rgb, TextStyle};
use crate::deck::Deck;
use crate::slide::Slide;
use crate::transition::TransitionKind;
use crate::triggers::TriggerLedger;

const BAR_WIDTH: usize = 30;
const BAR_SECONDS: f64 = 3.0;
const ACCENT: Rgb = Rgb(0x52, 0x94, 0xE2);

const CODE: &str = r#"Deck::new("talk")
    .slide("Hello", || Ok(Renderable::text("hi")))
    .triggered_slide("Counter", |ledger| {
        Ok(Renderable::text(format!("{}", ledger.count() - 1)))
    })"#;

/// A deck built in code, showing what slide content can do beyond markdown.
pub fn deck() -> Deck {
    Deck::new("tdeck demo")
        .with_transition(Some(TransitionKind::Swipe))
        .add_slide(Slide::fixed("tdeck", title()))
        .triggered_slide("Counter", counter)
        .triggered_slide("Progress", progress)
        .triggered_slide("Steps", steps)
        .add_slide(
            Slide::fixed(
                "Slides are code",
                Renderable::column([
                    Renderable::markdown("# Slides are code\n\nEach slide is a function of the trigger ledger:"),
                    Renderable::code(CODE, Some("rust")).panel(Some("main.rs")),
                ]),
            )
            .with_transition(TransitionKind::Instant),
        )
        .slide("Failure", || {
            anyhow::bail!("this slide fails on purpose; the rest of the deck is fine")
        })
        .add_slide(Slide::fixed(
            "Done",
            Renderable::markdown("# That's it\n\nPress `q` to quit.").centered(),
        ))
}

fn title() -> Renderable {
    Renderable::column([
        Renderable::styled("tdeck", TextStyle::default().bold().color(ACCENT).align(Align::Center)),
        Renderable::styled(
            "presentations that run in the terminal",
            TextStyle::default().italic().align(Align::Center),
        ),
        Renderable::Empty,
        Renderable::styled("→ next   ? help", TextStyle::default().dim().align(Align::Center)),
    ])
    .centered()
}

fn counter(ledger: &TriggerLedger) -> anyhow::Result<Renderable> {
    let presses = ledger.count() - 1;
    let since = if ledger.manually_triggered() {
        format!("{:.1}s since the last press", ledger.elapsed_since_last())
    } else {
        "press t".to_string()
    };
    Ok(Renderable::column([
        Renderable::styled(
            format!("{presses}"),
            TextStyle::default().bold().color(ACCENT).align(Align::Center),
        ),
        Renderable::styled(since, TextStyle::default().dim().align(Align::Center)),
    ])
    .centered()
    .panel(Some("Counter")))
}

fn progress(ledger: &TriggerLedger) -> anyhow::Result<Renderable> {
    let fraction = (ledger.elapsed_since_last() / BAR_SECONDS).clamp(0.0, 1.0);
    let filled = (fraction * BAR_WIDTH as f64).round() as usize;
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled));
    Ok(Renderable::column([
        Renderable::markdown("# Time\n\nThe bar fills from the last trigger. Press `t` to restart it."),
        Renderable::styled(
            format!("{bar} {:>3.0}%", fraction * 100.0),
            TextStyle::default().color(ACCENT),
        ),
    ]))
}

fn steps(ledger: &TriggerLedger) -> anyhow::Result<Renderable> {
    const POINTS: [&str; 3] = [
        "- triggers are kept per slide",
        "- `take` hands out one item per trigger",
        "- moving away starts the ledger over",
    ];
    let shown: Vec<&str> = ledger.take(POINTS, 1).collect();
    let mut source = String::from("# Steps\n\n");
    if shown.is_empty() {
        source.push_str("Press `t`.");
    } else {
        source.push_str(&shown.join("\n"));
    }
    Ok(Renderable::markdown(&source))
}
