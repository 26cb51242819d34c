//! The built-in demo: a deck written in Rust and a markdown sample.

mod deck;

pub use self::deck::deck;

/// The markdown sample written by `tdeck init`.
pub const SAMPLE_MARKDOWN: &str = include_str!("../../demo/sample.md");

const DECK_SOURCE: &str = include_str!("deck.rs");

/// Rust source of [`deck`], written against the public `tdeck` paths so it
/// can be pasted into another crate.
pub fn source() -> String {
    let code = DECK_SOURCE
        .split("#[cfg(test)]")
        .next()
        .unwrap_or(DECK_SOURCE);
    format!("{}\n", code.trim_end().replace("crate::", "tdeck::"))
}
