//! Slide transitions as pure offset math.
//!
//! A [`Transition`] maps a direction and a progress value to the horizontal
//! offsets of the outgoing and incoming slide. Offsets are fixed-point
//! hundredths of a percent: the outgoing offset is rounded once and the
//! incoming offset is derived from it, so the pair always spans exactly one
//! full slide width while progress is in `[0, 100]`.

use std::fmt;
use std::str::FromStr;

use crate::error::DeckError;
use crate::slide::Slide;
use crate::triggers::TriggerLedger;

/// One full slide width, in hundredths of a percent.
pub const FULL: i32 = 10_000;

/// Largest progress magnitude (in hundredths) we carry through the math.
const LIMIT: f64 = 100_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

impl Direction {
    /// Sign of the incoming slide's starting position.
    fn sign(self) -> i32 {
        match self {
            Self::Next => 1,
            Self::Previous => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Offsets {
    pub from: i32,
    pub to: i32,
}

impl Offsets {
    pub fn from_percent(&self) -> f64 {
        f64::from(self.from) / 100.0
    }

    pub fn to_percent(&self) -> f64 {
        f64::from(self.to) / 100.0
    }

    /// Offsets scaled to a width in cells, rounded toward zero.
    pub fn columns(&self, width: u16) -> (i32, i32) {
        let w = i64::from(width);
        let scale = |v: i32| (i64::from(v) * w / i64::from(FULL)) as i32;
        (scale(self.from), scale(self.to))
    }
}

impl fmt::Display for Offsets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}% / {:.2}%", self.from_percent(), self.to_percent())
    }
}

pub trait Transition {
    /// Offsets before any progress: outgoing slide in place, incoming slide
    /// one full width away on the side implied by `direction`.
    fn initialize(&self, direction: Direction) -> Offsets {
        Offsets {
            from: 0,
            to: direction.sign() * FULL,
        }
    }

    /// Offsets at `progress` percent. Any `f64` is accepted.
    fn progress(&self, direction: Direction, progress: f64) -> Offsets;
}

/// Both slides move together, the incoming one pushing the outgoing one off.
#[derive(Debug, Clone, Copy, Default)]
pub struct Swipe;

impl Transition for Swipe {
    fn progress(&self, direction: Direction, progress: f64) -> Offsets {
        let moved = hundredths(progress);
        let sign = direction.sign();
        let from = -sign * moved;
        Offsets {
            from,
            to: from + sign * FULL,
        }
    }
}

/// No animation; always at the final state.
#[derive(Debug, Clone, Copy, Default)]
pub struct Instant;

impl Transition for Instant {
    fn progress(&self, direction: Direction, _progress: f64) -> Offsets {
        Offsets {
            from: -direction.sign() * FULL,
            to: 0,
        }
    }
}

fn hundredths(progress: f64) -> i32 {
    if progress.is_nan() {
        return 0;
    }
    (progress * 100.0).round().clamp(-LIMIT, LIMIT) as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionKind {
    #[default]
    Swipe,
    Instant,
}

impl TransitionKind {
    pub const NAMES: [&'static str; 3] = ["swipe", "instant", "none"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "swipe" | "slide" => Some(Self::Swipe),
            "instant" | "none" => Some(Self::Instant),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Swipe => "swipe",
            Self::Instant => "instant",
        }
    }

    pub fn strategy(self) -> &'static dyn Transition {
        match self {
            Self::Swipe => &Swipe,
            Self::Instant => &Instant,
        }
    }

    /// Whether navigating with this kind animates at all.
    pub fn animates(self) -> bool {
        !matches!(self, Self::Instant)
    }
}

impl FromStr for TransitionKind {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| {
            DeckError::validation(format!(
                "unknown transition '{s}' (expected one of: {})",
                Self::NAMES.join(", ")
            ))
        })
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ease {
    Linear,
    #[default]
    InOutCubic,
    /// Overshoots past the end before settling.
    OutBack,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Linear => t,
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::OutBack => {
                const C1: f64 = 1.70158;
                const C3: f64 = C1 + 1.0;
                1.0 + C3 * (t - 1.0).powi(3) + C1 * (t - 1.0).powi(2)
            }
        }
    }
}

/// An in-flight move between two slides.
///
/// The slides and the outgoing ledger are snapshots taken when the move
/// started; later reloads do not touch them.
#[derive(Debug, Clone)]
pub struct TransitionState {
    pub from_slide: Slide,
    pub to_slide: Slide,
    pub from_ledger: TriggerLedger,
    pub to_index: usize,
    pub direction: Direction,
    pub kind: TransitionKind,
    pub start: f64,
    pub duration: f64,
    pub ease: Ease,
}

impl TransitionState {
    /// Progress in percent at time `now`. May leave `[0, 100]` under easing.
    pub fn progress_at(&self, now: f64) -> f64 {
        if !self.kind.animates() || self.duration <= 0.0 {
            return 100.0;
        }
        100.0 * self.ease.apply((now - self.start) / self.duration)
    }

    pub fn offsets_at(&self, now: f64) -> Offsets {
        if now <= self.start {
            return self.kind.strategy().initialize(self.direction);
        }
        self.kind
            .strategy()
            .progress(self.direction, self.progress_at(now))
    }

    pub fn is_complete(&self, now: f64) -> bool {
        !self.kind.animates() || now - self.start >= self.duration
    }
}
