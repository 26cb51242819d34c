//! The trigger ledger: when, and how many times, the current slide has been
//! triggered.
//!
//! A ledger is never mutated. Ticking the render clock, triggering, and
//! resetting all produce a fresh value, so a ledger handed to slide content
//! (or frozen into a transition) can never be observed half-updated.

use crate::error::{DeckError, DeckResult};

#[derive(Debug, Clone, PartialEq)]
pub struct TriggerLedger {
    times: Vec<f64>,
    now: f64,
    elapsed_since_last: f64,
    elapsed_since_first: f64,
}

impl TriggerLedger {
    /// A ledger whose only trigger is the implicit one at `now`.
    pub fn new(now: f64) -> Self {
        Self {
            times: vec![now],
            now,
            elapsed_since_last: 0.0,
            elapsed_since_first: 0.0,
        }
    }

    /// Build a ledger from explicit trigger times.
    ///
    /// `times` must be non-empty and `now` must not precede the last trigger.
    /// Order is authoritative: `times` does not have to be sorted.
    pub fn try_new(times: Vec<f64>, now: f64) -> DeckResult<Self> {
        let (Some(&first), Some(&last)) = (times.first(), times.last()) else {
            return Err(DeckError::validation(
                "a trigger ledger needs at least one trigger time",
            ));
        };
        if !now.is_finite() || times.iter().any(|t| !t.is_finite()) {
            return Err(DeckError::validation("trigger times must be finite"));
        }
        if now < last {
            return Err(DeckError::validation(format!(
                "now ({now}) is before the last trigger time ({last})"
            )));
        }
        Ok(Self {
            elapsed_since_last: now - last,
            elapsed_since_first: now - first,
            times,
            now,
        })
    }

    /// Same trigger history, later render time.
    pub fn tick(&self, now: f64) -> DeckResult<Self> {
        Self::try_new(self.times.clone(), now)
    }

    /// Record a manual trigger at `now`.
    pub fn trigger(&self, now: f64) -> DeckResult<Self> {
        let mut times = Vec::with_capacity(self.times.len() + 1);
        times.extend_from_slice(&self.times);
        times.push(now);
        Self::try_new(times, now)
    }

    /// Collapse back to a single implicit trigger.
    pub fn reset(now: f64) -> Self {
        Self::new(now)
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn count(&self) -> usize {
        self.times.len()
    }

    pub fn elapsed_since_last(&self) -> f64 {
        self.elapsed_since_last
    }

    pub fn elapsed_since_first(&self) -> f64 {
        self.elapsed_since_first
    }

    /// True once anything beyond the implicit first trigger has happened.
    pub fn manually_triggered(&self) -> bool {
        self.times.len() > 1
    }

    /// The `i`th trigger time. Negative indices count from the end.
    pub fn nth(&self, i: isize) -> Option<f64> {
        let idx = if i < 0 {
            self.times.len().checked_sub(i.unsigned_abs())?
        } else {
            i as usize
        };
        self.times.get(idx).copied()
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.times.iter().copied()
    }

    /// Yield the first `count - offset` items of `items`.
    ///
    /// With the default offset of 1 the implicit first trigger is skipped, so
    /// one item appears per manual trigger.
    pub fn take<I: IntoIterator>(&self, items: I, offset: usize) -> impl Iterator<Item = I::Item> {
        items.into_iter().take(self.count().saturating_sub(offset))
    }
}

impl<'a> IntoIterator for &'a TriggerLedger {
    type Item = f64;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.times.iter().copied()
    }
}
