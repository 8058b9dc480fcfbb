//! Stop-date clamping of a tagged entry against committed entries.
//!
//! A new interval may not be drawn over one that is already tagged. When the
//! candidate stop would overlap, the stop is pulled back to the nearest
//! boundary of the overlapped entry.

use chrono::NaiveDateTime;

use crate::entry::TaggedEntry;

/// Which way the entry is considered to be growing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Growth {
    /// The candidate is unadjusted: clamp to the start of the first overlap.
    Right,
    /// The stop was already adjusted: clamp to the stop of the last overlap.
    Left,
}

impl Growth {
    /// `Right` exactly when the candidate equals the entry's current stop.
    pub fn of(candidate: NaiveDateTime, current_stop: NaiveDateTime) -> Self {
        if candidate == current_stop {
            Self::Right
        } else {
            Self::Left
        }
    }
}

/// Finds the boundary `candidate` has to be clamped to, if any.
///
/// `Right` scans in list order and stops at the first entry overlapping
/// `[start, candidate)`. `Left` keeps scanning and returns the stop of the
/// last entry with `candidate < t.stop && t.start < stop`.
pub fn clamp_stop(
    start: NaiveDateTime,
    stop: NaiveDateTime,
    candidate: NaiveDateTime,
    committed: &[TaggedEntry],
    growth: Growth,
) -> Option<NaiveDateTime> {
    match growth {
        Growth::Right => committed
            .iter()
            .find(|t| t.start < candidate && t.stop > start)
            .map(|t| t.start),
        Growth::Left => committed
            .iter()
            .filter(|t| candidate < t.stop && t.start < stop)
            .last()
            .map(|t| t.stop),
    }
}

/// Assigns `candidate` as the stop of `entry`, clamped against `committed`.
///
/// Returns the clamp value when one was applied.
pub fn set_stop(
    candidate: NaiveDateTime,
    entry: &mut TaggedEntry,
    committed: &[TaggedEntry],
) -> Option<NaiveDateTime> {
    entry.stop = candidate;

    // The stop was assigned just above, so this is always `Right` here.
    let growth = Growth::of(candidate, entry.stop);
    let clamp = clamp_stop(entry.start, entry.stop, candidate, committed, growth);
    if let Some(boundary) = clamp {
        entry.stop = boundary;
    }
    clamp
}

/// Pulls a stop that landed strictly inside a committed entry back to the
/// boundary of that entry facing `entry.start`.
///
/// Covers stops the overlap test cannot see: a drag that starts on a snapped
/// boundary and moves back into the entry it snapped to.
pub fn keep_out(entry: &mut TaggedEntry, committed: &[TaggedEntry]) -> Option<NaiveDateTime> {
    let inside = committed
        .iter()
        .find(|t| t.start < entry.stop && entry.stop < t.stop)?;
    let boundary = if entry.start <= inside.start {
        inside.start
    } else {
        inside.stop
    };
    entry.stop = boundary;
    Some(boundary)
}
