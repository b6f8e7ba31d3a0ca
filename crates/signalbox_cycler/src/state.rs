//! # Shared Phase State
//!
//! The current phase lives in a single `AtomicU8`. The cycler thread is the
//! only writer; renderers and waiters read it without taking a lock.
//!
//! ```text
//!   Cycler thread ──(fetch_xor, Release)──> [AtomicU8] <──(load, Acquire)── Readers
//! ```
//!
//! Each toggle is one indivisible read-modify-write, so a reader sees either
//! the old phase or the new one, never anything else. The toggle counter is
//! bumped before the flip and doubles as the toggle's sequence number.

use crate::phase::Phase;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::time::{Duration, Instant};

/// Lock-free phase cell shared between the cycler thread and readers.
#[derive(Debug)]
pub struct SharedPhase {
    /// Current phase (`Phase as u8`).
    phase: AtomicU8,
    /// Total toggles since creation.
    toggles: AtomicU64,
    /// Time of the last toggle, nanoseconds since `epoch`.
    last_toggle_ns: AtomicU64,
    /// Reference point for `last_toggle_ns`.
    epoch: Instant,
}

impl SharedPhase {
    /// Creates shared state holding `initial`.
    #[must_use]
    pub fn new(initial: Phase) -> Self {
        Self {
            phase: AtomicU8::new(initial as u8),
            toggles: AtomicU64::new(0),
            last_toggle_ns: AtomicU64::new(0),
            epoch: Instant::now(),
        }
    }

    /// Gets the current phase (wait-free).
    #[inline]
    #[must_use]
    pub fn load(&self) -> Phase {
        Phase::from(self.phase.load(Ordering::Acquire))
    }

    /// Gets total toggles.
    ///
    /// Counts a toggle as soon as it begins, so a toggle numbered at or
    /// below this value was already underway when it was read.
    #[must_use]
    pub fn toggles(&self) -> u64 {
        self.toggles.load(Ordering::Acquire)
    }

    /// Time elapsed since the last toggle (or since creation if none).
    #[must_use]
    pub fn since_last_toggle(&self) -> Duration {
        let last = Duration::from_nanos(self.last_toggle_ns.load(Ordering::Acquire));
        self.epoch.elapsed().saturating_sub(last)
    }

    /// Flips the phase and returns the toggle's sequence number (starting
    /// at 1) together with the new phase.
    ///
    /// Called by the cycler thread only.
    pub(crate) fn toggle(&self) -> (u64, Phase) {
        let seq = self.toggles.fetch_add(1, Ordering::AcqRel) + 1;
        let old = self.phase.fetch_xor(1, Ordering::AcqRel);
        let now_ns = u64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.last_toggle_ns.store(now_ns, Ordering::Release);
        (seq, Phase::from(old).toggled())
    }
}

impl Default for SharedPhase {
    fn default() -> Self {
        Self::new(Phase::Red)
    }
}
