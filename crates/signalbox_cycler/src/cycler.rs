//! # Phase Cycler
//!
//! A signal that flips between red and green on its own thread, on a
//! randomized schedule, and lets any number of callers block until it
//! reaches the phase they need.
//!
//! ## Architecture
//!
//! ```text
//!                 ┌──────────────────────────────────────────┐
//!                 │               PhaseCycler                │
//!                 │                                          │
//!   start() ────> │  cycler thread                           │
//!                 │    sleep(poll) ──> elapsed >= cycle?     │
//!                 │        │                 │ yes           │
//!                 │        │        toggle SharedPhase ──────┼──> current_phase()
//!                 │        │                 │               │
//!                 │        │      send((seq, phase)) ──> [BlockingQueue]
//!                 │        └──── shutdown flag?              │      │
//!                 └──────────────────────────────────────────┘      │
//!                                                                   ▼
//!                                                      wait_for_phase(target)
//!                                                      (receive until a newer
//!                                                       toggle reaches target)
//! ```
//!
//! Every published phase carries its toggle sequence number. A waiter notes
//! the toggle count when it starts waiting and ignores anything published
//! at or before that point, so phases nobody consumed can never satisfy a
//! later wait.
//!
//! ## Shutdown
//!
//! The cycler thread checks a shutdown flag after every sleep increment.
//! `shutdown` raises the flag, closes the queue so blocked waiters return
//! [`CyclerError::ShutDown`], and joins the thread.

use crate::config::CyclerConfig;
use crate::error::{CyclerError, CyclerResult};
use crate::phase::Phase;
use crate::state::SharedPhase;
use parking_lot::Mutex;
use rand_chacha::ChaCha8Rng;
use signalbox_sync::BlockingQueue;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Name of the background thread.
const CYCLER_THREAD_NAME: &str = "signalbox-cycler";

/// Snapshot of cycler activity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CyclerStats {
    /// Current phase.
    pub phase: Phase,
    /// Total toggles.
    pub toggles: u64,
    /// Time since the last toggle.
    pub since_last_toggle: Duration,
    /// Published phases not yet consumed by a waiter.
    pub pending: usize,
    /// Callers currently blocked in a wait.
    pub waiting: usize,
    /// Whether the cycler thread is running.
    pub running: bool,
}

/// Outcome of [`PhaseCycler::shutdown`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Waiters that were blocked and have been released with an error.
    pub waiters_woken: usize,
    /// Total toggles over the cycler's lifetime.
    pub toggles: u64,
}

/// Randomized two-phase signal.
///
/// Share it with `Arc<PhaseCycler>`; every operation takes `&self`.
///
/// ## Usage
///
/// ```rust,ignore
/// let signal = Arc::new(PhaseCycler::new(CyclerConfig::traffic())?);
/// signal.start()?;
///
/// // Any thread: block until green
/// signal.wait_for_phase(Phase::Green)?;
///
/// // Renderer: non-blocking read
/// draw(signal.current_phase());
///
/// signal.shutdown();
/// ```
pub struct PhaseCycler {
    /// Validated configuration.
    config: CyclerConfig,
    /// Current phase (written by the cycler thread only).
    phase: Arc<SharedPhase>,
    /// Published phase updates, tagged with their toggle sequence number.
    queue: Arc<BlockingQueue<(u64, Phase)>>,
    /// Shutdown signal.
    shutdown: Arc<AtomicBool>,
    /// Set by the first successful `start`.
    started: AtomicBool,
    /// Cycler thread handle.
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl PhaseCycler {
    /// Creates a stopped cycler in the red phase.
    ///
    /// # Errors
    ///
    /// Returns [`CyclerError::InvalidConfig`] if the config fails validation.
    pub fn new(config: CyclerConfig) -> CyclerResult<Self> {
        config.validate()?;

        Ok(Self {
            config,
            phase: Arc::new(SharedPhase::new(Phase::Red)),
            queue: Arc::new(BlockingQueue::new()),
            shutdown: Arc::new(AtomicBool::new(false)),
            started: AtomicBool::new(false),
            worker: Mutex::new(None),
        })
    }

    /// Launches the cycler thread and returns immediately.
    ///
    /// # Errors
    ///
    /// - [`CyclerError::AlreadyStarted`] if called more than once
    /// - [`CyclerError::ShutDown`] if the cycler was shut down
    /// - [`CyclerError::Spawn`] if the OS refused the thread
    pub fn start(&self) -> CyclerResult<()> {
        // Held until the handle is stored so `shutdown` cannot slip between
        // the flag check and the spawn and miss the thread it must join
        let mut slot = self.worker.lock();
        if self.shutdown.load(Ordering::Acquire) {
            return Err(CyclerError::ShutDown);
        }
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(CyclerError::AlreadyStarted);
        }

        let worker = CycleWorker {
            config: self.config.clone(),
            rng: self.config.rng(),
            phase: Arc::clone(&self.phase),
            queue: Arc::clone(&self.queue),
            shutdown: Arc::clone(&self.shutdown),
        };

        let handle = thread::Builder::new()
            .name(CYCLER_THREAD_NAME.into())
            .spawn(move || worker.run())
            .map_err(|e| {
                self.started.store(false, Ordering::Release);
                CyclerError::Spawn(e.to_string())
            })?;
        *slot = Some(handle);
        drop(slot);

        tracing::info!(
            min_cycle_secs = self.config.min_cycle_secs,
            max_cycle_secs = self.config.max_cycle_secs,
            poll_interval_ms = self.config.poll_interval_ms,
            "phase cycler started"
        );
        Ok(())
    }

    /// Gets the current phase (wait-free).
    #[inline]
    #[must_use]
    pub fn current_phase(&self) -> Phase {
        self.phase.load()
    }

    /// Handle to the shared phase cell, for readers that outlive a borrow
    /// of the cycler (render loops and the like).
    #[must_use]
    pub fn phase_handle(&self) -> Arc<SharedPhase> {
        Arc::clone(&self.phase)
    }

    /// Blocks until a toggle that happens after this call reaches `target`.
    ///
    /// Published phases that are not `target`, or that were published
    /// before the call, are consumed and discarded. Blocks indefinitely if
    /// `target` is never published again.
    ///
    /// # Errors
    ///
    /// Returns [`CyclerError::ShutDown`] if the cycler is shut down before
    /// `target` arrives.
    pub fn wait_for_phase(&self, target: Phase) -> CyclerResult<()> {
        let baseline = self.phase.toggles();
        loop {
            let (seq, phase) = self.queue.receive()?;
            if seq > baseline && phase == target {
                return Ok(());
            }
        }
    }

    /// Like [`PhaseCycler::wait_for_phase`], giving up after `timeout`.
    ///
    /// Returns `Ok(true)` if `target` arrived, `Ok(false)` on timeout.
    ///
    /// # Errors
    ///
    /// Returns [`CyclerError::ShutDown`] if the cycler is shut down first.
    pub fn wait_for_phase_timeout(&self, target: Phase, timeout: Duration) -> CyclerResult<bool> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.wait_for_phase(target).map(|()| true);
        };

        let baseline = self.phase.toggles();
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.queue.receive_timeout(remaining)? {
                Some((seq, phase)) if seq > baseline && phase == target => return Ok(true),
                Some(_) => {}
                None => return Ok(false),
            }
        }
    }

    /// Stops the cycler thread and releases every blocked waiter.
    ///
    /// Idempotent; later calls report no woken waiters. Also run on drop.
    pub fn shutdown(&self) -> ShutdownReport {
        let first = !self.shutdown.swap(true, Ordering::AcqRel);
        let waiters_woken = if first { self.queue.close() } else { 0 };

        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::warn!("phase cycler thread panicked");
            }
        }

        let report = ShutdownReport {
            waiters_woken,
            toggles: self.phase.toggles(),
        };

        if first {
            if waiters_woken > 0 {
                tracing::warn!(
                    waiters = waiters_woken,
                    "phase cycler shut down while waiters pending"
                );
            }
            tracing::info!(toggles = report.toggles, "phase cycler stopped");
        }
        report
    }

    /// Returns true while the cycler thread is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.started.load(Ordering::Acquire) && !self.shutdown.load(Ordering::Acquire)
    }

    /// Returns current statistics.
    #[must_use]
    pub fn stats(&self) -> CyclerStats {
        CyclerStats {
            phase: self.phase.load(),
            toggles: self.phase.toggles(),
            since_last_toggle: self.phase.since_last_toggle(),
            pending: self.queue.len(),
            waiting: self.queue.waiting_receivers(),
            running: self.is_running(),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &CyclerConfig {
        &self.config
    }
}

impl Drop for PhaseCycler {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

impl std::fmt::Debug for PhaseCycler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseCycler")
            .field("phase", &self.phase.load())
            .field("running", &self.is_running())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// State moved onto the cycler thread.
struct CycleWorker {
    config: CyclerConfig,
    rng: ChaCha8Rng,
    phase: Arc<SharedPhase>,
    queue: Arc<BlockingQueue<(u64, Phase)>>,
    shutdown: Arc<AtomicBool>,
}

impl CycleWorker {
    /// Cycler thread main loop.
    fn run(mut self) {
        let poll = self.config.poll_interval();
        let mut cycle = self.config.sample_cycle(&mut self.rng);
        let mut last_toggle = Instant::now();

        while !self.shutdown.load(Ordering::Acquire) {
            thread::sleep(poll);
            if self.shutdown.load(Ordering::Acquire) {
                break;
            }
            if last_toggle.elapsed() < cycle {
                continue;
            }

            last_toggle = Instant::now();
            cycle = self.config.sample_cycle(&mut self.rng);

            let (seq, phase) = self.phase.toggle();
            tracing::debug!(seq, phase = phase.as_str(), next_cycle = ?cycle, "phase toggled");

            // Publish before the next sleep so a waiter never misses a toggle
            if self.queue.send((seq, phase)).is_err() {
                break;
            }
        }

        tracing::debug!("cycle loop exited");
    }
}
