//! # SIGNALBOX Cycler
//!
//! A two-phase signal (red/green) that toggles on its own thread after a
//! randomized delay, publishing every change through a blocking queue.
//!
//! ## Threads
//!
//! - **Cycler thread**: sole writer of the phase; sleeps in small increments
//!   and toggles once the drawn cycle has elapsed
//! - **Waiters**: block in [`PhaseCycler::wait_for_phase`] without spinning
//! - **Readers**: poll [`PhaseCycler::current_phase`] lock-free
//!
//! ## Example
//!
//! ```rust,ignore
//! use signalbox_cycler::{CyclerConfig, Phase, PhaseCycler};
//!
//! let signal = PhaseCycler::new(CyclerConfig::from_toml_file("signal.toml")?)?;
//! signal.start()?;
//! signal.wait_for_phase(Phase::Green)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod cycler;
pub mod error;
pub mod phase;
pub mod state;

pub use config::CyclerConfig;
pub use cycler::{CyclerStats, PhaseCycler, ShutdownReport};
pub use error::{CyclerError, CyclerResult};
pub use phase::Phase;
pub use state::SharedPhase;
