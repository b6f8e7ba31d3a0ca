//! # SIGNALBOX Sync
//!
//! Blocking handoff between a background producer and any number of
//! waiting consumers.
//!
//! ## Rules
//!
//! 1. **No busy-waiting** - receivers park on a condition variable
//! 2. **No lost updates** - every sent value reaches exactly one receiver
//! 3. **No backpressure** - `send` never blocks the producer
//!
//! ## Example
//!
//! ```rust,ignore
//! use signalbox_sync::BlockingQueue;
//!
//! let queue = BlockingQueue::new();
//! queue.send(1)?;
//! assert_eq!(queue.receive()?, 1);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod queue;

pub use error::{SyncError, SyncResult};
pub use queue::{BlockingQueue, DeliveryOrder};
