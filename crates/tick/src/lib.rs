//! Tick scheduling: holds a loop to a fixed wall-clock rate independent of
//! how long each iteration's work takes.
//!
//! # Invariants
//! - Frequency is finite and positive whenever it can be observed.
//! - `wait_for_end` sleeps; it never spins.
//! - Overrun time is dropped, never repaid by shortening later ticks.

mod clock;
mod error;
mod rate;
mod scheduler;

pub use clock::{FrameClock, FrameTime};
pub use error::TickError;
pub use rate::{MIN_FREQUENCY_HZ, TickRate};
pub use scheduler::{TickOutcome, TickScheduler, TickStats};
