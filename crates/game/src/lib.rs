//! The game layer: owns everything the render thread touches and exposes
//! the per-frame entry point.
//!
//! # Invariants
//! - There are no globals. One [`GameContext`] is built in `main` and owned
//!   by the [`Game`].
//! - The simulation lock is taken once per frame, to capture a snapshot.
//! - Only [`Action::Quit`](quarry_input::Action::Quit) or shutdown end the
//!   session; camera and config I/O failures are logged and survived.

mod config;
mod context;
mod error;
mod game;
mod world;

pub use config::{GameConfig, WindowConfig};
pub use context::GameContext;
pub use error::{ConfigError, GameError};
pub use game::Game;
pub use world::demo_world;
