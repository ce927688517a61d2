//! Simulation kernel: authoritative physics state shared between the physics
//! thread and the render thread.
//!
//! # Invariants
//! - `SharedSimulation::update_locked` is the only mutation path once a world
//!   is shared.
//! - The lock is never held across a sleep.
//! - The simulation mutex is the only lock around shared state.
//!   `PhysicsLoop` keeps its own stats mutex, never nested with it.
//! - No tick begins after `AppState::Quit` is observed.

pub mod app_state;
pub mod error;
pub mod physics_loop;
pub mod shared;
pub mod world;

pub use app_state::{AppState, AppStateFlag};
pub use error::KernelError;
pub use physics_loop::PhysicsLoop;
pub use shared::{SharedSimulation, Simulation};
pub use world::{Body, PhysicsWorld};
