//! Input mapped to game actions.
//!
//! The window layer translates its native key codes into [`Key`] and feeds
//! [`InputEvent`]s here. Nothing downstream sees a platform key code.
//!
//! # Invariants
//! - Only presses trigger an [`Action`]; releases only clear held state.
//! - Held movement is tracked independently of actions, so a key can never
//!   be both.

pub mod action;
pub mod key;
pub mod map;
pub mod state;

pub use action::{Action, Movement};
pub use key::{InputEvent, Key};
pub use map::{Binding, KeyMap};
pub use state::InputState;
