use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Application lifecycle as seen by every thread.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Init = 0,
    Run = 1,
    /// Terminal. Once reached the state never changes again.
    Quit = 2,
}

impl AppState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Init,
            1 => Self::Run,
            _ => Self::Quit,
        }
    }
}

/// Shared application state, the cooperative stop signal for the physics
/// thread.
#[derive(Debug, Clone)]
pub struct AppStateFlag {
    state: Arc<AtomicU8>,
}

impl Default for AppStateFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl AppStateFlag {
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(AppState::Init as u8)),
        }
    }

    pub fn get(&self) -> AppState {
        AppState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Move to `next`. Returns `false` if the state is already `Quit`.
    pub fn set(&self, next: AppState) -> bool {
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cur| {
                (cur != AppState::Quit as u8).then_some(next as u8)
            })
            .is_ok()
    }

    pub fn request_quit(&self) {
        if self.set(AppState::Quit) {
            tracing::info!("quit requested");
        }
    }

    pub fn is_quit(&self) -> bool {
        self.get() == AppState::Quit
    }
}
