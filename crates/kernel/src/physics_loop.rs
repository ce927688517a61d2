use crate::app_state::AppStateFlag;
use crate::error::KernelError;
use crate::shared::{SharedSimulation, Simulation};
use parking_lot::Mutex;
use quarry_tick::{TickRate, TickScheduler, TickStats};
use std::sync::Arc;
use std::thread::JoinHandle;

/// The fixed-rate physics thread.
///
/// Each iteration checks the app state, then runs
/// `start → update_locked → wait_for_end`. Setting `AppState::Quit` stops the
/// loop at the top of the next iteration; the in-flight update always
/// completes first.
///
/// Dropping a running loop requests quit and joins, so the thread never
/// outlives its owner.
///
/// Live [`TickStats`] are published through a second, private mutex. It is
/// taken only after `wait_for_end`, never while the simulation lock is held,
/// so the simulation lock stays the only one guarding shared state.
pub struct PhysicsLoop {
    handle: Option<JoinHandle<TickStats>>,
    app_state: AppStateFlag,
    rate: TickRate,
    stats: Arc<Mutex<TickStats>>,
}

impl PhysicsLoop {
    pub fn spawn<S: Simulation>(
        sim: SharedSimulation<S>,
        rate: TickRate,
        app_state: AppStateFlag,
    ) -> Result<Self, KernelError> {
        let stats = Arc::new(Mutex::new(TickStats::default()));
        let thread_rate = rate.clone();
        let thread_state = app_state.clone();
        let thread_stats = Arc::clone(&stats);
        let handle = std::thread::Builder::new()
            .name("physics".into())
            .spawn(move || run(sim, thread_rate, thread_state, thread_stats))
            .map_err(KernelError::Spawn)?;
        Ok(Self {
            handle: Some(handle),
            app_state,
            rate,
            stats,
        })
    }

    /// Handle for retuning the tick rate while the loop runs.
    pub fn rate(&self) -> &TickRate {
        &self.rate
    }

    /// Statistics as of the most recently closed tick.
    pub fn stats(&self) -> TickStats {
        *self.stats.lock()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the thread to observe quit and exit. Does not request quit.
    pub fn join(mut self) -> Result<TickStats, KernelError> {
        self.join_thread()
    }

    /// Request quit and wait for the thread to exit.
    pub fn shutdown(mut self) -> Result<TickStats, KernelError> {
        self.app_state.request_quit();
        self.join_thread()
    }

    fn join_thread(&mut self) -> Result<TickStats, KernelError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| KernelError::ThreadPanicked),
            None => Ok(TickStats::default()),
        }
    }
}

impl Drop for PhysicsLoop {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.app_state.request_quit();
            if let Err(e) = self.join_thread() {
                tracing::error!("physics loop: {e}");
            }
        }
    }
}

fn run<S: Simulation>(
    sim: SharedSimulation<S>,
    rate: TickRate,
    app_state: AppStateFlag,
    published: Arc<Mutex<TickStats>>,
) -> TickStats {
    let mut ticks = TickScheduler::with_rate(rate);
    ticks.activate();
    tracing::info!(hz = ticks.frequency(), "physics loop started");

    while !app_state.is_quit() {
        ticks.start();
        sim.update_locked(ticks.fixed_delta());
        ticks.wait_for_end();
        *published.lock() = ticks.stats();
    }

    let stats = ticks.stats();
    tracing::info!(%stats, "physics loop stopped");
    stats
}
