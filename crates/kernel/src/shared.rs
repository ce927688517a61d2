use parking_lot::Mutex;
use std::cell::RefCell;
use std::sync::Arc;

/// State that can be advanced by a fixed timestep.
pub trait Simulation: Send + 'static {
    fn advance(&mut self, dt: f32);
}

thread_local! {
    /// Addresses of the simulations whose lock this thread currently holds.
    static HELD: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Marks a simulation lock as held by the current thread for its lifetime.
struct HeldScope(usize);

impl HeldScope {
    fn enter(addr: usize, op: &str) -> Self {
        HELD.with(|held| {
            let mut held = held.borrow_mut();
            assert!(
                !held.contains(&addr),
                "{op} called while this thread already holds the simulation lock"
            );
            held.push(addr);
        });
        Self(addr)
    }
}

impl Drop for HeldScope {
    fn drop(&mut self) {
        HELD.with(|held| held.borrow_mut().retain(|&a| a != self.0));
    }
}

/// Simulation state behind a single mutex.
///
/// The only ways in are [`update_locked`](Self::update_locked), which
/// mutates, and [`read_locked`](Self::read_locked), which gets a shared
/// reference for the duration of a closure. A reader therefore always sees the
/// state as of the most recently completed update.
///
/// Re-entering either operation on the same simulation from inside the other
/// would deadlock the non-reentrant lock, so it panics instead.
pub struct SharedSimulation<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> Clone for SharedSimulation<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> SharedSimulation<S> {
    pub fn new(state: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    /// Run `f` against the current state while holding the lock.
    ///
    /// Keep `f` short: the physics thread waits on the same lock.
    pub fn read_locked<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let _scope = HeldScope::enter(self.addr(), "read_locked");
        let state = self.inner.lock();
        f(&state)
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }
}

impl<S: Simulation> SharedSimulation<S> {
    /// Advance the state by exactly `dt` seconds while holding the lock.
    pub fn update_locked(&self, dt: f32) {
        let _scope = HeldScope::enter(self.addr(), "update_locked");
        let mut state = self.inner.lock();
        state.advance(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    /// Two counters that an update bumps one after the other. A torn read
    /// would see them differ.
    #[derive(Default)]
    struct Pair {
        a: u64,
        b: u64,
    }

    impl Simulation for Pair {
        fn advance(&mut self, _dt: f32) {
            self.a += 1;
            for _ in 0..64 {
                std::hint::spin_loop();
            }
            thread::yield_now();
            self.b += 1;
        }
    }

    #[test]
    fn update_is_visible_to_later_reads() {
        let sim = SharedSimulation::new(Pair::default());
        sim.update_locked(0.1);
        sim.update_locked(0.1);
        assert_eq!(sim.read_locked(|p| (p.a, p.b)), (2, 2));
    }

    #[test]
    fn concurrent_reads_never_observe_torn_state() {
        const UPDATES: u64 = 2_000;
        let sim = SharedSimulation::new(Pair::default());
        let done = Arc::new(AtomicBool::new(false));

        let readers: Vec<_> = (0..3)
            .map(|_| {
                let sim = sim.clone();
                let done = Arc::clone(&done);
                thread::spawn(move || {
                    let mut last = 0;
                    let mut reads = 0u64;
                    while !done.load(Ordering::Acquire) {
                        let (a, b) = sim.read_locked(|p| (p.a, p.b));
                        assert_eq!(a, b, "torn read");
                        assert!(a >= last, "went backwards");
                        last = a;
                        reads += 1;
                    }
                    reads
                })
            })
            .collect();

        let writer = {
            let sim = sim.clone();
            thread::spawn(move || {
                for _ in 0..UPDATES {
                    sim.update_locked(1.0 / 45.0);
                }
            })
        };

        writer.join().unwrap();
        done.store(true, Ordering::Release);
        for reader in readers {
            assert!(reader.join().unwrap() > 0);
        }
        assert_eq!(sim.read_locked(|p| p.a), UPDATES);
    }

    struct Reentrant {
        me: Arc<OnceLock<SharedSimulation<Reentrant>>>,
    }

    impl Simulation for Reentrant {
        fn advance(&mut self, _dt: f32) {
            if let Some(me) = self.me.get() {
                me.read_locked(|_| ());
            }
        }
    }

    #[test]
    #[should_panic(expected = "read_locked called while this thread already holds")]
    fn read_inside_update_panics_instead_of_deadlocking() {
        let me = Arc::new(OnceLock::new());
        let sim = SharedSimulation::new(Reentrant { me: Arc::clone(&me) });
        let _ = me.set(sim.clone());
        sim.update_locked(0.1);
    }

    #[test]
    fn separate_simulations_can_nest_reads() {
        let outer = SharedSimulation::new(Pair::default());
        let inner = SharedSimulation::new(Pair::default());
        inner.update_locked(0.1);
        let b = outer.read_locked(|_| inner.read_locked(|p| p.b));
        assert_eq!(b, 1);
    }

    #[test]
    fn lock_is_released_after_read() {
        let sim = SharedSimulation::new(Pair::default());
        sim.read_locked(|_| ());
        sim.update_locked(0.1);
        assert_eq!(sim.read_locked(|p| p.a), 1);
    }
}
