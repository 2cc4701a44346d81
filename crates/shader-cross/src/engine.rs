//! Process-wide front-end engine.
//!
//! The front end and the SPIR-V decoder share one lazily created [`Engine`]. It is built on
//! first use, exactly once per process, and handed out as an `Arc` so every session holds a
//! reference to the same instance. The engine holds no external resources (only validator
//! settings and a session counter), so it is never torn down explicitly: the `OnceLock` keeps
//! it for the lifetime of the process.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use naga::valid::{Capabilities, ValidationFlags, Validator};

static ENGINE: OnceLock<Arc<Engine>> = OnceLock::new();
static INIT_COUNT: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug)]
pub struct Engine {
    flags: ValidationFlags,
    capabilities: Capabilities,
    sessions: AtomicUsize,
}

impl Engine {
    /// Returns the process-wide engine, creating it on first call.
    pub fn acquire() -> Arc<Engine> {
        ENGINE
            .get_or_init(|| {
                INIT_COUNT.fetch_add(1, Ordering::SeqCst);
                tracing::debug!("initializing shader front-end engine");
                Arc::new(Engine {
                    flags: ValidationFlags::all(),
                    capabilities: Capabilities::all(),
                    sessions: AtomicUsize::new(0),
                })
            })
            .clone()
    }

    /// How many times the engine has been initialized in this process. Always 0 or 1.
    pub fn init_count() -> usize {
        INIT_COUNT.load(Ordering::SeqCst)
    }

    /// A fresh validator configured for this engine. Validators carry per-run scratch state,
    /// so each parse or decode builds its own.
    pub fn validator(&self) -> Validator {
        Validator::new(self.flags, self.capabilities)
    }

    /// Number of live sessions (front-end and IR facades) holding this engine.
    pub fn live_sessions(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }

    pub(crate) fn session(self: &Arc<Self>) -> EngineSession {
        self.sessions.fetch_add(1, Ordering::SeqCst);
        EngineSession {
            engine: Arc::clone(self),
        }
    }
}

/// A facade's hold on the engine. Dropping it releases the session slot.
#[derive(Debug)]
pub(crate) struct EngineSession {
    engine: Arc<Engine>,
}

impl EngineSession {
    pub(crate) fn open() -> Self {
        Engine::acquire().session()
    }

    pub(crate) fn engine(&self) -> &Engine {
        &self.engine
    }
}

impl Clone for EngineSession {
    fn clone(&self) -> Self {
        self.engine.session()
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        self.engine.sessions.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initializes_once_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(Engine::acquire))
            .collect();
        let engines: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for engine in &engines {
            assert!(Arc::ptr_eq(engine, &engines[0]));
        }
        assert_eq!(Engine::init_count(), 1);
    }

    #[test]
    fn sessions_are_counted() {
        let engine = Engine::acquire();
        let session = engine.session();
        let clone = session.clone();
        // Other tests may hold sessions concurrently, so only check our own two.
        assert!(engine.live_sessions() >= 2);
        drop(clone);
        drop(session);
    }

    #[test]
    fn engine_outlives_its_sessions() {
        let first = Arc::as_ptr(&Engine::acquire());
        drop(EngineSession::open());
        assert_eq!(Arc::as_ptr(&Engine::acquire()), first);
        assert_eq!(Engine::init_count(), 1);
    }
}
