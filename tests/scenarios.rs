//! End-to-end behavior of the core: the navigation gate as the renderer
//! sees it, and the native handle as an owning shell sees it.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use hostview::error::{DispatchError, HandleError, NativeError};
use hostview::native::{HandleState, NativeBackend, NativeHandle};
use hostview::navigation::{ExternalDispatcher, NavigationDecision, NavigationGate, NavigationRequest};

/// Dispatcher with a fixed answer that counts how often it was asked.
struct FixedDispatcher {
    succeed: bool,
    calls: AtomicUsize,
}

impl FixedDispatcher {
    fn new(succeed: bool) -> Self {
        Self {
            succeed,
            calls: AtomicUsize::new(0),
        }
    }
}

impl ExternalDispatcher for FixedDispatcher {
    fn dispatch(&self, url: &str) -> Result<(), DispatchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.succeed {
            Ok(())
        } else {
            Err(DispatchError::Launch {
                url: url.to_owned(),
                source: io::Error::new(io::ErrorKind::NotFound, "no handler registered"),
            })
        }
    }
}

#[test]
fn test_renderer_navigation_scenario() {
    let https = NavigationRequest::new("https://example.com", true);
    let passwd = NavigationRequest::new("file:///etc/passwd", true);
    let pdf = NavigationRequest::new("file:///sdcard/doc.pdf", true);

    let failing = NavigationGate::new(FixedDispatcher::new(false));
    assert_eq!(failing.decide(&https), NavigationDecision::Continue);
    assert_eq!(failing.dispatcher().calls.load(Ordering::SeqCst), 0);
    assert_eq!(failing.decide(&passwd), NavigationDecision::Continue);
    assert_eq!(failing.dispatcher().calls.load(Ordering::SeqCst), 1);

    let working = NavigationGate::new(FixedDispatcher::new(true));
    assert_eq!(
        working.decide(&pdf),
        NavigationDecision::Intercept("file:///sdcard/doc.pdf".to_string())
    );
    assert_eq!(working.decide(&https), NavigationDecision::Continue);
    assert_eq!(working.dispatcher().calls.load(Ordering::SeqCst), 1);

    // Réponse transmise au renderer.
    assert!(failing.decide(&passwd).allows_load());
    assert!(!working.decide(&pdf).allows_load());
    assert!(working.decide(&https).allows_load());
}

#[test]
fn test_uppercase_file_scheme_is_rendered() {
    let gate = NavigationGate::new(FixedDispatcher::new(true));
    let decision = gate.decide(&NavigationRequest::new("FILE:///x", true));
    assert_eq!(decision, NavigationDecision::Continue);
    assert_eq!(gate.dispatcher().calls.load(Ordering::SeqCst), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Native handle owned by a shell-like object
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Counters {
    initialized: AtomicUsize,
    destroyed: AtomicUsize,
}

struct SharedBackend(Arc<Counters>);

impl NativeBackend for SharedBackend {
    type Token = usize;

    fn initialize(&self) -> Result<usize, NativeError> {
        Ok(self.0.initialized.fetch_add(1, Ordering::SeqCst))
    }

    fn destroy(&self, _token: &usize) {
        self.0.destroyed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Owns the handle the way the shell does: acquire on start, release on
/// shutdown, nothing on drop.
struct Owner {
    core: NativeHandle<SharedBackend>,
}

impl Owner {
    fn new(counters: &Arc<Counters>) -> Self {
        Self {
            core: NativeHandle::new(SharedBackend(Arc::clone(counters))),
        }
    }

    fn start(&self) -> Result<(), HandleError> {
        self.core.acquire()
    }

    fn shutdown(&self) {
        self.core.release();
    }
}

#[test]
fn test_owner_shutdown_then_drop_tears_down_once() {
    let counters = Arc::new(Counters::default());
    let owner = Owner::new(&counters);
    owner.start().unwrap();
    owner.shutdown();
    assert_eq!(owner.core.state(), HandleState::Destroyed);
    drop(owner);

    assert_eq!(counters.initialized.load(Ordering::SeqCst), 1);
    assert_eq!(counters.destroyed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_owner_dropped_without_shutdown_still_tears_down() {
    let counters = Arc::new(Counters::default());
    {
        let owner = Owner::new(&counters);
        owner.start().unwrap();
    }
    assert_eq!(counters.destroyed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_owner_never_started_does_not_tear_down() {
    let counters = Arc::new(Counters::default());
    drop(Owner::new(&counters));
    assert_eq!(counters.initialized.load(Ordering::SeqCst), 0);
    assert_eq!(counters.destroyed.load(Ordering::SeqCst), 0);
}

#[test]
fn test_owner_started_twice_is_rejected() {
    let counters = Arc::new(Counters::default());
    let owner = Owner::new(&counters);
    owner.start().unwrap();
    assert!(matches!(owner.start(), Err(HandleError::AlreadyAcquired)));
    assert_eq!(counters.initialized.load(Ordering::SeqCst), 1);
}
