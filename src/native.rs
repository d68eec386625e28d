//! Cycle de vie d'une ressource native opaque liée à un unique propriétaire.
//!
//! Un [`NativeHandle`] passe par trois états, sans retour en arrière :
//!
//! ```text
//! Uninitialized ──acquire()──▶ Active(token) ──release()──▶ Destroyed
//! ```
//!
//! `release()` est atteint par deux chemins : l'arrêt explicite du
//! propriétaire et le `Drop` du handle. Les deux passent par le même
//! compare-and-swap sur l'état : la libération native n'a lieu qu'une fois,
//! quel que soit le nombre d'appels ou de threads.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU8, Ordering};

use tracing::{debug, trace};

use crate::error::{HandleError, NativeError};

/// Couche native pilotée par un [`NativeHandle`].
///
/// `Token` est ce que la plateforme rend à l'initialisation. Le handle le
/// conserve et le repasse à [`destroy`](Self::destroy) ; il n'est jamais
/// exposé ailleurs.
pub trait NativeBackend {
    type Token;

    fn initialize(&self) -> Result<Self::Token, NativeError>;

    fn destroy(&self, token: &Self::Token);
}

const UNINITIALIZED: u8 = 0;
const ACTIVE: u8 = 1;
const DESTROYED: u8 = 2;

/// État observable d'un [`NativeHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    Uninitialized,
    Active,
    Destroyed,
}

/// Handle à propriétaire unique sur une ressource native, libération idempotente.
pub struct NativeHandle<B: NativeBackend> {
    backend: B,
    state: AtomicU8,
    token: OnceLock<B::Token>,
}

impl<B: NativeBackend> NativeHandle<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: AtomicU8::new(UNINITIALIZED),
            token: OnceLock::new(),
        }
    }

    /// Initialise la ressource native.
    ///
    /// Valide une seule fois, depuis `Uninitialized`. Un second appel échoue
    /// avec [`HandleError::AlreadyAcquired`] sans toucher au backend. Si le
    /// backend échoue, le handle reste `Uninitialized`.
    ///
    /// Appelé une fois au démarrage par le propriétaire, jamais en concurrence.
    pub fn acquire(&self) -> Result<(), HandleError> {
        if self.state.load(Ordering::Acquire) != UNINITIALIZED {
            return Err(HandleError::AlreadyAcquired);
        }

        let token = self.backend.initialize()?;
        if let Err(token) = self.token.set(token) {
            self.backend.destroy(&token);
            return Err(HandleError::AlreadyAcquired);
        }
        self.state.store(ACTIVE, Ordering::Release);
        debug!("Native handle acquired");
        Ok(())
    }

    /// Libère la ressource native si elle est active. Tout autre appel est
    /// sans effet, y compris chaque appel après le premier qui a réussi.
    pub fn release(&self) {
        if self
            .state
            .compare_exchange(ACTIVE, DESTROYED, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            trace!("Native handle release ignored (not active)");
            return;
        }

        // Le CAS gagnant a vu ACTIVE, qui n'est écrit qu'après le token.
        if let Some(token) = self.token.get() {
            self.backend.destroy(token);
        }
        debug!("Native handle released");
    }

    pub fn state(&self) -> HandleState {
        match self.state.load(Ordering::Acquire) {
            UNINITIALIZED => HandleState::Uninitialized,
            ACTIVE => HandleState::Active,
            _ => HandleState::Destroyed,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state() == HandleState::Active
    }
}

impl<B: NativeBackend> Drop for NativeHandle<B> {
    fn drop(&mut self) {
        self.release();
    }
}
