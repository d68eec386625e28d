//! Native backend owned by the shell through a [`NativeHandle`].
//!
//! ## Windows
//!
//! Le timer système par défaut a une granularité de ~15.6 ms, ce qui fait
//! sauter des frames à 60 Hz. `timeBeginPeriod(1)` demande une résolution
//! de 1 ms pour toute la durée de vie du shell ; chaque appel doit être
//! apparié à un `timeEndPeriod` avec la même période, sinon la résolution
//! reste élevée pour tout le système.
//!
//! ## Linux / macOS
//!
//! Pas de ressource native à détenir. Le token est un numéro de séquence
//! propre au processus, utile seulement pour corréler les logs.
//!
//! [`NativeHandle`]: crate::native::NativeHandle

#[cfg(not(target_os = "windows"))]
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(target_os = "windows")]
use windows_sys::Win32::Media::{TIMERR_NOERROR, timeBeginPeriod, timeEndPeriod};

use tracing::{debug, info};

use crate::error::NativeError;
use crate::native::NativeBackend;

/// Requested timer resolution, in milliseconds.
#[cfg(target_os = "windows")]
const TIMER_PERIOD_MS: u32 = 1;

#[cfg(not(target_os = "windows"))]
static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Opaque token returned by [`PlatformCore::initialize`].
#[derive(Debug, PartialEq, Eq)]
pub struct CoreToken(u64);

/// Platform acceleration resources for the shell.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlatformCore;

impl NativeBackend for PlatformCore {
    type Token = CoreToken;

    #[cfg(target_os = "windows")]
    fn initialize(&self) -> Result<CoreToken, NativeError> {
        let result = unsafe { timeBeginPeriod(TIMER_PERIOD_MS) };
        if result != TIMERR_NOERROR {
            return Err(NativeError::Platform {
                call: "timeBeginPeriod",
                code: result,
            });
        }
        info!(period_ms = TIMER_PERIOD_MS, "High-resolution timer enabled");
        Ok(CoreToken(u64::from(TIMER_PERIOD_MS)))
    }

    #[cfg(not(target_os = "windows"))]
    fn initialize(&self) -> Result<CoreToken, NativeError> {
        let token = NEXT_TOKEN.fetch_add(1, Ordering::Relaxed);
        info!(token, "Platform core initialized (no native resource on this platform)");
        Ok(CoreToken(token))
    }

    #[cfg(target_os = "windows")]
    fn destroy(&self, token: &CoreToken) {
        // The period was stored from a u32 in initialize().
        let period = token.0 as u32;
        let result = unsafe { timeEndPeriod(period) };
        debug!(period_ms = period, result, "High-resolution timer released");
    }

    #[cfg(not(target_os = "windows"))]
    fn destroy(&self, token: &CoreToken) {
        debug!(token = token.0, "Platform core destroyed");
    }
}
