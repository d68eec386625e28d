//! Types d'erreur de la gate de navigation, du handle natif et du démarrage.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Le lancement du handler externe a échoué.
///
/// Toujours absorbée par la gate : journalisée, puis la navigation retombe
/// sur le renderer.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("failed to launch external handler for {url}: {source}")]
    Launch {
        url: String,
        #[source]
        source: io::Error,
    },

    #[error("no external handler available: {0}")]
    Unsupported(String),
}

/// Échec remonté par un [`NativeBackend`](crate::native::NativeBackend).
#[derive(Error, Debug)]
pub enum NativeError {
    #[error("{call} failed with code {code}")]
    Platform { call: &'static str, code: u32 },

    #[error("native resource unavailable: {0}")]
    Unavailable(String),
}

/// Erreurs de [`NativeHandle::acquire`](crate::native::NativeHandle::acquire).
#[derive(Error, Debug)]
pub enum HandleError {
    /// `acquire()` sur un handle déjà actif ou détruit : bug de cycle de vie
    /// chez le propriétaire, pas une condition transitoire.
    #[error("native handle already acquired")]
    AlreadyAcquired,

    #[error("native initialization failed: {0}")]
    Native(#[from] NativeError),
}

/// L'entrée de démarrage ne peut pas être convertie en URL.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("assets/ directory not found (set HOSTVIEW_ASSETS or place it next to the executable)")]
    AssetsNotFound,

    #[error("cannot open entry {}: {source}", .path.display())]
    Entry {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("entry path is not absolute: {}", .0.display())]
    NotAbsolute(PathBuf),
}
