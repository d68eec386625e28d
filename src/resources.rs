//! Lecteur de ressources Servo.
//!
//! Servo a besoin de ses fichiers de ressources (préférences, certificats,
//! domaines publics, etc.) pour démarrer. L'embedder fournit une
//! implémentation de `ResourceReaderMethods`, enregistrée via
//! `servo::resources::set()`.
//!
//! Le dossier `resources/` est localisé comme `assets/` (voir
//! [`crate::assets::locate_dir`]), avec `SERVO_RESOURCES_PATH` comme
//! variable d'override.

use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use servo::resources::{self, Resource};

use crate::assets;

const RESOURCES_ENV: &str = "SERVO_RESOURCES_PATH";

static RESOURCES_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Initialise le lecteur de ressources Servo.
///
/// **Doit être appelé avant `ServoBuilder::build()`**, sinon Servo
/// paniquera avec "Resource reader not set".
pub fn init() {
    resources::set(Box::new(ResourceReader));
}

struct ResourceReader;

impl resources::ResourceReaderMethods for ResourceReader {
    fn read(&self, file: Resource) -> Vec<u8> {
        let base = resources_dir();
        let path = base.join(file.filename());

        // Le chemin résolu doit rester sous resources/ (pas de "../" ni de symlink sortant).
        let canonical = path
            .canonicalize()
            .unwrap_or_else(|e| panic!("Invalid resource path '{}': {}", file.filename(), e));
        if !canonical.starts_with(base) {
            panic!(
                "Resource '{}' resolves outside {}: {}",
                file.filename(),
                base.display(),
                canonical.display()
            );
        }

        fs::read(&canonical).unwrap_or_else(|e| {
            panic!(
                "Impossible de lire la ressource Servo {:?} ({}): {}",
                file.filename(),
                canonical.display(),
                e
            )
        })
    }

    fn sandbox_access_files_dirs(&self) -> Vec<PathBuf> {
        vec![resources_dir().clone()]
    }

    fn sandbox_access_files(&self) -> Vec<PathBuf> {
        vec![]
    }
}

/// Chemin canonique du dossier `resources/`, résolu une seule fois.
fn resources_dir() -> &'static PathBuf {
    RESOURCES_DIR.get_or_init(|| {
        assets::locate_dir("resources", RESOURCES_ENV)
            .and_then(|dir| dir.canonicalize().ok())
            .unwrap_or_else(|| {
                panic!(
                    "Impossible de trouver le dossier 'resources/' de Servo. \
                     Définissez {RESOURCES_ENV} ou placez le dossier à côté de l'exécutable."
                )
            })
    })
}
