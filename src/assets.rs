//! Localisation des dossiers `assets/` (contenu local) et `resources/` (Servo),
//! et résolution de l'URL d'entrée chargée au démarrage.
//!
//! Un dossier `<name>/` est cherché dans l'ordre :
//! 1. Variable d'environnement dédiée (`HOSTVIEW_ASSETS`, `SERVO_RESOURCES_PATH`)
//! 2. À côté de l'exécutable (`<exe_dir>/<name>/`)
//! 3. Racine du projet si l'exécutable est dans `target/{debug,release}/`
//! 4. Répertoire courant (`./<name>/`)

use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;
use url::Url;

use crate::error::AssetError;

/// Nom du dossier de contenu local.
pub const ASSETS_DIR: &str = "assets";

/// Variable d'environnement qui force l'emplacement de `assets/`.
pub const ASSETS_ENV: &str = "HOSTVIEW_ASSETS";

/// Cherche le dossier `name` dans les emplacements standards.
pub fn locate_dir(name: &str, env_var: &str) -> Option<PathBuf> {
    if let Ok(path) = env::var(env_var) {
        let path = PathBuf::from(path);
        if path.is_dir() {
            return Some(path);
        }
    }

    if let Ok(exe_path) = env::current_exe()
        && let Ok(canonical) = exe_path.canonicalize()
        && let Some(exe_dir) = canonical.parent()
    {
        let path = exe_dir.join(name);
        if path.is_dir() {
            return Some(path);
        }

        // Pendant le développement avec cargo : target/{debug,release}/ → racine.
        if let Some(target_dir) = exe_dir.parent()
            && target_dir.file_name().is_some_and(|n| n == "target")
            && let Some(project_root) = target_dir.parent()
        {
            let path = project_root.join(name);
            if path.is_dir() {
                return Some(path);
            }
        }
    }

    let path = env::current_dir().ok()?.join(name);
    path.is_dir().then_some(path)
}

/// Résout l'URL chargée au démarrage.
///
/// `arg` (premier argument CLI) l'emporte s'il est présent : une URL avec
/// schéma est prise telle quelle, sinon il est traité comme un chemin de
/// fichier. Sans argument, on charge `<assets>/<entry>`.
pub fn entry_url(entry: &str, arg: Option<&str>) -> Result<Url, AssetError> {
    if let Some(arg) = arg {
        // Un schéma d'une seule lettre est une lettre de lecteur Windows (C:\...).
        if let Ok(url) = Url::parse(arg)
            && url.scheme().len() > 1
        {
            return Ok(url);
        }
        return file_url(Path::new(arg));
    }

    let dir = locate_dir(ASSETS_DIR, ASSETS_ENV).ok_or(AssetError::AssetsNotFound)?;
    file_url(&dir.join(entry))
}

fn file_url(path: &Path) -> Result<Url, AssetError> {
    let canonical = path.canonicalize().map_err(|source| AssetError::Entry {
        path: path.to_path_buf(),
        source,
    })?;
    let url = Url::from_file_path(&canonical)
        .map_err(|()| AssetError::NotAbsolute(canonical.clone()))?;
    debug!(%url, "Entry resolved");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    #[test]
    fn test_entry_url_accepts_full_urls() {
        let url = entry_url("index.html", Some("https://servo.org/")).unwrap();
        assert_eq!(url.as_str(), "https://servo.org/");
    }

    #[test]
    fn test_entry_url_from_existing_path() {
        let dir = env::temp_dir().join(format!("hostview-entry-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let file = dir.join("page.html");
        fs::write(&file, "<html></html>").unwrap();

        let url = entry_url("index.html", file.to_str()).unwrap();
        assert_eq!(url.scheme(), "file");
        assert!(url.path().ends_with("/page.html"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_entry_url_missing_path_is_an_error() {
        let err = entry_url("index.html", Some("/definitely/not/here.html")).unwrap_err();
        assert!(matches!(err, AssetError::Entry { .. }));
    }

    #[test]
    fn test_locate_dir_missing() {
        assert!(locate_dir("hostview-no-such-dir", "HOSTVIEW_NO_SUCH_ENV").is_none());
    }
}
