//! # hostview
//!
//! Coquille applicative hébergeant une seule surface web (une `WebView`
//! Servo) chargée depuis un contenu local.
//!
//! ## Core
//!
//! - [`navigation`] : `NavigationGate`, décision de navigation. Les URLs au
//!   schéma `file` sont confiées au handler externe du système ; le reste
//!   est rendu dans la surface.
//! - [`native`] : `NativeHandle`, cycle de vie d'une ressource native
//!   (acquisition unique, libération idempotente, `Drop` en filet de sécurité).
//! - [`platform_core`] : la ressource native détenue par le shell.
//! - [`dispatch`] : `SystemDispatcher`, lancement de l'opener de la plateforme.
//! - [`config`], [`assets`], [`error`].
//!
//! ## Shell (feature `shell`)
//!
//! - [`shell`] : boucle Winit, pattern "Two-Phase App".
//! - [`servo_glue`] : `Waker` et `WebViewDelegate` (branche la gate sur
//!   `request_navigation`).
//! - [`input`] : conversion des événements Winit vers Servo.
//! - [`resources`] : lecteur de ressources Servo.

pub mod assets;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod native;
pub mod navigation;
pub mod platform_core;

#[cfg(feature = "shell")]
pub mod input;
#[cfg(feature = "shell")]
pub mod resources;
#[cfg(feature = "shell")]
pub mod servo_glue;
#[cfg(feature = "shell")]
pub mod shell;
