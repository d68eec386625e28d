//! Point d'entrée de hostview.
//!
//! Usage :
//!   hostview [ENTRY]
//!
//! Sans argument, charge `assets/<general.entry>` (par défaut `index.html`).
//! `ENTRY` peut être une URL complète ou un chemin de fichier local.

use std::env;
use std::error::Error;

use tracing_subscriber::EnvFilter;
use winit::event_loop::EventLoop;

use hostview::config::Config;

fn main() -> Result<(), Box<dyn Error>> {
    // ── 1. Configuration ───────────────────────────────────────────────
    let config = Config::load();

    // ── 2. Logging / Tracing ───────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // ── 3. Provider crypto TLS ─────────────────────────────────────────
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .expect("Échec de l'installation du provider crypto rustls");

    // ── 4. Lecteur de ressources Servo ─────────────────────────────────
    hostview::resources::init();

    // ── 5. URL d'entrée ────────────────────────────────────────────────
    let arg = env::args().nth(1);
    let entry = hostview::assets::entry_url(&config.general.entry, arg.as_deref())?;
    tracing::info!(%entry, window_title = %config.general.window_title, "Démarrage du shell");

    // ── 6. Boucle d'événements Winit ───────────────────────────────────
    let event_loop = EventLoop::with_user_event()
        .build()
        .expect("Échec de la création du EventLoop Winit");

    let mut app = hostview::shell::App::new(&event_loop, entry, config);

    Ok(event_loop.run_app(&mut app)?)
}
