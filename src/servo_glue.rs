//! Couche d'intégration entre Servo et le shell.
//!
//! 1. **[`Waker`] / [`WakerEvent`]** : le pont `Send + Sync` entre les threads
//!    internes de Servo (Constellation, script, réseau) et le thread principal
//!    Winit.
//!
//! 2. **[`WebViewDelegate`] pour [`ShellState`]** : callbacks Servo → shell.
//!    `request_navigation()` est le point de décision de navigation : chaque
//!    requête passe par la [`NavigationGate`](crate::navigation::NavigationGate)
//!    avant que Servo ne charge quoi que ce soit.

use servo::{NavigationRequest as ServoNavigationRequest, WebView, WebViewDelegate};
use tracing::{debug, warn};
use url::Url;
use winit::event_loop::{EventLoop, EventLoopProxy};

use crate::navigation::NavigationRequest;
use crate::shell::ShellState;

// ─────────────────────────────────────────────────────────────────────────────
// Waker : pont Servo → Winit
// ─────────────────────────────────────────────────────────────────────────────

/// Événement marqueur envoyé à travers le `EventLoopProxy` de Winit.
///
/// Quand un thread interne de Servo a du travail pour le thread principal,
/// il appelle `Waker::wake()`, qui envoie ce `WakerEvent`. La boucle Winit
/// le reçoit dans `user_event()` et appelle `servo.spin_event_loop()`.
#[derive(Debug)]
pub struct WakerEvent;

/// Pont thread-safe entre les threads Servo et la boucle Winit.
///
/// `Clone + Send + Sync` car `EventLoopProxy` l'est, ce qu'exige
/// `EventLoopWaker: 'static + Send + Sync`.
#[derive(Clone)]
pub struct Waker(EventLoopProxy<WakerEvent>);

impl Waker {
    pub fn new(event_loop: &EventLoop<WakerEvent>) -> Self {
        Self(event_loop.create_proxy())
    }
}

impl embedder_traits::EventLoopWaker for Waker {
    fn clone_box(&self) -> Box<dyn embedder_traits::EventLoopWaker> {
        Box::new(self.clone())
    }

    fn wake(&self) {
        if let Err(error) = self.0.send_event(WakerEvent) {
            warn!(?error, "Échec du réveil de la boucle d'événements Winit");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// WebViewDelegate : callbacks Servo → shell
// ─────────────────────────────────────────────────────────────────────────────

impl WebViewDelegate for ShellState {
    /// Servo a composité un nouveau frame : on demande un redraw à Winit.
    fn notify_new_frame_ready(&self, _webview: WebView) {
        self.window.request_redraw();
    }

    fn notify_url_changed(&self, _webview: WebView, url: Url) {
        debug!(%url, "URL de la surface changée");
    }

    fn notify_page_title_changed(&self, _webview: WebView, title: Option<String>) {
        match title {
            Some(title) => self.window.set_title(&format!("{} — {title}", self.title)),
            None => self.window.set_title(&self.title),
        }
    }

    /// Décision de navigation.
    ///
    /// Servo n'appelle ce callback que pour les navigations initiées par la
    /// page (liens, `location.href`, formulaires), jamais pour le chargement
    /// initial demandé par le shell.
    fn request_navigation(&self, _webview: WebView, navigation_request: ServoNavigationRequest) {
        // Servo ne délègue que les navigations de la WebView elle-même.
        let request = NavigationRequest::new(navigation_request.url.as_str(), true);

        if self.gate.decide(&request).allows_load() {
            navigation_request.allow();
        } else {
            navigation_request.deny();
        }
    }
}
