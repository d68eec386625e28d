//! Décision de navigation : pour chaque navigation demandée par la surface,
//! le renderer charge l'URL ou un handler externe la prend en charge.
//!
//! Seules les URLs au schéma exactement `file` sont escaladées. Tout le
//! reste va au renderer, sans consulter le dispatcher.
//!
//! ```text
//! NavigationRequest ──▶ scheme == "file" ? ──no──▶ Continue
//!                              │
//!                             yes
//!                              ▼
//!                      dispatcher.dispatch(url)
//!                        │              │
//!                       Ok             Err ──▶ warn! ──▶ Continue
//!                        ▼
//!                 Intercept(url)
//! ```
//!
//! Le schéma est lu tel quel dans l'URL brute, sans passage en minuscules :
//! `FILE:///x` ne correspond pas.

use tracing::{debug, warn};

use crate::error::DispatchError;

/// Schéma confié au dispatcher externe.
pub const INTERCEPTED_SCHEME: &str = "file";

/// Une tentative de navigation remontée par le renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    url: String,
    is_main_frame: bool,
}

impl NavigationRequest {
    pub fn new(url: impl Into<String>, is_main_frame: bool) -> Self {
        Self {
            url: url.into(),
            is_main_frame,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_main_frame(&self) -> bool {
        self.is_main_frame
    }

    /// Schéma de l'URL tel qu'écrit, ou `None` si l'URL n'a pas de schéma
    /// syntaxiquement valide (RFC 3986 §3.1).
    pub fn scheme(&self) -> Option<&str> {
        let (candidate, _) = self.url.split_once(':')?;
        let mut chars = candidate.chars();
        if !chars.next()?.is_ascii_alphabetic() {
            return None;
        }
        chars
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
            .then_some(candidate)
    }
}

/// Résultat de [`NavigationGate::decide`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Le renderer poursuit le chargement.
    Continue,
    /// L'URL a été confiée à un handler externe : le renderer ne doit pas la charger.
    Intercept(String),
}

impl NavigationDecision {
    pub fn is_intercepted(&self) -> bool {
        matches!(self, Self::Intercept(_))
    }

    /// Réponse à donner au renderer : `true` pour le laisser charger,
    /// `false` pour annuler la navigation.
    pub fn allows_load(&self) -> bool {
        match self {
            Self::Continue => true,
            Self::Intercept(_) => false,
        }
    }
}

/// Confie une URL à quelque chose hors de la surface ("ouvrir avec" du
/// système, autre processus). `Ok` signifie que le lancement a réussi, pas
/// que le handler a terminé.
pub trait ExternalDispatcher {
    fn dispatch(&self, url: &str) -> Result<(), DispatchError>;
}

impl<F> ExternalDispatcher for F
where
    F: Fn(&str) -> Result<(), DispatchError>,
{
    fn dispatch(&self, url: &str) -> Result<(), DispatchError> {
        self(url)
    }
}

/// Composant de décision sans état, branché sur le callback de navigation du renderer.
#[derive(Debug, Clone)]
pub struct NavigationGate<D> {
    dispatcher: D,
}

impl<D: ExternalDispatcher> NavigationGate<D> {
    pub fn new(dispatcher: D) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Classe `request`. Le dispatch est tenté au plus une fois ; un échec est
    /// journalisé et se replie sur [`NavigationDecision::Continue`].
    pub fn decide(&self, request: &NavigationRequest) -> NavigationDecision {
        if request.scheme() != Some(INTERCEPTED_SCHEME) {
            debug!(url = request.url(), "Navigation left to the renderer");
            return NavigationDecision::Continue;
        }

        match self.dispatcher.dispatch(request.url()) {
            Ok(()) => {
                debug!(
                    url = request.url(),
                    main_frame = request.is_main_frame(),
                    "Navigation escalated to external handler"
                );
                NavigationDecision::Intercept(request.url().to_owned())
            }
            Err(error) => {
                warn!(
                    url = request.url(),
                    %error,
                    "External dispatch failed, falling back to the renderer"
                );
                NavigationDecision::Continue
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    /// Records every URL it receives and answers with a fixed outcome.
    struct RecordingDispatcher {
        succeed: bool,
        calls: Mutex<Vec<String>>,
    }

    impl RecordingDispatcher {
        fn new(succeed: bool) -> Self {
            Self {
                succeed,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ExternalDispatcher for RecordingDispatcher {
        fn dispatch(&self, url: &str) -> Result<(), DispatchError> {
            self.calls.lock().unwrap().push(url.to_owned());
            if self.succeed {
                Ok(())
            } else {
                Err(DispatchError::Launch {
                    url: url.to_owned(),
                    source: io::Error::new(io::ErrorKind::NotFound, "no handler"),
                })
            }
        }
    }

    /// Counts WARN events emitted while installed.
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn main_frame(url: &str) -> NavigationRequest {
        NavigationRequest::new(url, true)
    }

    // ── scheme extraction ─────────────────────────────────────────────

    #[test]
    fn test_scheme_is_case_preserved() {
        assert_eq!(main_frame("FILE:///x").scheme(), Some("FILE"));
        assert_eq!(main_frame("file:///x").scheme(), Some("file"));
        assert_eq!(main_frame("git+ssh://host/repo").scheme(), Some("git+ssh"));
    }

    #[test]
    fn test_scheme_missing_or_invalid() {
        assert_eq!(main_frame("").scheme(), None);
        assert_eq!(main_frame("/etc/passwd").scheme(), None);
        assert_eq!(main_frame(":nothing").scheme(), None);
        assert_eq!(main_frame("1file:///x").scheme(), None);
        assert_eq!(main_frame("fi le:///x").scheme(), None);
    }

    // ── decide ────────────────────────────────────────────────────────

    #[test]
    fn test_non_file_schemes_continue_without_dispatch() {
        let gate = NavigationGate::new(RecordingDispatcher::new(true));
        for url in [
            "https://example.com",
            "http://localhost:8080/",
            "about:blank",
            "data:text/html,hi",
            "files:///x",
            "no scheme at all",
        ] {
            assert_eq!(gate.decide(&main_frame(url)), NavigationDecision::Continue);
        }
        assert!(gate.dispatcher().calls().is_empty());
    }

    #[test]
    fn test_file_scheme_intercepted_on_success() {
        let gate = NavigationGate::new(RecordingDispatcher::new(true));
        let decision = gate.decide(&main_frame("file:///sdcard/doc.pdf"));

        assert_eq!(
            decision,
            NavigationDecision::Intercept("file:///sdcard/doc.pdf".to_string())
        );
        assert!(decision.is_intercepted());
        assert_eq!(gate.dispatcher().calls(), vec!["file:///sdcard/doc.pdf"]);
    }

    #[test]
    fn test_file_scheme_subframe_also_escalated() {
        let gate = NavigationGate::new(RecordingDispatcher::new(true));
        let decision = gate.decide(&NavigationRequest::new("file:///tmp/a.txt", false));
        assert!(decision.is_intercepted());
    }

    #[test]
    fn test_dispatch_failure_falls_back_and_logs_once() {
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(warnings.clone()));
        let gate = NavigationGate::new(RecordingDispatcher::new(false));

        let decision = tracing::subscriber::with_default(subscriber, || {
            gate.decide(&main_frame("file:///etc/passwd"))
        });

        assert_eq!(decision, NavigationDecision::Continue);
        assert_eq!(gate.dispatcher().calls().len(), 1, "no retries");
        assert_eq!(warnings.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_uppercase_scheme_is_not_intercepted() {
        let gate = NavigationGate::new(RecordingDispatcher::new(true));
        assert_eq!(gate.decide(&main_frame("FILE:///x")), NavigationDecision::Continue);
        assert_eq!(gate.decide(&main_frame("File:///x")), NavigationDecision::Continue);
        assert!(gate.dispatcher().calls().is_empty());
    }

    #[test]
    fn test_decision_maps_to_renderer_answer() {
        assert!(NavigationDecision::Continue.allows_load());
        assert!(!NavigationDecision::Intercept("file:///x".into()).allows_load());

        let gate = NavigationGate::new(RecordingDispatcher::new(true));
        assert!(!gate.decide(&main_frame("file:///tmp/a.pdf")).allows_load());
        assert!(gate.decide(&main_frame("https://example.com")).allows_load());

        let failing = NavigationGate::new(RecordingDispatcher::new(false));
        assert!(failing.decide(&main_frame("file:///tmp/a.pdf")).allows_load());
    }

    #[test]
    fn test_closure_dispatcher() {
        let gate = NavigationGate::new(|_: &str| -> Result<(), DispatchError> {
            Err(DispatchError::Unsupported("test".into()))
        });
        assert_eq!(gate.decide(&main_frame("file:///x")), NavigationDecision::Continue);
    }
}
