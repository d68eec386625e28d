//! Boucle d'événements Winit et cycle de vie du shell.
//!
//! ## Pattern "Two-Phase App"
//!
//! Winit 0.30 impose que les fenêtres soient créées dans `resumed()`, et non
//! dans `main()`. Servo a besoin d'un handle de fenêtre pour créer son
//! `WindowRenderingContext`, d'où deux phases :
//!
//! ```text
//! Phase::Initial { waker, entry }  →  [resumed()]  →  Phase::Running(Rc<ShellState>)
//! ```
//!
//! ## Ressource native
//!
//! Le shell possède exactement un [`NativeHandle<PlatformCore>`]. Il est
//! acquis au démarrage (`resumed`) et libéré à l'arrêt (`exiting`). Si le
//! shell est détruit sans passer par `exiting`, le `Drop` du handle prend le
//! relais ; la libération native n'a lieu qu'une fois dans tous les cas.
//!
//! ## Flux de communication Winit ↔ Servo
//!
//! ```text
//! Threads Servo ──wake()──▶ EventLoopProxy::send_event(WakerEvent)
//!                                   │
//!                                   ▼
//!                  user_event() → servo.spin_event_loop()
//!                                   └─ WebViewDelegate (request_navigation, ...)
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use euclid::Scale;
use servo::{
    InputEvent, MouseButtonEvent, MouseLeftViewportEvent, MouseMoveEvent, RenderingContext, Servo,
    ServoBuilder, WebView, WebViewBuilder, WheelEvent, WindowRenderingContext,
};
use tracing::{error, info};
use url::Url;
use webrender_api::units::DevicePoint;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::ModifiersState;
use winit::raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::window::{Window, WindowId};

use crate::config::Config;
use crate::dispatch::SystemDispatcher;
use crate::input;
use crate::native::NativeHandle;
use crate::navigation::NavigationGate;
use crate::platform_core::PlatformCore;
use crate::servo_glue::{Waker, WakerEvent};

// ─────────────────────────────────────────────────────────────────────────────
// ShellState : état partagé entre Winit et Servo
// ─────────────────────────────────────────────────────────────────────────────

/// État du shell, créé lors de `resumed()`.
///
/// Encapsulé dans `Rc` : `WebViewBuilder::delegate` attend un
/// `Rc<dyn WebViewDelegate>` et tout vit sur le thread principal.
pub struct ShellState {
    pub window: Window,
    pub servo: Servo,
    pub rendering_context: Rc<WindowRenderingContext>,
    /// L'unique surface de rendu.
    pub webview: RefCell<Option<WebView>>,
    /// Position courante du curseur en device pixels.
    pub cursor_position: Cell<DevicePoint>,
    pub modifiers: Cell<ModifiersState>,
    /// Décision de navigation, consultée par `request_navigation()`.
    pub gate: NavigationGate<SystemDispatcher>,
    /// Titre de base de la fenêtre.
    pub title: String,
}

impl ShellState {
    fn with_webview(&self, f: impl FnOnce(&WebView)) {
        if let Some(webview) = self.webview.borrow().as_ref() {
            f(webview);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// App : shell à deux phases
// ─────────────────────────────────────────────────────────────────────────────

enum Phase {
    /// On attend que Winit appelle `resumed()`.
    Initial { waker: Waker, entry: Url },
    Running(Rc<ShellState>),
}

pub struct App {
    phase: Phase,
    config: Config,
    core: NativeHandle<PlatformCore>,
}

impl App {
    /// Crée le shell dans son état initial avec l'URL d'entrée à charger.
    pub fn new(event_loop: &EventLoop<WakerEvent>, entry: Url, config: Config) -> Self {
        Self {
            phase: Phase::Initial {
                waker: Waker::new(event_loop),
                entry,
            },
            config,
            core: NativeHandle::new(PlatformCore),
        }
    }

    fn running(&self) -> Option<&Rc<ShellState>> {
        match &self.phase {
            Phase::Running(state) => Some(state),
            Phase::Initial { .. } => None,
        }
    }

    fn start(&self, event_loop: &ActiveEventLoop, waker: Waker, entry: Url) -> Rc<ShellState> {
        // ── 1. Fenêtre Winit ───────────────────────────────────────────
        let display_handle = event_loop
            .display_handle()
            .expect("Impossible d'obtenir le DisplayHandle");

        let window_attributes = Window::default_attributes()
            .with_title(&self.config.general.window_title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        let window = event_loop
            .create_window(window_attributes)
            .expect("Impossible de créer la fenêtre Winit");

        let window_handle = window
            .window_handle()
            .expect("Impossible d'obtenir le WindowHandle");

        // ── 2. Contexte de rendu OpenGL (surfman) ──────────────────────
        let rendering_context = Rc::new(
            WindowRenderingContext::new(display_handle, window_handle, window.inner_size())
                .expect("Impossible de créer le WindowRenderingContext — vérifiez vos drivers GPU"),
        );
        rendering_context
            .make_current()
            .expect("Impossible de rendre le contexte OpenGL courant");

        // ── 3. Instance Servo ───────────────────────────────────────────
        let servo = ServoBuilder::default()
            .preferences(build_servo_preferences(&self.config))
            .event_loop_waker(Box::new(waker))
            .build();

        let gate = NavigationGate::new(SystemDispatcher::with_opener(
            self.config.dispatch.opener.clone(),
        ));

        let state = Rc::new(ShellState {
            window,
            servo,
            rendering_context: rendering_context.clone(),
            webview: RefCell::new(None),
            cursor_position: Cell::new(DevicePoint::zero()),
            modifiers: Cell::new(ModifiersState::default()),
            gate,
            title: self.config.general.window_title.clone(),
        });

        // ── 4. WebView unique, chargée depuis l'entrée locale ───────────
        info!(url = %entry, "Chargement de l'entrée");
        let scale_factor = state.window.scale_factor() as f32;
        let webview = WebViewBuilder::new(&state.servo, rendering_context as Rc<dyn RenderingContext>)
            .url(entry)
            .hidpi_scale_factor(Scale::new(scale_factor))
            .delegate(state.clone())
            .build();

        *state.webview.borrow_mut() = Some(webview);
        state
    }
}

/// Préférences Servo à partir de la configuration.
#[allow(clippy::field_reassign_with_default)]
fn build_servo_preferences(config: &Config) -> servo::Preferences {
    let mut prefs = servo::Preferences::default();

    prefs.layout_threads = if config.servo.layout_threads > 0 {
        config.servo.layout_threads
    } else {
        std::thread::available_parallelism()
            .map(|n| n.get() as i64)
            .unwrap_or(4)
            .min(8)
    };
    if !config.servo.user_agent.is_empty() {
        prefs.user_agent = config.servo.user_agent.clone();
    }

    info!(layout_threads = prefs.layout_threads, "Servo preferences configured");
    prefs
}

// ─────────────────────────────────────────────────────────────────────────────
// ApplicationHandler : dispatch des événements Winit
// ─────────────────────────────────────────────────────────────────────────────

impl ApplicationHandler<WakerEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let (waker, entry) = match &self.phase {
            Phase::Initial { waker, entry } => (waker.clone(), entry.clone()),
            Phase::Running(_) => return,
        };

        // Une erreur ici est un bug de cycle de vie : on n'ouvre pas la fenêtre.
        if let Err(e) = self.core.acquire() {
            error!(error = %e, "Échec de l'acquisition du core natif");
            event_loop.exit();
            return;
        }

        let state = self.start(event_loop, waker, entry);
        self.phase = Phase::Running(state);
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, _event: WakerEvent) {
        if let Some(state) = self.running() {
            state.servo.spin_event_loop();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(state) = self.running() else {
            return;
        };

        // Toujours faire tourner la boucle Servo en premier.
        state.servo.spin_event_loop();

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::RedrawRequested => {
                state.with_webview(|webview| {
                    webview.paint();
                });
                state.rendering_context.present();
            }

            WindowEvent::Resized(new_size) => {
                state.with_webview(|webview| {
                    webview.resize(new_size);
                });
            }

            WindowEvent::ModifiersChanged(new_modifiers) => {
                state.modifiers.set(new_modifiers.state());
            }

            WindowEvent::CursorMoved { position, .. } => {
                let point = DevicePoint::new(position.x as f32, position.y as f32);
                state.cursor_position.set(point);
                state.with_webview(|webview| {
                    webview.notify_input_event(InputEvent::MouseMove(MouseMoveEvent::new(
                        point.into(),
                    )));
                });
            }

            WindowEvent::CursorLeft { .. } => {
                state.with_webview(|webview| {
                    webview.notify_input_event(InputEvent::MouseLeftViewport(
                        MouseLeftViewportEvent::default(),
                    ));
                });
            }

            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => {
                let point = state.cursor_position.get();
                state.with_webview(|webview| {
                    webview.notify_input_event(InputEvent::MouseButton(MouseButtonEvent::new(
                        input::button_action(button_state),
                        input::mouse_button(button),
                        point.into(),
                    )));
                });
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let point = state.cursor_position.get();
                state.with_webview(|webview| {
                    webview.notify_input_event(InputEvent::Wheel(WheelEvent::new(
                        input::wheel_delta(delta),
                        point.into(),
                    )));
                });
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let keyboard_event = input::keyboard_event(&event, state.modifiers.get());
                state.with_webview(|webview| {
                    webview.notify_input_event(InputEvent::Keyboard(keyboard_event));
                });
            }

            _ => (),
        }
    }

    /// Arrêt explicite : la ressource native est libérée ici. Le `Drop` du
    /// handle refera l'appel plus tard, sans effet.
    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Phase::Running(state) = &self.phase {
            state.webview.borrow_mut().take();
        }
        self.core.release();
        info!("Shell arrêté");
    }
}
