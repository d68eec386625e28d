//! Conversion des événements d'entrée Winit vers les types Servo.
//!
//! La surface n'a pas de chrome : tous les événements souris et clavier
//! reçus par la fenêtre sont transmis à la WebView. Seules les touches
//! utiles à l'édition et à la navigation dans une page sont nommées ;
//! le reste passe comme caractère ou `Unidentified`.

use servo::{
    Code, Key, KeyState, KeyboardEvent, Location, Modifiers, MouseButton, MouseButtonAction,
    NamedKey, WheelDelta, WheelMode,
};
use winit::event::{ElementState, KeyEvent, MouseButton as WinitMouseButton, MouseScrollDelta};
use winit::keyboard::{
    Key as WinitKey, KeyCode, KeyLocation as WinitKeyLocation, ModifiersState,
    NamedKey as WinitNamedKey, PhysicalKey,
};

/// Pixels par "ligne" de défilement molette.
const LINE_HEIGHT: f64 = 76.0;

pub fn mouse_button(button: WinitMouseButton) -> MouseButton {
    match button {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(id) => MouseButton::Other(id),
    }
}

pub fn button_action(state: ElementState) -> MouseButtonAction {
    match state {
        ElementState::Pressed => MouseButtonAction::Down,
        ElementState::Released => MouseButtonAction::Up,
    }
}

pub fn wheel_delta(delta: MouseScrollDelta) -> WheelDelta {
    let (x, y, mode) = match delta {
        MouseScrollDelta::LineDelta(dx, dy) => (
            f64::from(dx) * LINE_HEIGHT,
            f64::from(dy) * LINE_HEIGHT,
            WheelMode::DeltaLine,
        ),
        MouseScrollDelta::PixelDelta(delta) => (delta.x, delta.y, WheelMode::DeltaPixel),
    };
    WheelDelta { x, y, z: 0.0, mode }
}

/// Convertit un `KeyEvent` Winit + état des modificateurs en `KeyboardEvent` Servo.
pub fn keyboard_event(key_event: &KeyEvent, mods: ModifiersState) -> KeyboardEvent {
    let state = match key_event.state {
        ElementState::Pressed => KeyState::Down,
        ElementState::Released => KeyState::Up,
    };
    let location = match key_event.location {
        WinitKeyLocation::Left => Location::Left,
        WinitKeyLocation::Right => Location::Right,
        WinitKeyLocation::Numpad => Location::Numpad,
        WinitKeyLocation::Standard => Location::Standard,
    };

    KeyboardEvent::new_without_event(
        state,
        key(&key_event.logical_key),
        code(&key_event.physical_key),
        location,
        modifiers(mods),
        key_event.repeat,
        false,
    )
}

fn key(logical_key: &WinitKey) -> Key {
    let named = match logical_key {
        WinitKey::Character(text) => return Key::Character(text.to_string()),
        WinitKey::Named(WinitNamedKey::Space) => return Key::Character(" ".to_string()),
        WinitKey::Named(named) => named,
        WinitKey::Unidentified(_) | WinitKey::Dead(_) => return Key::Named(NamedKey::Unidentified),
    };

    Key::Named(match named {
        WinitNamedKey::Enter => NamedKey::Enter,
        WinitNamedKey::Tab => NamedKey::Tab,
        WinitNamedKey::Backspace => NamedKey::Backspace,
        WinitNamedKey::Delete => NamedKey::Delete,
        WinitNamedKey::Escape => NamedKey::Escape,
        WinitNamedKey::ArrowUp => NamedKey::ArrowUp,
        WinitNamedKey::ArrowDown => NamedKey::ArrowDown,
        WinitNamedKey::ArrowLeft => NamedKey::ArrowLeft,
        WinitNamedKey::ArrowRight => NamedKey::ArrowRight,
        WinitNamedKey::Home => NamedKey::Home,
        WinitNamedKey::End => NamedKey::End,
        WinitNamedKey::PageUp => NamedKey::PageUp,
        WinitNamedKey::PageDown => NamedKey::PageDown,
        WinitNamedKey::Shift => NamedKey::Shift,
        WinitNamedKey::Control => NamedKey::Control,
        WinitNamedKey::Alt => NamedKey::Alt,
        WinitNamedKey::Meta | WinitNamedKey::Super => NamedKey::Meta,
        _ => NamedKey::Unidentified,
    })
}

fn code(physical_key: &PhysicalKey) -> Code {
    let PhysicalKey::Code(key_code) = physical_key else {
        return Code::Unidentified;
    };

    match key_code {
        KeyCode::Enter => Code::Enter,
        KeyCode::Tab => Code::Tab,
        KeyCode::Backspace => Code::Backspace,
        KeyCode::Delete => Code::Delete,
        KeyCode::Escape => Code::Escape,
        KeyCode::Space => Code::Space,
        KeyCode::ArrowUp => Code::ArrowUp,
        KeyCode::ArrowDown => Code::ArrowDown,
        KeyCode::ArrowLeft => Code::ArrowLeft,
        KeyCode::ArrowRight => Code::ArrowRight,
        KeyCode::Home => Code::Home,
        KeyCode::End => Code::End,
        KeyCode::PageUp => Code::PageUp,
        KeyCode::PageDown => Code::PageDown,
        _ => Code::Unidentified,
    }
}

fn modifiers(mods: ModifiersState) -> Modifiers {
    let mut modifiers = Modifiers::empty();
    modifiers.set(Modifiers::CONTROL, mods.control_key());
    modifiers.set(Modifiers::SHIFT, mods.shift_key());
    modifiers.set(Modifiers::ALT, mods.alt_key());
    modifiers.set(Modifiers::META, mods.super_key());
    modifiers
}
