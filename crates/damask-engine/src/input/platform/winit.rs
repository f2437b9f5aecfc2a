use ::winit::dpi::PhysicalPosition;
use ::winit::event::{ElementState, Ime, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use ::winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

use crate::coords::Point;
use crate::input::{Event, InputState, Key, Modifiers, MouseButton, WheelDelta};

/// Translates a winit `WindowEvent` into a core [`Event`].
///
/// Coordinates stay in physical pixels so they line up with a framebuffer of
/// the window's inner size. `state` is updated with every translated event and
/// supplies the pointer position and modifiers winit omits from button,
/// wheel and key events.
///
/// Returns `None` for events the core has no use for.
pub fn translate_window_event(state: &mut InputState, event: &WindowEvent) -> Option<Event> {
    let ev = match event {
        WindowEvent::ModifiersChanged(m) => {
            state.modifiers = map_modifiers(m.state());
            return None;
        }

        WindowEvent::Focused(f) => Event::WindowFocus(*f),

        WindowEvent::Occluded(hidden) => Event::Visibility(!*hidden),

        WindowEvent::Resized(size) => Event::Resize {
            width: size.width as i32,
            height: size.height as i32,
        },

        WindowEvent::RedrawRequested => Event::Expose { rect: None },

        WindowEvent::CursorMoved { position, .. } => Event::MouseMove {
            pos: to_point(*position),
            modifiers: state.modifiers,
        },

        WindowEvent::MouseInput { state: st, button, .. } => {
            let pos = state.pointer_or_origin();
            let button = map_mouse_button(*button);
            let modifiers = state.modifiers;
            match st {
                ElementState::Pressed => Event::MousePress { pos, button, modifiers },
                ElementState::Released => Event::MouseRelease { pos, button, modifiers },
            }
        }

        WindowEvent::MouseWheel { delta, .. } => {
            let delta = match delta {
                MouseScrollDelta::LineDelta(x, y) => WheelDelta::Lines { x: *x, y: *y },
                MouseScrollDelta::PixelDelta(p) => WheelDelta::Pixels {
                    x: p.x.round() as i32,
                    y: p.y.round() as i32,
                },
            };
            Event::MouseWheel {
                pos: state.pointer_or_origin(),
                delta,
                modifiers: state.modifiers,
            }
        }

        WindowEvent::KeyboardInput { event, .. } => {
            let (key, code) = map_key(event.physical_key);
            let modifiers = state.modifiers;
            match event.state {
                ElementState::Pressed => Event::KeyPress { key, code, modifiers, repeat: event.repeat },
                ElementState::Released => Event::KeyRelease { key, code, modifiers },
            }
        }

        WindowEvent::Ime(Ime::Commit(text)) if !text.is_empty() => Event::Char { text: text.clone() },

        _ => return None,
    };

    state.apply(&ev);
    Some(ev)
}

fn to_point(pos: PhysicalPosition<f64>) -> Point {
    Point::new(pos.x.floor() as i32, pos.y.floor() as i32)
}

fn map_modifiers(m: ModifiersState) -> Modifiers {
    Modifiers {
        shift: m.shift_key(),
        ctrl: m.control_key(),
        alt: m.alt_key(),
        meta: m.super_key(),
    }
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

/// winit exposes no portable scancode, so the numeric code is always 0.
fn map_key(pk: PhysicalKey) -> (Key, u32) {
    let PhysicalKey::Code(code) = pk else {
        return (Key::Unknown(0), 0);
    };

    const LETTERS: [(KeyCode, char); 26] = [
        (KeyCode::KeyA, 'A'), (KeyCode::KeyB, 'B'), (KeyCode::KeyC, 'C'), (KeyCode::KeyD, 'D'),
        (KeyCode::KeyE, 'E'), (KeyCode::KeyF, 'F'), (KeyCode::KeyG, 'G'), (KeyCode::KeyH, 'H'),
        (KeyCode::KeyI, 'I'), (KeyCode::KeyJ, 'J'), (KeyCode::KeyK, 'K'), (KeyCode::KeyL, 'L'),
        (KeyCode::KeyM, 'M'), (KeyCode::KeyN, 'N'), (KeyCode::KeyO, 'O'), (KeyCode::KeyP, 'P'),
        (KeyCode::KeyQ, 'Q'), (KeyCode::KeyR, 'R'), (KeyCode::KeyS, 'S'), (KeyCode::KeyT, 'T'),
        (KeyCode::KeyU, 'U'), (KeyCode::KeyV, 'V'), (KeyCode::KeyW, 'W'), (KeyCode::KeyX, 'X'),
        (KeyCode::KeyY, 'Y'), (KeyCode::KeyZ, 'Z'),
    ];
    const DIGITS: [KeyCode; 10] = [
        KeyCode::Digit0, KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4,
        KeyCode::Digit5, KeyCode::Digit6, KeyCode::Digit7, KeyCode::Digit8, KeyCode::Digit9,
    ];
    const FUNCTION: [KeyCode; 12] = [
        KeyCode::F1, KeyCode::F2, KeyCode::F3, KeyCode::F4, KeyCode::F5, KeyCode::F6,
        KeyCode::F7, KeyCode::F8, KeyCode::F9, KeyCode::F10, KeyCode::F11, KeyCode::F12,
    ];

    let key = match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::Enter | KeyCode::NumpadEnter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Space => Key::Space,
        KeyCode::Insert => Key::Insert,
        KeyCode::Delete => Key::Delete,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,
        KeyCode::ShiftLeft | KeyCode::ShiftRight => Key::Shift,
        KeyCode::ControlLeft | KeyCode::ControlRight => Key::Control,
        KeyCode::AltLeft | KeyCode::AltRight => Key::Alt,
        KeyCode::SuperLeft | KeyCode::SuperRight => Key::Meta,
        other => {
            if let Some(&(_, c)) = LETTERS.iter().find(|(k, _)| *k == other) {
                Key::Letter(c)
            } else if let Some(d) = DIGITS.iter().position(|k| *k == other) {
                Key::Digit(d as u8)
            } else if let Some(n) = FUNCTION.iter().position(|k| *k == other) {
                Key::F(n as u8 + 1)
            } else {
                Key::Unknown(0)
            }
        }
    };

    (key, 0)
}
