use std::collections::HashSet;

use crate::coords::Point;

use super::types::{Event, Key, Modifiers, MouseButton};

/// Input state tracked alongside event translation.
///
/// Some platforms report button and wheel events without a pointer position
/// or modifier state; the translator fills those in from here.
#[derive(Debug, Default)]
pub struct InputState {
    pub modifiers: Modifiers,

    /// Last known pointer position in window pixels.
    pub pointer_pos: Option<Point>,

    pub keys_down: HashSet<Key>,
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Folds a translated event into the tracked state.
    pub fn apply(&mut self, ev: &Event) {
        match ev {
            Event::MouseMove { pos, modifiers } => {
                self.pointer_pos = Some(*pos);
                self.modifiers = *modifiers;
            }
            Event::MousePress { pos, button, modifiers } => {
                self.pointer_pos = Some(*pos);
                self.modifiers = *modifiers;
                self.buttons_down.insert(*button);
            }
            Event::MouseRelease { pos, button, modifiers } => {
                self.pointer_pos = Some(*pos);
                self.modifiers = *modifiers;
                self.buttons_down.remove(button);
            }
            Event::KeyPress { key, modifiers, .. } => {
                self.modifiers = *modifiers;
                self.keys_down.insert(*key);
            }
            Event::KeyRelease { key, modifiers, .. } => {
                self.modifiers = *modifiers;
                self.keys_down.remove(key);
            }
            Event::WindowFocus(false) => {
                // Avoids stuck keys/buttons when focus changes mid-press.
                self.keys_down.clear();
                self.buttons_down.clear();
            }
            _ => {}
        }
    }

    /// Pointer position, or the window origin if the pointer was never seen.
    pub fn pointer_or_origin(&self) -> Point {
        self.pointer_pos.unwrap_or(Point::ZERO)
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_release_tracks_buttons() {
        let mut st = InputState::default();
        let m = Modifiers::default();
        st.apply(&Event::MousePress { pos: Point::new(3, 4), button: MouseButton::Left, modifiers: m });
        assert!(st.button_down(MouseButton::Left));
        assert_eq!(st.pointer_or_origin(), Point::new(3, 4));
        st.apply(&Event::MouseRelease { pos: Point::new(3, 4), button: MouseButton::Left, modifiers: m });
        assert!(!st.button_down(MouseButton::Left));
    }

    #[test]
    fn focus_loss_clears_held_keys() {
        let mut st = InputState::default();
        st.apply(&Event::KeyPress { key: Key::Shift, code: 0, modifiers: Modifiers::default(), repeat: false });
        assert!(st.key_down(Key::Shift));
        st.apply(&Event::WindowFocus(false));
        assert!(!st.key_down(Key::Shift));
    }
}
