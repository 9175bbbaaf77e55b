use std::collections::HashSet;

use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{Key, NamedKey};

use crate::types::KeyCode;

/// Read-only view of which keys are currently held.
pub trait InputSnapshot {
    fn is_pressed(&self, key: KeyCode) -> bool;
}

/// Key state accumulated from window events between frames.
///
/// A key pressed and released between two polls still reads as pressed on the
/// next poll; [`KeyboardState::settle`] clears that latch once the poll is done.
#[derive(Debug, Default)]
pub struct KeyboardState {
    pressed: HashSet<KeyCode>,
    latched: HashSet<KeyCode>,
}

impl KeyboardState {
    /// Applies a winit key event. Returns true when the held set changed.
    pub fn handle_event(&mut self, event: &KeyEvent) -> bool {
        let Some(code) = virtual_key_code(&event.logical_key) else {
            return false;
        };
        match event.state {
            ElementState::Pressed => self.press(code),
            ElementState::Released => self.release(code),
        }
    }

    pub fn press(&mut self, code: KeyCode) -> bool {
        self.latched.insert(code);
        self.pressed.insert(code)
    }

    pub fn release(&mut self, code: KeyCode) -> bool {
        self.pressed.remove(&code)
    }

    /// Forgets presses that have already been released.
    pub fn settle(&mut self) {
        self.latched.clear();
    }
}

impl InputSnapshot for KeyboardState {
    fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key) || self.latched.contains(&key)
    }
}

/// Maps a logical key onto the Windows-style virtual key codes the intro polls.
pub fn virtual_key_code(key: &Key) -> Option<KeyCode> {
    match key {
        Key::Named(NamedKey::Escape) => Some(KeyCode::ESCAPE),
        Key::Named(NamedKey::Space) => Some(KeyCode(0x20)),
        Key::Named(NamedKey::Enter) => Some(KeyCode(0x0D)),
        Key::Named(NamedKey::Tab) => Some(KeyCode(0x09)),
        Key::Named(NamedKey::Backspace) => Some(KeyCode(0x08)),
        Key::Character(value) => {
            let mut chars = value.chars();
            let ch = chars.next()?;
            if chars.next().is_some() || !ch.is_ascii_alphanumeric() {
                return None;
            }
            Some(KeyCode(u32::from(ch.to_ascii_uppercase())))
        }
        _ => None,
    }
}
