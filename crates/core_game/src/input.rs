pub use bevy::input::keyboard::KeyCode;

/// One discrete keyboard transition, forwarded to whichever screen is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Pressed(KeyCode),
    Released(KeyCode),
}

impl InputEvent {
    pub fn key(self) -> KeyCode {
        match self {
            InputEvent::Pressed(key) | InputEvent::Released(key) => key,
        }
    }

    pub fn pressed(self) -> Option<KeyCode> {
        match self {
            InputEvent::Pressed(key) => Some(key),
            InputEvent::Released(_) => None,
        }
    }
}

pub fn is_menu_up(key: KeyCode) -> bool {
    matches!(key, KeyCode::ArrowUp | KeyCode::KeyW)
}

pub fn is_menu_down(key: KeyCode) -> bool {
    matches!(key, KeyCode::ArrowDown | KeyCode::KeyS)
}
