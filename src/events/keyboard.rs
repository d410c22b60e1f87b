use serde::{Deserialize, Serialize};
use std::fmt;

/// Состояние клавиши
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Код клавиши (виртуальные коды Windows, VK_*)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCode(pub u16);

impl KeyCode {
    /// Наибольший допустимый виртуальный код (0xFF зарезервирован)
    pub const MAX: u16 = 0xFE;

    pub fn new(code: u16) -> Self {
        Self(code)
    }

    /// Проверяет, что целое от хоста помещается в виртуальный код клавиши
    pub fn from_host(code: u32) -> Option<Self> {
        match u16::try_from(code) {
            Ok(code) if (1..=Self::MAX).contains(&code) => Some(Self(code)),
            _ => None,
        }
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VK_0x{:02X}", self.0)
    }
}

/// Синтетическое событие для инъекции в систему
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VirtualKeyEvent {
    pub key_code: KeyCode,
    pub state: KeyState,
}

impl VirtualKeyEvent {
    pub fn new(key_code: KeyCode, state: KeyState) -> Self {
        Self { key_code, state }
    }

    pub fn press(key_code: KeyCode) -> Self {
        Self::new(key_code, KeyState::Pressed)
    }

    pub fn release(key_code: KeyCode) -> Self {
        Self::new(key_code, KeyState::Released)
    }
}

impl fmt::Display for VirtualKeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.key_code, self.state)
    }
}
