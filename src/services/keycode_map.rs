use std::collections::HashMap;
use once_cell::sync::Lazy;

use crate::error::{BridgeError, Result};
use crate::events::KeyCode;

/// Маппинг между именами клавиш и виртуальными кодами Windows
pub struct KeycodeMap;

// Статическая карта основных клавиш
static KEY_NAME_TO_CODE: Lazy<HashMap<&'static str, u16>> = Lazy::new(|| {
    let mut map = HashMap::new();

    // Буквенные клавиши: VK_A..VK_Z совпадают с ASCII
    const LETTERS: [&str; 26] = [
        "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m",
        "n", "o", "p", "q", "r", "s", "t", "u", "v", "w", "x", "y", "z",
    ];
    for (i, name) in LETTERS.iter().enumerate() {
        map.insert(*name, 0x41 + i as u16);
    }

    // Цифровые клавиши (верхний ряд): VK_0..VK_9
    const DIGITS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];
    for (i, name) in DIGITS.iter().enumerate() {
        map.insert(*name, 0x30 + i as u16);
    }

    // Функциональные клавиши: VK_F1..VK_F12
    const FUNCTION: [&str; 12] = [
        "f1", "f2", "f3", "f4", "f5", "f6", "f7", "f8", "f9", "f10", "f11", "f12",
    ];
    for (i, name) in FUNCTION.iter().enumerate() {
        map.insert(*name, 0x70 + i as u16);
    }

    // Специальные клавиши
    map.insert("space", 0x20);      // VK_SPACE
    map.insert("enter", 0x0D);      // VK_RETURN
    map.insert("escape", 0x1B);     // VK_ESCAPE
    map.insert("backspace", 0x08);  // VK_BACK
    map.insert("tab", 0x09);        // VK_TAB
    map.insert("delete", 0x2E);     // VK_DELETE
    map.insert("insert", 0x2D);     // VK_INSERT
    map.insert("home", 0x24);       // VK_HOME
    map.insert("end", 0x23);        // VK_END
    map.insert("pageup", 0x21);     // VK_PRIOR
    map.insert("pagedown", 0x22);   // VK_NEXT

    // Модификаторы
    map.insert("shift", 0x10);      // VK_SHIFT
    map.insert("ctrl", 0x11);       // VK_CONTROL
    map.insert("alt", 0x12);        // VK_MENU
    map.insert("super", 0x5B);      // VK_LWIN

    // Стрелки
    map.insert("left", 0x25);       // VK_LEFT
    map.insert("up", 0x26);         // VK_UP
    map.insert("right", 0x27);      // VK_RIGHT
    map.insert("down", 0x28);       // VK_DOWN

    map
});

static CODE_TO_KEY_NAME: Lazy<HashMap<u16, &'static str>> = Lazy::new(|| {
    KEY_NAME_TO_CODE.iter().map(|(&name, &code)| (code, name)).collect()
});

impl KeycodeMap {
    /// Получить код клавиши по её имени
    pub fn get_keycode(key_name: &str) -> Result<KeyCode> {
        let normalized = key_name.to_lowercase();
        KEY_NAME_TO_CODE
            .get(normalized.as_str())
            .copied()
            .map(KeyCode::new)
            .ok_or_else(|| BridgeError::InvalidKey(format!("Неизвестная клавиша: {}", key_name)))
    }

    /// Получить имя клавиши по её коду
    pub fn get_key_name(keycode: KeyCode) -> Option<&'static str> {
        CODE_TO_KEY_NAME.get(&keycode.value()).copied()
    }

    /// Проверить, является ли клавиша модификатором
    pub fn is_modifier(key_name: &str) -> bool {
        let normalized = key_name.to_lowercase();
        matches!(normalized.as_str(), "ctrl" | "alt" | "shift" | "super")
    }

    /// Разбирает клавишу из командной строки: имя, десятичное число или `0x` hex
    pub fn parse(input: &str) -> Result<KeyCode> {
        let input = input.trim();
        let numeric = if let Some(hex) = input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
            u32::from_str_radix(hex, 16).ok()
        } else {
            input.parse::<u32>().ok()
        };

        match numeric {
            Some(code) => KeyCode::from_host(code).ok_or_else(|| {
                BridgeError::InvalidKey(format!("Код {} вне диапазона виртуальных клавиш", input))
            }),
            None => Self::get_keycode(input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_key_mapping() {
        assert_eq!(KeycodeMap::get_keycode("a").unwrap(), KeyCode::new(0x41));
        assert_eq!(KeycodeMap::get_keycode("f5").unwrap(), KeyCode::new(0x74));
        assert_eq!(KeycodeMap::get_keycode("alt").unwrap(), KeyCode::new(0x12));
        assert_eq!(KeycodeMap::get_keycode("9").unwrap(), KeyCode::new(0x39));
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(KeycodeMap::get_keycode("F8").unwrap(), KeyCode::new(0x77));
        assert_eq!(KeycodeMap::get_keycode("SPACE").unwrap(), KeyCode::new(0x20));
    }

    #[test]
    fn test_reverse_mapping() {
        assert_eq!(KeycodeMap::get_key_name(KeyCode::new(0x76)), Some("f7"));
        assert_eq!(KeycodeMap::get_key_name(KeyCode::new(0x0D)), Some("enter"));
        assert_eq!(KeycodeMap::get_key_name(KeyCode::new(0xE7)), None);
    }

    #[test]
    fn test_invalid_key() {
        assert!(KeycodeMap::get_keycode("invalid_key").is_err());
    }

    #[test]
    fn test_modifier_detection() {
        assert!(KeycodeMap::is_modifier("alt"));
        assert!(KeycodeMap::is_modifier("SHIFT"));
        assert!(!KeycodeMap::is_modifier("f5"));
    }

    #[test]
    fn test_parse_numbers_and_names() {
        assert_eq!(KeycodeMap::parse("116").unwrap(), KeyCode::new(0x74));
        assert_eq!(KeycodeMap::parse("0x74").unwrap(), KeyCode::new(0x74));
        assert_eq!(KeycodeMap::parse(" f5 ").unwrap(), KeyCode::new(0x74));
        assert!(KeycodeMap::parse("0").is_err());
        assert!(KeycodeMap::parse("0x1FF").is_err());
        assert!(KeycodeMap::parse("nope").is_err());
    }
}
