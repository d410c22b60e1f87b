use serde::{Deserialize, Serialize};
use std::fmt;

/// Непрозрачный идентификатор окна верхнего уровня (HWND в Windows).
///
/// Система им не владеет: после кэширования окно может быть уже закрыто.
/// Нулевой дескриптор не представим, его место занимает [`Lookup::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(isize);

impl WindowHandle {
    pub fn new(raw: isize) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    pub fn raw(&self) -> isize {
        self.0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

/// Категория окна, которое ищет мост
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Editor,
    Tool,
}

impl TargetKind {
    /// Строит правило сопоставления заголовка.
    ///
    /// `match_param` подставляется только в правило редактора.
    pub fn rule(&self, editor_product: &str, tool_product: &str, match_param: &str) -> TitleMatchRule {
        match self {
            TargetKind::Editor => {
                TitleMatchRule::EndsWith(format!("{} - {}", match_param, editor_product))
            }
            TargetKind::Tool => TitleMatchRule::Contains(tool_product.to_string()),
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Editor => write!(f, "editor"),
            TargetKind::Tool => write!(f, "tool"),
        }
    }
}

/// Правило распознавания окна по заголовку (регистрозависимое)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleMatchRule {
    EndsWith(String),
    Contains(String),
}

impl TitleMatchRule {
    pub fn matches(&self, title: &str) -> bool {
        match self {
            TitleMatchRule::EndsWith(suffix) => title.ends_with(suffix.as_str()),
            TitleMatchRule::Contains(needle) => title.contains(needle.as_str()),
        }
    }
}

impl fmt::Display for TitleMatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TitleMatchRule::EndsWith(suffix) => write!(f, "заканчивается на \"{}\"", suffix),
            TitleMatchRule::Contains(needle) => write!(f, "содержит \"{}\"", needle),
        }
    }
}

/// Результат поиска окна
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lookup {
    Found(WindowHandle),
    NotFound,
}

impl Lookup {
    pub fn handle(&self) -> Option<WindowHandle> {
        match self {
            Lookup::Found(handle) => Some(*handle),
            Lookup::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

impl From<Option<WindowHandle>> for Lookup {
    fn from(handle: Option<WindowHandle>) -> Self {
        handle.map_or(Lookup::NotFound, Lookup::Found)
    }
}
