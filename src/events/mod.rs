pub mod keyboard;
pub mod window;

pub use keyboard::{KeyCode, KeyState, VirtualKeyEvent};
pub use window::{Lookup, TargetKind, TitleMatchRule, WindowHandle};
