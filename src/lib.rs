//! Мост фокуса между хостом (редактором) и окнами на рабочем столе.
//!
//! Хост вызывает [`Bridge::request_editor_focus`] или
//! [`Bridge::request_tool_focus`]; мост находит окно по заголовку, выводит его
//! на передний план и, для инструмента, пересылает одно нажатие клавиши.

pub mod bridge;
pub mod config;
pub mod error;
pub mod events;
pub mod host;
pub mod services;
pub mod utils;

pub use bridge::Bridge;
pub use config::Config;
pub use error::{BridgeError, Result};
pub use services::FocusOutcome;
