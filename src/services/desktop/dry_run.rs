use crate::config::DryRunConfig;
use crate::error::Result;
use crate::events::{KeyCode, VirtualKeyEvent, WindowHandle};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicIsize, Ordering};
use tracing::info;

use super::r#trait::Desktop;

/// Фиктивное окно верхнего уровня
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeWindow {
    pub title: String,
    pub visible: bool,
    pub minimized: bool,
}

impl FakeWindow {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            visible: true,
            minimized: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn minimized(mut self) -> Self {
        self.minimized = true;
        self
    }
}

/// Обращение к "ОС", записанное в порядке вызова
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopCall {
    Enumerate,
    KeyStateQuery(KeyCode),
    Restore(WindowHandle),
    SetForeground(WindowHandle),
    SendKey(VirtualKeyEvent),
}

/// Бэкенд для сухого запуска и тестов: окна заданы списком, все вызовы записываются
pub struct DryRunDesktop {
    windows: RwLock<Vec<(WindowHandle, FakeWindow)>>,
    next_handle: AtomicIsize,
    modifier_held: AtomicBool,
    calls: Mutex<Vec<DesktopCall>>,
}

impl Default for DryRunDesktop {
    fn default() -> Self {
        Self::new()
    }
}

impl DryRunDesktop {
    pub fn new() -> Self {
        Self {
            windows: RwLock::new(Vec::new()),
            next_handle: AtomicIsize::new(0x10),
            modifier_held: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Окна из конфигурации; без них эмулируется типичный рабочий стол
    pub fn from_config(config: &DryRunConfig) -> Self {
        info!("Dry-run режим - Desktop работает в режиме эмуляции");

        let desktop = Self::new();
        if config.windows.is_empty() {
            for title in [
                "Program Manager",
                "Project - Visual Studio Code",
                "Place1 - Roblox Studio",
                "Terminal - dry_run",
            ] {
                desktop.push_window(FakeWindow::new(title));
            }
        } else {
            for title in &config.windows {
                desktop.push_window(FakeWindow::new(title.as_str()));
            }
        }
        desktop.set_modifier_held(config.modifier_held);
        desktop
    }

    /// Строит рабочий стол из заголовков видимых окон (сверху вниз)
    pub fn with_titles(titles: &[&str]) -> Self {
        let desktop = Self::new();
        for title in titles {
            desktop.push_window(FakeWindow::new(*title));
        }
        desktop
    }

    /// Добавляет окно под уже существующими и возвращает его дескриптор
    pub fn push_window(&self, window: FakeWindow) -> WindowHandle {
        let handle = self.allocate_handle();
        self.windows.write().push((handle, window));
        handle
    }

    /// Добавляет окно поверх всех остальных
    pub fn push_front(&self, window: FakeWindow) -> WindowHandle {
        let handle = self.allocate_handle();
        self.windows.write().insert(0, (handle, window));
        handle
    }

    pub fn close_window(&self, handle: WindowHandle) {
        self.windows.write().retain(|(h, _)| *h != handle);
    }

    pub fn set_modifier_held(&self, held: bool) {
        self.modifier_held.store(held, Ordering::Relaxed);
    }

    pub fn window(&self, handle: WindowHandle) -> Option<FakeWindow> {
        self.windows
            .read()
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, w)| w.clone())
    }

    pub fn calls(&self) -> Vec<DesktopCall> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Сколько раз перечислялись окна
    pub fn enumerations(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, DesktopCall::Enumerate))
            .count()
    }

    /// Только синтетические события клавиш, в порядке отправки
    pub fn sent_keys(&self) -> Vec<VirtualKeyEvent> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                DesktopCall::SendKey(event) => Some(*event),
                _ => None,
            })
            .collect()
    }

    fn allocate_handle(&self) -> WindowHandle {
        loop {
            // Счётчик стартует с 0x10, ноль возможен только после переполнения
            let raw = self.next_handle.fetch_add(0x10, Ordering::Relaxed);
            if let Some(handle) = WindowHandle::new(raw) {
                return handle;
            }
        }
    }

    fn record(&self, call: DesktopCall) {
        self.calls.lock().push(call);
    }
}

impl Desktop for DryRunDesktop {
    fn top_level_windows(&self) -> Vec<WindowHandle> {
        self.record(DesktopCall::Enumerate);
        self.windows.read().iter().map(|(h, _)| *h).collect()
    }

    fn is_visible(&self, window: WindowHandle) -> bool {
        self.window(window).is_some_and(|w| w.visible)
    }

    fn title(&self, window: WindowHandle) -> String {
        self.window(window).map(|w| w.title).unwrap_or_default()
    }

    fn is_minimized(&self, window: WindowHandle) -> bool {
        self.window(window).is_some_and(|w| w.minimized)
    }

    fn restore(&self, window: WindowHandle) {
        self.record(DesktopCall::Restore(window));
        info!("[DRY RUN] Восстановление окна {}", window);
        if let Some((_, w)) = self.windows.write().iter_mut().find(|(h, _)| *h == window) {
            w.minimized = false;
        }
    }

    fn set_foreground(&self, window: WindowHandle) -> bool {
        self.record(DesktopCall::SetForeground(window));
        info!("[DRY RUN] Окно {} выведено на передний план", window);
        self.window(window).is_some()
    }

    fn is_key_down(&self, key: KeyCode) -> bool {
        self.record(DesktopCall::KeyStateQuery(key));
        self.modifier_held.load(Ordering::Relaxed)
    }

    fn send_key(&self, event: VirtualKeyEvent) -> Result<()> {
        self.record(DesktopCall::SendKey(event));
        info!("[DRY RUN] Виртуальное событие: {}", event);
        Ok(())
    }
}
