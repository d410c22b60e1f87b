use crate::error::{BridgeError, Result};
use crate::events::{KeyCode, KeyState, VirtualKeyEvent, WindowHandle};
use std::mem;
use tracing::{debug, info};
use windows::Win32::Foundation::{BOOL, HWND, LPARAM, TRUE};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetAsyncKeyState, SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT,
    KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP, VIRTUAL_KEY,
};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetWindowTextLengthW, GetWindowTextW, IsIconic, IsWindowVisible,
    SetForegroundWindow, ShowWindow, SW_RESTORE,
};

use super::r#trait::Desktop;

/// Реальный бэкенд поверх WinAPI
pub struct WindowsDesktop;

impl WindowsDesktop {
    pub fn new() -> Self {
        info!("Инициализация WindowsDesktop");
        Self
    }

    fn hwnd(window: WindowHandle) -> HWND {
        HWND(window.raw() as *mut _)
    }
}

// EnumWindows обходит окна верхнего уровня в Z-порядке, сверху вниз
unsafe extern "system" fn collect_windows_cb(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let windows = &mut *(lparam.0 as *mut Vec<WindowHandle>);
    if let Some(handle) = WindowHandle::new(hwnd.0 as isize) {
        windows.push(handle);
    }
    TRUE
}

impl Desktop for WindowsDesktop {
    fn top_level_windows(&self) -> Vec<WindowHandle> {
        let mut windows: Vec<WindowHandle> = Vec::new();
        unsafe {
            let _ = EnumWindows(
                Some(collect_windows_cb),
                LPARAM(&mut windows as *mut Vec<WindowHandle> as isize),
            );
        }
        debug!("EnumWindows вернул {} окон", windows.len());
        windows
    }

    fn is_visible(&self, window: WindowHandle) -> bool {
        unsafe { IsWindowVisible(Self::hwnd(window)).as_bool() }
    }

    fn title(&self, window: WindowHandle) -> String {
        let hwnd = Self::hwnd(window);
        let length = unsafe { GetWindowTextLengthW(hwnd) };
        if length <= 0 {
            return String::new();
        }

        // Буфер освобождается при выходе из функции на любом пути
        let mut buf = vec![0u16; length as usize + 1];
        let copied = unsafe { GetWindowTextW(hwnd, &mut buf) };
        if copied <= 0 {
            return String::new();
        }
        String::from_utf16_lossy(&buf[..copied as usize])
    }

    fn is_minimized(&self, window: WindowHandle) -> bool {
        unsafe { IsIconic(Self::hwnd(window)).as_bool() }
    }

    fn restore(&self, window: WindowHandle) {
        unsafe {
            let _ = ShowWindow(Self::hwnd(window), SW_RESTORE);
        }
    }

    fn set_foreground(&self, window: WindowHandle) -> bool {
        unsafe { SetForegroundWindow(Self::hwnd(window)).as_bool() }
    }

    fn is_key_down(&self, key: KeyCode) -> bool {
        // Старший бит означает, что клавиша удерживается прямо сейчас
        let state = unsafe { GetAsyncKeyState(key.value() as i32) };
        (state as u16 & 0x8000) != 0
    }

    fn send_key(&self, event: VirtualKeyEvent) -> Result<()> {
        let flags = match event.state {
            KeyState::Pressed => KEYEVENTF_EXTENDEDKEY,
            KeyState::Released => KEYEVENTF_EXTENDEDKEY | KEYEVENTF_KEYUP,
        };
        let input = [INPUT {
            r#type: INPUT_KEYBOARD,
            Anonymous: INPUT_0 {
                ki: KEYBDINPUT {
                    wVk: VIRTUAL_KEY(event.key_code.value()),
                    wScan: 0,
                    dwFlags: flags,
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        }];

        let sent = unsafe { SendInput(&input, mem::size_of::<INPUT>() as i32) };
        if sent != 1 {
            return Err(BridgeError::Internal(format!(
                "SendInput не принял событие {}",
                event
            )));
        }

        debug!("Событие {} отправлено", event);
        Ok(())
    }
}
