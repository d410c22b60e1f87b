use crate::config::Config;
use crate::error::Result;
use crate::events::{KeyCode, VirtualKeyEvent, WindowHandle};
use std::sync::Arc;

/// The slice of the OS window/input API the bridge consumes.
///
/// Every call is synchronous and completes before returning.
pub trait Desktop: Send + Sync {
    /// Top-level windows in stacking order, front to back
    fn top_level_windows(&self) -> Vec<WindowHandle>;

    fn is_visible(&self, window: WindowHandle) -> bool;

    /// Window title, empty if the window has none
    fn title(&self, window: WindowHandle) -> String;

    fn is_minimized(&self, window: WindowHandle) -> bool;

    /// Restore a minimized window to its normal show-state
    fn restore(&self, window: WindowHandle);

    /// Request keyboard focus; returns whether the OS accepted the request
    fn set_foreground(&self, window: WindowHandle) -> bool;

    /// Whether the key is physically held at this instant
    fn is_key_down(&self, key: KeyCode) -> bool;

    /// Inject one synthetic key event
    fn send_key(&self, event: VirtualKeyEvent) -> Result<()>;
}

/// Factory function to create an appropriate desktop backend based on the dry_run flag
pub fn create_desktop(config: &Config, dry_run: bool) -> Result<Arc<dyn Desktop>> {
    if dry_run {
        return Ok(Arc::new(super::dry_run::DryRunDesktop::from_config(
            &config.dry_run,
        )));
    }

    #[cfg(windows)]
    {
        Ok(Arc::new(super::win32::WindowsDesktop::new()))
    }

    #[cfg(not(windows))]
    {
        Err(crate::bridge_error!(
            service_unavailable,
            "Управление окнами поддерживается только в Windows, используйте --dry-run"
        ))
    }
}
