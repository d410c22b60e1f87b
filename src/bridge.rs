use crate::config::Config;
use crate::error::{BridgeError, Result};
use crate::events::{KeyCode, TargetKind};
use crate::services::{Desktop, FocusOutcome, KeyEventSequencer, WindowCache, WindowLocator};
use std::sync::Arc;
use tracing::info;

/// Точки входа, которые вызывает хост.
///
/// Мост владеет кэшем окон: записи заполняются при первом запросе и живут
/// до `invalidate`/`reset` или до уничтожения моста.
pub struct Bridge {
    sequencer: KeyEventSequencer,
}

impl Bridge {
    pub fn new(config: &Config, desktop: Arc<dyn Desktop>) -> Result<Self> {
        let modifier = config.modifier_key()?;
        let locator = WindowLocator::new(desktop.clone(), config.targets.clone());
        let cache = WindowCache::new(config.cache.policy);

        Ok(Self {
            sequencer: KeyEventSequencer::new(desktop, locator, cache, modifier),
        })
    }

    pub fn request_editor_focus(&self, identifier: &str) -> FocusOutcome {
        info!("Запрос фокуса редактора \"{}\"", identifier);
        self.sequencer
            .switch_and_send(TargetKind::Editor, identifier, None)
    }

    pub fn request_tool_focus(&self, key_code: u32) -> Result<FocusOutcome> {
        let Some(key) = KeyCode::from_host(key_code) else {
            return BridgeError::invalid_key(format!(
                "Код {} вне диапазона виртуальных клавиш",
                key_code
            ));
        };

        info!("Запрос фокуса инструмента с пересылкой {}", key);
        Ok(self.sequencer.switch_and_send(TargetKind::Tool, "", Some(key)))
    }

    /// Ищет окно заново, минуя кэш и не трогая фокус
    pub fn is_running(&self, kind: TargetKind, match_param: &str) -> bool {
        self.sequencer.locator().locate(kind, match_param).is_found()
    }

    pub fn invalidate(&self, kind: TargetKind) {
        self.sequencer.cache().invalidate(kind);
    }

    /// Сбрасывает все записи, хост вызывает это при начале новой сессии
    pub fn reset(&self) {
        self.sequencer.cache().invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CachePolicy;
    use crate::events::VirtualKeyEvent;
    use crate::services::{DesktopCall, DryRunDesktop, FakeWindow};

    fn bridge(desktop: &Arc<DryRunDesktop>) -> Bridge {
        Bridge::new(&Config::default(), desktop.clone()).unwrap()
    }

    #[test]
    fn test_editor_focus_resolves_first_matching_window() {
        let desktop = Arc::new(DryRunDesktop::new());
        desktop.push_window(FakeWindow::new("Program Manager"));
        let my_proj = desktop.push_window(FakeWindow::new("MyProj - Visual Studio Code"));
        desktop.push_window(FakeWindow::new("Untitled - Visual Studio Code"));
        let bridge = bridge(&desktop);

        assert_eq!(bridge.request_editor_focus("MyProj"), FocusOutcome::Ok);
        assert!(desktop.calls().contains(&DesktopCall::SetForeground(my_proj)));
    }

    #[test]
    fn test_editor_focus_twice_hits_cache() {
        let desktop = Arc::new(DryRunDesktop::with_titles(&["MyProj - Visual Studio Code"]));
        let bridge = bridge(&desktop);

        bridge.request_editor_focus("MyProj");
        bridge.request_editor_focus("MyProj");
        assert_eq!(desktop.enumerations(), 1);

        bridge.reset();
        bridge.request_editor_focus("MyProj");
        assert_eq!(desktop.enumerations(), 2);
    }

    #[test]
    fn test_editor_focus_other_identifier_does_not_reuse_cached_window() {
        let desktop = Arc::new(DryRunDesktop::new());
        let proj_a = desktop.push_window(FakeWindow::new("ProjA - Visual Studio Code"));
        let bridge = bridge(&desktop);

        assert_eq!(bridge.request_editor_focus("ProjA"), FocusOutcome::Ok);
        desktop.clear_calls();

        assert_eq!(bridge.request_editor_focus("ProjB"), FocusOutcome::TargetNotFound);
        let calls = desktop.calls();
        assert!(calls.contains(&DesktopCall::Enumerate));
        assert!(!calls.contains(&DesktopCall::SetForeground(proj_a)));

        let proj_b = desktop.push_window(FakeWindow::new("ProjB - Visual Studio Code"));
        desktop.clear_calls();
        assert_eq!(bridge.request_editor_focus("ProjB"), FocusOutcome::Ok);
        assert!(desktop.calls().contains(&DesktopCall::SetForeground(proj_b)));
    }

    #[test]
    fn test_editor_focus_reports_missing_window() {
        let desktop = Arc::new(DryRunDesktop::with_titles(&["Other - Visual Studio Code"]));
        let bridge = bridge(&desktop);

        assert_eq!(bridge.request_editor_focus("MyProj"), FocusOutcome::TargetNotFound);
    }

    #[test]
    fn test_tool_focus_forwards_key() {
        let desktop = Arc::new(DryRunDesktop::with_titles(&["Place1 - Roblox Studio"]));
        let bridge = bridge(&desktop);

        assert_eq!(bridge.request_tool_focus(0x74).unwrap(), FocusOutcome::Ok);
        let forwarded: Vec<VirtualKeyEvent> = desktop
            .sent_keys()
            .into_iter()
            .filter(|e| e.key_code == KeyCode::new(0x74))
            .collect();
        assert_eq!(
            forwarded,
            vec![
                VirtualKeyEvent::press(KeyCode::new(0x74)),
                VirtualKeyEvent::release(KeyCode::new(0x74)),
            ]
        );
    }

    #[test]
    fn test_tool_focus_rejects_invalid_key_before_any_os_call() {
        let desktop = Arc::new(DryRunDesktop::with_titles(&["Place1 - Roblox Studio"]));
        let bridge = bridge(&desktop);

        assert!(matches!(
            bridge.request_tool_focus(0x1_0000),
            Err(BridgeError::InvalidKey(_))
        ));
        assert!(desktop.calls().is_empty());
    }

    #[test]
    fn test_is_running_bypasses_cache() {
        let desktop = Arc::new(DryRunDesktop::new());
        let studio = desktop.push_window(FakeWindow::new("Place1 - Roblox Studio"));
        let bridge = bridge(&desktop);

        bridge.request_tool_focus(0x74).unwrap();
        desktop.close_window(studio);

        // Кэш всё ещё помнит закрытое окно, а проверка перечисляет окна заново
        assert!(!bridge.is_running(TargetKind::Tool, ""));
        assert_eq!(desktop.enumerations(), 2);
        assert!(!bridge.is_running(TargetKind::Editor, "MyProj"));
    }

    #[test]
    fn test_invalidate_single_kind() {
        let mut config = Config::default();
        config.cache.policy = CachePolicy::CacheForever;
        let desktop = Arc::new(DryRunDesktop::with_titles(&["Terminal"]));
        let bridge = Bridge::new(&config, desktop.clone()).unwrap();

        assert_eq!(bridge.request_tool_focus(0x74).unwrap(), FocusOutcome::TargetNotFound);
        desktop.push_window(FakeWindow::new("Place1 - Roblox Studio"));
        assert_eq!(bridge.request_tool_focus(0x74).unwrap(), FocusOutcome::TargetNotFound);

        bridge.invalidate(TargetKind::Tool);
        assert_eq!(bridge.request_tool_focus(0x74).unwrap(), FocusOutcome::Ok);
    }
}
