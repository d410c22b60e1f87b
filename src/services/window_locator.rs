use crate::config::TargetsConfig;
use crate::debug_if_enabled;
use crate::events::{Lookup, TargetKind, TitleMatchRule};
use crate::services::Desktop;
use std::sync::Arc;
use tracing::debug;

/// Находит окно верхнего уровня по правилу сопоставления заголовка.
///
/// Перечисление идёт в Z-порядке, возвращается первое подходящее окно.
/// Порядок между вызовами не гарантирован: он зависит от того, какое окно
/// пользователь активировал последним.
pub struct WindowLocator {
    desktop: Arc<dyn Desktop>,
    targets: TargetsConfig,
}

impl WindowLocator {
    pub fn new(desktop: Arc<dyn Desktop>, targets: TargetsConfig) -> Self {
        Self { desktop, targets }
    }

    pub fn rule(&self, kind: TargetKind, match_param: &str) -> TitleMatchRule {
        kind.rule(
            &self.targets.editor_product,
            &self.targets.tool_product,
            match_param,
        )
    }

    pub fn locate(&self, kind: TargetKind, match_param: &str) -> Lookup {
        let rule = self.rule(kind, match_param);
        let windows = self.desktop.top_level_windows();
        let total = windows.len();

        for (inspected, window) in windows.into_iter().enumerate() {
            if !self.desktop.is_visible(window) {
                continue;
            }

            let title = self.desktop.title(window);
            if title.is_empty() || title == self.targets.shell_title {
                continue;
            }

            if rule.matches(&title) {
                debug!(
                    "Окно {} \"{}\" найдено для {} после {} из {} окон",
                    window,
                    title,
                    kind,
                    inspected + 1,
                    total
                );
                return Lookup::Found(window);
            }

            debug_if_enabled!("Окно {} \"{}\" не подходит: {}", window, title, rule);
        }

        debug!("Ни одно из {} окон не подходит для {} ({})", total, kind, rule);
        Lookup::NotFound
    }
}
