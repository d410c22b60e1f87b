use crate::events::Lookup;
use crate::services::Desktop;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Разворачивает свёрнутое окно и передаёт ему фокус ввода
pub struct FocusSwitcher {
    desktop: Arc<dyn Desktop>,
}

impl FocusSwitcher {
    pub fn new(desktop: Arc<dyn Desktop>) -> Self {
        Self { desktop }
    }

    /// Для `NotFound` к ОС не обращается. Возвращает, принят ли запрос фокуса.
    pub fn bring_to_front(&self, lookup: Lookup) -> bool {
        let Lookup::Found(window) = lookup else {
            debug!("Окно не найдено - смена фокуса пропущена");
            return false;
        };

        if self.desktop.is_minimized(window) {
            debug!("Окно {} свёрнуто, восстанавливаем", window);
            self.desktop.restore(window);
        }

        let accepted = self.desktop.set_foreground(window);
        if accepted {
            info!("Окно {} выведено на передний план", window);
        } else {
            warn!("ОС отклонила вывод окна {} на передний план", window);
        }
        accepted
    }
}
