use crate::events::{KeyCode, Lookup, TargetKind, VirtualKeyEvent};
use crate::services::{Desktop, FocusSwitcher, WindowCache, WindowLocator};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Итог запроса фокуса для хоста
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusOutcome {
    Ok,
    TargetNotFound,
}

/// Переключает фокус на целевое окно, обрамляя переключение модификатором.
///
/// Горячая клавиша хоста держит Alt. Если сменить фокус, пока Alt логически
/// нажат, его отпускание попадёт в новое окно как одиночное нажатие Alt, и
/// Windows откроет меню этого окна. Поэтому, если Alt физически не удерживается
/// в момент вызова, вокруг смены фокуса отправляется синтетическая пара
/// нажатие/отпускание. Обрамление выполняется всегда, даже если окно не найдено:
/// оно относится к состоянию модификатора вызывающего, а не к цели.
pub struct KeyEventSequencer {
    desktop: Arc<dyn Desktop>,
    locator: WindowLocator,
    cache: WindowCache,
    focus: FocusSwitcher,
    modifier: KeyCode,
}

impl KeyEventSequencer {
    pub fn new(
        desktop: Arc<dyn Desktop>,
        locator: WindowLocator,
        cache: WindowCache,
        modifier: KeyCode,
    ) -> Self {
        info!("Инициализация KeyEventSequencer (модификатор: {})", modifier);
        Self {
            focus: FocusSwitcher::new(desktop.clone()),
            desktop,
            locator,
            cache,
            modifier,
        }
    }

    pub fn cache(&self) -> &WindowCache {
        &self.cache
    }

    pub fn locator(&self) -> &WindowLocator {
        &self.locator
    }

    pub fn switch_and_send(
        &self,
        kind: TargetKind,
        match_param: &str,
        key: Option<KeyCode>,
    ) -> FocusOutcome {
        let lookup = self.cache.get(kind, match_param, &self.locator);

        let injected = if self.desktop.is_key_down(self.modifier) {
            debug!("{} уже удерживается, обрамление не нужно", self.modifier);
            false
        } else {
            self.send(VirtualKeyEvent::press(self.modifier))
        };

        self.focus.bring_to_front(lookup);

        if injected {
            self.send(VirtualKeyEvent::release(self.modifier));
        }

        match (kind, lookup, key) {
            (TargetKind::Tool, Lookup::Found(window), Some(key)) => {
                info!("Пересылка {} в окно {}", key, window);
                self.send(VirtualKeyEvent::press(key));
                self.send(VirtualKeyEvent::release(key));
            }
            (TargetKind::Editor, _, Some(key)) => {
                debug!("Редактор не принимает пересылку клавиш, {} проигнорирована", key);
            }
            _ => {}
        }

        if lookup.is_found() {
            FocusOutcome::Ok
        } else {
            FocusOutcome::TargetNotFound
        }
    }

    // Ошибка инъекции не прерывает последовательность
    fn send(&self, event: VirtualKeyEvent) -> bool {
        match self.desktop.send_key(event) {
            Ok(()) => true,
            Err(e) => {
                warn!("Не удалось отправить {}: {}", event, e);
                false
            }
        }
    }
}
