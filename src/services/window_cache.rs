use crate::config::CachePolicy;
use crate::events::{Lookup, TargetKind};
use crate::services::WindowLocator;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{debug, info};

/// Кэш найденных окон: не более одной записи на категорию.
///
/// Записи создаются лениво при первом запросе и живут, пока жив владелец
/// (`Bridge`), либо до явного `invalidate`. Кэш не проверяет, что окно ещё
/// существует. Запись хранит параметр поиска, которым она получена: запрос с
/// другим параметром ищет окно заново и замещает запись.
pub struct WindowCache {
    policy: CachePolicy,
    entries: Mutex<HashMap<TargetKind, CacheEntry>>,
}

struct CacheEntry {
    match_param: String,
    lookup: Lookup,
}

impl WindowCache {
    pub fn new(policy: CachePolicy) -> Self {
        info!("Инициализация WindowCache (политика: {:?})", policy);
        Self {
            policy,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Возвращает запись из кэша или ищет окно и сохраняет результат.
    ///
    /// Чтение и заполнение выполняются под одной блокировкой, поэтому два
    /// параллельных вызова не перечисляют окна дважды для одной категории.
    pub fn get(&self, kind: TargetKind, match_param: &str, locator: &WindowLocator) -> Lookup {
        let mut entries = self.entries.lock();

        let cached = entries
            .get(&kind)
            .filter(|entry| entry.match_param == match_param)
            .map(|entry| entry.lookup);
        match (cached, self.policy) {
            (Some(found @ Lookup::Found(_)), _) => {
                debug!("Кэш: попадание для {}", kind);
                return found;
            }
            (Some(Lookup::NotFound), CachePolicy::CacheForever) => {
                debug!("Кэш: сохранённый промах для {}", kind);
                return Lookup::NotFound;
            }
            _ => {}
        }

        let lookup = locator.locate(kind, match_param);
        let entry = CacheEntry {
            match_param: match_param.to_string(),
            lookup,
        };
        match (lookup, self.policy) {
            (Lookup::Found(handle), _) => {
                info!("Окно {} закэшировано для {}", handle, kind);
                entries.insert(kind, entry);
            }
            (Lookup::NotFound, CachePolicy::CacheForever) => {
                info!("Окно для {} не найдено, промах закэширован до инвалидации", kind);
                entries.insert(kind, entry);
            }
            (Lookup::NotFound, CachePolicy::RetryOnMiss) => {
                debug!("Окно для {} не найдено, повторим поиск при следующем вызове", kind);
            }
        }

        lookup
    }

    /// Текущая запись без поиска
    pub fn peek(&self, kind: TargetKind) -> Option<Lookup> {
        self.entries.lock().get(&kind).map(|entry| entry.lookup)
    }

    pub fn invalidate(&self, kind: TargetKind) {
        if self.entries.lock().remove(&kind).is_some() {
            info!("Кэш для {} сброшен", kind);
        }
    }

    pub fn invalidate_all(&self) {
        let mut entries = self.entries.lock();
        if !entries.is_empty() {
            info!("Кэш окон полностью сброшен ({} записей)", entries.len());
        }
        entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::services::{DryRunDesktop, FakeWindow};
    use std::sync::Arc;

    fn setup(titles: &[&str]) -> (Arc<DryRunDesktop>, WindowLocator) {
        let desktop = Arc::new(DryRunDesktop::with_titles(titles));
        let locator = WindowLocator::new(desktop.clone(), Config::default().targets);
        (desktop, locator)
    }

    #[test]
    fn test_hit_skips_enumeration() {
        let (desktop, locator) = setup(&["MyProj - Visual Studio Code"]);
        let cache = WindowCache::new(CachePolicy::RetryOnMiss);

        let first = cache.get(TargetKind::Editor, "MyProj", &locator);
        let second = cache.get(TargetKind::Editor, "MyProj", &locator);

        assert!(first.is_found());
        assert_eq!(first, second);
        assert_eq!(desktop.enumerations(), 1);
    }

    #[test]
    fn test_retry_on_miss_enumerates_again() {
        let (desktop, locator) = setup(&["Terminal"]);
        let cache = WindowCache::new(CachePolicy::RetryOnMiss);

        assert_eq!(cache.get(TargetKind::Tool, "", &locator), Lookup::NotFound);
        assert_eq!(cache.peek(TargetKind::Tool), None);

        let studio = desktop.push_window(FakeWindow::new("Place1 - Roblox Studio"));
        assert_eq!(cache.get(TargetKind::Tool, "", &locator), Lookup::Found(studio));
        assert_eq!(desktop.enumerations(), 2);
    }

    #[test]
    fn test_cache_forever_keeps_miss_until_invalidated() {
        let (desktop, locator) = setup(&["Terminal"]);
        let cache = WindowCache::new(CachePolicy::CacheForever);

        assert_eq!(cache.get(TargetKind::Tool, "", &locator), Lookup::NotFound);
        let studio = desktop.push_window(FakeWindow::new("Place1 - Roblox Studio"));
        assert_eq!(cache.get(TargetKind::Tool, "", &locator), Lookup::NotFound);
        assert_eq!(desktop.enumerations(), 1);

        cache.invalidate(TargetKind::Tool);
        assert_eq!(cache.get(TargetKind::Tool, "", &locator), Lookup::Found(studio));
        assert_eq!(desktop.enumerations(), 2);
    }

    #[test]
    fn test_stale_handle_is_returned_without_revalidation() {
        let (desktop, locator) = setup(&[]);
        let cache = WindowCache::new(CachePolicy::RetryOnMiss);
        let old = desktop.push_window(FakeWindow::new("Place1 - Roblox Studio"));

        assert_eq!(cache.get(TargetKind::Tool, "", &locator), Lookup::Found(old));
        desktop.close_window(old);
        let new = desktop.push_window(FakeWindow::new("Place1 - Roblox Studio"));

        assert_eq!(cache.get(TargetKind::Tool, "", &locator), Lookup::Found(old));

        cache.invalidate_all();
        assert_eq!(cache.get(TargetKind::Tool, "", &locator), Lookup::Found(new));
    }

    #[test]
    fn test_kinds_are_cached_independently() {
        let (desktop, locator) = setup(&["MyProj - Visual Studio Code", "Place1 - Roblox Studio"]);
        let cache = WindowCache::new(CachePolicy::RetryOnMiss);

        assert!(cache.get(TargetKind::Editor, "MyProj", &locator).is_found());
        assert!(cache.get(TargetKind::Tool, "", &locator).is_found());
        assert_ne!(cache.peek(TargetKind::Editor), cache.peek(TargetKind::Tool));

        cache.invalidate(TargetKind::Editor);
        assert_eq!(cache.peek(TargetKind::Editor), None);
        assert!(cache.peek(TargetKind::Tool).is_some());
        assert_eq!(desktop.enumerations(), 2);
    }

    #[test]
    fn test_different_param_replaces_entry() {
        let (desktop, locator) = setup(&[]);
        let cache = WindowCache::new(CachePolicy::RetryOnMiss);
        let proj_a = desktop.push_window(FakeWindow::new("ProjA - Visual Studio Code"));

        assert_eq!(cache.get(TargetKind::Editor, "ProjA", &locator), Lookup::Found(proj_a));
        assert_eq!(cache.get(TargetKind::Editor, "ProjB", &locator), Lookup::NotFound);
        assert_eq!(cache.peek(TargetKind::Editor), Some(Lookup::Found(proj_a)));
        assert_eq!(desktop.enumerations(), 2);

        let proj_b = desktop.push_window(FakeWindow::new("ProjB - Visual Studio Code"));
        assert_eq!(cache.get(TargetKind::Editor, "ProjB", &locator), Lookup::Found(proj_b));
        assert_eq!(cache.get(TargetKind::Editor, "ProjB", &locator), Lookup::Found(proj_b));
        assert_eq!(cache.peek(TargetKind::Editor), Some(Lookup::Found(proj_b)));
        assert_eq!(desktop.enumerations(), 3);
    }

    #[test]
    fn test_cache_forever_miss_is_per_param() {
        let (desktop, locator) = setup(&["ProjA - Visual Studio Code"]);
        let cache = WindowCache::new(CachePolicy::CacheForever);

        assert_eq!(cache.get(TargetKind::Editor, "ProjB", &locator), Lookup::NotFound);
        assert!(cache.get(TargetKind::Editor, "ProjA", &locator).is_found());
        assert_eq!(desktop.enumerations(), 2);
    }

    #[test]
    fn test_concurrent_gets_enumerate_once() {
        let (desktop, locator) = setup(&["Place1 - Roblox Studio"]);
        let cache = WindowCache::new(CachePolicy::RetryOnMiss);

        let results: Vec<Lookup> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| cache.get(TargetKind::Tool, "", &locator)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(results.iter().all(|r| *r == results[0] && r.is_found()));
        assert_eq!(desktop.enumerations(), 1);
    }
}
