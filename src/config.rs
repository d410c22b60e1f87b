use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::events::KeyCode;
use crate::services::keycode_map::KeycodeMap;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub targets: TargetsConfig,
    pub cache: CacheConfig,
    pub keys: KeysConfig,
    #[serde(default)]
    pub dry_run: DryRunConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub filter: String,
}

/// Названия продуктов, по которым распознаются окна
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetsConfig {
    pub editor_product: String,
    pub tool_product: String,
    /// Заголовок служебного окна оболочки рабочего стола, которое никогда не выбирается
    pub shell_title: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    pub policy: CachePolicy,
}

/// Что делать с неудачным поиском окна
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Кэшируется только найденное окно, промах повторяет перечисление при следующем вызове
    RetryOnMiss,
    /// Первый результат (в том числе "не найдено") живёт до явной инвалидации
    CacheForever,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeysConfig {
    /// Модификатор, который удерживает горячая клавиша хоста
    pub modifier: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DryRunConfig {
    /// Заголовки фиктивных окон в порядке наложения (сверху вниз)
    #[serde(default)]
    pub windows: Vec<String>,
    #[serde(default)]
    pub modifier_held: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
                filter: "focus_bridge=info".to_string(),
            },
            targets: TargetsConfig {
                editor_product: "Visual Studio Code".to_string(),
                tool_product: "Roblox Studio".to_string(),
                shell_title: "Program Manager".to_string(),
            },
            cache: CacheConfig {
                policy: CachePolicy::RetryOnMiss,
            },
            keys: KeysConfig {
                modifier: "alt".to_string(),
            },
            dry_run: DryRunConfig::default(),
        }
    }
}

impl Config {
    /// Загружает конфигурацию: значения по умолчанию, затем TOML (если есть), затем переменные окружения
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("FOCUS_BRIDGE_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Пустое название продукта совпало бы с любым заголовком
        if self.targets.editor_product.trim().is_empty() {
            anyhow::bail!("targets.editor_product не может быть пустым");
        }
        if self.targets.tool_product.trim().is_empty() {
            anyhow::bail!("targets.tool_product не может быть пустым");
        }
        if self.targets.shell_title.is_empty() {
            anyhow::bail!("targets.shell_title не может быть пустым");
        }

        if !KeycodeMap::is_modifier(&self.keys.modifier) {
            anyhow::bail!("Неверный модификатор: {}", self.keys.modifier);
        }

        Ok(())
    }

    /// Виртуальный код модификатора из `keys.modifier`
    pub fn modifier_key(&self) -> Result<KeyCode> {
        KeycodeMap::get_keycode(&self.keys.modifier)
            .with_context(|| format!("Неверный модификатор: {}", self.keys.modifier))
    }
}
