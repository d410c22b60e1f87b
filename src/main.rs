use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::process::ExitCode;
use tokio::signal;
use tracing::{error, info, warn};

use focus_bridge::config::{Config, LoggingConfig};
use focus_bridge::events::TargetKind;
use focus_bridge::services::{create_desktop, KeycodeMap};
use focus_bridge::{host, Bridge, FocusOutcome};

const EXIT_NOT_FOUND: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "focus-bridge")]
#[command(about = "Выводит окно редактора или инструмента на передний план и пересылает в него клавишу")]
#[command(version)]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "focus-bridge.toml")]
    config: String,

    /// Режим сухого запуска (без реальных действий)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (по умолчанию из конфигурации)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Переключиться на окно редактора с указанным проектом
    Editor {
        /// Имя проекта из заголовка окна ("<имя> - <редактор>")
        identifier: String,
    },
    /// Переключиться на окно инструмента и переслать одну клавишу
    Tool {
        /// Имя клавиши (f5, enter, ...) или код (116, 0x74)
        key: String,
    },
    /// Проверить, открыто ли окно (код выхода 2, если нет)
    Running {
        #[arg(value_enum)]
        target: Target,
        #[arg(long, default_value = "")]
        identifier: String,
    },
    /// Обслуживать запросы хоста построчно в JSON через stdin/stdout
    Serve,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Target {
    Editor,
    Tool,
}

impl From<Target> for TargetKind {
    fn from(target: Target) -> Self {
        match target {
            Target::Editor => TargetKind::Editor,
            Target::Tool => TargetKind::Tool,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Загрузка конфигурации
    let config = Config::load(&args.config)?;

    // Инициализация системы логирования
    init_tracing(&config.logging, args.log_level.as_deref())?;

    info!("Запуск focus-bridge v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    if args.dry_run {
        warn!("Режим сухого запуска - реальные действия отключены");
    }

    let desktop = create_desktop(&config, args.dry_run)?;
    let bridge = Bridge::new(&config, desktop)?;

    let code = match args.command {
        Command::Editor { identifier } => exit_code(bridge.request_editor_focus(&identifier)),
        Command::Tool { key } => {
            let key = KeycodeMap::parse(&key)?;
            exit_code(bridge.request_tool_focus(u32::from(key.value()))?)
        }
        Command::Running { target, identifier } => {
            let running = bridge.is_running(target.into(), &identifier);
            info!("Окно {} {}", TargetKind::from(target), if running { "открыто" } else { "не найдено" });
            if running {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_NOT_FOUND)
            }
        }
        Command::Serve => {
            // Чтение stdin вынесено в отдельный поток: Ctrl+C не ждёт конца ввода
            let input = host::stdin_reader()?;
            tokio::select! {
                result = host::serve(&bridge, input, tokio::io::stdout()) => {
                    if let Err(e) = result {
                        error!("Ошибка в serve: {}", e);
                        return Err(e.into());
                    }
                }
                result = signal::ctrl_c() => {
                    match result {
                        Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
                        Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
                    }
                }
            }
            ExitCode::SUCCESS
        }
    };

    info!("focus-bridge завершил работу");
    Ok(code)
}

fn exit_code(outcome: FocusOutcome) -> ExitCode {
    match outcome {
        FocusOutcome::Ok => ExitCode::SUCCESS,
        FocusOutcome::TargetNotFound => {
            warn!("Целевое окно не найдено");
            ExitCode::from(EXIT_NOT_FOUND)
        }
    }
}

fn init_tracing(logging: &LoggingConfig, level_override: Option<&str>) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    // Приоритет: RUST_LOG, затем --log-level, затем logging.filter, затем logging.level
    let directive = level_override
        .or((!logging.filter.is_empty()).then_some(logging.filter.as_str()))
        .unwrap_or(&logging.level);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))?;

    // stdout занят ответами serve, поэтому логи пишутся в stderr
    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}
