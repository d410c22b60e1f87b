//! Протокол долгоживущего режима `serve`: один JSON-объект на строку stdin,
//! один JSON-ответ на строку stdout. Логи идут в stderr.

use crate::bridge::Bridge;
use crate::error::Result;
use crate::events::TargetKind;
use crate::services::FocusOutcome;
use serde::{Deserialize, Serialize};
use std::io::Read;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, DuplexStream};
use tracing::{debug, info, warn};

const READ_CHUNK: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    EditorFocus {
        identifier: String,
    },
    ToolFocus {
        key_code: u32,
    },
    IsRunning {
        target: TargetKind,
        #[serde(default)]
        identifier: String,
    },
    Invalidate {
        #[serde(default)]
        target: Option<TargetKind>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Ok {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        running: Option<bool>,
    },
    TargetNotFound,
    Error {
        message: String,
    },
}

impl Response {
    fn ok() -> Self {
        Response::Ok { running: None }
    }
}

impl From<FocusOutcome> for Response {
    fn from(outcome: FocusOutcome) -> Self {
        match outcome {
            FocusOutcome::Ok => Response::ok(),
            FocusOutcome::TargetNotFound => Response::TargetNotFound,
        }
    }
}

pub fn handle_request(bridge: &Bridge, request: Request) -> Response {
    debug!("Запрос хоста: {:?}", request);

    match request {
        Request::EditorFocus { identifier } => bridge.request_editor_focus(&identifier).into(),
        Request::ToolFocus { key_code } => match bridge.request_tool_focus(key_code) {
            Ok(outcome) => outcome.into(),
            Err(e) => Response::Error {
                message: e.to_string(),
            },
        },
        Request::IsRunning { target, identifier } => Response::Ok {
            running: Some(bridge.is_running(target, &identifier)),
        },
        Request::Invalidate { target: Some(kind) } => {
            bridge.invalidate(kind);
            Response::ok()
        }
        Request::Invalidate { target: None } => {
            bridge.reset();
            Response::ok()
        }
    }
}

/// Разбирает одну строку протокола; неверный JSON превращается в ответ с ошибкой
pub fn handle_line(bridge: &Bridge, line: &str) -> Response {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => handle_request(bridge, request),
        Err(e) => {
            warn!("Неверный запрос хоста: {}", e);
            Response::Error {
                message: format!("Неверный запрос: {}", e),
            }
        }
    }
}

/// Обрабатывает запросы строго по одному до конца ввода
pub async fn serve<R, W>(bridge: &Bridge, input: R, mut output: W) -> Result<()>
where
    R: tokio::io::AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!("Режим serve запущен, ожидаем запросы");

    let mut lines = BufReader::new(input).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = handle_line(bridge, line);
        let mut reply = serde_json::to_string(&response)?;
        reply.push('\n');
        output.write_all(reply.as_bytes()).await?;
        output.flush().await?;
    }

    info!("Ввод хоста закрыт, serve завершается");
    Ok(())
}

/// Перекачивает блокирующий источник в асинхронный поток на отдельном потоке ОС.
///
/// Рантайм не ждёт этот поток при завершении, поэтому Ctrl+C не зависает на
/// незаконченном чтении. Конец источника закрывает возвращённый поток.
pub fn spawn_reader<S>(mut source: S) -> Result<DuplexStream>
where
    S: Read + Send + 'static,
{
    let (mut writer, reader) = tokio::io::duplex(READ_CHUNK);
    let handle = tokio::runtime::Handle::current();

    std::thread::Builder::new()
        .name("host-input".to_string())
        .spawn(move || {
            let mut buf = [0u8; READ_CHUNK];
            loop {
                let n = match source.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        warn!("Ошибка чтения ввода хоста: {}", e);
                        break;
                    }
                };
                if handle.block_on(writer.write_all(&buf[..n])).is_err() {
                    break;
                }
            }
            debug!("Поток чтения ввода хоста завершён");
        })?;

    Ok(reader)
}

pub fn stdin_reader() -> Result<DuplexStream> {
    spawn_reader(std::io::stdin())
}
