//! Recording test doubles for the ticket source and the flags.

use crate::core::models::{ColorTier, FlagAction, QueueReading};
use crate::indicator::{Indicator, IndicatorError};
use crate::providers::{SourceError, TicketSource};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// A real `reqwest::Error`, produced without touching the network.
pub fn transport_error() -> reqwest::Error {
    reqwest::Client::new()
        .get("not a url")
        .build()
        .expect_err("invalid url must fail to build")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagWrite {
    pub device_id: String,
    pub color: ColorTier,
    pub action: FlagAction,
}

impl FlagWrite {
    pub fn new(device_id: &str, color: ColorTier, action: FlagAction) -> Self {
        Self {
            device_id: device_id.to_string(),
            color,
            action,
        }
    }
}

#[derive(Default)]
pub struct MockIndicator {
    writes: Mutex<Vec<FlagWrite>>,
    failing_device: Option<String>,
}

impl MockIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(device_id: &str) -> Self {
        Self {
            writes: Mutex::new(Vec::new()),
            failing_device: Some(device_id.to_string()),
        }
    }

    pub fn writes(&self) -> Vec<FlagWrite> {
        self.writes.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.writes.lock().unwrap().clear();
    }
}

#[async_trait]
impl Indicator for MockIndicator {
    async fn set_color(
        &self,
        device_id: &str,
        color: ColorTier,
        action: FlagAction,
    ) -> Result<(), IndicatorError> {
        if self.failing_device.as_deref() == Some(device_id) {
            return Err(IndicatorError::Transport {
                device_id: device_id.to_string(),
                action: action.path(),
                source: transport_error(),
            });
        }

        self.writes
            .lock()
            .unwrap()
            .push(FlagWrite::new(device_id, color, action));
        Ok(())
    }
}

pub enum Scripted {
    Reading(QueueReading),
    TransportFailure,
    Malformed,
}

/// Replays scripted readings in order; an exhausted script reads zero.
#[derive(Default)]
pub struct MockSource {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<usize>,
}

impl MockSource {
    pub fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: Mutex::new(0),
        }
    }

    pub fn counts(counts: impl IntoIterator<Item = usize>) -> Self {
        Self::new(
            counts
                .into_iter()
                .map(|count| Scripted::Reading(QueueReading::Counted(count))),
        )
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl TicketSource for MockSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_queue(&self) -> Result<QueueReading, SourceError> {
        *self.calls.lock().unwrap() += 1;

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Reading(reading)) => Ok(reading),
            Some(Scripted::TransportFailure) => Err(SourceError::Transport {
                endpoint: "mock".to_string(),
                source: transport_error(),
            }),
            Some(Scripted::Malformed) => Err(SourceError::Decode(
                serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
            )),
            None => Ok(QueueReading::Counted(0)),
        }
    }
}

/// Answers a single HTTP request with `status` and `body`.
///
/// Returns the server's base url and a handle resolving to the raw request.
pub async fn serve_once(status: StatusCode, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;

        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });

    (format!("http://{}", addr), handle)
}

/// Base url of a port nothing listens on.
pub async fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&data);
        if let Some(end) = text.find("\r\n\r\n") {
            let content_length = text[..end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&data).into_owned()
}
