//! Shared utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use balance_hammer::balance::{Address, Amount, BalanceRecord};
use balance_hammer::provider::{ProviderAdapter, ProviderError};
use std::collections::VecDeque;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::Instant;

/// What the mock backend saw.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

async fn read_request(socket: &mut TcpStream) -> Option<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    Some(CapturedRequest { method, path, body })
}

/// Start a programmable mock backend on an ephemeral port.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(CapturedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, body) = f(request).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// A backend that records requests and always answers the same way.
pub async fn start_recording_backend(status: u16, body: &'static str) -> (SocketAddr, Arc<Mutex<Vec<CapturedRequest>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let addr = start_programmable_backend(move |request| {
        recorder.lock().unwrap().push(request);
        async move { (status, body.to_string()) }
    })
    .await;
    (addr, seen)
}

/// One adapter call as seen by [`ScriptedAdapter`].
#[derive(Debug, Clone)]
pub struct Call {
    pub at: Instant,
    pub addresses: Vec<Address>,
}

/// In-memory provider: answers every address with 100 sat unless a failure is scripted.
pub struct ScriptedAdapter {
    name: String,
    batch_limit: usize,
    hourly_quota: Option<u32>,
    pace: Option<Duration>,
    failures: Mutex<VecDeque<ProviderError>>,
    always_fail: Option<ProviderError>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedAdapter {
    pub fn new(name: &str, batch_limit: usize) -> Self {
        Self {
            name: name.to_string(),
            batch_limit,
            hourly_quota: None,
            pace: None,
            failures: Mutex::new(VecDeque::new()),
            always_fail: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_quota(mut self, quota: u32) -> Self {
        self.hourly_quota = Some(quota);
        self
    }

    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = Some(pace);
        self
    }

    /// Fail the next calls, in order, with these errors.
    pub fn failing_first(self, errors: Vec<ProviderError>) -> Self {
        *self.failures.lock().unwrap() = errors.into();
        self
    }

    pub fn failing_always(mut self, error: ProviderError) -> Self {
        self.always_fail = Some(error);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn batch_limit(&self) -> usize {
        self.batch_limit
    }

    fn hourly_quota(&self) -> Option<u32> {
        self.hourly_quota
    }

    fn pace(&self) -> Option<Duration> {
        self.pace
    }

    async fn fetch_balances(&self, addresses: &[Address]) -> Result<Vec<BalanceRecord>, ProviderError> {
        self.calls.lock().unwrap().push(Call {
            at: Instant::now(),
            addresses: addresses.to_vec(),
        });

        if let Some(err) = &self.always_fail {
            return Err(err.clone());
        }
        if let Some(err) = self.failures.lock().unwrap().pop_front() {
            return Err(err);
        }

        Ok(addresses
            .iter()
            .map(|address| BalanceRecord {
                address: address.clone(),
                confirmed: Amount::from_sat(100),
                unconfirmed: Amount::ZERO,
                total: None,
            })
            .collect())
    }
}

pub fn addresses(values: &[&str]) -> Vec<Address> {
    values.iter().map(|v| Address::from(*v)).collect()
}

pub fn sorted(mut values: Vec<Address>) -> Vec<Address> {
    values.sort();
    values
}
