//! tabwarden RPC bridge: newline-delimited JSON over stdin/stdout.
//!
//! The browser-side shim forwards tab events and UI messages; the bridge
//! answers them and streams back the host commands the service issued.
//!
//! Event:    {"id":1, "event":"tabActivated", "params":{"tabId":3}}
//! Message:  {"id":2, "message":{"action":"closeDuplicateTabs","notificationId":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//! Command:  {"command":"removeTabs","tabIds":[4,5]}
//!
//! Logs go to stderr, filtered by `TABWARDEN_LOG` (default `warn`).

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use tabwarden::app::Background;
use tabwarden::database::{Database, SqliteStorage};
use tabwarden::host::memory::{InMemoryHost, MemoryStorage};
use tabwarden::host::{StorageArea, StorageAreas, SystemClock};
use tabwarden::platform;
use tabwarden::rpc_handler::{handle_event, handle_message, is_network_action};
use tabwarden::services::link_resolver::LinkResolver;

type SharedBackground = Arc<Mutex<Background<InMemoryHost>>>;

/// Timer resolution of the background service.
const TICK: Duration = Duration::from_millis(50);

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TABWARDEN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Durable storage in the data directory, or memory when the database cannot be opened.
fn open_durable_storage() -> Box<dyn StorageArea + Send> {
    let path = platform::database_path();
    if let Some(dir) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(dir) {
            tracing::warn!(dir = %dir.display(), error = %e, "failed to create data directory");
        }
    }
    match Database::open(&path) {
        Ok(db) => {
            tracing::info!(path = %path.display(), "opened durable storage");
            Box::new(SqliteStorage::new(db))
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "durable storage unavailable, state will not survive restarts");
            Box::new(MemoryStorage::new())
        }
    }
}

/// Sends every host command journaled since the last flush.
fn flush_commands(app: &SharedBackground, out: &mpsc::UnboundedSender<Value>) {
    let commands = match app.lock() {
        Ok(mut bg) => bg.host_mut().drain_commands(),
        Err(e) => {
            tracing::error!(error = %e, "background lock poisoned");
            return;
        }
    };
    for command in commands {
        match serde_json::to_value(&command) {
            Ok(value) => {
                let _ = out.send(value);
            }
            Err(e) => tracing::warn!(error = %e, "failed to encode host command"),
        }
    }
}

async fn handle_network_message(resolver: &LinkResolver, message: &Value) -> Value {
    let action = message.get("action").and_then(Value::as_str).unwrap_or("");
    let Some(url) = message.get("url").and_then(Value::as_str) else {
        return json!({"success": false, "error": "missing url"});
    };
    match action {
        "resolveRedirectUrl" => match resolver.resolve_redirect(url).await {
            Ok(final_url) => json!({"success": true, "finalUrl": final_url}),
            Err(e) => json!({"success": false, "error": e.to_string()}),
        },
        _ => match resolver.fetch_content(url).await {
            Ok(content) => json!({"success": true, "content": content}),
            Err(e) => json!({"success": false, "error": e.to_string()}),
        },
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let storage = StorageAreas::new(open_durable_storage(), Box::new(MemoryStorage::new()));
    let app: SharedBackground = Arc::new(Mutex::new(Background::new(
        InMemoryHost::new(),
        storage,
        Box::new(SystemClock),
    )));
    match app.lock() {
        Ok(mut bg) => bg.startup(),
        Err(e) => {
            tracing::error!(error = %e, "failed to start background service");
            return;
        }
    }
    let resolver = match LinkResolver::new() {
        Ok(r) => Arc::new(r),
        Err(e) => {
            tracing::error!(error = %e, "failed to build http client");
            return;
        }
    };

    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Value>();
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(value) = out_rx.recv().await {
            let line = format!("{}\n", value);
            if stdout.write_all(line.as_bytes()).await.is_err() || stdout.flush().await.is_err() {
                break;
            }
        }
    });

    let _ = out_tx.send(json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}));

    let ticker_task = {
        let app = app.clone();
        let out = out_tx.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(TICK);
            loop {
                ticker.tick().await;
                match app.lock() {
                    Ok(mut bg) => bg.poll_timers(),
                    Err(_) => break,
                }
                flush_commands(&app, &out);
            }
        })
    };

    // Max 200 requests per second from the shim
    let mut rate_limiter = RateLimiter::new(200);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                let _ = out_tx.send(json!({"id": null, "error": format!("parse error: {}", e)}));
                continue;
            }
        };
        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            let _ = out_tx.send(json!({"id": id, "error": "rate limit exceeded"}));
            continue;
        }

        if let Some(message) = req.get("message").cloned() {
            let action = message.get("action").and_then(Value::as_str).unwrap_or("");
            if is_network_action(action) {
                let resolver = resolver.clone();
                let out = out_tx.clone();
                tokio::spawn(async move {
                    let result = handle_network_message(&resolver, &message).await;
                    let _ = out.send(json!({"id": id, "result": result}));
                });
                continue;
            }
            let result = handle_message(&app, &message);
            let _ = out_tx.send(json!({"id": id, "result": result}));
        } else if let Some(event) = req.get("event").and_then(Value::as_str) {
            let params = req.get("params").cloned().unwrap_or(json!({}));
            let response = match handle_event(&app, event, &params) {
                Ok(val) => json!({"id": id, "result": val}),
                Err(err) => json!({"id": id, "error": err}),
            };
            let _ = out_tx.send(response);
        } else {
            let _ = out_tx.send(json!({"id": id, "error": "expected an event or a message"}));
        }
        flush_commands(&app, &out_tx);
    }

    ticker_task.abort();
    if let Ok(mut bg) = app.lock() {
        bg.shutdown();
    }
    drop(out_tx);
    let _ = writer.await;
}
