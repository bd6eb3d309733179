use std::{collections::HashMap, time::Duration};

use serde_json::Value;
use sqlx::{Pool, Sqlite};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use crate::db::utils::upsert_values;

pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(500);

enum Command {
    Write(String, Value),
    Flush(oneshot::Sender<()>),
}

/// Coalesces writes per key and persists them once no new write arrived for
/// `delay`. Later writes to the same key replace earlier pending ones.
#[derive(Debug)]
pub struct DebouncedWriter {
    tx: mpsc::UnboundedSender<Command>,
}

impl DebouncedWriter {
    pub fn spawn(connection: Pool<Sqlite>, delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(connection, rx, delay));
        Self { tx }
    }

    pub fn write(&self, key: String, value: Value) {
        if self.tx.send(Command::Write(key, value)).is_err() {
            error!("Debounced writer has stopped; write dropped");
        }
    }

    /// Persists everything still pending and waits until it is written.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Command::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }
}

async fn run(connection: Pool<Sqlite>, mut rx: mpsc::UnboundedReceiver<Command>, delay: Duration) {
    let mut pending: HashMap<String, Value> = HashMap::new();

    loop {
        let command = if pending.is_empty() {
            rx.recv().await
        } else {
            match tokio::time::timeout(delay, rx.recv()).await {
                Ok(command) => command,
                Err(_) => {
                    persist(&connection, &mut pending).await;
                    continue;
                }
            }
        };

        match command {
            Some(Command::Write(key, value)) => {
                pending.insert(key, value);
            }
            Some(Command::Flush(ack)) => {
                persist(&connection, &mut pending).await;
                let _ = ack.send(());
            }
            None => {
                persist(&connection, &mut pending).await;
                break;
            }
        }
    }
}

async fn persist(connection: &Pool<Sqlite>, pending: &mut HashMap<String, Value>) {
    if pending.is_empty() {
        return;
    }

    let values: Vec<(String, Value)> = pending.drain().collect();
    debug!("Persisting {} debounced key(s)", values.len());

    if let Err(e) = upsert_values(connection, &values).await {
        error!("Failed to persist debounced writes: {:?}", e);
    }
}
