// src/ledger_service.rs
//
// Single-task owner for a FlowLedger. The ledger is moved into one tokio task and
// every read or write goes through its command channel, so the unsynchronized
// caches underneath are never touched from two places at once.

use crate::accumulator::UpsertError;
use crate::eviction::EvictionSelector;
use crate::flow_ledger::{FlowLedger, FlowSnapshot, TrimReport};
use crate::settings::Service;
use crate::types::{AssetKey, FlowEvent};
use num_bigint::BigUint;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Upsert(#[from] UpsertError),
    #[error("ledger service has shut down")]
    Closed,
}

enum LedgerOperation {
    Apply {
        event: FlowEvent,
        reply: oneshot::Sender<Result<BigUint, UpsertError>>,
    },
    Snapshot {
        key: AssetKey,
        reply: oneshot::Sender<Option<FlowSnapshot>>,
    },
    Snapshots {
        reply: oneshot::Sender<Vec<FlowSnapshot>>,
    },
    Trim {
        reply: oneshot::Sender<TrimReport>,
    },
}

/// Cloneable client for a running ledger service.
///
/// The service stops once every handle has been dropped.
#[derive(Clone)]
pub struct LedgerHandle {
    operation_tx: mpsc::Sender<LedgerOperation>,
}

impl LedgerHandle {
    /// Folds one event into the ledger and returns the updated total for its side.
    pub async fn apply(&self, event: FlowEvent) -> Result<BigUint, LedgerError> {
        let (reply, rx) = oneshot::channel();
        self.send(LedgerOperation::Apply { event, reply }).await?;
        Ok(rx.await.map_err(|_| LedgerError::Closed)??)
    }

    pub async fn snapshot(&self, key: AssetKey) -> Result<Option<FlowSnapshot>, LedgerError> {
        let (reply, rx) = oneshot::channel();
        self.send(LedgerOperation::Snapshot { key, reply }).await?;
        rx.await.map_err(|_| LedgerError::Closed)
    }

    pub async fn snapshots(&self) -> Result<Vec<FlowSnapshot>, LedgerError> {
        let (reply, rx) = oneshot::channel();
        self.send(LedgerOperation::Snapshots { reply }).await?;
        rx.await.map_err(|_| LedgerError::Closed)
    }

    /// Trims immediately instead of waiting for the next interval tick.
    pub async fn trim(&self) -> Result<TrimReport, LedgerError> {
        let (reply, rx) = oneshot::channel();
        self.send(LedgerOperation::Trim { reply }).await?;
        rx.await.map_err(|_| LedgerError::Closed)
    }

    async fn send(&self, operation: LedgerOperation) -> Result<(), LedgerError> {
        self.operation_tx
            .send(operation)
            .await
            .map_err(|_| LedgerError::Closed)
    }
}

/// Moves `ledger` into a background task and returns a handle to it.
///
/// The task trims the ledger every `config.trim_interval()`. When all handles
/// are dropped it finishes and the join handle yields the ledger back.
pub fn spawn_ledger_service<S>(
    ledger: FlowLedger<S>,
    config: &Service,
) -> (LedgerHandle, JoinHandle<FlowLedger<S>>)
where
    S: EvictionSelector<String> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
    let task = tokio::spawn(ledger_task(ledger, rx, config.trim_interval()));
    (LedgerHandle { operation_tx: tx }, task)
}

async fn ledger_task<S>(
    mut ledger: FlowLedger<S>,
    mut rx: mpsc::Receiver<LedgerOperation>,
    trim_interval: Duration,
) -> FlowLedger<S>
where
    S: EvictionSelector<String>,
{
    let mut trim_timer = interval(trim_interval);
    trim_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Ledger service started (trim_interval: {:?})", trim_interval);

    loop {
        tokio::select! {
            operation = rx.recv() => {
                match operation {
                    Some(op) => handle_operation(&mut ledger, op),
                    None => {
                        info!("Ledger service shutting down");
                        break;
                    }
                }
            }

            _ = trim_timer.tick() => {
                let report = ledger.trim();
                if report.total() > 0 {
                    debug!(
                        assets = report.assets_removed,
                        inbound = report.inbound_removed,
                        outbound = report.outbound_removed,
                        "Periodic ledger trim"
                    );
                }
            }
        }
    }

    ledger
}

fn handle_operation<S: EvictionSelector<String>>(ledger: &mut FlowLedger<S>, op: LedgerOperation) {
    // A dropped reply receiver only means the caller stopped waiting
    match op {
        LedgerOperation::Apply { event, reply } => {
            let result = ledger.apply(&event);
            if let Err(ref e) = result {
                warn!(direction = event.direction.as_str(), "Flow event rejected: {}", e);
            }
            let _ = reply.send(result);
        }
        LedgerOperation::Snapshot { key, reply } => {
            let _ = reply.send(ledger.snapshot(&key));
        }
        LedgerOperation::Snapshots { reply } => {
            let _ = reply.send(ledger.snapshots());
        }
        LedgerOperation::Trim { reply } => {
            let _ = reply.send(ledger.trim());
        }
    }
}
