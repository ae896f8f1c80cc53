//! Ordered, non-blocking mirror dispatch.
//!
//! [`MirrorSync`] is a cheaply cloneable handle held in application state.
//! [`MirrorSync::sync_issue`] enqueues a job and returns immediately; a single
//! worker task applies jobs one at a time in enqueue order.
//!
//! Enqueue order can differ from the order the store committed the writes,
//! since concurrent handlers race between commit and enqueue. The worker
//! therefore keeps the newest `updated_at` it has mirrored per issue and drops
//! any upsert older than that, and it remembers deleted ids so a late upsert
//! never brings a deleted row back.
//!
//! The worker lazily initializes the mirror before the first job. If that
//! fails the job is dropped and initialization is attempted again with the
//! next one. Every failure is logged and swallowed; nothing is retried.
//!
//! The worker exits once every handle has been dropped and the queue is empty.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracker_core::types::{IssueId, Timestamp};
use tracker_db::models::issue::Issue;

use crate::client::MirrorClient;
use crate::row::{issue_row, SyncOperation};

enum Command {
    Sync {
        issue: Issue,
        operation: SyncOperation,
    },
    Flush(oneshot::Sender<()>),
}

#[derive(Clone)]
pub struct MirrorSync {
    tx: mpsc::UnboundedSender<Command>,
}

impl MirrorSync {
    /// Spawn the worker on the current tokio runtime.
    ///
    /// Returns the handle and the worker's `JoinHandle`, which resolves after
    /// the last handle is dropped and the queue has drained.
    pub fn start(client: Arc<dyn MirrorClient>) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run(client, rx));
        (Self { tx }, worker)
    }

    /// Queue a mirror write for `issue`. Never blocks and never fails the caller.
    pub fn sync_issue(&self, issue: &Issue, operation: SyncOperation) {
        let command = Command::Sync {
            issue: issue.clone(),
            operation,
        };
        if self.tx.send(command).is_err() {
            tracing::error!(
                issue_id = %issue.id,
                %operation,
                "Mirror sync worker is not running; dropping job"
            );
        }
    }

    /// Wait until every job queued before this call has been processed.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}

async fn run(client: Arc<dyn MirrorClient>, mut rx: mpsc::UnboundedReceiver<Command>) {
    tracing::info!("Mirror sync worker started");
    let mut worker = Worker::new(client);

    while let Some(command) = rx.recv().await {
        match command {
            Command::Sync { issue, operation } => worker.apply(&issue, operation).await,
            Command::Flush(done) => {
                let _ = done.send(());
            }
        }
    }

    tracing::info!("Mirror sync worker stopped");
}

struct Worker {
    client: Arc<dyn MirrorClient>,
    initialized: bool,
    /// Newest `updated_at` mirrored per live issue.
    applied: HashMap<IssueId, Timestamp>,
    /// Issues that have been deleted. Ids are never reused.
    deleted: HashSet<IssueId>,
}

impl Worker {
    fn new(client: Arc<dyn MirrorClient>) -> Self {
        Self {
            client,
            initialized: false,
            applied: HashMap::new(),
            deleted: HashSet::new(),
        }
    }

    /// Whether an upsert of `issue` would overwrite newer mirrored state.
    fn is_stale(&self, issue: &Issue) -> bool {
        self.deleted.contains(&issue.id)
            || self
                .applied
                .get(&issue.id)
                .is_some_and(|newest| issue.updated_at < *newest)
    }

    async fn apply(&mut self, issue: &Issue, operation: SyncOperation) {
        let issue_id = issue.id.to_string();

        match operation {
            SyncOperation::Create | SyncOperation::Update if self.is_stale(issue) => {
                tracing::debug!(
                    issue_id = %issue_id,
                    %operation,
                    updated_at = %issue.updated_at,
                    "Skipping superseded mirror sync"
                );
                return;
            }
            SyncOperation::Delete => {
                self.applied.remove(&issue.id);
                self.deleted.insert(issue.id);
            }
            _ => {}
        }

        if !self.initialized {
            if let Err(e) = self.client.ensure_initialized().await {
                tracing::error!(
                    issue_id = %issue_id,
                    %operation,
                    error = %e,
                    "Mirror initialization failed; job dropped"
                );
                return;
            }
            self.initialized = true;
            tracing::info!("Mirror initialized");
        }

        let result = match operation {
            SyncOperation::Create | SyncOperation::Update => {
                let result = self.client.upsert_row(&issue_id, &issue_row(issue)).await;
                if result.is_ok() {
                    self.applied.insert(issue.id, issue.updated_at);
                }
                result
            }
            SyncOperation::Delete => self.client.delete_row(&issue_id).await,
        };

        match result {
            Ok(()) => tracing::debug!(issue_id = %issue_id, %operation, "Mirror sync applied"),
            Err(e) => {
                tracing::error!(issue_id = %issue_id, %operation, error = %e, "Mirror sync failed")
            }
        }
    }
}
