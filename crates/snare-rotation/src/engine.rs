//! The reconciliation control loop.
//!
//! A bounded pool of workers drains the dedup queue; each worker runs one
//! reconciliation cycle at a time and schedules the object's next check.
//! Change notifications arrive through [`EngineHandle::notify`], and a
//! periodic resync sweep re-enqueues everything the store knows about, so
//! objects created while a notification was lost still converge.
//!
//! Shutdown is cooperative: workers finish the cycle they are on (a cycle
//! ends with a single atomic store write, so nothing is ever half-applied)
//! and pending delayed requeues are cancelled.

use std::sync::Arc;
use std::time::Duration;

use snare_audit::AuditLogger;
use snare_secrets::SecretName;
use snare_store::ObjectStore;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{EngineError, Result};
use crate::queue::WorkQueue;
use crate::reconciler::{Reconciler, Requeue, RetryConfig};

/// Tuning knobs for the control loop.
///
/// These govern polling aggressiveness only; rotation correctness is
/// independent of them.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of concurrent reconciliation workers.
    pub workers: usize,
    /// How often the store is swept for unseen or missed objects.
    pub resync_interval: Duration,
    /// Per-cycle retry behavior.
    pub retry: RetryConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            resync_interval: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }
}

/// The rotation engine, ready to start.
pub struct RotationEngine<S> {
    store: Arc<S>,
    reconciler: Arc<Reconciler<S>>,
    config: EngineConfig,
}

impl<S: ObjectStore> RotationEngine<S> {
    /// Creates an engine over the given store and audit backend.
    #[must_use]
    pub fn new(store: Arc<S>, audit: Arc<dyn AuditLogger>, config: EngineConfig) -> Self {
        let reconciler = Arc::new(Reconciler::with_retry(
            Arc::clone(&store),
            audit,
            config.retry.clone(),
        ));
        Self {
            store,
            reconciler,
            config,
        }
    }

    /// Starts the workers and the resync loop, seeding the queue with every
    /// object currently in the store.
    ///
    /// # Errors
    ///
    /// Returns an error only if the initial store probe fails; this is the
    /// single condition under which the engine refuses to run.
    pub async fn start(self) -> Result<EngineHandle> {
        let initial = self
            .store
            .list()
            .await
            .map_err(|source| EngineError::StartupProbe { source })?;

        let (queue, rx) = WorkQueue::new();
        let queue = Arc::new(queue);
        let rx = Arc::new(Mutex::new(rx));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let workers = self.config.workers.max(1);
        let mut tasks = Vec::with_capacity(workers + 1);
        for worker_id in 0..workers {
            tasks.push(tokio::spawn(worker_loop(
                worker_id,
                Arc::clone(&self.reconciler),
                Arc::clone(&queue),
                Arc::clone(&rx),
                shutdown_rx.clone(),
            )));
        }
        tasks.push(tokio::spawn(resync_loop(
            Arc::clone(&self.store),
            Arc::clone(&queue),
            self.config.resync_interval,
            shutdown_rx.clone(),
        )));

        for name in &initial {
            queue.enqueue(name);
        }
        info!(
            workers,
            resync = ?self.config.resync_interval,
            objects = initial.len(),
            "rotation engine started"
        );

        Ok(EngineHandle {
            queue,
            shutdown_tx,
            shutdown_rx,
            tasks,
        })
    }
}

impl<S> std::fmt::Debug for RotationEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotationEngine")
            .field("config", &self.config)
            .finish()
    }
}

/// Running engine: the inbound notification channel and shutdown control.
pub struct EngineHandle {
    queue: Arc<WorkQueue>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl EngineHandle {
    /// Notifies the engine that an object changed (or appeared).
    ///
    /// This is the channel collaborators use after creating or touching an
    /// object. Returns false when the notification was deduplicated against
    /// an already-pending reconciliation.
    pub fn notify(&self, name: &SecretName) -> bool {
        self.queue.enqueue(name)
    }

    /// Number of objects currently queued or being reconciled.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Stops the engine, letting in-flight reconciliations finish their
    /// current cycle.
    pub async fn shutdown(self) {
        info!("rotation engine shutting down");
        let _ = self.shutdown_tx.send(true);
        for task in self.tasks {
            let _ = task.await;
        }
        info!("rotation engine stopped");
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("pending", &self.queue.len())
            .field("stopping", &*self.shutdown_rx.borrow())
            .finish()
    }
}

async fn worker_loop<S: ObjectStore>(
    worker_id: usize,
    reconciler: Arc<Reconciler<S>>,
    queue: Arc<WorkQueue>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<SecretName>>>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        let name = tokio::select! {
            _ = shutdown.changed() => break,
            received = async { rx.lock().await.recv().await } => match received {
                Some(name) => name,
                None => break,
            },
        };

        queue.begin(&name);
        let result = reconciler.reconcile(&name).await;
        let requeued_dirty = queue.finish(&name);

        if !requeued_dirty {
            if let Requeue::After(delay) = result.requeue {
                schedule_requeue(Arc::clone(&queue), name, delay, shutdown.clone());
            }
        }

        if *shutdown.borrow() {
            break;
        }
    }
    debug!(worker = worker_id, "reconciliation worker stopped");
}

/// Re-enqueues a key after its next-check delay, unless shutdown wins.
fn schedule_requeue(
    queue: Arc<WorkQueue>,
    name: SecretName,
    delay: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    tokio::spawn(async move {
        tokio::select! {
            _ = shutdown.changed() => {}
            () = tokio::time::sleep(delay) => {
                queue.enqueue(&name);
            }
        }
    });
}

async fn resync_loop<S: ObjectStore>(
    store: Arc<S>,
    queue: Arc<WorkQueue>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {
                match store.list().await {
                    Ok(names) => {
                        let mut enqueued = 0usize;
                        for name in &names {
                            if queue.enqueue(name) {
                                enqueued += 1;
                            }
                        }
                        debug!(objects = names.len(), enqueued, "resync sweep");
                    }
                    Err(e) => {
                        // Transient by policy: the next sweep tries again
                        warn!(error = %e, "resync sweep failed");
                    }
                }
            }
        }
    }
    debug!("resync loop stopped");
}
