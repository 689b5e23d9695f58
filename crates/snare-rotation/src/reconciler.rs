//! One reconciliation cycle per tracked object.
//!
//! A cycle runs Observed → Evaluated → {Rotated | Skipped} → Requeued. A
//! write conflict throws the cycle back to Observed: the evaluation that
//! preceded it is stale by definition, so the whole read-modify-write step
//! repeats from a fresh fetch, bounded by a retry ceiling with jittered
//! backoff. Every exit path ends in a requeue decision; failures are never
//! terminal for an object.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use snare_audit::{AuditEvent, AuditLogger};
use snare_secrets::{
    DecoySpec, IntervalSource, LAST_ROTATION_ANNOTATION, ROTATION_INTERVAL_ANNOTATION, SecretName,
    synthesize,
};
use snare_store::{ObjectStore, StoreError};
use tracing::{debug, error, info, warn};

use crate::backoff::backoff_with_jitter;
use crate::policy;

/// Retry behavior for a single reconciliation cycle.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum fetch/evaluate/write attempts per cycle.
    pub max_attempts: u32,
    /// Base delay for jittered exponential backoff between attempts.
    pub base_backoff: Duration,
    /// Cap on the backoff delay.
    pub max_backoff: Duration,
    /// Fixed requeue delay after a randomness-source failure. Deliberately
    /// much shorter than any rotation interval.
    pub generation_retry_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
            generation_retry_delay: Duration::from_secs(60),
        }
    }
}

/// What a reconciliation cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A fresh payload was synthesized and persisted.
    Rotated,
    /// Rotation was not due; nothing was written.
    Skipped,
    /// The object carries no deception markers and is not managed.
    Unmanaged,
    /// The object was deleted concurrently; treated as success.
    Vanished,
    /// The cycle gave up (retries exhausted or synthesis failed).
    Failed,
}

/// When to look at the object again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requeue {
    /// Re-enqueue after the given delay.
    After(Duration),
    /// Stop tracking the key (deleted or unmanaged objects).
    Stop,
}

/// Result of one reconciliation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileResult {
    /// What happened.
    pub outcome: Outcome,
    /// When to check again.
    pub requeue: Requeue,
}

enum Retryable {
    Conflict,
    Transient(String),
}

/// Drives single objects through the rotation state machine.
pub struct Reconciler<S> {
    store: Arc<S>,
    audit: Arc<dyn AuditLogger>,
    retry: RetryConfig,
}

impl<S: ObjectStore> Reconciler<S> {
    /// Creates a reconciler with default retry behavior.
    #[must_use]
    pub fn new(store: Arc<S>, audit: Arc<dyn AuditLogger>) -> Self {
        Self::with_retry(store, audit, RetryConfig::default())
    }

    /// Creates a reconciler with custom retry behavior.
    #[must_use]
    pub fn with_retry(store: Arc<S>, audit: Arc<dyn AuditLogger>, retry: RetryConfig) -> Self {
        Self {
            store,
            audit,
            retry,
        }
    }

    /// Runs one full reconciliation cycle for the named object.
    ///
    /// All store and synthesis failures are absorbed here and converted
    /// into a requeue decision; this method never fails.
    pub async fn reconcile(&self, name: &SecretName) -> ReconcileResult {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let failure = match self.reconcile_attempt(name).await {
                Ok(result) => return result,
                Err(failure) => failure,
            };

            let reason = match &failure {
                Retryable::Conflict => "write conflict".to_string(),
                Retryable::Transient(reason) => format!("transient store error: {reason}"),
            };

            if attempt >= self.retry.max_attempts {
                warn!(object = %name, attempts = attempt, %reason, "reconciliation gave up for this cycle");
                self.audit
                    .log(&AuditEvent::rotation_failed(name.to_string(), None, &reason, attempt));
                let delay =
                    backoff_with_jitter(self.retry.max_backoff, self.retry.max_backoff, 0);
                return ReconcileResult {
                    outcome: Outcome::Failed,
                    requeue: Requeue::After(delay),
                };
            }

            let delay =
                backoff_with_jitter(self.retry.base_backoff, self.retry.max_backoff, attempt - 1);
            debug!(object = %name, attempt, %reason, backoff = ?delay, "retrying reconciliation");
            tokio::time::sleep(delay).await;
        }
    }

    /// One Observed → Evaluated → {Rotated | Skipped} pass.
    async fn reconcile_attempt(
        &self,
        name: &SecretName,
    ) -> Result<ReconcileResult, Retryable> {
        let fetched = match self.store.fetch(name).await {
            Ok(fetched) => fetched,
            Err(StoreError::NotFound { .. }) => return Ok(Self::vanished(name)),
            Err(StoreError::Transient { reason }) => return Err(Retryable::Transient(reason)),
            Err(other) => return Err(Retryable::Transient(other.to_string())),
        };

        let Some(spec) = DecoySpec::from_object(&fetched.object) else {
            debug!(object = %name, "object carries no deception markers, ignoring");
            return Ok(ReconcileResult {
                outcome: Outcome::Unmanaged,
                requeue: Requeue::Stop,
            });
        };

        if spec.interval_source == IntervalSource::DefaultedInvalid {
            let raw = fetched
                .object
                .annotations
                .get(ROTATION_INTERVAL_ANNOTATION)
                .cloned()
                .unwrap_or_default();
            warn!(
                object = %name,
                raw = %raw,
                default_secs = spec.interval.as_secs(),
                "invalid rotation-interval, substituting kind default"
            );
            self.audit.log(&AuditEvent::policy_defaulted(
                name.to_string(),
                raw,
                spec.interval.as_secs(),
            ));
        }
        if spec.last_rotation_invalid {
            warn!(object = %name, "unparsable last-rotation, treating rotation as due");
        }

        let now = Utc::now();
        let due = policy::needs_rotation(&spec, now);
        self.audit.log(&AuditEvent::rotation_evaluated(
            name.to_string(),
            spec.kind.as_str(),
            due,
        ));

        if !due {
            let delay = policy::next_check_delay(&spec, now);
            debug!(object = %name, kind = %spec.kind, next_check = ?delay, "rotation not due");
            return Ok(ReconcileResult {
                outcome: Outcome::Skipped,
                requeue: Requeue::After(delay),
            });
        }

        let payload = match synthesize(spec.kind) {
            Ok(payload) => payload,
            Err(e) => {
                error!(object = %name, kind = %spec.kind, error = %e, "payload synthesis failed");
                self.audit.log(&AuditEvent::generation_failed(
                    name.to_string(),
                    spec.kind.as_str(),
                    e.to_string(),
                ));
                return Ok(ReconcileResult {
                    outcome: Outcome::Failed,
                    requeue: Requeue::After(self.retry.generation_retry_delay),
                });
            }
        };

        // Payload and timestamp go out in a single write so the two can
        // never be observed half-applied.
        let mut object = fetched.object;
        object.data = payload;
        let stamp = spec.last_rotation.map_or(now, |last| last.max(now));
        object
            .annotations
            .insert(LAST_ROTATION_ANNOTATION.to_string(), stamp.to_rfc3339());

        match self.store.update(name, fetched.version, object).await {
            Ok(_) => {
                info!(object = %name, kind = %spec.kind, "rotated decoy secret");
                self.audit
                    .log(&AuditEvent::secret_rotated(name.to_string(), spec.kind.as_str()));
                let rotated = DecoySpec {
                    last_rotation: Some(stamp),
                    last_rotation_invalid: false,
                    ..spec
                };
                Ok(ReconcileResult {
                    outcome: Outcome::Rotated,
                    requeue: Requeue::After(policy::next_check_delay(&rotated, now)),
                })
            }
            Err(StoreError::NotFound { .. }) => Ok(Self::vanished(name)),
            Err(StoreError::Conflict { .. }) => Err(Retryable::Conflict),
            Err(StoreError::Transient { reason }) => Err(Retryable::Transient(reason)),
            Err(other) => Err(Retryable::Transient(other.to_string())),
        }
    }

    fn vanished(name: &SecretName) -> ReconcileResult {
        debug!(object = %name, "object deleted concurrently, reconciliation stops");
        ReconcileResult {
            outcome: Outcome::Vanished,
            requeue: Requeue::Stop,
        }
    }
}

impl<S> std::fmt::Debug for Reconciler<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("retry", &self.retry)
            .finish()
    }
}
