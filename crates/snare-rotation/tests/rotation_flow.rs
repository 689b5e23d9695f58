//! End-to-end reconciliation scenarios against the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use snare_audit::{AuditEvent, AuditLogger, NoopAuditLogger};
use snare_rotation::{
    EngineConfig, EngineError, Outcome, Reconciler, Requeue, RetryConfig, RotationEngine,
};
use snare_secrets::{
    LAST_ROTATION_ANNOTATION, ROTATION_INTERVAL_ANNOTATION, SecretKind, SecretName, SecretObject,
};
use snare_store::{
    MemoryStore, ObjectStore, Result as StoreResult, StoreError, Version, VersionedSecret,
};

fn name(n: &str) -> SecretName {
    SecretName::new("trap-web", n).expect("valid name")
}

fn hours_ago(hours: i64) -> String {
    (Utc::now() - chrono::Duration::hours(hours)).to_rfc3339()
}

/// Audit backend that records every event for assertions.
#[derive(Default)]
struct CollectingLogger {
    events: parking_lot::Mutex<Vec<AuditEvent>>,
}

impl AuditLogger for CollectingLogger {
    fn log(&self, event: &AuditEvent) {
        self.events.lock().push(event.clone());
    }
}

#[tokio::test]
async fn scenario_a_overdue_object_rotates() {
    // Interval 1h, last rotation 2h ago: the object must rotate, the
    // timestamp must move to "now", and the next check is one hour out.
    let store = Arc::new(MemoryStore::new());
    let reconciler = Reconciler::new(Arc::clone(&store), Arc::new(NoopAuditLogger::new()));

    let mut object =
        SecretObject::decoy_credential(name("overdue"), SecretKind::Ssh, Duration::from_secs(3600))
            .expect("credential kind");
    object
        .annotations
        .insert(LAST_ROTATION_ANNOTATION.to_string(), hours_ago(2));
    let key = object.name.clone();
    store.insert(object).await.expect("insert");

    let before = Utc::now();
    let result = reconciler.reconcile(&key).await;
    assert_eq!(result.outcome, Outcome::Rotated);
    assert_eq!(result.requeue, Requeue::After(Duration::from_secs(3600)));

    let stored = store.fetch(&key).await.expect("fetch").object;

    // Payload is fully populated with the ssh schema
    let keys: Vec<&str> = stored.data.keys().map(String::as_str).collect();
    assert_eq!(keys, ["password", "username"]);
    assert!(stored.data.get("password").expect("password").len() >= 16);

    // last-rotation moved to "now"
    let raw = stored
        .annotations
        .get(LAST_ROTATION_ANNOTATION)
        .expect("stamped");
    let stamped = chrono::DateTime::parse_from_rfc3339(raw)
        .expect("rfc3339")
        .with_timezone(&Utc);
    assert!(stamped >= before);
    assert!(stamped <= Utc::now());
}

#[tokio::test]
async fn scenario_b_fresh_object_is_left_alone() {
    // Interval 12h, last rotation 1h ago: no mutation, next check ~11h.
    let store = Arc::new(MemoryStore::new());
    let reconciler = Reconciler::new(Arc::clone(&store), Arc::new(NoopAuditLogger::new()));

    let mut object = SecretObject::decoy_credential(
        name("fresh"),
        SecretKind::Database,
        Duration::from_secs(12 * 3600),
    )
    .expect("credential kind");
    object
        .annotations
        .insert(LAST_ROTATION_ANNOTATION.to_string(), hours_ago(1));
    let key = object.name.clone();
    store.insert(object.clone()).await.expect("insert");

    let result = reconciler.reconcile(&key).await;
    assert_eq!(result.outcome, Outcome::Skipped);
    match result.requeue {
        Requeue::After(delay) => {
            assert!(delay > Duration::from_secs(10 * 3600 + 3500));
            assert!(delay <= Duration::from_secs(11 * 3600));
        }
        Requeue::Stop => panic!("fresh object must be requeued"),
    }

    let stored = store.fetch(&key).await.expect("fetch");
    assert_eq!(stored.object, object, "skip must not mutate the object");
    assert_eq!(stored.version, Version::new(1));
}

#[tokio::test]
async fn scenario_c_unparsable_interval_uses_default() {
    // A malformed rotation-interval falls back to the kind default with a
    // warning event; the object is not treated as permanently due.
    let store = Arc::new(MemoryStore::new());
    let audit = Arc::new(CollectingLogger::default());
    let reconciler = Reconciler::new(Arc::clone(&store), audit.clone());

    let mut object = SecretObject::decoy_credential(
        name("garbled"),
        SecretKind::Api,
        Duration::from_secs(3600),
    )
    .expect("credential kind");
    object.annotations.insert(
        ROTATION_INTERVAL_ANNOTATION.to_string(),
        "every-other-tuesday".to_string(),
    );
    let key = object.name.clone();
    store.insert(object).await.expect("insert");

    // First pass rotates (no last-rotation yet) and requeues at the default
    let result = reconciler.reconcile(&key).await;
    assert_eq!(result.outcome, Outcome::Rotated);
    assert_eq!(
        result.requeue,
        Requeue::After(SecretKind::Api.default_interval())
    );

    let warned = audit
        .events
        .lock()
        .iter()
        .any(|e| e.event_type() == "policy_defaulted");
    assert!(warned, "defaulted interval must be audited");

    // Second pass: freshly rotated, so not due despite the bad annotation
    let result = reconciler.reconcile(&key).await;
    assert_eq!(result.outcome, Outcome::Skipped);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn engine_rotates_seeded_and_notified_objects() {
    let store = Arc::new(MemoryStore::new());

    // Two due credentials and one due canary
    let ssh =
        SecretObject::decoy_credential(name("ssh-decoy"), SecretKind::Ssh, Duration::from_secs(3600))
            .expect("credential kind");
    let aws =
        SecretObject::decoy_credential(name("aws-decoy"), SecretKind::Aws, Duration::from_secs(3600))
            .expect("credential kind");
    let mut canary = SecretObject::canary_token(name("tripwire"), Duration::from_secs(6 * 3600))
        .expect("canary");
    canary
        .annotations
        .insert(LAST_ROTATION_ANNOTATION.to_string(), hours_ago(7));
    let initial_token = canary.data.get("token").expect("token").clone();

    for object in [ssh.clone(), aws.clone(), canary.clone()] {
        store.insert(object).await.expect("insert");
    }

    let config = EngineConfig {
        workers: 2,
        resync_interval: Duration::from_millis(100),
        retry: RetryConfig::default(),
    };
    let engine = RotationEngine::new(
        Arc::clone(&store),
        Arc::new(NoopAuditLogger::new()),
        config,
    );
    let handle = engine.start().await.expect("engine starts");

    wait_until(&store, &ssh.name, |o| !o.data.is_empty()).await;
    wait_until(&store, &aws.name, |o| {
        o.data.get("access_key_id").is_some_and(|v| v.starts_with(b"AKIA"))
    })
    .await;
    wait_until(&store, &canary.name, |o| {
        o.data.get("token").is_some_and(|t| *t != initial_token)
    })
    .await;

    // An object created after startup converges via notify()
    let late = SecretObject::decoy_credential(
        name("late-arrival"),
        SecretKind::Generic,
        Duration::from_secs(3600),
    )
    .expect("credential kind");
    store.insert(late.clone()).await.expect("insert");
    handle.notify(&late.name);

    wait_until(&store, &late.name, |o| o.data.contains_key("token")).await;

    handle.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn engine_discovers_objects_without_notification() {
    // The resync sweep alone must pick up an object nobody notified about.
    let store = Arc::new(MemoryStore::new());
    let config = EngineConfig {
        workers: 1,
        resync_interval: Duration::from_millis(50),
        retry: RetryConfig::default(),
    };
    let handle = RotationEngine::new(
        Arc::clone(&store),
        Arc::new(NoopAuditLogger::new()),
        config,
    )
    .start()
    .await
    .expect("engine starts");

    let unseen = SecretObject::decoy_credential(
        name("unseen"),
        SecretKind::Database,
        Duration::from_secs(3600),
    )
    .expect("credential kind");
    store.insert(unseen.clone()).await.expect("insert");

    wait_until(&store, &unseen.name, |o| !o.data.is_empty()).await;

    handle.shutdown().await;
}

#[tokio::test]
async fn engine_refuses_to_start_on_dead_store() {
    struct DeadStore;

    impl ObjectStore for DeadStore {
        async fn fetch(&self, _name: &SecretName) -> StoreResult<VersionedSecret> {
            Err(StoreError::Transient {
                reason: "store down".to_string(),
            })
        }
        async fn update(
            &self,
            _name: &SecretName,
            _expected: Version,
            _object: SecretObject,
        ) -> StoreResult<Version> {
            Err(StoreError::Transient {
                reason: "store down".to_string(),
            })
        }
        async fn insert(&self, _object: SecretObject) -> StoreResult<Version> {
            Err(StoreError::Transient {
                reason: "store down".to_string(),
            })
        }
        async fn remove(&self, _name: &SecretName) -> StoreResult<()> {
            Err(StoreError::Transient {
                reason: "store down".to_string(),
            })
        }
        async fn list(&self) -> StoreResult<Vec<SecretName>> {
            Err(StoreError::Transient {
                reason: "store down".to_string(),
            })
        }
    }

    let engine = RotationEngine::new(
        Arc::new(DeadStore),
        Arc::new(NoopAuditLogger::new()),
        EngineConfig::default(),
    );
    let result = engine.start().await;
    assert!(matches!(
        result,
        Err(EngineError::StartupProbe { .. })
    ));
}

/// Polls the store until the predicate holds for the object, or panics
/// after five seconds.
async fn wait_until<F>(store: &MemoryStore, key: &SecretName, predicate: F)
where
    F: Fn(&SecretObject) -> bool,
{
    for _ in 0..200 {
        if let Ok(fetched) = store.fetch(key).await {
            if predicate(&fetched.object) {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("object {key} did not reach the expected state in time");
}
