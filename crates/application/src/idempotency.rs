//! Idempotent execution of commands.
//!
//! A command with a non-empty idempotency key runs its business effect at most
//! once. The first completed outcome is stored against the key and returned
//! verbatim to every later command carrying the same key.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use domain::IdempotencyRecord;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use store::IdempotencyRepository;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::commands::Command;
use crate::error::{Result, ServiceError};

/// Status code stored for a successful create.
pub const STATUS_CREATED: u16 = 201;

/// Status code stored for a successful update or delete.
pub const STATUS_OK: u16 = 200;

/// Request payload as stored on an idempotency record.
#[derive(Serialize)]
struct StoredRequest<'a, C> {
    command: &'static str,
    payload: &'a C,
}

/// The part of a stored request needed to match it against a new command.
#[derive(Deserialize)]
struct StoredCommand {
    command: Option<String>,
}

/// Returns true if `request` was stored for a command named `name`.
fn stored_for(request: &str, name: &str) -> bool {
    serde_json::from_str::<StoredCommand>(request)
        .ok()
        .and_then(|stored| stored.command)
        .is_some_and(|command| command == name)
}

/// Per-key async mutual exclusion.
///
/// Entries are created on first use and removed when the last holder releases
/// the key with nobody waiting.
#[derive(Default)]
struct KeyLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl KeyLocks {
    async fn lock(&self, key: &str) -> KeyGuard<'_> {
        let mutex = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(key.to_string()).or_default())
        };
        let guard = mutex.lock_owned().await;

        KeyGuard {
            locks: self,
            key: key.to_string(),
            _guard: guard,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

struct KeyGuard<'a> {
    locks: &'a KeyLocks,
    key: String,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        let mut locks = self
            .locks
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one in our guard: nobody else is waiting.
        if let Some(mutex) = locks.get(&self.key)
            && Arc::strong_count(mutex) == 2
        {
            locks.remove(&self.key);
        }
    }
}

/// Runs commands through the idempotency store.
///
/// Clones share the same store and the same key locks, so services built from
/// one executor serialize on a key between them.
#[derive(Clone)]
pub struct IdempotentExecutor {
    store: Arc<dyn IdempotencyRepository>,
    locks: Arc<KeyLocks>,
}

impl IdempotentExecutor {
    /// Creates an executor backed by the given idempotency store.
    pub fn new(store: Arc<dyn IdempotencyRepository>) -> Self {
        Self {
            store,
            locks: Arc::new(KeyLocks::default()),
        }
    }

    /// Runs `operation` for `command` unless its key already has an outcome.
    ///
    /// - Empty key: the operation runs and nothing is cached.
    /// - Key with a stored response: the response is decoded and returned; the
    ///   operation is dropped without running.
    /// - Key with a record but no response, or a record stored for another
    ///   command kind: `DuplicateIdempotencyKey`.
    /// - Unknown key: the operation runs; on success its result is stored with
    ///   `status_code`. Failing to store it is logged, not returned.
    ///
    /// A failed lookup is returned as a storage error. Failed operations
    /// leave no record, so the command can be retried with the same key.
    pub async fn execute<C, R, F>(&self, command: &C, status_code: u16, operation: F) -> Result<R>
    where
        C: Command,
        R: Serialize + DeserializeOwned,
        F: Future<Output = Result<R>>,
    {
        let key = command.idempotency_key();
        if key.is_empty() {
            return operation.await;
        }

        let _guard = self.locks.lock(key).await;

        let existing = self
            .store
            .find_by_key(key)
            .await
            .map_err(ServiceError::storage("idempotency lookup"))?;

        if let Some(record) = existing {
            if !record.has_response() {
                tracing::warn!(key, "idempotency record has no response");
                return Err(ServiceError::DuplicateIdempotencyKey(key.to_string()));
            }
            if !stored_for(record.request(), C::NAME) {
                tracing::warn!(
                    key,
                    command = C::NAME,
                    "idempotency key reused by another command"
                );
                return Err(ServiceError::DuplicateIdempotencyKey(key.to_string()));
            }
            let result = serde_json::from_str(record.response())?;
            metrics::counter!("idempotency_replays_total").increment(1);
            tracing::debug!(key, "replaying stored response");
            return Ok(result);
        }

        let request = StoredRequest {
            command: C::NAME,
            payload: command,
        };
        let mut record = IdempotencyRecord::new(key, serde_json::to_string(&request)?);
        let result = operation.await?;

        match serde_json::to_string(&result) {
            Ok(response) => {
                record.set_response(response, status_code);
                if let Err(e) = self.store.create(&record).await {
                    metrics::counter!("idempotency_cache_write_failures_total").increment(1);
                    tracing::warn!(key, error = %e, "failed to store idempotent response");
                }
            }
            Err(e) => {
                metrics::counter!("idempotency_cache_write_failures_total").increment(1);
                tracing::warn!(key, error = %e, "failed to encode idempotent response");
            }
        }

        Ok(result)
    }

    #[cfg(test)]
    fn held_keys(&self) -> usize {
        self.locks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CreateSeller, DeleteProduct, DeleteSeller};
    use crate::results::DeleteResult;
    use common::{ProductId, SellerId};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use store::InMemoryIdempotencyRepository;

    fn executor() -> (IdempotentExecutor, InMemoryIdempotencyRepository) {
        let store = InMemoryIdempotencyRepository::new();
        (IdempotentExecutor::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn second_call_replays_first_result() {
        let (executor, store) = executor();
        let runs = AtomicUsize::new(0);
        let cmd = CreateSeller::new("key-1", "John");

        for _ in 0..2 {
            let result: DeleteResult = executor
                .execute(&cmd, STATUS_OK, async {
                    runs.fetch_add(1, Ordering::SeqCst);
                    Ok(DeleteResult { success: true })
                })
                .await
                .unwrap();
            assert!(result.success);
        }

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        let record = store.find_by_key("key-1").await.unwrap().unwrap();
        assert_eq!(record.status_code(), Some(STATUS_OK));
        assert_eq!(record.response(), r#"{"success":true}"#);
        assert!(record.request().contains("\"command\":\"CreateSeller\""));
        assert!(record.request().contains("\"name\":\"John\""));
    }

    #[tokio::test]
    async fn key_reused_by_another_command_is_rejected() {
        let (executor, _store) = executor();
        let runs = AtomicUsize::new(0);

        let _: DeleteResult = executor
            .execute(&DeleteSeller::new("key-1", SellerId::new()), STATUS_OK, async {
                Ok(DeleteResult { success: true })
            })
            .await
            .unwrap();

        let result: Result<DeleteResult> = executor
            .execute(&DeleteProduct::new("key-1", ProductId::new()), STATUS_OK, async {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok(DeleteResult { success: true })
            })
            .await;

        assert!(matches!(
            result,
            Err(ServiceError::DuplicateIdempotencyKey(key)) if key == "key-1"
        ));
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn stored_request_matches_only_its_command() {
        assert!(stored_for(r#"{"command":"CreateSeller","payload":{}}"#, "CreateSeller"));
        assert!(!stored_for(r#"{"command":"CreateSeller","payload":{}}"#, "CreateProduct"));
        assert!(!stored_for(r#"{"name":"John"}"#, "CreateSeller"));
        assert!(!stored_for("not json", "CreateSeller"));
    }

    #[tokio::test]
    async fn failed_operation_leaves_no_record() {
        let (executor, store) = executor();
        let cmd = CreateSeller::new("key-1", "John");

        let result: Result<DeleteResult> = executor
            .execute(&cmd, STATUS_OK, async {
                Err(ServiceError::not_found("Seller", "42"))
            })
            .await;

        assert!(matches!(result, Err(ServiceError::NotFound { .. })));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn record_without_response_is_rejected() {
        let (executor, store) = executor();
        store
            .create(&IdempotencyRecord::new("key-1", "{}"))
            .await
            .unwrap();
        let cmd = CreateSeller::new("key-1", "John");

        let result: Result<DeleteResult> = executor
            .execute(&cmd, STATUS_OK, async { Ok(DeleteResult { success: true }) })
            .await;

        assert!(matches!(
            result,
            Err(ServiceError::DuplicateIdempotencyKey(key)) if key == "key-1"
        ));
    }

    #[tokio::test]
    async fn lock_entries_are_released() {
        let (executor, _store) = executor();
        let cmd = CreateSeller::new("key-1", "John");

        let _: DeleteResult = executor
            .execute(&cmd, STATUS_OK, async { Ok(DeleteResult { success: true }) })
            .await
            .unwrap();

        assert_eq!(executor.held_keys(), 0);
    }
}
