use super::model::{Job, JobId, JobStatus};
use super::store::JobStore;
use crate::domain::work::{WorkRequest, WorkType};
use moka::future::Cache;
use moka::policy::EvictionPolicy;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tokio::sync::Mutex;

/// Fingerprint of caller identity and the full content of the work:
/// work type, text, classification context and the audio flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupeKey(String);

impl DedupeKey {
    /// `caller` is whatever identity object the client sent (user id, diary id, ...).
    pub fn new(caller: &Value, request: &WorkRequest) -> Self {
        let mut canonical_caller = String::new();
        write_canonical(caller, &mut canonical_caller);

        let mut canonical_context = String::new();
        write_canonical(
            request.context.as_ref().unwrap_or(&Value::Null),
            &mut canonical_context,
        );

        let mut hasher = Sha256::new();
        hasher.update(canonical_caller.as_bytes());
        hasher.update(b"|");
        hasher.update(request.work_type.as_str().as_bytes());
        hasher.update(b"|");
        hasher.update(request.text.trim().as_bytes());
        hasher.update(b"|");
        hasher.update(canonical_context.as_bytes());
        hasher.update(b"|");
        hasher.update(if request.with_audio { b"audio" as &[u8] } else { b"silent" });
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DedupeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Serialize with object keys sorted so key order in the request never matters.
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, value)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(value, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        other => out.push_str(&other.to_string()),
    }
}

#[derive(Debug, Clone)]
pub struct Reservation {
    pub job: Job,
    pub reused: bool,
}

/// Maps dedupe keys to the job currently serving them.
///
/// A key is reused while its job is running, or finished successfully within
/// the key TTL. Jobs that ended in `error` release their key so the caller can
/// retry.
pub struct DedupeIndex {
    keys: Cache<DedupeKey, JobId>,
    reserve_lock: Mutex<()>,
}

impl DedupeIndex {
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let keys = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .eviction_policy(EvictionPolicy::lru())
            .build();

        Self {
            keys,
            reserve_lock: Mutex::new(()),
        }
    }

    pub async fn lookup_or_reserve(
        &self,
        key: &DedupeKey,
        work_type: WorkType,
        store: &JobStore,
    ) -> Reservation {
        let _guard = self.reserve_lock.lock().await;

        if let Some(job_id) = self.keys.get(key).await {
            match store.get(job_id).await {
                Ok(job) if job.status() != JobStatus::Error => {
                    tracing::info!(
                        job_id = %job.id,
                        dedupe_key = %key,
                        status = %job.status(),
                        "Reusing job for duplicate submission"
                    );
                    return Reservation { job, reused: true };
                }
                Ok(job) => {
                    tracing::info!(
                        job_id = %job.id,
                        dedupe_key = %key,
                        "Previous job for key failed; reserving a new one"
                    );
                }
                Err(_) => {
                    tracing::debug!(
                        job_id = %job_id,
                        dedupe_key = %key,
                        "Job for key was evicted; reserving a new one"
                    );
                }
            }
        }

        let job = store.create(work_type).await;
        self.keys.insert(key.clone(), job.id).await;

        Reservation { job, reused: false }
    }

    pub fn clear(&self) {
        self.keys.invalidate_all();
    }
}
