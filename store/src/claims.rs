use dashmap::{DashMap, mapref::entry::Entry};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::errors::{StoreError, StoreResult};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobClaim {
    pub id: String,
    pub job_id: String,
    pub pilot: String,
    #[serde(with = "time::serde::rfc3339")]
    pub claimed_at: OffsetDateTime,
}

/// At most one claim per job. Injected into the API layer, same as [`crate::chat::ChatStore`].
pub trait ClaimStore: Send + Sync {
    fn claim(&self, job_id: &str, pilot: &str) -> StoreResult<JobClaim>;
    fn claims(&self) -> Vec<JobClaim>;
}

#[derive(Debug, Default)]
pub struct MemoryClaimStore {
    claims: DashMap<String, JobClaim>,
}

impl MemoryClaimStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClaimStore for MemoryClaimStore {
    fn claim(&self, job_id: &str, pilot: &str) -> StoreResult<JobClaim> {
        match self.claims.entry(job_id.to_owned()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyClaimed(job_id.to_owned())),
            Entry::Vacant(entry) => {
                let claim = JobClaim {
                    id: Uuid::now_v7().to_string(),
                    job_id: job_id.to_owned(),
                    pilot: pilot.to_owned(),
                    claimed_at: OffsetDateTime::now_utc(),
                };
                entry.insert(claim.clone());
                Ok(claim)
            }
        }
    }

    fn claims(&self) -> Vec<JobClaim> {
        self.claims.iter().map(|entry| entry.value().clone()).collect()
    }
}
