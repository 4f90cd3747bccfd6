//! Persistence collaborator interface and an in-memory store for tests
//!
//! The persistence layer stamps the server-observed audit fields (timestamp,
//! IP address, user agent) and guarantees the written record is thereafter
//! immutable: no update or delete surface exists, here or anywhere else.

use async_trait::async_trait;
use esign_types::{AcceptanceId, AcceptanceRecord, AuditStamp};
use parking_lot::RwLock;
use thiserror::Error;

/// Failures from the persistence collaborator
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The store could not be reached
    #[error("persistence unavailable: {0}")]
    Unavailable(String),
    /// The store refused the write (e.g. duplicate-acceptance policy)
    #[error("acceptance rejected: {0}")]
    Rejected(String),
}

/// Trait for acceptance stores
#[async_trait]
pub trait PersistenceService: Send + Sync {
    /// Durably write one acceptance record and return its identifier.
    ///
    /// Implementations stamp `accepted_at`, `ip_address`, and `user_agent`
    /// from their own observation of the request, never from caller input.
    async fn submit_acceptance(
        &self,
        record: AcceptanceRecord,
    ) -> Result<AcceptanceId, PersistenceError>;
}

/// One persisted acceptance: the record plus the store's audit stamp
#[derive(Clone, Debug, PartialEq)]
pub struct StoredAcceptance {
    pub id: AcceptanceId,
    pub record: AcceptanceRecord,
    pub stamp: AuditStamp,
}

/// In-memory acceptance store for testing.
///
/// Append-only by construction: records can be listed but never modified
/// or removed. `fail_with` simulates an outage for error-path tests.
pub struct MemoryAcceptanceStore {
    records: RwLock<Vec<StoredAcceptance>>,
    failure: RwLock<Option<String>>,
    ip_address: String,
    user_agent: String,
}

impl MemoryAcceptanceStore {
    pub fn new() -> Self {
        Self::with_request_metadata("127.0.0.1", "esign-test")
    }

    /// Configure the metadata the store observes for incoming requests
    pub fn with_request_metadata(
        ip_address: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            failure: RwLock::new(None),
            ip_address: ip_address.into(),
            user_agent: user_agent.into(),
        }
    }

    /// Make every subsequent submit fail with `message`
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.write() = Some(message.into());
    }

    /// Clear a previously configured failure
    pub fn recover(&self) {
        *self.failure.write() = None;
    }

    /// All persisted acceptances
    pub fn records(&self) -> Vec<StoredAcceptance> {
        self.records.read().clone()
    }

    pub fn record_count(&self) -> usize {
        self.records.read().len()
    }
}

impl Default for MemoryAcceptanceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersistenceService for MemoryAcceptanceStore {
    async fn submit_acceptance(
        &self,
        record: AcceptanceRecord,
    ) -> Result<AcceptanceId, PersistenceError> {
        if let Some(message) = self.failure.read().clone() {
            return Err(PersistenceError::Unavailable(message));
        }

        let stored = StoredAcceptance {
            id: AcceptanceId::generate(),
            record,
            stamp: AuditStamp::new(self.ip_address.clone(), self.user_agent.clone()),
        };
        let id = stored.id.clone();

        self.records.write().push(stored);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esign_types::{SignatureMethod, SignaturePayload};

    fn sample_record() -> AcceptanceRecord {
        AcceptanceRecord {
            agreement_type: "enrollment_agreement".into(),
            document_version: "2024-01".into(),
            user_id: "user-1".into(),
            signer_name: "Jane Doe".into(),
            signer_email: "jane@x.com".into(),
            authenticated_email: "jane@x.com".into(),
            signature_method: SignatureMethod::Typed,
            signature_payload: Some(SignaturePayload::Typed {
                signature: "Jane Doe".into(),
            }),
            acceptance_context: None,
            program_id: None,
            tenant_id: None,
            organization_id: None,
        }
    }

    #[tokio::test]
    async fn test_submit_stamps_audit_fields() {
        let store = MemoryAcceptanceStore::with_request_metadata("203.0.113.7", "Mozilla/5.0");
        let id = store.submit_acceptance(sample_record()).await.unwrap();

        let records = store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].stamp.ip_address, "203.0.113.7");
        assert_eq!(records[0].stamp.user_agent, "Mozilla/5.0");
    }

    #[tokio::test]
    async fn test_repeated_submits_append_distinct_records() {
        let store = MemoryAcceptanceStore::new();
        let a = store.submit_acceptance(sample_record()).await.unwrap();
        let b = store.submit_acceptance(sample_record()).await.unwrap();

        assert_ne!(a, b);
        assert_eq!(store.record_count(), 2);
    }

    #[tokio::test]
    async fn test_failure_writes_nothing() {
        let store = MemoryAcceptanceStore::new();
        store.fail_with("connection refused");

        let result = store.submit_acceptance(sample_record()).await;
        assert_eq!(
            result,
            Err(PersistenceError::Unavailable("connection refused".into()))
        );
        assert_eq!(store.record_count(), 0);

        store.recover();
        assert!(store.submit_acceptance(sample_record()).await.is_ok());
    }
}
