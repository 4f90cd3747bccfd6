//! The acceptance recorder
//!
//! `record_acceptance` is the single operation: build an immutable record
//! from the draft, submit it once, and map the outcome. No automatic retry
//! happens here; a network-level retry could mint duplicate legal records,
//! so retrying is always an explicit user action.

use crate::persistence::{PersistenceError, PersistenceService};
use esign_types::{
    AcceptanceContext, AcceptanceId, AcceptanceRecord, AuthenticatedIdentity, SignatureMethod,
    SignaturePayload,
};
use esign_validator::emails_match;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors from `record_acceptance`
#[derive(Debug, Error)]
pub enum RecorderError {
    /// Signer and authenticated identity disagree; the one field a legal
    /// audit scrutinizes first, so it is re-checked here regardless of what
    /// the UI already gated on
    #[error("signer email does not match the authenticated email")]
    EmailMismatch,
    /// Draft state that should have been blocked upstream
    #[error("draft failed validation: {0}")]
    ValidationFailed(String),
    /// The persistence collaborator failed; nothing was saved
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Everything the recorder needs to build one acceptance record
#[derive(Clone, Debug)]
pub struct AcceptanceDraft {
    pub agreement_type: String,
    pub document_version: String,
    pub identity: AuthenticatedIdentity,
    pub signer_name: String,
    pub signer_email: String,
    pub payload: SignaturePayload,
    pub acceptance_context: Option<AcceptanceContext>,
    pub program_id: Option<String>,
    pub tenant_id: Option<String>,
    pub organization_id: Option<String>,
}

impl AcceptanceDraft {
    pub fn new(
        agreement_type: impl Into<String>,
        document_version: impl Into<String>,
        identity: AuthenticatedIdentity,
        signer_name: impl Into<String>,
        signer_email: impl Into<String>,
        payload: SignaturePayload,
    ) -> Self {
        Self {
            agreement_type: agreement_type.into(),
            document_version: document_version.into(),
            identity,
            signer_name: signer_name.into(),
            signer_email: signer_email.into(),
            payload,
            acceptance_context: None,
            program_id: None,
            tenant_id: None,
            organization_id: None,
        }
    }

    pub fn with_context(mut self, context: AcceptanceContext) -> Self {
        self.acceptance_context = Some(context);
        self
    }

    pub fn with_program_id(mut self, program_id: impl Into<String>) -> Self {
        self.program_id = Some(program_id.into());
        self
    }

    pub fn with_tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn with_organization_id(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }
}

/// Orchestrates validation, record construction, and persistence
pub struct AcceptanceRecorder {
    store: Arc<dyn PersistenceService>,
}

impl AcceptanceRecorder {
    pub fn new(store: Arc<dyn PersistenceService>) -> Self {
        Self { store }
    }

    /// Build an immutable acceptance record from the draft and submit it.
    ///
    /// At most one persistence attempt is made per call. On failure the
    /// record is discarded whole; a retry builds a fresh one.
    pub async fn record_acceptance(
        &self,
        draft: AcceptanceDraft,
    ) -> Result<AcceptanceId, RecorderError> {
        if !emails_match(&draft.signer_email, &draft.identity.email) {
            warn!(
                agreement = %draft.agreement_type,
                user = %draft.identity.user_id,
                "acceptance rejected: signer email does not match session"
            );
            return Err(RecorderError::EmailMismatch);
        }

        let record = self.build_record(draft)?;
        let agreement = record.agreement_type.clone();
        let method = record.signature_method;

        match self.store.submit_acceptance(record).await {
            Ok(id) => {
                info!(
                    acceptance = %id,
                    agreement = %agreement,
                    method = %method,
                    "agreement acceptance recorded"
                );
                Ok(id)
            }
            Err(err) => {
                warn!(agreement = %agreement, error = %err, "acceptance persistence failed");
                Err(err.into())
            }
        }
    }

    fn build_record(&self, draft: AcceptanceDraft) -> Result<AcceptanceRecord, RecorderError> {
        let signer_name = draft.signer_name.trim().to_string();
        if signer_name.is_empty() {
            return Err(RecorderError::ValidationFailed(
                "signer name is empty".into(),
            ));
        }

        // The checkbox method carries no payload; the method field itself
        // records how assent was expressed.
        let signature_method = draft.payload.method();
        let signature_payload = match draft.payload {
            SignaturePayload::Checkbox => None,
            other => Some(other),
        };

        if signature_method == SignatureMethod::Typed {
            if let Some(SignaturePayload::Typed { signature }) = &signature_payload {
                if signature.trim().is_empty() {
                    return Err(RecorderError::ValidationFailed(
                        "typed signature is empty".into(),
                    ));
                }
            }
        }

        Ok(AcceptanceRecord {
            agreement_type: draft.agreement_type,
            document_version: draft.document_version,
            user_id: draft.identity.user_id,
            signer_name,
            signer_email: draft.signer_email.trim().to_string(),
            authenticated_email: draft.identity.email,
            signature_method,
            signature_payload,
            acceptance_context: draft.acceptance_context,
            program_id: draft.program_id,
            tenant_id: draft.tenant_id,
            organization_id: draft.organization_id,
        })
    }
}
