//! Acceptance records and their identity context
//!
//! An `AcceptanceRecord` is write-once: it is constructed only by the
//! recorder after validation passes, submitted to persistence exactly once,
//! and has no mutation path afterwards. On failure it is discarded whole;
//! resubmission builds a fresh record.

use crate::signature::{SignatureMethod, SignaturePayload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable identifier assigned by the persistence layer for one acceptance
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AcceptanceId(pub String);

impl AcceptanceId {
    /// Generate a new random AcceptanceId
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Create an AcceptanceId from a known string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Short display form (first 8 chars)
    pub fn short(&self) -> String {
        self.0.chars().take(8).collect()
    }
}

impl std::fmt::Display for AcceptanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The authenticated user, as supplied by the identity provider.
///
/// Supplied once per signing session and treated as an immutable snapshot
/// for the session's duration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedIdentity {
    pub user_id: String,
    pub email: String,
}

impl AuthenticatedIdentity {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
        }
    }
}

/// Where in the product the acceptance was collected
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptanceContext {
    Checkout,
    FirstLogin,
    Upgrade,
    Renewal,
    Onboarding,
}

impl AcceptanceContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcceptanceContext::Checkout => "checkout",
            AcceptanceContext::FirstLogin => "first_login",
            AcceptanceContext::Upgrade => "upgrade",
            AcceptanceContext::Renewal => "renewal",
            AcceptanceContext::Onboarding => "onboarding",
        }
    }
}

impl std::fmt::Display for AcceptanceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The durable artifact representing one signing event.
///
/// Invariant: `signer_email` equals `authenticated_email` case-insensitively
/// at submission time; the recorder enforces this before any record is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AcceptanceRecord {
    /// Agreement family, e.g. "enrollment_agreement"
    pub agreement_type: String,
    /// Version of the document text that was accepted
    pub document_version: String,
    /// Authenticated user id
    pub user_id: String,
    /// Name the signer asserted
    pub signer_name: String,
    /// Email the signer asserted
    pub signer_email: String,
    /// Email of the authenticated session the signer was validated against
    pub authenticated_email: String,
    /// How assent was expressed
    pub signature_method: SignatureMethod,
    /// The serialized signature; the checkbox method carries a unit payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_payload: Option<SignaturePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceptance_context: Option<AcceptanceContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
}

/// Server-observed audit fields, stamped by the persistence layer.
///
/// The core never fabricates these; they belong to the collaborator that
/// actually observed the request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditStamp {
    pub accepted_at: DateTime<Utc>,
    pub ip_address: String,
    pub user_agent: String,
}

impl AuditStamp {
    pub fn new(ip_address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            accepted_at: Utc::now(),
            ip_address: ip_address.into(),
            user_agent: user_agent.into(),
        }
    }
}
