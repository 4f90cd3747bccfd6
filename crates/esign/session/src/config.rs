//! Embedding configuration for one signing surface

use esign_types::AcceptanceContext;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delay before the post-success client redirect, so the signed state is
/// visibly shown before navigation
pub const REDIRECT_DELAY: Duration = Duration::from_millis(1500);

/// Everything the embedding surface supplies to render one signing
/// interaction for one agreement/version pair
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SigningConfig {
    /// Agreement family, e.g. "enrollment_agreement"
    pub agreement_type: String,
    /// Version of the document text being accepted
    pub document_version: String,
    /// Link to the document text, shown next to the terms acknowledgment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceptance_context: Option<AcceptanceContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    /// Where to navigate after a successful signature, after `REDIRECT_DELAY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_on_success: Option<String>,
}

impl SigningConfig {
    pub fn new(agreement_type: impl Into<String>, document_version: impl Into<String>) -> Self {
        Self {
            agreement_type: agreement_type.into(),
            document_version: document_version.into(),
            document_url: None,
            acceptance_context: None,
            program_id: None,
            tenant_id: None,
            organization_id: None,
            redirect_on_success: None,
        }
    }

    pub fn with_document_url(mut self, url: impl Into<String>) -> Self {
        self.document_url = Some(url.into());
        self
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

    pub fn with_redirect_on_success(mut self, url: impl Into<String>) -> Self {
        self.redirect_on_success = Some(url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builders() {
        let config = SigningConfig::new("enrollment_agreement", "2024-01")
            .with_document_url("https://example.com/terms")
            .with_context(AcceptanceContext::Onboarding)
            .with_program_id("prog-7")
            .with_redirect_on_success("/dashboard");

        assert_eq!(config.agreement_type, "enrollment_agreement");
        assert_eq!(config.document_url.as_deref(), Some("https://example.com/terms"));
        assert_eq!(config.acceptance_context, Some(AcceptanceContext::Onboarding));
        assert_eq!(config.redirect_on_success.as_deref(), Some("/dashboard"));
        assert!(config.tenant_id.is_none());
    }

    #[test]
    fn test_redirect_delay_is_short() {
        assert_eq!(REDIRECT_DELAY, Duration::from_millis(1500));
    }
}
