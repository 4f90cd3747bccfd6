//! Esign Validator - intent and identity checks gating submission
//!
//! Pure predicates over the current form state. The validator never fails;
//! it returns an itemized report the controller renders as inline guidance.
//! An e-signature statute demands affirmative, unambiguous assent tied to a
//! verified identity, so a mismatched email or an empty signature blocks
//! submission outright.

#![deny(unsafe_code)]

use esign_types::SignatureMethod;
use serde::{Deserialize, Serialize};

/// The signer-editable form fields the validator inspects
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerForm {
    pub signer_name: String,
    pub signer_email: String,
    /// The signer has read and agreed to the underlying document
    pub acknowledged_terms: bool,
    /// The signer has separately affirmed the intent statement
    pub acknowledged_intent: bool,
}

/// One reason submission is blocked
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationIssue {
    MissingSignerName,
    MissingSignerEmail,
    /// Signer email differs from the authenticated session's email
    EmailMismatch,
    TermsNotAcknowledged,
    IntentNotAcknowledged,
    /// The active method has no complete payload yet
    SignatureIncomplete(SignatureMethod),
}

impl ValidationIssue {
    /// User-facing guidance for inline display
    pub fn message(&self) -> String {
        match self {
            ValidationIssue::MissingSignerName => "Enter your full legal name".to_string(),
            ValidationIssue::MissingSignerEmail => "Enter your email address".to_string(),
            ValidationIssue::EmailMismatch => {
                "Email must match your account email".to_string()
            }
            ValidationIssue::TermsNotAcknowledged => {
                "Confirm that you have read and agree to the agreement".to_string()
            }
            ValidationIssue::IntentNotAcknowledged => {
                "Confirm the electronic signature acknowledgment".to_string()
            }
            ValidationIssue::SignatureIncomplete(method) => match method {
                SignatureMethod::Checkbox => "Check the signature box".to_string(),
                SignatureMethod::Typed => "Type your name as your signature".to_string(),
                SignatureMethod::Drawn => "Draw your signature above".to_string(),
            },
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// The validator's structured verdict
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// True when every rule holds and submission may proceed
    pub fn can_submit(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has(&self, issue: ValidationIssue) -> bool {
        self.issues.contains(&issue)
    }
}

/// Case-insensitive email comparison after trimming
pub fn emails_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Evaluate every submission rule against the current form state.
///
/// `capture_is_empty` is the active strategy's `is_empty()`; the validator
/// stays pure by taking the predicate's result rather than the strategy.
/// The checkbox method is always payload-complete: the acknowledgment flags
/// themselves carry the assent, so no further input is required.
pub fn validate(
    form: &SignerForm,
    authenticated_email: &str,
    method: SignatureMethod,
    capture_is_empty: bool,
) -> ValidationReport {
    let mut issues = Vec::new();

    if form.signer_name.trim().is_empty() {
        issues.push(ValidationIssue::MissingSignerName);
    }

    if form.signer_email.trim().is_empty() {
        issues.push(ValidationIssue::MissingSignerEmail);
    } else if !emails_match(&form.signer_email, authenticated_email) {
        issues.push(ValidationIssue::EmailMismatch);
    }

    if !form.acknowledged_terms {
        issues.push(ValidationIssue::TermsNotAcknowledged);
    }

    if !form.acknowledged_intent {
        issues.push(ValidationIssue::IntentNotAcknowledged);
    }

    if method != SignatureMethod::Checkbox && capture_is_empty {
        issues.push(ValidationIssue::SignatureIncomplete(method));
    }

    ValidationReport { issues }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> SignerForm {
        SignerForm {
            signer_name: "Jane Doe".into(),
            signer_email: "jane@x.com".into(),
            acknowledged_terms: true,
            acknowledged_intent: true,
        }
    }

    #[test]
    fn test_valid_form_can_submit() {
        let report = validate(&valid_form(), "jane@x.com", SignatureMethod::Typed, false);
        assert!(report.can_submit());
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_email_match_is_case_insensitive() {
        let mut form = valid_form();
        form.signer_email = "JANE@X.COM".into();
        let report = validate(&form, "jane@x.com", SignatureMethod::Typed, false);
        assert!(report.can_submit());
    }

    #[test]
    fn test_email_mismatch_blocks_submission() {
        let mut form = valid_form();
        form.signer_email = "jane@y.com".into();
        let report = validate(&form, "jane@x.com", SignatureMethod::Typed, false);
        assert!(!report.can_submit());
        assert!(report.has(ValidationIssue::EmailMismatch));
    }

    #[test]
    fn test_each_rule_is_independent() {
        let auth = "jane@x.com";

        let mut form = valid_form();
        form.signer_name = "   ".into();
        assert!(validate(&form, auth, SignatureMethod::Typed, false)
            .has(ValidationIssue::MissingSignerName));

        let mut form = valid_form();
        form.signer_email = "".into();
        let report = validate(&form, auth, SignatureMethod::Typed, false);
        assert!(report.has(ValidationIssue::MissingSignerEmail));
        // An empty email is reported as missing, not mismatched
        assert!(!report.has(ValidationIssue::EmailMismatch));

        let mut form = valid_form();
        form.acknowledged_terms = false;
        assert!(validate(&form, auth, SignatureMethod::Typed, false)
            .has(ValidationIssue::TermsNotAcknowledged));

        let mut form = valid_form();
        form.acknowledged_intent = false;
        assert!(validate(&form, auth, SignatureMethod::Typed, false)
            .has(ValidationIssue::IntentNotAcknowledged));

        let report = validate(&valid_form(), auth, SignatureMethod::Drawn, true);
        assert!(report.has(ValidationIssue::SignatureIncomplete(SignatureMethod::Drawn)));
    }

    #[test]
    fn test_checkbox_method_is_always_payload_complete() {
        // No extra input beyond the acknowledgments: an empty capture does
        // not block a checkbox-method submission
        let report = validate(&valid_form(), "jane@x.com", SignatureMethod::Checkbox, true);
        assert!(report.can_submit());

        // The other rules still apply under the checkbox method
        let mut form = valid_form();
        form.acknowledged_terms = false;
        let report = validate(&form, "jane@x.com", SignatureMethod::Checkbox, true);
        assert!(!report.can_submit());
        assert!(report.has(ValidationIssue::TermsNotAcknowledged));
    }

    #[test]
    fn test_issues_accumulate() {
        let form = SignerForm::default();
        let report = validate(&form, "jane@x.com", SignatureMethod::Typed, true);
        assert_eq!(report.issues.len(), 5);
        assert!(!report.can_submit());
    }

    #[test]
    fn test_emails_match_trims_whitespace() {
        assert!(emails_match("  jane@x.com ", "JANE@x.com"));
        assert!(!emails_match("jane@x.com", "jane@y.com"));
    }

    #[test]
    fn test_issue_messages_are_nonempty() {
        let issues = [
            ValidationIssue::MissingSignerName,
            ValidationIssue::MissingSignerEmail,
            ValidationIssue::EmailMismatch,
            ValidationIssue::TermsNotAcknowledged,
            ValidationIssue::IntentNotAcknowledged,
            ValidationIssue::SignatureIncomplete(SignatureMethod::Drawn),
        ];
        for issue in issues {
            assert!(!issue.message().is_empty());
        }
    }
}
