//! The signing session state machine

use crate::config::{SigningConfig, REDIRECT_DELAY};
use crate::identity::{IdentityError, IdentityProvider};
use esign_capture::CaptureSelector;
use esign_recorder::{AcceptanceDraft, AcceptanceRecorder, RecorderError};
use esign_types::{AcceptanceId, AuthenticatedIdentity, SignatureMethod};
use esign_validator::{validate, SignerForm, ValidationReport};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Where the interaction currently stands
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Fetching the authenticated identity
    Loading,
    /// Form interactive; a failed submit returns here with `last_error` set
    Ready,
    /// The recorder is in flight; no second submit may be dispatched
    Submitting,
    /// Terminal success; no further mutation is permitted
    Signed { acceptance_id: AcceptanceId },
}

impl SessionState {
    pub fn is_ready(&self) -> bool {
        matches!(self, SessionState::Ready)
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, SessionState::Signed { .. })
    }
}

/// One-shot handle tying an identity fetch to the session that started it.
///
/// A token from an earlier epoch, or one presented after `close()`, is
/// ignored; a late-arriving fetch result can never mutate a torn-down or
/// re-initialized session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchToken {
    epoch: u64,
}

/// Result of completing the identity fetch
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Identity loaded; the form is now interactive
    Ready,
    /// No active session; the owning surface must redirect to authentication
    RedirectToLogin,
    /// Stale or post-teardown result; nothing changed
    Ignored,
}

/// Client-side navigation requested after a successful signature
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect {
    pub url: String,
    /// Wait this long so the success state is visibly shown first
    pub delay: Duration,
}

/// Result of a dispatched submission
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The acceptance was durably recorded
    Signed {
        acceptance_id: AcceptanceId,
        redirect: Option<Redirect>,
    },
    /// Nothing was saved; the form keeps its data and the user may retry
    Failed { message: String },
}

/// Rejected interactions, by state
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("identity is still loading")]
    StillLoading,
    #[error("a submission is already in flight")]
    AlreadySubmitting,
    #[error("the agreement has already been signed")]
    AlreadySigned,
    #[error("submission is blocked by validation")]
    ValidationBlocked,
}

type SuccessHook = Box<dyn Fn(&AcceptanceId) + Send + Sync>;
type ErrorHook = Box<dyn Fn(&str) + Send + Sync>;

/// Drives one signing interaction.
///
/// Each interaction is a freshly constructed instance with its own local
/// state; nothing is shared across concurrent signing sessions.
pub struct SigningSession {
    config: SigningConfig,
    state: SessionState,
    identity: Option<AuthenticatedIdentity>,
    form: SignerForm,
    capture: CaptureSelector,
    last_error: Option<String>,
    epoch: u64,
    closed: bool,
    on_success: Option<SuccessHook>,
    on_error: Option<ErrorHook>,
}

impl SigningSession {
    pub fn new(config: SigningConfig) -> Self {
        Self {
            config,
            state: SessionState::Loading,
            identity: None,
            form: SignerForm::default(),
            capture: CaptureSelector::new(),
            last_error: None,
            epoch: 0,
            closed: false,
            on_success: None,
            on_error: None,
        }
    }

    pub fn config(&self) -> &SigningConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn form(&self) -> &SignerForm {
        &self.form
    }

    pub fn identity(&self) -> Option<&AuthenticatedIdentity> {
        self.identity.as_ref()
    }

    /// Banner-level error from the last failed submit, if any
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    /// Hook invoked exactly once when the acceptance is durably recorded
    pub fn set_on_success(&mut self, hook: SuccessHook) {
        self.on_success = Some(hook);
    }

    /// Hook invoked once per failed submission with the display message
    pub fn set_on_error(&mut self, hook: ErrorHook) {
        self.on_error = Some(hook);
    }

    // --- Identity fetch (one-shot, guarded) ---

    /// Start the identity fetch. Invalidates any earlier token.
    pub fn begin_identity_fetch(&mut self) -> FetchToken {
        self.epoch += 1;
        FetchToken { epoch: self.epoch }
    }

    /// Apply the identity fetch result. Late results (stale token, closed
    /// session, or a session already past `Loading`) are ignored.
    pub fn complete_identity_fetch(
        &mut self,
        token: FetchToken,
        result: Result<Option<AuthenticatedIdentity>, IdentityError>,
    ) -> LoadOutcome {
        if self.closed || token.epoch != self.epoch || self.state != SessionState::Loading {
            return LoadOutcome::Ignored;
        }
        self.epoch += 1; // tokens are one-shot

        match result {
            Ok(Some(identity)) => {
                // Pre-fill from the session; still editable, still validated
                // against the same identity.
                self.form.signer_email = identity.email.clone();
                self.identity = Some(identity);
                self.state = SessionState::Ready;
                LoadOutcome::Ready
            }
            Ok(None) => LoadOutcome::RedirectToLogin,
            Err(err) => {
                warn!(error = %err, "identity fetch failed");
                LoadOutcome::RedirectToLogin
            }
        }
    }

    /// Tear the session down; any outstanding fetch result will be ignored
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Fetch the identity and transition in one call; the common path for
    /// callers that are not juggling their own executor teardown.
    pub async fn initialize(&mut self, provider: &dyn IdentityProvider) -> LoadOutcome {
        let token = self.begin_identity_fetch();
        let result = provider.current_user().await;
        self.complete_identity_fetch(token, result)
    }

    // --- Form interaction (Ready only) ---

    fn ensure_interactive(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Ready => Ok(()),
            SessionState::Loading => Err(SessionError::StillLoading),
            SessionState::Submitting => Err(SessionError::AlreadySubmitting),
            SessionState::Signed { .. } => Err(SessionError::AlreadySigned),
        }
    }

    pub fn set_signer_name(&mut self, name: impl Into<String>) -> Result<(), SessionError> {
        self.ensure_interactive()?;
        self.form.signer_name = name.into();
        Ok(())
    }

    pub fn set_signer_email(&mut self, email: impl Into<String>) -> Result<(), SessionError> {
        self.ensure_interactive()?;
        self.form.signer_email = email.into();
        Ok(())
    }

    pub fn set_acknowledged_terms(&mut self, acknowledged: bool) -> Result<(), SessionError> {
        self.ensure_interactive()?;
        self.form.acknowledged_terms = acknowledged;
        Ok(())
    }

    pub fn set_acknowledged_intent(&mut self, acknowledged: bool) -> Result<(), SessionError> {
        self.ensure_interactive()?;
        self.form.acknowledged_intent = acknowledged;
        Ok(())
    }

    /// The fixed legal acknowledgment the UI renders next to the intent
    /// checkbox; `set_acknowledged_intent(true)` attests to this exact text
    pub fn intent_statement(&self) -> &'static str {
        esign_types::INTENT_STATEMENT
    }

    /// Switch the active capture method. Resets only the outgoing method's
    /// payload, never the signer name/email fields.
    pub fn select_method(&mut self, method: SignatureMethod) -> Result<(), SessionError> {
        self.ensure_interactive()?;
        self.capture.select(method);
        Ok(())
    }

    pub fn active_method(&self) -> SignatureMethod {
        self.capture.active_method()
    }

    /// The capture selector, for wiring input events into the active strategy
    pub fn capture_mut(&mut self) -> Result<&mut CaptureSelector, SessionError> {
        self.ensure_interactive()?;
        Ok(&mut self.capture)
    }

    pub fn capture(&self) -> &CaptureSelector {
        &self.capture
    }

    // --- Validation ---

    /// Itemized submission rules against the current form state.
    /// `None` until the identity has loaded.
    pub fn validation(&self) -> Option<ValidationReport> {
        let identity = self.identity.as_ref()?;
        Some(validate(
            &self.form,
            &identity.email,
            self.capture.active_method(),
            self.capture.is_empty(),
        ))
    }

    pub fn can_submit(&self) -> bool {
        self.state.is_ready()
            && self
                .validation()
                .map(|report| report.can_submit())
                .unwrap_or(false)
    }

    // --- Submission ---

    /// Dispatch the acceptance to the recorder.
    ///
    /// Only valid from `Ready` with a clean validation report; at most one
    /// submission is in flight at a time. On failure every entered field is
    /// preserved and the session returns to `Ready` with `last_error` set.
    pub async fn submit(
        &mut self,
        recorder: &AcceptanceRecorder,
    ) -> Result<SubmitOutcome, SessionError> {
        self.ensure_interactive()?;
        if !self.can_submit() {
            return Err(SessionError::ValidationBlocked);
        }

        // can_submit() guarantees the active method's payload is complete
        // (the checkbox method always is), so serialization cannot fail here.
        let payload = self
            .capture
            .serialize()
            .map_err(|_| SessionError::ValidationBlocked)?;

        // Guaranteed by can_submit(), which requires a loaded identity.
        let identity = match self.identity.clone() {
            Some(identity) => identity,
            None => return Err(SessionError::StillLoading),
        };

        let mut draft = AcceptanceDraft::new(
            self.config.agreement_type.clone(),
            self.config.document_version.clone(),
            identity,
            self.form.signer_name.clone(),
            self.form.signer_email.clone(),
            payload,
        );
        draft.acceptance_context = self.config.acceptance_context;
        draft.program_id = self.config.program_id.clone();
        draft.tenant_id = self.config.tenant_id.clone();
        draft.organization_id = self.config.organization_id.clone();

        self.state = SessionState::Submitting;
        self.last_error = None;

        match recorder.record_acceptance(draft).await {
            Ok(acceptance_id) => {
                info!(
                    acceptance = %acceptance_id,
                    agreement = %self.config.agreement_type,
                    "signing session completed"
                );
                self.state = SessionState::Signed {
                    acceptance_id: acceptance_id.clone(),
                };
                if let Some(hook) = &self.on_success {
                    hook(&acceptance_id);
                }
                let redirect = self
                    .config
                    .redirect_on_success
                    .clone()
                    .map(|url| Redirect {
                        url,
                        delay: REDIRECT_DELAY,
                    });
                Ok(SubmitOutcome::Signed {
                    acceptance_id,
                    redirect,
                })
            }
            Err(err) => {
                let message = failure_message(&err);
                warn!(
                    agreement = %self.config.agreement_type,
                    error = %err,
                    "signing session submit failed"
                );
                // Back to Ready with everything the user entered intact
                self.state = SessionState::Ready;
                self.last_error = Some(message.clone());
                if let Some(hook) = &self.on_error {
                    hook(&message);
                }
                Ok(SubmitOutcome::Failed { message })
            }
        }
    }
}

/// Display message for a failed recording. Persistence detail stays out of
/// the banner; the user only needs to know nothing was saved.
fn failure_message(err: &RecorderError) -> String {
    match err {
        RecorderError::Persistence(_) => {
            "Could not save your signature. Nothing was recorded; please try again.".to_string()
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::StaticIdentityProvider;
    use esign_capture::Point;
    use esign_recorder::MemoryAcceptanceStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn jane() -> AuthenticatedIdentity {
        AuthenticatedIdentity::new("user-1", "jane@x.com")
    }

    fn config() -> SigningConfig {
        SigningConfig::new("enrollment_agreement", "2024-01")
    }

    async fn ready_session() -> SigningSession {
        let mut session = SigningSession::new(config());
        let provider = StaticIdentityProvider::signed_in(jane());
        assert_eq!(session.initialize(&provider).await, LoadOutcome::Ready);
        session
    }

    fn recorder_with_store() -> (AcceptanceRecorder, Arc<MemoryAcceptanceStore>) {
        let store = Arc::new(MemoryAcceptanceStore::new());
        (AcceptanceRecorder::new(store.clone()), store)
    }

    /// Fill the form with the Jane Doe typed-signature scenario
    fn fill_typed(session: &mut SigningSession) {
        session.set_signer_name("Jane Doe").unwrap();
        session.set_signer_email("JANE@X.COM").unwrap();
        session.set_acknowledged_terms(true).unwrap();
        session.set_acknowledged_intent(true).unwrap();
        session.select_method(SignatureMethod::Typed).unwrap();
        session.capture_mut().unwrap().typed_mut().set_text("Jane Doe");
    }

    #[tokio::test]
    async fn test_loading_to_ready_prefills_email() {
        let session = ready_session().await;
        assert!(session.state().is_ready());
        assert_eq!(session.form().signer_email, "jane@x.com");
        assert_eq!(session.identity().unwrap().user_id, "user-1");
    }

    #[tokio::test]
    async fn test_signed_out_redirects_to_login() {
        let mut session = SigningSession::new(config());
        let provider = StaticIdentityProvider::signed_out();
        assert_eq!(
            session.initialize(&provider).await,
            LoadOutcome::RedirectToLogin
        );
        assert_eq!(*session.state(), SessionState::Loading);
    }

    #[tokio::test]
    async fn test_identity_failure_redirects_to_login() {
        let mut session = SigningSession::new(config());
        let token = session.begin_identity_fetch();
        let outcome = session
            .complete_identity_fetch(token, Err(IdentityError::Unavailable("down".into())));
        assert_eq!(outcome, LoadOutcome::RedirectToLogin);
    }

    #[test]
    fn test_fetch_result_ignored_after_close() {
        let mut session = SigningSession::new(config());
        let token = session.begin_identity_fetch();
        session.close();

        let outcome = session.complete_identity_fetch(token, Ok(Some(jane())));
        assert_eq!(outcome, LoadOutcome::Ignored);
        assert_eq!(*session.state(), SessionState::Loading);
        assert!(session.identity().is_none());
    }

    #[test]
    fn test_stale_token_is_ignored() {
        let mut session = SigningSession::new(config());
        let stale = session.begin_identity_fetch();
        let fresh = session.begin_identity_fetch();

        assert_eq!(
            session.complete_identity_fetch(stale, Ok(Some(jane()))),
            LoadOutcome::Ignored
        );
        assert_eq!(
            session.complete_identity_fetch(fresh, Ok(Some(jane()))),
            LoadOutcome::Ready
        );
        // A token never applies twice
        assert_eq!(
            session.complete_identity_fetch(fresh, Ok(Some(jane()))),
            LoadOutcome::Ignored
        );
    }

    #[tokio::test]
    async fn test_submit_before_identity_loads() {
        let mut session = SigningSession::new(config());
        let (recorder, store) = recorder_with_store();

        assert_eq!(
            session.submit(&recorder).await,
            Err(SessionError::StillLoading)
        );
        assert_eq!(store.record_count(), 0);
    }

    #[tokio::test]
    async fn test_typed_happy_path() {
        let mut session = ready_session().await;
        let (recorder, store) = recorder_with_store();
        fill_typed(&mut session);

        let successes = Arc::new(AtomicUsize::new(0));
        let seen_id = Arc::new(Mutex::new(None::<AcceptanceId>));
        {
            let successes = successes.clone();
            let seen_id = seen_id.clone();
            session.set_on_success(Box::new(move |id| {
                successes.fetch_add(1, Ordering::SeqCst);
                *seen_id.lock().unwrap() = Some(id.clone());
            }));
        }

        assert!(session.can_submit());
        let outcome = session.submit(&recorder).await.unwrap();

        let acceptance_id = match outcome {
            SubmitOutcome::Signed {
                acceptance_id,
                redirect,
            } => {
                assert!(redirect.is_none());
                acceptance_id
            }
            other => panic!("unexpected outcome: {:?}", other),
        };

        assert!(session.state().is_signed());
        assert_eq!(successes.load(Ordering::SeqCst), 1);
        assert_eq!(seen_id.lock().unwrap().as_ref(), Some(&acceptance_id));

        // Case-insensitive match: the record carries what the signer typed
        let stored = &store.records()[0];
        assert_eq!(stored.record.signer_email, "JANE@X.COM");
        assert_eq!(stored.record.authenticated_email, "jane@x.com");
    }

    #[tokio::test]
    async fn test_email_mismatch_never_reaches_recorder() {
        let mut session = ready_session().await;
        let (recorder, store) = recorder_with_store();
        fill_typed(&mut session);
        session.set_signer_email("jane@y.com").unwrap();

        assert!(!session.can_submit());
        let report = session.validation().unwrap();
        assert!(report.has(esign_validator::ValidationIssue::EmailMismatch));

        assert_eq!(
            session.submit(&recorder).await,
            Err(SessionError::ValidationBlocked)
        );
        assert_eq!(store.record_count(), 0);
        assert!(session.state().is_ready());
    }

    #[tokio::test]
    async fn test_failed_submit_preserves_entered_data() {
        let mut session = ready_session().await;
        let (recorder, store) = recorder_with_store();
        fill_typed(&mut session);
        store.fail_with("database unreachable");

        let errors = Arc::new(AtomicUsize::new(0));
        {
            let errors = errors.clone();
            session.set_on_error(Box::new(move |_| {
                errors.fetch_add(1, Ordering::SeqCst);
            }));
        }

        let outcome = session.submit(&recorder).await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Failed { .. }));

        assert!(session.state().is_ready());
        assert!(session.last_error().unwrap().contains("try again"));
        assert_eq!(errors.load(Ordering::SeqCst), 1);

        // Everything the user entered survives the failure
        assert_eq!(session.form().signer_name, "Jane Doe");
        assert_eq!(session.form().signer_email, "JANE@X.COM");
        assert!(session.form().acknowledged_terms);
        assert!(session.form().acknowledged_intent);
        assert!(!session.capture().is_empty());

        // Retry succeeds once the store recovers
        store.recover();
        let outcome = session.submit(&recorder).await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Signed { .. }));
        assert!(session.last_error().is_none());
        assert_eq!(store.record_count(), 1);
    }

    #[tokio::test]
    async fn test_double_submit_is_rejected_in_flight() {
        let mut session = ready_session().await;
        let (recorder, store) = recorder_with_store();
        fill_typed(&mut session);

        session.state = SessionState::Submitting;
        assert_eq!(
            session.submit(&recorder).await,
            Err(SessionError::AlreadySubmitting)
        );
        assert_eq!(store.record_count(), 0);
    }

    #[tokio::test]
    async fn test_signed_is_terminal() {
        let mut session = ready_session().await;
        let (recorder, store) = recorder_with_store();
        fill_typed(&mut session);

        session.submit(&recorder).await.unwrap();
        assert!(session.state().is_signed());

        assert_eq!(
            session.set_signer_name("Someone Else"),
            Err(SessionError::AlreadySigned)
        );
        assert_eq!(
            session.select_method(SignatureMethod::Checkbox),
            Err(SessionError::AlreadySigned)
        );
        assert_eq!(
            session.submit(&recorder).await,
            Err(SessionError::AlreadySigned)
        );
        assert_eq!(store.record_count(), 1);
    }

    #[tokio::test]
    async fn test_method_switch_keeps_signer_fields() {
        let mut session = ready_session().await;
        fill_typed(&mut session);

        session.select_method(SignatureMethod::Drawn).unwrap();
        assert_eq!(session.form().signer_name, "Jane Doe");
        assert_eq!(session.form().signer_email, "JANE@X.COM");
        // But the typed payload is gone
        session.select_method(SignatureMethod::Typed).unwrap();
        assert!(session.capture().is_empty());
        assert!(!session.can_submit());
    }

    #[tokio::test]
    async fn test_drawn_requires_a_completed_stroke() {
        let mut session = ready_session().await;
        fill_typed(&mut session);
        session.select_method(SignatureMethod::Drawn).unwrap();
        assert!(!session.can_submit());

        let drawn = session.capture_mut().unwrap().drawn_mut();
        drawn.begin_stroke(Point::new(10.0, 10.0));
        drawn.extend_stroke(&[Point::new(60.0, 40.0)]);
        assert!(!session.can_submit());

        session.capture_mut().unwrap().drawn_mut().end_stroke();
        assert!(session.can_submit());
    }

    #[tokio::test]
    async fn test_redirect_carried_on_success() {
        let mut session = SigningSession::new(
            config().with_redirect_on_success("/dashboard"),
        );
        let provider = StaticIdentityProvider::signed_in(jane());
        session.initialize(&provider).await;
        fill_typed(&mut session);

        let (recorder, _store) = recorder_with_store();
        let outcome = session.submit(&recorder).await.unwrap();

        match outcome {
            SubmitOutcome::Signed { redirect, .. } => {
                let redirect = redirect.unwrap();
                assert_eq!(redirect.url, "/dashboard");
                assert_eq!(redirect.delay, REDIRECT_DELAY);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_config_coordinates_flow_into_record() {
        let mut session = SigningSession::new(
            SigningConfig::new("partner_agreement", "v3")
                .with_context(esign_types::AcceptanceContext::Checkout)
                .with_program_id("prog-7")
                .with_organization_id("org-9"),
        );
        let provider = StaticIdentityProvider::signed_in(jane());
        session.initialize(&provider).await;
        fill_typed(&mut session);

        let (recorder, store) = recorder_with_store();
        session.submit(&recorder).await.unwrap();

        let stored = &store.records()[0];
        assert_eq!(stored.record.agreement_type, "partner_agreement");
        assert_eq!(stored.record.document_version, "v3");
        assert_eq!(
            stored.record.acceptance_context,
            Some(esign_types::AcceptanceContext::Checkout)
        );
        assert_eq!(stored.record.program_id.as_deref(), Some("prog-7"));
        assert_eq!(stored.record.organization_id.as_deref(), Some("org-9"));
    }

    #[tokio::test]
    async fn test_checkbox_flow_needs_no_extra_input() {
        let mut session = ready_session().await;
        session.set_signer_name("Jane Doe").unwrap();
        assert_eq!(session.active_method(), SignatureMethod::Checkbox);
        assert!(!session.can_submit());

        // Once name/email/acknowledgments hold, a checkbox-method submission
        // is valid with no further input
        session.set_acknowledged_terms(true).unwrap();
        session.set_acknowledged_intent(true).unwrap();
        assert!(session.can_submit());

        let (recorder, store) = recorder_with_store();
        let outcome = session.submit(&recorder).await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Signed { .. }));

        let stored = &store.records()[0];
        assert_eq!(stored.record.signature_method, SignatureMethod::Checkbox);
        assert!(stored.record.signature_payload.is_none());
    }

    #[tokio::test]
    async fn test_intent_statement_is_rendered_text() {
        let session = ready_session().await;
        assert_eq!(session.intent_statement(), esign_types::INTENT_STATEMENT);
        assert!(session.intent_statement().contains("legally binding"));
    }

    #[tokio::test]
    async fn test_dismiss_error() {
        let mut session = ready_session().await;
        let (recorder, store) = recorder_with_store();
        fill_typed(&mut session);
        store.fail_with("outage");

        session.submit(&recorder).await.unwrap();
        assert!(session.last_error().is_some());

        session.dismiss_error();
        assert!(session.last_error().is_none());
    }
}
