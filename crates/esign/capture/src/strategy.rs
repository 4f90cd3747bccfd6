//! The common capture contract, plus the checkbox and typed strategies

use esign_types::{SignatureMethod, SignaturePayload};
use thiserror::Error;

/// Errors produced by capture serialization
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CaptureError {
    /// Serialize was called on a drawn canvas with no completed stroke
    #[error("cannot serialize an empty signature canvas")]
    EmptyCanvas,
    /// Serialize was called on a blank typed signature
    #[error("typed signature is empty")]
    EmptySignature,
}

/// One interchangeable capture mechanism.
///
/// Callers must check `is_empty()` before `serialize()`; serializing an
/// empty capture is an error condition the controller never triggers.
pub trait CaptureStrategy {
    /// The method this strategy captures
    fn method(&self) -> SignatureMethod;

    /// Discard any in-progress payload
    fn reset(&mut self);

    /// True until the strategy holds a complete payload
    fn is_empty(&self) -> bool;

    /// Produce the normalized signature payload
    fn serialize(&self) -> Result<SignaturePayload, CaptureError>;
}

/// Checkbox strategy: the assent bit itself is the signature.
///
/// The payload is always complete for this method; the acknowledgment flags
/// carry the assent, so `serialize` never fails. The mirrored bit exists so
/// a UI that renders an explicit signature checkbox can reflect its state.
#[derive(Clone, Debug, Default)]
pub struct CheckboxCapture {
    checked: bool,
}

impl CheckboxCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }
}

impl CaptureStrategy for CheckboxCapture {
    fn method(&self) -> SignatureMethod {
        SignatureMethod::Checkbox
    }

    fn reset(&mut self) {
        self.checked = false;
    }

    fn is_empty(&self) -> bool {
        !self.checked
    }

    fn serialize(&self) -> Result<SignaturePayload, CaptureError> {
        Ok(SignaturePayload::Checkbox)
    }
}

/// Typed strategy: a single text field holding the signer's typed name
#[derive(Clone, Debug, Default)]
pub struct TypedCapture {
    text: String,
}

impl TypedCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl CaptureStrategy for TypedCapture {
    fn method(&self) -> SignatureMethod {
        SignatureMethod::Typed
    }

    fn reset(&mut self) {
        self.text.clear();
    }

    fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    fn serialize(&self) -> Result<SignaturePayload, CaptureError> {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            return Err(CaptureError::EmptySignature);
        }
        Ok(SignaturePayload::Typed {
            signature: trimmed.to_string(),
        })
    }
}
