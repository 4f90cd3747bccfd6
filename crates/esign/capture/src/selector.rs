//! Capture method selection
//!
//! Owns one instance of each strategy and tracks which is active. Switching
//! methods resets the outgoing strategy so a stale payload cannot leak into
//! a later submission under a different method.

use crate::drawn::DrawnCapture;
use crate::strategy::{CaptureError, CaptureStrategy, CheckboxCapture, TypedCapture};
use esign_types::{SignatureMethod, SignaturePayload};

/// Holds all three capture strategies plus the active method
#[derive(Clone, Debug)]
pub struct CaptureSelector {
    active: SignatureMethod,
    checkbox: CheckboxCapture,
    typed: TypedCapture,
    drawn: DrawnCapture,
}

impl CaptureSelector {
    /// Checkbox is the initial method, matching the embedding surface default
    pub fn new() -> Self {
        Self {
            active: SignatureMethod::Checkbox,
            checkbox: CheckboxCapture::new(),
            typed: TypedCapture::new(),
            drawn: DrawnCapture::new(),
        }
    }

    pub fn active_method(&self) -> SignatureMethod {
        self.active
    }

    /// Switch the active method, resetting the outgoing strategy.
    /// Selecting the already-active method keeps its payload.
    pub fn select(&mut self, method: SignatureMethod) {
        if method == self.active {
            return;
        }
        self.active_strategy_mut().reset();
        self.active = method;
    }

    /// The active strategy, for `is_empty` / `serialize` queries
    pub fn active_strategy(&self) -> &dyn CaptureStrategy {
        match self.active {
            SignatureMethod::Checkbox => &self.checkbox,
            SignatureMethod::Typed => &self.typed,
            SignatureMethod::Drawn => &self.drawn,
        }
    }

    fn active_strategy_mut(&mut self) -> &mut dyn CaptureStrategy {
        match self.active {
            SignatureMethod::Checkbox => &mut self.checkbox,
            SignatureMethod::Typed => &mut self.typed,
            SignatureMethod::Drawn => &mut self.drawn,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.active_strategy().is_empty()
    }

    pub fn serialize(&self) -> Result<SignaturePayload, CaptureError> {
        self.active_strategy().serialize()
    }

    // Event wiring accessors; the UI layer feeds input into these directly.

    pub fn checkbox_mut(&mut self) -> &mut CheckboxCapture {
        &mut self.checkbox
    }

    pub fn typed_mut(&mut self) -> &mut TypedCapture {
        &mut self.typed
    }

    pub fn drawn_mut(&mut self) -> &mut DrawnCapture {
        &mut self.drawn
    }
}

impl Default for CaptureSelector {
    fn default() -> Self {
        Self::new()
    }
}
