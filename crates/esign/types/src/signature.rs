//! Signature methods and payloads
//!
//! Exactly one method is active per signing session. The payload is a tagged
//! union keyed by the method, so a checkbox assent can never be confused with
//! a drawn signature at the type level.

use serde::{Deserialize, Serialize};

/// The fixed legal acknowledgment the signer must separately affirm,
/// distinct from agreeing to the underlying document.
pub const INTENT_STATEMENT: &str = "By signing below, I acknowledge that I have read, \
understand, and agree to be bound by the terms of this agreement. I understand this \
constitutes a legally binding electronic signature under the Electronic Signatures in \
Global and National Commerce Act (E-SIGN Act) and the Uniform Electronic Transactions \
Act (UETA).";

/// How the signer expressed assent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureMethod {
    /// Assent is the checkbox state itself; no additional payload
    Checkbox,
    /// The signer typed their name as a signature
    Typed,
    /// The signer drew a freehand signature
    Drawn,
}

impl SignatureMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureMethod::Checkbox => "checkbox",
            SignatureMethod::Typed => "typed",
            SignatureMethod::Drawn => "drawn",
        }
    }
}

impl std::fmt::Display for SignatureMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The normalized signature produced by a capture strategy
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SignaturePayload {
    /// Unit payload; the checkbox bit carries the assent
    Checkbox,
    /// The signer's typed name, trimmed and non-empty
    Typed { signature: String },
    /// A raster image encoding of the completed ink strokes, as a data URL
    Drawn { image: String },
}

impl SignaturePayload {
    /// The method this payload belongs to
    pub fn method(&self) -> SignatureMethod {
        match self {
            SignaturePayload::Checkbox => SignatureMethod::Checkbox,
            SignaturePayload::Typed { .. } => SignatureMethod::Typed,
            SignaturePayload::Drawn { .. } => SignatureMethod::Drawn,
        }
    }
}
