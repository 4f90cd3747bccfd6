//! Esign Types - shared data model for the agreement acceptance core
//!
//! An agreement acceptance is a legally meaningful artifact: it binds a
//! signer's asserted identity to a specific document version, together with
//! the signature payload and collaborator-supplied audit metadata. These
//! types are shared by the capture, validation, recording, and session
//! crates.

#![deny(unsafe_code)]

mod acceptance;
mod signature;

pub use acceptance::{
    AcceptanceContext, AcceptanceId, AcceptanceRecord, AuditStamp, AuthenticatedIdentity,
};
pub use signature::{SignatureMethod, SignaturePayload, INTENT_STATEMENT};
