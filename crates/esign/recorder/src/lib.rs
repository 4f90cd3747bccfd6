//! Esign Recorder - packages acceptance records and persists them
//!
//! The recorder is the only place an `AcceptanceRecord` is constructed. It
//! re-checks the email-match invariant defensively, makes exactly one
//! persistence attempt per user-initiated submit, and either returns the
//! durable identifier or surfaces the failure with nothing written.

#![deny(unsafe_code)]

mod persistence;
mod recorder;

pub use persistence::{
    MemoryAcceptanceStore, PersistenceError, PersistenceService, StoredAcceptance,
};
pub use recorder::{AcceptanceDraft, AcceptanceRecorder, RecorderError};
