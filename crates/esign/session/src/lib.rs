//! Esign Session - the signing interaction state machine
//!
//! Drives one signing interaction from identity load through capture,
//! validation, and recording. The machine is a plain struct with explicit
//! transition methods, independent of any rendering framework: the UI layer
//! feeds events in and renders the state it reads back out.
//!
//! States: `Loading -> Ready -> Submitting -> Signed`, with failed submits
//! returning to `Ready` carrying an error and all entered data intact.

#![deny(unsafe_code)]

mod config;
mod identity;
mod session;

pub use config::{SigningConfig, REDIRECT_DELAY};
pub use identity::{IdentityError, IdentityProvider, StaticIdentityProvider};
pub use session::{
    FetchToken, LoadOutcome, Redirect, SessionError, SessionState, SigningSession, SubmitOutcome,
};
