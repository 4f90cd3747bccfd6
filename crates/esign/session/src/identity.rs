//! Identity provider collaborator
//!
//! The session fetches the authenticated identity exactly once on entry and
//! treats it as an immutable snapshot for the interaction's duration.

use async_trait::async_trait;
use esign_types::AuthenticatedIdentity;
use thiserror::Error;

/// Failures from the identity collaborator
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Trait for identity providers.
///
/// `Ok(None)` signals no active session; the owning surface redirects to
/// authentication, which is outside the signing core's responsibility.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user(&self) -> Result<Option<AuthenticatedIdentity>, IdentityError>;
}

/// Fixed-answer identity provider for tests and demos
pub struct StaticIdentityProvider {
    identity: Option<AuthenticatedIdentity>,
}

impl StaticIdentityProvider {
    /// Provider that reports `identity` as the signed-in user
    pub fn signed_in(identity: AuthenticatedIdentity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    /// Provider that reports no active session
    pub fn signed_out() -> Self {
        Self { identity: None }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn current_user(&self) -> Result<Option<AuthenticatedIdentity>, IdentityError> {
        Ok(self.identity.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_signed_in_provider() {
        let provider =
            StaticIdentityProvider::signed_in(AuthenticatedIdentity::new("user-1", "jane@x.com"));
        let user = provider.current_user().await.unwrap().unwrap();
        assert_eq!(user.email, "jane@x.com");
    }

    #[tokio::test]
    async fn test_signed_out_provider() {
        let provider = StaticIdentityProvider::signed_out();
        assert_eq!(provider.current_user().await.unwrap(), None);
    }
}
