//! Implements SessionPort from configuration.
//!
//! Real deployments plug a session/auth service in here; this stand-in
//! resolves the acting user from LUNCHVOTE_USER_ID.

use crate::domain::{EngineError, UserId};
use crate::ports::SessionPort;

/// Config-backed session. Holds the one user this process acts as.
pub struct EnvSession {
    user_id: Option<UserId>,
}

impl EnvSession {
    pub fn new(user_id: Option<UserId>) -> Self {
        Self { user_id }
    }
}

#[async_trait::async_trait]
impl SessionPort for EnvSession {
    async fn current_user_id(&self) -> Result<UserId, EngineError> {
        self.user_id.ok_or_else(|| {
            EngineError::Auth("no session user configured (set LUNCHVOTE_USER_ID)".into())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_configured_user() {
        let session = EnvSession::new(Some(42));
        assert_eq!(session.current_user_id().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn missing_user_is_an_auth_error() {
        let session = EnvSession::new(None);
        assert!(matches!(
            session.current_user_id().await.unwrap_err(),
            EngineError::Auth(_)
        ));
    }
}
