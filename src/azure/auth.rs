//! Azure Authentication
//!
//! Holds the bearer token used for management API calls. Acquiring the token
//! (service principal, managed identity, `az login`) happens outside this
//! crate; the token is handed in through the environment or the constructor.

use std::sync::Arc;
use tokio::sync::RwLock;

/// Environment variables checked for an access token, in order
pub const TOKEN_ENV_VARS: &[&str] = &["ARM_ACCESS_TOKEN", "AZURE_ACCESS_TOKEN"];

/// Bearer token holder shared between clones of a client
#[derive(Clone)]
pub struct AzureCredentials {
    token: Arc<RwLock<String>>,
}

impl AzureCredentials {
    /// Wrap an already acquired access token
    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            token: Arc::new(RwLock::new(token.into())),
        }
    }

    /// Read the token from the first non-empty variable in [`TOKEN_ENV_VARS`]
    pub fn from_env() -> Option<Self> {
        TOKEN_ENV_VARS.iter().find_map(|name| {
            std::env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(|v| {
                    tracing::debug!("Using access token from {}", name);
                    Self::from_token(v)
                })
        })
    }

    /// Get the current access token
    pub async fn get_token(&self) -> String {
        self.token.read().await.clone()
    }
}

impl std::fmt::Debug for AzureCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureCredentials")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clones_share_token() {
        let creds = AzureCredentials::from_token("first");
        let clone = creds.clone();
        drop(creds);
        assert_eq!(clone.get_token().await, "first");
    }

    #[test]
    fn test_debug_redacts_token() {
        let creds = AzureCredentials::from_token("super-secret");
        assert!(!format!("{creds:?}").contains("super-secret"));
    }
}
