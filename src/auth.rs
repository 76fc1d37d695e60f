//! Sign-in capability for the mail provider

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;
use yup_oauth2::{ApplicationSecret, InstalledFlowAuthenticator, InstalledFlowReturnMethod};

/// Read-only mail scope requested at sign-in.
pub const GMAIL_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";

const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_REVOKE_URI: &str = "https://oauth2.googleapis.com/revoke";

/// Why a token request did not produce a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFlowError {
    /// Client id or redirect configuration rejected by the provider.
    Misconfigured(String),
    /// The user declined the consent prompt.
    Denied,
    /// Anything else: network failure, provider outage, malformed response.
    Failed(String),
}

/// Capability that turns a client id into an access token, and back.
///
/// Injected into [`crate::mail::MailClient`] so the adapter can be exercised
/// without a browser or a live Google endpoint.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Whether the provider has loaded and can take token requests.
    fn is_ready(&self) -> bool {
        true
    }

    /// Run the consent flow and resolve once with an access token.
    async fn request_token(&self, client_id: &str) -> std::result::Result<String, AuthFlowError>;

    /// Invalidate a previously issued token with the provider.
    async fn revoke_token(&self, token: &str) -> std::result::Result<(), AuthFlowError>;
}

/// Production provider: `yup-oauth2` installed flow with a local redirect
/// listener. The consent screen opens in the user's browser and the flow
/// resolves when the redirect comes back.
pub struct InstalledFlowAuth {
    http: reqwest::Client,
    token_cache: PathBuf,
}

impl InstalledFlowAuth {
    pub fn new(http: reqwest::Client, token_cache: PathBuf) -> Self {
        Self { http, token_cache }
    }

    fn application_secret(client_id: &str) -> ApplicationSecret {
        // Public OAuth client: only the id is configured, the secret stays empty.
        ApplicationSecret {
            client_id: client_id.to_string(),
            auth_uri: GOOGLE_AUTH_URI.to_string(),
            token_uri: GOOGLE_TOKEN_URI.to_string(),
            redirect_uris: vec!["http://localhost:8080".to_string()],
            ..Default::default()
        }
    }
}

#[async_trait]
impl AuthProvider for InstalledFlowAuth {
    async fn request_token(&self, client_id: &str) -> std::result::Result<String, AuthFlowError> {
        let secret = Self::application_secret(client_id);

        let auth = InstalledFlowAuthenticator::builder(secret, InstalledFlowReturnMethod::HTTPRedirect)
            .persist_tokens_to_disk(self.token_cache.clone())
            .build()
            .await
            .map_err(|e| AuthFlowError::Failed(format!("Failed to build authenticator: {}", e)))?;

        let token = auth
            .token(&[GMAIL_READONLY_SCOPE])
            .await
            .map_err(|e| classify_provider_error(&e.to_string()))?;

        token
            .token()
            .map(str::to_string)
            .ok_or_else(|| AuthFlowError::Failed("token response carried no access token".to_string()))
    }

    async fn revoke_token(&self, token: &str) -> std::result::Result<(), AuthFlowError> {
        self.http
            .post(GOOGLE_REVOKE_URI)
            .form(&[("token", token)])
            .send()
            .await
            .map_err(|e| AuthFlowError::Failed(e.to_string()))?
            .error_for_status()
            .map_err(|e| AuthFlowError::Failed(e.to_string()))?;

        info!("Revoked access token with the provider");
        Ok(())
    }
}

/// Map the provider's error text onto the three user-visible causes.
fn classify_provider_error(detail: &str) -> AuthFlowError {
    let lower = detail.to_ascii_lowercase();
    if lower.contains("access_denied") {
        AuthFlowError::Denied
    } else if lower.contains("redirect_uri_mismatch")
        || lower.contains("invalid_request")
        || lower.contains("invalid_client")
    {
        AuthFlowError::Misconfigured(detail.to_string())
    } else {
        AuthFlowError::Failed(detail.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_denied() {
        assert_eq!(
            classify_provider_error("oauth error: access_denied"),
            AuthFlowError::Denied
        );
    }

    #[test]
    fn test_classify_misconfigured() {
        assert!(matches!(
            classify_provider_error("redirect_uri_mismatch for http://localhost"),
            AuthFlowError::Misconfigured(_)
        ));
        assert!(matches!(
            classify_provider_error("invalid_client: Unauthorized"),
            AuthFlowError::Misconfigured(_)
        ));
    }

    #[test]
    fn test_classify_generic() {
        assert!(matches!(
            classify_provider_error("connection reset by peer"),
            AuthFlowError::Failed(_)
        ));
    }

    #[test]
    fn test_application_secret_uses_google_endpoints() {
        let secret = InstalledFlowAuth::application_secret("client-123");
        assert_eq!(secret.client_id, "client-123");
        assert!(secret.client_secret.is_empty());
        assert_eq!(secret.token_uri, GOOGLE_TOKEN_URI);
    }
}
