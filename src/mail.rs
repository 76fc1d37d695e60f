//! Mail provider adapter: REST transport, session lifecycle, newsletter retrieval

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use futures::future;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::auth::{AuthFlowError, AuthProvider};
use crate::error::{BriefError, Result};
use crate::models::Message;

/// Subject query used to find newsletter mail.
pub const NEWSLETTER_QUERY: &str =
    r#"(subject:(AI "Artificial Intelligence" "Machine Learning" "newsletter"))"#;

/// Search result cap for one fetch.
pub const MAX_RESULTS: u32 = 50;

const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";

/// Delay before the single retry when the auth provider is not ready yet.
const PROVIDER_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Transport-level failure, kept separate from [`BriefError`] so the adapter
/// can translate a 401 into a local sign-out before surfacing it.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Gmail API returned HTTP {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Network(err.to_string())
    }
}

/// Capability over the mail provider's REST surface.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Search for message ids matching `query`, at most `max_results` of them.
    async fn list_message_ids(
        &self,
        token: &str,
        query: &str,
        max_results: u32,
    ) -> std::result::Result<Vec<String>, TransportError>;

    /// Retrieve the full message resource for one id.
    async fn get_message(&self, token: &str, id: &str)
        -> std::result::Result<Value, TransportError>;
}

/// Production transport against the Gmail REST API.
pub struct HttpMailTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpMailTransport {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_url(http, GMAIL_API_BASE)
    }

    /// Point the transport at a different base URL; tests run it against a
    /// local mock server.
    pub fn with_base_url(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl MailTransport for HttpMailTransport {
    async fn list_message_ids(
        &self,
        token: &str,
        query: &str,
        max_results: u32,
    ) -> std::result::Result<Vec<String>, TransportError> {
        let url = format!("{}/users/me/messages", self.base_url);
        let max_results = max_results.to_string();

        let response = self
            .http
            .get(&url)
            .query(&[("q", query), ("maxResults", max_results.as_str())])
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TransportError::Status(response.status().as_u16()));
        }

        let body: Value = response.json().await?;
        let ids = body["messages"]
            .as_array()
            .map(|messages| {
                messages
                    .iter()
                    .filter_map(|m| m["id"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();
        Ok(ids)
    }

    async fn get_message(
        &self,
        token: &str,
        id: &str,
    ) -> std::result::Result<Value, TransportError> {
        let url = format!("{}/users/me/messages/{}", self.base_url, id);

        let response = self.http.get(&url).bearer_auth(token).send().await?;
        if !response.status().is_success() {
            return Err(TransportError::Status(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }
}

/// Lifecycle of the provider session. The access token only exists in the
/// `Authenticated` state, so "signed in but never initialized" cannot be
/// expressed.
#[derive(Debug, Clone)]
enum Session {
    Uninitialized,
    Ready { client_id: String },
    Authenticated { client_id: String, token: String },
}

/// Adapter owning all interaction with the mail provider.
pub struct MailClient {
    provider: Box<dyn AuthProvider>,
    transport: Box<dyn MailTransport>,
    session: Session,
}

impl MailClient {
    pub fn new(provider: Box<dyn AuthProvider>, transport: Box<dyn MailTransport>) -> Self {
        Self {
            provider,
            transport,
            session: Session::Uninitialized,
        }
    }

    /// Register the OAuth client id for later sign-in. Safe to call again; an
    /// already-authenticated session keeps its token.
    pub async fn initialize(&mut self, client_id: &str) -> Result<()> {
        if client_id.trim().is_empty() {
            return Err(BriefError::Config(
                "Google client id is missing".to_string(),
            ));
        }

        if !self.provider.is_ready() {
            // The identity provider may still be loading; give it one more chance.
            tokio::time::sleep(PROVIDER_RETRY_DELAY).await;
            if !self.provider.is_ready() {
                return Err(BriefError::LibraryUnavailable);
            }
        }

        let client_id = client_id.to_string();
        self.session = match std::mem::replace(&mut self.session, Session::Uninitialized) {
            Session::Authenticated { token, .. } => Session::Authenticated { client_id, token },
            _ => Session::Ready { client_id },
        };
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.session, Session::Authenticated { .. })
    }

    /// Run the consent flow. Resolves at a single point with a token or one
    /// of the three mapped sign-in failures.
    pub async fn sign_in(&mut self) -> Result<()> {
        let client_id = match &self.session {
            Session::Uninitialized => {
                return Err(BriefError::NotInitialized("Authentication client"))
            }
            Session::Ready { client_id } | Session::Authenticated { client_id, .. } => {
                client_id.clone()
            }
        };

        let token = self
            .provider
            .request_token(&client_id)
            .await
            .map_err(|e| match e {
                AuthFlowError::Denied => BriefError::AuthDenied,
                AuthFlowError::Misconfigured(detail) => BriefError::AuthMisconfigured(detail),
                AuthFlowError::Failed(detail) => BriefError::AuthFailed(detail),
            })?;

        info!("Sign-in complete; mail session is ready");
        self.session = Session::Authenticated { client_id, token };
        Ok(())
    }

    /// Drop the session token, revoking it with the provider when possible.
    /// Never fails; revocation problems are only logged.
    pub async fn sign_out(&mut self) {
        match std::mem::replace(&mut self.session, Session::Uninitialized) {
            Session::Authenticated { client_id, token } => {
                if let Err(e) = self.provider.revoke_token(&token).await {
                    warn!("Token revocation failed: {:?}", e);
                }
                info!("Signed out of the mail session");
                self.session = Session::Ready { client_id };
            }
            other => self.session = other,
        }
    }

    /// Retrieve recent newsletter messages: subject search capped at
    /// [`MAX_RESULTS`], a joint detail fetch for every hit, then header
    /// extraction and body decoding.
    pub async fn fetch_recent_newsletters(&mut self) -> Result<Vec<Message>> {
        let token = match &self.session {
            Session::Authenticated { token, .. } => token.clone(),
            _ => return Err(BriefError::NotInitialized("Mail session")),
        };

        match self.fetch_with_token(&token).await {
            Ok(messages) => Ok(messages),
            Err(TransportError::Status(401)) => {
                // The provider no longer accepts our token; clear it locally
                // before surfacing the failure.
                self.sign_out().await;
                Err(BriefError::AuthExpired)
            }
            Err(e) => Err(BriefError::FetchFailed(e.to_string())),
        }
    }

    async fn fetch_with_token(
        &self,
        token: &str,
    ) -> std::result::Result<Vec<Message>, TransportError> {
        let ids = self
            .transport
            .list_message_ids(token, NEWSLETTER_QUERY, MAX_RESULTS)
            .await?;

        if ids.is_empty() {
            info!("No newsletter messages matched the subject query");
            return Ok(Vec::new());
        }
        debug!("Fetching details for {} messages", ids.len());

        // All detail requests go out together; one failure fails the fetch.
        let details = future::try_join_all(
            ids.iter().map(|id| self.transport.get_message(token, id)),
        )
        .await?;

        let now = Utc::now();
        let messages: Vec<Message> = details
            .iter()
            .filter_map(|detail| parse_message(detail, now))
            .collect();

        info!("Parsed {} newsletter messages with usable bodies", messages.len());
        Ok(messages)
    }
}

/// Build a [`Message`] from a raw Gmail message resource. Returns `None` when
/// no body could be decoded; such messages are dropped, never fatal.
fn parse_message(detail: &Value, now: DateTime<Utc>) -> Option<Message> {
    let id = detail["id"].as_str().unwrap_or_default().to_string();
    let payload = &detail["payload"];
    let headers = payload["headers"].as_array().map(Vec::as_slice).unwrap_or(&[]);

    let from = header_value(headers, "From").unwrap_or_else(|| "Unknown Sender".to_string());
    let subject = header_value(headers, "Subject").unwrap_or_else(|| "No Subject".to_string());
    let date = match header_value(headers, "Date").as_deref().and_then(parse_email_date) {
        Some(date) => date,
        None => {
            warn!("Message {} has no parsable Date header; defaulting to now", id);
            now
        }
    };

    let body = extract_body(payload).unwrap_or_default();
    if body.is_empty() {
        debug!("Dropping message {}: no decodable body", id);
        return None;
    }

    Some(Message {
        id,
        from,
        subject,
        date,
        body,
    })
}

/// Find a header by exact name match, the way the provider serializes them.
fn header_value(headers: &[Value], name: &str) -> Option<String> {
    headers
        .iter()
        .find(|h| h["name"].as_str() == Some(name))
        .and_then(|h| h["value"].as_str().map(String::from))
}

/// Body preference: first `text/plain` part, then first `text/html` part,
/// then a body attached directly to the top-level payload.
fn extract_body(payload: &Value) -> Option<String> {
    let data = part_data(payload, "text/plain")
        .or_else(|| part_data(payload, "text/html"))
        .or_else(|| payload["body"]["data"].as_str())?;
    decode_body(data)
}

fn part_data<'a>(payload: &'a Value, mime_type: &str) -> Option<&'a str> {
    payload["parts"]
        .as_array()?
        .iter()
        .find(|part| part["mimeType"].as_str() == Some(mime_type))
        .and_then(|part| part["body"]["data"].as_str())
}

/// Decode the provider's URL-safe base64 body encoding. Failures are logged
/// and produce `None` so a single bad message cannot poison the batch.
fn decode_body(data: &str) -> Option<String> {
    let mut translated = data.replace('-', "+").replace('_', "/");
    while translated.len() % 4 != 0 {
        translated.push('=');
    }

    match STANDARD.decode(&translated) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Decoded body is not valid UTF-8: {}", e);
                None
            }
        },
        Err(e) => {
            warn!("Failed to decode base64 body: {}", e);
            None
        }
    }
}

/// Parse a Date header, RFC 2822 first then RFC 3339.
fn parse_email_date(date_str: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(date_str)
        .or_else(|_| DateTime::parse_from_rfc3339(date_str))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
