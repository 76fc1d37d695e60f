//! Common test utilities and fixtures

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use ai_brief::auth::{AuthFlowError, AuthProvider};
use ai_brief::mail::{MailClient, MailTransport, TransportError};
use ai_brief::models::Message;

/// Encode a body the way Gmail serializes it (URL-safe base64, no padding).
pub fn encode_body(text: &str) -> String {
    URL_SAFE_NO_PAD.encode(text)
}

/// Raw Gmail message resource with a single text/plain part.
pub fn gmail_message_json(
    id: &str,
    from: &str,
    subject: &str,
    date_rfc2822: &str,
    body: &str,
) -> Value {
    json!({
        "id": id,
        "threadId": format!("thread_{}", id),
        "payload": {
            "mimeType": "multipart/alternative",
            "headers": [
                {"name": "From", "value": from},
                {"name": "Subject", "value": subject},
                {"name": "Date", "value": date_rfc2822}
            ],
            "parts": [
                {"mimeType": "text/plain", "body": {"data": encode_body(body)}}
            ]
        }
    })
}

/// An in-memory [`Message`] for filter and generator tests.
pub fn message_dated(id: &str, from: &str, date: DateTime<Utc>) -> Message {
    Message {
        id: id.to_string(),
        from: from.to_string(),
        subject: format!("Subject {}", id),
        date,
        body: format!("Body of {}", id),
    }
}

enum FakeAuthOutcome {
    Token(String),
    Fail(AuthFlowError),
}

/// Auth provider with a scripted readiness flag and token outcome. Revoked
/// tokens are pushed to the shared log so tests can observe sign-out.
pub struct FakeAuthProvider {
    ready: bool,
    outcome: FakeAuthOutcome,
    revoked: Arc<Mutex<Vec<String>>>,
}

impl FakeAuthProvider {
    pub fn ok() -> Self {
        Self {
            ready: true,
            outcome: FakeAuthOutcome::Token("test-token".to_string()),
            revoked: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(err: AuthFlowError) -> Self {
        Self {
            ready: true,
            outcome: FakeAuthOutcome::Fail(err),
            revoked: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn not_ready() -> Self {
        Self {
            ready: false,
            ..Self::ok()
        }
    }

    /// Handle onto the revocation log; survives moving the provider into a
    /// [`MailClient`].
    pub fn revocation_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.revoked)
    }
}

#[async_trait]
impl AuthProvider for FakeAuthProvider {
    fn is_ready(&self) -> bool {
        self.ready
    }

    async fn request_token(&self, _client_id: &str) -> Result<String, AuthFlowError> {
        match &self.outcome {
            FakeAuthOutcome::Token(token) => Ok(token.clone()),
            FakeAuthOutcome::Fail(err) => Err(err.clone()),
        }
    }

    async fn revoke_token(&self, token: &str) -> Result<(), AuthFlowError> {
        self.revoked.lock().unwrap().push(token.to_string());
        Ok(())
    }
}

/// Transport serving canned message resources, with optional scripted HTTP
/// failures for either endpoint.
pub struct FakeTransport {
    messages: Vec<(String, Value)>,
    list_status: Option<u16>,
    get_status: Option<u16>,
}

impl FakeTransport {
    pub fn with_messages(messages: Vec<(String, Value)>) -> Self {
        Self {
            messages,
            list_status: None,
            get_status: None,
        }
    }

    pub fn empty() -> Self {
        Self::with_messages(Vec::new())
    }

    pub fn failing_list(status: u16) -> Self {
        Self {
            list_status: Some(status),
            ..Self::empty()
        }
    }

    pub fn fail_get(mut self, status: u16) -> Self {
        self.get_status = Some(status);
        self
    }
}

#[async_trait]
impl MailTransport for FakeTransport {
    async fn list_message_ids(
        &self,
        _token: &str,
        _query: &str,
        max_results: u32,
    ) -> Result<Vec<String>, TransportError> {
        if let Some(status) = self.list_status {
            return Err(TransportError::Status(status));
        }
        Ok(self
            .messages
            .iter()
            .take(max_results as usize)
            .map(|(id, _)| id.clone())
            .collect())
    }

    async fn get_message(&self, _token: &str, id: &str) -> Result<Value, TransportError> {
        if let Some(status) = self.get_status {
            return Err(TransportError::Status(status));
        }
        self.messages
            .iter()
            .find(|(message_id, _)| message_id == id)
            .map(|(_, detail)| detail.clone())
            .ok_or_else(|| TransportError::Network(format!("unknown message {}", id)))
    }
}

/// A mail client that has already completed initialize + sign-in against the
/// fake provider.
pub async fn signed_in_client(transport: FakeTransport) -> MailClient {
    let mut client = MailClient::new(Box::new(FakeAuthProvider::ok()), Box::new(transport));
    client.initialize("client-id").await.unwrap();
    client.sign_in().await.unwrap();
    client
}
