//! Daily AI Brief
//!
//! A pipeline that signs into Gmail, pulls recent AI-newsletter messages,
//! sends their text to the Gemini generative-language service, and produces a
//! structured brief: top headlines, tools to try, tips to try, quick stats.
//!
//! # Overview
//!
//! - **Authentication**: OAuth2 installed flow with token caching, behind an
//!   injectable [`auth::AuthProvider`] capability
//! - **Mail retrieval**: subject search plus a joint batched detail fetch and
//!   body decoding, behind an injectable [`mail::MailTransport`] capability
//! - **Generation**: one structured-output call with a strict response schema
//! - **Orchestration**: a single state machine exposed to the presentation
//!   layer, with a demo track that uses deterministic canned data
//!
//! # Example Usage
//!
//! ```no_run
//! use ai_brief::auth::InstalledFlowAuth;
//! use ai_brief::config::AppConfig;
//! use ai_brief::generator::GeminiGenerator;
//! use ai_brief::mail::{HttpMailTransport, MailClient};
//! use ai_brief::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() {
//!     let http = reqwest::Client::new();
//!     let mail = MailClient::new(
//!         Box::new(InstalledFlowAuth::new(http.clone(), ".ai-brief/token.json".into())),
//!         Box::new(HttpMailTransport::new(http.clone())),
//!     );
//!     let generator = GeminiGenerator::new(http);
//!
//!     let mut pipeline = Pipeline::new(mail, generator, AppConfig::default_path());
//!     pipeline.startup().await;
//!     pipeline.sign_in().await;
//!     let state = pipeline.generate_brief().await;
//!     println!("{:?}", state);
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`auth`] - sign-in capability and the production OAuth2 installed flow
//! - [`cli`] - command-line interface and brief rendering
//! - [`config`] - persisted application configuration
//! - [`demo`] - deterministic stand-ins for the adapter and the generator
//! - [`error`] - error taxonomy and result alias
//! - [`generator`] - structured brief generation via Gemini
//! - [`mail`] - mail transport and the provider session adapter
//! - [`models`] - core data structures
//! - [`pipeline`] - the orchestrating state machine
//! - [`urls`] - tracking-parameter cleanup and display hostnames

pub mod auth;
pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
pub mod generator;
pub mod mail;
pub mod models;
pub mod pipeline;
pub mod urls;

// Re-export commonly used types for convenience
pub use error::{BriefError, Result};

// Core data models
pub use models::{Brief, Headline, Message, Stats, Tip, Tool};

// Configuration
pub use config::AppConfig;

// Capabilities and their production implementations
pub use auth::{AuthFlowError, AuthProvider, InstalledFlowAuth};
pub use mail::{HttpMailTransport, MailClient, MailTransport, TransportError};

// Generation
pub use generator::GeminiGenerator;

// Orchestration
pub use pipeline::{Pipeline, PipelineState, RetryAction};
