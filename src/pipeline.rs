//! Pipeline orchestrator: composes the mail adapter and the generator behind
//! a single state machine that the presentation layer renders.

use chrono::{DateTime, Duration, Utc};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::demo;
use crate::error::{BriefError, Result};
use crate::generator::GeminiGenerator;
use crate::mail::MailClient;
use crate::models::{Brief, Message};

/// Messages older than this many days are not summarized.
pub const RECENCY_WINDOW_DAYS: i64 = 2;

/// What the retry control should do after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    /// Already authenticated (or in demo mode): run the generation again.
    Regenerate,
    /// Not signed in: go back through the consent flow first.
    SignIn,
}

/// Pipeline state as shown to the presentation layer. A single tagged value,
/// so combinations like "demo mode but signed in" cannot exist.
#[derive(Debug, Clone)]
pub enum PipelineState {
    /// No credentials saved yet.
    AwaitingConfig,
    /// Configured but not signed in.
    SignedOut,
    /// Signed in (or in demo mode); a brief can be generated.
    Ready,
    /// A generation run is in flight.
    Generating,
    /// The last run produced a brief.
    Success(Brief),
    /// The last operation failed.
    Failed { message: String, retry: RetryAction },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Live,
    Demo,
}

/// The one object the presentation layer talks to. Every operation takes
/// `&mut self`, so a second run cannot start while one is in flight.
pub struct Pipeline {
    state: PipelineState,
    mode: Mode,
    mail: MailClient,
    generator: GeminiGenerator,
    config: Option<AppConfig>,
    config_path: PathBuf,
}

impl Pipeline {
    pub fn new(mail: MailClient, generator: GeminiGenerator, config_path: PathBuf) -> Self {
        Self {
            state: PipelineState::AwaitingConfig,
            mode: Mode::Live,
            mail,
            generator,
            config: None,
            config_path,
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn is_demo(&self) -> bool {
        self.mode == Mode::Demo
    }

    /// Load persisted credentials and move to the matching start state.
    pub async fn startup(&mut self) -> &PipelineState {
        match AppConfig::load(&self.config_path).await {
            Ok(Some(config)) => match self.mail.initialize(&config.google_client_id).await {
                Ok(()) => {
                    self.config = Some(config);
                    self.state = PipelineState::SignedOut;
                }
                Err(e) => self.fail(e),
            },
            Ok(None) => self.state = PipelineState::AwaitingConfig,
            Err(e) => self.fail(e),
        }
        &self.state
    }

    /// Persist new credentials and re-register the auth client.
    pub async fn save_config(&mut self, config: AppConfig) -> &PipelineState {
        self.mode = Mode::Live;
        match self.persist_and_initialize(config).await {
            Ok(()) => self.state = PipelineState::SignedOut,
            Err(e) => self.fail(e),
        }
        &self.state
    }

    async fn persist_and_initialize(&mut self, config: AppConfig) -> Result<()> {
        config.save(&self.config_path).await?;
        self.mail.initialize(&config.google_client_id).await?;
        self.config = Some(config);
        Ok(())
    }

    /// Switch to canned data. Clears any saved credentials; demo mode never
    /// touches the real auth methods.
    pub async fn enter_demo_mode(&mut self) -> &PipelineState {
        if let Err(e) = AppConfig::clear(&self.config_path).await {
            warn!("Failed to clear saved configuration: {}", e);
        }
        self.config = None;
        self.mode = Mode::Demo;
        self.state = PipelineState::Ready;
        &self.state
    }

    /// Go back to the configuration form, dropping any brief on screen.
    pub fn edit_config(&mut self) -> &PipelineState {
        self.state = PipelineState::AwaitingConfig;
        &self.state
    }

    pub async fn sign_in(&mut self) -> &PipelineState {
        if self.mode == Mode::Demo {
            self.state = PipelineState::Ready;
            return &self.state;
        }
        if self.config.is_none() {
            self.fail(BriefError::Config(
                "Configuration is missing. Please set up the application first.".to_string(),
            ));
            return &self.state;
        }

        match self.mail.sign_in().await {
            Ok(()) => self.state = PipelineState::Ready,
            Err(e) => self.fail(e),
        }
        &self.state
    }

    pub async fn sign_out(&mut self) -> &PipelineState {
        if self.mode == Mode::Live {
            self.mail.sign_out().await;
            self.state = PipelineState::SignedOut;
        } else {
            self.state = PipelineState::Ready;
        }
        &self.state
    }

    /// Run one fetch-filter-generate cycle.
    pub async fn generate_brief(&mut self) -> &PipelineState {
        self.state = PipelineState::Generating;
        match self.run_generation().await {
            Ok(brief) => {
                info!(
                    "Brief generated: {} headlines, {} tools, {} tips",
                    brief.top_headlines.len(),
                    brief.tools_to_try.len(),
                    brief.tips_to_try.len()
                );
                self.state = PipelineState::Success(brief);
            }
            Err(e) => self.fail(e),
        }
        &self.state
    }

    async fn run_generation(&mut self) -> Result<Brief> {
        let now = Utc::now();
        let all = match self.mode {
            Mode::Demo => demo::recent_newsletters(now),
            Mode::Live => self.mail.fetch_recent_newsletters().await?,
        };

        let recent = filter_recent(all, now);
        if recent.is_empty() {
            return Err(BriefError::NoRecentContent);
        }
        info!("{} newsletters within the recency window", recent.len());

        match self.mode {
            Mode::Demo => Ok(demo::generate_brief(&recent)),
            Mode::Live => {
                let api_key = self
                    .config
                    .as_ref()
                    .map(|c| c.gemini_api_key.clone())
                    .unwrap_or_default();
                self.generator.generate(&recent, &api_key).await
            }
        }
    }

    /// Every failure lands here: one user-visible message plus the retry
    /// action the current auth/demo state calls for.
    fn fail(&mut self, err: BriefError) {
        warn!("Pipeline operation failed: {}", err);
        let retry = if self.mode == Mode::Demo || self.mail.is_authenticated() {
            RetryAction::Regenerate
        } else {
            RetryAction::SignIn
        };
        self.state = PipelineState::Failed {
            message: err.to_string(),
            retry,
        };
    }
}

/// Keep messages whose timestamp falls within the trailing recency window,
/// inclusive at the boundary.
pub fn filter_recent(messages: Vec<Message>, now: DateTime<Utc>) -> Vec<Message> {
    let cutoff = now - Duration::days(RECENCY_WINDOW_DAYS);
    messages.into_iter().filter(|m| m.date >= cutoff).collect()
}
