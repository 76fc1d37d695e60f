//! Command-line interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::Brief;
use crate::pipeline::{PipelineState, RetryAction};
use crate::urls::hostname;

#[derive(Parser, Debug)]
#[command(name = "ai-brief")]
#[command(version)]
#[command(about = "Daily AI brief generated from the newsletters in your inbox", long_about = None)]
pub struct Cli {
    /// Path to the saved configuration entry (defaults to the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path to the OAuth token cache
    #[arg(long, default_value = ".ai-brief/token.json")]
    pub token_cache: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Save the Google client id and Gemini API key
    Configure {
        /// OAuth client id of your Google Cloud application
        #[arg(long)]
        client_id: String,

        /// API key for the Gemini generation service
        #[arg(long)]
        api_key: String,
    },

    /// Generate a brief from canned demo data (no credentials needed)
    Demo,

    /// Sign in and generate a brief from your recent newsletters
    Generate,

    /// Revoke and forget the current Gmail session
    SignOut,

    /// Show whether the app is configured
    Status,
}

/// Render a finished brief as sectioned terminal text.
pub fn render_brief(brief: &Brief) {
    let stats = &brief.quick_stats;
    println!("\nDaily AI Brief  ({})", stats.time_range);
    println!(
        "{} newsletters scanned | {} unique sources",
        stats.newsletters_scanned, stats.unique_sources
    );

    if !brief.top_headlines.is_empty() {
        println!("\nTop Headlines");
        for headline in &brief.top_headlines {
            println!("  * {}", headline.headline);
            println!("    {}", headline.summary);
            println!("    Why it matters: {}", headline.why_it_matters);
            println!("    {} [{}]", headline.url, hostname(&headline.url));
        }
    }

    if !brief.tools_to_try.is_empty() {
        println!("\nTools to Try");
        for tool in &brief.tools_to_try {
            println!("  * {}: {}", tool.name, tool.description);
            println!("    {} [{}]", tool.url, hostname(&tool.url));
        }
    }

    if !brief.tips_to_try.is_empty() {
        println!("\nTips to Try");
        for tip in &brief.tips_to_try {
            println!("  * {}: {}", tip.name, tip.description);
            println!("    {} [{}]", tip.url, hostname(&tip.url));
        }
    }
}

/// Print a terminal pipeline state. Returns false for states the caller
/// should turn into a nonzero exit.
pub fn report_state(state: &PipelineState) -> bool {
    match state {
        PipelineState::AwaitingConfig => {
            println!("Not configured. Run `ai-brief configure` or try `ai-brief demo`.");
            false
        }
        PipelineState::Success(brief) => {
            render_brief(brief);
            true
        }
        PipelineState::Failed { message, retry } => {
            eprintln!("{}", message);
            match retry {
                RetryAction::Regenerate => eprintln!("Run `ai-brief generate` to try again."),
                RetryAction::SignIn => {
                    eprintln!("Run `ai-brief generate` to go through sign-in again.")
                }
            }
            false
        }
        PipelineState::SignedOut | PipelineState::Ready | PipelineState::Generating => true,
    }
}
