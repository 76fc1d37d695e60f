use anyhow::Result;
use clap::Parser;
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use ai_brief::auth::InstalledFlowAuth;
use ai_brief::cli::{self, Cli, Commands};
use ai_brief::config::AppConfig;
use ai_brief::generator::GeminiGenerator;
use ai_brief::mail::{HttpMailTransport, MailClient};
use ai_brief::pipeline::{Pipeline, PipelineState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        eprintln!("\nFor help, run: ai-brief --help");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Cli::parse();

    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ai_brief=debug,info"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("ai_brief=info,warn,error"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config_path = args.config.clone().unwrap_or_else(AppConfig::default_path);

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let mail = MailClient::new(
        Box::new(InstalledFlowAuth::new(http.clone(), args.token_cache.clone())),
        Box::new(HttpMailTransport::new(http.clone())),
    );
    let generator = GeminiGenerator::new(http);
    let mut pipeline = Pipeline::new(mail, generator, config_path.clone());

    let ok = match args.command {
        Commands::Configure { client_id, api_key } => {
            let state = pipeline.save_config(AppConfig::new(client_id, api_key)).await;
            if cli::report_state(state) {
                println!("Configuration saved to {:?}", config_path);
                true
            } else {
                false
            }
        }

        Commands::Demo => {
            pipeline.enter_demo_mode().await;
            cli::report_state(pipeline.generate_brief().await)
        }

        Commands::Generate => {
            let mut ok = cli::report_state(pipeline.startup().await);
            if ok {
                ok = cli::report_state(pipeline.sign_in().await);
            }
            if ok {
                ok = cli::report_state(pipeline.generate_brief().await);
            }
            ok
        }

        Commands::SignOut => {
            pipeline.startup().await;
            pipeline.sign_out().await;
            match tokio::fs::remove_file(&args.token_cache).await {
                Ok(()) => println!("Signed out; cached token removed."),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    println!("No cached session to remove.")
                }
                Err(e) => return Err(e.into()),
            }
            true
        }

        Commands::Status => {
            let state = pipeline.startup().await;
            match state {
                PipelineState::AwaitingConfig => {
                    println!("Not configured. Run `ai-brief configure` or try `ai-brief demo`.");
                }
                PipelineState::Failed { message, .. } => println!("Configured, but: {}", message),
                _ => println!("Configured (config at {:?}).", config_path),
            }
            true
        }
    };

    if !ok {
        process::exit(1);
    }
    Ok(())
}
