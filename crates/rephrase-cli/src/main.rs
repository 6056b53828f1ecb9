//! Sends text to the rephrase server and prints one rewrite per style.

mod observability;
mod render;

use std::io::Read as _;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context as _, Result, bail};
use clap::Parser;
use rephrase_client::prelude::*;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "rephrase")]
#[command(version)]
#[command(about = "Rephrase text in several writing styles over a streaming API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Server base URL (overrides REPHRASE_BASE_URL)
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Stream rewrites of TEXT (read from stdin when omitted). Ctrl-C cancels.
    Run {
        /// The text to rephrase
        text: Option<String>,

        /// Print the outputs and final state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check that the server is reachable
    Health,
}

fn load_env() {
    let _ = dotenvy::from_path(Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/.env")));
    dotenvy::dotenv().ok();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    load_env();
    let cli = Cli::parse();
    observability::init_observability(cli.verbose);

    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config = config.base_url(base_url);
    }
    let client = RephraseClient::new(config)?;

    match cli.command {
        Commands::Health => health(&client).await,
        Commands::Run { text, json } => {
            let input = match text {
                Some(text) => text,
                None => read_stdin()?,
            };
            run(&client, &input, json).await
        }
    }
}

async fn health(client: &RephraseClient) -> Result<ExitCode> {
    let status = client
        .health()
        .await
        .with_context(|| format!("health check against {} failed", client.config().base_url))?;
    println!("{}: {}", status.status, status.message);
    Ok(ExitCode::SUCCESS)
}

async fn run(client: &RephraseClient, input: &str, json: bool) -> Result<ExitCode> {
    let mut session = client.session();
    let token = session.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received; cancelling");
            token.cancel();
        }
    });
    let progress = tokio::spawn(render::log_progress(session.subscribe()));

    let state = client.run(&mut session, input).await?;
    progress.abort();

    if json {
        println!("{}", render::json(session.outputs(), &state));
    } else {
        print!("{}", render::text(session.outputs()));
    }

    match state {
        SessionState::Completed => Ok(ExitCode::SUCCESS),
        SessionState::Cancelled => {
            warn!(session_id = %session.id(), "cancelled before the stream finished");
            Ok(ExitCode::from(130))
        }
        SessionState::Failed(failure) => {
            eprintln!("error: {}", failure.message());
            Ok(ExitCode::FAILURE)
        }
        other => bail!("session ended in non-terminal state {other:?}"),
    }
}

fn read_stdin() -> Result<String> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("failed to read text from stdin")?;
    Ok(text)
}
