//! chirp-bot - run one scheduled bot invocation against a simulated feed
//!
//! The library treats the remote feed as an injected capability, so this
//! binary wires everything else around a simulated feed with a small set
//! of fixture interactions. That makes it a dry-run harness: it exercises
//! configuration, the credential file, the state directory, and logging
//! exactly as a real bot invocation would, without network access.

use std::sync::Arc;

use clap::Parser;
use libchirp::feed::mock::MockFeed;
use libchirp::{
    Config, EventHooks, FeedClient, FeedSession, LogHooks, PostPublisher, Result, StateStore,
    UpdatePoller,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "chirp-bot")]
#[command(about = "Run one scheduled bot invocation against a simulated feed", long_about = None)]
struct Cli {
    /// Status text to publish (publishing is skipped if not provided)
    message: Option<String>,

    /// Path to the config file (defaults to $CHIRP_CONFIG or the XDG location)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Skip the update checks
    #[arg(long)]
    no_updates: bool,

    /// Check for updates now, ignoring the cadence counter
    #[arg(long)]
    force_check: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        libchirp::logging::init_default();
    }

    // Run the main logic and handle errors
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    let mut polling = config.polling.clone();
    if cli.force_check {
        polling.interval = 0;
    }

    let client: Box<dyn FeedClient> = Box::new(MockFeed::sample());
    let mut session = FeedSession::with_credential_file(client, config.credentials.expand_file());
    let hooks: Arc<dyn EventHooks> = Arc::new(LogHooks);

    if let Some(message) = &cli.message {
        let publisher = PostPublisher::with_hooks(&config.publisher, hooks.clone());
        let status = publisher.post(&mut session, message).await?;
        println!("published status {}", status.id);
    }

    if !cli.no_updates {
        let state = StateStore::new(config.state.expand_dir());
        info!(dir = %state.dir().display(), "using state directory");
        let poller = UpdatePoller::with_hooks(state, polling, hooks);
        poller.check_for_updates(&mut session).await?;
    }

    Ok(())
}
