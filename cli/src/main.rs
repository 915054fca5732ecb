//! CLI entrypoint for ThinkTank
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{bail, Result};
use clap::Parser;
use std::sync::Arc;
use thinktank_application::{RunTurnInput, RunTurnUseCase, TurnEvent};
use thinktank_domain::{HeuristicScorer, Mode, Model};
use thinktank_infrastructure::{
    ConfigLoader, InMemoryDocumentStore, InMemoryResponseCache, InMemoryThreadStore,
    OpenRouterGateway,
};
use thinktank_presentation::{ChatRepl, Cli, ConsoleFormatter, ProgressReporter};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting ThinkTank");

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow::anyhow!(e))?
    };

    let Some(api_key) = config.gateway.resolve_api_key() else {
        bail!("No API key configured. Set OPENROUTER_API_KEY or [gateway].api_key.");
    };

    // Mode: CLI flag wins over config; unknown values fail open.
    let mode = Mode::resolve(cli.mode.as_deref().or(Some(config.chat.mode.as_str())));

    // Participant override: CLI flags win over config.
    let participant_ids: Vec<String> = if cli.model.is_empty() {
        config.chat.participants.clone()
    } else {
        cli.model.clone()
    };
    let participants: Option<Vec<Model>> = if participant_ids.is_empty() {
        None
    } else {
        Some(participant_ids.iter().map(|s| s.parse().unwrap()).collect())
    };

    let debate = !cli.no_debate && config.chat.debate;

    // === Dependency Injection ===
    let gateway = Arc::new(OpenRouterGateway::new(config.gateway.to_openrouter(api_key))?);
    let use_case = RunTurnUseCase::new(
        gateway,
        Arc::new(InMemoryThreadStore::new()),
        Arc::new(InMemoryDocumentStore::new()),
        Arc::new(InMemoryResponseCache::new(config.cache.max_entries)),
        Arc::new(HeuristicScorer::new(config.scoring)),
    );

    // Chat mode
    if cli.chat {
        let mut repl = ChatRepl::new(use_case, cli.thread.clone())
            .with_mode(mode)
            .with_participants(participants)
            .with_debate(debate)
            .with_streaming(cli.stream)
            .with_progress(!cli.quiet);

        repl.run().await?;
        return Ok(());
    }

    // One-shot mode - message is required
    let Some(message) = cli.message else {
        bail!("Message is required. Use --chat for interactive mode.");
    };

    let mut input = RunTurnInput::new(cli.thread.clone(), message).with_mode(mode);
    if let Some(participants) = participants {
        input = input.with_participants(participants);
    }
    if !debate {
        input = input.without_debate();
    }

    if cli.stream {
        let mut rx = use_case.execute_streaming(input).await?;
        while let Some(event) = rx.recv().await {
            match event {
                TurnEvent::Reply(reply) => {
                    println!("{}\n", ConsoleFormatter::format_message(&reply));
                }
                TurnEvent::Debate(replies) => {
                    println!("{}\n", ConsoleFormatter::format_replies(&replies));
                }
                TurnEvent::Done => break,
            }
        }
        return Ok(());
    }

    let replies = if cli.quiet {
        use_case.execute(input).await?
    } else {
        let progress = ProgressReporter::new();
        use_case.execute_with_progress(input, &progress).await?
    };

    println!("{}", ConsoleFormatter::format_replies(&replies));

    Ok(())
}
