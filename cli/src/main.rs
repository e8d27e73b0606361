//! CLI entrypoint for decider
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use decider_application::{
    CreateSessionInput, CreateSessionUseCase, GetStatusUseCase, ManageSessionUseCase,
    NoSessionEventLogger, SessionEventLogger, SessionServices, StartSessionUseCase, SystemClock,
    TakeTurnUseCase,
};
use decider_domain::{ItemId, ParticipantId, SessionId, params};
use decider_infrastructure::{
    ConfigLoader, FileCatalog, FileConfig, JsonFileSessionRepository, JsonlSessionEventLogger,
    load_filter_configuration,
};
use decider_presentation::{
    Cli, Command, ConsoleFormatter, JsonFormatter, OutputFormatter, SessionArg, SuggestArgs,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Console logging on stderr, plus a plain-text log file when configured.
///
/// The returned guard must stay alive for the file writer to flush.
fn init_tracing(verbose: u8, log_file: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(level));

    let file = log_file.and_then(|path| {
        let name = path.file_name()?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("Warning: could not create log directory {}: {}", dir.display(), e);
            return None;
        }

        let (writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
        let layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(writer)
            .with_filter(EnvFilter::new("debug"));
        Some((layer, guard))
    });
    let (file_layer, guard) = file.unzip();

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .init();

    guard
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?
    };

    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = Some(dir.clone());
    }

    config.validate().context("Invalid [engine] configuration")?;
    Ok(config)
}

fn print_suggestions(args: &SuggestArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    if args.participants == 0 {
        bail!("At least one participant is required");
    }
    let suggestions = params::suggest(args.max_k, args.max_m, args.participants, args.available);
    println!("{}", formatter.format_suggestions(args.available, &suggestions));
    Ok(())
}

fn print_config(explicit: Option<&Path>, config: &FileConfig) -> Result<()> {
    for (label, path, exists) in ConfigLoader::config_sources(explicit) {
        let marker = if exists { "found" } else { "missing" };
        println!("# {:<10} {} ({})", label, path.display(), marker);
    }
    println!();
    println!(
        "{}",
        toml::to_string_pretty(config).context("Failed to render configuration")?
    );
    Ok(())
}

fn session_id(arg: &SessionArg) -> SessionId {
    SessionId::new(arg.session.as_str())
}

/// Wire storage, catalog and event log, then run one session command.
async fn run_session_command(
    command: Command,
    config: &FileConfig,
    catalog_override: Option<PathBuf>,
    formatter: &dyn OutputFormatter,
) -> Result<()> {
    // === Dependency Injection ===
    let data_dir = config.storage.resolved_data_dir();
    let clock = Arc::new(SystemClock);
    let repository = Arc::new(JsonFileSessionRepository::new(&data_dir));

    let events: Arc<dyn SessionEventLogger> = match &config.logging.events_log {
        Some(path) => match JsonlSessionEventLogger::new(path) {
            Some(logger) => Arc::new(logger),
            None => {
                warn!("Session event log disabled");
                Arc::new(NoSessionEventLogger)
            }
        },
        None => Arc::new(NoSessionEventLogger),
    };

    let catalog_path = catalog_override.unwrap_or_else(|| data_dir.join("catalog.json"));
    let catalog = Arc::new(
        FileCatalog::open(&catalog_path, clock.clone())
            .await
            .with_context(|| format!("Failed to open catalog {}", catalog_path.display()))?,
    );
    info!(
        "Loaded {} catalog items from {}",
        catalog.len(),
        catalog_path.display()
    );

    let services = SessionServices::new(repository, clock, events);
    let engine = config.engine.clone();

    let output = match command {
        Command::Create(args) => {
            let mut input = CreateSessionInput::new(
                args.items.into_iter().map(ItemId::from).collect(),
                args.participants
                    .into_iter()
                    .map(ParticipantId::from)
                    .collect(),
            );
            if let Some(path) = &args.filters {
                input = input.with_filters(load_filter_configuration(path)?);
            }
            if args.k.is_some() || args.m.is_some() {
                input = input.with_parameters(
                    args.k.unwrap_or(engine.default_k),
                    args.m.unwrap_or(engine.default_m),
                );
            }

            let session = CreateSessionUseCase::new(services, catalog, engine)
                .execute(input)
                .await?;
            formatter.format_session(&session)
        }
        Command::Start(arg) => {
            let session = StartSessionUseCase::new(services, catalog.clone(), catalog, engine)
                .execute(&session_id(&arg))
                .await?;
            formatter.format_session(&session)
        }
        Command::Eliminate {
            session,
            participant,
            item,
        } => {
            let session = TakeTurnUseCase::new(services)
                .eliminate(
                    &session_id(&session),
                    &ParticipantId::from(participant),
                    &ItemId::from(item),
                )
                .await?;
            formatter.format_session(&session)
        }
        Command::Skip {
            session,
            participant,
        } => {
            let (session, record) = TakeTurnUseCase::new(services)
                .quick_skip(&session_id(&session), &ParticipantId::from(participant))
                .await?;
            info!("Skip recorded for round {}", record.round);
            formatter.format_session(&session)
        }
        Command::Status {
            session,
            participant,
        } => {
            let participant = participant.map(ParticipantId::from);
            let view = GetStatusUseCase::new(services, catalog)
                .execute(&session_id(&session), participant.as_ref())
                .await?;
            formatter.format_status(&view)
        }
        Command::Cancel(arg) => {
            let (session, cancelled) = ManageSessionUseCase::new(services)
                .cancel(&session_id(&arg))
                .await?;
            if !cancelled {
                warn!("Session {} had already ended", session.id);
            }
            formatter.format_session(&session)
        }
        Command::Pin(arg) => {
            let (session, _) = ManageSessionUseCase::new(services)
                .pin(&session_id(&arg))
                .await?;
            formatter.format_session(&session)
        }
        Command::Unpin(arg) => {
            let (session, _) = ManageSessionUseCase::new(services)
                .unpin(&session_id(&arg))
                .await?;
            formatter.format_session(&session)
        }
        Command::List => {
            let sessions = ManageSessionUseCase::new(services).list().await?;
            formatter.format_list(&sessions)
        }
        Command::Suggest(args) => return print_suggestions(&args, formatter),
        Command::Config => bail!("config is not a session command"),
    };

    println!("{}", output);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let _guard = init_tracing(cli.verbose, config.logging.log_file.as_deref());

    info!("Starting decider");

    let formatter: Box<dyn OutputFormatter> = if cli.json {
        Box::new(JsonFormatter)
    } else {
        Box::new(ConsoleFormatter)
    };

    match cli.command {
        Command::Suggest(args) => print_suggestions(&args, formatter.as_ref()),
        Command::Config => print_config(cli.config.as_deref(), &config),
        command => run_session_command(command, &config, cli.catalog, formatter.as_ref()).await,
    }
}
