//! CLI for moebridge.
//!
//! Reads CampusIL xAPI statements as JSON lines, maps them onto the MOE
//! schema and either prints them or delivers them to the MOE endpoints.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use moebridge_dispatch::{
    ApiSettings, CacheSettings, CachedBlockTitles, CachedInstructors, CachedTokenProvider,
    Catalog, DeadLetterStore, DispatchMode, Dispatcher, EventRouter, ExternalService, FlatConfig,
    HttpQueueSender, RetrySettings, RouteOutcome, StatementClient, TokenProvider,
};
use moebridge_mapping::{EventTransformer, MappingSettings, Vocabulary};
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map statements and print them as JSON lines
    Transform {
        #[command(flatten)]
        input: InputArgs,

        /// Also emit statements whose verb has no MOE counterpart
        #[arg(long)]
        all: bool,
    },
    /// Map statements and deliver them to the MOE statement API and queue
    Dispatch {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        delivery: DeliveryArgs,
    },
    /// Print the verb vocabulary
    Verbs,
}

#[derive(Args)]
struct InputArgs {
    /// JSON-lines input file (default: stdin)
    #[arg(long)]
    path: Option<PathBuf>,

    /// Lookup catalog with block titles and course staff
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// JSON configuration file; environment variables override it
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct DeliveryArgs {
    /// Event name reported with every statement
    #[arg(long, default_value = "campusil.xapi.statement")]
    event_name: String,

    /// Where undeliverable statements are written
    #[arg(long, default_value = "data/moebridge.dead-letter.jsonl")]
    dead_letter: PathBuf,

    /// Do not send to the MOE statement API
    #[arg(long)]
    no_lrs: bool,

    /// Do not send to the queue gateway
    #[arg(long)]
    no_queue: bool,

    /// Queue gateway URL
    #[arg(long)]
    queue_url: Option<String>,

    /// Message group passed to the queue gateway
    #[arg(long)]
    message_group: Option<String>,

    /// Only log undeliverable statements instead of dead-lettering them
    #[arg(long)]
    transient: bool,
}

impl DeliveryArgs {
    fn service(&self) -> ExternalService {
        ExternalService {
            send_to_lrs: !self.no_lrs,
            send_to_queue: !self.no_queue,
            queue_url: self.queue_url.clone(),
            message_group: self.message_group.clone(),
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct TransformSummary {
    emitted: u64,
    skipped: u64,
    malformed: u64,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct DispatchSummary {
    dispatched: u64,
    skipped: u64,
    rejected: u64,
    failed: u64,
}

impl DispatchSummary {
    fn record(&mut self, outcome: &RouteOutcome) {
        match outcome {
            RouteOutcome::Dispatched => self.dispatched += 1,
            RouteOutcome::Skipped => self.skipped += 1,
            RouteOutcome::Rejected(_) => self.rejected += 1,
            RouteOutcome::Failed(_) => self.failed += 1,
        }
    }
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("moebridge=info".parse()?))
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<FlatConfig> {
    let config = match path {
        Some(path) => FlatConfig::from_json_file(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?,
        None => FlatConfig::new(),
    };
    Ok(config.with_env())
}

fn build_transformer(config: &FlatConfig, catalog: Option<&Path>) -> Result<EventTransformer> {
    let settings =
        MappingSettings::from_provider(config).context("Invalid mapping configuration")?;
    let transformer = EventTransformer::new(settings);

    let Some(path) = catalog else {
        return Ok(transformer);
    };
    let catalog = Arc::new(
        Catalog::load(path)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?,
    );
    let cache = CacheSettings::from_provider(config).context("Invalid cache configuration")?;
    Ok(transformer
        .with_block_titles(CachedBlockTitles::new(catalog.clone(), &cache))
        .with_instructors(CachedInstructors::new(catalog, &cache)))
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

fn verb_of(raw: &Value) -> &str {
    raw.pointer("/verb/id")
        .and_then(Value::as_str)
        .unwrap_or_default()
}

/// Maps every statement line of `input` and writes the results to `out`.
///
/// Lines that are not valid statements are reported on stderr and counted,
/// they do not stop the run.
fn transform_lines(
    input: impl BufRead,
    out: &mut impl Write,
    transformer: &EventTransformer,
    include_all: bool,
) -> Result<TransformSummary> {
    let mut summary = TransformSummary::default();

    for (idx, line) in input.lines().enumerate() {
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }
        let raw: Value = match serde_json::from_str(&line) {
            Ok(raw) => raw,
            Err(e) => {
                eprintln!("line {}: invalid JSON: {}", idx + 1, e);
                summary.malformed += 1;
                continue;
            }
        };
        if !include_all && !transformer.is_relevant_event(verb_of(&raw)) {
            tracing::debug!(line = idx + 1, verb = verb_of(&raw), "skipping unmapped verb");
            summary.skipped += 1;
            continue;
        }

        match transformer.transform_json(raw) {
            Ok(mapped) => {
                serde_json::to_writer(&mut *out, &mapped)?;
                writeln!(out)?;
                summary.emitted += 1;
            }
            Err(e) => {
                eprintln!("line {}: {}", idx + 1, e);
                summary.malformed += 1;
            }
        }
    }

    Ok(summary)
}

async fn route_lines(
    input: impl BufRead,
    router: &EventRouter,
    event_name: &str,
) -> Result<DispatchSummary> {
    let mut summary = DispatchSummary::default();

    for (idx, line) in input.lines().enumerate() {
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }
        let outcome = match serde_json::from_str::<Value>(&line) {
            Ok(raw) => router.route(event_name, raw).await,
            Err(e) => RouteOutcome::Rejected(format!("invalid JSON: {e}")),
        };
        if let RouteOutcome::Rejected(reason) | RouteOutcome::Failed(reason) = &outcome {
            eprintln!("line {}: {}", idx + 1, reason);
        }
        summary.record(&outcome);
    }

    Ok(summary)
}

fn build_dispatcher(config: &FlatConfig, delivery: &DeliveryArgs) -> Result<Dispatcher> {
    let retry = RetrySettings::from_provider(config).context("Invalid retry configuration")?;
    let mut dispatcher = Dispatcher::new(retry);

    if !delivery.no_lrs {
        let api = ApiSettings::from_provider(config).context("Invalid API configuration")?;
        let tokens: Arc<dyn TokenProvider> = Arc::new(CachedTokenProvider::from_settings(&api)?);
        dispatcher = dispatcher.with_statements(Arc::new(StatementClient::new(&api, tokens)?));
    }
    if !delivery.no_queue {
        dispatcher = dispatcher.with_queue(Arc::new(HttpQueueSender::new()?));
    }
    if !delivery.transient {
        dispatcher = dispatcher.with_mode(DispatchMode::Persistent(DeadLetterStore::new(
            delivery.dead_letter.clone(),
        )));
    }
    Ok(dispatcher)
}

fn print_verbs(out: &mut impl Write) -> Result<()> {
    for (source, target) in Vocabulary::moe().verbs() {
        writeln!(out, "{source}\t{target}")?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    match cli.command {
        Commands::Transform { input, all } => {
            let config = load_config(input.config.as_deref())?;
            let transformer = build_transformer(&config, input.catalog.as_deref())?;
            let reader = open_input(input.path.as_deref())?;

            let stdout = io::stdout();
            let mut out = stdout.lock();
            let summary = transform_lines(reader, &mut out, &transformer, all)?;
            out.flush()?;

            tracing::info!(
                emitted = summary.emitted,
                skipped = summary.skipped,
                malformed = summary.malformed,
                "transform finished"
            );
        }
        Commands::Dispatch { input, delivery } => {
            let config = load_config(input.config.as_deref())?;
            let transformer = Arc::new(build_transformer(&config, input.catalog.as_deref())?);
            let dispatcher = build_dispatcher(&config, &delivery)?;
            let router = EventRouter::new(transformer, dispatcher, delivery.service());
            let reader = open_input(input.path.as_deref())?;

            let summary = route_lines(reader, &router, &delivery.event_name).await?;
            println!(
                "dispatched: {}, skipped: {}, rejected: {}, failed: {}",
                summary.dispatched, summary.skipped, summary.rejected, summary.failed
            );
            if summary.failed > 0 {
                anyhow::bail!("{} statements could not be delivered", summary.failed);
            }
        }
        Commands::Verbs => {
            let stdout = io::stdout();
            print_verbs(&mut stdout.lock())?;
        }
    }

    Ok(())
}
