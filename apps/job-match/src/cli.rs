use std::io::Read;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::config::Config;
use crate::match_client::HttpMatchClient;
use crate::presenter::{present, render_text, Disclosure, Labels, SectionKind};
use crate::routes::build_router;
use crate::session::{ResolveOutcome, SessionController, SessionError, SessionState};
use crate::state::AppState;
use crate::store::{FileBackend, MemoryBackend, ResultStore};

/// `JOB_MATCH_STORE_PATH` value that keeps the analysis in memory only.
const MEMORY_STORE: &str = ":memory:";

#[derive(Debug, Parser)]
#[command(name = "job-match", version, about = "Job match analysis for the portfolio site")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze a job description, or replay the stored analysis
    Analyze(AnalyzeArgs),
    /// Show the stored analysis
    Show(DisplayArgs),
    /// Start a new analysis by clearing the stored one
    Reset,
    /// Run the stand-in matching service
    Serve,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Job description text
    #[arg(long, conflicts_with = "job_file")]
    pub job: Option<String>,

    /// Read the job description from a file ("-" for stdin)
    #[arg(long)]
    pub job_file: Option<PathBuf>,

    /// Contact email sent with the request
    #[arg(long, default_value = "")]
    pub email: String,

    /// Submit even when an analysis is stored; it is replaced once the new
    /// one succeeds
    #[arg(long)]
    pub new: bool,

    #[command(flatten)]
    pub display: DisplayArgs,
}

#[derive(Debug, Args, Default)]
pub struct DisplayArgs {
    /// Sections to expand, comma separated
    #[arg(long, value_enum, value_delimiter = ',')]
    pub expand: Vec<SectionKind>,

    /// Sections to collapse, comma separated
    #[arg(long, value_enum, value_delimiter = ',')]
    pub collapse: Vec<SectionKind>,

    /// Expand every section, including the job description
    #[arg(long)]
    pub expand_all: bool,
}

impl DisplayArgs {
    fn disclosure(&self) -> Disclosure {
        let mut disclosure = Disclosure::mount();
        if self.expand_all {
            disclosure.expand_all();
        }
        for kind in &self.expand {
            disclosure.expand(*kind);
        }
        for kind in &self.collapse {
            disclosure.collapse(*kind);
        }
        disclosure
    }
}

pub async fn run(cli: Cli, config: Config) -> Result<ExitCode> {
    match cli.command {
        Command::Analyze(args) => analyze(args, &config).await,
        Command::Show(display) => {
            let controller = build_controller(&config);
            print_state(controller.state(), &display);
            Ok(ExitCode::SUCCESS)
        }
        Command::Reset => {
            let mut controller = build_controller(&config);
            controller.reset();
            println!("Stored analysis cleared.");
            Ok(ExitCode::SUCCESS)
        }
        Command::Serve => {
            serve(&config).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_controller(config: &Config) -> SessionController {
    let client = HttpMatchClient::new(
        config.match_api_base_url.clone(),
        config.match_api_key.clone(),
    );
    let store = if config.store_path.as_os_str() == MEMORY_STORE {
        ResultStore::new(MemoryBackend::with_quota(config.store_quota_bytes))
    } else {
        ResultStore::new(FileBackend::new(
            config.store_path.clone(),
            Some(config.store_quota_bytes),
        ))
    };
    SessionController::new(Arc::new(client), store)
}

fn print_state(state: &SessionState, display: &DisplayArgs) {
    let view = present(state, &Labels::default());
    print!("{}", render_text(&view, &display.disclosure()));
}

async fn analyze(args: AnalyzeArgs, config: &Config) -> Result<ExitCode> {
    let mut controller = build_controller(config);

    if let SessionState::Settled(input, _) = controller.state() {
        if !args.new {
            info!("Replaying stored analysis");
            let labels = Labels::default();
            println!("{}", labels.greeting_for(&input.contact_email));
            println!("{}\n", labels.stored_description);
            print_state(controller.state(), &args.display);
            println!("\nRun with --new to start a new analysis.");
            return Ok(ExitCode::SUCCESS);
        }
    }

    // Editing a settled session leaves the stored analysis alone until the
    // new one succeeds.
    let job_description = read_job_description(&args).await?;
    controller.edit_job_description(job_description)?;
    controller.edit_email(args.email.clone())?;

    let pending = match controller.submit() {
        Ok(pending) => pending,
        Err(SessionError::Invalid(_)) => {
            print_state(controller.state(), &args.display);
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    info!(ticket = %pending.ticket(), "Waiting for match service");
    print_state(controller.state(), &args.display);

    let outcome = tokio::select! {
        resolution = pending.send() => controller.resolve(resolution),
        _ = tokio::signal::ctrl_c() => {
            controller.reset();
            ResolveOutcome::Discarded
        }
    };

    println!();
    print_state(controller.state(), &args.display);

    Ok(match outcome {
        ResolveOutcome::Settled => ExitCode::SUCCESS,
        ResolveOutcome::Failed | ResolveOutcome::Discarded => ExitCode::FAILURE,
    })
}

async fn read_job_description(args: &AnalyzeArgs) -> Result<String> {
    if let Some(job) = &args.job {
        return Ok(job.clone());
    }

    match &args.job_file {
        Some(path) if path.as_os_str() != "-" => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read job description from {}", path.display())),
        _ => tokio::task::spawn_blocking(|| {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read job description from stdin")?;
            Ok(text)
        })
        .await
        .context("stdin reader panicked")?,
    }
}

async fn serve(config: &Config) -> Result<()> {
    let state = AppState {
        api_key: config.match_api_key.clone(),
        response_delay: config.mock_delay,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Match service listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
