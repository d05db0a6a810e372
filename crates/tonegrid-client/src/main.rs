//! tonegrid CLI
//!
//! Edits one persisted session from the command line and rewrites its text
//! through a tonegrid server.
//!
//! ## Usage
//!
//! ```bash
//! tonegrid set "Hello world"        # load text (first load becomes the reset baseline)
//! echo "Hello world" | tonegrid set # same, from stdin
//! tonegrid tone -1 -1               # rewrite as Casual + Friendly
//! tonegrid undo | redo | reset
//! tonegrid show
//! tonegrid label 1 1                # describe a grid cell
//! tonegrid clear                    # forget the stored session
//! ```

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use tonegrid_client::constants::DEFAULT_SERVER_URL;
use tonegrid_client::{
    EditorSession, FinishOutcome, JsonFileStore, ToneClient, default_state_path, run_transform,
};
use tonegrid_types::{Coordinate, ErrorCode, ToneDescriptor};

/// Tone-grid text rewriting with undo/redo.
#[derive(Parser, Debug)]
#[command(name = "tonegrid")]
#[command(about = "Rewrite text along a 3x3 formality/voice grid")]
struct Cli {
    /// tonegrid server base URL
    #[arg(long, default_value = DEFAULT_SERVER_URL)]
    server: String,

    /// Session snapshot file
    #[arg(long)]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current text and history position
    Show,
    /// Replace the text (reads stdin when TEXT is omitted)
    Set { text: Option<String> },
    /// Rewrite the current text at grid cell (X, Y), each in -1..=1
    #[command(allow_negative_numbers = true)]
    Tone { x: i64, y: i64 },
    /// Step back one state
    Undo,
    /// Step forward one state
    Redo,
    /// Return to the original text
    Reset,
    /// Return to the original text and delete the stored session
    Clear,
    /// Describe grid cell (X, Y)
    #[command(allow_negative_numbers = true)]
    Label { x: i64, y: i64 },
}

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Command::Label { x, y } = cli.command {
        let tone = ToneDescriptor::describe(Coordinate::new(x, y)?);
        println!("{}", tone.label());
        println!("{}", tone.tooltip());
        return Ok(());
    }

    let state_path = cli.state.unwrap_or_else(default_state_path);
    let store = Arc::new(JsonFileStore::new(&state_path));
    let mut session = EditorSession::with_store(store);
    session.hydrate();
    tracing::debug!(path = %state_path.display(), "session loaded");

    match cli.command {
        Command::Show => print_session(&session),
        Command::Set { text } => {
            let text = match text {
                Some(t) => t,
                None => read_stdin()?,
            };
            // The very first load is the baseline, later sets are edits.
            let skip_history = !session.engine().has_baseline();
            session.set_text(text, skip_history);
            print_session(&session);
        }
        Command::Tone { x, y } => {
            let coord = Coordinate::new(x, y)?;
            let client = ToneClient::new(&cli.server).context("building HTTP client")?;
            let shared = session.into_shared();

            let mut outcome = run_transform(&shared, &client, coord).await?;
            if matches!(&outcome, FinishOutcome::Failed(body) if body.code == ErrorCode::VersionMismatch)
            {
                let version = client
                    .refresh_prompt_version()
                    .await
                    .context("refreshing prompt version")?;
                tracing::info!(%version, "retrying with server prompt version");
                outcome = run_transform(&shared, &client, coord).await?;
            }

            let session = shared.lock();
            match outcome {
                FinishOutcome::Applied { .. } => print_session(&session),
                FinishOutcome::Failed(body) => {
                    if let Some(ms) = body.retry_after_ms {
                        bail!("{} ({}; retry in {:.1}s)", body.message, body.code, ms as f64 / 1000.0);
                    }
                    bail!("{} ({})", body.message, body.code);
                }
                FinishOutcome::Superseded => println!("(superseded by a newer request)"),
            }
        }
        Command::Undo => {
            if !session.undo() {
                println!("nothing to undo");
            }
            print_session(&session);
        }
        Command::Redo => {
            if !session.redo() {
                println!("nothing to redo");
            }
            print_session(&session);
        }
        Command::Reset => {
            session.reset();
            print_session(&session);
        }
        Command::Clear => {
            session
                .clear_storage()
                .with_context(|| format!("clearing {}", state_path.display()))?;
            print_session(&session);
        }
        Command::Label { .. } => {}
    }
    Ok(())
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("reading text from stdin")?;
    Ok(buf.trim_end_matches('\n').to_string())
}

fn print_session(session: &EditorSession) {
    let history = session.history();
    let ui = session.ui();

    println!("{}", history.present);
    println!("---");
    println!(
        "history: {} back, {} forward",
        history.past.len(),
        history.future.len()
    );
    if let Some(coord) = ui.selected {
        println!("tone: {} {}", ToneDescriptor::describe(coord).label(), coord);
    }
    if let Some(status) = &ui.last_status {
        println!("status: {status}");
    }
}
