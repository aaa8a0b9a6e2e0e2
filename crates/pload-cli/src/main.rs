//! pload - command line front-end for the playlist loader editor.
//!
//! Drives [`PlaylistEditor`] against the loader backend and prints the
//! resulting playlist to stdout. Logs go to stderr and to rolling JSON files.

mod logging;
mod render;

use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::{Parser, Subcommand};
use pload_core::{
    ApiClient, CancelFlag, CommandOutcome, DisplayRewrites, EditorConfig, ExistingTrack,
    Notice, PlaylistEditor, Renderer, single_file,
};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::logging::LoggingConfig;
use crate::render::ConsoleRenderer;

type Editor = PlaylistEditor<ApiClient, ConsoleRenderer<Stdout>>;

#[derive(Parser, Debug)]
#[command(name = "pload")]
#[command(about = "Build playlists against the playlist loader backend", long_about = None)]
struct Args {
    /// Config file (defaults to the user config directory)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the config file
    #[arg(long)]
    base_url: Option<String>,

    /// Verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Directory for log files
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a playlist file, validating each track in order
    Import {
        /// Playlist file (.m3u, .m3u8 or .txt); exactly one
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Load persisted tracks from a JSON file and resolve their metadata
    Load {
        /// JSON array of {"id": .., "url": ..} objects
        file: PathBuf,
    },
    /// Validate a single track URL and show its metadata
    Validate {
        /// Track URL
        url: String,
    },
    /// Search the track catalog
    Search {
        /// Free-text query
        query: String,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Core(#[from] pload_core::Error),
    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let mut logging = LoggingConfig::auto().with_verbose(args.verbose);
    if let Some(dir) = &args.log_dir {
        logging = logging.with_log_directory(dir.clone());
    }
    let _guard = match logging::init(&logging) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("File logging disabled: {e}");
            None
        }
    };

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode, CliError> {
    let config = load_config(args.config.as_deref(), args.base_url)?;
    let rewrites = DisplayRewrites::from_rules(&config.display_rewrites)?;
    let client = ApiClient::from_config(&config)?;
    info!("Using backend at {}", client.base_url());

    let renderer = ConsoleRenderer::new(io::stdout(), rewrites);

    match args.command {
        Command::Import { files } => {
            let path = single_file(&files)?;
            let editor = PlaylistEditor::new(client, renderer.following());
            import(editor, path, &config).await
        }
        Command::Load { file } => load(PlaylistEditor::new(client, renderer), &file).await,
        Command::Validate { url } => validate(PlaylistEditor::new(client, renderer), &url).await,
        Command::Search { query } => search(PlaylistEditor::new(client, renderer), &query).await,
    }
}

fn load_config(path: Option<&Path>, base_url: Option<String>) -> Result<EditorConfig, CliError> {
    let mut config = match path {
        Some(path) => EditorConfig::load_from(path)?,
        None => EditorConfig::load()?,
    };
    if let Some(base_url) = base_url {
        config.base_url = base_url;
    }
    Ok(config)
}

async fn import(mut editor: Editor, path: &Path, config: &EditorConfig) -> Result<ExitCode, CliError> {
    let cancel: CancelFlag = Arc::new(AtomicBool::new(false));
    let on_interrupt = Arc::clone(&cancel);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping import after the current track");
            on_interrupt.store(true, Ordering::SeqCst);
        }
    });

    let report = editor.import_file(path, &config.import, Some(&cancel)).await?;
    editor.renderer_mut().write_playlist()?;

    if report.is_complete() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

async fn load(mut editor: Editor, path: &Path) -> Result<ExitCode, CliError> {
    let content = std::fs::read_to_string(path).map_err(pload_core::Error::from)?;
    let existing: Vec<ExistingTrack> =
        serde_json::from_str(&content).map_err(pload_core::Error::from)?;

    let lookups = editor.load(existing);
    let mut tasks = JoinSet::new();
    for lookup in lookups {
        let backend = editor.backend();
        tasks.spawn(async move { lookup.resolve(&*backend).await });
    }

    let mut updated = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Some(command)) => {
                if editor.handle(command).await? == CommandOutcome::Updated {
                    updated += 1;
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Metadata lookup task failed: {}", e),
        }
    }

    info!(
        "Resolved metadata for {} of {} tracks",
        updated,
        editor.tracks().len()
    );
    editor.renderer_mut().write_playlist()?;
    Ok(ExitCode::SUCCESS)
}

async fn validate(mut editor: Editor, url: &str) -> Result<ExitCode, CliError> {
    match editor.add_url(url).await {
        Ok(index) => {
            if let Some(entry) = editor.tracks().get(index).cloned() {
                editor.renderer_mut().write_track_info(&entry)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_validation() => {
            editor
                .renderer_mut()
                .notify(&Notice::danger(format!("Track failed to validate: {}", url.trim())));
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

async fn search(mut editor: Editor, query: &str) -> Result<ExitCode, CliError> {
    let hits = editor.search(query).await?;
    info!("{} hits for {:?}", hits, query);
    Ok(ExitCode::SUCCESS)
}
