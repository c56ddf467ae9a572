//! `doclab`: CLI client for the document-labeling pipeline.

mod commands;
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use doclab_client::{ConversionBackend, ConversionRequest, PrelabelBackend, PrelabelRequest};
use doclab_core::JobKind;
use doclab_store::{JsonFileStore, RefStore};
use doclab_tracker::{JobTracker, TrackerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "doclab", about = "Client for the document-labeling pipeline", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload PDFs into a working folder and convert them to HTML.
    Convert {
        /// Target working folder on the conversion service.
        #[arg(long)]
        folder: String,
        /// PDF files to upload.
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Submit and exit; follow later with `doclab watch conversion`.
        #[arg(long)]
        detach: bool,
    },

    /// Start AI prelabeling of a labeling project.
    Prelabel {
        /// Labeling project name.
        #[arg(long)]
        project: String,
        /// Model identifier to run.
        #[arg(long)]
        model: String,
        /// System prompt handed to the model.
        #[arg(long)]
        system_prompt: String,
        /// Questions-and-labels file name within the project.
        #[arg(long)]
        qal_file: String,
        /// Labeling-service API token.
        #[arg(long)]
        token: String,
        /// Local JSON file with the parsed questions and labels.
        #[arg(long)]
        questions: Option<PathBuf>,
        /// Submit and exit; follow later with `doclab watch prelabel`.
        #[arg(long)]
        detach: bool,
    },

    /// Follow the active job of a kind until it finishes.
    Watch { kind: KindArg },

    /// Show the active job's status once.
    Status { kind: KindArg },

    /// Request cancellation of the active job (advisory).
    Cancel { kind: KindArg },

    /// Drop the locally persisted job reference without touching the
    /// server.
    Clear { kind: KindArg },

    /// List working folders on the conversion service, or the files in
    /// one folder.
    Folders {
        /// Folder whose files to list; omit to list the folders.
        folder: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Conversion,
    Prelabel,
}

impl From<KindArg> for JobKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Conversion => JobKind::Conversion,
            KindArg::Prelabel => JobKind::Prelabel,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "doclab=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let store: Arc<dyn RefStore> = Arc::new(JsonFileStore::new(&config.state_file));
    let tracker_config = TrackerConfig {
        poll_interval: config.poll_interval,
    };

    match cli.command {
        Command::Convert {
            folder,
            files,
            detach,
        } => {
            let tracker = conversion_tracker(&config, store, tracker_config);
            let payload = ConversionRequest { folder, files };
            commands::submit_and_watch(&tracker, &payload, detach).await
        }

        Command::Prelabel {
            project,
            model,
            system_prompt,
            qal_file,
            token,
            questions,
            detach,
        } => {
            let questions_and_labels = match questions {
                Some(path) => serde_json::from_str(&std::fs::read_to_string(&path)?)?,
                None => serde_json::Value::Object(Default::default()),
            };
            let payload = PrelabelRequest {
                project_name: project,
                model,
                system_prompt,
                qal_file,
                token,
                questions_and_labels,
            };
            let tracker = prelabel_tracker(&config, store, tracker_config);
            commands::submit_and_watch(&tracker, &payload, detach).await
        }

        Command::Watch { kind } => match kind.into() {
            JobKind::Conversion => {
                commands::watch(&conversion_tracker(&config, store, tracker_config)).await
            }
            JobKind::Prelabel => {
                commands::watch(&prelabel_tracker(&config, store, tracker_config)).await
            }
        },

        Command::Status { kind } => match kind.into() {
            JobKind::Conversion => {
                commands::status_once(&ConversionBackend::new(&config.conversion_url), store).await
            }
            JobKind::Prelabel => {
                commands::status_once(&PrelabelBackend::new(&config.orchestrator_url), store).await
            }
        },

        Command::Cancel { kind } => match kind.into() {
            JobKind::Conversion => {
                commands::cancel(&conversion_tracker(&config, store, tracker_config)).await
            }
            JobKind::Prelabel => {
                commands::cancel(&prelabel_tracker(&config, store, tracker_config)).await
            }
        },

        Command::Clear { kind } => match kind.into() {
            JobKind::Conversion => {
                commands::clear_local(&conversion_tracker(&config, store, tracker_config))
            }
            JobKind::Prelabel => {
                commands::clear_local(&prelabel_tracker(&config, store, tracker_config))
            }
        },

        Command::Folders { folder } => {
            let backend = ConversionBackend::new(&config.conversion_url);
            match folder {
                None => {
                    for name in backend.list_folders().await? {
                        println!("{name}");
                    }
                }
                Some(folder) => {
                    for name in backend.list_files(&folder).await? {
                        println!("{name}");
                    }
                }
            }
            Ok(())
        }
    }
}

fn conversion_tracker(
    config: &Config,
    store: Arc<dyn RefStore>,
    tracker_config: TrackerConfig,
) -> JobTracker<ConversionBackend> {
    JobTracker::new(
        Arc::new(ConversionBackend::new(&config.conversion_url)),
        store,
        tracker_config,
    )
}

fn prelabel_tracker(
    config: &Config,
    store: Arc<dyn RefStore>,
    tracker_config: TrackerConfig,
) -> JobTracker<PrelabelBackend> {
    JobTracker::new(
        Arc::new(PrelabelBackend::new(&config.orchestrator_url)),
        store,
        tracker_config,
    )
}
