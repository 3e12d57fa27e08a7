//! Taskpad command-line client
//!
//! Presentation layer over the task stores: picks the remote-backed or
//! local-only variant at startup, validates user input before any store
//! call, and prints the notifications each operation raises.

mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use taskpad_core::notify;
use taskpad_core::store::{LocalTaskStore, RemoteTaskStore, TaskMirror, TaskOps};
use taskpad_core::task::{CommentDraft, TaskDraft, TaskPatch};
use taskpad_rest::{RestConfig, RestTables};

#[derive(Parser)]
#[command(
    name = "taskpad",
    about = "Task list with comments, backed by a remote table API",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Base URL of the remote table API; omit to run on local storage only
    #[arg(long, env = "TASKPAD_API_URL", global = true)]
    api_url: Option<String>,

    /// API key for the remote table API
    #[arg(long, env = "TASKPAD_API_KEY", global = true)]
    api_key: Option<String>,

    /// Data directory for the locally persisted task collection
    #[arg(long, env = "TASKPAD_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// List tasks, newest first
    List {
        /// Show only completed tasks
        #[arg(long, conflicts_with = "active")]
        completed: bool,
        /// Show only tasks still open
        #[arg(long)]
        active: bool,
    },
    /// Add a task
    Add {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Image URL or data-URL to attach
        #[arg(long)]
        image: Option<String>,
    },
    /// Show one task with its comments
    Show { id: Uuid },
    /// Change a task's fields
    Edit {
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        image: Option<String>,
    },
    /// Toggle a task between open and completed
    Done { id: Uuid },
    /// Delete a task and its comments
    Rm { id: Uuid },
    /// Comment on a task
    Comment {
        id: Uuid,
        text: String,
        #[arg(long)]
        author: String,
    },
    /// Refresh the local collection from the remote tables
    Sync,
}

/// The store variant picked at startup
enum Store {
    Remote(Arc<RemoteTaskStore>),
    Local(Arc<LocalTaskStore>),
}

impl Store {
    fn ops(&self) -> &dyn TaskOps {
        match self {
            Store::Remote(store) => store.as_ref(),
            Store::Local(store) => store.as_ref(),
        }
    }

    /// Bring the collection up to date before a command runs
    ///
    /// Remote mode hydrates from the mirror, then fetches; a failed fetch
    /// falls back to the mirrored collection and reports through the
    /// notification channel. Local mode is always current.
    async fn refresh(&self) -> anyhow::Result<()> {
        if let Store::Remote(store) = self {
            store.init().await.context("Failed to load cached tasks")?;
            let _ = store.fetch_all().await;
        }
        Ok(())
    }
}

async fn open_store(args: &Args, notify_tx: notify::NotificationSender) -> anyhow::Result<Store> {
    let data_dir = args
        .data_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(".taskpad"));
    let mirror = TaskMirror::new(&data_dir);

    match &args.api_url {
        Some(url) => {
            let mut config = RestConfig::new(url.clone());
            if let Some(key) = &args.api_key {
                config = config.with_api_key(key.clone());
            }
            tracing::info!("Using remote tables at {}", config.base_url);
            let tables = Arc::new(RestTables::new(config));
            Ok(Store::Remote(Arc::new(RemoteTaskStore::new(
                tables, mirror, notify_tx,
            ))))
        }
        None => {
            tracing::info!("No API URL configured, using local storage only");
            let store = LocalTaskStore::new(mirror, notify_tx)
                .await
                .context("Failed to open local task store")?;
            Ok(Store::Local(Arc::new(store)))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskpad=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let (notify_tx, mut notifications) = notify::channel();
    let store = open_store(&args, notify_tx).await?;
    store.refresh().await?;

    let result = run(&args.command, store.ops()).await;
    output::drain(&mut notifications);
    result
}

async fn run(command: &Command, ops: &dyn TaskOps) -> anyhow::Result<()> {
    match command {
        Command::List { completed, active } => {
            let tasks = ops.tasks().await;
            let shown = tasks
                .iter()
                .filter(|t| {
                    if *completed {
                        t.completed
                    } else if *active {
                        !t.completed
                    } else {
                        true
                    }
                })
                .collect::<Vec<_>>();
            if shown.is_empty() {
                println!("No tasks.");
            }
            for task in shown {
                println!("{}", output::task_line(task));
            }
            Ok(())
        }

        Command::Add {
            title,
            description,
            image,
        } => {
            let mut draft = TaskDraft::new(title, description);
            if let Some(image) = image {
                draft = draft.with_image(image);
            }
            let new = draft.validate()?;
            ops.create(new).await?;
            Ok(())
        }

        Command::Show { id } => match ops.get(*id).await {
            Some(task) => {
                print!("{}", output::task_detail(&task));
                Ok(())
            }
            None => anyhow::bail!("No task with id {}", id),
        },

        Command::Edit {
            id,
            title,
            description,
            image,
        } => {
            let patch = TaskPatch {
                title: title.clone(),
                description: description.clone(),
                image: image.clone(),
                completed: None,
            };
            if patch.is_empty() {
                anyhow::bail!("Nothing to change; pass --title, --description or --image");
            }
            ops.update(*id, patch).await?;
            Ok(())
        }

        Command::Done { id } => {
            ops.toggle_complete(*id).await?;
            Ok(())
        }

        Command::Rm { id } => {
            ops.delete(*id).await?;
            Ok(())
        }

        Command::Comment { id, text, author } => {
            let new = CommentDraft::new(*id, text, author).validate()?;
            ops.add_comment(new).await?;
            Ok(())
        }

        Command::Sync => {
            // refresh() already fetched; just report what we have.
            let tasks = ops.tasks().await;
            println!("{} tasks.", tasks.len());
            Ok(())
        }
    }
}
