//! Command-line interface

use crate::console;
use crate::model::NewsModel;
use crate::render;
use crate::services::Services;
use anyhow::{bail, Context, Result};
use newsdesk_core::{
    BackendKind, Config, DeleteOutcome, FirebaseAuth, ListOrder, Overrides, SubmitOutcome,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::info;

/// Manage the positive news feed
#[derive(Debug, clap::Parser)]
#[command(name = "newsdesk", author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[clap(long, global = true, env = "NEWSDESK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Document store: sqlite, memory or firestore
    #[clap(long, global = true, env = "NEWSDESK_BACKEND")]
    pub backend: Option<BackendKind>,

    /// SQLite database file
    #[clap(long, global = true, env = "NEWSDESK_DB")]
    pub db: Option<PathBuf>,

    /// User id stamped on new items when not signed in through Firebase
    #[clap(long, global = true, env = "NEWSDESK_USER")]
    pub user: Option<String>,

    /// List order: store, newest-first or oldest-first
    #[clap(long, global = true, env = "NEWSDESK_ORDER")]
    pub order: Option<ListOrder>,

    #[clap(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Print the news list
    List {
        /// Json output
        #[clap(long)]
        json: bool,
    },

    /// Add a news item
    Add {
        #[clap(long)]
        title: String,
        #[clap(long)]
        content: String,
    },

    /// Delete a news item by id
    Delete { id: String },

    /// Sign in with a Firebase email and password
    Login {
        #[clap(long)]
        email: String,
        #[clap(long, env = "NEWSDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the remembered sign-in
    Logout,

    /// Show the effective settings, or write them to a file
    Config {
        /// Save to this path instead of printing
        #[clap(long)]
        save: Option<PathBuf>,
    },

    /// Interactive panel (default)
    Panel,
}

impl Cli {
    /// Flag values that take precedence over the config file
    pub fn overrides(&self) -> Overrides {
        Overrides {
            backend: self.backend,
            database_path: self.db.clone(),
            user_id: self.user.clone(),
            order: self.order,
        }
    }

    /// Config file layered with the flags
    pub fn load_config(&self) -> Result<Config> {
        let config = Config::load(self.config.as_deref()).context("failed to load config")?;
        Ok(config.with_overrides(self.overrides()))
    }
}

/// Run the selected command
pub fn execute(command: Commands, config: &Config, runtime: Arc<Runtime>) -> Result<ExitCode> {
    match command {
        // Settings can be inspected even when they do not validate
        Commands::Config { save } => show_config(config, save.as_deref()),
        other => run_with_services(other, config, runtime),
    }
}

fn show_config(config: &Config, save: Option<&Path>) -> Result<ExitCode> {
    match save {
        Some(path) => {
            config
                .save(path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Saved settings to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(config)?),
    }
    Ok(ExitCode::SUCCESS)
}

fn run_with_services(
    command: Commands,
    config: &Config,
    runtime: Arc<Runtime>,
) -> Result<ExitCode> {
    let services = Services::from_config(config)?;

    match command {
        Commands::List { json } => {
            let mut panel = services.panel(config);
            runtime
                .block_on(panel.fetch_all())
                .context("failed to load news")?;
            if json {
                println!("{}", serde_json::to_string_pretty(panel.items())?);
            } else {
                print!("{}", render::render_list(panel.items()));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Add { title, content } => {
            let mut model = NewsModel::new(runtime, &services, config);
            model.set_title(title);
            model.set_content(content);
            let outcome = model.submit();
            print_toasts(&model);
            match outcome {
                SubmitOutcome::Created(id) => {
                    println!("{}", id);
                    Ok(ExitCode::SUCCESS)
                }
                SubmitOutcome::Rejected(field) => {
                    eprintln!("The {} field is required", field.label());
                    Ok(ExitCode::FAILURE)
                }
                SubmitOutcome::Failed(_) => Ok(ExitCode::FAILURE),
            }
        }
        Commands::Delete { id } => {
            let mut model = NewsModel::new(runtime, &services, config);
            let outcome = model.delete_id(&id);
            print_toasts(&model);
            Ok(match outcome {
                DeleteOutcome::Deleted => ExitCode::SUCCESS,
                DeleteOutcome::Failed(_) => ExitCode::FAILURE,
            })
        }
        Commands::Login { email, password } => {
            let Some(session) = services.session.as_ref() else {
                bail!("sign-in requires the firestore backend");
            };
            let auth_config = config
                .auth_config()
                .context("no Firebase API key configured")?;
            let auth = FirebaseAuth::new(auth_config)?;
            let user = runtime
                .block_on(auth.sign_in(&email, &password))
                .context("sign-in failed")?;
            println!("Signed in as {} ({})", user.label(), user.id);
            session.sign_in(user)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Logout => {
            let Some(session) = services.session.as_ref() else {
                bail!("sign-in requires the firestore backend");
            };
            session.sign_out()?;
            println!("Signed out");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config { save } => show_config(config, save.as_deref()),
        Commands::Panel => {
            info!("Opening interactive panel");
            console::run(NewsModel::new(runtime, &services, config))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_toasts(model: &NewsModel) {
    for toast in model.take_toasts() {
        println!("{}", render::render_toast(&toast));
    }
}
