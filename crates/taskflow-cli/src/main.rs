//! TaskFlow CLI - a command-line client for the TaskFlow task manager.
//!
//! Sessions are persisted between runs, so `taskflow login` once and then
//! work with tasks and projects until the refresh token is rejected.

mod commands;
mod output;

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use taskflow_core::auth::LogNavigator;
use taskflow_core::models::{ProjectRole, TaskFilter, TaskPriority, TaskStatus};
use taskflow_core::{App, Config};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "taskflow", version, about = "Manage TaskFlow tasks and projects")]
struct Cli {
    /// API base URL (overrides TASKFLOW_API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the session
    Login {
        #[arg(long)]
        email: Option<String>,
        /// Read from the terminal when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account and log in
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami {
        /// Ask the server instead of reading the cached user
        #[arg(long)]
        remote: bool,
    },
    #[command(subcommand)]
    Projects(ProjectCommand),
    #[command(subcommand)]
    Tasks(TaskCommand),
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    /// List visible projects, marking the selected one
    List,
    /// Select the active project
    Use { project_id: String },
    /// Clear the active project
    Clear,
    Create {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    Rename {
        project_id: String,
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    Delete { project_id: String },
    /// List members of a project (defaults to the active project)
    Members { project_id: Option<String> },
    Invite {
        email: String,
        #[arg(long, default_value = "Viewer")]
        role: ProjectRole,
        #[arg(long)]
        project: Option<String>,
    },
    SetRole {
        user_id: String,
        role: ProjectRole,
        #[arg(long)]
        project: Option<String>,
    },
    Remove {
        user_id: String,
        #[arg(long)]
        project: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    List {
        /// all, todo, in-progress or done
        #[arg(long, default_value = "all")]
        status: TaskFilter,
    },
    Create {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "medium")]
        priority: TaskPriority,
        #[arg(long, default_value = "todo")]
        status: TaskStatus,
        /// YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
        /// Defaults to the active project
        #[arg(long)]
        project: Option<String>,
    },
    Update {
        task_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<TaskPriority>,
        #[arg(long)]
        due: Option<String>,
    },
    Status { task_id: String, status: TaskStatus },
    Delete { task_id: String },
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// List every user
    Users,
    DeleteUser { user_id: String },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;
    if cli.api_url.is_some() {
        config.api_url = cli.api_url;
    }
    info!(api_url = %config.api_url(), "TaskFlow CLI starting");

    let mut app = App::open(config, Arc::new(LogNavigator))?;
    app.session.restore();

    let result = commands::run(&mut app, cli.command).await;
    output::print_toasts(&mut app.toasts);
    result
}
