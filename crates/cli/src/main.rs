mod config;
mod context;
mod demo_cmd;
mod output;
mod sessions_cmd;
mod watch_cmd;

use clap::{Parser, Subcommand};

use crate::context::AppContext;

#[derive(Parser)]
#[command(
    name = "cyclegraph",
    about = "CycleGraph CLI - browse rides and session reports"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List sessions, newest first
    Sessions {
        /// Print normalized rows as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the analysis report for one session
    Show {
        /// Session or ride id
        id: String,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Switch between the bundled demo dataset and the live server
    Demo {
        #[command(subcommand)]
        action: DemoAction,
    },

    /// Show the demo progression summary
    Progression {
        #[arg(long)]
        json: bool,
    },

    /// Keep the session list in sync and reprint it on every change
    Watch,

    /// Show or set configuration
    Config {
        /// Set the server URL
        #[arg(long)]
        server: Option<String>,

        /// Set the API key
        #[arg(long)]
        api_key: Option<String>,

        /// Set the profile version poll interval in seconds (0 disables)
        #[arg(long)]
        poll_secs: Option<u64>,
    },
}

#[derive(Subcommand)]
enum DemoAction {
    /// Use the bundled demo dataset
    On,
    /// Use the live server
    Off,
    /// Show the active data source
    Status,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());
    if matches!(cli.command, Commands::Watch) {
        for directive in ["cyclegraph=info", "cyclegraph_sync=info"] {
            if let Ok(directive) = directive.parse::<tracing_subscriber::filter::Directive>() {
                filter = filter.add_directive(directive);
            }
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli.command).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Sessions { json } => {
            sessions_cmd::run_sessions(&AppContext::load()?, json).await
        }
        Commands::Show { id, json } => {
            sessions_cmd::run_show(&AppContext::load()?, &id, json).await
        }
        Commands::Demo { action } => {
            let ctx = AppContext::load()?;
            match action {
                DemoAction::On => demo_cmd::set_demo(&ctx, true),
                DemoAction::Off => demo_cmd::set_demo(&ctx, false),
                DemoAction::Status => demo_cmd::demo_status(&ctx),
            }
        }
        Commands::Progression { json } => {
            demo_cmd::run_progression(&AppContext::load()?, json).await
        }
        Commands::Watch => watch_cmd::run_watch(&AppContext::load()?).await,
        Commands::Config {
            server,
            api_key,
            poll_secs,
        } => {
            if server.is_none() && api_key.is_none() && poll_secs.is_none() {
                config::show_config()
            } else {
                config::set_config(server, api_key, poll_secs)
            }
        }
    }
}
