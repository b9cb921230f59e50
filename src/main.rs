use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use onem2m_notebook::client::CseClient;
use onem2m_notebook::config::Settings;
use onem2m_notebook::types::Operation;

mod commands;

use commands::request::RequestArgs;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to onem2m.toml in the working directory if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// CSE address, overrides the configured cse.host
    #[arg(long, global = true)]
    host: Option<String>,

    /// Only print failures instead of full requests and responses
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Do not annotate short names with their long names
    #[arg(long, global = true)]
    short_names: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a resource
    Create(RequestArgs),

    /// Retrieve a resource
    Retrieve(RequestArgs),

    /// Update a resource
    Update(RequestArgs),

    /// Delete a resource
    Delete(RequestArgs),

    /// Send the request described in a JSON file
    Send {
        /// Request parameters, including an "operation" key
        file: PathBuf,
    },

    /// Send the request described in a JSON file repeatedly in the background
    Repeat {
        file: PathBuf,

        #[arg(long, default_value_t = 1)]
        times: u32,

        /// Seconds between two requests
        #[arg(long, default_value_t = 0.0)]
        interval: f64,
    },

    /// Check the connection to the CSE
    Check,

    /// Check the connection and optionally prepare the CSE for a notebook
    Init {
        /// Resource structure to prepare after a reset
        kind: Option<String>,
    },

    /// Show the CSE's resource tree
    Tree,

    /// Reset the CSE through the upper tester
    Reset,

    /// Reset the CSE through its reset endpoint
    Clean,

    /// Create the initial resources for a notebook
    Prepare { kind: String },

    /// Print notifications received by the notification server
    Notifications,

    /// Look up a path in a JSON file
    Xpath { file: PathBuf, path: String },

    /// Print a oneM2M timestamp
    Date {
        /// Offset from now in seconds
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        delta: i64,
    },

    /// Print the version
    Version,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let settings = load_settings(&cli);
    let success = match cli.command {
        Command::Xpath { file, path } => {
            let theme = match &settings {
                Ok(settings) => settings.output.theme.clone(),
                Err(_) => Settings::default().output.theme,
            };
            commands::xpath::execute(&file, &path, &theme)?
        }
        Command::Date { delta } => {
            commands::date::execute(delta)?;
            true
        }
        Command::Version => {
            commands::version::execute()?;
            true
        }
        command => run(&CseClient::new(settings?)?, command)?,
    };
    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run(client: &CseClient, command: Command) -> Result<bool> {
    Ok(match command {
        Command::Create(args) => commands::request::execute(client, Operation::Create, args)?,
        Command::Retrieve(args) => commands::request::execute(client, Operation::Retrieve, args)?,
        Command::Update(args) => commands::request::execute(client, Operation::Update, args)?,
        Command::Delete(args) => commands::request::execute(client, Operation::Delete, args)?,
        Command::Send { file } => commands::request::send_file(client, &file)?,
        Command::Repeat {
            file,
            times,
            interval,
        } => commands::repeat::execute(client, &file, times, interval)?,
        Command::Check => commands::cse::check(client),
        Command::Init { kind } => commands::cse::init(client, kind.as_deref())?,
        Command::Tree => commands::cse::tree(client)?,
        Command::Reset => client.reset_cse(true)?,
        Command::Clean => commands::cse::clean(client),
        Command::Prepare { kind } => client.setup_initial_resource_structure(&kind, true)?,
        Command::Notifications => commands::notifications::execute(client)?,
        Command::Xpath { .. } | Command::Date { .. } | Command::Version => {
            unreachable!("handled without a CSE connection")
        }
    })
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::new()?,
    };
    if let Some(host) = &cli.host {
        settings.cse.host = host.trim_end_matches('/').to_string();
    }
    if cli.quiet {
        settings.output.verbose = false;
    }
    if cli.short_names {
        settings.output.long_names = false;
    }
    Ok(settings)
}
