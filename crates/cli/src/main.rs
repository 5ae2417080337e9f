//! `MizigoSmart` CLI - drive the session gate from a terminal.
//!
//! Sessions live in a JSON file standing in for the browser's `localStorage`,
//! so successive invocations behave like successive page loads in one tab.
//!
//! # Usage
//!
//! ```bash
//! # Open a protected page while logged out (records it as the intended page)
//! mizigo visit /track.html
//!
//! # Log in; lands back on /track.html
//! mizigo login --id 7 --first-name Ann --last-name Kimaro --email ann@example.com
//!
//! # Inspect the session
//! mizigo status
//! mizigo can create_booking
//!
//! # Log out
//! mizigo logout
//! ```
//!
//! # Environment Variables
//!
//! - `MIZIGO_STATE_FILE` - Session file (default: `.mizigo/session.json`)
//! - `MIZIGO_LOG_JSON` - Emit JSON logs when set
//! - `RUST_LOG` - Log filter (default: `mizigo_gate=info,mizigo_cli=info`)
//! - Gate settings (`MIZIGO_SESSION_TIMEOUT_SECS` etc.), see `mizigo_gate::config`

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

#[derive(Parser)]
#[command(name = "mizigo")]
#[command(author, version, about = "MizigoSmart session gate CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and follow the post-login redirect
    Login {
        /// User identifier
        #[arg(long)]
        id: String,

        /// First name
        #[arg(short, long)]
        first_name: String,

        /// Last name
        #[arg(short, long, default_value = "")]
        last_name: String,

        /// Email address
        #[arg(short, long)]
        email: Option<String>,

        /// Role (`customer`, `admin`)
        #[arg(short, long, default_value = "customer")]
        role: String,

        /// Remember the email address for the login form
        #[arg(long, requires = "email")]
        remember: bool,
    },
    /// Log out
    Logout,
    /// Show the current session
    Status,
    /// Check a single permission for the current user
    Can {
        /// Permission name, e.g. `create_booking`
        permission: String,
    },
    /// List every permission the current user holds
    Permissions,
    /// Simulate loading a page
    Visit {
        /// Page path or URL, e.g. `/dashboard.html`
        page: String,
    },
    /// Manage the remembered login email
    Email {
        #[command(subcommand)]
        action: EmailAction,
    },
}

#[derive(Subcommand)]
enum EmailAction {
    /// Remember an address
    Remember { email: String },
    /// Show the remembered address
    Show,
    /// Forget the remembered address
    Forget,
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mizigo_gate=info,mizigo_cli=info".into());

    // Logs go to stderr so command output stays pipeable
    let json = std::env::var("MIZIGO_LOG_JSON").is_ok();
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

fn main() {
    // Load .env before reading RUST_LOG
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), commands::CliError> {
    let ctx = commands::Context::from_env()?;
    match cli.command {
        Commands::Login {
            id,
            first_name,
            last_name,
            email,
            role,
            remember,
        } => commands::session::login(
            &ctx,
            &commands::session::LoginArgs {
                id,
                first_name,
                last_name,
                email,
                role,
                remember,
            },
        )?,
        Commands::Logout => commands::session::logout(&ctx),
        Commands::Status => commands::session::status(&ctx),
        Commands::Can { permission } => commands::session::can(&ctx, &permission),
        Commands::Permissions => commands::session::permissions(&ctx),
        Commands::Visit { page } => commands::page::visit(&ctx, &page),
        Commands::Email { action } => match action {
            EmailAction::Remember { email } => commands::session::remember_email(&ctx, &email)?,
            EmailAction::Show => commands::session::show_email(&ctx),
            EmailAction::Forget => commands::session::forget_email(&ctx),
        },
    }
    Ok(())
}
