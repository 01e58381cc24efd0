//! Opsdeck host shell.
//!
//! A minimal terminal host for the session core: it constructs the manager
//! once, runs startup hydration, interprets the redirect signals the core
//! returns, and drives login (with the first-login password change) and
//! logout. The real dashboard screens live elsewhere; this binary exists so
//! the session lifecycle can be exercised end to end from a terminal.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use opsdeck_core::{
    AuthClient, Config, Hydration, KeyringStore, SessionManager, SessionPolicy, SessionState,
};

type Manager = SessionManager<AuthClient, KeyringStore>;

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
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    info!("Opsdeck shell starting");

    let mut config = Config::load()?;
    let api = AuthClient::new(config.api_base_url.as_str())?;
    let store = KeyringStore::new();
    let manager = SessionManager::with_policy(
        api,
        store,
        SessionPolicy {
            offline_trust: config.offline_trust,
        },
    );

    let hydration = manager.hydrate().await;
    match hydration {
        Hydration::Offline => {
            eprintln!("Warning: auth service unreachable, using the stored session.");
        }
        Hydration::Rejected => {
            // The shell has no public surfaces, so the redirect signal
            // always lands on the login prompt.
            eprintln!("Stored session is no longer valid; please log in again.");
        }
        Hydration::Restored | Hydration::NoSession => {}
    }

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("status");

    match command {
        "status" => status(&manager),
        "login" => login(&manager, &mut config, args.get(2).map(String::as_str)).await?,
        "logout" => {
            manager.logout().await;
            println!("Logged out.");
        }
        _ => usage(),
    }

    info!("Opsdeck shell exiting");
    Ok(())
}

fn usage() {
    eprintln!("Usage: opsdeck [status|login [email]|logout]");
}

fn status(manager: &Manager) {
    match (manager.state(), manager.identity()) {
        (SessionState::Hydrating, _) => println!("Session check still in progress."),
        (state, Some(identity)) if state.is_authenticated() => {
            let suffix = if state.reset_required() {
                " - password change required"
            } else {
                ""
            };
            println!(
                "Logged in as {} <{}> ({}){}.",
                identity.display_name, identity.email, identity.role, suffix
            );
        }
        _ => println!("Not logged in."),
    }
}

async fn login(manager: &Manager, config: &mut Config, email_arg: Option<&str>) -> Result<()> {
    // A session restored in the reset-required state has no usable current
    // password in this process; logging in again re-establishes it, so only
    // a fully active session short-circuits here.
    if manager.is_authenticated() && !manager.reset_required() {
        status(manager);
        return Ok(());
    }

    let email = match email_arg {
        Some(email) => email.to_string(),
        None => prompt("Email", config.last_username.as_deref())?,
    };
    let password = prompt("Password", None)?;

    let outcome = manager.login(&email, &password).await;
    if !outcome.success {
        println!("Login failed.");
        return Ok(());
    }

    config.last_username = Some(email);
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }

    if outcome.reset_required {
        println!("A password change is required before continuing.");
        loop {
            let new_password = prompt("New password (empty to postpone)", None)?;
            if new_password.is_empty() {
                println!("Password change postponed; log in again to complete it.");
                break;
            }
            if manager.reset_password(&new_password).await {
                println!("Password updated.");
                break;
            }
            println!("Password change rejected; try another password.");
        }
    }

    status(manager);
    Ok(())
}

fn prompt(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(default) => print!("{} [{}]: ", label, default),
        None => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let value = line.trim();

    if value.is_empty() {
        if let Some(default) = default {
            return Ok(default.to_string());
        }
    }
    Ok(value.to_string())
}
