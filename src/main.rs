use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::{Input, Password};
use std::sync::Arc;

use auth_session::auth::{AuthSessionManager, SqliteTokenStore, REFRESH_TOKEN_KEY};
use auth_session::config::{CliArgs, Command, Config, LogFormat};
use auth_session::http_client::AuthHttpClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();
    let config = Config::from_args(&args)?;
    config.validate()?;

    // Initialize logging with a configured level
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match config.log_format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }

    tracing::debug!("Backend: {}", config.base_url);
    tracing::debug!("Token store: {}", config.db_file.display());

    let store = Arc::new(SqliteTokenStore::open(&config.db_file)?);
    let client = AuthHttpClient::new(
        &config.base_url,
        config.http_connect_timeout,
        config.http_request_timeout,
    )?;
    let manager = AuthSessionManager::new(client, store.clone());

    match args.command {
        Command::Login { email, password } => {
            let email = match email {
                Some(email) => email,
                None => Input::new()
                    .with_prompt("Email")
                    .interact_text()
                    .context("Failed to read email")?,
            };
            let password = match password {
                Some(password) => password,
                None => Password::new()
                    .with_prompt("Password")
                    .interact()
                    .context("Failed to read password")?,
            };

            match manager.login(&email, &password).await {
                Ok(_) => {
                    println!("Logged in as {}", email);
                }
                Err(e) => {
                    eprintln!("Login failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Command::Status => {
            manager.initialize().await;
            println!("{}", manager.auth_status());
            if let Some(saved_at) = store.updated_at(REFRESH_TOKEN_KEY)? {
                println!("Session saved: {}", saved_at);
            }
        }
        Command::Whoami => {
            if !manager.initialize().await {
                println!("{}", manager.auth_status());
                std::process::exit(1);
            }
            let user = manager
                .current_user()
                .context("Authenticated session has no user")?;
            // Profile only; the refresh token stays in the store
            println!("{}", serde_json::to_string_pretty(&user.profile)?);
        }
        Command::Logout => {
            manager.logout();
            println!("{}", manager.auth_status());
        }
    }

    Ok(())
}
