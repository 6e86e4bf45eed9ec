//! `oa-auth` - query the OA auth cache and the OA service from a shell.
//!
//! Configuration comes from the optional `--config` YAML file and `ZLJOA_*`
//! environment variables. Results are printed to stdout as JSON; the exit
//! code is non-zero only when the check itself could not be carried out.

mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use oa_auth::OaAuthConfig;
use oa_auth::infra::RemoteAuthorization;
use oa_auth_sdk::{LoginRequest, OaAuthError};
use secrecy::SecretString;
use serde_json::Value;
use tracing::error;

use crate::logging::LogFormat;

/// OA auth client
#[derive(Parser, Debug)]
#[command(name = "oa-auth")]
#[command(version, about, long_about = None)]
struct Cli {
    /// YAML configuration file (environment variables override it)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log more; repeat for more detail (RUST_LOG overrides)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a user's access to a URI from the cached permissions
    CheckAccess {
        #[arg(long)]
        open_id: String,
        #[arg(long)]
        uri: String,
        /// Application to check; defaults to the configured app key
        #[arg(long)]
        app_key: Option<String>,
    },

    /// Check whether a login session is alive
    Session {
        #[arg(long)]
        token: String,
    },

    /// Print the user cached for a login session
    CachedUser {
        #[arg(long)]
        token: String,
    },

    /// Log in against the OA service
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value_t = 0)]
        reserved_terminal: u32,
        /// Token of an existing session, sent as bearer
        #[arg(long)]
        token: Option<String>,
    },

    /// Log a session out of the OA service
    Logout {
        #[arg(long)]
        token: String,
    },

    /// Fetch the full user record from the OA service
    User {
        #[arg(long)]
        token: String,
    },

    /// Ask the OA service whether a session may access a URI
    CanVisit {
        #[arg(long)]
        token: String,
        #[arg(long)]
        uri: String,
    },

    /// Exchange the application credentials for a client code
    Code,

    /// Print the frontend address for a client code
    FrontendUrl {
        #[arg(long)]
        code: String,
    },
}

impl Command {
    fn reads_cache(&self) -> bool {
        matches!(
            self,
            Self::CheckAccess { .. } | Self::Session { .. } | Self::CachedUser { .. }
        )
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_format);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "oa-auth failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let cfg = OaAuthConfig::load(cli.config.as_deref()).context("loading configuration")?;

    let output = if cli.command.reads_cache() {
        run_cached(&cfg, cli.command).await?
    } else {
        run_remote(&cfg, cli.command).await?
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

// Cache checks need Redis; remote calls and the frontend URL do not.
async fn run_cached(cfg: &OaAuthConfig, command: Command) -> Result<Value> {
    let client = oa_auth::build_client(cfg)
        .await
        .context("connecting to the cache store")?;

    let outcome = match command {
        Command::CheckAccess {
            open_id,
            uri,
            app_key,
        } => {
            let app_key = app_key.unwrap_or_else(|| client.app_key().to_owned());
            client.check_access(&open_id, &app_key, &uri).await?
        }
        Command::Session { token } => client.check_session_live(&token).await?,
        Command::CachedUser { token } => client.get_cached_user(&token).await?,
        _ => anyhow::bail!("command does not read the cache"),
    };

    Ok(serde_json::to_value(outcome)?)
}

async fn run_remote(cfg: &OaAuthConfig, command: Command) -> Result<Value> {
    let remote = RemoteAuthorization::new(cfg).map_err(OaAuthError::from)?;

    let body = match command {
        Command::Login {
            username,
            password,
            reserved_terminal,
            token,
        } => {
            let mut request = LoginRequest::new(username, SecretString::from(password))
                .reserved_terminal(reserved_terminal);
            if let Some(token) = token {
                request = request.bearer_token(SecretString::from(token));
            }
            remote.login(&request).await
        }
        Command::Logout { token } => remote.logout(&token).await,
        Command::User { token } => remote.user(&token).await,
        Command::CanVisit { token, uri } => remote.can_visit(&token, &uri).await,
        Command::Code => remote.client_code().await,
        Command::FrontendUrl { code } => remote.frontend_url_for_code(&code).map(Value::String),
        _ => anyhow::bail!("command is not a remote call"),
    };

    Ok(body.map_err(OaAuthError::from)?)
}
