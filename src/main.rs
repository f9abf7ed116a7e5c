use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use passwordstate::config::{default_config_path, Config};
use passwordstate::facts::fetch_facts;
use passwordstate::report::ModuleResult;
use passwordstate::update::ensure_present;
use passwordstate::{DesiredFields, PasswordTarget};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn parse_duration_arg(s: &str) -> Result<Duration, String> {
    passwordstate::duration::parse_duration(s).map_err(|e| e.to_string())
}

fn parse_field_arg(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {s:?}"))?;
    if name.is_empty() {
        return Err("field name must not be empty".to_string());
    }
    Ok((name.to_string(), value.to_string()))
}

#[derive(Parser)]
#[command(name = "passwordstate")]
#[command(version, about = "Manage and read Passwordstate passwords")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ConnectionArgs {
    /// Base URL of the Passwordstate instance
    #[arg(long, global = true, env = "PASSWORDSTATE_URL")]
    url: Option<String>,

    /// API key of the password list
    #[arg(long, global = true, env = "PASSWORDSTATE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Windows login for NTLM authentication (DOMAIN\user)
    #[arg(long, global = true, env = "PASSWORDSTATE_API_USERNAME")]
    api_username: Option<String>,

    /// Password of the Windows login
    #[arg(long, global = true, env = "PASSWORDSTATE_API_PASSWORD", hide_env_values = true)]
    api_password: Option<String>,

    /// Per-request timeout (e.g. "30s", "2m")
    #[arg(long, global = true, value_parser = parse_duration_arg)]
    timeout: Option<Duration>,
}

impl ConnectionArgs {
    fn into_config(self) -> Config {
        Config {
            url: self.url,
            api_key: self.api_key,
            api_username: self.api_username,
            api_password: self.api_password,
            timeout: self.timeout,
            user_agent: None,
        }
    }
}

#[derive(Args)]
struct LocatorArgs {
    /// Password list searched by match-field lookups
    #[arg(long)]
    password_list_id: Option<String>,

    /// Id of the password
    #[arg(long)]
    password_id: Option<String>,

    /// Field used to find the password when no id is given
    #[arg(long)]
    match_field: Option<String>,

    /// Value the match field must hold
    #[arg(long)]
    match_field_id: Option<String>,
}

impl LocatorArgs {
    fn target(&self) -> passwordstate::Result<PasswordTarget> {
        PasswordTarget::from_parts(
            self.password_list_id.as_deref(),
            self.password_id.as_deref(),
            self.match_field.as_deref(),
            self.match_field_id.as_deref(),
        )
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum State {
    Present,
}

#[derive(Subcommand)]
enum Command {
    /// Create or update a password
    Password {
        #[arg(long, value_enum, default_value_t = State::Present)]
        state: State,

        #[command(flatten)]
        locator: LocatorArgs,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        username: Option<String>,

        /// New password value
        #[arg(long, env = "PASSWORDSTATE_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Additional field to set, as NAME=VALUE (repeatable)
        #[arg(long = "field", value_name = "NAME=VALUE", value_parser = parse_field_arg)]
        fields: Vec<(String, String)>,
    },

    /// Print a password's fields as facts
    Fact {
        /// Prefix of every fact name
        #[arg(long)]
        fact_name: String,

        #[command(flatten)]
        locator: LocatorArgs,
    },
}

fn init_tracing() {
    // stdout carries the module result, so logs go to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
}

async fn run(cli: Cli) -> Result<ModuleResult> {
    let config = Config::load_or_default(&cli.config)?.with_overrides(cli.connection.into_config());
    debug!(?config, "resolved connection config");

    match cli.command {
        Command::Password {
            state: State::Present,
            locator,
            title,
            username,
            password,
            fields,
        } => {
            let target = locator.target()?;
            let client = config.connect()?;

            let mut desired = DesiredFields::new();
            for (name, value) in fields {
                desired = desired.with_field(name, value);
            }
            if let Some(title) = title {
                desired = desired.with_title(title);
            }
            if let Some(username) = username {
                desired = desired.with_username(username);
            }
            if let Some(password) = password {
                desired = desired.with_password(password);
            }

            let outcome = ensure_present(&client, &target, &desired).await?;
            Ok(ModuleResult::from_outcome(outcome))
        }
        Command::Fact { fact_name, locator } => {
            let target = locator.target()?;
            let client = config.connect()?;
            let facts = fetch_facts(&client, &target, &fact_name).await?;
            Ok(ModuleResult::facts(facts))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let result = match run(cli).await {
        Ok(result) => result,
        Err(err) => ModuleResult::failure(format!("{err:#}")),
    };

    let json = serde_json::to_string(&result).context("Failed to serialize module result")?;
    println!("{json}");

    if result.failed {
        std::process::exit(result.exit_code());
    }
    Ok(())
}
