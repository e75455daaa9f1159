use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use consul_config::{most_specific_match, possible_keys, HostContext, KeyValue, SettingsConfig};

/// Inspect how settings keys resolve against the Consul key hierarchy
#[derive(Parser, Debug)]
#[command(name = "consul-keys")]
#[command(about = "Inspect hierarchical Consul settings keys")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the candidate keys for a setting, most specific first
    Candidates {
        key: String,

        #[command(flatten)]
        identity: IdentityArgs,

        /// Print as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Pick the most specific of the given entries (least specific first)
    Resolve {
        key: String,

        /// Entry as KEY=VALUE; repeat in least-specific-first order
        #[arg(short, long = "entry", value_parser = parse_entry)]
        entries: Vec<KeyValue>,

        #[command(flatten)]
        identity: IdentityArgs,
    },
}

#[derive(Args, Debug)]
struct IdentityArgs {
    /// Settings file (YAML, TOML or JSON); CONSUL_CONFIG_* variables still apply
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    service_name: Option<String>,

    #[arg(long)]
    api_version: Option<String>,

    #[arg(long)]
    web_host_url: Option<String>,

    #[arg(long)]
    handler_factory_path: Option<String>,
}

impl IdentityArgs {
    fn host_context(&self) -> Result<Option<HostContext>> {
        let settings = self.apply(SettingsConfig::read(self.config.as_deref())?)?;
        Ok(settings.host_context())
    }

    /// Overlay the command line flags on loaded settings, then validate.
    fn apply(&self, mut settings: SettingsConfig) -> Result<SettingsConfig> {
        if let Some(name) = &self.service_name {
            settings.service_name = Some(name.clone());
        }
        if let Some(version) = &self.api_version {
            settings.api_version = Some(version.clone());
        }
        if let Some(url) = &self.web_host_url {
            settings.web_host_url = Some(url.clone());
        }
        if let Some(path) = &self.handler_factory_path {
            settings.handler_factory_path = Some(path.clone());
        }

        settings.validate()?;
        Ok(settings)
    }
}

fn parse_entry(raw: &str) -> std::result::Result<KeyValue, String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok(KeyValue::new(key, value)),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Candidates { key, identity, json } => {
            let context = identity.host_context()?;
            debug!(?context, "Building candidate keys");

            let keys = possible_keys(&key, context.as_ref());
            if json {
                println!("{}", serde_json::to_string_pretty(&keys)?);
            } else {
                for candidate in keys {
                    println!("{}", candidate);
                }
            }
        }
        Command::Resolve {
            key,
            entries,
            identity,
        } => {
            let context = identity.host_context()?;
            debug!(?context, entries = entries.len(), "Resolving setting");

            match most_specific_match(&entries, &key, context.as_ref()) {
                Some(best) => println!("{} = {}", best.key, best.value),
                None => bail!("No entry matches any candidate key for '{}'", key),
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("consul_config={},consul_keys={}", level, level).into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
