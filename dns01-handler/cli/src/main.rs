use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use dns01_handler::{
    digest_of, ChallengeName, HandlerConfig, HickoryResolver, Loopback, PropagationPolicy,
    DEFAULT_ACME_DNS_PREFIX,
};
use documented::DocumentedFields;
use fs_err as fs;
use serde::{Deserialize, Serialize};
use toml_edit::ser::to_document;
use tracing::info;

#[derive(Parser)]
enum Command {
    /// Print the zone, record name and TXT value published for a host
    Preview {
        /// Host under validation, e.g. www.example.com
        #[arg(long)]
        host: String,
        /// ACME key authorization of the challenge
        #[arg(long, default_value = "")]
        key_authorization: String,
    },
    /// Look up the challenge TXT record of a host in public DNS
    Check {
        /// Path to the configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Host under validation, e.g. www.example.com
        #[arg(long)]
        host: String,
        /// Override the loopback prefix of the configuration
        #[arg(long)]
        test_prefix: Option<String>,
        /// Wait until this TXT value is served
        #[arg(long, conflicts_with = "key_authorization")]
        expect: Option<String>,
        /// Wait until the digest of this key authorization is served
        #[arg(long)]
        key_authorization: Option<String>,
    },
    /// Generate configuration template
    Cfg {
        /// Write to file
        #[arg(short, long)]
        write_to: Option<PathBuf>,
    },
}

#[derive(Parser)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Deserialize, Serialize, DocumentedFields)]
#[serde(default)]
struct Config {
    /// Log every registrar and DNS round trip
    debug: bool,
    /// Prefix of the challenge record queried by loopback lookups
    acme_dns_prefix: String,
    /// Registrar API key
    api_key: String,
    /// Extra prefix for loopback lookups in test DNS setups
    loopback_prefix: String,
    /// Delay before the first propagation lookup in milliseconds
    propagation_delay_ms: u64,
    /// Number of propagation lookups before giving up
    propagation_tries: u32,
}

impl Default for Config {
    fn default() -> Self {
        let policy = PropagationPolicy::default();
        Self {
            debug: false,
            acme_dns_prefix: DEFAULT_ACME_DNS_PREFIX.into(),
            api_key: "".into(),
            loopback_prefix: "".into(),
            propagation_delay_ms: policy.initial_delay.as_millis() as u64,
            propagation_tries: policy.max_tries,
        }
    }
}

impl Config {
    fn to_commented_toml(&self) -> Result<String> {
        let mut doc = to_document(self)?;

        for (i, (mut key, _value)) in doc.iter_mut().enumerate() {
            let decor = key.leaf_decor_mut();
            let docstring = Self::FIELD_DOCS[i];

            let mut comment = String::new();
            for line in docstring.lines() {
                let line = if line.is_empty() {
                    String::from("#\n")
                } else {
                    format!("# {line}\n")
                };
                comment.push_str(&line);
            }
            decor.set_prefix(comment);
        }
        Ok(doc.to_string())
    }

    fn handler_config(&self) -> HandlerConfig {
        let api_key = Some(self.api_key.clone()).filter(|key| !key.is_empty());
        HandlerConfig::builder()
            .debug(self.debug)
            .acme_dns_prefix(self.acme_dns_prefix.clone())
            .maybe_api_key(api_key)
            .loopback_prefix(self.loopback_prefix.clone())
            .build()
    }

    fn propagation_policy(&self) -> PropagationPolicy {
        PropagationPolicy {
            initial_delay: Duration::from_millis(self.propagation_delay_ms),
            max_tries: self.propagation_tries,
        }
    }
}

fn load_config(config: Option<&PathBuf>) -> Result<Config> {
    let Some(path) = config else {
        return Ok(Config::default());
    };
    let config = toml_edit::de::from_str(&fs::read_to_string(path)?)?;
    Ok(config)
}

fn preview(host: &str, key_authorization: &str) -> Result<()> {
    let name = ChallengeName::parse(host)?;
    println!("zone:  {}", name.zone);
    println!("name:  {}", name.record_name);
    println!("type:  TXT");
    println!("value: {}", digest_of(key_authorization));
    Ok(())
}

async fn check(
    config: &Config,
    host: &str,
    test_prefix: Option<String>,
    expect: Option<String>,
) -> Result<()> {
    let mut handler_config = config.handler_config();
    if let Some(test_prefix) = test_prefix {
        handler_config.loopback_prefix = test_prefix;
    }
    let resolver = HickoryResolver::from_system_conf()?;
    let loopback = Loopback::new(&handler_config, resolver);
    match expect {
        Some(expected) => {
            info!("waiting for {}", loopback.challenge_fqdn(host, None));
            loopback
                .wait_for(host, &expected, &config.propagation_policy())
                .await?;
            println!("{expected}");
        }
        None => {
            for value in loopback.lookup(host, None).await? {
                println!("{value}");
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = match &args.command {
        Command::Check { config, .. } => {
            load_config(config.as_ref()).context("Failed to load configuration")?
        }
        _ => Config::default(),
    };
    {
        use tracing_subscriber::{fmt, EnvFilter};
        let default_level = if config.debug { "debug" } else { "info" };
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        fmt().with_env_filter(filter).init();
    }

    match args.command {
        Command::Preview {
            host,
            key_authorization,
        } => {
            preview(&host, &key_authorization)?;
        }
        Command::Check {
            config: _,
            host,
            test_prefix,
            expect,
            key_authorization,
        } => {
            let expect = expect.or_else(|| key_authorization.as_deref().map(digest_of));
            check(&config, &host, test_prefix, expect)
                .await
                .context("Failed to check challenge record")?;
        }
        Command::Cfg { write_to } => {
            let toml_str = Config::default().to_commented_toml()?;
            match write_to {
                Some(path) => fs::write(path, toml_str)?,
                None => println!("{}", toml_str),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_round_trips() {
        let toml_str = Config::default().to_commented_toml().unwrap();
        assert!(toml_str.contains("# Registrar API key\n"));
        let config: Config = toml_edit::de::from_str(&toml_str).unwrap();
        let handler_config = config.handler_config();
        assert_eq!(handler_config.acme_dns_prefix, DEFAULT_ACME_DNS_PREFIX);
        assert_eq!(handler_config.api_key, None);
        assert_eq!(config.propagation_policy(), PropagationPolicy::default());
    }

    #[test]
    fn api_key_is_passed_through() {
        let config: Config = toml_edit::de::from_str(r#"api_key = "secret""#).unwrap();
        assert_eq!(config.handler_config().api_key.as_deref(), Some("secret"));
    }
}
