use std::path::PathBuf;

use clap::Parser;

use crate::config::{AppConfig, ConfigError};

/// Terminal client for a streaming web-search answer service.
#[derive(Debug, Parser)]
#[command(name = "askstream", version, about)]
pub struct Cli {
    /// Stream endpoint; the query is appended as a path segment
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Config file (defaults to .askstream/config.yaml when present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level for the log file, e.g. debug or askstream=trace
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Ask one question, print the answer and exit
    #[arg(short, long, value_name = "QUESTION")]
    pub query: Option<String>,
}

impl Cli {
    /// Defaults, then file, then environment, then flags.
    pub fn resolve_config(&self, env_base_url: Option<String>) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::load(self.config.as_deref())?;
        config.apply_env(env_base_url);
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        config.validate()?;
        Ok(config)
    }
}
