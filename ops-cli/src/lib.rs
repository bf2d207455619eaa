//! Operations CLI for the PKI URL configuration
//!
//! Reads and partially updates the issuing certificate, CRL distribution
//! point and OCSP server URLs against the storage backend named in the
//! service configuration.
//!
//! # Example Usage
//!
//! ```bash
//! # Show the current URLs
//! pki-urls read
//! pki-urls --format yaml read
//!
//! # Set lists; omitted lists are kept
//! pki-urls write --issuing-certificates http://pki.example.com/ca.pem
//! pki-urls write --ocsp-servers http://ocsp1.example.com,http://ocsp2.example.com
//!
//! # Clear a list
//! pki-urls write --crl-distribution-points ""
//!
//! # Point at another data directory
//! pki-urls --storage-path /var/lib/pki write --ocsp-servers http://ocsp.example.com
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use logger_redacted::LoggerError;
use pki_urls::{
    logical, FileSystemConfig, ServiceConfig, StorageConfig, UrlConfigHandler, UrlConfigUpdate,
};
use serde_json::{Map, Value};
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "pki-urls", version)]
#[command(about = "Manage the URLs embedded into issued certificates")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "pki-urls.yaml")]
    pub config: PathBuf,

    /// Filesystem storage directory, overrides the configured backend
    #[arg(long, global = true)]
    pub storage_path: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format for read
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the configured URLs
    Read,
    /// Set one or more URL lists; lists left out keep their value
    Write(WriteArgs),
    /// Describe the config/urls path and its fields
    HelpText,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteArgs {
    /// Comma-separated issuing certificate URLs ("" clears)
    #[arg(long, value_name = "URLS")]
    pub issuing_certificates: Option<String>,

    /// Comma-separated CRL distribution point URLs ("" clears)
    #[arg(long, value_name = "URLS")]
    pub crl_distribution_points: Option<String>,

    /// Comma-separated OCSP server URLs ("" clears)
    #[arg(long, value_name = "URLS")]
    pub ocsp_servers: Option<String>,
}

impl From<WriteArgs> for UrlConfigUpdate {
    fn from(args: WriteArgs) -> Self {
        UrlConfigUpdate {
            issuing_certificates: args.issuing_certificates,
            crl_distribution_points: args.crl_distribution_points,
            ocsp_servers: args.ocsp_servers,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl Cli {
    /// Service configuration with command-line overrides applied
    pub fn service_config(&self) -> Result<ServiceConfig> {
        let mut config = ServiceConfig::load(Some(&self.config))
            .with_context(|| format!("failed to load configuration from {}", self.config.display()))?;

        if let Some(path) = &self.storage_path {
            config.storage = StorageConfig::Filesystem(FileSystemConfig { path: path.clone() });
        }
        if self.verbose {
            config.logging.log_level = "debug".to_string();
        }
        Ok(config)
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.service_config()?;

    match logger_redacted::init(&config.logging) {
        Ok(()) | Err(LoggerError::AlreadyInitialized) => {}
        Err(err) => return Err(err.into()),
    }
    debug!(storage = ?config.storage, "Loaded service configuration");

    let handler = config.build_handler().await?;
    let mut stdout = std::io::stdout().lock();
    execute(&handler, &cli.command, cli.format, &mut stdout).await
}

/// Run one command, writing its output to `out`.
pub async fn execute<W: Write>(
    handler: &UrlConfigHandler,
    command: &Command,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Read => match handler.read().await? {
            Some(response) => writeln!(out, "{}", render(&response.data, format)?)?,
            None => eprintln!("{}", "No URLs configured".yellow()),
        },
        Command::Write(args) => {
            let update = UrlConfigUpdate::from(args.clone());
            if update.is_empty() {
                eprintln!("{}", "No fields given; saving the record unchanged".yellow());
            }
            handler.write(&update).await?;
            eprintln!("{}", "URL configuration saved".green());
        }
        Command::HelpText => {
            let path = logical::urls_path();
            writeln!(out, "{}\n\n{}\n", path.help_synopsis, path.help_description)?;
            writeln!(out, "Fields:")?;
            for field in &path.fields {
                writeln!(out, "  {:<26}{}", field.name, field.description)?;
            }
        }
    }
    Ok(())
}

pub fn render(data: &Map<String, Value>, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
    };
    Ok(rendered.trim_end().to_string())
}
