//! Collection Client CLI Application
//!
//! Command-line interface to the collection API: look subjects up, push
//! checker statuses, inspect the detected API generation and the resolved
//! configuration.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand};
use collection_client_lib::{
    parse_timeout, CheckerStatus, ClientOverrides, CollectionClient, ConfigManager,
    ConfigResolver, FileConfig,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::process;
use tracing_subscriber::EnvFilter;
use ui::PushOutcome;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for collection-client
#[derive(Parser, Debug)]
#[command(name = "collection-client")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pull and push availability-check results to a collection API")]
#[command(
    long_about = "Pull and push availability-check results to a collection API.\n\nThe API generation (legacy or modern) is detected on first use and every request is routed accordingly."
)]
#[command(styles = STYLES)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// API token (falls back on PYFUNCEBLE_COLLECTION_API_TOKEN)
    #[arg(
        long = "token",
        value_name = "TOKEN",
        global = true,
        help_heading = "Collection"
    )]
    pub token: Option<String>,

    /// Base URL of the collection API
    #[arg(
        long = "url-base",
        value_name = "URL",
        global = true,
        help_heading = "Collection"
    )]
    pub url_base: Option<String>,

    /// Preferred status origin: frequent, latest or recommended
    #[arg(
        long = "preferred-status-origin",
        value_name = "ORIGIN",
        global = true,
        help_heading = "Collection"
    )]
    pub preferred_status_origin: Option<String>,

    /// Request timeout in seconds
    #[arg(
        long = "timeout",
        value_name = "SECONDS",
        global = true,
        help_heading = "Collection"
    )]
    pub timeout: Option<String>,

    /// Use specific config file instead of automatic discovery
    #[arg(
        long = "config",
        value_name = "FILE",
        global = true,
        help_heading = "Configuration"
    )]
    pub config: Option<String>,

    /// Output results in JSON format
    #[arg(short = 'j', long = "json", global = true, help_heading = "Output Format")]
    pub json: bool,

    /// Verbose logging
    #[arg(
        short = 'v',
        long = "verbose",
        global = true,
        help_heading = "Configuration"
    )]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Look subjects up in the collection
    Pull {
        /// Domains, IPs or URLs to look up
        #[arg(value_name = "SUBJECT", required = true)]
        subjects: Vec<String>,
    },

    /// Push checker statuses read from a JSON file
    Push {
        /// JSON file holding one status record or an array of them
        #[arg(short = 'f', long = "file", value_name = "FILE")]
        file: String,
    },

    /// Detect and print the API generation
    Probe,

    /// Print the resolved configuration
    Config,
}

/// Status records accepted by `push --file`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatusInput {
    Many(Vec<CheckerStatus>),
    One(CheckerStatus),
}

impl StatusInput {
    fn into_vec(self) -> Vec<CheckerStatus> {
        match self {
            StatusInput::Many(statuses) => statuses,
            StatusInput::One(status) => vec![status],
        }
    }
}

#[derive(Debug, Serialize)]
struct PullReport<'a> {
    subject: &'a str,
    found: bool,
    record: Option<Value>,
}

#[derive(Debug, Serialize)]
struct PushReport<'a> {
    subject: &'a str,
    checker_type: &'a str,
    submitted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(args.verbose);

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Install the fmt subscriber. `--verbose` forces debug output for both
/// crates; otherwise `RUST_LOG` applies, defaulting to warnings.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("collection_client_lib=debug,collection_client=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .ok();
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "collection-client starting");

    let (loaded, source) = load_file_config(&args)?;
    let overrides = build_overrides(&args)?;
    let resolver = ConfigResolver::from_process_env(loaded);
    let client = CollectionClient::from_resolver(&resolver, &overrides)?;

    match &args.command {
        Command::Pull { subjects } => run_pull(&client, subjects, &args).await,
        Command::Push { file } => run_push(&client, file, &args).await,
        Command::Probe => run_probe(&client, &args).await,
        Command::Config => run_config(&client, &source, &args),
    }
}

/// Load the explicit `--config` file, or fall back on discovery.
///
/// Returns the loaded configuration and a description of where it came from.
fn load_file_config(
    args: &Args,
) -> Result<(Option<FileConfig>, String), Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new(args.verbose);

    if let Some(path) = &args.config {
        tracing::debug!(path = %path, "Using explicit config file");
        let file_config = config_manager
            .load_file(path)
            .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?;
        return Ok((Some(file_config), path.clone()));
    }

    match config_manager.discover_and_load() {
        Ok(Some(file_config)) => Ok((Some(file_config), "discovered".to_string())),
        Ok(None) => Ok((None, "none".to_string())),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring discovered config files");
            Ok((None, "none".to_string()))
        }
    }
}

/// Turn command-line options into explicit resolver input.
fn build_overrides(args: &Args) -> Result<ClientOverrides, Box<dyn std::error::Error>> {
    let mut overrides = ClientOverrides::default();

    if let Some(token) = &args.token {
        overrides = overrides.with_token(token.as_str());
    }
    if let Some(url_base) = &args.url_base {
        overrides = overrides.with_url_base(url_base.as_str());
    }
    if let Some(origin) = &args.preferred_status_origin {
        overrides = overrides.with_preferred_status_origin(origin.as_str());
    }
    if let Some(timeout) = &args.timeout {
        overrides = overrides.with_timeout(parse_timeout(timeout)?);
    }

    Ok(overrides)
}

async fn run_pull(
    client: &CollectionClient,
    subjects: &[String],
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    if !args.json {
        ui::print_header("Pulling", subjects.len(), client.config().url_base());
    }

    let mut reports = Vec::with_capacity(subjects.len());
    for subject in subjects {
        let record = client.pull(subject).await;
        if !args.json {
            ui::print_pull_result(subject, record.as_ref(), args.verbose);
        }
        reports.push(PullReport {
            subject,
            found: record.is_some(),
            record,
        });
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        let found = reports.iter().filter(|report| report.found).count();
        ui::print_summary(&[(found, "found"), (reports.len() - found, "not found")]);
    }

    Ok(())
}

async fn run_push(
    client: &CollectionClient,
    file: &str,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    let statuses = read_statuses(file)?;

    if !client.config().has_token() {
        ui::print_missing_token_notice();
    }
    if !args.json {
        ui::print_header("Pushing", statuses.len(), client.config().url_base());
    }

    let mut reports = Vec::with_capacity(statuses.len());
    for status in &statuses {
        let report = match client.push(status).await {
            Ok(response) => PushReport {
                subject: status.subject(),
                checker_type: status.checker_type(),
                submitted: response.is_some(),
                response,
                error: None,
            },
            Err(e) => PushReport {
                subject: status.subject(),
                checker_type: status.checker_type(),
                submitted: false,
                response: None,
                error: Some(e.to_string()),
            },
        };

        if !args.json {
            let outcome = match (&report.error, report.submitted) {
                (Some(reason), _) => PushOutcome::Rejected(reason),
                (None, true) => PushOutcome::Submitted,
                (None, false) => PushOutcome::Skipped,
            };
            ui::print_push_result(report.subject, report.checker_type, outcome);
        }
        reports.push(report);
    }

    let submitted = reports.iter().filter(|report| report.submitted).count();
    let rejected = reports.iter().filter(|report| report.error.is_some()).count();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        ui::print_summary(&[
            (submitted, "submitted"),
            (reports.len() - submitted - rejected, "skipped"),
            (rejected, "rejected"),
        ]);
    }

    if rejected > 0 {
        return Err(format!("{} record(s) rejected", rejected).into());
    }
    Ok(())
}

/// Read status records from a JSON file.
fn read_statuses(file: &str) -> Result<Vec<CheckerStatus>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| format!("Could not read file '{}': {}", file, e))?;
    let input: StatusInput = serde_json::from_str(&content)
        .map_err(|e| format!("Invalid status records in '{}': {}", file, e))?;

    let statuses = input.into_vec();
    if statuses.is_empty() {
        return Err(format!("No status records in '{}'", file).into());
    }
    Ok(statuses)
}

async fn run_probe(
    client: &CollectionClient,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    let generation = client.ensure_api_generation().await;

    if args.json {
        let output = serde_json::json!({
            "url_base": client.config().url_base(),
            "api_generation": generation.to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        ui::print_generation(client.config().url_base(), generation);
    }

    Ok(())
}

fn run_config(
    client: &CollectionClient,
    source: &str,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = client.config();
    let masked = mask_token(config.token());

    if args.json {
        let output = serde_json::json!({
            "token": masked,
            "url_base": config.url_base(),
            "preferred_status_origin": config.preferred_status_origin().as_str(),
            "timeout": config.timeout(),
            "config_file": source,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        ui::print_config(config, &masked, source);
    }

    Ok(())
}

/// Hide all but the last four characters of long tokens.
fn mask_token(token: &str) -> String {
    let length = token.chars().count();
    match length {
        0 => "(not set)".to_string(),
        1..=8 => "*".repeat(length),
        _ => {
            let tail: String = token.chars().skip(length - 4).collect();
            format!("{}{}", "*".repeat(length - 4), tail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token(""), "(not set)");
        assert_eq!(mask_token("abc"), "***");
        assert_eq!(mask_token("0123456789abcdef"), "************cdef");
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let args = parse(&[
            "collection-client",
            "pull",
            "example.com",
            "--url-base",
            "https://api.example.test",
            "--json",
        ]);

        assert!(args.json);
        assert_eq!(args.url_base.as_deref(), Some("https://api.example.test"));
        match args.command {
            Command::Pull { subjects } => assert_eq!(subjects, vec!["example.com"]),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_pull_requires_a_subject() {
        assert!(Args::try_parse_from(["collection-client", "pull"]).is_err());
    }

    #[test]
    fn test_build_overrides_rejects_non_numeric_timeout() {
        let args = parse(&["collection-client", "probe", "--timeout", "soon"]);
        let err = build_overrides(&args).unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_build_overrides_keeps_unset_options_empty() {
        let args = parse(&["collection-client", "config", "--timeout", "2.5"]);
        let overrides = build_overrides(&args).unwrap();
        assert_eq!(overrides.timeout, Some(2.5));
        assert_eq!(overrides.token, None);
        assert_eq!(overrides.url_base, None);
    }

    #[test]
    fn test_status_input_accepts_single_record_and_array() {
        let single = r#"{"kind": "syntax", "subject": "example.com", "checker_type": "SYNTAX"}"#;
        let input: StatusInput = serde_json::from_str(single).unwrap();
        assert_eq!(input.into_vec().len(), 1);

        let many = r#"[
            {"kind": "syntax", "subject": "a.example", "checker_type": "SYNTAX"},
            {"kind": "availability", "subject": "b.example", "checker_type": "AVAILABILITY",
             "expiration_date": "2030-01-01"}
        ]"#;
        let statuses = serde_json::from_str::<StatusInput>(many)
            .unwrap()
            .into_vec();
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[1].expiration_date(), Some("2030-01-01"));
    }
}
