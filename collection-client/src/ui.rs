//! Human-readable output for the collection-client CLI.
//!
//! JSON output is produced in `main.rs`; everything here writes styled text
//! through the `console` crate.

use collection_client_lib::{ApiGeneration, ClientConfig};
use console::{pad_str, style, Alignment};
use serde_json::Value;

const SUBJECT_WIDTH: usize = 36;

// ── Header ───────────────────────────────────────────────────────────────────

pub fn print_header(action: &str, count: usize, url_base: &str) {
    println!(
        "{} {} {}",
        style("collection-client").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!(
            "- {} {} record{} at {}",
            action,
            count,
            if count == 1 { "" } else { "s" },
            url_base
        ))
        .dim(),
    );
    println!();
}

// ── Pull ─────────────────────────────────────────────────────────────────────

pub fn print_pull_result(subject: &str, record: Option<&Value>, show_record: bool) {
    let padded = pad_str(subject, SUBJECT_WIDTH, Alignment::Left, Some(".."));

    match record {
        Some(data) => {
            println!(
                "  {}  {}",
                style(&padded).white(),
                style("FOUND").green().bold()
            );
            if show_record {
                println!("    {}", style(data).dim());
            }
        }
        None => {
            println!(
                "  {}  {}",
                style(&padded).white(),
                style("NOT FOUND").yellow()
            );
        }
    }
}

// ── Push ─────────────────────────────────────────────────────────────────────

/// Outcome of pushing one record.
pub enum PushOutcome<'a> {
    Submitted,
    Skipped,
    Rejected(&'a str),
}

pub fn print_push_result(subject: &str, checker_type: &str, outcome: PushOutcome<'_>) {
    let label = format!("{} [{}]", subject, checker_type.to_lowercase());
    let padded = pad_str(&label, SUBJECT_WIDTH, Alignment::Left, Some(".."));

    match outcome {
        PushOutcome::Submitted => println!(
            "  {}  {}",
            style(&padded).white(),
            style("SUBMITTED").green().bold()
        ),
        PushOutcome::Skipped => println!(
            "  {}  {}",
            style(&padded).white(),
            style("SKIPPED").yellow()
        ),
        PushOutcome::Rejected(reason) => println!(
            "  {}  {}  {}",
            style(&padded).white(),
            style("REJECTED").red().bold(),
            style(reason).dim()
        ),
    }
}

pub fn print_missing_token_notice() {
    eprintln!(
        "{}",
        style("No token configured: records are not submitted.").yellow()
    );
}

// ── Probe / config ───────────────────────────────────────────────────────────

pub fn print_generation(url_base: &str, generation: ApiGeneration) {
    let label = match generation {
        ApiGeneration::Legacy => style(generation.to_string()).cyan().bold(),
        ApiGeneration::Modern => style(generation.to_string()).green().bold(),
        ApiGeneration::Unknown => style(generation.to_string()).dim(),
    };
    println!("{}  {}", url_base, label);
}

pub fn print_config(config: &ClientConfig, masked_token: &str, source: &str) {
    let rows = [
        ("token", masked_token.to_string()),
        ("url_base", config.url_base().to_string()),
        (
            "preferred_status_origin",
            config.preferred_status_origin().to_string(),
        ),
        ("timeout", format!("{}s", config.timeout())),
        ("config file", source.to_string()),
    ];

    for (key, value) in rows {
        println!(
            "  {}  {}",
            style(pad_str(key, 24, Alignment::Left, None)).bold(),
            value
        );
    }
}

// ── Summary ──────────────────────────────────────────────────────────────────

pub fn print_summary(parts: &[(usize, &str)]) {
    let text = parts
        .iter()
        .map(|(count, label)| format!("{} {}", count, label))
        .collect::<Vec<_>>()
        .join(", ");
    println!();
    println!("{} {}", style("Summary:").bold(), text);
}
