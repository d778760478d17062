//! Approvals command - list issued approval tokens.

use colored::Colorize;
use steward_approval::ApprovalRecord;
use steward_config::Config;
use steward_core::Timestamp;

use crate::commands::OutputFormat;
use crate::config_bridge;
use crate::theme::Theme;

/// State of a record at display time.
fn state(record: &ApprovalRecord, now: Timestamp) -> &'static str {
    if record.is_consumed {
        "consumed"
    } else if record.is_usable_at(now) {
        "active"
    } else {
        "expired"
    }
}

/// List the most recently issued approval records.
pub(crate) async fn list_approvals(
    config: &Config,
    limit: u32,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let tokens = config_bridge::record_reader(config)?;
    let records = tokens.recent_records(limit).await?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{}", Theme::info("No approval tokens issued"));
        return Ok(());
    }

    let now = tokens.clock().now();
    println!("\n{}", Theme::header("Approval Tokens"));
    println!(
        "{:<10} {:<32} {:<10} {:<20} {}",
        "TOKEN".dimmed(),
        "TOOL".dimmed(),
        "SCOPE".dimmed(),
        "EXPIRES".dimmed(),
        "STATE".dimmed()
    );
    println!("{}", Theme::separator());

    for record in &records {
        let state = match state(record, now) {
            "active" => "active".green().to_string(),
            "consumed" => "consumed".dimmed().to_string(),
            other => other.yellow().to_string(),
        };
        println!(
            "{:<10} {:<32} {:<10} {:<20} {}",
            Theme::short_id(&record.token_id.to_string()),
            record.tool_name,
            Theme::scope(record.scope),
            Theme::timestamp(&record.expires_at),
            state
        );
    }

    println!();
    Ok(())
}
