//! Audit command - view recorded invocations.

use std::sync::Arc;

use colored::Colorize;
use steward_audit::{AuditLog, AuditRecord};
use steward_config::Config;
use steward_core::CorrelationId;
use steward_storage::SqlStore;

use crate::commands::OutputFormat;
use crate::config_bridge;
use crate::theme::Theme;

/// Show recent audit records, or every record for one correlation id.
pub(crate) async fn show_audit(
    config: &Config,
    limit: u32,
    correlation: Option<&str>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let store: Arc<dyn SqlStore> = config_bridge::open_store(config)?;
    let log = AuditLog::new(store);

    let records = match correlation {
        Some(id) => {
            let id: CorrelationId = id.parse()?;
            log.by_correlation_id(id).await?
        },
        None => log.recent(limit).await?,
    };

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{}", Theme::info("No audit entries"));
        return Ok(());
    }

    let total = log.count().await?;
    println!(
        "\n{} {}",
        Theme::header("Audit Log"),
        Theme::dimmed(&format!("({} of {total})", records.len()))
    );
    println!(
        "{:<20} {:<10} {:<32} {:<8} {:>8}  {}",
        "TIME".dimmed(),
        "CORR".dimmed(),
        "TOOL".dimmed(),
        "RESULT".dimmed(),
        "MS".dimmed(),
        "REASON".dimmed()
    );
    println!("{}", Theme::separator());

    for record in &records {
        print_record(record);
    }

    println!();
    Ok(())
}

fn print_record(record: &AuditRecord) {
    let result = if record.succeeded {
        "OK".green().to_string()
    } else {
        "FAIL".red().to_string()
    };
    println!(
        "{:<20} {:<10} {:<32} {:<8} {:>8}  {}",
        Theme::timestamp(&record.occurred_at),
        Theme::short_id(&record.correlation_id.to_string()),
        record.tool_name,
        result,
        record.duration_ms,
        record.failure_reason.as_deref().unwrap_or("")
    );
}
