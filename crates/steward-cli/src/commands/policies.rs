//! Policies command - list registered tool policies.

use colored::Colorize;
use steward_config::Config;

use crate::commands::OutputFormat;
use crate::config_bridge;
use crate::theme::Theme;

/// Print every `[[policies]]` entry.
pub(crate) fn list_policies(config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let registry = config_bridge::registry(config)?;

    if format == OutputFormat::Json {
        let tools: Vec<_> = registry.iter().collect();
        println!("{}", serde_json::to_string_pretty(&tools)?);
        return Ok(());
    }

    if registry.is_empty() {
        println!("{}", Theme::info("No policies configured"));
        return Ok(());
    }

    println!("\n{}", Theme::header("Tool Policies"));
    println!(
        "{:<32} {:<12} {:<10} {:<15} {}",
        "TOOL".dimmed(),
        "DOMAIN".dimmed(),
        "SCOPE".dimmed(),
        "APPROVAL".dimmed(),
        "SIDE EFFECTS".dimmed()
    );
    println!("{}", Theme::separator());

    for tool in registry.iter() {
        let d = &tool.descriptor;
        let approval = if d.requires_approval() {
            d.required_approval.as_str().yellow().to_string()
        } else {
            d.required_approval.as_str().to_string()
        };
        println!(
            "{:<32} {:<12} {:<10} {:<15} {}",
            tool.tool_name,
            tool.domain,
            Theme::scope(d.scope),
            approval,
            d.side_effects
        );
    }

    println!();
    Ok(())
}
