//! Token commands - issue and validate approval tokens.

use anyhow::{Context, bail};
use steward_approval::TokenVerdict;
use steward_config::Config;
use steward_core::MAX_TOKEN_TTL_MINUTES;

use crate::commands::OutputFormat;
use crate::config_bridge;
use crate::theme::Theme;

/// Token lifetime for `--ttl-minutes`, bounded like the token service.
fn ttl_from_minutes(minutes: i64) -> anyhow::Result<chrono::Duration> {
    (1..=MAX_TOKEN_TTL_MINUTES)
        .contains(&minutes)
        .then(|| chrono::Duration::try_minutes(minutes))
        .flatten()
        .with_context(|| {
            format!("--ttl-minutes must be between 1 and {MAX_TOKEN_TTL_MINUTES}, got {minutes}")
        })
}

/// Issue a token for a registered tool and print it.
pub(crate) async fn issue_token(
    config: &Config,
    tool: &str,
    ttl_minutes: Option<i64>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let registered = config_bridge::registered_tool(config, tool)?;
    let tokens = config_bridge::token_service(config)?;

    let minutes = ttl_minutes.unwrap_or(config.governance.token_ttl_minutes);
    let ttl = ttl_from_minutes(minutes)?;

    let token = tokens
        .issue(
            &registered.domain,
            &registered.tool_name,
            registered.descriptor.scope,
            ttl,
        )
        .await?;

    if format == OutputFormat::Json {
        let out = serde_json::json!({
            "token": token,
            "toolName": registered.tool_name,
            "domain": registered.domain,
            "scope": registered.descriptor.scope,
            "ttlMinutes": minutes,
            "approvalMode": tokens.mode().label(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    eprintln!(
        "{}",
        Theme::success(&format!(
            "Issued {} token for {} ({}), valid {minutes} min",
            tokens.mode().label(),
            registered.tool_name,
            Theme::scope(registered.descriptor.scope)
        ))
    );
    println!("{token}");
    Ok(())
}

/// Validate (and consume) a token against a registered tool.
pub(crate) async fn validate_token(
    config: &Config,
    tool: &str,
    token: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let registered = config_bridge::registered_tool(config, tool)?;
    let tokens = config_bridge::token_service(config)?;

    let verdict = tokens
        .validate(
            token,
            &registered.domain,
            &registered.tool_name,
            registered.descriptor.scope,
        )
        .await?;

    if format == OutputFormat::Json {
        let out = serde_json::json!({
            "accepted": verdict.is_accepted(),
            "rejection": verdict.rejection().map(|r| r.as_str()),
            "toolName": registered.tool_name,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    }

    match verdict {
        TokenVerdict::Accepted => {
            if format == OutputFormat::Pretty {
                println!(
                    "{}",
                    Theme::success(&format!(
                        "Token accepted for {} and is now consumed",
                        registered.tool_name
                    ))
                );
            }
            Ok(())
        },
        TokenVerdict::Rejected(rejection) => {
            if format == OutputFormat::Pretty {
                println!("{}", Theme::error(&format!("Token rejected: {rejection}")));
            }
            bail!("token rejected ({})", rejection.as_str())
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_bounds() {
        assert_eq!(ttl_from_minutes(10).unwrap(), chrono::Duration::minutes(10));
        assert!(ttl_from_minutes(MAX_TOKEN_TTL_MINUTES).is_ok());

        for bad in [0, -5, MAX_TOKEN_TTL_MINUTES.saturating_add(1), 5_000_000_000] {
            let err = ttl_from_minutes(bad).unwrap_err();
            assert!(err.to_string().contains("--ttl-minutes"), "{bad}: {err}");
        }
    }
}
