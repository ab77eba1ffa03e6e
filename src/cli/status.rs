use crate::core::models::{ColorTier, QueueReading, Thresholds};
use crate::core::settings::Settings;
use crate::providers::{ServiceNowProvider, TicketSource};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct StatusOutput {
    source: &'static str,
    group: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tier: Option<ColorTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    fetched_at: DateTime<Utc>,
}

pub async fn run(settings: Settings, json: bool) -> Result<()> {
    settings.validate_source()?;

    let provider = ServiceNowProvider::new(settings.servicenow.clone())
        .context("Failed to build ServiceNow client")?;
    let reading = provider
        .fetch_queue()
        .await
        .context("Failed to read ticket queue")?;

    let output = build_output(
        provider.name(),
        &settings.servicenow.assignment_group,
        reading,
        settings.thresholds,
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_text_output(&output);
    }

    Ok(())
}

fn build_output(
    source: &'static str,
    group: &str,
    reading: QueueReading,
    thresholds: Thresholds,
) -> StatusOutput {
    let error = match reading {
        QueueReading::Counted(_) => None,
        QueueReading::Unauthorized(status) => Some(format!("Not authorized ({})", status)),
        QueueReading::Unavailable(status) => Some(format!("Unavailable ({})", status)),
    };
    let count = reading.count();

    StatusOutput {
        source,
        group: group.to_string(),
        count,
        tier: count.map(|c| ColorTier::from_count(c, thresholds)),
        error,
        fetched_at: Utc::now(),
    }
}

fn print_text_output(output: &StatusOutput) {
    println!("{} ({})", output.source, output.group);

    if let Some(error) = &output.error {
        println!("  Error: {}", error);
        return;
    }

    if let (Some(count), Some(tier)) = (output.count, output.tier) {
        println!("  {:<8} {}", "Queue:", count);
        println!("  {:<8} {} ({})", "Flag:", tier.name(), tier.hex());
    }
}
