use crate::core::settings::Settings;
use crate::daemon::polling::{Reconciler, Timing};
use crate::indicator::{FlagGroup, Indicator, LuxaforClient};
use crate::providers::{ServiceNowProvider, TicketSource};
use anyhow::{Context, Result};
use std::sync::Arc;

pub async fn run(settings: Settings) -> Result<()> {
    let source = ServiceNowProvider::new(settings.servicenow.clone())
        .context("Failed to build ServiceNow client")?;
    let indicator =
        LuxaforClient::new(&settings.luxafor).context("Failed to build Luxafor client")?;

    run_with(
        &settings,
        Arc::new(source),
        Arc::new(indicator),
        Timing::default(),
    )
    .await
}

/// Startup: refuse to run without the required settings, switch every flag
/// off, then hand over to the polling loop.
pub async fn run_with(
    settings: &Settings,
    source: Arc<dyn TicketSource>,
    indicator: Arc<dyn Indicator>,
    timing: Timing,
) -> Result<()> {
    if let Err(e) = settings.validate() {
        tracing::error!("{}!", e);
        return Ok(());
    }
    settings.log_summary();

    tracing::info!("Application starting...");

    let flags = FlagGroup::new(indicator, settings.device_ids.clone());
    flags.reset().await;

    Reconciler::new(settings, source, flags, timing).run().await
}
