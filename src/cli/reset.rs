use crate::core::settings::Settings;
use crate::indicator::{FlagGroup, LuxaforClient};
use anyhow::{Context, Result};
use std::sync::Arc;

pub async fn run(settings: Settings) -> Result<()> {
    settings.validate_flags()?;

    let client = LuxaforClient::new(&settings.luxafor).context("Failed to build Luxafor client")?;
    let flags = FlagGroup::new(Arc::new(client), settings.device_ids.clone());

    let failures = flags.reset().await;
    if failures > 0 {
        anyhow::bail!(
            "Failed to reset {} of {} flags",
            failures,
            flags.device_ids().len()
        );
    }

    println!("Reset {} flags", flags.device_ids().len());
    Ok(())
}
