mod app;
mod polling;

use crate::core::settings::Settings;
use anyhow::Result;

pub async fn run(settings: Settings) -> Result<()> {
    tracing::info!("Starting servicenow-flag daemon");
    app::run(settings).await
}
