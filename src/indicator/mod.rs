mod luxafor;

use crate::core::models::{ColorTier, FlagAction};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub use luxafor::LuxaforClient;

#[derive(Debug, Error)]
pub enum IndicatorError {
    #[error("Flag {action} request for {device_id} failed")]
    Transport {
        device_id: String,
        action: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

#[async_trait]
pub trait Indicator: Send + Sync {
    /// Sets one device. A rejected request is logged, not returned as an error.
    async fn set_color(
        &self,
        device_id: &str,
        color: ColorTier,
        action: FlagAction,
    ) -> Result<(), IndicatorError>;
}

/// Every configured device, always written together with the same color.
#[derive(Clone)]
pub struct FlagGroup {
    indicator: Arc<dyn Indicator>,
    device_ids: Vec<String>,
}

impl FlagGroup {
    pub fn new(indicator: Arc<dyn Indicator>, device_ids: Vec<String>) -> Self {
        Self {
            indicator,
            device_ids,
        }
    }

    pub fn device_ids(&self) -> &[String] {
        &self.device_ids
    }

    /// Stops at the first failing device.
    pub async fn apply(&self, color: ColorTier, action: FlagAction) -> Result<(), IndicatorError> {
        for device_id in &self.device_ids {
            self.indicator.set_color(device_id, color, action).await?;
        }
        Ok(())
    }

    /// Turns every device off, logging failures per device.
    pub async fn reset(&self) -> usize {
        let mut failures = 0;
        for device_id in &self.device_ids {
            if let Err(e) = self
                .indicator
                .set_color(device_id, ColorTier::Off, FlagAction::SolidColor)
                .await
            {
                tracing::warn!(device_id = %device_id, error = %e, "Failed to update flag");
                failures += 1;
            }
        }
        failures
    }
}
