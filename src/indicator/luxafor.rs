use crate::core::models::{ColorTier, FlagAction};
use crate::core::settings::LuxaforSettings;
use crate::indicator::{Indicator, IndicatorError};
use async_trait::async_trait;
use reqwest::{Client, Request, StatusCode};
use serde::Serialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ActionRequest<'a> {
    user_id: &'a str,
    action_fields: ActionFields<'a>,
}

#[derive(Debug, Serialize)]
struct ActionFields<'a> {
    color: &'static str,
    custom_color: &'a str,
}

/// Luxafor webhook relay.
pub struct LuxaforClient {
    client: Client,
    base_url: String,
}

impl LuxaforClient {
    pub fn new(settings: &LuxaforSettings) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
        })
    }

    fn build_request(
        &self,
        device_id: &str,
        color: ColorTier,
        action: FlagAction,
    ) -> reqwest::Result<Request> {
        let body = ActionRequest {
            user_id: device_id,
            action_fields: ActionFields {
                color: "custom",
                custom_color: color.hex(),
            },
        };

        self.client
            .post(format!("{}/{}", self.base_url, action.path()))
            .json(&body)
            .build()
    }
}

#[async_trait]
impl Indicator for LuxaforClient {
    async fn set_color(
        &self,
        device_id: &str,
        color: ColorTier,
        action: FlagAction,
    ) -> Result<(), IndicatorError> {
        let transport = |source| IndicatorError::Transport {
            device_id: device_id.to_string(),
            action: action.path(),
            source,
        };

        let request = self
            .build_request(device_id, color, action)
            .map_err(transport)?;
        let response = self.client.execute(request).await.map_err(transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(%status, device_id, action = action.path(), "API call failed");
            return Ok(());
        }

        tracing::debug!(
            %status,
            device_id,
            action = action.path(),
            "Rest API POST completed (Luxafor flag)"
        );
        Ok(())
    }
}
