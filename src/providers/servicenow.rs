use crate::core::models::QueueReading;
use crate::core::settings::ServiceNowSettings;
use crate::providers::{SourceError, TicketSource};
use async_trait::async_trait;
use reqwest::{Client, Request, StatusCode};
use serde::Deserialize;
use std::time::Duration;

const TABLE_PATH: &str = "/api/now/table/task";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const RESULT_LIMIT: &str = "200";

#[derive(Debug, Deserialize)]
struct TaskList {
    result: Vec<TaskRef>,
}

#[derive(Debug, Deserialize)]
struct TaskRef {
    #[allow(dead_code)]
    number: String,
}

pub struct ServiceNowProvider {
    client: Client,
    settings: ServiceNowSettings,
}

impl ServiceNowProvider {
    pub fn new(settings: ServiceNowSettings) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.settings.base_url, TABLE_PATH)
    }

    fn build_request(&self) -> reqwest::Result<Request> {
        let query = queue_query(&self.settings.assignment_group);

        self.client
            .get(self.endpoint())
            .query(&[
                ("sysparm_fields", "number"),
                ("sysparm_exclude_reference_link", "true"),
                ("sysparm_limit", RESULT_LIMIT),
                ("sysparm_query", query.as_str()),
            ])
            .basic_auth(&self.settings.username, Some(&self.settings.password))
            .build()
    }

    fn transport(&self, source: reqwest::Error) -> SourceError {
        SourceError::Transport {
            endpoint: self.endpoint(),
            source,
        }
    }
}

#[async_trait]
impl TicketSource for ServiceNowProvider {
    fn name(&self) -> &'static str {
        "ServiceNow"
    }

    async fn fetch_queue(&self) -> Result<QueueReading, SourceError> {
        let request = self.build_request().map_err(|e| self.transport(e))?;
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| self.transport(e))?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(%status, "Data retrieval failed");
            return Ok(QueueReading::from_status(status));
        }

        tracing::debug!(%status, "Rest API GET completed (ServiceNow)");

        let body = response.text().await.map_err(|e| self.transport(e))?;
        count_tasks(&body).map(QueueReading::Counted)
    }
}

/// Encoded query for active tasks in `group` with nobody assigned.
///
/// An empty group still emits the `assignment_group=` clause; how ServiceNow
/// reads that is up to the instance, so settings validation rejects it.
pub fn queue_query(group: &str) -> String {
    format!("^active=true^assigned_to=^assignment_group={group}")
}

fn count_tasks(body: &str) -> Result<usize, SourceError> {
    let list: TaskList = serde_json::from_str(body).map_err(SourceError::Decode)?;
    Ok(list.result.len())
}
