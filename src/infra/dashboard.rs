use async_trait::async_trait;
use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, CONTENT_TYPE},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::ticket::Ticket;
use crate::error::{AppError, AppResult};
use crate::services::{CapabilityStatus, TicketGraphSource};

/// Client for the dashboard backend that fronts Jira and GitLab.
pub struct DashboardClient {
    http: Client,
    base_url: String,
}

impl DashboardClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl TicketGraphSource for DashboardClient {
    async fn probe(&self) -> AppResult<CapabilityStatus> {
        let url = self.endpoint("/api/jira/config");
        tracing::debug!(%url, "probing dashboard configuration");

        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| AppError::Network(format!("failed to reach dashboard: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Network(format!(
                "configuration probe responded with {status}"
            )));
        }

        response.json().await.map_err(|err| {
            AppError::Analysis(format!("failed to parse configuration status: {err}"))
        })
    }

    async fn fetch_graph(&self, ticket_id: &str) -> AppResult<Ticket> {
        let url = self.endpoint("/api/jira/analyze");
        tracing::debug!(%url, ticket_id, "requesting ticket graph");

        let response = self
            .http
            .post(url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&AnalyzeRequest { ticket_id })
            .send()
            .await
            .map_err(|err| AppError::Network(format!("failed to reach dashboard: {err}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| AppError::Network(format!("failed to read dashboard response: {err}")))?;

        if !status.is_success() {
            return Err(map_failure(status, &body, ticket_id));
        }

        let payload: Value = serde_json::from_str(&body).map_err(|err| {
            AppError::Analysis(format!("dashboard returned malformed JSON: {err}"))
        })?;
        if let Some(message) = reported_error(&payload) {
            return Err(AppError::Backend(message));
        }

        let payload: AnalyzeResponse = serde_json::from_value(payload).map_err(|err| {
            AppError::Analysis(format!("dashboard returned a malformed ticket graph: {err}"))
        })?;

        payload.tickets.into_iter().next().ok_or_else(|| {
            AppError::Analysis(format!("dashboard returned no tickets for {ticket_id}"))
        })
    }
}

fn reported_error(payload: &Value) -> Option<String> {
    payload
        .get("error")
        .and_then(Value::as_str)
        .filter(|message| !message.trim().is_empty())
        .map(str::to_string)
}

fn map_failure(status: StatusCode, body: &str, ticket_id: &str) -> AppError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(reported_error);

    match (status, message) {
        (StatusCode::NOT_FOUND, Some(message)) => AppError::NotFound(format!("{ticket_id}: {message}")),
        (StatusCode::NOT_FOUND, None) => AppError::NotFound(ticket_id.to_string()),
        (StatusCode::BAD_REQUEST | StatusCode::INTERNAL_SERVER_ERROR, Some(message)) => {
            AppError::Backend(message)
        }
        (status, _) => AppError::Network(format!("dashboard responded with {status}")),
    }
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    ticket_id: &'a str,
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    #[serde(default)]
    tickets: Vec<Ticket>,
}
