use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::{EventRecord, EventTime, Reminders};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("Authentication failed")]
    AuthenticationFailed,
}

/// An event as the remote calendar reports it back. Listed events carry the
/// remote id; everything else is whatever Google chose to include.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEvent {
    pub id: Option<String>,
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<EventTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<EventTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "htmlLink", default, skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventListResponse {
    items: Option<Vec<RemoteEvent>>,
}

/// The minimal insert body: only the keys the pipeline owns are copied, and
/// the optional ones only when present.
#[derive(Debug, Serialize)]
pub struct EventPayload {
    summary: String,
    description: String,
    start: EventTime,
    end: EventTime,
    reminders: Reminders,
    #[serde(rename = "colorId", skip_serializing_if = "Option::is_none")]
    color_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recurrence: Option<Vec<String>>,
}

impl EventPayload {
    /// A record missing reminders gets `{useDefault: true}` here, not the
    /// extraction pipeline's fixed shape — this asymmetry matches the two
    /// call sites and is intentional.
    pub fn from_record(record: &EventRecord) -> Self {
        Self {
            summary: record.summary.clone(),
            description: record.description.clone(),
            start: record.start.clone(),
            end: record.end.clone(),
            reminders: record
                .reminders
                .clone()
                .unwrap_or_else(Reminders::remote_default),
            color_id: record.color_id.clone(),
            location: record.location.clone(),
            recurrence: record.recurrence.as_ref().map(|rule| vec![rule.clone()]),
        }
    }
}

pub struct GoogleCalendarClient {
    base_url: String,
    access_token: String,
    client: reqwest::Client,
}

impl GoogleCalendarClient {
    pub fn new(access_token: String) -> Self {
        Self {
            base_url: "https://www.googleapis.com/calendar/v3".to_string(),
            access_token,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Upcoming events from `time_min`, recurring events expanded to single
    /// occurrences, ordered by start time, capped at `max_results`.
    pub async fn list_upcoming(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<RemoteEvent>, ApiError> {
        let url = format!("{}/calendars/{}/events", self.base_url, calendar_id);
        let time_min = time_min.to_rfc3339();
        let max_results = max_results.to_string();

        tracing::info!("Fetching up to {} events from {}", max_results, time_min);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("timeMin", time_min.as_str()),
                ("maxResults", max_results.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ])
            .send()
            .await?;

        let status = response.status();
        tracing::info!("List events response status: {}", status);

        if status == 401 {
            tracing::error!("Authentication failed when listing events");
            return Err(ApiError::AuthenticationFailed);
        }

        if status == 404 {
            tracing::error!("Calendar not found: {}", calendar_id);
            return Err(ApiError::NotFound(calendar_id.to_string()));
        }

        if status == 429 {
            tracing::warn!("Rate limit exceeded");
            return Err(ApiError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await?;
            tracing::error!("Failed to list events. Status: {}, Body: {}", status, body);
            return Err(ApiError::RequestError(format!("Status {}: {}", status, body)));
        }

        let event_list: EventListResponse = response.json().await?;
        let events = event_list.items.unwrap_or_default();

        tracing::info!("Fetched {} events successfully", events.len());
        Ok(events)
    }

    pub async fn insert_event(
        &self,
        calendar_id: &str,
        payload: &EventPayload,
    ) -> Result<RemoteEvent, ApiError> {
        let url = format!("{}/calendars/{}/events", self.base_url, calendar_id);

        tracing::info!("Creating event: {}", payload.summary);
        tracing::debug!("POST {} with payload: {:?}", url, payload);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        tracing::info!("Create event response status: {}", status);

        if status == 401 {
            tracing::error!("Authentication failed when creating event");
            return Err(ApiError::AuthenticationFailed);
        }

        if status == 429 {
            tracing::warn!("Rate limit exceeded");
            return Err(ApiError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await?;
            tracing::error!("Failed to create event. Status: {}, Body: {}", status, body);
            return Err(ApiError::RequestError(format!("Status {}: {}", status, body)));
        }

        let created: RemoteEvent = response.json().await?;
        tracing::info!("Event created successfully with ID: {:?}", created.id);
        Ok(created)
    }

    pub async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), ApiError> {
        let url = format!("{}/calendars/{}/events/{}", self.base_url, calendar_id, event_id);

        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if response.status() == 401 {
            return Err(ApiError::AuthenticationFailed);
        }

        if response.status() == 404 {
            return Err(ApiError::NotFound(event_id.to_string()));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            return Err(ApiError::RequestError(format!("Status {}: {}", status, body)));
        }

        Ok(())
    }
}
