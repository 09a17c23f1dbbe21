use chrono::Utc;
use thiserror::Error;

use crate::calendar::EventRecord;
use crate::sync::credentials::{CredentialBundle, CredentialError};
use crate::sync::google_api::{ApiError, EventPayload, GoogleCalendarClient, RemoteEvent};

pub const DEFAULT_FETCH_LIMIT: u32 = 50;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// Wraps the remote calendar behind batch-shaped operations.
///
/// A fresh API client is constructed from the credential bundle on every
/// call; nothing is pooled or reused across calls. Reads fail loudly; writes
/// isolate per-item failures so one bad event cannot sink a 50-event batch.
pub struct CalendarSyncGateway {
    bundle: CredentialBundle,
    calendar_id: String,
    base_url: Option<String>,
}

impl CalendarSyncGateway {
    pub fn new(bundle: CredentialBundle) -> Self {
        Self {
            bundle,
            calendar_id: "primary".to_string(),
            base_url: None,
        }
    }

    pub fn with_calendar_id(mut self, calendar_id: String) -> Self {
        self.calendar_id = calendar_id;
        self
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    fn client(&self) -> GoogleCalendarClient {
        let client = GoogleCalendarClient::new(self.bundle.access_token.clone());
        match &self.base_url {
            Some(url) => client.with_base_url(url.clone()),
            None => client,
        }
    }

    /// Upcoming events from now, capped at `max_results` (default 50). Any
    /// provider error propagates to the caller.
    pub async fn fetch_events(
        &self,
        max_results: Option<u32>,
    ) -> Result<Vec<RemoteEvent>, SyncError> {
        let events = self
            .client()
            .list_upcoming(
                &self.calendar_id,
                Utc::now(),
                max_results.unwrap_or(DEFAULT_FETCH_LIMIT),
            )
            .await?;
        Ok(events)
    }

    /// Submit each event independently and return the subset that the remote
    /// accepted. A failed insert is logged and skipped; partial success is
    /// preferable to an all-or-nothing batch.
    pub async fn add_events(&self, events: &[EventRecord]) -> Vec<RemoteEvent> {
        let client = self.client();
        let mut added = Vec::with_capacity(events.len());

        for event in events {
            let payload = EventPayload::from_record(event);
            match client.insert_event(&self.calendar_id, &payload).await {
                Ok(created) => added.push(created),
                Err(err) => {
                    tracing::error!("Error adding event '{}': {}", event.summary, err);
                }
            }
        }

        tracing::info!("Added {} of {} events", added.len(), events.len());
        added
    }

    /// Present for contract symmetry; performs no operation. Callers must
    /// not rely on it mutating remote state.
    pub async fn update_events(&self, _events: &[EventRecord]) {}

    /// Attempt each deletion independently; failures are logged and skipped.
    /// Returns how many deletions succeeded, not which ones failed.
    pub async fn delete_events(&self, event_ids: &[String]) -> usize {
        let client = self.client();
        let mut count = 0;

        for event_id in event_ids {
            match client.delete_event(&self.calendar_id, event_id).await {
                Ok(()) => count += 1,
                Err(err) => {
                    tracing::error!("Error deleting event {}: {}", event_id, err);
                }
            }
        }

        tracing::info!("Deleted {} of {} events", count, event_ids.len());
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::EventTime;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn bundle() -> CredentialBundle {
        CredentialBundle {
            access_token: "access".to_string(),
            refresh_token: None,
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            scopes: vec!["https://www.googleapis.com/auth/calendar".to_string()],
            expires_at: None,
        }
    }

    fn gateway(server: &MockServer) -> CalendarSyncGateway {
        CalendarSyncGateway::new(bundle()).with_base_url(server.uri())
    }

    fn record(summary: &str) -> EventRecord {
        EventRecord {
            summary: summary.to_string(),
            description: String::new(),
            location: None,
            color_id: None,
            start: EventTime::AllDay {
                date: "2026-10-01".to_string(),
            },
            end: EventTime::AllDay {
                date: "2026-10-02".to_string(),
            },
            recurrence: None,
            reminders: None,
        }
    }

    #[tokio::test]
    async fn add_events_skips_failed_items_and_returns_successes() {
        let server = MockServer::start().await;
        for summary in ["ASSIGNMENT: HW1", "QUIZ: Week 2"] {
            Mock::given(method("POST"))
                .and(path("/calendars/primary/events"))
                .and(body_partial_json(json!({"summary": summary})))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({"id": summary, "summary": summary})),
                )
                .mount(&server)
                .await;
        }
        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .and(body_partial_json(json!({"summary": "EXAM: Midterm"})))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let batch = vec![
            record("ASSIGNMENT: HW1"),
            record("EXAM: Midterm"),
            record("QUIZ: Week 2"),
        ];

        let added = gateway(&server).add_events(&batch).await;

        let summaries: Vec<&str> = added
            .iter()
            .filter_map(|e| e.summary.as_deref())
            .collect();
        assert_eq!(summaries, vec!["ASSIGNMENT: HW1", "QUIZ: Week 2"]);
    }

    #[tokio::test]
    async fn delete_events_counts_only_successes() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/calendars/primary/events/evt-1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/calendars/primary/events/evt-2"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/calendars/primary/events/evt-3"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let ids = vec![
            "evt-1".to_string(),
            "evt-2".to_string(),
            "evt-3".to_string(),
        ];

        let count = gateway(&server).delete_events(&ids).await;

        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn fetch_events_propagates_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = gateway(&server).fetch_events(None).await;

        assert!(matches!(result, Err(SyncError::Api(ApiError::AuthenticationFailed))));
    }

    #[tokio::test]
    async fn fetch_events_defaults_to_fifty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(wiremock::matchers::query_param("maxResults", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .mount(&server)
            .await;

        let events = gateway(&server).fetch_events(None).await.unwrap();

        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn update_events_is_a_no_op() {
        // No mock server at all: an HTTP call here would hit the real
        // endpoint and fail the returned future.
        let gateway = CalendarSyncGateway::new(bundle()).with_base_url("http://127.0.0.1:1".to_string());
        gateway.update_events(&[record("EXAM: Midterm")]).await;
    }
}
