//! Calendar client over a JSON events gateway.
//!
//! Pulls today's agenda for the audit and pushes new events with an
//! ISO-8601 start. The wire shape is the lowest common denominator most
//! calendar bridges expose: `GET /events?from=&to=` and `POST /events`.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use deskmate_core::collaborator::{CalendarAudit, CalendarClient};
use deskmate_core::error::CollaboratorError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// JSON calendar gateway client.
pub struct HttpCalendarClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl HttpCalendarClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client: crate::http_client(30),
        }
    }

    fn map_send_error(e: reqwest::Error) -> CollaboratorError {
        if e.is_timeout() {
            CollaboratorError::Unavailable(format!("Calendar timed out: {e}"))
        } else {
            CollaboratorError::Network(e.to_string())
        }
    }

    fn check_status(status: u16, what: &str) -> Result<(), CollaboratorError> {
        match status {
            200 | 201 => Ok(()),
            401 | 403 => Err(CollaboratorError::Auth(format!(
                "Calendar rejected token on {what} (status {status})"
            ))),
            _ => Err(CollaboratorError::Unavailable(format!(
                "Calendar returned status {status} on {what}"
            ))),
        }
    }
}

#[async_trait]
impl CalendarClient for HttpCalendarClient {
    async fn calendar_audit(&self) -> Result<CalendarAudit, CollaboratorError> {
        let now = Utc::now();
        let day_start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .expect("midnight is valid")
            .and_utc();
        let day_end = day_start + Duration::days(1);

        let url = format!(
            "{}/events?from={}&to={}",
            self.base_url,
            day_start.to_rfc3339(),
            day_end.to_rfc3339()
        );
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(Self::map_send_error)?;

        Self::check_status(response.status().as_u16(), "events")?;

        let events: Vec<ApiEvent> = response
            .json()
            .await
            .map_err(|e| CollaboratorError::Parse(e.to_string()))?;

        debug!(events = events.len(), "Calendar audit pulled");
        Ok(build_audit(events, now))
    }

    async fn add_event(
        &self,
        title: &str,
        start: DateTime<Utc>,
    ) -> Result<String, CollaboratorError> {
        let url = format!("{}/events", self.base_url);
        let body = NewEvent {
            title: title.to_string(),
            start: start.to_rfc3339(),
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&body)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        Self::check_status(response.status().as_u16(), "add_event")?;

        Ok(format!(
            "Added \"{}\" on {}",
            title,
            start.format("%Y-%m-%d %H:%M UTC")
        ))
    }
}

// --- Wire types ---

#[derive(Debug, Deserialize)]
struct ApiEvent {
    #[serde(alias = "summary")]
    title: String,
    start: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct NewEvent {
    title: String,
    start: String,
}

/// Render the audit from wire events. Pure for testability.
fn build_audit(mut events: Vec<ApiEvent>, now: DateTime<Utc>) -> CalendarAudit {
    events.sort_by_key(|e| e.start);

    let today = now.date_naive();
    let events_today = events
        .iter()
        .filter(|e| e.start.date_naive() == today)
        .count();

    let summary = if events.is_empty() {
        format!(
            "No events scheduled for {} {}.",
            today.format("%A"),
            today.format("%b %e")
        )
    } else {
        let mut out = format!("Schedule for {} ({} events today):\n", today.format("%A"), events_today);
        for event in &events {
            out.push_str(&format!(
                "  {} — {}\n",
                event.start.format("%H:%M"),
                event.title
            ));
        }
        out.trim_end().to_string()
    };

    CalendarAudit {
        summary,
        events_today,
    }
}
