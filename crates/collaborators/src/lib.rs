//! External data source clients for Deskmate.
//!
//! Each client implements one collaborator trait from `deskmate-core` over
//! HTTP. All of them fail soft: any network, auth, or parse problem comes
//! back as a typed `CollaboratorError`, never a panic, and the engine layer
//! downgrades it to a sentinel string or a silent skip.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use deskmate_config::AppConfig;
use deskmate_core::collaborator::{
    AcademicAudit, CalendarAudit, CalendarClient, LmsClient, SearchClient, WeatherClient,
};
use deskmate_core::error::CollaboratorError;

pub mod cache;
pub mod calendar;
pub mod lms;
pub mod search;
pub mod weather;

pub use cache::TtlCache;
pub use calendar::HttpCalendarClient;
pub use lms::CanvasLmsClient;
pub use search::WebSearchClient;
pub use weather::{CachedWeatherClient, WttrWeatherClient};

/// Fixed client identity string for outbound fetches.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (compatible; Deskmate/0.1; +https://github.com/deskmate-dev/deskmate)";

/// Shared reqwest client construction with the standard timeout.
pub(crate) fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .expect("Failed to create HTTP client")
}

/// The full collaborator set, built from configuration.
pub struct Collaborators {
    pub lms: Arc<dyn LmsClient>,
    pub calendar: Arc<dyn CalendarClient>,
    pub search: Arc<dyn SearchClient>,
    pub weather: Arc<dyn WeatherClient>,
}

/// Build collaborators from configuration.
///
/// A source with no configured endpoint gets an unconfigured stub that
/// reports itself unavailable on pull — the assembler turns that into a
/// sentinel section and the monitor stays silent, so a partial config still
/// runs.
pub fn build_from_config(config: &AppConfig) -> Collaborators {
    let lms: Arc<dyn LmsClient> = match (&config.lms.base_url, &config.lms.token) {
        (Some(base_url), Some(token)) => Arc::new(CanvasLmsClient::new(base_url, token)),
        _ => Arc::new(Unconfigured("LMS")),
    };

    let calendar: Arc<dyn CalendarClient> =
        match (&config.calendar.base_url, &config.calendar.token) {
            (Some(base_url), Some(token)) => Arc::new(HttpCalendarClient::new(base_url, token)),
            _ => Arc::new(Unconfigured("calendar")),
        };

    let search: Arc<dyn SearchClient> = Arc::new(WebSearchClient::new(
        config.search.max_fetch_chars,
        config.search.fetch_top_result,
    ));

    let weather: Arc<dyn WeatherClient> = Arc::new(CachedWeatherClient::new(
        Arc::new(WttrWeatherClient::new()),
        Duration::from_secs(config.weather.cache_ttl_secs),
    ));

    Collaborators {
        lms,
        calendar,
        search,
        weather,
    }
}

/// Stub standing in for a source the user has not configured.
struct Unconfigured(&'static str);

impl Unconfigured {
    fn err(&self) -> CollaboratorError {
        CollaboratorError::Unavailable(format!("{} endpoint not configured", self.0))
    }
}

#[async_trait]
impl LmsClient for Unconfigured {
    async fn academic_audit(&self) -> Result<AcademicAudit, CollaboratorError> {
        Err(self.err())
    }
}

#[async_trait]
impl CalendarClient for Unconfigured {
    async fn calendar_audit(&self) -> Result<CalendarAudit, CollaboratorError> {
        Err(self.err())
    }

    async fn add_event(
        &self,
        _title: &str,
        _start: chrono::DateTime<chrono::Utc>,
    ) -> Result<String, CollaboratorError> {
        Err(self.err())
    }
}
