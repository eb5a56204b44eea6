//! Weather client — wttr.in one-line format, behind a TTL cache.
//!
//! Weather changes slowly and the upstream rate-limits aggressively, so
//! every pull goes through `CachedWeatherClient`; the raw `WttrWeatherClient`
//! is only exposed for direct use in tests and diagnostics.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use deskmate_core::collaborator::WeatherClient;
use deskmate_core::error::CollaboratorError;
use tracing::debug;

use crate::cache::TtlCache;

/// Direct wttr.in client.
pub struct WttrWeatherClient {
    base_url: String,
    client: reqwest::Client,
}

impl WttrWeatherClient {
    pub fn new() -> Self {
        Self {
            base_url: "https://wttr.in".into(),
            client: crate::http_client(15),
        }
    }

    /// Override the endpoint (for tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl Default for WttrWeatherClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WeatherClient for WttrWeatherClient {
    async fn weather(&self, location: &str) -> Result<String, CollaboratorError> {
        // format=3 is the one-line "Location: condition temperature" render.
        let url = format!(
            "{}/{}?format=3",
            self.base_url,
            location.replace(' ', "+")
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CollaboratorError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CollaboratorError::Unavailable(format!(
                "Weather service returned status {}",
                response.status().as_u16()
            )));
        }

        let display = response
            .text()
            .await
            .map_err(|e| CollaboratorError::Network(e.to_string()))?
            .trim()
            .to_string();

        if display.is_empty() {
            return Err(CollaboratorError::Parse("empty weather response".into()));
        }

        Ok(display)
    }
}

/// TTL-cached wrapper around any weather client.
pub struct CachedWeatherClient {
    inner: Arc<dyn WeatherClient>,
    cache: TtlCache,
}

impl CachedWeatherClient {
    pub fn new(inner: Arc<dyn WeatherClient>, ttl: Duration) -> Self {
        Self {
            inner,
            cache: TtlCache::new(ttl),
        }
    }
}

#[async_trait]
impl WeatherClient for CachedWeatherClient {
    async fn weather(&self, location: &str) -> Result<String, CollaboratorError> {
        let key = location.to_lowercase();
        if let Some(cached) = self.cache.get(&key) {
            debug!(location, "Weather served from cache");
            return Ok(cached);
        }

        let display = self.inner.weather(location).await?;
        self.cache.put(key, &display);
        Ok(display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Counts pulls and returns a canned line.
    struct CountingWeather {
        calls: Mutex<usize>,
        response: Result<String, CollaboratorError>,
    }

    impl CountingWeather {
        fn ok(line: &str) -> Self {
            Self {
                calls: Mutex::new(0),
                response: Ok(line.into()),
            }
        }

        fn failing() -> Self {
            Self {
                calls: Mutex::new(0),
                response: Err(CollaboratorError::Network("down".into())),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl WeatherClient for CountingWeather {
        async fn weather(&self, _location: &str) -> Result<String, CollaboratorError> {
            *self.calls.lock().unwrap() += 1;
            self.response.clone()
        }
    }

    #[tokio::test]
    async fn second_pull_hits_cache() {
        let inner = Arc::new(CountingWeather::ok("London: ⛅️ +11°C"));
        let cached = CachedWeatherClient::new(inner.clone(), Duration::from_secs(600));

        let first = cached.weather("London").await.unwrap();
        let second = cached.weather("London").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn cache_key_is_case_insensitive() {
        let inner = Arc::new(CountingWeather::ok("London: ⛅️ +11°C"));
        let cached = CachedWeatherClient::new(inner.clone(), Duration::from_secs(600));

        cached.weather("London").await.unwrap();
        cached.weather("LONDON").await.unwrap();

        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let inner = Arc::new(CountingWeather::failing());
        let cached = CachedWeatherClient::new(inner.clone(), Duration::from_secs(600));

        assert!(cached.weather("London").await.is_err());
        assert!(cached.weather("London").await.is_err());

        // Each attempt went through to the inner client.
        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn expired_entry_repulls() {
        let inner = Arc::new(CountingWeather::ok("London: ⛅️ +11°C"));
        let cached = CachedWeatherClient::new(inner.clone(), Duration::from_millis(0));

        cached.weather("London").await.unwrap();
        cached.weather("London").await.unwrap();

        assert_eq!(inner.calls(), 2);
    }
}
