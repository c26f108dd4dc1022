//! Domain registration lookup through the RDAP bootstrap service.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use sleuth_common::{EmailAddress, SourceCategory, SourceId, SourceResult};

use crate::probe::SourceProbe;

/// Queries `rdap.org/domain/{domain}` (which redirects to the
/// authoritative registry) and records registration metadata as an
/// opaque payload. Yields no fact candidates.
pub struct RdapProbe {
    id: SourceId,
    client: reqwest::Client,
}

impl RdapProbe {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            id: SourceId::new("registry.rdap"),
            client,
        }
    }
}

/// Pull the date of a named event out of an RDAP `events` array.
fn event_date<'a>(body: &'a serde_json::Value, action: &str) -> Option<&'a str> {
    body.get("events")?
        .as_array()?
        .iter()
        .find(|e| e.get("eventAction").and_then(|a| a.as_str()) == Some(action))?
        .get("eventDate")?
        .as_str()
}

#[async_trait]
impl SourceProbe for RdapProbe {
    fn source_id(&self) -> SourceId {
        self.id.clone()
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::DomainRegistry
    }

    async fn probe(&self, email: &EmailAddress, budget: Duration) -> SourceResult {
        let url = format!("https://rdap.org/domain/{}", email.domain());
        debug!("querying rdap for {}", email.domain());
        let started = Instant::now();

        let response = self.client.get(&url).timeout(budget).send().await;
        let latency_ms = started.elapsed().as_millis() as u64;

        let response = match response {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                return SourceResult::timeout(self.id.clone(), self.category(), latency_ms)
            }
            Err(e) => {
                return SourceResult::error(self.id.clone(), self.category(), e.to_string(), latency_ms)
            }
        };

        match response.status() {
            StatusCode::NOT_FOUND => {
                SourceResult::not_found(self.id.clone(), self.category(), latency_ms)
            }
            status if status.is_success() => {
                let body: serde_json::Value = match response.json().await {
                    Ok(v) => v,
                    Err(e) => {
                        return SourceResult::error(
                            self.id.clone(),
                            self.category(),
                            format!("rdap parse failure: {e}"),
                            latency_ms,
                        )
                    }
                };

                let payload = serde_json::json!({
                    "domain": email.domain(),
                    "handle": body.get("handle"),
                    "registered": event_date(&body, "registration"),
                    "expires": event_date(&body, "expiration"),
                    "status": body.get("status"),
                });

                SourceResult::success(
                    self.id.clone(),
                    self.category(),
                    Some(payload),
                    Vec::new(),
                    latency_ms,
                )
            }
            status => SourceResult::error(
                self.id.clone(),
                self.category(),
                format!("unexpected status {status}"),
                latency_ms,
            ),
        }
    }
}
