//! Username presence check against a profile URL template.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use sleuth_common::{EmailAddress, SourceCategory, SourceId, SourceResult};

use crate::probe::SourceProbe;

/// Checks whether `{username}` has a profile at a fixed URL pattern.
///
/// Opaque presence evidence: an HTTP 200 proves the handle exists on the
/// platform but yields no fact candidates.
pub struct PlatformProbe {
    id: SourceId,
    platform: String,
    category: SourceCategory,
    url_template: String,
    client: reqwest::Client,
}

impl PlatformProbe {
    pub fn new(
        client: reqwest::Client,
        platform: &str,
        category: SourceCategory,
        url_template: &str,
    ) -> Self {
        let prefix = match category {
            SourceCategory::SocialPlatform => "social",
            SourceCategory::DevPlatform => "dev",
            SourceCategory::DomainRegistry => "registry",
            SourceCategory::BreachIndex => "breach",
            SourceCategory::Avatar => "avatar",
        };
        Self {
            id: SourceId::new(format!("{}.{}", prefix, platform.to_lowercase())),
            platform: platform.to_string(),
            category,
            url_template: url_template.to_string(),
            client,
        }
    }

    fn profile_url(&self, email: &EmailAddress) -> String {
        self.url_template.replace("{username}", email.local_part())
    }
}

#[async_trait]
impl SourceProbe for PlatformProbe {
    fn source_id(&self) -> SourceId {
        self.id.clone()
    }

    fn category(&self) -> SourceCategory {
        self.category
    }

    async fn probe(&self, email: &EmailAddress, budget: Duration) -> SourceResult {
        let url = self.profile_url(email);
        debug!("checking {} presence at {}", self.platform, url);
        let started = Instant::now();

        let response = self.client.get(&url).timeout(budget).send().await;
        let latency_ms = started.elapsed().as_millis() as u64;

        match response {
            Ok(r) if r.status().is_success() => SourceResult::success(
                self.id.clone(),
                self.category,
                Some(serde_json::json!({
                    "platform": self.platform,
                    "url": url,
                    "http_status": r.status().as_u16(),
                })),
                Vec::new(),
                latency_ms,
            ),
            Ok(r) if r.status() == StatusCode::NOT_FOUND || r.status() == StatusCode::GONE => {
                SourceResult::not_found(self.id.clone(), self.category, latency_ms)
            }
            Ok(r) => SourceResult::error(
                self.id.clone(),
                self.category,
                format!("unexpected status {}", r.status()),
                latency_ms,
            ),
            Err(e) if e.is_timeout() => {
                SourceResult::timeout(self.id.clone(), self.category, latency_ms)
            }
            Err(e) => SourceResult::error(self.id.clone(), self.category, e.to_string(), latency_ms),
        }
    }
}
