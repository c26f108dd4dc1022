//! GitHub user profile lookup via the public API.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use sleuth_common::{Candidate, EmailAddress, FactKind, SourceCategory, SourceId, SourceResult};

use crate::probe::SourceProbe;
use crate::probes::CONFIRMED_NAME_WEIGHT;

const API_BASE: &str = "https://api.github.com/users";

/// Fetches `api.github.com/users/{local_part}` and, when the profile
/// carries a display name, yields a confirmed Name candidate alongside
/// the profile payload.
pub struct GithubUserProbe {
    id: SourceId,
    client: reqwest::Client,
}

impl GithubUserProbe {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            id: SourceId::new("dev.github"),
            client,
        }
    }
}

#[async_trait]
impl SourceProbe for GithubUserProbe {
    fn source_id(&self) -> SourceId {
        self.id.clone()
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::DevPlatform
    }

    async fn probe(&self, email: &EmailAddress, budget: Duration) -> SourceResult {
        let url = format!("{}/{}", API_BASE, email.local_part());
        debug!("querying github profile {}", url);
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
            StatusCode::FORBIDDEN => SourceResult::error(
                self.id.clone(),
                self.category(),
                "github api rate limited",
                latency_ms,
            ),
            status if status.is_success() => {
                let profile: serde_json::Value = match response.json().await {
                    Ok(v) => v,
                    Err(e) => {
                        return SourceResult::error(
                            self.id.clone(),
                            self.category(),
                            format!("profile parse failure: {e}"),
                            latency_ms,
                        )
                    }
                };

                let mut candidates = Vec::new();
                if let Some(name) = profile.get("name").and_then(|v| v.as_str()) {
                    if !name.trim().is_empty() {
                        candidates.push(Candidate::new(
                            FactKind::Name,
                            name.trim(),
                            self.id.clone(),
                            CONFIRMED_NAME_WEIGHT,
                        ));
                    }
                }

                let payload = serde_json::json!({
                    "login": profile.get("login"),
                    "name": profile.get("name"),
                    "html_url": profile.get("html_url"),
                    "public_repos": profile.get("public_repos"),
                    "followers": profile.get("followers"),
                    "bio": profile.get("bio"),
                    "created_at": profile.get("created_at"),
                });

                SourceResult::success(
                    self.id.clone(),
                    self.category(),
                    Some(payload),
                    candidates,
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
