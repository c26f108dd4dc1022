//! Gravatar profile lookup keyed by the hashed address.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::StatusCode;
use sha2::{Digest, Sha256};
use tracing::debug;

use sleuth_common::{Candidate, EmailAddress, FactKind, SourceCategory, SourceId, SourceResult};

use crate::probe::SourceProbe;
use crate::probes::CONFIRMED_NAME_WEIGHT;

/// Fetches the public Gravatar profile for the SHA-256 of the
/// normalized address; a display name there becomes a confirmed Name
/// candidate.
pub struct GravatarProbe {
    id: SourceId,
    client: reqwest::Client,
}

impl GravatarProbe {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            id: SourceId::new("avatar.gravatar"),
            client,
        }
    }
}

/// Gravatar hashes the trimmed, lowercased address.
fn address_hash(email: &EmailAddress) -> String {
    let normalized = email.to_string().trim().to_lowercase();
    hex::encode(Sha256::digest(normalized.as_bytes()))
}

#[async_trait]
impl SourceProbe for GravatarProbe {
    fn source_id(&self) -> SourceId {
        self.id.clone()
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::Avatar
    }

    async fn probe(&self, email: &EmailAddress, budget: Duration) -> SourceResult {
        let url = format!("https://www.gravatar.com/{}.json", address_hash(email));
        debug!("querying gravatar profile");
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
                            format!("profile parse failure: {e}"),
                            latency_ms,
                        )
                    }
                };

                let entry = body.get("entry").and_then(|e| e.get(0));
                let mut candidates = Vec::new();
                if let Some(display_name) = entry
                    .and_then(|e| e.get("displayName"))
                    .and_then(|v| v.as_str())
                {
                    if !display_name.trim().is_empty() {
                        candidates.push(Candidate::new(
                            FactKind::Name,
                            display_name.trim(),
                            self.id.clone(),
                            CONFIRMED_NAME_WEIGHT,
                        ));
                    }
                }

                let payload = entry.map(|e| {
                    serde_json::json!({
                        "display_name": e.get("displayName"),
                        "preferred_username": e.get("preferredUsername"),
                        "profile_url": e.get("profileUrl"),
                    })
                });

                SourceResult::success(
                    self.id.clone(),
                    self.category(),
                    payload,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_normalizes_case() {
        let a = address_hash(&EmailAddress::parse("User@Example.COM").unwrap());
        let b = address_hash(&EmailAddress::parse("user@example.com").unwrap());
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
