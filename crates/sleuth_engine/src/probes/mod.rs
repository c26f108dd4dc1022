//! Bundled probe implementations.
//!
//! Each probe owns the mapping from its raw payload to fact-kind-tagged
//! candidates; the engine never interprets payloads itself. All HTTP
//! goes through one shared `reqwest` client with rustls.

mod github;
mod gravatar;
mod platform;
mod rdap;

pub use github::GithubUserProbe;
pub use gravatar::GravatarProbe;
pub use platform::PlatformProbe;
pub use rdap::RdapProbe;

use std::sync::Arc;

use sleuth_common::SourceCategory;

use crate::probe::SourceProbe;

/// Sent with every bundled probe request.
pub const USER_AGENT: &str = concat!("mailsleuth/", env!("CARGO_PKG_VERSION"));

/// Weight for a name confirmed by an external profile. Deliberately
/// above the extractor's default name weight plus pair bonus, so a
/// platform-confirmed name displaces the heuristic one.
pub const CONFIRMED_NAME_WEIGHT: u32 = 20;

/// The probe registry the CLI uses by default. The engine itself is
/// agnostic to which probes are registered. Fails only when the HTTP
/// client cannot be constructed (TLS backend initialization).
pub fn default_probe_set() -> Result<Vec<Arc<dyn SourceProbe>>, reqwest::Error> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()?;

    let presence: &[(&str, SourceCategory, &str)] = &[
        (
            "gitlab",
            SourceCategory::DevPlatform,
            "https://gitlab.com/{username}",
        ),
        (
            "devto",
            SourceCategory::DevPlatform,
            "https://dev.to/{username}",
        ),
        (
            "dockerhub",
            SourceCategory::DevPlatform,
            "https://hub.docker.com/v2/users/{username}",
        ),
        (
            "pypi",
            SourceCategory::DevPlatform,
            "https://pypi.org/user/{username}/",
        ),
        (
            "rubygems",
            SourceCategory::DevPlatform,
            "https://rubygems.org/profiles/{username}",
        ),
        (
            "reddit",
            SourceCategory::SocialPlatform,
            "https://www.reddit.com/user/{username}/about.json",
        ),
        (
            "medium",
            SourceCategory::SocialPlatform,
            "https://medium.com/@{username}",
        ),
    ];

    let mut probes: Vec<Arc<dyn SourceProbe>> = presence
        .iter()
        .map(|(platform, category, template)| {
            Arc::new(PlatformProbe::new(client.clone(), platform, *category, template))
                as Arc<dyn SourceProbe>
        })
        .collect();

    probes.push(Arc::new(GithubUserProbe::new(client.clone())));
    probes.push(Arc::new(GravatarProbe::new(client.clone())));
    probes.push(Arc::new(RdapProbe::new(client)));
    Ok(probes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn default_set_has_unique_source_ids() {
        let probes = default_probe_set().unwrap();
        let ids: HashSet<String> = probes
            .iter()
            .map(|p| p.source_id().as_str().to_string())
            .collect();
        assert_eq!(ids.len(), probes.len());
        assert!(ids.contains("dev.github"));
        assert!(ids.contains("avatar.gravatar"));
        assert!(ids.contains("registry.rdap"));
    }

    #[test]
    fn default_set_covers_multiple_categories() {
        let probes = default_probe_set().unwrap();
        let categories: HashSet<_> = probes.iter().map(|p| p.category()).collect();
        assert!(categories.contains(&SourceCategory::SocialPlatform));
        assert!(categories.contains(&SourceCategory::DevPlatform));
        assert!(categories.contains(&SourceCategory::DomainRegistry));
        assert!(categories.contains(&SourceCategory::Avatar));
    }
}
