// src/client.rs

use crate::change_ids;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{BuildDetail, ChangeMessage};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Prepended by the review API to every JSON body to defeat XSSI
pub const XSSI_PREFIX: &str = ")]}'\n";

/// The two remote lookups the pipeline needs
pub trait CiSource {
    /// All review comments on a change
    fn change_messages(&self, change_id: &str) -> Result<Vec<ChangeMessage>>;

    /// Build details for a build UUID
    fn builds(&self, uuid: &str) -> Result<Vec<BuildDetail>>;
}

/// Blocking client for review.opendev.org and zuul.opendev.org
pub struct OpenDevClient {
    http: reqwest::blocking::Client,
    config: Config,
}

impl OpenDevClient {
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("zuul-results/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| Error::Http {
                url: config.review_base.clone(),
                source,
            })?;
        Ok(Self { http, config })
    }

    fn get_text(&self, url: &str) -> Result<String> {
        debug!(%url, "GET");
        let http_err = |source: reqwest::Error| Error::Http {
            url: url.to_string(),
            source,
        };
        self.http
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(http_err)
    }
}

impl CiSource for OpenDevClient {
    fn change_messages(&self, change_id: &str) -> Result<Vec<ChangeMessage>> {
        let encoded = change_ids::normalize(change_id, &self.config.project, &self.config.branch);
        let url = self.config.messages_url(&encoded);
        let body = self.get_text(&url)?;
        parse_messages(&body, &url)
    }

    fn builds(&self, uuid: &str) -> Result<Vec<BuildDetail>> {
        let url = self.config.builds_url(uuid);
        let body = self.get_text(&url)?;
        parse_json(&body, &url)
    }
}

/// Parses a review API body, dropping the anti-XSSI line first
pub fn parse_messages(body: &str, origin: &str) -> Result<Vec<ChangeMessage>> {
    parse_json(body.strip_prefix(XSSI_PREFIX).unwrap_or(body), origin)
}

pub(crate) fn parse_json<T: DeserializeOwned>(text: &str, origin: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|source| Error::Json {
        origin: origin.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_xssi_prefix() {
        let body = ")]}'\n[{\"id\": \"1\", \"message\": \"Patch Set 1:\\n\\nhello\"}]";
        let messages = parse_messages(body, "test").unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message, "Patch Set 1:\n\nhello");
    }

    #[test]
    fn body_without_prefix_still_parses() {
        let messages = parse_messages("[]", "test").unwrap();
        assert!(messages.is_empty());
    }

    #[test]
    fn garbage_is_a_json_error() {
        let err = parse_messages("<html>rate limited</html>", "somewhere").unwrap_err();
        assert!(matches!(err, Error::Json { ref origin, .. } if origin == "somewhere"));
    }

    #[test]
    fn comment_without_message_is_rejected() {
        let err = parse_messages(")]}'\n[{\"id\": \"1\", \"author\": {}}]", "gerrit").unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
    }

    #[test]
    fn builds_parse_as_opaque_objects() {
        let builds: Vec<BuildDetail> =
            parse_json(r#"[{"uuid": "u1", "patchset": "2", "whatever": [1]}]"#, "zuul").unwrap();
        assert_eq!(builds[0].get_str("uuid"), Some("u1"));
        assert!(builds[0].0.contains_key("whatever"));
    }
}
