// src/config.rs

pub const REVIEW_BASE: &str = "https://review.opendev.org";
pub const ZUUL_BASE: &str = "https://zuul.opendev.org";
pub const TENANT: &str = "openstack";
pub const PROJECT: &str = "openstack/tacker";
pub const BRANCH: &str = "master";

/// Where to look, and how to expand short change IDs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub review_base: String,
    pub zuul_base: String,
    pub tenant: String,
    pub project: String,
    pub branch: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            review_base: REVIEW_BASE.to_string(),
            zuul_base: ZUUL_BASE.to_string(),
            tenant: TENANT.to_string(),
            project: PROJECT.to_string(),
            branch: BRANCH.to_string(),
        }
    }
}

impl Config {
    pub fn messages_url(&self, encoded_change_id: &str) -> String {
        format!(
            "{}/changes/{}/messages/",
            self.review_base.trim_end_matches('/'),
            encoded_change_id
        )
    }

    pub fn builds_url(&self, uuid: &str) -> String {
        format!(
            "{}/api/tenant/{}/builds?uuid={}",
            self.zuul_base.trim_end_matches('/'),
            self.tenant,
            uuid
        )
    }
}
