//! Engine configuration
//!
//! Loaded in order of priority:
//! 1. An explicit JSON file passed by the caller
//! 2. `engine.json` in the thread-digest config directory
//! 3. Built-in defaults, with environment overrides applied on top

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Engine config filename in the thread-digest config directory
pub const CONFIG_FILE: &str = "engine.json";

/// Overrides `billing_address` when no config file is found
pub const ENV_BILLING_ADDRESS: &str = "THREAD_DIGEST_BILLING_ADDRESS";
/// Overrides `organization_domain` when no config file is found
pub const ENV_ORG_DOMAIN: &str = "THREAD_DIGEST_ORG_DOMAIN";

/// Vocabulary scanned for the key-topics line of a summary
pub const DEFAULT_BUSINESS_TERMS: [&str; 16] = [
    "invoice",
    "billing",
    "payment",
    "expense",
    "approval",
    "client",
    "customer",
    "po",
    "purchase order",
    "submission",
    "review",
    "rejection",
    "portal",
    "setup",
    "contract",
    "draft",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Billing address must look like an email address, got {0:?}")]
    InvalidBillingAddress(String),
    #[error("Organization domain must contain a dot, got {0:?}")]
    InvalidOrganizationDomain(String),
    #[error("Summary character limit must be greater than zero")]
    ZeroSummaryLimit,
}

/// Who counts as the billing team and how summaries are rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Mailbox whose response latency is measured
    pub billing_address: String,
    /// Substring of a `To:` value that marks a message as sent to billing
    pub billing_keyword: String,
    /// Participant `From` addresses that belong to the billing team
    pub billing_addresses: Vec<String>,
    /// Sender display names that belong to the billing team
    pub billing_names: Vec<String>,
    /// Domain that makes an address internal
    pub organization_domain: String,
    /// Flow length above which the short summary keeps key messages only
    pub summary_char_limit: usize,
    pub business_terms: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            billing_address: "billing@gep.com".to_string(),
            billing_keyword: "billing".to_string(),
            billing_addresses: vec!["billing@gep.com".to_string(), "pinky.pal@gep.com".to_string()],
            billing_names: vec!["billing".to_string(), "pinky pal".to_string()],
            organization_domain: "gep.com".to_string(),
            summary_char_limit: 10_000,
            business_terms: DEFAULT_BUSINESS_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl EngineConfig {
    /// Load configuration using the priority described at module level
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if config::config_exists(CONFIG_FILE) {
            let cfg: Self = config::load_json(CONFIG_FILE)?;
            log::debug!("Loaded engine config from {CONFIG_FILE}");
            return cfg.validated();
        }

        Self::default()
            .with_overrides(|key| std::env::var(key).ok())
            .validated()
    }

    /// Load configuration from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let cfg: Self = config::load_json_file(path)?;
        cfg.validated()
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json).context("Failed to parse engine config JSON")?;
        cfg.validated()
    }

    /// Apply environment-style overrides looked up through `lookup`
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(address) = non_empty(ENV_BILLING_ADDRESS) {
            let address = address.to_lowercase();
            if !self.billing_addresses.contains(&address) {
                self.billing_addresses.push(address.clone());
            }
            self.billing_address = address;
        }
        if let Some(domain) = non_empty(ENV_ORG_DOMAIN) {
            self.organization_domain = domain.trim_start_matches('@').to_lowercase();
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let address = self.billing_address.trim();
        let valid_address = address
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !valid_address {
            return Err(ConfigError::InvalidBillingAddress(self.billing_address.clone()));
        }

        if !self.organization_domain.contains('.') {
            return Err(ConfigError::InvalidOrganizationDomain(
                self.organization_domain.clone(),
            ));
        }

        if self.summary_char_limit == 0 {
            return Err(ConfigError::ZeroSummaryLimit);
        }

        Ok(())
    }

    fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }
}
