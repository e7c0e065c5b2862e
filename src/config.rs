// src/config.rs
// =============================================================================
// This module defines the crawl configuration and how it is loaded.
//
// Sources:
// - The built-in default (config/default.json, embedded at compile time)
// - A user-supplied JSON or YAML file (--config path)
//
// The crawler itself never validates anything: validate() must be called
// before a Config is handed to crawl::Crawler.
//
// Rust concepts:
// - serde derive: Turns JSON/YAML text into a typed struct
// - include_str!: Embeds a file into the binary at compile time
// =============================================================================

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use url::Url;

// The default configuration, baked into the binary
const DEFAULT_CONFIG: &str = include_str!("../config/default.json");

// Everything a crawl needs to know. Immutable for the duration of a crawl.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Starting points; one is picked at random every time the outer loop restarts
    pub root_urls: Vec<String>,

    /// User-Agent header values, one picked at random per request
    pub user_agents: Vec<String>,

    /// Any link containing one of these substrings is never visited
    #[serde(default)]
    pub blacklisted_urls: Vec<String>,

    /// Maximum number of link hops taken from a root page
    pub max_depth: usize,

    /// Overall crawl budget in seconds (0 = run until cancelled)
    #[serde(default)]
    pub timeout: u64,

    /// Lower bound of the sleep between visits, in microseconds
    pub min_sleep: u64,

    /// Upper bound of the sleep between visits, in microseconds
    pub max_sleep: u64,
}

impl Config {
    // Parses the configuration that ships inside the binary
    pub fn load_default() -> Result<Self> {
        serde_json::from_str(DEFAULT_CONFIG).context("built-in default config is not valid JSON")
    }

    // Reads a configuration file from disk
    //
    // Files ending in .yaml or .yml are parsed as YAML, everything else as JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );

        if is_yaml {
            serde_yaml::from_str(&text)
                .with_context(|| format!("invalid YAML in {}", path.display()))
        } else {
            serde_json::from_str(&text)
                .with_context(|| format!("invalid JSON in {}", path.display()))
        }
    }

    // Checks the constraints the crawler relies on
    //
    // Returns an error describing the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        if self.root_urls.is_empty() {
            bail!("config must list at least one root URL");
        }
        if self.user_agents.is_empty() {
            bail!("config must list at least one user agent");
        }
        for root in &self.root_urls {
            Url::parse(root).with_context(|| format!("root URL '{}' is not an absolute URL", root))?;
        }
        if self.min_sleep > self.max_sleep {
            bail!(
                "min_sleep ({}) must not exceed max_sleep ({})",
                self.min_sleep,
                self.max_sleep
            );
        }
        Ok(())
    }
}
