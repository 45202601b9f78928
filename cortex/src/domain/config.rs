// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Knowledge Base Configuration
//
// Credentials and endpoints for the embedding service and the vector index.
// Sources, lowest to highest precedence:
// - YAML file (explicit path, HIVEMIND_CONFIG_PATH, or ./hivemind-config.yaml)
// - process environment (OPENAI_API_KEY, PINECONE_API_KEY, PINECONE_HOST, ...)
//
// Loading never fails because a credential is missing. Presence is checked
// by the client lifecycle on first use so the error names the exact setting.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::error::KnowledgeError;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const PINECONE_API_KEY: &str = "PINECONE_API_KEY";
pub const PINECONE_HOST: &str = "PINECONE_HOST";
pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const PINECONE_NAMESPACE: &str = "PINECONE_NAMESPACE";
pub const CONFIG_PATH_ENV: &str = "HIVEMIND_CONFIG_PATH";

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CONFIG_FILE: &str = "./hivemind-config.yaml";

/// Settings that must be present before any client is built, in check order.
pub const REQUIRED_SETTINGS: [&str; 3] = [OPENAI_API_KEY, PINECONE_API_KEY, PINECONE_HOST];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Embedding service credential (supports "env:VAR_NAME")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,

    /// Vector index credential (supports "env:VAR_NAME")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinecone_api_key: Option<String>,

    /// Vector index data-plane host, with or without scheme
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinecone_host: Option<String>,

    /// Override for OpenAI-compatible gateways
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinecone_namespace: Option<String>,
}

/// Configuration after required settings were confirmed present.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub openai_api_key: String,
    pub pinecone_api_key: String,
    pub pinecone_host: String,
    pub openai_base_url: String,
    pub pinecone_namespace: Option<String>,
}

impl KnowledgeConfig {
    /// Build from the process environment only.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|name| std::env::var(name).ok());
        config
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config.resolve_references(|name| std::env::var(name).ok()))
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Locate a config file: HIVEMIND_CONFIG_PATH, then the working directory.
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from(DEFAULT_CONFIG_FILE);
        if cwd.exists() {
            return Some(cwd);
        }

        None
    }

    /// Load configuration with discovery, falling back to environment only.
    ///
    /// An explicit path that cannot be read is an error; a missing discovered
    /// file is not.
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut config = if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            Self::from_yaml_file(&path)
                .with_context(|| format!("Failed to load config at {:?}", path))?
        } else if let Some(path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", path);
            Self::from_yaml_file(&path)
                .with_context(|| format!("Failed to load config at {:?}", path))?
        } else {
            tracing::debug!("No configuration file found, using environment only");
            Self::default()
        };

        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Overlay values from `lookup` (environment variables by name).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(value) = read(OPENAI_API_KEY) {
            self.openai_api_key = Some(value);
        }
        if let Some(value) = read(PINECONE_API_KEY) {
            self.pinecone_api_key = Some(value);
        }
        if let Some(value) = read(PINECONE_HOST) {
            self.pinecone_host = Some(value);
        }
        if let Some(value) = read(OPENAI_BASE_URL) {
            self.openai_base_url = Some(value);
        }
        if let Some(value) = read(PINECONE_NAMESPACE) {
            self.pinecone_namespace = Some(value);
        }
    }

    /// Replace "env:VAR_NAME" values with the variable's value. Unset
    /// variables and blank values are dropped.
    fn resolve_references(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let resolve = |value: Option<String>| {
            let value = match value {
                Some(v) => match v.strip_prefix("env:") {
                    Some(var_name) => lookup(var_name),
                    None => Some(v),
                },
                None => None,
            };
            value.filter(|v| !v.trim().is_empty())
        };

        Self {
            openai_api_key: resolve(self.openai_api_key),
            pinecone_api_key: resolve(self.pinecone_api_key),
            pinecone_host: resolve(self.pinecone_host),
            openai_base_url: resolve(self.openai_base_url),
            pinecone_namespace: resolve(self.pinecone_namespace),
        }
    }

    fn value_of(&self, setting: &str) -> Option<&str> {
        let value = match setting {
            OPENAI_API_KEY => self.openai_api_key.as_deref(),
            PINECONE_API_KEY => self.pinecone_api_key.as_deref(),
            PINECONE_HOST => self.pinecone_host.as_deref(),
            _ => None,
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }

    /// Required settings that are absent or blank, in check order.
    pub fn missing_settings(&self) -> Vec<&'static str> {
        REQUIRED_SETTINGS
            .iter()
            .copied()
            .filter(|setting| self.value_of(setting).is_none())
            .collect()
    }

    /// Confirm every required setting is present. The first missing one is
    /// reported by name.
    pub fn validate(&self) -> Result<ResolvedConfig, KnowledgeError> {
        if let Some(setting) = self.missing_settings().into_iter().next() {
            return Err(KnowledgeError::Configuration { setting });
        }

        let require = |setting: &'static str| {
            self.value_of(setting)
                .map(str::to_string)
                .ok_or(KnowledgeError::Configuration { setting })
        };

        Ok(ResolvedConfig {
            openai_api_key: require(OPENAI_API_KEY)?,
            pinecone_api_key: require(PINECONE_API_KEY)?,
            pinecone_host: require(PINECONE_HOST)?,
            openai_base_url: self
                .openai_base_url
                .clone()
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            pinecone_namespace: self.pinecone_namespace.clone().filter(|ns| !ns.is_empty()),
        })
    }

    /// Copy safe to print: credentials reduced to their last four characters.
    pub fn redacted(&self) -> Self {
        let mask = |value: &Option<String>| {
            value.as_ref().map(|v| {
                let tail: String = v.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
                format!("****{}", tail)
            })
        };

        Self {
            openai_api_key: mask(&self.openai_api_key),
            pinecone_api_key: mask(&self.pinecone_api_key),
            pinecone_host: self.pinecone_host.clone(),
            openai_base_url: self.openai_base_url.clone(),
            pinecone_namespace: self.pinecone_namespace.clone(),
        }
    }
}
