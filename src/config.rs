use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

pub const DEFAULT_API_VERSION: &str = "2024-04-01-preview";

pub const ENV_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
pub const ENV_API_KEY: &str = "AZURE_OPENAI_API_KEY";
pub const ENV_DEPLOYMENT: &str = "AZURE_OPENAI_DEPLOYMENT_NAME";
pub const ENV_API_VERSION: &str = "AZURE_OPENAI_API_VERSION";

/// Size and pen settings of the drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub width: u32,
    pub height: u32,
    pub line_width: f32,
    pub font_size: f32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 400,
            line_width: 2.0,
            font_size: 16.0,
        }
    }
}

/// How history snapshots are compressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotEncoding {
    /// Lossless, larger
    Png,
    /// Lossy, `quality` in 1..=100
    Jpeg { quality: u8 },
}

impl Default for SnapshotEncoding {
    fn default() -> Self {
        Self::Jpeg { quality: 50 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of snapshots kept; the oldest is evicted first
    pub capacity: usize,
    /// Quiet period after a draw before the snapshot is taken
    pub debounce_ms: u64,
    /// Delay between clearing the surface and capturing the blank state
    pub clear_delay_ms: u64,
    pub encoding: SnapshotEncoding,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: 10,
            debounce_ms: 100,
            clear_delay_ms: 10,
            encoding: SnapshotEncoding::default(),
        }
    }
}

impl HistoryConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn clear_delay(&self) -> Duration {
        Duration::from_millis(self.clear_delay_ms)
    }
}

/// Top level application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub surface: SurfaceConfig,
    pub history: HistoryConfig,
    /// Where the saved drawing record lives
    pub storage_dir: PathBuf,
    /// Where downloaded charts are written
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            surface: SurfaceConfig::default(),
            history: HistoryConfig::default(),
            storage_dir: PathBuf::from(".helm_sketch"),
            output_dir: PathBuf::from("."),
        }
    }
}

/// Connection settings for the Azure OpenAI deployment.
///
/// Every field is optional here so a partially configured environment can be
/// reported item by item instead of failing on the first gap.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub deployment: Option<String>,
    pub api_version: Option<String>,
}

// Keep the key out of logs.
impl std::fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<present>"))
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Fully resolved settings, produced by [`AnalysisConfig::resolve`]
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedAnalysisConfig {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
}

impl AnalysisConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            endpoint: non_empty(ENV_ENDPOINT),
            api_key: non_empty(ENV_API_KEY),
            deployment: non_empty(ENV_DEPLOYMENT),
            api_version: non_empty(ENV_API_VERSION),
        }
    }

    /// Names of the required items that are absent
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.endpoint.is_none() {
            missing.push(ENV_ENDPOINT);
        }
        if self.api_key.is_none() {
            missing.push(ENV_API_KEY);
        }
        if self.deployment.is_none() {
            missing.push(ENV_DEPLOYMENT);
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    pub fn resolve(&self) -> Result<ResolvedAnalysisConfig, AnalysisError> {
        match (&self.endpoint, &self.api_key, &self.deployment) {
            (Some(endpoint), Some(api_key), Some(deployment)) => Ok(ResolvedAnalysisConfig {
                endpoint: endpoint.trim_end_matches('/').to_owned(),
                api_key: api_key.clone(),
                deployment: deployment.clone(),
                api_version: self
                    .api_version
                    .clone()
                    .unwrap_or_else(|| DEFAULT_API_VERSION.to_owned()),
            }),
            _ => Err(AnalysisError::MissingConfig(self.missing())),
        }
    }
}

impl ResolvedAnalysisConfig {
    pub fn chat_completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_reports_all_required_items() {
        let config = AnalysisConfig::from_lookup(lookup(&[]));
        assert_eq!(
            config.missing(),
            vec![ENV_ENDPOINT, ENV_API_KEY, ENV_DEPLOYMENT]
        );
    }

    #[test]
    fn blank_values_count_as_missing() {
        let config = AnalysisConfig::from_lookup(lookup(&[
            (ENV_ENDPOINT, "https://example.openai.azure.com"),
            (ENV_API_KEY, "   "),
            (ENV_DEPLOYMENT, "gpt-4o"),
        ]));
        assert_eq!(config.missing(), vec![ENV_API_KEY]);
    }

    #[test]
    fn api_version_defaults_when_absent() {
        let config = AnalysisConfig::from_lookup(lookup(&[
            (ENV_ENDPOINT, "https://example.openai.azure.com/"),
            (ENV_API_KEY, "secret"),
            (ENV_DEPLOYMENT, "gpt-4o"),
        ]));
        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.api_version, DEFAULT_API_VERSION);
        assert_eq!(
            resolved.chat_completions_url(),
            "https://example.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-04-01-preview"
        );
    }

    #[test]
    fn debug_output_hides_the_key() {
        let config = AnalysisConfig {
            api_key: Some("super-secret".to_owned()),
            ..Default::default()
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<present>"));
    }

    #[test]
    fn app_config_fills_missing_fields_with_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"history": {"capacity": 3}}"#).unwrap();
        assert_eq!(config.history.capacity, 3);
        assert_eq!(config.history.debounce_ms, 100);
        assert_eq!(config.surface, SurfaceConfig::default());
    }
}
