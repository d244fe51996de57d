//! Configuration management for the concierge pipeline.
//!
//! Configuration is merged from three layers, lowest to highest precedence:
//! - Defaults
//! - Optional YAML config file (`concierge.yaml`)
//! - Environment variables and CLI overrides

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};
use crate::namespace::{NamespaceEntry, NamespaceRegistry};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Completion model provider (e.g., "ollama", "openai")
    pub provider: String,

    /// Completion model identifier
    pub model: String,

    /// Embedding provider (e.g., "trigram", "ollama")
    pub embedding_provider: String,

    /// Embedding model identifier
    pub embedding_model: String,

    /// Embedding vector dimension
    pub embedding_dim: usize,

    /// API key for the completion provider
    pub api_key: Option<String>,

    /// Path to the SQLite passage index
    pub index_path: PathBuf,

    /// Retrieval tuning
    pub retrieval: RetrievalSettings,

    /// Registered topic namespaces
    pub namespaces: Vec<NamespaceEntry>,

    /// Log level override
    pub log_level: Option<String>,

    /// Disable colored output
    pub no_color: bool,

    /// Provider endpoint overrides
    pub providers: HashMap<String, ProviderConfig>,
}

/// Retrieval tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalSettings {
    /// Final passages kept per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Candidate pool fetched before diversity re-ranking
    #[serde(default = "default_fetch_k")]
    pub fetch_k: usize,

    /// Relevance/diversity balance (1.0 = pure relevance)
    #[serde(default = "default_mmr_lambda")]
    pub mmr_lambda: f32,

    /// Minimum relevance score; passages below are dropped
    #[serde(default)]
    pub score_threshold: Option<f32>,
}

fn default_top_k() -> usize {
    8
}

fn default_fetch_k() -> usize {
    24
}

fn default_mmr_lambda() -> f32 {
    0.5
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            fetch_k: default_fetch_k(),
            mmr_lambda: default_mmr_lambda(),
            score_threshold: None,
        }
    }
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        #[serde(rename = "embeddingModel")]
        embedding_model: Option<String>,
        endpoint: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
        #[serde(rename = "embeddingModel")]
        embedding_model: Option<String>,
        timeout: Option<u64>,
    },
}

/// Full configuration file structure.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    embedding: Option<EmbeddingSection>,
    retrieval: Option<RetrievalSettings>,
    namespaces: Option<Vec<NamespaceEntry>>,
    index: Option<IndexSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Deserialize)]
struct LlmSection {
    #[serde(rename = "activeProvider")]
    active_provider: String,
    providers: Option<HashMap<String, ProviderConfig>>,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingSection {
    provider: Option<String>,
    model: Option<String>,
    dimensions: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
struct IndexSection {
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            embedding_provider: "trigram".to_string(),
            embedding_model: "trigram-v1".to_string(),
            embedding_dim: 384,
            api_key: None,
            index_path: PathBuf::from("concierge.sqlite"),
            retrieval: RetrievalSettings::default(),
            namespaces: NamespaceRegistry::default().entries().to_vec(),
            log_level: None,
            no_color: false,
            providers: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `CONCIERGE_CONFIG`: Path to config file
    /// - `CONCIERGE_PROVIDER`: Completion provider
    /// - `CONCIERGE_MODEL`: Completion model identifier
    /// - `CONCIERGE_API_KEY`: API key
    /// - `CONCIERGE_INDEX`: SQLite index path
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(config_file) = std::env::var("CONCIERGE_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        // Load from YAML config file if it exists
        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("concierge.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("CONCIERGE_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("CONCIERGE_MODEL") {
            config.model = model;
        }

        if let Ok(index) = std::env::var("CONCIERGE_INDEX") {
            config.index_path = PathBuf::from(index);
        }

        config.api_key = std::env::var("CONCIERGE_API_KEY").ok().or(config.api_key);
        config.log_level = std::env::var("RUST_LOG").ok().or(config.log_level);

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(providers) = llm.providers {
                if let Some(provider_config) = providers.get(&llm.active_provider) {
                    result.model = match provider_config {
                        ProviderConfig::OpenAI { model, .. } => model.clone(),
                        ProviderConfig::Ollama { model, .. } => model.clone(),
                    };
                }
                result.providers = providers;
            }
        }

        if let Some(embedding) = config_file.embedding {
            if let Some(provider) = embedding.provider {
                result.embedding_provider = provider;
            }
            if let Some(model) = embedding.model {
                result.embedding_model = model;
            }
            if let Some(dimensions) = embedding.dimensions {
                result.embedding_dim = dimensions;
            }
        }

        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }

        if let Some(namespaces) = config_file.namespaces {
            if namespaces.is_empty() {
                return Err(AppError::Config(
                    "Config declares an empty namespaces list".to_string(),
                ));
            }
            result.namespaces = namespaces;
        }

        if let Some(index) = config_file.index {
            if let Some(path) = index.path {
                result.index_path = path;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides, giving precedence to flags over environment.
    pub fn with_overrides(
        mut self,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose && self.log_level.is_none() {
            self.log_level = Some("debug".to_string());
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Build the namespace registry from configured entries.
    pub fn namespace_registry(&self) -> NamespaceRegistry {
        NamespaceRegistry::from_entries(self.namespaces.clone())
    }

    /// Resolve the endpoint for a provider, if configured.
    pub fn provider_endpoint(&self, provider: &str) -> Option<String> {
        match self.providers.get(provider) {
            Some(ProviderConfig::Ollama { endpoint, .. }) => Some(endpoint.clone()),
            Some(ProviderConfig::OpenAI { endpoint, .. }) => endpoint.clone(),
            None => None,
        }
    }

    /// Resolve the API key for a provider from config or environment.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        if let Some(ProviderConfig::OpenAI { api_key_env, .. }) = self.providers.get(provider) {
            if let Ok(key) = std::env::var(api_key_env) {
                return Some(key);
            }
        }

        None
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["ollama", "openai"];
        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        if self.retrieval.top_k == 0 {
            return Err(AppError::Config(
                "retrieval.top_k must be at least 1".to_string(),
            ));
        }

        if self.retrieval.fetch_k < self.retrieval.top_k {
            return Err(AppError::Config(format!(
                "retrieval.fetch_k ({}) must be >= retrieval.top_k ({})",
                self.retrieval.fetch_k, self.retrieval.top_k
            )));
        }

        Ok(())
    }
}
