//! OIE Configuration Management
//!
//! Handles configuration from environment variables and TOML files
//! with sensible defaults for local use.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::labels::{LabelScheme, RelationLabels};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Parser boundary configuration
    pub parser: ParserConfig,

    /// Extraction pipeline configuration
    pub extraction: ExtractionConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Parser
        if let Ok(url) = std::env::var("OIE_CORENLP_URL") {
            config.parser.corenlp_url = url;
        }
        if let Ok(secs) = std::env::var("OIE_PARSER_TIMEOUT_SECS") {
            config.parser.timeout_secs = parse_value("OIE_PARSER_TIMEOUT_SECS", secs)?;
        }
        if let Ok(scheme) = std::env::var("OIE_LABEL_SCHEME") {
            config.parser.label_scheme = scheme.parse()?;
        }

        // Extraction
        if let Ok(strategy) = std::env::var("OIE_STRATEGY") {
            config.extraction.strategy = strategy.parse()?;
        }
        if let Ok(flag) = std::env::var("OIE_CHUNK_NOUNS") {
            config.extraction.chunk_noun_phrases = parse_value("OIE_CHUNK_NOUNS", flag)?;
        }
        if let Ok(flag) = std::env::var("OIE_MERGE_VERBS") {
            config.extraction.merge_verb_phrases = parse_value("OIE_MERGE_VERBS", flag)?;
        }
        if let Ok(flag) = std::env::var("OIE_TWO_TIER_ADVERBIALS") {
            config.extraction.two_tier_adverbials =
                parse_value("OIE_TWO_TIER_ADVERBIALS", flag)?;
        }
        if let Ok(limit) = std::env::var("OIE_MAX_CONCURRENCY") {
            config.extraction.max_concurrency = parse_value("OIE_MAX_CONCURRENCY", limit)?;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(flag) = std::env::var("LOG_JSON") {
            config.logging.json_format = parse_value("LOG_JSON", flag)?;
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;
        let parser_default = ParserConfig::default();
        let extraction_default = ExtractionConfig::default();

        // Only override if env values differ from defaults
        if env_config.parser.corenlp_url != parser_default.corenlp_url {
            self.parser.corenlp_url = env_config.parser.corenlp_url;
        }
        if env_config.parser.timeout_secs != parser_default.timeout_secs {
            self.parser.timeout_secs = env_config.parser.timeout_secs;
        }
        if env_config.parser.label_scheme != parser_default.label_scheme {
            self.parser.label_scheme = env_config.parser.label_scheme;
        }
        if env_config.extraction.strategy != extraction_default.strategy {
            self.extraction.strategy = env_config.extraction.strategy;
        }
        if env_config.extraction.chunk_noun_phrases != extraction_default.chunk_noun_phrases {
            self.extraction.chunk_noun_phrases = env_config.extraction.chunk_noun_phrases;
        }
        if env_config.extraction.merge_verb_phrases != extraction_default.merge_verb_phrases {
            self.extraction.merge_verb_phrases = env_config.extraction.merge_verb_phrases;
        }
        if env_config.extraction.two_tier_adverbials != extraction_default.two_tier_adverbials {
            self.extraction.two_tier_adverbials = env_config.extraction.two_tier_adverbials;
        }
        if env_config.extraction.max_concurrency != extraction_default.max_concurrency {
            self.extraction.max_concurrency = env_config.extraction.max_concurrency;
        }
        if env_config.logging.level != LoggingConfig::default().level {
            self.logging.level = env_config.logging.level;
        }
        if env_config.logging.json_format {
            self.logging.json_format = true;
        }

        Ok(self)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Parser boundary configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// CoreNLP server URL
    pub corenlp_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Built-in relation label scheme of the wired-in parser
    pub label_scheme: LabelScheme,

    /// Custom label table, replaces the scheme preset when set
    pub labels: Option<RelationLabels>,
}

impl ParserConfig {
    /// The label table in effect
    pub fn relation_labels(&self) -> RelationLabels {
        self.labels
            .clone()
            .unwrap_or_else(|| RelationLabels::for_scheme(self.label_scheme))
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            corenlp_url: "http://localhost:9000".to_string(),
            timeout_secs: 30,
            label_scheme: LabelScheme::CoreNlp,
            labels: None,
        }
    }
}

/// Extraction pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// How sentences are decomposed into minimal clauses
    pub strategy: DecompositionStrategy,

    /// Merge noun chunks into phrases before decomposition
    pub chunk_noun_phrases: bool,

    /// Merge verb groups as soon as a clause tree is built
    pub merge_verb_phrases: bool,

    /// Keep only the first PP per verb for classification and
    /// re-attach the later ones after extraction
    pub two_tier_adverbials: bool,

    /// Maximum sentences processed concurrently by the batch runner
    pub max_concurrency: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            strategy: DecompositionStrategy::SinglePass,
            chunk_noun_phrases: true,
            merge_verb_phrases: false,
            two_tier_adverbials: false,
            max_concurrency: 8,
        }
    }
}

/// Sentence decomposition strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecompositionStrategy {
    /// Scan subordination points once, left to right
    #[default]
    SinglePass,
    /// Re-parse the remaining clause after every extraction
    Reparse,
    /// Extract appositives first (re-parsing after each), then a single pass
    AppositionFirst,
}

impl DecompositionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SinglePass => "single_pass",
            Self::Reparse => "reparse",
            Self::AppositionFirst => "apposition_first",
        }
    }
}

impl std::fmt::Display for DecompositionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DecompositionStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "single_pass" | "once" => Ok(Self::SinglePass),
            "reparse" | "multiple" => Ok(Self::Reparse),
            "apposition_first" | "appos" => Ok(Self::AppositionFirst),
            _ => Err(ConfigError::InvalidValue {
                key: "OIE_STRATEGY".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,

    /// Include file/line in logs
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            include_location: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

impl From<ConfigError> for crate::OieError {
    fn from(e: ConfigError) -> Self {
        Self::ConfigError(e.to_string())
    }
}
