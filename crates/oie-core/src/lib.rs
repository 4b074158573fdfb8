//! OIE Core - Data model, label mapping, and shared types
//!
//! This crate defines the abstractions shared by every OIE crate:
//! - Common error types
//! - The parser input contract (tokens plus labeled dependencies)
//! - The tuple output model
//! - Canonical relation labels and their parser-specific spellings
//! - Configuration management

pub mod config;
pub mod labels;
pub mod tuple;

pub use config::{
    AppConfig, ConfigError, DecompositionStrategy, ExtractionConfig, LoggingConfig, ParserConfig,
};
pub use labels::{LabelScheme, PrepositionStyle, Relation, RelationLabels};
pub use tuple::{ClausePattern, Element, Tuple};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for OIE operations
#[derive(Error, Debug)]
pub enum OieError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Parser error: {0}")]
    ParserError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for OieError {
    fn from(e: serde_json::Error) -> Self {
        Self::SerializationError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OieError>;

// ============================================================================
// Parser Input Contract
// ============================================================================

/// Returns true for the label a parser puts on the root dependency
pub fn is_root_relation(label: &str) -> bool {
    label.eq_ignore_ascii_case("root")
}

/// A surface token as produced by the dependency parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedToken {
    pub word: String,
    pub pos: String,
}

impl ParsedToken {
    pub fn new(word: impl Into<String>, pos: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            pos: pos.into(),
        }
    }
}

/// A labeled governor -> dependent edge; token positions start at 1
/// and governor 0 stands for the virtual root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub governor: usize,
    pub dependent: usize,
    pub relation: String,
}

impl Dependency {
    pub fn new(governor: usize, dependent: usize, relation: impl Into<String>) -> Self {
        Self {
            governor,
            dependent,
            relation: relation.into(),
        }
    }
}

/// A named-entity mention supplied alongside a parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntity {
    pub text: String,
    pub label: String,
}

/// A coreference mention: the inclusive original token span `start..=end`
/// refers to `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorefMention {
    pub start: usize,
    pub end: usize,
    pub target: String,
}

/// One parsed sentence: the input contract of the extraction core
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedSentence {
    /// Tokens, position `i` in this vector is token index `i + 1`
    pub tokens: Vec<ParsedToken>,

    /// Labeled dependencies, exactly one of them labeled root
    pub dependencies: Vec<Dependency>,

    /// Named entities recognized by the upstream pipeline
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<NamedEntity>,

    /// Externally resolved coreference mentions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coreferences: Vec<CorefMention>,
}

impl ParsedSentence {
    /// Create a new parsed sentence
    pub fn new(tokens: Vec<ParsedToken>, dependencies: Vec<Dependency>) -> Self {
        Self {
            tokens,
            dependencies,
            entities: Vec::new(),
            coreferences: Vec::new(),
        }
    }

    /// Attach named entities
    pub fn with_entities(mut self, entities: Vec<NamedEntity>) -> Self {
        self.entities = entities;
        self
    }

    /// Attach coreference mentions
    pub fn with_coreferences(mut self, coreferences: Vec<CorefMention>) -> Self {
        self.coreferences = coreferences;
        self
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Surface words in order
    pub fn words(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.word.clone()).collect()
    }

    /// Space-joined surface text
    pub fn text(&self) -> String {
        self.words().join(" ")
    }

    /// The root dependency, if present
    pub fn root(&self) -> Option<&Dependency> {
        self.dependencies
            .iter()
            .find(|d| is_root_relation(&d.relation))
    }

    /// Structural validation of the parse.
    ///
    /// Rejects empty sentences, edges that reference missing tokens,
    /// a missing or repeated root, tokens with two governors and cycles.
    pub fn validate(&self) -> Result<()> {
        let n = self.tokens.len();
        if n == 0 {
            return Err(OieError::MalformedInput("sentence has no tokens".to_string()));
        }

        let mut governors: Vec<Option<usize>> = vec![None; n + 1];
        let mut roots = 0;

        for dep in &self.dependencies {
            if dep.dependent == 0 || dep.dependent > n {
                return Err(OieError::MalformedInput(format!(
                    "dependent {} is outside 1..={}",
                    dep.dependent, n
                )));
            }
            if dep.governor > n {
                return Err(OieError::MalformedInput(format!(
                    "governor {} is outside 0..={}",
                    dep.governor, n
                )));
            }
            if governors[dep.dependent].is_some() {
                return Err(OieError::MalformedInput(format!(
                    "token {} has more than one governor",
                    dep.dependent
                )));
            }

            if is_root_relation(&dep.relation) {
                roots += 1;
                governors[dep.dependent] = Some(0);
            } else {
                if dep.governor == 0 || dep.governor == dep.dependent {
                    return Err(OieError::MalformedInput(format!(
                        "invalid governor {} for non-root token {}",
                        dep.governor, dep.dependent
                    )));
                }
                governors[dep.dependent] = Some(dep.governor);
            }
        }

        if roots != 1 {
            return Err(OieError::MalformedInput(format!(
                "expected exactly one root dependency, found {roots}"
            )));
        }

        // Every attached token must reach the root by following governors
        for start in 1..=n {
            let mut seen = HashSet::new();
            let mut current = start;
            while let Some(gov) = governors[current] {
                if gov == 0 {
                    break;
                }
                if !seen.insert(current) {
                    return Err(OieError::MalformedInput(format!(
                        "dependency cycle through token {start}"
                    )));
                }
                current = gov;
            }
        }

        Ok(())
    }
}

// ============================================================================
// Parser Trait
// ============================================================================

/// Dependency parser boundary.
///
/// The extraction core calls this to re-parse clauses it has excised and
/// repaired. Implementations must return exactly one token per input word.
pub trait DependencyParser: Send + Sync {
    fn parse(&self, words: &[String]) -> Result<ParsedSentence>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(deps: Vec<Dependency>) -> ParsedSentence {
        ParsedSentence::new(
            vec![
                ParsedToken::new("he", "PRP"),
                ParsedToken::new("cried", "VBD"),
            ],
            deps,
        )
    }

    #[test]
    fn test_validate_accepts_tree() {
        let s = sentence(vec![
            Dependency::new(0, 2, "ROOT"),
            Dependency::new(2, 1, "nsubj"),
        ]);
        assert!(s.validate().is_ok());
        assert_eq!(s.text(), "he cried");
        assert_eq!(s.root().map(|d| d.dependent), Some(2));
    }

    #[test]
    fn test_validate_rejects_missing_root() {
        let s = sentence(vec![Dependency::new(2, 1, "nsubj")]);
        assert!(matches!(s.validate(), Err(OieError::MalformedInput(_))));
    }

    #[test]
    fn test_validate_rejects_two_roots() {
        let s = sentence(vec![
            Dependency::new(0, 2, "root"),
            Dependency::new(0, 1, "root"),
        ]);
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_dangling_index() {
        let s = sentence(vec![
            Dependency::new(0, 2, "ROOT"),
            Dependency::new(2, 3, "dobj"),
        ]);
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_cycle() {
        let s = ParsedSentence::new(
            vec![
                ParsedToken::new("a", "DT"),
                ParsedToken::new("b", "NN"),
                ParsedToken::new("c", "VBD"),
            ],
            vec![
                Dependency::new(0, 3, "ROOT"),
                Dependency::new(2, 1, "det"),
                Dependency::new(1, 2, "dep"),
            ],
        );
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_parsed_sentence_json() {
        let json = r#"{
            "tokens": [{"word": "he", "pos": "PRP"}, {"word": "cried", "pos": "VBD"}],
            "dependencies": [
                {"governor": 0, "dependent": 2, "relation": "ROOT"},
                {"governor": 2, "dependent": 1, "relation": "nsubj"}
            ]
        }"#;
        let parsed: ParsedSentence = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.len(), 2);
        assert!(parsed.entities.is_empty());
        assert!(parsed.validate().is_ok());
    }
}
