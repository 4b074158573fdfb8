//! OIE Parser - Adapters for the dependency parser boundary
//!
//! Supplies parses to the extraction core from:
//! - CoNLL-U files produced by any UD-style parser
//! - A running CoreNLP server
//! - A JSON lookup table of pre-parsed clauses
//!
//! The CoreNLP client and the lookup table implement
//! `oie_core::DependencyParser`, so the core can re-parse the clauses it
//! cuts out of a sentence.

use oie_core::OieError;
use thiserror::Error;

pub mod conllu;
pub mod corenlp;
pub mod table;

pub use conllu::{ConllReader, ConllSentence};
pub use corenlp::CoreNlpClient;
pub use table::TableParser;

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while obtaining parses
#[derive(Error, Debug)]
pub enum ParserError {
    /// IO error while reading a file
    #[error("IO error reading file: {path}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CoNLL-U input
    #[error("CoNLL-U format error at line {line}: {message}")]
    FormatError { line: usize, message: String },

    /// Transport failure talking to a parser server
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The parser answered with something unusable
    #[error("Invalid parser response: {0}")]
    InvalidResponse(String),

    /// Malformed parse table
    #[error("Invalid parse table: {0}")]
    TableError(String),

    /// No parse is available for the requested clause
    #[error("No parse for clause: {0}")]
    Unparsed(String),
}

pub type Result<T> = std::result::Result<T, ParserError>;

impl From<ParserError> for OieError {
    fn from(e: ParserError) -> Self {
        Self::ParserError(e.to_string())
    }
}

/// Universal Dependencies spells passive relations with a subtype;
/// the label presets use the fused spelling.
pub fn normalize_relation(label: &str) -> String {
    match label {
        "nsubj:pass" => "nsubjpass".to_string(),
        "aux:pass" => "auxpass".to_string(),
        "csubj:pass" => "csubjpass".to_string(),
        other => other.to_string(),
    }
}
