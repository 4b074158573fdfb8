//! Lookup-table parser
//!
//! Serves pre-parsed clauses keyed by their space-joined words. A table is
//! a JSON array of parsed sentences; every clause the core may re-parse
//! has to be in it.

use std::collections::HashMap;
use std::path::Path;

use oie_core::{DependencyParser, ParsedSentence};

use crate::{ParserError, Result};

/// Parser backed by a table of known parses
#[derive(Debug, Clone, Default)]
pub struct TableParser {
    parses: HashMap<String, ParsedSentence>,
}

impl TableParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a table from a JSON array of parsed sentences
    pub fn from_json(json: &str) -> Result<Self> {
        let sentences: Vec<ParsedSentence> =
            serde_json::from_str(json).map_err(|e| ParserError::TableError(e.to_string()))?;
        let mut table = Self::new();
        for sentence in sentences {
            table.insert(sentence)?;
        }
        Ok(table)
    }

    /// Load a table from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ParserError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    /// Add a parse; it must be structurally valid
    pub fn insert(&mut self, sentence: ParsedSentence) -> Result<()> {
        sentence
            .validate()
            .map_err(|e| ParserError::TableError(format!("'{}': {}", sentence.text(), e)))?;
        self.parses.insert(sentence.text(), sentence);
        Ok(())
    }

    /// Add every sentence of another source, e.g. a CoNLL-U file
    pub fn extend(&mut self, sentences: impl IntoIterator<Item = ParsedSentence>) -> Result<()> {
        for sentence in sentences {
            self.insert(sentence)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.parses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parses.is_empty()
    }

    pub fn get(&self, words: &[String]) -> Option<&ParsedSentence> {
        self.parses.get(&words.join(" "))
    }
}

impl DependencyParser for TableParser {
    fn parse(&self, words: &[String]) -> oie_core::Result<ParsedSentence> {
        self.get(words)
            .cloned()
            .ok_or_else(|| {
                tracing::debug!("No table parse for '{}'", words.join(" "));
                ParserError::Unparsed(words.join(" ")).into()
            })
    }
}
