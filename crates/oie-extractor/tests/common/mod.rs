//! Shared fixtures for the pipeline tests

#![allow(dead_code)]

use std::sync::Arc;

use oie_core::{Dependency, ParsedSentence, ParsedToken, RelationLabels};
use oie_extractor::OpenIe;
use oie_parser::TableParser;

/// Build a parse from space-separated words and tags plus
/// `(governor, dependent, relation)` edges
pub fn parsed(words: &str, tags: &str, deps: &[(usize, usize, &str)]) -> ParsedSentence {
    let tokens = words
        .split_whitespace()
        .zip(tags.split_whitespace())
        .map(|(w, t)| ParsedToken::new(w, t))
        .collect();
    let dependencies = deps
        .iter()
        .map(|(g, d, r)| Dependency::new(*g, *d, *r))
        .collect();
    ParsedSentence::new(tokens, dependencies)
}

/// Pipeline whose parser only knows the given clause parses
pub fn openie(clauses: Vec<ParsedSentence>) -> OpenIe {
    let mut table = TableParser::new();
    table.extend(clauses).unwrap();
    OpenIe::new(Arc::new(table), RelationLabels::corenlp())
}
