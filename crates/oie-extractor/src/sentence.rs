//! Sentence forest and the builder that parses clauses into it
//!
//! A `Sentence` is one clause plus the clauses cut out of it: `left`
//! attachments precede or modify the core (adverbial, participial,
//! appositive), `right` attachments depend on it (relative, complement).

use std::collections::VecDeque;
use std::sync::Arc;

use oie_core::{Dependency, DependencyParser, OieError, ParsedSentence, RelationLabels, Result};

use crate::chunker::DependencyChunker;
use crate::detector::ClauseKind;
use crate::token::{Token, Unit};
use crate::tree::DependencyTree;
use crate::NounChunker;

// ============================================================================
// Sentence Forest
// ============================================================================

/// How an excised clause relates to the clause it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ClauseMessage {
    pub kind: ClauseKind,

    /// Subordinator removed from the clause ("that", "when", "who")
    pub marker: Option<String>,

    /// Governing verb or noun in the parent clause
    pub anchor: Option<Token>,
}

impl ClauseMessage {
    pub fn new(kind: ClauseKind, marker: Option<String>, anchor: Option<Token>) -> Self {
        Self {
            kind,
            marker,
            anchor,
        }
    }
}

/// A nested clause hanging off a sentence
#[derive(Debug, Clone)]
pub struct Attachment {
    pub message: ClauseMessage,
    pub sentence: Sentence,
}

/// A clause with its tree and the clauses excised from it
#[derive(Debug, Clone)]
pub struct Sentence {
    pub text: String,
    pub tree: DependencyTree,
    pub left: Vec<Attachment>,
    pub right: Vec<Attachment>,
}

impl Sentence {
    pub fn new(tree: DependencyTree) -> Self {
        Self {
            text: tree.text(),
            tree,
            left: Vec::new(),
            right: Vec::new(),
        }
    }

    /// Re-read the text after the tree was edited
    pub fn refresh_text(&mut self) {
        self.text = self.tree.text();
    }

    /// This clause and every nested one, breadth first, left attachments
    /// before right ones
    pub fn clauses(&self) -> Vec<&Sentence> {
        let mut clauses = Vec::new();
        let mut queue = VecDeque::from([self]);
        while let Some(sentence) = queue.pop_front() {
            clauses.push(sentence);
            queue.extend(sentence.left.iter().map(|a| &a.sentence));
            queue.extend(sentence.right.iter().map(|a| &a.sentence));
        }
        clauses
    }

    /// Indented outline of the forest
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        self.render_into(&mut lines, 0, None);
        lines.join("\n")
    }

    fn render_into(&self, lines: &mut Vec<String>, depth: usize, message: Option<&ClauseMessage>) {
        let indent = "  ".repeat(depth);
        let label = match message {
            Some(m) => match &m.marker {
                Some(marker) => format!("[{} {}] ", m.kind, marker),
                None => format!("[{}] ", m.kind),
            },
            None => String::new(),
        };
        lines.push(format!("{}{}{}", indent, label, self.text));
        for attachment in self.left.iter().chain(self.right.iter()) {
            attachment
                .sentence
                .render_into(lines, depth + 1, Some(&attachment.message));
        }
    }
}

// ============================================================================
// Sentence Builder
// ============================================================================

/// Builds clause trees, re-parsing token sequences through the injected
/// parser when a clause has been cut out and repaired
#[derive(Clone)]
pub struct SentenceBuilder {
    parser: Arc<dyn DependencyParser>,
    chunker: Option<Arc<dyn NounChunker>>,
    labels: Arc<RelationLabels>,
    merge_verbs: bool,
}

impl SentenceBuilder {
    /// Create a builder with dependency-based noun chunking
    pub fn new(parser: Arc<dyn DependencyParser>, labels: RelationLabels) -> Self {
        Self {
            parser,
            chunker: Some(Arc::new(DependencyChunker::new())),
            labels: Arc::new(labels),
            merge_verbs: false,
        }
    }

    /// Replace the noun chunker; `None` disables chunking
    pub fn with_chunker(mut self, chunker: Option<Arc<dyn NounChunker>>) -> Self {
        self.chunker = chunker;
        self
    }

    /// Merge verb groups as soon as a tree is built
    pub fn with_verb_merging(mut self, merge: bool) -> Self {
        self.merge_verbs = merge;
        self
    }

    pub fn labels(&self) -> Arc<RelationLabels> {
        Arc::clone(&self.labels)
    }

    /// Build the root sentence from a complete parse
    pub fn from_parsed(&self, parsed: &ParsedSentence) -> Result<Sentence> {
        parsed.validate()?;
        let tokens = parsed
            .tokens
            .iter()
            .enumerate()
            .map(|(i, t)| Token::new(t.word.clone(), t.pos.clone(), i + 1))
            .collect();
        self.build(tokens, &parsed.dependencies)
    }

    /// Parse a repaired clause. Phrases are flattened back into tokens,
    /// local indices are renumbered and original indices kept.
    pub fn from_units(&self, units: Vec<Unit>) -> Result<Sentence> {
        let tokens: Vec<Token> = units.into_iter().flat_map(Unit::into_tokens).collect();
        if tokens.is_empty() {
            return Err(OieError::MalformedInput("empty clause".to_string()));
        }

        let words: Vec<String> = tokens.iter().map(|t| t.word.clone()).collect();
        let parsed = self.parser.parse(&words)?;
        if parsed.len() != tokens.len() {
            return Err(OieError::ParserError(format!(
                "parser returned {} tokens for {} words",
                parsed.len(),
                tokens.len()
            )));
        }
        parsed.validate()?;

        let tokens = tokens
            .into_iter()
            .zip(parsed.tokens)
            .enumerate()
            .map(|(i, (token, parsed))| Token {
                word: token.word,
                pos: parsed.pos,
                index: i + 1,
                original: token.original,
            })
            .collect();
        self.build(tokens, &parsed.dependencies)
    }

    fn build(&self, tokens: Vec<Token>, dependencies: &[Dependency]) -> Result<Sentence> {
        let mut tree = DependencyTree::new(tokens, dependencies, self.labels())?;
        if self.merge_verbs {
            tree.merge_verb_phrases();
        }
        if let Some(chunker) = &self.chunker {
            let chunks = chunker.noun_chunks(&tree);
            tree.merge_noun_phrases(&chunks);
        }
        Ok(Sentence::new(tree))
    }
}

impl std::fmt::Debug for SentenceBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceBuilder")
            .field("labels", &self.labels)
            .field("chunking", &self.chunker.is_some())
            .field("merge_verbs", &self.merge_verbs)
            .finish()
    }
}
