//! OIE Extractor - Clause decomposition and tuple extraction
//!
//! Turns a dependency-parsed sentence into a forest of minimal clauses and
//! reads relational tuples off each clause:
//! - Dependency tree arena with phrase merging and subtree surgery
//! - Clause detection and restructuring into standalone clauses
//! - Clause pattern classification (SV, SVO, SVc, ...)
//! - Tuple extraction with adverbial re-attachment

use oie_core::ClausePattern;

pub mod adverbial;
pub mod batch;
pub mod chunker;
pub mod classifier;
pub mod detector;
pub mod extraction;
pub mod lemma;
pub mod pipeline;
pub mod restructure;
pub mod sentence;
pub mod token;
pub mod tree;

pub use adverbial::AdverbialMap;
pub use batch::{extract_batch, SentenceOutcome};
pub use chunker::DependencyChunker;
pub use classifier::PatternClassifier;
pub use detector::{ClauseDetector, ClauseKind};
pub use extraction::TupleExtractor;
pub use pipeline::OpenIe;
pub use restructure::SentenceRestructurer;
pub use sentence::{Attachment, ClauseMessage, Sentence, SentenceBuilder};
pub use token::{Phrase, PhraseKind, Token, Unit};
pub use tree::DependencyTree;

/// Source of noun chunks for a freshly built clause tree
pub trait NounChunker: Send + Sync {
    /// Spans of local indices, each in clause order
    fn noun_chunks(&self, tree: &DependencyTree) -> Vec<Vec<usize>>;
}

/// Trait for clause pattern classifiers
pub trait ClauseClassifier: Send + Sync {
    /// Pattern of the clause headed by the verb at `index`, or `None`
    /// when the verb is not a clause head
    fn classify(&self, tree: &DependencyTree, index: usize) -> Option<ClausePattern>;
}
