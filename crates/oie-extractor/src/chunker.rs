//! Noun chunking
//!
//! Chunks are contiguous spans ending in a noun head and covering its
//! pre-modifiers (determiners, adjectives, compounds, possessives). They
//! are merged into single tree nodes before clause decomposition.

use std::collections::BTreeSet;

use oie_core::Relation;

use crate::tree::DependencyTree;
use crate::NounChunker;

/// Chunks read off the dependency structure itself
#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyChunker;

impl DependencyChunker {
    pub fn new() -> Self {
        Self
    }

    fn chunk_at(&self, tree: &DependencyTree, head: usize) -> Option<Vec<usize>> {
        let mut start = head;
        let mut covered = BTreeSet::from([head]);
        for child in tree.children(head) {
            if child > head || !tree.incoming_is(child, Relation::NounModifier) {
                continue;
            }
            let subtree = tree.subtree(child, &[]);
            if subtree.iter().any(|i| *i > head) {
                return None;
            }
            if let Some(first) = subtree.first() {
                start = start.min(*first);
            }
            covered.extend(subtree);
        }
        if start == head {
            return None;
        }

        let span: Vec<usize> = tree
            .indices()
            .into_iter()
            .filter(|i| (start..=head).contains(i))
            .collect();
        // Gaps in the range or foreign nodes inside it break the chunk
        if span.len() != head - start + 1 || span.iter().any(|i| !covered.contains(i)) {
            return None;
        }
        Some(span)
    }
}

impl NounChunker for DependencyChunker {
    fn noun_chunks(&self, tree: &DependencyTree) -> Vec<Vec<usize>> {
        tree.units()
            .filter(|(_, u)| !u.is_phrase() && u.is_noun())
            .map(|(i, _)| i)
            // Nested nouns ("the company's") belong to the outer chunk
            .filter(|i| !tree.incoming_is(*i, Relation::NounModifier))
            .filter_map(|i| self.chunk_at(tree, i))
            .collect()
    }
}
