//! Adverbial extraction
//!
//! Prepositional modifiers of verbs are cut out of a clause before its
//! pattern is classified, so a trailing PP never reads as an object, and
//! handed back as spans keyed by verb index for re-attachment.

use std::collections::{BTreeMap, BTreeSet};

use oie_core::Relation;

use crate::token::Unit;
use crate::tree::DependencyTree;

/// Removed adverbial spans per verb index
pub type AdverbialMap = BTreeMap<usize, Vec<Vec<Unit>>>;

/// Prepositions whose coordinated objects form one adverbial
const FULL_SPAN_PREPOSITIONS: [&str; 2] = ["between", "among"];

const COORDINATION: [Relation; 3] = [
    Relation::Conjunct,
    Relation::Coordinator,
    Relation::Punctuation,
];

impl DependencyTree {
    /// Remove every prepositional modifier of every verb
    pub fn adverbials(&mut self) -> AdverbialMap {
        self.collect_adverbials(0)
    }

    /// Remove the second and later prepositional modifiers of every verb,
    /// leaving the first one attached for pattern classification
    pub fn extra_adverbials(&mut self) -> AdverbialMap {
        self.collect_adverbials(1)
    }

    fn collect_adverbials(&mut self, keep: usize) -> AdverbialMap {
        let verbs: Vec<usize> = self
            .units()
            .filter(|(_, u)| u.is_verb())
            .map(|(i, _)| i)
            .collect();

        let mut map = AdverbialMap::new();
        let mut removals = Vec::new();
        for verb in verbs {
            let modifiers: Vec<usize> = self
                .children(verb)
                .into_iter()
                .filter(|c| self.is_adverbial_modifier(*c))
                .collect();
            for modifier in modifiers.into_iter().skip(keep) {
                removals.push(self.subtree(modifier, &[]));
                for span in self.derive_adverbial(modifier) {
                    let trimmed = self.trim_subtree(&span);
                    if trimmed.is_empty() {
                        continue;
                    }
                    let units: Vec<Unit> = trimmed
                        .iter()
                        .filter_map(|i| self.unit(*i).cloned())
                        .collect();
                    map.entry(verb).or_default().push(units);
                }
            }
        }

        for nodes in &removals {
            self.delete_subtree(nodes, false);
        }
        if !removals.is_empty() {
            tracing::debug!("Removed {} adverbial modifiers", removals.len());
        }
        map
    }

    fn is_adverbial_modifier(&self, index: usize) -> bool {
        if !self.incoming_is(index, Relation::NominalModifier) {
            return false;
        }
        self.labels().is_case_marked()
            || (self.pos(index) != "VBG" && self.has_child(index, Relation::PrepositionObject))
    }

    /// Spans of one prepositional modifier; coordinated objects become
    /// separate spans that share the preposition
    fn derive_adverbial(&self, node: usize) -> Vec<Vec<usize>> {
        let Some(preposition) = self.preposition_of(node) else {
            return Vec::new();
        };
        if FULL_SPAN_PREPOSITIONS.contains(&preposition.to_lowercase().as_str()) {
            return vec![self.subtree(node, &[])];
        }

        let mut spans = vec![self.subtree(node, &COORDINATION)];
        if self.labels().is_case_marked() {
            let case = self.children_with(node, Relation::CaseMarker).first().copied();
            for conj in self.conjuncts(node) {
                let mut span = self.subtree(conj, &COORDINATION);
                if !self.has_child(conj, Relation::CaseMarker) {
                    if let Some(case) = case {
                        span.insert(0, case);
                    }
                }
                spans.push(span);
            }
        } else {
            for object in self.children_with(node, Relation::PrepositionObject) {
                for conj in self.conjuncts(object) {
                    let mut span = vec![node];
                    span.extend(self.subtree(conj, &COORDINATION));
                    spans.push(span);
                }
            }
            for conj in self.conjuncts(node) {
                spans.push(self.subtree(conj, &COORDINATION));
            }
        }
        spans
    }

    /// Strip nested clauses and gerund-headed modifiers from a span,
    /// keeping its order
    pub fn trim_subtree(&self, span: &[usize]) -> Vec<usize> {
        let mut cut = BTreeSet::new();
        for &node in span {
            let clausal = self.incoming_is_any(
                node,
                &[
                    Relation::AdjectivalClause,
                    Relation::AdverbialClause,
                    Relation::RelativeClause,
                ],
            );
            let gerund = self.incoming_is(node, Relation::NominalModifier)
                && self.gerund_marker(node).is_some();
            if clausal || gerund {
                cut.extend(self.subtree(node, &[]));
            }
        }
        span.iter().copied().filter(|n| !cut.contains(n)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{corenlp_tree, spacy_tree};

    fn words(units: &[Unit]) -> String {
        units.iter().map(|u| u.word()).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_adverbials_per_coordinated_verb() {
        let mut tree = corenlp_tree(
            "he moved in 1999 and died in 2000",
            "PRP VBD IN CD CC VBD IN CD",
            &[
                (0, 2, "ROOT"),
                (2, 1, "nsubj"),
                (2, 4, "nmod"),
                (4, 3, "case"),
                (2, 5, "cc"),
                (2, 6, "conj"),
                (6, 8, "nmod"),
                (8, 7, "case"),
            ],
        );
        let map = tree.adverbials();
        assert_eq!(map.len(), 2);
        assert_eq!(words(&map[&2][0]), "in 1999");
        assert_eq!(words(&map[&6][0]), "in 2000");
        assert_eq!(tree.text(), "he moved and died");
    }

    #[test]
    fn test_coordinated_objects_share_preposition() {
        let mut tree = corenlp_tree(
            "he lived in Paris and London",
            "PRP VBD IN NNP CC NNP",
            &[
                (0, 2, "ROOT"),
                (2, 1, "nsubj"),
                (2, 4, "nmod"),
                (4, 3, "case"),
                (4, 5, "cc"),
                (4, 6, "conj"),
            ],
        );
        let map = tree.adverbials();
        let spans: Vec<String> = map[&2].iter().map(|s| words(s)).collect();
        assert_eq!(spans, vec!["in Paris", "in London"]);
        assert_eq!(map[&2][1][0].index(), 3);
    }

    #[test]
    fn test_between_keeps_full_span() {
        let mut tree = corenlp_tree(
            "he sat between Tom and Ann",
            "PRP VBD IN NNP CC NNP",
            &[
                (0, 2, "ROOT"),
                (2, 1, "nsubj"),
                (2, 4, "nmod"),
                (4, 3, "case"),
                (4, 5, "cc"),
                (4, 6, "conj"),
            ],
        );
        let map = tree.adverbials();
        assert_eq!(map[&2].len(), 1);
        assert_eq!(words(&map[&2][0]), "between Tom and Ann");
    }

    #[test]
    fn test_trim_relative_clause() {
        let mut tree = corenlp_tree(
            "he arrived with friends who sang",
            "PRP VBD IN NNS WP VBD",
            &[
                (0, 2, "ROOT"),
                (2, 1, "nsubj"),
                (2, 4, "nmod"),
                (4, 3, "case"),
                (4, 6, "acl:relcl"),
                (6, 5, "nsubj"),
            ],
        );
        let map = tree.adverbials();
        assert_eq!(words(&map[&2][0]), "with friends");
        assert_eq!(tree.text(), "he arrived");
    }

    #[test]
    fn test_extra_adverbials_keep_first_of_three() {
        let mut tree = corenlp_tree(
            "he flew from Paris to Rome on Monday",
            "PRP VBD IN NNP TO NNP IN NNP",
            &[
                (0, 2, "ROOT"),
                (2, 1, "nsubj"),
                (2, 4, "nmod"),
                (4, 3, "case"),
                (2, 6, "nmod"),
                (6, 5, "case"),
                (2, 8, "nmod"),
                (8, 7, "case"),
            ],
        );
        let map = tree.extra_adverbials();
        let spans: Vec<String> = map[&2].iter().map(|s| words(s)).collect();
        assert_eq!(spans, vec!["to Rome", "on Monday"]);
        assert_eq!(tree.text(), "he flew from Paris");
    }

    #[test]
    fn test_preposition_headed_scheme() {
        let mut tree = spacy_tree(
            "he lived in Paris",
            "PRP VBD IN NNP",
            &[(0, 2, "ROOT"), (2, 1, "nsubj"), (2, 3, "prep"), (3, 4, "pobj")],
        );
        let map = tree.adverbials();
        assert_eq!(words(&map[&2][0]), "in Paris");
        assert_eq!(tree.text(), "he lived");
    }
}
