//! Clause pattern classification
//!
//! One decision table serves every parser convention: the tree answers
//! relation questions through its label mapping, so a spaCy `attr` and a
//! CoreNLP `cop` reach the same branch.

use oie_core::{ClausePattern, Relation};

use crate::tree::DependencyTree;
use crate::ClauseClassifier;

/// Forms of "be"
pub const COPULAS: [&str; 8] = ["is", "am", "are", "was", "were", "be", "been", "being"];

pub fn is_copula(word: &str) -> bool {
    COPULAS.contains(&word.to_lowercase().as_str())
}

/// Decision table over the relations around a verb
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternClassifier;

impl PatternClassifier {
    pub fn new() -> Self {
        Self
    }

    fn classify_copula(&self, tree: &DependencyTree, index: usize) -> Option<Option<ClausePattern>> {
        if tree.incoming_is(index, Relation::Copula) {
            return Some(Some(ClausePattern::Copular));
        }
        if tree.incoming_is_any(index, &[Relation::Auxiliary, Relation::PassiveAuxiliary]) {
            return Some(None);
        }

        let has_subject = !tree.subjects(index).is_empty();
        if has_subject && tree.has_child(index, Relation::ClausalComplement) {
            return Some(Some(ClausePattern::CopularClausal));
        }
        if has_subject && tree.has_child(index, Relation::OpenComplement) {
            return Some(Some(ClausePattern::CopularOpen));
        }
        if tree.has_child(index, Relation::Expletive)
            && (has_subject || tree.has_child(index, Relation::Attribute))
        {
            return Some(Some(ClausePattern::Existential));
        }
        if has_subject && tree.has_child(index, Relation::Attribute) {
            return Some(Some(ClausePattern::Copular));
        }
        None
    }
}

impl ClauseClassifier for PatternClassifier {
    fn classify(&self, tree: &DependencyTree, index: usize) -> Option<ClausePattern> {
        if is_copula(&tree.word(index)) {
            if let Some(decision) = self.classify_copula(tree, index) {
                return decision;
            }
        }

        if tree.subjects(index).is_empty() {
            return None;
        }
        let dobj = tree.has_child(index, Relation::DirectObject);
        let iobj = tree.has_child(index, Relation::IndirectObject);
        let xcomp = tree.has_child(index, Relation::OpenComplement);
        let ccomp = tree.has_child(index, Relation::ClausalComplement);

        let pattern = match (dobj, iobj, xcomp, ccomp) {
            (true, true, _, _) => ClausePattern::Svoo,
            (true, false, true, _) => ClausePattern::Svoc,
            (true, false, false, _) => ClausePattern::Svo,
            (false, _, true, _) => ClausePattern::Svx,
            (false, _, false, true) => ClausePattern::SvClausal,
            (false, _, false, false) => ClausePattern::Sv,
        };
        Some(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{corenlp_tree, spacy_tree};

    fn classify(tree: &DependencyTree, index: usize) -> Option<ClausePattern> {
        PatternClassifier::new().classify(tree, index)
    }

    #[test]
    fn test_core_patterns() {
        let tree = corenlp_tree(
            "he gave her a book",
            "PRP VBD PRP DT NN",
            &[
                (0, 2, "ROOT"),
                (2, 1, "nsubj"),
                (2, 3, "iobj"),
                (2, 5, "dobj"),
                (5, 4, "det"),
            ],
        );
        assert_eq!(classify(&tree, 2), Some(ClausePattern::Svoo));

        let tree = corenlp_tree(
            "he slept",
            "PRP VBD",
            &[(0, 2, "ROOT"), (2, 1, "nsubj")],
        );
        assert_eq!(classify(&tree, 2), Some(ClausePattern::Sv));
    }

    #[test]
    fn test_missing_subject_is_unclassified() {
        let tree = corenlp_tree("go home", "VB NN", &[(0, 1, "ROOT"), (1, 2, "dobj")]);
        assert_eq!(classify(&tree, 1), None);
    }

    #[test]
    fn test_copula_dependent() {
        let tree = corenlp_tree(
            "he was the son of Li",
            "PRP VBD DT NN IN NNP",
            &[
                (0, 4, "ROOT"),
                (4, 1, "nsubj"),
                (4, 2, "cop"),
                (4, 3, "det"),
                (4, 6, "nmod"),
                (6, 5, "case"),
            ],
        );
        assert_eq!(classify(&tree, 2), Some(ClausePattern::Copular));
    }

    #[test]
    fn test_auxiliary_be_is_skipped() {
        let tree = corenlp_tree(
            "he was invited",
            "PRP VBD VBN",
            &[(0, 3, "ROOT"), (3, 1, "nsubjpass"), (3, 2, "auxpass")],
        );
        assert_eq!(classify(&tree, 2), None);
        assert_eq!(classify(&tree, 3), Some(ClausePattern::Sv));
    }

    #[test]
    fn test_existential() {
        let tree = corenlp_tree(
            "there is a book",
            "EX VBZ DT NN",
            &[(0, 2, "ROOT"), (2, 1, "expl"), (2, 4, "nsubj"), (4, 3, "det")],
        );
        assert_eq!(classify(&tree, 2), Some(ClausePattern::Existential));
    }

    #[test]
    fn test_spacy_attribute_copula() {
        let tree = spacy_tree(
            "he is a teacher",
            "PRP VBZ DT NN",
            &[(0, 2, "ROOT"), (2, 1, "nsubj"), (2, 4, "attr"), (4, 3, "det")],
        );
        assert_eq!(classify(&tree, 2), Some(ClausePattern::Copular));
    }

    #[test]
    fn test_copula_with_clausal_and_open_complement() {
        let tree = corenlp_tree(
            "the truth is that he left",
            "DT NN VBZ IN PRP VBD",
            &[
                (0, 3, "ROOT"),
                (3, 2, "nsubj"),
                (2, 1, "det"),
                (3, 6, "ccomp"),
                (6, 4, "mark"),
                (6, 5, "nsubj"),
            ],
        );
        assert_eq!(classify(&tree, 3), Some(ClausePattern::CopularClausal));

        let tree = corenlp_tree(
            "he is to leave",
            "PRP VBZ TO VB",
            &[(0, 2, "ROOT"), (2, 1, "nsubj"), (2, 4, "xcomp"), (4, 3, "mark")],
        );
        assert_eq!(classify(&tree, 2), Some(ClausePattern::CopularOpen));
    }

    #[test]
    fn test_object_with_open_complement() {
        let tree = corenlp_tree(
            "they elected him president",
            "PRP VBD PRP NN",
            &[(0, 2, "ROOT"), (2, 1, "nsubj"), (2, 3, "dobj"), (2, 4, "xcomp")],
        );
        assert_eq!(classify(&tree, 2), Some(ClausePattern::Svoc));
    }
}
