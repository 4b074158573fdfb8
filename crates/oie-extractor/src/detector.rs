//! Clause detection
//!
//! Finds the nodes where a subordinate clause hangs off the tree and
//! decides what kind of clause each one is.

use serde::{Deserialize, Serialize};

use oie_core::Relation;

use crate::token::{is_adjective_tag, is_noun_tag, is_participle_tag, is_verb_tag};
use crate::tree::DependencyTree;

// ============================================================================
// Clause Kinds
// ============================================================================

/// Subordination type of a detected clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClauseKind {
    /// Appositive noun phrase
    #[serde(rename = "APPOS")]
    Appos,
    /// Finite adverbial clause
    #[serde(rename = "ADVCL")]
    Advcl,
    /// Subjectless participial clause modifying a verb
    #[serde(rename = "PARADVCL")]
    ParAdvcl,
    /// Participial clause modifying a noun
    #[serde(rename = "PARACL")]
    ParAcl,
    /// Infinitival modifier, discarded
    #[serde(rename = "INFINITE")]
    Infinite,
    /// Finite relative clause
    #[serde(rename = "ACL")]
    Acl,
    /// Clausal complement of a verb
    #[serde(rename = "OBJCL")]
    ObjCl,
    /// Clausal complement of a noun
    #[serde(rename = "APPOSCL")]
    AppoCl,
    /// Clausal subject
    #[serde(rename = "SUBJCL")]
    SubjCl,
    /// Clause complement headed by a noun
    #[serde(rename = "NN")]
    NounComplement,
    /// Clause complement headed by an adjective
    #[serde(rename = "JJ")]
    AdjComplement,
    /// Not a subordination point
    #[serde(rename = "CORE")]
    Core,
}

impl ClauseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Appos => "APPOS",
            Self::Advcl => "ADVCL",
            Self::ParAdvcl => "PARADVCL",
            Self::ParAcl => "PARACL",
            Self::Infinite => "INFINITE",
            Self::Acl => "ACL",
            Self::ObjCl => "OBJCL",
            Self::AppoCl => "APPOSCL",
            Self::SubjCl => "SUBJCL",
            Self::NounComplement => "NN",
            Self::AdjComplement => "JJ",
            Self::Core => "CORE",
        }
    }
}

impl std::fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Clause Detector
// ============================================================================

/// Incoming relations that mark a subordination point
const SUBORDINATION: [Relation; 7] = [
    Relation::AdverbialClause,
    Relation::AdjectivalClause,
    Relation::RelativeClause,
    Relation::Apposition,
    Relation::ClausalComplement,
    Relation::ClausalSubject,
    Relation::OpenComplement,
];

/// Detects and classifies subordinate clauses
#[derive(Debug, Clone, Copy, Default)]
pub struct ClauseDetector;

impl ClauseDetector {
    pub fn new() -> Self {
        Self
    }

    /// Subordination points in clause order
    pub fn potential_points(&self, tree: &DependencyTree) -> Vec<usize> {
        tree.indices()
            .into_iter()
            .filter(|i| self.is_point(tree, *i))
            .collect()
    }

    fn is_point(&self, tree: &DependencyTree, index: usize) -> bool {
        tree.incoming_is_any(index, &SUBORDINATION)
            || (tree.incoming_is(index, Relation::NominalModifier)
                && tree.gerund_marker(index).is_some())
    }

    /// Kind of clause rooted at `index`
    pub fn classify(&self, tree: &DependencyTree, index: usize) -> ClauseKind {
        let Some(parent) = tree.parent(index) else {
            return ClauseKind::Core;
        };
        let pos = tree.pos(index);
        let parent_pos = tree.pos(parent);
        let has_subject = has_own_subject(tree, index);
        let after_to = tree
            .preceding(index)
            .map(|p| tree.word(p).eq_ignore_ascii_case("to"))
            .unwrap_or(false);

        if tree.incoming_is(index, Relation::Apposition) {
            if is_noun_tag(parent_pos) || parent_pos.starts_with("PRP") {
                return ClauseKind::Appos;
            }
            return ClauseKind::Core;
        }

        if tree.incoming_is(index, Relation::AdverbialClause) {
            if is_participle_tag(pos) && !has_subject {
                return ClauseKind::ParAdvcl;
            }
            if after_to {
                return ClauseKind::Infinite;
            }
            if has_subject {
                return ClauseKind::Advcl;
            }
            return ClauseKind::Core;
        }

        if tree.incoming_is_any(
            index,
            &[Relation::AdjectivalClause, Relation::RelativeClause],
        ) {
            if is_participle_tag(pos) && !has_subject {
                return ClauseKind::ParAcl;
            }
            if after_to {
                return ClauseKind::Infinite;
            }
            // Cataphoric attachments are parse errors more often than not
            if parent < index {
                return ClauseKind::Acl;
            }
            return ClauseKind::Core;
        }

        if tree.incoming_is(index, Relation::ClausalComplement) {
            if has_subject {
                if tree.has_child(parent, Relation::DirectObject) {
                    return ClauseKind::Core;
                }
                if is_noun_tag(parent_pos) {
                    return ClauseKind::AppoCl;
                }
                return ClauseKind::ObjCl;
            }
            return complement_kind(pos);
        }

        if tree.incoming_is(index, Relation::OpenComplement) {
            if is_participle_tag(pos)
                && !has_subject
                && parent < index
                && tree.has_comma_between(parent, index)
            {
                return ClauseKind::ParAdvcl;
            }
            return ClauseKind::Core;
        }

        if tree.incoming_is(index, Relation::ClausalSubject) {
            return ClauseKind::SubjCl;
        }

        if tree.incoming_is(index, Relation::NominalModifier) && tree.gerund_marker(index).is_some()
        {
            if is_noun_tag(parent_pos) {
                return ClauseKind::ParAcl;
            }
            if is_verb_tag(parent_pos) {
                return ClauseKind::ParAdvcl;
            }
        }

        ClauseKind::Core
    }
}

fn has_own_subject(tree: &DependencyTree, index: usize) -> bool {
    tree.children(index).into_iter().any(|c| {
        tree.incoming_is_any(c, &[Relation::Subject, Relation::PassiveSubject])
    })
}

fn complement_kind(pos: &str) -> ClauseKind {
    if is_noun_tag(pos) {
        ClauseKind::NounComplement
    } else if is_adjective_tag(pos) {
        ClauseKind::AdjComplement
    } else {
        ClauseKind::Core
    }
}
