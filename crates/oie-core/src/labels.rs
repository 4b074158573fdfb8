//! Relation label mapping
//!
//! The extraction core reasons about canonical grammatical relations.
//! A `RelationLabels` table spells each canonical relation the way the
//! wired-in parser does, so one decision table serves both the
//! CoreNLP/UD scheme and the ClearNLP-style scheme used by spaCy.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

// ============================================================================
// Canonical Relations
// ============================================================================

/// Canonical grammatical relations the core matches on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Subject,
    PassiveSubject,
    ClausalSubject,
    DirectObject,
    IndirectObject,
    OpenComplement,
    ClausalComplement,
    Copula,
    Auxiliary,
    PassiveAuxiliary,
    Expletive,
    Attribute,
    Conjunct,
    Coordinator,
    Punctuation,
    Apposition,
    Negation,
    AdverbialClause,
    AdjectivalClause,
    RelativeClause,
    NominalModifier,
    CaseMarker,
    PrepositionObject,
    Marker,
    Particle,
    NounModifier,
}

impl Relation {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::PassiveSubject => "passive_subject",
            Self::ClausalSubject => "clausal_subject",
            Self::DirectObject => "direct_object",
            Self::IndirectObject => "indirect_object",
            Self::OpenComplement => "open_complement",
            Self::ClausalComplement => "clausal_complement",
            Self::Copula => "copula",
            Self::Auxiliary => "auxiliary",
            Self::PassiveAuxiliary => "passive_auxiliary",
            Self::Expletive => "expletive",
            Self::Attribute => "attribute",
            Self::Conjunct => "conjunct",
            Self::Coordinator => "coordinator",
            Self::Punctuation => "punctuation",
            Self::Apposition => "apposition",
            Self::Negation => "negation",
            Self::AdverbialClause => "adverbial_clause",
            Self::AdjectivalClause => "adjectival_clause",
            Self::RelativeClause => "relative_clause",
            Self::NominalModifier => "nominal_modifier",
            Self::CaseMarker => "case_marker",
            Self::PrepositionObject => "preposition_object",
            Self::Marker => "marker",
            Self::Particle => "particle",
            Self::NounModifier => "noun_modifier",
        }
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How prepositional phrases are attached by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrepositionStyle {
    /// The noun heads the phrase and the preposition hangs off it (`nmod` + `case`)
    CaseMarked,
    /// The preposition heads the phrase and governs its object (`prep` + `pobj`)
    PrepositionHeaded,
}

/// Built-in label schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelScheme {
    #[default]
    CoreNlp,
    Spacy,
}

impl std::str::FromStr for LabelScheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "corenlp" | "ud" | "stanford" => Ok(Self::CoreNlp),
            "spacy" | "clear" | "clearnlp" => Ok(Self::Spacy),
            _ => Err(ConfigError::InvalidValue {
                key: "OIE_LABEL_SCHEME".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for LabelScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CoreNlp => write!(f, "corenlp"),
            Self::Spacy => write!(f, "spacy"),
        }
    }
}

// ============================================================================
// Label Table
// ============================================================================

/// Mapping from canonical relations to parser labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationLabels {
    /// Prepositional phrase attachment convention
    pub preposition_style: PrepositionStyle,

    /// Parser labels per canonical relation
    pub labels: BTreeMap<Relation, Vec<String>>,
}

impl RelationLabels {
    /// Labels emitted by Stanford CoreNLP basic dependencies (UD v1 with v2 aliases)
    pub fn corenlp() -> Self {
        let mut table = Self::empty(PrepositionStyle::CaseMarked);
        table
            .set(Relation::Subject, &["nsubj"])
            .set(Relation::PassiveSubject, &["nsubjpass", "nsubj:pass"])
            .set(Relation::ClausalSubject, &["csubj", "csubjpass", "csubj:pass"])
            .set(Relation::DirectObject, &["dobj", "obj"])
            .set(Relation::IndirectObject, &["iobj"])
            .set(Relation::OpenComplement, &["xcomp"])
            .set(Relation::ClausalComplement, &["ccomp"])
            .set(Relation::Copula, &["cop"])
            .set(Relation::Auxiliary, &["aux"])
            .set(Relation::PassiveAuxiliary, &["auxpass", "aux:pass"])
            .set(Relation::Expletive, &["expl"])
            .set(Relation::Conjunct, &["conj"])
            .set(Relation::Coordinator, &["cc"])
            .set(Relation::Punctuation, &["punct"])
            .set(Relation::Apposition, &["appos"])
            .set(Relation::Negation, &["neg"])
            .set(Relation::AdverbialClause, &["advcl"])
            .set(Relation::AdjectivalClause, &["acl"])
            .set(Relation::RelativeClause, &["acl:relcl", "relcl"])
            .set(Relation::NominalModifier, &["nmod", "obl"])
            .set(Relation::CaseMarker, &["case"])
            .set(Relation::Marker, &["mark"])
            .set(Relation::Particle, &["compound:prt", "prt"])
            .set(
                Relation::NounModifier,
                &[
                    "amod", "det", "nummod", "quantmod", "nn", "compound", "nmod:poss",
                    "det:poss",
                ],
            );
        table
    }

    /// Labels emitted by spaCy's English models (ClearNLP style)
    pub fn spacy() -> Self {
        let mut table = Self::empty(PrepositionStyle::PrepositionHeaded);
        table
            .set(Relation::Subject, &["nsubj"])
            .set(Relation::PassiveSubject, &["nsubjpass"])
            .set(Relation::ClausalSubject, &["csubj", "csubjpass"])
            .set(Relation::DirectObject, &["dobj"])
            .set(Relation::IndirectObject, &["dative", "iobj"])
            .set(Relation::OpenComplement, &["xcomp", "oprd"])
            .set(Relation::ClausalComplement, &["ccomp"])
            .set(Relation::Auxiliary, &["aux"])
            .set(Relation::PassiveAuxiliary, &["auxpass"])
            .set(Relation::Expletive, &["expl"])
            .set(Relation::Attribute, &["attr", "acomp"])
            .set(Relation::Conjunct, &["conj"])
            .set(Relation::Coordinator, &["cc"])
            .set(Relation::Punctuation, &["punct"])
            .set(Relation::Apposition, &["appos"])
            .set(Relation::Negation, &["neg"])
            .set(Relation::AdverbialClause, &["advcl"])
            .set(Relation::AdjectivalClause, &["acl"])
            .set(Relation::RelativeClause, &["relcl"])
            .set(Relation::NominalModifier, &["prep"])
            .set(Relation::PrepositionObject, &["pobj", "pcomp"])
            .set(Relation::Marker, &["mark"])
            .set(Relation::Particle, &["prt"])
            .set(
                Relation::NounModifier,
                &["amod", "det", "nummod", "quantmod", "compound", "poss", "nmod"],
            );
        table
    }

    /// Preset for a built-in scheme
    pub fn for_scheme(scheme: LabelScheme) -> Self {
        match scheme {
            LabelScheme::CoreNlp => Self::corenlp(),
            LabelScheme::Spacy => Self::spacy(),
        }
    }

    fn empty(preposition_style: PrepositionStyle) -> Self {
        Self {
            preposition_style,
            labels: BTreeMap::new(),
        }
    }

    fn set(&mut self, relation: Relation, labels: &[&str]) -> &mut Self {
        self.labels
            .insert(relation, labels.iter().map(|l| l.to_string()).collect());
        self
    }

    /// Replace the labels of one relation
    pub fn with_labels(mut self, relation: Relation, labels: Vec<String>) -> Self {
        self.labels.insert(relation, labels);
        self
    }

    /// Parser labels for a canonical relation
    pub fn labels(&self, relation: Relation) -> &[String] {
        self.labels
            .get(&relation)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Whether a parser label spells the canonical relation
    pub fn is(&self, relation: Relation, label: &str) -> bool {
        self.labels(relation).iter().any(|l| l == label)
    }

    /// Whether a parser label spells any of the canonical relations
    pub fn is_any(&self, relations: &[Relation], label: &str) -> bool {
        relations.iter().any(|r| self.is(*r, label))
    }

    pub fn is_case_marked(&self) -> bool {
        self.preposition_style == PrepositionStyle::CaseMarked
    }
}

impl Default for RelationLabels {
    fn default() -> Self {
        Self::corenlp()
    }
}
