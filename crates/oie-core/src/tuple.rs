//! Tuple output model
//!
//! Relational tuples produced by the extraction core, and the elements
//! (subject, predicate, objects, adverbials) they are made of. Every
//! element keeps the original sentence positions it covers so results
//! can be mapped back onto the input.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// Clause Patterns
// ============================================================================

/// Grammatical shape of the clause around a verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClausePattern {
    /// Subject, intransitive verb
    #[serde(rename = "SV")]
    Sv,
    /// Subject, verb, direct object
    #[serde(rename = "SVO")]
    Svo,
    /// Subject, verb, direct and indirect object
    #[serde(rename = "SVOO")]
    Svoo,
    /// Subject, verb, object, object complement
    #[serde(rename = "SVOC")]
    Svoc,
    /// Subject, verb, clausal complement
    #[serde(rename = "SVC")]
    SvClausal,
    /// Subject, verb, open clausal complement
    #[serde(rename = "SVX")]
    Svx,
    /// Subject, copula, predicative complement
    #[serde(rename = "SVc")]
    Copular,
    /// Subject, copula, clausal complement
    #[serde(rename = "SVcC")]
    CopularClausal,
    /// Subject, copula, open clausal complement
    #[serde(rename = "SVcX")]
    CopularOpen,
    /// Existential "there be"
    #[serde(rename = "SVb")]
    Existential,
}

impl ClausePattern {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sv => "SV",
            Self::Svo => "SVO",
            Self::Svoo => "SVOO",
            Self::Svoc => "SVOC",
            Self::SvClausal => "SVC",
            Self::Svx => "SVX",
            Self::Copular => "SVc",
            Self::CopularClausal => "SVcC",
            Self::CopularOpen => "SVcX",
            Self::Existential => "SVb",
        }
    }

    /// Get from string; case matters ("SVC" and "SVc" differ)
    pub fn from_tag(s: &str) -> Option<Self> {
        match s {
            "SV" => Some(Self::Sv),
            "SVO" => Some(Self::Svo),
            "SVOO" => Some(Self::Svoo),
            "SVOC" => Some(Self::Svoc),
            "SVC" => Some(Self::SvClausal),
            "SVX" => Some(Self::Svx),
            "SVc" => Some(Self::Copular),
            "SVcC" => Some(Self::CopularClausal),
            "SVcX" => Some(Self::CopularOpen),
            "SVb" => Some(Self::Existential),
            _ => None,
        }
    }

    /// Patterns whose predicate is a copula
    pub fn is_copular(&self) -> bool {
        matches!(
            self,
            Self::Copular | Self::CopularClausal | Self::CopularOpen | Self::Existential
        )
    }
}

impl std::fmt::Display for ClausePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Element
// ============================================================================

/// One slot of a tuple
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Element {
    /// Surface text (without the preposition for adverbials)
    #[serde(rename = "surface_text")]
    pub word: String,

    /// Leading preposition of an adverbial
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preposition: Option<String>,

    /// Original sentence positions covered; synthesized words contribute none
    #[serde(rename = "original_token_indices")]
    pub indices: Vec<usize>,

    /// Entity link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,

    /// Named-entity type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ne_type: Option<String>,

    /// Coreference target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coreference: Option<String>,
}

impl Element {
    /// Create a new element
    pub fn new(word: impl Into<String>, indices: Vec<usize>) -> Self {
        Self {
            word: word.into(),
            indices,
            ..Default::default()
        }
    }

    /// Set the preposition
    pub fn with_preposition(mut self, preposition: impl Into<String>) -> Self {
        self.preposition = Some(preposition.into());
        self
    }

    /// Preposition and word as they read in the sentence
    pub fn text(&self) -> String {
        match &self.preposition {
            Some(prep) => format!("{} {}", prep, self.word),
            None => self.word.clone(),
        }
    }

    /// Word with tokenizer spacing undone around clitics and punctuation
    pub fn refined_word(&self) -> String {
        refine(&self.text())
    }

    /// Two elements overlap when they share an original position but
    /// are not the same element. A bare element never overlaps an
    /// element with the same word.
    pub fn overlaps(&self, other: &Element) -> bool {
        if self == other {
            return false;
        }
        if (self.preposition.is_none() || other.preposition.is_none())
            && self.word.eq_ignore_ascii_case(&other.word)
        {
            return false;
        }
        let mine: HashSet<usize> = self.indices.iter().copied().collect();
        other.indices.iter().any(|i| mine.contains(i))
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        let same_prep = match (&self.preposition, &other.preposition) {
            (None, None) => true,
            (Some(a), Some(b)) => a.to_lowercase() == b.to_lowercase(),
            _ => false,
        };
        same_prep && self.word.to_lowercase() == other.word.to_lowercase()
    }
}

impl Eq for Element {}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text())
    }
}

fn refine(word: &str) -> String {
    word.replace(" 's", "'s")
        .replace(" n't", "n't")
        .replace(" - ", "-")
        .replace(" , ", ", ")
}

// ============================================================================
// Tuple
// ============================================================================

/// An extracted relational tuple
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tuple {
    pub subject: Element,
    pub predicate: Element,
    pub direct_object: Option<Element>,
    pub indirect_object: Option<Element>,
    pub adverbials: Vec<Element>,
    pub negation: bool,
    pub clause_type: ClausePattern,
    pub source_clause_text: String,

    /// Tuples of an embedded complement clause
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub complement: Vec<Tuple>,
}

impl Tuple {
    /// Create a new tuple with a subject and predicate
    pub fn new(
        subject: Element,
        predicate: Element,
        clause_type: ClausePattern,
        source_clause_text: impl Into<String>,
    ) -> Self {
        Self {
            subject,
            predicate,
            direct_object: None,
            indirect_object: None,
            adverbials: Vec::new(),
            negation: false,
            clause_type,
            source_clause_text: source_clause_text.into(),
            complement: Vec::new(),
        }
    }

    pub fn with_direct_object(mut self, object: Element) -> Self {
        self.direct_object = Some(object);
        self
    }

    pub fn with_indirect_object(mut self, object: Element) -> Self {
        self.indirect_object = Some(object);
        self
    }

    pub fn with_adverbials(mut self, adverbials: Vec<Element>) -> Self {
        self.adverbials = adverbials;
        self
    }

    pub fn with_negation(mut self, negation: bool) -> Self {
        self.negation = negation;
        self
    }

    pub fn with_complement(mut self, complement: Vec<Tuple>) -> Self {
        self.complement = complement;
        self
    }

    /// All elements: subject, predicate, objects, then adverbials
    pub fn elements(&self) -> Vec<&Element> {
        let mut elements = vec![&self.subject, &self.predicate];
        elements.extend(self.direct_object.iter());
        elements.extend(self.indirect_object.iter());
        elements.extend(self.adverbials.iter());
        elements
    }

    pub fn elements_mut(&mut self) -> Vec<&mut Element> {
        let mut elements = vec![&mut self.subject, &mut self.predicate];
        elements.extend(self.direct_object.iter_mut());
        elements.extend(self.indirect_object.iter_mut());
        elements.extend(self.adverbials.iter_mut());
        elements
    }

    /// Flatten into `(subject, predicate, object, link)` triples for graph
    /// building. The link is "dobj", "iobj" or the adverbial's preposition.
    /// A tuple with neither objects nor adverbials yields one bare triple.
    pub fn triples(&self) -> Vec<(String, String, Option<String>, Option<String>)> {
        let subject = self.subject.refined_word();
        let predicate = self.predicate.word.clone();
        let mut triples = Vec::new();

        if let Some(object) = &self.direct_object {
            triples.push((
                subject.clone(),
                predicate.clone(),
                Some(object.refined_word()),
                Some("dobj".to_string()),
            ));
        }
        if let Some(object) = &self.indirect_object {
            triples.push((
                subject.clone(),
                predicate.clone(),
                Some(object.refined_word()),
                Some("iobj".to_string()),
            ));
        }
        for adverbial in &self.adverbials {
            triples.push((
                subject.clone(),
                predicate.clone(),
                Some(refine(&adverbial.word)),
                adverbial.preposition.clone(),
            ));
        }
        if self.adverbials.is_empty() && self.direct_object.is_none() {
            triples.push((subject, predicate, None, None));
        }
        triples
    }
}

impl PartialEq for Tuple {
    /// Element-wise equality; adverbials compare as an unordered list
    fn eq(&self, other: &Self) -> bool {
        self.subject == other.subject
            && self.predicate == other.predicate
            && self.direct_object == other.direct_object
            && self.indirect_object == other.indirect_object
            && self.adverbials.len() == other.adverbials.len()
            && self.adverbials.iter().all(|a| other.adverbials.contains(a))
    }
}

impl std::fmt::Display for Tuple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let word = |e: &Option<Element>| e.as_ref().map(|e| e.text()).unwrap_or_default();
        let adverbials: Vec<String> = self.adverbials.iter().map(|a| a.text()).collect();
        write!(
            f,
            "{}; {}; {}; {}; {}",
            self.subject.text(),
            self.predicate.text(),
            word(&self.direct_object),
            word(&self.indirect_object),
            adverbials.join("||")
        )
    }
}
