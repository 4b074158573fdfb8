//! Token and phrase model
//!
//! A `Unit` is what the dependency tree stores at each index: either a
//! single token or a merged phrase that behaves as one token.

use serde::{Deserialize, Serialize};

// ============================================================================
// Part-of-speech helpers
// ============================================================================

pub fn is_verb_tag(pos: &str) -> bool {
    pos.starts_with("VB")
}

pub fn is_noun_tag(pos: &str) -> bool {
    pos.starts_with("NN")
}

pub fn is_adjective_tag(pos: &str) -> bool {
    pos.starts_with("JJ")
}

/// Gerund or past participle
pub fn is_participle_tag(pos: &str) -> bool {
    pos == "VBG" || pos == "VBN"
}

// ============================================================================
// Token
// ============================================================================

/// A single word of a clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Surface word, may be rewritten (lowercased, stemmed) during repair
    pub word: String,

    /// Part-of-speech tag
    pub pos: String,

    /// Position in the current clause, starting at 1
    pub index: usize,

    /// Position in the source sentence; `None` for synthesized words
    pub original: Option<usize>,
}

impl Token {
    /// Create a token whose original position equals its local one
    pub fn new(word: impl Into<String>, pos: impl Into<String>, index: usize) -> Self {
        Self {
            word: word.into(),
            pos: pos.into(),
            index,
            original: Some(index),
        }
    }

    /// A word that does not occur in the source sentence, such as an
    /// inserted copula
    pub fn synthesized(word: impl Into<String>, pos: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            pos: pos.into(),
            index: 0,
            original: None,
        }
    }

    pub fn with_original(mut self, original: Option<usize>) -> Self {
        self.original = original;
        self
    }
}

// ============================================================================
// Phrase
// ============================================================================

/// Kind of merged span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhraseKind {
    Noun,
    Verb,
}

/// Incoming edge of a node: its governor and the relation label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub governor: usize,
    pub relation: String,
}

impl Edge {
    pub fn new(governor: usize, relation: impl Into<String>) -> Self {
        Self {
            governor,
            relation: relation.into(),
        }
    }
}

/// A span collapsed into its head node.
///
/// Carries exactly the edges that were removed or redirected by the
/// merge, keyed by dependent, so restoring the span is a plain re-insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phrase {
    pub kind: PhraseKind,

    /// Member tokens in clause order
    pub members: Vec<Token>,

    /// Local index of the head member
    pub head: usize,

    /// Original edges of the dependents touched by the merge
    pub removed_edges: Vec<(usize, Edge)>,
}

impl Phrase {
    pub fn new(
        kind: PhraseKind,
        members: Vec<Token>,
        head: usize,
        removed_edges: Vec<(usize, Edge)>,
    ) -> Self {
        Self {
            kind,
            members,
            head,
            removed_edges,
        }
    }

    pub fn head_token(&self) -> Option<&Token> {
        self.members.iter().find(|t| t.index == self.head)
    }

    pub fn word(&self) -> String {
        self.members
            .iter()
            .map(|t| t.word.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Local indices of all members
    pub fn indices(&self) -> Vec<usize> {
        self.members.iter().map(|t| t.index).collect()
    }
}

// ============================================================================
// Unit
// ============================================================================

/// Content of one tree node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    Token(Token),
    Phrase(Phrase),
}

impl Unit {
    pub fn word(&self) -> String {
        match self {
            Self::Token(t) => t.word.clone(),
            Self::Phrase(p) => p.word(),
        }
    }

    /// Tag of the token, or of the head for a phrase
    pub fn pos(&self) -> &str {
        match self {
            Self::Token(t) => &t.pos,
            Self::Phrase(p) => p.head_token().map(|t| t.pos.as_str()).unwrap_or(""),
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Token(t) => t.index,
            Self::Phrase(p) => p.head,
        }
    }

    pub fn head_token(&self) -> Option<&Token> {
        match self {
            Self::Token(t) => Some(t),
            Self::Phrase(p) => p.head_token(),
        }
    }

    pub fn head_token_mut(&mut self) -> Option<&mut Token> {
        match self {
            Self::Token(t) => Some(t),
            Self::Phrase(p) => {
                let head = p.head;
                p.members.iter_mut().find(|t| t.index == head)
            }
        }
    }

    pub fn first_token_mut(&mut self) -> Option<&mut Token> {
        match self {
            Self::Token(t) => Some(t),
            Self::Phrase(p) => p.members.first_mut(),
        }
    }

    /// Original position of the head
    pub fn original(&self) -> Option<usize> {
        self.head_token().and_then(|t| t.original)
    }

    pub fn tokens(&self) -> Vec<&Token> {
        match self {
            Self::Token(t) => vec![t],
            Self::Phrase(p) => p.members.iter().collect(),
        }
    }

    pub fn into_tokens(self) -> Vec<Token> {
        match self {
            Self::Token(t) => vec![t],
            Self::Phrase(p) => p.members,
        }
    }

    pub fn is_phrase(&self) -> bool {
        matches!(self, Self::Phrase(_))
    }

    pub fn is_verb(&self) -> bool {
        is_verb_tag(self.pos())
    }

    pub fn is_noun(&self) -> bool {
        is_noun_tag(self.pos())
    }

    pub fn is_adjective(&self) -> bool {
        is_adjective_tag(self.pos())
    }

    pub fn is_participle(&self) -> bool {
        is_participle_tag(self.pos())
    }

    pub fn is_comma(&self) -> bool {
        matches!(self, Self::Token(t) if t.word == ",")
    }
}

impl From<Token> for Unit {
    fn from(token: Token) -> Self {
        Self::Token(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_phrase() -> Phrase {
        Phrase::new(
            PhraseKind::Noun,
            vec![Token::new("the", "DT", 3), Token::new("son", "NN", 4)],
            4,
            vec![(3, Edge::new(4, "det"))],
        )
    }

    #[test]
    fn test_tag_helpers() {
        assert!(is_verb_tag("VBD"));
        assert!(is_noun_tag("NNPS"));
        assert!(is_adjective_tag("JJR"));
        assert!(is_participle_tag("VBN"));
        assert!(!is_participle_tag("VBZ"));
    }

    #[test]
    fn test_synthesized_token_has_no_original() {
        let be = Token::synthesized("be", "VB");
        assert_eq!(be.original, None);
        assert!(Unit::from(be).is_verb());
    }

    #[test]
    fn test_phrase_behaves_as_head() {
        let unit = Unit::Phrase(create_phrase());
        assert_eq!(unit.word(), "the son");
        assert_eq!(unit.pos(), "NN");
        assert_eq!(unit.index(), 4);
        assert_eq!(unit.original(), Some(4));
        assert!(unit.is_noun());
        assert_eq!(unit.tokens().len(), 2);
    }

    #[test]
    fn test_first_token_mut() {
        let mut unit = Unit::Phrase(create_phrase());
        if let Some(t) = unit.first_token_mut() {
            t.word = "The".to_string();
        }
        assert_eq!(unit.word(), "The son");
        assert_eq!(unit.into_tokens()[0].word, "The");
    }
}
