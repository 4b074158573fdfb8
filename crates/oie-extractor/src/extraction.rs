//! Tuple extraction
//!
//! Reads tuples off every clause of a decomposed sentence. Per clause the
//! tree is prepared (verb groups merged, adverbials cut out), each verb is
//! classified and handled by its pattern, spans are grown to full noun
//! phrases and the adverbials are re-attached to their verbs.

use std::collections::BTreeSet;
use std::sync::Arc;

use oie_core::{ClausePattern, Element, Relation, Tuple};

use crate::adverbial::AdverbialMap;
use crate::classifier::{is_copula, PatternClassifier};
use crate::detector::ClauseKind;
use crate::sentence::{Attachment, Sentence};
use crate::token::{is_adjective_tag, is_noun_tag, is_verb_tag, Token, Unit};
use crate::tree::{DependencyTree, DO_SUPPORT};
use crate::ClauseClassifier;

/// Relations pulled into a predicate span
const PREDICATE_PARTICLES: [Relation; 3] = [
    Relation::Auxiliary,
    Relation::PassiveAuxiliary,
    Relation::Negation,
];

/// A tuple still expressed in tree units
#[derive(Debug, Clone)]
struct RawTuple {
    pattern: ClausePattern,
    /// Verb whose adverbials this tuple receives
    verb: usize,
    subject: Vec<Unit>,
    predicate: Vec<Unit>,
    direct_object: Option<Vec<Unit>>,
    indirect_object: Option<Vec<Unit>>,
    adverbials: Vec<Vec<Unit>>,
    negation: bool,
    complement: Vec<Tuple>,
}

impl RawTuple {
    fn new(pattern: ClausePattern, verb: usize, subject: Vec<Unit>, predicate: Vec<Unit>) -> Self {
        Self {
            pattern,
            verb,
            subject,
            predicate,
            direct_object: None,
            indirect_object: None,
            adverbials: Vec::new(),
            negation: false,
            complement: Vec::new(),
        }
    }

    fn with_object(mut self, object: Vec<Unit>) -> Self {
        self.direct_object = Some(object);
        self
    }

    fn with_negation(mut self, negation: bool) -> Self {
        self.negation = negation;
        self
    }

    fn into_tuple(self, text: &str) -> Tuple {
        let mut tuple = Tuple::new(
            element(&self.subject),
            element(&self.predicate),
            self.pattern,
            text,
        )
        .with_negation(self.negation)
        .with_complement(self.complement)
        .with_adverbials(
            self.adverbials
                .iter()
                .filter_map(|a| adverbial_element(a))
                .collect(),
        );
        if let Some(object) = &self.direct_object {
            tuple = tuple.with_direct_object(element(object));
        }
        if let Some(object) = &self.indirect_object {
            tuple = tuple.with_indirect_object(element(object));
        }
        tuple
    }
}

// ============================================================================
// Tuple Extractor
// ============================================================================

/// Extracts tuples from a sentence forest
#[derive(Clone)]
pub struct TupleExtractor {
    classifier: Arc<dyn ClauseClassifier>,
}

impl Default for TupleExtractor {
    fn default() -> Self {
        Self::new(Arc::new(PatternClassifier::new()))
    }
}

impl std::fmt::Debug for TupleExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TupleExtractor").finish_non_exhaustive()
    }
}

impl TupleExtractor {
    pub fn new(classifier: Arc<dyn ClauseClassifier>) -> Self {
        Self { classifier }
    }

    /// Tuples of every clause in the forest, breadth first
    pub fn extract(&self, sentence: &Sentence) -> Vec<Tuple> {
        sentence
            .clauses()
            .into_iter()
            .flat_map(|clause| self.extract_clause(clause))
            .collect()
    }

    /// Tuples of one clause; attachments are only consulted for clausal
    /// complements
    pub fn extract_clause(&self, sentence: &Sentence) -> Vec<Tuple> {
        let mut tree = sentence.tree.clone();
        tree.stretch_noun_phrases();
        tree.merge_verb_phrases();
        tree.shrink_noun_phrases();
        let adverbials = tree.adverbials();

        let mut raw = self.raw_tuples(&tree, sentence);
        for tuple in &mut raw {
            assign_adverbials(&tree, &adverbials, tuple);
        }
        tracing::debug!("Extracted {} tuples from '{}'", raw.len(), sentence.text);
        raw.into_iter()
            .map(|t| t.into_tuple(&sentence.text))
            .collect()
    }

    fn raw_tuples(&self, tree: &DependencyTree, sentence: &Sentence) -> Vec<RawTuple> {
        let verbs: Vec<usize> = tree
            .units()
            .filter(|(_, u)| u.is_verb())
            .map(|(i, _)| i)
            .collect();

        let mut processed = BTreeSet::new();
        let mut tuples = Vec::new();
        for verb in verbs {
            if processed.contains(&verb) {
                continue;
            }
            let Some(mut pattern) = self.classifier.classify(tree, verb) else {
                continue;
            };
            // The restructurer has already cut the complement clause out
            if pattern == ClausePattern::Sv && anchored_complement(tree, verb, sentence).is_some() {
                pattern = if is_copula(&tree.word(verb)) {
                    ClausePattern::CopularClausal
                } else {
                    ClausePattern::SvClausal
                };
            }
            tracing::debug!("Verb '{}' classified as {}", tree.word(verb), pattern);
            let extracted = match pattern {
                ClausePattern::Sv => extract_sv(tree, verb),
                ClausePattern::Svo => extract_svo(tree, verb),
                ClausePattern::Svoo => extract_svoo(tree, verb),
                ClausePattern::Svoc => extract_svoc(tree, verb),
                ClausePattern::Svx => extract_svx(tree, verb),
                ClausePattern::Copular => extract_copular(tree, verb, &mut processed),
                ClausePattern::CopularOpen => extract_copular_open(tree, verb),
                ClausePattern::SvClausal | ClausePattern::CopularClausal => {
                    self.extract_clausal(tree, verb, pattern, sentence)
                }
                ClausePattern::Existential => Vec::new(),
            };
            tuples.extend(extracted);
        }
        tuples
    }

    /// "he said that she left": the complement clause's tuples nest under
    /// a tuple of the matrix verb
    fn extract_clausal(
        &self,
        tree: &DependencyTree,
        verb: usize,
        pattern: ClausePattern,
        sentence: &Sentence,
    ) -> Vec<RawTuple> {
        let mut subjects = tree.subjects(verb);
        let mut negation = tree.has_child(verb, Relation::Negation);
        if pattern == ClausePattern::CopularClausal && subjects.is_empty() {
            if let Some(parent) = tree.parent(verb) {
                subjects = tree.subjects(parent);
                negation |= tree.has_child(parent, Relation::Negation);
            }
        }

        let complement = anchored_complement(tree, verb, sentence).or_else(|| {
            sentence
                .right
                .iter()
                .find(|a| a.message.kind == ClauseKind::ObjCl)
        });
        let Some(complement) = complement else {
            tracing::debug!("No complement clause for '{}', reading it as SV", tree.word(verb));
            return extract_sv(tree, verb);
        };
        let nested = self.extract_clause(&complement.sentence);

        subjects
            .into_iter()
            .map(|s| {
                let mut tuple = RawTuple::new(
                    pattern,
                    verb,
                    noun_span(tree, s),
                    predicate_span(tree, verb, &[verb]),
                )
                .with_negation(negation);
                tuple.complement = nested.clone();
                tuple
            })
            .collect()
    }
}

/// Object clause cut out of `sentence` whose anchor is `verb`. A
/// synthesized verb has no original index and is matched by position.
fn anchored_complement<'s>(
    tree: &DependencyTree,
    verb: usize,
    sentence: &'s Sentence,
) -> Option<&'s Attachment> {
    let original = tree.unit(verb)?.original();
    sentence.right.iter().find(|a| {
        a.message.kind == ClauseKind::ObjCl
            && a.message.anchor.as_ref().is_some_and(|t| match original {
                Some(index) => t.original == Some(index),
                None => t.original.is_none() && t.index == verb,
            })
    })
}

// ============================================================================
// Pattern Handlers
// ============================================================================

fn negated(tree: &DependencyTree, verb: usize) -> bool {
    tree.has_child(verb, Relation::Negation)
}

fn basic(tree: &DependencyTree, verb: usize, pattern: ClausePattern, subject: usize) -> RawTuple {
    RawTuple::new(
        pattern,
        verb,
        noun_span(tree, subject),
        predicate_span(tree, verb, &[verb]),
    )
    .with_negation(negated(tree, verb))
}

fn extract_sv(tree: &DependencyTree, verb: usize) -> Vec<RawTuple> {
    tree.subjects(verb)
        .into_iter()
        .map(|s| basic(tree, verb, ClausePattern::Sv, s))
        .collect()
}

fn extract_svo(tree: &DependencyTree, verb: usize) -> Vec<RawTuple> {
    let objects = tree.objects(verb);
    let mut tuples = Vec::new();
    for subject in tree.subjects(verb) {
        for object in &objects {
            tuples.push(
                basic(tree, verb, ClausePattern::Svo, subject).with_object(noun_span(tree, *object)),
            );
        }
    }
    tuples
}

fn extract_svoo(tree: &DependencyTree, verb: usize) -> Vec<RawTuple> {
    let objects = tree.objects(verb);
    let mut indirect = Vec::new();
    for object in tree.children_with(verb, Relation::IndirectObject) {
        indirect.push(object);
        indirect.extend(tree.conjuncts(object));
    }

    let mut tuples = Vec::new();
    for subject in tree.subjects(verb) {
        for object in &objects {
            for recipient in &indirect {
                let mut tuple = basic(tree, verb, ClausePattern::Svoo, subject)
                    .with_object(noun_span(tree, *object));
                tuple.indirect_object = Some(noun_span(tree, *recipient));
                tuples.push(tuple);
            }
        }
    }
    tuples
}

/// "they elected him president": the matrix tuple plus
/// "him be president"
fn extract_svoc(tree: &DependencyTree, verb: usize) -> Vec<RawTuple> {
    let objects = tree.objects(verb);
    let mut tuples = Vec::new();
    for subject in tree.subjects(verb) {
        for object in &objects {
            tuples.push(
                basic(tree, verb, ClausePattern::Svoc, subject).with_object(noun_span(tree, *object)),
            );
        }
    }

    for complement in tree.children_with(verb, Relation::OpenComplement) {
        for object in &objects {
            if is_verb_tag(tree.pos(complement)) {
                let secondary = RawTuple::new(
                    ClausePattern::Svoc,
                    complement,
                    noun_span(tree, *object),
                    predicate_span(tree, complement, &[complement]),
                )
                .with_negation(negated(tree, complement));
                let inner = tree.objects(complement);
                if inner.is_empty() {
                    tuples.push(secondary);
                } else {
                    for o in inner {
                        tuples.push(secondary.clone().with_object(noun_span(tree, o)));
                    }
                }
            } else {
                let mut predicates = vec![complement];
                predicates.extend(tree.conjuncts(complement));
                for p in predicates {
                    tuples.push(
                        RawTuple::new(
                            ClausePattern::Svoc,
                            verb,
                            noun_span(tree, *object),
                            vec![copula()],
                        )
                        .with_object(noun_span(tree, p)),
                    );
                }
            }
        }
    }
    tuples
}

/// Open complements: a verbal one extends the predicate ("started to
/// learn"), a nominal or adjectival one becomes the object ("was
/// considered a good teacher")
fn extract_svx(tree: &DependencyTree, verb: usize) -> Vec<RawTuple> {
    let subjects = tree.subjects(verb);
    let negation = negated(tree, verb);
    let mut tuples = Vec::new();

    for child in tree.children_with(verb, Relation::OpenComplement) {
        let pos = tree.pos(child);
        if is_verb_tag(pos) {
            let span: Vec<usize> = tree
                .indices()
                .into_iter()
                .filter(|i| (verb..=child).contains(i))
                .collect();
            let objects = tree.objects(child);
            for subject in &subjects {
                let tuple = RawTuple::new(
                    ClausePattern::Svx,
                    verb,
                    noun_span(tree, *subject),
                    predicate_span(tree, verb, &span),
                )
                .with_negation(negation);
                if objects.is_empty() {
                    tuples.push(tuple);
                } else {
                    for object in &objects {
                        tuples.push(tuple.clone().with_object(noun_span(tree, *object)));
                    }
                }
            }
        } else if is_noun_tag(pos) || is_adjective_tag(pos) {
            let mut objects = vec![child];
            objects.extend(tree.conjuncts(child));
            for subject in &subjects {
                for object in &objects {
                    tuples.push(
                        basic(tree, verb, ClausePattern::Svx, *subject)
                            .with_object(noun_span(tree, *object)),
                    );
                }
            }
        }
    }
    tuples
}

/// "he was the son of Li". The copula is either a dependent of the
/// predicate nominal or the head of an attribute.
fn extract_copular(
    tree: &DependencyTree,
    verb: usize,
    processed: &mut BTreeSet<usize>,
) -> Vec<RawTuple> {
    let (head, candidates) = if tree.incoming_is(verb, Relation::Copula) {
        let Some(parent) = tree.parent(verb) else {
            return Vec::new();
        };
        processed.insert(parent);
        let mut candidates = vec![parent];
        candidates.extend(tree.conjuncts(parent));
        (parent, candidates)
    } else {
        let mut candidates = Vec::new();
        for attribute in tree.children_with(verb, Relation::Attribute) {
            candidates.push(attribute);
            candidates.extend(tree.conjuncts(attribute));
        }
        (verb, candidates)
    };

    let negation = negated(tree, verb) || negated(tree, head);
    let mut tuples = Vec::new();
    for subject in tree.subjects(head) {
        for candidate in &candidates {
            if is_verb_tag(tree.pos(*candidate)) {
                continue;
            }
            // "he is a boy and is a student": the second copula reports it
            if *candidate != head && tree.has_child(*candidate, Relation::Copula) {
                continue;
            }
            tuples.push(
                RawTuple::new(
                    ClausePattern::Copular,
                    verb,
                    noun_span(tree, subject),
                    predicate_span(tree, verb, &[verb]),
                )
                .with_object(noun_span(tree, *candidate))
                .with_negation(negation),
            );
        }
    }
    tuples
}

/// "he is to leave": the predicate runs from the copula through the
/// embedded verb
fn extract_copular_open(tree: &DependencyTree, verb: usize) -> Vec<RawTuple> {
    let negation = negated(tree, verb);
    let mut tuples = Vec::new();
    for child in tree.children_with(verb, Relation::OpenComplement) {
        for subject in tree.subjects(verb) {
            if is_verb_tag(tree.pos(child)) {
                let span: Vec<usize> = tree
                    .indices()
                    .into_iter()
                    .filter(|i| (verb..=child).contains(i))
                    .collect();
                let tuple = RawTuple::new(
                    ClausePattern::CopularOpen,
                    verb,
                    noun_span(tree, subject),
                    predicate_span(tree, verb, &span),
                )
                .with_negation(negation);
                let objects = tree.objects(child);
                if objects.is_empty() {
                    tuples.push(tuple);
                } else {
                    for object in objects {
                        tuples.push(tuple.clone().with_object(noun_span(tree, object)));
                    }
                }
            } else {
                tuples.push(
                    basic(tree, verb, ClausePattern::CopularOpen, subject)
                        .with_object(noun_span(tree, child)),
                );
            }
        }
    }
    tuples
}

// ============================================================================
// Spans and Elements
// ============================================================================

fn copula() -> Unit {
    Unit::Token(Token::synthesized("be", "VB"))
}

/// A node grown to its full noun phrase
fn noun_span(tree: &DependencyTree, node: usize) -> Vec<Unit> {
    tree.ordered_units(&tree.expand_noun_phrase(node))
}

/// Predicate nodes plus the auxiliaries and negation of `verb`. A
/// participle conjunct borrows the auxiliaries of its first conjunct
/// ("he was shot and killed").
fn predicate_span(tree: &DependencyTree, verb: usize, nodes: &[usize]) -> Vec<Unit> {
    let mut span: BTreeSet<usize> = nodes.iter().copied().collect();
    span.extend(particles(tree, verb));
    if tree.unit(verb).map(|u| u.is_participle()).unwrap_or(false)
        && tree.incoming_is(verb, Relation::Conjunct)
    {
        if let Some(parent) = tree.parent(verb) {
            span.extend(
                particles(tree, parent)
                    .into_iter()
                    .filter(|p| !tree.incoming_is(*p, Relation::Negation)),
            );
        }
    }
    tree.ordered_units(&span.into_iter().collect::<Vec<_>>())
}

fn particles(tree: &DependencyTree, verb: usize) -> Vec<usize> {
    tree.children(verb)
        .into_iter()
        .filter(|c| tree.incoming_is_any(*c, &PREDICATE_PARTICLES))
        .filter(|c| !DO_SUPPORT.contains(&tree.word(*c).to_lowercase().as_str()))
        .collect()
}

/// Adverbials of the tuple's verb; a conjunct verb without its own takes
/// its governor's when they lie outside the coordination
fn assign_adverbials(tree: &DependencyTree, adverbials: &AdverbialMap, tuple: &mut RawTuple) {
    let usable = |verb: usize| -> Vec<Vec<Unit>> {
        adverbials
            .get(&verb)
            .map(|spans| {
                spans
                    .iter()
                    .filter(|s| s.iter().map(|u| u.tokens().len()).sum::<usize>() > 1)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    };

    let mut verbs = vec![tuple.verb];
    verbs.extend(tuple.predicate.iter().map(|u| u.index()));
    if let Some(own) = verbs.into_iter().map(usable).find(|a| !a.is_empty()) {
        tuple.adverbials = own;
        return;
    }

    if !tree.incoming_is(tuple.verb, Relation::Conjunct) {
        return;
    }
    let Some(parent) = tree.parent(tuple.verb) else {
        return;
    };
    let inherited = usable(parent);
    let positions: Vec<usize> = inherited.iter().flatten().map(|u| u.index()).collect();
    let (Some(min), Some(max)) = (positions.iter().min(), positions.iter().max()) else {
        return;
    };
    if *max < parent || *min > tuple.verb {
        tuple.adverbials = inherited;
    }
}

fn tokens_of(units: &[Unit]) -> Vec<&Token> {
    units.iter().flat_map(|u| u.tokens()).collect()
}

/// Element over a span; synthesized words add no index
fn element(units: &[Unit]) -> Element {
    let tokens = tokens_of(units);
    let word = tokens
        .iter()
        .map(|t| t.word.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let indices = tokens.iter().filter_map(|t| t.original).collect();
    Element::new(word, indices)
}

/// The first word of an adverbial span is its preposition
pub(crate) fn adverbial_element(units: &[Unit]) -> Option<Element> {
    let tokens = tokens_of(units);
    let (first, rest) = tokens.split_first()?;
    if rest.is_empty() {
        return None;
    }
    let word = rest
        .iter()
        .map(|t| t.word.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let indices = tokens.iter().filter_map(|t| t.original).collect();
    Some(Element::new(word, indices).with_preposition(first.word.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use oie_core::{DecompositionStrategy, RelationLabels};

    use crate::restructure::SentenceRestructurer;
    use crate::sentence::SentenceBuilder;
    use crate::test_support::{parsed, FixtureParser};

    fn sentence(words: &str, tags: &str, deps: &[(usize, usize, &str)]) -> Sentence {
        SentenceBuilder::new(Arc::new(FixtureParser::new()), RelationLabels::corenlp())
            .from_parsed(&parsed(words, tags, deps))
            .unwrap()
    }

    fn extract(s: &Sentence) -> Vec<Tuple> {
        TupleExtractor::default().extract(s)
    }

    fn words(tuple: &Tuple) -> (String, String, Option<String>) {
        (
            tuple.subject.word.clone(),
            tuple.predicate.word.clone(),
            tuple.direct_object.as_ref().map(|o| o.word.clone()),
        )
    }

    #[test]
    fn test_verb_group_predicate() {
        let s = sentence(
            "he started to learn English",
            "PRP VBD TO VB NNP",
            &[
                (0, 2, "ROOT"),
                (2, 1, "nsubj"),
                (2, 4, "xcomp"),
                (4, 3, "mark"),
                (4, 5, "dobj"),
            ],
        );
        let tuples = extract(&s);
        assert_eq!(tuples.len(), 1);
        assert_eq!(tuples[0].clause_type, ClausePattern::Svo);
        assert_eq!(
            words(&tuples[0]),
            ("he".into(), "started to learn".into(), Some("English".into()))
        );
        assert_eq!(tuples[0].predicate.indices, vec![2, 3, 4]);
    }

    #[test]
    fn test_copular_complement_expanded() {
        let s = sentence(
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
        let tuples = extract(&s);
        assert_eq!(tuples.len(), 1);
        assert_eq!(tuples[0].clause_type, ClausePattern::Copular);
        assert_eq!(
            words(&tuples[0]),
            ("he".into(), "was".into(), Some("the son of Li".into()))
        );
        assert_eq!(
            tuples[0].direct_object.as_ref().map(|o| o.indices.clone()),
            Some(vec![3, 4, 5, 6])
        );
    }

    #[test]
    fn test_second_copula_reports_its_own_complement() {
        let s = sentence(
            "he is a boy and is a student",
            "PRP VBZ DT NN CC VBZ DT NN",
            &[
                (0, 4, "ROOT"),
                (4, 1, "nsubj"),
                (4, 2, "cop"),
                (4, 3, "det"),
                (4, 5, "cc"),
                (4, 8, "conj"),
                (8, 6, "cop"),
                (8, 7, "det"),
            ],
        );
        let objects: Vec<Option<String>> = extract(&s).iter().map(|t| words(t).2).collect();
        assert_eq!(
            objects,
            vec![Some("a boy".to_string()), Some("a student".to_string())]
        );
    }

    #[test]
    fn test_adverbials_stay_with_their_verbs() {
        let s = sentence(
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
        let tuples = extract(&s);
        assert_eq!(tuples.len(), 2);
        assert_eq!(tuples[0].predicate.word, "moved");
        assert_eq!(tuples[0].adverbials.len(), 1);
        assert_eq!(tuples[0].adverbials[0].text(), "in 1999");
        assert_eq!(tuples[0].adverbials[0].indices, vec![3, 4]);
        assert_eq!(tuples[1].predicate.word, "died");
        assert_eq!(tuples[1].subject.word, "he");
        assert_eq!(tuples[1].adverbials.len(), 1);
        assert_eq!(tuples[1].adverbials[0].text(), "in 2000");
    }

    #[test]
    fn test_conjunct_inherits_trailing_adverbial() {
        let s = sentence(
            "he sang and danced in Paris",
            "PRP VBD CC VBD IN NNP",
            &[
                (0, 2, "ROOT"),
                (2, 1, "nsubj"),
                (2, 3, "cc"),
                (2, 4, "conj"),
                (2, 6, "nmod"),
                (6, 5, "case"),
            ],
        );
        let tuples = extract(&s);
        assert_eq!(tuples.len(), 2);
        assert_eq!(tuples[1].predicate.word, "danced");
        assert_eq!(tuples[1].adverbials[0].text(), "in Paris");
    }

    #[test]
    fn test_passive_auxiliary_joins_predicate() {
        let s = sentence(
            "he was shot and killed",
            "PRP VBD VBN CC VBN",
            &[
                (0, 3, "ROOT"),
                (3, 1, "nsubjpass"),
                (3, 2, "auxpass"),
                (3, 4, "cc"),
                (3, 5, "conj"),
            ],
        );
        let predicates: Vec<String> = extract(&s).iter().map(|t| t.predicate.word.clone()).collect();
        assert_eq!(predicates, vec!["was shot", "was killed"]);
    }

    #[test]
    fn test_negation_flag() {
        let s = sentence(
            "he did not leave",
            "PRP VBD RB VB",
            &[(0, 4, "ROOT"), (4, 1, "nsubj"), (4, 2, "aux"), (4, 3, "neg")],
        );
        let tuples = extract(&s);
        assert_eq!(tuples.len(), 1);
        assert!(tuples[0].negation);
        assert_eq!(tuples[0].predicate.word, "not leave");
    }

    #[test]
    fn test_ditransitive() {
        let s = sentence(
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
        let tuples = extract(&s);
        assert_eq!(tuples.len(), 1);
        assert_eq!(tuples[0].clause_type, ClausePattern::Svoo);
        assert_eq!(
            tuples[0].indirect_object.as_ref().map(|o| o.word.as_str()),
            Some("her")
        );
    }

    #[test]
    fn test_object_complement_secondary_tuple() {
        let s = sentence(
            "they elected him president",
            "PRP VBD PRP NN",
            &[(0, 2, "ROOT"), (2, 1, "nsubj"), (2, 3, "dobj"), (2, 4, "xcomp")],
        );
        let tuples = extract(&s);
        assert_eq!(tuples.len(), 2);
        assert_eq!(
            words(&tuples[1]),
            ("him".into(), "be".into(), Some("president".into()))
        );
        assert!(tuples[1].predicate.indices.is_empty());
    }

    #[test]
    fn test_nominal_open_complement() {
        let s = sentence(
            "he was considered a good teacher",
            "PRP VBD VBN DT JJ NN",
            &[
                (0, 3, "ROOT"),
                (3, 1, "nsubjpass"),
                (3, 2, "auxpass"),
                (3, 6, "xcomp"),
                (6, 4, "det"),
                (6, 5, "amod"),
            ],
        );
        let tuples = extract(&s);
        assert_eq!(tuples.len(), 1);
        assert_eq!(tuples[0].clause_type, ClausePattern::Svx);
        assert_eq!(
            words(&tuples[0]),
            ("he".into(), "was considered".into(), Some("a good teacher".into()))
        );
    }

    #[test]
    fn test_existential_yields_nothing() {
        let s = sentence(
            "there is a book",
            "EX VBZ DT NN",
            &[(0, 2, "ROOT"), (2, 1, "expl"), (2, 4, "nsubj"), (4, 3, "det")],
        );
        assert!(extract(&s).is_empty());
    }

    #[test]
    fn test_clausal_complement_nests_tuples() {
        let parser = FixtureParser::new().with(
            "she left",
            "PRP VBD",
            &[(0, 2, "ROOT"), (2, 1, "nsubj")],
        );
        let builder = SentenceBuilder::new(Arc::new(parser), RelationLabels::corenlp());
        let mut s = builder
            .from_parsed(&parsed(
                "he said that she left",
                "PRP VBD IN PRP VBD",
                &[
                    (0, 2, "ROOT"),
                    (2, 1, "nsubj"),
                    (2, 5, "ccomp"),
                    (5, 3, "mark"),
                    (5, 4, "nsubj"),
                ],
            ))
            .unwrap();
        SentenceRestructurer::new(&builder, DecompositionStrategy::SinglePass)
            .restructure(&mut s)
            .unwrap();

        let tuples = extract(&s);
        assert_eq!(tuples.len(), 2);
        assert_eq!(tuples[0].clause_type, ClausePattern::SvClausal);
        assert_eq!(words(&tuples[0]), ("he".into(), "said".into(), None));
        assert_eq!(tuples[0].complement.len(), 1);
        assert_eq!(
            words(&tuples[0].complement[0]),
            ("she".into(), "left".into(), None)
        );
        assert_eq!(tuples[0].complement[0].subject.indices, vec![4]);
        assert_eq!(tuples[1].predicate.word, "left");
    }
}
