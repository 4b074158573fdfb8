//! Sentence restructuring
//!
//! Cuts every detected subordinate clause out of its sentence, repairs it
//! into a standalone clause (borrowed subject, synthesized copula, stemmed
//! gerund), re-parses it and hangs it on the sentence as a left or right
//! attachment. Attachments are processed breadth first until no
//! subordination point is left anywhere in the forest.

use std::collections::{BTreeSet, VecDeque};

use oie_core::{DecompositionStrategy, Relation, Result};

use crate::detector::{ClauseDetector, ClauseKind};
use crate::lemma::base_form;
use crate::sentence::{Attachment, ClauseMessage, Sentence, SentenceBuilder};
use crate::token::{Token, Unit};
use crate::tree::DependencyTree;

const RELATIVE_PRONOUNS: [&str; 3] = ["who", "that", "which"];

const SUBORDINATOR_TAGS: [&str; 5] = ["IN", "WDT", "WP", "WP$", "WRB"];

/// Side of the parent a repaired clause is attached to
enum Side {
    Left,
    Right,
}

/// Decomposes sentences into a forest of minimal clauses
pub struct SentenceRestructurer<'a> {
    builder: &'a SentenceBuilder,
    detector: ClauseDetector,
    strategy: DecompositionStrategy,
}

impl<'a> SentenceRestructurer<'a> {
    pub fn new(builder: &'a SentenceBuilder, strategy: DecompositionStrategy) -> Self {
        Self {
            builder,
            detector: ClauseDetector::new(),
            strategy,
        }
    }

    /// Decompose a sentence and, breadth first, every clause cut out of it.
    ///
    /// The number of extractions over the whole forest is bounded by the
    /// token count of the input sentence.
    pub fn restructure(&self, sentence: &mut Sentence) -> Result<()> {
        let mut budget = sentence.tree.token_count().max(1);
        let mut pending: VecDeque<&mut Sentence> = VecDeque::from([sentence]);
        while let Some(current) = pending.pop_front() {
            self.decompose(current, &mut budget)?;
            let Sentence { left, right, .. } = current;
            pending.extend(
                left.iter_mut()
                    .chain(right.iter_mut())
                    .map(|a| &mut a.sentence),
            );
        }
        Ok(())
    }

    fn decompose(&self, sentence: &mut Sentence, budget: &mut usize) -> Result<()> {
        match self.strategy {
            DecompositionStrategy::SinglePass => self.single_pass(sentence, budget)?,
            DecompositionStrategy::Reparse => self.reparse_loop(sentence, budget)?,
            DecompositionStrategy::AppositionFirst => {
                self.appositives_first(sentence, budget)?;
                self.single_pass(sentence, budget)?;
            }
        }
        sentence.refresh_text();
        Ok(())
    }

    fn single_pass(&self, sentence: &mut Sentence, budget: &mut usize) -> Result<()> {
        for node in self.detector.potential_points(&sentence.tree) {
            if !self.step(sentence, node, budget)? {
                break;
            }
        }
        Ok(())
    }

    /// Re-parse the remaining clause after every extraction that shrank it
    fn reparse_loop(&self, sentence: &mut Sentence, budget: &mut usize) -> Result<()> {
        loop {
            let before = sentence.tree.token_count();
            let mut shrunk = false;
            for node in self.detector.potential_points(&sentence.tree) {
                if !self.step(sentence, node, budget)? {
                    break;
                }
                if sentence.tree.token_count() < before {
                    shrunk = true;
                    break;
                }
            }
            if !shrunk {
                return Ok(());
            }
            self.reparse(sentence)?;
        }
    }

    /// Extract appositives right to left, re-parsing after every round
    fn appositives_first(&self, sentence: &mut Sentence, budget: &mut usize) -> Result<()> {
        loop {
            let before = sentence.tree.token_count();
            let candidates: Vec<usize> = sentence
                .tree
                .indices()
                .into_iter()
                .rev()
                .filter(|i| sentence.tree.incoming_is(*i, Relation::Apposition))
                .collect();
            for node in candidates {
                if *budget == 0 {
                    tracing::warn!("Decomposition budget exhausted at '{}'", sentence.text);
                    return Ok(());
                }
                if !sentence.tree.contains(node) {
                    continue;
                }
                if self.process_appositive(sentence, node, ClauseKind::Appos)? {
                    *budget -= 1;
                }
            }
            if sentence.tree.token_count() == before {
                return Ok(());
            }
            self.reparse(sentence)?;
        }
    }

    /// Classify and process one point. Returns false once the budget is
    /// spent.
    fn step(&self, sentence: &mut Sentence, node: usize, budget: &mut usize) -> Result<bool> {
        if *budget == 0 {
            tracing::warn!("Decomposition budget exhausted at '{}'", sentence.text);
            return Ok(false);
        }
        if !sentence.tree.contains(node) {
            return Ok(true);
        }
        let kind = self.detector.classify(&sentence.tree, node);
        if kind == ClauseKind::Core {
            return Ok(true);
        }
        tracing::debug!("Point {} in '{}' classified as {}", node, sentence.text, kind);
        if self.process(sentence, node, kind)? {
            *budget -= 1;
        }
        Ok(true)
    }

    fn reparse(&self, sentence: &mut Sentence) -> Result<()> {
        let units = sentence.tree.ordered_units(&sentence.tree.indices());
        let rebuilt = self.builder.from_units(units)?;
        sentence.tree = rebuilt.tree;
        sentence.refresh_text();
        Ok(())
    }

    /// Apply the repair for one clause kind; false when nothing changed
    fn process(&self, sentence: &mut Sentence, node: usize, kind: ClauseKind) -> Result<bool> {
        match kind {
            ClauseKind::ObjCl => self.process_object_clause(sentence, node),
            ClauseKind::Acl => self.process_relative_clause(sentence, node),
            ClauseKind::Advcl => self.process_adverbial_clause(sentence, node),
            ClauseKind::ParAdvcl => self.process_participial_adverbial(sentence, node),
            ClauseKind::ParAcl => self.process_participial_modifier(sentence, node),
            ClauseKind::Infinite => Ok(self.process_infinitive(sentence, node)),
            ClauseKind::Appos | ClauseKind::AppoCl => {
                self.process_appositive(sentence, node, kind)
            }
            ClauseKind::NounComplement | ClauseKind::AdjComplement => {
                self.process_complement(sentence, node, kind)
            }
            ClauseKind::SubjCl => {
                tracing::debug!("Clausal subject at {} left in place", node);
                Ok(false)
            }
            ClauseKind::Core => Ok(false),
        }
    }

    // ========================================================================
    // Repairs
    // ========================================================================

    fn process_object_clause(&self, sentence: &mut Sentence, node: usize) -> Result<bool> {
        let tree = &sentence.tree;
        let subtree = tree.subtree(node, &[]);
        let mut clause = tree.ordered_units(&subtree);
        let marker = take_subordinators(tree, node, &mut clause);
        if clause.is_empty() {
            return Ok(false);
        }
        let anchor = tree.parent(node).and_then(|p| anchor_token(tree, p));

        let attachment = self.attach(clause, ClauseKind::ObjCl, marker, anchor)?;
        self.excise(sentence, &subtree, false, attachment, Side::Right);
        Ok(true)
    }

    fn process_relative_clause(&self, sentence: &mut Sentence, node: usize) -> Result<bool> {
        let tree = &sentence.tree;
        let Some(parent) = tree.parent(node) else {
            return Ok(false);
        };
        let subtree = tree.subtree(node, &[]);
        if subtree.len() >= tree.len() {
            return Ok(false);
        }
        let mut clause = tree.ordered_units(&subtree);

        let subjects: Vec<usize> = tree
            .children(node)
            .into_iter()
            .filter(|c| tree.incoming_is_any(*c, &[Relation::Subject, Relation::PassiveSubject]))
            .collect();
        let relative_subject = match subjects.as_slice() {
            [] => true,
            [subject] => {
                RELATIVE_PRONOUNS.contains(&tree.word(*subject).to_lowercase().as_str())
            }
            _ => false,
        };

        let mut marker = None;
        if relative_subject {
            if let [subject] = subjects.as_slice() {
                if let Some(pos) = clause.iter().position(|u| u.index() == *subject) {
                    marker = Some(clause.remove(pos).word());
                }
            }
            let mut antecedent = vec![parent];
            antecedent.extend(tree.conjuncts(parent));
            let antecedent: Vec<usize> = tree
                .build_conjunction(&antecedent)
                .into_iter()
                .filter(|i| *i < node && !subtree.contains(i))
                .collect();
            let mut units = tree.ordered_units(&antecedent);
            units.append(&mut clause);
            clause = units;
        } else if clause
            .first()
            .map(|u| is_subordinator(tree, u.index()))
            .unwrap_or(false)
        {
            marker = Some(clause.remove(0).word());
        }
        if clause.is_empty() {
            return Ok(false);
        }

        let anchor = anchor_token(tree, parent);
        let attachment = self.attach(clause, ClauseKind::Acl, marker, anchor)?;
        self.excise(sentence, &subtree, false, attachment, Side::Right);
        Ok(true)
    }

    fn process_adverbial_clause(&self, sentence: &mut Sentence, node: usize) -> Result<bool> {
        let tree = &sentence.tree;
        let subtree = tree.subtree(node, &[]);
        let mut clause = tree.ordered_units(&subtree);
        let marker = take_subordinators(tree, node, &mut clause);
        if clause.is_empty() {
            return Ok(false);
        }
        let anchor = tree.parent(node).and_then(|p| anchor_token(tree, p));

        let attachment = self.attach(clause, ClauseKind::Advcl, marker, anchor)?;
        self.excise(sentence, &subtree, true, attachment, Side::Left);
        Ok(true)
    }

    /// "the boy, waving his arms, cried" -> "the boy wave his arms"
    fn process_participial_adverbial(&self, sentence: &mut Sentence, node: usize) -> Result<bool> {
        let tree = &sentence.tree;
        let Some(parent) = tree.parent(node) else {
            return Ok(false);
        };
        let verb = participle_of(tree, node);
        let subtree = tree.subtree(node, &[]);
        let mut clause = tree.ordered_units(&subtree);
        let marker = take_subordinators(tree, node, &mut clause);
        // "by using tools": the preposition is not part of the new clause
        if clause.first().map(|u| u.index() != verb && u.pos() == "IN") == Some(true) {
            clause.remove(0);
        }
        if clause.is_empty() {
            return Ok(false);
        }
        lowercase_first(&mut clause);

        let subjects = tree.build_conjunction(&tree.subjects(parent));
        let objects = tree.objects(parent);
        let borrowed = if tree.pos(verb) == "VBN" || objects.is_empty() {
            subjects
        } else {
            match tree.preceding(verb) {
                Some(p) if tree.pos(p) == "IN" && !tree.word(p).eq_ignore_ascii_case("by") => {
                    tree.build_conjunction(&objects)
                }
                _ => subjects,
            }
        };
        let borrowed: Vec<usize> = borrowed
            .into_iter()
            .filter(|i| !subtree.contains(i))
            .collect();

        let mut units = tree.ordered_units(&borrowed);
        if tree.pos(verb) == "VBN" {
            units.push(copula());
        } else {
            stem_verb(&mut clause, verb);
        }
        units.append(&mut clause);

        let anchor = anchor_token(tree, parent);
        let attachment = self.attach(units, ClauseKind::ParAdvcl, marker, anchor)?;
        self.excise(sentence, &subtree, false, attachment, Side::Left);
        Ok(true)
    }

    /// "animals including tigers" -> "animals include tigers",
    /// "a man named Tom" -> "a man be named Tom"
    fn process_participial_modifier(&self, sentence: &mut Sentence, node: usize) -> Result<bool> {
        let tree = &sentence.tree;
        let Some(parent) = tree.parent(node) else {
            return Ok(false);
        };
        let verb = participle_of(tree, node);
        let subtree = tree.subtree(node, &[]);
        let mut clause = tree.ordered_units(&subtree);
        let marker = take_subordinators(tree, node, &mut clause);
        if clause.is_empty() {
            return Ok(false);
        }

        let mut antecedent = vec![parent];
        antecedent.extend(tree.conjuncts(parent));
        let antecedent: Vec<usize> = tree
            .build_conjunction(&antecedent)
            .into_iter()
            .filter(|i| !subtree.contains(i))
            .collect();
        let mut units = tree.ordered_units(&antecedent);
        if tree.pos(verb) == "VBG" {
            stem_verb(&mut clause, verb);
        } else {
            units.push(copula());
        }
        units.append(&mut clause);

        let anchor = anchor_token(tree, parent);
        let attachment = self.attach(units, ClauseKind::ParAcl, marker, anchor)?;
        self.excise(sentence, &subtree, false, attachment, Side::Left);
        Ok(true)
    }

    /// Infinitival modifiers are dropped together with their "to"
    fn process_infinitive(&self, sentence: &mut Sentence, node: usize) -> bool {
        let tree = &sentence.tree;
        let mut span = tree.subtree(node, &[]);
        if let Some(to) = tree.preceding(node) {
            if tree.word(to).eq_ignore_ascii_case("to") && tree.children(to).is_empty() {
                span.push(to);
            }
        }
        tracing::debug!("Dropped infinitival modifier '{}'", words_of(tree, &span));
        sentence.tree.delete_subtree(&span, false);
        true
    }

    /// "his father, Tom, left" -> "his father be Tom"
    fn process_appositive(
        &self,
        sentence: &mut Sentence,
        node: usize,
        kind: ClauseKind,
    ) -> Result<bool> {
        let tree = &sentence.tree;
        let Some(parent) = tree.parent(node) else {
            return Ok(false);
        };
        let subtree = tree.subtree(node, &[]);
        let mut clause = tree.ordered_units(&subtree);
        if clause.is_empty() {
            return Ok(false);
        }

        let commas = tree
            .units()
            .filter(|(i, u)| *i > parent && *i < node && u.is_comma())
            .count();
        let subject: Vec<usize> = if commas < 2 {
            let mut antecedent = vec![parent];
            antecedent.extend(tree.conjuncts(parent));
            tree.build_conjunction(&antecedent)
                .into_iter()
                .filter(|i| *i < node && !subtree.contains(i))
                .collect()
        } else {
            nearest_noun_before_comma(tree, node).into_iter().collect()
        };
        if subject.is_empty() {
            return Ok(false);
        }

        let mut units = tree.ordered_units(&subject);
        units.push(copula());
        units.append(&mut clause);

        let anchor = anchor_token(tree, parent);
        let attachment = self.attach(units, kind, None, anchor)?;
        self.excise(sentence, &subtree, true, attachment, Side::Left);
        Ok(true)
    }

    /// Nominal or adjectival clause complement: "SUBJECT be COMPLEMENT"
    fn process_complement(
        &self,
        sentence: &mut Sentence,
        node: usize,
        kind: ClauseKind,
    ) -> Result<bool> {
        let tree = &sentence.tree;
        let Some(parent) = tree.parent(node) else {
            return Ok(false);
        };
        let subjects = tree.subjects(parent);
        if subjects.is_empty() {
            return Ok(false);
        }
        let subtree = tree.subtree(node, &[]);
        let mut clause = tree.ordered_units(&subtree);
        let marker = take_subordinators(tree, node, &mut clause);
        if clause.is_empty() {
            return Ok(false);
        }
        lowercase_first(&mut clause);

        let subject: Vec<usize> = tree
            .build_conjunction(&subjects)
            .into_iter()
            .filter(|i| !subtree.contains(i))
            .collect();
        let mut units = tree.ordered_units(&subject);
        units.push(copula());
        units.append(&mut clause);

        let anchor = anchor_token(tree, parent);
        let attachment = self.attach(units, kind, marker, anchor)?;
        self.excise(sentence, &subtree, false, attachment, Side::Left);
        Ok(true)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn attach(
        &self,
        units: Vec<Unit>,
        kind: ClauseKind,
        marker: Option<String>,
        anchor: Option<Token>,
    ) -> Result<Attachment> {
        let sentence = self.builder.from_units(units)?;
        tracing::debug!("Extracted {} clause '{}'", kind, sentence.text);
        Ok(Attachment {
            message: ClauseMessage::new(kind, marker, anchor),
            sentence,
        })
    }

    fn excise(
        &self,
        sentence: &mut Sentence,
        subtree: &[usize],
        drop_following_comma: bool,
        attachment: Attachment,
        side: Side,
    ) {
        sentence.tree.delete_subtree(subtree, drop_following_comma);
        match side {
            Side::Left => sentence.left.push(attachment),
            Side::Right => sentence.right.push(attachment),
        }
        sentence.refresh_text();
    }
}

fn copula() -> Unit {
    Unit::Token(Token::synthesized("be", "VB"))
}

fn anchor_token(tree: &DependencyTree, index: usize) -> Option<Token> {
    tree.unit(index).and_then(|u| u.head_token()).cloned()
}

fn words_of(tree: &DependencyTree, nodes: &[usize]) -> String {
    tree.ordered_units(nodes)
        .iter()
        .map(|u| u.word())
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_subordinator(tree: &DependencyTree, index: usize) -> bool {
    let word = tree.word(index).to_lowercase();
    RELATIVE_PRONOUNS.contains(&word.as_str())
        || SUBORDINATOR_TAGS.contains(&tree.pos(index))
        || tree.incoming_is(index, Relation::Marker)
}

/// Remove the clause's marker children, and a leading subordinator
/// attached to the clause head; returns the removed words
fn take_subordinators(tree: &DependencyTree, node: usize, clause: &mut Vec<Unit>) -> Option<String> {
    let mut removed: BTreeSet<usize> = tree
        .children_with(node, Relation::Marker)
        .into_iter()
        .collect();
    let leading = clause
        .iter()
        .map(|u| u.index())
        .find(|i| !removed.contains(i));
    if let Some(first) = leading {
        let attached = tree.parent(first) == Some(node);
        let subordinating = SUBORDINATOR_TAGS.contains(&tree.pos(first))
            || tree.word(first).eq_ignore_ascii_case("that");
        if first < node && attached && subordinating && tree.children(first).is_empty() {
            removed.insert(first);
        }
    }
    if removed.is_empty() {
        return None;
    }
    let words: Vec<String> = clause
        .iter()
        .filter(|u| removed.contains(&u.index()))
        .map(|u| u.word())
        .collect();
    clause.retain(|u| !removed.contains(&u.index()));
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

/// The participle heading a clause; for a gerund-marked nominal modifier
/// it is the marker rather than the noun
fn participle_of(tree: &DependencyTree, node: usize) -> usize {
    if tree.incoming_is(node, Relation::NominalModifier) {
        tree.gerund_marker(node).unwrap_or(node)
    } else {
        node
    }
}

fn lowercase_first(clause: &mut [Unit]) {
    if let Some(token) = clause.first_mut().and_then(|u| u.first_token_mut()) {
        if !token.pos.starts_with("NNP") {
            token.word = token.word.to_lowercase();
        }
    }
}

fn stem_verb(clause: &mut [Unit], verb: usize) {
    if let Some(token) = clause
        .iter_mut()
        .find(|u| u.index() == verb)
        .and_then(|u| u.head_token_mut())
    {
        token.word = base_form(&token.word);
    }
}

/// Walking back from an appositive, the first noun past a comma
fn nearest_noun_before_comma(tree: &DependencyTree, node: usize) -> Option<usize> {
    let mut seen_comma = false;
    for (index, unit) in tree.units().rev().filter(|(i, _)| *i < node) {
        if unit.is_comma() {
            seen_comma = true;
        } else if seen_comma && unit.is_noun() {
            return Some(index);
        }
    }
    None
}
