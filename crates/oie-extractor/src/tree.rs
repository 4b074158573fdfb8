//! Dependency tree
//!
//! An arena of units keyed by local index plus a map from every dependent
//! to its incoming edge. All operations address nodes by index: deleting a
//! node removes its arena entry, merging a span swaps its head for a
//! `Phrase` that remembers the edges it displaced.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use oie_core::{is_root_relation, Dependency, OieError, ParsedSentence, Relation, RelationLabels, Result};

use crate::token::{is_noun_tag, is_verb_tag, Edge, Phrase, PhraseKind, Token, Unit};

/// Incoming relation reported for the root node
pub const ROOT_RELATION: &str = "ROOT";

/// Auxiliary verbs that never join a verb group or a predicate
pub const DO_SUPPORT: [&str; 3] = ["do", "did", "does"];

/// Mutable dependency tree of one clause
#[derive(Debug, Clone)]
pub struct DependencyTree {
    units: BTreeMap<usize, Unit>,
    edges: BTreeMap<usize, Edge>,
    root: usize,
    labels: Arc<RelationLabels>,
    noun_phrases: Vec<Phrase>,
}

impl DependencyTree {
    /// Build a tree from tokens (keyed by their local index) and
    /// labeled dependencies
    pub fn new(
        tokens: Vec<Token>,
        dependencies: &[Dependency],
        labels: Arc<RelationLabels>,
    ) -> Result<Self> {
        let units: BTreeMap<usize, Unit> = tokens
            .into_iter()
            .map(|t| (t.index, Unit::Token(t)))
            .collect();
        let mut edges = BTreeMap::new();
        let mut root = None;

        for dep in dependencies {
            if !units.contains_key(&dep.dependent) {
                return Err(OieError::MalformedInput(format!(
                    "dependency references missing token {}",
                    dep.dependent
                )));
            }
            if is_root_relation(&dep.relation) {
                if root.replace(dep.dependent).is_some() {
                    return Err(OieError::MalformedInput(
                        "more than one root dependency".to_string(),
                    ));
                }
                continue;
            }
            if !units.contains_key(&dep.governor) {
                return Err(OieError::MalformedInput(format!(
                    "dependency references missing governor {}",
                    dep.governor
                )));
            }
            let edge = Edge::new(dep.governor, dep.relation.clone());
            if edges.insert(dep.dependent, edge).is_some() {
                return Err(OieError::MalformedInput(format!(
                    "token {} has more than one governor",
                    dep.dependent
                )));
            }
        }

        let root = root
            .ok_or_else(|| OieError::MalformedInput("no root dependency".to_string()))?;

        Ok(Self {
            units,
            edges,
            root,
            labels,
            noun_phrases: Vec::new(),
        })
    }

    /// Build a tree straight from a parse; original indices equal local ones
    pub fn from_parsed(parsed: &ParsedSentence, labels: Arc<RelationLabels>) -> Result<Self> {
        let tokens = parsed
            .tokens
            .iter()
            .enumerate()
            .map(|(i, t)| Token::new(t.word.clone(), t.pos.clone(), i + 1))
            .collect();
        Self::new(tokens, &parsed.dependencies, labels)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn labels(&self) -> &RelationLabels {
        &self.labels
    }

    pub fn shared_labels(&self) -> Arc<RelationLabels> {
        Arc::clone(&self.labels)
    }

    pub fn root(&self) -> usize {
        self.root
    }

    /// Number of nodes; a phrase counts once
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Number of tokens with phrases expanded
    pub fn token_count(&self) -> usize {
        self.units.values().map(|u| u.tokens().len()).sum()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.units.contains_key(&index)
    }

    pub fn unit(&self, index: usize) -> Option<&Unit> {
        self.units.get(&index)
    }

    pub fn unit_mut(&mut self, index: usize) -> Option<&mut Unit> {
        self.units.get_mut(&index)
    }

    /// Nodes in clause order
    pub fn units(&self) -> impl DoubleEndedIterator<Item = (usize, &Unit)> {
        self.units.iter().map(|(i, u)| (*i, u))
    }

    pub fn indices(&self) -> Vec<usize> {
        self.units.keys().copied().collect()
    }

    pub fn word(&self, index: usize) -> String {
        self.units.get(&index).map(|u| u.word()).unwrap_or_default()
    }

    pub fn pos(&self, index: usize) -> &str {
        self.units.get(&index).map(|u| u.pos()).unwrap_or("")
    }

    /// Surface text of the clause
    pub fn text(&self) -> String {
        self.units
            .values()
            .map(|u| u.word())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Clones of the units at `indices`, in clause order
    pub fn ordered_units(&self, indices: &[usize]) -> Vec<Unit> {
        let set: BTreeSet<usize> = indices.iter().copied().collect();
        set.iter()
            .filter_map(|i| self.units.get(i).cloned())
            .collect()
    }

    /// Nearest remaining node before `index`
    pub fn preceding(&self, index: usize) -> Option<usize> {
        self.units.range(..index).next_back().map(|(i, _)| *i)
    }

    /// Nearest remaining node after `index`
    pub fn following(&self, index: usize) -> Option<usize> {
        self.units
            .range(index.saturating_add(1)..)
            .next()
            .map(|(i, _)| *i)
    }

    /// Whether a comma lies strictly between two positions
    pub fn has_comma_between(&self, from: usize, to: usize) -> bool {
        if to <= from + 1 {
            return false;
        }
        self.units.range(from + 1..to).any(|(_, u)| u.is_comma())
    }

    /// Merged noun phrases recorded on this tree
    pub fn noun_phrases(&self) -> &[Phrase] {
        &self.noun_phrases
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    pub fn parent(&self, index: usize) -> Option<usize> {
        self.edges
            .get(&index)
            .map(|e| e.governor)
            .filter(|g| self.units.contains_key(g))
    }

    /// Children in clause order
    pub fn children(&self, index: usize) -> Vec<usize> {
        self.edges
            .iter()
            .filter(|(dep, e)| e.governor == index && self.units.contains_key(dep))
            .map(|(dep, _)| *dep)
            .collect()
    }

    /// Label of the edge into `index`; "ROOT" for the root, `None` when
    /// the node is detached
    pub fn incoming_relation(&self, index: usize) -> Option<&str> {
        if !self.units.contains_key(&index) {
            return None;
        }
        if index == self.root {
            return Some(ROOT_RELATION);
        }
        let edge = self.edges.get(&index)?;
        if self.units.contains_key(&edge.governor) {
            Some(edge.relation.as_str())
        } else {
            None
        }
    }

    pub fn outgoing_relations(&self, index: usize) -> Vec<&str> {
        self.children(index)
            .into_iter()
            .filter_map(|c| self.edges.get(&c).map(|e| e.relation.as_str()))
            .collect()
    }

    pub fn incoming_is(&self, index: usize, relation: Relation) -> bool {
        self.incoming_relation(index)
            .map(|r| self.labels.is(relation, r))
            .unwrap_or(false)
    }

    pub fn incoming_is_any(&self, index: usize, relations: &[Relation]) -> bool {
        self.incoming_relation(index)
            .map(|r| self.labels.is_any(relations, r))
            .unwrap_or(false)
    }

    pub fn children_with(&self, index: usize, relation: Relation) -> Vec<usize> {
        self.children(index)
            .into_iter()
            .filter(|c| self.incoming_is(*c, relation))
            .collect()
    }

    pub fn has_child(&self, index: usize, relation: Relation) -> bool {
        !self.children_with(index, relation).is_empty()
    }

    /// Coordinated conjuncts of a node, following chained conjunct edges
    pub fn conjuncts(&self, index: usize) -> Vec<usize> {
        let mut found = BTreeSet::new();
        let mut queue = VecDeque::from([index]);
        while let Some(node) = queue.pop_front() {
            for child in self.children_with(node, Relation::Conjunct) {
                if child != index && found.insert(child) {
                    queue.push_back(child);
                }
            }
        }
        found.into_iter().collect()
    }

    /// Span covering a coordination: a single node stays alone, several
    /// nodes expand to every remaining index between the first and last
    pub fn build_conjunction(&self, nodes: &[usize]) -> Vec<usize> {
        let (Some(min), Some(max)) = (nodes.iter().min(), nodes.iter().max()) else {
            return Vec::new();
        };
        if min == max {
            return vec![*min];
        }
        self.units.range(*min..=*max).map(|(i, _)| *i).collect()
    }

    /// Nominal subjects of a verb plus their conjuncts. A conjunct verb
    /// without its own subject shares its governor's.
    pub fn subjects(&self, index: usize) -> Vec<usize> {
        let mut current = index;
        for _ in 0..=self.units.len() {
            let subject = self.children(current).into_iter().find(|c| {
                self.incoming_is_any(*c, &[Relation::Subject, Relation::PassiveSubject])
            });
            if let Some(subject) = subject {
                let mut subjects = vec![subject];
                subjects.extend(self.conjuncts(subject));
                return subjects;
            }
            match self.parent(current) {
                Some(parent) if self.incoming_is(current, Relation::Conjunct) => current = parent,
                _ => break,
            }
        }
        Vec::new()
    }

    /// Direct objects of a verb plus their conjuncts
    pub fn objects(&self, index: usize) -> Vec<usize> {
        let mut objects = Vec::new();
        for object in self.children_with(index, Relation::DirectObject) {
            objects.push(object);
            objects.extend(self.conjuncts(object));
        }
        objects
    }

    /// All nodes under `index` (inclusive), in clause order. Descent stops
    /// at children whose incoming relation is in `exclusion`.
    pub fn subtree(&self, index: usize, exclusion: &[Relation]) -> Vec<usize> {
        if !self.units.contains_key(&index) {
            return Vec::new();
        }
        let mut found = BTreeSet::new();
        let mut stack = vec![index];
        while let Some(node) = stack.pop() {
            if !found.insert(node) {
                continue;
            }
            for child in self.children(node) {
                if !exclusion.is_empty() && self.incoming_is_any(child, exclusion) {
                    continue;
                }
                stack.push(child);
            }
        }
        found.into_iter().collect()
    }

    /// The unique member of `span` whose governor lies outside it
    pub fn phrase_head(&self, span: &[usize]) -> Option<usize> {
        if span.iter().any(|i| !self.units.contains_key(i)) {
            return None;
        }
        let set: BTreeSet<usize> = span.iter().copied().collect();
        let heads: Vec<usize> = set
            .iter()
            .copied()
            .filter(|i| match self.parent(*i) {
                Some(p) => !set.contains(&p),
                None => true,
            })
            .collect();
        match heads.as_slice() {
            [head] => Some(*head),
            _ => None,
        }
    }

    /// Preposition word of a prepositional modifier
    pub fn preposition_of(&self, index: usize) -> Option<String> {
        if self.labels.is_case_marked() {
            self.children_with(index, Relation::CaseMarker)
                .first()
                .map(|c| self.word(*c))
        } else {
            self.units.get(&index).map(|u| u.word())
        }
    }

    /// Gerund introducing a nominal modifier ("animals including tigers"):
    /// the gerund case marker, or the preposition-headed modifier itself
    pub fn gerund_marker(&self, index: usize) -> Option<usize> {
        if self.labels.is_case_marked() {
            self.children_with(index, Relation::CaseMarker)
                .into_iter()
                .find(|c| self.pos(*c) == "VBG")
        } else if self.pos(index) == "VBG" {
            Some(index)
        } else {
            None
        }
    }

    /// Grow a single node into its full noun phrase: determiners,
    /// modifiers, numerals, compounds, possessives and a following
    /// "of" phrase
    pub fn expand_noun_phrase(&self, index: usize) -> Vec<usize> {
        let mut span = BTreeSet::from([index]);
        for child in self.children(index) {
            let Some(relation) = self.incoming_relation(child) else {
                continue;
            };
            if self.labels.is(Relation::NounModifier, relation) {
                span.extend(self.subtree(child, &[]));
            } else if self.labels.is(Relation::NominalModifier, relation)
                && self
                    .preposition_of(child)
                    .map(|p| p.eq_ignore_ascii_case("of"))
                    .unwrap_or(false)
            {
                span.extend(self.subtree(child, &[]));
            }
        }
        span.into_iter().collect()
    }

    // ========================================================================
    // Deletion
    // ========================================================================

    /// Remove nodes and their edges, then drop a stray comma left in front
    /// of the gap. The comma after the gap goes too when requested or when
    /// nothing precedes the gap.
    pub fn delete_subtree(&mut self, nodes: &[usize], drop_following_comma: bool) {
        let present: BTreeSet<usize> = nodes
            .iter()
            .copied()
            .filter(|i| self.units.contains_key(i))
            .collect();
        if present.is_empty() {
            return;
        }

        let mut covered = Vec::new();
        for node in &present {
            if let Some(unit) = self.units.remove(node) {
                covered.extend(unit.tokens().iter().map(|t| t.index));
            }
            self.edges.remove(node);
        }
        self.noun_phrases.retain(|p| !present.contains(&p.head));

        let (Some(first), Some(last)) = (covered.iter().min(), covered.iter().max()) else {
            return;
        };
        let (first, last) = (*first, *last);

        let before = self.preceding(first);
        if let Some(before) = before {
            self.remove_stray_comma(before);
        }
        if drop_following_comma || before.is_none() {
            if let Some(after) = self.following(last) {
                self.remove_stray_comma(after);
            }
        }
    }

    fn remove_stray_comma(&mut self, index: usize) -> bool {
        let is_comma = self.units.get(&index).map(|u| u.is_comma()).unwrap_or(false);
        if is_comma && self.children(index).is_empty() {
            self.units.remove(&index);
            self.edges.remove(&index);
            return true;
        }
        false
    }

    // ========================================================================
    // Phrase merging
    // ========================================================================

    /// Merge noun chunks into phrases; degenerate spans are skipped
    pub fn merge_noun_phrases(&mut self, spans: &[Vec<usize>]) -> usize {
        let mut merged = 0;
        for span in spans {
            if span.len() < 2 {
                continue;
            }
            if self.merge_noun_phrase(span) {
                merged += 1;
            } else {
                tracing::debug!("Skipped noun chunk {:?}", span);
            }
        }
        merged
    }

    fn merge_noun_phrase(&mut self, span: &[usize]) -> bool {
        let members: BTreeSet<usize> = span.iter().copied().collect();
        if members
            .iter()
            .any(|i| !matches!(self.units.get(i), Some(Unit::Token(_))))
        {
            return false;
        }
        let span: Vec<usize> = members.iter().copied().collect();
        let Some(head) = self.phrase_head(&span) else {
            return false;
        };
        // A non-head member with outside children cannot be folded away
        let leaks = span
            .iter()
            .filter(|m| **m != head)
            .any(|m| self.children(*m).iter().any(|c| !members.contains(c)));
        if leaks {
            return false;
        }

        let removed_edges = span
            .iter()
            .filter(|m| **m != head)
            .filter_map(|m| self.edges.get(m).map(|e| (*m, e.clone())))
            .collect();
        let tokens = self.member_tokens(&span);
        let phrase = Phrase::new(PhraseKind::Noun, tokens, head, removed_edges);
        self.collapse(&phrase);
        self.noun_phrases.push(phrase);
        true
    }

    fn member_tokens(&self, span: &[usize]) -> Vec<Token> {
        span.iter()
            .filter_map(|m| match self.units.get(m) {
                Some(Unit::Token(t)) => Some(t.clone()),
                _ => None,
            })
            .collect()
    }

    fn collapse(&mut self, phrase: &Phrase) {
        for member in &phrase.members {
            if member.index != phrase.head {
                self.units.remove(&member.index);
                self.edges.remove(&member.index);
            }
        }
        self.units
            .insert(phrase.head, Unit::Phrase(phrase.clone()));
    }

    /// Restore a phrase to its member tokens and displaced edges
    pub fn unmerge(&mut self, head: usize) -> bool {
        let Some(Unit::Phrase(phrase)) = self.units.get(&head).cloned() else {
            return false;
        };
        for token in phrase.members {
            self.units.insert(token.index, Unit::Token(token));
        }
        for (dependent, edge) in phrase.removed_edges {
            self.edges.insert(dependent, edge);
        }
        true
    }

    /// Expand every recorded noun phrase back into tokens
    pub fn stretch_noun_phrases(&mut self) {
        self.noun_phrases
            .retain(|p| self.units.contains_key(&p.head));
        let heads: Vec<usize> = self.noun_phrases.iter().map(|p| p.head).collect();
        for head in heads {
            let is_noun_phrase = matches!(
                self.units.get(&head),
                Some(Unit::Phrase(p)) if p.kind == PhraseKind::Noun
            );
            if is_noun_phrase {
                self.unmerge(head);
            }
        }
    }

    /// Collapse recorded noun phrases whose members are all present again
    pub fn shrink_noun_phrases(&mut self) {
        let phrases = self.noun_phrases.clone();
        for phrase in &phrases {
            let stretched = phrase
                .members
                .iter()
                .all(|m| matches!(self.units.get(&m.index), Some(Unit::Token(_))));
            if stretched {
                self.collapse(phrase);
            }
        }
    }

    /// Merge a verb group into one verb phrase headed by its root member.
    ///
    /// At most one other member may have children outside the group; those
    /// children are re-attached to the head. Nominal members abort the merge.
    pub fn merge_verb_phrase(&mut self, members: &[usize]) -> bool {
        let set: BTreeSet<usize> = members.iter().copied().collect();
        let span: Vec<usize> = set.iter().copied().collect();
        if span.len() < 2
            || span
                .iter()
                .any(|i| !matches!(self.units.get(i), Some(Unit::Token(_))))
        {
            return false;
        }
        let Some(head) = self.phrase_head(&span) else {
            return false;
        };
        if span
            .iter()
            .any(|m| *m != head && (is_noun_tag(self.pos(*m)) || self.pos(*m).starts_with("PRP")))
        {
            return false;
        }

        let outward: Vec<usize> = span
            .iter()
            .copied()
            .filter(|m| *m != head && self.children(*m).iter().any(|c| !set.contains(c)))
            .collect();
        if outward.len() > 1 {
            return false;
        }

        let mut removed_edges: Vec<(usize, Edge)> = span
            .iter()
            .filter(|m| **m != head)
            .filter_map(|m| self.edges.get(m).map(|e| (*m, e.clone())))
            .collect();
        if let Some(inner) = outward.first() {
            for child in self.children(*inner) {
                if set.contains(&child) {
                    continue;
                }
                if let Some(edge) = self.edges.get(&child).cloned() {
                    self.edges
                        .insert(child, Edge::new(head, edge.relation.clone()));
                    removed_edges.push((child, edge));
                }
            }
        }

        let tokens = self.member_tokens(&span);
        let phrase = Phrase::new(PhraseKind::Verb, tokens, head, removed_edges);
        self.collapse(&phrase);
        true
    }

    /// Find and merge verb groups: a verb with its subjectless open
    /// complement verb ("started to learn") and its particles ("gave up")
    pub fn merge_verb_phrases(&mut self) -> usize {
        let verbs: Vec<usize> = self
            .units
            .iter()
            .filter(|(_, u)| !u.is_phrase() && u.is_verb())
            .map(|(i, _)| *i)
            .collect();

        let mut groups = Vec::new();
        for verb in verbs {
            let mut group = BTreeSet::new();
            for child in self.children(verb) {
                let Some(relation) = self.incoming_relation(child) else {
                    continue;
                };
                if self.labels.is(Relation::OpenComplement, relation)
                    && child > verb
                    && is_verb_tag(self.pos(child))
                    && self.subjects(child).is_empty()
                    && !self.has_comma_between(verb, child)
                {
                    group.extend(self.units.range(verb..=child).map(|(i, _)| *i));
                } else if self.labels.is(Relation::Particle, relation)
                    && !DO_SUPPORT.contains(&self.word(child).to_lowercase().as_str())
                {
                    group.insert(child);
                }
            }
            if !group.is_empty() {
                group.insert(verb);
                groups.push(group.into_iter().collect::<Vec<_>>());
            }
        }

        let mut merged = 0;
        for group in groups {
            if self.merge_verb_phrase(&group) {
                merged += 1;
            } else {
                tracing::debug!("Skipped verb group {:?}", group);
            }
        }
        merged
    }
}
