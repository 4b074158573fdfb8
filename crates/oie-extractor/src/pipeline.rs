//! Extraction pipeline facade
//!
//! `OpenIe` wires the sentence builder, the restructurer and the tuple
//! extractor together and applies the configured options around them.

use std::sync::Arc;

use oie_core::{
    AppConfig, DecompositionStrategy, DependencyParser, Element, ParsedSentence, RelationLabels,
    Result, Tuple,
};

use crate::adverbial::AdverbialMap;
use crate::extraction::{adverbial_element, TupleExtractor};
use crate::restructure::SentenceRestructurer;
use crate::sentence::{Sentence, SentenceBuilder};
use crate::{ClauseClassifier, NounChunker};

/// Sentence in, tuples out
#[derive(Debug)]
pub struct OpenIe {
    builder: SentenceBuilder,
    extractor: TupleExtractor,
    strategy: DecompositionStrategy,
    two_tier_adverbials: bool,
}

impl OpenIe {
    /// Create a pipeline with default options
    pub fn new(parser: Arc<dyn DependencyParser>, labels: RelationLabels) -> Self {
        Self {
            builder: SentenceBuilder::new(parser, labels),
            extractor: TupleExtractor::default(),
            strategy: DecompositionStrategy::default(),
            two_tier_adverbials: false,
        }
    }

    /// Create a pipeline from application configuration
    pub fn from_config(parser: Arc<dyn DependencyParser>, config: &AppConfig) -> Self {
        let extraction = &config.extraction;
        let mut builder = SentenceBuilder::new(parser, config.parser.relation_labels())
            .with_verb_merging(extraction.merge_verb_phrases);
        if !extraction.chunk_noun_phrases {
            builder = builder.with_chunker(None);
        }

        Self {
            builder,
            extractor: TupleExtractor::default(),
            strategy: extraction.strategy,
            two_tier_adverbials: extraction.two_tier_adverbials,
        }
    }

    pub fn with_strategy(mut self, strategy: DecompositionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_two_tier_adverbials(mut self, enabled: bool) -> Self {
        self.two_tier_adverbials = enabled;
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn ClauseClassifier>) -> Self {
        self.extractor = TupleExtractor::new(classifier);
        self
    }

    pub fn with_chunker(mut self, chunker: Option<Arc<dyn NounChunker>>) -> Self {
        self.builder = self.builder.with_chunker(chunker);
        self
    }

    pub fn strategy(&self) -> DecompositionStrategy {
        self.strategy
    }

    pub fn builder(&self) -> &SentenceBuilder {
        &self.builder
    }

    /// Decompose a sentence into its clause forest
    pub fn decompose(&self, parsed: &ParsedSentence) -> Result<Sentence> {
        let mut sentence = self.builder.from_parsed(parsed)?;
        SentenceRestructurer::new(&self.builder, self.strategy).restructure(&mut sentence)?;
        Ok(sentence)
    }

    /// Extract tuples from one parsed sentence
    pub fn extract(&self, parsed: &ParsedSentence) -> Result<Vec<Tuple>> {
        let mut sentence = self.builder.from_parsed(parsed)?;

        let extra = if self.two_tier_adverbials {
            let removed = sentence.tree.extra_adverbials();
            sentence.refresh_text();
            by_original_verb(&sentence, removed)
        } else {
            Vec::new()
        };

        SentenceRestructurer::new(&self.builder, self.strategy).restructure(&mut sentence)?;
        let mut tuples = self.extractor.extract(&sentence);

        if !extra.is_empty() {
            attach_extra_adverbials(&mut tuples, &extra);
        }
        annotate(&mut tuples, parsed);

        tracing::debug!(
            "Extracted {} tuples from '{}'",
            tuples.len(),
            sentence.text
        );
        Ok(tuples)
    }
}

/// Adverbial elements keyed by the original index of their verb
fn by_original_verb(sentence: &Sentence, removed: AdverbialMap) -> Vec<(usize, Vec<Element>)> {
    removed
        .into_iter()
        .filter_map(|(verb, spans)| {
            let original = sentence.tree.unit(verb).and_then(|u| u.original())?;
            let elements: Vec<Element> = spans.iter().filter_map(|s| adverbial_element(s)).collect();
            Some((original, elements))
        })
        .collect()
}

fn attach_extra_adverbials(tuples: &mut [Tuple], extra: &[(usize, Vec<Element>)]) {
    for tuple in tuples {
        for (verb, elements) in extra {
            if tuple.predicate.indices.contains(verb) {
                tuple.adverbials.extend(elements.iter().cloned());
            }
        }
        attach_extra_adverbials(&mut tuple.complement, extra);
    }
}

/// Copy entity types and coreference targets onto matching elements
fn annotate(tuples: &mut [Tuple], parsed: &ParsedSentence) {
    if parsed.entities.is_empty() && parsed.coreferences.is_empty() {
        return;
    }
    for tuple in tuples {
        for element in tuple.elements_mut() {
            if let Some(entity) = parsed
                .entities
                .iter()
                .find(|e| e.text.eq_ignore_ascii_case(&element.word))
            {
                element.ne_type = Some(entity.label.clone());
            }
            if let Some(mention) = parsed.coreferences.iter().find(|m| {
                !element.indices.is_empty() && element.indices.iter().copied().eq(m.start..=m.end)
            }) {
                element.coreference = Some(mention.target.clone());
            }
        }
        annotate(&mut tuple.complement, parsed);
    }
}
