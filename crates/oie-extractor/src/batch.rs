//! Concurrent batch extraction
//!
//! Sentences are independent, so a batch fans out one blocking task per
//! sentence behind a semaphore and collects the outcomes in input order.
//! A failing sentence yields an `Err` in its own slot and never aborts
//! the rest of the batch.

use std::sync::Arc;

use futures::future::join_all;
use oie_core::{OieError, ParsedSentence, Result, Tuple};
use tokio::sync::Semaphore;

use crate::pipeline::OpenIe;

/// Result of extracting one sentence of a batch
pub type SentenceOutcome = Result<Vec<Tuple>>;

/// Extract tuples from every sentence, at most `max_concurrency` at a time.
///
/// Outcomes are returned in the order of `sentences`.
pub async fn extract_batch(
    openie: Arc<OpenIe>,
    sentences: Vec<ParsedSentence>,
    max_concurrency: usize,
) -> Vec<SentenceOutcome> {
    let total = sentences.len();
    let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));
    tracing::info!(
        "Extracting {} sentences with concurrency {}",
        total,
        max_concurrency.max(1)
    );

    let tasks = sentences.into_iter().enumerate().map(|(position, sentence)| {
        extract_one(
            Arc::clone(&openie),
            Arc::clone(&semaphore),
            position,
            sentence,
        )
    });
    let outcomes = join_all(tasks).await;

    let failed = outcomes.iter().filter(|o| o.is_err()).count();
    let tuples: usize = outcomes.iter().flatten().map(Vec::len).sum();
    tracing::info!(
        "Batch complete: {} sentences, {} failed, {} tuples",
        total,
        failed,
        tuples
    );
    outcomes
}

async fn extract_one(
    openie: Arc<OpenIe>,
    semaphore: Arc<Semaphore>,
    position: usize,
    sentence: ParsedSentence,
) -> SentenceOutcome {
    let _permit = semaphore
        .acquire_owned()
        .await
        .map_err(|e| OieError::Other(anyhow::anyhow!("semaphore closed: {}", e)))?;

    let outcome = tokio::task::spawn_blocking(move || openie.extract(&sentence))
        .await
        .unwrap_or_else(|e| {
            Err(OieError::Other(anyhow::anyhow!(
                "extraction task failed: {}",
                e
            )))
        });

    if let Err(e) = &outcome {
        tracing::warn!("Skipping sentence {}: {}", position, e);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use oie_core::RelationLabels;

    use crate::test_support::{parsed, FixtureParser};

    fn openie() -> Arc<OpenIe> {
        Arc::new(OpenIe::new(
            Arc::new(FixtureParser::new()),
            RelationLabels::corenlp(),
        ))
    }

    fn clause(subject: &str, verb: &str) -> ParsedSentence {
        parsed(
            &format!("{} {}", subject, verb),
            "PRP VBD",
            &[(0, 2, "ROOT"), (2, 1, "nsubj")],
        )
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let sentences = vec![
            clause("he", "left"),
            clause("she", "stayed"),
            clause("they", "slept"),
        ];
        let outcomes = extract_batch(openie(), sentences, 2).await;

        let predicates: Vec<String> = outcomes
            .iter()
            .map(|o| o.as_ref().unwrap()[0].predicate.word.clone())
            .collect();
        assert_eq!(predicates, vec!["left", "stayed", "slept"]);
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let broken = parsed("he left", "PRP VBD", &[(2, 1, "nsubj")]);
        let sentences = vec![clause("he", "left"), broken, clause("she", "stayed")];
        let outcomes = extract_batch(openie(), sentences, 0).await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_ok());
        assert!(matches!(outcomes[1], Err(OieError::MalformedInput(_))));
        assert_eq!(outcomes[2].as_ref().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let outcomes = extract_batch(openie(), Vec::new(), 4).await;
        assert!(outcomes.is_empty());
    }
}
