//! Local retrieval gate: intent fast path, then confidence-filtered index lookup

use std::sync::Arc;

use crate::error::Result;
use crate::providers::VectorIndex;
use crate::types::RetrievalResult;

use super::intent::IntentMatcher;

/// What the gate decided for a question
#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    /// An intent rule fired; the confidence filter was not applied
    FastPath {
        rule: &'static str,
        canned: String,
        results: Vec<RetrievalResult>,
    },
    /// The index returned matches within the confidence threshold
    Confident(Vec<RetrievalResult>),
    /// Nothing confident; the full path should run
    NoMatch,
}

/// Keep results whose distance is within `threshold`, preserving order
pub fn filter_confident(results: Vec<RetrievalResult>, threshold: f32) -> Vec<RetrievalResult> {
    results.into_iter().filter(|r| r.distance <= threshold).collect()
}

/// Decides whether the local index can answer without a full corpus scan
pub struct LocalGate {
    index: Arc<dyn VectorIndex>,
    intents: IntentMatcher,
    threshold: f32,
    top_k: usize,
}

impl LocalGate {
    pub fn new(index: Arc<dyn VectorIndex>, intents: IntentMatcher, threshold: f32, top_k: usize) -> Self {
        Self {
            index,
            intents,
            threshold,
            top_k,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Evaluate a question
    ///
    /// An empty index yields `NoMatch` (or a bare canned answer) rather than an error.
    pub async fn evaluate(&self, question: &str) -> Result<GateOutcome> {
        if let Some(rule) = self.intents.match_question(question) {
            tracing::info!("Detected {} query: {}", rule.name, question);
            let results = self.index.query(rule.topic_query, rule.topic_top_k).await?;
            return Ok(GateOutcome::FastPath {
                rule: rule.name,
                canned: rule.response.text().to_string(),
                results,
            });
        }

        if self.index.is_empty().await? {
            tracing::warn!("Local index '{}' is empty", self.index.name());
            return Ok(GateOutcome::NoMatch);
        }

        let results = self.index.query(question, self.top_k).await?;
        let returned = results.len();
        let confident = filter_confident(results, self.threshold);

        if confident.is_empty() {
            tracing::warn!(
                "No confident local match ({} results above distance {})",
                returned,
                self.threshold
            );
            return Ok(GateOutcome::NoMatch);
        }

        tracing::info!("Local retrieval successful: found {} chunks", confident.len());
        Ok(GateOutcome::Confident(confident))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chunk, IndexedRecord};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use proptest::prelude::*;

    /// Returns fixed results and records the queries it received
    struct ScriptedIndex {
        results: Vec<RetrievalResult>,
        queries: Mutex<Vec<(String, usize)>>,
    }

    impl ScriptedIndex {
        fn new(distances: &[f32]) -> Self {
            let results = distances
                .iter()
                .enumerate()
                .map(|(i, d)| RetrievalResult::new(Chunk::new("a.md", format!("chunk {}", i), i), *d))
                .collect();
            Self {
                results,
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl VectorIndex for ScriptedIndex {
        async fn upsert(&self, _records: &[IndexedRecord]) -> Result<usize> {
            Ok(0)
        }

        async fn query(&self, text: &str, top_k: usize) -> Result<Vec<RetrievalResult>> {
            self.queries.lock().push((text.to_string(), top_k));
            Ok(self.results.iter().take(top_k).cloned().collect())
        }

        async fn count(&self) -> Result<usize> {
            Ok(self.results.len())
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn gate(index: Arc<ScriptedIndex>, threshold: f32) -> LocalGate {
        LocalGate::new(index, IntentMatcher::default(), threshold, 3)
    }

    #[tokio::test]
    async fn test_fast_path_bypasses_confidence_filter() {
        let index = Arc::new(ScriptedIndex::new(&[0.99, 0.98]));
        let outcome = gate(index.clone(), 0.75)
            .evaluate("How do I start a new project?")
            .await
            .unwrap();

        match outcome {
            GateOutcome::FastPath { canned, results, .. } => {
                assert!(canned.contains("New Project"));
                assert_eq!(results.len(), 2);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(index.queries.lock()[0], ("project initialization".to_string(), 5));
    }

    #[tokio::test]
    async fn test_confident_results_are_filtered() {
        let index = Arc::new(ScriptedIndex::new(&[0.2, 0.75, 0.9]));
        let outcome = gate(index, 0.75).evaluate("How do I install git?").await.unwrap();

        match outcome {
            GateOutcome::Confident(results) => {
                let distances: Vec<f32> = results.iter().map(|r| r.distance).collect();
                assert_eq!(distances, vec![0.2, 0.75]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_confident_match() {
        let index = Arc::new(ScriptedIndex::new(&[0.8, 0.95]));
        let outcome = gate(index, 0.75).evaluate("What is the weather?").await.unwrap();
        assert_eq!(outcome, GateOutcome::NoMatch);
    }

    #[tokio::test]
    async fn test_empty_index_is_no_match_without_query() {
        let index = Arc::new(ScriptedIndex::new(&[]));
        let outcome = gate(index.clone(), 0.75).evaluate("anything?").await.unwrap();
        assert_eq!(outcome, GateOutcome::NoMatch);
        assert!(index.queries.lock().is_empty());
    }

    #[test]
    fn test_filter_preserves_index_order_on_ties() {
        let results = vec![
            RetrievalResult::new(Chunk::new("b.md", "b", 0), 0.5),
            RetrievalResult::new(Chunk::new("a.md", "a", 0), 0.5),
        ];
        let kept = filter_confident(results, 0.5);
        assert_eq!(kept[0].chunk.source_id, "b.md");
        assert_eq!(kept[1].chunk.source_id, "a.md");
    }

    proptest! {
        #[test]
        fn prop_looser_threshold_never_rejects(
            distances in proptest::collection::vec(0.0f32..1.5, 0..12),
            strict in 0.0f32..1.0,
            slack in 0.0f32..1.0,
        ) {
            let results: Vec<RetrievalResult> = distances
                .iter()
                .enumerate()
                .map(|(i, d)| RetrievalResult::new(Chunk::new("a.md", "t", i), *d))
                .collect();

            let tight = filter_confident(results.clone(), strict);
            let loose = filter_confident(results, strict + slack);

            prop_assert!(loose.len() >= tight.len());
            for kept in &tight {
                prop_assert!(loose.contains(kept));
            }
        }
    }
}
