//! Query pipeline: local gate first, full-corpus generation as the fallback
//!
//! ```text
//! question -> LocalGate -> FastPath | Confident  => local answer
//!                       -> NoMatch -> CorpusSearcher -> PromptBuilder -> LlmProvider
//! ```

use std::sync::Arc;

use crate::config::RagConfig;
use crate::embeddings::Embedder;
use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::ingestion::{Chunker, CorpusLoader, FsCorpusLoader, IndexRefresher};
use crate::providers::{
    build_embedding_provider, build_llm, LlmProvider, LocalVectorIndex, VectorIndex,
};
use crate::retrieval::{CorpusSearcher, GateOutcome, IntentMatcher, LocalGate};
use crate::types::{Answer, AnswerRoute, RetrievalResult};

/// Returned when neither the local index nor the corpus has relevant content
pub const FALLBACK_MESSAGE: &str = "Sorry, I can't help with that.\n\
My knowledge is focused on helping you set up professional Python projects the recommended way.";

/// Long-lived collaborators and settings, built once at startup
pub struct PipelineContext {
    pub config: RagConfig,
    pub embedder: Embedder,
    pub index: Arc<dyn VectorIndex>,
    pub llm: Arc<dyn LlmProvider>,
    pub corpus: Arc<dyn CorpusLoader>,
    pub intents: IntentMatcher,
}

impl PipelineContext {
    /// Build every collaborator from configuration
    pub fn from_config(config: RagConfig) -> Result<Self> {
        let embedder = Embedder::new(build_embedding_provider(&config.embeddings)?);
        let index: Arc<dyn VectorIndex> = Arc::new(LocalVectorIndex::open(
            &config.vector_db.storage_path,
            &config.vector_db.collection,
            embedder.clone(),
        )?);
        let llm = build_llm(&config.llm)?;
        let corpus: Arc<dyn CorpusLoader> = Arc::new(FsCorpusLoader::new(
            &config.corpus.root,
            &config.corpus.extension,
        ));

        Ok(Self {
            config,
            embedder,
            index,
            llm,
            corpus,
            intents: IntentMatcher::default(),
        })
    }

    /// Refresher over the curated index root, sharing this context's index
    pub fn refresher(&self) -> IndexRefresher {
        IndexRefresher::for_config(&self.config, Arc::clone(&self.index))
    }
}

/// Runs one question through the pipeline; holds no per-query state
pub struct QueryPipeline {
    gate: LocalGate,
    searcher: CorpusSearcher,
    prompts: PromptBuilder,
    llm: Arc<dyn LlmProvider>,
    local_label: String,
}

impl QueryPipeline {
    pub fn new(ctx: &PipelineContext) -> Self {
        let retrieval = &ctx.config.retrieval;
        let chunking = &ctx.config.chunking;
        let chunker: Arc<dyn Chunker> = chunking.corpus_strategy.build(chunking).into();

        Self {
            gate: LocalGate::new(
                Arc::clone(&ctx.index),
                ctx.intents.clone(),
                retrieval.confidence_threshold,
                retrieval.local_top_k,
            ),
            searcher: CorpusSearcher::new(
                Arc::clone(&ctx.corpus),
                chunker,
                ctx.embedder.clone(),
                retrieval.top_k,
            ),
            prompts: PromptBuilder::from_config(&ctx.config.prompt),
            llm: Arc::clone(&ctx.llm),
            local_label: retrieval.local_label.clone(),
        }
    }

    /// Answer a question
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        match self.gate.evaluate(question).await? {
            GateOutcome::FastPath { canned, results, .. } => {
                let mut parts = vec![canned];
                parts.extend(texts(results));
                return Ok(self.local_answer(parts, AnswerRoute::FastPath));
            }
            GateOutcome::Confident(results) => {
                return Ok(self.local_answer(texts(results).collect(), AnswerRoute::LocalIndex));
            }
            GateOutcome::NoMatch => {}
        }

        let ranked = match self.searcher.retrieve(question).await {
            Ok(ranked) => ranked,
            Err(e) if e.is_recoverable() => {
                tracing::warn!("No relevant content found ({}). Returning fallback message.", e);
                return Ok(Answer::new(FALLBACK_MESSAGE, AnswerRoute::Fallback));
            }
            Err(e) => return Err(e),
        };

        if ranked.is_empty() {
            tracing::warn!("No relevant content found. Returning fallback message.");
            return Ok(Answer::new(FALLBACK_MESSAGE, AnswerRoute::Fallback));
        }

        tracing::info!("Using {} chunks for prompt context", ranked.len());
        let chunk_texts: Vec<&str> = ranked.iter().map(|r| r.chunk.text.as_str()).collect();
        let prompt = self.prompts.build(question, &chunk_texts);
        let rendered = prompt.to_string();

        tracing::info!(
            "Prompt length: {} characters (~{} tokens)",
            rendered.chars().count(),
            prompt.estimated_tokens()
        );
        tracing::debug!("Prompt sent to model:\n{}", rendered);

        let output = self.llm.generate(&rendered).await?;
        if output.trim().is_empty() {
            return Err(Error::generation(format!(
                "{} returned an empty answer",
                self.llm.name()
            )));
        }

        tracing::info!("Received response from model");
        Ok(Answer::new(output, AnswerRoute::Generated))
    }

    fn local_answer(&self, parts: Vec<String>, route: AnswerRoute) -> Answer {
        let text = format!(
            "### Local results from {}:\n\n{}",
            self.local_label,
            parts.join("\n\n")
        );
        Answer::new(text, route)
    }
}

fn texts(results: Vec<RetrievalResult>) -> impl Iterator<Item = String> {
    results.into_iter().map(|r| r.chunk.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::HashingEmbedder;
    use crate::types::{Chunk, IndexedRecord};
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records how often it was called and replies with a fixed text
    struct RecordingLlm {
        reply: std::result::Result<String, String>,
        calls: AtomicUsize,
        last_prompt: parking_lot::Mutex<Option<String>>,
    }

    impl RecordingLlm {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
                last_prompt: parking_lot::Mutex::new(None),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                calls: AtomicUsize::new(0),
                last_prompt: parking_lot::Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmProvider for RecordingLlm {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock() = Some(prompt.to_string());
            self.reply.clone().map_err(Error::GenerationFailure)
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "recording"
        }

        fn model(&self) -> &str {
            "fake"
        }
    }

    /// Index that fails every call
    struct DownIndex;

    #[async_trait]
    impl VectorIndex for DownIndex {
        async fn upsert(&self, _records: &[IndexedRecord]) -> Result<usize> {
            Err(Error::dependency("vector-index", "unreachable"))
        }

        async fn query(&self, _text: &str, _top_k: usize) -> Result<Vec<RetrievalResult>> {
            Err(Error::dependency("vector-index", "unreachable"))
        }

        async fn count(&self) -> Result<usize> {
            Err(Error::dependency("vector-index", "unreachable"))
        }

        fn name(&self) -> &str {
            "down"
        }
    }

    fn context(corpus_root: &Path, llm: Arc<RecordingLlm>) -> PipelineContext {
        let mut config = RagConfig::default();
        config.corpus.root = corpus_root.to_path_buf();
        config.prompt.guidelines_path = corpus_root.join("GUIDELINES.txt");

        let embedder = Embedder::new(Arc::new(HashingEmbedder::new(384)));
        PipelineContext {
            index: Arc::new(LocalVectorIndex::in_memory("project-docs", embedder.clone())),
            corpus: Arc::new(FsCorpusLoader::new(corpus_root, "md")),
            embedder,
            llm,
            intents: IntentMatcher::default(),
            config,
        }
    }

    #[tokio::test]
    async fn test_fast_path_project_question() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("A.md"),
            "Create a new project. Clone an existing repo.",
        )
        .unwrap();
        let llm = RecordingLlm::replying("unused");
        let pipeline = QueryPipeline::new(&context(dir.path(), llm.clone()));

        let answer = pipeline.answer("How do I start a new project?").await.unwrap();

        assert_eq!(answer.route, AnswerRoute::FastPath);
        assert!(answer.text.starts_with("### Local results from pro-analytics-01:\n\n"));
        assert!(answer.text.contains("New Project"));
        assert!(answer.text.contains("Existing Repo"));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_corpus_returns_fallback_without_model_call() {
        let dir = tempfile::tempdir().unwrap();
        let llm = RecordingLlm::replying("unused");
        let pipeline = QueryPipeline::new(&context(dir.path(), llm.clone()));

        let answer = pipeline.answer("What is the capital of France?").await.unwrap();

        assert_eq!(answer.route, AnswerRoute::Fallback);
        assert_eq!(answer.text, FALLBACK_MESSAGE);
        assert!(answer.text.contains("can't help with that"));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_confident_local_match_skips_full_path() {
        let dir = tempfile::tempdir().unwrap();
        let llm = RecordingLlm::replying("unused");
        let ctx = context(dir.path(), llm.clone());

        let chunk = Chunk::new("setup.md", "install git with the package manager", 0);
        ctx.index
            .upsert(&[IndexedRecord::from_chunk(&chunk, vec!["base".into()])])
            .await
            .unwrap();

        let pipeline = QueryPipeline::new(&ctx);
        let answer = pipeline.answer("install git with the package manager").await.unwrap();

        assert_eq!(answer.route, AnswerRoute::LocalIndex);
        assert_eq!(
            answer.text,
            "### Local results from pro-analytics-01:\n\ninstall git with the package manager"
        );
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_full_path_generates_from_ranked_context() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("venv.md"), "Activate the virtual environment before pip install.").unwrap();
        let llm = RecordingLlm::replying("  Run the activate script.  ");
        let pipeline = QueryPipeline::new(&context(dir.path(), llm.clone()));

        let answer = pipeline.answer("How do I activate the environment?").await.unwrap();

        assert_eq!(answer.route, AnswerRoute::Generated);
        assert_eq!(answer.text, "  Run the activate script.  ");
        assert_eq!(llm.calls(), 1);

        let prompt = llm.last_prompt.lock().clone().unwrap();
        assert!(prompt.starts_with(crate::generation::DEFAULT_GUIDELINES));
        assert!(prompt.contains("Context:\nActivate the virtual environment before pip install."));
        assert!(prompt.ends_with("Question:\nHow do I activate the environment?\n\nAnswer:"));
    }

    #[tokio::test]
    async fn test_blank_model_output_is_generation_failure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "Some guide content about tooling.").unwrap();
        let pipeline = QueryPipeline::new(&context(dir.path(), RecordingLlm::replying("   ")));

        let err = pipeline.answer("Which tools?").await.unwrap_err();
        assert!(matches!(err, Error::GenerationFailure(_)));
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "Some guide content about tooling.").unwrap();
        let pipeline = QueryPipeline::new(&context(dir.path(), RecordingLlm::failing("HTTP 500")));

        let err = pipeline.answer("Which tools?").await.unwrap_err();
        assert!(!err.is_recoverable());
        assert!(matches!(err, Error::GenerationFailure(_)));
    }

    #[tokio::test]
    async fn test_index_outage_is_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let llm = RecordingLlm::replying("unused");
        let mut ctx = context(dir.path(), llm.clone());
        ctx.index = Arc::new(DownIndex);

        let err = QueryPipeline::new(&ctx).answer("Which tools?").await.unwrap_err();
        assert!(matches!(err, Error::DependencyUnavailable { .. }));
        assert_eq!(llm.calls(), 0);
    }
}
