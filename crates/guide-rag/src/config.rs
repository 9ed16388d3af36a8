//! Configuration for the guide RAG system
//!
//! Values come from `RagConfig::default()`, optionally overlaid by a TOML file,
//! then by environment variables. Everything is resolved once at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::ingestion::ChunkStrategy;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RagConfig {
    /// Deployment environment (gates the public query route)
    pub environment: Environment,
    /// Server configuration
    pub server: ServerConfig,
    /// Corpus locations
    pub corpus: CorpusConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Retrieval thresholds and sizes
    pub retrieval: RetrievalConfig,
    /// Prompt assembly
    pub prompt: PromptConfig,
    /// Language model configuration
    pub llm: LlmConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Vector index configuration
    pub vector_db: VectorDbConfig,
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development: queries are answered
    #[default]
    Dev,
    /// Deployed: the query route answers with a static greeting
    Prod,
}

impl Environment {
    fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "dev" | "development" | "local" => Self::Dev,
            _ => Self::Prod,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Query requests allowed per client IP per hour (0 disables the limit)
    pub rate_limit_per_hour: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
            rate_limit_per_hour: 1,
        }
    }
}

/// Corpus locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Root scanned by the full-corpus path
    pub root: PathBuf,
    /// Root scanned by the index refresh
    pub index_root: PathBuf,
    /// File extension of corpus documents (without the dot)
    pub extension: String,
    /// Base tag applied to every indexed record
    pub collection_tag: String,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("raw_docs"),
            index_root: PathBuf::from("raw_docs").join("pro-analytics-01"),
            extension: "md".to_string(),
            collection_tag: "pro-analytics-01".to_string(),
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Window size of the fixed-length chunker, in characters
    pub max_chunk_length: usize,
    /// Paragraphs of this many characters or fewer are dropped by the paragraph chunker
    pub paragraph_min_length: usize,
    /// Strategy for the full corpus scanned at query time
    pub corpus_strategy: ChunkStrategy,
    /// Strategy for the curated corpus written to the index
    pub index_strategy: ChunkStrategy,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_length: 300,
            paragraph_min_length: 20,
            corpus_strategy: ChunkStrategy::FixedLength,
            index_strategy: ChunkStrategy::Paragraph,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Chunks kept by the full-corpus path
    pub top_k: usize,
    /// Results requested from the index by the local gate
    pub local_top_k: usize,
    /// Maximum distance accepted as a confident local match
    pub confidence_threshold: f32,
    /// Name shown in the header of locally answered responses
    pub local_label: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            local_top_k: 3,
            confidence_threshold: 0.75,
            local_label: "pro-analytics-01".to_string(),
        }
    }
}

/// Prompt assembly configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Maximum context block size, in characters
    pub max_context_length: usize,
    /// Guidelines file; the built-in text is used when it is missing
    pub guidelines_path: PathBuf,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_context_length: 3000,
            guidelines_path: PathBuf::from("raw_docs").join("GUIDELINES.md"),
        }
    }
}

/// How the answer model is hosted
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ModelMode {
    /// Remote chat-completions API (OpenAI or OpenRouter)
    #[default]
    #[serde(rename = "hosted")]
    Hosted,
    /// Locally served 8-bit quantized model
    #[serde(rename = "8bit")]
    Local8Bit,
    /// Locally served 4-bit quantized model
    #[serde(rename = "4bit")]
    Local4Bit,
}

impl ModelMode {
    /// Parse the `QUANT_MODE` spelling (`none`, `8bit`, `4bit`)
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "none" | "hosted" => Ok(Self::Hosted),
            "8bit" => Ok(Self::Local8Bit),
            "4bit" => Ok(Self::Local4Bit),
            other => Err(Error::Config(format!("Unsupported QUANT_MODE: {}", other))),
        }
    }

    /// Model tag suffix for locally served weights
    pub fn quantization_suffix(&self) -> Option<&'static str> {
        match self {
            Self::Hosted => None,
            Self::Local8Bit => Some("q8_0"),
            Self::Local4Bit => Some("q4_0"),
        }
    }
}

/// Hosted chat-completions provider
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HostedProvider {
    #[default]
    OpenRouter,
    OpenAi,
}

impl HostedProvider {
    /// Parse the `LLM_PROVIDER` spelling
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "openrouter" => Ok(Self::OpenRouter),
            "openai" => Ok(Self::OpenAi),
            other => Err(Error::Config(format!("Unsupported LLM_PROVIDER: {}", other))),
        }
    }

    /// Chat-completions base URL
    pub fn base_url(&self) -> &'static str {
        match self {
            Self::OpenRouter => "https://openrouter.ai/api/v1",
            Self::OpenAi => "https://api.openai.com/v1",
        }
    }
}

/// Language model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Hosting mode, selected once at startup
    pub mode: ModelMode,
    /// Provider used in hosted mode
    pub provider: HostedProvider,
    /// OpenAI API key
    pub openai_api_key: String,
    /// OpenRouter API key
    pub openrouter_api_key: String,
    /// Model name for hosted mode
    pub hosted_model: String,
    /// Local inference server base URL (Ollama API)
    pub local_base_url: String,
    /// Local model name; the quantization suffix is appended per mode
    pub local_model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Generation budget for local models
    pub max_new_tokens: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            mode: ModelMode::Hosted,
            provider: HostedProvider::OpenRouter,
            openai_api_key: String::new(),
            openrouter_api_key: String::new(),
            hosted_model: "gpt-3.5-turbo".to_string(),
            local_base_url: "http://localhost:11434".to_string(),
            local_model: "tinyllama:1.1b-chat-v1".to_string(),
            temperature: 0.0, // deterministic
            max_new_tokens: 512,
            timeout_secs: 120,
        }
    }
}

impl LlmConfig {
    /// API key for the configured hosted provider
    pub fn api_key(&self) -> &str {
        match self.provider {
            HostedProvider::OpenRouter => &self.openrouter_api_key,
            HostedProvider::OpenAi => &self.openai_api_key,
        }
    }

    /// Full local model tag for the configured quantization
    pub fn local_model_tag(&self) -> String {
        match self.mode.quantization_suffix() {
            Some(suffix) => format!("{}-{}", self.local_model, suffix),
            None => self.local_model.clone(),
        }
    }
}

/// Embedding backend
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Ollama embeddings endpoint
    #[default]
    Ollama,
    /// Offline feature hashing
    Hashing,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Backend selection
    pub backend: EmbeddingBackend,
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name
    pub model: String,
    /// Embedding dimensions (384 for MiniLM)
    pub dimensions: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Ollama,
            base_url: "http://localhost:11434".to_string(),
            model: "all-minilm".to_string(),
            dimensions: 384,
            timeout_secs: 30,
        }
    }
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorDbConfig {
    /// Storage file for the persistent collection
    pub storage_path: PathBuf,
    /// Collection name
    pub collection: String,
    /// Refresh the index before serving when it is empty
    pub index_on_startup: bool,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        let storage_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("guide-rag")
            .join("index.json");

        Self {
            storage_path,
            collection: "project-docs".to_string(),
            index_on_startup: true,
        }
    }
}

impl RagConfig {
    /// Load configuration: defaults, then the optional TOML file, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("Invalid config '{}': {}", path.display(), e)))
    }

    /// Apply environment overrides using the given lookup
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("ENV") {
            self.environment = Environment::parse(&v);
        }
        if let Some(v) = lookup("QUANT_MODE") {
            self.llm.mode = ModelMode::parse(&v)?;
        }
        if let Some(v) = lookup("LLM_PROVIDER") {
            self.llm.provider = HostedProvider::parse(&v)?;
        }
        if let Some(v) = lookup("OPENAI_API_KEY") {
            self.llm.openai_api_key = v;
        }
        if let Some(v) = lookup("OPENROUTER_API_KEY") {
            self.llm.openrouter_api_key = v;
        }
        if let Some(v) = lookup("OPENAI_MODEL") {
            self.llm.hosted_model = v;
        }
        if let Some(v) = lookup("MODEL_NAME") {
            self.llm.local_model = v;
        }
        if let Some(v) = lookup("EMBEDDING_MODEL") {
            self.embeddings.model = v;
        }
        if let Some(v) = lookup("GUIDE_RAG_CORPUS_ROOT") {
            self.corpus.root = PathBuf::from(v);
        }
        if let Some(v) = lookup("GUIDE_RAG_INDEX_PATH") {
            self.vector_db.storage_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("GUIDE_RAG_PORT") {
            self.server.port = v
                .parse()
                .map_err(|e| Error::Config(format!("Invalid GUIDE_RAG_PORT '{}': {}", v, e)))?;
        }
        Ok(())
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.chunking.max_chunk_length == 0 {
            return Err(Error::Config("chunking.max_chunk_length must be > 0".to_string()));
        }
        if self.retrieval.top_k == 0 || self.retrieval.local_top_k == 0 {
            return Err(Error::Config("retrieval top_k values must be > 0".to_string()));
        }
        let threshold = self.retrieval.confidence_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(Error::Config(format!(
                "retrieval.confidence_threshold must be a non-negative number, got {}",
                threshold
            )));
        }
        if self.prompt.max_context_length == 0 {
            return Err(Error::Config("prompt.max_context_length must be > 0".to_string()));
        }
        if self.embeddings.dimensions == 0 {
            return Err(Error::Config("embeddings.dimensions must be > 0".to_string()));
        }
        Ok(())
    }
}
