//! Retrieval: local gate, full-corpus search, and ranking

pub mod gate;
pub mod intent;
pub mod ranker;
pub mod search;

pub use gate::{filter_confident, GateOutcome, LocalGate};
pub use intent::{CannedResponse, IntentMatcher, IntentRule, DEFAULT_RULES};
pub use ranker::rank;
pub use search::CorpusSearcher;
