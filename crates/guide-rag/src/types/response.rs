//! Answer and response types

use serde::{Deserialize, Serialize};

/// Which terminal state of the pipeline produced an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerRoute {
    /// Intent rule matched; canned response plus topic chunks
    FastPath,
    /// Confident matches from the local index
    LocalIndex,
    /// Model output over the full-corpus prompt
    Generated,
    /// No relevant content anywhere
    Fallback,
    /// Query route disabled outside development
    Unavailable,
}

/// Final pipeline output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub route: AnswerRoute,
}

impl Answer {
    pub fn new(text: impl Into<String>, route: AnswerRoute) -> Self {
        Self {
            text: text.into(),
            route,
        }
    }
}

/// Query response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub route: AnswerRoute,
}

impl From<Answer> for QueryResponse {
    fn from(answer: Answer) -> Self {
        Self {
            answer: answer.text,
            route: answer.route,
        }
    }
}

/// Index status body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStatus {
    pub collection: String,
    pub records: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_wire_shape() {
        let response = QueryResponse::from(Answer::new("hi", AnswerRoute::LocalIndex));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["answer"], "hi");
        assert_eq!(json["route"], "local_index");
    }
}
