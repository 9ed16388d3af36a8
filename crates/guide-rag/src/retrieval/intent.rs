//! Keyword intent rules evaluated before any index lookup
//!
//! A rule fires when the question contains every `required` keyword and at
//! least one `any_of` keyword (case-insensitive substring match).

/// Canned answer bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CannedResponse {
    ProjectInitialization,
}

impl CannedResponse {
    pub fn text(&self) -> &'static str {
        match self {
            Self::ProjectInitialization => PROJECT_INITIALIZATION,
        }
    }
}

const PROJECT_INITIALIZATION: &str = "### Option 1: New Project\n\
Create a new repository from scratch by following the steps:\n\
1. Create a local folder for your project.\n\
2. Initialize Git with `git init`.\n\
3. Create a new repository on GitHub and connect it as a remote.\n\
\n\
### Option 2: Existing Repo\n\
Clone an existing repository using:\n\
`git clone <repository-url>`\n\
Followed by:\n\
`cd <repository-folder>`\n\
\n\
You can now proceed with either setup directly.";

/// One declarative fast-path rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentRule {
    pub name: &'static str,
    pub required: &'static [&'static str],
    pub any_of: &'static [&'static str],
    /// Narrowed index query issued when the rule fires
    pub topic_query: &'static str,
    pub topic_top_k: usize,
    pub response: CannedResponse,
}

impl IntentRule {
    /// Whether this rule matches an already lowercased question
    fn matches_lower(&self, question: &str) -> bool {
        self.required.iter().all(|k| question.contains(k))
            && (self.any_of.is_empty() || self.any_of.iter().any(|k| question.contains(k)))
    }
}

/// Built-in rules
pub const DEFAULT_RULES: &[IntentRule] = &[IntentRule {
    name: "project-initialization",
    required: &["project"],
    any_of: &["create", "init", "initialize", "start"],
    topic_query: "project initialization",
    topic_top_k: 5,
    response: CannedResponse::ProjectInitialization,
}];

/// Ordered rule table; the first matching rule wins
#[derive(Debug, Clone)]
pub struct IntentMatcher {
    rules: Vec<IntentRule>,
}

impl Default for IntentMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_RULES.to_vec())
    }
}

impl IntentMatcher {
    pub fn new(rules: Vec<IntentRule>) -> Self {
        Self { rules }
    }

    /// A matcher that never fires
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn match_question(&self, question: &str) -> Option<&IntentRule> {
        let lower = question.to_lowercase();
        self.rules.iter().find(|rule| rule.matches_lower(&lower))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_rule_requires_both_keyword_groups() {
        let matcher = IntentMatcher::default();

        let rule = matcher.match_question("How do I start a new Project?").unwrap();
        assert_eq!(rule.name, "project-initialization");
        assert_eq!(rule.topic_query, "project initialization");

        assert!(matcher.match_question("What is a project?").is_none());
        assert!(matcher.match_question("How do I create a virtual env?").is_none());
    }

    #[test]
    fn test_substring_matching_like_keywords() {
        // "initialize" contains "init"; "restart" contains "start"
        let matcher = IntentMatcher::default();
        assert!(matcher.match_question("Initialize my project").is_some());
        assert!(matcher.match_question("restart the project").is_some());
    }

    #[test]
    fn test_canned_response_has_both_options() {
        let text = CannedResponse::ProjectInitialization.text();
        assert!(text.contains("### Option 1: New Project"));
        assert!(text.contains("### Option 2: Existing Repo"));
        assert!(text.contains("`git init`"));
    }

    #[test]
    fn test_empty_matcher_never_fires() {
        assert!(IntentMatcher::empty().match_question("start a project").is_none());
    }
}
