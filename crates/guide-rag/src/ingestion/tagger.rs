//! Metadata tags derived from chunk source paths and text

use crate::types::{Chunk, IndexedRecord};

/// Where a tag rule looks for its patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Source,
    Text,
}

struct TagRule {
    field: Field,
    /// Any of these (lowercase) substrings triggers the tag
    patterns: &'static [&'static str],
    tag: &'static str,
}

const TAG_RULES: &[TagRule] = &[
    // Phase
    TagRule { field: Field::Source, patterns: &["machine-setup"], tag: "Machine Setup" },
    TagRule { field: Field::Source, patterns: &["project-initialization"], tag: "Project Initialization" },
    TagRule { field: Field::Source, patterns: &["repeatable-workflow"], tag: "Repeatable Workflow" },
    // Task type
    TagRule { field: Field::Text, patterns: &["setup"], tag: "Setup Task" },
    TagRule { field: Field::Text, patterns: &["initialize"], tag: "Initialization Task" },
    TagRule { field: Field::Text, patterns: &["workflow"], tag: "Workflow Task" },
    TagRule { field: Field::Text, patterns: &["cheatsheet"], tag: "CheatSheet" },
    // Commands (trailing space matters)
    TagRule { field: Field::Text, patterns: &["git "], tag: "Git Command" },
    TagRule { field: Field::Text, patterns: &["pip "], tag: "Pip Command" },
    TagRule { field: Field::Text, patterns: &["python ", "py "], tag: "Python Command" },
    TagRule { field: Field::Text, patterns: &["audio guides"], tag: "Audio Guide" },
    TagRule { field: Field::Text, patterns: &["explore"], tag: "Explore Section" },
];

/// Assigns tags to chunks before indexing
#[derive(Debug, Clone)]
pub struct Tagger {
    base_tag: String,
}

impl Tagger {
    /// Create a tagger whose first tag is always `base_tag`
    pub fn new(base_tag: impl Into<String>) -> Self {
        Self {
            base_tag: base_tag.into(),
        }
    }

    /// Tags for one chunk, base tag first, then rule order
    pub fn tags_for(&self, chunk: &Chunk) -> Vec<String> {
        let source = chunk.source_id.to_lowercase();
        let text = chunk.text.to_lowercase();

        let mut tags = vec![self.base_tag.clone()];
        for rule in TAG_RULES {
            let haystack = match rule.field {
                Field::Source => &source,
                Field::Text => &text,
            };
            if rule.patterns.iter().any(|p| haystack.contains(p)) {
                tags.push(rule.tag.to_string());
            }
        }
        tags
    }

    /// Build the index record for a chunk
    pub fn record(&self, chunk: &Chunk) -> IndexedRecord {
        IndexedRecord::from_chunk(chunk, self.tags_for(chunk))
    }
}
