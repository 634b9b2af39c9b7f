use async_trait::async_trait;

use crate::capability::{BackendKind, CapabilityResult, EntityExtractor};
use crate::embedding::lexical::is_stop_word;

const EDGE_PUNCTUATION: &[char] = &[
    ',', '.', ';', ':', '!', '?', '"', '\'', '(', ')', '[', ']', '{', '}',
];

/// Rule-based entity tagger used when no NER model is available.
///
/// Emits runs of capitalised words (`Golden Gate Bridge`) and tokens containing
/// digits (`1937`, `3.5km`). A capitalised function word such as a sentence-initial
/// `The` never starts a run. Entities are returned once each, in document order.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicEntityExtractor;

impl HeuristicEntityExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract_sync(&self, text: &str) -> Vec<String> {
        let mut entities: Vec<String> = Vec::new();
        let mut run: Vec<&str> = Vec::new();

        for raw in text.split_whitespace() {
            let token = raw.trim_matches(EDGE_PUNCTUATION);
            let breaks_run = raw
                .chars()
                .last()
                .is_some_and(|c| matches!(c, ',' | '.' | ';' | ':' | '!' | '?' | ')'));

            if token.chars().any(|c| c.is_ascii_digit()) {
                push(run.join(" "), &mut entities);
                run.clear();
                push(token.to_string(), &mut entities);
                continue;
            }

            let capitalised = token.chars().next().is_some_and(char::is_uppercase);
            if capitalised && !is_stop_word(&token.to_lowercase()) {
                run.push(token);
            } else {
                push(run.join(" "), &mut entities);
                run.clear();
            }

            if breaks_run {
                push(run.join(" "), &mut entities);
                run.clear();
            }
        }
        push(run.join(" "), &mut entities);

        entities
    }
}

fn push(entity: String, entities: &mut Vec<String>) {
    if !entity.is_empty() && !entities.contains(&entity) {
        entities.push(entity);
    }
}

#[async_trait]
impl EntityExtractor for HeuristicEntityExtractor {
    async fn extract(&self, text: &str) -> CapabilityResult<Vec<String>> {
        Ok(self.extract_sync(text))
    }

    fn backend(&self) -> BackendKind {
        BackendKind::Heuristic
    }
}
