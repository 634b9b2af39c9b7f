use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ranking::{ScoredUnit, SimilarityRating};
use crate::verification::SentenceAudit;

use super::error::GatewayError;

pub const FACT_CHECK_MESSAGE: &str = "Answer Successfully Fact Checked Using Source";
pub const SCRAPE_MESSAGE: &str = "Source Successfully Scraped";
pub const SIMILARITY_MESSAGE: &str = "Cosine Similarity Calculated";

/// `POST /fact_check` input. Also accepts the legacy `answer`/`summary` names.
#[derive(Debug, Clone, PartialEq)]
pub struct FactCheckRequest {
    pub claim: String,
    pub evidence_blocks: Vec<String>,
}

impl FactCheckRequest {
    /// Validates field types by hand so shape errors carry a precise message.
    pub fn from_json(value: &Value) -> Result<Self, GatewayError> {
        let claim = value
            .get("claim")
            .or_else(|| value.get("answer"))
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::InvalidRequest("claim must be of type: str".to_string()))?
            .to_string();

        let evidence_blocks = match value.get("evidence_blocks").or_else(|| value.get("summary")) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(evidence_type_error)?,
            Some(_) => return Err(evidence_type_error()),
        };

        Ok(Self {
            claim,
            evidence_blocks,
        })
    }
}

fn evidence_type_error() -> GatewayError {
    GatewayError::InvalidRequest("evidence_blocks must be of type: list of strings".to_string())
}

#[derive(Serialize, Debug)]
pub struct FactCheckResponse {
    pub message: &'static str,
    pub id: String,
    pub created: i64,
    pub supported: bool,
    pub vote_tally: u32,
    pub evidence: Vec<String>,
    pub audit: Vec<SentenceAudit>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ScrapeRequest {
    pub url: String,
    pub sentence_bound: usize,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

#[derive(Serialize, Debug)]
pub struct ScrapeResponse {
    pub message: &'static str,
    pub id: String,
    pub most_correlated_answer_paragraph: Option<ScoredUnit>,
    pub top_question_paragraphs: Vec<ScoredUnit>,
    pub paragraphs_found: usize,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SimilarityRequest {
    pub question: String,
    pub answer: String,
}

#[derive(Serialize, Debug)]
pub struct SimilarityResponse {
    pub message: &'static str,
    pub similarity_score: f32,
    pub rouge_l_score: f32,
    pub similarity_rating: SimilarityRating,
    pub similarity_sentence: &'static str,
    pub question: String,
    pub answer: String,
}
