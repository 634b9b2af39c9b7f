use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::constants::STATUS_HEADER;
use crate::embedding::lexical::rouge_l;
use crate::ranking::SimilarityRating;
use crate::source::ExcerptRequest;

use super::error::GatewayError;
use super::payload::{
    FACT_CHECK_MESSAGE, FactCheckRequest, FactCheckResponse, SCRAPE_MESSAGE, SIMILARITY_MESSAGE,
    ScrapeRequest, ScrapeResponse, SimilarityRequest, SimilarityResponse,
};
use super::state::AppState;

fn json_error(rejection: JsonRejection) -> GatewayError {
    GatewayError::InvalidRequest(rejection.body_text())
}

fn request_id() -> String {
    let id = Uuid::new_v4().to_string();
    tracing::Span::current().record("request_id", tracing::field::display(&id));
    id
}

fn make_response<T: serde::Serialize>(status_tag: &'static str, body: T) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(STATUS_HEADER, HeaderValue::from_static(status_tag));
    (StatusCode::OK, headers, Json(body)).into_response()
}

#[instrument(skip(state, payload), fields(request_id = tracing::field::Empty))]
pub async fn fact_check_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let id = request_id();
    let Json(body) = payload.map_err(json_error)?;
    let request = FactCheckRequest::from_json(&body)?;

    debug!(
        claim_len = request.claim.len(),
        blocks = request.evidence_blocks.len(),
        "Fact-checking claim"
    );

    let result = state
        .aggregator
        .verify(&request.claim, &request.evidence_blocks)
        .await;

    info!(
        supported = result.supported(),
        tally = result.vote_tally(),
        evidence = result.evidence().len(),
        "Fact check complete"
    );

    let status_tag = if result.supported() {
        "supported"
    } else {
        "unsupported"
    };

    Ok(make_response(
        status_tag,
        FactCheckResponse {
            message: FACT_CHECK_MESSAGE,
            id,
            created: chrono::Utc::now().timestamp(),
            supported: result.supported(),
            vote_tally: result.vote_tally(),
            evidence: result.evidence_texts(),
            audit: result.audit().to_vec(),
        },
    ))
}

#[instrument(skip(state, payload), fields(request_id = tracing::field::Empty))]
pub async fn scrape_handler(
    State(state): State<AppState>,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let id = request_id();
    let Json(request) = payload.map_err(json_error)?;

    if request.sentence_bound == 0 {
        return Err(GatewayError::InvalidRequest(
            "sentence_bound must be a positive integer".to_string(),
        ));
    }

    let excerpt = state
        .excerpter
        .excerpt(&ExcerptRequest {
            url: request.url,
            sentence_bound: request.sentence_bound,
            question: request.question,
            answer: request.answer,
        })
        .await
        .inspect_err(|e| warn!(error = %e, "Source excerpt failed"))?;

    Ok(make_response(
        "ok",
        ScrapeResponse {
            message: SCRAPE_MESSAGE,
            id,
            most_correlated_answer_paragraph: excerpt.most_correlated_answer_paragraph,
            top_question_paragraphs: excerpt.top_question_paragraphs,
            paragraphs_found: excerpt.paragraphs_found,
        },
    ))
}

#[instrument(skip(state, payload), fields(request_id = tracing::field::Empty))]
pub async fn similarity_handler(
    State(state): State<AppState>,
    payload: Result<Json<SimilarityRequest>, JsonRejection>,
) -> Result<Response, GatewayError> {
    request_id();
    let Json(request) = payload.map_err(json_error)?;

    let timeout = state.aggregator.config().call_timeout;
    let score = tokio::time::timeout(
        timeout,
        state
            .capabilities
            .similarity
            .similarity(&request.question, &request.answer),
    )
    .await
    .map_err(|_| {
        GatewayError::CapabilityFailed(format!("similarity timed out after {timeout:?}"))
    })?
    .map_err(|e| GatewayError::CapabilityFailed(e.to_string()))?;

    if !score.is_finite() {
        return Err(GatewayError::CapabilityFailed(format!(
            "similarity returned non-finite score {score}"
        )));
    }

    let rating = SimilarityRating::from_score(score);
    debug!(score, rating = %rating, "Computed question/answer similarity");

    Ok(make_response(
        "ok",
        SimilarityResponse {
            message: SIMILARITY_MESSAGE,
            similarity_score: score,
            rouge_l_score: rouge_l(&request.question, &request.answer),
            similarity_rating: rating,
            similarity_sentence: rating.sentence(),
            question: request.question,
            answer: request.answer,
        },
    ))
}
