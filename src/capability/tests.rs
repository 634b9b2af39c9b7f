use std::net::SocketAddr;
use std::time::Duration;

use axum::{Json, Router, http::StatusCode, routing::post};
use tokio::net::TcpListener;

use super::*;

async fn spawn_model_service(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn fake_model_router() -> Router {
    Router::new()
        .route(
            "/classify",
            post(|Json(body): Json<serde_json::Value>| async move {
                let evidence = body["evidence"].as_str().unwrap_or_default().to_string();
                let label = if evidence.contains("1937") {
                    "SUPPORTS"
                } else {
                    "NOT ENOUGH INFO"
                };
                Json(serde_json::json!({
                    "label": label,
                    "confidence": {"supports": 0.9, "refutes": 0.05, "neutral": 0.05}
                }))
            }),
        )
        .route(
            "/source_similarity",
            post(|Json(body): Json<serde_json::Value>| async move {
                let same = body["question"] == body["source"];
                Json(serde_json::json!({
                    "similarityScore": if same { 1.0 } else { 0.25 },
                    "question": body["question"],
                    "source": body["source"],
                }))
            }),
        )
        .route(
            "/entities",
            post(|Json(_body): Json<serde_json::Value>| async move {
                Json(serde_json::json!({"entities": ["Golden Gate Bridge", "1937"]}))
            }),
        )
}

#[test]
fn test_label_parse_fever_names() {
    assert_eq!(
        EntailmentLabel::parse("SUPPORTS"),
        Some(EntailmentLabel::Supports)
    );
    assert_eq!(
        EntailmentLabel::parse("REFUTES"),
        Some(EntailmentLabel::Refutes)
    );
    assert_eq!(
        EntailmentLabel::parse("NOT ENOUGH INFO"),
        Some(EntailmentLabel::Neutral)
    );
    assert_eq!(
        EntailmentLabel::parse("not_enough_info"),
        Some(EntailmentLabel::Neutral)
    );
}

#[test]
fn test_label_parse_mnli_names() {
    assert_eq!(
        EntailmentLabel::parse("entailment"),
        Some(EntailmentLabel::Supports)
    );
    assert_eq!(
        EntailmentLabel::parse("Contradiction"),
        Some(EntailmentLabel::Refutes)
    );
    assert_eq!(EntailmentLabel::parse("LABEL_0"), None);
}

#[test]
fn test_label_serde_lowercase() {
    let json = serde_json::to_string(&EntailmentLabel::Supports).unwrap();
    assert_eq!(json, "\"supports\"");
}

#[test]
fn test_argmax_picks_highest() {
    let scores = LabelScores::new(0.7, 0.2, 0.1);
    assert_eq!(scores.argmax(), EntailmentLabel::Supports);

    let scores = LabelScores::new(0.1, 0.6, 0.3);
    assert_eq!(scores.argmax(), EntailmentLabel::Refutes);
}

#[test]
fn test_argmax_ties_never_favor_supports() {
    let scores = LabelScores::new(0.5, 0.0, 0.5);
    assert_eq!(scores.argmax(), EntailmentLabel::Neutral);

    let scores = LabelScores::new(0.5, 0.5, 0.0);
    assert_eq!(scores.argmax(), EntailmentLabel::Refutes);
}

#[test]
fn test_entailment_from_scores() {
    let verdict = Entailment::from_scores(LabelScores::new(0.8, 0.1, 0.1));
    assert_eq!(verdict.label, EntailmentLabel::Supports);
    assert_eq!(verdict.supports_confidence(), 0.8);
}

#[test]
fn test_capability_error_names_capability() {
    let err = CapabilityError::Timeout {
        capability: "similarity",
        timeout: Duration::from_millis(5),
    };
    assert_eq!(err.capability(), "similarity");
    assert!(err.to_string().contains("timed out"));
}

#[tokio::test]
async fn test_mock_classifier_records_calls() {
    let classifier = MockEntailmentClassifier::new()
        .supporting("a", 0.9)
        .failing_on("b");

    let verdict = classifier.classify("claim", "a").await.unwrap();
    assert_eq!(verdict.label, EntailmentLabel::Supports);
    assert!(classifier.classify("claim", "b").await.is_err());

    let default = classifier.classify("claim", "c").await.unwrap();
    assert_eq!(default.label, EntailmentLabel::Neutral);
    assert_eq!(classifier.call_count(), 3);
}

#[tokio::test]
async fn test_remote_service_round_trip() {
    let addr = spawn_model_service(fake_model_router()).await;
    let service =
        RemoteModelService::new(RemoteServiceConfig::new(format!("http://{addr}/"))).unwrap();

    let verdict = service
        .classify("The bridge was completed in 1937", "It opened in 1937.")
        .await
        .unwrap();
    assert_eq!(verdict.label, EntailmentLabel::Supports);
    assert!((verdict.supports_confidence() - 0.9).abs() < 1e-6);

    let neutral = service
        .classify("The bridge was completed in 1937", "It is red.")
        .await
        .unwrap();
    assert_eq!(neutral.label, EntailmentLabel::Neutral);

    let same = service.similarity("paris", "paris").await.unwrap();
    assert_eq!(same, 1.0);

    let entities = service.extract("anything").await.unwrap();
    assert_eq!(entities, vec!["Golden Gate Bridge", "1937"]);
    assert_eq!(EntityExtractor::backend(&service), BackendKind::Remote);
}

#[tokio::test]
async fn test_remote_service_error_status() {
    let router = Router::new().route(
        "/source_similarity",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let addr = spawn_model_service(router).await;
    let service = RemoteModelService::new(RemoteServiceConfig::new(format!("http://{addr}"))).unwrap();

    let err = service.similarity("a", "b").await.unwrap_err();
    assert!(matches!(err, CapabilityError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_remote_service_unknown_label_is_malformed() {
    let router = Router::new().route(
        "/classify",
        post(|| async { Json(serde_json::json!({"label": "LABEL_7"})) }),
    );
    let addr = spawn_model_service(router).await;
    let service = RemoteModelService::new(RemoteServiceConfig::new(format!("http://{addr}"))).unwrap();

    let err = service.classify("a", "b").await.unwrap_err();
    assert!(matches!(err, CapabilityError::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_remote_service_timeout() {
    let router = Router::new().route(
        "/entities",
        post(|| async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Json(serde_json::json!({"entities": []}))
        }),
    );
    let addr = spawn_model_service(router).await;
    let config =
        RemoteServiceConfig::new(format!("http://{addr}")).with_timeout(Duration::from_millis(50));
    let service = RemoteModelService::new(config).unwrap();

    let err = service.extract("slow").await.unwrap_err();
    assert!(matches!(err, CapabilityError::Timeout { .. }));
}

#[tokio::test]
async fn test_remote_service_unreachable() {
    let service =
        RemoteModelService::new(RemoteServiceConfig::new("http://127.0.0.1:1")).unwrap();

    let err = service.similarity("a", "b").await.unwrap_err();
    assert!(matches!(
        err,
        CapabilityError::Request { .. } | CapabilityError::Timeout { .. }
    ));
}
