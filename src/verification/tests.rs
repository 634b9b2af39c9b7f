use std::env;
use std::sync::Arc;
use std::time::Duration;

use serial_test::serial;

use super::*;
use crate::capability::{
    Capabilities, EntailmentLabel, EntityExtractor, MockEntailmentClassifier,
    MockEntityExtractor, MockSimilarityScorer,
};
use crate::entities::HeuristicEntityExtractor;

const CLAIM: &str = "The bridge was completed in 1937";

fn aggregator_with(
    classifier: MockEntailmentClassifier,
    similarity: MockSimilarityScorer,
    entities: Arc<dyn EntityExtractor>,
    config: VerifierConfig,
) -> EvidenceAggregator {
    let capabilities = Capabilities::new(Arc::new(classifier), Arc::new(similarity), entities);
    EvidenceAggregator::new(&capabilities, config).unwrap()
}

fn aggregator(
    classifier: MockEntailmentClassifier,
    similarity: MockSimilarityScorer,
) -> EvidenceAggregator {
    aggregator_with(
        classifier,
        similarity,
        Arc::new(MockEntityExtractor::new()),
        VerifierConfig::default(),
    )
}

#[tokio::test]
async fn test_bridge_sentence_earns_baseline_and_entity_votes() {
    let sentence = "The Golden Gate Bridge opened in 1937 after four years of construction.";
    let aggregator = aggregator_with(
        MockEntailmentClassifier::new().supporting(sentence, 0.9),
        MockSimilarityScorer::new().with_score(sentence, 0.65),
        Arc::new(HeuristicEntityExtractor::new()),
        VerifierConfig::default(),
    );

    let result = aggregator.verify(CLAIM, &[sentence]).await;

    assert_eq!(result.vote_tally(), 2);
    assert!(result.supported());
    assert_eq!(result.evidence_texts(), vec![sentence.to_string()]);

    match &result.audit()[0].outcome {
        SentenceOutcome::Voted {
            entity_overlap,
            votes,
            ..
        } => {
            assert_eq!(*entity_overlap, Some(1));
            assert!(votes.baseline && votes.entity_bonus && !votes.high_similarity_bonus);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn test_neutral_sentence_earns_nothing() {
    let similarity = Arc::new(MockSimilarityScorer::new().with_default(0.9));
    let capabilities = Capabilities::new(
        Arc::new(MockEntailmentClassifier::new()),
        similarity.clone(),
        Arc::new(MockEntityExtractor::new()),
    );
    let aggregator = EvidenceAggregator::new(&capabilities, VerifierConfig::default()).unwrap();

    let result = aggregator
        .verify(CLAIM, &["The bridge was painted red."])
        .await;

    assert_eq!(result.vote_tally(), 0);
    assert!(!result.supported());
    assert!(result.evidence().is_empty());
    assert_eq!(similarity.call_count(), 0);
    assert_eq!(
        result.audit()[0].outcome,
        SentenceOutcome::NotSupporting {
            label: EntailmentLabel::Neutral
        }
    );
}

#[tokio::test]
async fn test_two_baseline_sentences_in_one_block() {
    let first = "The bridge opened in 1937.";
    let second = "Workers finished it that spring.";
    let aggregator = aggregator(
        MockEntailmentClassifier::new()
            .supporting(first, 0.7)
            .supporting(second, 0.7),
        MockSimilarityScorer::new().with_default(0.6),
    );

    let block = format!("{first} {second}");
    let result = aggregator.verify(CLAIM, &[block]).await;

    assert_eq!(result.vote_tally(), 2);
    assert!(result.supported());
    assert_eq!(
        result.evidence_texts(),
        vec![first.to_string(), second.to_string()]
    );
}

#[tokio::test]
async fn test_single_baseline_vote_is_not_enough() {
    let sentence = "The bridge opened in 1937.";
    let aggregator = aggregator(
        MockEntailmentClassifier::new().supporting(sentence, 0.7),
        MockSimilarityScorer::new().with_score(sentence, 0.6),
    );

    let result = aggregator.verify(CLAIM, &[sentence]).await;
    assert_eq!(result.vote_tally(), 1);
    assert!(!result.supported());
    assert_eq!(result.evidence().len(), 1);
}

#[tokio::test]
async fn test_one_compelling_sentence_earns_three_votes() {
    let sentence = "The bridge was completed in 1937.";
    let aggregator = aggregator_with(
        MockEntailmentClassifier::new().supporting(sentence, 0.95),
        MockSimilarityScorer::new().with_score(sentence, 0.97),
        Arc::new(HeuristicEntityExtractor::new()),
        VerifierConfig::default(),
    );

    let result = aggregator.verify(CLAIM, &[sentence]).await;
    assert_eq!(result.vote_tally(), 3);
    assert!(result.supported());
}

#[tokio::test]
async fn test_duplicate_sentences_are_deduplicated() {
    let sentence = "The bridge opened in 1937.";
    let similarity = Arc::new(MockSimilarityScorer::new().with_default(0.6));
    let capabilities = Capabilities::new(
        Arc::new(MockEntailmentClassifier::new().supporting(sentence, 0.8)),
        similarity.clone(),
        Arc::new(MockEntityExtractor::new()),
    );
    let aggregator = EvidenceAggregator::new(&capabilities, VerifierConfig::default()).unwrap();

    let blocks = [
        "The bridge opened in 1937.",
        "The  bridge\topened in 1937.",
        "  The bridge opened in 1937.  ",
    ];
    let result = aggregator.verify(CLAIM, &blocks).await;

    assert_eq!(result.evidence().len(), 1);
    assert_eq!(result.vote_tally(), 1);
    assert_eq!(similarity.call_count(), 1);
    assert_eq!(result.audit()[1].outcome, SentenceOutcome::Duplicate);
    assert_eq!(result.audit()[2].outcome, SentenceOutcome::Duplicate);
}

#[tokio::test]
async fn test_dedup_is_case_sensitive() {
    let lower = "the bridge opened in 1937.";
    let upper = "The bridge opened in 1937.";
    let aggregator = aggregator(
        MockEntailmentClassifier::new()
            .supporting(lower, 0.8)
            .supporting(upper, 0.8),
        MockSimilarityScorer::new().with_default(0.6),
    );

    let result = aggregator.verify(CLAIM, &[lower, upper]).await;
    assert_eq!(result.evidence().len(), 2);
}

#[tokio::test]
async fn test_below_base_similarity_is_shown_but_never_votes() {
    let sentence = "The Golden Gate Bridge opened in 1937.";
    let aggregator = aggregator_with(
        MockEntailmentClassifier::new().supporting(sentence, 0.99),
        MockSimilarityScorer::new().with_score(sentence, 0.49),
        Arc::new(HeuristicEntityExtractor::new()),
        VerifierConfig::default(),
    );

    let result = aggregator.verify(CLAIM, &[sentence]).await;

    assert_eq!(result.vote_tally(), 0);
    assert!(!result.supported());
    assert_eq!(result.evidence_texts(), vec![sentence.to_string()]);
    assert!(matches!(
        result.audit()[0].outcome,
        SentenceOutcome::BelowSimilarity { .. }
    ));
}

#[tokio::test]
async fn test_similarity_thresholds_are_inclusive_and_strict() {
    let at_base = "First sentence here.";
    let at_high = "Second sentence here.";
    let above_high = "Third sentence here.";
    let aggregator = aggregator(
        MockEntailmentClassifier::new()
            .supporting(at_base, 0.8)
            .supporting(at_high, 0.8)
            .supporting(above_high, 0.8),
        MockSimilarityScorer::new()
            .with_score(at_base, 0.5)
            .with_score(at_high, 0.8)
            .with_score(above_high, 0.81),
    );

    let result = aggregator
        .verify(CLAIM, &[at_base, at_high, above_high])
        .await;

    let votes: Vec<u32> = result.audit().iter().map(|a| a.votes()).collect();
    assert_eq!(votes, vec![1, 1, 2]);
    assert_eq!(result.vote_tally(), 4);
}

#[tokio::test]
async fn test_confidence_band_is_inclusive() {
    let low = "Low confidence sentence.";
    let edge = "Edge confidence sentence.";
    let high = "High confidence sentence.";
    let aggregator = aggregator_with(
        MockEntailmentClassifier::new()
            .supporting(low, 0.59)
            .supporting(edge, 0.6)
            .supporting(high, 0.96),
        MockSimilarityScorer::new().with_default(0.6),
        Arc::new(MockEntityExtractor::new()),
        VerifierConfig::default().with_support_confidence(0.6, 0.95),
    );

    let result = aggregator.verify(CLAIM, &[low, edge, high]).await;

    assert_eq!(result.evidence_texts(), vec![edge.to_string()]);
    assert!(matches!(
        result.audit()[0].outcome,
        SentenceOutcome::OutsideConfidenceBand { .. }
    ));
    assert!(matches!(
        result.audit()[2].outcome,
        SentenceOutcome::OutsideConfidenceBand { .. }
    ));
}

#[tokio::test]
async fn test_refuting_sentence_is_rejected() {
    let sentence = "The bridge was not completed until 1940.";
    let aggregator = aggregator(
        MockEntailmentClassifier::new().refuting(sentence, 0.9),
        MockSimilarityScorer::new().with_default(0.9),
    );

    let result = aggregator.verify(CLAIM, &[sentence]).await;
    assert_eq!(result.vote_tally(), 0);
    assert!(result.evidence().is_empty());
}

#[tokio::test]
async fn test_classifier_failure_skips_only_that_sentence() {
    let broken = "This one breaks the classifier.";
    let first = "The bridge opened in 1937.";
    let second = "It was finished that year.";
    let aggregator = aggregator(
        MockEntailmentClassifier::new()
            .failing_on(broken)
            .supporting(first, 0.8)
            .supporting(second, 0.8),
        MockSimilarityScorer::new().with_default(0.6),
    );

    let result = aggregator
        .verify(CLAIM, &[broken, first, second])
        .await;

    assert_eq!(result.vote_tally(), 2);
    assert!(result.supported());
    assert!(matches!(
        result.audit()[0].outcome,
        SentenceOutcome::ClassifierFailed { .. }
    ));
}

#[tokio::test]
async fn test_similarity_failure_keeps_evidence_without_votes() {
    let sentence = "The bridge opened in 1937.";
    let aggregator = aggregator(
        MockEntailmentClassifier::new().supporting(sentence, 0.8),
        MockSimilarityScorer::new().failing_on(sentence),
    );

    let result = aggregator.verify(CLAIM, &[sentence]).await;

    assert_eq!(result.vote_tally(), 0);
    assert_eq!(result.evidence().len(), 1);
    assert!(matches!(
        result.audit()[0].outcome,
        SentenceOutcome::SimilarityFailed { .. }
    ));
}

#[tokio::test]
async fn test_non_finite_similarity_earns_no_votes() {
    let sentence = "The bridge opened in 1937.";
    let aggregator = aggregator(
        MockEntailmentClassifier::new().supporting(sentence, 0.8),
        MockSimilarityScorer::new().with_score(sentence, f32::NAN),
    );

    let result = aggregator.verify(CLAIM, &[sentence]).await;
    assert_eq!(result.vote_tally(), 0);
}

#[tokio::test]
async fn test_entity_failure_keeps_baseline_vote() {
    let sentence = "The Golden Gate Bridge opened in 1937.";
    let aggregator = aggregator_with(
        MockEntailmentClassifier::new().supporting(sentence, 0.8),
        MockSimilarityScorer::new().with_score(sentence, 0.9),
        Arc::new(MockEntityExtractor::new().failing_on(CLAIM)),
        VerifierConfig::default(),
    );

    let result = aggregator.verify(CLAIM, &[sentence]).await;

    assert_eq!(result.vote_tally(), 2);
    match &result.audit()[0].outcome {
        SentenceOutcome::Voted {
            entity_overlap,
            votes,
            ..
        } => {
            assert_eq!(*entity_overlap, None);
            assert!(votes.baseline && !votes.entity_bonus && votes.high_similarity_bonus);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_similarity_times_out_per_sentence() {
    let slow = "The bridge opened in 1937.";
    let fast = "It was finished that year.";
    let aggregator = aggregator_with(
        MockEntailmentClassifier::new()
            .supporting(slow, 0.8)
            .supporting(fast, 0.8),
        MockSimilarityScorer::new()
            .with_default(0.9)
            .delayed(slow, Duration::from_millis(500)),
        Arc::new(MockEntityExtractor::new()),
        VerifierConfig::default().with_call_timeout(Duration::from_millis(20)),
    );

    let result = aggregator.verify(CLAIM, &[slow, fast]).await;

    assert_eq!(result.vote_tally(), 2);
    assert_eq!(result.evidence().len(), 2);
    match &result.audit()[0].outcome {
        SentenceOutcome::SimilarityFailed { error } => assert!(error.contains("timed out")),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn test_blank_claim_is_unsupported_without_capability_calls() {
    let classifier = Arc::new(MockEntailmentClassifier::new().supporting("Anything.", 0.9));
    let similarity = Arc::new(MockSimilarityScorer::new().with_default(0.9));
    let capabilities = Capabilities::new(
        classifier.clone(),
        similarity.clone(),
        Arc::new(MockEntityExtractor::new()),
    );
    let aggregator = EvidenceAggregator::new(&capabilities, VerifierConfig::default()).unwrap();

    for claim in ["", "   ", "\n\t"] {
        let result = aggregator.verify(claim, &["Anything."]).await;
        assert!(!result.supported());
        assert_eq!(result.vote_tally(), 0);
        assert!(result.evidence().is_empty());
        assert!(result.audit().is_empty());
    }

    assert_eq!(classifier.call_count(), 0);
    assert_eq!(similarity.call_count(), 0);
}

#[tokio::test]
async fn test_no_evidence_is_unsupported_not_an_error() {
    let aggregator = aggregator(MockEntailmentClassifier::new(), MockSimilarityScorer::new());

    let empty: [&str; 0] = [];
    let result = aggregator.verify(CLAIM, &empty).await;
    assert!(!result.supported());
    assert_eq!(result.vote_tally(), 0);
    assert!(result.evidence().is_empty());
}

#[tokio::test]
async fn test_custom_vote_threshold() {
    let sentence = "The bridge opened in 1937.";
    let aggregator = aggregator_with(
        MockEntailmentClassifier::new().supporting(sentence, 0.8),
        MockSimilarityScorer::new().with_score(sentence, 0.6),
        Arc::new(MockEntityExtractor::new()),
        VerifierConfig::default().with_vote_threshold(1),
    );

    let result = aggregator.verify(CLAIM, &[sentence]).await;
    assert!(result.supported());
}

#[test]
fn test_decide_threshold_boundary() {
    let decision = VerificationDecision::default();
    for tally in 0..6u32 {
        let result = decision.decide(VoteTally::from(tally), EvidenceSet::new());
        assert_eq!(result.supported(), tally >= 2, "tally {tally}");
        assert_eq!(result.vote_tally(), tally);
    }
}

#[test]
fn test_decide_keeps_insertion_order() {
    let mut evidence = EvidenceSet::new();
    assert!(evidence.insert("b sentence", 0));
    assert!(evidence.insert("a sentence", 1));
    assert!(!evidence.insert("b  sentence", 2));

    let result = VerificationDecision::new(1).decide(VoteTally::from(1), evidence);
    assert_eq!(result.evidence_texts(), vec!["b sentence", "a sentence"]);
}

#[test]
fn test_sentence_votes_total() {
    let votes = SentenceVotes {
        baseline: true,
        entity_bonus: false,
        high_similarity_bonus: true,
    };
    assert_eq!(votes.total(), 2);
    assert_eq!(SentenceVotes::default().total(), 0);
}

#[test]
fn test_split_sentences() {
    let sentences = split_sentences("The bridge opened in 1937. It is red!  Is it tall? ");
    assert_eq!(
        sentences,
        vec!["The bridge opened in 1937.", "It is red!", "Is it tall?"]
    );
    assert!(split_sentences("   ").is_empty());
}

#[test]
fn test_normalize_whitespace() {
    assert_eq!(normalize_whitespace("  a \t b\n\nc  "), "a b c");
    assert_eq!(normalize_whitespace("Same Case"), "Same Case");
}

#[test]
fn test_config_validate() {
    assert!(VerifierConfig::default().validate().is_ok());
    assert!(
        VerifierConfig::default()
            .with_support_confidence(0.9, 0.5)
            .validate()
            .is_err()
    );
    assert!(
        VerifierConfig::default()
            .with_support_confidence(0.5, 1.5)
            .validate()
            .is_err()
    );
    assert!(
        VerifierConfig::default()
            .with_base_similarity(0.9)
            .validate()
            .is_err()
    );
    assert!(
        VerifierConfig::default()
            .with_vote_threshold(0)
            .validate()
            .is_err()
    );
    assert!(
        VerifierConfig::default()
            .with_call_timeout(Duration::ZERO)
            .validate()
            .is_err()
    );
}

#[test]
fn test_aggregator_rejects_invalid_config() {
    let capabilities = Capabilities::new(
        Arc::new(MockEntailmentClassifier::new()),
        Arc::new(MockSimilarityScorer::new()),
        Arc::new(MockEntityExtractor::new()),
    );
    let err = EvidenceAggregator::new(
        &capabilities,
        VerifierConfig::default().with_vote_threshold(0),
    )
    .unwrap_err();
    assert!(matches!(err, VerificationError::InvalidConfig { .. }));
}

const VERIFIER_ENV: &[&str] = &[
    "GROUNDTRUTH_BASE_SIMILARITY",
    "GROUNDTRUTH_HIGH_SIMILARITY",
    "GROUNDTRUTH_SUPPORT_CONFIDENCE_MIN",
    "GROUNDTRUTH_SUPPORT_CONFIDENCE_MAX",
    "GROUNDTRUTH_VOTE_THRESHOLD",
    "GROUNDTRUTH_CALL_TIMEOUT_MS",
];

fn clear_verifier_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for key in VERIFIER_ENV {
        unsafe { env::remove_var(key) };
    }
}

#[test]
#[serial]
fn test_verifier_config_from_env_defaults() {
    clear_verifier_env();
    assert_eq!(VerifierConfig::from_env().unwrap(), VerifierConfig::default());
}

#[test]
#[serial]
fn test_verifier_config_from_env_overrides() {
    clear_verifier_env();
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::set_var("GROUNDTRUTH_BASE_SIMILARITY", "0.4");
        env::set_var("GROUNDTRUTH_HIGH_SIMILARITY", "0.9");
        env::set_var("GROUNDTRUTH_VOTE_THRESHOLD", "3");
        env::set_var("GROUNDTRUTH_CALL_TIMEOUT_MS", "250");
    }

    let config = VerifierConfig::from_env();
    clear_verifier_env();

    let config = config.unwrap();
    assert_eq!(config.base_similarity, 0.4);
    assert_eq!(config.high_similarity, 0.9);
    assert_eq!(config.vote_threshold, 3);
    assert_eq!(config.call_timeout, Duration::from_millis(250));
}

#[test]
#[serial]
fn test_verifier_config_from_env_rejects_garbage() {
    clear_verifier_env();
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe { env::set_var("GROUNDTRUTH_VOTE_THRESHOLD", "two") };

    let result = VerifierConfig::from_env();
    clear_verifier_env();

    assert!(matches!(result, Err(VerificationError::InvalidConfig { .. })));
}

#[test]
#[serial]
fn test_verifier_config_from_env_rejects_inverted_band() {
    clear_verifier_env();
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::set_var("GROUNDTRUTH_SUPPORT_CONFIDENCE_MIN", "0.9");
        env::set_var("GROUNDTRUTH_SUPPORT_CONFIDENCE_MAX", "0.6");
    }

    let result = VerifierConfig::from_env();
    clear_verifier_env();

    assert!(result.is_err());
}
