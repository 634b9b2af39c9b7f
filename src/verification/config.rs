use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_BASE_SIMILARITY, DEFAULT_CALL_TIMEOUT, DEFAULT_HIGH_SIMILARITY,
    DEFAULT_SUPPORT_CONFIDENCE_MAX, DEFAULT_SUPPORT_CONFIDENCE_MIN, DEFAULT_VOTE_THRESHOLD,
};

use super::error::VerificationError;

#[derive(Debug, Clone, PartialEq)]
/// Calibration of the vote aggregation.
///
/// The defaults assume softmax confidences from the classifier and cosine scores
/// from the similarity capability.
pub struct VerifierConfig {
    /// Inclusive lower bound on the classifier's "supports" confidence.
    pub support_confidence_min: f32,
    /// Inclusive upper bound on the classifier's "supports" confidence.
    pub support_confidence_max: f32,
    /// Similarity needed (`>=`) for any vote.
    pub base_similarity: f32,
    /// Similarity needed (`>`) for the high-confidence bonus.
    pub high_similarity: f32,
    /// Tally at or above which the claim is supported.
    pub vote_threshold: u32,
    /// Timeout for each classifier, similarity or entity call.
    pub call_timeout: Duration,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            support_confidence_min: DEFAULT_SUPPORT_CONFIDENCE_MIN,
            support_confidence_max: DEFAULT_SUPPORT_CONFIDENCE_MAX,
            base_similarity: DEFAULT_BASE_SIMILARITY,
            high_similarity: DEFAULT_HIGH_SIMILARITY,
            vote_threshold: DEFAULT_VOTE_THRESHOLD,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

impl VerifierConfig {
    const ENV_BASE_SIMILARITY: &'static str = "GROUNDTRUTH_BASE_SIMILARITY";
    const ENV_HIGH_SIMILARITY: &'static str = "GROUNDTRUTH_HIGH_SIMILARITY";
    const ENV_SUPPORT_CONFIDENCE_MIN: &'static str = "GROUNDTRUTH_SUPPORT_CONFIDENCE_MIN";
    const ENV_SUPPORT_CONFIDENCE_MAX: &'static str = "GROUNDTRUTH_SUPPORT_CONFIDENCE_MAX";
    const ENV_VOTE_THRESHOLD: &'static str = "GROUNDTRUTH_VOTE_THRESHOLD";
    const ENV_CALL_TIMEOUT_MS: &'static str = "GROUNDTRUTH_CALL_TIMEOUT_MS";

    /// Reads overrides from the environment, then validates.
    pub fn from_env() -> Result<Self, VerificationError> {
        let defaults = Self::default();

        let config = Self {
            support_confidence_min: Self::parse_env(
                Self::ENV_SUPPORT_CONFIDENCE_MIN,
                defaults.support_confidence_min,
            )?,
            support_confidence_max: Self::parse_env(
                Self::ENV_SUPPORT_CONFIDENCE_MAX,
                defaults.support_confidence_max,
            )?,
            base_similarity: Self::parse_env(Self::ENV_BASE_SIMILARITY, defaults.base_similarity)?,
            high_similarity: Self::parse_env(Self::ENV_HIGH_SIMILARITY, defaults.high_similarity)?,
            vote_threshold: Self::parse_env(Self::ENV_VOTE_THRESHOLD, defaults.vote_threshold)?,
            call_timeout: Self::parse_env::<u64>(
                Self::ENV_CALL_TIMEOUT_MS,
                defaults.call_timeout.as_millis() as u64,
            )
            .map(Duration::from_millis)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn parse_env<T>(var_name: &str, default: T) -> Result<T, VerificationError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e| VerificationError::InvalidConfig {
                    reason: format!("{var_name}='{value}': {e}"),
                }),
            Err(_) => Ok(default),
        }
    }

    pub fn with_support_confidence(mut self, min: f32, max: f32) -> Self {
        self.support_confidence_min = min;
        self.support_confidence_max = max;
        self
    }

    pub fn with_base_similarity(mut self, threshold: f32) -> Self {
        self.base_similarity = threshold;
        self
    }

    pub fn with_high_similarity(mut self, threshold: f32) -> Self {
        self.high_similarity = threshold;
        self
    }

    pub fn with_vote_threshold(mut self, threshold: u32) -> Self {
        self.vote_threshold = threshold;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), VerificationError> {
        let invalid = |reason: String| -> Result<(), VerificationError> {
            Err(VerificationError::InvalidConfig { reason })
        };

        for (name, value) in [
            ("support_confidence_min", self.support_confidence_min),
            ("support_confidence_max", self.support_confidence_max),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return invalid(format!("{name} must be between 0.0 and 1.0, got {value}"));
            }
        }
        if self.support_confidence_min > self.support_confidence_max {
            return invalid(format!(
                "support confidence band is inverted: [{}, {}]",
                self.support_confidence_min, self.support_confidence_max
            ));
        }

        for (name, value) in [
            ("base_similarity", self.base_similarity),
            ("high_similarity", self.high_similarity),
        ] {
            if !(-1.0..=1.0).contains(&value) {
                return invalid(format!("{name} must be between -1.0 and 1.0, got {value}"));
            }
        }
        if self.base_similarity > self.high_similarity {
            return invalid(format!(
                "base_similarity ({}) exceeds high_similarity ({})",
                self.base_similarity, self.high_similarity
            ));
        }

        if self.vote_threshold == 0 {
            return invalid("vote_threshold must be at least 1".to_string());
        }
        if self.call_timeout.is_zero() {
            return invalid("call_timeout must be greater than zero".to_string());
        }

        Ok(())
    }

    /// Whether `confidence` lies in the inclusive support band.
    pub fn accepts_confidence(&self, confidence: f32) -> bool {
        (self.support_confidence_min..=self.support_confidence_max).contains(&confidence)
    }
}
