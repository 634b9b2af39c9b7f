use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// Qualitative band for a question/answer cosine similarity.
pub enum SimilarityRating {
    #[serde(rename = "Very Dissimilar")]
    VeryDissimilar,
    Dissimilar,
    Similar,
    #[serde(rename = "Very Similar")]
    VerySimilar,
    Identical,
}

impl SimilarityRating {
    /// `< 0.2`, `< 0.4`, `< 0.6`, `< 1.0`, otherwise identical.
    pub fn from_score(score: f32) -> Self {
        if score < 0.2 {
            Self::VeryDissimilar
        } else if score < 0.4 {
            Self::Dissimilar
        } else if score < 0.6 {
            Self::Similar
        } else if score < 1.0 {
            Self::VerySimilar
        } else {
            Self::Identical
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::VeryDissimilar => "Very Dissimilar",
            Self::Dissimilar => "Dissimilar",
            Self::Similar => "Similar",
            Self::VerySimilar => "Very Similar",
            Self::Identical => "Identical",
        }
    }

    /// One-line explanation shown next to the rating.
    pub fn sentence(&self) -> &'static str {
        match self {
            Self::VeryDissimilar => "The question asked is very dissimilar to the answer received",
            Self::Dissimilar => "The question asked is dissimilar to the answer received",
            Self::Similar => "The question asked is similar to the answer received",
            Self::VerySimilar => "The question asked is very similar to the answer received",
            Self::Identical => "The question asked and the answer received are identical",
        }
    }
}

impl std::fmt::Display for SimilarityRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
