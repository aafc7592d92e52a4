use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::error::ValidationError;

/// Content category selected in the discovery wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[serde(alias = "movies")]
    Movie,
    #[serde(alias = "tv")]
    TvShow,
    #[serde(alias = "youtube")]
    ShortVideo,
    #[serde(alias = "tiktok")]
    ViralClip,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Movie,
        Category::TvShow,
        Category::ShortVideo,
        Category::ViralClip,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Movie => "movie",
            Category::TvShow => "tv_show",
            Category::ShortVideo => "short_video",
            Category::ViralClip => "viral_clip",
        }
    }

    /// Fixed display metadata and ranking defaults for this category
    pub fn profile(&self) -> &'static CategoryProfile {
        match self {
            Category::Movie => &MOVIE_PROFILE,
            Category::TvShow => &TV_SHOW_PROFILE,
            Category::ShortVideo => &SHORT_VIDEO_PROFILE,
            Category::ViralClip => &VIRAL_CLIP_PROFILE,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "movie" | "movies" => Ok(Category::Movie),
            "tv_show" | "tv" => Ok(Category::TvShow),
            "short_video" | "youtube" => Ok(Category::ShortVideo),
            "viral_clip" | "tiktok" => Ok(Category::ViralClip),
            other => Err(ValidationError::UnknownCategory(other.to_string())),
        }
    }
}

/// Weights of the ranking sub-scores. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingWeights {
    pub text_relevance: f64,
    pub popularity: f64,
    pub rating: f64,
    pub recency: f64,
    pub affinity: f64,
}

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

impl RankingWeights {
    pub const DEFAULT: RankingWeights = RankingWeights {
        text_relevance: 0.30,
        popularity: 0.20,
        rating: 0.15,
        recency: 0.15,
        affinity: 0.20,
    };

    pub fn sum(&self) -> f64 {
        self.text_relevance + self.popularity + self.rating + self.recency + self.affinity
    }

    /// Checks that every weight is non-negative and that they sum to 1.0
    pub fn validate(&self) -> Result<(), ValidationError> {
        let weights = [
            ("text_relevance", self.text_relevance),
            ("popularity", self.popularity),
            ("rating", self.rating),
            ("recency", self.recency),
            ("affinity", self.affinity),
        ];

        if let Some((name, value)) = weights
            .iter()
            .find(|(_, w)| !w.is_finite() || *w < 0.0)
        {
            return Err(ValidationError::InvalidWeight { name: *name, value: *value });
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ValidationError::WeightSum(sum));
        }

        Ok(())
    }
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Display metadata for a category, served to the UI and used as ranking defaults
#[derive(Debug, Clone, Serialize)]
pub struct CategoryProfile {
    pub category: Category,
    pub label: &'static str,
    pub description: &'static str,
    pub weights: RankingWeights,
}

static MOVIE_PROFILE: CategoryProfile = CategoryProfile {
    category: Category::Movie,
    label: "Movies",
    description: "Feature films across streaming services",
    weights: RankingWeights::DEFAULT,
};

static TV_SHOW_PROFILE: CategoryProfile = CategoryProfile {
    category: Category::TvShow,
    label: "TV Shows",
    description: "Series and seasons to binge",
    weights: RankingWeights::DEFAULT,
};

static SHORT_VIDEO_PROFILE: CategoryProfile = CategoryProfile {
    category: Category::ShortVideo,
    label: "YouTube",
    description: "Videos from creators on YouTube",
    weights: RankingWeights {
        text_relevance: 0.35,
        popularity: 0.25,
        rating: 0.05,
        recency: 0.15,
        affinity: 0.20,
    },
};

// Trending clips are ranked on reach, not age
static VIRAL_CLIP_PROFILE: CategoryProfile = CategoryProfile {
    category: Category::ViralClip,
    label: "Viral Clips",
    description: "Short-form clips that are blowing up right now",
    weights: RankingWeights {
        text_relevance: 0.30,
        popularity: 0.45,
        rating: 0.05,
        recency: 0.0,
        affinity: 0.20,
    },
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_accepts_legacy_aliases() {
        assert_eq!("movies".parse::<Category>().unwrap(), Category::Movie);
        assert_eq!("tv".parse::<Category>().unwrap(), Category::TvShow);
        assert_eq!("youtube".parse::<Category>().unwrap(), Category::ShortVideo);
        assert_eq!("TikTok".parse::<Category>().unwrap(), Category::ViralClip);
    }

    #[test]
    fn test_category_rejects_unknown() {
        let err = "podcasts".parse::<Category>().unwrap_err();
        assert_eq!(err, ValidationError::UnknownCategory("podcasts".to_string()));
    }

    #[test]
    fn test_category_serde_alias() {
        let category: Category = serde_json::from_str(r#""tiktok""#).unwrap();
        assert_eq!(category, Category::ViralClip);
        assert_eq!(serde_json::to_string(&Category::TvShow).unwrap(), r#""tv_show""#);
    }

    #[test]
    fn test_builtin_profiles_are_valid() {
        for category in Category::ALL {
            let profile = category.profile();
            assert_eq!(profile.category, category);
            assert!(profile.weights.validate().is_ok(), "{} weights invalid", category);
        }
    }

    #[test]
    fn test_viral_clip_ignores_recency() {
        assert_eq!(Category::ViralClip.profile().weights.recency, 0.0);
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let weights = RankingWeights {
            text_relevance: 0.5,
            popularity: 0.5,
            rating: 0.5,
            recency: 0.0,
            affinity: 0.0,
        };
        assert!(matches!(weights.validate(), Err(ValidationError::WeightSum(_))));
    }

    #[test]
    fn test_weights_reject_negative() {
        let weights = RankingWeights {
            text_relevance: 1.2,
            popularity: -0.2,
            rating: 0.0,
            recency: 0.0,
            affinity: 0.0,
        };
        let err = weights.validate().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidWeight { name: "popularity", .. }));
    }
}
