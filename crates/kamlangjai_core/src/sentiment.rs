use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::schema::{MotivationalSentenceEntry, Sentiment};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SentimentReading {
    pub score: Option<i64>,
    pub polarity: Option<Sentiment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Normalized {
    pub score: i64,
    pub polarity: Sentiment,
}

impl From<Normalized> for SentimentReading {
    fn from(value: Normalized) -> Self {
        Self {
            score: Some(value.score),
            polarity: Some(value.polarity),
        }
    }
}

pub fn normalize(reading: SentimentReading) -> Normalized {
    match (reading.score, reading.polarity) {
        (Some(score), _) => Normalized {
            score,
            polarity: Sentiment::from_score(score),
        },
        (None, Some(polarity)) => Normalized {
            score: polarity.unit_score(),
            polarity,
        },
        (None, None) => Normalized {
            score: 0,
            polarity: Sentiment::Neutral,
        },
    }
}

impl MotivationalSentenceEntry {
    pub fn normalized(&self) -> Normalized {
        normalize(SentimentReading {
            score: self.score,
            polarity: self.polarity.or(self.sentiment),
        })
    }
}

pub fn normalize_entry(entry: &mut MotivationalSentenceEntry) {
    let normalized = entry.normalized();
    entry.score = Some(normalized.score);
    entry.polarity = Some(normalized.polarity);
    entry.sentiment = Some(normalized.polarity);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Success,
    Destructive,
    Secondary,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Success => "เชิงบวก",
            Category::Destructive => "เชิงลบ",
            Category::Secondary => "กลาง",
        }
    }
}

pub fn category(score: i64) -> Category {
    match Sentiment::from_score(score) {
        Sentiment::Positive => Category::Success,
        Sentiment::Negative => Category::Destructive,
        Sentiment::Neutral => Category::Secondary,
    }
}
