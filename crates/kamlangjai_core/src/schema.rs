use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const ANONYMOUS_CONTRIBUTOR: &str = "ไม่ระบุชื่อ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    pub fn from_score(score: i64) -> Self {
        match score.signum() {
            1 => Sentiment::Positive,
            -1 => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }

    pub fn unit_score(self) -> i64 {
        match self {
            Sentiment::Positive => 1,
            Sentiment::Neutral => 0,
            Sentiment::Negative => -1,
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        };
        write!(f, "{value}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WordEntry {
    pub word: String,
    pub templates: Vec<String>, // marker-prefixed, e.g. "${บวก}${กำลังใจ}คือพลัง"
    #[serde(default)]
    pub is_custom: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Template {
    pub text: String,
    pub sentiment: Sentiment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MotivationalSentenceEntry {
    pub word: String,
    pub sentence: String,
    #[serde(default)]
    pub contributor: String,
    pub timestamp: i64, // milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>, // raw template the sentence was expanded from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polarity: Option<Sentiment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl MotivationalSentenceEntry {
    pub fn new(word: &str, sentence: &str, contributor: &str, timestamp: i64) -> Self {
        let mut entry = Self {
            word: word.to_string(),
            sentence: sentence.to_string(),
            contributor: contributor_or_placeholder(contributor).to_string(),
            timestamp,
            template: None,
            sentiment: None,
            score: None,
            polarity: None,
            id: None,
        };
        entry.id = Some(entry.composite_id());
        entry
    }

    pub fn composite_id(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.word,
            self.sentence,
            self.contributor_name(),
            self.timestamp
        )
    }

    pub fn id(&self) -> String {
        self.id.clone().unwrap_or_else(|| self.composite_id())
    }

    pub fn contributor_name(&self) -> &str {
        contributor_or_placeholder(&self.contributor)
    }
}

pub fn contributor_or_placeholder(name: &str) -> &str {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        ANONYMOUS_CONTRIBUTOR
    } else {
        trimmed
    }
}
