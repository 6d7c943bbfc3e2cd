use std::collections::HashSet;
use std::convert::Infallible;
use std::str::FromStr;

use crate::error::TemplateError;
use crate::schema::{Sentiment, Template};

pub const POSITIVE_MARKER: &str = "${บวก}";
pub const NEUTRAL_MARKER: &str = "${กลาง}";
pub const NEGATIVE_MARKER: &str = "${ลบ}";

pub const DEFAULT_SENTIMENT: Sentiment = Sentiment::Positive;

impl Sentiment {
    pub fn marker(self) -> &'static str {
        match self {
            Sentiment::Positive => POSITIVE_MARKER,
            Sentiment::Neutral => NEUTRAL_MARKER,
            Sentiment::Negative => NEGATIVE_MARKER,
        }
    }
}

pub fn extract_sentiment(raw: &str) -> (String, Sentiment) {
    for sentiment in Sentiment::ALL {
        if let Some(text) = raw.strip_prefix(sentiment.marker()) {
            return (text.to_string(), sentiment);
        }
    }
    (raw.to_string(), DEFAULT_SENTIMENT)
}

pub fn to_raw_string(text: &str, sentiment: Sentiment) -> String {
    format!("{}{text}", sentiment.marker())
}

impl Template {
    pub fn new(text: impl Into<String>, sentiment: Sentiment) -> Self {
        Self {
            text: text.into(),
            sentiment,
        }
    }

    pub fn parse(raw: &str) -> Self {
        let (text, sentiment) = extract_sentiment(raw);
        Self { text, sentiment }
    }

    pub fn raw(&self) -> String {
        to_raw_string(&self.text, self.sentiment)
    }

    pub fn expand(&self, word: &str) -> String {
        expand(&self.text, word)
    }
}

impl FromStr for Template {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(Template::parse(raw))
    }
}

impl std::fmt::Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.sentiment.marker(), self.text)
    }
}

pub fn parse_batch(block: &str) -> Vec<Template> {
    block
        .split([',', '\n'])
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(Template::parse)
        .collect()
}

pub fn validate_unique(templates: &[Template]) -> Result<(), TemplateError> {
    let mut seen = HashSet::new();
    for template in templates {
        if !seen.insert(template.text.as_str()) {
            return Err(TemplateError::DuplicateText {
                text: template.text.clone(),
            });
        }
    }
    Ok(())
}

pub fn parse_templates(block: &str) -> Result<Vec<Template>, TemplateError> {
    let templates = parse_batch(block);
    validate_unique(&templates)?;
    Ok(templates)
}

pub fn expand(text: &str, word: &str) -> String {
    text.replace(&placeholder(word), word)
}

pub fn placeholder(word: &str) -> String {
    format!("${{{word}}}")
}
