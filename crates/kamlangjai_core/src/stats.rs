use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::dedup::{billboard_key, dedupe_latest, leaderboard_key};
use crate::schema::{MotivationalSentenceEntry, Sentiment};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Ranking {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Leaderboard {
    pub contributors: Vec<Ranking>,
    pub words: Vec<Ranking>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MoodSummary {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub total: usize,
    pub average_score: f64,
    pub dominant: Option<Sentiment>,
}

impl MoodSummary {
    pub fn count(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
        }
    }

    pub fn percent(&self, sentiment: Sentiment) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        round_score(self.count(sentiment) as f64 * 100.0 / self.total as f64, 1)
    }
}

pub fn contributor_ranking(entries: &[MotivationalSentenceEntry]) -> Vec<Ranking> {
    rank(entries, |entry| entry.contributor_name().to_string())
}

pub fn word_ranking(entries: &[MotivationalSentenceEntry]) -> Vec<Ranking> {
    rank(entries, |entry| entry.word.clone())
}

pub fn leaderboard(entries: &[MotivationalSentenceEntry], limit: usize) -> Leaderboard {
    let mut contributors = contributor_ranking(entries);
    let mut words = word_ranking(entries);
    contributors.truncate(limit);
    words.truncate(limit);
    Leaderboard {
        contributors,
        words,
    }
}

fn rank<F>(entries: &[MotivationalSentenceEntry], name: F) -> Vec<Ranking>
where
    F: Fn(&MotivationalSentenceEntry) -> String,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for entry in dedupe_latest(entries.iter().cloned(), leaderboard_key) {
        *counts.entry(name(&entry)).or_insert(0) += 1;
    }

    let mut rankings: Vec<Ranking> = counts
        .into_iter()
        .map(|(name, count)| Ranking { name, count })
        .collect();
    rankings.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    rankings
}

pub fn mood_summary(entries: &[MotivationalSentenceEntry]) -> MoodSummary {
    let deduped = dedupe_latest(entries.iter().cloned(), billboard_key);

    let mut positive = 0;
    let mut neutral = 0;
    let mut negative = 0;
    let mut score_sum = 0i128;
    for entry in &deduped {
        let normalized = entry.normalized();
        score_sum += i128::from(normalized.score);
        match normalized.polarity {
            Sentiment::Positive => positive += 1,
            Sentiment::Neutral => neutral += 1,
            Sentiment::Negative => negative += 1,
        }
    }

    let total = deduped.len();
    let average_score = if total == 0 {
        0.0
    } else {
        round_score(score_sum as f64 / total as f64, 2)
    };

    let mut summary = MoodSummary {
        positive,
        neutral,
        negative,
        total,
        average_score,
        dominant: None,
    };

    // Ties resolve in `Sentiment::ALL` order.
    let mut best = 0;
    for sentiment in Sentiment::ALL {
        let count = summary.count(sentiment);
        if count > best {
            best = count;
            summary.dominant = Some(sentiment);
        }
    }

    summary
}

fn round_score(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(
        word: &str,
        sentence: &str,
        contributor: &str,
        timestamp: i64,
        score: i64,
    ) -> MotivationalSentenceEntry {
        let mut entry = MotivationalSentenceEntry::new(word, sentence, contributor, timestamp);
        entry.score = Some(score);
        entry
    }

    fn sample() -> Vec<MotivationalSentenceEntry> {
        vec![
            entry("สู้", "สู้ต่อไป", "นิด", 1, 1),
            entry("สู้", "สู้ต่อไป", "หน่อย", 2, 1),
            entry("สู้", "สู้ไม่ถอย", "นิด", 3, 1),
            entry("ท้อ", "ท้อได้แต่อย่าถอย", "นิด", 4, -1),
            entry("เฉย", "เฉยๆ", "", 5, 0),
            entry("เฉย", "เฉยๆ", "", 6, 0),
        ]
    }

    #[test]
    fn contributors_are_ranked_by_distinct_sentences() {
        let names: Vec<(String, usize)> = contributor_ranking(&sample())
            .into_iter()
            .map(|ranking| (ranking.name, ranking.count))
            .collect();
        assert_eq!(
            names,
            vec![
                ("นิด".to_string(), 2),
                ("หน่อย".to_string(), 1),
                (crate::schema::ANONYMOUS_CONTRIBUTOR.to_string(), 1),
            ]
        );
    }

    #[test]
    fn words_are_ranked_and_limited() {
        let board = leaderboard(&sample(), 1);
        assert_eq!(
            board.words,
            vec![Ranking {
                name: "สู้".into(),
                count: 2
            }]
        );
        assert_eq!(board.contributors.len(), 1);
    }

    #[test]
    fn mood_counts_deduplicated_entries() {
        let mood = mood_summary(&sample());
        assert_eq!(mood.total, 5);
        assert_eq!(mood.positive, 3);
        assert_eq!(mood.neutral, 1);
        assert_eq!(mood.negative, 1);
        assert_eq!(mood.average_score, 0.4);
        assert_eq!(mood.dominant, Some(Sentiment::Positive));
        assert_eq!(mood.percent(Sentiment::Positive), 60.0);
    }

    #[test]
    fn mood_ties_prefer_positive_then_neutral() {
        let mood = mood_summary(&[entry("ก", "A", "X", 1, 0), entry("ข", "B", "X", 2, -1)]);
        assert_eq!(mood.dominant, Some(Sentiment::Neutral));

        let empty = mood_summary(&[]);
        assert_eq!(empty.total, 0);
        assert_eq!(empty.dominant, None);
        assert_eq!(empty.average_score, 0.0);
        assert_eq!(empty.percent(Sentiment::Negative), 0.0);
    }

    #[test]
    fn mood_average_survives_extreme_scores() {
        let mood = mood_summary(&[
            entry("ก", "A", "X", 1, i64::MAX),
            entry("ข", "B", "Y", 2, i64::MAX),
        ]);
        assert_eq!(mood.positive, 2);
        assert!(mood.average_score > 9.0e18);

        let mood = mood_summary(&[
            entry("ก", "A", "X", 1, i64::MIN),
            entry("ข", "B", "Y", 2, i64::MIN),
        ]);
        assert_eq!(mood.negative, 2);
        assert!(mood.average_score < -9.0e18);
    }
}
