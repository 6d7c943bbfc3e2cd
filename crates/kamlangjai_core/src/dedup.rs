use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;

use crate::schema::MotivationalSentenceEntry;

pub trait Timestamped {
    fn timestamp(&self) -> i64;
}

impl Timestamped for MotivationalSentenceEntry {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

pub fn dedupe_by<T, K, F, R>(entries: impl IntoIterator<Item = T>, key: F, replaces: R) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
    R: Fn(&T, &T) -> bool,
{
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut survivors: Vec<T> = Vec::new();

    for candidate in entries {
        match positions.entry(key(&candidate)) {
            Entry::Occupied(slot) => {
                if let Some(current) = survivors.get_mut(*slot.get()) {
                    if replaces(&candidate, current) {
                        *current = candidate;
                    }
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(survivors.len());
                survivors.push(candidate);
            }
        }
    }

    survivors
}

// On equal timestamps the later entry in input order wins.
pub fn dedupe_latest<T, K, F>(entries: impl IntoIterator<Item = T>, key: F) -> Vec<T>
where
    T: Timestamped,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    dedupe_by(entries, key, |candidate, current| {
        current.timestamp() <= candidate.timestamp()
    })
}

pub fn billboard_key(entry: &MotivationalSentenceEntry) -> (String, String, String) {
    (
        entry.word.clone(),
        entry.sentence.clone(),
        entry.contributor_name().to_string(),
    )
}

pub fn quote_key(entry: &MotivationalSentenceEntry) -> (String, String, String) {
    billboard_key(entry)
}

pub fn leaderboard_key(entry: &MotivationalSentenceEntry) -> (String, String) {
    (entry.word.clone(), entry.sentence.clone())
}

pub fn sort_newest_first(entries: &mut [MotivationalSentenceEntry]) {
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}
