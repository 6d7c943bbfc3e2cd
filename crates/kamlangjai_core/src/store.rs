use std::collections::HashMap;

use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::schema::{MotivationalSentenceEntry, WordEntry};
use crate::sentiment::normalize_entry;

pub const SENTENCES_SLOT: &str = "motivation-sentences";
pub const WORDS_SLOT: &str = "word-polarity-database";

pub type Observer = Box<dyn Fn(&str)>;

pub trait SlotStore {
    fn load(&self, slot: &str) -> Result<Option<String>>;

    fn save(&mut self, slot: &str, contents: &str) -> Result<()>;

    fn subscribe(&mut self, observer: Observer);

    fn notify(&self, slot: &str);
}

#[derive(Default)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
    observers: Vec<Observer>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemoryStore {
    fn load(&self, slot: &str) -> Result<Option<String>> {
        Ok(self.slots.get(slot).cloned())
    }

    fn save(&mut self, slot: &str, contents: &str) -> Result<()> {
        self.slots.insert(slot.to_string(), contents.to_string());
        Ok(())
    }

    fn subscribe(&mut self, observer: Observer) {
        self.observers.push(observer);
    }

    fn notify(&self, slot: &str) {
        for observer in &self.observers {
            observer(slot);
        }
    }
}

pub fn load_words<S: SlotStore + ?Sized>(store: &S) -> Result<Vec<WordEntry>> {
    let mut words: Vec<WordEntry> = load_records(store, WORDS_SLOT)?;
    words.retain_mut(|entry| {
        entry.word = entry.word.trim().to_string();
        if entry.word.is_empty() {
            warn!(slot = WORDS_SLOT, "dropping word entry without a word");
            return false;
        }
        true
    });
    Ok(words)
}

pub fn load_sentences<S: SlotStore + ?Sized>(store: &S) -> Result<Vec<MotivationalSentenceEntry>> {
    let mut entries: Vec<MotivationalSentenceEntry> = load_records(store, SENTENCES_SLOT)?;
    for entry in &mut entries {
        normalize_entry(entry);
        if entry.id.is_none() {
            entry.id = Some(entry.composite_id());
        }
    }
    Ok(entries)
}

pub fn save_words<S: SlotStore + ?Sized>(store: &mut S, words: &[WordEntry]) -> Result<()> {
    save_records(store, WORDS_SLOT, words)
}

pub fn save_sentences<S: SlotStore + ?Sized>(
    store: &mut S,
    entries: &[MotivationalSentenceEntry],
) -> Result<()> {
    save_records(store, SENTENCES_SLOT, entries)
}

// Missing, unparsable or non-array slots read as empty.
fn load_records<T, S>(store: &S, slot: &str) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    S: SlotStore + ?Sized,
{
    let Some(raw) = store.load(slot)? else {
        return Ok(Vec::new());
    };

    let values = match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Array(values)) => values,
        Ok(_) => {
            warn!(slot, "slot does not hold an array, treating it as empty");
            return Ok(Vec::new());
        }
        Err(err) => {
            warn!(slot, %err, "malformed slot, treating it as empty");
            return Ok(Vec::new());
        }
    };

    let mut records = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value(value) {
            Ok(record) => records.push(record),
            Err(err) => warn!(slot, index, %err, "dropping malformed record"),
        }
    }
    Ok(records)
}

fn save_records<T, S>(store: &mut S, slot: &str, records: &[T]) -> Result<()>
where
    T: Serialize,
    S: SlotStore + ?Sized,
{
    let contents = serde_json::to_string(records)?;
    store.save(slot, &contents)?;
    debug!(slot, records = records.len(), "saved slot");
    store.notify(slot);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::schema::Sentiment;

    #[test]
    fn missing_slot_reads_empty() {
        let store = MemoryStore::new();
        assert!(load_words(&store).unwrap().is_empty());
        assert!(load_sentences(&store).unwrap().is_empty());
    }

    #[test]
    fn malformed_slot_reads_empty() {
        let mut store = MemoryStore::new();
        store.save(SENTENCES_SLOT, "{not json").unwrap();
        store.save(WORDS_SLOT, r#"{"word":"สู้"}"#).unwrap();
        assert!(load_sentences(&store).unwrap().is_empty());
        assert!(load_words(&store).unwrap().is_empty());
    }

    #[test]
    fn malformed_records_are_dropped_and_rest_normalized() {
        let mut store = MemoryStore::new();
        store
            .save(
                SENTENCES_SLOT,
                r#"[
                    {"word":"สู้","sentence":"สู้ต่อไป","contributor":"นิด","timestamp":1,"score":-2},
                    {"word":"สู้","timestamp":"yesterday"},
                    {"word":"รัก","sentence":"รักคือพลัง","timestamp":2,"polarity":"neutral","id":"keep"}
                ]"#,
            )
            .unwrap();

        let entries = load_sentences(&store).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].polarity, Some(Sentiment::Negative));
        assert_eq!(entries[0].id.as_deref(), Some("สู้-สู้ต่อไป-นิด-1"));
        assert_eq!(entries[1].score, Some(0));
        assert_eq!(entries[1].id.as_deref(), Some("keep"));
    }

    #[test]
    fn blank_words_are_dropped() {
        let mut store = MemoryStore::new();
        store
            .save(
                WORDS_SLOT,
                r#"[{"word":"  ","templates":[]},{"word":" สู้ ","templates":["${บวก}${สู้}"]}]"#,
            )
            .unwrap();
        let words = load_words(&store).unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].word, "สู้");
        assert!(!words[0].is_custom);
    }

    #[test]
    fn save_notifies_observers() {
        let mut store = MemoryStore::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe(Box::new(move |slot| sink.borrow_mut().push(slot.to_string())));

        let entry = MotivationalSentenceEntry::new("สู้", "สู้ต่อไป", "นิด", 1);
        save_sentences(&mut store, &[entry]).unwrap();
        save_words(&mut store, &[]).unwrap();

        assert_eq!(*seen.borrow(), vec![SENTENCES_SLOT.to_string(), WORDS_SLOT.to_string()]);
        assert_eq!(load_sentences(&store).unwrap().len(), 1);
    }
}
