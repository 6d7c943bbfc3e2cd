use tracing::{debug, info};

use crate::dedup::{billboard_key, dedupe_latest, sort_newest_first};
use crate::error::ServiceError;
use crate::schema::{MotivationalSentenceEntry, Template, WordEntry};
use crate::sentiment::normalize_entry;
use crate::stats::{self, Leaderboard, MoodSummary};
use crate::store::{SlotStore, load_sentences, load_words, save_sentences, save_words};
use crate::template::{parse_batch, validate_unique};

pub type Result<T> = std::result::Result<T, ServiceError>;

pub struct Motivation<S: SlotStore> {
    store: S,
}

impl<S: SlotStore> Motivation<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn words(&self) -> Result<Vec<WordEntry>> {
        Ok(load_words(&self.store)?)
    }

    pub fn word(&self, word: &str) -> Result<WordEntry> {
        let word = word.trim();
        self.words()?
            .into_iter()
            .find(|entry| entry.word == word)
            .ok_or_else(|| ServiceError::UnknownWord(word.to_string()))
    }

    pub fn add_word(&mut self, word: &str, block: &str, is_custom: bool) -> Result<WordEntry> {
        let word = checked_word(word)?;
        let templates = checked_templates(&word, parse_batch(block))?;

        let mut words = self.words()?;
        if words.iter().any(|entry| entry.word == word) {
            return Err(ServiceError::DuplicateWord(word));
        }

        let entry = WordEntry {
            word,
            templates,
            is_custom,
        };
        words.push(entry.clone());
        save_words(&mut self.store, &words)?;

        info!(word = %entry.word, templates = entry.templates.len(), "added word");
        Ok(entry)
    }

    pub fn edit_word(&mut self, word: &str, block: &str) -> Result<WordEntry> {
        let word = checked_word(word)?;
        let templates = checked_templates(&word, parse_batch(block))?;

        let mut words = self.words()?;
        let entry = words
            .iter_mut()
            .find(|entry| entry.word == word)
            .ok_or_else(|| ServiceError::UnknownWord(word.clone()))?;
        entry.templates = templates;
        let edited = entry.clone();
        save_words(&mut self.store, &words)?;

        info!(word = %edited.word, templates = edited.templates.len(), "edited word");
        Ok(edited)
    }

    pub fn delete_word(&mut self, word: &str) -> Result<()> {
        let word = word.trim();
        let mut words = self.words()?;
        let before = words.len();
        words.retain(|entry| entry.word != word);
        if words.len() == before {
            return Err(ServiceError::UnknownWord(word.to_string()));
        }
        save_words(&mut self.store, &words)?;

        info!(word, "deleted word");
        Ok(())
    }

    pub fn import_words(&mut self, seeds: Vec<WordEntry>) -> Result<usize> {
        let mut words = self.words()?;
        let mut applied = 0;
        for seed in seeds {
            let word = checked_word(&seed.word)?;
            let parsed = seed
                .templates
                .iter()
                .map(|raw| raw.trim())
                .filter(|raw| !raw.is_empty())
                .map(Template::parse)
                .collect();
            let templates = checked_templates(&word, parsed)?;
            let entry = WordEntry {
                word,
                templates,
                is_custom: seed.is_custom,
            };

            match words.iter_mut().find(|existing| existing.word == entry.word) {
                Some(existing) => *existing = entry,
                None => words.push(entry),
            }
            applied += 1;
        }
        save_words(&mut self.store, &words)?;

        info!(applied, "imported words");
        Ok(applied)
    }

    pub fn sentences(&self) -> Result<Vec<MotivationalSentenceEntry>> {
        Ok(load_sentences(&self.store)?)
    }

    pub fn submit(
        &mut self,
        word: &str,
        contributor: &str,
        now: i64,
    ) -> Result<MotivationalSentenceEntry> {
        let word_entry = self.word(word)?;
        let mut sentences = self.sentences()?;

        let used = sentences
            .iter()
            .filter(|entry| entry.word == word_entry.word)
            .count();
        let raw = word_entry
            .templates
            .get(used % word_entry.templates.len().max(1))
            .ok_or_else(|| ServiceError::NoTemplates(word_entry.word.clone()))?;
        let template = Template::parse(raw);

        let sentence = template.expand(&word_entry.word);
        let entry = new_entry(&word_entry.word, &sentence, contributor, now, Some(&template));
        sentences.push(entry.clone());
        save_sentences(&mut self.store, &sentences)?;

        debug!(word = %entry.word, id = %entry.id(), "submitted sentence");
        Ok(entry)
    }

    pub fn accept_suggestion(
        &mut self,
        word: &str,
        sentence: &str,
        contributor: &str,
        now: i64,
    ) -> Result<MotivationalSentenceEntry> {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            return Err(ServiceError::EmptySentence);
        }
        let word_entry = self.word(word)?;

        let matching = word_entry
            .templates
            .iter()
            .map(|raw| Template::parse(raw))
            .find(|template| template.expand(&word_entry.word) == sentence);

        // Without a template the entry normalizes to neutral.
        let entry = new_entry(&word_entry.word, sentence, contributor, now, matching.as_ref());

        let mut sentences = self.sentences()?;
        sentences.push(entry.clone());
        save_sentences(&mut self.store, &sentences)?;

        debug!(word = %entry.word, id = %entry.id(), "accepted suggestion");
        Ok(entry)
    }

    pub fn billboard(&self) -> Result<Vec<MotivationalSentenceEntry>> {
        let mut entries = dedupe_latest(self.sentences()?, billboard_key);
        sort_newest_first(&mut entries);
        Ok(entries)
    }

    pub fn leaderboard(&self, limit: usize) -> Result<Leaderboard> {
        Ok(stats::leaderboard(&self.sentences()?, limit))
    }

    pub fn mood(&self) -> Result<MoodSummary> {
        Ok(stats::mood_summary(&self.sentences()?))
    }

    pub fn clear_sentences(&mut self) -> Result<()> {
        save_sentences(&mut self.store, &[])?;
        info!("cleared sentence log");
        Ok(())
    }
}

fn checked_word(word: &str) -> Result<String> {
    let word = word.trim();
    if word.is_empty() {
        return Err(ServiceError::EmptyWord);
    }
    Ok(word.to_string())
}

fn checked_templates(word: &str, templates: Vec<Template>) -> Result<Vec<String>> {
    validate_unique(&templates)?;
    if templates.is_empty() {
        return Err(ServiceError::NoTemplates(word.to_string()));
    }
    Ok(templates.iter().map(Template::raw).collect())
}

fn new_entry(
    word: &str,
    sentence: &str,
    contributor: &str,
    now: i64,
    template: Option<&Template>,
) -> MotivationalSentenceEntry {
    let mut entry = MotivationalSentenceEntry::new(word, sentence, contributor, now);
    if let Some(template) = template {
        entry.template = Some(template.raw());
        entry.sentiment = Some(template.sentiment);
    }
    normalize_entry(&mut entry);
    entry
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::error::TemplateError;
    use crate::schema::{Sentiment, ANONYMOUS_CONTRIBUTOR};
    use crate::store::{MemoryStore, SENTENCES_SLOT};

    fn service() -> Motivation<MemoryStore> {
        let mut service = Motivation::new(MemoryStore::new());
        service
            .add_word(
                "กำลังใจ",
                "${บวก}${กำลังใจ}คือพลัง\n${กลาง}วันนี้มี${กำลังใจ}ไหม",
                false,
            )
            .unwrap();
        service
    }

    #[test]
    fn add_word_stores_marked_templates() {
        let mut service = service();
        let entry = service.add_word(" สู้ ", "${สู้}ต่อไป, ${ลบ}ไม่${สู้}", true).unwrap();
        assert_eq!(entry.word, "สู้");
        assert_eq!(entry.templates, vec!["${บวก}${สู้}ต่อไป", "${ลบ}ไม่${สู้}"]);
        assert_eq!(service.words().unwrap().len(), 2);
    }

    #[test]
    fn add_word_rejects_duplicates_and_bad_batches() {
        let mut service = service();
        assert!(matches!(
            service.add_word("กำลังใจ", "${บวก}อีกครั้ง", false),
            Err(ServiceError::DuplicateWord(_))
        ));
        assert!(matches!(
            service.add_word("รัก", "${บวก}รักคือพลัง,${บวก}รักคือพลัง", false),
            Err(ServiceError::Template(TemplateError::DuplicateText { .. }))
        ));
        assert!(matches!(service.add_word("  ", "${บวก}x", false), Err(ServiceError::EmptyWord)));
        assert!(matches!(
            service.add_word("ว่าง", " , ", false),
            Err(ServiceError::NoTemplates(_))
        ));
        assert_eq!(service.words().unwrap().len(), 1);
    }

    #[test]
    fn edit_and_delete_word() {
        let mut service = service();
        let edited = service.edit_word("กำลังใจ", "${ลบ}หมด${กำลังใจ}").unwrap();
        assert_eq!(edited.templates, vec!["${ลบ}หมด${กำลังใจ}"]);
        assert!(matches!(service.edit_word("ไม่มี", "${บวก}x"), Err(ServiceError::UnknownWord(_))));

        service.delete_word("กำลังใจ").unwrap();
        assert!(service.words().unwrap().is_empty());
        assert!(matches!(service.delete_word("กำลังใจ"), Err(ServiceError::UnknownWord(_))));
    }

    #[test]
    fn submit_cycles_through_templates() {
        let mut service = service();
        let first = service.submit("กำลังใจ", "นิด", 10).unwrap();
        let second = service.submit("กำลังใจ", "", 11).unwrap();
        let third = service.submit("กำลังใจ", "นิด", 12).unwrap();

        assert_eq!(first.sentence, "กำลังใจคือพลัง");
        assert_eq!(first.score, Some(1));
        assert_eq!(first.polarity, Some(Sentiment::Positive));
        assert_eq!(first.template.as_deref(), Some("${บวก}${กำลังใจ}คือพลัง"));
        assert_eq!(first.id.as_deref(), Some("กำลังใจ-กำลังใจคือพลัง-นิด-10"));

        assert_eq!(second.sentence, "วันนี้มีกำลังใจไหม");
        assert_eq!(second.score, Some(0));
        assert_eq!(second.contributor, ANONYMOUS_CONTRIBUTOR);

        assert_eq!(third.sentence, first.sentence);
        assert_eq!(service.sentences().unwrap().len(), 3);
    }

    #[test]
    fn submit_unknown_word_fails() {
        let mut service = service();
        assert!(matches!(service.submit("ไม่มี", "นิด", 1), Err(ServiceError::UnknownWord(_))));
    }

    #[test]
    fn suggestion_takes_matching_template_sentiment() {
        let mut service = service();
        let matched = service
            .accept_suggestion("กำลังใจ", "วันนี้มีกำลังใจไหม", "นิด", 1)
            .unwrap();
        assert_eq!(matched.polarity, Some(Sentiment::Neutral));
        assert!(matched.template.is_some());

        let free = service.accept_suggestion("กำลังใจ", "ขอบคุณนะ", "นิด", 2).unwrap();
        assert_eq!(free.score, Some(0));
        assert_eq!(free.template, None);

        assert!(matches!(
            service.accept_suggestion("กำลังใจ", "  ", "นิด", 3),
            Err(ServiceError::EmptySentence)
        ));
    }

    #[test]
    fn suggestion_for_unknown_word_fails() {
        let mut service = service();
        assert!(matches!(
            service.accept_suggestion("ไม่มี", "สู้ต่อไป", "นิด", 1),
            Err(ServiceError::UnknownWord(word)) if word == "ไม่มี"
        ));
        assert!(service.sentences().unwrap().is_empty());
    }

    #[test]
    fn mood_handles_extreme_stored_scores() {
        let mut service = service();
        let log = format!(
            r#"[{{"word":"ก","sentence":"A","contributor":"X","timestamp":1,"score":{max}}},
                {{"word":"ข","sentence":"B","contributor":"Y","timestamp":2,"score":{max}}}]"#,
            max = i64::MAX
        );
        service.store_mut().save(SENTENCES_SLOT, &log).unwrap();

        let mood = service.mood().unwrap();
        assert_eq!(mood.total, 2);
        assert_eq!(mood.positive, 2);
        assert!(mood.average_score > 9.0e18);
    }

    #[test]
    fn billboard_is_deduplicated_and_newest_first() {
        let mut service = service();
        service.submit("กำลังใจ", "นิด", 1).unwrap();
        service.submit("กำลังใจ", "นิด", 2).unwrap();
        service.submit("กำลังใจ", "นิด", 3).unwrap();

        let billboard = service.billboard().unwrap();
        assert_eq!(billboard.len(), 2);
        assert_eq!(billboard[0].timestamp, 3);
        assert_eq!(billboard[1].timestamp, 2);
    }

    #[test]
    fn leaderboard_and_mood_read_the_log() {
        let mut service = service();
        service.submit("กำลังใจ", "นิด", 1).unwrap();
        service.submit("กำลังใจ", "หน่อย", 2).unwrap();

        let board = service.leaderboard(10).unwrap();
        assert_eq!(board.words.len(), 1);
        assert_eq!(board.words[0].count, 2);

        let mood = service.mood().unwrap();
        assert_eq!(mood.positive, 1);
        assert_eq!(mood.neutral, 1);
    }

    #[test]
    fn clear_empties_log_and_notifies() {
        let mut service = service();
        service.submit("กำลังใจ", "นิด", 1).unwrap();

        let cleared = Rc::new(Cell::new(false));
        let flag = Rc::clone(&cleared);
        service.store_mut().subscribe(Box::new(move |slot| {
            if slot == SENTENCES_SLOT {
                flag.set(true);
            }
        }));

        service.clear_sentences().unwrap();
        assert!(cleared.get());
        assert!(service.sentences().unwrap().is_empty());
        assert_eq!(service.words().unwrap().len(), 1);
    }

    #[test]
    fn import_replaces_existing_words() {
        let mut service = service();
        let applied = service
            .import_words(vec![
                WordEntry {
                    word: "กำลังใจ".into(),
                    templates: vec!["${ลบ}ไร้${กำลังใจ}".into()],
                    is_custom: true,
                },
                WordEntry {
                    word: "ฝัน".into(),
                    templates: vec!["${ฝัน}ให้ไกล".into()],
                    is_custom: false,
                },
            ])
            .unwrap();
        assert_eq!(applied, 2);

        let words = service.words().unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].templates, vec!["${ลบ}ไร้${กำลังใจ}"]);
        assert!(words[0].is_custom);
        assert_eq!(words[1].templates, vec!["${บวก}${ฝัน}ให้ไกล"]);
    }
}
