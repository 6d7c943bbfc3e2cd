use anyhow::Result;
use kamlangjai_core::dedup::{billboard_key, dedupe_latest, quote_key, sort_newest_first};
use kamlangjai_core::sentiment::category;
use kamlangjai_core::stats::{Leaderboard, MoodSummary, Ranking};
use kamlangjai_core::store::SlotStore;
use kamlangjai_core::{Motivation, MotivationalSentenceEntry, Sentiment, Template, WordEntry};
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::macros::format_description;

pub struct ReportPaths {
    pub root: PathBuf,
    pub index_dir: PathBuf,
    pub words_dir: PathBuf,
}

impl ReportPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            index_dir: root.join("00_Index"),
            words_dir: root.join("Words"),
            root,
        }
    }

    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.index_dir)?;
        fs::create_dir_all(&self.words_dir)?;
        Ok(())
    }
}

pub fn build_report<S: SlotStore>(
    service: &Motivation<S>,
    limit: usize,
    root: &Path,
) -> Result<()> {
    let words = service.words()?;
    let sentences = service.sentences()?;
    let leaderboard = service.leaderboard(limit)?;
    let mood = service.mood()?;
    write_report(&words, &sentences, &leaderboard, &mood, root)
}

pub fn write_report(
    words: &[WordEntry],
    sentences: &[MotivationalSentenceEntry],
    leaderboard: &Leaderboard,
    mood: &MoodSummary,
    root: &Path,
) -> Result<()> {
    let paths = ReportPaths::new(root);
    paths.ensure()?;
    let generated_at = format_now()?;

    let mut billboard = dedupe_latest(sentences.iter().cloned(), billboard_key);
    sort_newest_first(&mut billboard);

    // 1) Word notes and their index
    let mut word_index: Vec<String> = Vec::new();
    word_index.push("# MOC - Words".to_string());
    word_index.push(String::new());
    word_index.push("This index is generated. Do not edit manually.".to_string());
    word_index.push(String::new());

    for word in words {
        write_word_note(&paths, word, sentences)?;
        word_index.push(format!(
            "- [[Words/{}|{}]] ({} templates)",
            note_name(&word.word),
            word.word,
            word.templates.len()
        ));
    }
    if words.is_empty() {
        word_index.push("_No words yet._".to_string());
    }
    fs::write(paths.index_dir.join("MOC - Words.md"), word_index.join("\n"))?;

    // 2) Billboard
    let mut md = frontmatter(&generated_at, &[("entries", billboard.len().to_string())]);
    md.push_str("# Billboard\n\n");
    if billboard.is_empty() {
        md.push_str("_No sentences yet._\n");
    } else {
        md.push_str("| Time | Word | Sentence | Contributor | Mood |\n");
        md.push_str("|---|---|---|---|---|\n");
        for entry in &billboard {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                format_millis(entry.timestamp),
                escape_cell(&entry.word),
                escape_cell(&entry.sentence),
                escape_cell(entry.contributor_name()),
                category(entry.normalized().score).label()
            ));
        }
    }
    fs::write(paths.index_dir.join("Billboard.md"), md)?;

    // 3) Leaderboard
    let mut md = frontmatter(
        &generated_at,
        &[
            ("contributors", leaderboard.contributors.len().to_string()),
            ("words", leaderboard.words.len().to_string()),
        ],
    );
    md.push_str("# Leaderboard\n\n");
    md.push_str("## Contributors\n\n");
    push_rankings(&mut md, &leaderboard.contributors);
    md.push_str("\n## Words\n\n");
    push_rankings(&mut md, &leaderboard.words);
    fs::write(paths.index_dir.join("Leaderboard.md"), md)?;

    // 4) Mood
    let mut md = String::new();
    md.push_str("---\n");
    md.push_str(&format!("generated_at: {generated_at}\n"));
    md.push_str("mood_json: |\n");
    md.push_str(&indent_yaml_block(&serde_json::to_string_pretty(mood)?));
    md.push_str("---\n\n");
    md.push_str("# Mood\n\n");
    for sentiment in Sentiment::ALL {
        md.push_str(&format!(
            "- {}: {} ({}%)\n",
            category(sentiment.unit_score()).label(),
            mood.count(sentiment),
            mood.percent(sentiment)
        ));
    }
    md.push_str(&format!("\n- Total: {}\n", mood.total));
    md.push_str(&format!("- Average score: {}\n", mood.average_score));
    match mood.dominant {
        Some(sentiment) => md.push_str(&format!(
            "- Dominant: {}\n",
            category(sentiment.unit_score()).label()
        )),
        None => md.push_str("- Dominant: _none_\n"),
    }
    fs::write(paths.index_dir.join("Mood.md"), md)?;

    Ok(())
}

fn write_word_note(
    paths: &ReportPaths,
    word: &WordEntry,
    sentences: &[MotivationalSentenceEntry],
) -> Result<()> {
    let note_path = paths.words_dir.join(format!("{}.md", note_name(&word.word)));

    let mut md = String::new();
    md.push_str("---\n");
    md.push_str(&format!("word: {}\n", word.word));
    md.push_str(&format!("is_custom: {}\n", word.is_custom));
    md.push_str("templates_json: |\n");
    md.push_str(&indent_yaml_block(&serde_json::to_string_pretty(&word.templates)?));
    md.push_str("---\n\n");

    md.push_str(&format!("# {}\n\n", word.word));

    md.push_str("## Templates\n");
    for raw in &word.templates {
        let template = Template::parse(raw);
        md.push_str(&format!(
            "- [{}] {}\n",
            category(template.sentiment.unit_score()).label(),
            template.text
        ));
    }

    md.push_str("\n## Quotes\n");
    let own = sentences.iter().filter(|entry| entry.word == word.word).cloned();
    let mut quotes = dedupe_latest(own, quote_key);
    sort_newest_first(&mut quotes);
    if quotes.is_empty() {
        md.push_str("_No sentences yet._\n");
    }
    for entry in &quotes {
        md.push_str(&format!(
            "- {} ({}, `{}`)\n",
            entry.sentence,
            entry.contributor_name(),
            format_millis(entry.timestamp)
        ));
    }

    fs::write(note_path, md)?;
    Ok(())
}

fn frontmatter(generated_at: &str, fields: &[(&str, String)]) -> String {
    let mut md = String::new();
    md.push_str("---\n");
    md.push_str(&format!("generated_at: {generated_at}\n"));
    for (key, value) in fields {
        md.push_str(&format!("{key}: {value}\n"));
    }
    md.push_str("---\n\n");
    md
}

fn push_rankings(md: &mut String, rankings: &[Ranking]) {
    if rankings.is_empty() {
        md.push_str("_No entries yet._\n");
        return;
    }
    for (position, ranking) in rankings.iter().enumerate() {
        md.push_str(&format!("{}. {} ({})\n", position + 1, ranking.name, ranking.count));
    }
}

fn indent_yaml_block(s: &str) -> String {
    let mut out = String::new();
    for line in s.lines() {
        out.push_str("  ");
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn note_name(word: &str) -> String {
    let mut name = String::with_capacity(word.len());
    for c in word.chars() {
        match c {
            '%' => name.push_str("%25"),
            '/' => name.push_str("%2F"),
            '\\' => name.push_str("%5C"),
            _ => name.push(c),
        }
    }
    name
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}

fn format_now() -> Result<String> {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second] UTC");
    Ok(OffsetDateTime::now_utc().format(format)?)
}

fn format_millis(millis: i64) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .ok()
        .and_then(|moment| moment.format(format).ok())
        .unwrap_or_else(|| millis.to_string())
}
