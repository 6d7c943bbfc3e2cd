use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::schema::WordEntry;

#[derive(Debug, Clone, Deserialize)]
struct SeedFile {
    words: Vec<WordEntry>,
}

pub fn load_seed_words(path: &Path) -> Result<Vec<WordEntry>> {
    let raw = fs::read_to_string(path)?;
    parse_seed_words(&raw)
}

pub fn parse_seed_words(raw: &str) -> Result<Vec<WordEntry>> {
    let parsed: SeedFile = serde_yaml::from_str(raw)?;
    Ok(parsed.words)
}
