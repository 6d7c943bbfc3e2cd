use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("duplicate template text: {text}")]
    DuplicateText { text: String },
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("word must not be empty")]
    EmptyWord,

    #[error("sentence must not be empty")]
    EmptySentence,

    #[error("word already exists: {0}")]
    DuplicateWord(String),

    #[error("unknown word: {0}")]
    UnknownWord(String),

    #[error("word has no templates: {0}")]
    NoTemplates(String),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
