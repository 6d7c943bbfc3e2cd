pub mod config;
pub mod db;
pub mod dedup;
pub mod error;
pub mod schema;
pub mod seed;
pub mod sentiment;
pub mod service;
pub mod stats;
pub mod store;
pub mod template;

pub use error::{ServiceError, TemplateError};
pub use schema::{MotivationalSentenceEntry, Sentiment, Template, WordEntry};
pub use service::Motivation;
