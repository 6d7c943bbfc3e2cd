use anyhow::Result;
use clap::{Parser, Subcommand};
use kamlangjai_core::config::{Config, DEFAULT_CONFIG_FILE};
use kamlangjai_core::db::SqliteStore;
use kamlangjai_core::schema::contributor_or_placeholder;
use kamlangjai_core::seed::load_seed_words;
use kamlangjai_core::sentiment::category;
use kamlangjai_core::stats::Ranking;
use kamlangjai_core::template::parse_templates;
use kamlangjai_core::{Motivation, MotivationalSentenceEntry, Sentiment};
use schemars::schema_for;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "kamlangjai")]
#[command(about = "Thai motivational word board", long_about = None)]
struct Cli {
    /// Configuration file (default: ./kamlangjai.toml)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the word table
    Word {
        #[command(subcommand)]
        command: WordCommands,
    },
    /// Turn a word into a sentence and add it to the board
    Submit {
        word: String,
        /// Display name (default: from config, else anonymous)
        #[arg(long)]
        contributor: Option<String>,
    },
    /// Add a free-text sentence for a word
    Suggest {
        word: String,
        sentence: String,
        #[arg(long)]
        contributor: Option<String>,
    },
    /// Show the deduplicated sentence board, newest first
    Billboard {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show top contributors and words
    Leaderboard {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show the mood summary
    Mood,
    /// Remove every sentence from the board
    Clear,
    /// Work with template batches
    Template {
        #[command(subcommand)]
        command: TemplateCommands,
    },
    /// Export canonical JSON Schemas to the ./schemas directory
    Schema {
        #[command(subcommand)]
        command: SchemaCommands,
    },
    /// Write markdown notes for the board, leaderboard and mood
    Report {
        /// Output directory (default: from config)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum WordCommands {
    /// List words and their templates
    List,
    /// Add a word; templates are separated by commas or newlines
    Add {
        word: String,
        templates: String,
        #[arg(long)]
        custom: bool,
    },
    /// Replace a word's templates
    Edit { word: String, templates: String },
    /// Remove a word
    Remove { word: String },
    /// Merge words from a YAML seed file
    Import { file: PathBuf },
}

#[derive(Subcommand)]
enum TemplateCommands {
    /// Parse and validate a batch of templates
    Check { block: String },
}

#[derive(Subcommand)]
enum SchemaCommands {
    /// Export JSON Schema files for canonical types
    Export {
        /// Output directory (default: ./schemas)
        #[arg(long, default_value = "schemas")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    debug!(config = %cli.config.display(), "loaded configuration");

    match cli.command {
        Commands::Word { command } => word_command(&mut open_service(&config)?, command),
        Commands::Submit { word, contributor } => {
            let contributor = contributor_name(&config, contributor);
            let entry = open_service(&config)?.submit(&word, &contributor, now_millis())?;
            print_entry(&entry);
            Ok(())
        }
        Commands::Suggest {
            word,
            sentence,
            contributor,
        } => {
            let contributor = contributor_name(&config, contributor);
            let entry = open_service(&config)?.accept_suggestion(
                &word,
                &sentence,
                &contributor,
                now_millis(),
            )?;
            print_entry(&entry);
            Ok(())
        }
        Commands::Billboard { json } => billboard(&open_service(&config)?, json),
        Commands::Leaderboard { limit } => {
            let limit = limit.unwrap_or(config.leaderboard.limit);
            leaderboard(&open_service(&config)?, limit)
        }
        Commands::Mood => mood(&open_service(&config)?),
        Commands::Clear => {
            open_service(&config)?.clear_sentences()?;
            println!("Cleared the board.");
            Ok(())
        }
        Commands::Template { command } => match command {
            TemplateCommands::Check { block } => template_check(&block),
        },
        Commands::Schema { command } => match command {
            SchemaCommands::Export { out_dir } => schema_export(out_dir),
        },
        Commands::Report { out_dir } => {
            let out_dir = out_dir.unwrap_or_else(|| config.report.out_dir.clone());
            report::build_report(&open_service(&config)?, config.leaderboard.limit, &out_dir)?;
            println!("Wrote report to {}", out_dir.display());
            Ok(())
        }
    }
}

fn open_service(config: &Config) -> Result<Motivation<SqliteStore>> {
    let db_path = config.storage.db_path.to_string_lossy();
    Ok(Motivation::new(SqliteStore::open(&db_path)?))
}

fn billboard(service: &Motivation<SqliteStore>, json: bool) -> Result<()> {
    let entries = service.billboard()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        println!("No sentences yet.");
    } else {
        entries.iter().for_each(print_entry);
    }
    Ok(())
}

fn leaderboard(service: &Motivation<SqliteStore>, limit: usize) -> Result<()> {
    let board = service.leaderboard(limit)?;
    println!("Contributors");
    print_rankings(&board.contributors);
    println!();
    println!("Words");
    print_rankings(&board.words);
    Ok(())
}

fn mood(service: &Motivation<SqliteStore>) -> Result<()> {
    let mood = service.mood()?;
    for sentiment in Sentiment::ALL {
        println!(
            "{}: {} ({}%)",
            category(sentiment.unit_score()).label(),
            mood.count(sentiment),
            mood.percent(sentiment)
        );
    }
    println!("total: {}, average score: {}", mood.total, mood.average_score);
    Ok(())
}

fn word_command(service: &mut Motivation<SqliteStore>, command: WordCommands) -> Result<()> {
    match command {
        WordCommands::List => {
            let words = service.words()?;
            if words.is_empty() {
                println!("No words yet.");
            }
            for word in words {
                let custom = if word.is_custom { " (custom)" } else { "" };
                println!("{}{custom}", word.word);
                for template in word.templates {
                    println!("  {template}");
                }
            }
        }
        WordCommands::Add {
            word,
            templates,
            custom,
        } => {
            let entry = service.add_word(&word, &templates, custom)?;
            println!("Added {} with {} templates", entry.word, entry.templates.len());
        }
        WordCommands::Edit { word, templates } => {
            let entry = service.edit_word(&word, &templates)?;
            println!("Updated {} with {} templates", entry.word, entry.templates.len());
        }
        WordCommands::Remove { word } => {
            service.delete_word(&word)?;
            println!("Removed {word}");
        }
        WordCommands::Import { file } => {
            let seeds = load_seed_words(&file)?;
            let applied = service.import_words(seeds)?;
            println!("Imported {applied} words from {}", file.display());
        }
    }
    Ok(())
}

fn template_check(block: &str) -> Result<()> {
    let templates = parse_templates(block)?;
    for template in &templates {
        println!(
            "[{}] {}",
            category(template.sentiment.unit_score()).label(),
            template.text
        );
    }
    println!("{} templates OK", templates.len());
    Ok(())
}

fn schema_export(out_dir: PathBuf) -> Result<()> {
    fs::create_dir_all(&out_dir)?;

    write_schema(&out_dir, "WordEntry", &schema_for!(kamlangjai_core::WordEntry))?;
    write_schema(&out_dir, "Template", &schema_for!(kamlangjai_core::Template))?;
    write_schema(
        &out_dir,
        "MotivationalSentenceEntry",
        &schema_for!(kamlangjai_core::MotivationalSentenceEntry),
    )?;

    println!("Exported schemas to {}", out_dir.display());
    Ok(())
}

fn write_schema(out_dir: &Path, name: &str, schema: &schemars::schema::RootSchema) -> Result<()> {
    let json = serde_json::to_string_pretty(schema)?;
    fs::write(out_dir.join(format!("{name}.schema.json")), json)?;
    Ok(())
}

fn contributor_name(config: &Config, flag: Option<String>) -> String {
    let name = flag
        .or_else(|| config.contributor.name.clone())
        .unwrap_or_default();
    contributor_or_placeholder(&name).to_string()
}

fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

fn print_entry(entry: &MotivationalSentenceEntry) {
    let score = entry.normalized().score;
    println!(
        "[{}] {} ({}, {})",
        category(score).label(),
        entry.sentence,
        entry.contributor_name(),
        entry.word
    );
}

fn print_rankings(rankings: &[Ranking]) {
    if rankings.is_empty() {
        println!("  (none)");
    }
    for (position, ranking) in rankings.iter().enumerate() {
        println!("  {}. {} ({})", position + 1, ranking.name, ranking.count);
    }
}
