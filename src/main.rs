use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use inkprint::config::Config;
use inkprint::db::SqliteProfileRepository;
use inkprint::engine::AttributionEngine;
use inkprint::features::patterns::PatternDictionary;
use inkprint::nlp::rules::RuleBasedAnalyzer;
use inkprint::output::terminal;
use inkprint::scoring::deadline::Deadline;

/// Inkprint: forensic authorship attribution.
///
/// Builds stylometric fingerprints from text, keeps per-author profiles,
/// ranks likely authors for an unknown text and flags stylistic drift.
#[derive(Parser)]
#[command(name = "inkprint", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Show the fingerprint of a text without storing it
    Fingerprint {
        /// Text file to analyze ("-" reads stdin)
        file: String,

        /// Print the fingerprint as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Add writing samples to an author profile
    Enroll {
        /// Sample files, each counted as one sample ("-" reads stdin)
        #[arg(required = true)]
        files: Vec<String>,

        /// Display name for the author
        #[arg(long)]
        name: String,

        /// Existing author id to merge into (a new id is generated if omitted)
        #[arg(long)]
        author: Option<String>,
    },

    /// Rank stored authors by how likely they wrote a text
    Compare {
        /// Text file to attribute ("-" reads stdin)
        file: String,

        /// Only show authors at or above this score (0-100)
        #[arg(long, default_value = "0")]
        min_confidence: f64,

        /// Stop scoring after this many milliseconds and show partial results
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Score a text against one author
    Score {
        /// Text file to score ("-" reads stdin)
        file: String,

        /// Author id
        author: String,
    },

    /// Check a new text against an author's baseline for stylistic drift
    Anomalies {
        /// Author id
        author: String,

        /// Text file to evaluate ("-" reads stdin)
        file: String,
    },

    /// List stored author profiles
    Profiles,

    /// Delete an author profile
    Delete {
        /// Author id
        author: String,
    },

    /// Show system status (DB size, profile counts, dictionary)
    Status,
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("inkprint=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Init => {
            info!("Initializing inkprint database...");
            let conn = inkprint::db::initialize(&config.db_path)?;
            let repository = SqliteProfileRepository::new(conn);
            let table_count = repository.table_count()?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nNext step: enroll an author");
            println!("  inkprint enroll --name \"Jane Doe\" samples/*.txt");
        }

        Commands::Fingerprint { file, json } => {
            let engine = build_engine(&config, false)?;
            let text = read_input(&file)?;
            let fingerprint = engine.extract_fingerprint(&text)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&fingerprint)?);
            } else {
                fingerprint.display(&engine.dictionary().names());
            }
        }

        Commands::Enroll {
            files,
            name,
            author,
        } => {
            let engine = build_engine(&config, true)?;
            let mut author_id = author;

            let pb = ProgressBar::new(files.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("  Enrolling [{bar:30}] {pos}/{len} {msg}")
                    .context("invalid progress bar template")?,
            );
            if files.len() < 2 {
                pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
            }

            for file in &files {
                pb.set_message(file.clone());
                let text = read_input(file)?;
                let mut fingerprint = engine
                    .extract_fingerprint(&text)
                    .with_context(|| format!("Failed to fingerprint {file}"))?;
                if fingerprint.low_confidence {
                    pb.suspend(|| {
                        println!(
                            "  {} {} has only {} words; it will count with low confidence",
                            "!".yellow(),
                            file,
                            fingerprint.sample_word_count
                        )
                    });
                }
                fingerprint.subject_id = author_id.clone();
                let id = engine.save_profile(&fingerprint, &name)?;
                author_id = Some(id);
                pb.inc(1);
            }
            pb.finish_and_clear();

            if let Some(id) = author_id {
                let profile = engine.get_profile(&id)?;
                println!(
                    "{} {} ({}) now has {} sample(s), {} words",
                    "Saved".green().bold(),
                    profile.display_name,
                    profile.author_id,
                    profile.sample_count,
                    profile.fingerprint.sample_word_count
                );
            }
        }

        Commands::Compare {
            file,
            min_confidence,
            timeout_ms,
        } => {
            let engine = build_engine(&config, false)?;
            let text = read_input(&file)?;
            let fingerprint = engine.extract_fingerprint(&text)?;
            let deadline = match timeout_ms {
                Some(ms) => Deadline::after(Duration::from_millis(ms)),
                None => Deadline::never(),
            };
            let ranked =
                engine.compare_to_profiles_with_deadline(&fingerprint, min_confidence, &deadline)?;
            if fingerprint.low_confidence {
                println!(
                    "{}",
                    "Sample is short; treat these scores with caution.".yellow()
                );
            }
            terminal::display_rankings(&ranked, min_confidence);
        }

        Commands::Score { file, author } => {
            let engine = build_engine(&config, false)?;
            let text = read_input(&file)?;
            let result = engine.attribution_score(&text, &author)?;
            terminal::display_attribution(&result);
        }

        Commands::Anomalies { author, file } => {
            let engine = build_engine(&config, false)?;
            let text = read_input(&file)?;
            let report = engine.detect_anomalies(&author, &text)?;
            terminal::display_anomaly_report(&report);
        }

        Commands::Profiles => {
            let engine = build_engine(&config, false)?;
            terminal::display_profiles(&engine.list_profiles()?);
        }

        Commands::Delete { author } => {
            let engine = build_engine(&config, true)?;
            if engine.delete_profile(&author)? {
                println!("Deleted profile {author}");
            } else {
                println!("No profile named {author}; nothing to delete");
            }
        }

        Commands::Status => {
            if !inkprint::status::database_exists(&config.db_path) {
                println!("Database: not initialized");
                println!("\nRun `inkprint init` to set up the database.");
                return Ok(());
            }
            let engine = build_engine(&config, false)?;
            inkprint::status::show(&engine, &config.db_path)?;
        }
    }

    Ok(())
}

/// Build the engine from the environment. Commands that write profiles
/// create the database on first use; read-only commands require it to exist.
fn build_engine(config: &Config, create: bool) -> Result<AttributionEngine> {
    let conn = if create {
        inkprint::db::initialize(&config.db_path)?
    } else {
        inkprint::db::open(&config.db_path)?
    };
    let repository = Arc::new(SqliteProfileRepository::new(conn));

    let dictionary = match &config.patterns_path {
        Some(path) => PatternDictionary::load(path)?,
        None => PatternDictionary::builtin()?,
    };

    let engine = AttributionEngine::new(
        Arc::new(RuleBasedAnalyzer),
        repository,
        dictionary,
        config.engine_config()?,
    )?;
    Ok(engine)
}

/// Read a text file, or stdin when `path` is "-".
fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))
}
