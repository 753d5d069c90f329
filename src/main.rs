use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use koine::align::{AlignedVerse, Direction, Navigation};
use koine::canon::{Book, Reference};
use koine::config::Config;
use koine::loader::load_snapshot;
use koine::model::{MorphFilter, Referenced};
use koine::query::{Hit, QueryFacade};
use koine::translations::UserTranslations;

/// Greek New Testament study engine
#[derive(Parser, Debug)]
#[command(name = "koine", version)]
#[command(about = "Read SBLGNT alongside an English translation, with word-level morphology")]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(long, global = true, default_value = "config.json")]
    config: String,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show a verse in Greek and English with its morphology
    Verse { reference: String },

    /// List every occurrence of a lemma
    Lemma {
        lemma: String,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },

    /// List tokens matching a morphology filter, e.g. `pos=verb,tense=aorist`
    Morph {
        filter: MorphFilter,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },

    /// Show every verse between two references
    Scan { start: String, end: String },

    /// Move from a verse: next, previous, chapter-start, next-chapter-start
    Nav {
        reference: String,
        direction: Direction,
    },

    /// Find verses of a book by English text or Greek word/lemma
    Search { book: String, needle: String },

    /// Save your own translation of a verse (empty text removes it)
    Translate { reference: String, text: String },

    /// Show the load report
    Stats,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::load(&cli.config)?;
    config.validate().context("invalid configuration")?;

    if let Command::Translate { reference, text } = &cli.command {
        return translate(&config, reference, text);
    }

    let snapshot = load_snapshot(&config).context("failed to load texts")?;
    let facade = QueryFacade::new(Arc::new(snapshot));
    let translations = UserTranslations::load(&config.user_translations_path)?;
    let out = Output { json: cli.json };

    match &cli.command {
        Command::Verse { reference } => {
            let verse = facade.lookup_reference(reference.as_str())?;
            out.verse(&verse, translations.get(verse.reference))?;
        }
        Command::Lemma { lemma, limit } => {
            let mut found = facade.lookup_lemma(lemma);
            let total = found.hits.len();
            found.hits.truncate(*limit);
            if out.json {
                out.print_json(&found)?;
            } else {
                println!("{} ({total} occurrences)", found.lemma);
                if let Some(entry) = found.entry {
                    if let Some(translit) = &entry.transliteration {
                        println!("  {translit}");
                    }
                    if let Some(definition) = &entry.definition {
                        println!("  {definition}");
                    }
                }
                out.hits(&found.hits, total);
            }
        }
        Command::Morph { filter, limit } => {
            let mut hits = facade.lookup_morphology(filter);
            let total = hits.len();
            hits.truncate(*limit);
            if out.json {
                out.print_json(&hits)?;
            } else {
                out.hits(&hits, total);
            }
        }
        Command::Scan { start, end } => {
            let verses = facade.scan(start.as_str(), end.as_str())?;
            if out.json {
                out.print_json(&verses)?;
            } else {
                for verse in &verses {
                    out.summary(verse);
                }
            }
        }
        Command::Nav {
            reference,
            direction,
        } => {
            let reference: Reference = reference.parse()?;
            let moved = facade.snapshot().alignment().navigate(reference, *direction)?;
            match moved {
                Navigation::Moved(verse) => out.verse(&verse, translations.get(verse.reference))?,
                Navigation::Boundary if out.json => out.print_json(&moved)?,
                Navigation::Boundary => println!("No {direction} verse from {reference}"),
            }
        }
        Command::Search { book, needle } => {
            let book = Book::lookup(book).with_context(|| format!("unknown book '{book}'"))?;
            let verses = facade.snapshot().alignment().search_book(book, needle);
            if out.json {
                out.print_json(&verses)?;
            } else {
                for verse in &verses {
                    out.summary(verse);
                }
                println!("{} verses", verses.len());
            }
        }
        Command::Stats => {
            let report = facade.snapshot().report();
            if out.json {
                out.print_json(report)?;
            } else {
                println!("Loaded at        {}", report.loaded_at.to_rfc3339());
                println!(
                    "{:<16} {} verses, {} tokens",
                    report.greek_source, report.greek_verses, report.greek_tokens
                );
                println!("{:<16} {} verses", report.english_source, report.english_verses);
                println!("Lemmas           {}", report.lemmas);
                println!("Lexicon entries  {}", report.lexicon_entries);
                println!("Morph warnings   {}", report.morph_warnings.len());
                println!("English gaps     {}", report.english_gaps.len());
                for partial in report
                    .greek_partial_books
                    .iter()
                    .chain(&report.english_partial_books)
                {
                    println!("Partial book     {partial}");
                }
                println!("Without English  {}", report.missing_english.len());
                println!("Without Greek    {}", report.missing_greek.len());
                println!("Skipped books    {}", report.skipped_books.len());
                println!("Translations     {}", translations.len());
            }
        }
        // Saved before the texts are loaded
        Command::Translate { .. } => {}
    }

    Ok(())
}

fn translate(config: &Config, reference: &str, text: &str) -> Result<()> {
    let reference: Reference = reference.parse()?;
    let mut translations = UserTranslations::load(&config.user_translations_path)?;
    translations.set(reference, text);
    translations.save()?;
    info!("Saved translation for {reference}");
    Ok(())
}

// ── Output ───────────────────────────────────────────────────────────

struct Output {
    json: bool,
}

#[derive(Serialize)]
struct VerseView<'a> {
    #[serde(flatten)]
    verse: &'a AlignedVerse<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_translation: Option<&'a str>,
}

impl Output {
    fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn verse(&self, verse: &AlignedVerse<'_>, user_translation: Option<&str>) -> Result<()> {
        if self.json {
            return self.print_json(&VerseView {
                verse,
                user_translation,
            });
        }
        self.summary(verse);
        if let Some(text) = user_translation {
            println!("  mine: {text}");
        }
        println!();
        for token in verse.greek.tokens() {
            println!(
                "  {:>3}  {:<16} {:<16} {}",
                token.position() + 1,
                token.word(),
                token.lemma(),
                token.morph().describe()
            );
        }
        Ok(())
    }

    fn summary(&self, verse: &AlignedVerse<'_>) {
        println!("{}", verse.greek.reference());
        println!("  {}", verse.greek.text());
        match verse.english {
            Some(english) => println!("  {}", english.text()),
            None => println!("  (no English text)"),
        }
    }

    fn hits(&self, hits: &[Hit<'_>], total: usize) {
        for hit in hits {
            println!(
                "{:<20} {:<16} {}",
                format!("{} #{}", hit.occurrence.reference, hit.occurrence.position + 1),
                hit.token.surface(),
                hit.token.morph().describe()
            );
        }
        if total > hits.len() {
            println!("... {} more", total - hits.len());
        }
    }
}
