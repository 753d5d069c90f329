/// Error taxonomy for loading and querying the corpora.
///
/// Load-time structural errors (`MalformedReference`, `DuplicateReference`,
/// gaps in the Greek text) abort a load. Query-time conditions are returned
/// as [`QueryError`] values and never panic.
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::canon::Reference;
use crate::index::corpus::{PartialBook, VerseGap};

/// A reference string or tuple that does not fit the declared canon.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedReference {
    #[error("unrecognized book '{0}' (not part of the New Testament canon)")]
    UnknownBook(String),

    #[error("{book} has {max} chapters, there is no chapter {chapter}")]
    ChapterOutOfRange {
        book: &'static str,
        chapter: u32,
        max: u16,
    },

    #[error("{book} {chapter} has {max} verses, there is no verse {verse}")]
    VerseOutOfRange {
        book: &'static str,
        chapter: u16,
        verse: u32,
        max: u16,
    },

    #[error("cannot parse reference '{0}'")]
    Syntax(String),
}

/// A morphology code outside the recognized CCAT vocabulary.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("unknown morphology code '{code}': {reason}")]
pub struct UnknownMorphCode {
    pub code: String,
    pub reason: String,
}

/// Two verses in one corpus claim the same reference.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("duplicate verse reference {0}")]
pub struct DuplicateReference(pub Reference);

/// A well-formed reference with no verse behind it.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{0} is not in the corpus")]
pub struct NotFound(pub Reference);

/// A scan whose start lies after its end.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid range: {start} comes after {end}")]
pub struct InvalidRange {
    pub start: Reference,
    pub end: Reference,
}

/// A morphology filter expression that could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid morphology filter '{input}': {reason}")]
pub struct InvalidFilter {
    pub input: String,
    pub reason: String,
}

/// Errors raised while turning raw input into verses.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error(transparent)]
    Malformed(#[from] MalformedReference),

    #[error("verse {0} has no content")]
    EmptyVerse(Reference),

    #[error("line {line}: {message}")]
    Row { line: u64, message: String },

    #[error("invalid CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid XML input: {0}")]
    Xml(String),
}

/// Fatal errors of the load phase. No snapshot is published when one occurs.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: ParseError,
    },

    #[error("{corpus}: {source}")]
    Duplicate {
        corpus: String,
        #[source]
        source: DuplicateReference,
    },

    #[error("{corpus} has missing verses: {}", describe_gaps(.gaps))]
    Gaps { corpus: String, gaps: Vec<VerseGap> },

    #[error("{corpus} does not cover whole books: {}", describe_gaps(.books))]
    PartialBooks {
        corpus: String,
        books: Vec<PartialBook>,
    },

    #[error("no verses were loaded into {0}")]
    EmptyCorpus(String),
}

/// The user-facing error set of the query façade.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("malformed reference: {0}")]
    MalformedReference(#[from] MalformedReference),

    #[error("not available: {0}")]
    NotFound(#[from] NotFound),

    #[error(transparent)]
    InvalidRange(#[from] InvalidRange),
}

fn describe_gaps<T: std::fmt::Display>(items: &[T]) -> String {
    const SHOWN: usize = 5;
    let mut listed: Vec<String> = items.iter().take(SHOWN).map(|g| g.to_string()).collect();
    if items.len() > SHOWN {
        listed.push(format!("and {} more", items.len() - SHOWN));
    }
    listed.join(", ")
}
