/// MorphGNT reader.
///
/// Each line is one word with seven space-separated columns:
/// `bcv pos parse text word normalized lemma`, e.g.
/// `040101 N- ----NSM- λόγος, λόγος λόγος λόγος`.
/// Consecutive lines sharing a `bcv` code form one verse.
use std::fmt;
use std::io::Read;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::canon::Reference;
use crate::error::{ParseError, UnknownMorphCode};
use crate::model::{MorphTag, Token, Verse};

const MORPHGNT_COLUMNS: usize = 7;

/// One MorphGNT line.
#[derive(Debug, Clone, Deserialize)]
pub struct MorphGntRow {
    pub bcv: String,
    pub pos: String,
    pub parse: String,
    pub text: String,
    pub word: String,
    pub normalized: String,
    pub lemma: String,
}

/// One unvalidated Greek word: surface, lemma and morphology code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    pub surface: String,
    pub word: String,
    pub normalized: String,
    pub lemma: String,
    pub pos: String,
    pub parse: String,
}

impl RawToken {
    /// Build from a `(surface, lemma, morph code)` triple. The morph code is
    /// the part-of-speech code and parse code separated by whitespace, e.g.
    /// `V- 3AAI-S--`.
    #[must_use]
    pub fn triple(surface: &str, lemma: &str, morph_code: &str) -> Self {
        let mut parts = morph_code.split_whitespace();
        let pos = parts.next().unwrap_or_default().to_string();
        let parse = parts.next().unwrap_or_default().to_string();
        let word = strip_punctuation(surface);
        Self {
            surface: surface.to_string(),
            normalized: word.clone(),
            word,
            lemma: lemma.to_string(),
            pos,
            parse,
        }
    }
}

impl From<MorphGntRow> for RawToken {
    fn from(row: MorphGntRow) -> Self {
        Self {
            surface: row.text,
            word: row.word,
            normalized: row.normalized,
            lemma: row.lemma,
            pos: row.pos,
            parse: row.parse,
        }
    }
}

/// A morphology code that was kept as `Unrecognized` during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MorphWarning {
    pub reference: Reference,
    pub position: usize,
    pub error: UnknownMorphCode,
}

impl fmt::Display for MorphWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} word {}: {}", self.reference, self.position + 1, self.error)
    }
}

/// A validated verse plus the non-fatal diagnostics raised while building it.
#[derive(Debug, Clone)]
pub struct ParsedVerse {
    pub verse: Verse,
    pub warnings: Vec<MorphWarning>,
}

/// Validate one verse worth of raw tokens.
///
/// Unknown morphology codes do not fail the verse; the token is kept with
/// [`MorphTag::UNRECOGNIZED`] and a warning is returned alongside.
pub fn parse_greek_verse(reference: Reference, raw: &[RawToken]) -> Result<ParsedVerse, ParseError> {
    if raw.is_empty() {
        return Err(ParseError::EmptyVerse(reference));
    }

    let mut warnings = Vec::new();
    let tokens = raw
        .iter()
        .enumerate()
        .map(|(position, t)| {
            let morph = MorphTag::from_ccat(&t.pos, &t.parse).unwrap_or_else(|error| {
                warnings.push(MorphWarning {
                    reference,
                    position,
                    error,
                });
                MorphTag::UNRECOGNIZED
            });
            Token::new(
                position,
                t.surface.clone(),
                t.word.clone(),
                t.normalized.clone(),
                t.lemma.nfc().collect(),
                morph,
                format!("{} {}", t.pos, t.parse),
            )
        })
        .collect();

    Ok(ParsedVerse {
        verse: Verse::new(reference, tokens)?,
        warnings,
    })
}

/// Streams verses out of a MorphGNT file.
pub struct MorphGntVerses<R: Read> {
    records: csv::StringRecordsIntoIter<R>,
    pending: Option<(u64, MorphGntRow)>,
    done: bool,
}

impl<R: Read> MorphGntVerses<R> {
    pub fn new(reader: R) -> Self {
        let records = csv::ReaderBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .quoting(false)
            .flexible(true)
            .from_reader(reader)
            .into_records();
        Self {
            records,
            pending: None,
            done: false,
        }
    }

    fn next_row(&mut self) -> Option<Result<(u64, MorphGntRow), ParseError>> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => return Some(Err(ParseError::Csv(e))),
            };
            let line = record.position().map_or(0, |p| p.line());
            let fields: Vec<&str> = record.iter().filter(|f| !f.is_empty()).collect();
            if fields.is_empty() {
                continue;
            }
            if fields.len() != MORPHGNT_COLUMNS {
                return Some(Err(ParseError::Row {
                    line,
                    message: format!(
                        "expected {MORPHGNT_COLUMNS} columns, found {}",
                        fields.len()
                    ),
                }));
            }
            let row = csv::StringRecord::from(fields)
                .deserialize::<MorphGntRow>(None)
                .map_err(|e| ParseError::Row {
                    line,
                    message: e.to_string(),
                });
            return Some(row.map(|row| (line, row)));
        }
    }

    fn fail(&mut self, error: ParseError) -> Option<Result<ParsedVerse, ParseError>> {
        self.done = true;
        Some(Err(error))
    }
}

impl<R: Read> Iterator for MorphGntVerses<R> {
    type Item = Result<ParsedVerse, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let (_, first) = match self.pending.take() {
            Some(row) => row,
            None => match self.next_row()? {
                Ok(row) => row,
                Err(e) => return self.fail(e),
            },
        };

        let bcv = first.bcv.clone();
        let mut raw = vec![RawToken::from(first)];
        loop {
            match self.next_row() {
                None => break,
                Some(Err(e)) => return self.fail(e),
                Some(Ok((_, row))) if row.bcv == bcv => raw.push(RawToken::from(row)),
                Some(Ok(row)) => {
                    self.pending = Some(row);
                    break;
                }
            }
        }

        let reference = match Reference::from_bcv(&bcv) {
            Ok(r) => r,
            Err(e) => return self.fail(ParseError::Malformed(e)),
        };

        match parse_greek_verse(reference, &raw) {
            Ok(parsed) => Some(Ok(parsed)),
            Err(e) => self.fail(e),
        }
    }
}

fn strip_punctuation(surface: &str) -> String {
    surface
        .trim_matches(|c: char| {
            c.is_ascii_punctuation() || matches!(c, '\u{00B7}' | '\u{0387}' | '\u{037E}' | '\u{2014}')
        })
        .to_string()
}
