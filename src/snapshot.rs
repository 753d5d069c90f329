/// The immutable bundle of corpora and indices built by one load.
///
/// A [`SnapshotBuilder`] collects verses from any number of sources, then
/// [`SnapshotBuilder::build`] runs the structural checks, builds the
/// morphological index and produces the [`LoadReport`]. Nothing in a
/// [`Snapshot`] changes after that.
use std::io::Read;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::align::AlignmentEngine;
use crate::canon::Reference;
use crate::error::{LoadError, ParseError};
use crate::index::{Corpus, MorphIndex, Occurrence, PartialBook, VerseGap};
use crate::lexicon::Lexicon;
use crate::model::{Rendering, Token, Verse};
use crate::parser::{MorphGntVerses, MorphWarning, ParsedVerse, TagScheme, parse_english_xml};

const DEFAULT_WARNING_LIMIT: usize = 20;

// ── Load report ──────────────────────────────────────────────────────

/// Non-fatal findings of a load, plus sizes.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub loaded_at: DateTime<Utc>,
    pub greek_source: String,
    pub english_source: String,
    pub greek_verses: usize,
    pub greek_tokens: usize,
    pub english_verses: usize,
    pub lemmas: usize,
    pub lexicon_entries: usize,
    /// Tokens kept with an unrecognized morphology code.
    pub morph_warnings: Vec<MorphWarning>,
    pub english_gaps: Vec<VerseGap>,
    /// Greek books loaded only in part; empty unless partial books are
    /// allowed.
    pub greek_partial_books: Vec<PartialBook>,
    pub english_partial_books: Vec<PartialBook>,
    /// Non-NT books found in the English input.
    pub skipped_books: Vec<String>,
    pub empty_english_verses: Vec<Reference>,
    /// Greek verses with no English counterpart.
    pub missing_english: Vec<Reference>,
    /// English verses with no Greek counterpart.
    pub missing_greek: Vec<Reference>,
}

impl LoadReport {
    /// True when the load produced no diagnostics at all.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.morph_warnings.is_empty()
            && self.english_gaps.is_empty()
            && self.greek_partial_books.is_empty()
            && self.english_partial_books.is_empty()
            && self.skipped_books.is_empty()
            && self.empty_english_verses.is_empty()
            && self.missing_english.is_empty()
            && self.missing_greek.is_empty()
    }
}

// ── Snapshot ─────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Snapshot {
    greek: Corpus<Verse>,
    english: Corpus<Rendering>,
    morphology: MorphIndex,
    lexicon: Option<Lexicon>,
    report: LoadReport,
}

impl Snapshot {
    #[must_use]
    pub fn greek(&self) -> &Corpus<Verse> {
        &self.greek
    }

    #[must_use]
    pub fn english(&self) -> &Corpus<Rendering> {
        &self.english
    }

    #[must_use]
    pub fn morphology(&self) -> &MorphIndex {
        &self.morphology
    }

    #[must_use]
    pub fn lexicon(&self) -> Option<&Lexicon> {
        self.lexicon.as_ref()
    }

    #[must_use]
    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    #[must_use]
    pub fn alignment(&self) -> AlignmentEngine<'_> {
        AlignmentEngine::new(&self.greek, &self.english)
    }

    /// The token an occurrence points at.
    #[must_use]
    pub fn resolve(&self, occurrence: &Occurrence) -> Option<&Token> {
        self.greek
            .get(occurrence.reference)
            .ok()
            .and_then(|verse| verse.token(occurrence.position))
    }
}

// ── Builder ──────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct SnapshotBuilder {
    greek: Corpus<Verse>,
    english: Corpus<Rendering>,
    lexicon: Option<Lexicon>,
    morph_warnings: Vec<MorphWarning>,
    skipped_books: Vec<String>,
    empty_english_verses: Vec<Reference>,
    warning_limit: usize,
    allow_partial_books: bool,
}

impl SnapshotBuilder {
    #[must_use]
    pub fn new(greek_label: impl Into<String>, english_label: impl Into<String>) -> Self {
        Self {
            greek: Corpus::new(greek_label),
            english: Corpus::new(english_label),
            lexicon: None,
            morph_warnings: Vec::new(),
            skipped_books: Vec::new(),
            empty_english_verses: Vec::new(),
            warning_limit: DEFAULT_WARNING_LIMIT,
            allow_partial_books: false,
        }
    }

    /// Accept Greek books that start late or stop early. Gaps inside the
    /// loaded span of a book stay fatal.
    #[must_use]
    pub fn allow_partial_books(mut self, allow: bool) -> Self {
        self.allow_partial_books = allow;
        self
    }

    /// How many individual diagnostics are logged before only a summary is.
    #[must_use]
    pub fn warning_limit(mut self, limit: usize) -> Self {
        self.warning_limit = limit;
        self
    }

    #[must_use]
    pub fn with_lexicon(mut self, lexicon: Lexicon) -> Self {
        self.lexicon = Some(lexicon);
        self
    }

    pub fn add_greek_verse(&mut self, parsed: ParsedVerse) -> Result<(), LoadError> {
        self.morph_warnings.extend(parsed.warnings);
        self.greek
            .insert(parsed.verse)
            .map_err(|source| LoadError::Duplicate {
                corpus: self.greek.source().to_string(),
                source,
            })
    }

    /// Read every verse from a MorphGNT stream. Returns the number of verses
    /// added.
    pub fn add_greek_rows<R: Read>(&mut self, origin: &str, reader: R) -> Result<usize, LoadError> {
        let mut added = 0;
        for parsed in MorphGntVerses::new(reader) {
            let parsed = parsed.map_err(|source| parse_error(origin, source))?;
            self.add_greek_verse(parsed)?;
            added += 1;
        }
        debug!("{origin}: {added} Greek verses");
        Ok(added)
    }

    pub fn add_rendering(&mut self, rendering: Rendering) -> Result<(), LoadError> {
        self.english
            .insert(rendering)
            .map_err(|source| LoadError::Duplicate {
                corpus: self.english.source().to_string(),
                source,
            })
    }

    /// Read every New Testament verse from an English XML document. Returns
    /// the number of verses added.
    pub fn add_english_xml(
        &mut self,
        origin: &str,
        xml: &str,
        scheme: TagScheme,
    ) -> Result<usize, LoadError> {
        let doc = parse_english_xml(xml, scheme).map_err(|source| parse_error(origin, source))?;
        let added = doc.renderings.len();
        for rendering in doc.renderings {
            self.add_rendering(rendering)?;
        }
        self.skipped_books.extend(doc.skipped_books);
        self.empty_english_verses.extend(doc.empty_verses);
        debug!("{origin}: {added} English verses");
        Ok(added)
    }

    /// Run the structural checks and freeze everything into a snapshot.
    ///
    /// Fails when the Greek corpus is empty, has gaps, or (unless allowed)
    /// covers only part of a book. Gaps, partial books and versification
    /// differences on the English side are only reported.
    pub fn build(self) -> Result<Snapshot, LoadError> {
        let limit = self.warning_limit;

        if self.greek.is_empty() {
            return Err(LoadError::EmptyCorpus(self.greek.source().to_string()));
        }
        let greek = self.greek.coverage();
        if !greek.gaps.is_empty() {
            return Err(LoadError::Gaps {
                corpus: self.greek.source().to_string(),
                gaps: greek.gaps,
            });
        }
        if !greek.partial_books.is_empty() && !self.allow_partial_books {
            return Err(LoadError::PartialBooks {
                corpus: self.greek.source().to_string(),
                books: greek.partial_books,
            });
        }
        if self.english.is_empty() {
            warn!("{} is empty; every verse will show Greek only", self.english.source());
        }

        let english = self.english.coverage();
        let missing_english: Vec<Reference> = self
            .greek
            .index()
            .references()
            .filter(|r| !self.english.index().contains(*r))
            .collect();
        let missing_greek: Vec<Reference> = self
            .english
            .index()
            .references()
            .filter(|r| !self.greek.index().contains(*r))
            .collect();

        log_limited("Unrecognized morphology", &self.morph_warnings, limit);
        log_limited("Partial Greek book", &greek.partial_books, limit);
        log_limited("English gap", &english.gaps, limit);
        log_limited("Partial English book", &english.partial_books, limit);
        log_limited("Greek verse without English", &missing_english, limit);
        log_limited("English verse without Greek", &missing_greek, limit);
        if !self.skipped_books.is_empty() {
            debug!("Skipped {} non-NT English books", self.skipped_books.len());
        }

        let morphology = MorphIndex::build(&self.greek);
        let greek_tokens = self.greek.index().iter().map(Verse::len).sum();

        let report = LoadReport {
            loaded_at: Utc::now(),
            greek_source: self.greek.source().to_string(),
            english_source: self.english.source().to_string(),
            greek_verses: self.greek.len(),
            greek_tokens,
            english_verses: self.english.len(),
            lemmas: morphology.lemma_count(),
            lexicon_entries: self.lexicon.as_ref().map_or(0, Lexicon::len),
            morph_warnings: self.morph_warnings,
            english_gaps: english.gaps,
            greek_partial_books: greek.partial_books,
            english_partial_books: english.partial_books,
            skipped_books: self.skipped_books,
            empty_english_verses: self.empty_english_verses,
            missing_english,
            missing_greek,
        };

        info!(
            "Snapshot ready: {} {} verses ({} tokens, {} lemmas), {} {} verses",
            report.greek_source,
            report.greek_verses,
            report.greek_tokens,
            report.lemmas,
            report.english_source,
            report.english_verses
        );

        Ok(Snapshot {
            greek: self.greek,
            english: self.english,
            morphology,
            lexicon: self.lexicon,
            report,
        })
    }
}

fn parse_error(origin: &str, source: ParseError) -> LoadError {
    LoadError::Parse {
        origin: origin.to_string(),
        source,
    }
}

fn log_limited<T: std::fmt::Display>(what: &str, items: &[T], limit: usize) {
    for item in items.iter().take(limit) {
        warn!("{what}: {item}");
    }
    if items.len() > limit {
        warn!("{what}: {} more not shown", items.len() - limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{RawToken, parse_greek_verse};

    const MORPHGNT: &str = "\
040101 P- -------- Ἐν Ἐν ἐν ἐν
040101 N- ----NSM- λόγος, λόγος λόγος λόγος
040102 RD ----NSM- οὗτος οὗτος οὗτος οὗτος
040103 V- 3AMI-S-- ἐγένετο ἐγένετο ἐγένετο γίνομαι
";

    const ESV: &str = r#"<bible>
<b n="Genesis"><c n="1"><v n="1">In the beginning, God created</v></c></b>
<b n="John"><c n="1">
<v n="1">In the beginning was the Word</v>
<v n="2">He was in the beginning with God.</v>
<v n="4">In him was life</v>
</c></b>
</bible>"#;

    fn builder() -> SnapshotBuilder {
        let mut builder = SnapshotBuilder::new("SBLGNT", "ESV").allow_partial_books(true);
        builder.add_greek_rows("64-Jn", MORPHGNT.as_bytes()).unwrap();
        builder.add_english_xml("esv.xml", ESV, TagScheme::Esv).unwrap();
        builder
    }

    #[test]
    fn test_build_reports_versification_differences() {
        let snapshot = builder().build().unwrap();
        let report = snapshot.report();

        assert_eq!(report.greek_verses, 3);
        assert_eq!(report.greek_tokens, 4);
        assert_eq!(report.english_verses, 3);
        assert_eq!(report.skipped_books, vec!["Genesis".to_string()]);
        assert_eq!(report.english_gaps.len(), 1);
        assert_eq!(report.greek_partial_books.len(), 1);
        assert_eq!(report.greek_partial_books[0].last.to_string(), "John 1:3");
        assert_eq!(report.english_partial_books[0].last.to_string(), "John 1:4");
        assert_eq!(report.missing_english[0].to_string(), "John 1:3");
        assert_eq!(report.missing_greek[0].to_string(), "John 1:4");
        assert!(!report.is_clean());
    }

    #[test]
    fn test_duplicate_greek_verse_is_fatal() {
        let mut builder = builder();
        let err = builder
            .add_greek_rows("dup", "040101 P- -------- Ἐν Ἐν ἐν ἐν\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, LoadError::Duplicate { .. }));
    }

    #[test]
    fn test_duplicate_english_verse_is_fatal() {
        let mut builder = SnapshotBuilder::new("SBLGNT", "ESV").allow_partial_books(true);
        builder.add_greek_rows("64-Jn", MORPHGNT.as_bytes()).unwrap();
        let xml = r#"<bible><b n="John"><c n="1">
<v n="1">In the beginning was the Word</v>
<v n="1">In the beginning was the Word, again</v>
</c></b></bible>"#;

        match builder.add_english_xml("esv.xml", xml, TagScheme::Esv) {
            Err(LoadError::Duplicate { corpus, source }) => {
                assert_eq!(corpus, "ESV");
                assert_eq!(source.0.to_string(), "John 1:1");
            }
            other => panic!("expected a duplicate reference error, got {other:?}"),
        }
    }

    #[test]
    fn test_partial_greek_book_needs_permission() {
        let mut builder = SnapshotBuilder::new("SBLGNT", "ESV");
        builder.add_greek_rows("64-Jn", MORPHGNT.as_bytes()).unwrap();
        match builder.build() {
            Err(LoadError::PartialBooks { books, .. }) => {
                assert_eq!(books.len(), 1);
                assert_eq!(books[0].book.name(), "John");
            }
            other => panic!("expected a partial book error, got {other:?}"),
        }
    }

    #[test]
    fn test_truncated_greek_chapter_is_fatal_even_when_partial() {
        let mut builder = SnapshotBuilder::new("SBLGNT", "ESV").allow_partial_books(true);
        for reference in ["John 1:1", "John 1:2", "John 2:1"] {
            let raw = [RawToken::triple("καὶ", "καί", "C- --------")];
            let parsed = parse_greek_verse(reference.parse().unwrap(), &raw).unwrap();
            builder.add_greek_verse(parsed).unwrap();
        }
        match builder.build() {
            Err(LoadError::Gaps { gaps, .. }) => {
                assert_eq!(gaps.len(), 49);
                assert_eq!(gaps[0].to_string(), "John 1:3");
            }
            other => panic!("expected gaps, got {other:?}"),
        }
    }

    #[test]
    fn test_greek_gap_is_fatal() {
        let mut builder = SnapshotBuilder::new("SBLGNT", "ESV");
        for reference in ["John 1:1", "John 1:3"] {
            let raw = [RawToken::triple("καὶ", "καί", "C- --------")];
            let parsed = parse_greek_verse(reference.parse().unwrap(), &raw).unwrap();
            builder.add_greek_verse(parsed).unwrap();
        }
        match builder.build() {
            Err(LoadError::Gaps { gaps, .. }) => assert_eq!(gaps[0].to_string(), "John 1:2"),
            other => panic!("expected gaps, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_greek_is_fatal() {
        let result = SnapshotBuilder::new("SBLGNT", "ESV").build();
        assert!(matches!(result, Err(LoadError::EmptyCorpus(_))));
    }

    #[test]
    fn test_parse_errors_name_their_origin() {
        let mut builder = SnapshotBuilder::new("SBLGNT", "ESV");
        let err = builder
            .add_greek_rows("broken.txt", "040101 P- --------\n".as_bytes())
            .unwrap_err();
        assert!(err.to_string().starts_with("broken.txt:"));
    }

    #[test]
    fn test_resolve_occurrence() {
        let snapshot = builder().build().unwrap();
        let hits = snapshot.morphology().lookup_by_lemma("λόγος");
        assert_eq!(hits.len(), 1);
        let token = snapshot.resolve(&hits[0]).unwrap();
        assert_eq!(token.surface(), "λόγος,");
        assert_eq!(token.position(), 1);
    }
}
