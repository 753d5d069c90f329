use std::fmt;

use serde::Serialize;

use super::reference::ReferenceIndex;
use crate::canon::{self, Book, Reference};
use crate::error::{DuplicateReference, NotFound};
use crate::model::Referenced;

/// A hole in the verse numbering of a corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerseGap {
    MissingVerse { reference: Reference },
    MissingChapter { book: Book, chapter: u16 },
}

impl fmt::Display for VerseGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVerse { reference } => write!(f, "{reference}"),
            Self::MissingChapter { book, chapter } => write!(f, "{book} {chapter} (whole chapter)"),
        }
    }
}

/// A book present only in part: the declared verses before `first` or after
/// `last` are absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PartialBook {
    pub book: Book,
    pub first: Reference,
    pub last: Reference,
    /// Declared verses outside `first..=last`, omissions excluded.
    pub missing: usize,
}

impl fmt::Display for PartialBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} only from {} to {} ({} verses absent)",
            self.book, self.first, self.last, self.missing
        )
    }
}

/// How completely a corpus covers the books it contains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Coverage {
    /// Holes between the first and last verse present in each book.
    pub gaps: Vec<VerseGap>,
    /// Books that start late or stop early.
    pub partial_books: Vec<PartialBook>,
}

impl Coverage {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.gaps.is_empty() && self.partial_books.is_empty()
    }
}

/// All verses of one source, keyed by reference.
#[derive(Debug, Clone)]
pub struct Corpus<V> {
    source: String,
    index: ReferenceIndex<V>,
}

impl<V: Referenced> Corpus<V> {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            index: ReferenceIndex::new(),
        }
    }

    /// Build a corpus in one go, failing on the first duplicate.
    pub fn from_verses(
        source: impl Into<String>,
        verses: impl IntoIterator<Item = V>,
    ) -> Result<Self, DuplicateReference> {
        let mut corpus = Self::new(source);
        for verse in verses {
            corpus.insert(verse)?;
        }
        Ok(corpus)
    }

    pub fn insert(&mut self, verse: V) -> Result<(), DuplicateReference> {
        self.index.put(verse)
    }

    /// Label of the source dataset, e.g. `SBLGNT`.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn index(&self) -> &ReferenceIndex<V> {
        &self.index
    }

    pub fn get(&self, reference: Reference) -> Result<&V, NotFound> {
        self.index.get(reference)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Books with at least one verse, in canonical order.
    #[must_use]
    pub fn books(&self) -> Vec<Book> {
        let mut books: Vec<Book> = self.index.references().map(|r| r.book()).collect();
        books.dedup();
        books
    }

    /// Highest chapter number present for a book (0 when absent).
    #[must_use]
    pub fn chapter_count(&self, book: Book) -> u16 {
        self.index
            .book(book)
            .next_back()
            .map_or(0, |v| v.reference().chapter())
    }

    /// Highest verse number present in a chapter (0 when absent).
    #[must_use]
    pub fn verse_count(&self, book: Book, chapter: u16) -> u16 {
        self.index
            .chapter(book, chapter)
            .next_back()
            .map_or(0, |v| v.reference().verse())
    }

    /// Every break in the numbering between the first and last verse of each
    /// book: verses missing from a chapter (its tail included) and chapters
    /// missing entirely. Verse numbers the canon declares omitted are not gaps.
    #[must_use]
    pub fn gaps(&self) -> Vec<VerseGap> {
        self.coverage().gaps
    }

    /// Check every book present against the declared chapter and verse
    /// counts.
    #[must_use]
    pub fn coverage(&self) -> Coverage {
        let mut coverage = Coverage::default();

        for book in self.books() {
            let mut verses = self.index.book(book).map(Referenced::reference);
            let Some(first) = verses.next() else {
                continue;
            };
            let last = verses.next_back().unwrap_or(first);

            for chapter in first.chapter()..=last.chapter() {
                if self.index.chapter(book, chapter).next().is_none() {
                    coverage.gaps.push(VerseGap::MissingChapter { book, chapter });
                    continue;
                }
                let from = if chapter == first.chapter() { first.verse() } else { 1 };
                let until = if chapter == last.chapter() {
                    last.verse()
                } else {
                    book.verses(chapter).unwrap_or(0)
                };
                for verse in from..=until {
                    let reference = Reference::bound(book, chapter, verse);
                    if !canon::is_omitted(book, chapter, verse) && !self.index.contains(reference) {
                        coverage.gaps.push(VerseGap::MissingVerse { reference });
                    }
                }
            }

            let missing = book
                .references()
                .filter(|r| *r < first || *r > last)
                .count();
            if missing > 0 {
                coverage.partial_books.push(PartialBook {
                    book,
                    first,
                    last,
                    missing,
                });
            }
        }

        coverage
    }
}
