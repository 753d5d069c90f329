use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::Book;
use crate::error::MalformedReference;

// A book given only by ordinal must be followed by whitespace; otherwise the
// book part has to end in a non-digit.
static REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+\s+|.*\D)\s*(\d+)\s*[:.]\s*(\d+)\s*$")
        .expect("reference pattern is valid")
});

/// A canonical (book, chapter, verse) key. Only constructible through
/// validation against the declared canon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Reference {
    book: Book,
    chapter: u16,
    verse: u16,
}

impl Reference {
    /// Validate a reference against the canon bounds.
    pub fn new(book: Book, chapter: u32, verse: u32) -> Result<Self, MalformedReference> {
        let max = book.chapters();
        if chapter == 0 || chapter > u32::from(max) {
            return Err(MalformedReference::ChapterOutOfRange {
                book: book.name(),
                chapter,
                max,
            });
        }
        let chapter = chapter as u16;
        let max = book.verses(chapter).unwrap_or(0);
        if verse == 0 || verse > u32::from(max) {
            return Err(MalformedReference::VerseOutOfRange {
                book: book.name(),
                chapter,
                verse,
                max,
            });
        }
        Ok(Self {
            book,
            chapter,
            verse: verse as u16,
        })
    }

    /// Resolve a book identifier and validate the chapter and verse.
    pub fn from_parts(book: &str, chapter: u32, verse: u32) -> Result<Self, MalformedReference> {
        let resolved =
            Book::lookup(book).ok_or_else(|| MalformedReference::UnknownBook(book.to_string()))?;
        Self::new(resolved, chapter, verse)
    }

    /// Parse a MorphGNT `BBCCVV` code, e.g. `040101` for John 1:1.
    pub fn from_bcv(code: &str) -> Result<Self, MalformedReference> {
        if code.len() != 6 || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MalformedReference::Syntax(code.to_string()));
        }
        let field = |range: std::ops::Range<usize>| code[range].parse::<u32>().unwrap_or(0);
        let ordinal = field(0..2);
        let book = Book::from_ordinal(ordinal)
            .ok_or_else(|| MalformedReference::UnknownBook(code[0..2].to_string()))?;
        Self::new(book, field(2..4), field(4..6))
    }

    /// Range bound that skips canon validation; never handed out to callers.
    pub(crate) fn bound(book: Book, chapter: u16, verse: u16) -> Self {
        Self {
            book,
            chapter,
            verse,
        }
    }

    #[must_use]
    pub fn book(&self) -> Book {
        self.book
    }

    #[must_use]
    pub fn chapter(&self) -> u16 {
        self.chapter
    }

    #[must_use]
    pub fn verse(&self) -> u16 {
        self.verse
    }

    /// MorphGNT `BBCCVV` code.
    #[must_use]
    pub fn bcv(&self) -> String {
        format!(
            "{:02}{:02}{:02}",
            self.book.ordinal(),
            self.chapter,
            self.verse
        )
    }

    #[must_use]
    pub fn same_chapter(&self, other: &Reference) -> bool {
        self.book == other.book && self.chapter == other.chapter
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.book, self.chapter, self.verse)
    }
}

impl FromStr for Reference {
    type Err = MalformedReference;

    /// Accepts `John 1:1`, `Jn 1.1`, `1 Cor 13:4`, `1Cor13:4` and `4 1:1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = REFERENCE_PATTERN
            .captures(s)
            .ok_or_else(|| MalformedReference::Syntax(s.trim().to_string()))?;
        let number = |i: usize| {
            caps[i]
                .parse::<u32>()
                .map_err(|_| MalformedReference::Syntax(s.trim().to_string()))
        };
        Self::from_parts(caps[1].trim(), number(2)?, number(3)?)
    }
}

/// Anything the query layer accepts as a verse reference.
pub trait IntoReference {
    fn into_reference(self) -> Result<Reference, MalformedReference>;
}

impl IntoReference for Reference {
    fn into_reference(self) -> Result<Reference, MalformedReference> {
        Ok(self)
    }
}

impl IntoReference for &Reference {
    fn into_reference(self) -> Result<Reference, MalformedReference> {
        Ok(*self)
    }
}

impl IntoReference for &str {
    fn into_reference(self) -> Result<Reference, MalformedReference> {
        self.parse()
    }
}

impl IntoReference for &String {
    fn into_reference(self) -> Result<Reference, MalformedReference> {
        self.parse()
    }
}

impl IntoReference for (&str, u32, u32) {
    fn into_reference(self) -> Result<Reference, MalformedReference> {
        Reference::from_parts(self.0, self.1, self.2)
    }
}
