//! The declared New Testament canon.
//!
//! Books are identified by their canonical ordinal (Matthew = 1 … Revelation =
//! 27) and can be looked up by full name, short abbreviation, or the KJV/OSIS
//! style abbreviation used by many XML Bibles.
pub mod reference;

pub use reference::{IntoReference, Reference};

use std::fmt;

use serde::{Serialize, Serializer};

/// Static description of one canonical book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookInfo {
    pub ordinal: u8,
    pub name: &'static str,
    pub abbrev: &'static str,
    pub title: &'static str,
    pub osis: &'static str,
    /// Verse count of each chapter, in chapter order.
    pub verses: &'static [u16],
}

const fn book(
    ordinal: u8,
    name: &'static str,
    abbrev: &'static str,
    title: &'static str,
    osis: &'static str,
    verses: &'static [u16],
) -> BookInfo {
    BookInfo {
        ordinal,
        name,
        abbrev,
        title,
        osis,
        verses,
    }
}

// Where the SBLGNT and the common English versification disagree the larger
// count is declared here, and the numbers the SBLGNT lacks are listed in
// OMITTED_VERSES.
pub const BOOKS: [BookInfo; 27] = [
    book(1, "Matthew", "Mt", "The Gospel According to Matthew", "Matt", &[
        25, 23, 17, 25, 48, 34, 29, 34, 38, 42, 30, 50, 58, 36, 39, 28, 27, 35, 30, 34, 46, 46,
        39, 51, 46, 75, 66, 20,
    ]),
    book(2, "Mark", "Mk", "The Gospel According to Mark", "Mark", &[
        45, 28, 35, 41, 43, 56, 37, 38, 50, 52, 33, 44, 37, 72, 47, 20,
    ]),
    book(3, "Luke", "Lk", "The Gospel According to Luke", "Luke", &[
        80, 52, 38, 44, 39, 49, 50, 56, 62, 42, 54, 59, 35, 35, 32, 31, 37, 43, 48, 47, 38, 71,
        56, 53,
    ]),
    book(4, "John", "Jn", "The Gospel According to John", "John", &[
        51, 25, 36, 54, 47, 71, 53, 59, 41, 42, 57, 50, 38, 31, 27, 33, 26, 40, 42, 31, 25,
    ]),
    book(5, "Acts", "Acts", "The Acts of the Apostles", "Acts", &[
        26, 47, 26, 37, 42, 15, 60, 40, 43, 48, 30, 25, 52, 28, 41, 40, 34, 28, 41, 38, 40, 30,
        35, 27, 27, 32, 44, 31,
    ]),
    book(6, "Romans", "Rom", "The Letter to the Romans", "Rom", &[
        32, 29, 31, 25, 21, 23, 25, 39, 33, 21, 36, 21, 14, 23, 33, 27,
    ]),
    book(7, "1 Corinthians", "1Co", "The First Letter to the Corinthians", "1Cor", &[
        31, 16, 23, 21, 13, 20, 40, 13, 27, 33, 34, 31, 13, 40, 58, 24,
    ]),
    book(8, "2 Corinthians", "2Co", "The Second Letter to the Corinthians", "2Cor", &[
        24, 17, 18, 18, 21, 18, 16, 24, 15, 18, 33, 21, 14,
    ]),
    book(9, "Galatians", "Gal", "The Letter to the Galatians", "Gal", &[24, 21, 29, 31, 26, 18]),
    book(10, "Ephesians", "Eph", "The Letter to the Ephesians", "Eph", &[23, 22, 21, 32, 33, 24]),
    book(11, "Philippians", "Phil", "The Letter to the Philippians", "Phil", &[30, 30, 21, 23]),
    book(12, "Colossians", "Col", "The Letter to the Colossians", "Col", &[29, 23, 25, 18]),
    book(13, "1 Thessalonians", "1Th", "The First Letter to the Thessalonians", "1Thess", &[
        10, 20, 13, 18, 28,
    ]),
    book(14, "2 Thessalonians", "2Th", "The Second Letter to the Thessalonians", "2Thess", &[
        12, 17, 18,
    ]),
    book(15, "1 Timothy", "1Ti", "The First Letter to Timothy", "1Tim", &[20, 15, 16, 16, 25, 21]),
    book(16, "2 Timothy", "2Ti", "The Second Letter to Timothy", "2Tim", &[18, 26, 17, 22]),
    book(17, "Titus", "Tit", "The Letter to Titus", "Titus", &[16, 15, 15]),
    book(18, "Philemon", "Phm", "The Letter to Philemon", "Philem", &[25]),
    book(19, "Hebrews", "Heb", "The Letter to the Hebrews", "Heb", &[
        14, 18, 19, 16, 14, 20, 28, 13, 28, 39, 40, 29, 25,
    ]),
    book(20, "James", "Jas", "The Letter of James", "Jas", &[27, 26, 18, 17, 20]),
    book(21, "1 Peter", "1Pe", "The First Letter of Peter", "1Pet", &[25, 25, 22, 19, 14]),
    book(22, "2 Peter", "2Pe", "The Second Letter of Peter", "2Pet", &[21, 22, 18]),
    book(23, "1 John", "1Jn", "The First Letter of John", "1John", &[10, 29, 24, 21, 21]),
    book(24, "2 John", "2Jn", "The Second Letter of John", "2John", &[13]),
    book(25, "3 John", "3Jn", "The Third Letter of John", "3John", &[15]),
    book(26, "Jude", "Jude", "The Letter of Jude", "Jude", &[25]),
    book(27, "Revelation", "Rev", "The Revelation to John", "Rev", &[
        20, 29, 22, 11, 14, 17, 17, 13, 21, 11, 19, 18, 18, 20, 8, 21, 18, 24, 21, 15, 27, 21,
    ]),
];

/// Verse numbers the SBLGNT leaves out of its main text, as
/// `(book ordinal, chapter, verse)`.
const OMITTED_VERSES: &[(u8, u16, u16)] = &[
    (1, 17, 21),
    (1, 18, 11),
    (1, 23, 14),
    (2, 7, 16),
    (2, 9, 44),
    (2, 9, 46),
    (2, 11, 26),
    (2, 15, 28),
    (3, 17, 36),
    (3, 23, 17),
    (4, 5, 4),
    (4, 7, 53),
    (4, 8, 1),
    (4, 8, 2),
    (4, 8, 3),
    (4, 8, 4),
    (4, 8, 5),
    (4, 8, 6),
    (4, 8, 7),
    (4, 8, 8),
    (4, 8, 9),
    (4, 8, 10),
    (4, 8, 11),
    (5, 8, 37),
    (5, 15, 34),
    (5, 19, 41),
    (5, 24, 7),
    (5, 28, 29),
    (6, 16, 24),
    (8, 13, 14),
];

/// A book of the New Testament canon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Book(u8);

impl Book {
    pub const FIRST: Book = Book(1);
    pub const LAST: Book = Book(27);

    /// Book by canonical ordinal (1-based).
    #[must_use]
    pub fn from_ordinal(ordinal: u32) -> Option<Self> {
        (1..=BOOKS.len() as u32)
            .contains(&ordinal)
            .then(|| Book(ordinal as u8))
    }

    /// Resolve a book identifier: ordinal, full name, short abbreviation, or
    /// KJV/OSIS abbreviation. Case and inner whitespace are ignored.
    #[must_use]
    pub fn lookup(identifier: &str) -> Option<Self> {
        let key = identifier_key(identifier);
        if key.is_empty() {
            return None;
        }
        if let Ok(ordinal) = key.parse::<u32>() {
            return Self::from_ordinal(ordinal);
        }
        BOOKS
            .iter()
            .find(|b| {
                identifier_key(b.name) == key
                    || identifier_key(b.abbrev) == key
                    || identifier_key(b.osis) == key
            })
            .map(|b| Book(b.ordinal))
    }

    /// Iterate all books in canonical order.
    pub fn all() -> impl DoubleEndedIterator<Item = Book> {
        (1..=BOOKS.len() as u8).map(Book)
    }

    #[must_use]
    pub fn info(self) -> &'static BookInfo {
        &BOOKS[usize::from(self.0) - 1]
    }

    #[must_use]
    pub fn ordinal(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        self.info().name
    }

    #[must_use]
    pub fn abbrev(self) -> &'static str {
        self.info().abbrev
    }

    #[must_use]
    pub fn chapters(self) -> u16 {
        self.info().verses.len() as u16
    }

    /// Declared verse count of a chapter, or `None` outside the book.
    #[must_use]
    pub fn verses(self, chapter: u16) -> Option<u16> {
        let index = usize::from(chapter).checked_sub(1)?;
        self.info().verses.get(index).copied()
    }

    /// Every verse of the book in order, declared omissions excluded.
    pub fn references(self) -> impl DoubleEndedIterator<Item = Reference> {
        (1..=self.chapters()).flat_map(move |chapter| {
            (1..=self.verses(chapter).unwrap_or(0))
                .filter(move |&verse| !is_omitted(self, chapter, verse))
                .map(move |verse| Reference::bound(self, chapter, verse))
        })
    }

    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::from_ordinal(u32::from(self.0) + 1)
    }

    #[must_use]
    pub fn previous(self) -> Option<Self> {
        Self::from_ordinal(u32::from(self.0).wrapping_sub(1))
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Book {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Whether the SBLGNT deliberately has no verse with this number.
#[must_use]
pub fn is_omitted(book: Book, chapter: u16, verse: u16) -> bool {
    OMITTED_VERSES
        .iter()
        .any(|&(b, c, v)| b == book.0 && c == chapter && v == verse)
}

fn identifier_key(identifier: &str) -> String {
    identifier
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .flat_map(char::to_lowercase)
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_table_is_ordered() {
        for (i, info) in BOOKS.iter().enumerate() {
            assert_eq!(usize::from(info.ordinal), i + 1, "{}", info.name);
        }
        let chapters: usize = BOOKS.iter().map(|b| b.verses.len()).sum();
        assert_eq!(chapters, 260);
        let verses: u32 = BOOKS
            .iter()
            .flat_map(|b| b.verses)
            .map(|&v| u32::from(v))
            .sum();
        assert_eq!(verses, 7959);
    }

    #[test]
    fn test_verse_counts_per_chapter() {
        let john = Book::lookup("John").unwrap();
        assert_eq!(john.chapters(), 21);
        assert_eq!(john.verses(1), Some(51));
        assert_eq!(john.verses(21), Some(25));
        assert_eq!(john.verses(0), None);
        assert_eq!(john.verses(22), None);
        assert_eq!(Book::lookup("Luke").unwrap().verses(1), Some(80));
        assert_eq!(Book::lookup("3 John").unwrap().verses(1), Some(15));
    }

    #[test]
    fn test_book_references_skip_omissions() {
        let john = Book::lookup("John").unwrap();
        let refs: Vec<Reference> = john.references().collect();
        assert_eq!(refs.len(), 879 - 13);
        assert_eq!(refs[0].to_string(), "John 1:1");
        assert_eq!(refs.last().unwrap().to_string(), "John 21:25");
        assert!(!refs.iter().any(|r| r.chapter() == 8 && r.verse() <= 11));
        assert!(refs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_lookup_by_any_identifier() {
        let john = Book::from_ordinal(4).unwrap();
        assert_eq!(Book::lookup("John"), Some(john));
        assert_eq!(Book::lookup("jn"), Some(john));
        assert_eq!(Book::lookup("4"), Some(john));

        let cor = Book::lookup("1 Corinthians").unwrap();
        assert_eq!(cor.ordinal(), 7);
        assert_eq!(Book::lookup("1Cor"), Some(cor));
        assert_eq!(Book::lookup("1co"), Some(cor));
        assert_eq!(Book::lookup("1 Cor."), Some(cor));

        assert_eq!(Book::lookup("Philem").unwrap().name(), "Philemon");
        assert_eq!(Book::lookup("Phil").unwrap().name(), "Philippians");
    }

    #[test]
    fn test_lookup_outside_canon() {
        assert_eq!(Book::lookup("Genesis"), None);
        assert_eq!(Book::lookup("0"), None);
        assert_eq!(Book::lookup("28"), None);
        assert_eq!(Book::lookup(""), None);
    }

    #[test]
    fn test_book_neighbors() {
        assert_eq!(Book::FIRST.previous(), None);
        assert_eq!(Book::LAST.next(), None);
        assert_eq!(Book::FIRST.next().unwrap().name(), "Mark");
        assert_eq!(Book::all().count(), 27);
    }

    #[test]
    fn test_declared_omissions() {
        let john = Book::lookup("John").unwrap();
        assert!(is_omitted(john, 5, 4));
        assert!(is_omitted(john, 8, 11));
        assert!(!is_omitted(john, 8, 12));
        assert!(!is_omitted(john, 1, 1));
        // numbered in English Bibles, absent from the SBLGNT
        assert!(is_omitted(Book::lookup("Acts").unwrap(), 19, 41));
        assert!(is_omitted(Book::lookup("2 Cor").unwrap(), 13, 14));
    }
}
