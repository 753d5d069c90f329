/// Alignment Engine: pairs Greek verses with their English renderings by
/// canonical reference and walks the text verse by verse or chapter by
/// chapter.
///
/// The Greek corpus drives everything here. An English gap shows up as an
/// aligned verse with `english: None`, never as an error.
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

use crate::canon::{Book, Reference};
use crate::error::{InvalidRange, NotFound};
use crate::index::{Corpus, normalize_lemma};
use crate::model::{Referenced, Rendering, Verse};

/// A Greek verse and, when the translation has it, the English verse under
/// the same reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlignedVerse<'a> {
    pub reference: Reference,
    pub greek: &'a Verse,
    pub english: Option<&'a Rendering>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    Next,
    Previous,
    /// First verse of the current chapter, or of the previous chapter when
    /// already there.
    ChapterStart,
    NextChapterStart,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Next => "next",
            Self::Previous => "previous",
            Self::ChapterStart => "chapter-start",
            Self::NextChapterStart => "next-chapter-start",
        })
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "next" => Ok(Self::Next),
            "previous" | "prev" => Ok(Self::Previous),
            "chapter-start" | "start-of-chapter" => Ok(Self::ChapterStart),
            "next-chapter-start" | "start-of-next-chapter" => Ok(Self::NextChapterStart),
            other => Err(format!("unknown direction '{other}'")),
        }
    }
}

/// Result of a navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "verse", rename_all = "snake_case")]
pub enum Navigation<'a> {
    Moved(AlignedVerse<'a>),
    /// Already at the first or last verse (or chapter) of the corpus.
    Boundary,
}

impl<'a> Navigation<'a> {
    #[must_use]
    pub fn verse(self) -> Option<AlignedVerse<'a>> {
        match self {
            Self::Moved(v) => Some(v),
            Self::Boundary => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AlignmentEngine<'a> {
    greek: &'a Corpus<Verse>,
    english: &'a Corpus<Rendering>,
}

impl<'a> AlignmentEngine<'a> {
    #[must_use]
    pub fn new(greek: &'a Corpus<Verse>, english: &'a Corpus<Rendering>) -> Self {
        Self { greek, english }
    }

    /// The aligned pair for a reference. Fails only when the Greek verse is
    /// missing.
    pub fn aligned_verse(&self, reference: Reference) -> Result<AlignedVerse<'a>, NotFound> {
        let greek = self.greek.get(reference)?;
        Ok(self.pair(greek))
    }

    fn pair(&self, greek: &'a Verse) -> AlignedVerse<'a> {
        let reference = greek.reference();
        AlignedVerse {
            reference,
            greek,
            english: self.english.get(reference).ok(),
        }
    }

    fn first_of_chapter(&self, reference: Reference) -> Option<&'a Verse> {
        self.greek
            .index()
            .chapter(reference.book(), reference.chapter())
            .next()
    }

    /// Move from `reference` in the given direction over the Greek corpus.
    pub fn navigate(
        &self,
        reference: Reference,
        direction: Direction,
    ) -> Result<Navigation<'a>, NotFound> {
        let index = self.greek.index();
        let neighbors = index.neighbors(reference)?;

        let target = match direction {
            Direction::Next => neighbors.next,
            Direction::Previous => neighbors.previous,
            Direction::ChapterStart => {
                let start = self.first_of_chapter(reference).map(Referenced::reference);
                if start == Some(reference) {
                    neighbors
                        .previous
                        .and_then(|prev| self.first_of_chapter(prev))
                        .map(Referenced::reference)
                } else {
                    start
                }
            }
            Direction::NextChapterStart => index
                .chapter(reference.book(), reference.chapter())
                .next_back()
                .and_then(|last| index.neighbors(last.reference()).ok())
                .and_then(|n| n.next),
        };

        match target {
            Some(target) => Ok(Navigation::Moved(self.aligned_verse(target)?)),
            None => Ok(Navigation::Boundary),
        }
    }

    /// Aligned verses from `start` to `end` inclusive, in canonical order.
    pub fn align_range(
        &self,
        start: Reference,
        end: Reference,
    ) -> Result<Vec<AlignedVerse<'a>>, InvalidRange> {
        Ok(self
            .greek
            .index()
            .range(start, end)?
            .map(|greek| self.pair(greek))
            .collect())
    }

    /// Verses of one book whose English text contains `needle`
    /// (case-insensitive) or with a Greek word or lemma equal to it.
    #[must_use]
    pub fn search_book(&self, book: Book, needle: &str) -> Vec<AlignedVerse<'a>> {
        let greek_needle = normalize_lemma(needle);
        if greek_needle.is_empty() {
            return Vec::new();
        }
        let english_needle = greek_needle.to_lowercase();

        self.greek
            .index()
            .book(book)
            .map(|greek| self.pair(greek))
            .filter(|aligned| {
                let in_english = aligned
                    .english
                    .is_some_and(|e| e.text().to_lowercase().contains(&english_needle));
                in_english
                    || aligned.greek.tokens().iter().any(|t| {
                        t.lemma() == greek_needle || t.word().nfc().eq(greek_needle.chars())
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{RawToken, parse_greek_verse};

    fn r(s: &str) -> Reference {
        s.parse().unwrap()
    }

    fn greek(refs: &[&str]) -> Corpus<Verse> {
        Corpus::from_verses(
            "SBLGNT",
            refs.iter().map(|s| {
                let raw = [
                    RawToken::triple("καὶ", "καί", "C- --------"),
                    RawToken::triple("λόγος", "λόγος", "N- ----NSM-"),
                ];
                parse_greek_verse(r(s), &raw).unwrap().verse
            }),
        )
        .unwrap()
    }

    fn english(pairs: &[(&str, &str)]) -> Corpus<Rendering> {
        Corpus::from_verses(
            "ESV",
            pairs
                .iter()
                .map(|(s, text)| Rendering::new(r(s), *text).unwrap()),
        )
        .unwrap()
    }

    const GREEK: &[&str] = &[
        "Matthew 28:19",
        "Matthew 28:20",
        "Mark 1:1",
        "Mark 1:2",
        "Mark 2:1",
        "Mark 2:2",
    ];

    fn moved(nav: Navigation<'_>) -> String {
        nav.verse().unwrap().reference.to_string()
    }

    #[test]
    fn test_aligned_verse_with_and_without_english() {
        let g = greek(GREEK);
        let e = english(&[("Mark 1:1", "The beginning of the gospel")]);
        let engine = AlignmentEngine::new(&g, &e);

        let pair = engine.aligned_verse(r("Mark 1:1")).unwrap();
        assert_eq!(pair.english.unwrap().text(), "The beginning of the gospel");
        assert_eq!(pair.greek.reference(), pair.reference);

        let pair = engine.aligned_verse(r("Mark 1:2")).unwrap();
        assert!(pair.english.is_none());

        assert_eq!(
            engine.aligned_verse(r("Mark 3:1")),
            Err(NotFound(r("Mark 3:1")))
        );
    }

    #[test]
    fn test_step_navigation_stops_at_boundaries() {
        let g = greek(GREEK);
        let e = english(&[]);
        let engine = AlignmentEngine::new(&g, &e);

        assert_eq!(moved(engine.navigate(r("Matthew 28:20"), Direction::Next).unwrap()), "Mark 1:1");
        assert_eq!(moved(engine.navigate(r("Mark 1:1"), Direction::Previous).unwrap()), "Matthew 28:20");
        assert_eq!(
            engine.navigate(r("Matthew 28:19"), Direction::Previous).unwrap(),
            Navigation::Boundary
        );
        assert_eq!(
            engine.navigate(r("Mark 2:2"), Direction::Next).unwrap(),
            Navigation::Boundary
        );
        assert!(engine.navigate(r("Mark 1:3"), Direction::Next).is_err());
    }

    #[test]
    fn test_chapter_start_navigation() {
        let g = greek(GREEK);
        let e = english(&[]);
        let engine = AlignmentEngine::new(&g, &e);

        assert_eq!(moved(engine.navigate(r("Mark 2:2"), Direction::ChapterStart).unwrap()), "Mark 2:1");
        assert_eq!(moved(engine.navigate(r("Mark 2:1"), Direction::ChapterStart).unwrap()), "Mark 1:1");
        assert_eq!(
            moved(engine.navigate(r("Mark 1:1"), Direction::ChapterStart).unwrap()),
            "Matthew 28:19"
        );
        assert_eq!(
            engine.navigate(r("Matthew 28:19"), Direction::ChapterStart).unwrap(),
            Navigation::Boundary
        );
    }

    #[test]
    fn test_next_chapter_start_navigation() {
        let g = greek(GREEK);
        let e = english(&[]);
        let engine = AlignmentEngine::new(&g, &e);

        assert_eq!(
            moved(engine.navigate(r("Matthew 28:19"), Direction::NextChapterStart).unwrap()),
            "Mark 1:1"
        );
        assert_eq!(moved(engine.navigate(r("Mark 1:1"), Direction::NextChapterStart).unwrap()), "Mark 2:1");
        assert_eq!(
            engine.navigate(r("Mark 2:1"), Direction::NextChapterStart).unwrap(),
            Navigation::Boundary
        );
    }

    #[test]
    fn test_align_range() {
        let g = greek(GREEK);
        let e = english(&[("Mark 1:2", "Behold")]);
        let engine = AlignmentEngine::new(&g, &e);

        let verses = engine.align_range(r("Matthew 28:20"), r("Mark 1:2")).unwrap();
        assert_eq!(verses.len(), 3);
        assert!(verses[2].english.is_some());
        assert!(engine.align_range(r("Mark 1:2"), r("Mark 1:1")).is_err());
    }

    #[test]
    fn test_search_book() {
        let g = greek(GREEK);
        let e = english(&[("Mark 1:1", "The beginning of the Gospel"), ("Mark 2:1", "Capernaum")]);
        let engine = AlignmentEngine::new(&g, &e);
        let mark = Book::lookup("Mark").unwrap();

        let hits = engine.search_book(mark, "gospel");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].reference, r("Mark 1:1"));

        assert_eq!(engine.search_book(mark, "λόγος").len(), 4);
        assert!(engine.search_book(mark, "  ").is_empty());
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!("next".parse::<Direction>(), Ok(Direction::Next));
        assert_eq!("start_of_chapter".parse::<Direction>(), Ok(Direction::ChapterStart));
        assert_eq!(
            "next-chapter-start".parse::<Direction>(),
            Ok(Direction::NextChapterStart)
        );
        assert!("sideways".parse::<Direction>().is_err());
    }
}
