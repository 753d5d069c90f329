/// Query Façade: the read-only entry point over a loaded snapshot.
///
/// A façade is cheap to clone and can be shared across threads; every
/// clone reads the same immutable [`Snapshot`].
use std::sync::Arc;

use serde::Serialize;

use crate::align::AlignedVerse;
use crate::canon::IntoReference;
use crate::error::QueryError;
use crate::index::{Occurrence, normalize_lemma};
use crate::lexicon::LexiconEntry;
use crate::model::{MorphFilter, Token};
use crate::snapshot::Snapshot;

/// One token found by a lemma or morphology query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Hit<'a> {
    #[serde(flatten)]
    pub occurrence: Occurrence,
    pub token: &'a Token,
}

/// Everything known about a lemma: its dictionary entry, if any, and every
/// occurrence in canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LemmaHits<'a> {
    pub lemma: String,
    pub entry: Option<&'a LexiconEntry>,
    pub hits: Vec<Hit<'a>>,
}

#[derive(Debug, Clone)]
pub struct QueryFacade {
    snapshot: Arc<Snapshot>,
}

impl From<Snapshot> for QueryFacade {
    fn from(snapshot: Snapshot) -> Self {
        Self::new(Arc::new(snapshot))
    }
}

impl QueryFacade {
    #[must_use]
    pub fn new(snapshot: Arc<Snapshot>) -> Self {
        Self { snapshot }
    }

    /// The snapshot behind this façade, for navigation and load reports.
    #[must_use]
    pub fn snapshot(&self) -> &Arc<Snapshot> {
        &self.snapshot
    }

    /// The aligned Greek/English pair for a reference.
    pub fn lookup_reference(
        &self,
        reference: impl IntoReference,
    ) -> Result<AlignedVerse<'_>, QueryError> {
        let reference = reference.into_reference()?;
        Ok(self.snapshot.alignment().aligned_verse(reference)?)
    }

    /// Every occurrence of a lemma. An unknown lemma is an empty result, not
    /// an error.
    #[must_use]
    pub fn lookup_lemma(&self, lemma: &str) -> LemmaHits<'_> {
        let lemma = normalize_lemma(lemma);
        let hits = self.hits(self.snapshot.morphology().lookup_by_lemma(&lemma));
        LemmaHits {
            entry: self.snapshot.lexicon().and_then(|l| l.lookup(&lemma)),
            lemma,
            hits,
        }
    }

    /// Every token whose tag satisfies the filter, in canonical order.
    #[must_use]
    pub fn lookup_morphology(&self, filter: &MorphFilter) -> Vec<Hit<'_>> {
        self.hits(&self.snapshot.morphology().lookup_by_morphology(filter))
    }

    /// Aligned verses from `start` to `end` inclusive.
    pub fn scan(
        &self,
        start: impl IntoReference,
        end: impl IntoReference,
    ) -> Result<Vec<AlignedVerse<'_>>, QueryError> {
        let start = start.into_reference()?;
        let end = end.into_reference()?;
        Ok(self.snapshot.alignment().align_range(start, end)?)
    }

    fn hits(&self, occurrences: &[Occurrence]) -> Vec<Hit<'_>> {
        occurrences
            .iter()
            .filter_map(|occurrence| {
                self.snapshot.resolve(occurrence).map(|token| Hit {
                    occurrence: *occurrence,
                    token,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::Reference;
    use crate::error::{MalformedReference, NotFound};
    use crate::lexicon::Lexicon;
    use crate::model::{PartOfSpeech, Referenced, Tense};
    use crate::parser::TagScheme;
    use crate::snapshot::SnapshotBuilder;

    // A nine-word verse with λόγος at position 4.
    const GREEK: &str = "\
040101 P- -------- Ἐν Ἐν ἐν ἐν
040101 N- ----DSF- ἀρχῇ ἀρχῇ ἀρχῇ ἀρχή
040101 V- 3IAI-S-- ἦν ἦν ἦν εἰμί
040101 RA ----NSM- ὁ ὁ ὁ ὁ
040101 N- ----NSM- λόγος, λόγος λόγος λόγος
040101 C- -------- καὶ καὶ καί καί
040101 P- -------- πρὸς πρὸς πρός πρός
040101 RA ----ASM- τὸν τὸν τόν ὁ
040101 N- ----ASM- θεόν. θεόν θεόν θεός
040102 RD ----NSM- οὗτος οὗτος οὗτος οὗτος
040102 V- 3IAI-S-- ἦν ἦν ἦν εἰμί
040103 V- 3AMI-S-- ἐγένετο ἐγένετο ἐγένετο γίνομαι
";

    const ENGLISH: &str = r#"<bible><b n="John"><c n="1">
<v n="1">In the beginning was the Word, and the Word was with God.</v>
<v n="3">All things were made through him.</v>
</c></b></bible>"#;

    const STRONGS: &str = r#"<entries><entry strongs="03056"><greek unicode="λόγος" translit="lógos"/><strongs_def>something said</strongs_def></entry></entries>"#;

    fn facade() -> QueryFacade {
        let mut builder = SnapshotBuilder::new("SBLGNT", "ESV")
            .allow_partial_books(true)
            .with_lexicon(Lexicon::from_xml(STRONGS).unwrap());
        builder.add_greek_rows("64-Jn", GREEK.as_bytes()).unwrap();
        builder.add_english_xml("esv", ENGLISH, TagScheme::Esv).unwrap();
        QueryFacade::from(builder.build().unwrap())
    }

    fn r(s: &str) -> Reference {
        s.parse().unwrap()
    }

    #[test]
    fn test_lookup_reference() {
        let facade = facade();
        let verse = facade.lookup_reference("John 1:1").unwrap();
        assert_eq!(verse.greek.len(), 9);
        assert!(verse.english.unwrap().text().starts_with("In the beginning"));

        let verse = facade.lookup_reference(("Jn", 1, 2)).unwrap();
        assert!(verse.english.is_none());
        assert_eq!(verse.greek.reference(), r("John 1:2"));
    }

    #[test]
    fn test_lookup_reference_errors() {
        let facade = facade();
        assert!(matches!(
            facade.lookup_reference("Genesis 1:1"),
            Err(QueryError::MalformedReference(MalformedReference::UnknownBook(_)))
        ));
        assert_eq!(
            facade.lookup_reference("John 5:4"),
            Err(QueryError::NotFound(NotFound(r("John 5:4"))))
        );
        assert!(matches!(
            facade.lookup_reference("John 22:1"),
            Err(QueryError::MalformedReference(_))
        ));
        assert!(matches!(
            facade.lookup_reference("John 1:52"),
            Err(QueryError::MalformedReference(MalformedReference::VerseOutOfRange { .. }))
        ));
    }

    #[test]
    fn test_lookup_lemma() {
        let facade = facade();
        let logos = facade.lookup_lemma("λόγος");
        assert_eq!(logos.hits.len(), 1);
        assert_eq!(logos.hits[0].occurrence.reference, r("John 1:1"));
        assert_eq!(logos.hits[0].occurrence.position, 4);
        assert_eq!(logos.hits[0].token.surface(), "λόγος,");
        assert_eq!(logos.entry.unwrap().strongs, Some(3056));

        let eimi = facade.lookup_lemma("εἰμί");
        assert_eq!(eimi.hits.len(), 2);
        assert!(eimi.entry.is_none());

        assert!(facade.lookup_lemma("ἀγάπη").hits.is_empty());
    }

    #[test]
    fn test_lookup_morphology() {
        let facade = facade();
        let imperfects = facade.lookup_morphology(
            &MorphFilter::new()
                .pos(PartOfSpeech::Verb)
                .tense(Tense::Imperfect),
        );
        let refs: Vec<Reference> = imperfects.iter().map(|h| h.occurrence.reference).collect();
        assert_eq!(refs, vec![r("John 1:1"), r("John 1:2")]);
        assert!(imperfects.iter().all(|h| h.token.lemma() == "εἰμί"));

        let filter: MorphFilter = "pos=RA".parse().unwrap();
        assert_eq!(facade.lookup_morphology(&filter).len(), 2);
    }

    #[test]
    fn test_scan() {
        let facade = facade();
        let verses = facade.scan("John 1:1", "John 1:3").unwrap();
        let refs: Vec<Reference> = verses.iter().map(|v| v.reference).collect();
        assert_eq!(refs, vec![r("John 1:1"), r("John 1:2"), r("John 1:3")]);
        assert_eq!(
            verses.iter().filter(|v| v.english.is_some()).count(),
            2
        );

        assert!(matches!(
            facade.scan("John 1:3", "John 1:1"),
            Err(QueryError::InvalidRange(_))
        ));
        assert!(matches!(
            facade.scan("Genesis 1:1", "John 1:1"),
            Err(QueryError::MalformedReference(_))
        ));
    }

    #[test]
    fn test_concurrent_readers_agree() {
        let facade = facade();
        let expected = facade.lookup_lemma("ὁ").hits.len();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let facade = facade.clone();
                    scope.spawn(move || {
                        let lemma = facade.lookup_lemma("ὁ").hits.len();
                        let verse = facade.lookup_reference("John 1:1").map(|v| v.greek.len());
                        (lemma, verse)
                    })
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), (expected, Ok(9)));
            }
        });
    }
}
