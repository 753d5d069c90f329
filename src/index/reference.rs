/// Reference Index: canonical reference → verse, in canonical order.
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::ops::Bound;

use serde::Serialize;

use crate::canon::{Book, Reference};
use crate::error::{DuplicateReference, InvalidRange, NotFound};
use crate::model::Referenced;

/// The verses immediately before and after a reference. `None` marks the
/// start or end of the whole corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Neighbors {
    pub previous: Option<Reference>,
    pub next: Option<Reference>,
}

#[derive(Debug, Clone)]
pub struct ReferenceIndex<V> {
    entries: BTreeMap<Reference, V>,
}

impl<V> Default for ReferenceIndex<V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<V: Referenced> ReferenceIndex<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a verse. A second verse under the same reference is rejected
    /// and the index keeps the first one.
    pub fn put(&mut self, verse: V) -> Result<(), DuplicateReference> {
        match self.entries.entry(verse.reference()) {
            btree_map::Entry::Occupied(e) => Err(DuplicateReference(*e.key())),
            btree_map::Entry::Vacant(e) => {
                e.insert(verse);
                Ok(())
            }
        }
    }

    pub fn get(&self, reference: Reference) -> Result<&V, NotFound> {
        self.entries.get(&reference).ok_or(NotFound(reference))
    }

    #[must_use]
    pub fn contains(&self, reference: Reference) -> bool {
        self.entries.contains_key(&reference)
    }

    /// Preceding and following references in canonical order, crossing
    /// chapter and book boundaries.
    pub fn neighbors(&self, reference: Reference) -> Result<Neighbors, NotFound> {
        if !self.contains(reference) {
            return Err(NotFound(reference));
        }
        let previous = self
            .entries
            .range(..reference)
            .next_back()
            .map(|(r, _)| *r);
        let next = self
            .entries
            .range((Bound::Excluded(reference), Bound::Unbounded))
            .next()
            .map(|(r, _)| *r);
        Ok(Neighbors { previous, next })
    }

    /// Verses from `start` to `end` inclusive. Neither bound has to exist in
    /// the index.
    pub fn range(&self, start: Reference, end: Reference) -> Result<VerseRange<'_, V>, InvalidRange> {
        if start > end {
            return Err(InvalidRange { start, end });
        }
        Ok(VerseRange::new(&self.entries, start, end))
    }

    /// Every verse of one chapter.
    #[must_use]
    pub fn chapter(&self, book: Book, chapter: u16) -> VerseRange<'_, V> {
        VerseRange::new(
            &self.entries,
            Reference::bound(book, chapter, 0),
            Reference::bound(book, chapter, u16::MAX),
        )
    }

    /// Every verse of one book.
    #[must_use]
    pub fn book(&self, book: Book) -> VerseRange<'_, V> {
        VerseRange::new(
            &self.entries,
            Reference::bound(book, 0, 0),
            Reference::bound(book, u16::MAX, u16::MAX),
        )
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &V> + Clone {
        self.entries.values()
    }

    pub fn references(&self) -> impl DoubleEndedIterator<Item = Reference> + Clone + '_ {
        self.entries.keys().copied()
    }

    #[must_use]
    pub fn first(&self) -> Option<&V> {
        self.entries.values().next()
    }

    #[must_use]
    pub fn last(&self) -> Option<&V> {
        self.entries.values().next_back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A lazy, finite view over a span of the index. Cloning or calling
/// [`VerseRange::restart`] yields an independent pass.
pub struct VerseRange<'a, V> {
    entries: &'a BTreeMap<Reference, V>,
    start: Reference,
    end: Reference,
    inner: btree_map::Range<'a, Reference, V>,
}

impl<'a, V> VerseRange<'a, V> {
    fn new(entries: &'a BTreeMap<Reference, V>, start: Reference, end: Reference) -> Self {
        Self {
            entries,
            start,
            end,
            inner: entries.range(start..=end),
        }
    }

    /// A fresh pass over the same span.
    #[must_use]
    pub fn restart(&self) -> Self {
        Self::new(self.entries, self.start, self.end)
    }

    #[must_use]
    pub fn start(&self) -> Reference {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> Reference {
        self.end
    }
}

impl<V> Clone for VerseRange<'_, V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries,
            start: self.start,
            end: self.end,
            inner: self.inner.clone(),
        }
    }
}

impl<'a, V> Iterator for VerseRange<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> DoubleEndedIterator for VerseRange<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rendering;

    fn r(s: &str) -> Reference {
        s.parse().unwrap()
    }

    fn rendering(s: &str) -> Rendering {
        Rendering::new(r(s), format!("text of {s}")).unwrap()
    }

    fn index(refs: &[&str]) -> ReferenceIndex<Rendering> {
        let mut index = ReferenceIndex::new();
        for s in refs {
            index.put(rendering(s)).unwrap();
        }
        index
    }

    #[test]
    fn test_put_and_get() {
        let index = index(&["John 1:2", "John 1:1"]);
        assert_eq!(index.len(), 2);
        let got = index.get(r("John 1:1")).unwrap();
        assert_eq!(got.reference(), r("John 1:1"));
        assert!(std::ptr::eq(got, index.get(r("John 1:1")).unwrap()));
        assert_eq!(index.get(r("John 1:3")), Err(NotFound(r("John 1:3"))));
    }

    #[test]
    fn test_duplicate_put_is_rejected() {
        let mut index = index(&["Matthew 1:1"]);
        let err = index.put(rendering("Matthew 1:1")).unwrap_err();
        assert_eq!(err, DuplicateReference(r("Matthew 1:1")));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_neighbors_cross_boundaries() {
        let index = index(&["Matthew 28:20", "Mark 1:1", "Mark 1:2", "Mark 2:1"]);

        let n = index.neighbors(r("Mark 1:1")).unwrap();
        assert_eq!(n.previous, Some(r("Matthew 28:20")));
        assert_eq!(n.next, Some(r("Mark 1:2")));

        let n = index.neighbors(r("Mark 1:2")).unwrap();
        assert_eq!(n.next, Some(r("Mark 2:1")));

        assert_eq!(index.neighbors(r("Matthew 28:20")).unwrap().previous, None);
        assert_eq!(index.neighbors(r("Mark 2:1")).unwrap().next, None);
        assert!(index.neighbors(r("Mark 1:3")).is_err());
    }

    #[test]
    fn test_neighbors_are_inverse_consistent() {
        let refs = ["Matthew 28:19", "Matthew 28:20", "Mark 1:1", "Mark 1:2", "Mark 2:1"];
        let index = index(&refs);
        for s in &refs[..refs.len() - 1] {
            let start = r(s);
            let next = index.neighbors(start).unwrap().next.unwrap();
            assert_eq!(index.neighbors(next).unwrap().previous, Some(start));
        }
    }

    #[test]
    fn test_range_is_inclusive_and_restartable() {
        let index = index(&["John 1:1", "John 1:2", "John 1:3", "John 2:1"]);
        let range = index.range(r("John 1:2"), r("John 2:1")).unwrap();
        let first: Vec<Reference> = range.clone().map(Referenced::reference).collect();
        assert_eq!(first, vec![r("John 1:2"), r("John 1:3"), r("John 2:1")]);

        let mut partial = range.restart();
        partial.next();
        let again: Vec<Reference> = partial.restart().map(Referenced::reference).collect();
        assert_eq!(again, first);
    }

    #[test]
    fn test_range_bounds_need_not_exist() {
        let index = index(&["John 1:1", "John 1:3"]);
        let count = index.range(r("John 1:2"), r("John 5:4")).unwrap().count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_inverted_range_fails() {
        let index = index(&["John 1:1"]);
        let err = index.range(r("John 1:2"), r("John 1:1")).err().unwrap();
        assert_eq!(err.start, r("John 1:2"));
    }

    #[test]
    fn test_chapter_and_book_views() {
        let index = index(&["John 1:1", "John 1:2", "John 2:1", "Acts 1:1"]);
        let john = Book::lookup("John").unwrap();
        assert_eq!(index.chapter(john, 1).count(), 2);
        assert_eq!(
            index.chapter(john, 1).next_back().unwrap().reference(),
            r("John 1:2")
        );
        assert_eq!(index.book(john).count(), 3);
        assert_eq!(index.first().unwrap().reference(), r("John 1:1"));
        assert_eq!(index.last().unwrap().reference(), r("Acts 1:1"));
    }
}
