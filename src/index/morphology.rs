/// Morphological Index: reverse lookups from lemma and from tag to every
/// token that carries them.
use std::collections::HashMap;

use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

use super::corpus::Corpus;
use crate::canon::Reference;
use crate::model::{MorphFilter, MorphTag, Referenced, Verse};

/// The location of one token: its verse and 0-based position there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Occurrence {
    pub reference: Reference,
    pub position: usize,
}

/// NFC-normalize and trim a lemma so lookups match index keys.
#[must_use]
pub fn normalize_lemma(lemma: &str) -> String {
    lemma.trim().nfc().collect()
}

#[derive(Debug, Default, Clone)]
pub struct MorphIndex {
    by_lemma: HashMap<String, Vec<Occurrence>>,
    by_tag: HashMap<MorphTag, Vec<Occurrence>>,
    total: usize,
}

impl MorphIndex {
    /// Index every token of a corpus in one pass. Verses are visited in
    /// canonical order, so every posting list comes out sorted.
    #[must_use]
    pub fn build(corpus: &Corpus<Verse>) -> Self {
        let mut index = Self::default();
        for verse in corpus.index().iter() {
            let reference = verse.reference();
            for token in verse.tokens() {
                let occurrence = Occurrence {
                    reference,
                    position: token.position(),
                };
                index
                    .by_lemma
                    .entry(normalize_lemma(token.lemma()))
                    .or_default()
                    .push(occurrence);
                index
                    .by_tag
                    .entry(*token.morph())
                    .or_default()
                    .push(occurrence);
                index.total += 1;
            }
        }
        index
    }

    /// All occurrences of a lemma in canonical order. An unknown lemma yields
    /// an empty slice.
    #[must_use]
    pub fn lookup_by_lemma(&self, lemma: &str) -> &[Occurrence] {
        self.by_lemma
            .get(&normalize_lemma(lemma))
            .map_or(&[], Vec::as_slice)
    }

    /// Occurrences carrying exactly this tag.
    #[must_use]
    pub fn lookup_by_tag(&self, tag: &MorphTag) -> &[Occurrence] {
        self.by_tag.get(tag).map_or(&[], Vec::as_slice)
    }

    /// Occurrences whose tag satisfies every constrained field of the filter,
    /// in canonical order.
    #[must_use]
    pub fn lookup_by_morphology(&self, filter: &MorphFilter) -> Vec<Occurrence> {
        let mut hits: Vec<Occurrence> = self
            .by_tag
            .iter()
            .filter(|(tag, _)| filter.matches(tag))
            .flat_map(|(_, occurrences)| occurrences.iter().copied())
            .collect();
        hits.sort_unstable();
        hits
    }

    /// Every lemma with its frequency, sorted by lemma.
    #[must_use]
    pub fn lemmas(&self) -> Vec<(&str, usize)> {
        let mut lemmas: Vec<(&str, usize)> = self
            .by_lemma
            .iter()
            .map(|(lemma, occurrences)| (lemma.as_str(), occurrences.len()))
            .collect();
        lemmas.sort_unstable();
        lemmas
    }

    #[must_use]
    pub fn lemma_count(&self) -> usize {
        self.by_lemma.len()
    }

    #[must_use]
    pub fn tag_count(&self) -> usize {
        self.by_tag.len()
    }

    #[must_use]
    pub fn total_occurrences(&self) -> usize {
        self.total
    }
}
