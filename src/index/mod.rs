//! Indices over loaded corpora: reference-keyed storage and the
//! morphological reverse index.
pub mod corpus;
pub mod morphology;
pub mod reference;

pub use corpus::{Corpus, Coverage, PartialBook, VerseGap};
pub use morphology::{MorphIndex, Occurrence, normalize_lemma};
pub use reference::{Neighbors, ReferenceIndex, VerseRange};
