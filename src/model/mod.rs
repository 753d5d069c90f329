//! Token model: Greek tokens with structured morphology, Greek verses, and
//! English renderings.
pub mod morph;
pub mod verse;

pub use morph::{
    Case, Degree, Gender, Mood, MorphFilter, MorphTag, Number, PartOfSpeech, Person, Tense, Voice,
};
pub use verse::{Referenced, Rendering, Token, Verse};
