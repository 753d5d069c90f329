//! Verse parsers for the two source datasets. Parsers only build verses;
//! they never touch an index.
pub mod english;
pub mod greek;

pub use english::{EnglishDocument, TagScheme, parse_english_verse, parse_english_xml};
pub use greek::{MorphGntVerses, MorphWarning, ParsedVerse, RawToken, parse_greek_verse};
