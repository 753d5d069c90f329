//! # Koine: Greek New Testament study engine
//!
//! Aligns the SBLGNT Greek text (MorphGNT word rows) with an English
//! translation verse by verse, and indexes every Greek word by lemma and
//! morphological category.
//!
//! ## Architecture
//!
//! - **[`canon`]**: The 27-book canon, book lookup, and canonical references
//! - **[`model`]**: Tokens, morphology tags and filters, Greek verses, English renderings
//! - **[`parser`]**: MorphGNT row reader and English XML reader
//! - **[`index`]**: Reference-keyed corpora and the morphological reverse index
//! - **[`align`]**: Greek/English pairing, navigation, and in-book search
//! - **[`lexicon`]**: Strong's Greek dictionary lookup
//! - **[`snapshot`]**: The immutable loaded state and its load report
//! - **[`loader`]**: Builds a snapshot from the configured files
//! - **[`query`]**: The query façade consumers go through
//! - **[`translations`]**: The user's own per-verse translations
//! - **[`config`]**: Configuration loading and validation

pub mod align;
pub mod canon;
pub mod config;
pub mod error;
pub mod index;
pub mod lexicon;
pub mod loader;
pub mod model;
pub mod parser;
pub mod query;
pub mod snapshot;
pub mod translations;
