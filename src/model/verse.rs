use serde::Serialize;

use super::morph::MorphTag;
use crate::canon::Reference;
use crate::error::ParseError;

/// Anything stored under a canonical reference.
pub trait Referenced {
    fn reference(&self) -> Reference;
}

/// One Greek word-form as printed in its verse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    position: usize,
    surface: String,
    word: String,
    normalized: String,
    lemma: String,
    morph: MorphTag,
    morph_code: String,
}

impl Token {
    pub(crate) fn new(
        position: usize,
        surface: String,
        word: String,
        normalized: String,
        lemma: String,
        morph: MorphTag,
        morph_code: String,
    ) -> Self {
        Self {
            position,
            surface,
            word,
            normalized,
            lemma,
            morph,
            morph_code,
        }
    }

    /// 0-based position in the verse.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Text as printed, punctuation included.
    #[must_use]
    pub fn surface(&self) -> &str {
        &self.surface
    }

    /// Word without punctuation.
    #[must_use]
    pub fn word(&self) -> &str {
        &self.word
    }

    #[must_use]
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// NFC-normalized dictionary headword.
    #[must_use]
    pub fn lemma(&self) -> &str {
        &self.lemma
    }

    #[must_use]
    pub fn morph(&self) -> &MorphTag {
        &self.morph
    }

    /// The code exactly as it appeared in the source.
    #[must_use]
    pub fn morph_code(&self) -> &str {
        &self.morph_code
    }
}

/// A Greek verse: a reference and its tokens in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verse {
    reference: Reference,
    tokens: Vec<Token>,
}

impl Verse {
    /// Rejects verses without tokens.
    pub fn new(reference: Reference, tokens: Vec<Token>) -> Result<Self, ParseError> {
        if tokens.is_empty() {
            return Err(ParseError::EmptyVerse(reference));
        }
        Ok(Self { reference, tokens })
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[must_use]
    pub fn token(&self, position: usize) -> Option<&Token> {
        self.tokens.get(position)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The printed verse, reconstructed from token surfaces.
    #[must_use]
    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .map(Token::surface)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Referenced for Verse {
    fn reference(&self) -> Reference {
        self.reference
    }
}

/// An English verse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rendering {
    reference: Reference,
    text: String,
}

impl Rendering {
    /// Rejects blank text.
    pub fn new(reference: Reference, text: impl Into<String>) -> Result<Self, ParseError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ParseError::EmptyVerse(reference));
        }
        Ok(Self { reference, text })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Referenced for Rendering {
    fn reference(&self) -> Reference {
        self.reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::morph::PartOfSpeech;

    fn token(position: usize, surface: &str) -> Token {
        Token::new(
            position,
            surface.to_string(),
            surface.trim_end_matches([',', '.']).to_string(),
            surface.to_string(),
            surface.to_string(),
            MorphTag::bare(PartOfSpeech::Noun),
            "N- --------".to_string(),
        )
    }

    #[test]
    fn test_verse_rejects_empty_tokens() {
        let r: Reference = "John 1:1".parse().unwrap();
        assert!(matches!(
            Verse::new(r, Vec::new()),
            Err(ParseError::EmptyVerse(x)) if x == r
        ));
    }

    #[test]
    fn test_verse_text_joins_surfaces() {
        let r: Reference = "John 1:1".parse().unwrap();
        let verse = Verse::new(r, vec![token(0, "Ἐν"), token(1, "ἀρχῇ")]).unwrap();
        assert_eq!(verse.text(), "Ἐν ἀρχῇ");
        assert_eq!(verse.len(), 2);
        assert_eq!(verse.token(1).unwrap().position(), 1);
        assert_eq!(verse.reference(), r);
    }

    #[test]
    fn test_rendering_rejects_blank_text() {
        let r: Reference = "John 1:1".parse().unwrap();
        assert!(Rendering::new(r, "   ").is_err());
        assert_eq!(Rendering::new(r, "In the beginning").unwrap().text(), "In the beginning");
    }
}
