/// English XML reader.
///
/// Supports the two layouts found in the wild:
///
/// - ESV: `<b n="John"><c n="1"><v n="1">…</v></c></b>`
/// - KJV: `<book num="John"><chapter num="1"><verse num="1">…</verse></chapter></book>`
///
/// Verse text includes the text of inline elements (`<i>`, `<span>`) with
/// whitespace collapsed. Books outside the New Testament are skipped.
use std::fmt;
use std::str::FromStr;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::{Deserialize, Serialize};

use crate::canon::{Book, Reference};
use crate::error::{MalformedReference, ParseError};
use crate::model::Rendering;

/// Element and attribute names of an English XML layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagScheme {
    #[default]
    Esv,
    Kjv,
}

struct SchemeTags {
    book: &'static [u8],
    chapter: &'static [u8],
    verse: &'static [u8],
    attr: &'static str,
}

impl TagScheme {
    fn tags(self) -> SchemeTags {
        match self {
            Self::Esv => SchemeTags {
                book: b"b",
                chapter: b"c",
                verse: b"v",
                attr: "n",
            },
            Self::Kjv => SchemeTags {
                book: b"book",
                chapter: b"chapter",
                verse: b"verse",
                attr: "num",
            },
        }
    }
}

impl fmt::Display for TagScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Esv => "esv",
            Self::Kjv => "kjv",
        })
    }
}

impl FromStr for TagScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "esv" => Ok(Self::Esv),
            "kjv" => Ok(Self::Kjv),
            other => Err(format!("unknown English tag scheme '{other}'")),
        }
    }
}

/// Everything read from one English XML file.
#[derive(Debug, Default)]
pub struct EnglishDocument {
    pub renderings: Vec<Rendering>,
    /// Book labels outside the New Testament canon, in file order.
    pub skipped_books: Vec<String>,
    /// Verses present in the file but without any text.
    pub empty_verses: Vec<Reference>,
}

/// Validate one reference-tagged English verse.
pub fn parse_english_verse(
    book: &str,
    chapter: &str,
    verse: &str,
    text: &str,
) -> Result<Rendering, ParseError> {
    let number = |s: &str| {
        s.trim()
            .parse::<u32>()
            .map_err(|_| MalformedReference::Syntax(format!("{book} {chapter}:{verse}")))
    };
    let reference = Reference::from_parts(book, number(chapter)?, number(verse)?)?;
    Rendering::new(reference, collapse_whitespace(text))
}

enum BookState {
    Outside,
    Canon(String),
    Skipped,
}

struct OpenVerse {
    number: String,
    text: String,
    depth: usize,
}

/// Parse a whole English XML document.
pub fn parse_english_xml(xml: &str, scheme: TagScheme) -> Result<EnglishDocument, ParseError> {
    let tags = scheme.tags();
    let mut reader = Reader::from_str(xml);
    let mut doc = EnglishDocument::default();

    let mut book = BookState::Outside;
    let mut chapter: Option<String> = None;
    let mut verse: Option<OpenVerse> = None;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => {
                if let Some(open) = verse.as_mut() {
                    open.depth += 1;
                    continue;
                }
                let name = e.local_name();
                if name.as_ref() == tags.book {
                    book = open_book(&e, tags.attr, &mut doc)?;
                } else if name.as_ref() == tags.chapter {
                    chapter = Some(required_attribute(&e, tags.attr)?);
                } else if name.as_ref() == tags.verse {
                    verse = Some(OpenVerse {
                        number: required_attribute(&e, tags.attr)?,
                        text: String::new(),
                        depth: 0,
                    });
                }
            }
            Event::Empty(e) => {
                if let Some(open) = verse.as_mut() {
                    open.text.push(' ');
                    continue;
                }
                if e.local_name().as_ref() == tags.verse {
                    let empty = OpenVerse {
                        number: required_attribute(&e, tags.attr)?,
                        text: String::new(),
                        depth: 0,
                    };
                    finish_verse(&book, chapter.as_deref(), empty, &mut doc)?;
                }
            }
            Event::Text(t) => {
                if let Some(open) = verse.as_mut() {
                    open.text.push_str(&t.unescape().map_err(xml_error)?);
                }
            }
            Event::CData(t) => {
                if let Some(open) = verse.as_mut() {
                    open.text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::End(e) => {
                if let Some(open) = verse.as_mut() {
                    if open.depth > 0 {
                        open.depth -= 1;
                        continue;
                    }
                }
                let name = e.local_name();
                if name.as_ref() == tags.verse {
                    if let Some(open) = verse.take() {
                        finish_verse(&book, chapter.as_deref(), open, &mut doc)?;
                    }
                } else if name.as_ref() == tags.chapter {
                    chapter = None;
                } else if name.as_ref() == tags.book {
                    book = BookState::Outside;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(doc)
}

fn open_book(
    e: &BytesStart<'_>,
    attr: &str,
    doc: &mut EnglishDocument,
) -> Result<BookState, ParseError> {
    let label = required_attribute(e, attr)?;
    if Book::lookup(&label).is_some() {
        Ok(BookState::Canon(label))
    } else {
        doc.skipped_books.push(label);
        Ok(BookState::Skipped)
    }
}

fn finish_verse(
    book: &BookState,
    chapter: Option<&str>,
    verse: OpenVerse,
    doc: &mut EnglishDocument,
) -> Result<(), ParseError> {
    let label = match book {
        BookState::Skipped => return Ok(()),
        BookState::Outside => {
            return Err(ParseError::Xml(format!(
                "verse {} outside of a book element",
                verse.number
            )));
        }
        BookState::Canon(label) => label,
    };
    let chapter = chapter.ok_or_else(|| {
        ParseError::Xml(format!(
            "{label} verse {} outside of a chapter element",
            verse.number
        ))
    })?;

    match parse_english_verse(label, chapter, &verse.number, &verse.text) {
        Ok(rendering) => doc.renderings.push(rendering),
        Err(ParseError::EmptyVerse(reference)) => doc.empty_verses.push(reference),
        Err(e) => return Err(e),
    }
    Ok(())
}

fn required_attribute(e: &BytesStart<'_>, key: &str) -> Result<String, ParseError> {
    for attr in e.attributes() {
        let attr = attr.map_err(xml_error)?;
        if attr.key.local_name().as_ref() == key.as_bytes() {
            return Ok(attr.unescape_value().map_err(xml_error)?.into_owned());
        }
    }
    Err(ParseError::Xml(format!(
        "<{}> is missing the '{key}' attribute",
        String::from_utf8_lossy(e.local_name().as_ref())
    )))
}

fn xml_error(e: impl fmt::Display) -> ParseError {
    ParseError::Xml(e.to_string())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Referenced;

    const ESV: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<bible translation="ESV">
  <b n="Genesis">
    <c n="1"><v n="1">In the beginning, God created the heavens and the earth.</v></c>
  </b>
  <b n="John">
    <c n="1">
      <v n="1">In the beginning was the Word, and the Word was with God,
        and the Word was God.</v>
      <v n="2">He was in the beginning with God.</v>
      <v n="3"></v>
    </c>
  </b>
</bible>"#;

    const KJV: &str = r#"<bible>
  <book num="Matt">
    <chapter num="1">
      <verse num="1">The book of the generation of Jesus Christ, the son of David, the son of Abraham.</verse>
      <verse num="2">Abraham begat Isaac; and Isaac begat Jacob; and Jacob begat Judas and his <i>brethren</i>;</verse>
    </chapter>
  </book>
</bible>"#;

    #[test]
    fn test_parse_esv_layout() {
        let doc = parse_english_xml(ESV, TagScheme::Esv).unwrap();
        assert_eq!(doc.renderings.len(), 2);
        assert_eq!(doc.skipped_books, vec!["Genesis".to_string()]);
        assert_eq!(doc.empty_verses.len(), 1);
        assert_eq!(doc.empty_verses[0].to_string(), "John 1:3");

        let first = &doc.renderings[0];
        assert_eq!(first.reference().to_string(), "John 1:1");
        assert_eq!(
            first.text(),
            "In the beginning was the Word, and the Word was with God, and the Word was God."
        );
    }

    #[test]
    fn test_parse_kjv_inline_markup() {
        let doc = parse_english_xml(KJV, TagScheme::Kjv).unwrap();
        assert_eq!(doc.renderings.len(), 2);
        assert_eq!(doc.renderings[0].reference().to_string(), "Matthew 1:1");
        assert!(doc.renderings[1].text().ends_with("and his brethren;"));
    }

    #[test]
    fn test_wrong_scheme_finds_nothing() {
        let doc = parse_english_xml(KJV, TagScheme::Esv).unwrap();
        assert!(doc.renderings.is_empty());
    }

    #[test]
    fn test_out_of_bounds_verse_is_malformed() {
        let xml = r#"<bible><b n="John"><c n="22"><v n="1">x</v></c></b></bible>"#;
        assert!(matches!(
            parse_english_xml(xml, TagScheme::Esv),
            Err(ParseError::Malformed(MalformedReference::ChapterOutOfRange { .. }))
        ));
    }

    #[test]
    fn test_parse_single_verse() {
        let r = parse_english_verse("Jn", "1", " 2 ", "He was  in the\nbeginning").unwrap();
        assert_eq!(r.reference().to_string(), "John 1:2");
        assert_eq!(r.text(), "He was in the beginning");

        assert!(matches!(
            parse_english_verse("John", "one", "1", "x"),
            Err(ParseError::Malformed(MalformedReference::Syntax(_)))
        ));
    }

    #[test]
    fn test_scheme_from_str() {
        assert_eq!("ESV".parse::<TagScheme>(), Ok(TagScheme::Esv));
        assert_eq!("kjv".parse::<TagScheme>(), Ok(TagScheme::Kjv));
        assert!("nrsv".parse::<TagScheme>().is_err());
    }
}
