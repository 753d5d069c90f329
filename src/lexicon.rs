/// Strong's Greek dictionary, keyed by NFC-normalized lemma.
///
/// Reads the `strongsgreek.xml` layout:
///
/// ```text
/// <entries>
///   <entry strongs="03056">
///     <greek unicode="λόγος" translit="lógos"/>
///     <pronunciation strongs="log'-os"/>
///     <strongs_def>something said; by impl. a <i>topic</i></strongs_def>
///   </entry>
/// </entries>
/// ```
///
/// Inline elements inside `strongs_def` become `*` in the definition text.
use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::Serialize;

use crate::error::ParseError;
use crate::index::normalize_lemma;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LexiconEntry {
    pub strongs: Option<u32>,
    pub lemma: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transliteration: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: HashMap<String, LexiconEntry>,
}

#[derive(Default)]
struct EntryBuilder {
    strongs: Option<u32>,
    lemma: Option<String>,
    transliteration: Option<String>,
    pronunciation: Option<String>,
    definition: Option<String>,
}

/// Position inside a `strongs_def` element: `depth` counts open inline
/// children, whose own text is dropped.
struct Definition {
    text: String,
    depth: usize,
}

impl Lexicon {
    pub fn from_xml(xml: &str) -> Result<Self, ParseError> {
        let mut reader = Reader::from_str(xml);
        let mut entries = HashMap::new();
        let mut entry: Option<EntryBuilder> = None;
        let mut definition: Option<Definition> = None;

        loop {
            match reader.read_event().map_err(xml_error)? {
                Event::Start(e) => {
                    if let Some(def) = definition.as_mut() {
                        if def.depth == 0 {
                            def.text.push('*');
                        }
                        def.depth += 1;
                        continue;
                    }
                    match e.local_name().as_ref() {
                        b"entry" => entry = Some(open_entry(&e)?),
                        b"strongs_def" if entry.is_some() => {
                            definition = Some(Definition {
                                text: String::new(),
                                depth: 0,
                            });
                        }
                        _ => read_fields(&e, entry.as_mut())?,
                    }
                }
                Event::Empty(e) => {
                    if let Some(def) = definition.as_mut() {
                        if def.depth == 0 {
                            def.text.push('*');
                        }
                        continue;
                    }
                    match e.local_name().as_ref() {
                        b"entry" => {}
                        _ => read_fields(&e, entry.as_mut())?,
                    }
                }
                Event::Text(t) => {
                    if let Some(def) = definition.as_mut() {
                        if def.depth == 0 {
                            def.text.push_str(&t.unescape().map_err(xml_error)?);
                        }
                    }
                }
                Event::End(e) => {
                    if let Some(def) = definition.as_mut() {
                        if def.depth > 0 {
                            def.depth -= 1;
                            continue;
                        }
                    }
                    match e.local_name().as_ref() {
                        b"strongs_def" => {
                            if let (Some(def), Some(builder)) = (definition.take(), entry.as_mut()) {
                                let text = def.text.trim();
                                if !text.is_empty() {
                                    builder.definition = Some(text.to_string());
                                }
                            }
                        }
                        b"entry" => {
                            if let Some(done) = entry.take().and_then(EntryBuilder::finish) {
                                entries.insert(done.lemma.clone(), done);
                            }
                        }
                        _ => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(Self { entries })
    }

    /// The entry for a lemma, matched after NFC normalization.
    #[must_use]
    pub fn lookup(&self, lemma: &str) -> Option<&LexiconEntry> {
        self.entries.get(&normalize_lemma(lemma))
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

impl EntryBuilder {
    /// Entries without a Greek headword cannot be looked up and are dropped.
    fn finish(self) -> Option<LexiconEntry> {
        let lemma = normalize_lemma(&self.lemma?);
        if lemma.is_empty() {
            return None;
        }
        Some(LexiconEntry {
            strongs: self.strongs,
            lemma,
            definition: self.definition,
            pronunciation: self.pronunciation,
            transliteration: self.transliteration,
        })
    }
}

fn open_entry(e: &BytesStart<'_>) -> Result<EntryBuilder, ParseError> {
    let strongs = attribute(e, "strongs")?.and_then(|n| n.trim().parse().ok());
    Ok(EntryBuilder {
        strongs,
        ..EntryBuilder::default()
    })
}

fn read_fields(e: &BytesStart<'_>, entry: Option<&mut EntryBuilder>) -> Result<(), ParseError> {
    let Some(entry) = entry else {
        return Ok(());
    };
    match e.local_name().as_ref() {
        b"greek" if entry.lemma.is_none() => {
            entry.lemma = attribute(e, "unicode")?;
            entry.transliteration = attribute(e, "translit")?.filter(|t| !t.is_empty());
        }
        b"pronunciation" => {
            entry.pronunciation = attribute(e, "strongs")?.filter(|p| !p.is_empty());
        }
        _ => {}
    }
    Ok(())
}

fn attribute(e: &BytesStart<'_>, key: &str) -> Result<Option<String>, ParseError> {
    for attr in e.attributes() {
        let attr = attr.map_err(xml_error)?;
        if attr.key.local_name().as_ref() == key.as_bytes() {
            return Ok(Some(attr.unescape_value().map_err(xml_error)?.into_owned()));
        }
    }
    Ok(None)
}

fn xml_error(e: impl std::fmt::Display) -> ParseError {
    ParseError::Xml(e.to_string())
}
