/// The user's own per-verse translations, stored as JSON beside the
/// read-only datasets.
///
/// On disk the verses are nested `{book: {chapter: {verse: text}}}` under a
/// `books` key, with the time of the last save. A bare nested map without
/// the wrapper is also accepted on load.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::canon::Reference;

type Nested = BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>;

#[derive(Debug, Serialize, Deserialize)]
struct TranslationFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
    books: Nested,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OnDisk {
    Wrapped(TranslationFile),
    Bare(Nested),
}

#[derive(Debug, Clone, Default)]
pub struct UserTranslations {
    path: PathBuf,
    verses: BTreeMap<Reference, String>,
    updated_at: Option<DateTime<Utc>>,
}

impl UserTranslations {
    /// Load the store at `path`. A missing file is an empty store; entries
    /// whose reference is outside the canon are skipped with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            debug!("No user translations at {}", path.display());
            return Ok(Self {
                path,
                ..Self::default()
            });
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read user translations: {}", path.display()))?;
        let on_disk: OnDisk = serde_json::from_str(&content)
            .with_context(|| format!("Invalid user translation file: {}", path.display()))?;
        let (books, updated_at) = match on_disk {
            OnDisk::Wrapped(file) => (file.books, file.updated_at),
            OnDisk::Bare(books) => (books, None),
        };

        let mut verses = BTreeMap::new();
        for (book, chapters) in books {
            for (chapter, numbered) in chapters {
                for (verse, text) in numbered {
                    match parse_key(&book, &chapter, &verse) {
                        Some(reference) if !text.trim().is_empty() => {
                            verses.insert(reference, text);
                        }
                        Some(_) => {}
                        None => warn!("Skipping user translation for {book} {chapter}:{verse}"),
                    }
                }
            }
        }

        info!("Loaded {} user translations from {}", verses.len(), path.display());
        Ok(Self {
            path,
            verses,
            updated_at,
        })
    }

    #[must_use]
    pub fn get(&self, reference: Reference) -> Option<&str> {
        self.verses.get(&reference).map(String::as_str)
    }

    /// Store a translation. Blank text removes the verse's entry.
    pub fn set(&mut self, reference: Reference, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            self.verses.remove(&reference);
        } else {
            self.verses.insert(reference, text.to_string());
        }
    }

    /// Write the store back to its file, creating parent directories.
    pub fn save(&mut self) -> Result<()> {
        let mut books = Nested::new();
        for (reference, text) in &self.verses {
            books
                .entry(reference.book().name().to_string())
                .or_default()
                .entry(reference.chapter().to_string())
                .or_default()
                .insert(reference.verse().to_string(), text.clone());
        }

        let now = Utc::now();
        let file = TranslationFile {
            updated_at: Some(now),
            books,
        };
        let json = serde_json::to_string_pretty(&file)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory: {}", parent.display())
                })?;
            }
        }
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write user translations: {}", self.path.display()))?;

        self.updated_at = Some(now);
        info!("Saved {} user translations to {}", self.verses.len(), self.path.display());
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Reference, &str)> {
        self.verses.iter().map(|(r, t)| (*r, t.as_str()))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.verses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }
}

fn parse_key(book: &str, chapter: &str, verse: &str) -> Option<Reference> {
    let chapter = chapter.trim().parse().ok()?;
    let verse = verse.trim().parse().ok()?;
    Reference::from_parts(book, chapter, verse).ok()
}
