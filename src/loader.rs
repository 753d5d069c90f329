/// Builds a [`Snapshot`] from the files named in a [`Config`].
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Config;
use crate::error::LoadError;
use crate::lexicon::Lexicon;
use crate::snapshot::{Snapshot, SnapshotBuilder};

/// Read every configured input and build the snapshot. Any fatal error
/// aborts the whole load.
pub fn load_snapshot(config: &Config) -> Result<Snapshot, LoadError> {
    let mut builder = SnapshotBuilder::new(&config.greek.label, &config.english.label)
        .warning_limit(config.log_warning_limit)
        .allow_partial_books(config.greek.allow_partial_books);

    let files = greek_files(Path::new(&config.greek.dir), &config.greek.extension)?;
    info!(
        "Reading {} {} files from {}",
        files.len(),
        config.greek.label,
        config.greek.dir
    );
    for path in &files {
        let file = File::open(path).map_err(|source| io_error(path, source))?;
        let origin = path.display().to_string();
        builder.add_greek_rows(&origin, BufReader::new(file))?;
    }

    let english_path = Path::new(&config.english.path);
    let xml = read(english_path)?;
    let added = builder.add_english_xml(
        &english_path.display().to_string(),
        &xml,
        config.english.scheme,
    )?;
    info!("Read {added} {} verses from {}", config.english.label, english_path.display());

    if let Some(lexicon_path) = &config.lexicon_path {
        let path = Path::new(lexicon_path);
        let lexicon = Lexicon::from_xml(&read(path)?).map_err(|source| LoadError::Parse {
            origin: path.display().to_string(),
            source,
        })?;
        info!("Read {} lexicon entries from {}", lexicon.len(), path.display());
        builder = builder.with_lexicon(lexicon);
    }

    builder.build()
}

/// Files in `dir` with the given extension, sorted by name.
fn greek_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, LoadError> {
    let extension = extension.trim_start_matches('.');
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|source| io_error(dir, source))? {
        let path = entry.map_err(|source| io_error(dir, source))?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(extension) {
            files.push(path);
        } else {
            debug!("Ignoring {}", path.display());
        }
    }
    files.sort();
    Ok(files)
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: std::io::Error) -> LoadError {
    LoadError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_greek_files_are_filtered_and_sorted() {
        let dir = tempdir().unwrap();
        for name in ["64-Jn-morphgnt.txt", "61-Mt-morphgnt.txt", "README.md"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let files = greek_files(dir.path(), ".txt").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["61-Mt-morphgnt.txt", "64-Jn-morphgnt.txt"]);
    }

    #[test]
    fn test_missing_greek_dir_is_io_error() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.greek.dir = dir.path().join("absent").to_string_lossy().to_string();
        assert!(matches!(load_snapshot(&config), Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_missing_english_file_is_io_error() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("64-Jn-morphgnt.txt"),
            "040101 P- -------- Ἐν Ἐν ἐν ἐν\n",
        )
        .unwrap();
        let mut config = Config::default();
        config.greek.dir = dir.path().to_string_lossy().to_string();
        config.english.path = dir.path().join("esv.xml").to_string_lossy().to_string();

        match load_snapshot(&config) {
            Err(LoadError::Io { path, .. }) => assert!(path.ends_with("esv.xml")),
            other => panic!("expected an I/O error, got {other:?}"),
        }
    }
}
