//! Entry corpus loading
//!
//! Walks the content directory and parses every markdown document into a
//! [`TroubleshootingEntry`]. A file that fails to parse is reported and
//! skipped, mirroring the per-entry isolation of the sync itself; the
//! failure count still feeds the run's exit status.

use std::path::Path;

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::entry::TroubleshootingEntry;
use crate::error::SyncResult;

/// Result of scanning the content directory.
#[derive(Debug)]
pub struct CorpusLoad {
    pub entries: Vec<TroubleshootingEntry>,
    /// Files that looked like entries but failed to load
    pub failures: usize,
}

/// Load every `.md`/`.mdx` entry under `content_dir`.
pub fn load_entries(content_dir: &Path) -> SyncResult<CorpusLoad> {
    let mut entries = Vec::new();
    let mut failures = 0;

    for dirent in WalkDir::new(content_dir).sort_by_file_name() {
        let dirent = dirent.map_err(std::io::Error::from)?;
        if !dirent.file_type().is_file() {
            continue;
        }

        let path = dirent.path();
        let is_markdown = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("md") | Some("mdx")
        );
        if !is_markdown {
            continue;
        }

        match TroubleshootingEntry::load(path.to_path_buf()) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                failures += 1;
                warn!(file = %path.display(), error = %e, "Failed to load entry");
            }
        }
    }

    info!(
        count = entries.len(),
        failures,
        dir = %content_dir.display(),
        "Loaded entry corpus"
    );

    Ok(CorpusLoad { entries, failures })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn loads_markdown_entries_and_skips_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "alpha.md",
            "---\ndatabase_id: pseudo-1\ntitle: Alpha\n---\nbody a\n",
        );
        write(
            dir.path(),
            "beta.mdx",
            "---\ndatabase_id: pseudo-2\ntitle: Beta\n---\nbody b\n",
        );
        write(dir.path(), "notes.txt", "not an entry");
        write(dir.path(), "broken.md", "no frontmatter here\n");

        let corpus = load_entries(dir.path()).unwrap();

        assert_eq!(corpus.entries.len(), 2);
        assert_eq!(corpus.failures, 1);
        // sort_by_file_name keeps the order stable across platforms
        assert_eq!(corpus.entries[0].frontmatter.title, "Alpha");
        assert_eq!(corpus.entries[1].frontmatter.title, "Beta");
    }

    #[test]
    fn empty_directory_is_an_empty_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = load_entries(dir.path()).unwrap();
        assert!(corpus.entries.is_empty());
        assert_eq!(corpus.failures, 0);
    }
}
