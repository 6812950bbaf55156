//! Local troubleshooting entries
//!
//! One entry is one frontmatter-plus-body markdown document. The
//! `database_id` field is the sole sync-state marker: a `pseudo-` prefixed
//! value means no confirmed database row exists yet. That convention is
//! decided exactly once, while parsing, into the tagged [`EntryId`]; nothing
//! downstream ever looks at the prefix again.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{SyncError, SyncResult};

/// Placeholder prefix marking an entry with no confirmed database row.
const PENDING_PREFIX: &str = "pseudo-";

/// Database identity of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryId {
    /// No confirmed database row yet (`pseudo-` prefixed in the source file)
    Pending(String),
    /// Store-assigned row identifier
    Persisted(String),
}

impl EntryId {
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix(PENDING_PREFIX) {
            Some(token) => EntryId::Pending(token.to_string()),
            None => EntryId::Persisted(raw.to_string()),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, EntryId::Pending(_))
    }
}

impl<'de> Deserialize<'de> for EntryId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(EntryId::parse(&raw))
    }
}

/// Typed view of the frontmatter block.
///
/// Unknown fields are ignored here; write-back works on the raw YAML mapping
/// so they survive a rewrite regardless.
#[derive(Debug, Clone, Deserialize)]
pub struct Frontmatter {
    pub database_id: EntryId,
    #[serde(default)]
    pub github_url: Option<String>,
    pub title: String,
    #[serde(default)]
    pub api: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub date_created: Option<String>,
}

/// One local troubleshooting document.
#[derive(Debug, Clone)]
pub struct TroubleshootingEntry {
    pub file_path: PathBuf,
    pub frontmatter: Frontmatter,
    /// Raw document body, frontmatter stripped
    pub content: String,
}

impl TroubleshootingEntry {
    /// Parse a raw document into frontmatter and body.
    pub fn parse(file_path: PathBuf, raw: &str) -> SyncResult<Self> {
        let (frontmatter_text, body) = split_document(raw).ok_or_else(|| {
            SyncError::Frontmatter(format!("{}: missing frontmatter block", file_path.display()))
        })?;

        let frontmatter: Frontmatter = serde_yaml::from_str(frontmatter_text)
            .map_err(|e| SyncError::Frontmatter(format!("{}: {}", file_path.display(), e)))?;

        Ok(Self {
            file_path,
            frontmatter,
            content: body.to_string(),
        })
    }

    /// Read and parse an entry from disk.
    pub fn load(file_path: PathBuf) -> SyncResult<Self> {
        let raw = std::fs::read_to_string(&file_path)?;
        Self::parse(file_path, &raw)
    }

    /// URL slug of the published article, derived from the file name.
    pub fn slug(&self) -> String {
        self.file_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Split a document into (frontmatter text, body).
///
/// The frontmatter block is delimited by `---` lines at the very top of the
/// file. The returned body slice starts immediately after the closing
/// delimiter line.
fn split_document(raw: &str) -> Option<(&str, &str)> {
    let rest = raw
        .strip_prefix("---\n")
        .or_else(|| raw.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let frontmatter = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((frontmatter, body));
        }
        offset += line.len();
    }
    None
}

/// Replace the `database_id` field in a file's frontmatter with the
/// store-assigned identifier.
///
/// Works on the raw YAML mapping, so fields the typed model does not know
/// about are preserved, in order. The body is carried over byte-for-byte.
pub fn write_back_id(file_path: &Path, id: &str) -> SyncResult<()> {
    let raw = std::fs::read_to_string(file_path)?;
    let (frontmatter_text, body) = split_document(&raw).ok_or_else(|| {
        SyncError::Frontmatter(format!("{}: missing frontmatter block", file_path.display()))
    })?;

    let mut mapping: serde_yaml::Mapping = serde_yaml::from_str(frontmatter_text)
        .map_err(|e| SyncError::Frontmatter(format!("{}: {}", file_path.display(), e)))?;
    mapping.insert(
        serde_yaml::Value::String("database_id".to_string()),
        serde_yaml::Value::String(id.to_string()),
    );

    let frontmatter = serde_yaml::to_string(&mapping)
        .map_err(|e| SyncError::Frontmatter(format!("{}: {}", file_path.display(), e)))?;

    let rewritten = format!("---\n{}---\n{}", frontmatter, body);
    std::fs::write(file_path, rewritten)?;

    Ok(())
}
