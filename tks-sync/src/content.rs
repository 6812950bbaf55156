//! Content normalization and checksumming
//!
//! "Has this entry changed" and "does this entry already exist" are answered
//! by comparing SHA-256 digests of a canonical form of the document body, so
//! cosmetic formatting differences in the source never register as edits.

use pulldown_cmark::{Event, Options, Parser};
use pulldown_cmark_to_cmark::cmark;
use sha2::{Digest, Sha256};

use crate::error::{SyncError, SyncResult};

/// Markdown extensions shared by the parse and serialize sides.
///
/// Tables, strikethrough, and task lists match what the application renders;
/// embedded UI component tags ride through as inline HTML events.
fn extension_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Re-serialize `content` into canonical markdown.
///
/// Parses into the pulldown-cmark event stream and writes it back out. The
/// round trip strips formatting variance (heading underline style, list
/// marker choice, quote escaping) that does not change rendered output.
pub fn normalize(content: &str) -> SyncResult<String> {
    validate_components(content)?;

    let parser = Parser::new_ext(content, extension_options());
    let mut canonical = String::with_capacity(content.len());
    cmark(parser, &mut canonical)
        .map_err(|e| SyncError::Malformed(format!("markdown serialization failed: {}", e)))?;
    canonical.push('\n');
    Ok(canonical)
}

/// SHA-256 of the canonical document form, lowercase hex.
pub fn checksum(content: &str) -> SyncResult<String> {
    let canonical = normalize(content)?;
    Ok(format!("{:x}", Sha256::digest(canonical.as_bytes())))
}

/// Check that embedded component markup is balanced.
///
/// CommonMark accepts any text, so this is the only parse step that can
/// actually reject a document. Component tags are the capitalized ones
/// (`<Tabs>`, `<Callout />`); lowercase HTML is left alone. Only HTML events
/// are scanned, so component syntax quoted inside code spans and fences does
/// not count.
fn validate_components(content: &str) -> SyncResult<()> {
    let parser = Parser::new_ext(content, extension_options());
    let mut open: Vec<String> = Vec::new();

    for event in parser {
        let fragment = match &event {
            Event::Html(html) | Event::InlineHtml(html) => html.as_ref(),
            _ => continue,
        };
        scan_fragment(fragment, &mut open)?;
    }

    if let Some(name) = open.pop() {
        return Err(SyncError::Malformed(format!("unclosed component <{}>", name)));
    }
    Ok(())
}

/// Scan one raw HTML fragment, pushing/popping component tags on `open`.
fn scan_fragment(fragment: &str, open: &mut Vec<String>) -> SyncResult<()> {
    let bytes = fragment.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }

        let closing = bytes.get(i + 1) == Some(&b'/');
        let name_start = if closing { i + 2 } else { i + 1 };

        // Component tags are capitalized; anything else is plain HTML
        match bytes.get(name_start) {
            Some(c) if c.is_ascii_uppercase() => {}
            _ => {
                i += 1;
                continue;
            }
        }

        let mut name_end = name_start;
        while name_end < bytes.len() && bytes[name_end].is_ascii_alphanumeric() {
            name_end += 1;
        }
        let name = &fragment[name_start..name_end];

        let gt = match fragment[name_end..].find('>') {
            Some(offset) => name_end + offset,
            None => {
                return Err(SyncError::Malformed(format!(
                    "unterminated component tag <{}",
                    name
                )))
            }
        };

        if closing {
            match open.pop() {
                Some(expected) if expected == name => {}
                Some(expected) => {
                    return Err(SyncError::Malformed(format!(
                        "expected </{}>, found </{}>",
                        expected, name
                    )))
                }
                None => {
                    return Err(SyncError::Malformed(format!(
                        "stray closing tag </{}>",
                        name
                    )))
                }
            }
        } else if fragment[..gt].ends_with('/') {
            // self-closing, nothing to track
        } else {
            open.push(name.to_string());
        }

        i = gt + 1;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_ignores_formatting_variance() {
        let atx = "# Connection refused\n\n* check the port\n* check the host\n";
        let setext = "Connection refused\n==================\n\n- check the port\n- check the host\n";
        assert_eq!(checksum(atx).unwrap(), checksum(setext).unwrap());
    }

    #[test]
    fn checksum_differs_on_content_change() {
        let a = "# Connection refused\n\nCheck the port.\n";
        let b = "# Connection refused\n\nCheck the host.\n";
        assert_ne!(checksum(a).unwrap(), checksum(b).unwrap());
    }

    #[test]
    fn checksum_is_sha256_hex() {
        let digest = checksum("# A\n").unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn normalize_is_idempotent() {
        let doc = "Title\n=====\n\n1. one\n2. two\n\n> a quote\n\n| a | b |\n|---|---|\n| 1 | 2 |\n";
        let once = normalize(doc).unwrap();
        let twice = normalize(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn balanced_components_pass() {
        let doc = "# A\n\n<Tabs>\n<Tab title=\"one\">\ncontent\n</Tab>\n</Tabs>\n\n<Callout type=\"warn\" />\n";
        assert!(normalize(doc).is_ok());
    }

    #[test]
    fn unclosed_component_is_malformed() {
        let doc = "# A\n\n<Tabs>\ncontent\n";
        assert!(matches!(normalize(doc), Err(SyncError::Malformed(_))));
    }

    #[test]
    fn mismatched_close_is_malformed() {
        let doc = "<Tabs>\n</Tab>\n";
        assert!(matches!(normalize(doc), Err(SyncError::Malformed(_))));
    }

    #[test]
    fn stray_close_is_malformed() {
        let doc = "text\n\n</Tab>\n";
        assert!(matches!(normalize(doc), Err(SyncError::Malformed(_))));
    }

    #[test]
    fn plain_html_is_not_component_checked() {
        let doc = "text <br> more\n\n<div>\nblock\n</div>\n";
        assert!(normalize(doc).is_ok());
    }

    #[test]
    fn code_fences_are_opaque() {
        let doc = "```\n<Tabs>\n```\n\nInline `<Tab>` too.\n";
        assert!(normalize(doc).is_ok());
    }
}
