//! M3U playlist parsing
//!
//! Turns raw playlist text into [`PlaylistEntry`] values in source order.
//! Only the `#EXTM3U` header is validated; tag lines are kept verbatim so
//! matching and rewriting see exactly what the source published.

use tracing::debug;

use crate::errors::{SourceError, SourceResult};
use crate::models::PlaylistEntry;

pub const HEADER_MARKER: &str = "#EXTM3U";
pub const EXTINF_MARKER: &str = "#EXTINF";
const DIRECTIVE_PREFIX: char = '#';
const BYTE_ORDER_MARK: char = '\u{feff}';

/// Parse playlist text, failing on a missing or invalid header
pub fn try_parse(content: &str) -> SourceResult<Vec<PlaylistEntry>> {
    let mut lines = content
        .strip_prefix(BYTE_ORDER_MARK)
        .unwrap_or(content)
        .lines()
        .map(str::trim)
        .skip_while(|line| line.is_empty());

    match lines.next() {
        None => return Err(SourceError::malformed("playlist is empty")),
        Some(header) if !header.starts_with(HEADER_MARKER) => {
            return Err(SourceError::malformed(format!(
                "expected {HEADER_MARKER} header, found '{}'",
                header.chars().take(40).collect::<String>()
            )));
        }
        Some(_) => {}
    }

    let mut entries = Vec::new();
    let mut dropped = 0usize;
    let mut lines = lines.peekable();

    while let Some(line) = lines.next() {
        if !line.starts_with(EXTINF_MARKER) {
            continue;
        }

        // The URL must be the very next line. Anything else drops this tag
        // line and is examined on the next iteration.
        match lines.peek() {
            Some(next) if !next.is_empty() && !next.starts_with(DIRECTIVE_PREFIX) => {
                entries.push(PlaylistEntry::new(line, *next));
                lines.next();
            }
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!("Dropped {} tag lines without a stream URL", dropped);
    }
    debug!("Parsed {} playlist entries", entries.len());
    Ok(entries)
}
