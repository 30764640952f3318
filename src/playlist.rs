// src/playlist.rs
// M3U playlist reading, decoding, parsing and writing

use crate::error::AppError;
use log::{debug, warn};
use serde::Serialize;
use std::fs;
use std::path::Path;

pub const HEADER: &str = "#EXTM3U";
pub const TITLE_MARKER: &str = "#EXTINF:";

/// A parsed (title, URL) pair from a playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub title: String,
    pub url: String,
}

impl Entry {
    pub fn new(title: &str, url: &str) -> Self {
        Self {
            title: title.to_string(),
            url: url.to_string(),
        }
    }
}

/// Text encodings tried, in order, when decoding a playlist file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
}

pub const DECODE_ORDER: [TextEncoding; 2] = [TextEncoding::Utf8, TextEncoding::Latin1];

impl TextEncoding {
    fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => {
                let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
                std::str::from_utf8(bytes).ok().map(str::to_string)
            }
            // Every byte maps to the code point of the same value
            TextEncoding::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
        }
    }
}

/// Decode raw playlist bytes with the first encoding in [`DECODE_ORDER`] that accepts them
pub fn decode_playlist(bytes: &[u8]) -> (String, TextEncoding) {
    for encoding in DECODE_ORDER {
        if let Some(text) = encoding.decode(bytes) {
            return (text, encoding);
        }
        debug!("Playlist is not valid {:?}, trying next encoding", encoding);
    }
    // Latin-1 accepts any byte sequence, so the loop always returns
    (String::new(), TextEncoding::Latin1)
}

/// Parse playlist text into ordered entries.
///
/// Tolerant: malformed structure is skipped, never reported. A title with no
/// URL before the next title is dropped, and a URL with no pending title is
/// ignored.
pub fn parse(text: &str) -> Vec<Entry> {
    let mut entries = Vec::new();
    let mut pending_title: Option<String> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(directive) = line.strip_prefix(TITLE_MARKER) {
            if pending_title.is_some() {
                debug!("Dropping title with no URL: {:?}", pending_title);
            }
            pending_title = extract_title(directive);
            continue;
        }

        if line.starts_with('#') {
            continue;
        }

        if let Some(title) = pending_title.take() {
            entries.push(Entry {
                title,
                url: line.to_string(),
            });
        }
    }

    entries
}

/// Title portion of an `#EXTINF:` directive: everything after the first comma
/// that is not inside a quoted attribute value.
fn extract_title(directive: &str) -> Option<String> {
    let mut in_quotes = false;
    for (idx, c) in directive.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                let title = directive[idx + 1..].trim();
                return if title.is_empty() {
                    None
                } else {
                    Some(title.to_string())
                };
            }
            _ => {}
        }
    }
    None
}

/// Read, decode and parse a playlist file
pub fn read_playlist(path: &Path) -> Result<Vec<Entry>, AppError> {
    let bytes = fs::read(path).map_err(|e| {
        AppError::PlaylistError(format!("cannot read {}: {}", path.display(), e))
    })?;
    let (text, encoding) = decode_playlist(&bytes);
    if encoding != TextEncoding::Utf8 {
        warn!(
            "{} is not valid UTF-8, decoded as {:?}",
            path.display(),
            encoding
        );
    }
    let entries = parse(&text);
    debug!("Parsed {} entries from {}", entries.len(), path.display());
    Ok(entries)
}

/// Minimal playlist: header line followed by one URL per line
pub fn render_playlist<S: AsRef<str>>(urls: &[S]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for url in urls {
        out.push_str(url.as_ref());
        out.push('\n');
    }
    out
}

/// Playlist with an `#EXTINF` title line before each URL
pub fn render_extended_playlist(entries: &[Entry]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for entry in entries {
        out.push_str(&format!("{}-1,{}\n{}\n", TITLE_MARKER, entry.title, entry.url));
    }
    out
}

/// Write the minimal playlist to `path` as UTF-8
pub fn write_playlist<S: AsRef<str>>(path: &Path, urls: &[S]) -> Result<(), AppError> {
    fs::write(path, render_playlist(urls)).map_err(|e| {
        AppError::PlaylistError(format!("cannot write {}: {}", path.display(), e))
    })
}
