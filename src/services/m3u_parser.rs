use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

use crate::models::CatalogEntry;

lazy_static! {
    /// Regex to normalize multiple whitespaces into single space
    static ref MULTI_SPACE_REGEX: Regex = Regex::new(r"\s{2,}").unwrap();
    /// Regex to parse EXTINF attributes (tvg-id="...", group-title="...", etc)
    static ref ATTR_REGEX: Regex = Regex::new(r#"(\w+(?:-\w+)*)="([^"]*)""#).unwrap();
}

/// Parsed EXTINF line data
#[derive(Debug, Default)]
struct ExtinfData {
    attributes: HashMap<String, String>,
    title: String,
}

/// Parse an EXTINF line
/// Format: #EXTINF:duration tvg-id="..." tvg-logo="..." group-title="...",Title
fn parse_extinf(line: &str) -> Option<ExtinfData> {
    let content = line.strip_prefix("#EXTINF:")?;
    let comma = title_separator(content)?;

    let header = &content[..comma];
    let title = content[comma + 1..].trim().to_string();

    let attributes = ATTR_REGEX
        .captures_iter(header)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect();

    Some(ExtinfData { attributes, title })
}

/// First comma outside a quoted attribute value
fn title_separator(content: &str) -> Option<usize> {
    let mut in_quotes = false;
    for (i, c) in content.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => return Some(i),
            _ => {}
        }
    }
    None
}

/// Normalize text: trim and collapse multiple spaces into single space
fn normalize_text(text: &str) -> String {
    MULTI_SPACE_REGEX.replace_all(text.trim(), " ").to_string()
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| normalize_text(v))
        .filter(|v| !v.is_empty())
}

/// Parse M3U playlist text into catalog entries.
///
/// Each `#EXTINF` line is paired with the next non-comment line as its URL.
/// `group-title` (or a following `#EXTGRP:` line) gives the group, `tvg-logo`
/// the logo. Entries without a title or URL are dropped.
pub fn parse_m3u(text: &str) -> Vec<CatalogEntry> {
    let mut entries = Vec::new();
    let mut current: Option<ExtinfData> = None;
    let mut extgrp: Option<String> = None;
    let mut found_header = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with("#EXTM3U") {
            found_header = true;
            continue;
        }

        if trimmed.starts_with("#EXTINF:") {
            current = parse_extinf(trimmed);
            extgrp = None;
            continue;
        }

        if let Some(group) = trimmed.strip_prefix("#EXTGRP:") {
            extgrp = Some(normalize_text(group));
            continue;
        }

        // Other directives and comments
        if trimmed.starts_with('#') {
            continue;
        }

        let Some(extinf) = current.take() else {
            continue;
        };

        let name = normalize_text(&extinf.title);
        if name.is_empty() {
            continue;
        }

        let group = non_blank(extinf.attributes.get("group-title"))
            .or_else(|| extgrp.take().filter(|g| !g.is_empty()));

        entries.push(CatalogEntry {
            name,
            url: trimmed.to_string(),
            group,
            logo: non_blank(extinf.attributes.get("tvg-logo")),
        });
    }

    if !found_header {
        tracing::debug!("Playlist has no #EXTM3U header, parsed {} entries anyway", entries.len());
    }

    entries
}
