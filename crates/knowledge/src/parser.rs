//! Source file parsing and text extraction.

use arag_core::{AppError, AppResult};
use std::fs;
use std::path::Path;

/// Content type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Markdown,
    Html,
    PlainText,
    Unknown,
}

impl ContentType {
    /// Detect content type from file extension.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("md") | Some("markdown") => Self::Markdown,
            Some("html") | Some("htm") => Self::Html,
            Some("txt") | Some("text") | Some("rst") => Self::PlainText,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::PlainText => "text",
            Self::Unknown => "unknown",
        }
    }
}

/// Parse a source file and extract clean text.
pub fn parse_file(path: &Path) -> AppResult<String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Knowledge(format!("Failed to read {:?}: {}", path, e)))?;

    parse_content(path, &raw)
}

/// Extract clean text from already-loaded content.
pub fn parse_content(path: &Path, raw: &str) -> AppResult<String> {
    let cleaned = match ContentType::from_path(path) {
        ContentType::Markdown => clean_markdown(raw),
        ContentType::Html => clean_html(raw),
        ContentType::PlainText => raw.trim().to_string(),
        ContentType::Unknown => {
            if !is_likely_text(raw) {
                tracing::warn!("Skipping likely binary file: {:?}", path);
                return Err(AppError::Knowledge(format!(
                    "Binary file not supported: {:?}",
                    path
                )));
            }
            raw.trim().to_string()
        }
    };

    Ok(cleaned)
}

/// Strip heading markers and fences, keep paragraph breaks.
fn clean_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut blank_pending = false;

    for line in text.lines() {
        let trimmed = line.trim_start_matches('#').trim();

        if trimmed.starts_with("---") || trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            continue;
        }

        if trimmed.is_empty() {
            blank_pending = !result.is_empty();
            continue;
        }

        if blank_pending {
            result.push('\n');
            blank_pending = false;
        }
        result.push_str(trimmed);
        result.push('\n');
    }

    result.trim().to_string()
}

/// Strip tags, scripts and styles from an HTML page.
fn clean_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;
    let mut skip_until: Option<&str> = None;

    for (i, ch) in text.char_indices() {
        let rest = &text[i..];

        if let Some(closing) = skip_until {
            if starts_with_ignore_case(rest, closing) {
                skip_until = None;
                in_tag = true;
            }
            continue;
        }

        match ch {
            '<' => {
                in_tag = true;
                if starts_with_ignore_case(rest, "<script") {
                    skip_until = Some("</script");
                } else if starts_with_ignore_case(rest, "<style") {
                    skip_until = Some("</style");
                } else {
                    // Tag boundaries separate words.
                    result.push(' ');
                }
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }

    decode_entities(&result)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack
        .get(..prefix.len())
        .map(|head| head.eq_ignore_ascii_case(prefix))
        .unwrap_or(false)
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn is_likely_text(data: &str) -> bool {
    !data.contains('\0')
}
