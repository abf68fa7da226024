//! Blog validation and derived fields

use once_cell::sync::Lazy;
use pulldown_cmark::{Event, Parser, Tag};
use regex::Regex;
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

static NON_SLUG_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BlogValidationError {
    #[error("Title must be between 1 and {0} characters")]
    TitleLength(usize),

    #[error("Content is required")]
    EmptyContent,

    #[error("Content cannot exceed {0} characters")]
    ContentTooLong(usize),

    #[error("Rejection reason must be between {min} and {max} characters")]
    ReasonLength { min: usize, max: usize },

    #[error("At most {0} tags are allowed")]
    TooManyTags(usize),
}

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_CONTENT_LENGTH: usize = 65_536;
pub const MIN_REJECTION_REASON_LENGTH: usize = 10;
pub const MAX_REJECTION_REASON_LENGTH: usize = 500;
pub const MAX_TAGS: usize = 10;
pub const EXCERPT_LENGTH: usize = 200;

pub fn validate_blog_title(title: &str) -> Result<(), BlogValidationError> {
    let length = title.trim().chars().count();

    if length == 0 || length > MAX_TITLE_LENGTH {
        return Err(BlogValidationError::TitleLength(MAX_TITLE_LENGTH));
    }

    Ok(())
}

/// Length is measured in characters, not bytes
pub fn validate_blog_content(content: &str) -> Result<(), BlogValidationError> {
    if content.trim().is_empty() {
        return Err(BlogValidationError::EmptyContent);
    }

    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(BlogValidationError::ContentTooLong(MAX_CONTENT_LENGTH));
    }

    Ok(())
}

pub fn validate_tags(tags: &[String]) -> Result<(), BlogValidationError> {
    if tags.len() > MAX_TAGS {
        return Err(BlogValidationError::TooManyTags(MAX_TAGS));
    }

    Ok(())
}

pub fn validate_rejection_reason(reason: &str) -> Result<(), BlogValidationError> {
    let length = reason.trim().chars().count();

    if !(MIN_REJECTION_REASON_LENGTH..=MAX_REJECTION_REASON_LENGTH).contains(&length) {
        return Err(BlogValidationError::ReasonLength {
            min: MIN_REJECTION_REASON_LENGTH,
            max: MAX_REJECTION_REASON_LENGTH,
        });
    }

    Ok(())
}

/// Lowercase ASCII words joined by single dashes
pub fn slugify(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let slug = NON_SLUG_CHARS.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');

    if slug.is_empty() {
        "post".to_string()
    } else {
        slug.to_string()
    }
}

/// Plain-text preview of markdown content, cut on a grapheme boundary
pub fn excerpt_from(content: &str) -> String {
    let mut text = String::new();

    for event in Parser::new(content) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            Event::End(
                Tag::Paragraph
                | Tag::Heading(..)
                | Tag::Item
                | Tag::CodeBlock(_)
                | Tag::BlockQuote
                | Tag::TableCell,
            ) => text.push(' '),
            _ => {}
        }
    }

    let text = WHITESPACE.replace_all(text.trim(), " ");

    if text.graphemes(true).count() <= EXCERPT_LENGTH {
        return text.into_owned();
    }

    let cut: String = text.graphemes(true).take(EXCERPT_LENGTH).collect();
    format!("{}...", cut.trim_end())
}

/// Trimmed, lowercased, deduplicated tags in first-seen order
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());

    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }

    normalized
}
