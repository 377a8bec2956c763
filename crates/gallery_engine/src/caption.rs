use thiserror::Error;

use crate::record::{classify_tag, DateStyle, FieldKind, PhotoRecord, SourceDate, SourceSet};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CaptionError {
    #[error("unterminated tag in caption line: {0:?}")]
    UnterminatedTag(String),
}

/// End-of-document sentinel. Marks end of content, never content itself.
const END_SENTINEL: &str = "{end}";

/// Cursor of the line loop: which field, if any, continuation lines extend.
/// Continuation handling is the whole trick of the format, so the state is
/// explicit rather than implied by the last map insert.
enum Cursor {
    /// No field opened yet; continuation lines are dropped.
    Closed,
    /// The last tag was reserved. It neither creates nor extends a field,
    /// and neither do its continuation lines.
    Skipping,
    /// Field open; continuation lines append to it, space-joined.
    Open(FieldKind, String),
}

/// Normalizes one caption document into a `PhotoRecord`.
///
/// The document is a flat `{Tag}value` log: the first line is a placeholder
/// header, a line without a leading tag continues the most recently opened
/// field, and a trailing `{end}` closes the document.
pub fn parse_caption(
    identifier: &str,
    sources: SourceSet,
    input: &str,
) -> Result<PhotoRecord, CaptionError> {
    let mut record = PhotoRecord::new(identifier, sources);
    let mut cursor = Cursor::Closed;

    for line in input.lines().skip(1) {
        let trimmed = line.trim();
        if trimmed == END_SENTINEL {
            cursor = Cursor::Closed;
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix('{') {
            let (tag, value) = rest
                .split_once('}')
                .ok_or_else(|| CaptionError::UnterminatedTag(trimmed.to_string()))?;
            let tag = tag.to_lowercase();
            cursor = match classify_tag(&tag) {
                None => Cursor::Skipping,
                Some(kind) => {
                    open_field(&mut record, kind, &tag, value.trim());
                    Cursor::Open(kind, tag)
                }
            };
            continue;
        }
        if trimmed.is_empty() {
            continue;
        }
        if let Cursor::Open(kind, tag) = &cursor {
            append_field(&mut record, *kind, tag, trimmed);
        }
    }

    if record.title.is_empty() {
        record.title = record.identifier.clone();
    }
    Ok(record)
}

fn open_field(record: &mut PhotoRecord, kind: FieldKind, tag: &str, value: &str) {
    let value = value.to_string();
    match kind {
        FieldKind::Title => record.title = value,
        FieldKind::Author => record.author = Some(value),
        FieldKind::CaptureDate => {
            record.capture_date = Some(SourceDate {
                style: DateStyle::DayMonthYear,
                text: value,
            })
        }
        FieldKind::Description => record.description = Some(value),
        FieldKind::Keywords => record.keywords = Some(value),
        FieldKind::Extra => {
            // A repeated tag re-opens the existing field in place.
            match record.extra.iter_mut().find(|(name, _)| name.as_str() == tag) {
                Some((_, existing)) => *existing = value,
                None => record.extra.push((tag.to_string(), value)),
            }
        }
    }
}

fn append_field(record: &mut PhotoRecord, kind: FieldKind, tag: &str, continuation: &str) {
    match kind {
        FieldKind::Title => push_joined(&mut record.title, continuation),
        FieldKind::Author => {
            if let Some(value) = record.author.as_mut() {
                push_joined(value, continuation);
            }
        }
        FieldKind::CaptureDate => {
            if let Some(date) = record.capture_date.as_mut() {
                push_joined(&mut date.text, continuation);
            }
        }
        FieldKind::Description => {
            if let Some(value) = record.description.as_mut() {
                push_joined(value, continuation);
            }
        }
        FieldKind::Keywords => {
            if let Some(value) = record.keywords.as_mut() {
                push_joined(value, continuation);
            }
        }
        FieldKind::Extra => {
            if let Some((_, value)) = record.extra.iter_mut().find(|(name, _)| name.as_str() == tag) {
                push_joined(value, continuation);
            }
        }
    }
}

fn push_joined(value: &mut String, continuation: &str) {
    if !value.is_empty() {
        value.push(' ');
    }
    value.push_str(continuation);
}
