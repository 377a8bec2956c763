use archive_logging::archive_warn;
use bytes::Bytes;
use chrono::NaiveDate;
use img_parts::jpeg::{markers, Jpeg, JpegSegment};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::record::{DateStyle, PhotoRecord, SourceDate};

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("not a valid jpeg stream: {0}")]
    InvalidJpeg(String),
}

/// Written in place of an unparseable capture date. The date is advisory
/// metadata; garbage input must not abort the entry, and a recognizable
/// marker beats silently propagating it.
pub const INVALID_DATE_MARKER: &str = "0000:00:00";

const FALLBACK_VALUE: &str = "UNKNOWN";

const EXIF_HEADER: &[u8] = b"Exif\0\0";

// TIFF field tags.
const TAG_IMAGE_DESCRIPTION: u16 = 0x010E;
const TAG_ARTIST: u16 = 0x013B;
const TAG_EXIF_IFD: u16 = 0x8769;
const TAG_DATE_TIME_ORIGINAL: u16 = 0x9003;
const TAG_XP_COMMENT: u16 = 0x9C9C;
const TAG_XP_KEYWORDS: u16 = 0x9C9E;

// TIFF value kinds.
const KIND_BYTE: u16 = 1;
const KIND_ASCII: u16 = 2;
const KIND_LONG: u16 = 4;

/// Where a canonical field lands in the embedded segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// IFD0 `Artist`, NUL-terminated ASCII.
    Artist,
    /// IFD0 `ImageDescription`, NUL-terminated ASCII.
    ImageDescription,
    /// IFD0 `XPKeywords`, wide (two bytes per character) byte sequence.
    XpKeywords,
    /// Exif sub-IFD `DateTimeOriginal`, reformatted to `YYYY:MM:DD`.
    DateTimeOriginal,
    /// IFD0 `XPComment`: one wide-encoded JSON object holding every field
    /// without a bounded destination of its own.
    Comment,
}

/// Fixed routing table from canonical field name to destination. Fields not
/// listed fall through to the comment object, so adding a destination means
/// adding a row, not touching the encoding algorithm.
const FIELD_ROUTES: &[(&str, Destination)] = &[
    ("author", Destination::Artist),
    ("description", Destination::ImageDescription),
    ("keywords", Destination::XpKeywords),
    ("date", Destination::DateTimeOriginal),
];

pub fn destination_for(field: &str) -> Destination {
    FIELD_ROUTES
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, dest)| *dest)
        .unwrap_or(Destination::Comment)
}

enum FieldValue<'a> {
    Text(&'a str),
    Date(&'a SourceDate),
}

struct RoutedFields<'a> {
    artist: Option<&'a str>,
    description: Option<&'a str>,
    keywords: Option<&'a str>,
    date: Option<&'a SourceDate>,
    comment: Map<String, Value>,
}

fn route_fields(record: &PhotoRecord) -> RoutedFields<'_> {
    let mut fields: Vec<(&str, FieldValue<'_>)> = vec![
        ("title", FieldValue::Text(&record.title)),
        ("number", FieldValue::Text(&record.identifier)),
    ];
    if let Some(value) = &record.author {
        fields.push(("author", FieldValue::Text(value)));
    }
    if let Some(date) = &record.capture_date {
        fields.push(("date", FieldValue::Date(date)));
    }
    if let Some(value) = &record.description {
        fields.push(("description", FieldValue::Text(value)));
    }
    if let Some(value) = &record.keywords {
        fields.push(("keywords", FieldValue::Text(value)));
    }
    for (name, value) in &record.extra {
        fields.push((name.as_str(), FieldValue::Text(value)));
    }

    let mut routed = RoutedFields {
        artist: None,
        description: None,
        keywords: None,
        date: None,
        comment: Map::new(),
    };
    for (name, value) in fields {
        match (destination_for(name), value) {
            (Destination::Artist, FieldValue::Text(v)) => routed.artist = Some(v),
            (Destination::ImageDescription, FieldValue::Text(v)) => routed.description = Some(v),
            (Destination::XpKeywords, FieldValue::Text(v)) => routed.keywords = Some(v),
            (Destination::DateTimeOriginal, FieldValue::Date(v)) => routed.date = Some(v),
            (Destination::Comment, FieldValue::Text(v)) => {
                routed
                    .comment
                    .insert(name.to_string(), Value::String(v.to_string()));
            }
            // A date value can only route to the date slot.
            _ => {}
        }
    }
    routed
}

/// Builds the APP1 payload (`Exif\0\0` plus a little-endian TIFF block) for
/// one record. Pure and deterministic: equal records produce equal bytes.
pub fn build_exif_segment(record: &PhotoRecord) -> Vec<u8> {
    let routed = route_fields(record);

    let comment_json = Value::Object(routed.comment).to_string();
    let mut ifd0 = vec![
        ascii_entry(TAG_IMAGE_DESCRIPTION, routed.description.unwrap_or(FALLBACK_VALUE)),
        ascii_entry(TAG_ARTIST, routed.artist.unwrap_or(FALLBACK_VALUE)),
        wide_entry(TAG_XP_COMMENT, &comment_json),
        wide_entry(TAG_XP_KEYWORDS, routed.keywords.unwrap_or(FALLBACK_VALUE)),
    ];

    let exif_ifd: Vec<IfdEntry> = routed
        .date
        .map(|date| vec![ascii_entry(TAG_DATE_TIME_ORIGINAL, &format_capture_date(date))])
        .unwrap_or_default();

    let mut segment = Vec::new();
    segment.extend_from_slice(EXIF_HEADER);
    segment.extend_from_slice(&build_tiff(&mut ifd0, exif_ifd));
    segment
}

/// Inserts the segment into the JPEG byte stream, right after SOI. Any Exif
/// APP1 already present is dropped first so reruns stay byte-identical.
pub fn embed_segment(image: &[u8], segment: Vec<u8>) -> Result<Bytes, EmbedError> {
    let mut jpeg = Jpeg::from_bytes(Bytes::copy_from_slice(image))
        .map_err(|err| EmbedError::InvalidJpeg(err.to_string()))?;
    let segments = jpeg.segments_mut();
    segments.retain(|existing| {
        !(existing.marker() == markers::APP1 && existing.contents().starts_with(EXIF_HEADER))
    });
    segments.insert(0, JpegSegment::new_with_contents(markers::APP1, Bytes::from(segment)));
    Ok(jpeg.encoder().bytes())
}

fn format_capture_date(date: &SourceDate) -> String {
    let pattern = match date.style {
        DateStyle::DayMonthYear => "%d-%b-%Y",
        DateStyle::YearMonthDay => "%Y-%m-%d",
    };
    match NaiveDate::parse_from_str(date.text.trim(), pattern) {
        Ok(parsed) => parsed.format("%Y:%m:%d").to_string(),
        Err(err) => {
            archive_warn!("unparseable capture date {:?}: {}", date.text, err);
            INVALID_DATE_MARKER.to_string()
        }
    }
}

#[derive(Debug, Clone)]
struct IfdEntry {
    tag: u16,
    kind: u16,
    count: u32,
    payload: Vec<u8>,
}

fn ascii_entry(tag: u16, text: &str) -> IfdEntry {
    let mut payload = text.as_bytes().to_vec();
    payload.push(0);
    IfdEntry {
        tag,
        kind: KIND_ASCII,
        count: payload.len() as u32,
        payload,
    }
}

fn wide_entry(tag: u16, text: &str) -> IfdEntry {
    let payload = encode_wide(text);
    IfdEntry {
        tag,
        kind: KIND_BYTE,
        count: payload.len() as u32,
        payload,
    }
}

fn long_entry(tag: u16, value: u32) -> IfdEntry {
    IfdEntry {
        tag,
        kind: KIND_LONG,
        count: 1,
        payload: value.to_le_bytes().to_vec(),
    }
}

/// Two-bytes-per-character encoding used by the XP* tags (UTF-16LE with a
/// terminating NUL, matching common writers).
fn encode_wide(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len() * 2 + 2);
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes.extend_from_slice(&[0, 0]);
    bytes
}

const TIFF_HEADER_LEN: u32 = 8;

fn build_tiff(ifd0: &mut Vec<IfdEntry>, mut exif_ifd: Vec<IfdEntry>) -> Vec<u8> {
    let body = if exif_ifd.is_empty() {
        write_ifd(ifd0, TIFF_HEADER_LEN)
    } else {
        // Two passes: the Exif pointer's value depends on IFD0's full size,
        // which the pointer entry itself contributes to (always four inline
        // bytes, so a zero placeholder has the same layout).
        let mut probe = ifd0.clone();
        probe.push(long_entry(TAG_EXIF_IFD, 0));
        let exif_offset = TIFF_HEADER_LEN + write_ifd(&mut probe, TIFF_HEADER_LEN).len() as u32;

        ifd0.push(long_entry(TAG_EXIF_IFD, exif_offset));
        let mut body = write_ifd(ifd0, TIFF_HEADER_LEN);
        body.extend_from_slice(&write_ifd(&mut exif_ifd, exif_offset));
        body
    };

    let mut tiff = Vec::with_capacity(TIFF_HEADER_LEN as usize + body.len());
    tiff.extend_from_slice(b"II");
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&TIFF_HEADER_LEN.to_le_bytes());
    tiff.extend_from_slice(&body);
    tiff
}

/// Serializes one IFD placed at `ifd_offset` within the TIFF block: sorted
/// entry table, zero next-IFD pointer, then the data area for values wider
/// than the four inline bytes, word-aligned.
fn write_ifd(entries: &mut Vec<IfdEntry>, ifd_offset: u32) -> Vec<u8> {
    entries.sort_by_key(|entry| entry.tag);

    let table_len = 2 + entries.len() * 12 + 4;
    let mut data_offset = ifd_offset as usize + table_len;

    let mut table = Vec::with_capacity(table_len);
    let mut data_area = Vec::new();
    table.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for entry in entries.iter() {
        table.extend_from_slice(&entry.tag.to_le_bytes());
        table.extend_from_slice(&entry.kind.to_le_bytes());
        table.extend_from_slice(&entry.count.to_le_bytes());
        if entry.payload.len() <= 4 {
            let mut cell = [0u8; 4];
            cell[..entry.payload.len()].copy_from_slice(&entry.payload);
            table.extend_from_slice(&cell);
        } else {
            table.extend_from_slice(&(data_offset as u32).to_le_bytes());
            data_area.extend_from_slice(&entry.payload);
            data_offset += entry.payload.len();
            if entry.payload.len() % 2 == 1 {
                data_area.push(0);
                data_offset += 1;
            }
        }
    }
    table.extend_from_slice(&0u32.to_le_bytes());
    table.extend_from_slice(&data_area);
    table
}
