use url::Url;

/// Resolution/size tags plus the literal `type` tag. These are attribution
/// and sizing noise in the source documents, never content metadata: they
/// must not create or extend any field in the normalized record.
pub const RESERVED_TAGS: &[&str] = &["type", "high", "medium", "low", "slide", "tiny", "thumb"];

/// Which parse pattern applies to a source date. Caption documents carry
/// `14-Feb-2001`; XML documents carry ISO `2001-05-03`. The normalizer that
/// produced the date tags it, so the encoder never has to guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    DayMonthYear,
    YearMonthDay,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDate {
    pub style: DateStyle,
    pub text: String,
}

/// The fixed resolution-tier triple for one entry.
///
/// `high` and `medium` point at the same pixel format, so substituting one
/// for the other is visually consistent. `low` is a reduced-fidelity GIF and
/// never participates in fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSet {
    pub high: String,
    pub medium: String,
    pub low: String,
}

impl SourceSet {
    /// Tier URLs are fully determined by gallery root, year, and identifier.
    pub fn for_entry(base: &Url, year: &str, identifier: &str) -> Self {
        let root = base.as_str().trim_end_matches('/');
        Self {
            high: format!("{root}/{year}/hires/{identifier}.jpg"),
            medium: format!("{root}/{year}/medres/{identifier}.jpg"),
            low: format!("{root}/{year}/thumbs/{identifier}.gif"),
        }
    }
}

/// The normalized, format-independent metadata for one photograph. Built by
/// exactly one of the two normalizers, consumed by the embedding encoder and
/// the resolution resolver, dropped after the entry's persistence attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRecord {
    /// Unique within its year; also the output filename stem. Never empty.
    pub identifier: String,
    pub title: String,
    pub author: Option<String>,
    pub capture_date: Option<SourceDate>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    /// Recognized fields not lifted into the five above, insertion order
    /// preserved. Never contains a reserved tag.
    pub extra: Vec<(String, String)>,
    pub sources: SourceSet,
}

impl PhotoRecord {
    pub fn new(identifier: impl Into<String>, sources: SourceSet) -> Self {
        let identifier = identifier.into();
        debug_assert!(!identifier.is_empty());
        Self {
            title: identifier.clone(),
            identifier,
            author: None,
            capture_date: None,
            description: None,
            keywords: None,
            extra: Vec::new(),
            sources,
        }
    }
}

/// Canonical destination of one recognized metadata tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Title,
    Author,
    CaptureDate,
    Description,
    Keywords,
    Extra,
}

/// Classifies a lower-cased tag name. Reserved tags return `None`.
pub fn classify_tag(tag: &str) -> Option<FieldKind> {
    if RESERVED_TAGS.contains(&tag) {
        return None;
    }
    Some(match tag {
        "title" => FieldKind::Title,
        "author" => FieldKind::Author,
        "date" => FieldKind::CaptureDate,
        "description" => FieldKind::Description,
        "keywords" => FieldKind::Keywords,
        _ => FieldKind::Extra,
    })
}
