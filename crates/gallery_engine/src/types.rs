use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub final_url: String,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

/// Transport-level failure. Every kind is one "source unavailable" signal to
/// the fallback logic; the kind only matters for the operator log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    /// Status >= 400; the error message carries the response body.
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Which metadata source format a year was routed through. The choice is
/// year-wide: captions when the caption folder yields any entries, XML
/// otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataFormat {
    Caption,
    Xml,
}

impl MetadataFormat {
    pub fn subfolder(self) -> &'static str {
        match self {
            MetadataFormat::Caption => "captions",
            MetadataFormat::Xml => "metadata",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            MetadataFormat::Caption => "txt",
            MetadataFormat::Xml => "xml",
        }
    }
}

impl fmt::Display for MetadataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataFormat::Caption => write!(f, "caption"),
            MetadataFormat::Xml => write!(f, "xml"),
        }
    }
}

/// Outcome counts for one processed year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearSummary {
    pub year: String,
    /// `None` when neither metadata folder yielded entries.
    pub format: Option<MetadataFormat>,
    pub archived: usize,
    pub failed: usize,
    /// Set when the year's local directory could not be prepared.
    pub skipped: bool,
}

impl YearSummary {
    pub fn new(year: impl Into<String>) -> Self {
        Self {
            year: year.into(),
            format: None,
            archived: 0,
            failed: 0,
            skipped: false,
        }
    }
}

/// Aggregate outcome of one archive run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub years: Vec<YearSummary>,
}

impl ArchiveSummary {
    pub fn archived(&self) -> usize {
        self.years.iter().map(|y| y.archived).sum()
    }

    pub fn failed(&self) -> usize {
        self.years.iter().map(|y| y.failed).sum()
    }
}
