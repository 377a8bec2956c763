//! Gallery archiver engine: listing discovery, metadata normalization,
//! EXIF embedding, resolution fallback, and persistence.
mod archive;
mod caption;
mod decode;
mod exif;
mod fetch;
mod listing;
mod persist;
mod record;
mod resolve;
mod types;
mod xmlmeta;

pub use archive::{ArchiveError, ArchiveSettings, EntryError, GalleryArchiver};
pub use caption::{parse_caption, CaptionError};
pub use decode::{decode_text, DecodeError, DecodedText};
pub use exif::{
    build_exif_segment, destination_for, embed_segment, Destination, EmbedError,
    INVALID_DATE_MARKER,
};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use listing::GalleryIndex;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use record::{
    classify_tag, DateStyle, FieldKind, PhotoRecord, SourceDate, SourceSet, RESERVED_TAGS,
};
pub use resolve::{first_success, resolve_image};
pub use types::{
    ArchiveSummary, FailureKind, FetchError, FetchMetadata, FetchOutput, MetadataFormat,
    YearSummary,
};
pub use xmlmeta::{parse_xml_metadata, XmlMetaError};
