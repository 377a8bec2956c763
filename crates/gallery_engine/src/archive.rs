use std::path::PathBuf;
use std::sync::Arc;

use archive_logging::{archive_info, archive_warn, get_entry_count, set_entry_count};
use thiserror::Error;
use url::Url;

use crate::caption::{parse_caption, CaptionError};
use crate::decode::{decode_text, DecodeError};
use crate::exif::{build_exif_segment, embed_segment, EmbedError};
use crate::fetch::Fetcher;
use crate::listing::GalleryIndex;
use crate::persist::{ensure_output_dir, AtomicFileWriter, PersistError};
use crate::record::{PhotoRecord, SourceSet};
use crate::resolve::{first_success, resolve_image};
use crate::types::{ArchiveSummary, MetadataFormat, YearSummary};
use crate::xmlmeta::{parse_xml_metadata, XmlMetaError};

#[derive(Debug, Clone)]
pub struct ArchiveSettings {
    /// Gallery root; year folders hang directly under it.
    pub base_url: Url,
    pub output_dir: PathBuf,
}

impl ArchiveSettings {
    fn root(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    fn root_index_url(&self) -> String {
        format!("{}/", self.root())
    }

    fn year_index_url(&self, year: &str, format: MetadataFormat) -> String {
        format!("{}/{year}/{}/", self.root(), format.subfolder())
    }

    fn document_url(&self, year: &str, identifier: &str, format: MetadataFormat) -> String {
        format!(
            "{}/{year}/{}/{identifier}.{}",
            self.root(),
            format.subfolder(),
            format.extension()
        )
    }
}

/// Fatal to the run: without the root listing there is nothing to archive.
/// Everything below it degrades to skipping a year or an entry.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("gallery listing unavailable: {0}")]
    ListingUnavailable(String),
}

/// One entry's failure, caught at the entry and reported, never fatal.
#[derive(Debug, Error)]
pub enum EntryError {
    #[error("metadata document fetch failed: {0}")]
    Fetch(crate::types::FetchError),
    #[error("metadata document is not decodable text: {0}")]
    Decode(#[from] DecodeError),
    #[error("caption parse failed: {0}")]
    Caption(#[from] CaptionError),
    #[error("xml metadata parse failed: {0}")]
    Xml(#[from] XmlMetaError),
    #[error("no usable resolution tier for {title:?}: {detail}")]
    Resolution { title: String, detail: String },
    #[error("embedding failed for {title:?}: {source}")]
    Embed { title: String, source: EmbedError },
    #[error("persist failed: {0}")]
    Persist(#[from] PersistError),
}

/// One year's worth of discovered entries; alive only while that year runs.
struct YearDirectory {
    format: MetadataFormat,
    entries: Vec<String>,
}

/// Drives the whole run: years in listing order, entries within a year in
/// listing order, one entry fully processed before the next starts.
pub struct GalleryArchiver {
    fetcher: Arc<dyn Fetcher>,
    settings: ArchiveSettings,
}

impl GalleryArchiver {
    pub fn new(fetcher: Arc<dyn Fetcher>, settings: ArchiveSettings) -> Self {
        Self { fetcher, settings }
    }

    pub async fn run(&self) -> Result<ArchiveSummary, ArchiveError> {
        let root_url = self.settings.root_index_url();
        let listing = self
            .fetcher
            .fetch(&root_url)
            .await
            .map_err(|err| ArchiveError::ListingUnavailable(err.to_string()))?;
        let page = decode_text(&listing.bytes, listing.metadata.content_type.as_deref())
            .map_err(|err| ArchiveError::ListingUnavailable(err.to_string()))?;
        let years: Vec<String> = GalleryIndex::parse(&page.text).years().collect();
        archive_info!("gallery root lists {} year folders", years.len());

        let mut summary = ArchiveSummary::default();
        for year in &years {
            summary.years.push(self.archive_year(year).await);
        }
        Ok(summary)
    }

    async fn archive_year(&self, year: &str) -> YearSummary {
        let mut summary = YearSummary::new(year);

        let year_dir = self.settings.output_dir.join(year);
        if let Err(err) = ensure_output_dir(&year_dir) {
            archive_warn!("skipping year {year}: cannot prepare {year_dir:?}: {err}");
            summary.skipped = true;
            return summary;
        }

        // Year-wide format choice: the caption folder when it yields any
        // entries, the XML folder otherwise. Same ordered-alternatives
        // helper as the resolution tiers.
        let directory = match first_success([
            self.list_year(year, MetadataFormat::Caption),
            self.list_year(year, MetadataFormat::Xml),
        ])
        .await
        {
            Ok(directory) => directory,
            Err(errors) => {
                archive_warn!("year {year} yields no entries: {}", errors.join("; "));
                return summary;
            }
        };
        summary.format = Some(directory.format);
        archive_info!(
            "year {year}: {} entries via the {} path",
            directory.entries.len(),
            directory.format
        );

        let writer = AtomicFileWriter::new(year_dir);
        for identifier in &directory.entries {
            match self
                .archive_entry(year, identifier, directory.format, &writer)
                .await
            {
                Ok(path) => {
                    summary.archived += 1;
                    archive_info!("archived {year}/{identifier} -> {path:?}");
                }
                Err(err) => {
                    summary.failed += 1;
                    archive_warn!("skipping entry {year}/{identifier}: {err}");
                }
            }
            set_entry_count(get_entry_count() + 1);
        }
        summary
    }

    async fn list_year(
        &self,
        year: &str,
        format: MetadataFormat,
    ) -> Result<YearDirectory, String> {
        let url = self.settings.year_index_url(year, format);
        let listing = self.fetcher.fetch(&url).await.map_err(|e| e.to_string())?;
        let page = decode_text(&listing.bytes, listing.metadata.content_type.as_deref())
            .map_err(|e| e.to_string())?;
        let entries: Vec<String> = GalleryIndex::parse(&page.text)
            .entries(format.extension())
            .collect();
        if entries.is_empty() {
            return Err(format!("no .{} entries under {url}", format.extension()));
        }
        Ok(YearDirectory { format, entries })
    }

    async fn archive_entry(
        &self,
        year: &str,
        identifier: &str,
        format: MetadataFormat,
        writer: &AtomicFileWriter,
    ) -> Result<PathBuf, EntryError> {
        let sources = SourceSet::for_entry(&self.settings.base_url, year, identifier);
        let doc_url = self.settings.document_url(year, identifier, format);
        let doc = self
            .fetcher
            .fetch(&doc_url)
            .await
            .map_err(EntryError::Fetch)?;
        let text = decode_text(&doc.bytes, doc.metadata.content_type.as_deref())?;

        let record: PhotoRecord = match format {
            MetadataFormat::Caption => parse_caption(identifier, sources, &text.text)?,
            MetadataFormat::Xml => parse_xml_metadata(identifier, sources, &text.text)?,
        };

        let segment = build_exif_segment(&record);

        let image = resolve_image(self.fetcher.as_ref(), &record.sources)
            .await
            .map_err(|errors| EntryError::Resolution {
                title: record.title.clone(),
                detail: errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            })?;

        let tagged = embed_segment(&image.bytes, segment).map_err(|source| EntryError::Embed {
            title: record.title.clone(),
            source,
        })?;

        let path = writer.write(&format!("{identifier}.jpg"), &tagged)?;
        Ok(path)
    }
}
