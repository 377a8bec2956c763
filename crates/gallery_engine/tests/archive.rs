use std::fs;
use std::sync::Arc;

use gallery_engine::{
    ArchiveError, ArchiveSettings, FetchSettings, GalleryArchiver, MetadataFormat, ReqwestFetcher,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn tiny_jpeg(entropy: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8];
    bytes.extend_from_slice(&[0xFF, 0xDB, 0x00, 0x04, 0x00, 0x01]);
    bytes.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02]);
    bytes.extend_from_slice(entropy);
    bytes.extend_from_slice(&[0xFF, 0xD9]);
    bytes
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

async fn mount_html(server: &MockServer, at: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html"))
        .mount(server)
        .await;
}

fn archiver(server: &MockServer, output: &TempDir) -> GalleryArchiver {
    archive_logging::initialize_for_tests();
    let settings = ArchiveSettings {
        base_url: Url::parse(&server.uri()).unwrap(),
        output_dir: output.path().to_path_buf(),
    };
    GalleryArchiver::new(
        Arc::new(ReqwestFetcher::new(FetchSettings::default())),
        settings,
    )
}

#[tokio::test]
async fn caption_year_falls_back_to_medium_tier() {
    let server = MockServer::start().await;
    mount_html(&server, "/", r#"<a href="2001/">2001/</a>"#).await;
    mount_html(&server, "/2001/captions/", r#"<a href="a301.txt">a301</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/2001/captions/a301.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "0 placeholder header\n{Title}Aurora over the gulf\n{Author}Jane Doe\nfrom the station\n{Date}3-May-2001\n{high}8234 KB\n{end}\n",
        ))
        .mount(&server)
        .await;
    // hires is not mounted: the high tier 404s and medium takes over.
    let medium = tiny_jpeg(&[0xAB, 0xCD, 0xEF, 0x42]);
    Mock::given(method("GET"))
        .and(path("/2001/medres/a301.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(medium.clone(), "image/jpeg"))
        .mount(&server)
        .await;

    let output = TempDir::new().unwrap();
    let summary = archiver(&server, &output).run().await.unwrap();

    assert_eq!(summary.years.len(), 1);
    assert_eq!(summary.years[0].format, Some(MetadataFormat::Caption));
    assert_eq!(summary.years[0].archived, 1);
    assert_eq!(summary.years[0].failed, 0);

    let written = fs::read(output.path().join("2001").join("a301.jpg")).unwrap();
    // Persisted bytes originate from the medium tier and carry the segment.
    assert!(contains(&written, &[0xAB, 0xCD, 0xEF, 0x42]));
    assert!(contains(&written, b"Exif\0\0"));
    assert!(contains(&written, b"Jane Doe from the station\0"));
}

#[tokio::test]
async fn rerun_on_unchanged_gallery_is_byte_identical() {
    let server = MockServer::start().await;
    mount_html(&server, "/", r#"<a href="2001/">2001/</a>"#).await;
    mount_html(&server, "/2001/captions/", r#"<a href="a301.txt">a301</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/2001/captions/a301.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "0 placeholder header\n{Title}Aurora\n{Date}3-May-2001\n{end}\n",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2001/hires/a301.jpg"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(tiny_jpeg(&[0x11, 0x22]), "image/jpeg"),
        )
        .mount(&server)
        .await;

    let output = TempDir::new().unwrap();
    let archiver = archiver(&server, &output);
    archiver.run().await.unwrap();
    let first = fs::read(output.path().join("2001").join("a301.jpg")).unwrap();
    archiver.run().await.unwrap();
    let second = fs::read(output.path().join("2001").join("a301.jpg")).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn year_without_captions_routes_through_xml_exactly_once() {
    let server = MockServer::start().await;
    mount_html(&server, "/", r#"<a href="2002/">2002/</a>"#).await;
    // The caption folder exists but lists no caption documents.
    mount_html(&server, "/2002/captions/", "<html><body>empty</body></html>").await;
    mount_html(&server, "/2002/metadata/", r#"<a href="b12.xml">b12</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/2002/metadata/b12.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<asset><text><org><name>Survey</name></org><date>2002-11-30</date></text></asset>",
            "text/xml",
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2002/hires/b12.jpg"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(tiny_jpeg(&[0x99]), "image/jpeg"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let output = TempDir::new().unwrap();
    let summary = archiver(&server, &output).run().await.unwrap();

    assert_eq!(summary.years[0].format, Some(MetadataFormat::Xml));
    assert_eq!(summary.years[0].archived, 1);
    let written = fs::read(output.path().join("2002").join("b12.jpg")).unwrap();
    assert!(contains(&written, b"Survey\0"));
    assert!(contains(&written, b"2002:11:30\0"));
}

#[tokio::test]
async fn entry_with_no_usable_tier_writes_nothing() {
    let server = MockServer::start().await;
    mount_html(&server, "/", r#"<a href="2003/">2003/</a>"#).await;
    mount_html(&server, "/2003/captions/", r#"<a href="c1.txt">c1</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/2003/captions/c1.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("header\n{Title}Lost\n"))
        .mount(&server)
        .await;
    // Neither hires nor medres is mounted; both tiers 404.

    let output = TempDir::new().unwrap();
    let summary = archiver(&server, &output).run().await.unwrap();

    assert_eq!(summary.years[0].archived, 0);
    assert_eq!(summary.years[0].failed, 1);
    assert!(!output.path().join("2003").join("c1.jpg").exists());
}

#[tokio::test]
async fn one_bad_entry_does_not_abort_the_year() {
    let server = MockServer::start().await;
    mount_html(&server, "/", r#"<a href="2004/">2004/</a>"#).await;
    mount_html(
        &server,
        "/2004/captions/",
        r#"<a href="bad.txt">bad</a><a href="good.txt">good</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/2004/captions/bad.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("header\n{Broken tag line\n"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2004/captions/good.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("header\n{Title}Fine\n{end}\n"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2004/hires/good.jpg"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(tiny_jpeg(&[0x77]), "image/jpeg"),
        )
        .mount(&server)
        .await;

    let output = TempDir::new().unwrap();
    let summary = archiver(&server, &output).run().await.unwrap();

    assert_eq!(summary.years[0].failed, 1);
    assert_eq!(summary.years[0].archived, 1);
    assert!(output.path().join("2004").join("good.jpg").exists());
    assert!(!output.path().join("2004").join("bad.jpg").exists());
}

#[tokio::test]
async fn unreachable_root_listing_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend down"))
        .mount(&server)
        .await;

    let output = TempDir::new().unwrap();
    let err = archiver(&server, &output).run().await.unwrap_err();
    let ArchiveError::ListingUnavailable(message) = err;
    assert!(message.contains("backend down"));
}

#[tokio::test]
async fn year_with_no_entries_in_either_format_completes_empty() {
    let server = MockServer::start().await;
    mount_html(&server, "/", r#"<a href="2005/">2005/</a>"#).await;
    // Neither metadata folder is mounted; both listings 404.

    let output = TempDir::new().unwrap();
    let summary = archiver(&server, &output).run().await.unwrap();

    assert_eq!(summary.years.len(), 1);
    assert_eq!(summary.years[0].format, None);
    assert_eq!(summary.years[0].archived, 0);
    assert_eq!(summary.years[0].failed, 0);
    assert_eq!(summary.archived(), 0);
}
