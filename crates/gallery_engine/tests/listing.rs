use gallery_engine::{decode_text, GalleryIndex};
use pretty_assertions::assert_eq;

#[test]
fn years_match_four_digit_folder_anchors() {
    let html = r#"
        <html><body>
        <a href="2001/">2001/</a>
        <a href="2002/">2002/</a>
        <a href="about/">about/</a>
        <a href="1999.txt">1999</a>
        <a href="20011/">20011/</a>
        <a href="../">parent</a>
        </body></html>
    "#;
    let index = GalleryIndex::parse(html);
    let years: Vec<String> = index.years().collect();
    assert_eq!(years, vec!["2001", "2002"]);
}

#[test]
fn entries_match_stem_dot_extension_anchors() {
    let html = r#"
        <a href="a301.txt">a301</a>
        <a href="b12.txt">b12</a>
        <a href="b12.xml">b12</a>
        <a href="notes/readme.txt">readme</a>
        <a href=".txt">empty</a>
    "#;
    let index = GalleryIndex::parse(html);
    let txt: Vec<String> = index.entries("txt").collect();
    assert_eq!(txt, vec!["a301", "b12"]);
    let xml: Vec<String> = index.entries("xml").collect();
    assert_eq!(xml, vec!["b12"]);
}

#[test]
fn zero_matches_is_an_empty_sequence() {
    let index = GalleryIndex::parse("<html><body><p>empty folder</p></body></html>");
    assert_eq!(index.years().count(), 0);
    assert_eq!(index.entries("txt").count(), 0);
}

#[test]
fn anchors_without_href_are_ignored() {
    let index = GalleryIndex::parse(r#"<a name="2001/">2001/</a><a href="2001/">2001/</a>"#);
    assert_eq!(index.years().count(), 1);
}

#[test]
fn decode_respects_charset_header() {
    let bytes = b"caf\xe9"; // iso-8859-1
    let decoded = decode_text(bytes, Some("text/plain; charset=ISO-8859-1")).unwrap();
    assert_eq!(decoded.text, "caf\u{e9}");
    assert!(
        decoded.encoding_label.eq_ignore_ascii_case("ISO-8859-1")
            || decoded.encoding_label.eq_ignore_ascii_case("windows-1252")
    );
}

#[test]
fn decode_handles_utf8_bom() {
    let bytes = b"\xEF\xBB\xBFhello";
    let decoded = decode_text(bytes, Some("text/plain")).unwrap();
    assert_eq!(decoded.text, "hello");
    assert_eq!(decoded.encoding_label, "UTF-8");
}
