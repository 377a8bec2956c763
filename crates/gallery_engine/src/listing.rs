use scraper::{Html, Selector};

/// Parsed gallery index page. Pure: the orchestrator fetches the body, this
/// type only reads anchors out of it.
///
/// The site layout is fixed: year folders appear as `<a href="2001/">`, entry
/// documents as `<a href="a301.txt">` under the format subfolder. Anything
/// else on the page is ignored, and zero matches is a legitimate signal (it
/// drives the metadata-format fallback), never an error.
pub struct GalleryIndex {
    doc: Html,
    anchor_sel: Option<Selector>,
}

impl GalleryIndex {
    pub fn parse(html: &str) -> Self {
        Self {
            doc: Html::parse_document(html),
            // The literal is valid, but scraper's parse signature is fallible.
            anchor_sel: Selector::parse("a[href]").ok(),
        }
    }

    /// Year folder identifiers: hrefs of exactly four ASCII digits followed
    /// by a slash, yielded without the slash, in page order.
    pub fn years(&self) -> impl Iterator<Item = String> + '_ {
        self.anchors().filter_map(|href| {
            let stem = href.strip_suffix('/')?;
            (stem.len() == 4 && stem.bytes().all(|b| b.is_ascii_digit()))
                .then(|| stem.to_string())
        })
    }

    /// Entry identifiers: hrefs of the shape `{stem}.{extension}` with a
    /// plain, non-empty stem, yielded as the stem, in page order.
    pub fn entries<'a>(&'a self, extension: &'a str) -> impl Iterator<Item = String> + 'a {
        self.anchors().filter_map(move |href| {
            let stem = href.strip_suffix(extension)?.strip_suffix('.')?;
            (!stem.is_empty() && !stem.contains('/')).then(|| stem.to_string())
        })
    }

    fn anchors(&self) -> impl Iterator<Item = &str> + '_ {
        self.anchor_sel
            .iter()
            .flat_map(|sel| self.doc.select(sel))
            .filter_map(|el| el.value().attr("href"))
            .map(str::trim)
    }
}
