// ABOUTME: HtmlDocument, an owned parsed HTML tree with lookup and serialization helpers.
// ABOUTME: Wraps dom_query::Document so passes share one capability surface.

//! Parsed HTML documents.
//!
//! `HtmlDocument` owns a `dom_query::Document`. Passes take it by shared
//! reference and mutate it in place; dom_query keeps the tree behind interior
//! mutability so selections stay usable while attributes change.

use std::fmt;

use dom_query::{Document, Selection};

pub struct HtmlDocument {
    document: Document,
}

impl HtmlDocument {
    /// Parses a full HTML document. Malformed markup is repaired the way browsers do.
    pub fn parse(html: &str) -> Self {
        Self {
            document: Document::from(html),
        }
    }

    /// Serializes the whole tree back to HTML.
    pub fn html(&self) -> String {
        self.document.html().to_string()
    }

    /// The `<body>` element. Always present after HTML5 parsing.
    pub fn body(&self) -> Selection<'_> {
        self.document.select("body")
    }

    /// Selects elements matching a CSS selector.
    pub fn select(&self, css: &str) -> Selection<'_> {
        self.document.select(css)
    }

    /// First element whose `id` equals `id` exactly.
    ///
    /// Ids are compared verbatim instead of going through a `#id` selector,
    /// since rulebook ids routinely carry spaces, `#` and diacritics.
    pub fn element_by_id(&self, id: &str) -> Option<Selection<'_>> {
        self.document
            .select("[id]")
            .iter()
            .find(|el| el.attr("id").as_deref() == Some(id))
    }

    /// All elements carrying `class` in their class list, in document order.
    pub fn elements_by_class(&self, class: &str) -> Vec<Selection<'_>> {
        self.document
            .select("[class]")
            .iter()
            .filter(|el| el.has_class(class))
            .collect()
    }

    /// All elements with the given tag name.
    pub fn elements_by_tag(&self, tag: &str) -> Selection<'_> {
        self.document.select(tag)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl From<&str> for HtmlDocument {
    fn from(html: &str) -> Self {
        Self::parse(html)
    }
}

impl From<Document> for HtmlDocument {
    fn from(document: Document) -> Self {
        Self { document }
    }
}

impl fmt::Debug for HtmlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlDocument").finish_non_exhaustive()
    }
}
