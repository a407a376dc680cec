// ABOUTME: Link localization (drdplus.info -> drdplus.loc) and external link marking.
// ABOUTME: The marker returns an ExternalLinksMarked token consumed by the remote tables injector.

//! Links.
//!
//! Public rulebook sites live on `https://<sub>.drdplus.info`, their local
//! development copies on `http://<sub>.drdplus.loc`.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use url::Url;

use crate::document::HtmlDocument;
use crate::{DATA_HAS_MARKED_EXTERNAL_URLS, EXTERNAL_URL_CLASS, INTERNAL_URL_CLASS};

// The host has to end right after `drdplus.info`, so `drdplus.info-foo.com` stays foreign.
static PUBLIC_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)https?://((?:[\w-]+\.)*)drdplus\.info([^\w.-]|$)")
        .expect("valid public link regex")
});

/// Proof that external links of a document have been marked.
///
/// Only `mark_external_links_by_class` hands these out, which turns the
/// ordering between marking and remote table injection into a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalLinksMarked {
    pub(crate) marked: usize,
}

impl ExternalLinksMarked {
    /// Number of anchors newly marked as external.
    pub fn marked(&self) -> usize {
        self.marked
    }
}

/// Turns every public DrD+ link in `link` to its local development equivalent.
///
/// ```
/// use drdplus_web::turn_to_local_link;
///
/// assert_eq!(
///     turn_to_local_link("https://hranicar.drdplus.info/pravidla#boj"),
///     "http://hranicar.drdplus.loc/pravidla#boj"
/// );
/// ```
pub fn turn_to_local_link(link: &str) -> String {
    localize(link).into_owned()
}

fn localize(link: &str) -> Cow<'_, str> {
    PUBLIC_LINK_RE.replace_all(link, "http://${1}drdplus.loc${2}")
}

/// Rewrites public DrD+ links of anchors and frames to local ones.
///
/// Every anchor is rewritten regardless of being marked external or internal.
/// Returns the number of rewritten attributes.
pub fn make_drdplus_links_local(document: &HtmlDocument) -> usize {
    let mut rewritten = 0;
    for (css, attr) in [("a[href]", "href"), ("iframe[src]", "src")] {
        for element in document.select(css).iter() {
            let Some(value) = element.attr(attr) else {
                continue;
            };
            if let Cow::Owned(local) = localize(&value) {
                element.set_attr(attr, &local);
                rewritten += 1;
            }
        }
    }

    debug!(rewritten, "made drdplus links local");
    rewritten
}

/// Host an anchor points to, if it points to any.
///
/// Only absolute and protocol-relative http(s) links have a host; relative,
/// fragment-only, `mailto:` and similar links do not.
pub fn link_host(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let parsed = if href.starts_with("//") {
        Url::parse(&format!("https:{href}")).ok()?
    } else {
        Url::parse(href).ok()?
    };
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return None;
    }
    parsed.host_str().map(|host| host.to_ascii_lowercase())
}

/// Adds the external-url class to anchors pointing to a host other than `current_host`.
///
/// Without a current host every anchor with a host is external. The body is
/// stamped with `data-has-marked-external-urls="1"`; running again is harmless.
pub fn mark_external_links_by_class(
    document: &HtmlDocument,
    current_host: Option<&str>,
) -> ExternalLinksMarked {
    let current_host = current_host.map(|host| host.trim().to_ascii_lowercase());
    let mut marked = 0;

    for anchor in document.select("a[href]").iter() {
        if anchor.has_class(INTERNAL_URL_CLASS) || anchor.has_class(EXTERNAL_URL_CLASS) {
            continue;
        }
        let Some(href) = anchor.attr("href") else {
            continue;
        };
        let Some(host) = link_host(&href) else {
            continue;
        };
        if current_host.as_deref() == Some(host.as_str()) {
            continue;
        }
        anchor.add_class(EXTERNAL_URL_CLASS);
        marked += 1;
    }

    document.body().set_attr(DATA_HAS_MARKED_EXTERNAL_URLS, "1");
    debug!(marked, "marked external links");
    ExternalLinksMarked { marked }
}

/// Whether the document carries the external links stamp.
pub fn has_marked_external_links(document: &HtmlDocument) -> bool {
    document
        .body()
        .attr(DATA_HAS_MARKED_EXTERNAL_URLS)
        .is_some_and(|value| &*value == "1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_turn_to_local_link() {
        assert_eq!(turn_to_local_link("https://www.drdplus.info"), "http://www.drdplus.loc");
        assert_eq!(
            turn_to_local_link("https://hranicar.drdplus.info"),
            "http://hranicar.drdplus.loc"
        );
        assert_eq!(
            turn_to_local_link("https://foo-bar.baz.drdplus.info/a/b?c=d#e"),
            "http://foo-bar.baz.drdplus.loc/a/b?c=d#e"
        );
        assert_eq!(turn_to_local_link("http://pph.drdplus.info"), "http://pph.drdplus.loc");
    }

    #[test]
    fn test_turn_to_local_link_leaves_foreign_links() {
        assert_eq!(turn_to_local_link("https://example.com"), "https://example.com");
        assert_eq!(turn_to_local_link("#tabulka_casu"), "#tabulka_casu");
        assert_eq!(turn_to_local_link("https://drdplus.information"), "https://drdplus.information");
        assert_eq!(
            turn_to_local_link("https://x.drdplus.info-foo.com"),
            "https://x.drdplus.info-foo.com"
        );
        assert_eq!(
            turn_to_local_link("https://x.drdplus.info.evil.com/a"),
            "https://x.drdplus.info.evil.com/a"
        );
    }

    #[test]
    fn test_turn_to_local_link_keeps_what_follows_the_host() {
        assert_eq!(turn_to_local_link("https://a.drdplus.info/x"), "http://a.drdplus.loc/x");
        assert_eq!(turn_to_local_link("https://a.drdplus.info:8080"), "http://a.drdplus.loc:8080");
        assert_eq!(
            turn_to_local_link("https://a.drdplus.info,https://b.drdplus.info"),
            "http://a.drdplus.loc,http://b.drdplus.loc"
        );
    }

    #[test]
    fn test_make_drdplus_links_local_skips_lookalike_hosts() {
        let doc = HtmlDocument::parse(
            r#"<html><body><a href="https://x.drdplus.info-foo.com/">lookalike</a></body></html>"#,
        );
        assert_eq!(make_drdplus_links_local(&doc), 0);
        assert_eq!(
            doc.select("a").attr("href").as_deref(),
            Some("https://x.drdplus.info-foo.com/")
        );
    }

    #[test]
    fn test_link_host() {
        assert_eq!(link_host("https://PPH.drdplus.info/#x").as_deref(), Some("pph.drdplus.info"));
        assert_eq!(link_host("//example.com/foo").as_deref(), Some("example.com"));
        assert_eq!(link_host("#tabulka"), None);
        assert_eq!(link_host(""), None);
        assert_eq!(link_host("/relative/path"), None);
        assert_eq!(link_host("mailto:someone@drdplus.info"), None);
    }

    #[test]
    fn test_mark_external_links_respects_current_host() {
        let doc = HtmlDocument::parse(
            r##"<html><body>
            <a id="same" href="https://hranicar.drdplus.info/#boj">Boj</a>
            <a id="other" href="https://pph.drdplus.info/">PPH</a>
            <a id="internal" class="internal-url" href="https://pph.drdplus.info/">PPH</a>
            <a id="fragment" href="#boj">Boj</a>
            </body></html>"##,
        );
        let marked = mark_external_links_by_class(&doc, Some("hranicar.drdplus.info"));
        assert_eq!(marked.marked(), 1);
        assert!(doc.element_by_id("other").unwrap().has_class(EXTERNAL_URL_CLASS));
        assert!(!doc.element_by_id("same").unwrap().has_class(EXTERNAL_URL_CLASS));
        assert!(!doc.element_by_id("internal").unwrap().has_class(EXTERNAL_URL_CLASS));
        assert!(!doc.element_by_id("fragment").unwrap().has_class(EXTERNAL_URL_CLASS));
    }

    #[test]
    fn test_mark_external_links_is_idempotent() {
        let doc = HtmlDocument::parse(r#"<html><body><a href="https://example.com">x</a></body></html>"#);
        assert!(!has_marked_external_links(&doc));
        assert_eq!(mark_external_links_by_class(&doc, None).marked(), 1);
        let once = doc.html();
        assert_eq!(mark_external_links_by_class(&doc, None).marked(), 0);
        assert_eq!(doc.html(), once);
        assert!(has_marked_external_links(&doc));
    }

    #[test]
    fn test_make_drdplus_links_local_counts_rewrites() {
        let doc = HtmlDocument::parse(
            r#"<html><body>
            <a href="https://pph.drdplus.info">PPH</a>
            <a href="https://example.com">Example</a>
            <iframe src="https://pph.drdplus.info/?tables=tabulka_casu"></iframe>
            </body></html>"#,
        );
        assert_eq!(make_drdplus_links_local(&doc), 2);
        assert_eq!(
            doc.select("iframe").attr("src").as_deref(),
            Some("http://pph.drdplus.loc/?tables=tabulka_casu")
        );
    }
}
