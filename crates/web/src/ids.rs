// ABOUTME: Identifier normalization (snake and constant-like ids) and id-related DOM passes.
// ABOUTME: Replaces diacritics in element ids and injects self-anchors into elements with ids.

//! Element identifiers.
//!
//! Rulebook headings and tables carry human readable Czech ids such as
//! `Příliš # žluťoučký`. Two normalized forms are derived from them:
//! - snake ids (`prilis_zlutoucky`) used as lookup keys,
//! - constant-like ids (`PRILIS_ZLUTOUCKY`) written back to the elements.

use dom_query::Selection;
use tracing::debug;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::document::HtmlDocument;
use crate::{DATA_ORIGINAL_ID, INVISIBLE_ID_CLASS};

// Elements which can not take an inline anchor as their content
const NO_ANCHOR_SELECTOR: &str = "a, button, table, thead, tbody, tfoot, tr, colgroup, col, \
    ul, ol, dl, select, option, optgroup, datalist, textarea, input, img, br, hr, iframe, \
    embed, object, video, audio, source, track, picture, svg, math, script, style, template";

// Void elements never get a hidden child
const VOID_SELECTOR: &str = "area, base, br, col, embed, hr, img, input, link, meta, source, track, wbr";

/// Letters NFD can not split into base letter and combining mark.
fn fold_letter(c: char) -> Option<&'static str> {
    let folded = match c {
        'ł' => "l",
        'Ł' => "L",
        'đ' => "d",
        'Đ' => "D",
        'ø' => "o",
        'Ø' => "O",
        'ß' => "ss",
        'æ' => "ae",
        'Æ' => "AE",
        'œ' => "oe",
        'Œ' => "OE",
        'ı' => "i",
        _ => return None,
    };
    Some(folded)
}

/// Strips diacritics, keeping base letters and everything else as is.
pub fn remove_diacritics(value: &str) -> String {
    let mut plain = String::with_capacity(value.len());
    for c in value.nfd().filter(|c| !is_combining_mark(*c)) {
        match fold_letter(c) {
            Some(folded) => plain.push_str(folded),
            None => plain.push(c),
        }
    }
    plain
}

/// Converts any name to a lower snake-case id.
///
/// Diacritics are stripped, camelCase boundaries split, and every run of
/// characters other than ASCII letters and digits becomes a single `_`.
///
/// ```
/// use drdplus_web::to_id;
///
/// assert_eq!(to_id("Křížaly s mrkví"), "krizaly_s_mrkvi");
/// assert_eq!(to_id("tabulkaVzdalenosti"), "tabulka_vzdalenosti");
/// ```
pub fn to_id(value: &str) -> String {
    let plain = remove_diacritics(value);
    let mut id = String::with_capacity(plain.len());
    let mut previous: Option<char> = None;
    let mut separate = false;

    for c in plain.chars() {
        if !c.is_ascii_alphanumeric() {
            separate = true;
            previous = None;
            continue;
        }
        if c.is_ascii_uppercase()
            && previous.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit())
        {
            separate = true;
        }
        if separate && !id.is_empty() {
            id.push('_');
        }
        separate = false;
        id.push(c.to_ascii_lowercase());
        previous = Some(c);
    }

    id
}

/// Converts any name to an upper, underscore separated, diacritics-free id.
pub fn to_constant_like(value: &str) -> String {
    to_id(value).to_ascii_uppercase()
}

/// Id of the hidden element keeping the original id reachable from URL fragments.
pub fn invisible_id(original_id: &str) -> String {
    original_id.replace('#', "_")
}

fn is_plain_id(id: &str) -> bool {
    id.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Rewrites ids carrying diacritics or special characters to their constant-like form.
///
/// The original id is kept in `data-original-id` and on an appended hidden
/// `span.invisible-id`, whose id is the original one with `#` turned to `_`.
/// Ids without any Latin letter or digit (`#`, `Ωμέγα`) have no constant-like
/// form and stay as they are. Invisible-id helpers are never rewritten, so
/// running the pass again changes nothing.
/// Returns the number of rewritten elements.
pub fn replace_diacritics_from_ids(document: &HtmlDocument) -> usize {
    let mut replaced = 0;

    for element in document.select("body [id]").iter() {
        if element.has_class(INVISIBLE_ID_CLASS) {
            continue;
        }
        let Some(original_id) = element.attr("id").map(|id| id.to_string()) else {
            continue;
        };
        if original_id.is_empty() || is_plain_id(&original_id) {
            continue;
        }
        let constant_id = to_constant_like(&original_id);
        if constant_id.is_empty() {
            debug!(id = %original_id, "id has no constant-like form, keeping it");
            continue;
        }

        element.set_attr("id", &constant_id);
        element.set_attr(DATA_ORIGINAL_ID, &original_id);
        if !element.is(VOID_SELECTOR) {
            append_invisible_id(&element, &original_id);
        }
        replaced += 1;
    }

    debug!(replaced, "replaced diacritics from ids");
    replaced
}

fn append_invisible_id(element: &Selection<'_>, original_id: &str) {
    element.append_html(format!(r#"<span class="{INVISIBLE_ID_CLASS}"></span>"#));
    element
        .children()
        .last()
        .set_attr("id", &invisible_id(original_id));
}

/// Gives every element with an id an anchor pointing to that id.
///
/// The content is wrapped into the anchor when it holds no other link;
/// otherwise an empty anchor is prepended so links never nest. Anchors
/// themselves, invisible-id helpers, elements nested in an anchor or already
/// holding an anchor to themselves, and elements which can not hold inline
/// content are skipped. Elements are processed deepest first.
/// Returns the number of injected anchors.
pub fn add_anchors_to_ids(document: &HtmlDocument) -> usize {
    let elements: Vec<Selection<'_>> = document.select("body [id]").iter().collect();
    let mut added = 0;

    for element in elements.into_iter().rev() {
        let Some(id) = element.attr("id").map(|id| id.to_string()) else {
            continue;
        };
        if id.is_empty()
            || element.is(NO_ANCHOR_SELECTOR)
            || element.has_class(INVISIBLE_ID_CLASS)
            || element.is("a *")
        {
            continue;
        }

        let href = format!("#{id}");
        let nested = element.select("a");
        if nested
            .iter()
            .any(|anchor| anchor.attr("href").as_deref() == Some(href.as_str()))
        {
            continue;
        }

        if nested.exists() {
            element.prepend_html("<a></a>");
            element.children().first().set_attr("href", &href);
        } else {
            let content = element.inner_html().to_string();
            element.set_html("<a></a>");
            let anchor = element.children().first();
            anchor.set_attr("href", &href);
            anchor.set_html(content);
        }
        added += 1;
    }

    debug!(added, "added anchors to ids");
    added
}
