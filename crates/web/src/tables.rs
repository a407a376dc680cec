// ABOUTME: Table lookup by normalized id and injection of frames previewing remote tables.
// ABOUTME: Remote tables are grouped per drdplus.info host, deduplicated in first-seen order.

use std::collections::{HashMap, HashSet};

use dom_query::Selection;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::document::HtmlDocument;
use crate::error::HelperError;
use crate::ids::to_id;
use crate::links::{has_marked_external_links, ExternalLinksMarked};
use crate::{EXTERNAL_URL_CLASS, HIDDEN_CLASS};

// Link to a table on another rulebook site, like https://pph.drdplus.info/#tabulka_casu
static REMOTE_TABLE_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:https?:)?//(?P<host>(?:[a-z0-9-]+\.)+drdplus\.info)(?::\d+)?(?:/[^#]*)?#(?P<table>(?:tabulka|table)_[\w-]+)$",
    )
    .expect("valid remote table link regex")
});

/// Finds tables with an id, keyed by their snake-case id.
///
/// Tables without an id are skipped. A non-empty `wanted_ids` restricts the
/// result to tables whose normalized id equals a normalized wanted id, so
/// `tabulkaCasu`, `Tabulka času` and `tabulka_casu` all find the same table.
/// When more tables share a normalized id, the last one in document order wins.
pub fn find_tables_with_ids<'a, S: AsRef<str>>(
    document: &'a HtmlDocument,
    wanted_ids: &[S],
) -> HashMap<String, Selection<'a>> {
    let wanted: HashSet<String> = wanted_ids.iter().map(|id| to_id(id.as_ref())).collect();
    let mut tables = HashMap::new();

    for table in document.select("table[id]").iter() {
        let Some(id) = table.attr("id") else {
            continue;
        };
        let key = to_id(&id);
        if key.is_empty() {
            continue;
        }
        if !wanted.is_empty() && !wanted.contains(&key) {
            continue;
        }
        tables.insert(key, table);
    }

    debug!(found = tables.len(), wanted = wanted.len(), "found tables with ids");
    tables
}

/// Table ids referenced by remote table links, grouped by host in first-seen order.
pub fn collect_remote_table_ids(document: &HtmlDocument) -> Vec<(String, Vec<String>)> {
    let mut remote: Vec<(String, Vec<String>)> = Vec::new();

    for anchor in document.select("a[href]").iter() {
        if !anchor.has_class(EXTERNAL_URL_CLASS) {
            continue;
        }
        let Some(href) = anchor.attr("href") else {
            continue;
        };
        let Some(captures) = REMOTE_TABLE_LINK_RE.captures(href.trim()) else {
            continue;
        };
        let host = captures["host"].to_ascii_lowercase();
        let table_id = captures["table"].to_string();

        match remote.iter_mut().find(|(known, _)| *known == host) {
            Some((_, table_ids)) => {
                if !table_ids.contains(&table_id) {
                    table_ids.push(table_id);
                }
            }
            None => remote.push((host, vec![table_id])),
        }
    }

    remote
}

/// URL of the tables preview of `host` showing `table_ids`.
pub fn remote_tables_url(host: &str, table_ids: &[String]) -> String {
    format!("https://{host}/?tables={}", table_ids.join(","))
}

/// Appends one hidden frame per remote host previewing the linked tables.
///
/// Frame id is the remote host, its `src` the host's tables preview listing
/// every linked table once. Returns the number of injected frames.
pub fn inject_iframes_with_remote_tables(
    document: &HtmlDocument,
    _marked: &ExternalLinksMarked,
) -> Result<usize, HelperError> {
    if !has_marked_external_links(document) {
        return Err(HelperError::ExternalLinksNotMarked);
    }

    let remote = collect_remote_table_ids(document);
    let body = document.body();
    for (host, table_ids) in &remote {
        body.append_html(format!(r#"<iframe class="{HIDDEN_CLASS}"></iframe>"#));
        let iframe = body.children().last();
        iframe.set_attr("id", host);
        iframe.set_attr("src", &remote_tables_url(host, table_ids));
    }

    debug!(injected = remote.len(), "injected iframes with remote tables");
    Ok(remote.len())
}
