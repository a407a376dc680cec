// ABOUTME: Library entry point for the DrD+ rulebook web content helper.
// ABOUTME: Re-exports HtmlHelper, HtmlDocument, TestsConfiguration and the error types.

//! drdplus-web - post-processing of rendered DrD+ rulebook pages.
//!
//! This crate rewrites public links to local development ones, gives elements
//! stable diacritics-free identifiers, marks external links and embeds remote
//! tables through generated inline frames. It also validates the YAML tests
//! configuration the rulebook sites ship with.
//!
//! # Example
//!
//! ```
//! use drdplus_web::{HtmlDocument, HtmlHelper};
//!
//! let document = HtmlDocument::parse(
//!     r#"<html><body><a href="https://pph.drdplus.info/#tabulka_casu">Čas</a></body></html>"#,
//! );
//! let helper = HtmlHelper::builder().current_host("hranicar.drdplus.info").build();
//! let marked = helper.mark_external_links_by_class(&document);
//! helper.inject_iframes_with_remote_tables(&document, &marked).unwrap();
//! helper.make_drdplus_links_local(&document);
//!
//! assert!(document.html().contains("http://pph.drdplus.loc/?tables=tabulka_casu"));
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod helper;
pub mod ids;
pub mod links;
pub mod tables;

pub use crate::config::TestsConfiguration;
pub use crate::document::HtmlDocument;
pub use crate::error::{ConfigError, HelperError};
pub use crate::helper::{HtmlHelper, HtmlHelperBuilder};
pub use crate::ids::{to_constant_like, to_id};
pub use crate::links::{turn_to_local_link, ExternalLinksMarked};

/// Attribute keeping the element id as it was before diacritics were replaced.
pub const DATA_ORIGINAL_ID: &str = "data-original-id";

/// Class of the hidden element keeping the original id reachable as an anchor target.
pub const INVISIBLE_ID_CLASS: &str = "invisible-id";

/// Class added to links pointing to another host.
pub const EXTERNAL_URL_CLASS: &str = "external-url";

/// Links with this class are never marked as external.
pub const INTERNAL_URL_CLASS: &str = "internal-url";

/// Body attribute stamped once external links have been marked.
pub const DATA_HAS_MARKED_EXTERNAL_URLS: &str = "data-has-marked-external-urls";

/// Class of generated remote-table frames.
pub const HIDDEN_CLASS: &str = "hidden";
