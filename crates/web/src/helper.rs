// ABOUTME: HtmlHelper facade bundling every content pass for one rulebook site.
// ABOUTME: HtmlHelperBuilder provides a fluent API for the site's current host.

use std::collections::HashMap;

use dom_query::Selection;

use crate::config::TestsConfiguration;
use crate::document::HtmlDocument;
use crate::error::HelperError;
use crate::links::ExternalLinksMarked;
use crate::{ids, links, tables};

/// Options of an HtmlHelper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelperOptions {
    /// Host of the site the processed documents belong to.
    pub current_host: Option<String>,
}

/// Content passes over rulebook pages of one site.
#[derive(Debug, Clone, Default)]
pub struct HtmlHelper {
    opts: HelperOptions,
}

impl HtmlHelper {
    pub fn new(opts: HelperOptions) -> Self {
        Self { opts }
    }

    pub fn builder() -> HtmlHelperBuilder {
        HtmlHelperBuilder::new()
    }

    /// Helper for the site described by a tests configuration, hosted on its public URL.
    pub fn from_configuration(config: &TestsConfiguration) -> Self {
        let mut builder = Self::builder();
        if let Some(host) = config.public_url().and_then(|url| url.host_str()) {
            builder = builder.current_host(host);
        }
        builder.build()
    }

    pub fn current_host(&self) -> Option<&str> {
        self.opts.current_host.as_deref()
    }

    pub fn to_id(value: &str) -> String {
        ids::to_id(value)
    }

    pub fn to_constant_like(value: &str) -> String {
        ids::to_constant_like(value)
    }

    pub fn turn_to_local_link(link: &str) -> String {
        links::turn_to_local_link(link)
    }

    pub fn make_drdplus_links_local(&self, document: &HtmlDocument) -> usize {
        links::make_drdplus_links_local(document)
    }

    pub fn replace_diacritics_from_ids(&self, document: &HtmlDocument) -> usize {
        ids::replace_diacritics_from_ids(document)
    }

    pub fn add_anchors_to_ids(&self, document: &HtmlDocument) -> usize {
        ids::add_anchors_to_ids(document)
    }

    pub fn mark_external_links_by_class(&self, document: &HtmlDocument) -> ExternalLinksMarked {
        links::mark_external_links_by_class(document, self.current_host())
    }

    pub fn find_tables_with_ids<'a, S: AsRef<str>>(
        &self,
        document: &'a HtmlDocument,
        wanted_ids: &[S],
    ) -> HashMap<String, Selection<'a>> {
        tables::find_tables_with_ids(document, wanted_ids)
    }

    pub fn inject_iframes_with_remote_tables(
        &self,
        document: &HtmlDocument,
        marked: &ExternalLinksMarked,
    ) -> Result<usize, HelperError> {
        tables::inject_iframes_with_remote_tables(document, marked)
    }
}

/// Builder for constructing HtmlHelper instances.
#[derive(Debug, Clone)]
pub struct HtmlHelperBuilder {
    opts: HelperOptions,
}

impl HtmlHelperBuilder {
    pub fn new() -> Self {
        Self {
            opts: HelperOptions::default(),
        }
    }

    /// Set the host of the processed site; links to it are not external.
    pub fn current_host(mut self, host: impl Into<String>) -> Self {
        self.opts.current_host = Some(host.into());
        self
    }

    pub fn build(self) -> HtmlHelper {
        HtmlHelper::new(self.opts)
    }
}

impl Default for HtmlHelperBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_current_host() {
        let helper = HtmlHelper::builder().current_host("pph.drdplus.info").build();
        assert_eq!(helper.current_host(), Some("pph.drdplus.info"));
        assert_eq!(HtmlHelper::default().current_host(), None);
    }

    #[test]
    fn from_configuration_uses_public_url_host() {
        let config = TestsConfiguration::from_yaml_str(
            "has_tables: false\npublic_url: https://kouzelnik.drdplus.info\n",
        )
        .unwrap();
        let helper = HtmlHelper::from_configuration(&config);
        assert_eq!(helper.current_host(), Some("kouzelnik.drdplus.info"));
    }
}
