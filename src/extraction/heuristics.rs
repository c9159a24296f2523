use crate::models::{UiNode, UrlCandidate};
use crate::pipeline::DetectorConfig;

use super::domain::{bare_domain_host, contains_url_token, host_from_url, normalize_domain};

const ENABLE_LOGS: bool = true;

use crate::log_debug;

/// Finds the navigated domain in a browser's accessibility tree.
///
/// Only address-bar-like nodes are eligible. Subtrees that render page
/// content are pruned so domains printed inside search results or article
/// bodies never become candidates.
#[derive(Debug, Clone)]
pub struct CandidateExtractor {
    address_bar_markers: Vec<String>,
    internal_page_markers: Vec<String>,
    page_content_roles: Vec<String>,
    search_engine_domain: String,
    max_bare_domain_len: usize,
}

impl CandidateExtractor {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            address_bar_markers: lowered(&config.address_bar_markers),
            internal_page_markers: lowered(&config.internal_page_markers),
            page_content_roles: lowered(&config.page_content_roles),
            search_engine_domain: normalize_domain(&config.search_engine_domain),
            max_bare_domain_len: config.max_bare_domain_len,
        }
    }

    pub fn search_engine_domain(&self) -> &str {
        &self.search_engine_domain
    }

    /// At most one candidate per pass; the first accepted node wins.
    ///
    /// The search engine is never actionable. If it is the only host found it
    /// is still returned so the caller can note that the user is on a results
    /// page.
    pub fn extract<N: UiNode>(&self, root: &N) -> Option<UrlCandidate> {
        let mut address_nodes = Vec::new();
        self.collect_address_nodes(root, &mut address_nodes);

        let mut search_page_seen = false;

        for node in address_nodes {
            if node.is_focused() {
                log_debug!("skipping focused address node role={}", node.role());
                continue;
            }

            if self.is_internal_page(node) {
                continue;
            }

            let Some(raw_host) = self.host_from_node(node) else {
                continue;
            };

            let domain = normalize_domain(&raw_host);
            if domain.is_empty() || self.contains_marker(&domain, &self.internal_page_markers) {
                continue;
            }

            if domain.contains(&self.search_engine_domain) {
                search_page_seen = true;
                continue;
            }

            return Some(UrlCandidate::new(domain, false));
        }

        search_page_seen.then(|| UrlCandidate::new(self.search_engine_domain.clone(), false))
    }

    /// Pre-order walk with an explicit stack so arbitrarily deep trees
    /// cannot overflow the thread stack.
    fn collect_address_nodes<'a, N: UiNode>(&self, root: &'a N, out: &mut Vec<&'a N>) {
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            if self.is_page_content(node) {
                continue;
            }

            if self.looks_like_address_node(node) {
                out.push(node);
            }

            stack.extend(node.children().iter().rev());
        }
    }

    fn looks_like_address_node<N: UiNode>(&self, node: &N) -> bool {
        if node.is_editable() {
            return true;
        }

        let role = node.role().to_ascii_lowercase();
        let resource_id = node.resource_id().unwrap_or_default().to_ascii_lowercase();
        let label = node.label().unwrap_or_default().to_ascii_lowercase();
        if self.contains_marker(&role, &self.address_bar_markers)
            || self.contains_marker(&resource_id, &self.address_bar_markers)
            || self.contains_marker(&label, &self.address_bar_markers)
        {
            return true;
        }

        node.text()
            .into_iter()
            .chain(node.label())
            .any(|value| contains_url_token(value, self.max_bare_domain_len))
    }

    fn host_from_node<N: UiNode>(&self, node: &N) -> Option<String> {
        if let Some(host) = node.text().and_then(host_from_url) {
            return Some(host);
        }
        if let Some(host) = node.label().and_then(host_from_url) {
            return Some(host);
        }
        node.text()
            .and_then(|text| bare_domain_host(text, self.max_bare_domain_len))
    }

    fn is_page_content<N: UiNode>(&self, node: &N) -> bool {
        let role = node.role().to_ascii_lowercase();
        self.contains_marker(&role, &self.page_content_roles)
    }

    fn is_internal_page<N: UiNode>(&self, node: &N) -> bool {
        node.text()
            .into_iter()
            .chain(node.label())
            .any(|value| self.contains_marker(&value.to_ascii_lowercase(), &self.internal_page_markers))
    }

    fn contains_marker(&self, haystack: &str, markers: &[String]) -> bool {
        !haystack.is_empty() && markers.iter().any(|marker| haystack.contains(marker.as_str()))
    }
}

fn lowered(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim().to_ascii_lowercase())
        .filter(|value| !value.is_empty())
        .collect()
}
