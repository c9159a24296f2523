use serde::{Deserialize, Serialize};

/// Best-guess domain from one extraction pass, already normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlCandidate {
    pub domain: String,
    pub source_node_focused: bool,
}

impl UrlCandidate {
    pub fn new(domain: impl Into<String>, source_node_focused: bool) -> Self {
        Self {
            domain: domain.into(),
            source_node_focused,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub domain: String,
    pub is_blocked: bool,
}
