pub mod domain;
pub mod heuristics;

pub use domain::{bare_domain_host, host_from_url, normalize_domain};
pub use heuristics::CandidateExtractor;
