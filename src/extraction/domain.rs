use regex::Regex;
use std::sync::OnceLock;

const PROTOCOLS: [&str; 2] = ["https://", "http://"];

static BARE_DOMAIN: OnceLock<Regex> = OnceLock::new();

fn bare_domain_pattern() -> &'static Regex {
    BARE_DOMAIN.get_or_init(|| {
        Regex::new(
            r"(?i)^(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z]{2,}(?::[0-9]{1,5})?(?:[/?#].*)?$",
        )
        .expect("bare domain pattern is a valid regex")
    })
}

/// Lowercase, trim and drop any leading `www.` labels. Idempotent.
pub fn normalize_domain(raw: &str) -> String {
    let mut host = raw.to_ascii_lowercase();
    loop {
        let trimmed = host.trim().trim_end_matches('.');
        let stripped = trimmed.strip_prefix("www.").unwrap_or(trimmed);
        if stripped.len() == host.len() {
            return host;
        }
        host = stripped.to_string();
    }
}

/// Host of the first `http://` or `https://` URL embedded in `text`.
pub fn host_from_url(text: &str) -> Option<String> {
    let lowered = text.to_ascii_lowercase();
    let (start, prefix) = PROTOCOLS
        .iter()
        .filter_map(|prefix| lowered.find(prefix).map(|index| (index, *prefix)))
        .min_by_key(|(index, _)| *index)?;

    let rest = &text[start + prefix.len()..];
    let authority = rest
        .split(|c: char| c == '/' || c == '?' || c == '#' || c.is_whitespace())
        .next()
        .unwrap_or_default();
    let host = strip_port(authority.rsplit('@').next().unwrap_or(authority));

    (!host.is_empty()).then(|| host.to_string())
}

/// Host of address-bar text shown without a scheme, e.g. `pornhub.com/video`.
pub fn bare_domain_host(text: &str, max_len: usize) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.len() > max_len || trimmed.contains(char::is_whitespace) {
        return None;
    }
    if !bare_domain_pattern().is_match(trimmed) {
        return None;
    }

    let authority = trimmed
        .split(|c: char| c == '/' || c == '?' || c == '#')
        .next()
        .unwrap_or(trimmed);
    Some(strip_port(authority).to_string())
}

/// True when `text` carries something that can be read as a navigated host.
pub fn contains_url_token(text: &str, max_len: usize) -> bool {
    host_from_url(text).is_some() || bare_domain_host(text, max_len).is_some()
}

fn strip_port(authority: &str) -> &str {
    authority.split(':').next().unwrap_or(authority)
}
