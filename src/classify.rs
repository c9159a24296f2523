use crate::models::ClassificationResult;

/// Static list of disallowed domains and keywords.
///
/// Matching is plain case-insensitive substring containment with no TLD
/// awareness, so `pornhub` also blocks `notpornhub.example`. Over-blocking
/// look-alikes is accepted in exchange for fewer misses.
#[derive(Debug, Clone, Default)]
pub struct Blocklist {
    entries: Vec<String>,
}

impl Blocklist {
    /// Blank entries are dropped since they would match every domain.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|entry| entry.as_ref().trim().to_ascii_lowercase())
            .filter(|entry| !entry.is_empty())
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_blocked(&self, domain: &str) -> bool {
        classify(domain, self)
    }

    pub fn classify(&self, domain: &str) -> ClassificationResult {
        ClassificationResult {
            domain: domain.to_string(),
            is_blocked: self.is_blocked(domain),
        }
    }
}

pub fn classify(domain: &str, blocklist: &Blocklist) -> bool {
    let domain = domain.trim().to_ascii_lowercase();
    if domain.is_empty() {
        return false;
    }
    blocklist
        .entries
        .iter()
        .any(|entry| domain.contains(entry.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn blocklist() -> Blocklist {
        Blocklist::new(["pornhub.com", "xvideos", "  XNXX "])
    }

    #[test]
    fn matches_full_domains_and_bare_keywords() {
        let list = blocklist();
        assert!(list.is_blocked("pornhub.com"));
        assert!(list.is_blocked("de.pornhub.com"));
        assert!(list.is_blocked("xvideos.es"));
        assert!(list.is_blocked("xnxx.tv"));
        assert!(!list.is_blocked("pornhub.org"));
        assert!(!list.is_blocked("wikipedia.org"));
        assert!(!list.is_blocked(""));
    }

    #[test]
    fn substring_matching_over_blocks_look_alikes() {
        let list = blocklist();
        assert!(list.is_blocked("notpornhub.com.example"));
        assert!(list.is_blocked("myxvideoshelper.net"));
    }

    #[test]
    fn blank_entries_never_match_everything() {
        let list = Blocklist::new(["", "   "]);
        assert!(list.is_empty());
        assert!(!list.is_blocked("example.com"));
    }

    #[test]
    fn classification_result_carries_domain() {
        let result = blocklist().classify("xvideos.com");
        assert_eq!(
            result,
            ClassificationResult {
                domain: "xvideos.com".into(),
                is_blocked: true
            }
        );
    }

    proptest! {
        #[test]
        fn any_casing_or_padding_of_an_entry_is_blocked(
            entry in "[a-z]{3,10}(\\.[a-z]{2,4})?",
            upper_mask in proptest::collection::vec(any::<bool>(), 14),
            pad_left in " {0,3}",
            pad_right in " {0,3}",
        ) {
            let list = Blocklist::new([entry.as_str()]);
            let variant: String = entry
                .chars()
                .zip(upper_mask.iter().cycle())
                .map(|(c, upper)| if *upper { c.to_ascii_uppercase() } else { c })
                .collect();
            let padded = format!("{pad_left}{variant}{pad_right}");
            prop_assert!(classify(&padded, &list));
        }

        #[test]
        fn domains_containing_no_entry_are_allowed(domain in "[a-z.]{1,20}") {
            prop_assume!(["pornhub.com", "xvideos", "xnxx"]
                .iter()
                .all(|entry| !domain.contains(entry)));
            prop_assert!(!classify(&domain, &blocklist()));
        }
    }
}
