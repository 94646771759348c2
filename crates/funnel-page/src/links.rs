//! Affiliate link detection and in-page anchor resolution.

use funnel_core::config::LinkConfig;
use serde::{Deserialize, Serialize};

/// A clicked link as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Visible text content.
    #[serde(default)]
    pub text: String,
    /// The `href` attribute, possibly relative.
    pub href: String,
    /// CSS classes on the link element.
    #[serde(default)]
    pub classes: Vec<String>,
}

/// Decides which links count as affiliate links.
///
/// A link matches when its href contains the configured fragment or it
/// carries one of the configured call-to-action classes.
#[derive(Debug, Clone)]
pub struct AffiliateLinkMatcher {
    href_fragment: String,
    classes: Vec<String>,
}

impl AffiliateLinkMatcher {
    pub fn new(config: &LinkConfig) -> Self {
        Self {
            href_fragment: config.affiliate_href_fragment.clone(),
            classes: config.affiliate_classes.clone(),
        }
    }

    pub fn is_affiliate(&self, link: &Link) -> bool {
        if !self.href_fragment.is_empty() && link.href.contains(&self.href_fragment) {
            return true;
        }
        link.classes.iter().any(|c| self.classes.contains(c))
    }
}

/// Element id an in-page anchor href points at.
///
/// `"#"` alone and non-anchor hrefs have no target.
pub fn anchor_target(href: &str) -> Option<&str> {
    match href.strip_prefix('#') {
        Some(id) if !id.is_empty() => Some(id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(href: &str, classes: &[&str]) -> Link {
        Link {
            text: "Get protected".to_string(),
            href: href.to_string(),
            classes: classes.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn test_href_fragment_matches() {
        let matcher = AffiliateLinkMatcher::new(&LinkConfig::default());
        assert!(matcher.is_affiliate(&link("https://guardio.io/?aff=1", &[])));
        assert!(!matcher.is_affiliate(&link("https://elsewhere.test/", &[])));
    }

    #[test]
    fn test_cta_class_matches() {
        let matcher = AffiliateLinkMatcher::new(&LinkConfig::default());
        assert!(matcher.is_affiliate(&link("/checkout", &["btn", "btn-primary"])));
        assert!(matcher.is_affiliate(&link("/checkout", &["btn-accent"])));
        assert!(!matcher.is_affiliate(&link("/checkout", &["btn-secondary"])));
    }

    #[test]
    fn test_empty_fragment_never_matches_href() {
        let config = LinkConfig {
            affiliate_href_fragment: String::new(),
            affiliate_classes: vec![],
        };
        let matcher = AffiliateLinkMatcher::new(&config);
        assert!(!matcher.is_affiliate(&link("https://guardio.io/", &["btn-primary"])));
    }

    #[test]
    fn test_anchor_target() {
        assert_eq!(anchor_target("#pricing"), Some("pricing"));
        assert_eq!(anchor_target("#"), None);
        assert_eq!(anchor_target("/pricing"), None);
        assert_eq!(anchor_target("https://a.test/#pricing"), None);
    }

    #[test]
    fn test_link_deserializes_with_defaults() {
        let link: Link = serde_json::from_str(r##"{"href": "#faq"}"##).unwrap();
        assert_eq!(link.href, "#faq");
        assert!(link.text.is_empty());
        assert!(link.classes.is_empty());
    }
}
