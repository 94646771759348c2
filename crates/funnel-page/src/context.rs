//! Identity of the page a session runs on.

use std::collections::BTreeMap;

use funnel_core::error::Result;
use url::Url;

/// URL, title and referrer of the current page view.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContext {
    url: Url,
    title: String,
    referrer: String,
}

impl PageContext {
    /// Returns `FunnelError::InvalidUrl` if `url` is not an absolute URL.
    pub fn new(url: &str, title: &str, referrer: &str) -> Result<Self> {
        Ok(Self {
            url: Url::parse(url)?,
            title: title.to_string(),
            referrer: referrer.to_string(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Serialized page URL, as reported in event payloads.
    pub fn page_url(&self) -> &str {
        self.url.as_str()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn referrer(&self) -> &str {
        &self.referrer
    }

    /// Query parameters as a map. A key repeated in the query keeps its last value.
    pub fn url_params(&self) -> BTreeMap<String, String> {
        self.url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Resolve an href against the page URL, the way a browser reports `link.href`.
    ///
    /// Hrefs that cannot be resolved are returned unchanged.
    pub fn resolve(&self, href: &str) -> String {
        match self.url.join(href) {
            Ok(resolved) => resolved.to_string(),
            Err(_) => href.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use funnel_core::error::FunnelError;

    #[test]
    fn test_context_accessors() {
        let ctx = PageContext::new(
            "https://funnel.test/offer?utm_source=ads",
            "Best Offer",
            "https://search.test/",
        )
        .unwrap();
        assert_eq!(ctx.page_url(), "https://funnel.test/offer?utm_source=ads");
        assert_eq!(ctx.title(), "Best Offer");
        assert_eq!(ctx.referrer(), "https://search.test/");
        assert_eq!(ctx.url().host_str(), Some("funnel.test"));
    }

    #[test]
    fn test_invalid_url() {
        let err = PageContext::new("not a url", "", "").unwrap_err();
        assert!(matches!(err, FunnelError::InvalidUrl(_)));
    }

    #[test]
    fn test_url_params() {
        let ctx = PageContext::new(
            "https://funnel.test/?utm_source=ads&utm_campaign=spring%20sale&ref=1",
            "",
            "",
        )
        .unwrap();
        let params = ctx.url_params();
        assert_eq!(params.len(), 3);
        assert_eq!(params["utm_source"], "ads");
        assert_eq!(params["utm_campaign"], "spring sale");
        assert_eq!(params["ref"], "1");
    }

    #[test]
    fn test_url_params_last_duplicate_wins() {
        let ctx = PageContext::new("https://funnel.test/?a=1&a=2&b=", "", "").unwrap();
        let params = ctx.url_params();
        assert_eq!(params["a"], "2");
        assert_eq!(params["b"], "");
    }

    #[test]
    fn test_url_params_empty() {
        let ctx = PageContext::new("https://funnel.test/", "", "").unwrap();
        assert!(ctx.url_params().is_empty());
    }

    #[test]
    fn test_resolve_relative_href() {
        let ctx = PageContext::new("https://funnel.test/landing/offer", "", "").unwrap();
        assert_eq!(ctx.resolve("/go"), "https://funnel.test/go");
        assert_eq!(ctx.resolve("#pricing"), "https://funnel.test/landing/offer#pricing");
        assert_eq!(
            ctx.resolve("https://guardio.test/buy"),
            "https://guardio.test/buy"
        );
    }
}
