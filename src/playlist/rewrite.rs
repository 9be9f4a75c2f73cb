use std::sync::LazyLock;

use regex::{Captures, Regex};
use url::Url;

pub const PROXY_PATH: &str = "/proxy";
pub const PROXY_QUERY_PARAM: &str = "url";

const ORIGINAL_URL_PREFIX: &str = "# Original URL: ";

static URI_ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"URI="(.*?)""#).expect("URI attribute pattern is valid"));

/// Rewrites the URLs of one manifest, resolved against the URL it was
/// fetched from.
pub struct UrlRewriter<'a> {
    base: Option<Url>,
    proxy_base: &'a Url,
}

impl<'a> UrlRewriter<'a> {
    pub fn new(request_url: &str, proxy_base: &'a Url) -> Self {
        Self {
            base: Url::parse(request_url).ok(),
            proxy_base,
        }
    }

    /// Absolute, normalized form of `url`. Falls back to `url` itself when
    /// neither the request URL nor `url` can be parsed.
    pub fn resolve(&self, url: &str) -> String {
        let resolved = match &self.base {
            Some(base) => base.join(url),
            None => Url::parse(url),
        };
        resolved.map(String::from).unwrap_or_else(|_| url.to_string())
    }

    /// `<proxy_base>?url=<encoded absolute url>`
    pub fn proxied(&self, url: &str) -> String {
        let mut proxied = self.proxy_base.clone();
        proxied
            .query_pairs_mut()
            .clear()
            .append_pair(PROXY_QUERY_PARAM, &self.resolve(url));
        proxied.into()
    }

    /// A URI line becomes a comment with the original value followed by the
    /// rewritten URL.
    pub fn rewrite_uri(&self, raw: &str, through_proxy: bool) -> [String; 2] {
        let target = if through_proxy {
            self.proxied(raw)
        } else {
            self.resolve(raw)
        };
        [format!("{ORIGINAL_URL_PREFIX}{raw}"), target]
    }

    /// Proxies every `URI="..."` attribute of a tag line in place.
    pub fn rewrite_tag(&self, raw: &str) -> String {
        URI_ATTRIBUTE
            .replace_all(raw, |caps: &Captures| {
                format!("URI=\"{}\"", self.proxied(&caps[1]))
            })
            .into_owned()
    }
}
