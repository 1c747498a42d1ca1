use std::borrow::Cow;

use url::{Position, Url};

/// Path plus query of `url`, the form robots.txt patterns are matched against.
pub fn request_uri(url: &Url) -> Cow<'_, str> {
    let uri = &url[Position::BeforePath..Position::AfterQuery];
    if uri.starts_with('/') {
        Cow::Borrowed(uri)
    } else {
        Cow::Owned(format!("/{}", uri))
    }
}

/// Parses a `Sitemap`/`Host` value, joining it onto `base` when one is known.
pub fn resolve_url(base: Option<&Url>, value: &str) -> Result<Url, url::ParseError> {
    match base {
        Some(base) => base.join(value),
        None => Url::parse(value),
    }
}

/// Parses a `Host` value. A bare host name such as `www.example.com` takes the
/// scheme of `base`, or `https` when there is no base.
pub fn resolve_host(base: Option<&Url>, value: &str) -> Result<Url, url::ParseError> {
    if value.contains("://") {
        return Url::parse(value);
    }

    let scheme = base.map(Url::scheme).unwrap_or("https");
    Url::parse(&format!("{}://{}", scheme, value))
}

/*
Compares the hosts of two urls, ignoring a leading "www.". Returns true if same
*/
pub fn same_host(left: &Url, right: &Url) -> bool {
    match (left.host_str(), right.host_str()) {
        (Some(left), Some(right)) => strip_www(left).eq_ignore_ascii_case(strip_www(right)),
        _ => false,
    }
}

fn strip_www(host: &str) -> &str {
    match host.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("www.") && host.len() > 4 => &host[4..],
        _ => host,
    }
}
