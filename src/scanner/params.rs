//! Query-parameter discovery and test URL construction

use crate::error::{ProbeError, Result};
use std::collections::HashSet;
use url::form_urlencoded::byte_serialize;
use url::Url;

/// Parses the scan target, accepting only absolute http(s) URLs
pub fn parse_target(target: &str) -> Result<Url> {
    let url = Url::parse(target.trim()).map_err(|_| ProbeError::InvalidUrl(target.to_string()))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(ProbeError::InvalidUrl(target.to_string())),
    }
}

/// Trims, drops blanks and deduplicates names, keeping first-seen order
fn clean_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|n| n.as_ref().trim().to_string())
        .filter(|n| !n.is_empty())
        .filter(|n| seen.insert(n.clone()))
        .collect()
}

/// Query-string keys already present on the URL
pub fn discover_parameters(url: &Url) -> Vec<String> {
    clean_names(url.query_pairs().map(|(k, _)| k.into_owned()))
}

/// Explicit names when any are given, otherwise the URL's own query keys
pub fn resolve_parameters(url: &Url, requested: &[String]) -> Result<Vec<String>> {
    let explicit = clean_names(requested);
    let params = if explicit.is_empty() {
        discover_parameters(url)
    } else {
        explicit
    };

    if params.is_empty() {
        return Err(ProbeError::NoParametersFound);
    }
    Ok(params)
}

/// Current value of `param` on the URL, `None` if it is not present
pub fn original_value(url: &Url, param: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k.trim() == param)
        .map(|(_, v)| v.into_owned())
}

fn encode(s: &str) -> String {
    byte_serialize(s.as_bytes()).collect()
}

/// Builds a test URL with `payload` as the value of `param`.
///
/// An existing parameter is replaced in place; a missing one is appended.
/// Other pairs are re-encoded, the payload is inserted verbatim so that
/// pre-encoded sequences such as `%2e%2e%2f` reach the server untouched.
pub fn build_test_url(base: &Url, param: &str, payload: &str) -> String {
    let mut url = base.clone();
    let mut replaced = false;

    let mut parts: Vec<String> = base
        .query_pairs()
        .map(|(k, v)| {
            if k.trim() == param {
                replaced = true;
                format!("{}={payload}", encode(&k))
            } else {
                format!("{}={}", encode(&k), encode(&v))
            }
        })
        .collect();

    if !replaced {
        parts.push(format!("{}={payload}", encode(param)));
    }

    url.set_query(Some(&parts.join("&")));
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).expect("valid url")
    }

    #[test]
    fn test_parse_target_rejects_relative_and_non_http() {
        assert!(parse_target("https://example.com/a?b=c").is_ok());
        assert!(matches!(parse_target("/index.php?file=x"), Err(ProbeError::InvalidUrl(_))));
        assert!(matches!(parse_target("not a url"), Err(ProbeError::InvalidUrl(_))));
        assert!(matches!(parse_target("ftp://example.com/"), Err(ProbeError::InvalidUrl(_))));
    }

    #[test]
    fn test_discover_dedupes_and_drops_blank() {
        let u = url("https://example.com/?file=a&page=b&file=c&=x&%20=y");
        assert_eq!(discover_parameters(&u), vec!["file", "page"]);
    }

    #[test]
    fn test_resolve_prefers_explicit_names() {
        let u = url("https://example.com/?file=a&page=b");
        let names = vec!["lang".to_string(), " ".to_string(), "lang".to_string()];
        assert_eq!(resolve_parameters(&u, &names).expect("params"), vec!["lang"]);
        assert_eq!(resolve_parameters(&u, &[]).expect("params"), vec!["file", "page"]);
    }

    #[test]
    fn test_resolve_without_any_parameters() {
        let u = url("https://example.com/index.php");
        assert!(matches!(resolve_parameters(&u, &[]), Err(ProbeError::NoParametersFound)));
    }

    #[test]
    fn test_original_value() {
        let u = url("https://example.com/?file=home.php&x=");
        assert_eq!(original_value(&u, "file").as_deref(), Some("home.php"));
        assert_eq!(original_value(&u, "x").as_deref(), Some(""));
        assert_eq!(original_value(&u, "missing"), None);
    }

    #[test]
    fn test_build_test_url_replaces_existing() {
        let u = url("https://example.com/index.php?file=home.php&lang=en");
        assert_eq!(
            build_test_url(&u, "file", "../../../etc/passwd"),
            "https://example.com/index.php?file=../../../etc/passwd&lang=en"
        );
    }

    #[test]
    fn test_build_test_url_appends_missing() {
        let u = url("https://example.com/index.php?lang=en");
        assert_eq!(
            build_test_url(&u, "file", "/etc/passwd"),
            "https://example.com/index.php?lang=en&file=/etc/passwd"
        );
        let bare = url("https://example.com/view");
        assert_eq!(
            build_test_url(&bare, "page", "/etc/passwd"),
            "https://example.com/view?page=/etc/passwd"
        );
    }

    #[test]
    fn test_build_test_url_keeps_pre_encoded_payload() {
        let u = url("https://example.com/?file=a");
        assert_eq!(
            build_test_url(&u, "file", "..%252f..%252fetc%252fpasswd"),
            "https://example.com/?file=..%252f..%252fetc%252fpasswd"
        );
    }

    #[test]
    fn test_build_test_url_preserves_fragment_and_other_encoding() {
        let u = url("https://example.com/?q=a%26b&file=x#top");
        assert_eq!(
            build_test_url(&u, "file", "/etc/passwd"),
            "https://example.com/?q=a%26b&file=/etc/passwd#top"
        );
    }
}
