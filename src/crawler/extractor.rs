//! Endpoint extraction from HTML and JavaScript text

use crate::models::{EndpointInfo, EndpointKind};
use regex::{Captures, Match, Regex};
use std::collections::HashMap;
use tracing::warn;

/// Extraction patterns, tried in order. The `url` group (when present) is
/// the literal; otherwise the whole match is used. `call_site` marks patterns
/// whose syntax can name an HTTP method, either through a `verb` group or a
/// `method:`/`type:` option.
const ENDPOINT_PATTERNS: &[(&str, bool)] = &[
    // REST-shaped quoted paths
    (
        r#"["'`](?P<url>(?:https?://[^"'`\s/]+)?/(?:api|rest|graphql|v\d+)(?:/[^"'`\s]*)?)["'`]"#,
        false,
    ),
    // Generic quoted relative paths
    (r#"["'`](?P<url>/[a-zA-Z0-9_\-./~%]+(?:\?[^"'`\s]*)?)["'`]"#, false),
    // Bare absolute URLs
    (r#"https?://[a-zA-Z0-9.\-]+(?::\d+)?(?:/[^\s"'`<>()\\]*)?"#, false),
    // fetch("...", { method: "POST" })
    (r#"fetch\(\s*["'`](?P<url>[^"'`]+)["'`](?:\s*,\s*\{[^}]*\})?"#, true),
    // axios.get("...") / axios.post("...")
    (
        r#"axios\.(?P<verb>get|post|put|delete|patch)\(\s*["'`](?P<url>[^"'`]+)["'`]"#,
        true,
    ),
    // axios({ method: "post", url: "..." })
    (r#"axios\(\s*\{[^}]*?url\s*:\s*["'`](?P<url>[^"'`]+)["'`][^}]*\}"#, true),
    // jQuery $.get/$.post/$.ajax/$.getJSON("...", { type: "..." })
    (
        r#"\$\.(?P<verb>get|post|ajax|getJSON)\(\s*["'`](?P<url>[^"'`]+)["'`](?:\s*,\s*\{[^}]*\})?"#,
        true,
    ),
    // jQuery $.ajax({ url: "...", type: "POST" })
    (r#"\$\.ajax\(\s*\{[^}]*?url\s*:\s*["'`](?P<url>[^"'`]+)["'`][^}]*\}"#, true),
    // XMLHttpRequest .open("GET", "...")
    (
        r#"\.open\(\s*["'](?P<verb>(?i:get|post|put|delete|patch))["']\s*,\s*["'`](?P<url>[^"'`]+)["'`]"#,
        true,
    ),
];

const EXCLUDED_PREFIXES: &[&str] = &["#", "javascript:", "mailto:", "tel:", "data:"];

/// Media, font and image assets that are never endpoints
const EXCLUDED_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".svg", ".ico", ".webp", ".bmp", ".woff", ".woff2", ".ttf",
    ".eot", ".otf", ".mp3", ".mp4", ".webm", ".avi", ".mov", ".wav",
];

const STATIC_EXTENSIONS: &[&str] = &[
    ".js", ".mjs", ".css", ".map", ".pdf", ".zip", ".gz", ".tar", ".txt", ".xml", ".csv",
];

const PAGE_EXTENSIONS: &[&str] = &[
    ".html", ".htm", ".php", ".asp", ".aspx", ".jsp", ".jspx", ".cfm", ".cgi", ".shtml",
];

/// Compiled pattern set
pub struct EndpointExtractor {
    patterns: Vec<(Regex, bool)>,
    method_option: Option<Regex>,
}

impl EndpointExtractor {
    pub fn new() -> Self {
        let patterns = ENDPOINT_PATTERNS
            .iter()
            .filter_map(|(pattern, call_site)| match Regex::new(pattern) {
                Ok(re) => Some((re, *call_site)),
                Err(e) => {
                    warn!("Skipping endpoint pattern: {e}");
                    None
                }
            })
            .collect();

        Self {
            patterns,
            method_option: Regex::new(
                r#"(?i)\b(?:method|type)\s*:\s*["'`](get|post|put|delete|patch)["'`]"#,
            )
            .ok(),
        }
    }

    /// Extracts deduplicated endpoints from `text`, tagging each with `source`
    pub fn extract(&self, text: &str, source: &str) -> Vec<EndpointInfo> {
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut endpoints: Vec<EndpointInfo> = Vec::new();

        for (re, call_site) in &self.patterns {
            for cap in re.captures_iter(text) {
                let Some(whole) = cap.get(0) else { continue };
                let literal = cap.name("url").unwrap_or(whole).as_str();
                let candidate = strip_quotes(literal);

                if is_excluded(candidate) {
                    continue;
                }

                let url = normalize(candidate);
                if url.is_empty() || url == "/" {
                    continue;
                }

                let method = if *call_site {
                    self.call_site_method(&cap, whole)
                } else {
                    None
                };

                // First occurrence wins; a later call site may still name its method
                if let Some(&idx) = seen.get(&url) {
                    if endpoints[idx].method.is_none() {
                        endpoints[idx].method = method;
                    }
                    continue;
                }

                seen.insert(url.clone(), endpoints.len());
                endpoints.push(EndpointInfo {
                    kind: classify_endpoint(&url),
                    url,
                    method,
                    source: source.to_string(),
                });
            }
        }

        endpoints
    }

    /// Method named by the call syntax: the `verb` group, else a
    /// `method:`/`type:` option outside the URL literal
    fn call_site_method(&self, cap: &Captures<'_>, whole: Match<'_>) -> Option<String> {
        if let Some(method) = cap.name("verb").and_then(|v| method_from_verb(v.as_str())) {
            return Some(method);
        }

        let text = whole.as_str();
        let options = match cap.name("url") {
            Some(url) => {
                let (start, end) = (url.start() - whole.start(), url.end() - whole.start());
                format!("{}{}", &text[..start], &text[end..])
            }
            None => text.to_string(),
        };

        self.method_option
            .as_ref()?
            .captures(&options)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_uppercase())
    }
}

impl Default for EndpointExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot extraction with a freshly compiled pattern set
pub fn extract_endpoints(text: &str, source: &str) -> Vec<EndpointInfo> {
    EndpointExtractor::new().extract(text, source)
}

/// `$.getJSON` is a GET; `$.ajax` names no method by itself
fn method_from_verb(verb: &str) -> Option<String> {
    match verb.to_ascii_lowercase().as_str() {
        "getjson" => Some("GET".to_string()),
        v @ ("get" | "post" | "put" | "delete" | "patch") => Some(v.to_uppercase()),
        _ => None,
    }
}

fn strip_quotes(s: &str) -> &str {
    s.trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`')
        .trim()
}

fn is_excluded(candidate: &str) -> bool {
    let lower = candidate.to_lowercase();
    if lower.is_empty() || lower == "/" {
        return true;
    }
    if EXCLUDED_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return true;
    }
    let path = normalize(&lower);
    EXCLUDED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Drops the query string and fragment
fn normalize(candidate: &str) -> String {
    let end = candidate
        .find(|c: char| c == '?' || c == '#')
        .unwrap_or(candidate.len());
    candidate[..end].to_string()
}

/// Path portion of an absolute URL, or the input itself
fn path_of(url: &str) -> &str {
    match url.find("://") {
        Some(idx) => {
            let rest = &url[idx + 3..];
            rest.find('/').map(|i| &rest[i..]).unwrap_or("")
        }
        None => url,
    }
}

/// Buckets an endpoint by its path shape
pub fn classify_endpoint(url: &str) -> EndpointKind {
    let lower = url.to_lowercase();
    let path = path_of(&lower);

    let is_api = path.starts_with("/api")
        || path.contains("/api/")
        || path.contains("/rest/")
        || path.contains("/graphql")
        || path.ends_with(".json")
        || path
            .split('/')
            .any(|seg| seg.len() >= 2 && seg.starts_with('v') && seg[1..].chars().all(|c| c.is_ascii_digit()))
        || lower.contains("://api.");
    if is_api {
        return EndpointKind::Api;
    }

    let last = path.rsplit('/').next().unwrap_or("");
    if STATIC_EXTENSIONS.iter().any(|ext| last.ends_with(ext)) {
        return EndpointKind::Static;
    }
    if PAGE_EXTENSIONS.iter().any(|ext| last.ends_with(ext)) || !last.contains('.') {
        return EndpointKind::Page;
    }
    EndpointKind::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(endpoints: &[EndpointInfo]) -> Vec<&str> {
        endpoints.iter().map(|e| e.url.as_str()).collect()
    }

    #[test]
    fn test_extract_from_js() {
        let js = r#"
            fetch("/api/users?page=2");
            const url = "/admin/dashboard";
            axios.post('/api/v2/data', body);
            $.getJSON("/reports/summary.json");
        "#;

        let found = extract_endpoints(js, "app.js");
        let list = urls(&found);
        assert!(list.contains(&"/api/users"));
        assert!(list.contains(&"/admin/dashboard"));
        assert!(list.contains(&"/api/v2/data"));
        assert!(list.contains(&"/reports/summary.json"));
        assert!(found.iter().all(|e| e.source == "app.js"));
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let js = r#"fetch("/api/items"); x = "/api/items#frag"; y = "/api/items?id=1";"#;
        let found = extract_endpoints(js, "inline");
        assert_eq!(urls(&found), vec!["/api/items"]);
    }

    #[test]
    fn test_method_inference_from_call_site() {
        let js = r#"
            var xhr = new XMLHttpRequest();
            xhr.open("DELETE", "/orders/17/cancel");
            axios.put("/profile/update", data);
        "#;
        let found = extract_endpoints(js, "inline");

        let cancel = found
            .iter()
            .find(|e| e.url == "/orders/17/cancel")
            .expect("xhr endpoint");
        assert_eq!(cancel.method.as_deref(), Some("DELETE"));

        let update = found
            .iter()
            .find(|e| e.url == "/profile/update")
            .expect("axios endpoint");
        assert_eq!(update.method.as_deref(), Some("PUT"));
    }

    #[test]
    fn test_path_words_are_not_methods() {
        let js = r#"
            fetch("/api/delete/42");
            fetch("/posts/get-started");
            $.ajax({ url: "/put/items", dataType: "json" });
            axios({ url: "/patch/notes" });
        "#;
        let found = extract_endpoints(js, "inline");

        for url in ["/api/delete/42", "/posts/get-started", "/put/items", "/patch/notes"] {
            let endpoint = found.iter().find(|e| e.url == url).expect("endpoint");
            assert_eq!(endpoint.method, None, "{url} should carry no method");
        }
    }

    #[test]
    fn test_method_from_call_options() {
        let js = r#"
            fetch("/api/session", { method: "DELETE", credentials: "include" });
            axios({ method: "post", url: "/get/token" });
            $.ajax({ url: "/delete/report", type: "PUT" });
            $.getJSON("/feeds/post.json");
            $.ajax("/legacy/save", { type: "POST" });
        "#;
        let found = extract_endpoints(js, "inline");
        let method = |url: &str| {
            found
                .iter()
                .find(|e| e.url == url)
                .and_then(|e| e.method.clone())
        };

        assert_eq!(method("/api/session").as_deref(), Some("DELETE"));
        assert_eq!(method("/get/token").as_deref(), Some("POST"));
        assert_eq!(method("/delete/report").as_deref(), Some("PUT"));
        assert_eq!(method("/feeds/post.json").as_deref(), Some("GET"));
        assert_eq!(method("/legacy/save").as_deref(), Some("POST"));
    }

    #[test]
    fn test_bare_urls_and_exclusions() {
        let html = r##"
            <a href="https://example.com/about?x=1">About</a>
            <a href="#top">Top</a>
            <a href="mailto:someone@example.com">Mail</a>
            <a href="javascript:void(0)">Nothing</a>
            <img src="/img/logo.png">
            <a href="/">Home</a>
        "##;
        let found = extract_endpoints(html, "page");
        let list = urls(&found);
        assert!(list.contains(&"https://example.com/about"));
        assert!(!list.iter().any(|u| u.ends_with(".png")));
        assert!(!list.contains(&"/"));
        assert!(!list.iter().any(|u| u.starts_with('#') || u.starts_with("mailto:")));
    }

    #[test]
    fn test_classify_endpoint() {
        assert_eq!(classify_endpoint("/api/users"), EndpointKind::Api);
        assert_eq!(classify_endpoint("/v1/orders"), EndpointKind::Api);
        assert_eq!(classify_endpoint("https://api.example.com/things"), EndpointKind::Api);
        assert_eq!(classify_endpoint("/data/export.json"), EndpointKind::Api);
        assert_eq!(classify_endpoint("/static/app.js"), EndpointKind::Static);
        assert_eq!(classify_endpoint("/css/site.css"), EndpointKind::Static);
        assert_eq!(classify_endpoint("/index.php"), EndpointKind::Page);
        assert_eq!(classify_endpoint("/admin/dashboard"), EndpointKind::Page);
        assert_eq!(classify_endpoint("https://example.com"), EndpointKind::Page);
        assert_eq!(classify_endpoint("/download/file.bin"), EndpointKind::Unknown);
    }

    #[test]
    fn test_strip_and_normalize() {
        assert_eq!(strip_quotes(" '/a' "), "/a");
        assert_eq!(normalize("/a/b?c=d#e"), "/a/b");
        assert_eq!(normalize("/a/b#e?x"), "/a/b");
    }
}
