//! Response-body fingerprints of leaked system files and source code

use regex::Regex;
use tracing::warn;

/// Signature table: (label, pattern). Order is the order labels are reported in.
pub const INDICATOR_SIGNATURES: &[(&str, &str)] = &[
    ("etc/passwd", r"root:[^:\r\n]*:0:0:"),
    ("etc/shadow", r"(?m)^root:[$!*][^:\r\n]*:\d+:"),
    ("etc/group", r"(?m)^(?:root|daemon|bin|sys|adm|wheel):x:\d+:[^:\r\n]*$"),
    ("etc/hosts", r"(?m)^\s*127\.0\.0\.1\s+localhost"),
    (
        "proc/self/environ",
        r"(?:HTTP_USER_AGENT|DOCUMENT_ROOT|SERVER_SOFTWARE|GATEWAY_INTERFACE)=",
    ),
    ("proc/version", r"Linux version \d+\.\d+"),
    ("win.ini", r"(?i)\[(?:fonts|extensions|mci extensions|files)\]|; for 16-bit app support"),
    ("boot.ini", r"(?i)\[boot\s*loader\]|multi\(\d\)disk\(\d\)"),
    ("system.ini", r"(?i)\[(?:drivers|386enh|boot\.description)\]"),
    ("php-source", r"<\?php"),
    (
        "php-include-error",
        r"(?i)failed to open stream|failed opening '.*' for inclusion|open_basedir restriction in effect|(?:include|require)(?:_once)?\(\): ",
    ),
    (
        "apache-config",
        r#"(?i)<VirtualHost\s|DocumentRoot\s+["/]|ServerRoot\s+"|LoadModule\s+\w+_module"#,
    ),
    ("private-key", r"-----BEGIN (?:RSA |DSA |EC |OPENSSH )?PRIVATE KEY-----"),
    ("php.ini", r"(?im)^\s*\[PHP\]\s*$|allow_url_include\s*=|disable_functions\s*="),
];

/// Compiled indicator table
pub struct IndicatorDetector {
    signatures: Vec<(&'static str, Regex)>,
}

impl IndicatorDetector {
    pub fn new() -> Self {
        let signatures = INDICATOR_SIGNATURES
            .iter()
            .filter_map(|(label, pattern)| match Regex::new(pattern) {
                Ok(re) => Some((*label, re)),
                Err(e) => {
                    warn!("Skipping indicator '{label}': {e}");
                    None
                }
            })
            .collect();
        Self { signatures }
    }

    /// Returns the labels of every signature found in `body`, in table order.
    /// All signatures are evaluated so several can match the same response.
    pub fn detect(&self, body: &str) -> Vec<String> {
        self.signatures
            .iter()
            .filter(|(_, re)| re.is_match(body))
            .map(|(label, _)| label.to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

impl Default for IndicatorDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot detection. Prefer holding an [`IndicatorDetector`] when scanning
/// many bodies.
pub fn detect_indicators(body: &str) -> Vec<String> {
    IndicatorDetector::new().detect(body)
}
