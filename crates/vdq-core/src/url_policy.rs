//! Submission URL validity predicate.
//!
//! Accepts only http(s) URLs on an allow-listed host and normalizes them:
//! surrounding whitespace trimmed, scheme upgraded to https, fragment dropped.

use url::Url;

/// Hosts accepted when the config does not override `allowed_hosts`.
pub const DEFAULT_ALLOWED_HOSTS: &[&str] =
    &["www.youtube.com", "youtube.com", "m.youtube.com", "youtu.be"];

/// Pure check on an untrusted URL string. No I/O.
pub trait UrlValidator: Send + Sync {
    /// Returns the normalized URL, or None when the input is rejected.
    fn validate(&self, raw: &str) -> Option<String>;
}

/// Host allow-list policy.
#[derive(Debug, Clone)]
pub struct UrlPolicy {
    allowed_hosts: Vec<String>,
}

impl UrlPolicy {
    pub fn new<I, S>(allowed_hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_hosts: allowed_hosts
                .into_iter()
                .map(|h| h.into().to_ascii_lowercase())
                .collect(),
        }
    }

    fn host_allowed(&self, host: &str) -> bool {
        self.allowed_hosts
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(host))
    }
}

impl Default for UrlPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_HOSTS.iter().copied())
    }
}

impl UrlValidator for UrlPolicy {
    fn validate(&self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let mut url = Url::parse(raw).ok()?;
        match url.scheme() {
            "https" => {}
            "http" => url.set_scheme("https").ok()?,
            _ => return None,
        }
        if !self.host_allowed(url.host_str()?) {
            return None;
        }
        url.set_fragment(None);
        Some(url.into())
    }
}
