//! Hostname normalization and tracked site matching.

use url::Url;

/// How a tab hostname is compared against a tracked entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// The hostname is the tracked entry or one of its subdomains.
    #[default]
    Strict,
    /// Additionally accepts hostnames the tracked entry ends with. This lets `google.com` match a
    /// tracked `mail.google.com`, so it is only enabled on request.
    Lenient,
}

/// Extracts a normalized hostname out of a tab url. Pages without a host (`about:blank`, `data:`
/// urls) and unparsable urls produce [None].
pub fn hostname_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let host = strip_www(host.trim_end_matches('.'));
    if host.is_empty() {
        None
    } else {
        Some(host.to_lowercase())
    }
}

/// Normalizes a site typed in by the user: `https://www.Example.com/path` becomes `example.com`.
pub fn normalize_site_input(input: &str) -> Option<String> {
    let site = input.trim().to_lowercase();
    let site = site
        .strip_prefix("https://")
        .or_else(|| site.strip_prefix("http://"))
        .unwrap_or(&site);
    let site = strip_www(site);
    let site = site.split('/').next().unwrap_or_default().trim_end_matches('.');
    if site.is_empty() {
        None
    } else {
        Some(site.to_string())
    }
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// Checks whether `hostname` belongs to `tracked`.
pub fn matches_tracked(hostname: &str, tracked: &str, mode: MatchMode) -> bool {
    if hostname == tracked || is_subdomain_of(hostname, tracked) {
        return true;
    }
    match mode {
        MatchMode::Strict => false,
        MatchMode::Lenient => tracked.ends_with(hostname),
    }
}

fn is_subdomain_of(hostname: &str, parent: &str) -> bool {
    hostname
        .strip_suffix(parent)
        .is_some_and(|prefix| prefix.ends_with('.'))
}

#[cfg(test)]
mod tests {
    use super::{hostname_from_url, matches_tracked, normalize_site_input, MatchMode};

    #[test]
    fn test_hostname_from_url() {
        assert_eq!(
            hostname_from_url("https://www.youtube.com/watch?v=1").as_deref(),
            Some("youtube.com")
        );
        assert_eq!(
            hostname_from_url("http://Mail.Google.com:8080/").as_deref(),
            Some("mail.google.com")
        );
        // Only a leading www is dropped.
        assert_eq!(
            hostname_from_url("https://docs.www.example.org").as_deref(),
            Some("docs.www.example.org")
        );
        assert_eq!(hostname_from_url("about:blank"), None);
        assert_eq!(hostname_from_url("not a url"), None);
    }

    #[test]
    fn test_normalize_site_input() {
        assert_eq!(
            normalize_site_input("  https://www.Reddit.com/r/rust ").as_deref(),
            Some("reddit.com")
        );
        assert_eq!(normalize_site_input("news.ycombinator.com").as_deref(), Some("news.ycombinator.com"));
        assert_eq!(normalize_site_input("http://"), None);
        assert_eq!(normalize_site_input("   "), None);
    }

    #[test]
    fn test_match_is_reflexive() {
        for site in ["a.com", "mail.google.com", "localhost"] {
            assert!(matches_tracked(site, site, MatchMode::Strict));
            assert!(matches_tracked(site, site, MatchMode::Lenient));
        }
    }

    #[test]
    fn test_match_subdomains() {
        assert!(matches_tracked("music.youtube.com", "youtube.com", MatchMode::Strict));
        assert!(!matches_tracked("notyoutube.com", "youtube.com", MatchMode::Strict));
        assert!(!matches_tracked("youtube.com.evil.org", "youtube.com", MatchMode::Strict));
    }

    #[test]
    fn test_reverse_match_requires_lenient_mode() {
        assert!(!matches_tracked("google.com", "mail.google.com", MatchMode::Strict));
        assert!(matches_tracked("google.com", "mail.google.com", MatchMode::Lenient));
    }
}
