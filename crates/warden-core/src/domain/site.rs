use thiserror::Error;

/// Sites offered out of the box by UI surfaces.
pub const DEFAULT_SITES: [&str; 6] = [
    "facebook.com",
    "youtube.com",
    "twitter.com",
    "instagram.com",
    "tiktok.com",
    "reddit.com",
];

#[derive(Error, Debug, PartialEq, Eq)]
#[error("domaine invalide: {0}")]
pub struct InvalidDomainError(pub String);

/// Normalize user input into a bare domain and validate it.
///
/// Accepts forms like `https://www.Facebook.com` and reduces them to
/// `facebook.com`. Rejection happens before any state is touched.
pub fn normalize_domain(input: &str) -> Result<String, InvalidDomainError> {
    let lowered = input.trim().to_lowercase();
    let without_scheme = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);
    let host = without_scheme
        .strip_prefix("www.")
        .unwrap_or(without_scheme)
        .trim_end_matches('/');

    if is_valid_domain(host) {
        Ok(host.to_string())
    } else {
        Err(InvalidDomainError(input.trim().to_string()))
    }
}

fn is_valid_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    let tld = labels[labels.len() - 1];
    if tld.len() < 2 || !tld.bytes().all(|b| b.is_ascii_alphabetic()) {
        return false;
    }

    labels[..labels.len() - 1].iter().all(|label| valid_label(label))
}

fn valid_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    if bytes.is_empty() || bytes.len() > 63 {
        return false;
    }
    if !bytes[0].is_ascii_alphanumeric() || !bytes[bytes.len() - 1].is_ascii_alphanumeric() {
        return false;
    }
    bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_domains() {
        assert_eq!(normalize_domain("facebook.com").unwrap(), "facebook.com");
        assert_eq!(normalize_domain("news.ycombinator.com").unwrap(), "news.ycombinator.com");
        assert_eq!(normalize_domain("bbc.co.uk").unwrap(), "bbc.co.uk");
    }

    #[test]
    fn strips_scheme_www_and_case() {
        assert_eq!(
            normalize_domain("https://www.Facebook.com").unwrap(),
            "facebook.com"
        );
        assert_eq!(normalize_domain("http://YouTube.com/").unwrap(), "youtube.com");
        assert_eq!(normalize_domain("  reddit.com  ").unwrap(), "reddit.com");
    }

    #[test]
    fn rejects_garbage() {
        for input in ["not a domain", "", "com", ".com", "face book.com", "-x.com", "x-.com", "site.c", "site.42"] {
            assert!(normalize_domain(input).is_err(), "accepted {:?}", input);
        }
    }

    #[test]
    fn rejects_overlong_labels() {
        let label = "a".repeat(64);
        assert!(normalize_domain(&format!("{label}.com")).is_err());

        let label = "a".repeat(63);
        assert!(normalize_domain(&format!("{label}.com")).is_ok());
    }

    #[test]
    fn default_sites_are_all_valid() {
        for site in DEFAULT_SITES {
            assert_eq!(normalize_domain(site).unwrap(), site);
        }
    }
}
