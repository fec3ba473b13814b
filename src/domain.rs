//! Canonicalisation of caller-supplied domains.
//!
//! Callers send bare hosts (`github.com`) or full URLs
//! (`https://www.github.com/about`). The provider wants an absolute URL in the
//! conventional `https://www.` form; records are named after the bare host.

use url::{Host, Url};

/// One requested domain in its three useful forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainTarget {
    /// Exactly what the caller sent.
    pub requested: String,
    /// Absolute URL dispatched to the provider.
    pub url: String,
    /// Bare host used to name records.
    pub host: String,
}

impl DomainTarget {
    /// Never fails: input that does not parse as a URL is carried through
    /// verbatim so the synthesizer can still name a record after it.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let with_scheme = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        };

        let parsed = Url::parse(&with_scheme)
            .ok()
            .and_then(|u| u.host().map(|h| canonical_host(&h)));

        match parsed {
            Some(host) => Self {
                requested: raw.to_string(),
                url: format!("https://{}", host),
                host: host.strip_prefix("www.").unwrap_or(&host).to_string(),
            },
            None => {
                tracing::debug!("Unparseable domain '{}', passing through verbatim", raw);
                Self {
                    requested: raw.to_string(),
                    url: with_scheme,
                    host: trimmed.to_string(),
                }
            }
        }
    }
}

fn canonical_host(host: &Host<&str>) -> String {
    match host {
        Host::Domain(name) => {
            let name = name.trim_end_matches('.').to_ascii_lowercase();
            if !name.starts_with("www.") && name.matches('.').count() == 1 {
                format!("www.{}", name)
            } else {
                name
            }
        }
        // IP literals keep their textual form
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_domain_gets_scheme_and_www() {
        let target = DomainTarget::parse("example.com");
        assert_eq!(target.url, "https://www.example.com");
        assert_eq!(target.host, "example.com");
        assert_eq!(target.requested, "example.com");
    }

    #[test]
    fn test_full_url_is_reduced_to_origin() {
        let target = DomainTarget::parse("http://WWW.GitHub.com/about?x=1");
        assert_eq!(target.url, "https://www.github.com");
        assert_eq!(target.host, "github.com");
    }

    #[test]
    fn test_unparseable_input_keeps_its_own_scheme() {
        let target = DomainTarget::parse("https://");
        assert_eq!(target.url, "https://");
        assert_eq!(target.host, "https://");
    }

    #[test]
    fn test_subdomains_are_kept() {
        let target = DomainTarget::parse("docs.rs");
        assert_eq!(target.url, "https://www.docs.rs");

        let target = DomainTarget::parse("blog.example.co.uk");
        assert_eq!(target.url, "https://blog.example.co.uk");
        assert_eq!(target.host, "blog.example.co.uk");
    }

    #[test]
    fn test_ip_literal_not_prefixed() {
        let target = DomainTarget::parse("127.0.0.1");
        assert_eq!(target.url, "https://127.0.0.1");
        assert_eq!(target.host, "127.0.0.1");
    }

    #[test]
    fn test_malformed_input_passes_through() {
        let target = DomainTarget::parse("not a domain");
        assert_eq!(target.host, "not a domain");
        assert_eq!(target.requested, "not a domain");

        let target = DomainTarget::parse("");
        assert_eq!(target.host, "");
        assert_eq!(target.url, "https://");
    }
}
