use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Reasons a seed URL is refused.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("Private IP address not allowed: {0}")]
    PrivateIp(String),
    #[error("Localhost not allowed")]
    Localhost,
}

/// Validates a URL given as a remote seed source.
///
/// Rejects non-HTTP(S) schemes, localhost and private or link-local
/// addresses, so a config file cannot point the seeder at internal services.
///
/// ```
/// use quill::util::validate_url;
///
/// assert!(validate_url("https://example.com/data/hackerIpsum.json").is_ok());
/// assert!(validate_url("http://localhost/seed.json").is_err());
/// assert!(validate_url("file:///etc/passwd").is_err());
/// ```
pub fn validate_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if let Some(host) = url.host_str() {
        if host.eq_ignore_ascii_case("localhost") {
            return Err(UrlValidationError::Localhost);
        }

        let bare = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);

        if let Ok(ip) = bare.parse::<IpAddr>() {
            // ::ffff:a.b.c.d reaches the IPv4 host, so judge it as IPv4
            let ip = match ip {
                IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(ip, IpAddr::V4),
                v4 => v4,
            };
            if ip.is_loopback() {
                return Err(UrlValidationError::Localhost);
            }
            if is_private_ip(&ip) {
                return Err(UrlValidationError::PrivateIp(ip.to_string()));
            }
        }
    }

    Ok(url)
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_link_local() || v4.is_unspecified(),
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            // fc00::/7 unique local, fe80::/10 link-local
            v6.is_unspecified() || (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_urls_accepted() {
        let url = validate_url("https://example.com/data/hackerIpsum.json").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
        assert!(validate_url("http://example.org:8080/seed.json").is_ok());
    }

    #[test]
    fn test_non_http_schemes_rejected() {
        assert!(matches!(
            validate_url("file:///etc/passwd"),
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
        assert!(validate_url("ftp://example.com/seed.json").is_err());
    }

    #[test]
    fn test_loopback_rejected() {
        for url in [
            "http://localhost/seed.json",
            "http://LOCALHOST/seed.json",
            "http://127.0.0.1/seed.json",
            "http://[::1]/seed.json",
            "http://[::ffff:127.0.0.1]/seed.json",
        ] {
            assert!(
                matches!(validate_url(url), Err(UrlValidationError::Localhost)),
                "{url} should be rejected as localhost"
            );
        }
    }

    #[test]
    fn test_private_ranges_rejected() {
        for url in [
            "http://10.0.0.1/seed.json",
            "http://172.16.0.1/seed.json",
            "http://192.168.1.1:3000/seed.json",
            "http://169.254.1.1/seed.json",
            "http://0.0.0.0/seed.json",
            "http://[fe80::1]/seed.json",
            "http://[fd00::1]/seed.json",
            "http://[::ffff:10.0.0.1]/seed.json",
            "http://[::ffff:192.168.1.1]/seed.json",
        ] {
            assert!(
                matches!(validate_url(url), Err(UrlValidationError::PrivateIp(_))),
                "{url} should be rejected as private"
            );
        }
    }

    #[test]
    fn test_mapped_public_ipv4_accepted() {
        assert!(validate_url("http://[::ffff:93.184.216.34]/seed.json").is_ok());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            validate_url("not a url"),
            Err(UrlValidationError::InvalidUrl(_))
        ));
    }
}
