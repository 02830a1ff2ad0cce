//! Machine-safe merchant identifiers

/// Turn a merchant name (or, failing that, a hostname) into an identifier.
///
/// A non-empty name other than "localhost" is lowercased and reduced to `[a-z0-9]`.
/// Otherwise the first label of the hostname, minus any `www.`, is reduced
/// to `[a-zA-Z0-9]`. An empty result means no usable identifier.
pub fn normalize_identifier(merchant_name: Option<&str>, hostname: &str) -> String {
    match merchant_name {
        Some(name) if !name.is_empty() && !name.eq_ignore_ascii_case("localhost") => name
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            .collect(),
        _ => {
            let host = hostname.strip_prefix("www.").unwrap_or(hostname);
            host.split('.')
                .next()
                .unwrap_or_default()
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(
            normalize_identifier(Some("Netfl1x Officia1 Ltd!"), "netflix.com"),
            "netfl1xofficia1ltd"
        );
        assert_eq!(normalize_identifier(Some("Café Nero"), "caffenero.com"), "cafnero");
    }

    #[test]
    fn test_from_hostname() {
        assert_eq!(normalize_identifier(None, "www.spotify.com"), "spotify");
        assert_eq!(normalize_identifier(None, "Open-Shop.example.com"), "OpenShop");
    }

    #[test]
    fn test_localhost_name_falls_back_to_host() {
        assert_eq!(normalize_identifier(Some("LocalHost"), "localhost"), "localhost");
        assert_eq!(normalize_identifier(Some("localhost"), "www.acme.dev"), "acme");
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(normalize_identifier(None, ""), "");
        assert_eq!(normalize_identifier(Some(""), "www.acme.dev"), "acme");
        assert_eq!(normalize_identifier(Some("!!!"), "example.com"), "");
        // A blank name is still a name
        assert_eq!(normalize_identifier(Some("   "), "www.acme.dev"), "");
    }
}
