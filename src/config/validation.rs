use crate::config::types::{FetchConfig, FileTypePolicy, UserAgentConfig, MAX_DEPTH_CEILING};
use crate::url::normalize_url;
use crate::ConfigError;
use url::Url;

/// Validates and normalizes the start URL
pub fn validate_start_url(raw: Option<&str>) -> Result<Url, ConfigError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConfigError::Validation("start_url is required".to_string()))?;

    normalize_url(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid start_url '{}': {}", raw, e)))
}

/// Validates the depth ceiling
pub fn validate_max_depth(depth: i64) -> Result<u32, ConfigError> {
    if depth < 0 || depth > i64::from(MAX_DEPTH_CEILING) {
        return Err(ConfigError::Validation(format!(
            "max_depth must be between 0 and {}, got {}",
            MAX_DEPTH_CEILING, depth
        )));
    }

    Ok(depth as u32)
}

/// Validates a file-type policy after normalization
pub fn validate_file_types(policy: &FileTypePolicy) -> Result<(), ConfigError> {
    if let FileTypePolicy::CustomSet(extensions) = policy {
        if extensions.is_empty() {
            return Err(ConfigError::Validation(
                "file_types must name at least one extension, or be 'all' or 'web'".to_string(),
            ));
        }

        for ext in extensions {
            if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(ConfigError::Validation(format!(
                    "file type '{}' must contain only letters and digits",
                    ext
                )));
            }
        }
    }

    Ok(())
}

/// Validates blocked-path prefixes
pub fn validate_blocked_paths(paths: &[String]) -> Result<(), ConfigError> {
    for path in paths {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "blocked_paths cannot contain empty entries".to_string(),
            ));
        }
    }
    Ok(())
}

/// Validates allowed-URL-prefix entries
pub fn validate_url_prefixes(prefixes: &[String]) -> Result<(), ConfigError> {
    for prefix in prefixes {
        Url::parse(prefix).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid allowed_url_prefix '{}': {}", prefix, e))
        })?;
    }
    Ok(())
}

/// Validates whitelisted external entries
///
/// Entries are either URL prefixes (`https://partner.com/docs`) or domain
/// patterns (`partner.com`, `*.partner.com`).
pub fn validate_external_entries(entries: &[String]) -> Result<(), ConfigError> {
    for entry in entries {
        if entry.contains("://") {
            let url = Url::parse(entry).map_err(|e| {
                ConfigError::InvalidUrl(format!("Invalid allowed_external entry '{}': {}", entry, e))
            })?;
            if url.host_str().is_none() {
                return Err(ConfigError::InvalidUrl(format!(
                    "allowed_external entry '{}' has no host",
                    entry
                )));
            }
        } else {
            validate_domain_pattern(entry)?;
        }
    }
    Ok(())
}

/// Validates user agent configuration
pub fn validate_user_agent(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if !config.contact_url.is_empty() {
        Url::parse(&config.contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;
    }

    Ok(())
}

/// Validates fetch settings
pub fn validate_fetch(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }
    Ok(())
}

/// Validates a domain pattern (supports wildcards)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    if let Some(domain) = pattern.strip_prefix("*.") {
        validate_domain_string(domain)
    } else {
        validate_domain_string(pattern)
    }
}

/// Validates a domain string (without wildcard prefix)
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_domain_pattern() {
        assert!(validate_domain_pattern("example.com").is_ok());
        assert!(validate_domain_pattern("*.example.com").is_ok());
        assert!(validate_domain_pattern("localhost").is_ok());

        assert!(validate_domain_pattern("").is_err());
        assert!(validate_domain_pattern("*.").is_err());
        assert!(validate_domain_pattern(".example.com").is_err());
        assert!(validate_domain_pattern("example.com.").is_err());
        assert!(validate_domain_pattern("exa mple.com").is_err());
    }

    #[test]
    fn test_max_depth_bounds() {
        assert_eq!(validate_max_depth(0).unwrap(), 0);
        assert_eq!(validate_max_depth(10).unwrap(), 10);
        assert!(matches!(
            validate_max_depth(11),
            Err(ConfigError::Validation(_))
        ));
        assert!(validate_max_depth(-1).is_err());
    }

    #[test]
    fn test_start_url_required_and_parsed() {
        assert!(validate_start_url(None).is_err());
        assert!(validate_start_url(Some("   ")).is_err());
        assert!(matches!(
            validate_start_url(Some("not a url")),
            Err(ConfigError::InvalidUrl(_))
        ));
        assert!(validate_start_url(Some("ftp://example.com/")).is_err());

        let url = validate_start_url(Some("https://Example.com/#top")).unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_file_types_validation() {
        assert!(validate_file_types(&FileTypePolicy::All).is_ok());
        assert!(validate_file_types(&FileTypePolicy::parse("pdf, docx")).is_ok());
        assert!(validate_file_types(&FileTypePolicy::parse(" , ")).is_err());
        assert!(validate_file_types(&FileTypePolicy::parse("tar.gz")).is_err());
    }

    #[test]
    fn test_external_entries() {
        assert!(validate_external_entries(&["partner.com".to_string()]).is_ok());
        assert!(validate_external_entries(&["https://partner.com".to_string()]).is_ok());
        assert!(validate_external_entries(&["*.cdn.net".to_string()]).is_ok());
        assert!(validate_external_entries(&["https://".to_string()]).is_err());
        assert!(validate_external_entries(&["bad domain".to_string()]).is_err());
    }

    #[test]
    fn test_user_agent_validation() {
        assert!(validate_user_agent(&UserAgentConfig::default()).is_ok());

        let bad = UserAgentConfig {
            crawler_name: "bad name".to_string(),
            ..UserAgentConfig::default()
        };
        assert!(validate_user_agent(&bad).is_err());
    }

    #[test]
    fn test_fetch_validation() {
        assert!(validate_fetch(&FetchConfig::default()).is_ok());
        assert!(validate_fetch(&FetchConfig { timeout_secs: 0 }).is_err());
    }
}
