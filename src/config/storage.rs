//! Subscription storage configuration (PostgREST / Supabase)

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Project URL, e.g. `https://abc.supabase.co`
    pub url: String,

    /// Service role key used for both `apikey` and bearer auth
    pub service_role_key: String,

    /// Table holding subscription rows
    #[serde(default = "default_table")]
    pub table: String,

    /// Timeout for outbound storage calls in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

impl StorageConfig {
    /// Get HTTP timeout as Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Validate storage configuration
    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE_URL"));
        }
        if self.service_role_key.is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE_SERVICE_ROLE_KEY"));
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ValidationError::InvalidStorageUrl);
        }
        if production && !self.url.starts_with("https://") {
            return Err(ValidationError::StorageUrlMustBeHttps);
        }
        if self.table.is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE_TABLE"));
        }
        if self.http_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            service_role_key: String::new(),
            table: default_table(),
            http_timeout_secs: default_http_timeout(),
        }
    }
}

fn default_table() -> String {
    "subscriptions".to_string()
}

fn default_http_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> StorageConfig {
        StorageConfig {
            url: "https://project.supabase.co".to_string(),
            service_role_key: "service-role".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = StorageConfig::default();
        assert_eq!(config.table, "subscriptions");
        assert_eq!(config.http_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(valid().validate(true).is_ok());
    }

    #[test]
    fn test_validation_missing_url() {
        let config = StorageConfig {
            url: String::new(),
            ..valid()
        };
        assert_eq!(
            config.validate(false),
            Err(ValidationError::MissingRequired("STORAGE_URL"))
        );
    }

    #[test]
    fn test_validation_missing_key() {
        let config = StorageConfig {
            service_role_key: String::new(),
            ..valid()
        };
        assert_eq!(
            config.validate(false),
            Err(ValidationError::MissingRequired("STORAGE_SERVICE_ROLE_KEY"))
        );
    }

    #[test]
    fn test_validation_invalid_url() {
        let config = StorageConfig {
            url: "postgres://localhost".to_string(),
            ..valid()
        };
        assert_eq!(config.validate(false), Err(ValidationError::InvalidStorageUrl));
    }

    #[test]
    fn test_plain_http_only_outside_production() {
        let config = StorageConfig {
            url: "http://localhost:54321".to_string(),
            ..valid()
        };
        assert!(config.validate(false).is_ok());
        assert_eq!(
            config.validate(true),
            Err(ValidationError::StorageUrlMustBeHttps)
        );
    }
}
