//! Webhook processing configuration

use serde::Deserialize;

use crate::domain::billing::FailurePolicy;

/// Webhook processing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// What to answer Stripe when fetching or persisting fails
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Maximum accepted signature age in seconds (0 disables the check)
    #[serde(default = "default_signature_tolerance")]
    pub signature_tolerance_secs: u64,
}

impl WebhookConfig {
    /// Signature tolerance, `None` when replay protection is disabled
    pub fn signature_tolerance(&self) -> Option<i64> {
        match self.signature_tolerance_secs {
            0 => None,
            secs => Some(i64::try_from(secs).unwrap_or(i64::MAX)),
        }
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::default(),
            signature_tolerance_secs: default_signature_tolerance(),
        }
    }
}

fn default_signature_tolerance() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_config_defaults() {
        let config = WebhookConfig::default();
        assert_eq!(config.failure_policy, FailurePolicy::Acknowledge);
        assert_eq!(config.signature_tolerance(), Some(300));
    }

    #[test]
    fn test_zero_tolerance_disables_check() {
        let config = WebhookConfig {
            signature_tolerance_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.signature_tolerance(), None);
    }

    #[test]
    fn test_webhook_config_deserialization() {
        let json = r#"{ "failure_policy": "retry", "signature_tolerance_secs": 600 }"#;

        let config: WebhookConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.failure_policy, FailurePolicy::Retry);
        assert_eq!(config.signature_tolerance(), Some(600));
    }
}
