//! Request throttling configuration
//!
//! One limit and window per route tier, e.g.
//! `YOGA__RATE_LIMIT__UPLOAD_LIMIT=5` and `YOGA__RATE_LIMIT__UPLOAD_WINDOW_SECS=60`.

use serde::Deserialize;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    /// Throttling is skipped entirely when false
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Authenticated session and location writes
    #[serde(default = "default_medium_limit")]
    pub medium_limit: u32,
    #[serde(default = "default_window_secs")]
    pub medium_window_secs: u32,

    /// Public reads
    #[serde(default = "default_long_limit")]
    pub long_limit: u32,
    #[serde(default = "default_window_secs")]
    pub long_window_secs: u32,

    /// Photo uploads
    #[serde(default = "default_upload_limit")]
    pub upload_limit: u32,
    #[serde(default = "default_window_secs")]
    pub upload_window_secs: u32,

    /// Photo deletions
    #[serde(default = "default_delete_limit")]
    pub delete_limit: u32,
    #[serde(default = "default_window_secs")]
    pub delete_window_secs: u32,
}

impl RateLimitSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let tiers = [
            ("medium", self.medium_limit, self.medium_window_secs),
            ("long", self.long_limit, self.long_window_secs),
            ("upload", self.upload_limit, self.upload_window_secs),
            ("delete", self.delete_limit, self.delete_window_secs),
        ];
        for (tier, limit, window) in tiers {
            if limit == 0 || window == 0 {
                return Err(ValidationError::InvalidRateLimit(tier));
            }
        }
        Ok(())
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            medium_limit: default_medium_limit(),
            medium_window_secs: default_window_secs(),
            long_limit: default_long_limit(),
            long_window_secs: default_window_secs(),
            upload_limit: default_upload_limit(),
            upload_window_secs: default_window_secs(),
            delete_limit: default_delete_limit(),
            delete_window_secs: default_window_secs(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_window_secs() -> u32 {
    60
}

fn default_medium_limit() -> u32 {
    20
}

fn default_long_limit() -> u32 {
    100
}

fn default_upload_limit() -> u32 {
    10
}

fn default_delete_limit() -> u32 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_and_enabled() {
        let settings = RateLimitSettings::default();
        assert!(settings.enabled);
        assert_eq!(settings.long_limit, 100);
        assert_eq!(settings.upload_window_secs, 60);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn zero_limit_or_window_is_rejected() {
        let settings = RateLimitSettings {
            upload_limit: 0,
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(ValidationError::InvalidRateLimit("upload"))
        );

        let settings = RateLimitSettings {
            delete_window_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(ValidationError::InvalidRateLimit("delete"))
        );
    }
}
