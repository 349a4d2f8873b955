use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// apportionment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApportionConfig {
    /// fees and payments created before this date are never apportioned.
    /// None disables the cutoff.
    pub apportion_live_date: Option<DateTime<Utc>>,
}

impl ApportionConfig {
    /// apportion everything regardless of creation date
    pub fn unrestricted() -> Self {
        Self {
            apportion_live_date: None,
        }
    }

    /// apportion only fees and payments created on or after the given date
    pub fn live_from(date: DateTime<Utc>) -> Self {
        Self {
            apportion_live_date: Some(date),
        }
    }
}

impl Default for ApportionConfig {
    fn default() -> Self {
        Self::unrestricted()
    }
}

/// duplicate detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateConfig {
    /// trailing window within which a matching payment is treated as a duplicate
    pub check_interval_minutes: i64,
}

impl DuplicateConfig {
    pub fn with_interval(minutes: i64) -> Self {
        Self {
            check_interval_minutes: minutes,
        }
    }
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            check_interval_minutes: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_window_is_two_minutes() {
        assert_eq!(DuplicateConfig::default().check_interval_minutes, 2);
    }

    #[test]
    fn test_live_date_cutoff() {
        let go_live = Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap();
        let config = ApportionConfig::live_from(go_live);
        assert_eq!(config.apportion_live_date, Some(go_live));
        assert_eq!(ApportionConfig::default().apportion_live_date, None);
    }
}
