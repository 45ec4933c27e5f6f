//! Config - ボット設定
//!
//! JSON ファイルから読み込む。未指定の項目はデフォルト値で埋める。
//!
//! ```json
//! {
//!   "menu_channel": 645668825668517888,
//!   "rollover": { "feature": "bb", "weekday": "Sun", "hour": 0, "minute": 0 },
//!   "features": {
//!     "bb": { "approval_channel": 645668825668517888, "report_channel": 1385734566098112582 }
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use chrono::Weekday;
use serde::Deserialize;
use thiserror::Error;

use crate::report::DEFAULT_MESSAGE_LIMIT;
use crate::report::render::{DEFAULT_OFFSET_MINUTES, DEFAULT_ZONE_LABEL};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Length limit of one message, in characters.
    pub message_limit: usize,
    /// Offset of displayed timestamps from UTC, in minutes.
    pub display_offset_minutes: i32,
    pub display_zone: String,
    /// Where the request menu is posted.
    pub menu_channel: Option<u64>,
    pub rollover: RolloverSettings,
    pub features: HashMap<String, FeatureSettings>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            message_limit: DEFAULT_MESSAGE_LIMIT,
            display_offset_minutes: DEFAULT_OFFSET_MINUTES,
            display_zone: DEFAULT_ZONE_LABEL.to_string(),
            menu_channel: None,
            rollover: RolloverSettings::default(),
            features: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RolloverSettings {
    /// Feature emptied at every boundary. `None` disables the loop.
    pub feature: Option<String>,
    pub weekday: Weekday,
    pub hour: u32,
    pub minute: u32,
    pub retry_delay_secs: u64,
}

impl Default for RolloverSettings {
    fn default() -> Self {
        Self {
            feature: Some("bb".to_string()),
            weekday: Weekday::Sun,
            hour: 0,
            minute: 0,
            retry_delay_secs: 60,
        }
    }
}

impl RolloverSettings {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureSettings {
    pub approval_channel: u64,
    /// Forum thread holding the running log.
    pub report_channel: u64,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl BotConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: BotConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.message_limit == 0 {
            return Err(ConfigError::Invalid("message_limit must be positive".into()));
        }
        if self.display_offset_minutes.abs() >= 24 * 60 {
            return Err(ConfigError::Invalid(format!(
                "display_offset_minutes out of range: {}",
                self.display_offset_minutes
            )));
        }
        if self.rollover.hour > 23 || self.rollover.minute > 59 {
            return Err(ConfigError::Invalid(format!(
                "rollover time out of range: {:02}:{:02}",
                self.rollover.hour, self.rollover.minute
            )));
        }
        if self.rollover.retry_delay_secs == 0 {
            return Err(ConfigError::Invalid("rollover.retry_delay_secs must be positive".into()));
        }
        Ok(())
    }

    /// Settings of an enabled feature.
    pub fn feature(&self, key: &str) -> Option<&FeatureSettings> {
        self.features.get(key).filter(|settings| settings.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config = BotConfig::from_json("{}").unwrap();
        assert_eq!(config.message_limit, 2000);
        assert_eq!(config.display_offset_minutes, -360);
        assert_eq!(config.rollover.weekday, Weekday::Sun);
        assert_eq!(config.rollover.feature.as_deref(), Some("bb"));
        assert!(config.features.is_empty());
    }

    #[test]
    fn features_and_rollover_are_read() {
        let config = BotConfig::from_json(
            r#"{
                "rollover": { "weekday": "Sat", "hour": 23, "minute": 30 },
                "features": {
                    "bb": { "approval_channel": 1, "report_channel": 2 },
                    "loa": { "approval_channel": 1, "report_channel": 3, "enabled": false }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.rollover.weekday, Weekday::Sat);
        assert_eq!(config.rollover.retry_delay(), Duration::from_secs(60));
        assert_eq!(config.feature("bb").unwrap().report_channel, 2);
        assert!(config.feature("loa").is_none());
    }

    #[test]
    fn out_of_range_rollover_time_is_rejected() {
        let err = BotConfig::from_json(r#"{ "rollover": { "hour": 24 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(BotConfig::from_json("{"), Err(ConfigError::Parse(_))));
    }
}
