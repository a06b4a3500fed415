use std::str::FromStr;

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RigError};

/// Scene settings, read from JSON. Every field is optional.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Name resolved through the skeleton source
    pub skeleton: String,
    /// Built-in clip name
    pub clip: String,
    /// Overrides the clip's loop flag
    pub looping: Option<bool>,
    /// Overrides the clip's duration (seconds)
    pub duration: Option<f32>,
    /// Log limit hits at debug level
    pub report_limit_hits: bool,
    pub log_level: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            skeleton: "body".to_string(),
            clip: "basketball_throw".to_string(),
            looping: None,
            duration: None,
            report_limit_hits: false,
            log_level: "info".to_string(),
        }
    }
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SceneConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Some(duration) = self.duration {
            if !duration.is_finite() || duration <= 0.0 {
                return Err(RigError::InvalidConfig(format!(
                    "duration must be positive, got {}",
                    duration
                )));
            }
        }
        self.level_filter()?;
        Ok(())
    }

    /// `log_level` as a filter; accepts `off`, `error` .. `trace`, any case.
    pub fn level_filter(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| RigError::InvalidConfig(format!("unknown log level '{}'", self.log_level)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = SceneConfig::from_json("{}").unwrap();
        assert_eq!(config, SceneConfig::default());
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Info);
    }

    #[test]
    fn test_overrides() {
        let json = r#"{ "looping": false, "duration": 3.5, "report_limit_hits": true, "log_level": "DEBUG" }"#;
        let config = SceneConfig::from_json(json).unwrap();
        assert_eq!(config.looping, Some(false));
        assert_eq!(config.duration, Some(3.5));
        assert!(config.report_limit_hits);
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Debug);
        assert_eq!(config.skeleton, "body");
    }

    #[test]
    fn test_invalid_values() {
        let err = SceneConfig::from_json(r#"{ "log_level": "loud" }"#).unwrap_err();
        assert!(matches!(err, RigError::InvalidConfig(_)));

        let err = SceneConfig::from_json(r#"{ "duration": -1.0 }"#).unwrap_err();
        assert!(matches!(err, RigError::InvalidConfig(_)));

        let err = SceneConfig::from_json(r#"{ "clip": 7 }"#).unwrap_err();
        assert!(matches!(err, RigError::Json(_)));
    }
}
