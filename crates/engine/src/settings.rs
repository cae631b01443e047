//! Engine settings, layered from an optional TOML file and `VOICE_ENGINE__*`
//! environment variables.

use std::collections::HashMap;

use config::{Config, Environment, File, FileFormat};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{EngineError, extractor::DEFAULT_MAX_AMOUNT};

pub const DEFAULT_CONFIG_PATH: &str = "config/engine.toml";
const ENV_PREFIX: &str = "VOICE_ENGINE";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Largest accepted amount.
    pub max_amount: Decimal,
    /// JSON currency table; the built-in one when unset.
    pub currencies_path: Option<String>,
    /// Used when a transcript names no currency and the caller passes none.
    pub default_currency: Option<String>,
    /// Fall back to the currency of the caller's locale.
    pub infer_currency_from_locale: bool,
    /// `alias → category name`, consulted before the built-in keywords.
    pub category_aliases: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_amount: DEFAULT_MAX_AMOUNT,
            currencies_path: None,
            default_currency: None,
            infer_currency_from_locale: false,
            category_aliases: HashMap::new(),
        }
    }
}

impl Settings {
    /// Reads `path` (or [`DEFAULT_CONFIG_PATH`]) when it exists, then the
    /// environment.
    pub fn load(path: Option<&str>) -> Result<Self, EngineError> {
        let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
        let builder = Config::builder()
            .add_source(File::with_name(config_path).required(false))
            .add_source(env_source());
        let settings: Settings = builder.build()?.try_deserialize()?;
        tracing::debug!("settings loaded from {config_path}");
        settings.validated()
    }

    /// Parses settings from TOML text, then applies the environment.
    pub fn from_toml_str(toml: &str) -> Result<Self, EngineError> {
        let builder = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .add_source(env_source());
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validated()
    }

    fn validated(self) -> Result<Self, EngineError> {
        if self.max_amount <= Decimal::ZERO {
            return Err(EngineError::InvalidSettings(format!(
                "max_amount must be positive, got {}",
                self.max_amount
            )));
        }
        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX).separator("__")
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn defaults_apply_to_empty_file() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.max_amount, Decimal::from_str("999999999999.99").unwrap());
    }

    #[test]
    fn toml_values_override_defaults() {
        let settings = Settings::from_toml_str(
            r#"
            max_amount = "5000"
            default_currency = "AED"
            infer_currency_from_locale = true

            [category_aliases]
            "corner shop" = "Groceries"
            "#,
        )
        .unwrap();
        assert_eq!(settings.max_amount, Decimal::from(5000));
        assert_eq!(settings.default_currency.as_deref(), Some("AED"));
        assert!(settings.infer_currency_from_locale);
        assert_eq!(settings.currencies_path, None);
        assert_eq!(
            settings.category_aliases.get("corner shop").map(String::as_str),
            Some("Groceries")
        );
    }

    #[test]
    fn non_positive_max_is_rejected() {
        let err = Settings::from_toml_str(r#"max_amount = "0""#).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSettings(_)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = Settings::load(Some("does/not/exist.toml")).unwrap();
        assert!(!settings.infer_currency_from_locale);
        assert!(settings.category_aliases.is_empty());
    }
}
