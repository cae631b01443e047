use serde::{Deserialize, Serialize};

use crate::EngineError;

/// ISO 4217 currency code, the tag every currency is identified by.
///
/// Currencies are data, not variants: the set of known codes lives in the
/// [`CurrencyRegistry`](crate::CurrencyRegistry), and this type only
/// guarantees the shape (three ASCII letters, stored upper-case).
///
/// ```rust
/// use voice_engine::CurrencyCode;
///
/// let code = CurrencyCode::try_from("aed").unwrap();
/// assert_eq!(code.as_str(), "AED");
/// assert!(CurrencyCode::try_from("dirham").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Canonical upper-case code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for CurrencyCode {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(EngineError::InvalidCurrency(format!(
                "not an ISO 4217 code: {trimmed}"
            )));
        }
        Ok(CurrencyCode(trimmed.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CurrencyCode::try_from(value.as_str())
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.0
    }
}

impl PartialEq<str> for CurrencyCode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CurrencyCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// One entry of the currency configuration file.
///
/// ```json
/// { "code": "AED", "symbol": "د.إ", "displayName": "UAE Dirham",
///   "locale": "ar_AE", "isRTL": true, "keywords": ["dirham", "dirhams"] }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyRecord {
    pub code: String,
    pub symbol: String,
    pub display_name: String,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default, rename = "isRTL")]
    pub is_rtl: bool,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// A validated currency, as held by the registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrencyDefinition {
    pub code: CurrencyCode,
    pub symbol: String,
    pub display_name: String,
    pub locale: Option<String>,
    pub is_rtl: bool,
    /// Ordered, de-duplicated, lower-case. Always contains the code and the
    /// symbol.
    pub keywords: Vec<String>,
}

impl TryFrom<CurrencyRecord> for CurrencyDefinition {
    type Error = EngineError;

    fn try_from(record: CurrencyRecord) -> Result<Self, Self::Error> {
        let code = CurrencyCode::try_from(record.code.as_str())?;
        let symbol = record.symbol.trim().to_string();
        if symbol.is_empty() {
            return Err(EngineError::InvalidCurrency(format!(
                "{code}: empty symbol"
            )));
        }

        let mut keywords: Vec<String> = Vec::with_capacity(record.keywords.len() + 2);
        let implied = [code.as_str().to_string(), symbol.clone()];
        for raw in implied.iter().chain(record.keywords.iter()) {
            let keyword = crate::text::collapse_whitespace(&raw.to_lowercase());
            if keyword.is_empty() || keywords.contains(&keyword) {
                continue;
            }
            keywords.push(keyword);
        }

        Ok(Self {
            code,
            symbol,
            display_name: record.display_name.trim().to_string(),
            locale: record.locale.filter(|l| !l.trim().is_empty()),
            is_rtl: record.is_rtl,
            keywords,
        })
    }
}

/// Which matching source resolved a currency.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// A symbol next to a digit (`₹20`, `$ 50`).
    Symbol,
    /// An ISO code token (`AED`).
    Code,
    /// A natural-language keyword (`dirhams`, `swiss francs`).
    Keyword,
}

/// Outcome of currency detection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetectedCurrency {
    pub code: CurrencyCode,
    pub match_kind: MatchKind,
}
