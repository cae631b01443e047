//! The module contains the errors the engine can return.
//!
//! There are two families:
//!
//! - [`ParseError`] is returned by a single transcript parse. Every variant is
//!   recoverable: the host is expected to prompt the user again.
//! - [`EngineError`] is returned while building the engine (settings, registry
//!   loading). It never comes out of a parse call.
use rust_decimal::Decimal;
use thiserror::Error;

/// Failure of a single voice command parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty transcript")]
    EmptyInput,
    #[error("no amount found in transcript")]
    MissingAmount,
    #[error("number phrase does not resolve to a single amount")]
    AmbiguousNumberPhrase,
    #[error("amount {amount} is out of range (must be > 0 and <= {max})")]
    AmountOutOfRange { amount: Decimal, max: Decimal },
    #[error("no currency found and no default currency supplied")]
    UnresolvedCurrency,
}

impl ParseError {
    /// Stable machine-readable identifier, meant as a key into the host's
    /// localized message tables.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            ParseError::EmptyInput => "empty_input",
            ParseError::MissingAmount => "missing_amount",
            ParseError::AmbiguousNumberPhrase => "ambiguous_number_phrase",
            ParseError::AmountOutOfRange { .. } => "amount_out_of_range",
            ParseError::UnresolvedCurrency => "unresolved_currency",
        }
    }

    /// `true` when the transcript carried no usable amount.
    ///
    /// An ambiguous number phrase is treated like a missing one.
    #[must_use]
    pub const fn is_missing_amount(&self) -> bool {
        matches!(
            self,
            ParseError::MissingAmount | ParseError::AmbiguousNumberPhrase
        )
    }
}

/// Engine setup errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),
    #[error("\"{0}\" already present!")]
    DuplicateCurrency(String),
    #[error("Invalid category: {0}")]
    InvalidCategory(String),
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidCurrency(a), Self::InvalidCurrency(b)) => a == b,
            (Self::DuplicateCurrency(a), Self::DuplicateCurrency(b)) => a == b,
            (Self::InvalidCategory(a), Self::InvalidCategory(b)) => a == b,
            (Self::InvalidSettings(a), Self::InvalidSettings(b)) => a == b,
            (Self::Config(a), Self::Config(b)) => a.to_string() == b.to_string(),
            (Self::Io(a), Self::Io(b)) => a.kind() == b.kind(),
            (Self::Json(a), Self::Json(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
