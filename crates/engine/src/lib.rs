//! Voice transcript to expense parsing.
//!
//! A spoken sentence such as "I just spent two thousand five hundred dirhams
//! on groceries at Carrefour" becomes an [`ExpenseCommand`] with an amount, an
//! ISO 4217 currency code, a [`Category`] and an optional merchant. Anything
//! short of an amount and a currency is a typed [`ParseError`].
//!
//! ```rust
//! use voice_engine::{Category, CurrencyCode, VoiceCommandProcessor};
//!
//! let processor = VoiceCommandProcessor::builder().build().unwrap();
//! let aed = CurrencyCode::try_from("AED").unwrap();
//!
//! let expense = processor
//!     .process_voice_command(
//!         "I just spent two thousand five hundred dirhams on groceries at Carrefour",
//!         None,
//!         Some(&aed),
//!     )
//!     .unwrap();
//! assert_eq!(expense.amount.to_string(), "2500.00");
//! assert_eq!(expense.currency_code, "AED");
//! assert_eq!(expense.category, Category::Groceries);
//! assert_eq!(expense.merchant.as_deref(), Some("Carrefour"));
//! ```
//!
//! The [`CurrencyRegistry`] is built once and shared through an `Arc`; every
//! other type is a cheap, immutable view over it, so a processor can be used
//! from many threads at once.
pub use categories::{Category, CategoryClassifier};
pub use currency::{CurrencyCode, CurrencyDefinition, CurrencyRecord, DetectedCurrency, MatchKind};
pub use detector::CurrencyDetector;
pub use error::{EngineError, ParseError};
pub use extractor::{AmountCurrencyExtractor, DEFAULT_MAX_AMOUNT, Extraction};
pub use processor::{ExpenseCommand, VoiceCommandProcessor, VoiceCommandProcessorBuilder};
pub use registry::{COMMON_CURRENCIES, CurrencyRegistry};
pub use settings::{DEFAULT_CONFIG_PATH, Settings};

mod categories;
mod currency;
mod detector;
mod error;
mod extractor;
pub mod numbers;
mod processor;
mod registry;
mod settings;
mod text;
