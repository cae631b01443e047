//! Transcript to [`ExpenseCommand`].

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    AmountCurrencyExtractor, Category, CategoryClassifier, CurrencyCode, CurrencyDetector,
    CurrencyRegistry, EngineError, ParseError, Settings, extractor::DEFAULT_MAX_AMOUNT, numbers,
    text::collapse_whitespace,
};

/// A fully parsed expense.
///
/// A value of this type always carries an amount and a currency; anything
/// less is a [`ParseError`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseCommand {
    /// Greater than zero, at most the configured maximum, two decimal places.
    pub amount: Decimal,
    pub currency_code: CurrencyCode,
    pub category: Category,
    pub merchant: Option<String>,
    pub raw_transcript: String,
}

/// Words that open a merchant phrase.
const MERCHANT_MARKERS: &[&str] = &["at", "from"];
const ARTICLES: &[&str] = &["the", "a", "an"];
/// Words that end a merchant phrase.
const STOP_WORDS: &[&str] = &[
    "for", "on", "in", "with", "using", "via", "by", "and", "or", "to", "but", "then", "because",
    "after", "before", "while", "when", "today", "yesterday", "tonight", "tomorrow", "this",
    "last", "morning", "afternoon", "evening", "my", "our", "your", "his", "her", "their",
];
const MAX_MERCHANT_WORDS: usize = 5;

/// Turns a voice transcript into an [`ExpenseCommand`].
///
/// ```rust
/// use voice_engine::{Category, CurrencyCode, VoiceCommandProcessor};
///
/// let processor = VoiceCommandProcessor::builder().build().unwrap();
/// let aed = CurrencyCode::try_from("AED").unwrap();
/// let expense = processor
///     .process_voice_command("paid 100 dollars at Amazon", None, Some(&aed))
///     .unwrap();
/// assert_eq!(expense.amount.to_string(), "100.00");
/// assert_eq!(expense.currency_code, "USD");
/// assert_eq!(expense.category, Category::Shopping);
/// assert_eq!(expense.merchant.as_deref(), Some("Amazon"));
/// ```
#[derive(Clone, Debug)]
pub struct VoiceCommandProcessor {
    extractor: AmountCurrencyExtractor,
    classifier: CategoryClassifier,
    default_currency: Option<CurrencyCode>,
    infer_currency_from_locale: bool,
}

impl VoiceCommandProcessor {
    /// Return a builder for `VoiceCommandProcessor`.
    pub fn builder() -> VoiceCommandProcessorBuilder {
        VoiceCommandProcessorBuilder::default()
    }

    /// Builds a processor from loaded [`Settings`].
    pub fn from_settings(settings: &Settings) -> Result<Self, EngineError> {
        let registry = match settings.currencies_path.as_deref() {
            Some(path) => CurrencyRegistry::from_path(path)?,
            None => CurrencyRegistry::builtin()?,
        };
        // Map order is random; sort so that overlapping aliases resolve the
        // same way on every run.
        let mut aliases: Vec<(String, String)> = settings
            .category_aliases
            .iter()
            .map(|(alias, category)| (alias.clone(), category.clone()))
            .collect();
        aliases.sort();

        let mut builder = Self::builder()
            .registry(Arc::new(registry))
            .max_amount(settings.max_amount)
            .category_aliases(aliases)
            .infer_currency_from_locale(settings.infer_currency_from_locale);
        if let Some(code) = settings.default_currency.as_deref() {
            builder = builder.default_currency(CurrencyCode::try_from(code)?);
        }
        builder.build()
    }

    #[must_use]
    pub fn registry(&self) -> &CurrencyRegistry {
        self.extractor.detector().registry()
    }

    #[must_use]
    pub fn extractor(&self) -> &AmountCurrencyExtractor {
        &self.extractor
    }

    #[must_use]
    pub fn classifier(&self) -> &CategoryClassifier {
        &self.classifier
    }

    /// Parses one transcript.
    ///
    /// The currency is the one named in the transcript, else
    /// `default_currency`, else the processor's configured default, else
    /// (when enabled) the currency of `locale`.
    pub fn process_voice_command(
        &self,
        command: &str,
        locale: Option<&str>,
        default_currency: Option<&CurrencyCode>,
    ) -> Result<ExpenseCommand, ParseError> {
        let result = self.process(command, locale, default_currency);
        match &result {
            Ok(expense) => tracing::debug!(
                "voice command parsed: {} {} category={} merchant={:?}",
                expense.amount,
                expense.currency_code,
                expense.category,
                expense.merchant
            ),
            Err(err) => tracing::debug!("voice command rejected: {}", err.code()),
        }
        result
    }

    fn process(
        &self,
        command: &str,
        locale: Option<&str>,
        default_currency: Option<&CurrencyCode>,
    ) -> Result<ExpenseCommand, ParseError> {
        let transcript = collapse_whitespace(command);
        if transcript.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let extraction = self.extractor.extract(&transcript)?;
        let currency_code = extraction
            .currency
            .map(|detected| detected.code)
            .or_else(|| default_currency.cloned())
            .or_else(|| self.default_currency.clone())
            .or_else(|| self.locale_currency(locale))
            .ok_or(ParseError::UnresolvedCurrency)?;

        Ok(ExpenseCommand {
            amount: extraction.amount,
            currency_code,
            category: self.classifier.classify(&transcript),
            merchant: self.capture_merchant(&transcript),
            raw_transcript: command.to_string(),
        })
    }

    fn locale_currency(&self, locale: Option<&str>) -> Option<CurrencyCode> {
        if !self.infer_currency_from_locale {
            return None;
        }
        self.registry().currency_for_locale(locale?).cloned()
    }

    /// Words after "at"/"from", in the transcript's casing.
    fn capture_merchant(&self, transcript: &str) -> Option<String> {
        let words: Vec<&str> = transcript.split(' ').collect();
        words
            .iter()
            .enumerate()
            .filter(|(_, word)| MERCHANT_MARKERS.contains(&word.to_lowercase().as_str()))
            .find_map(|(i, _)| self.merchant_after(&words[i + 1..]))
    }

    fn merchant_after(&self, words: &[&str]) -> Option<String> {
        let mut rest = words;
        if let Some((first, tail)) = rest.split_first()
            && ARTICLES.contains(&trim_word(first).to_lowercase().as_str())
        {
            rest = tail;
        }

        let detector = self.extractor.detector();
        let mut merchant: Vec<&str> = Vec::new();
        for word in rest {
            let core = trim_word(word);
            let lower = core.to_lowercase();
            let stop = core.is_empty()
                || STOP_WORDS.contains(&lower.as_str())
                || core.chars().any(|c| c.is_ascii_digit())
                || numbers::contains_number_phrase(core)
                || detector.contains_currency(core)
                || (!merchant.is_empty() && self.classifier.is_keyword(core));
            if stop {
                break;
            }
            merchant.push(core);
            if ends_clause(word) || merchant.len() == MAX_MERCHANT_WORDS {
                break;
            }
        }

        if merchant.is_empty() {
            None
        } else {
            Some(merchant.join(" "))
        }
    }
}

fn trim_word(word: &str) -> &str {
    word.trim_matches(|c: char| {
        matches!(c, ',' | '.' | '!' | '?' | ';' | ':' | '"' | '(' | ')')
    })
}

fn ends_clause(word: &str) -> bool {
    word.ends_with([',', '.', '!', '?', ';', ':'])
}

/// Builder for [`VoiceCommandProcessor`].
#[derive(Debug, Default)]
pub struct VoiceCommandProcessorBuilder {
    registry: Option<Arc<CurrencyRegistry>>,
    max_amount: Option<Decimal>,
    category_aliases: Vec<(String, String)>,
    default_currency: Option<CurrencyCode>,
    infer_currency_from_locale: bool,
}

impl VoiceCommandProcessorBuilder {
    /// Shared currency registry; the built-in table when not set.
    pub fn registry(mut self, registry: Arc<CurrencyRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn max_amount(mut self, max_amount: Decimal) -> Self {
        self.max_amount = Some(max_amount);
        self
    }

    pub fn category_alias(mut self, alias: impl Into<String>, category: impl Into<String>) -> Self {
        self.category_aliases.push((alias.into(), category.into()));
        self
    }

    pub fn category_aliases<I, K, V>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.category_aliases
            .extend(aliases.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn default_currency(mut self, code: CurrencyCode) -> Self {
        self.default_currency = Some(code);
        self
    }

    pub fn infer_currency_from_locale(mut self, enabled: bool) -> Self {
        self.infer_currency_from_locale = enabled;
        self
    }

    /// Construct `VoiceCommandProcessor`.
    pub fn build(self) -> Result<VoiceCommandProcessor, EngineError> {
        let registry = match self.registry {
            Some(registry) => registry,
            None => Arc::new(CurrencyRegistry::builtin()?),
        };
        let max_amount = self.max_amount.unwrap_or(DEFAULT_MAX_AMOUNT);
        if max_amount <= Decimal::ZERO {
            return Err(EngineError::InvalidSettings(format!(
                "max_amount must be positive, got {max_amount}"
            )));
        }

        let classifier = CategoryClassifier::with_aliases(self.category_aliases)?;

        tracing::debug!(
            "voice command processor ready: {} currencies, max amount {}",
            registry.len(),
            max_amount
        );

        Ok(VoiceCommandProcessor {
            extractor: AmountCurrencyExtractor::new(CurrencyDetector::new(registry))
                .with_max_amount(max_amount),
            classifier,
            default_currency: self.default_currency,
            infer_currency_from_locale: self.infer_currency_from_locale,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor() -> VoiceCommandProcessor {
        VoiceCommandProcessor::builder().build().unwrap()
    }

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::try_from(s).unwrap()
    }

    fn merchant(text: &str) -> Option<String> {
        processor().capture_merchant(text)
    }

    #[test]
    fn processor_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<VoiceCommandProcessor>();
    }

    #[test]
    fn merchant_after_at_or_from() {
        assert_eq!(merchant("paid 100 dollars at Amazon").as_deref(), Some("Amazon"));
        assert_eq!(
            merchant("two thousand five hundred dirhams on groceries at Carrefour").as_deref(),
            Some("Carrefour")
        );
        assert_eq!(
            merchant("bought shoes from Foot Locker yesterday").as_deref(),
            Some("Foot Locker")
        );
    }

    #[test]
    fn merchant_skips_article_and_stops_at_boundaries() {
        assert_eq!(
            merchant("lunch at the Cheesecake Factory for 200 dirhams").as_deref(),
            Some("Cheesecake Factory")
        );
        assert_eq!(
            merchant("coffee at Blue Bottle, 5 dollars").as_deref(),
            Some("Blue Bottle")
        );
        assert_eq!(merchant("at Joe's Diner 20 dollars").as_deref(), Some("Joe's Diner"));
        assert_eq!(merchant("dinner at Nobu and drinks").as_deref(), Some("Nobu"));
        assert_eq!(
            merchant("at Sakura Japanese Ramen House Downtown Branch").as_deref(),
            Some("Sakura Japanese Ramen House Downtown")
        );
    }

    #[test]
    fn merchant_stops_at_category_keyword_after_first_word() {
        assert_eq!(merchant("at Carrefour groceries").as_deref(), Some("Carrefour"));
        assert_eq!(merchant("at Lulu hypermarket").as_deref(), Some("Lulu"));
    }

    #[test]
    fn no_merchant() {
        assert_eq!(merchant("I spent 50 on groceries"), None);
        assert_eq!(merchant("paid at 5 pm"), None);
        assert_eq!(merchant("paid from my card"), None);
        assert_eq!(merchant("it was at"), None);
    }

    #[test]
    fn currency_fallback_chain() {
        let processor = VoiceCommandProcessor::builder()
            .default_currency(code("EUR"))
            .infer_currency_from_locale(true)
            .build()
            .unwrap();
        let expense = processor
            .process_voice_command("spent 10 on lunch", Some("hi_IN"), Some(&code("AED")))
            .unwrap();
        assert_eq!(expense.currency_code, "AED");
        let expense = processor
            .process_voice_command("spent 10 on lunch", Some("hi_IN"), None)
            .unwrap();
        assert_eq!(expense.currency_code, "EUR");

        let processor = VoiceCommandProcessor::builder()
            .infer_currency_from_locale(true)
            .build()
            .unwrap();
        let expense = processor
            .process_voice_command("spent 10 on lunch", Some("en-IN"), None)
            .unwrap();
        assert_eq!(expense.currency_code, "INR");
        assert_eq!(
            processor.process_voice_command("spent 10 on lunch", None, None),
            Err(ParseError::UnresolvedCurrency)
        );
    }

    #[test]
    fn locale_is_ignored_unless_enabled() {
        assert_eq!(
            processor().process_voice_command("spent 10 on lunch", Some("hi_IN"), None),
            Err(ParseError::UnresolvedCurrency)
        );
    }

    #[test]
    fn missing_amount_is_reported_before_currency() {
        assert_eq!(
            processor().process_voice_command("lunch at Nobu", None, None),
            Err(ParseError::MissingAmount)
        );
    }

    #[test]
    fn whitespace_is_empty_input() {
        assert_eq!(
            processor().process_voice_command(" \t\n ", None, Some(&code("AED"))),
            Err(ParseError::EmptyInput)
        );
    }

    #[test]
    fn builder_aliases_and_max() {
        let processor = VoiceCommandProcessor::builder()
            .category_alias("corner shop", "Groceries")
            .max_amount(Decimal::from(100))
            .build()
            .unwrap();
        let expense = processor
            .process_voice_command("40 dirhams at the corner shop", None, None)
            .unwrap();
        assert_eq!(expense.category, Category::Groceries);
        assert!(matches!(
            processor.process_voice_command("400 dirhams", None, None),
            Err(ParseError::AmountOutOfRange { .. })
        ));
    }

    #[test]
    fn builder_rejects_bad_input() {
        assert!(matches!(
            VoiceCommandProcessor::builder().max_amount(Decimal::ZERO).build(),
            Err(EngineError::InvalidSettings(_))
        ));
        assert!(matches!(
            VoiceCommandProcessor::builder()
                .category_alias("thing", "Misc")
                .build(),
            Err(EngineError::InvalidCategory(_))
        ));
    }

    #[test]
    fn from_settings_reads_defaults() {
        let settings = Settings {
            default_currency: Some("sar".to_string()),
            ..Settings::default()
        };
        let processor = VoiceCommandProcessor::from_settings(&settings).unwrap();
        let expense = processor
            .process_voice_command("fifty for parking", None, None)
            .unwrap();
        assert_eq!(expense.currency_code, "SAR");
        assert_eq!(expense.category, Category::Transport);

        let settings = Settings {
            default_currency: Some("riyal".to_string()),
            ..Settings::default()
        };
        assert!(matches!(
            VoiceCommandProcessor::from_settings(&settings),
            Err(EngineError::InvalidCurrency(_))
        ));
    }

    #[test]
    fn expense_serializes_with_amount_as_string() {
        let expense = processor()
            .process_voice_command("paid 100 dollars at Amazon", None, None)
            .unwrap();
        let json = serde_json::to_value(&expense).unwrap();
        assert_eq!(json["amount"], "100.00");
        assert_eq!(json["currencyCode"], "USD");
        assert_eq!(json["category"], "Shopping");
        assert_eq!(json["merchant"], "Amazon");
        assert_eq!(json["rawTranscript"], "paid 100 dollars at Amazon");

        let back: ExpenseCommand = serde_json::from_value(json).unwrap();
        assert_eq!(back, expense);
    }
}
