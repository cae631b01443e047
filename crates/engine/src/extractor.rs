//! Amount and currency extraction from a whole transcript.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    CurrencyCode, CurrencyDetector, DetectedCurrency, MatchKind, ParseError,
    detector::Indicator,
    numbers::{NumberSpan, PhraseError, scan},
    text::fold,
};

/// Largest amount accepted by default: 999,999,999,999.99.
pub const DEFAULT_MAX_AMOUNT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// Amount and currency found in a transcript.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extraction {
    /// Rounded half away from zero to two places, carried at scale 2.
    pub amount: Decimal,
    /// `None` when the transcript names no currency.
    pub currency: Option<DetectedCurrency>,
}

/// Finds the amount and the currency of an expense.
///
/// Currency symbols are first rewritten as codes (`₹ 20` → `INR20`) so a
/// symbol never splits or hides a numeral. When the transcript holds several
/// numbers, the first one written right next to a currency symbol, code or
/// keyword is the amount ("2 coffees for 30 dirhams" → 30), and that mention
/// is the currency. Otherwise the first number that resolves is the amount
/// and the currency is whatever [`CurrencyDetector::detect`] finds.
#[derive(Clone, Debug)]
pub struct AmountCurrencyExtractor {
    detector: CurrencyDetector,
    max_amount: Decimal,
}

impl AmountCurrencyExtractor {
    #[must_use]
    pub fn new(detector: CurrencyDetector) -> Self {
        Self {
            detector,
            max_amount: DEFAULT_MAX_AMOUNT,
        }
    }

    #[must_use]
    pub fn with_max_amount(mut self, max_amount: Decimal) -> Self {
        self.max_amount = max_amount;
        self
    }

    #[must_use]
    pub fn detector(&self) -> &CurrencyDetector {
        &self.detector
    }

    #[must_use]
    pub fn max_amount(&self) -> Decimal {
        self.max_amount
    }

    /// Amount plus detected (or `default`) currency.
    ///
    /// `None` when there is no amount, or no currency and no default. No
    /// range check is applied.
    #[must_use]
    pub fn extract_amount_and_currency(
        &self,
        text: &str,
        default: Option<&CurrencyCode>,
    ) -> Option<(Decimal, CurrencyCode)> {
        let (amount, anchor) = self.amount(text).ok()?;
        let currency = match anchor {
            Some(detected) => detected.code,
            None => self.detector.detect_currency(text, default)?,
        };
        Some((amount, currency))
    }

    /// Typed extraction: the amount is rounded and range checked, the
    /// currency is left unresolved when the text names none.
    pub fn extract(&self, text: &str) -> Result<Extraction, ParseError> {
        let (raw, anchor) = self.amount(text).map_err(|err| match err {
            PhraseError::NoNumber => ParseError::MissingAmount,
            PhraseError::Ambiguous => ParseError::AmbiguousNumberPhrase,
            PhraseError::Overflow => ParseError::AmountOutOfRange {
                amount: Decimal::MAX,
                max: self.max_amount,
            },
        })?;

        let mut amount = raw.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        if amount <= Decimal::ZERO || amount > self.max_amount {
            return Err(ParseError::AmountOutOfRange {
                amount,
                max: self.max_amount,
            });
        }
        amount.rescale(2);

        Ok(Extraction {
            amount,
            currency: anchor.or_else(|| self.detector.detect(text)),
        })
    }

    /// The amount, and the currency written next to it when there is one.
    fn amount(&self, text: &str) -> Result<(Decimal, Option<DetectedCurrency>), PhraseError> {
        let (rewritten, symbols) = self.detector.rewrite_symbols(&fold(text));
        let folded = rewritten.to_ascii_lowercase();
        let spans = scan(&folded);
        let mut indicators = self.detector.indicators(&folded);
        for indicator in &mut indicators {
            if symbols.contains(&(indicator.start, indicator.end)) {
                indicator.currency.match_kind = MatchKind::Symbol;
            }
        }

        let anchored = spans.iter().find_map(|span| {
            let value = span.value.ok()?;
            let indicator = anchor(&folded, span, &indicators)?;
            Some((value, Some(indicator.currency.clone())))
        });
        if let Some(found) = anchored {
            return Ok(found);
        }
        if let Some(amount) = spans.iter().find_map(|span| span.value.ok()) {
            return Ok((amount, None));
        }

        // Nothing resolved: report the first failure.
        match spans.iter().find_map(|span| span.value.err()) {
            Some(err) => Err(err),
            None => Err(PhraseError::NoNumber),
        }
    }
}

/// Currency mention separated from the span by whitespace only.
///
/// A glued mention (`usd50`, `50aed`) beats a spaced one, and a mention after
/// the number beats one before it.
fn anchor<'a>(
    text: &str,
    span: &NumberSpan,
    indicators: &'a [Indicator],
) -> Option<&'a Indicator> {
    indicators
        .iter()
        .filter_map(|indicator| {
            if indicator.end <= span.start && text[indicator.end..span.start].trim().is_empty() {
                Some(((indicator.end < span.start, true), indicator))
            } else if span.end <= indicator.start
                && text[span.end..indicator.start].trim().is_empty()
            {
                Some(((span.end < indicator.start, false), indicator))
            } else {
                None
            }
        })
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, indicator)| indicator)
}
