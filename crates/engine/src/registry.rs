//! Currency registry: the immutable table every detector reads from.
//!
//! The registry is built once from [`CurrencyRecord`]s (the built-in table or a
//! JSON file) and then shared read-only, usually behind an `Arc`. Building it
//! precomputes two longest-first pattern indexes so that detection never has
//! to decide at the call site which keyword is more specific:
//!
//! - symbols: each primary symbol plus every keyword that contains punctuation
//!   or a currency sign (`Rs.`, `US$`, `د.إ`);
//! - keywords: every other keyword, folded to NFC lower-case.
//!
//! A pattern can belong to several currencies (`dollars`, `¥`). Its owners are
//! stored in tie-break order: common currencies first, then declaration order.
use std::{collections::HashMap, path::Path};

use crate::{
    CurrencyCode, CurrencyDefinition, CurrencyRecord, EngineError,
    text::fold,
};

/// Currencies that win ties against every other currency.
pub const COMMON_CURRENCIES: [&str; 6] = ["AED", "USD", "EUR", "GBP", "INR", "SAR"];

const BUILTIN_CURRENCIES: &str = include_str!("../data/currencies.json");

/// A matchable string and the currencies it stands for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Pattern {
    pub text: String,
    pub chars: usize,
    /// Registry indexes, best candidate first.
    pub owners: Vec<usize>,
}

#[derive(Clone, Debug)]
pub struct CurrencyRegistry {
    definitions: Vec<CurrencyDefinition>,
    by_code: HashMap<CurrencyCode, usize>,
    common: Vec<bool>,
    symbols: Vec<Pattern>,
    keywords: Vec<Pattern>,
}

impl CurrencyRegistry {
    /// Validates the records and builds the lookup indexes.
    pub fn new(records: Vec<CurrencyRecord>) -> Result<Self, EngineError> {
        if records.is_empty() {
            return Err(EngineError::InvalidCurrency(
                "currency registry is empty".to_string(),
            ));
        }

        let mut definitions = Vec::with_capacity(records.len());
        let mut by_code = HashMap::with_capacity(records.len());
        for record in records {
            let definition = CurrencyDefinition::try_from(record)?;
            if by_code.contains_key(&definition.code) {
                return Err(EngineError::DuplicateCurrency(
                    definition.code.to_string(),
                ));
            }
            by_code.insert(definition.code.clone(), definitions.len());
            definitions.push(definition);
        }

        let common = definitions
            .iter()
            .map(|d| COMMON_CURRENCIES.contains(&d.code.as_str()))
            .collect::<Vec<_>>();

        let mut symbols: Vec<(String, Vec<usize>)> = Vec::new();
        let mut keywords: Vec<(String, Vec<usize>)> = Vec::new();
        for (idx, definition) in definitions.iter().enumerate() {
            let code = definition.code.as_str().to_ascii_lowercase();
            let symbol = fold(&definition.symbol);
            let letter_symbol = symbol.chars().all(char::is_alphabetic);

            add_owner(&mut symbols, symbol.clone(), idx);
            for keyword in &definition.keywords {
                let keyword = fold(keyword);
                if keyword == code {
                    continue;
                }
                if is_symbol_like(&keyword) {
                    add_owner(&mut symbols, keyword.clone(), idx);
                }
                if letter_symbol && keyword == symbol {
                    continue;
                }
                add_owner(&mut keywords, keyword, idx);
            }
        }

        let rank = |idx: &usize| (!common[*idx], *idx);
        let symbols = into_patterns(symbols, rank);
        let keywords = into_patterns(keywords, rank);

        tracing::debug!(
            "currency registry built: {} currencies, {} symbols, {} keywords",
            definitions.len(),
            symbols.len(),
            keywords.len()
        );

        Ok(Self {
            definitions,
            by_code,
            common,
            symbols,
            keywords,
        })
    }

    /// The table shipped with the crate.
    pub fn builtin() -> Result<Self, EngineError> {
        Self::from_json_str(BUILTIN_CURRENCIES)
    }

    /// Builds the registry from a JSON array of [`CurrencyRecord`]s.
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let records: Vec<CurrencyRecord> = serde_json::from_str(json)?;
        Self::new(records)
    }

    /// Reads a JSON array of [`CurrencyRecord`]s from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        tracing::debug!("loading currency registry from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    #[must_use]
    pub fn get(&self, code: &CurrencyCode) -> Option<&CurrencyDefinition> {
        self.by_code.get(code).map(|idx| &self.definitions[*idx])
    }

    /// Case-insensitive lookup by code string.
    #[must_use]
    pub fn lookup(&self, code: &str) -> Option<&CurrencyDefinition> {
        CurrencyCode::try_from(code)
            .ok()
            .and_then(|code| self.get(&code))
    }

    #[must_use]
    pub fn contains(&self, code: &CurrencyCode) -> bool {
        self.by_code.contains_key(code)
    }

    /// Definitions in declaration order.
    #[must_use]
    pub fn definitions(&self) -> &[CurrencyDefinition] {
        &self.definitions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// `true` for the members of [`COMMON_CURRENCIES`] present in this registry.
    #[must_use]
    pub fn is_common(&self, code: &CurrencyCode) -> bool {
        self.by_code.get(code).is_some_and(|idx| self.common[*idx])
    }

    /// Currency whose configured locale matches `locale`.
    ///
    /// Accepts `en-AE`, `en_AE` or `ar_ae`. An exact locale match wins, then
    /// a region match; ties follow the usual order (common first, then
    /// declaration order).
    #[must_use]
    pub fn currency_for_locale(&self, locale: &str) -> Option<&CurrencyCode> {
        let wanted = normalize_locale(locale)?;
        let wanted_region = region(&wanted);

        let mut exact: Option<usize> = None;
        let mut by_region: Option<usize> = None;
        for (idx, definition) in self.definitions.iter().enumerate() {
            let Some(candidate) = definition.locale.as_deref().and_then(normalize_locale) else {
                continue;
            };
            if candidate == wanted {
                exact = Some(self.better(exact, idx));
            } else if wanted_region.is_some() && region(&candidate) == wanted_region {
                by_region = Some(self.better(by_region, idx));
            }
        }
        exact
            .or(by_region)
            .map(|idx| &self.definitions[idx].code)
    }

    pub(crate) fn definition(&self, idx: usize) -> &CurrencyDefinition {
        &self.definitions[idx]
    }

    pub(crate) fn is_common_at(&self, idx: usize) -> bool {
        self.common[idx]
    }

    pub(crate) fn symbols(&self) -> &[Pattern] {
        &self.symbols
    }

    pub(crate) fn keywords(&self) -> &[Pattern] {
        &self.keywords
    }

    /// `true` when `text` (folded) is a symbol or keyword of some currency.
    pub(crate) fn has_pattern(&self, text: &str) -> bool {
        self.symbols
            .iter()
            .chain(&self.keywords)
            .any(|pattern| pattern.text == text)
    }

    /// Registry index of a lower-case code.
    pub(crate) fn code_index(&self, lower: &str) -> Option<usize> {
        if lower.len() != 3 {
            return None;
        }
        CurrencyCode::try_from(lower)
            .ok()
            .and_then(|code| self.by_code.get(&code).copied())
    }

    fn better(&self, current: Option<usize>, candidate: usize) -> usize {
        match current {
            Some(idx) if (!self.common[idx], idx) <= (!self.common[candidate], candidate) => idx,
            _ => candidate,
        }
    }
}

fn add_owner(entries: &mut Vec<(String, Vec<usize>)>, text: String, idx: usize) {
    if text.is_empty() {
        return;
    }
    // Symbols compare ASCII-case-insensitively, so `kr` and `KR` are one entry.
    let key = text.to_ascii_lowercase();
    match entries.iter_mut().find(|(existing, _)| *existing == key) {
        Some((_, owners)) => {
            if !owners.contains(&idx) {
                owners.push(idx);
            }
        }
        None => entries.push((key, vec![idx])),
    }
}

fn into_patterns<F>(entries: Vec<(String, Vec<usize>)>, rank: F) -> Vec<Pattern>
where
    F: Fn(&usize) -> (bool, usize),
{
    let mut patterns: Vec<Pattern> = entries
        .into_iter()
        .map(|(text, mut owners)| {
            owners.sort_by_key(&rank);
            Pattern {
                chars: text.chars().count(),
                text,
                owners,
            }
        })
        .collect();
    patterns.sort_by(|a, b| b.chars.cmp(&a.chars).then_with(|| a.text.cmp(&b.text)));
    patterns
}

fn is_symbol_like(keyword: &str) -> bool {
    keyword
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace())
}

fn normalize_locale(locale: &str) -> Option<String> {
    let trimmed = locale.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.replace('-', "_").to_ascii_lowercase())
}

fn region(locale: &str) -> Option<&str> {
    locale
        .rsplit_once('_')
        .map(|(_, region)| region)
        .filter(|region| region.len() == 2)
}
