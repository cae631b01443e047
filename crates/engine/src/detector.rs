//! Currency detection over free text.
//!
//! Three sources are tried in order and the first one that matches decides:
//!
//! 1. a symbol next to a digit (`₹20`, `$ 50`, `50 €`);
//! 2. an ISO code token (`AED`, `aed`);
//! 3. a natural-language keyword on word boundaries (`dirhams`, `swiss francs`).
//!
//! Within a source, patterns are tried longest first and a matched span is
//! consumed, so `francs` never matches inside `swiss francs`. The remaining
//! mentions never overlap and are ranked by
//!
//! - earliest position in the text,
//! - common currency ([`COMMON_CURRENCIES`](crate::COMMON_CURRENCIES)) first,
//! - registry declaration order,
//!
//! which is a total order: the same text always resolves to the same code.
use std::sync::Arc;

use unicode_normalization::UnicodeNormalization;

use crate::{
    CurrencyCode, CurrencyRegistry, DetectedCurrency, MatchKind,
    text::{
        digit_after, digit_before, fold, overlaps, starts_with_ignore_ascii_case, word_edges_ok,
    },
};

/// Codes that are also everyday words or well-known acronyms; they only
/// count next to a digit ("50 try", "MAD 20", "rub 300").
const AMBIGUOUS_CODE_WORDS: &[&str] = &[
    "all", "bob", "cad", "cup", "gel", "mad", "mop", "npr", "pen", "rub", "sos", "top", "try",
];

#[derive(Clone, Debug, PartialEq, Eq)]
struct Hit {
    start: usize,
    end: usize,
    /// Registry indexes, best first.
    owners: Vec<usize>,
}

/// A currency mention located in folded text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Indicator {
    pub start: usize,
    pub end: usize,
    pub currency: DetectedCurrency,
}

#[derive(Clone, Debug)]
pub struct CurrencyDetector {
    registry: Arc<CurrencyRegistry>,
}

impl CurrencyDetector {
    #[must_use]
    pub fn new(registry: Arc<CurrencyRegistry>) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &CurrencyRegistry {
        &self.registry
    }

    /// Best currency mentioned in `text`, with the source that matched.
    #[must_use]
    pub fn detect(&self, text: &str) -> Option<DetectedCurrency> {
        let folded = fold(text);
        let passes: [(MatchKind, Vec<Hit>); 3] = [
            (MatchKind::Symbol, self.symbol_hits(&folded)),
            (MatchKind::Code, self.code_hits(&folded)),
            (MatchKind::Keyword, self.keyword_hits(&folded)),
        ];
        passes.into_iter().find_map(|(match_kind, hits)| {
            self.resolve(&hits).map(|idx| DetectedCurrency {
                code: self.registry.definition(idx).code.clone(),
                match_kind,
            })
        })
    }

    /// Detected currency code, or `default` when the text names none.
    #[must_use]
    pub fn detect_currency(
        &self,
        text: &str,
        default: Option<&CurrencyCode>,
    ) -> Option<CurrencyCode> {
        self.detect(text)
            .map(|detected| detected.code)
            .or_else(|| default.cloned())
    }

    #[must_use]
    pub fn contains_currency(&self, text: &str) -> bool {
        self.detect(text).is_some()
    }

    /// Rewrites every symbol written next to a digit as its ISO code, glued
    /// to the digits: `"$ 50"` → `"USD50"`, `"50 €"` → `"50EUR"`.
    ///
    /// Symbols away from digits are left alone (`"fr. and $ signs"`).
    #[must_use]
    pub fn normalize_currency_symbols(&self, text: &str) -> String {
        let composed: String = text.nfc().collect();
        self.rewrite_symbols(&composed).0
    }

    /// Symbol rewrite plus the byte ranges of the inserted codes in the
    /// output.
    pub(crate) fn rewrite_symbols(&self, text: &str) -> (String, Vec<(usize, usize)>) {
        let hits = self.symbol_hits(text);
        let mut out = String::with_capacity(text.len() + hits.len() * 3);
        let mut inserted = Vec::with_capacity(hits.len());
        let mut cursor = 0;

        for hit in hits {
            let Some(idx) = hit.owners.first() else {
                continue;
            };
            let code = self.registry.definition(*idx).code.as_str();

            let before = &text[cursor..hit.start];
            if digit_before(text, hit.start) {
                out.push_str(before.trim_end());
            } else {
                out.push_str(before);
                if out.chars().next_back().is_some_and(char::is_alphabetic) {
                    out.push(' ');
                }
            }
            inserted.push((out.len(), out.len() + code.len()));
            out.push_str(code);

            cursor = hit.end;
            let rest = &text[cursor..];
            if digit_after(text, cursor) {
                cursor += rest.len() - rest.trim_start().len();
            } else if rest.chars().next().is_some_and(char::is_alphabetic) {
                out.push(' ');
            }
        }
        out.push_str(&text[cursor..]);
        (out, inserted)
    }

    /// Code and keyword mentions in an already folded text, each resolved to
    /// its best currency.
    pub(crate) fn indicators(&self, folded: &str) -> Vec<Indicator> {
        let codes = self
            .code_hits(folded)
            .into_iter()
            .map(|hit| (MatchKind::Code, hit));
        let keywords = self
            .keyword_hits(folded)
            .into_iter()
            .map(|hit| (MatchKind::Keyword, hit));

        codes
            .chain(keywords)
            .filter_map(|(match_kind, hit)| {
                let idx = self.resolve(std::slice::from_ref(&hit))?;
                Some(Indicator {
                    start: hit.start,
                    end: hit.end,
                    currency: DetectedCurrency {
                        code: self.registry.definition(idx).code.clone(),
                        match_kind,
                    },
                })
            })
            .collect()
    }

    fn resolve(&self, hits: &[Hit]) -> Option<usize> {
        hits.iter()
            .flat_map(|hit| hit.owners.iter().map(move |idx| (hit, *idx)))
            .min_by_key(|(hit, idx)| (hit.start, !self.registry.is_common_at(*idx), *idx))
            .map(|(_, idx)| idx)
    }

    /// Symbols with a digit on either side.
    fn symbol_hits(&self, text: &str) -> Vec<Hit> {
        let mut taken: Vec<(usize, usize)> = Vec::new();
        let mut hits = Vec::new();

        for pattern in self.registry.symbols() {
            for (start, _) in text.char_indices() {
                if !starts_with_ignore_ascii_case(&text[start..], &pattern.text) {
                    continue;
                }
                let end = start + pattern.text.len();
                if overlaps(&taken, start, end) || !word_edges_ok(text, start, end) {
                    continue;
                }
                if !digit_before(text, start) && !digit_after(text, end) {
                    continue;
                }
                if self.ends_sentence(&pattern.text, text, end) {
                    continue;
                }
                taken.push((start, end));
                hits.push(Hit {
                    start,
                    end,
                    owners: pattern.owners.clone(),
                });
            }
        }
        hits.sort_by_key(|hit| hit.start);
        hits
    }

    /// `"20 kr."`: the final dot closes the sentence when the undotted form is
    /// a pattern of its own and no digit follows.
    fn ends_sentence(&self, pattern: &str, text: &str, end: usize) -> bool {
        pattern
            .strip_suffix('.')
            .is_some_and(|undotted| !digit_after(text, end) && self.registry.has_pattern(undotted))
    }

    fn code_hits(&self, folded: &str) -> Vec<Hit> {
        let mut hits = Vec::new();
        for (start, end) in alphabetic_runs(folded) {
            let word = &folded[start..end];
            let Some(idx) = self.registry.code_index(word) else {
                continue;
            };
            if AMBIGUOUS_CODE_WORDS.contains(&word)
                && !digit_before(folded, start)
                && !digit_after(folded, end)
            {
                continue;
            }
            hits.push(Hit {
                start,
                end,
                owners: vec![idx],
            });
        }
        hits
    }

    fn keyword_hits(&self, folded: &str) -> Vec<Hit> {
        let mut taken: Vec<(usize, usize)> = Vec::new();
        let mut hits = Vec::new();

        for pattern in self.registry.keywords() {
            for (start, _) in folded.match_indices(pattern.text.as_str()) {
                let end = start + pattern.text.len();
                if overlaps(&taken, start, end) || !word_edges_ok(folded, start, end) {
                    continue;
                }
                taken.push((start, end));
                hits.push(Hit {
                    start,
                    end,
                    owners: pattern.owners.clone(),
                });
            }
        }
        hits
    }
}

fn alphabetic_runs(text: &str) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut current: Option<usize> = None;
    for (i, c) in text.char_indices() {
        match (c.is_alphabetic(), current) {
            (true, None) => current = Some(i),
            (false, Some(start)) => {
                runs.push((start, i));
                current = None;
            }
            _ => {}
        }
    }
    if let Some(start) = current {
        runs.push((start, text.len()));
    }
    runs
}
