//! Spoken and written number phrases.
//!
//! Handles plain numerals (`2,500`, `1,00,000`, `99.99`) and English number
//! words across the Western (thousand, million, billion, trillion) and Indian
//! (lakh, crore) systems:
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use voice_engine::numbers;
//!
//! assert_eq!(numbers::parse("two thousand five hundred"), Some(Decimal::from(2500)));
//! assert_eq!(numbers::parse("one lakh fifty thousand"), Some(Decimal::from(150_000)));
//! assert_eq!(numbers::parse("one point two five"), Some(Decimal::new(125, 2)));
//! assert_eq!(numbers::parse("some money"), None);
//! ```
//!
//! Words accumulate in two registers. `group` collects units, teens, tens and
//! `hundred`; every larger scale word adds `group * scale` to `total` and
//! resets `group`. Scale words never multiply each other, so
//! "one lakh fifty thousand" is `100000 + 50000`.
use std::str::FromStr;

use rust_decimal::Decimal;

/// Why a span of number words has no value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PhraseError {
    NoNumber,
    Ambiguous,
    Overflow,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Token {
    Unit(u32),
    Teen(u32),
    Tens(u32),
    Hundred,
    Scale(u64),
    Point,
    And,
    Article,
    Numeral(Decimal),
    Word,
}

impl Token {
    fn is_core(self) -> bool {
        matches!(
            self,
            Token::Unit(_)
                | Token::Teen(_)
                | Token::Tens(_)
                | Token::Hundred
                | Token::Scale(_)
                | Token::Numeral(_)
        )
    }

    fn is_fraction_digit(self) -> bool {
        match self {
            Token::Unit(_) => true,
            Token::Numeral(value) => value.scale() == 0,
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Lexeme {
    token: Token,
    start: usize,
    end: usize,
}

/// Byte range of a number phrase inside the scanned text, with its value.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct NumberSpan {
    pub start: usize,
    pub end: usize,
    pub value: Result<Decimal, PhraseError>,
}

const UNITS: &[(&str, u32)] = &[
    ("zero", 0),
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
];

const TEENS: &[(&str, u32)] = &[
    ("ten", 10),
    ("eleven", 11),
    ("twelve", 12),
    ("thirteen", 13),
    ("fourteen", 14),
    ("fifteen", 15),
    ("sixteen", 16),
    ("seventeen", 17),
    ("eighteen", 18),
    ("nineteen", 19),
];

const TENS: &[(&str, u32)] = &[
    ("twenty", 20),
    ("thirty", 30),
    ("forty", 40),
    ("fifty", 50),
    ("sixty", 60),
    ("seventy", 70),
    ("eighty", 80),
    ("ninety", 90),
];

const SCALES: &[(&str, u64)] = &[
    ("thousand", 1_000),
    ("thousands", 1_000),
    ("lakh", 100_000),
    ("lakhs", 100_000),
    ("lac", 100_000),
    ("lacs", 100_000),
    ("million", 1_000_000),
    ("millions", 1_000_000),
    ("crore", 10_000_000),
    ("crores", 10_000_000),
    ("billion", 1_000_000_000),
    ("billions", 1_000_000_000),
    ("trillion", 1_000_000_000_000),
    ("trillions", 1_000_000_000_000),
];

fn lookup(table: &[(&str, u32)], word: &str) -> Option<u32> {
    table.iter().find(|(name, _)| *name == word).map(|(_, v)| *v)
}

fn classify_word(word: &str) -> Token {
    if let Some(v) = lookup(UNITS, word) {
        return Token::Unit(v);
    }
    if let Some(v) = lookup(TEENS, word) {
        return Token::Teen(v);
    }
    if let Some(v) = lookup(TENS, word) {
        return Token::Tens(v);
    }
    if let Some((_, scale)) = SCALES.iter().find(|(name, _)| *name == word) {
        return Token::Scale(*scale);
    }
    match word {
        "hundred" | "hundreds" => Token::Hundred,
        "point" => Token::Point,
        "and" => Token::And,
        "a" | "an" => Token::Article,
        _ => Token::Word,
    }
}

fn is_numeric(raw: &str) -> bool {
    raw.chars().any(|c| c.is_ascii_digit())
        && raw
            .chars()
            .all(|c| c.is_ascii_digit() || c == ',' || c == '.')
        && raw.matches('.').count() <= 1
}

/// Digits with optional `,` separators and at most one `.`.
fn parse_numeral(raw: &str) -> Option<Decimal> {
    if !is_numeric(raw) {
        return None;
    }
    let mut cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    if cleaned.ends_with('.') {
        cleaned.pop();
    }
    if cleaned.starts_with('.') {
        cleaned.insert(0, '0');
    }
    Decimal::from_str(&cleaned).ok()
}

/// End of a numeral starting at `start`; separators count only when a digit
/// follows them, so a sentence-final `50.` stops before the dot.
fn numeral_end(text: &str, start: usize) -> usize {
    let bytes = text.as_bytes();
    let mut end = start;
    while end < bytes.len() {
        let b = bytes[end];
        let separator_before_digit =
            (b == b',' || b == b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit);
        if b.is_ascii_digit() || separator_before_digit {
            end += 1;
        } else {
            break;
        }
    }
    end
}

/// Splits text into numerals and alphabetic words; everything else separates.
fn lex(text: &str) -> Vec<Lexeme> {
    let mut lexemes = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        let starts_numeral = c.is_ascii_digit()
            || (c == '.' && text.as_bytes().get(start + 1).is_some_and(u8::is_ascii_digit));
        if starts_numeral {
            let end = numeral_end(text, start);
            while chars.peek().is_some_and(|&(i, _)| i < end) {
                chars.next();
            }
            let token = parse_numeral(&text[start..end]).map_or(Token::Word, Token::Numeral);
            lexemes.push(Lexeme { token, start, end });
        } else if c.is_alphabetic() {
            let mut end = start;
            while let Some(&(i, ch)) = chars.peek() {
                if !ch.is_alphabetic() {
                    break;
                }
                end = i + ch.len_utf8();
                chars.next();
            }
            let word = text[start..end].to_lowercase();
            lexemes.push(Lexeme {
                token: classify_word(&word),
                start,
                end,
            });
        } else {
            chars.next();
        }
    }
    lexemes
}

/// Resolves connectors and articles, then evaluates.
///
/// Fraction digits are copied from `text` as written, so "point 05" keeps
/// its zero.
fn evaluate(text: &str, lexemes: &[Lexeme]) -> Result<Decimal, PhraseError> {
    let mut cleaned: Vec<Lexeme> = Vec::with_capacity(lexemes.len());
    for (i, lexeme) in lexemes.iter().enumerate() {
        match lexeme.token {
            Token::And | Token::Word => {}
            Token::Article => {
                let next = lexemes.get(i + 1).map(|l| l.token);
                if matches!(next, Some(Token::Hundred | Token::Scale(_))) {
                    cleaned.push(Lexeme {
                        token: Token::Unit(1),
                        ..*lexeme
                    });
                }
            }
            _ => cleaned.push(*lexeme),
        }
    }
    let tokens: Vec<Token> = cleaned.iter().map(|l| l.token).collect();
    if !tokens.iter().any(|t| t.is_core()) {
        return Err(PhraseError::NoNumber);
    }

    let Some(point) = tokens.iter().position(|t| *t == Token::Point) else {
        return accumulate(&tokens);
    };
    let (integer_part, fraction_part) = (&tokens[..point], &tokens[point + 1..]);
    let integer = if integer_part.is_empty() {
        Decimal::ZERO
    } else {
        accumulate(integer_part)?
    };

    let digits_len = fraction_part
        .iter()
        .take_while(|t| t.is_fraction_digit())
        .count();
    if digits_len == 0 {
        return Err(PhraseError::Ambiguous);
    }
    let mut digits = String::new();
    for lexeme in &cleaned[point + 1..point + 1 + digits_len] {
        match lexeme.token {
            Token::Unit(d) => digits.push_str(&d.to_string()),
            Token::Numeral(_) => {
                let raw = &text[lexeme.start..lexeme.end];
                if !raw.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(PhraseError::Ambiguous);
                }
                digits.push_str(raw);
            }
            _ => return Err(PhraseError::Ambiguous),
        }
    }
    let fraction =
        Decimal::from_str(&format!("0.{digits}")).map_err(|_| PhraseError::Overflow)?;
    let value = integer
        .checked_add(fraction)
        .ok_or(PhraseError::Overflow)?;

    // "one point five million"
    match &fraction_part[digits_len..] {
        [] => Ok(value),
        [Token::Hundred] => value
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(PhraseError::Overflow),
        [Token::Scale(scale)] => value
            .checked_mul(Decimal::from(*scale))
            .ok_or(PhraseError::Overflow),
        _ => Err(PhraseError::Ambiguous),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Last {
    Start,
    Unit,
    Teen,
    Tens,
    Hundred,
    Scale,
    Numeral,
}

fn accumulate(tokens: &[Token]) -> Result<Decimal, PhraseError> {
    fn ensure(ok: bool) -> Result<(), PhraseError> {
        if ok { Ok(()) } else { Err(PhraseError::Ambiguous) }
    }
    fn add(group: Option<Decimal>, value: Decimal) -> Result<Decimal, PhraseError> {
        group
            .unwrap_or(Decimal::ZERO)
            .checked_add(value)
            .ok_or(PhraseError::Overflow)
    }

    let mut total = Decimal::ZERO;
    let mut group: Option<Decimal> = None;
    let mut last = Last::Start;

    for token in tokens {
        last = match *token {
            Token::Unit(d) => {
                ensure(matches!(
                    last,
                    Last::Start | Last::Hundred | Last::Scale | Last::Tens
                ))?;
                group = Some(add(group, Decimal::from(d))?);
                Last::Unit
            }
            Token::Teen(v) | Token::Tens(v) => {
                ensure(matches!(last, Last::Start | Last::Hundred | Last::Scale))?;
                group = Some(add(group, Decimal::from(v))?);
                if v < 20 { Last::Teen } else { Last::Tens }
            }
            Token::Hundred => {
                ensure(matches!(
                    last,
                    Last::Start | Last::Unit | Last::Teen | Last::Tens | Last::Numeral
                ))?;
                let current = group.unwrap_or(Decimal::ONE);
                ensure(current < Decimal::ONE_HUNDRED)?;
                group = Some(
                    current
                        .checked_mul(Decimal::ONE_HUNDRED)
                        .ok_or(PhraseError::Overflow)?,
                );
                Last::Hundred
            }
            Token::Scale(scale) => {
                ensure(last != Last::Scale)?;
                let current = group.take().unwrap_or(Decimal::ONE);
                let scaled = current
                    .checked_mul(Decimal::from(scale))
                    .ok_or(PhraseError::Overflow)?;
                total = total.checked_add(scaled).ok_or(PhraseError::Overflow)?;
                Last::Scale
            }
            Token::Numeral(value) => {
                ensure(matches!(last, Last::Start | Last::Scale | Last::Hundred))?;
                group = Some(add(group, value)?);
                Last::Numeral
            }
            Token::Point | Token::And | Token::Article | Token::Word => {
                return Err(PhraseError::Ambiguous);
            }
        };
    }

    total
        .checked_add(group.unwrap_or(Decimal::ZERO))
        .ok_or(PhraseError::Overflow)
}

/// Whether the lexeme at `i` continues (or starts, when `len == 0`) a span.
fn joins(lexemes: &[Lexeme], i: usize, len: usize) -> bool {
    let next = lexemes.get(i + 1).map(|l| l.token);
    match lexemes[i].token {
        t if t.is_core() => true,
        // "hundred and 5" joins, "50 and 20" is two amounts.
        Token::And if len > 0 => match (lexemes[i - 1].token, next) {
            (Token::Hundred | Token::Scale(_), Some(next)) => next.is_core(),
            (Token::Numeral(_), _) | (_, Some(Token::Numeral(_))) => false,
            (_, next) => next.is_some_and(Token::is_core),
        },
        Token::Point => next.is_some_and(Token::is_fraction_digit),
        Token::Article => matches!(next, Some(Token::Hundred | Token::Scale(_))),
        _ => false,
    }
}

fn sentence_break(text: &str, from: usize, to: usize) -> bool {
    text[from..to].contains(['.', '!', '?', ';', ':'])
}

/// Every number phrase in `text`, in order of appearance.
pub(crate) fn scan(text: &str) -> Vec<NumberSpan> {
    let lexemes = lex(text);
    let mut spans = Vec::new();
    let mut i = 0;

    while i < lexemes.len() {
        if !joins(&lexemes, i, 0) {
            i += 1;
            continue;
        }
        let first = i;
        let mut len = 0;
        while i < lexemes.len()
            && joins(&lexemes, i, len)
            && (len == 0 || !sentence_break(text, lexemes[i - 1].end, lexemes[i].start))
        {
            i += 1;
            len += 1;
        }
        spans.push(NumberSpan {
            start: lexemes[first].start,
            end: lexemes[i - 1].end,
            value: evaluate(text, &lexemes[first..i]),
        });
    }
    spans
}

/// Parses a numeral or an English number phrase.
///
/// Words that are not number words are ignored. Returns `None` for blank
/// input, input without number words, and phrases whose words do not combine
/// into one value ("five three"). No range check is applied.
#[must_use]
pub fn parse(phrase: &str) -> Option<Decimal> {
    let trimmed = phrase.trim();
    if trimmed.is_empty() {
        return None;
    }
    if is_numeric(trimmed) {
        return parse_numeral(trimmed);
    }
    evaluate(trimmed, &lex(trimmed)).ok()
}

/// First amount mentioned in a sentence ("paid two hundred at Lulu" → 200).
#[must_use]
pub fn extract_amount_from_command(text: &str) -> Option<Decimal> {
    scan(text).into_iter().find_map(|span| span.value.ok())
}

#[must_use]
pub fn contains_number_phrase(text: &str) -> bool {
    scan(text).iter().any(|span| span.value.is_ok())
}

/// `true` when `phrase` parses to exactly `expected`.
#[must_use]
pub fn validate(phrase: &str, expected: Decimal) -> bool {
    parse(phrase) == Some(expected)
}
