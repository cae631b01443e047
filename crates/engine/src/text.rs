//! Internal text helpers shared by the matchers.
//!
//! These are **not** part of the public API. Every matcher folds both its
//! patterns and the transcript through the same helper, so offsets computed on
//! a folded string are only ever compared with offsets on the same string.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

pub(crate) fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// NFC, lower-case, single spaces.
///
/// Used for currency matching: compatibility characters such as `﷼` survive
/// untouched.
pub(crate) fn fold(input: &str) -> String {
    let composed: String = input.nfc().collect();
    collapse_whitespace(&composed.to_lowercase())
}

/// NFKD without combining marks, lower-case, every run of non-alphanumeric
/// characters turned into one space.
///
/// Used for category keywords where `Café` and `cafe` must match.
pub(crate) fn fold_key(input: &str) -> String {
    let mut out = String::new();
    let mut prev_space = true;
    for ch in input.nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
            prev_space = false;
        } else if !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    out.trim_end().to_string()
}

/// `true` when the pattern may match at `start..end` of `hay` without
/// splitting a word.
///
/// Only letter edges are constrained: a pattern starting with a letter must
/// not follow a letter, a pattern ending with a letter must not precede one.
/// Digits may touch (`50dollars`).
pub(crate) fn word_edges_ok(hay: &str, start: usize, end: usize) -> bool {
    let pattern = &hay[start..end];
    let starts_with_letter = pattern.chars().next().is_some_and(char::is_alphabetic);
    let ends_with_letter = pattern.chars().next_back().is_some_and(char::is_alphabetic);

    if starts_with_letter && hay[..start].chars().next_back().is_some_and(char::is_alphabetic) {
        return false;
    }
    if ends_with_letter && hay[end..].chars().next().is_some_and(char::is_alphabetic) {
        return false;
    }
    true
}

/// `true` when the first non-space character before `pos` is an ASCII digit.
pub(crate) fn digit_before(hay: &str, pos: usize) -> bool {
    hay[..pos]
        .chars()
        .rev()
        .find(|c| !c.is_whitespace())
        .is_some_and(|c| c.is_ascii_digit())
}

/// `true` when the first non-space character from `pos` on is an ASCII digit.
pub(crate) fn digit_after(hay: &str, pos: usize) -> bool {
    hay[pos..]
        .chars()
        .find(|c| !c.is_whitespace())
        .is_some_and(|c| c.is_ascii_digit())
}

/// ASCII-case-insensitive prefix test; non-ASCII bytes must match exactly.
pub(crate) fn starts_with_ignore_ascii_case(hay: &str, pattern: &str) -> bool {
    hay.len() >= pattern.len()
        && hay.as_bytes()[..pattern.len()].eq_ignore_ascii_case(pattern.as_bytes())
}

pub(crate) fn overlaps(taken: &[(usize, usize)], start: usize, end: usize) -> bool {
    taken.iter().any(|&(s, e)| start < e && s < end)
}
