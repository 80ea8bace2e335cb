//! Text normalization primitives for abbreviation matching.
//!
//! Every scorer and query regex in this crate operates on the canonical
//! forms produced here, so matching is driven by token identity rather than
//! raw bytes: dash/underscore/dot runs collapse to spaces, diacritics fold
//! away, camel-cased sigils are detected and split, and names are reduced
//! to space-prefixed "tester" strings suitable for regex scanning.

use std::borrow::Cow;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Closed set of stop words ignored by keyword synthesis and by the query
/// engine's skip accounting. Kept sorted for binary search.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "at", "be", "been", "can", "did", "do", "for",
    "has", "how", "if", "in", "is", "isnt", "it", "new", "of", "on", "or",
    "that", "the", "their", "they", "this", "to", "we", "were", "what",
    "which", "with", "you",
];

/// Returns whether `w` is a stop word, case-insensitively.
pub(crate) fn is_stop_word(w: &str) -> bool {
    let lower = w.to_ascii_lowercase();
    STOP_WORDS.binary_search(&lower.as_str()).is_ok()
}

/// Returns whether `c` separates words for [`dedash`]: ASCII dash,
/// underscore, dot, en/em dash, or any whitespace.
fn is_dedash_separator(c: char) -> bool {
    matches!(c, '-' | '_' | '.' | '\u{2013}' | '\u{2014}') || c.is_whitespace()
}

/// Collapse every run of dashes, underscores, dots, en/em dashes, and
/// whitespace to a single ASCII space.
///
/// Leading and trailing separator runs also collapse to one space; nothing
/// is trimmed.
///
/// Returns [`Cow::Borrowed`] when the input already contains no separator
/// runs (single ASCII spaces are left alone), allocating only when a
/// replacement actually happens.
///
/// # Examples
///
/// ```
/// use abbrevmatch::text::dedash;
///
/// assert_eq!(dedash("foo--bar_baz"), "foo bar baz");
/// assert_eq!(dedash("a \u{2013} b"), "a b");
/// assert_eq!(dedash("plain words"), "plain words");
/// ```
pub fn dedash(s: &str) -> Cow<'_, str> {
    // Fast path: ASCII input with no separator bytes and no space runs.
    let bytes = s.as_bytes();
    if s.is_ascii()
        && memchr::memchr3(b'-', b'_', b'.', bytes).is_none()
        && !bytes.iter().any(|&b| b.is_ascii_whitespace() && b != b' ')
        && !bytes.windows(2).any(|w| w == b"  ")
    {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut in_run = false;
    for c in s.chars() {
        if is_dedash_separator(c) {
            in_run = true;
        } else {
            if in_run {
                out.push(' ');
                in_run = false;
            }
            out.push(c);
        }
    }
    if in_run {
        out.push(' ');
    }
    if out == s {
        // Non-ASCII input with nothing to collapse.
        Cow::Borrowed(s)
    } else {
        Cow::Owned(out)
    }
}

/// Strip diacritics from `s` by NFD decomposition and combining-mark
/// removal, yielding an ASCII-ish form.
///
/// Returns [`Cow::Borrowed`] when no modification is needed (ASCII input,
/// or non-ASCII input with no combining marks after decomposition).
///
/// # Examples
///
/// ```
/// use abbrevmatch::text::deaccent;
///
/// assert_eq!(deaccent("caf\u{00e9}"), "cafe");
/// assert_eq!(deaccent("\u{00fc}ber-ma\u{00f1}ana"), "uber-manana");
/// assert!(matches!(deaccent("hello"), std::borrow::Cow::Borrowed(_)));
/// ```
pub fn deaccent(s: &str) -> Cow<'_, str> {
    // ASCII strings never contain combining marks.
    if s.is_ascii() {
        return Cow::Borrowed(s);
    }
    let stripped: String = s.nfd().filter(|c| !is_combining_mark(*c)).collect();
    if stripped == s {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(stripped)
    }
}

/// Trim `s` and collapse every internal whitespace run to a single ASCII
/// space.
///
/// # Examples
///
/// ```
/// use abbrevmatch::text::simplify_whitespace;
///
/// assert_eq!(simplify_whitespace("  Overall\t merit "), "Overall merit");
/// assert_eq!(simplify_whitespace("already simple"), "already simple");
/// ```
pub fn simplify_whitespace(s: &str) -> Cow<'_, str> {
    let trimmed = s.trim();
    let simple = !trimmed.chars().any(|c| c.is_whitespace() && c != ' ')
        && !trimmed.as_bytes().windows(2).any(|w| w == b"  ");
    if simple {
        return Cow::Borrowed(trimmed);
    }
    let mut out = String::with_capacity(trimmed.len());
    for word in trimmed.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    Cow::Owned(out)
}

/// Returns whether `c` may appear in a camel-cased sigil.
fn is_camel_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~' | '?' | '!' | '\'')
}

/// Returns whether `s` reads as a camel-cased identifier: a single word of
/// sigil characters containing an internal case or digit/letter boundary.
///
/// A boundary is a letter followed by an uppercase letter or digit, or a
/// digit followed by a letter.
///
/// # Examples
///
/// ```
/// use abbrevmatch::text::is_camel_word;
///
/// assert!(is_camel_word("OveMer"));
/// assert!(is_camel_word("R1"));
/// assert!(is_camel_word("PC"));
/// assert!(!is_camel_word("overall"));
/// assert!(!is_camel_word("Ove Mer"));
/// ```
pub fn is_camel_word(s: &str) -> bool {
    if s.is_empty() || !s.chars().all(is_camel_char) {
        return false;
    }
    // All characters are ASCII at this point, so byte windows are exact.
    s.as_bytes().windows(2).any(|w| {
        let (a, b) = (w[0], w[1]);
        (a.is_ascii_alphabetic() && (b.is_ascii_uppercase() || b.is_ascii_digit()))
            || (a.is_ascii_digit() && b.is_ascii_alphabetic())
    })
}

/// Stricter camel test: `s` must contain a lowercase-then-uppercase pair or
/// an upper-upper-lower triplet, with no dash/underscore/dot characters.
///
/// Phrases passing this test are safe to split at case boundaries into
/// separate words (see [`split_strict_camel`]).
///
/// # Examples
///
/// ```
/// use abbrevmatch::text::is_strict_camel_word;
///
/// assert!(is_strict_camel_word("FooBar"));
/// assert!(is_strict_camel_word("HTTPServer"));
/// assert!(!is_strict_camel_word("R1"));
/// assert!(!is_strict_camel_word("FOO"));
/// ```
pub fn is_strict_camel_word(s: &str) -> bool {
    if !s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '~' | '?' | '!' | '\''))
    {
        return false;
    }
    let b = s.as_bytes();
    b.windows(2).enumerate().any(|(i, w)| {
        let lower_upper = w[0].is_ascii_lowercase() && w[1].is_ascii_uppercase();
        let uul = w[0].is_ascii_uppercase()
            && w[1].is_ascii_uppercase()
            && b.get(i + 2).is_some_and(|n| n.is_ascii_lowercase());
        lower_upper || uul
    })
}

/// Split a strict camel word at its case boundaries into space-separated
/// words.
///
/// A space is inserted before an uppercase letter that follows a lowercase
/// letter or digit, and before the final uppercase letter of an uppercase
/// run that is followed by a lowercase letter.
///
/// # Examples
///
/// ```
/// use abbrevmatch::text::split_strict_camel;
///
/// assert_eq!(split_strict_camel("FooBar"), "Foo Bar");
/// assert_eq!(split_strict_camel("HTTPServer"), "HTTP Server");
/// ```
pub fn split_strict_camel(s: &str) -> String {
    let b = s.as_bytes();
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.char_indices() {
        if i > 0 {
            let prev = b[i - 1];
            let boundary = ((prev.is_ascii_lowercase() || prev.is_ascii_digit())
                && c.is_ascii_uppercase())
                || (prev.is_ascii_uppercase()
                    && c.is_ascii_uppercase()
                    && b.get(i + 1).is_some_and(|n| n.is_ascii_lowercase()));
            if boundary {
                out.push(' ');
            }
        }
        out.push(c);
    }
    out
}

/// Returns whether `c` may appear inside a tester token.
fn is_tester_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '~' | '?' | '!')
}

/// Build the tester string for `s`: each alphanumeric token (tildes, `?`,
/// and `!` included; leading underscore runs kept when they head a token)
/// prefixed by a single space, everything else dropped.
///
/// Quotes, brackets, and other punctuation separate words but never appear
/// in the output. Returns `""` when `s` contains no token at all.
///
/// # Examples
///
/// ```
/// use abbrevmatch::text::make_xtester;
///
/// assert_eq!(make_xtester("Overall merit (hidden)"), " Overall merit hidden");
/// assert_eq!(make_xtester("_opt value"), " _opt value");
/// assert_eq!(make_xtester("--"), "");
/// ```
pub fn make_xtester(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 1);
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '_' {
            let mut j = i;
            while j < chars.len() && chars[j] == '_' {
                j += 1;
            }
            if j < chars.len() && is_tester_char(chars[j]) {
                out.push(' ');
                for _ in i..j {
                    out.push('_');
                }
                i = j;
                while i < chars.len() && is_tester_char(chars[i]) {
                    out.push(chars[i]);
                    i += 1;
                }
            } else {
                i = j;
            }
        } else if is_tester_char(chars[i]) {
            out.push(' ');
            while i < chars.len() && is_tester_char(chars[i]) {
                out.push(chars[i]);
                i += 1;
            }
        } else {
            i += 1;
        }
    }
    out
}

/// Remove every whole-token stop word from a tester string,
/// case-insensitively.
///
/// Returns `""` when only stop words remain.
///
/// # Examples
///
/// ```
/// use abbrevmatch::text::xtester_remove_stops;
///
/// assert_eq!(xtester_remove_stops(" a study of the new systems"), " study systems");
/// assert_eq!(xtester_remove_stops(" the of an"), "");
/// ```
pub fn xtester_remove_stops(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for token in s.split_whitespace() {
        if !is_stop_word(token) {
            out.push(' ');
            out.push_str(token);
        }
    }
    out
}

/// Strip parenthesized and bracketed segments from `s`, along with the
/// whitespace that precedes them, then simplify whitespace.
///
/// Returns `None` when there is nothing to strip; an unbalanced opener is
/// kept literally. The returned string may be empty when the whole input
/// was parenthesized.
///
/// # Examples
///
/// ```
/// use abbrevmatch::text::deparenthesize;
///
/// assert_eq!(deparenthesize("Paper (draft)"), Some("Paper".to_owned()));
/// assert_eq!(deparenthesize("Score [hidden] total"), Some("Score total".to_owned()));
/// assert_eq!(deparenthesize("Paper"), None);
/// ```
pub fn deparenthesize(s: &str) -> Option<String> {
    if !s.contains(['(', '[']) {
        return None;
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    let mut changed = false;
    loop {
        match rest.find(['(', '[']) {
            None => {
                out.push_str(rest);
                break;
            }
            Some(i) => {
                let close = if rest.as_bytes()[i] == b'(' { ')' } else { ']' };
                match rest[i..].find(close) {
                    None => {
                        out.push_str(rest);
                        break;
                    }
                    Some(j) => {
                        out.push_str(rest[..i].trim_end());
                        changed = true;
                        rest = &rest[i + j + 1..];
                    }
                }
            }
        }
    }
    changed.then(|| simplify_whitespace(&out).into_owned())
}
