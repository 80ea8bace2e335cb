//! Regex-based query scoring over tester strings.
//!
//! Each query compiles to one regex walked over every entry's tester: camel
//! patterns produce per-atom alternatives joined by lazy optional skips,
//! word patterns produce space-anchored word atoms joined by lazy skips,
//! and a trailing numeric atom is guarded by a `(?![0-9])` lookahead (the
//! `fancy-regex` engine supports both constructs). Survivors are then
//! classified by capture-group analysis and only the best status is kept.

use fancy_regex::Regex;

use crate::ranking::{EntryRater, Subject};
use crate::text::{deaccent, is_camel_word, is_stop_word};

/// A tester that passed the prefilter, retained for status classification.
struct Survivor {
    pos: usize,
    tester: String,
    keyword: bool,
}

/// The regex scorer for one compiled query.
pub(crate) struct XtesterRater {
    rx: Regex,
    natoms: usize,
    has_star: bool,
    leading_star: bool,
    survivors: Vec<Survivor>,
}

/// Compile `pattern` into a rater, or `None` when it contains no word
/// material at all.
pub(crate) fn compile(pattern: &str) -> Option<XtesterRater> {
    let pattern = pattern.trim();
    let folded = deaccent(pattern);
    let folded: &str = &folded;
    let has_star = folded.contains('*');
    let leading_star = folded.starts_with('*');
    let camel =
        !has_star && !folded.contains(char::is_whitespace) && is_camel_word(folded);
    let atoms = if camel {
        camel_atoms(folded)
    } else {
        word_atoms(folded)
    };
    if atoms.is_empty() {
        return None;
    }

    let mut src = String::with_capacity(atoms.iter().map(String::len).sum::<usize>() + 64);
    if !folded.contains(char::is_whitespace) {
        // A space-free pattern may also match a whole lowercased name
        // exactly, which is how keyword entries short-circuit phrases.
        src.push_str("\\A ");
        push_escaped(&mut src, &folded.to_lowercase());
        src.push_str("\\z|");
    }
    src.push(' ');
    for (i, atom) in atoms.iter().enumerate() {
        if i > 0 {
            src.push_str(if camel { "(.*? )??" } else { "(.*? )" });
        }
        src.push('(');
        push_escaped(&mut src, atom);
        src.push(')');
    }
    if atoms
        .last()
        .is_some_and(|a| a.chars().all(|c| c.is_ascii_digit() || c == '.'))
    {
        src.push_str("(?![0-9])");
    }
    let src = if has_star {
        src.replace("\\*", ".*")
    } else {
        src
    };

    let rx = Regex::new(&src).ok()?;
    Some(XtesterRater {
        rx,
        natoms: atoms.len(),
        has_star,
        leading_star,
        survivors: Vec::new(),
    })
}

/// Split a camel pattern into atoms: a letter followed by a lowercase run,
/// an uppercase run not followed by lowercase (exploded into single-letter
/// atoms), or a digit-and-dot run. Unmatched characters separate atoms.
fn camel_atoms(s: &str) -> Vec<String> {
    fn lowerish(c: char) -> bool {
        c.is_ascii_lowercase() || matches!(c, '~' | '?' | '!')
    }
    let chars: Vec<char> = s.chars().collect();
    let mut atoms = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if (c.is_ascii_alphabetic() || c == '~')
            && chars.get(i + 1).copied().is_some_and(lowerish)
        {
            let mut j = i + 1;
            while j < chars.len() && lowerish(chars[j]) {
                j += 1;
            }
            atoms.push(chars[i..j].iter().collect::<String>().to_lowercase());
            i = j;
        } else if c.is_ascii_uppercase() {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_ascii_uppercase() {
                j += 1;
            }
            // Leave the run's last capital to head the following
            // lowercase run, as in "ABc" -> "A" + "Bc".
            if j - i > 1 && chars.get(j).copied().is_some_and(lowerish) {
                j -= 1;
            }
            for k in i..j {
                atoms.push(chars[k].to_ascii_lowercase().to_string());
            }
            i = j;
        } else if c.is_ascii_digit() || c == '.' {
            let mut j = i + 1;
            while j < chars.len() && (chars[j].is_ascii_digit() || chars[j] == '.') {
                j += 1;
            }
            atoms.push(chars[i..j].iter().collect());
            i = j;
        } else {
            i += 1;
        }
    }
    atoms
}

/// Split a non-camel pattern into lowercase word atoms: runs of
/// alphanumerics plus `~ ? ! *`, with a dot absorbed between digits.
fn word_atoms(s: &str) -> Vec<String> {
    fn token_char(c: char) -> bool {
        c.is_alphanumeric() || matches!(c, '~' | '?' | '!' | '*')
    }
    let chars: Vec<char> = s.chars().collect();
    let mut atoms = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if !token_char(chars[i]) {
            i += 1;
            continue;
        }
        let mut token = String::new();
        while i < chars.len() {
            if token_char(chars[i]) {
                token.push(chars[i]);
                i += 1;
            } else if chars[i] == '.'
                && chars[i - 1].is_ascii_digit()
                && chars.get(i + 1).copied().is_some_and(|c| c.is_ascii_digit())
            {
                token.push('.');
                i += 1;
            } else {
                break;
            }
        }
        atoms.push(token.to_lowercase());
    }
    atoms
}

/// Append `s` to a regex source with metacharacters escaped. `*` is
/// escaped too; wildcard expansion rewrites `\*` afterwards.
fn push_escaped(dst: &mut String, s: &str) {
    for c in s.chars() {
        if c.is_alphanumeric() || c == ' ' || !c.is_ascii() {
            dst.push(c);
        } else {
            dst.push('\\');
            dst.push(c);
        }
    }
}

impl XtesterRater {
    /// Classify one survivor on the 0–3 status scale.
    fn status(&self, survivor: &Survivor) -> u8 {
        let caps = match self.rx.captures(&survivor.tester) {
            Ok(Some(caps)) => caps,
            _ => return 0,
        };
        let Some(whole) = caps.get(0) else { return 0 };
        // The whole-name alternative has no groups: an exact keyword hit.
        if caps.get(1).is_none() {
            return 3;
        }

        let tester = survivor.tester.as_str();
        let mut skipped: Vec<&str> = Vec::new();
        skipped.extend(tester[..whole.start()].split_whitespace());
        skipped.extend(tester[whole.end()..].split_whitespace());
        let mut gaps_on_boundary = true;
        for i in 1..self.natoms {
            if let Some(gap) = caps.get(2 * i) {
                if !gap.as_str().starts_with(' ') {
                    gaps_on_boundary = false;
                }
                skipped.extend(gap.as_str().split_whitespace());
            }
        }

        if self.has_star {
            return u8::from(skipped.iter().all(|w| is_stop_word(w)));
        }

        let full_cover = whole.start() == 0 && whole.end() == tester.len();
        if skipped.is_empty() && full_cover && gaps_on_boundary {
            return 3;
        }
        if skipped.iter().all(|w| is_stop_word(w)) && !survivor.keyword {
            return 2;
        }

        let bytes = tester.as_bytes();
        let all_full_words = (0..self.natoms).all(|i| {
            caps.get(2 * i + 1).is_some_and(|atom| {
                let starts_word = atom.start() == 0 || bytes[atom.start() - 1] == b' ';
                let ends_word =
                    atom.end() == tester.len() || bytes[atom.end()] == b' ';
                starts_word && ends_word
            })
        });
        u8::from(all_full_words && !survivor.keyword)
    }
}

impl EntryRater for XtesterRater {
    fn consider(&mut self, pos: usize, subject: Subject<'_>) {
        if subject.tester.is_empty() {
            return;
        }
        if matches!(self.rx.is_match(subject.tester), Ok(true)) {
            self.survivors.push(Survivor {
                pos,
                tester: subject.tester.to_owned(),
                keyword: subject.keyword,
            });
        }
    }

    fn matches(mut self) -> Vec<usize> {
        if self.survivors.len() > 1 && !self.leading_star {
            let statuses: Vec<u8> = self.survivors.iter().map(|s| self.status(s)).collect();
            let top = statuses.iter().copied().max().unwrap_or(0);
            let mut status = statuses.into_iter();
            self.survivors.retain(|_| status.next() == Some(top));
        }
        self.survivors.iter().map(|s| s.pos).collect()
    }
}
