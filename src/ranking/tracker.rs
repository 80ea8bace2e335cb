//! Word-order scorer: walks the match-class ladder for one pattern against
//! each candidate name.
//!
//! This engine predates the regex-based query path and is kept as a
//! cross-check; [`get_match_class`] exposes its ladder directly for
//! one-off comparisons.

use unicode_normalization::UnicodeNormalization;

use crate::ranking::{EntryRater, MatchClass, Subject};
use crate::text::{deaccent, dedash, is_camel_word};

/// One pattern word, pre-split on `*` for glob matching.
struct PatWord {
    segments: Vec<String>,
    star: bool,
}

impl PatWord {
    fn new(word: &str) -> Self {
        let star = word.contains('*');
        PatWord {
            segments: word.split('*').map(str::to_owned).collect(),
            star,
        }
    }

    /// Match this word against one subject word. Returns `Some(true)` for a
    /// whole-word match, `Some(false)` for a prefix or wildcard match.
    fn match_word(&self, subject: &str) -> Option<bool> {
        if !self.star {
            let w = &self.segments[0];
            return if subject == w.as_str() {
                Some(true)
            } else if subject.starts_with(w.as_str()) {
                Some(false)
            } else {
                None
            };
        }
        // Glob: literal segments must appear in order, the first anchored
        // at the word start; a wildcard match always counts as partial.
        let mut rest = subject;
        let mut first = true;
        for seg in &self.segments {
            if seg.is_empty() {
                first = false;
                continue;
            }
            if first {
                rest = rest.strip_prefix(seg.as_str())?;
                first = false;
            } else {
                let at = rest.find(seg.as_str())?;
                rest = &rest[at + seg.len()..];
            }
        }
        Some(false)
    }
}

/// One atom of a camel-cased pattern: `[a-z]+`, `[A-Z][a-z]*`, or `[0-9]+`.
struct CamelAtom {
    /// Lowercased atom text.
    text: String,
    /// Whether the next atom starts immediately after this one in the
    /// pattern (no separator characters were skipped in between).
    adjacent: bool,
    digits: bool,
}

/// Split `s` into camel atoms with adjacency flags.
fn camel_atoms(s: &str) -> Vec<CamelAtom> {
    let chars: Vec<char> = s.chars().collect();
    let mut spans: Vec<(usize, usize, bool)> = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_lowercase() {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_ascii_lowercase() {
                j += 1;
            }
            spans.push((i, j, false));
            i = j;
        } else if c.is_ascii_uppercase() {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_ascii_lowercase() {
                j += 1;
            }
            spans.push((i, j, false));
            i = j;
        } else if c.is_ascii_digit() {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            spans.push((i, j, true));
            i = j;
        } else {
            i += 1;
        }
    }
    let mut atoms = Vec::with_capacity(spans.len());
    for (k, &(start, end, digits)) in spans.iter().enumerate() {
        let adjacent = spans.get(k + 1).is_some_and(|next| next.0 == end);
        atoms.push(CamelAtom {
            text: chars[start..end]
                .iter()
                .collect::<String>()
                .to_lowercase(),
            adjacent,
            digits,
        });
    }
    atoms
}

/// Split `s` into lowercase match words: runs of alphanumerics plus
/// `~ ? ! *`.
fn match_words(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for c in s.chars() {
        if c.is_alphanumeric() || matches!(c, '~' | '?' | '!' | '*') {
            current.push(c);
        } else if !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Match pattern words against subject words left to right and count
/// demerits: one per partial word, plus a surcharge of four when a subject
/// word was skipped (unless the pattern leads with `*`) or subject words
/// remain unconsumed (unless the pattern carries any `*`).
fn word_match(
    words: &[PatWord],
    subject: &[String],
    leading_star: bool,
    has_star: bool,
) -> Option<u32> {
    if words.is_empty() {
        return None;
    }
    let mut si = 0usize;
    let mut skipped = false;
    let mut demerits = 0u32;
    for word in words {
        let mut hit = None;
        for (j, sw) in subject.iter().enumerate().skip(si) {
            if let Some(full) = word.match_word(sw) {
                hit = Some((j, full));
                break;
            }
        }
        let (j, full) = hit?;
        if j > si {
            skipped = true;
        }
        if !full {
            demerits += 1;
        }
        si = j + 1;
    }
    if (skipped && !leading_star) || (si < subject.len() && !has_star) {
        demerits += 4;
    }
    Some(demerits)
}

/// Match camel atoms against subject words: each word consumes a run of
/// consecutive adjacent atoms anchored at its start, and a digit atom must
/// end at a digit boundary.
fn camel_match(atoms: &[CamelAtom], subject: &[String]) -> Option<u32> {
    if atoms.is_empty() {
        return None;
    }
    let mut ai = 0usize;
    let mut si = 0usize;
    let mut skipped = false;
    let mut demerits = 0u32;
    while ai < atoms.len() {
        if si == subject.len() {
            return None;
        }
        let word = &subject[si];
        let mut pos = 0usize;
        let mut consumed = 0usize;
        while ai + consumed < atoms.len() {
            if consumed > 0 && !atoms[ai + consumed - 1].adjacent {
                break;
            }
            let atom = &atoms[ai + consumed];
            if !word[pos..].starts_with(atom.text.as_str()) {
                break;
            }
            let next = pos + atom.text.len();
            if atom.digits && word[next..].starts_with(|c: char| c.is_ascii_digit()) {
                break;
            }
            pos = next;
            consumed += 1;
            if pos == word.len() {
                break;
            }
        }
        if consumed == 0 {
            skipped = true;
            si += 1;
            continue;
        }
        if pos < word.len() {
            demerits += 1;
        }
        ai += consumed;
        si += 1;
    }
    if skipped || si < subject.len() {
        demerits += 4;
    }
    Some(demerits)
}

/// The word-order scorer: precomputed pattern forms plus the best class
/// observed so far and the positions tied at it.
pub(crate) struct MatchTracker {
    pattern: String,
    dedash_pattern: String,
    dedash_pattern_lower: String,
    folded_pattern: String,
    folded_dedash_pattern: String,
    folded_dedash_pattern_lower: String,
    words: Vec<PatWord>,
    folded_words: Vec<PatWord>,
    camel: Option<Vec<CamelAtom>>,
    leading_star: bool,
    has_star: bool,
    best: f64,
    positions: Vec<usize>,
}

impl MatchTracker {
    pub(crate) fn new(pattern: &str) -> Self {
        let pattern: String = pattern.nfc().collect();
        let dedash_pattern = dedash(&pattern).into_owned();
        let dedash_pattern_lower = dedash_pattern.to_lowercase();
        let folded_pattern = deaccent(&pattern).into_owned();
        let folded_dedash_pattern = dedash(&folded_pattern).into_owned();
        let folded_dedash_pattern_lower = folded_dedash_pattern.to_lowercase();
        let has_star = pattern.contains('*');
        let leading_star = pattern.starts_with('*');
        let camel = (!has_star
            && !folded_pattern.contains(char::is_whitespace)
            && is_camel_word(&folded_pattern))
        .then(|| camel_atoms(&folded_pattern));
        let words = match_words(&dedash_pattern_lower)
            .iter()
            .map(|w| PatWord::new(w))
            .collect();
        let folded_words = match_words(&folded_dedash_pattern_lower)
            .iter()
            .map(|w| PatWord::new(w))
            .collect();
        MatchTracker {
            pattern,
            dedash_pattern,
            dedash_pattern_lower,
            folded_pattern,
            folded_dedash_pattern,
            folded_dedash_pattern_lower,
            words,
            folded_words,
            camel,
            leading_star,
            has_star,
            best: 0.0,
            positions: Vec::new(),
        }
    }

    /// Walk the ladder for one subject.
    pub(crate) fn classify(&self, subject: &Subject<'_>) -> MatchClass {
        if self.pattern == subject.name {
            return MatchClass::Exact;
        }
        if self.dedash_pattern == subject.dedash_name {
            return MatchClass::DedashExact;
        }
        let dedash_lower = subject.dedash_name.to_lowercase();
        if self.dedash_pattern_lower == dedash_lower {
            return MatchClass::CaselessExact;
        }
        let subject_words = match_words(&dedash_lower);
        if let Some(d) = word_match(
            &self.words,
            &subject_words,
            self.leading_star,
            self.has_star,
        ) {
            return MatchClass::WordMatch(MatchClass::fraction(d));
        }
        if deaccent(subject.name) == self.folded_pattern.as_str() {
            return MatchClass::FoldedExact;
        }
        let folded_dedash = deaccent(subject.dedash_name);
        if folded_dedash == self.folded_dedash_pattern.as_str() {
            return MatchClass::FoldedDedashExact;
        }
        let folded_dedash_lower = folded_dedash.to_lowercase();
        if self.folded_dedash_pattern_lower == folded_dedash_lower {
            return MatchClass::FoldedCaselessExact;
        }
        let folded_subject_words = match_words(&folded_dedash_lower);
        let mut best = word_match(
            &self.folded_words,
            &folded_subject_words,
            self.leading_star,
            self.has_star,
        );
        if let Some(atoms) = &self.camel {
            if let Some(d) = camel_match(atoms, &folded_subject_words) {
                best = Some(best.map_or(d, |b| b.min(d)));
            }
        }
        match best {
            Some(d) => MatchClass::FoldedWordMatch(MatchClass::fraction(d)),
            None => MatchClass::NoMatch,
        }
    }
}

impl EntryRater for MatchTracker {
    fn consider(&mut self, pos: usize, subject: Subject<'_>) {
        let value = self.classify(&subject).value();
        if value <= 0.0 {
            return;
        }
        if value > self.best {
            self.best = value;
            self.positions.clear();
        }
        if value == self.best {
            self.positions.push(pos);
        }
    }

    fn matches(self) -> Vec<usize> {
        self.positions
    }
}

/// Grade how closely `pattern` matches `name` on the match-class ladder.
///
/// The name is taken verbatim; accent folding is applied on both sides only
/// for the folded rungs, mirroring how registered entries (whose names are
/// folded at insertion) are scored.
///
/// # Examples
///
/// ```
/// use abbrevmatch::{MatchClass, get_match_class};
///
/// assert_eq!(get_match_class("Overall merit", "Overall merit"), MatchClass::Exact);
/// assert_eq!(get_match_class("Overall.merit", "Overall merit"), MatchClass::DedashExact);
/// assert_eq!(get_match_class("overall-merit", "Overall merit"), MatchClass::CaselessExact);
/// assert_eq!(get_match_class("caf\u{00e9}", "cafe"), MatchClass::FoldedExact);
/// assert_eq!(get_match_class("xyz", "Overall merit"), MatchClass::NoMatch);
/// ```
pub fn get_match_class(pattern: &str, name: &str) -> MatchClass {
    let tracker = MatchTracker::new(pattern);
    let dedash_name = dedash(name);
    tracker.classify(&Subject {
        name,
        dedash_name: &dedash_name,
        tester: "",
        keyword: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- word matching ---

    #[test]
    fn full_word_match_no_demerits() {
        // The comma keeps the caseless-equality rungs from firing while
        // both words still match in full.
        let c = get_match_class("overall, merit", "Overall merit");
        assert_eq!(c, MatchClass::WordMatch(MatchClass::fraction(0)));
    }

    #[test]
    fn prefix_word_match_costs_one() {
        let c = get_match_class("over merit", "Overall merit");
        assert_eq!(c, MatchClass::WordMatch(MatchClass::fraction(1)));
    }

    #[test]
    fn trailing_extras_cost_four() {
        let c = get_match_class("overall", "Overall merit");
        assert_eq!(c, MatchClass::WordMatch(MatchClass::fraction(4)));
        assert_eq!(c.value(), 6.921875);
    }

    #[test]
    fn skipped_word_costs_four() {
        let c = get_match_class("merit", "Overall merit score");
        // Skip "overall" (+4) and leave "score" behind (same surcharge).
        assert_eq!(c, MatchClass::WordMatch(MatchClass::fraction(4)));
    }

    #[test]
    fn leading_star_forgives_skips() {
        let c = get_match_class("*merit", "Overall merit");
        // The wildcard word itself is a partial match.
        assert_eq!(c, MatchClass::WordMatch(MatchClass::fraction(1)));
    }

    #[test]
    fn inner_star_forgives_extras() {
        let c = get_match_class("ove*", "Overall merit");
        assert_eq!(c, MatchClass::WordMatch(MatchClass::fraction(1)));
    }

    #[test]
    fn word_order_is_required() {
        assert_eq!(
            get_match_class("merit overall", "Overall merit"),
            MatchClass::NoMatch
        );
    }

    // --- camel matching ---

    #[test]
    fn camel_pattern_matches_word_prefixes() {
        let c = get_match_class("OveMer", "Overall merit");
        // Two partial words.
        assert_eq!(c, MatchClass::FoldedWordMatch(MatchClass::fraction(2)));
        assert_eq!(c.value(), 1.953125);
    }

    #[test]
    fn digit_prefix_ranks_below_full_word() {
        // "r1" is a prefix of "r100", so the word rung still fires, but one
        // demerit lower than the whole-word consumption of "r1".
        let full = get_match_class("R1", "R1 score");
        let prefix = get_match_class("R1", "R100 notes");
        assert_eq!(full, MatchClass::WordMatch(MatchClass::fraction(4)));
        assert_eq!(prefix, MatchClass::WordMatch(MatchClass::fraction(5)));
        assert!(full > prefix);
    }

    #[test]
    fn camel_match_digit_boundary() {
        let atoms = camel_atoms("R1");
        let far = vec!["r100".to_owned(), "notes".to_owned()];
        assert_eq!(camel_match(&atoms, &far), None);
        let near = vec!["r1".to_owned(), "score".to_owned()];
        assert_eq!(camel_match(&atoms, &near), Some(4));
    }

    #[test]
    fn camel_acronym_of_single_letters() {
        let c = get_match_class("PC", "program committee");
        assert_eq!(c, MatchClass::FoldedWordMatch(MatchClass::fraction(2)));
    }

    #[test]
    fn camel_skips_count() {
        let c = get_match_class("Mer", "Overall merit");
        // "Mer" is not camel; prefix match plus a skipped word.
        assert_eq!(c, MatchClass::WordMatch(MatchClass::fraction(5)));
    }

    // --- ladder rungs ---

    #[test]
    fn exact_beats_everything() {
        assert_eq!(get_match_class("R1 score", "R1 score"), MatchClass::Exact);
    }

    #[test]
    fn dedash_equality() {
        assert_eq!(
            get_match_class("R1_score", "R1 score"),
            MatchClass::DedashExact
        );
    }

    #[test]
    fn caseless_equality() {
        assert_eq!(
            get_match_class("r1 SCORE", "R1 score"),
            MatchClass::CaselessExact
        );
    }

    #[test]
    fn folded_rungs() {
        assert_eq!(
            get_match_class("caf\u{00e9} bar", "cafe bar"),
            MatchClass::FoldedExact
        );
        assert_eq!(
            get_match_class("caf\u{00e9}_bar", "cafe bar"),
            MatchClass::FoldedDedashExact
        );
        assert_eq!(
            get_match_class("CAF\u{00c9} bar", "cafe bar"),
            MatchClass::FoldedCaselessExact
        );
    }

    #[test]
    fn punctuation_in_subject_is_word_separating() {
        let c = get_match_class("paper draft", "Paper (draft)");
        assert_eq!(c, MatchClass::WordMatch(MatchClass::fraction(0)));
    }

    // --- helpers ---

    #[test]
    fn match_words_tokenization() {
        assert_eq!(match_words("a (b) c!"), vec!["a", "b", "c!"]);
        assert!(match_words("()").is_empty());
    }

    #[test]
    fn camel_atoms_spans_and_adjacency() {
        let atoms = camel_atoms("OveMer");
        assert_eq!(atoms.len(), 2);
        assert_eq!(atoms[0].text, "ove");
        assert!(atoms[0].adjacent);
        assert_eq!(atoms[1].text, "mer");
        assert!(!atoms[1].adjacent);

        let atoms = camel_atoms("R1.2");
        assert_eq!(atoms.len(), 3);
        assert!(atoms[0].adjacent);
        // The dot breaks adjacency between the digit runs.
        assert!(!atoms[1].adjacent);
        assert!(atoms[1].digits);
    }

    #[test]
    fn glob_word_requires_anchored_prefix() {
        let w = PatWord::new("r10*");
        assert_eq!(w.match_word("r100"), Some(false));
        assert_eq!(w.match_word("r1"), None);
        let star = PatWord::new("*");
        assert_eq!(star.match_word("anything"), Some(false));
    }
}
