//! Keyword synthesis: derive a short form that resolves unambiguously to
//! one entry, optionally installing it as an alias to pin the resolution.

use crate::AbbrevMatcher;
use crate::entry::EntryHandle;
use crate::text::{deparenthesize, is_stop_word, make_xtester};

/// Synthesize a camel-cased keyword (`"OveMer"`). The default shape.
pub const KW_CAMEL: u32 = 0x1;
/// Synthesize a lowercase underscore-joined keyword (`"overall_merit"`).
pub const KW_UNDERSCORE: u32 = 0x2;
/// Synthesize a lowercase dash-joined keyword (`"overall-merit"`).
pub const KW_DASH: u32 = 0x4;
/// Guarantee a result: when no natural candidate is unique, install a
/// numbered alias entry and return its name.
pub const KW_ENSURE: u32 = 0x8;

impl<V: Clone + PartialEq> AbbrevMatcher<V> {
    /// Derive a keyword for entry `e` that
    /// [`find_entries`](AbbrevMatcher::find_entries) with mask `tflags`
    /// resolves to `e` alone.
    ///
    /// `flags` selects one shape ([`KW_CAMEL`], [`KW_DASH`], or
    /// [`KW_UNDERSCORE`]; camel is the default) and may carry
    /// [`KW_ENSURE`]. Without `KW_ENSURE` the method returns `None` when
    /// no natural candidate is unambiguous; with it, a fresh numbered
    /// alias is installed and returned instead. A multi-word camel
    /// candidate under `KW_ENSURE` is also installed (lowercased) so the
    /// resolution survives later insertions.
    ///
    /// # Examples
    ///
    /// ```
    /// use abbrevmatch::{AbbrevMatcher, KW_CAMEL, KW_ENSURE};
    ///
    /// let mut m = AbbrevMatcher::new();
    /// let h = m.add_phrase("Overall merit", 10u32, 0);
    /// let kw = m.find_entry_keyword(h, KW_CAMEL | KW_ENSURE, 0);
    /// assert_eq!(kw.as_deref(), Some("OveMer"));
    /// assert_eq!(m.find1("OveMer", 0), Some(10));
    /// ```
    pub fn find_entry_keyword(
        &mut self,
        e: EntryHandle,
        flags: u32,
        tflags: u32,
    ) -> Option<String> {
        let pos = e.index();
        let ensure = flags & KW_ENSURE != 0;

        // Start from the entry's name, preferring the paren-stripped form
        // when it still resolves here.
        let mut base = self.entry_name(e).to_owned();
        if let Some(short) = deparenthesize(&base) {
            if !short.is_empty() && self.resolves_to(&short, pos, tflags) {
                base = short;
            }
        }

        let mut tokens: Vec<String> = make_xtester(&base)
            .split_whitespace()
            .map(str::to_owned)
            .collect();
        if tokens.is_empty() {
            return None;
        }
        if tokens.len() > 2 {
            let kept: Vec<String> = tokens
                .iter()
                .filter(|t| !is_stop_word(t))
                .cloned()
                .collect();
            if !kept.is_empty() && kept.len() < tokens.len() {
                let probe = kept.join(" ");
                if self.resolves_to(&probe, pos, tflags) {
                    tokens = kept;
                }
            }
        }

        if flags & (KW_UNDERSCORE | KW_DASH) != 0 {
            let sep = if flags & KW_UNDERSCORE != 0 { "_" } else { "-" };
            let cand = tokens
                .iter()
                .map(|t| t.to_lowercase())
                .collect::<Vec<_>>()
                .join(sep);
            if self.resolves_to(&cand, pos, tflags) {
                return Some(cand);
            }
            return ensure.then(|| self.install_suffixed(&cand, sep, pos, tflags));
        }

        let title: Vec<String> = tokens.iter().map(|t| title_case(t)).collect();
        let multi = title.len() > 1;
        let mut candidates: Vec<String> = Vec::new();
        if multi {
            candidates.push(contract(&title));
            if title.len() > 3 {
                // Rolling windows of three, advancing one word at a time.
                for start in 0..=title.len() - 3 {
                    candidates.push(contract(&title[start..start + 3]));
                }
            }
        } else {
            let word = &title[0];
            let keep = if word.chars().count() < 7 { 6 } else { 3 };
            candidates.push(word.chars().take(keep).collect());
        }
        let primary = candidates[0].clone();
        for cand in candidates {
            if self.camel_candidate_ok(&cand, pos, tflags, ensure && multi) {
                if ensure && multi {
                    self.install_alias_keyword(&cand.to_lowercase(), pos);
                }
                return Some(cand);
            }
        }
        ensure.then(|| self.install_suffixed(&primary, ".", pos, tflags))
    }

    /// Like [`find_entry_keyword`](AbbrevMatcher::find_entry_keyword) with
    /// [`KW_ENSURE`] forced, so a keyword is always produced for any entry
    /// with at least one word-like token.
    pub fn ensure_entry_keyword(&mut self, e: EntryHandle, flags: u32, tflags: u32) -> String {
        self.find_entry_keyword(e, flags | KW_ENSURE, tflags)
            .unwrap_or_default()
    }

    /// Returns whether every match for `pattern` carries the value of the
    /// entry at `pos`.
    fn resolves_to(&mut self, pattern: &str, pos: usize, tflags: u32) -> bool {
        let found = self.find_entries(pattern, tflags);
        !found.is_empty() && found.iter().all(|&h| self.values_equal(h.index(), pos))
    }

    /// Candidate test for the camel shape. When `relax` is set the
    /// candidate will be installed as a keyword alias, which outranks the
    /// phrase matches that made it ambiguous, so only an existing
    /// same-name keyword owned by another value blocks it.
    fn camel_candidate_ok(&mut self, cand: &str, pos: usize, tflags: u32, relax: bool) -> bool {
        let found = self.find_entries(cand, tflags);
        if !found.is_empty() && found.iter().all(|&h| self.values_equal(h.index(), pos)) {
            return true;
        }
        if !relax {
            return false;
        }
        let lower = cand.to_lowercase();
        !found.iter().any(|&h| {
            let p = h.index();
            self.entries[p].is_keyword()
                && self.entries[p].name.to_lowercase() == lower
                && !self.values_equal(p, pos)
        })
    }

    /// Install `name` as a keyword alias of the entry at `pos`, unless a
    /// keyword with that lowercase name already exists.
    fn install_alias_keyword(&mut self, name: &str, pos: usize) {
        let lower = name.to_lowercase();
        if self
            .entries
            .iter()
            .any(|e| e.is_keyword() && e.name.to_lowercase() == lower)
        {
            return;
        }
        let value = self.entries[pos].share_value();
        let tflags = self.entries[pos].tflags;
        self.push_keyword(name, value, tflags);
    }

    /// Append `sep` plus a counter to `base` until the result matches
    /// nothing, then install it as a keyword alias and return it.
    fn install_suffixed(&mut self, base: &str, sep: &str, pos: usize, tflags: u32) -> String {
        let mut n = 0u32;
        loop {
            n += 1;
            let cand = format!("{base}{sep}{n}");
            if self.find_entries(&cand, tflags).is_empty() {
                let value = self.entries[pos].share_value();
                let flags = self.entries[pos].tflags;
                self.push_keyword(&cand, value, flags);
                return cand;
            }
        }
    }
}

/// Uppercase the first character of `token`.
fn title_case(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Concatenate the first three characters of each word, keeping an
/// underscore between pieces where two digit runs would otherwise fuse.
fn contract(words: &[String]) -> String {
    let mut out = String::new();
    for word in words {
        let piece: String = word.chars().take(3).collect();
        if out.ends_with(|c: char| c.is_ascii_digit())
            && piece.starts_with(|c: char| c.is_ascii_digit())
        {
            out.push('_');
        }
        out.push_str(&piece);
    }
    out
}
