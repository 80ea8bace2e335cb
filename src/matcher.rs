//! The abbreviation matcher: an in-memory, append-only index from
//! registered names to payloads, queried by abbreviation patterns.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use unicode_normalization::UnicodeNormalization;

use crate::entry::{Entry, EntryHandle, EntryValue, TFLAG_KW, TFLAG_TIER_MASK};
use crate::pattern;
use crate::ranking::{EntryRater, MatchTracker, Subject};
use crate::text::{
    deaccent, dedash, deparenthesize, is_strict_camel_word, make_xtester, simplify_whitespace,
    split_strict_camel,
};

/// Searchable index from short patterns to registered named entries.
///
/// Names are normalized on insertion (NFC, accent folding, whitespace
/// simplification); derived match material (dedashed names, tester strings)
/// is computed lazily on the first query after an insertion. Queries rank
/// candidates with a regex-and-skip scorer and, in cross-check builds, a
/// legacy word-order scorer whose disagreements are logged.
///
/// The matcher is a single-threaded mutable structure: queries take
/// `&mut self` because they memoize analysis results and per-pattern match
/// lists.
///
/// # Examples
///
/// ```
/// use abbrevmatch::AbbrevMatcher;
///
/// let mut m = AbbrevMatcher::new();
/// m.add_phrase("Overall merit", 1u32, 0);
/// m.add_phrase("Overall review quality", 2u32, 0);
///
/// assert_eq!(m.find_all("OveMer", 0), vec![1]);
/// assert_eq!(m.find_all("overall", 0), vec![1, 2]);
/// assert_eq!(m.find1("Ove*", 0), None);
/// ```
pub struct AbbrevMatcher<V> {
    pub(crate) entries: Vec<Entry<V>>,
    /// Tester strings parallel to `entries`, filled up to `n_analyzed`.
    ltesters: Vec<String>,
    n_analyzed: usize,
    n_deparenthesized: usize,
    /// Priority per tag tier (low eight tag bits). Higher wins.
    priorities: HashMap<u32, f64>,
    /// Per-pattern results of the legacy scorer.
    match_cache: HashMap<String, Vec<usize>>,
    /// Per-pattern results of the regex scorer.
    xmatch_cache: HashMap<String, Vec<usize>>,
    cross_check: bool,
}

impl<V> Default for AbbrevMatcher<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> AbbrevMatcher<V> {
    /// Create an empty matcher.
    ///
    /// The legacy cross-check scorer is enabled in debug builds and
    /// disabled in release builds; see [`set_cross_check`].
    ///
    /// [`set_cross_check`]: AbbrevMatcher::set_cross_check
    pub fn new() -> Self {
        AbbrevMatcher {
            entries: Vec::new(),
            ltesters: Vec::new(),
            n_analyzed: 0,
            n_deparenthesized: 0,
            priorities: HashMap::new(),
            match_cache: HashMap::new(),
            xmatch_cache: HashMap::new(),
            cross_check: cfg!(debug_assertions),
        }
    }

    /// Number of registered entries, alias clones included.
    pub fn nentries(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no entries have been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The normalized display name of an entry.
    pub fn entry_name(&self, e: EntryHandle) -> &str {
        &self.entries[e.index()].name
    }

    /// Enable or disable the legacy scorer cross-check run by
    /// [`find_all`](AbbrevMatcher::find_all).
    pub fn set_cross_check(&mut self, on: bool) {
        self.cross_check = on;
    }

    /// Record the priority for a tag tier (the low eight bits of
    /// `tflags`). Entries of higher-priority tiers displace others from
    /// query results.
    pub fn set_priority(&mut self, tflags: u32, prio: f64) {
        self.priorities.insert(tflags & TFLAG_TIER_MASK, prio);
    }

    /// Compute derived match material for entries added since the last
    /// analysis.
    fn analyze(&mut self) {
        while self.n_analyzed < self.entries.len() {
            let entry = &mut self.entries[self.n_analyzed];
            if entry.dedash_name.is_none() {
                entry.dedash_name = Some(dedash(&entry.name).into_owned());
            }
            let tester = if entry.is_keyword() {
                let mut t = String::with_capacity(entry.name.len() + 1);
                t.push(' ');
                t.push_str(&entry.name.to_lowercase());
                t
            } else {
                make_xtester(&entry.name.to_lowercase())
            };
            self.ltesters.push(tester);
            self.n_analyzed += 1;
        }
    }

    fn run_rater<R: EntryRater>(&self, mut rater: R) -> Vec<usize> {
        for (pos, entry) in self.entries.iter().enumerate() {
            rater.consider(pos, Subject::of(entry, &self.ltesters[pos]));
        }
        rater.matches()
    }

    fn xfind_positions(&mut self, pattern: &str) -> Vec<usize> {
        if let Some(hit) = self.xmatch_cache.get(pattern) {
            return hit.clone();
        }
        self.analyze();
        let found = match pattern::compile(pattern) {
            Some(rater) => self.run_rater(rater),
            None => Vec::new(),
        };
        self.xmatch_cache.insert(pattern.to_owned(), found.clone());
        found
    }

    fn legacy_positions(&mut self, pattern: &str) -> Vec<usize> {
        if let Some(hit) = self.match_cache.get(pattern) {
            return hit.clone();
        }
        self.analyze();
        let found = self.run_rater(MatchTracker::new(pattern));
        self.match_cache.insert(pattern.to_owned(), found.clone());
        found
    }

    /// Intersect raw scorer output with the tag mask, then keep only the
    /// entries of the highest observed priority. A caller-supplied mask
    /// whose tier has a recorded priority acts as a floor.
    fn filter_positions(&self, mut positions: Vec<usize>, tflags: u32) -> Vec<usize> {
        if tflags != 0 {
            positions.retain(|&p| self.entries[p].tflags & tflags != 0);
        }
        if positions.is_empty() {
            return positions;
        }
        let prio = |p: usize| {
            self.priorities
                .get(&self.entries[p].tier())
                .copied()
                .unwrap_or(0.0)
        };
        let mut top = f64::NEG_INFINITY;
        for &p in &positions {
            top = top.max(prio(p));
        }
        if tflags != 0 {
            if let Some(&floor) = self.priorities.get(&(tflags & TFLAG_TIER_MASK)) {
                top = top.max(floor);
            }
        }
        positions.retain(|&p| prio(p) == top);
        positions
    }

    fn names_of(&self, positions: &[usize]) -> Vec<&str> {
        positions
            .iter()
            .map(|&p| self.entries[p].name.as_str())
            .collect()
    }
}

impl<V: Clone + PartialEq> AbbrevMatcher<V> {
    /// Register a phrase entry.
    ///
    /// The name is NFC-normalized, accent-folded, and whitespace-
    /// simplified. A name that is a single strict-camel word additionally
    /// registers a clone split at its case boundaries, so `"FooBar"` is
    /// also findable as `"Foo Bar"`.
    ///
    /// Returns a handle to the (first) registered entry; handles stay
    /// valid across later additions.
    pub fn add_phrase(&mut self, name: &str, value: V, tflags: u32) -> EntryHandle {
        self.push_phrase(name, EntryValue::Eager(value), tflags)
    }

    /// Register a phrase entry whose value is produced by `loader` on
    /// first use and memoized.
    ///
    /// The loader runs at most once per entry and must not call back into
    /// the matcher.
    pub fn add_phrase_lazy<F>(&mut self, name: &str, loader: F, tflags: u32) -> EntryHandle
    where
        F: Fn() -> V + 'static,
    {
        self.push_phrase(
            name,
            EntryValue::Lazy {
                loader: Rc::new(loader),
                cached: None,
            },
            tflags,
        )
    }

    fn push_phrase(&mut self, name: &str, value: EntryValue<V>, tflags: u32) -> EntryHandle {
        let name = normalize_name(name);
        // New phrase content can change any query's answer.
        self.match_cache.clear();
        self.xmatch_cache.clear();
        let tflags = tflags & !TFLAG_KW;
        let handle = EntryHandle(self.entries.len());
        let split = (!name.contains(' ') && is_strict_camel_word(&name))
            .then(|| split_strict_camel(&name))
            .filter(|s| *s != name);
        let entry = Entry::new(name, value, tflags);
        if let Some(split) = split {
            let twin = Entry::new(split, entry.share_value(), tflags);
            self.entries.push(entry);
            self.entries.push(twin);
        } else {
            self.entries.push(entry);
        }
        handle
    }

    /// Register a keyword entry: a single token matched by exact
    /// lowercased equality ahead of any phrase match.
    ///
    /// # Panics
    ///
    /// Panics when `name` contains whitespace.
    pub fn add_keyword(&mut self, name: &str, value: V, tflags: u32) -> EntryHandle {
        self.push_keyword(name, EntryValue::Eager(value), tflags)
    }

    /// Register a lazily loaded keyword entry. See
    /// [`add_keyword`](AbbrevMatcher::add_keyword) and
    /// [`add_phrase_lazy`](AbbrevMatcher::add_phrase_lazy).
    pub fn add_keyword_lazy<F>(&mut self, name: &str, loader: F, tflags: u32) -> EntryHandle
    where
        F: Fn() -> V + 'static,
    {
        self.push_keyword(
            name,
            EntryValue::Lazy {
                loader: Rc::new(loader),
                cached: None,
            },
            tflags,
        )
    }

    pub(crate) fn push_keyword(
        &mut self,
        name: &str,
        value: EntryValue<V>,
        tflags: u32,
    ) -> EntryHandle {
        let name = normalize_keyword(name);
        assert!(
            !name.contains(char::is_whitespace),
            "keyword name contains whitespace: {name:?}"
        );
        // A keyword only changes the answer for its own lowercase form;
        // every other cached pattern stays valid.
        let lower = name.to_lowercase();
        self.match_cache
            .retain(|p, _| deaccent(p).to_lowercase() != lower);
        self.xmatch_cache
            .retain(|p, _| deaccent(p).to_lowercase() != lower);
        let handle = EntryHandle(self.entries.len());
        self.entries.push(Entry::new(name, value, tflags | TFLAG_KW));
        handle
    }

    /// Register alias clones for phrase entries whose names carry
    /// parenthesized or bracketed segments, with those segments stripped.
    ///
    /// A clone is skipped when stripping leaves an empty name or a tester
    /// identical to one already registered. Entries are visited once; the
    /// next call only considers entries added since.
    pub fn add_deparenthesized(&mut self) {
        self.analyze();
        let upto = self.entries.len();
        let mut clones: Vec<(usize, String)> = Vec::new();
        let mut clone_testers: Vec<String> = Vec::new();
        for pos in self.n_deparenthesized..upto {
            let entry = &self.entries[pos];
            if entry.is_keyword() {
                continue;
            }
            let Some(short) = deparenthesize(&entry.name) else {
                continue;
            };
            if short.is_empty() {
                continue;
            }
            let tester = make_xtester(&short.to_lowercase());
            if self.ltesters.contains(&tester) || clone_testers.contains(&tester) {
                continue;
            }
            clone_testers.push(tester);
            clones.push((pos, short));
        }
        self.n_deparenthesized = upto;
        if clones.is_empty() {
            return;
        }
        self.match_cache.clear();
        self.xmatch_cache.clear();
        for (pos, short) in clones {
            let source = &self.entries[pos];
            let alias = Entry::new(short, source.share_value(), source.tflags);
            self.entries.push(alias);
        }
        self.n_deparenthesized = self.entries.len();
    }

    /// Find the entries best matching `pattern`, optionally restricted to
    /// entries intersecting the tag mask `tflags` (`0` means no
    /// restriction).
    pub fn find_entries(&mut self, pattern: &str, tflags: u32) -> Vec<EntryHandle> {
        let found = self.xfind_positions(pattern);
        self.filter_positions(found, tflags)
            .into_iter()
            .map(EntryHandle)
            .collect()
    }

    /// Find the values best matching `pattern`, deduplicated by value
    /// equality.
    ///
    /// When cross-checking is enabled, the legacy scorer runs on the same
    /// pattern and a diagnostic is logged if the two result sets diverge;
    /// the regex scorer's answer is returned either way.
    pub fn find_all(&mut self, pattern: &str, tflags: u32) -> Vec<V> {
        let primary = {
            let found = self.xfind_positions(pattern);
            self.filter_positions(found, tflags)
        };
        let values = self.dedup_values(&primary);
        if self.cross_check {
            let legacy = {
                let found = self.legacy_positions(pattern);
                self.filter_positions(found, tflags)
            };
            let legacy_values = self.dedup_values(&legacy);
            if values != legacy_values {
                log::warn!(
                    "match scorers disagree for {:?}: {:?} vs legacy {:?}",
                    pattern,
                    self.names_of(&primary),
                    self.names_of(&legacy),
                );
            }
        }
        values
    }

    /// The single value matching `pattern`, or `None` when the match is
    /// absent or ambiguous.
    pub fn find1(&mut self, pattern: &str, tflags: u32) -> Option<V> {
        let mut values = self.find_all(pattern, tflags);
        if values.len() == 1 { values.pop() } else { None }
    }

    /// Pedantic find: like [`find_all`](AbbrevMatcher::find_all), but an
    /// ambiguous plain-text pattern yields nothing. Wildcard patterns are
    /// always allowed to return multiple values.
    pub fn findp(&mut self, pattern: &str, tflags: u32) -> Vec<V> {
        let values = self.find_all(pattern, tflags);
        if values.len() <= 1 || pattern.contains('*') {
            values
        } else {
            Vec::new()
        }
    }

    /// The value of an entry, loading it if necessary.
    pub fn entry_value(&mut self, e: EntryHandle) -> V {
        self.entries[e.index()].value().clone()
    }

    pub(crate) fn values_equal(&mut self, a: usize, b: usize) -> bool {
        if a == b {
            return true;
        }
        let va = self.entries[a].value().clone();
        let vb = self.entries[b].value();
        va == *vb
    }

    fn dedup_values(&mut self, positions: &[usize]) -> Vec<V> {
        let mut out: Vec<V> = Vec::with_capacity(positions.len());
        for &p in positions {
            let v = self.entries[p].value().clone();
            if !out.contains(&v) {
                out.push(v);
            }
        }
        out
    }
}

// Manual `Debug` because entries hold loader closures.
impl<V> fmt::Debug for AbbrevMatcher<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbbrevMatcher")
            .field("entries", &self.entries.len())
            .field("analyzed", &self.n_analyzed)
            .field("cross_check", &self.cross_check)
            .finish()
    }
}

/// Normalize a phrase name at insertion: NFC, accent folding, whitespace
/// simplification.
fn normalize_name(name: &str) -> String {
    let nfc: String = name.nfc().collect();
    let folded = deaccent(&nfc);
    simplify_whitespace(&folded).into_owned()
}

/// Normalize a keyword name at insertion: NFC and accent folding only.
fn normalize_keyword(name: &str) -> String {
    let nfc: String = name.nfc().collect();
    deaccent(&nfc).into_owned()
}
