#![warn(missing_docs)]

//! An abbreviation matcher: a searchable in-memory index from short
//! patterns — abbreviations, keywords, camel-cased sigils, optionally with
//! a `*` wildcard — to registered named entries.
//!
//! Matching is Unicode- and punctuation-tolerant: names and patterns are
//! accent-folded, dash/underscore/dot runs collapse to spaces, and
//! camel-cased sigils like `OveMer` select word prefixes. The matcher can
//! also synthesize a short keyword that uniquely identifies an entry
//! against the current index, installing it as an alias when asked to
//! guarantee uniqueness.
//!
//! ```
//! use abbrevmatch::AbbrevMatcher;
//!
//! let mut m = AbbrevMatcher::new();
//! m.add_phrase("Overall merit", 1u32, 0);
//! m.add_phrase("Overall review quality", 2u32, 0);
//!
//! assert_eq!(m.find_all("OveMer", 0), vec![1]);
//! assert_eq!(m.find_all("overall", 0), vec![1, 2]);
//! assert_eq!(m.find_all("Ove*", 0), vec![1, 2]);
//! ```

mod entry;
mod keyword;
mod matcher;
mod pattern;

/// Match-class ladder and scoring.
pub mod ranking;

/// Text normalization primitives.
pub mod text;

pub use entry::{EntryHandle, TFLAG_KW};
pub use keyword::{KW_CAMEL, KW_DASH, KW_ENSURE, KW_UNDERSCORE};
pub use matcher::AbbrevMatcher;
pub use ranking::{MatchClass, get_match_class};
