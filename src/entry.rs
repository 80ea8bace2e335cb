//! Entry storage: registered names, their payloads, and tag bitfields.

use std::rc::Rc;

/// Tag bit marking a keyword entry: a single token matched by exact
/// lowercased equality ahead of any phrase match.
pub const TFLAG_KW: u32 = 0x1000_0000;

/// Low bits of `tflags` selecting an entry's priority tier.
pub(crate) const TFLAG_TIER_MASK: u32 = 0xff;

/// Shared loader for lazily produced payloads. Alias entries (camel twins,
/// deparenthesized clones, installed keywords) hold clones of the same
/// `Rc`, and each entry invokes it at most once.
pub(crate) type Loader<V> = Rc<dyn Fn() -> V>;

/// A payload that is either present or produced on first use.
pub(crate) enum EntryValue<V> {
    /// Value supplied at registration.
    Eager(V),
    /// Value produced once by `loader` and memoized in `cached`.
    Lazy {
        loader: Loader<V>,
        cached: Option<V>,
    },
}

/// One registered name with its payload and tag bits.
pub(crate) struct Entry<V> {
    /// Display name, whitespace-simplified and accent-folded at insertion.
    pub(crate) name: String,
    /// `name` with separator runs collapsed to spaces; filled at analysis.
    pub(crate) dedash_name: Option<String>,
    pub(crate) value: EntryValue<V>,
    pub(crate) tflags: u32,
}

impl<V> Entry<V> {
    pub(crate) fn new(name: String, value: EntryValue<V>, tflags: u32) -> Self {
        Self {
            name,
            dedash_name: None,
            value,
            tflags,
        }
    }

    pub(crate) fn is_keyword(&self) -> bool {
        self.tflags & TFLAG_KW != 0
    }

    pub(crate) fn tier(&self) -> u32 {
        self.tflags & TFLAG_TIER_MASK
    }
}

impl<V: Clone> Entry<V> {
    /// The entry's payload, loading and memoizing it on first access.
    pub(crate) fn value(&mut self) -> &V {
        match &mut self.value {
            EntryValue::Eager(v) => v,
            EntryValue::Lazy { loader, cached } => cached.get_or_insert_with(|| loader()),
        }
    }

    /// A payload for an alias entry: already-known values are copied, while
    /// a pending loader is shared so the underlying work still runs once
    /// per entry.
    pub(crate) fn share_value(&self) -> EntryValue<V> {
        match &self.value {
            EntryValue::Eager(v) => EntryValue::Eager(v.clone()),
            EntryValue::Lazy { loader, cached } => match cached {
                Some(v) => EntryValue::Eager(v.clone()),
                None => EntryValue::Lazy {
                    loader: Rc::clone(loader),
                    cached: None,
                },
            },
        }
    }
}

/// Opaque handle to a registered entry.
///
/// Handles are positions in the append-only entry list, so they stay valid
/// across later `add_*` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle(pub(crate) usize);

impl EntryHandle {
    /// The entry's position in registration order.
    pub fn index(self) -> usize {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn lazy_value_loads_once() {
        let calls = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&calls);
        let mut e = Entry::new(
            "x".to_owned(),
            EntryValue::Lazy {
                loader: Rc::new(move || {
                    c.set(c.get() + 1);
                    7u32
                }),
                cached: None,
            },
            0,
        );
        assert_eq!(*e.value(), 7);
        assert_eq!(*e.value(), 7);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn share_value_copies_materialized_payload() {
        let mut e = Entry::new("x".to_owned(), EntryValue::Eager(3u32), 0);
        let mut alias = Entry::new("y".to_owned(), e.share_value(), 0);
        assert_eq!(*alias.value(), 3);
        assert_eq!(*e.value(), 3);
    }

    #[test]
    fn share_value_shares_pending_loader() {
        let calls = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&calls);
        let e = Entry::new(
            "x".to_owned(),
            EntryValue::Lazy {
                loader: Rc::new(move || {
                    c.set(c.get() + 1);
                    9u32
                }),
                cached: None,
            },
            0,
        );
        let mut a = Entry::new("a".to_owned(), e.share_value(), 0);
        let mut b = Entry::new("b".to_owned(), e.share_value(), 0);
        assert_eq!(*a.value(), 9);
        assert_eq!(*b.value(), 9);
        // One call per entry that actually materialized.
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn keyword_flag_and_tier() {
        let e = Entry::new("k".to_owned(), EntryValue::Eager(0u8), TFLAG_KW | 0x42);
        assert!(e.is_keyword());
        assert_eq!(e.tier(), 0x42);
    }
}
