//! Tagged pointers for arena-allocated values.
//!
//! A `TaggedRef<'a, T, BITS>` packs a reference and a small integer tag into a
//! single `usize`. The tag lives in the low bits of the pointer, which are
//! known to be zero when `T`'s alignment is at least `1 << BITS`:
//!
//! ```text
//! TaggedRef<T, 3>:  [ pointer bits ... | t2 t1 t0 ]
//!                                        └────────┘
//!                                         low bits
//! ```
//!
//! This matters when a reference is copied pervasively and the discriminating
//! information alongside it must not widen the value past one machine word,
//! for example IR value handles used as hash-map keys.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use opal_tagged_ref::TaggedRef;
//!
//! #[repr(align(8))]
//! struct Node(u32);
//!
//! let arena = Bump::new();
//! let node = arena.alloc(Node(7));
//!
//! let tagged: TaggedRef<Node, 3> = TaggedRef::new(node, 0b101);
//! assert_eq!(tagged.tag(), 0b101);
//! assert_eq!(tagged.get().unwrap().0, 7);
//! ```
//!
//! # Gotchas
//!
//! - **Alignment is the contract**: constructing a `TaggedRef<T, BITS>` where
//!   `align_of::<T>() < 1 << BITS` is rejected at compile time.
//! - **No drop**: the referent is borrowed, never owned.

#![no_std]

use core::{fmt, hash, marker::PhantomData};

/// A reference packed together with a `BITS`-wide integer tag in one word.
///
/// The null value (no referent) is representable; see [`TaggedRef::null`].
/// Equality and hashing are over the packed word, so two tagged refs are
/// equal iff they name the same referent *and* carry the same tag.
pub struct TaggedRef<'a, T, const BITS: u32> {
    raw: usize,
    phantom: PhantomData<&'a T>,
}

static_assertions::assert_eq_size!(TaggedRef<u64, 3>, usize);
static_assertions::assert_eq_size!(Option<TaggedRef<u64, 3>>, [usize; 2]);

impl<'a, T, const BITS: u32> TaggedRef<'a, T, BITS> {
    const TAG_MASK: usize = (1 << BITS) - 1;

    /// Packs `target` and `tag` into one word.
    ///
    /// Panics if `tag` does not fit in `BITS` bits. Fails to compile if `T`'s
    /// alignment leaves fewer than `BITS` low bits free.
    pub fn new(target: &'a T, tag: usize) -> Self {
        const {
            assert!(
                align_of::<T>() >= 1 << BITS,
                "referent alignment too small for the requested tag width"
            );
        }
        assert!(tag <= Self::TAG_MASK, "tag does not fit in tag bits");
        let addr = target as *const T as usize;
        debug_assert_eq!(addr & Self::TAG_MASK, 0);
        Self {
            raw: addr | tag,
            phantom: PhantomData,
        }
    }

    /// The null tagged ref: no referent, zero tag.
    pub const fn null() -> Self {
        Self {
            raw: 0,
            phantom: PhantomData,
        }
    }

    /// True if the pointer part is null, regardless of the tag bits.
    pub const fn is_null(self) -> bool {
        self.raw & !Self::TAG_MASK == 0
    }

    /// Returns the referent, or `None` if the pointer part is null.
    pub fn get(self) -> Option<&'a T> {
        let addr = self.raw & !Self::TAG_MASK;
        // SAFETY: a non-null pointer part either came from `new` (a live
        // `&'a T`) or from `from_raw`, whose contract requires the pointer
        // part to be null, live for 'a, or never reconstituted via `get`.
        unsafe { (addr as *const T).as_ref() }
    }

    /// The tag bits.
    pub const fn tag(self) -> usize {
        self.raw & Self::TAG_MASK
    }

    /// Returns the same referent with all tag bits replaced by `tag`.
    pub fn with_tag(self, tag: usize) -> Self {
        assert!(tag <= Self::TAG_MASK, "tag does not fit in tag bits");
        Self {
            raw: (self.raw & !Self::TAG_MASK) | tag,
            phantom: PhantomData,
        }
    }

    /// Exports the packed word. Lossless; see [`TaggedRef::from_raw`].
    pub const fn into_raw(self) -> usize {
        self.raw
    }

    /// Rebuilds a tagged ref from a packed word.
    ///
    /// # Safety
    ///
    /// `raw` must be zero in its pointer part, or a value previously obtained
    /// from [`TaggedRef::into_raw`] whose referent is still live for `'a`, or
    /// a sentinel bit pattern on which [`TaggedRef::get`] is never called.
    pub const unsafe fn from_raw(raw: usize) -> Self {
        Self {
            raw,
            phantom: PhantomData,
        }
    }
}

impl<T, const BITS: u32> Clone for TaggedRef<'_, T, BITS> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T, const BITS: u32> Copy for TaggedRef<'_, T, BITS> {}

impl<T, const BITS: u32> PartialEq for TaggedRef<'_, T, BITS> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}
impl<T, const BITS: u32> Eq for TaggedRef<'_, T, BITS> {}

impl<T, const BITS: u32> hash::Hash for TaggedRef<'_, T, BITS> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T, const BITS: u32> Default for TaggedRef<'_, T, BITS> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T: fmt::Debug, const BITS: u32> fmt::Debug for TaggedRef<'_, T, BITS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(target) => write!(f, "TaggedRef({:?}, tag={})", target, self.tag()),
            None => write!(f, "TaggedRef(null, tag={})", self.tag()),
        }
    }
}

// Important: use correct semantics for references.
unsafe impl<T: Sync, const BITS: u32> Send for TaggedRef<'_, T, BITS> {}
unsafe impl<T: Sync, const BITS: u32> Sync for TaggedRef<'_, T, BITS> {}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;

    use super::TaggedRef;

    #[repr(align(8))]
    #[derive(Debug, PartialEq)]
    struct Node(u32);

    #[test]
    fn new_roundtrip() {
        let arena = Bump::new();
        let node = arena.alloc(Node(42));
        let tagged: TaggedRef<Node, 3> = TaggedRef::new(node, 5);
        assert_eq!(tagged.tag(), 5);
        assert_eq!(tagged.get(), Some(&Node(42)));
        assert!(!tagged.is_null());
    }

    #[test]
    fn null_has_no_referent() {
        let tagged: TaggedRef<Node, 3> = TaggedRef::null();
        assert!(tagged.is_null());
        assert_eq!(tagged.get(), None);
        assert_eq!(tagged.tag(), 0);
    }

    #[test]
    fn with_tag_keeps_referent() {
        let arena = Bump::new();
        let node = arena.alloc(Node(7));
        let a: TaggedRef<Node, 3> = TaggedRef::new(node, 1);
        let b = a.with_tag(6);
        assert_eq!(b.tag(), 6);
        assert_eq!(b.get(), Some(&Node(7)));
        assert_eq!(
            a.into_raw() & !0b111,
            b.into_raw() & !0b111,
            "pointer part must be unchanged"
        );
    }

    #[test]
    fn tag_affects_equality() {
        let arena = Bump::new();
        let node = arena.alloc(Node(7));
        let a: TaggedRef<Node, 3> = TaggedRef::new(node, 1);
        let b: TaggedRef<Node, 3> = TaggedRef::new(node, 2);
        assert_ne!(a, b);
        assert_eq!(a, b.with_tag(1));
    }

    #[test]
    fn distinct_referents_not_equal() {
        let arena = Bump::new();
        let x = arena.alloc(Node(1));
        let y = arena.alloc(Node(1));
        let a: TaggedRef<Node, 3> = TaggedRef::new(x, 0);
        let b: TaggedRef<Node, 3> = TaggedRef::new(y, 0);
        assert_ne!(a, b, "equality is identity, not structure");
    }

    #[test]
    fn raw_roundtrip() {
        let arena = Bump::new();
        let node = arena.alloc(Node(9));
        let a: TaggedRef<Node, 3> = TaggedRef::new(node, 3);
        let b = unsafe { TaggedRef::<Node, 3>::from_raw(a.into_raw()) };
        assert_eq!(a, b);
        assert_eq!(b.get(), Some(&Node(9)));
    }

    #[test]
    fn null_tagged_sentinels_are_distinct() {
        // Patterns with a null pointer part but nonzero tag bits are legal
        // sentinels: never dereferenced, never equal to a real reference.
        let empty = unsafe { TaggedRef::<Node, 3>::from_raw(0b010) };
        let tombstone = unsafe { TaggedRef::<Node, 3>::from_raw(0b100) };
        assert!(empty.is_null());
        assert!(tombstone.is_null());
        assert_ne!(empty, tombstone);
        assert_ne!(empty, TaggedRef::<Node, 3>::null());
        assert_eq!(empty.get(), None);
    }

    #[test]
    fn send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<TaggedRef<Node, 3>>();
        assert_sync::<TaggedRef<Node, 3>>();
    }
}
