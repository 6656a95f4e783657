//! The lowered-type handle.

use core::fmt;

use opal_tagged_ref::TaggedRef;
use opal_types::{Builtin, CanTy, TyInterner, TyNode};

use crate::lower::LoweringToken;

/// How an IR value of some type is held.
///
/// An *object* is the value itself, in a register or an immediately loadable
/// position. An *address* is a pointer to a memory location holding such a
/// value. The two are never interchangeable: every IR operand states which
/// one it takes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ValueCategory {
    Object = 0,
    Address = 1,
}

/// Tag layout of the packed handle word. Bit 0 is the category; bits 1 and 2
/// are permanently zero in live handles so containers embedding exported
/// words (see [`OirType::to_opaque`]) can tag them.
pub(crate) const TAG_BITS: u32 = 3;
const CATEGORY_MASK: usize = 0b001;

const EMPTY_KEY_RAW: usize = 0b010;
const TOMBSTONE_KEY_RAW: usize = 0b100;

/// A canonical lowered type paired with a [`ValueCategory`], packed into one
/// machine word.
///
/// Handles are plain values: copy them, compare them, key maps with them.
/// Equality is pointer identity on the canonical type plus the category,
/// which is sound because every type reachable from a handle was interned by
/// the session's single [`TyInterner`].
///
/// A handle never wraps a source-level function or l-value type; every
/// constructor checks [`CanTy::is_legal_lowered_type`] and aborts on
/// violation, so downstream IR passes can rely on it without re-checking.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OirType<'t> {
    value: TaggedRef<'t, TyNode<'t>, TAG_BITS>,
}

static_assertions::assert_eq_size!(OirType<'_>, usize);

impl<'t> OirType<'t> {
    /// Internal packer. Everything that mints a handle funnels through here,
    /// so the legality invariant is checked exactly once per construction.
    pub(crate) fn make(ty: CanTy<'t>, category: ValueCategory) -> Self {
        assert!(
            ty.is_legal_lowered_type(),
            "constructing an IR type over {ty}, which lowering must eliminate"
        );
        Self {
            value: TaggedRef::new(ty.node(), category as usize),
        }
    }

    /// Wraps a canonical type produced by the lowering pipeline.
    ///
    /// The token restricts callers to the lowering boundary; see
    /// [`AbiContext::lowering_token`](crate::AbiContext::lowering_token).
    /// Aborts if `ty` is not a legal lowered type.
    pub fn from_canonical(_: LoweringToken, ty: CanTy<'t>, category: ValueCategory) -> Self {
        Self::make(ty, category)
    }

    /// Wraps a type that needs no lowering, such as a builtin or a fully
    /// concrete trivial aggregate. Aborts if `ty` is not a legal lowered
    /// type. Types whose representation lowering *does* change must go
    /// through [`OirType::from_canonical`] instead.
    pub fn primitive(ty: CanTy<'t>, category: ValueCategory) -> Self {
        Self::make(ty, category)
    }

    pub fn primitive_object(ty: CanTy<'t>) -> Self {
        Self::make(ty, ValueCategory::Object)
    }

    pub fn primitive_address(ty: CanTy<'t>) -> Self {
        Self::make(ty, ValueCategory::Address)
    }

    /// The null handle: no type, object category. Useful as a "not yet
    /// computed" placeholder; most operations abort on it.
    pub const fn null() -> Self {
        Self {
            value: TaggedRef::null(),
        }
    }

    pub const fn is_null(self) -> bool {
        self.value.is_null()
    }

    /// The canonical type under the handle. Aborts on the null handle.
    pub fn canonical_type(self) -> CanTy<'t> {
        match self.value.get() {
            Some(node) => CanTy::from_node(node),
            None => panic!("reading the type of a null IR type handle"),
        }
    }

    // === Category algebra ===

    pub fn category(self) -> ValueCategory {
        if self.value.tag() & CATEGORY_MASK == 0 {
            ValueCategory::Object
        } else {
            ValueCategory::Address
        }
    }

    pub fn is_object(self) -> bool {
        self.category() == ValueCategory::Object
    }

    pub fn is_address(self) -> bool {
        self.category() == ValueCategory::Address
    }

    /// The same type under `category`. Tag bits outside the category are
    /// preserved.
    pub fn with_category(self, category: ValueCategory) -> Self {
        let tag = (self.value.tag() & !CATEGORY_MASK) | category as usize;
        Self {
            value: self.value.with_tag(tag),
        }
    }

    /// The same type as an address. Idempotent.
    pub fn address_type(self) -> Self {
        self.with_category(ValueCategory::Address)
    }

    /// The same type as an object. Idempotent.
    pub fn object_type(self) -> Self {
        self.with_category(ValueCategory::Object)
    }

    /// This handle's type under `other`'s category.
    pub fn copy_category(self, other: Self) -> Self {
        self.with_category(other.category())
    }

    // === Opaque transport ===

    /// Exports the handle as its packed word, for storage in containers that
    /// traffic in `usize`. The word round-trips through
    /// [`OirType::from_opaque`] bit-for-bit.
    pub const fn to_opaque(self) -> usize {
        self.value.into_raw()
    }

    /// Reconstitutes a handle from [`OirType::to_opaque`].
    ///
    /// # Safety
    ///
    /// `raw` must have come from `to_opaque` on a handle whose interner is
    /// still live, or be the null word, or be one of the reserved map keys
    /// ([`OirType::empty_key`], [`OirType::tombstone_key`]).
    pub const unsafe fn from_opaque(raw: usize) -> Self {
        Self {
            // SAFETY: forwarded; the caller's contract matches `from_raw`'s.
            value: unsafe { TaggedRef::from_raw(raw) },
        }
    }

    /// Reserved key for map implementations needing an "empty slot" marker.
    /// Unequal to the null handle and to every real handle; never
    /// dereferenced.
    pub const fn empty_key() -> Self {
        // SAFETY: null pointer part with a reserved tag bit set, so `get`
        // refuses it and nothing is ever read through it.
        unsafe { Self::from_opaque(EMPTY_KEY_RAW) }
    }

    /// Reserved key for map implementations needing a "deleted slot" marker.
    /// Unequal to the null handle, the empty key, and every real handle.
    pub const fn tombstone_key() -> Self {
        // SAFETY: as for `empty_key`.
        unsafe { Self::from_opaque(TOMBSTONE_KEY_RAW) }
    }

    // === Common primitive handles ===

    pub fn native_object(tc: &TyInterner<'t>) -> Self {
        Self::primitive_object(tc.builtin(Builtin::NativeObject))
    }

    pub fn bridge_object(tc: &TyInterner<'t>) -> Self {
        Self::primitive_object(tc.builtin(Builtin::BridgeObject))
    }

    pub fn raw_pointer(tc: &TyInterner<'t>) -> Self {
        Self::primitive_object(tc.builtin(Builtin::RawPointer))
    }

    pub fn builtin_integer(tc: &TyInterner<'t>, width: u16) -> Self {
        Self::primitive_object(tc.builtin(Builtin::Int(width)))
    }

    pub fn builtin_word(tc: &TyInterner<'t>) -> Self {
        Self::primitive_object(tc.builtin(Builtin::Word))
    }

    /// The empty tuple as an object, the IR's void.
    pub fn empty_tuple(tc: &TyInterner<'t>) -> Self {
        Self::primitive_object(tc.unit())
    }

    /// The singleton token type used to sequence effects.
    pub fn token(tc: &TyInterner<'t>) -> Self {
        Self::primitive_object(tc.builtin(Builtin::Token))
    }

    /// Wraps this handle's type in an optional, keeping the category.
    pub fn wrapped_in_optional(self, tc: &TyInterner<'t>) -> Self {
        Self::make(tc.optional(self.canonical_type()), self.category())
    }
}

impl fmt::Display for OirType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("$<null>");
        }
        match self.category() {
            ValueCategory::Object => write!(f, "${}", self.canonical_type()),
            ValueCategory::Address => write!(f, "$*{}", self.canonical_type()),
        }
    }
}

impl fmt::Debug for OirType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OirType({self})")
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use opal_types::TyInterner;
    use pretty_assertions::assert_eq;

    use super::*;

    extern crate std;
    use std::string::ToString;

    #[test]
    fn handle_is_one_word() {
        assert_eq!(size_of::<OirType<'_>>(), size_of::<usize>());
    }

    #[test]
    fn category_lives_in_the_low_bit() {
        let arena = Bump::new();
        let tc = TyInterner::new(&arena);

        let obj = OirType::builtin_word(&tc);
        let addr = obj.address_type();
        assert_eq!(addr.to_opaque(), obj.to_opaque() | 1);
        assert_eq!(addr.object_type(), obj);
    }

    #[test]
    fn display_marks_addresses() {
        let arena = Bump::new();
        let tc = TyInterner::new(&arena);

        let word = OirType::builtin_word(&tc);
        assert_eq!(word.to_string(), "$Builtin.Word");
        assert_eq!(word.address_type().to_string(), "$*Builtin.Word");
        assert_eq!(OirType::null().to_string(), "$<null>");
    }

    #[test]
    #[should_panic(expected = "null IR type")]
    fn null_handle_has_no_type() {
        OirType::null().canonical_type();
    }

    #[test]
    #[should_panic(expected = "lowering must eliminate")]
    fn source_function_types_are_rejected() {
        let arena = Bump::new();
        let tc = TyInterner::new(&arena);

        let int = tc.builtin(Builtin::Int(64));
        OirType::primitive_object(tc.fn_ty([int], int));
    }

    #[test]
    #[should_panic(expected = "lowering must eliminate")]
    fn lvalue_types_are_rejected_even_when_nested() {
        let arena = Bump::new();
        let tc = TyInterner::new(&arena);

        let lvalue = tc.lvalue(tc.builtin(Builtin::Word));
        OirType::primitive_address(tc.tuple([lvalue]));
    }
}
