use core::{fmt, hash};

use crate::flags::TyFlags;
use crate::kind::TyKind;

/// An interned type node: the structural kind plus flags cached at intern
/// time. Nodes live in the interner's arena and are never mutated.
///
/// The alignment guarantees three zero low bits in every node address, which
/// the IR layer relies on to pack a value-category tag (and to leave spare
/// bits for tagged-union embedding) into a node pointer.
#[derive(Debug)]
#[repr(align(8))]
pub struct TyNode<'t> {
    flags: TyFlags,
    kind: TyKind<'t>,
}

static_assertions::const_assert!(align_of::<TyNode<'static>>() >= 8);

impl<'t> TyNode<'t> {
    pub(crate) fn new(kind: TyKind<'t>, flags: TyFlags) -> Self {
        Self { flags, kind }
    }

    pub fn kind(&self) -> &TyKind<'t> {
        &self.kind
    }

    pub fn flags(&self) -> TyFlags {
        self.flags
    }
}

// Equality and hashing ignore the flags: they are a pure function of the
// kind, and the hash-consing set is keyed on structure.
impl<'t> PartialEq for TyNode<'t> {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}
impl<'t> Eq for TyNode<'t> {}

impl<'t> hash::Hash for TyNode<'t> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
    }
}

/// A canonical type reference with pointer-identity equality.
///
/// Two `CanTy` values are equal if and only if they point at the same node.
/// This is sound only because [`TyInterner`](crate::TyInterner) deduplicates
/// structurally equal kinds; never compare canonical types structurally, and
/// never mix references from different interners in one comparison.
#[derive(Clone, Copy)]
pub struct CanTy<'t>(&'t TyNode<'t>);

impl<'t> CanTy<'t> {
    /// Wraps a node reference.
    ///
    /// The node must have been produced by the session's interner; a node
    /// allocated anywhere else silently breaks the identity-equality
    /// contract. Outside this crate the only legitimate source of node
    /// references is a previously obtained `CanTy`.
    pub fn from_node(node: &'t TyNode<'t>) -> Self {
        Self(node)
    }

    pub fn node(self) -> &'t TyNode<'t> {
        self.0
    }

    pub fn kind(self) -> &'t TyKind<'t> {
        self.0.kind()
    }

    pub fn flags(self) -> TyFlags {
        self.0.flags()
    }
}

impl<'t> PartialEq for CanTy<'t> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.0, other.0)
    }
}
impl<'t> Eq for CanTy<'t> {}

impl<'t> hash::Hash for CanTy<'t> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        core::ptr::hash(self.0, state)
    }
}

impl<'t> fmt::Debug for CanTy<'t> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Render the structure, not the address; addresses are useless in
        // test failures.
        write!(f, "CanTy({})", self)
    }
}
