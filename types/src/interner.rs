use bumpalo::Bump;
use core::cell::RefCell;
use core::{fmt, hash};
use hashbrown::{DefaultHashBuilder, HashSet};

use crate::decls::{
    ClassDef, DeclRef, EnumCase, EnumDef, Field, ProtocolDef, StructDef,
};
use crate::kind::{
    ArchetypeTy, Builtin, ExistentialTy, FnRepr, FnSig, MetatypeRepr, RefStorageKind, TyKind,
};
use crate::ty::{CanTy, TyNode};

/// An interned string reference with pointer-based equality.
///
/// Two `InternedStr` values are equal if and only if they point to the same
/// memory location, which the interner guarantees for identical contents.
#[derive(Clone, Copy)]
pub struct InternedStr<'t>(&'t str);

impl<'t> InternedStr<'t> {
    pub fn as_str(&self) -> &'t str {
        self.0
    }
}

impl<'t> AsRef<str> for InternedStr<'t> {
    fn as_ref(&self) -> &str {
        self.0
    }
}

impl<'t> fmt::Debug for InternedStr<'t> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.0, f)
    }
}

impl<'t> fmt::Display for InternedStr<'t> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.0, f)
    }
}

impl<'t> PartialEq for InternedStr<'t> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.0.as_ptr(), other.0.as_ptr())
    }
}
impl<'t> Eq for InternedStr<'t> {}

impl<'t> hash::Hash for InternedStr<'t> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.0.as_ptr().hash(state)
    }
}

type NodeSet<'t> = HashSet<&'t TyNode<'t>, DefaultHashBuilder, &'t Bump>;
type StrSet<'t> = HashSet<&'t str, DefaultHashBuilder, &'t Bump>;

/// The canonicalization authority for one compilation session.
///
/// Types are hash-consed in a bump arena: interning a structurally equal kind
/// twice returns the same node pointer, which is what makes pointer-identity
/// equality on [`CanTy`] sound. Exactly one interner must serve all canonical
/// types that are ever compared against each other; it lives as long as the
/// session's arena and is never torn down while handles are in flight.
///
/// Declarations (structs, classes, enums, protocols) are allocated but not
/// deduplicated: each call mints a distinct entity.
#[derive(Copy, Clone)]
pub struct TyInterner<'t> {
    arena: &'t Bump,
    nodes: &'t RefCell<NodeSet<'t>>,
    strs: &'t RefCell<StrSet<'t>>,
}

impl<'t> fmt::Debug for TyInterner<'t> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TyInterner")
            .field("arena", &(self.arena as *const Bump))
            .finish_non_exhaustive()
    }
}

// Two interners are the same authority iff they share an arena.
impl<'t> PartialEq for TyInterner<'t> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.arena, other.arena)
    }
}
impl<'t> Eq for TyInterner<'t> {}

impl<'t> hash::Hash for TyInterner<'t> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        core::ptr::hash(self.arena, state)
    }
}

impl<'t> TyInterner<'t> {
    pub fn new(arena: &'t Bump) -> Self {
        let nodes = arena.alloc(RefCell::new(HashSet::with_capacity_in(256, arena)));
        let strs = arena.alloc(RefCell::new(HashSet::with_capacity_in(256, arena)));
        Self { arena, nodes, strs }
    }

    /// Interns a kind, returning the canonical node for it.
    pub fn intern(&self, kind: TyKind<'t>) -> CanTy<'t> {
        let node = TyNode::new(kind, kind.compute_flags(self));
        if let Some(&existing) = self.nodes.borrow().get(&node) {
            return CanTy::from_node(existing);
        }
        let allocated: &'t TyNode<'t> = self.arena.alloc(node);
        self.nodes.borrow_mut().insert(allocated);
        CanTy::from_node(allocated)
    }

    pub fn intern_str(&self, s: impl AsRef<str>) -> InternedStr<'t> {
        let s = s.as_ref();
        let mut set = self.strs.borrow_mut();
        if let Some(&interned) = set.get(s) {
            return InternedStr(interned);
        }
        let allocated = self.arena.alloc_str(s);
        set.insert(allocated);
        InternedStr(allocated)
    }

    /// Allocates a type list in the arena. Lists are not deduplicated; node
    /// interning compares them by content.
    pub fn alloc_tys(
        &self,
        iter: impl IntoIterator<Item = CanTy<'t>, IntoIter: ExactSizeIterator>,
    ) -> &'t [CanTy<'t>] {
        self.arena.alloc_slice_fill_iter(iter)
    }

    pub fn alloc_protocols(
        &self,
        iter: impl IntoIterator<Item = DeclRef<'t, ProtocolDef<'t>>, IntoIter: ExactSizeIterator>,
    ) -> &'t [DeclRef<'t, ProtocolDef<'t>>] {
        self.arena.alloc_slice_fill_iter(iter)
    }

    // === Declarations ===

    pub fn struct_def<S: AsRef<str>>(
        &self,
        name: impl AsRef<str>,
        generic_params: u16,
        resilient: bool,
        fields: impl IntoIterator<Item = (S, CanTy<'t>), IntoIter: ExactSizeIterator>,
    ) -> DeclRef<'t, StructDef<'t>> {
        let fields = self.arena.alloc_slice_fill_iter(
            fields.into_iter().map(|(name, ty)| Field {
                name: self.intern_str(name),
                ty,
            }),
        );
        DeclRef::new(self.arena.alloc(StructDef {
            name: self.intern_str(name),
            generic_params,
            fields,
            resilient,
        }))
    }

    pub fn class_def<S: AsRef<str>>(
        &self,
        name: impl AsRef<str>,
        generic_params: u16,
        superclass: Option<CanTy<'t>>,
        fields: impl IntoIterator<Item = (S, CanTy<'t>), IntoIter: ExactSizeIterator>,
    ) -> DeclRef<'t, ClassDef<'t>> {
        let fields = self.arena.alloc_slice_fill_iter(
            fields.into_iter().map(|(name, ty)| Field {
                name: self.intern_str(name),
                ty,
            }),
        );
        DeclRef::new(self.arena.alloc(ClassDef {
            name: self.intern_str(name),
            generic_params,
            superclass,
            fields,
        }))
    }

    pub fn enum_def<S: AsRef<str>>(
        &self,
        name: impl AsRef<str>,
        generic_params: u16,
        resilient: bool,
        cases: impl IntoIterator<Item = (S, Option<CanTy<'t>>), IntoIter: ExactSizeIterator>,
    ) -> DeclRef<'t, EnumDef<'t>> {
        let cases = self.arena.alloc_slice_fill_iter(
            cases.into_iter().map(|(name, payload)| EnumCase {
                name: self.intern_str(name),
                payload,
            }),
        );
        DeclRef::new(self.arena.alloc(EnumDef {
            name: self.intern_str(name),
            generic_params,
            cases,
            resilient,
        }))
    }

    pub fn protocol_def(
        &self,
        name: impl AsRef<str>,
        class_constrained: bool,
        boxed: bool,
    ) -> DeclRef<'t, ProtocolDef<'t>> {
        DeclRef::new(self.arena.alloc(ProtocolDef {
            name: self.intern_str(name),
            class_constrained,
            boxed,
        }))
    }

    // === Type constructors ===

    pub fn builtin(&self, builtin: Builtin) -> CanTy<'t> {
        self.intern(TyKind::Builtin(builtin))
    }

    pub fn struct_ty(
        &self,
        def: DeclRef<'t, StructDef<'t>>,
        args: impl IntoIterator<Item = CanTy<'t>, IntoIter: ExactSizeIterator>,
    ) -> CanTy<'t> {
        let args = self.alloc_tys(args);
        debug_assert_eq!(args.len(), def.generic_params as usize);
        self.intern(TyKind::Struct { def, args })
    }

    pub fn class_ty(
        &self,
        def: DeclRef<'t, ClassDef<'t>>,
        args: impl IntoIterator<Item = CanTy<'t>, IntoIter: ExactSizeIterator>,
    ) -> CanTy<'t> {
        let args = self.alloc_tys(args);
        debug_assert_eq!(args.len(), def.generic_params as usize);
        self.intern(TyKind::Class { def, args })
    }

    pub fn enum_ty(
        &self,
        def: DeclRef<'t, EnumDef<'t>>,
        args: impl IntoIterator<Item = CanTy<'t>, IntoIter: ExactSizeIterator>,
    ) -> CanTy<'t> {
        let args = self.alloc_tys(args);
        debug_assert_eq!(args.len(), def.generic_params as usize);
        self.intern(TyKind::Enum { def, args })
    }

    pub fn tuple(
        &self,
        elems: impl IntoIterator<Item = CanTy<'t>, IntoIter: ExactSizeIterator>,
    ) -> CanTy<'t> {
        self.intern(TyKind::Tuple(self.alloc_tys(elems)))
    }

    /// The empty tuple, the canonical void type.
    pub fn unit(&self) -> CanTy<'t> {
        self.tuple([])
    }

    pub fn optional(&self, payload: CanTy<'t>) -> CanTy<'t> {
        self.intern(TyKind::Optional(payload))
    }

    /// A source-level function type. Not legal under an IR handle.
    pub fn fn_ty(
        &self,
        params: impl IntoIterator<Item = CanTy<'t>, IntoIter: ExactSizeIterator>,
        result: CanTy<'t>,
    ) -> CanTy<'t> {
        self.intern(TyKind::Fn {
            params: self.alloc_tys(params),
            result,
        })
    }

    /// A lowered, non-generic, returning function type.
    pub fn lowered_fn(
        &self,
        repr: FnRepr,
        params: impl IntoIterator<Item = CanTy<'t>, IntoIter: ExactSizeIterator>,
        result: CanTy<'t>,
    ) -> CanTy<'t> {
        self.lowered_fn_sig(FnSig {
            params: self.alloc_tys(params),
            result,
            repr,
            no_return: false,
            generic_params: 0,
        })
    }

    pub fn lowered_fn_sig(&self, sig: FnSig<'t>) -> CanTy<'t> {
        self.intern(TyKind::LoweredFn(sig))
    }

    /// A source-level l-value type. Not legal under an IR handle.
    pub fn lvalue(&self, referent: CanTy<'t>) -> CanTy<'t> {
        self.intern(TyKind::LValue(referent))
    }

    pub fn existential(
        &self,
        protocols: impl IntoIterator<Item = DeclRef<'t, ProtocolDef<'t>>, IntoIter: ExactSizeIterator>,
        superclass: Option<CanTy<'t>>,
        class_bound: bool,
    ) -> CanTy<'t> {
        self.intern(TyKind::Existential(ExistentialTy {
            protocols: self.alloc_protocols(protocols),
            superclass,
            class_bound,
        }))
    }

    /// The `AnyObject` layout-constraint existential.
    pub fn any_object(&self) -> CanTy<'t> {
        self.existential([], None, true)
    }

    pub fn existential_metatype(&self, instance: CanTy<'t>) -> CanTy<'t> {
        debug_assert!(
            matches!(instance.kind(), TyKind::Existential(_)),
            "existential metatype over non-existential {instance}"
        );
        self.intern(TyKind::ExistentialMetatype(instance))
    }

    pub fn metatype(&self, instance: CanTy<'t>, repr: MetatypeRepr) -> CanTy<'t> {
        self.intern(TyKind::Metatype { instance, repr })
    }

    pub fn archetype(&self, archetype: ArchetypeTy<'t>) -> CanTy<'t> {
        self.intern(TyKind::Archetype(archetype))
    }

    pub fn param(&self, index: u16) -> CanTy<'t> {
        self.intern(TyKind::Param(index))
    }

    pub fn box_ty(&self, contents: CanTy<'t>) -> CanTy<'t> {
        self.intern(TyKind::Box(contents))
    }

    pub fn ref_storage(&self, kind: RefStorageKind, referent: CanTy<'t>) -> CanTy<'t> {
        self.intern(TyKind::RefStorage { kind, referent })
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn interning_dedups_structurally_equal_kinds() {
        let arena = Bump::new();
        let tc = TyInterner::new(&arena);

        let a = tc.builtin(Builtin::Int(64));
        let b = tc.builtin(Builtin::Int(64));
        assert!(core::ptr::eq(a.node(), b.node()));
        assert_eq!(a, b);

        let t1 = tc.tuple([a, b]);
        let t2 = tc.tuple([b, a]);
        assert_eq!(t1, t2);
    }

    #[test]
    fn distinct_kinds_intern_to_distinct_nodes() {
        let arena = Bump::new();
        let tc = TyInterner::new(&arena);

        let i32_ty = tc.builtin(Builtin::Int(32));
        let i64_ty = tc.builtin(Builtin::Int(64));
        assert_ne!(i32_ty, i64_ty);
        assert_ne!(tc.optional(i32_ty), tc.optional(i64_ty));
    }

    #[test]
    fn interned_strings_share_storage() {
        let arena = Bump::new();
        let tc = TyInterner::new(&arena);

        assert_eq!(tc.intern_str("value"), tc.intern_str("value"));
        assert_ne!(tc.intern_str("value"), tc.intern_str("other"));
    }

    #[test]
    fn decls_are_entities_not_values() {
        let arena = Bump::new();
        let tc = TyInterner::new(&arena);
        let int = tc.builtin(Builtin::Int(64));

        let a = tc.struct_def("Pair", 0, false, [("x", int), ("y", int)]);
        let b = tc.struct_def("Pair", 0, false, [("x", int), ("y", int)]);
        assert_ne!(a, b);
        assert_ne!(tc.struct_ty(a, []), tc.struct_ty(b, []));
        assert_eq!(tc.struct_ty(a, []), tc.struct_ty(a, []));
    }

    #[test]
    fn flags_propagate_through_aggregates() {
        let arena = Bump::new();
        let tc = TyInterner::new(&arena);

        let param = tc.param(0);
        let tuple = tc.tuple([tc.builtin(Builtin::Word), param]);
        assert!(tuple.flags().contains(crate::TyFlags::HAS_TYPE_PARAMETER));

        let lvalue = tc.lvalue(tc.builtin(Builtin::Word));
        let opt = tc.optional(lvalue);
        assert!(opt.flags().contains(crate::TyFlags::NOT_LEGAL_LOWERED));
    }

    #[test]
    fn generic_nominal_flags_follow_their_arguments() {
        let arena = Bump::new();
        let tc = TyInterner::new(&arena);

        let int32 = tc.builtin(Builtin::Int(32));
        let node_def = tc.class_def::<&str>("Node", 0, None, []);
        let node = tc.class_ty(node_def, []);

        let wrap = tc.struct_def("Wrap", 1, false, [("value", tc.param(0))]);
        assert!(!tc.struct_ty(wrap, [int32]).flags().contains(crate::TyFlags::NON_TRIVIAL));
        assert!(tc.struct_ty(wrap, [node]).flags().contains(crate::TyFlags::NON_TRIVIAL));

        let choice = tc.enum_def(
            "Choice",
            1,
            false,
            [("some", Some(tc.param(0))), ("none", None)],
        );
        assert!(!tc.enum_ty(choice, [int32]).flags().contains(crate::TyFlags::NON_TRIVIAL));
        assert!(tc.enum_ty(choice, [node]).flags().contains(crate::TyFlags::NON_TRIVIAL));

        // An argument the declaration never stores contributes structure,
        // not layout.
        let phantom = tc.struct_def::<&str>("Phantom", 1, false, []);
        assert!(!tc.struct_ty(phantom, [node]).flags().contains(crate::TyFlags::NON_TRIVIAL));
        assert!(
            tc.struct_ty(phantom, [tc.param(0)])
                .flags()
                .contains(crate::TyFlags::HAS_TYPE_PARAMETER)
        );
    }
}
