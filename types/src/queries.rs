//! Structural classification queries on canonical types.
//!
//! Everything here is computable from the type alone; facts that depend on a
//! resilience or module context live behind the lowering boundary in the IR
//! crate instead.

use crate::decls::{ClassDef, DeclRef, EnumDef, StructDef};
use crate::flags::TyFlags;
use crate::kind::{ArchetypeTy, Builtin, ExistentialTy, FnRepr, FnSig, TyKind};
use crate::subst::{SubstOptions, SubstitutionMap, subst};
use crate::ty::CanTy;
use crate::interner::TyInterner;

impl<'t> CanTy<'t> {
    /// True if lowering could have produced this type: no source-level
    /// function or l-value shapes anywhere in the structure.
    pub fn is_legal_lowered_type(self) -> bool {
        !self.flags().contains(TyFlags::NOT_LEGAL_LOWERED)
    }

    pub fn has_type_parameter(self) -> bool {
        self.flags().contains(TyFlags::HAS_TYPE_PARAMETER)
    }

    pub fn has_archetype(self) -> bool {
        self.flags().contains(TyFlags::HAS_ARCHETYPE)
    }

    pub fn has_opened_existential(self) -> bool {
        self.flags().contains(TyFlags::HAS_OPENED_EXISTENTIAL)
    }

    pub fn has_opaque_archetype(self) -> bool {
        self.flags().contains(TyFlags::HAS_OPAQUE_ARCHETYPE)
    }

    /// The empty tuple.
    pub fn is_void(self) -> bool {
        matches!(self.kind(), TyKind::Tuple([]))
    }

    // === Kind accessors ===

    pub fn struct_def(self) -> Option<DeclRef<'t, StructDef<'t>>> {
        match *self.kind() {
            TyKind::Struct { def, .. } => Some(def),
            _ => None,
        }
    }

    pub fn class_def(self) -> Option<DeclRef<'t, ClassDef<'t>>> {
        match *self.kind() {
            TyKind::Class { def, .. } => Some(def),
            _ => None,
        }
    }

    pub fn enum_def(self) -> Option<DeclRef<'t, EnumDef<'t>>> {
        match *self.kind() {
            TyKind::Enum { def, .. } => Some(def),
            _ => None,
        }
    }

    /// Generic arguments of a nominal type, `&[]` when non-generic.
    pub fn nominal_args(self) -> Option<&'t [CanTy<'t>]> {
        match *self.kind() {
            TyKind::Struct { args, .. }
            | TyKind::Class { args, .. }
            | TyKind::Enum { args, .. } => Some(args),
            _ => None,
        }
    }

    pub fn existential_ty(self) -> Option<&'t ExistentialTy<'t>> {
        match self.kind() {
            TyKind::Existential(ext) => Some(ext),
            _ => None,
        }
    }

    pub fn archetype_ty(self) -> Option<&'t ArchetypeTy<'t>> {
        match self.kind() {
            TyKind::Archetype(arch) => Some(arch),
            _ => None,
        }
    }

    pub fn fn_sig(self) -> Option<&'t FnSig<'t>> {
        match self.kind() {
            TyKind::LoweredFn(sig) => Some(sig),
            _ => None,
        }
    }

    pub fn optional_payload(self) -> Option<CanTy<'t>> {
        match *self.kind() {
            TyKind::Optional(payload) => Some(payload),
            _ => None,
        }
    }

    // === Existential classification ===

    pub fn is_existential(self) -> bool {
        matches!(self.kind(), TyKind::Existential(_))
    }

    /// Existential or existential metatype.
    pub fn is_any_existential(self) -> bool {
        matches!(
            self.kind(),
            TyKind::Existential(_) | TyKind::ExistentialMetatype(_)
        )
    }

    pub fn is_class_existential(self) -> bool {
        self.existential_ty().is_some_and(|e| e.requires_class())
    }

    /// True for the archetype produced by opening an existential.
    pub fn is_opened_existential(self) -> bool {
        self.archetype_ty().is_some_and(|a| a.opened)
    }

    /// Exactly the `AnyObject` constraint.
    pub fn is_any_object(self) -> bool {
        self.existential_ty().is_some_and(|e| e.is_any_object())
    }

    // === Reference shape classification ===

    /// Any sort of class-reference type: class, class-bound archetype,
    /// class-constrained existential, or a builtin managed reference.
    pub fn is_any_class_reference_type(self) -> bool {
        match self.kind() {
            TyKind::Class { .. } => true,
            TyKind::Archetype(arch) => arch.class_bound,
            TyKind::Existential(ext) => ext.requires_class(),
            TyKind::Builtin(Builtin::NativeObject | Builtin::BridgeObject) => true,
            _ => false,
        }
    }

    /// True if values of this type are retained/released, even where the
    /// lowered representation happens to be trivial.
    pub fn has_reference_semantics(self) -> bool {
        self.is_any_class_reference_type()
            || matches!(self.kind(), TyKind::Box(_))
            || self.fn_sig().is_some_and(|sig| sig.repr == FnRepr::Thick)
    }

    /// True if the value is guaranteed to be one retainable pointer, looking
    /// through one level of optionality (a nullable pointer still is one).
    /// Existentials qualify only as bare `AnyObject`; witness tables widen
    /// every other container.
    pub fn has_retainable_pointer_representation(self) -> bool {
        let ty = self.optional_payload().unwrap_or(self);
        match ty.kind() {
            TyKind::Class { .. } => true,
            TyKind::Archetype(arch) => arch.class_bound,
            TyKind::Builtin(Builtin::NativeObject | Builtin::BridgeObject) => true,
            TyKind::Existential(ext) => ext.is_any_object(),
            _ => false,
        }
    }

    /// True if the type can be adopted as an object pointer by bridged
    /// containers. Coincides with the retainable-pointer test.
    pub fn is_bridgeable_object(self) -> bool {
        self.has_retainable_pointer_representation()
    }

    /// True for references with a single-pointer heap-object representation.
    /// Class existentials other than `AnyObject` do not qualify: their
    /// containers carry witness tables next to the reference.
    pub fn is_heap_object_reference(self) -> bool {
        match self.kind() {
            TyKind::Class { .. } | TyKind::Box(_) => true,
            TyKind::Archetype(arch) => arch.class_bound,
            TyKind::Builtin(Builtin::NativeObject) => true,
            TyKind::Existential(ext) => ext.is_any_object(),
            _ => false,
        }
    }

    /// Class or class metatype, looking through one level of metatype.
    pub fn is_class_or_class_metatype(self) -> bool {
        match *self.kind() {
            TyKind::Metatype { instance, .. } => instance.class_def().is_some(),
            _ => self.class_def().is_some(),
        }
    }

    // === Subtyping ===

    /// The immediate superclass, with this type's generic arguments applied,
    /// or `None` for most-derived classes and non-class types. Existentials
    /// report their explicit superclass bound.
    pub fn superclass(self, tc: &TyInterner<'t>) -> Option<CanTy<'t>> {
        match *self.kind() {
            TyKind::Class { def, args } => def.superclass.map(|sup| {
                subst(
                    tc,
                    sup,
                    &SubstitutionMap::from_args(args),
                    SubstOptions::default(),
                )
            }),
            TyKind::Existential(ext) => ext.superclass,
            _ => None,
        }
    }

    /// True if `other` is this exact type or a transitive subclass of it.
    pub fn is_exact_superclass_of(self, other: CanTy<'t>, tc: &TyInterner<'t>) -> bool {
        let mut current = Some(other);
        while let Some(ty) = current {
            if ty == self {
                return true;
            }
            current = ty.superclass(tc);
        }
        false
    }

    /// Like [`CanTy::is_exact_superclass_of`], but archetypes and parameters
    /// in this type are treated as bindable wildcards, so a generic pattern
    /// can match any concrete instantiation along `other`'s superclass chain.
    pub fn is_bindable_to_superclass_of(self, other: CanTy<'t>, tc: &TyInterner<'t>) -> bool {
        let mut current = Some(other);
        while let Some(ty) = current {
            if can_bind(self, ty) {
                return true;
            }
            current = ty.superclass(tc);
        }
        false
    }
}

/// Can `pattern` be made equal to `concrete` by binding its archetypes and
/// type parameters?
fn can_bind<'t>(pattern: CanTy<'t>, concrete: CanTy<'t>) -> bool {
    if pattern == concrete {
        return true;
    }
    let bind_all = |ps: &[CanTy<'t>], cs: &[CanTy<'t>]| {
        ps.len() == cs.len() && ps.iter().zip(cs).all(|(p, c)| can_bind(*p, *c))
    };
    match (*pattern.kind(), *concrete.kind()) {
        (TyKind::Archetype(_), _) | (TyKind::Param(_), _) => true,
        (TyKind::Class { def: d1, args: a1 }, TyKind::Class { def: d2, args: a2 })
            if d1 == d2 =>
        {
            bind_all(a1, a2)
        }
        (TyKind::Struct { def: d1, args: a1 }, TyKind::Struct { def: d2, args: a2 })
            if d1 == d2 =>
        {
            bind_all(a1, a2)
        }
        (TyKind::Enum { def: d1, args: a1 }, TyKind::Enum { def: d2, args: a2 })
            if d1 == d2 =>
        {
            bind_all(a1, a2)
        }
        (TyKind::Tuple(e1), TyKind::Tuple(e2)) => bind_all(e1, e2),
        (TyKind::Optional(p1), TyKind::Optional(p2)) => can_bind(p1, p2),
        (
            TyKind::Metatype {
                instance: i1,
                repr: r1,
            },
            TyKind::Metatype {
                instance: i2,
                repr: r2,
            },
        ) => r1 == r2 && can_bind(i1, i2),
        _ => false,
    }
}
