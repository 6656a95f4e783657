//! Classification predicates on handles.
//!
//! The structural ones just delegate to the canonical type. The interesting
//! ones take an [`AbiContext`], because "can this value live in a register"
//! is a property of the resilience domain, not of the type alone.

use opal_types::{
    Builtin, CanTy, ClassDef, DeclRef, EnumDef, FnRepr, StructDef, TyFlags, TyInterner, TyKind,
};

use crate::lower::AbiContext;
use crate::ty::OirType;

impl<'t> OirType<'t> {
    // === Structure-only facts ===

    pub fn has_type_parameter(self) -> bool {
        self.canonical_type().has_type_parameter()
    }

    pub fn has_archetype(self) -> bool {
        self.canonical_type().has_archetype()
    }

    pub fn has_opened_existential(self) -> bool {
        self.canonical_type().has_opened_existential()
    }

    pub fn has_opaque_archetype(self) -> bool {
        self.canonical_type().has_opaque_archetype()
    }

    pub fn is_void(self) -> bool {
        self.canonical_type().is_void()
    }

    pub fn is_existential(self) -> bool {
        self.canonical_type().is_existential()
    }

    pub fn is_any_existential(self) -> bool {
        self.canonical_type().is_any_existential()
    }

    pub fn is_class_existential(self) -> bool {
        self.canonical_type().is_class_existential()
    }

    pub fn is_opened_existential(self) -> bool {
        self.canonical_type().is_opened_existential()
    }

    pub fn is_any_object(self) -> bool {
        self.canonical_type().is_any_object()
    }

    pub fn is_any_class_reference_type(self) -> bool {
        self.canonical_type().is_any_class_reference_type()
    }

    pub fn has_reference_semantics(self) -> bool {
        self.canonical_type().has_reference_semantics()
    }

    pub fn has_retainable_pointer_representation(self) -> bool {
        self.canonical_type().has_retainable_pointer_representation()
    }

    pub fn is_bridgeable_object(self) -> bool {
        self.canonical_type().is_bridgeable_object()
    }

    pub fn is_heap_object_reference(self) -> bool {
        self.canonical_type().is_heap_object_reference()
    }

    pub fn is_class_or_class_metatype(self) -> bool {
        self.is_object() && self.canonical_type().is_class_or_class_metatype()
    }

    pub fn struct_def(self) -> Option<DeclRef<'t, StructDef<'t>>> {
        self.canonical_type().struct_def()
    }

    pub fn class_def(self) -> Option<DeclRef<'t, ClassDef<'t>>> {
        self.canonical_type().class_def()
    }

    pub fn enum_def(self) -> Option<DeclRef<'t, EnumDef<'t>>> {
        self.canonical_type().enum_def()
    }

    /// Generic arguments when the type is nominal, `&[]` for non-generic
    /// nominals.
    pub fn nominal_args(self) -> Option<&'t [CanTy<'t>]> {
        self.canonical_type().nominal_args()
    }

    pub fn is_function(self) -> bool {
        self.canonical_type().fn_sig().is_some()
    }

    pub fn is_no_return_function(self) -> bool {
        self.canonical_type().fn_sig().is_some_and(|sig| sig.no_return)
    }

    /// The calling representation of this function type. Aborts on
    /// non-function types.
    pub fn function_representation(self) -> FnRepr {
        self.cast_to::<crate::cast::LoweredFnShape>().repr
    }

    /// True for a block-representation function, possibly wrapped in one
    /// optional.
    pub fn is_block_pointer_compatible(self) -> bool {
        let ty = self.canonical_type();
        let ty = ty.optional_payload().unwrap_or(ty);
        ty.fn_sig().is_some_and(|sig| sig.repr == FnRepr::Block)
    }

    /// True if values of this type are exactly one pointer wide and
    /// pointer-aligned, so they can be stored where untyped words go.
    pub fn is_pointer_size_and_aligned(self) -> bool {
        matches!(
            self.canonical_type().kind(),
            TyKind::Builtin(Builtin::RawPointer | Builtin::Word | Builtin::BridgeObject)
        ) || self.is_heap_object_reference()
    }

    // === Layout-dependent facts ===

    /// True if values of this type must be manipulated through addresses in
    /// `ctx`.
    pub fn is_address_only(self, ctx: &impl AbiContext<'t>) -> bool {
        ctx.is_address_only(self.canonical_type())
    }

    /// True if values of this type can be loaded into registers in `ctx`.
    pub fn is_loadable(self, ctx: &impl AbiContext<'t>) -> bool {
        !self.is_address_only(ctx)
    }

    /// True if copying and destroying values of this type is a no-op in
    /// `ctx`: a loadable object free of reference-semantics components.
    /// Address handles are never trivial; the memory they point at still
    /// has to be managed.
    pub fn is_trivial(self, ctx: &impl AbiContext<'t>) -> bool {
        let ty = self.canonical_type();
        self.is_object() && !ctx.is_address_only(ty) && !ty.flags().contains(TyFlags::NON_TRIVIAL)
    }

    /// True if values of this type are a single retain/release-able
    /// reference in `ctx`.
    pub fn is_reference_counted(self, ctx: &impl AbiContext<'t>) -> bool {
        let ty = self.canonical_type();
        if ctx.is_address_only(ty) {
            return false;
        }
        ty.has_retainable_pointer_representation()
            || matches!(ty.kind(), TyKind::Box(_))
            || ty.fn_sig().is_some_and(|sig| sig.repr == FnRepr::Thick)
    }

    /// True if a checked reference cast can take `operand` to `result`
    /// without changing representation: both loadable objects, the source a
    /// heap reference or class existential, the target a heap reference.
    /// One level of optionality on either side is looked through.
    pub fn can_ref_cast(
        operand: OirType<'t>,
        result: OirType<'t>,
        ctx: &impl AbiContext<'t>,
    ) -> bool {
        let from = operand.unwrap_optional();
        let to = result.unwrap_optional();
        operand.is_object()
            && result.is_object()
            && operand.is_loadable(ctx)
            && result.is_loadable(ctx)
            && (from.is_heap_object_reference() || from.is_class_existential())
            && to.is_heap_object_reference()
    }

    // === Subtyping ===

    /// True if `other`'s type is this type or a transitive subclass of it.
    /// Categories are ignored.
    pub fn is_exact_superclass_of(self, other: OirType<'t>, tc: &TyInterner<'t>) -> bool {
        self.canonical_type()
            .is_exact_superclass_of(other.canonical_type(), tc)
    }

    /// Like [`OirType::is_exact_superclass_of`], but generic positions in
    /// this type bind to anything along `other`'s superclass chain.
    pub fn is_bindable_to_superclass_of(self, other: OirType<'t>, tc: &TyInterner<'t>) -> bool {
        self.canonical_type()
            .is_bindable_to_superclass_of(other.canonical_type(), tc)
    }

    // === Verification ===

    /// True if this handle could be the lowering of the formal type
    /// `formal`: equal up to the shape changes lowering performs, and not an
    /// object handle over a type `ctx` makes address-only.
    pub fn is_lowering_of(self, ctx: &impl AbiContext<'t>, formal: CanTy<'t>) -> bool {
        let lowered = self.canonical_type();
        if self.is_object() && ctx.is_address_only(lowered) {
            return false;
        }
        lowers_to(lowered, formal)
    }
}

fn lowers_to<'t>(lowered: CanTy<'t>, formal: CanTy<'t>) -> bool {
    if lowered == formal {
        return true;
    }
    let all = |ls: &[CanTy<'t>], fs: &[CanTy<'t>]| {
        ls.len() == fs.len() && ls.iter().zip(fs).all(|(&l, &f)| lowers_to(l, f))
    };
    match (*lowered.kind(), *formal.kind()) {
        (TyKind::Optional(l), TyKind::Optional(f)) => lowers_to(l, f),
        (TyKind::Tuple(ls), TyKind::Tuple(fs)) => all(ls, fs),
        (TyKind::LoweredFn(sig), TyKind::Fn { params, result }) => {
            all(sig.params, params) && lowers_to(sig.result, result)
        }
        _ => false,
    }
}
