//! Shape-directed casts on handles.
//!
//! `handle.get_as::<TupleShape>()` asks "is the type under this handle a
//! tuple, and if so, show me its elements". Each shape marker names one
//! canonical kind and defines the view a successful cast yields.
//!
//! The markers for source-level function and l-value shapes exist but
//! deliberately do not implement [`CastableShape`]: those kinds can never
//! sit under a handle, so asking for them is a bug the compiler catches.

use opal_types::{
    ArchetypeTy, Builtin, CanTy, ClassDef, DeclRef, EnumDef, ExistentialTy, FnSig, MetatypeRepr,
    RefStorageKind, StructDef, TyKind,
};

use crate::ty::OirType;

mod sealed {
    pub trait Sealed {}
}

/// A canonical kind a handle can be cast to.
///
/// Sealed: the set of castable shapes is exactly the set of kinds legal
/// under a handle.
pub trait CastableShape: sealed::Sealed {
    /// What a successful cast exposes.
    type View<'t>;

    fn project<'t>(ty: CanTy<'t>) -> Option<Self::View<'t>>;
}

macro_rules! shape {
    ($(#[$doc:meta])* $name:ident, $view:ty, |$ty:ident| $body:expr) => {
        $(#[$doc])*
        pub struct $name;

        impl sealed::Sealed for $name {}

        impl CastableShape for $name {
            type View<'t> = $view;

            fn project<'t>($ty: CanTy<'t>) -> Option<Self::View<'t>> {
                $body
            }
        }
    };
}

shape!(BuiltinShape, Builtin, |ty| match *ty.kind() {
    TyKind::Builtin(builtin) => Some(builtin),
    _ => None,
});

shape!(
    StructShape,
    (DeclRef<'t, StructDef<'t>>, &'t [CanTy<'t>]),
    |ty| match *ty.kind() {
        TyKind::Struct { def, args } => Some((def, args)),
        _ => None,
    }
);

shape!(
    ClassShape,
    (DeclRef<'t, ClassDef<'t>>, &'t [CanTy<'t>]),
    |ty| match *ty.kind() {
        TyKind::Class { def, args } => Some((def, args)),
        _ => None,
    }
);

shape!(
    EnumShape,
    (DeclRef<'t, EnumDef<'t>>, &'t [CanTy<'t>]),
    |ty| match *ty.kind() {
        TyKind::Enum { def, args } => Some((def, args)),
        _ => None,
    }
);

shape!(TupleShape, &'t [CanTy<'t>], |ty| match *ty.kind() {
    TyKind::Tuple(elems) => Some(elems),
    _ => None,
});

shape!(OptionalShape, CanTy<'t>, |ty| ty.optional_payload());

shape!(
    /// A lowered function signature. This is the only function shape a
    /// handle can hold.
    LoweredFnShape,
    &'t FnSig<'t>,
    |ty| ty.fn_sig()
);

shape!(
    MetatypeShape,
    (CanTy<'t>, MetatypeRepr),
    |ty| match *ty.kind() {
        TyKind::Metatype { instance, repr } => Some((instance, repr)),
        _ => None,
    }
);

shape!(
    ExistentialMetatypeShape,
    CanTy<'t>,
    |ty| match *ty.kind() {
        TyKind::ExistentialMetatype(instance) => Some(instance),
        _ => None,
    }
);

shape!(ExistentialShape, &'t ExistentialTy<'t>, |ty| ty
    .existential_ty());

shape!(ArchetypeShape, &'t ArchetypeTy<'t>, |ty| ty.archetype_ty());

shape!(BoxShape, CanTy<'t>, |ty| match *ty.kind() {
    TyKind::Box(contents) => Some(contents),
    _ => None,
});

shape!(
    RefStorageShape,
    (RefStorageKind, CanTy<'t>),
    |ty| match *ty.kind() {
        TyKind::RefStorage { kind, referent } => Some((kind, referent)),
        _ => None,
    }
);

/// A source-level function type. Not castable: lowering replaces every
/// function type before it can appear under a handle, so a cast to this
/// shape cannot succeed and does not compile.
pub struct FnShape;
impl sealed::Sealed for FnShape {}

/// Any function type viewed formally, lowered or not. Not castable, for the
/// same reason as [`FnShape`].
pub struct AnyFnShape;
impl sealed::Sealed for AnyFnShape {}

/// A source-level l-value type. Not castable: the address category already
/// expresses "location of a value" in the IR.
pub struct LValueShape;
impl sealed::Sealed for LValueShape {}

impl<'t> OirType<'t> {
    /// The view of this handle's type as shape `S`, or `None` if the type is
    /// some other kind.
    pub fn get_as<S: CastableShape>(self) -> Option<S::View<'t>> {
        S::project(self.canonical_type())
    }

    /// Like [`OirType::get_as`], but the caller vouches for the shape.
    /// Aborts if the type is some other kind.
    pub fn cast_to<S: CastableShape>(self) -> S::View<'t> {
        match self.get_as::<S>() {
            Some(view) => view,
            None => panic!("IR type {self} does not have the expected shape"),
        }
    }

    pub fn is_a<S: CastableShape>(self) -> bool {
        self.get_as::<S>().is_some()
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use opal_types::{Builtin, FnRepr, TyInterner, ty};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ty::OirType;

    #[test]
    fn casts_see_through_the_category() {
        let arena = Bump::new();
        let tc = TyInterner::new(&arena);

        let pair = OirType::primitive_address(ty!(tc, Tuple[Int64, Word]));
        let elems = pair.cast_to::<TupleShape>();
        assert_eq!(elems.len(), 2);
        assert_eq!(elems[0], tc.builtin(Builtin::Int(64)));
    }

    #[test]
    fn wrong_shape_is_none() {
        let arena = Bump::new();
        let tc = TyInterner::new(&arena);

        let word = OirType::builtin_word(&tc);
        assert_eq!(word.get_as::<TupleShape>(), None);
        assert!(!word.is_a::<OptionalShape>());
        assert!(word.is_a::<BuiltinShape>());
    }

    #[test]
    fn lowered_function_shape_exposes_the_signature() {
        let arena = Bump::new();
        let tc = TyInterner::new(&arena);

        let int = ty!(tc, Int32);
        let f = OirType::primitive_object(tc.lowered_fn(FnRepr::Thin, [int], int));
        let sig = f.cast_to::<LoweredFnShape>();
        assert_eq!(sig.repr, FnRepr::Thin);
        assert_eq!(sig.params, &[int]);
    }

    #[test]
    #[should_panic(expected = "does not have the expected shape")]
    fn cast_to_aborts_on_mismatch() {
        let arena = Bump::new();
        let tc = TyInterner::new(&arena);

        OirType::builtin_word(&tc).cast_to::<ClassShape>();
    }
}
