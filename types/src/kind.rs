use crate::decls::{ClassDef, DeclRef, EnumDef, ProtocolDef, StructDef};
use crate::flags::TyFlags;
use crate::interner::TyInterner;
use crate::subst::{SubstOptions, SubstitutionMap, subst};
use crate::ty::CanTy;

/// The structural kinds a canonical type can take.
///
/// Everything here is post-canonicalization; sugar has already been resolved.
/// Two kinds are source-level shapes that survive canonicalization but are
/// eliminated by lowering: [`TyKind::Fn`] and [`TyKind::LValue`]. They may
/// appear inside formal types but never under an IR type handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TyKind<'t> {
    Builtin(Builtin),

    /// Nominal struct, possibly applied to generic arguments.
    Struct {
        def: DeclRef<'t, StructDef<'t>>,
        args: &'t [CanTy<'t>],
    },

    /// Nominal class reference type.
    Class {
        def: DeclRef<'t, ClassDef<'t>>,
        args: &'t [CanTy<'t>],
    },

    /// Nominal enum, possibly applied to generic arguments.
    Enum {
        def: DeclRef<'t, EnumDef<'t>>,
        args: &'t [CanTy<'t>],
    },

    Tuple(&'t [CanTy<'t>]),

    /// `T?`. Kept as a first-class kind so payload projection and the
    /// block-compatibility look-through need no declaration lookup.
    Optional(CanTy<'t>),

    /// Source-level function type. Illegal in lowered positions; lowering
    /// rewrites it to [`TyKind::LoweredFn`].
    Fn {
        params: &'t [CanTy<'t>],
        result: CanTy<'t>,
    },

    /// Function type carrying its IR-level calling representation.
    LoweredFn(FnSig<'t>),

    /// Source-level l-value. Illegal in lowered positions; lowering rewrites
    /// it to an address.
    LValue(CanTy<'t>),

    /// `any P`, `any P & Q`, `AnyObject`, possibly with a superclass bound.
    Existential(ExistentialTy<'t>),

    /// `any P.Type`.
    ExistentialMetatype(CanTy<'t>),

    /// Concrete metatype with an explicit representation.
    Metatype {
        instance: CanTy<'t>,
        repr: MetatypeRepr,
    },

    /// A bound generic placeholder: opened existential, opaque result, or an
    /// environment archetype.
    Archetype(ArchetypeTy<'t>),

    /// Interface type parameter, an index into the enclosing generic
    /// signature. Replaced by substitution.
    Param(u16),

    /// Reference-counted indirect box.
    Box(CanTy<'t>),

    /// Weak/unowned/unmanaged reference-storage wrapper.
    RefStorage {
        kind: RefStorageKind,
        referent: CanTy<'t>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Builtin {
    /// Fixed-width integer.
    Int(u16),
    /// Arbitrary-precision literal staging type.
    IntLiteral,
    Float(FloatKind),
    /// Pointer-sized integer.
    Word,
    RawPointer,
    /// An untyped managed heap reference.
    NativeObject,
    /// A managed reference with spare bits, for bridged containers.
    BridgeObject,
    /// Empty token standing for an instruction dependency.
    Token,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum FloatKind {
    F32,
    F64,
}

/// Calling representation of a lowered function type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum FnRepr {
    /// Function pointer plus retained context; reference-counted.
    Thick,
    /// Bare function pointer.
    Thin,
    /// Curried method reference.
    Method,
    /// C-block-style invocation record.
    Block,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FnSig<'t> {
    pub params: &'t [CanTy<'t>],
    pub result: CanTy<'t>,
    pub repr: FnRepr,
    pub no_return: bool,
    /// Number of generic parameters the signature binds; its params/result
    /// may mention `Param` indices below this count.
    pub generic_params: u16,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MetatypeRepr {
    /// Zero-sized; the instance type is statically known.
    Thin,
    /// Carries a type descriptor pointer.
    Thick,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum RefStorageKind {
    Weak,
    Unowned,
    Unmanaged,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ExistentialTy<'t> {
    pub protocols: &'t [DeclRef<'t, ProtocolDef<'t>>],
    /// Explicit superclass bound (`any P & Base`).
    pub superclass: Option<CanTy<'t>>,
    /// Explicit layout constraint (`AnyObject`), independent of whether any
    /// constituent protocol is class-constrained.
    pub class_bound: bool,
}

impl<'t> ExistentialTy<'t> {
    /// True if every conforming value is statically known to be a single
    /// retained reference.
    pub fn requires_class(&self) -> bool {
        self.class_bound
            || self.superclass.is_some()
            || self.protocols.iter().any(|p| p.class_constrained)
    }

    /// True if this is exactly the `AnyObject` layout constraint.
    pub fn is_any_object(&self) -> bool {
        self.class_bound && self.protocols.is_empty() && self.superclass.is_none()
    }

    /// True if values are carried in an indirect reference-counted box.
    pub fn uses_boxed_repr(&self) -> bool {
        !self.requires_class() && self.protocols.iter().any(|p| p.boxed)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ArchetypeTy<'t> {
    pub id: u32,
    /// Conformance requirements; substitution must present evidence for each.
    pub protocols: &'t [DeclRef<'t, ProtocolDef<'t>>],
    pub class_bound: bool,
    /// Came from opening an existential.
    pub opened: bool,
    /// Opaque (reverse-generic) result archetype.
    pub opaque: bool,
}

impl<'t> TyKind<'t> {
    /// Computes the cached flag set for a node of this kind. Children are
    /// already interned, so their flags are lookups, not walks. Nominal
    /// stored types are the one exception: they are folded after applying
    /// the nominal's generic arguments, so the layout bits describe the
    /// instantiation, not the declaration.
    pub(crate) fn compute_flags(&self, tc: &TyInterner<'t>) -> TyFlags {
        use TyFlags as F;

        let fold = |tys: &[CanTy<'t>]| {
            tys.iter()
                .fold(F::empty(), |acc, ty| acc | ty.flags())
        };
        let applied = |ty: CanTy<'t>, args: &'t [CanTy<'t>]| {
            subst(tc, ty, &SubstitutionMap::from_args(args), SubstOptions::default()).flags()
        };
        // Component flags of a nominal's stored fields: its own `Param`s are
        // bound by the declaration and do not leak out. Parameters the
        // arguments themselves mention come back in through the structural
        // argument fold.
        let fold_decl = |tys: F| tys - F::HAS_TYPE_PARAMETER;

        match *self {
            TyKind::Builtin(_) => F::empty(),
            TyKind::Struct { def, args } => {
                let fields = def
                    .fields
                    .iter()
                    .fold(F::empty(), |acc, f| acc | applied(f.ty, args));
                fold_decl(fields) | (fold(args) & F::STRUCTURAL)
            }
            TyKind::Class { args, .. } => {
                // A class handle is a reference; neither the heap contents
                // nor the arguments' layouts affect the value's own
                // properties.
                F::NON_TRIVIAL | (fold(args) & F::STRUCTURAL)
            }
            TyKind::Enum { def, args } => {
                let payloads = def
                    .cases
                    .iter()
                    .filter_map(|c| c.payload)
                    .fold(F::empty(), |acc, ty| acc | applied(ty, args));
                fold_decl(payloads) | (fold(args) & F::STRUCTURAL)
            }
            TyKind::Tuple(elems) => fold(elems),
            TyKind::Optional(payload) => payload.flags(),
            TyKind::Fn { params, result } => {
                F::NOT_LEGAL_LOWERED | fold(params) | result.flags()
            }
            TyKind::LoweredFn(sig) => {
                // Function types do not own their parameter values.
                let inner = (fold(sig.params) | sig.result.flags()) & F::STRUCTURAL;
                if sig.repr == FnRepr::Thick {
                    inner | F::NON_TRIVIAL
                } else {
                    inner
                }
            }
            TyKind::LValue(referent) => F::NOT_LEGAL_LOWERED | referent.flags(),
            TyKind::Existential(ext) => {
                let sup = ext.superclass.map_or(F::empty(), |s| s.flags());
                F::NON_TRIVIAL | (sup & F::STRUCTURAL)
            }
            TyKind::ExistentialMetatype(instance) => instance.flags() & F::STRUCTURAL,
            TyKind::Metatype { instance, .. } => instance.flags() & F::STRUCTURAL,
            TyKind::Archetype(arch) => {
                let mut flags = F::HAS_ARCHETYPE | F::NON_TRIVIAL;
                if arch.opened {
                    flags |= F::HAS_OPENED_EXISTENTIAL;
                }
                if arch.opaque {
                    flags |= F::HAS_OPAQUE_ARCHETYPE;
                }
                flags
            }
            TyKind::Param(_) => F::HAS_TYPE_PARAMETER | F::NON_TRIVIAL,
            TyKind::Box(contents) => F::NON_TRIVIAL | (contents.flags() & F::STRUCTURAL),
            TyKind::RefStorage { kind, referent } => {
                let inner = referent.flags() & F::STRUCTURAL;
                match kind {
                    // Unmanaged references are bare pointers.
                    RefStorageKind::Unmanaged => inner,
                    RefStorageKind::Weak | RefStorageKind::Unowned => inner | F::NON_TRIVIAL,
                }
            }
        }
    }
}
