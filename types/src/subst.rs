//! Generic-argument substitution over canonical types.
//!
//! Substitution rebuilds structure bottom-up through the interner, so the
//! result is canonical again. Nominal declarations are never rewritten; only
//! the argument lists applied to them are.

use crate::decls::{DeclRef, ProtocolDef};
use crate::flags::TyFlags;
use crate::interner::TyInterner;
use crate::kind::{ArchetypeTy, FnSig, TyKind};
use crate::ty::CanTy;

/// Evidence that a type conforms to a protocol.
///
/// The handle layer never inspects evidence; it only requires that evidence
/// *exists* when a constrained placeholder is replaced.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Conformance<'t> {
    pub ty: CanTy<'t>,
    pub protocol: DeclRef<'t, ProtocolDef<'t>>,
}

/// A source of replacement types and conformance evidence.
pub trait TypeSubstitution<'t> {
    /// Replacement for an interface type parameter, or `None` to leave it.
    fn replace_param(&self, index: u16) -> Option<CanTy<'t>>;

    /// Replacement for an archetype, or `None` to leave it. Opaque
    /// archetypes are consulted only under
    /// [`SubstOptions::substitute_opaque_archetypes`].
    fn replace_archetype(&self, archetype: &ArchetypeTy<'t>) -> Option<CanTy<'t>> {
        let _ = archetype;
        None
    }

    /// Conformance evidence for `ty: protocol`, if this substitution
    /// carries any.
    fn conformance(
        &self,
        ty: CanTy<'t>,
        protocol: DeclRef<'t, ProtocolDef<'t>>,
    ) -> Option<Conformance<'t>> {
        let _ = (ty, protocol);
        None
    }
}

/// Positional substitution map: `Param(i)` maps to `replacements[i]`.
#[derive(Clone, Copy, Debug)]
pub struct SubstitutionMap<'t> {
    replacements: &'t [CanTy<'t>],
    conformances: &'t [Conformance<'t>],
}

impl<'t> SubstitutionMap<'t> {
    pub const fn empty() -> Self {
        Self {
            replacements: &[],
            conformances: &[],
        }
    }

    /// A map binding a nominal's generic parameters to its applied
    /// arguments. Carries no conformance evidence.
    pub fn from_args(args: &'t [CanTy<'t>]) -> Self {
        Self {
            replacements: args,
            conformances: &[],
        }
    }

    pub fn new(replacements: &'t [CanTy<'t>], conformances: &'t [Conformance<'t>]) -> Self {
        Self {
            replacements,
            conformances,
        }
    }

    pub fn replacements(&self) -> &'t [CanTy<'t>] {
        self.replacements
    }
}

impl<'t> TypeSubstitution<'t> for SubstitutionMap<'t> {
    fn replace_param(&self, index: u16) -> Option<CanTy<'t>> {
        self.replacements.get(index as usize).copied()
    }

    fn conformance(
        &self,
        ty: CanTy<'t>,
        protocol: DeclRef<'t, ProtocolDef<'t>>,
    ) -> Option<Conformance<'t>> {
        self.conformances
            .iter()
            .copied()
            .find(|c| c.ty == ty && c.protocol == protocol)
    }
}

#[derive(Clone, Copy, Default, Debug)]
pub struct SubstOptions {
    /// Also replace opaque (reverse-generic) archetypes. Off by default:
    /// opaque results stay abstract across most of the pipeline.
    pub substitute_opaque_archetypes: bool,
}

/// Applies `subs` throughout `ty`, re-interning every rebuilt node.
///
/// Replacing an archetype with conformance requirements demands evidence
/// from the substitution for each required protocol; missing evidence is an
/// IR-construction bug and aborts.
pub fn subst<'t>(
    tc: &TyInterner<'t>,
    ty: CanTy<'t>,
    subs: &impl TypeSubstitution<'t>,
    options: SubstOptions,
) -> CanTy<'t> {
    if !ty
        .flags()
        .intersects(TyFlags::HAS_TYPE_PARAMETER | TyFlags::HAS_ARCHETYPE)
    {
        return ty;
    }

    let subst_all = |tys: &[CanTy<'t>]| {
        tc.alloc_tys(tys.iter().map(|child| subst(tc, *child, subs, options)))
    };

    match *ty.kind() {
        TyKind::Param(index) => subs.replace_param(index).unwrap_or(ty),
        TyKind::Archetype(arch) => {
            if arch.opaque && !options.substitute_opaque_archetypes {
                return ty;
            }
            match subs.replace_archetype(&arch) {
                Some(replacement) => {
                    for protocol in arch.protocols {
                        assert!(
                            subs.conformance(replacement, *protocol).is_some(),
                            "substituting {ty} := {replacement}: \
                             no conformance evidence for {}",
                            protocol.name,
                        );
                    }
                    replacement
                }
                None => ty,
            }
        }
        TyKind::Struct { def, args } => tc.intern(TyKind::Struct {
            def,
            args: subst_all(args),
        }),
        TyKind::Class { def, args } => tc.intern(TyKind::Class {
            def,
            args: subst_all(args),
        }),
        TyKind::Enum { def, args } => tc.intern(TyKind::Enum {
            def,
            args: subst_all(args),
        }),
        TyKind::Tuple(elems) => tc.intern(TyKind::Tuple(subst_all(elems))),
        TyKind::Optional(payload) => tc.optional(subst(tc, payload, subs, options)),
        TyKind::Fn { params, result } => tc.intern(TyKind::Fn {
            params: subst_all(params),
            result: subst(tc, result, subs, options),
        }),
        TyKind::LoweredFn(sig) => tc.lowered_fn_sig(FnSig {
            params: subst_all(sig.params),
            result: subst(tc, sig.result, subs, options),
            ..sig
        }),
        TyKind::LValue(referent) => tc.lvalue(subst(tc, referent, subs, options)),
        TyKind::Existential(ext) => {
            match ext.superclass {
                Some(sup) => tc.existential(
                    ext.protocols.iter().copied(),
                    Some(subst(tc, sup, subs, options)),
                    ext.class_bound,
                ),
                // No substitutable positions besides the superclass bound.
                None => ty,
            }
        }
        TyKind::ExistentialMetatype(instance) => {
            tc.existential_metatype(subst(tc, instance, subs, options))
        }
        TyKind::Metatype { instance, repr } => {
            tc.metatype(subst(tc, instance, subs, options), repr)
        }
        TyKind::Box(contents) => tc.box_ty(subst(tc, contents, subs, options)),
        TyKind::RefStorage { kind, referent } => {
            tc.ref_storage(kind, subst(tc, referent, subs, options))
        }
        TyKind::Builtin(_) => ty,
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use pretty_assertions::assert_eq;

    use crate::kind::{Builtin, FnRepr};
    use super::*;

    #[test]
    fn replaces_params_positionally() {
        let arena = Bump::new();
        let tc = TyInterner::new(&arena);

        let int = tc.builtin(Builtin::Int(64));
        let word = tc.builtin(Builtin::Word);
        let generic = tc.tuple([tc.param(0), tc.param(1), tc.param(0)]);

        let args = tc.alloc_tys([int, word]);
        let result = subst(
            &tc,
            generic,
            &SubstitutionMap::from_args(args),
            SubstOptions::default(),
        );
        assert_eq!(result, tc.tuple([int, word, int]));
    }

    #[test]
    fn identity_outside_generic_positions() {
        let arena = Bump::new();
        let tc = TyInterner::new(&arena);

        let int = tc.builtin(Builtin::Int(32));
        let concrete = tc.lowered_fn(FnRepr::Thin, [int], int);
        let args = tc.alloc_tys([tc.builtin(Builtin::Word)]);
        let result = subst(
            &tc,
            concrete,
            &SubstitutionMap::from_args(args),
            SubstOptions::default(),
        );
        assert_eq!(result, concrete, "no parameters, nothing to replace");
    }

    #[test]
    fn unbound_params_are_left_in_place() {
        let arena = Bump::new();
        let tc = TyInterner::new(&arena);

        let generic = tc.optional(tc.param(3));
        let result = subst(
            &tc,
            generic,
            &SubstitutionMap::empty(),
            SubstOptions::default(),
        );
        assert_eq!(result, generic);
    }

    #[test]
    fn opaque_archetypes_need_the_flag() {
        use crate::kind::ArchetypeTy;

        let arena = Bump::new();
        let tc = TyInterner::new(&arena);
        let word = tc.builtin(Builtin::Word);

        let opaque = tc.archetype(ArchetypeTy {
            id: 0,
            protocols: &[],
            class_bound: false,
            opened: false,
            opaque: true,
        });

        struct OpaqueToWord<'t>(CanTy<'t>);
        impl<'t> TypeSubstitution<'t> for OpaqueToWord<'t> {
            fn replace_param(&self, _: u16) -> Option<CanTy<'t>> {
                None
            }
            fn replace_archetype(&self, _: &ArchetypeTy<'t>) -> Option<CanTy<'t>> {
                Some(self.0)
            }
        }

        let inert = subst(&tc, opaque, &OpaqueToWord(word), SubstOptions::default());
        assert_eq!(inert, opaque);

        let replaced = subst(
            &tc,
            opaque,
            &OpaqueToWord(word),
            SubstOptions {
                substitute_opaque_archetypes: true,
            },
        );
        assert_eq!(replaced, word);
    }

    #[test]
    #[should_panic(expected = "no conformance evidence")]
    fn archetype_replacement_requires_evidence() {
        use crate::kind::ArchetypeTy;

        let arena = Bump::new();
        let tc = TyInterner::new(&arena);
        let proto = tc.protocol_def("Streamable", false, false);
        let word = tc.builtin(Builtin::Word);

        let bounded = tc.archetype(ArchetypeTy {
            id: 0,
            protocols: tc.alloc_protocols([proto]),
            class_bound: false,
            opened: true,
            opaque: false,
        });

        struct NoEvidence<'t>(CanTy<'t>);
        impl<'t> TypeSubstitution<'t> for NoEvidence<'t> {
            fn replace_param(&self, _: u16) -> Option<CanTy<'t>> {
                None
            }
            fn replace_archetype(&self, _: &ArchetypeTy<'t>) -> Option<CanTy<'t>> {
                Some(self.0)
            }
        }

        subst(&tc, bounded, &NoEvidence(word), SubstOptions::default());
    }
}
