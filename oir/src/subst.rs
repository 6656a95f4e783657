//! Generic substitution on handles.
//!
//! Handle-level substitution is deliberately narrow: it applies generic
//! arguments to *function* types, because that is the one case instruction
//! builders need when specializing an apply site. Substituting through
//! arbitrary lowered types can change their layout class, so that belongs
//! to the lowering authority, not here.

use opal_types::{
    ArchetypeTy, CanTy, Conformance, DeclRef, FnSig, ProtocolDef, SubstOptions, SubstitutionMap,
    TyInterner, TyKind, TypeSubstitution, subst,
};

use crate::ty::OirType;

impl<'t> OirType<'t> {
    /// Applies `map` to a generic function type, yielding the non-generic
    /// signature of the specialized callee. The category is preserved.
    ///
    /// Aborts if the handle does not wrap a function type, or if `map` does
    /// not bind every generic parameter of the signature.
    pub fn subst_generic_args(self, tc: &TyInterner<'t>, map: &SubstitutionMap<'t>) -> OirType<'t> {
        self.subst_generic_args_with(tc, map, SubstOptions::default())
    }

    /// [`OirType::subst_generic_args`] with explicit options, for callers
    /// that also need to substitute into opaque archetypes.
    pub fn subst_generic_args_with(
        self,
        tc: &TyInterner<'t>,
        map: &SubstitutionMap<'t>,
        options: SubstOptions,
    ) -> OirType<'t> {
        let ty = self.canonical_type();
        let Some(sig) = ty.fn_sig() else {
            panic!("substituting generic arguments of non-function {ty}");
        };
        assert!(
            map.replacements().len() >= sig.generic_params as usize,
            "substitution binds {} of {} generic parameters of {ty}",
            map.replacements().len(),
            sig.generic_params,
        );
        let substituted = subst(tc, ty, map, options);
        let TyKind::LoweredFn(sig) = *substituted.kind() else {
            unreachable!("substitution changed a function into {substituted}");
        };
        let specialized = tc.lowered_fn_sig(FnSig {
            generic_params: 0,
            ..sig
        });
        Self::make(specialized, self.category())
    }

    /// Replaces every context archetype with the interface-level parameter
    /// it was opened from, keeping the category. Used when a type leaves a
    /// generic environment, for example into a serialized module summary.
    pub fn map_out_of_context(self, tc: &TyInterner<'t>) -> OirType<'t> {
        let mapped = subst(
            tc,
            self.canonical_type(),
            &OutOfContext(tc),
            SubstOptions::default(),
        );
        Self::make(mapped, self.category())
    }
}

/// Archetype-to-parameter substitution. The replacement is abstract again,
/// so conformance evidence is tautological and always supplied.
struct OutOfContext<'a, 't>(&'a TyInterner<'t>);

impl<'t> TypeSubstitution<'t> for OutOfContext<'_, 't> {
    fn replace_param(&self, _: u16) -> Option<CanTy<'t>> {
        None
    }

    fn replace_archetype(&self, archetype: &ArchetypeTy<'t>) -> Option<CanTy<'t>> {
        debug_assert!(archetype.id <= u16::MAX as u32);
        Some(self.0.param(archetype.id as u16))
    }

    fn conformance(
        &self,
        ty: CanTy<'t>,
        protocol: DeclRef<'t, ProtocolDef<'t>>,
    ) -> Option<Conformance<'t>> {
        Some(Conformance { ty, protocol })
    }
}
