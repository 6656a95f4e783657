//! A small structural lowering oracle for tests.
//!
//! Real address-only decisions come from the compiler's type lowering; this
//! stand-in applies the rules that matter for the predicates under test:
//! abstract types, opaque existentials, and weak storage live in memory,
//! resilient aggregates do too when seen at minimal expansion, and
//! aggregates inherit the property from their inline storage.

#![allow(dead_code)]

use opal_oir::{AbiContext, ResilienceExpansion};
use opal_types::{
    CanTy, RefStorageKind, SubstOptions, SubstitutionMap, TyInterner, TyKind, subst,
};

pub struct TestLowering<'t> {
    pub tc: TyInterner<'t>,
    pub resilience: ResilienceExpansion,
}

impl<'t> TestLowering<'t> {
    pub fn maximal(tc: TyInterner<'t>) -> Self {
        Self {
            tc,
            resilience: ResilienceExpansion::Maximal,
        }
    }

    pub fn minimal(tc: TyInterner<'t>) -> Self {
        Self {
            tc,
            resilience: ResilienceExpansion::Minimal,
        }
    }

    fn opaque_layout(&self, resilient: bool) -> bool {
        resilient && self.resilience == ResilienceExpansion::Minimal
    }
}

impl<'t> AbiContext<'t> for TestLowering<'t> {
    fn resilience(&self) -> ResilienceExpansion {
        self.resilience
    }

    fn is_address_only(&self, ty: CanTy<'t>) -> bool {
        let applied = |declared: CanTy<'t>, args: &'t [CanTy<'t>]| {
            if args.is_empty() {
                declared
            } else {
                subst(
                    &self.tc,
                    declared,
                    &SubstitutionMap::from_args(args),
                    SubstOptions::default(),
                )
            }
        };
        match *ty.kind() {
            TyKind::Archetype(arch) => !arch.class_bound,
            TyKind::Param(_) => true,
            TyKind::Existential(ext) => !ext.requires_class(),
            TyKind::RefStorage {
                kind: RefStorageKind::Weak,
                ..
            } => true,
            TyKind::Struct { def, args } => {
                self.opaque_layout(def.resilient)
                    || def
                        .fields
                        .iter()
                        .any(|f| self.is_address_only(applied(f.ty, args)))
            }
            TyKind::Enum { def, args } => {
                self.opaque_layout(def.resilient)
                    || def
                        .cases
                        .iter()
                        .filter_map(|c| c.payload)
                        .any(|payload| self.is_address_only(applied(payload, args)))
            }
            TyKind::Tuple(elems) => elems.iter().any(|&elem| self.is_address_only(elem)),
            TyKind::Optional(payload) => self.is_address_only(payload),
            _ => false,
        }
    }
}
