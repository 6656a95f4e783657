//! Container representations for existential types.
//!
//! An existential value carries a dynamic type, so the IR has to pick a
//! container shape for it: an inline buffer plus witness tables, a bare
//! class reference, a metatype slot, or a reference-counted box. Address
//! and allocation instructions consult these answers when materializing
//! existentials.

use bitflags::bitflags;
use opal_types::CanTy;

use crate::ty::OirType;

/// The container shape an existential value uses.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ExistentialRepr {
    /// Not an existential at all.
    None,
    /// Fixed-size inline buffer with witness tables; the payload may spill
    /// to a side allocation.
    Opaque,
    /// A single retained class reference; witness tables, if any, ride in
    /// the container next to it.
    Class,
    /// A metatype slot.
    Metatype,
    /// One reference-counted heap box holding the value and its
    /// conformance. The error-protocol convention.
    Boxed,
}

bitflags! {
    /// Concrete type shapes a representation may adopt directly, skipping
    /// the container the existential would otherwise need.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct ConcreteShapes: u8 {
        const CLASSES = 1 << 0;
        const CLASS_BOUND_ARCHETYPES = 1 << 1;
    }
}

/// Policy for when a known concrete payload lets an existential drop down
/// to a cheaper representation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AdoptionPolicy {
    /// Payload shapes a boxed existential may hold as a bare class
    /// reference instead of allocating the box.
    pub boxed_adopts: ConcreteShapes,
}

impl Default for AdoptionPolicy {
    fn default() -> Self {
        Self {
            boxed_adopts: ConcreteShapes::CLASSES,
        }
    }
}

impl AdoptionPolicy {
    fn adoptable(self, contained: CanTy<'_>) -> bool {
        if contained.class_def().is_some() {
            return self.boxed_adopts.contains(ConcreteShapes::CLASSES);
        }
        if contained.archetype_ty().is_some_and(|a| a.class_bound) {
            return self
                .boxed_adopts
                .contains(ConcreteShapes::CLASS_BOUND_ARCHETYPES);
        }
        false
    }
}

impl<'t> OirType<'t> {
    /// The representation to use when materializing this existential type,
    /// under the default [`AdoptionPolicy`]. `contained`, when known, is
    /// the concrete type being stored and can select a cheaper shape.
    ///
    /// Returns [`ExistentialRepr::None`] for non-existential types.
    pub fn preferred_existential_repr(self, contained: Option<CanTy<'t>>) -> ExistentialRepr {
        self.preferred_existential_repr_with(AdoptionPolicy::default(), contained)
    }

    pub fn preferred_existential_repr_with(
        self,
        policy: AdoptionPolicy,
        contained: Option<CanTy<'t>>,
    ) -> ExistentialRepr {
        let ty = self.canonical_type();
        let Some(ext) = ty.existential_ty() else {
            return if ty.is_any_existential() {
                ExistentialRepr::Metatype
            } else {
                ExistentialRepr::None
            };
        };
        if ext.uses_boxed_repr() {
            return match contained {
                Some(concrete) if policy.adoptable(concrete) => ExistentialRepr::Class,
                _ => ExistentialRepr::Boxed,
            };
        }
        if ext.requires_class() {
            ExistentialRepr::Class
        } else {
            ExistentialRepr::Opaque
        }
    }

    /// True if this existential type can be materialized with `repr`, under
    /// the default [`AdoptionPolicy`]. The preferred representation is
    /// always usable; some types admit alternatives.
    pub fn can_use_existential_repr(
        self,
        repr: ExistentialRepr,
        contained: Option<CanTy<'t>>,
    ) -> bool {
        self.can_use_existential_repr_with(AdoptionPolicy::default(), repr, contained)
    }

    pub fn can_use_existential_repr_with(
        self,
        policy: AdoptionPolicy,
        repr: ExistentialRepr,
        contained: Option<CanTy<'t>>,
    ) -> bool {
        let ty = self.canonical_type();
        match repr {
            ExistentialRepr::None => !ty.is_any_existential(),
            ExistentialRepr::Metatype => {
                matches!(ty.kind(), opal_types::TyKind::ExistentialMetatype(_))
            }
            ExistentialRepr::Opaque => ty
                .existential_ty()
                .is_some_and(|ext| !ext.requires_class() && !ext.uses_boxed_repr()),
            ExistentialRepr::Class => ty.existential_ty().is_some_and(|ext| {
                if ext.uses_boxed_repr() {
                    return contained.is_some_and(|c| policy.adoptable(c));
                }
                ext.requires_class()
                    && contained.is_none_or(|c| c.is_any_class_reference_type())
            }),
            ExistentialRepr::Boxed => ty.existential_ty().is_some_and(|ext| ext.uses_boxed_repr()),
        }
    }
}
