//! Projections: handles for the components of aggregate types.
//!
//! Projection is how instruction builders compute operand and result types:
//! the type of a field extraction is the base handle projected onto that
//! field. The category rules here are load-bearing. A component of an
//! object is an object, a component of an address is an address, except
//! that class storage is only ever reachable through memory, so a field of
//! a class is an address no matter how the class reference itself is held.

use opal_types::{CanTy, SubstOptions, SubstitutionMap, TyInterner, TyKind, subst};

use crate::ty::{OirType, ValueCategory};

impl<'t> OirType<'t> {
    /// The type of the named field, with this type's generic arguments
    /// applied.
    ///
    /// Aborts unless the type is a struct or class declaring such a field.
    /// Struct fields share the base category; class fields are always
    /// addresses.
    pub fn field_type(self, name: &str, tc: &TyInterner<'t>) -> OirType<'t> {
        let base = self.canonical_type();
        let (declared, args, category) = match *base.kind() {
            TyKind::Struct { def, args } => match def.field(name) {
                Some(field) => (field.ty, args, self.category()),
                None => panic!("no field `{name}` on {base}"),
            },
            TyKind::Class { def, args } => match def.field(name) {
                Some(field) => (field.ty, args, ValueCategory::Address),
                None => panic!("no field `{name}` on {base}"),
            },
            _ => panic!("projecting field `{name}` out of non-nominal {base}"),
        };
        Self::make(apply_args(tc, declared, args), category)
    }

    /// The payload type of the named case, with this type's generic
    /// arguments applied. Shares the base category.
    ///
    /// Aborts unless the type is an enum declaring such a case with a
    /// payload.
    pub fn enum_payload_type(self, case: &str, tc: &TyInterner<'t>) -> OirType<'t> {
        let base = self.canonical_type();
        let TyKind::Enum { def, args } = *base.kind() else {
            panic!("projecting case `{case}` out of non-enum {base}");
        };
        let Some(found) = def.case(case) else {
            panic!("no case `{case}` on {base}");
        };
        let Some(payload) = found.payload else {
            panic!("case `{case}` of {base} carries no payload");
        };
        Self::make(apply_args(tc, payload, args), self.category())
    }

    /// The type of tuple element `index`, sharing the base category.
    ///
    /// Aborts unless the type is a tuple with enough elements.
    pub fn tuple_element_type(self, index: usize) -> OirType<'t> {
        let base = self.canonical_type();
        let TyKind::Tuple(elems) = *base.kind() else {
            panic!("projecting element {index} out of non-tuple {base}");
        };
        match elems.get(index) {
            Some(&elem) => Self::make(elem, self.category()),
            None => panic!("tuple {base} has no element {index}"),
        }
    }

    /// The immediate superclass as an object handle, or `None` for
    /// most-derived classes and non-class types.
    pub fn superclass(self, tc: &TyInterner<'t>) -> Option<OirType<'t>> {
        self.canonical_type()
            .superclass(tc)
            .map(Self::primitive_object)
    }

    /// The optional payload under this handle's category, or `None` if the
    /// type is not optional.
    pub fn optional_object_type(self) -> Option<OirType<'t>> {
        self.canonical_type()
            .optional_payload()
            .map(|payload| Self::make(payload, self.category()))
    }

    /// Looks through one level of optionality, or returns `self` unchanged.
    pub fn unwrap_optional(self) -> OirType<'t> {
        self.optional_object_type().unwrap_or(self)
    }

    /// Looks through a reference-storage wrapper to the reference it
    /// stores, or returns `self` unchanged.
    pub fn reference_storage_referent(self) -> OirType<'t> {
        match *self.canonical_type().kind() {
            TyKind::RefStorage { referent, .. } => Self::make(referent, self.category()),
            _ => self,
        }
    }

    /// True if flattening this aggregate's storage reaches `inner`'s type.
    /// Class references are leaves: their storage is behind a heap
    /// indirection, not inline.
    pub fn aggregate_contains(self, inner: OirType<'t>, tc: &TyInterner<'t>) -> bool {
        let target = inner.canonical_type();
        contains(self.canonical_type(), target, tc)
    }
}

fn apply_args<'t>(tc: &TyInterner<'t>, declared: CanTy<'t>, args: &'t [CanTy<'t>]) -> CanTy<'t> {
    if args.is_empty() {
        return declared;
    }
    subst(
        tc,
        declared,
        &SubstitutionMap::from_args(args),
        SubstOptions::default(),
    )
}

fn contains<'t>(ty: CanTy<'t>, target: CanTy<'t>, tc: &TyInterner<'t>) -> bool {
    if ty == target {
        return true;
    }
    match *ty.kind() {
        TyKind::Struct { def, args } => def
            .fields
            .iter()
            .any(|f| contains(apply_args(tc, f.ty, args), target, tc)),
        TyKind::Enum { def, args } => def
            .cases
            .iter()
            .filter_map(|c| c.payload)
            .any(|payload| contains(apply_args(tc, payload, args), target, tc)),
        TyKind::Tuple(elems) => elems.iter().any(|&elem| contains(elem, target, tc)),
        TyKind::Optional(payload) => contains(payload, target, tc),
        _ => false,
    }
}
