use core::{fmt, hash, ops::Deref};

use crate::interner::InternedStr;
use crate::ty::CanTy;

/// Identity-compared reference to an arena-allocated declaration.
///
/// Declarations are not interned: two declarations with the same name are
/// distinct entities, so equality and hashing go by address, never structure.
pub struct DeclRef<'t, D>(&'t D);

impl<'t, D> DeclRef<'t, D> {
    pub(crate) fn new(decl: &'t D) -> Self {
        Self(decl)
    }

    pub fn get(self) -> &'t D {
        self.0
    }
}

impl<'t, D> Deref for DeclRef<'t, D> {
    type Target = D;

    fn deref(&self) -> &D {
        self.0
    }
}

impl<'t, D> Clone for DeclRef<'t, D> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<'t, D> Copy for DeclRef<'t, D> {}

impl<'t, D> PartialEq for DeclRef<'t, D> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.0, other.0)
    }
}
impl<'t, D> Eq for DeclRef<'t, D> {}

impl<'t, D> hash::Hash for DeclRef<'t, D> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        core::ptr::hash(self.0, state)
    }
}

impl<'t, D: fmt::Debug> fmt::Debug for DeclRef<'t, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A stored property of a struct or class.
///
/// The type is the field's *lowered interface type*: generic positions are
/// expressed with `TyKind::Param` indices into the declaring nominal's
/// generic parameter list. Projections substitute the nominal's arguments in.
#[derive(Debug)]
pub struct Field<'t> {
    pub name: InternedStr<'t>,
    pub ty: CanTy<'t>,
}

#[derive(Debug)]
pub struct StructDef<'t> {
    pub name: InternedStr<'t>,
    pub generic_params: u16,
    pub fields: &'t [Field<'t>],
    /// Layout is not visible across the module boundary; the lowering
    /// authority treats the type as address-only under minimal expansion.
    pub resilient: bool,
}

#[derive(Debug)]
pub struct ClassDef<'t> {
    pub name: InternedStr<'t>,
    pub generic_params: u16,
    /// Superclass type, expressed with this class's `Param`s where generic.
    pub superclass: Option<CanTy<'t>>,
    pub fields: &'t [Field<'t>],
}

#[derive(Debug)]
pub struct EnumCase<'t> {
    pub name: InternedStr<'t>,
    pub payload: Option<CanTy<'t>>,
}

#[derive(Debug)]
pub struct EnumDef<'t> {
    pub name: InternedStr<'t>,
    pub generic_params: u16,
    pub cases: &'t [EnumCase<'t>],
    pub resilient: bool,
}

#[derive(Debug)]
pub struct ProtocolDef<'t> {
    pub name: InternedStr<'t>,
    /// Only class types may conform; existentials over this protocol hold a
    /// single retained reference.
    pub class_constrained: bool,
    /// Existentials over this protocol use the indirect reference-counted
    /// box representation (the error-protocol convention).
    pub boxed: bool,
}

impl<'t> StructDef<'t> {
    pub fn field(&self, name: &str) -> Option<&'t Field<'t>> {
        self.fields.iter().find(|f| f.name.as_str() == name)
    }
}

impl<'t> ClassDef<'t> {
    pub fn field(&self, name: &str) -> Option<&'t Field<'t>> {
        self.fields.iter().find(|f| f.name.as_str() == name)
    }
}

impl<'t> EnumDef<'t> {
    pub fn case(&self, name: &str) -> Option<&'t EnumCase<'t>> {
        self.cases.iter().find(|c| c.name.as_str() == name)
    }
}
