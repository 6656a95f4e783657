//! Canonical type representation for the Opal compiler.
//!
//! Types are interned (hash-consed) in a bump arena: structurally equal kinds
//! always come back as the same node pointer, so equality and hashing on
//! [`CanTy`] are pointer operations. The interner is the single authority for
//! canonicalization in a compilation session; every `CanTy` in flight must
//! originate from the same [`TyInterner`].
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use opal_types::{Builtin, TyInterner};
//!
//! let arena = Bump::new();
//! let tc = TyInterner::new(&arena);
//!
//! let int = tc.builtin(Builtin::Int(64));
//! let pair = tc.tuple([int, int]);
//!
//! // Structurally equal kinds intern to the same node.
//! assert_eq!(pair, tc.tuple([int, int]));
//! ```

#![no_std]

mod decls;
mod display;
mod flags;
mod interner;
mod kind;
pub mod macros;
mod queries;
mod subst;
mod ty;

pub use decls::{ClassDef, DeclRef, EnumCase, EnumDef, Field, ProtocolDef, StructDef};
pub use flags::TyFlags;
pub use interner::{InternedStr, TyInterner};
pub use kind::{
    ArchetypeTy, Builtin, ExistentialTy, FloatKind, FnRepr, FnSig, MetatypeRepr, RefStorageKind,
    TyKind,
};
pub use subst::{Conformance, SubstOptions, SubstitutionMap, TypeSubstitution, subst};
pub use ty::{CanTy, TyNode};
