//! Lowered-type handles for the Opal IR.
//!
//! Every value in the IR has an [`OirType`]: a canonical lowered type plus
//! the [`ValueCategory`] saying whether the value is held directly or
//! through an address. The pair packs into one machine word, compares by
//! identity, and keys hash maps without touching the type's structure.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use opal_oir::OirType;
//! use opal_types::{TyInterner, ty};
//!
//! let arena = Bump::new();
//! let tc = TyInterner::new(&arena);
//!
//! let pair = OirType::primitive_object(ty!(tc, Tuple[Int64, Word]));
//! assert!(pair.is_object());
//! assert_eq!(pair.tuple_element_type(1), OirType::builtin_word(&tc));
//!
//! // The same type as a memory location.
//! let slot = pair.address_type();
//! assert!(slot.is_address());
//! assert_eq!(slot.object_type(), pair);
//! ```

#![no_std]

mod cast;
mod classify;
mod existential;
mod lower;
mod project;
mod subst;
mod ty;

pub use cast::{
    AnyFnShape, ArchetypeShape, BoxShape, BuiltinShape, CastableShape, ClassShape, EnumShape,
    ExistentialMetatypeShape, ExistentialShape, FnShape, LValueShape, LoweredFnShape,
    MetatypeShape, OptionalShape, RefStorageShape, StructShape, TupleShape,
};
pub use existential::{AdoptionPolicy, ConcreteShapes, ExistentialRepr};
pub use lower::{
    AbiContext, LoweringToken, ResilienceExpansion, is_formally_passed_indirectly,
    is_formally_returned_indirectly,
};
pub use ty::{OirType, ValueCategory};
