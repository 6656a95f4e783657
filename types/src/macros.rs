//! Type construction macro for concise test setup.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use opal_types::{TyInterner, ty};
//!
//! let arena = Bump::new();
//! let tc = TyInterner::new(&arena);
//!
//! let int = ty!(tc, Int64);
//! let pair = ty!(tc, Tuple[Int64, Word]);
//! let opt = ty!(tc, Optional[Tuple[Int64, Word]]);
//! # let _ = (int, pair, opt);
//! ```

/// Builds canonical types through an interner with a concise syntax.
///
/// | Pattern | Meaning |
/// |---------|---------|
/// | `Int8`/`Int16`/`Int32`/`Int64` | Builtin integers |
/// | `Float32`/`Float64`, `Word`, `RawPointer` | Other builtins |
/// | `NativeObject`, `BridgeObject`, `Token` | Managed builtins |
/// | `AnyObject` | The class layout-constraint existential |
/// | `Unit` | The empty tuple |
/// | `Tuple[T1, T2, ...]` | Tuple type |
/// | `Optional[T]` | Optional type |
/// | `Box[T]` | Reference-counted box |
/// | any other identifier | A `CanTy` variable in scope |
#[macro_export]
macro_rules! ty {
    ($tc:expr, $($rest:tt)+) => {{
        let __tc = &$tc;
        $crate::ty!(@ty __tc ; $($rest)+)
    }};

    // === Builtins ===

    (@ty $tc:expr ; Int8) => { $tc.builtin($crate::Builtin::Int(8)) };
    (@ty $tc:expr ; Int16) => { $tc.builtin($crate::Builtin::Int(16)) };
    (@ty $tc:expr ; Int32) => { $tc.builtin($crate::Builtin::Int(32)) };
    (@ty $tc:expr ; Int64) => { $tc.builtin($crate::Builtin::Int(64)) };
    (@ty $tc:expr ; Float32) => {
        $tc.builtin($crate::Builtin::Float($crate::FloatKind::F32))
    };
    (@ty $tc:expr ; Float64) => {
        $tc.builtin($crate::Builtin::Float($crate::FloatKind::F64))
    };
    (@ty $tc:expr ; Word) => { $tc.builtin($crate::Builtin::Word) };
    (@ty $tc:expr ; RawPointer) => { $tc.builtin($crate::Builtin::RawPointer) };
    (@ty $tc:expr ; NativeObject) => { $tc.builtin($crate::Builtin::NativeObject) };
    (@ty $tc:expr ; BridgeObject) => { $tc.builtin($crate::Builtin::BridgeObject) };
    (@ty $tc:expr ; Token) => { $tc.builtin($crate::Builtin::Token) };
    (@ty $tc:expr ; AnyObject) => { $tc.any_object() };
    (@ty $tc:expr ; Unit) => { $tc.unit() };

    // === Optional[T] / Box[T] ===

    (@ty $tc:expr ; Optional[$($inner:tt)+]) => {{
        let payload = $crate::ty!(@ty $tc ; $($inner)+);
        $tc.optional(payload)
    }};

    (@ty $tc:expr ; Box[$($inner:tt)+]) => {{
        let contents = $crate::ty!(@ty $tc ; $($inner)+);
        $tc.box_ty(contents)
    }};

    // === Tuple[T1, T2, ...] ===
    // Accumulate element tokens until a top-level comma; bracketed groups
    // are swallowed whole so nesting works.

    (@ty $tc:expr ; Tuple[]) => { $tc.unit() };
    (@ty $tc:expr ; Tuple[$($elems:tt)+]) => {
        $crate::ty!(@tuple $tc ; [] [] $($elems)+)
    };

    // End of elements: emit the last accumulated type.
    (@tuple $tc:expr ; [$($collected:tt)*] [$($curr:tt)+]) => {{
        let last = $crate::ty!(@ty $tc ; $($curr)+);
        $tc.tuple([$($collected)* last])
    }};

    // Top-level comma: current element is complete.
    (@tuple $tc:expr ; [$($collected:tt)*] [$($curr:tt)+] , $($rest:tt)*) => {{
        let elem = $crate::ty!(@ty $tc ; $($curr)+);
        $crate::ty!(@tuple $tc ; [$($collected)* elem,] [] $($rest)*)
    }};

    // Bracketed group: include it whole in the current element.
    (@tuple $tc:expr ; [$($collected:tt)*] [$($curr:tt)*] [$($inner:tt)*] $($rest:tt)*) => {
        $crate::ty!(@tuple $tc ; [$($collected)*] [$($curr)* [$($inner)*]] $($rest)*)
    };

    // Any other token: accumulate.
    (@tuple $tc:expr ; [$($collected:tt)*] [$($curr:tt)*] $tok:tt $($rest:tt)*) => {
        $crate::ty!(@tuple $tc ; [$($collected)*] [$($curr)* $tok] $($rest)*)
    };

    // === Variable reference (fallback) ===

    (@ty $tc:expr ; $var:ident) => { $var };
}
