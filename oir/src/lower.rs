//! The boundary between type lowering and the rest of the IR.
//!
//! Handles only carry answers that are computable from the type's structure.
//! Whether a type is address-only, and therefore everything downstream of
//! that fact, depends on the resilience domain the code is generated in, so
//! those questions are delegated to an [`AbiContext`] supplied by the caller.

use opal_types::CanTy;

/// How much layout knowledge the current context is entitled to.
///
/// `Minimal` sees only what every client of a module may assume, so
/// resilient aggregates stay opaque. `Maximal` sees complete layouts and is
/// only valid inside the defining module.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ResilienceExpansion {
    Minimal,
    Maximal,
}

/// Capability proving the holder sits at the lowering boundary.
///
/// Cannot be constructed outside this crate; the only way to obtain one is
/// [`AbiContext::lowering_token`], which keeps
/// [`OirType::from_canonical`](crate::OirType::from_canonical) out of reach
/// of code that merely transforms IR.
pub struct LoweringToken {
    _private: (),
}

/// A resolution context for layout-dependent type questions.
///
/// Implemented by whatever owns the lowering state for a function or module
/// being emitted. The handle layer treats it as an oracle and never caches
/// its answers: the same type can be address-only in one context and
/// loadable in another.
pub trait AbiContext<'t> {
    fn resilience(&self) -> ResilienceExpansion;

    /// True if values of `ty` must live in memory in this context: the
    /// layout is unknown, abstracted, or pinned by the type's own semantics.
    fn is_address_only(&self, ty: CanTy<'t>) -> bool;

    fn lowering_token(&self) -> LoweringToken {
        LoweringToken { _private: () }
    }
}

/// True if the calling convention passes values of the formal type `ty`
/// indirectly. `ctx` must resolve layout at minimal expansion: callers and
/// callees in different resilience domains have to agree on this answer.
pub fn is_formally_passed_indirectly<'t>(ty: CanTy<'t>, ctx: &impl AbiContext<'t>) -> bool {
    ctx.is_address_only(ty)
}

/// True if the calling convention returns values of the formal type `ty`
/// through an out-parameter. Same minimal-expansion requirement as
/// [`is_formally_passed_indirectly`].
pub fn is_formally_returned_indirectly<'t>(ty: CanTy<'t>, ctx: &impl AbiContext<'t>) -> bool {
    ctx.is_address_only(ty)
}
