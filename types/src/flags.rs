use bitflags::bitflags;

bitflags! {
    /// Recursive type properties, computed once when a type is interned and
    /// cached on the node. This keeps the pervasive queries (archetype
    /// presence, lowering legality, triviality input) O(1) instead of
    /// re-walking the structure.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    pub struct TyFlags: u16 {
        /// Contains an interface type parameter (`Param`).
        const HAS_TYPE_PARAMETER = 1 << 0;
        /// Contains an archetype of any sort.
        const HAS_ARCHETYPE = 1 << 1;
        /// Contains an opened-existential archetype.
        const HAS_OPENED_EXISTENTIAL = 1 << 2;
        /// Contains an opaque (reverse-generic) archetype.
        const HAS_OPAQUE_ARCHETYPE = 1 << 3;
        /// Copying, moving, or destroying a value of this type involves a
        /// runtime operation (reference counting or unknown layout).
        const NON_TRIVIAL = 1 << 4;
        /// Contains a shape lowering eliminates (source-level function or
        /// l-value). Such a type may never be wrapped by an IR type handle.
        const NOT_LEGAL_LOWERED = 1 << 5;
    }
}

impl TyFlags {
    /// The bits that propagate through every containing type unchanged.
    /// `NON_TRIVIAL` is excluded: some containers (metatypes, unmanaged
    /// references, function types) do not own their component values.
    pub const STRUCTURAL: TyFlags = TyFlags::HAS_TYPE_PARAMETER
        .union(TyFlags::HAS_ARCHETYPE)
        .union(TyFlags::HAS_OPENED_EXISTENTIAL)
        .union(TyFlags::HAS_OPAQUE_ARCHETYPE)
        .union(TyFlags::NOT_LEGAL_LOWERED);
}
