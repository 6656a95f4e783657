//! Diagnostic rendering of canonical types.
//!
//! The format is for humans reading compiler output and test failures; it is
//! not a stable mangling.

use core::fmt;

use crate::kind::{
    Builtin, FloatKind, FnRepr, MetatypeRepr, RefStorageKind, TyKind,
};
use crate::ty::CanTy;

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Builtin::Int(width) => write!(f, "Int{width}"),
            Builtin::IntLiteral => f.write_str("IntLiteral"),
            Builtin::Float(FloatKind::F32) => f.write_str("Float32"),
            Builtin::Float(FloatKind::F64) => f.write_str("Float64"),
            Builtin::Word => f.write_str("Word"),
            Builtin::RawPointer => f.write_str("RawPointer"),
            Builtin::NativeObject => f.write_str("NativeObject"),
            Builtin::BridgeObject => f.write_str("BridgeObject"),
            Builtin::Token => f.write_str("Token"),
        }
    }
}

impl fmt::Display for FnRepr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FnRepr::Thick => f.write_str("@thick"),
            FnRepr::Thin => f.write_str("@thin"),
            FnRepr::Method => f.write_str("@method"),
            FnRepr::Block => f.write_str("@block"),
        }
    }
}

fn write_list<'t>(
    f: &mut fmt::Formatter<'_>,
    tys: impl IntoIterator<Item = CanTy<'t>>,
) -> fmt::Result {
    for (i, ty) in tys.into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{ty}")?;
    }
    Ok(())
}

fn write_nominal<'t>(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    args: &[CanTy<'t>],
) -> fmt::Result {
    f.write_str(name)?;
    if !args.is_empty() {
        f.write_str("<")?;
        write_list(f, args.iter().copied())?;
        f.write_str(">")?;
    }
    Ok(())
}

impl fmt::Display for CanTy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self.kind() {
            TyKind::Builtin(builtin) => write!(f, "Builtin.{builtin}"),
            TyKind::Struct { def, args } => write_nominal(f, def.name.as_str(), args),
            TyKind::Class { def, args } => write_nominal(f, def.name.as_str(), args),
            TyKind::Enum { def, args } => write_nominal(f, def.name.as_str(), args),
            TyKind::Tuple(elems) => {
                f.write_str("(")?;
                write_list(f, elems.iter().copied())?;
                f.write_str(")")
            }
            TyKind::Optional(payload) => write!(f, "{payload}?"),
            TyKind::Fn { params, result } => {
                f.write_str("(")?;
                write_list(f, params.iter().copied())?;
                write!(f, ") -> {result}")
            }
            TyKind::LoweredFn(sig) => {
                write!(f, "{} ", sig.repr)?;
                if sig.no_return {
                    f.write_str("@noreturn ")?;
                }
                if sig.generic_params > 0 {
                    write!(f, "<{}> ", sig.generic_params)?;
                }
                f.write_str("(")?;
                write_list(f, sig.params.iter().copied())?;
                write!(f, ") -> {}", sig.result)
            }
            TyKind::LValue(referent) => write!(f, "@lvalue {referent}"),
            TyKind::Existential(ext) => {
                if ext.is_any_object() {
                    return f.write_str("AnyObject");
                }
                f.write_str("any ")?;
                let mut first = true;
                if let Some(sup) = ext.superclass {
                    write!(f, "{sup}")?;
                    first = false;
                }
                for protocol in ext.protocols {
                    if !first {
                        f.write_str(" & ")?;
                    }
                    f.write_str(protocol.name.as_str())?;
                    first = false;
                }
                if ext.class_bound {
                    if !first {
                        f.write_str(" & ")?;
                    }
                    f.write_str("AnyObject")?;
                    first = false;
                }
                if first {
                    f.write_str("Any")?;
                }
                Ok(())
            }
            TyKind::ExistentialMetatype(instance) => write!(f, "{instance}.Type"),
            TyKind::Metatype { instance, repr } => {
                let repr = match repr {
                    MetatypeRepr::Thin => "@thin",
                    MetatypeRepr::Thick => "@thick",
                };
                write!(f, "{repr} {instance}.Type")
            }
            TyKind::Archetype(arch) => {
                if arch.opened {
                    write!(f, "@opened A{}", arch.id)
                } else if arch.opaque {
                    write!(f, "@opaque A{}", arch.id)
                } else {
                    write!(f, "A{}", arch.id)
                }
            }
            TyKind::Param(index) => write!(f, "T{index}"),
            TyKind::Box(contents) => write!(f, "Box<{contents}>"),
            TyKind::RefStorage { kind, referent } => {
                let kind = match kind {
                    RefStorageKind::Weak => "@weak",
                    RefStorageKind::Unowned => "@unowned",
                    RefStorageKind::Unmanaged => "@unmanaged",
                };
                write!(f, "{kind} {referent}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use pretty_assertions::assert_eq;

    use crate::interner::TyInterner;
    use crate::kind::{Builtin, FnRepr};

    extern crate std;
    use std::string::ToString;

    #[test]
    fn renders_common_shapes() {
        let arena = Bump::new();
        let tc = TyInterner::new(&arena);

        let int = tc.builtin(Builtin::Int(64));
        assert_eq!(int.to_string(), "Builtin.Int64");
        assert_eq!(tc.optional(int).to_string(), "Builtin.Int64?");
        assert_eq!(tc.unit().to_string(), "()");
        assert_eq!(
            tc.lowered_fn(FnRepr::Thin, [int], tc.unit()).to_string(),
            "@thin (Builtin.Int64) -> ()"
        );
        assert_eq!(tc.any_object().to_string(), "AnyObject");
    }

    #[test]
    fn renders_nominals_with_args() {
        let arena = Bump::new();
        let tc = TyInterner::new(&arena);

        let word = tc.builtin(Builtin::Word);
        let def = tc.struct_def("Pair", 2, false, [("a", tc.param(0)), ("b", tc.param(1))]);
        let pair = tc.struct_ty(def, [word, tc.optional(word)]);
        assert_eq!(pair.to_string(), "Pair<Builtin.Word, Builtin.Word?>");
    }
}
