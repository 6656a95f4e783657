use opal_oir::{AnyFnShape, OirType};

fn probe(handle: OirType<'_>) {
    let _ = handle.cast_to::<AnyFnShape>();
}

fn main() {}
