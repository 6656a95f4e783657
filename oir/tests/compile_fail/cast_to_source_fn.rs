use opal_oir::{FnShape, OirType};

fn probe(handle: OirType<'_>) {
    let _ = handle.get_as::<FnShape>();
}

fn main() {}
