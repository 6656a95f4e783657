use opal_oir::{LValueShape, OirType};

fn probe(handle: OirType<'_>) {
    let _ = handle.is_a::<LValueShape>();
}

fn main() {}
