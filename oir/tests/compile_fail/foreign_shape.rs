use opal_oir::CastableShape;
use opal_types::CanTy;

struct MyShape;

impl CastableShape for MyShape {
    type View<'t> = ();

    fn project<'t>(_: CanTy<'t>) -> Option<()> {
        None
    }
}

fn main() {}
