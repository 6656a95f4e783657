use opal_oir::LoweringToken;

fn main() {
    let _ = LoweringToken { _private: () };
}
