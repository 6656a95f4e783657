//! Compile-fail tests for the shape-cast guard.
//!
//! These verify that casts to shapes a handle can never hold, and attempts
//! to widen the castable set from outside, are rejected at compile time.

#[test]
fn compile_fail() {
    let t = trybuild::TestCases::new();
    t.compile_fail("tests/compile_fail/*.rs");
}
