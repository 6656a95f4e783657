//! Identity, category, and opaque-transport behavior of type handles.

mod common;

use bumpalo::Bump;
use common::TestLowering;
use hashbrown::HashMap;
use opal_oir::{AbiContext, OirType, ValueCategory};
use opal_types::{Builtin, TyInterner, ty};
use pretty_assertions::assert_eq;

#[test]
fn equal_types_make_equal_handles() {
    let arena = Bump::new();
    let tc = TyInterner::new(&arena);

    let a = OirType::primitive_object(ty!(tc, Tuple[Int64, Word]));
    let b = OirType::primitive_object(tc.tuple([
        tc.builtin(Builtin::Int(64)),
        tc.builtin(Builtin::Word),
    ]));
    assert_eq!(a, b);
    assert_eq!(a.to_opaque(), b.to_opaque());
}

#[test]
fn the_lowering_boundary_constructs_handles_directly() {
    let arena = Bump::new();
    let tc = TyInterner::new(&arena);
    let ctx = TestLowering::maximal(tc);

    let word = ty!(tc, Word);
    let obj = OirType::from_canonical(ctx.lowering_token(), word, ValueCategory::Object);
    assert_eq!(obj, OirType::builtin_word(&tc));

    let addr = OirType::from_canonical(ctx.lowering_token(), word, ValueCategory::Address);
    assert!(addr.is_address());
    assert_eq!(addr.object_type(), obj);
}

#[test]
fn category_distinguishes_handles_over_one_type() {
    let arena = Bump::new();
    let tc = TyInterner::new(&arena);

    let obj = OirType::builtin_word(&tc);
    let addr = obj.address_type();
    assert_ne!(obj, addr);
    assert_eq!(obj.canonical_type(), addr.canonical_type());
    assert_eq!(obj.category(), ValueCategory::Object);
    assert_eq!(addr.category(), ValueCategory::Address);

    assert_eq!(addr.address_type(), addr, "address_type is idempotent");
    assert_eq!(addr.object_type(), obj);
    assert_eq!(obj.copy_category(addr), addr);
    assert_eq!(addr.copy_category(obj), obj);
}

#[test]
fn handles_key_hash_maps() {
    let arena = Bump::new();
    let tc = TyInterner::new(&arena);

    let word = OirType::builtin_word(&tc);
    let int = OirType::builtin_integer(&tc, 64);

    let mut sizes: HashMap<OirType<'_>, u32> = HashMap::new();
    sizes.insert(word, 8);
    sizes.insert(word.address_type(), 0);
    sizes.insert(int, 8);

    assert_eq!(sizes.len(), 3);
    assert_eq!(sizes.get(&OirType::builtin_word(&tc)), Some(&8));
    assert_eq!(sizes.get(&OirType::builtin_word(&tc).address_type()), Some(&0));
}

#[test]
fn opaque_words_round_trip() {
    let arena = Bump::new();
    let tc = TyInterner::new(&arena);

    let addr = OirType::primitive_address(ty!(tc, Optional[Int32]));
    let back = unsafe { OirType::from_opaque(addr.to_opaque()) };
    assert_eq!(back, addr);
    assert_eq!(back.category(), ValueCategory::Address);
    assert_eq!(back.canonical_type(), addr.canonical_type());
}

#[test]
fn reserved_tag_bits_survive_category_changes() {
    let arena = Bump::new();
    let tc = TyInterner::new(&arena);

    // A container stashing its own discriminator in the reserved bits of an
    // exported word must still see it after category surgery.
    let word = OirType::builtin_word(&tc);
    let tagged = unsafe { OirType::from_opaque(word.to_opaque() | 0b110) };
    assert_eq!(tagged.canonical_type(), word.canonical_type());
    assert_eq!(tagged.address_type().to_opaque() & 0b110, 0b110);
    assert_eq!(tagged.address_type().object_type().to_opaque() & 0b110, 0b110);
}

#[test]
fn null_and_sentinels_are_mutually_distinct() {
    let arena = Bump::new();
    let tc = TyInterner::new(&arena);

    let null = OirType::null();
    let empty = OirType::empty_key();
    let tombstone = OirType::tombstone_key();
    let real = OirType::builtin_word(&tc);

    assert_eq!(null, OirType::default());
    assert!(null.is_null());

    assert_ne!(empty, null);
    assert_ne!(tombstone, null);
    assert_ne!(empty, tombstone);
    assert_ne!(real, empty);
    assert_ne!(real, tombstone);

    // Sentinels survive opaque transport like any other handle.
    assert_eq!(unsafe { OirType::from_opaque(empty.to_opaque()) }, empty);
}
