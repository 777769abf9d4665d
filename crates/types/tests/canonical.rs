// crates/types/tests/canonical.rs
use std::sync::Arc;
use std::thread;

use gofront_types::{ChanDir, Kind, TypeTable};
use proptest::prelude::*;

#[test]
fn same_shape_same_instance() {
    let tt = TypeTable::default();
    let int = tt.basic(Kind::Int);

    assert_eq!(tt.new_slice(&int), tt.new_slice(&int));
    assert_eq!(tt.new_pointer(&int), tt.new_pointer(&int));
    assert_eq!(tt.new_map(&int, &int), tt.new_map(&int, &int));
    assert_eq!(
        tt.new_chan(&int, ChanDir::Send),
        tt.new_chan(&int, ChanDir::Send)
    );
    assert_ne!(
        tt.new_chan(&int, ChanDir::Send),
        tt.new_chan(&int, ChanDir::Recv)
    );

    let f1 = tt.new_func(&[int.clone()], &[], false).unwrap();
    let f2 = tt.new_func(&[int.clone()], &[], false).unwrap();
    assert_eq!(f1, f2);
    assert_ne!(f1, tt.new_func(&[], &[int.clone()], false).unwrap());

    assert_eq!(
        tt.new_builtin("len", 1, 1, false),
        tt.new_builtin("len", 1, 1, false)
    );
}

#[test]
fn different_elements_different_instances() {
    let tt = TypeTable::default();
    let a = tt.new_slice(&tt.basic(Kind::Int));
    let b = tt.new_slice(&tt.basic(Kind::Int64));
    assert_ne!(a, b);
    assert_ne!(a.hash_value(), b.hash_value());
}

#[test]
fn named_types_are_never_interned() {
    let tt = TypeTable::default();
    let a = tt.new_named("main", "T");
    let b = tt.new_named("main", "T");
    assert_ne!(a, b);
}

#[test]
fn tables_are_independent() {
    let t1 = TypeTable::default();
    let t2 = TypeTable::default();
    assert_ne!(t1.basic(Kind::Int), t2.basic(Kind::Int));
    assert_eq!(t1.basic(Kind::Int), t1.basic(Kind::Int));
}

#[test]
fn concurrent_construction_yields_one_instance() {
    let tt = Arc::new(TypeTable::default());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let tt = Arc::clone(&tt);
            thread::spawn(move || {
                let elem = tt.basic(Kind::Uint8);
                tt.new_array(&elem, 32).unwrap()
            })
        })
        .collect();
    let types: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(types.windows(2).all(|w| w[0] == w[1]));
}

proptest! {
    #[test]
    fn new_array_is_idempotent(len in 0u64..1_000_000, pick in 0usize..Kind::BASIC.len()) {
        let tt = TypeTable::default();
        let elem = tt.basic(Kind::BASIC[pick]);
        let a = tt.new_array(&elem, len).unwrap();
        let b = tt.new_array(&elem, len).unwrap();
        prop_assert_eq!(a, b);
    }
}
