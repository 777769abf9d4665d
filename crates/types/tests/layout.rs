// crates/types/tests/layout.rs
use gofront_types::{Kind, TargetArch, TypeError, TypeFlags, TypeTable, UNKNOWN_SIZE};

#[test]
fn array_size_is_elem_size_times_len() {
    let tt = TypeTable::default();
    let arr = tt.new_array(&tt.basic(Kind::Int32), 10).unwrap();
    let c = arr.common();
    assert_eq!(c.size, 40);
    assert_eq!(c.align, 4);
    assert_eq!(c.kind, Kind::Array);
    assert!(c.is_complete());
    assert!(c.is_comparable());
}

#[test]
fn unknown_elem_size_propagates() {
    let tt = TypeTable::default();
    let t = tt.new_named("p", "T");
    let arr = tt.new_array(&t, 10).unwrap();
    assert_eq!(arr.common().size, UNKNOWN_SIZE);
    assert!(arr.common().hash.is_unknown());
    assert!(!arr.is_complete());
}

#[test]
fn completion_after_underlying_is_set() {
    let tt = TypeTable::default();
    let t = tt.new_named("p", "T");
    let arr = tt.new_array(&t, 3).unwrap();
    assert!(!arr.is_complete());

    t.set_underlying(&tt.basic(Kind::Int64)).unwrap();
    assert_eq!(t.kind(), Kind::Int64);
    assert_eq!(arr.size(), 24);
    assert!(arr.is_complete());
    assert!(!arr.hash_value().is_unknown());
    // Completion never reverts.
    assert_eq!(arr.common(), arr.common());
}

#[test]
fn self_referential_pointer_completes() {
    let tt = TypeTable::default();
    let node = tt.new_named("list", "Node");
    let ptr = tt.new_pointer(&node);
    node.set_underlying(&ptr).unwrap();

    assert!(node.is_complete());
    assert!(ptr.is_complete());
    assert_eq!(node.size(), 8);
    assert_eq!(node.kind(), Kind::Ptr);
    assert_eq!(node.elem(), Some(node.clone()));
}

#[test]
fn array_too_large() {
    let tt = TypeTable::new(TargetArch::I386);
    let byte = tt.basic(Kind::Uint8);
    assert!(matches!(
        tt.new_array(&byte, u64::from(u32::MAX)),
        Err(TypeError::ArrayTooLarge { .. })
    ));
    let int64 = tt.basic(Kind::Int64);
    assert!(matches!(
        tt.new_array(&int64, (i32::MAX / 4) as u64),
        Err(TypeError::ArrayTooLarge { .. })
    ));
    assert!(tt.new_array(&byte, 1 << 20).is_ok());
}

#[test]
fn zero_length_array_needs_padding() {
    let tt = TypeTable::default();
    let arr = tt.new_array(&tt.basic(Kind::Int64), 0).unwrap();
    assert_eq!(arr.size(), 0);
    assert!(arr.flags().contains(TypeFlags::NEED_PADDING));
}

#[test]
fn reference_shapes() {
    let tt = TypeTable::new(TargetArch::Arm);
    let int = tt.basic(Kind::Int);
    assert_eq!(int.size(), 4);
    assert_eq!(tt.new_slice(&int).size(), 12);
    assert_eq!(tt.basic(Kind::String).size(), 8);

    let iface = tt.new_interface(&[], &[]).unwrap();
    assert_eq!(iface.size(), 8);
    assert!(iface.flags().contains(TypeFlags::COMPARABLE));

    let slice = tt.new_slice(&int);
    assert!(slice.flags().contains(TypeFlags::NOT_COMPARABLE));
    let arr_of_slices = tt.new_array(&slice, 2).unwrap();
    assert!(arr_of_slices.flags().contains(TypeFlags::NOT_COMPARABLE));
}

#[test]
fn variadic_func_flags() {
    let tt = TypeTable::default();
    let ints = tt.new_slice(&tt.basic(Kind::Int));
    let f = tt.new_func(&[ints], &[], true).unwrap();
    assert!(f.flags().contains(TypeFlags::VARIADIC));
    assert!(f.is_variadic());

    let int = tt.basic(Kind::Int);
    assert_eq!(
        tt.new_func(&[int], &[], true),
        Err(TypeError::InvalidVariadic)
    );
}

#[test]
fn builtin_descriptor() {
    let tt = TypeTable::default();
    let append = tt.new_builtin("append", 1, 1, true);
    let c = append.common();
    assert_eq!(c.kind, Kind::Invalid);
    assert_eq!(c.size, 8);
    assert!(c.is_complete());
    assert!(c.flags.contains(TypeFlags::NOT_COMPARABLE));
    assert_eq!(append.num_in(), 1);
    assert!(append.is_variadic());
}
