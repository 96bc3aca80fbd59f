// Connection checks through the public API: concrete scenarios from node
// declarations, including symbolic dimensions and variadic inputs.

use std::collections::HashMap;

use portspec::{
    check_connection, Dim, Dtype, ElementKind, Incompatibility, InputPort, InputSpec, NodeAttrs,
    OutputPort, PortSpec, ResolveError,
};

fn sizes(dims: &[i64]) -> Vec<Dim> {
    dims.iter().copied().map(Dim::Size).collect()
}

#[test]
fn resolve_batch_and_channels() {
    let node = NodeAttrs::new().set("batch", 4).set("channels", 3);
    let shape = vec![Dim::symbol("batch"), Dim::symbol("channels")];
    assert_eq!(portspec::resolve(&shape, Some(&node)), Ok(vec![4, 3]));
}

#[test]
fn resolve_missing_attribute() {
    let node = NodeAttrs::with_id("normalizer");
    let err = portspec::resolve(&[Dim::symbol("missing_attr")], Some(&node)).unwrap_err();
    assert!(matches!(
        err,
        ResolveError::UnresolvedSymbol { ref name, .. } if name == "missing_attr"
    ));
}

#[test]
fn generic_tensor_feeds_float32_image() {
    let src = PortSpec::new(Dtype::Tensor, sizes(&[-1, 3, 224, 224]));
    let tgt = PortSpec::new(ElementKind::Float32, sizes(&[-1, 3, 224, 224]));
    assert_eq!(src.is_compatible_with(&tgt, None, None), (true, String::new()));
}

#[test]
fn float32_does_not_feed_int64() {
    let src = PortSpec::new(ElementKind::Float32, sizes(&[1, 3]));
    let tgt = PortSpec::new(ElementKind::Int64, sizes(&[1, 3]));
    let (ok, msg) = src.is_compatible_with(&tgt, None, None);
    assert!(!ok);
    assert!(msg.contains("float32"), "{msg}");
    assert!(msg.contains("int64"), "{msg}");
}

#[test]
fn scalar_string_into_vector_is_rank_mismatch() {
    let src = PortSpec::new("str", sizes(&[]));
    let tgt = PortSpec::new("str", sizes(&[1]));
    let (ok, msg) = src.is_compatible_with(&tgt, None, None);
    assert!(!ok);
    assert_eq!(
        msg,
        "Shape rank mismatch: source has 0 dimensions, target expects 1"
    );
}

#[test]
fn flexible_batch_matches_fixed_batch() {
    let src = PortSpec::new(Dtype::Tensor, sizes(&[-1, 3]));
    let tgt = PortSpec::new(Dtype::Tensor, sizes(&[5, 3]));
    assert_eq!(src.is_compatible_with(&tgt, None, None), (true, String::new()));
}

#[test]
fn empty_variadic_wrapper() {
    let src = PortSpec::new(Dtype::Tensor, sizes(&[-1]));
    let empty: [PortSpec; 0] = [];
    assert_eq!(
        src.is_compatible_with(&empty, None, None),
        (false, "empty variadic spec".to_string())
    );
}

#[test]
fn variadic_pins_first_element_behavior() {
    let src = PortSpec::new(ElementKind::Float32, sizes(&[-1, 10]));
    let matching_first = [
        PortSpec::new(Dtype::Tensor, sizes(&[-1, 10])),
        PortSpec::new(ElementKind::Int8, sizes(&[7])),
    ];
    assert!(src.check_compatibility(&matching_first, None, None).is_ok());

    let mismatching_first = [
        PortSpec::new(ElementKind::Int8, sizes(&[7])),
        PortSpec::new(Dtype::Tensor, sizes(&[-1, 10])),
    ];
    assert!(src.check_compatibility(&mismatching_first, None, None).is_err());
}

#[test]
fn plain_map_as_context() {
    let mut attrs: HashMap<String, i64> = HashMap::new();
    attrs.insert("num_classes".into(), 10);
    let src = PortSpec::new(ElementKind::Float32, vec![Dim::flexible(), Dim::symbol("num_classes")]);
    let tgt = PortSpec::new(ElementKind::Float32, sizes(&[-1, 10]));
    assert!(src.check_compatibility(&tgt, Some(&attrs), None).is_ok());
}

#[test]
fn symbol_resolved_on_target_only() {
    let src = PortSpec::new(Dtype::Tensor, sizes(&[-1, 61]));
    let tgt = PortSpec::new(Dtype::Tensor, vec![Dim::flexible(), Dim::symbol("bands")]);

    let wide = NodeAttrs::with_id("pca").set("bands", 61);
    assert!(src.check_compatibility(&tgt, None, Some(&wide)).is_ok());

    let err = src.check_compatibility(&tgt, None, None).unwrap_err();
    assert_eq!(
        err,
        Incompatibility::DimensionMismatch {
            index: 1,
            actual: Dim::Size(61),
            expected: Dim::symbol("bands"),
        }
    );
}

#[test]
fn wrong_attribute_type_folds_into_failure() {
    let src = PortSpec::new(Dtype::Tensor, vec![Dim::symbol("bands")]);
    let tgt = PortSpec::new(Dtype::Tensor, sizes(&[-1]));
    let node = NodeAttrs::with_id("reader").set("bands", "sixty-one");
    assert_eq!(
        src.check_compatibility(&tgt, Some(&node), None),
        Err(Incompatibility::Resolution(ResolveError::WrongAttributeType {
            name: "bands".into(),
            actual: "str",
        }))
    );
}

#[test]
fn optional_flag_does_not_affect_verdict() {
    let src = PortSpec::new(Dtype::Tensor, sizes(&[-1]));
    let tgt = PortSpec::new(Dtype::Tensor, sizes(&[4]))
        .optional()
        .with_description("Optional mask input");
    assert!(src.check_compatibility(&tgt, None, None).is_ok());
}

#[test]
fn pipeline_edges_between_proxies() {
    let reader = NodeAttrs::with_id("reader").set("bands", 61);
    let pca = NodeAttrs::with_id("pca").set("n_components", 3);
    let head = NodeAttrs::with_id("head").set("in_channels", 3);

    let cube = PortSpec::new(ElementKind::Float32, vec![Dim::flexible(), Dim::symbol("bands")]);
    let pca_in = InputSpec::from(PortSpec::new(Dtype::Tensor, vec![Dim::flexible(), Dim::flexible()]));
    let pca_out = PortSpec::new(ElementKind::Float32, vec![Dim::flexible(), Dim::symbol("n_components")]);
    let head_in = InputSpec::Variadic(vec![PortSpec::new(
        ElementKind::Float32,
        vec![Dim::flexible(), Dim::symbol("in_channels")],
    )]);

    let edges = [
        (
            OutputPort::new(&reader, "cube", &cube),
            InputPort::new(&pca, "data", &pca_in),
        ),
        (
            OutputPort::new(&pca, "projected", &pca_out),
            InputPort::new(&head, "features", &head_in),
        ),
    ];
    for (from, to) in &edges {
        check_connection(from, to).unwrap_or_else(|e| panic!("{e}"));
    }

    let err = check_connection(
        &OutputPort::new(&reader, "cube", &cube),
        &InputPort::new(&head, "features", &head_in),
    )
    .unwrap_err();
    assert_eq!(err.from, "OutputPort(reader.cube)");
    assert_eq!(err.to, "InputPort(head.features)");
    assert_eq!(
        err.reason,
        Incompatibility::DimensionMismatch {
            index: 1,
            actual: Dim::Size(61),
            expected: Dim::Size(3),
        }
    );

    let bare = NodeAttrs::with_id("bare");
    let err = check_connection(
        &OutputPort::new(&bare, "cube", &cube),
        &InputPort::new(&pca, "data", &pca_in),
    )
    .unwrap_err();
    assert!(matches!(
        err.reason,
        Incompatibility::Resolution(ResolveError::UnresolvedSymbol { ref node, .. }) if node == "bare"
    ));
}
