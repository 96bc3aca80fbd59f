// Snapshot tests: lock user-facing failure messages and diagnostics.
//
// Each case runs a real check through the library API and renders the
// resulting diagnostic the way the CLI prints it. Snapshots are inline and
// managed by `insta`.
//
// Run `cargo insta review` after intentional wording changes to update baselines.

use portspec::connection::Verdict;
use portspec::diag::Diagnostic;
use portspec::{
    check_connection, Dim, Dtype, ElementKind, Incompatibility, InputPort, InputSpec, NodeAttrs,
    OutputPort, PortSpec,
};

fn sizes(dims: &[i64]) -> Vec<Dim> {
    dims.iter().copied().map(Dim::Size).collect()
}

/// Render one failing check as `case: diagnostic`.
fn render(case: &str, result: Result<(), Incompatibility>) -> String {
    match result {
        Ok(()) => format!("{case}: ok"),
        Err(reason) => format!("{case}: {}", Diagnostic::from(&reason)),
    }
}

#[test]
fn failure_diagnostics() {
    let reader = NodeAttrs::with_id("reader").set("bands", "sixty-one");
    let empty = NodeAttrs::with_id("empty");
    let empty_variadic: [PortSpec; 0] = [];

    let cases = [
        render(
            "empty_variadic",
            PortSpec::new(Dtype::Tensor, sizes(&[-1])).check_compatibility(&empty_variadic, None, None),
        ),
        render(
            "dtype",
            PortSpec::new(ElementKind::Float32, sizes(&[1]))
                .check_compatibility(&PortSpec::new(ElementKind::Int64, sizes(&[1])), None, None),
        ),
        render(
            "missing_context",
            portspec::resolve(&[Dim::symbol("height")], None)
                .map(|_| ())
                .map_err(Incompatibility::from),
        ),
        render(
            "unresolved",
            PortSpec::new(Dtype::Tensor, vec![Dim::symbol("bands")]).check_compatibility(
                &PortSpec::new(Dtype::Tensor, sizes(&[-1])),
                Some(&empty),
                None,
            ),
        ),
        render(
            "wrong_type",
            PortSpec::new(Dtype::Tensor, vec![Dim::symbol("bands")]).check_compatibility(
                &PortSpec::new(Dtype::Tensor, sizes(&[-1])),
                Some(&reader),
                None,
            ),
        ),
        render(
            "invalid_descriptor",
            PortSpec::new(Dtype::Tensor, sizes(&[-4]))
                .check_compatibility(&PortSpec::new(Dtype::Tensor, sizes(&[-1])), None, None),
        ),
        render(
            "rank",
            PortSpec::new("str", sizes(&[]))
                .check_compatibility(&PortSpec::new("str", sizes(&[1])), None, None),
        ),
        render(
            "dimension",
            PortSpec::new(Dtype::Tensor, sizes(&[-1, 4]))
                .check_compatibility(&PortSpec::new(Dtype::Tensor, sizes(&[2, 8])), None, None),
        ),
        render(
            "dimension_symbolic",
            PortSpec::new(Dtype::Tensor, sizes(&[-1, 61])).check_compatibility(
                &PortSpec::new(Dtype::Tensor, vec![Dim::flexible(), Dim::symbol("bands")]),
                None,
                None,
            ),
        ),
    ];

    insta::assert_snapshot!(cases.join("\n"), @r"
empty_variadic: error[E0100]: empty variadic spec
  hint: declare at least one spec for the variadic port
dtype: error[E0101]: Dtype mismatch: source has torch.float32, target expects torch.int64
missing_context: error[E0102]: Shape resolution failed: Cannot resolve symbolic dimension 'height' without node instance
  hint: pass the owning node so symbolic dimensions can be looked up
unresolved: error[E0102]: Shape resolution failed: Node empty has no attribute 'bands' for dimension resolution
  hint: set an integer attribute 'bands' on the node
wrong_type: error[E0102]: Shape resolution failed: Dimension 'bands' resolved to str, expected int
  hint: attribute 'bands' must hold an integer
invalid_descriptor: error[E0102]: Shape resolution failed: Invalid dimension descriptor at index 0: -4
  hint: shape entries must be sizes >= 0, -1 for flexible, or attribute names
rank: error[E0103]: Shape rank mismatch: source has 0 dimensions, target expects 1
dimension: error[E0104]: Dimension 1 mismatch: source has size 4, target expects 8
  hint: use -1 on either side to accept any size
dimension_symbolic: error[E0104]: Dimension 1 mismatch: source has size 61, target expects bands
  hint: pass node attributes to resolve symbolic dimensions before comparing
");
}

#[test]
fn port_error_message() {
    let encoder = NodeAttrs::with_id("encoder").set("latent", 128);
    let decoder = NodeAttrs::with_id("decoder").set("latent", 64);
    let out_spec = PortSpec::new(ElementKind::Float32, vec![Dim::flexible(), Dim::symbol("latent")]);
    let in_spec = InputSpec::from(PortSpec::new(
        ElementKind::Float32,
        vec![Dim::flexible(), Dim::symbol("latent")],
    ));

    let err = check_connection(
        &OutputPort::new(&encoder, "z", &out_spec),
        &InputPort::new(&decoder, "z", &in_spec),
    )
    .unwrap_err();

    insta::assert_snapshot!(
        err.to_string(),
        @"cannot connect OutputPort(encoder.z) to InputPort(decoder.z): Dimension 1 mismatch: source has size 128, target expects 64"
    );
}

#[test]
fn json_verdict() {
    let failed = PortSpec::new(Dtype::Tensor, sizes(&[-1, 3]))
        .check_compatibility(&PortSpec::new(Dtype::Tensor, sizes(&[-1, 4])), None, None);
    let verdict = Verdict::from(&failed);

    insta::assert_snapshot!(serde_json::to_string_pretty(&verdict).unwrap(), @r#"
{
  "compatible": false,
  "message": "Dimension 1 mismatch: source has size 3, target expects 4",
  "code": "E0104",
  "hint": "use -1 on either side to accept any size"
}
"#);
}
