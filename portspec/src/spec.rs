// spec.rs — Port specifications and the compatibility checker
//
// A `PortSpec` is the declared contract of a port: dtype plus shape. The
// checker decides whether a producing port may feed a consuming port,
// resolving symbolic dimensions against each side's node.
//
// Preconditions: none; malformed descriptors are reported, not assumed away.
// Postconditions: the verdict depends only on the two specs and the two
//   context snapshots. Resolution errors never escape the checker.
// Failure modes: empty variadic target, dtype mismatch, resolution failure,
//   rank mismatch, dimension mismatch.
// Side effects: none beyond trace-level logging.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::context::AttributeSource;
use crate::dim::{self, Dim, ResolveError};
use crate::dtype::Dtype;

// ── PortSpec ────────────────────────────────────────────────────────────────

/// Declared contract of a node input or output port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortSpec {
    pub dtype: Dtype,
    pub shape: Vec<Dim>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub optional: bool,
}

impl PortSpec {
    pub fn new(dtype: impl Into<Dtype>, shape: impl IntoIterator<Item = Dim>) -> Self {
        PortSpec {
            dtype: dtype.into(),
            shape: shape.into_iter().collect(),
            description: String::new(),
            optional: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark the port optional. Only meaningful for inputs.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Resolve this spec's shape against `node`.
    pub fn resolve_shape(
        &self,
        node: Option<&dyn AttributeSource>,
    ) -> Result<Vec<i64>, ResolveError> {
        dim::resolve(&self.shape, node)
    }

    /// Check whether this (source) port may connect to `target`.
    ///
    /// A variadic target is checked against its first spec only.
    pub fn check_compatibility<'t>(
        &self,
        target: impl Into<TargetSpec<'t>>,
        source_node: Option<&dyn AttributeSource>,
        target_node: Option<&dyn AttributeSource>,
    ) -> Result<(), Incompatibility> {
        let target = target.into().unwrap_variadic()?;

        if !self.dtype.accepts_into(&target.dtype) {
            return Err(Incompatibility::DtypeMismatch {
                actual: self.dtype.clone(),
                expected: target.dtype.clone(),
            });
        }

        let source_shape = dim::resolve_for_check(&self.shape, source_node)?;
        let target_shape = dim::resolve_for_check(&target.shape, target_node)?;

        if source_shape.len() != target_shape.len() {
            return Err(Incompatibility::RankMismatch {
                actual: source_shape.len(),
                expected: target_shape.len(),
            });
        }

        for (index, (src, tgt)) in source_shape.iter().zip(&target_shape).enumerate() {
            if src.is_flexible() || tgt.is_flexible() {
                continue;
            }
            if src != tgt {
                return Err(Incompatibility::DimensionMismatch {
                    index,
                    actual: src.clone(),
                    expected: tgt.clone(),
                });
            }
        }

        Ok(())
    }

    /// `check_compatibility` rendered as `(ok, message)`; the message is
    /// empty on success.
    pub fn is_compatible_with<'t>(
        &self,
        target: impl Into<TargetSpec<'t>>,
        source_node: Option<&dyn AttributeSource>,
        target_node: Option<&dyn AttributeSource>,
    ) -> (bool, String) {
        let verdict = self.check_compatibility(target, source_node, target_node);
        trace!(source = %self.dtype, ok = verdict.is_ok(), "port compatibility checked");
        match verdict {
            Ok(()) => (true, String::new()),
            Err(reason) => (false, reason.to_string()),
        }
    }
}

// ── Targets ─────────────────────────────────────────────────────────────────

/// Owned declaration of an input port: one spec, or a variadic list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputSpec {
    Single(PortSpec),
    Variadic(Vec<PortSpec>),
}

impl InputSpec {
    pub fn is_variadic(&self) -> bool {
        matches!(self, InputSpec::Variadic(_))
    }
}

impl From<PortSpec> for InputSpec {
    fn from(spec: PortSpec) -> Self {
        InputSpec::Single(spec)
    }
}

/// Borrowed view of a target port as the checker sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSpec<'a> {
    Single(&'a PortSpec),
    Variadic(&'a [PortSpec]),
}

impl<'a> TargetSpec<'a> {
    /// Only the first spec of a variadic target takes part in checks.
    fn unwrap_variadic(self) -> Result<&'a PortSpec, Incompatibility> {
        match self {
            TargetSpec::Single(spec) => Ok(spec),
            TargetSpec::Variadic(specs) => specs.first().ok_or(Incompatibility::EmptyVariadic),
        }
    }
}

impl<'a> From<&'a PortSpec> for TargetSpec<'a> {
    fn from(spec: &'a PortSpec) -> Self {
        TargetSpec::Single(spec)
    }
}

impl<'a> From<&'a [PortSpec]> for TargetSpec<'a> {
    fn from(specs: &'a [PortSpec]) -> Self {
        TargetSpec::Variadic(specs)
    }
}

impl<'a> From<&'a Vec<PortSpec>> for TargetSpec<'a> {
    fn from(specs: &'a Vec<PortSpec>) -> Self {
        TargetSpec::Variadic(specs)
    }
}

impl<'a, const N: usize> From<&'a [PortSpec; N]> for TargetSpec<'a> {
    fn from(specs: &'a [PortSpec; N]) -> Self {
        TargetSpec::Variadic(specs)
    }
}

impl<'a> From<&'a InputSpec> for TargetSpec<'a> {
    fn from(spec: &'a InputSpec) -> Self {
        match spec {
            InputSpec::Single(s) => TargetSpec::Single(s),
            InputSpec::Variadic(v) => TargetSpec::Variadic(v),
        }
    }
}

// ── Verdicts ────────────────────────────────────────────────────────────────

/// Why two ports cannot be connected. `actual` is always the source side,
/// `expected` the target side.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Incompatibility {
    #[error("empty variadic spec")]
    EmptyVariadic,

    #[error("Dtype mismatch: source has {actual}, target expects {expected}")]
    DtypeMismatch { actual: Dtype, expected: Dtype },

    #[error("Shape resolution failed: {0}")]
    Resolution(#[from] ResolveError),

    #[error("Shape rank mismatch: source has {actual} dimensions, target expects {expected}")]
    RankMismatch { actual: usize, expected: usize },

    #[error("Dimension {index} mismatch: source has size {actual}, target expects {expected}")]
    DimensionMismatch {
        index: usize,
        actual: Dim,
        expected: Dim,
    },
}
