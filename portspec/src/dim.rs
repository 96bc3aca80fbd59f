// dim.rs — Shape descriptors and symbolic dimension resolution
//
// A shape is an ordered list of descriptors: fixed sizes, the flexible
// sentinel `-1`, or symbolic names looked up on the owning node.
//
// Preconditions: none.
// Postconditions: `resolve` preserves order and length of the input shape.
// Failure modes: missing context, unknown or non-integer attribute,
//   malformed size descriptor.
// Side effects: none (read-only attribute access on the context).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::{node_label, value_kind, AttributeSource};

// ── Descriptors ─────────────────────────────────────────────────────────────

/// One entry of a port shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dim {
    /// Fixed size, or `-1` for a flexible dimension.
    Size(i64),
    /// Name of an integer attribute on the owning node.
    Symbol(String),
}

impl Dim {
    /// Sentinel size matching any concrete size.
    pub const FLEXIBLE: i64 = -1;

    pub fn flexible() -> Self {
        Dim::Size(Self::FLEXIBLE)
    }

    pub fn fixed(n: u32) -> Self {
        Dim::Size(i64::from(n))
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Dim::Symbol(name.into())
    }

    pub fn is_flexible(&self) -> bool {
        matches!(self, Dim::Size(Self::FLEXIBLE))
    }

    /// Sizes below the flexible sentinel are not valid descriptors.
    fn is_valid(&self) -> bool {
        match self {
            Dim::Size(n) => *n >= Self::FLEXIBLE,
            Dim::Symbol(_) => true,
        }
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dim::Size(n) => write!(f, "{n}"),
            Dim::Symbol(name) => f.write_str(name),
        }
    }
}

impl From<i64> for Dim {
    fn from(n: i64) -> Self {
        Dim::Size(n)
    }
}

impl From<&str> for Dim {
    fn from(name: &str) -> Self {
        Dim::Symbol(name.to_string())
    }
}

/// Render a shape as `[a, b, c]`.
pub fn format_shape(shape: &[Dim]) -> String {
    let dims: Vec<String> = shape.iter().map(Dim::to_string).collect();
    format!("[{}]", dims.join(", "))
}

// ── Errors ──────────────────────────────────────────────────────────────────

/// Why a shape could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Cannot resolve symbolic dimension '{name}' without node instance")]
    MissingContext { name: String },

    #[error("Node {node} has no attribute '{name}' for dimension resolution")]
    UnresolvedSymbol { name: String, node: String },

    #[error("Dimension '{name}' resolved to {actual}, expected int")]
    WrongAttributeType { name: String, actual: &'static str },

    #[error("Invalid dimension descriptor at index {index}: {value}")]
    InvalidDescriptor { index: usize, value: i64 },
}

// ── Resolution ──────────────────────────────────────────────────────────────

/// Resolve a shape to concrete integers.
///
/// Sizes (including `-1`) pass through unchanged. Symbolic names are looked
/// up on `context`; a symbol without a context is an error.
pub fn resolve(
    shape: &[Dim],
    context: Option<&dyn AttributeSource>,
) -> Result<Vec<i64>, ResolveError> {
    let mut resolved = Vec::with_capacity(shape.len());
    for (index, dim) in shape.iter().enumerate() {
        match dim {
            Dim::Size(n) if dim.is_valid() => resolved.push(*n),
            Dim::Size(n) => {
                return Err(ResolveError::InvalidDescriptor { index, value: *n });
            }
            Dim::Symbol(name) => resolved.push(resolve_symbol(name, context)?),
        }
    }
    Ok(resolved)
}

fn resolve_symbol(name: &str, context: Option<&dyn AttributeSource>) -> Result<i64, ResolveError> {
    let node = context.ok_or_else(|| ResolveError::MissingContext {
        name: name.to_string(),
    })?;
    let value = node
        .attribute(name)
        .ok_or_else(|| ResolveError::UnresolvedSymbol {
            name: name.to_string(),
            node: node_label(node),
        })?;
    value.as_i64().ok_or_else(|| ResolveError::WrongAttributeType {
        name: name.to_string(),
        actual: value_kind(&value),
    })
}

/// Resolve one side of a connection for comparison.
///
/// With a context, every symbol is replaced by its integer value. Without
/// one, the shape is compared as declared, so identical symbol names still
/// line up. Descriptors are validated either way.
pub(crate) fn resolve_for_check(
    shape: &[Dim],
    context: Option<&dyn AttributeSource>,
) -> Result<Vec<Dim>, ResolveError> {
    match context {
        Some(_) => Ok(resolve(shape, context)?.into_iter().map(Dim::Size).collect()),
        None => {
            if let Some((index, Dim::Size(value))) =
                shape.iter().enumerate().find(|(_, d)| !d.is_valid())
            {
                return Err(ResolveError::InvalidDescriptor {
                    index,
                    value: *value,
                });
            }
            Ok(shape.to_vec())
        }
    }
}
