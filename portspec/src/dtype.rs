// dtype.rs — Port element types
//
// A port's dtype is one of three things: the generic tensor marker, a concrete
// element kind from a closed set, or an arbitrary named type that only ever
// compares by name.
//
// Preconditions: none.
// Postconditions: `Dtype::from_str` is total; unknown names become `Other`.
// Failure modes: none.
// Side effects: none.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ── Element kinds ───────────────────────────────────────────────────────────

/// Concrete tensor element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    Bool,
    Uint8,
    Uint16,
    Int8,
    Int16,
    Int32,
    Int64,
    Float16,
    Bfloat16,
    Float32,
    Float64,
    Complex64,
    Complex128,
}

impl ElementKind {
    /// All element kinds in declaration order.
    pub const ALL: [ElementKind; 13] = [
        ElementKind::Bool,
        ElementKind::Uint8,
        ElementKind::Uint16,
        ElementKind::Int8,
        ElementKind::Int16,
        ElementKind::Int32,
        ElementKind::Int64,
        ElementKind::Float16,
        ElementKind::Bfloat16,
        ElementKind::Float32,
        ElementKind::Float64,
        ElementKind::Complex64,
        ElementKind::Complex128,
    ];

    /// Canonical lowercase name, e.g. `float32`.
    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Bool => "bool",
            ElementKind::Uint8 => "uint8",
            ElementKind::Uint16 => "uint16",
            ElementKind::Int8 => "int8",
            ElementKind::Int16 => "int16",
            ElementKind::Int32 => "int32",
            ElementKind::Int64 => "int64",
            ElementKind::Float16 => "float16",
            ElementKind::Bfloat16 => "bfloat16",
            ElementKind::Float32 => "float32",
            ElementKind::Float64 => "float64",
            ElementKind::Complex64 => "complex64",
            ElementKind::Complex128 => "complex128",
        }
    }

    /// Look up an element kind by canonical name. A `torch.` prefix is accepted.
    ///
    /// Bare `bool` is deliberately excluded: without the prefix it names the
    /// host boolean type, which is an ordinary `Other` dtype.
    pub fn from_name(name: &str) -> Option<ElementKind> {
        let (prefixed, bare) = match name.strip_prefix("torch.") {
            Some(rest) => (true, rest),
            None => (false, name),
        };
        let kind = ElementKind::ALL.into_iter().find(|k| k.name() == bare)?;
        if kind == ElementKind::Bool && !prefixed {
            return None;
        }
        Some(kind)
    }
}

/// Qualified as `torch.<name>`, so `torch.bool` never reads back as the host
/// `bool` type.
impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "torch.{}", self.name())
    }
}

// ── Dtype ───────────────────────────────────────────────────────────────────

/// Element type token declared on a port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Dtype {
    /// Generic tensor marker: matches any tensor-like dtype.
    Tensor,
    /// Concrete element type.
    Element(ElementKind),
    /// Any other type, compared by name.
    Other(String),
}

/// Names accepted for the generic tensor marker.
const TENSOR_NAMES: [&str; 3] = ["tensor", "Tensor", "torch.Tensor"];

impl Dtype {
    pub fn other(name: impl Into<String>) -> Self {
        Dtype::Other(name.into())
    }

    /// True for the generic marker and for concrete element kinds.
    pub fn is_tensor_like(&self) -> bool {
        matches!(self, Dtype::Tensor | Dtype::Element(_))
    }

    /// Whether data of dtype `self` may flow into a port expecting `target`.
    ///
    /// Tensor-like pairs are compatible unless both are concrete and differ.
    /// Every other pairing requires equality.
    pub fn accepts_into(&self, target: &Dtype) -> bool {
        match (self, target) {
            (Dtype::Element(a), Dtype::Element(b)) => a == b,
            (a, b) if a.is_tensor_like() && b.is_tensor_like() => true,
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dtype::Tensor => f.write_str("Tensor"),
            Dtype::Element(kind) => write!(f, "{kind}"),
            Dtype::Other(name) => f.write_str(name),
        }
    }
}

impl FromStr for Dtype {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if TENSOR_NAMES.contains(&s) {
            return Ok(Dtype::Tensor);
        }
        Ok(match ElementKind::from_name(s) {
            Some(kind) => Dtype::Element(kind),
            None => Dtype::Other(s.to_string()),
        })
    }
}

impl From<String> for Dtype {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(dtype) => dtype,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for Dtype {
    fn from(s: &str) -> Self {
        Dtype::from(s.to_string())
    }
}

impl From<Dtype> for String {
    fn from(d: Dtype) -> Self {
        d.to_string()
    }
}

impl From<ElementKind> for Dtype {
    fn from(kind: ElementKind) -> Self {
        Dtype::Element(kind)
    }
}
