// diag.rs — Diagnostics for rejected connections
//
// Maps each compatibility failure to a stable code, a severity and an
// optional hint, and renders it the way the CLI prints it.
//
// Preconditions: none (types only).
// Postconditions: `Diagnostic::message` is the failure's own message, verbatim.
// Failure modes: none.
// Side effects: none.

use std::fmt;

use serde::Serialize;

use crate::dim::{Dim, ResolveError};
use crate::spec::Incompatibility;

// ── Diagnostic code ──────────────────────────────────────────────────────

/// A stable diagnostic code (e.g., `E0101`).
///
/// Once assigned, a code must never be reassigned to a different meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DiagCode(pub &'static str);

impl fmt::Display for DiagCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub mod codes {
    use super::DiagCode;

    pub const EMPTY_VARIADIC: DiagCode = DiagCode("E0100");
    pub const DTYPE_MISMATCH: DiagCode = DiagCode("E0101");
    pub const SHAPE_RESOLUTION: DiagCode = DiagCode("E0102");
    pub const RANK_MISMATCH: DiagCode = DiagCode("E0103");
    pub const DIMENSION_MISMATCH: DiagCode = DiagCode("E0104");

    pub const UNCHECKED_VARIADIC_SPECS: DiagCode = DiagCode("W0100");
}

// ── Severity level ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagLevel {
    Error,
    Warning,
}

// ── Diagnostic ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<DiagCode>,
    pub level: DiagLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with no code or hint.
    pub fn new(level: DiagLevel, message: impl Into<String>) -> Self {
        Self {
            code: None,
            level,
            message: message.into(),
            hint: None,
        }
    }

    /// Attach a stable diagnostic code.
    pub fn with_code(mut self, code: DiagCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Attach a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<&Incompatibility> for Diagnostic {
    fn from(reason: &Incompatibility) -> Self {
        let diag = Diagnostic::new(DiagLevel::Error, reason.to_string());
        match reason {
            Incompatibility::EmptyVariadic => diag
                .with_code(codes::EMPTY_VARIADIC)
                .with_hint("declare at least one spec for the variadic port"),
            Incompatibility::DtypeMismatch { .. } => diag.with_code(codes::DTYPE_MISMATCH),
            Incompatibility::Resolution(err) => {
                let diag = diag.with_code(codes::SHAPE_RESOLUTION);
                match err {
                    ResolveError::MissingContext { .. } => {
                        diag.with_hint("pass the owning node so symbolic dimensions can be looked up")
                    }
                    ResolveError::UnresolvedSymbol { name, .. } => {
                        diag.with_hint(format!("set an integer attribute '{name}' on the node"))
                    }
                    ResolveError::WrongAttributeType { name, .. } => {
                        diag.with_hint(format!("attribute '{name}' must hold an integer"))
                    }
                    ResolveError::InvalidDescriptor { .. } => diag.with_hint(
                        "shape entries must be sizes >= 0, -1 for flexible, or attribute names",
                    ),
                }
            }
            Incompatibility::RankMismatch { .. } => diag.with_code(codes::RANK_MISMATCH),
            Incompatibility::DimensionMismatch {
                actual: Dim::Size(_),
                expected: Dim::Size(_),
                ..
            } => diag
                .with_code(codes::DIMENSION_MISMATCH)
                .with_hint(format!("use {} on either side to accept any size", Dim::FLEXIBLE)),
            Incompatibility::DimensionMismatch { .. } => diag
                .with_code(codes::DIMENSION_MISMATCH)
                .with_hint("pass node attributes to resolve symbolic dimensions before comparing"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            DiagLevel::Error => "error",
            DiagLevel::Warning => "warning",
        };
        if let Some(code) = &self.code {
            write!(f, "{}[{}]: {}", level, code, self.message)?;
        } else {
            write!(f, "{}: {}", level, self.message)?;
        }
        if let Some(hint) = &self.hint {
            write!(f, "\n  hint: {}", hint)?;
        }
        Ok(())
    }
}
