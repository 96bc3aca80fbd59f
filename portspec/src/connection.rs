// connection.rs — Connection documents
//
// A JSON description of one proposed edge: the source port spec with its
// node, and the target port spec (possibly variadic) with its node. Specs may
// be given in port notation or as objects.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::{AttributeSource, NodeAttrs};
use crate::diag::{codes, DiagCode, DiagLevel, Diagnostic};
use crate::parser::{self, NotationError};
use crate::spec::{Incompatibility, InputSpec, PortSpec};

// ── Document types ──────────────────────────────────────────────────────────

/// A source spec as written in a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceDecl {
    Notation(String),
    Spec(PortSpec),
}

/// A target spec as written in a document: notation, object, or list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetDecl {
    Notation(String),
    Spec(InputSpec),
}

/// One side of a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint<S> {
    pub spec: S,
    #[serde(default)]
    pub node: Option<NodeAttrs>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionDoc {
    pub source: Endpoint<SourceDecl>,
    pub target: Endpoint<TargetDecl>,
}

/// Errors that can occur while loading a connection document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed connection document: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Notation(#[from] NotationError),
}

impl ConnectionDoc {
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let text = std::fs::read_to_string(path).map_err(|e| DocumentError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&text)
    }

    /// Parse any notation strings into specs.
    pub fn into_connection(self) -> Result<Connection, DocumentError> {
        let source = match self.source.spec {
            SourceDecl::Notation(text) => parser::parse_spec(&text)?,
            SourceDecl::Spec(spec) => spec,
        };
        let target = match self.target.spec {
            TargetDecl::Notation(text) => parser::parse_target(&text)?,
            TargetDecl::Spec(spec) => spec,
        };
        Ok(Connection {
            source,
            source_node: self.source.node,
            target,
            target_node: self.target.node,
        })
    }
}

// ── Connection ──────────────────────────────────────────────────────────────

/// A fully parsed connection, ready to check.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub source: PortSpec,
    pub source_node: Option<NodeAttrs>,
    pub target: InputSpec,
    pub target_node: Option<NodeAttrs>,
}

impl Connection {
    pub fn check(&self) -> Result<(), Incompatibility> {
        self.source.check_compatibility(
            &self.target,
            self.source_node.as_ref().map(|n| n as &dyn AttributeSource),
            self.target_node.as_ref().map(|n| n as &dyn AttributeSource),
        )
    }

    /// Non-fatal findings about the declarations themselves.
    pub fn warnings(&self) -> Vec<Diagnostic> {
        let mut warnings = Vec::new();
        if let InputSpec::Variadic(specs) = &self.target {
            if specs.len() > 1 {
                warnings.push(
                    Diagnostic::new(
                        DiagLevel::Warning,
                        format!(
                            "variadic target declares {} specs; only the first is checked",
                            specs.len()
                        ),
                    )
                    .with_code(codes::UNCHECKED_VARIADIC_SPECS)
                    .with_hint("declare a single spec that covers every variadic input"),
                );
            }
        }
        warnings
    }
}

// ── Verdict ─────────────────────────────────────────────────────────────────

/// Machine-readable outcome of a check, as printed by `--format json`.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    pub compatible: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<DiagCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Diagnostic>,
}

impl Verdict {
    pub fn with_warnings(mut self, warnings: Vec<Diagnostic>) -> Self {
        self.warnings = warnings;
        self
    }
}

impl From<&Result<(), Incompatibility>> for Verdict {
    fn from(result: &Result<(), Incompatibility>) -> Self {
        match result {
            Ok(()) => Verdict {
                compatible: true,
                message: String::new(),
                code: None,
                hint: None,
                warnings: Vec::new(),
            },
            Err(reason) => {
                let diag = Diagnostic::from(reason);
                Verdict {
                    compatible: false,
                    message: diag.message,
                    code: diag.code,
                    hint: diag.hint,
                    warnings: Vec::new(),
                }
            }
        }
    }
}
