// port.rs — Port proxies
//
// Non-owning views that bind a port spec to the node declaring it and the
// port's name. Identity is the node reference plus the name; the spec does
// not take part in equality.

use std::fmt;
use std::hash::{Hash, Hasher};

use thiserror::Error;
use tracing::debug;

use crate::context::{node_label, AttributeSource};
use crate::spec::{Incompatibility, InputSpec, PortSpec};

/// Address of the node behind a trait object, without its vtable.
fn node_addr(node: &dyn AttributeSource) -> *const () {
    std::ptr::from_ref(node).cast()
}

/// A node's output port.
#[derive(Clone, Copy)]
pub struct OutputPort<'a> {
    pub node: &'a (dyn AttributeSource + Sync),
    pub name: &'a str,
    pub spec: &'a PortSpec,
}

impl<'a> OutputPort<'a> {
    pub fn new(node: &'a (dyn AttributeSource + Sync), name: &'a str, spec: &'a PortSpec) -> Self {
        OutputPort { node, name, spec }
    }
}

/// A node's input port. Its spec may be variadic.
#[derive(Clone, Copy)]
pub struct InputPort<'a> {
    pub node: &'a (dyn AttributeSource + Sync),
    pub name: &'a str,
    pub spec: &'a InputSpec,
}

impl<'a> InputPort<'a> {
    pub fn new(node: &'a (dyn AttributeSource + Sync), name: &'a str, spec: &'a InputSpec) -> Self {
        InputPort { node, name, spec }
    }
}

macro_rules! port_identity {
    ($port:ident, $label:literal) => {
        impl PartialEq for $port<'_> {
            fn eq(&self, other: &Self) -> bool {
                node_addr(self.node) == node_addr(other.node) && self.name == other.name
            }
        }

        impl Eq for $port<'_> {}

        impl Hash for $port<'_> {
            fn hash<H: Hasher>(&self, state: &mut H) {
                node_addr(self.node).hash(state);
                self.name.hash(state);
            }
        }

        impl fmt::Display for $port<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({}.{})", $label, node_label(self.node), self.name)
            }
        }

        impl fmt::Debug for $port<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(self, f)
            }
        }
    };
}

port_identity!(OutputPort, "OutputPort");
port_identity!(InputPort, "InputPort");

// ── Connection check ────────────────────────────────────────────────────────

/// Raised when a connection between two ports is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot connect {from} to {to}: {reason}")]
pub struct PortCompatibilityError {
    pub from: String,
    pub to: String,
    pub reason: Incompatibility,
}

/// Check one edge, resolving each side's symbols against its own node.
pub fn check_connection(from: &OutputPort<'_>, to: &InputPort<'_>) -> Result<(), PortCompatibilityError> {
    let verdict = from
        .spec
        .check_compatibility(
            to.spec,
            Some(from.node as &dyn AttributeSource),
            Some(to.node as &dyn AttributeSource),
        );
    match verdict {
        Ok(()) => {
            debug!(%from, %to, "ports compatible");
            Ok(())
        }
        Err(reason) => {
            debug!(%from, %to, %reason, "ports incompatible");
            Err(PortCompatibilityError {
                from: from.to_string(),
                to: to.to_string(),
                reason,
            })
        }
    }
}
