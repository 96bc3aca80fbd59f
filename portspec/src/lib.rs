// portspec — Port contracts for pipeline nodes
//
// Library root. Declares dtype/shape contracts for node ports and decides
// whether a producing port may feed a consuming one.

pub mod connection;
pub mod context;
pub mod diag;
pub mod dim;
pub mod dtype;
pub mod lexer;
pub mod parser;
pub mod port;
pub mod spec;

pub use context::{AttributeSource, NodeAttrs};
pub use dim::{resolve, Dim, ResolveError};
pub use dtype::{Dtype, ElementKind};
pub use port::{check_connection, InputPort, OutputPort, PortCompatibilityError};
pub use spec::{Incompatibility, InputSpec, PortSpec, TargetSpec};
