//! The component contract: declared ports plus implemented capabilities.

use crate::capability::Capabilities;
use crate::port::PortEntry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Anything that can take part in wiring.
///
/// A component declares its ports in [`ports`](Component::ports), in the
/// order the wiring engine should consider them, and advertises the
/// capabilities it implements in [`capabilities`](Component::capabilities).
/// Either list may be empty: a pure source only has ports, a pure sink only
/// has capabilities.
pub trait Component: Send + Sync + 'static {
    /// Name of the concrete type, used in diagnostics.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Optional instance name, used in diagnostics.
    fn instance_name(&self) -> Option<&str> {
        None
    }

    /// Declared ports, in declaration order.
    fn ports(&self) -> Vec<PortEntry<'_>> {
        Vec::new()
    }

    /// Capabilities this component can be wired as.
    fn capabilities(self: Arc<Self>) -> Capabilities {
        Capabilities::new()
    }

    /// Type and instance name together.
    fn label(&self) -> ComponentLabel {
        ComponentLabel::new(self.type_name(), self.instance_name())
    }
}

/// Identifies one end of a wiring in events and errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentLabel {
    /// Type name with module paths stripped.
    pub type_name: String,
    /// Instance name, if the component has one.
    pub instance: Option<String>,
}

impl ComponentLabel {
    /// Build a label from a full type name and optional instance name.
    pub fn new(type_name: &str, instance: Option<&str>) -> Self {
        Self {
            type_name: short_type_name(type_name),
            instance: instance.map(str::to_owned),
        }
    }
}

impl fmt::Display for ComponentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.instance {
            Some(name) => write!(f, "{}(\"{}\")", self.type_name, name),
            None => f.write_str(&self.type_name),
        }
    }
}

/// Strip module paths from a type name, keeping generic structure.
///
/// `strand_chain::stage::TaskStage<i32, alloc::string::String>` becomes
/// `TaskStage<i32, String>`.
pub fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment_start = 0;
    let mut chars = full.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                out.truncate(segment_start);
            }
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | '&' | ';' | '*' => {
                out.push(c);
                segment_start = out.len();
            }
            _ => out.push(c),
        }
    }
    out
}
